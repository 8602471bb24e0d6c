use crate::request::{AuthType, RequestOptions};
use crate::{Client, Error, ResourceKind, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};

/// Who a chat message is posted as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePosterType {
    #[default]
    User,
    Bot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostChatMessageInput {
    /// Channel to post in. Required when posting as a user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcaster_user_id: Option<u64>,
    pub content: String,
    #[serde(rename = "type")]
    pub poster_type: MessagePosterType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostChatMessageOutput {
    pub message_id: String,
    pub is_sent: bool,
}

/// Chat endpoints, see [`Client::chat`].
#[derive(Debug, Clone, Copy)]
pub struct Chat<'a> {
    client: &'a Client,
}

impl Client {
    pub fn chat(&self) -> Chat<'_> {
        Chat { client: self }
    }
}

impl Chat<'_> {
    /// Posts a chat message as a user or as a bot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBroadcasterId`] without sending anything when
    /// posting as a user with no (or a zero) broadcaster user ID.
    pub async fn post_message(
        &self,
        input: &PostChatMessageInput,
    ) -> Result<Response<PostChatMessageOutput>> {
        if input.poster_type == MessagePosterType::User
            && input.broadcaster_user_id.unwrap_or_default() == 0
        {
            return Err(Error::MissingBroadcasterId);
        }

        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, "public/v1/chat"),
            Method::POST,
        )
        .auth(AuthType::UserToken)
        .json(input);

        self.client.execute(options).await
    }
}
