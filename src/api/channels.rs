use crate::api::Category;
use crate::request::{AuthType, RequestOptions};
use crate::values::{Value, Values};
use crate::{Client, EmptyResponse, ResourceKind, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};

const CHANNELS_PATH: &str = "public/v1/channels";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub banner_picture: String,
    pub broadcaster_user_id: u64,
    pub category: Category,
    pub channel_description: String,
    pub slug: String,
    pub stream: Stream,
    pub stream_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stream {
    pub is_live: bool,
    pub is_mature: bool,
    pub key: String,
    pub language: String,
    pub start_time: String,
    pub url: String,
    pub viewer_count: u64,
}

/// Stream metadata to change. Fields left as `None` are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStreamInput {
    pub category_id: Option<u64>,
    pub stream_title: Option<String>,
}

/// Channel endpoints, see [`Client::channels`].
#[derive(Debug, Clone, Copy)]
pub struct Channels<'a> {
    client: &'a Client,
}

impl Client {
    pub fn channels(&self) -> Channels<'_> {
        Channels { client: self }
    }
}

impl Channels<'_> {
    /// Retrieves the channels of the given broadcasters.
    pub async fn get_by_broadcaster_ids<I>(
        &self,
        broadcaster_user_ids: I,
    ) -> Result<Response<Vec<Channel>>>
    where
        I: IntoIterator<Item = u64>,
    {
        let ids = broadcaster_user_ids.into_iter().map(|id| id.to_string());

        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, CHANNELS_PATH),
            Method::GET,
        )
        .auth(AuthType::UserToken)
        .query(Values::new().with("broadcaster_user_id", Value::many(ids)));

        self.client.execute(options).await
    }

    /// Updates the stream metadata of the authenticated user's channel.
    pub async fn update_stream(
        &self,
        input: &UpdateStreamInput,
    ) -> Result<Response<EmptyResponse>> {
        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, CHANNELS_PATH),
            Method::PATCH,
        )
        .auth(AuthType::UserToken)
        .json(input);

        self.client.execute(options).await
    }
}
