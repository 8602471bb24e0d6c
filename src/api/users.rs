use crate::request::{AuthType, RequestOptions};
use crate::values::{Value, Values};
use crate::{Client, ResourceKind, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "user_id", alias = "id")]
    pub id: u64,
    pub name: String,
    pub email: String,
    pub profile_picture: String,
}

/// Introspection result for the token sent in the authorization header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenInfo {
    pub client_id: String,
    pub active: bool,
    #[serde(rename = "exp")]
    pub expires: i64,
    pub scope: String,
    pub token_type: String,
}

/// User endpoints, see [`Client::users`].
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a Client,
}

impl Client {
    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }
}

impl Users<'_> {
    /// Describes the user access token this client sends.
    pub async fn inspect_token(&self) -> Result<Response<TokenInfo>> {
        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, "public/v1/token/introspect"),
            Method::POST,
        )
        .auth(AuthType::UserToken);

        self.client.execute(options).await
    }

    /// Retrieves users by ID. With no IDs, Kick returns the authenticated user.
    pub async fn get_by_ids<I>(&self, user_ids: I) -> Result<Response<Vec<User>>>
    where
        I: IntoIterator<Item = u64>,
    {
        let ids = user_ids.into_iter().map(|id| id.to_string());

        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, "public/v1/users"),
            Method::GET,
        )
        .auth(AuthType::UserToken)
        .query(Values::new().with("id", Value::many(ids)));

        self.client.execute(options).await
    }
}
