use crate::request::{AuthType, RequestOptions};
use crate::values::{Value, Values};
use crate::{Client, ResourceKind, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};

const CATEGORIES_PATH: &str = "public/v1/categories";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub thumbnail: String,
}

/// Category endpoints, see [`Client::categories`].
#[derive(Debug, Clone, Copy)]
pub struct Categories<'a> {
    client: &'a Client,
}

impl Client {
    pub fn categories(&self) -> Categories<'_> {
        Categories { client: self }
    }
}

impl Categories<'_> {
    /// Searches categories by name.
    pub async fn search(&self, query: impl Into<String>) -> Result<Response<Vec<Category>>> {
        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, CATEGORIES_PATH),
            Method::GET,
        )
        .auth(AuthType::UserToken)
        .query(Values::new().with("q", Value::single(query)));

        self.client.execute(options).await
    }

    /// Retrieves a single category.
    pub async fn get_by_id(&self, category_id: u64) -> Result<Response<Category>> {
        let options = RequestOptions::new(
            self.client
                .resource(ResourceKind::Api, format!("{CATEGORIES_PATH}/{category_id}")),
            Method::GET,
        )
        .auth(AuthType::UserToken);

        self.client.execute(options).await
    }
}
