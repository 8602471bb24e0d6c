use crate::request::{AuthType, RequestOptions};
use crate::values::{Value, Values};
use crate::webhook::EventType;
use crate::{Client, EmptyResponse, Error, ResourceKind, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};

const SUBSCRIPTIONS_PATH: &str = "public/v1/events/subscriptions";

/// How Kick delivers subscribed events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionMethod {
    #[default]
    Webhook,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventSubscription {
    pub id: String,
    pub app_id: String,
    pub broadcaster_user_id: u64,
    pub event: String,
    pub method: String,
    pub version: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInput {
    #[serde(rename = "name")]
    pub event_type: EventType,
    pub version: u32,
}

impl EventInput {
    pub fn new(event_type: EventType, version: u32) -> Self {
        Self { event_type, version }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubscribeEventsInput {
    /// The channel whose events to subscribe to.
    pub broadcaster_user_id: u64,
    pub events: Vec<EventInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<SubscriptionMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscribeEventsOutput {
    pub error: String,
    pub name: String,
    pub subscription_id: String,
    pub version: u32,
}

/// Event subscription endpoints, see [`Client::events`].
#[derive(Debug, Clone, Copy)]
pub struct Events<'a> {
    client: &'a Client,
}

impl Client {
    pub fn events(&self) -> Events<'_> {
        Events { client: self }
    }
}

impl Events<'_> {
    /// Lists the event subscriptions of the authorized application.
    pub async fn subscriptions(&self) -> Result<Response<Vec<EventSubscription>>> {
        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, SUBSCRIPTIONS_PATH),
            Method::GET,
        )
        .auth(AuthType::UserToken);

        self.client.execute(options).await
    }

    pub async fn subscribe(
        &self,
        input: &SubscribeEventsInput,
    ) -> Result<Response<Vec<SubscribeEventsOutput>>> {
        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, SUBSCRIPTIONS_PATH),
            Method::POST,
        )
        .auth(AuthType::UserToken)
        .json(input);

        self.client.execute(options).await
    }

    /// Removes event subscriptions by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEventIds`] without sending anything when `ids` is empty.
    pub async fn unsubscribe<I, S>(&self, ids: I) -> Result<Response<EmptyResponse>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(Error::MissingEventIds);
        }

        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Api, SUBSCRIPTIONS_PATH),
            Method::DELETE,
        )
        .auth(AuthType::UserToken)
        .query(Values::new().with("id", Value::many(ids)));

        self.client.execute(options).await
    }
}
