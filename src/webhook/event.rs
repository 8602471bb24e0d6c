use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The event types a webhook delivery can carry, keyed by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "chat.message.sent")]
    ChatMessage,
    #[serde(rename = "channel.followed")]
    ChannelFollow,
    #[serde(rename = "channel.subscription.renewal")]
    ChannelSubscriptionRenewal,
    #[serde(rename = "channel.subscription.gifts")]
    ChannelSubscriptionGifts,
    #[serde(rename = "channel.subscription.new")]
    ChannelSubscriptionCreated,
    #[serde(rename = "livestream.status.updated")]
    LivestreamStatusUpdated,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::ChatMessage,
        EventType::ChannelFollow,
        EventType::ChannelSubscriptionRenewal,
        EventType::ChannelSubscriptionGifts,
        EventType::ChannelSubscriptionCreated,
        EventType::LivestreamStatusUpdated,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::ChatMessage => "chat.message.sent",
            EventType::ChannelFollow => "channel.followed",
            EventType::ChannelSubscriptionRenewal => "channel.subscription.renewal",
            EventType::ChannelSubscriptionGifts => "channel.subscription.gifts",
            EventType::ChannelSubscriptionCreated => "channel.subscription.new",
            EventType::LivestreamStatusUpdated => "livestream.status.updated",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| Error::UnexpectedEventType(s.to_string()))
    }
}

// Kick sends `null` for some fields that are plain values here.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Kick user as it appears inside event payloads.
///
/// Anonymous gifters come without an ID or username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventUser {
    #[serde(deserialize_with = "null_as_default")]
    pub is_anonymous: bool,
    pub user_id: Option<u64>,
    pub username: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_verified: bool,
    pub profile_picture: Option<String>,
    pub channel_slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emote {
    #[serde(rename = "emote_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub positions: Vec<EmotePosition>,
}

/// Character range of an emote inside the message content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotePosition {
    #[serde(rename = "s")]
    pub start: usize,
    #[serde(rename = "e")]
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessageEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub message_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub broadcaster: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub sender: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub emotes: Vec<Emote>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelFollowEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub broadcaster: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub follower: EventUser,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSubscriptionRenewalEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub broadcaster: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub subscriber: EventUser,
    /// Months subscribed.
    #[serde(deserialize_with = "null_as_default")]
    pub duration: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSubscriptionGiftsEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub broadcaster: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub gifter: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub giftees: Vec<EventUser>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSubscriptionCreatedEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub broadcaster: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub subscriber: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub duration: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivestreamStatusUpdatedEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub broadcaster: EventUser,
    #[serde(deserialize_with = "null_as_default")]
    pub is_live: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub started_at: DateTime<Utc>,
    /// Unset while the stream is live.
    pub ended_at: Option<DateTime<Utc>>,
}

/// A decoded webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    ChatMessage(ChatMessageEvent),
    ChannelFollow(ChannelFollowEvent),
    ChannelSubscriptionRenewal(ChannelSubscriptionRenewalEvent),
    ChannelSubscriptionGifts(ChannelSubscriptionGiftsEvent),
    ChannelSubscriptionCreated(ChannelSubscriptionCreatedEvent),
    LivestreamStatusUpdated(LivestreamStatusUpdatedEvent),
}

impl WebhookEvent {
    /// Decodes `body` into the payload selected by the `Kick-Event-Type` tag.
    ///
    /// The tag is checked before the body is looked at, so an unknown tag
    /// fails with [`Error::UnexpectedEventType`] whatever the body holds.
    /// A body that doesn't fit the selected payload fails with
    /// [`Error::EventDecode`].
    pub fn decode(event_type: &str, body: &[u8]) -> Result<Self> {
        let event_type: EventType = event_type.parse()?;
        Self::decode_as(event_type, body)
    }

    pub fn decode_as(event_type: EventType, body: &[u8]) -> Result<Self> {
        fn json<T: serde::de::DeserializeOwned>(event_type: EventType, body: &[u8]) -> Result<T> {
            serde_json::from_slice(body).map_err(|source| Error::EventDecode {
                event_type: event_type.to_string(),
                source,
            })
        }

        let event = match event_type {
            EventType::ChatMessage => WebhookEvent::ChatMessage(json(event_type, body)?),
            EventType::ChannelFollow => WebhookEvent::ChannelFollow(json(event_type, body)?),
            EventType::ChannelSubscriptionRenewal => {
                WebhookEvent::ChannelSubscriptionRenewal(json(event_type, body)?)
            }
            EventType::ChannelSubscriptionGifts => {
                WebhookEvent::ChannelSubscriptionGifts(json(event_type, body)?)
            }
            EventType::ChannelSubscriptionCreated => {
                WebhookEvent::ChannelSubscriptionCreated(json(event_type, body)?)
            }
            EventType::LivestreamStatusUpdated => {
                WebhookEvent::LivestreamStatusUpdated(json(event_type, body)?)
            }
        };

        Ok(event)
    }

    pub fn event_type(&self) -> EventType {
        match self {
            WebhookEvent::ChatMessage(_) => EventType::ChatMessage,
            WebhookEvent::ChannelFollow(_) => EventType::ChannelFollow,
            WebhookEvent::ChannelSubscriptionRenewal(_) => EventType::ChannelSubscriptionRenewal,
            WebhookEvent::ChannelSubscriptionGifts(_) => EventType::ChannelSubscriptionGifts,
            WebhookEvent::ChannelSubscriptionCreated(_) => EventType::ChannelSubscriptionCreated,
            WebhookEvent::LivestreamStatusUpdated(_) => EventType::LivestreamStatusUpdated,
        }
    }
}
