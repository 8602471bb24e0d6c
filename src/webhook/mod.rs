//! Receiving Kick webhook deliveries.
//!
//! A delivery is a `POST` carrying `Kick-Event-*` headers and a JSON body
//! whose shape depends on the event type. [`WebhookHandler`] checks the
//! signature, drops redeliveries through an optional [`EventsTracker`],
//! decodes the body into a [`WebhookEvent`] and passes it to the callback
//! registered for its type.
//!
//! The pieces are usable on their own: [`verify_event`] checks a signature,
//! [`WebhookEvent::decode`] decodes a body and [`EventDispatcher`] runs
//! dedup and callbacks without any HTTP around it.

mod dispatcher;
mod event;
mod handler;
mod header;
mod signature;
mod tracker;

pub use dispatcher::{EventCallback, EventDispatcher, EventHandler};
pub use event::{
    ChannelFollowEvent, ChannelSubscriptionCreatedEvent, ChannelSubscriptionGiftsEvent,
    ChannelSubscriptionRenewalEvent, ChatMessageEvent, Emote, EmotePosition, EventType, EventUser,
    LivestreamStatusUpdatedEvent, WebhookEvent,
};
pub use handler::{WebhookHandler, WebhookHandlerBuilder, WebhookReply, DEFAULT_BODY_LIMIT};
pub use header::{
    WebhookEventHeader, EVENT_TYPE_HEADER, EVENT_VERSION_HEADER, MESSAGE_ID_HEADER,
    MESSAGE_TIMESTAMP_HEADER, SIGNATURE_HEADER, SUBSCRIPTION_ID_HEADER,
};
pub use signature::{
    signed_message, verify_event, verify_event_pem, PublicKey, DEFAULT_PUBLIC_KEY_PEM,
};
pub use tracker::{EventsTracker, MemoryEventsTracker};
