//! Typed wrappers for the Kick REST endpoints.
//!
//! Each wrapper maps its input onto [`Client::execute`](crate::Client::execute).
//! Validation that can be done locally happens before any request is sent.

mod categories;
mod channels;
mod chat;
mod events;
mod oauth;
mod public_key;
mod users;

pub use categories::{Categories, Category};
pub use channels::{Channel, Channels, Stream, UpdateStreamInput};
pub use chat::{Chat, MessagePosterType, PostChatMessageInput, PostChatMessageOutput};
pub use events::{
    EventInput, EventSubscription, Events, SubscribeEventsInput, SubscribeEventsOutput,
    SubscriptionMethod,
};
pub use oauth::{
    AccessToken, AuthorizationUrlInput, ExchangeCodeInput, OAuth, OAuthScope, RefreshTokenInput,
    RevokeTokenInput, TokenHintType,
};
pub use public_key::PublicKeyOutput;
pub use users::{TokenInfo, User, Users};
