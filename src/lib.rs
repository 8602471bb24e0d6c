//! # kick-sdk - A typed client for the Kick API and its webhooks
//!
//! The crate has two independent halves:
//!
//! - A request pipeline built on `reqwest`. Every endpoint goes through
//!   [`Client::execute`], which applies the bearer token, encodes the query
//!   and body, sends the request through a pluggable [`transport`] and decodes
//!   the answer into a [`Response`]. Bodies from `api.kick.com` are unwrapped
//!   from their `data` envelope. Bodies from `id.kick.com` are decoded as is.
//! - A [`webhook`] receiver that verifies Kick's RSA signature, skips
//!   redeliveries and dispatches typed events to callbacks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kick_sdk::api::{MessagePosterType, PostChatMessageInput};
//! use kick_sdk::{AccessTokens, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kick_sdk::Error> {
//!     let client = Client::builder()
//!         .access_tokens(AccessTokens::user("user-access-token"))
//!         .build()?;
//!
//!     let channels = client.channels().get_by_broadcaster_ids([123]).await?;
//!     for channel in channels.iter() {
//!         println!("{}: {}", channel.slug, channel.stream_title);
//!     }
//!
//!     let sent = client
//!         .chat()
//!         .post_message(&PostChatMessageInput {
//!             broadcaster_user_id: Some(123),
//!             content: "hello chat".to_string(),
//!             poster_type: MessagePosterType::User,
//!         })
//!         .await?;
//!     println!("sent: {}, took {:?}", sent.is_sent, sent.metadata.latency);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Kick rejecting a request is not an [`Error`]: the call returns a
//! [`Response`] whose [`ResponseMetadata`] holds the status and Kick's
//! message. [`Error`] is reserved for requests that could not be built, sent
//! or decoded, and for webhook deliveries that fail verification or decoding.
//!
//! ## Rotating tokens
//!
//! [`Client::with_access_tokens`] returns a new client sharing the transport
//! and credentials. Clients never change their tokens in place, so requests
//! already in flight keep the token they started with.

pub mod api;
mod client;
pub mod config;
mod error;
pub mod request;
pub mod resource;
mod response;
pub mod transport;
pub mod values;
pub mod webhook;

pub use client::{Client, ClientBuilder};
pub use config::{AccessTokens, Credentials};
pub use error::{BoxError, Error, Result};
pub use resource::{BaseUrls, Resource, ResourceKind};
pub use response::{EmptyResponse, Response, ResponseMetadata};
