//! Error types for Kick API calls and webhook deliveries.
//!
//! Only failures that prevent a request from being built, sent or decoded are
//! hard errors. A provider-level failure (bad request, unauthorized, ...) is a
//! normal [`Response`](crate::Response) whose metadata carries the provider's
//! message and error fields.

use http::StatusCode;

/// Boxed error produced by pluggable collaborators (transports, trackers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type of the crate.
///
/// # Examples
///
/// ```no_run
/// use kick_sdk::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().build()?;
///
/// match client.users().inspect_token().await {
///     Ok(response) if response.metadata.is_success() => {
///         println!("token active: {}", response.payload.active);
///     }
///     Ok(response) => eprintln!("Kick said no: {}", response.metadata.message),
///     Err(Error::ResponseDecode { raw_response, source, .. }) => {
///         eprintln!("Unexpected body {raw_response}: {source}");
///     }
///     Err(e) => eprintln!("Request failed: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP request could not be constructed (malformed URL, invalid header value).
    #[error("Failed to construct request: {0}")]
    RequestConstruction(String),

    /// The JSON request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    BodyEncoding(#[source] serde_json::Error),

    /// The transport failed to deliver the request or to read the response.
    ///
    /// Network failures, timeouts and DNS errors all land here. Nothing is retried.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response body did not match the shape expected for its resource kind.
    #[error("Failed to decode response (status {status}): {source}")]
    ResponseDecode {
        /// The HTTP status code of the response
        status: StatusCode,
        /// The raw response body that failed to decode
        raw_response: String,
        /// The underlying decode failure
        #[source]
        source: serde_json::Error,
    },

    /// A resource kind name did not match any known Kick surface.
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// The public key is not a PEM encoded `PUBLIC KEY` block holding a valid key.
    #[error("Failed to parse public key: {0}")]
    PublicKeyParse(String),

    /// The public key is structurally valid but is not an RSA key.
    #[error("Unexpected public key type: {0}")]
    UnexpectedKeyType(String),

    /// The webhook signature is malformed or does not match the signed message.
    #[error("Failed to verify event signature: {0}")]
    SignatureVerification(String),

    /// The `Kick-Event-Type` header names an event this crate does not handle.
    #[error("Unexpected event type: {0:?}")]
    UnexpectedEventType(String),

    /// The webhook body does not match the payload of its event type.
    #[error("Failed to decode {event_type} event: {source}")]
    EventDecode {
        /// The event type the body was decoded as
        event_type: String,
        /// The underlying decode failure
        #[source]
        source: serde_json::Error,
    },

    /// The events tracker failed to record a delivery.
    #[error("Failed to track event: {0}")]
    Tracker(#[source] BoxError),

    /// A chat message posted as a user needs the broadcaster user ID.
    #[error("Broadcaster user ID is required when posting as a user")]
    MissingBroadcasterId,

    /// Unsubscribing needs at least one event subscription ID.
    #[error("At least one event subscription ID is required")]
    MissingEventIds,

    /// Invalid configuration was provided to a builder.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A configured base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::ResponseDecode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::ResponseDecode { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns `true` for errors raised while authenticating a webhook delivery.
    ///
    /// ```
    /// use kick_sdk::Error;
    ///
    /// assert!(Error::SignatureVerification("mismatch".into()).is_webhook_rejection());
    /// assert!(!Error::MissingEventIds.is_webhook_rejection());
    /// ```
    pub fn is_webhook_rejection(&self) -> bool {
        matches!(
            self,
            Error::PublicKeyParse(_) | Error::UnexpectedKeyType(_) | Error::SignatureVerification(_)
        )
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
