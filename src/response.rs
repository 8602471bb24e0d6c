//! Typed responses and the parsing rules of the two Kick surfaces.
//!
//! The API host wraps every body in `{"data": ..., "message": ...}`. On error
//! statuses the `data` field does not reliably match the endpoint's shape (an
//! object or `null` where an array is expected), so it is ignored and only the
//! message is kept. The identity host returns bodies unwrapped, and on any
//! non-200 status an OAuth style `{"error", "error_description"}` object.
//!
//! A `204 No Content` response is never decoded, whatever the surface.

use crate::resource::ResourceKind;
use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload of endpoints that return no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResponse {}

/// Everything known about a response apart from its typed payload.
///
/// Always populated, whether or not Kick reported a failure. The provider
/// fields are empty strings on success.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The `message` field of an API envelope. On failures it usually explains why.
    pub message: String,

    /// The `error` field of an identity host error.
    pub error: String,

    /// The `error_description` field of an identity host error.
    pub error_description: String,

    /// Time from sending the request until the response was received.
    pub latency: Duration,
}

impl ResponseMetadata {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            message: String::new(),
            error: String::new(),
            error_description: String::new(),
            latency: Duration::ZERO,
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// The result of a call to any Kick endpoint.
///
/// Provider failures are not errors: check [`ResponseMetadata::status`] and the
/// provider fields. On failure `payload` is `T::default()`.
///
/// ```
/// use kick_sdk::{Response, ResponseMetadata};
/// use http::{HeaderMap, StatusCode};
///
/// let metadata = ResponseMetadata::new(StatusCode::OK, HeaderMap::new());
/// let response = Response::new(vec![1, 2], metadata);
/// let count = response.map(|ids| ids.len());
/// assert_eq!(count.payload, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded payload, or `T::default()` when there was none.
    pub payload: T,

    /// Status, headers and provider-level messages.
    pub metadata: ResponseMetadata,
}

impl<T> Response<T> {
    pub fn new(payload: T, metadata: ResponseMetadata) -> Self {
        Self { payload, metadata }
    }

    /// Maps the payload to a different type, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            payload: f(self.payload),
            metadata: self.metadata,
        }
    }
}

impl<T: Default> Response<T> {
    fn empty(metadata: ResponseMetadata) -> Self {
        Self::new(T::default(), metadata)
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.payload
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.payload
    }
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct OAuthError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Decodes a raw response according to the rules of its surface.
///
/// # Errors
///
/// Returns [`Error::ResponseDecode`] if the body does not have the shape
/// expected for the status and resource kind.
pub(crate) fn parse_response<T>(
    kind: ResourceKind,
    status: StatusCode,
    headers: HeaderMap,
    body: &[u8],
) -> Result<Response<T>>
where
    T: DeserializeOwned + Default,
{
    let mut metadata = ResponseMetadata::new(status, headers);

    if status == StatusCode::NO_CONTENT {
        return Ok(Response::empty(metadata));
    }

    match kind {
        ResourceKind::Api => {
            // Anything above 308 Permanent Redirect is a client or server error.
            if status.as_u16() > StatusCode::PERMANENT_REDIRECT.as_u16() {
                let envelope: ApiEnvelope<IgnoredAny> = decode(status, body)?;
                metadata.message = envelope.message;
                return Ok(Response::empty(metadata));
            }

            let envelope: ApiEnvelope<T> = decode(status, body)?;
            metadata.message = envelope.message;
            Ok(Response::new(envelope.data.unwrap_or_default(), metadata))
        }
        ResourceKind::Id => {
            if status != StatusCode::OK {
                let error: OAuthError = decode(status, body)?;
                metadata.error = error.error;
                metadata.error_description = error.error_description;
                return Ok(Response::empty(metadata));
            }

            let payload: T = decode(status, body)?;
            Ok(Response::new(payload, metadata))
        }
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| Error::ResponseDecode {
        status,
        raw_response: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}
