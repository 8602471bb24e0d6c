//! The HTTP transport a [`Client`](crate::Client) sends its requests through.

use crate::error::BoxError;
use async_trait::async_trait;

/// Anything that can send a built request and hand back the raw response.
///
/// `reqwest::Client` implements this directly. Implement it yourself to add a
/// proxy, custom timeouts or a test double.
///
/// ```
/// use async_trait::async_trait;
/// use kick_sdk::{transport::HttpTransport, BoxError};
///
/// struct AlwaysNoContent;
///
/// #[async_trait]
/// impl HttpTransport for AlwaysNoContent {
///     async fn send(&self, _request: reqwest::Request) -> Result<reqwest::Response, BoxError> {
///         let response = http::Response::builder().status(204).body(Vec::<u8>::new())?;
///         Ok(response.into())
///     }
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, BoxError>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, BoxError> {
        Ok(self.execute(request).await?)
    }
}
