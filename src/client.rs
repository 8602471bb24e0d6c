//! The Kick API client.
//!
//! The [`Client`] type is the main entry point for calling Kick endpoints.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::config::{AccessTokens, Credentials};
use crate::resource::{BaseUrls, Resource, ResourceKind};
use crate::transport::HttpTransport;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A client for the Kick public API.
///
/// Cloning is cheap: clones share the transport and configuration. Access
/// tokens are immutable per client value; [`Client::with_access_tokens`]
/// returns a new client instead of changing this one, so token rotation never
/// races with requests already in flight.
///
/// # Examples
///
/// ```no_run
/// use kick_sdk::{AccessTokens, Client, Credentials};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), kick_sdk::Error> {
/// let client = Client::builder()
///     .credentials(Credentials::new("client-id", "client-secret", "http://localhost/callback"))
///     .access_tokens(AccessTokens::user("user-token"))
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let channels = client.channels().get_by_broadcaster_ids([123]).await?;
/// for channel in channels.payload {
///     println!("{}: {}", channel.slug, channel.stream_title);
/// }
///
/// let refreshed = client.with_access_tokens(AccessTokens::user("new-user-token"));
/// let me = refreshed.users().inspect_token().await?;
/// println!("active: {}", me.payload.active);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    tokens: Arc<AccessTokens>,
}

struct ClientInner {
    transport: Box<dyn HttpTransport>,
    base_urls: BaseUrls,
    credentials: Credentials,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns a client that shares this client's transport and credentials
    /// but sends `tokens` with user-authenticated requests.
    ///
    /// This client is left untouched.
    pub fn with_access_tokens(&self, tokens: AccessTokens) -> Client {
        Client {
            inner: Arc::clone(&self.inner),
            tokens: Arc::new(tokens),
        }
    }

    /// The access tokens this client sends.
    pub fn access_tokens(&self) -> &AccessTokens {
        &self.tokens
    }

    /// The application credentials this client was built with.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn base_urls(&self) -> &BaseUrls {
        &self.inner.base_urls
    }

    /// Locates `path` on the surface of the given kind, using this client's base URLs.
    pub fn resource(&self, kind: ResourceKind, path: impl Into<String>) -> Resource {
        Resource::new(kind, self.inner.base_urls.for_kind(kind).clone(), path)
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.inner.transport.as_ref()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_urls", &self.inner.base_urls)
            .field("credentials", &self.inner.credentials)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```
/// use kick_sdk::{ClientBuilder, Credentials};
///
/// # fn example() -> Result<(), kick_sdk::Error> {
/// // Point both surfaces at a local mock server.
/// let client = ClientBuilder::new()
///     .api_base_url("http://127.0.0.1:8080")?
///     .id_base_url("http://127.0.0.1:8080")?
///     .credentials(Credentials::new("client-id", "secret", "http://localhost/cb"))
///     .build()?;
/// assert_eq!(client.base_urls().api.as_str(), "http://127.0.0.1:8080/");
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_urls: BaseUrls,
    credentials: Credentials,
    tokens: AccessTokens,
    transport: Option<Box<dyn HttpTransport>>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` pointing at the production Kick hosts.
    pub fn new() -> Self {
        Self {
            base_urls: BaseUrls::default(),
            credentials: Credentials::default(),
            tokens: AccessTokens::default(),
            transport: None,
            timeout: None,
        }
    }

    /// Replaces both base URLs.
    pub fn base_urls(mut self, base_urls: BaseUrls) -> Self {
        self.base_urls = base_urls;
        self
    }

    /// Sets the base URL of the public API.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn api_base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_urls.api = Url::parse(url.as_ref())?;
        Ok(self)
    }

    /// Sets the base URL of the identity (OAuth) host.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn id_base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_urls.id = Url::parse(url.as_ref())?;
        Ok(self)
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn access_tokens(mut self, tokens: AccessTokens) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sends requests through a custom transport instead of a default `reqwest::Client`.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Sets the request timeout of the default transport.
    ///
    /// Ignored when a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => {
                if self.timeout.is_some() {
                    tracing::warn!("Timeout is ignored when a custom transport is configured");
                }
                transport
            }
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let http_client = builder.build().map_err(|e| {
                    Error::Configuration(format!("Failed to build HTTP client: {}", e))
                })?;
                Box::new(http_client)
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                base_urls: self.base_urls,
                credentials: self.credentials,
            }),
            tokens: Arc::new(self.tokens),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
