//! Application credentials and access tokens held by a [`Client`](crate::Client).

use serde::Deserialize;
use std::fmt;

/// OAuth application credentials, fixed for the lifetime of a client.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Bearer tokens sent with user-authenticated requests.
///
/// Tokens are never changed in place on a shared client; use
/// [`Client::with_access_tokens`](crate::Client::with_access_tokens) to get a
/// client carrying new ones.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccessTokens {
    pub user_access_token: String,
}

impl AccessTokens {
    pub fn user(token: impl Into<String>) -> Self {
        Self {
            user_access_token: token.into(),
        }
    }
}

impl fmt::Debug for AccessTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokens")
            .field("user_access_token", &redact(&self.user_access_token))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}
