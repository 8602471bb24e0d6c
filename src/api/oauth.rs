use crate::request::RequestOptions;
use crate::values::{Value, Values};
use crate::{Client, EmptyResponse, ResourceKind, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

const TOKEN_PATH: &str = "oauth/token";

/// Permissions an application can ask a user for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OAuthScope {
    #[serde(rename = "user:read")]
    UserRead,
    #[serde(rename = "channel:read")]
    ChannelRead,
    #[serde(rename = "channel:write")]
    ChannelWrite,
    #[serde(rename = "chat:write")]
    ChatWrite,
    #[serde(rename = "streamkey:read")]
    StreamKeyRead,
    #[serde(rename = "events:subscribe")]
    EventsSubscribe,
}

impl OAuthScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OAuthScope::UserRead => "user:read",
            OAuthScope::ChannelRead => "channel:read",
            OAuthScope::ChannelWrite => "channel:write",
            OAuthScope::ChatWrite => "chat:write",
            OAuthScope::StreamKeyRead => "streamkey:read",
            OAuthScope::EventsSubscribe => "events:subscribe",
        }
    }
}

impl fmt::Display for OAuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of token is being revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenHintType {
    AccessToken,
    RefreshToken,
}

impl TokenHintType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenHintType::AccessToken => "access_token",
            TokenHintType::RefreshToken => "refresh_token",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationUrlInput {
    pub response_type: String,
    pub state: String,
    pub scopes: Vec<OAuthScope>,
    pub code_challenge: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeCodeInput {
    pub code: String,
    pub grant_type: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshTokenInput {
    pub refresh_token: String,
    pub grant_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevokeTokenInput {
    pub token: String,
    pub token_hint_type: Option<TokenHintType>,
}

/// OAuth endpoints on the identity host, see [`Client::oauth`].
///
/// These requests authenticate with the client credentials, never with a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct OAuth<'a> {
    client: &'a Client,
}

impl Client {
    pub fn oauth(&self) -> OAuth<'_> {
        OAuth { client: self }
    }
}

impl OAuth<'_> {
    /// The URL of the page where a user logs in and approves the application.
    ///
    /// ```
    /// use kick_sdk::api::{AuthorizationUrlInput, OAuthScope};
    /// use kick_sdk::{Client, Credentials};
    ///
    /// let client = Client::builder()
    ///     .credentials(Credentials::new("client-id", "", "redirect-uri"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let url = client.oauth().authorization_url(&AuthorizationUrlInput {
    ///     response_type: "code".into(),
    ///     state: "state".into(),
    ///     scopes: vec![OAuthScope::UserRead, OAuthScope::ChatWrite],
    ///     code_challenge: "challenge".into(),
    /// }).unwrap();
    ///
    /// assert_eq!(
    ///     url,
    ///     "https://id.kick.com/oauth/authorize?client_id=client-id&code_challenge=challenge&\
    ///      code_challenge_method=S256&redirect_uri=redirect-uri&response_type=code&\
    ///      scope=user%3Aread+chat%3Awrite&state=state"
    /// );
    /// ```
    pub fn authorization_url(&self, input: &AuthorizationUrlInput) -> Result<String> {
        let credentials = self.client.credentials();
        let resource = self.client.resource(ResourceKind::Id, "oauth/authorize");

        let values = Values::new()
            .with("client_id", Value::single(&credentials.client_id))
            .with("response_type", Value::single(&input.response_type))
            .with("redirect_uri", Value::single(&credentials.redirect_uri))
            .with("scope", Value::join(input.scopes.iter().map(OAuthScope::as_str), " "))
            .with("state", Value::single(&input.state))
            .with("code_challenge", Value::single(&input.code_challenge))
            .with("code_challenge_method", Value::single("S256"));

        Ok(format!("{}?{}", resource.url()?, values.encode()))
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, input: &ExchangeCodeInput) -> Result<Response<AccessToken>> {
        let credentials = self.client.credentials();

        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Id, TOKEN_PATH),
            Method::POST,
        )
        .form(
            Values::new()
                .with("code", Value::single(&input.code))
                .with("client_id", Value::single(&credentials.client_id))
                .with("client_secret", Value::single(&credentials.client_secret))
                .with("redirect_uri", Value::single(&credentials.redirect_uri))
                .with("grant_type", Value::single(&input.grant_type))
                .with("code_verifier", Value::single(&input.code_verifier)),
        );

        self.client.execute(options).await
    }

    /// Refreshes both the access and the refresh token.
    pub async fn refresh_token(&self, input: &RefreshTokenInput) -> Result<Response<AccessToken>> {
        let credentials = self.client.credentials();

        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Id, TOKEN_PATH),
            Method::POST,
        )
        .form(
            Values::new()
                .with("refresh_token", Value::single(&input.refresh_token))
                .with("client_id", Value::single(&credentials.client_id))
                .with("client_secret", Value::single(&credentials.client_secret))
                .with("grant_type", Value::single(&input.grant_type)),
        );

        self.client.execute(options).await
    }

    /// Revokes an access or refresh token.
    pub async fn revoke_token(&self, input: &RevokeTokenInput) -> Result<Response<EmptyResponse>> {
        let options = RequestOptions::new(
            self.client.resource(ResourceKind::Id, "oauth/revoke"),
            Method::POST,
        )
        .query(
            Values::new()
                .with("token", Value::single(&input.token))
                .with(
                    "token_hint_type",
                    Value::optional(input.token_hint_type.map(|hint| hint.as_str())),
                ),
        );

        self.client.execute(options).await
    }
}
