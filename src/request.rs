//! The generic request pipeline: build, send, parse.

use crate::resource::Resource;
use crate::response::{parse_response, Response};
use crate::values::Values;
use crate::{Client, Error, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Instant;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// How a request authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthType {
    /// No `Authorization` header.
    #[default]
    None,
    /// `Authorization: Bearer <user access token>`, read when the request is built.
    UserToken,
}

/// The body attached to a request. Exactly one representation is ever sent.
#[derive(Debug, Clone)]
pub enum RequestBody<B> {
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Values),
    /// Serialized and sent as `application/json`.
    Json(B),
}

/// Everything needed to build one request.
///
/// `B` is the JSON body type; it stays `()` for requests without a JSON body.
///
/// ```
/// use kick_sdk::request::{AuthType, RequestOptions};
/// use kick_sdk::values::{Value, Values};
/// use kick_sdk::{Client, ResourceKind};
/// use http::Method;
///
/// let client = Client::builder().build().unwrap();
/// let options = RequestOptions::new(
///     client.resource(ResourceKind::Api, "public/v1/users"),
///     Method::GET,
/// )
/// .auth(AuthType::UserToken)
/// .query(Values::new().with("id", Value::many(["1", "2"])));
///
/// let request = client.build_request(&options).unwrap();
/// assert_eq!(request.url().as_str(), "https://api.kick.com/public/v1/users?id=1&id=2");
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions<B = ()> {
    pub resource: Resource,
    pub method: Method,
    pub auth: AuthType,
    pub query: Option<Values>,
    pub body: Option<RequestBody<B>>,
}

impl RequestOptions {
    pub fn new(resource: Resource, method: Method) -> Self {
        Self {
            resource,
            method,
            auth: AuthType::None,
            query: None,
            body: None,
        }
    }
}

impl<B> RequestOptions<B> {
    pub fn auth(mut self, auth: AuthType) -> Self {
        self.auth = auth;
        self
    }

    /// Appends `values` to the URL as a query string.
    pub fn query(mut self, values: Values) -> Self {
        self.query = Some(values);
        self
    }

    /// Sends `values` as a form body, replacing any other body.
    pub fn form(mut self, values: Values) -> Self {
        self.body = Some(RequestBody::Form(values));
        self
    }

    /// Sends `body` as JSON, replacing any other body.
    pub fn json<J>(self, body: J) -> RequestOptions<J> {
        RequestOptions {
            resource: self.resource,
            method: self.method,
            auth: self.auth,
            query: self.query,
            body: Some(RequestBody::Json(body)),
        }
    }
}

impl Client {
    /// Builds the HTTP request described by `options` without sending it.
    ///
    /// # Errors
    ///
    /// * [`Error::RequestConstruction`] if the URL or the authorization header is invalid.
    /// * [`Error::BodyEncoding`] if the JSON body cannot be serialized.
    pub fn build_request<B>(&self, options: &RequestOptions<B>) -> Result<reqwest::Request>
    where
        B: Serialize,
    {
        let mut url = options.resource.url()?;

        if let Some(query) = &options.query {
            let encoded = query.encode();
            if !encoded.is_empty() {
                url.set_query(Some(&encoded));
            }
        }

        let mut request = reqwest::Request::new(options.method.clone(), url);

        if options.auth == AuthType::UserToken {
            let bearer = format!("Bearer {}", self.access_tokens().user_access_token);
            let mut value = HeaderValue::from_str(&bearer).map_err(|e| {
                Error::RequestConstruction(format!("Invalid authorization header: {}", e))
            })?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        if let Some(body) = &options.body {
            let (content_type, bytes) = match body {
                RequestBody::Form(values) => (FORM_CONTENT_TYPE, values.encode().into_bytes()),
                RequestBody::Json(value) => (
                    JSON_CONTENT_TYPE,
                    serde_json::to_vec(value).map_err(Error::BodyEncoding)?,
                ),
            };
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            *request.body_mut() = Some(bytes.into());
        }

        Ok(request)
    }

    /// Builds, sends and parses a request.
    ///
    /// This is what every endpoint method calls. Use it directly for endpoints
    /// this crate does not wrap yet.
    ///
    /// # Errors
    ///
    /// Build errors (see [`Client::build_request`]), [`Error::Transport`] if
    /// the request could not be sent or its body read, and
    /// [`Error::ResponseDecode`] if the body has an unexpected shape. Provider
    /// failures are returned as `Ok` with populated metadata.
    pub async fn execute<T, B>(&self, options: RequestOptions<B>) -> Result<Response<T>>
    where
        T: DeserializeOwned + Default,
        B: Serialize,
    {
        let kind = options.resource.kind();
        let request = self.build_request(&options)?;
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!(
            method = %method,
            url = %url,
            "Executing Kick request"
        );

        let start_time = Instant::now();
        let response = self.transport().send(request).await.map_err(|e| {
            tracing::warn!(
                error = %e,
                method = %method,
                url = %url,
                "Request failed"
            );
            Error::Transport(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();

        let body = if status == StatusCode::NO_CONTENT {
            Default::default()
        } else {
            response
                .bytes()
                .await
                .map_err(|e| Error::Transport(Box::new(e)))?
        };
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            url = %url,
            "Received Kick response"
        );

        let mut parsed = parse_response::<T>(kind, status, headers, &body)?;
        parsed.metadata.latency = latency;

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                message = %parsed.metadata.message,
                error = %parsed.metadata.error,
                "Kick reported a failure"
            );
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Value;
    use crate::{AccessTokens, ResourceKind};
    use serde::ser::Error as _;

    fn client() -> Client {
        Client::builder()
            .access_tokens(AccessTokens::user("user-token"))
            .build()
            .unwrap()
    }

    fn body_text(request: &reqwest::Request) -> String {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_build_sets_bearer_only_for_user_token() {
        let client = client();
        let resource = client.resource(ResourceKind::Api, "public/v1/token/introspect");

        let options = RequestOptions::new(resource.clone(), Method::POST).auth(AuthType::UserToken);
        let request = client.build_request(&options).unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer user-token");

        let request = client
            .build_request(&RequestOptions::new(resource, Method::POST))
            .unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_build_reads_token_of_the_rotated_client() {
        let client = client();
        let rotated = client.with_access_tokens(AccessTokens::user("rotated"));
        let options = RequestOptions::new(client.resource(ResourceKind::Api, "x"), Method::GET)
            .auth(AuthType::UserToken);

        assert_eq!(
            rotated.build_request(&options).unwrap().headers()[AUTHORIZATION],
            "Bearer rotated"
        );
        assert_eq!(
            client.build_request(&options).unwrap().headers()[AUTHORIZATION],
            "Bearer user-token"
        );
    }

    #[test]
    fn test_build_json_body() {
        #[derive(Serialize)]
        struct Body {
            data: &'static str,
        }

        let client = client();
        let resource = client.resource(ResourceKind::Api, "public/v1/chat");
        let options = RequestOptions::new(resource, Method::POST).json(Body { data: "test" });
        let request = client.build_request(&options).unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(body_text(&request), r#"{"data":"test"}"#);
    }

    #[test]
    fn test_build_form_body() {
        let client = client();
        let resource = client.resource(ResourceKind::Id, "oauth/token");
        let options = RequestOptions::new(resource, Method::POST).form(
            Values::new()
                .with("grant_type", Value::single("refresh_token"))
                .with("refresh_token", Value::single("r t")),
        );
        let request = client.build_request(&options).unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], FORM_CONTENT_TYPE);
        assert_eq!(body_text(&request), "grant_type=refresh_token&refresh_token=r+t");
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_last_body_wins() {
        let client = client();
        let resource = client.resource(ResourceKind::Id, "oauth/token");
        let options = RequestOptions::new(resource, Method::POST)
            .json(serde_json::json!({"a": 1}))
            .form(Values::new().with("a", Value::single("1")));
        let request = client.build_request(&options).unwrap();

        assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(request.headers()[CONTENT_TYPE], FORM_CONTENT_TYPE);
    }

    #[test]
    fn test_build_without_body_sets_no_content_type() {
        let client = client();
        let resource = client.resource(ResourceKind::Api, "public/v1/users");
        let options = RequestOptions::new(resource, Method::GET)
            .query(Values::new().with("id", Value::optional(None::<String>)));
        let request = client.build_request(&options).unwrap();

        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
        assert_eq!(request.url().as_str(), "https://api.kick.com/public/v1/users");
    }

    #[test]
    fn test_unserializable_body_is_a_body_encoding_error() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                Err(S::Error::custom("cannot serialize"))
            }
        }

        let client = client();
        let resource = client.resource(ResourceKind::Api, "public/v1/chat");
        let options = RequestOptions::new(resource, Method::POST).json(Unserializable);

        assert!(matches!(client.build_request(&options), Err(Error::BodyEncoding(_))));
    }

    #[test]
    fn test_token_with_newline_is_a_construction_error() {
        let client = client().with_access_tokens(AccessTokens::user("bad\ntoken"));
        let options = RequestOptions::new(client.resource(ResourceKind::Api, "x"), Method::GET)
            .auth(AuthType::UserToken);

        assert!(matches!(
            client.build_request(&options),
            Err(Error::RequestConstruction(_))
        ));
    }
}
