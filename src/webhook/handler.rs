use crate::webhook::event::{
    ChannelFollowEvent, ChannelSubscriptionCreatedEvent, ChannelSubscriptionGiftsEvent,
    ChannelSubscriptionRenewalEvent, ChatMessageEvent, LivestreamStatusUpdatedEvent,
};
use crate::webhook::{
    verify_event, EventDispatcher, EventHandler, EventsTracker, PublicKey, WebhookEventHeader,
};
use crate::Result;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::sync::Arc;

/// Largest body the axum adapter reads by default.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// The status and plain-text body a webhook delivery is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookReply {
    pub status: StatusCode,
    pub message: &'static str,
}

impl WebhookReply {
    pub const ACCEPTED: WebhookReply = WebhookReply {
        status: StatusCode::OK,
        message: "",
    };
    pub const METHOD_NOT_ALLOWED: WebhookReply = WebhookReply {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "Method is not allowed",
    };
    pub const UNREADABLE_BODY: WebhookReply = WebhookReply {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Cannot read request body",
    };
    pub const VERIFICATION_FAILED: WebhookReply = WebhookReply {
        status: StatusCode::FORBIDDEN,
        message: "Cannot verify event",
    };
    pub const HANDLING_FAILED: WebhookReply = WebhookReply {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Cannot handle event",
    };
}

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Receives Kick webhook deliveries.
///
/// Every delivery goes through the same stages, each of which can end it early:
/// method check (`405`), body read (`500`), signature verification (`403`)
/// and the [`EventHandler`] (`500`). A delivery that passes all of them is
/// answered `200`.
///
/// ```no_run
/// use kick_sdk::webhook::{MemoryEventsTracker, WebhookHandler};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let webhook = WebhookHandler::builder()
///     .tracker(MemoryEventsTracker::new())
///     .on_chat_message(|header, message| {
///         println!("{}: {}", header.message_id, message.content);
///     })
///     .build()?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, webhook.into_router()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WebhookHandler {
    inner: Arc<WebhookHandlerInner>,
}

struct WebhookHandlerInner {
    // None when verification is disabled.
    public_key: Option<PublicKey>,
    events: Box<dyn EventHandler>,
    body_limit: usize,
}

impl WebhookHandler {
    pub fn builder() -> WebhookHandlerBuilder {
        WebhookHandlerBuilder::new()
    }

    /// Runs one delivery whose body has already been read.
    ///
    /// Use this to mount the handler in a server other than axum.
    pub async fn handle(&self, method: &Method, headers: &HeaderMap, body: &[u8]) -> WebhookReply {
        if method != Method::POST {
            tracing::warn!(method = %method, "Rejecting webhook delivery with wrong method");
            return WebhookReply::METHOD_NOT_ALLOWED;
        }

        let header = WebhookEventHeader::from_headers(headers);

        if let Some(public_key) = &self.inner.public_key {
            if let Err(e) = verify_event(&header, public_key, body) {
                tracing::warn!(
                    error = %e,
                    message_id = %header.message_id,
                    "Rejecting webhook delivery that failed verification"
                );
                return WebhookReply::VERIFICATION_FAILED;
            }
        }

        if let Err(e) = self.inner.events.handle(&header, body).await {
            tracing::warn!(
                error = %e,
                message_id = %header.message_id,
                event_type = %header.event_type,
                "Failed to handle webhook delivery"
            );
            return WebhookReply::HANDLING_FAILED;
        }

        tracing::debug!(
            message_id = %header.message_id,
            event_type = %header.event_type,
            "Accepted webhook delivery"
        );
        WebhookReply::ACCEPTED
    }

    /// An axum router serving this handler at `/` for every method.
    ///
    /// Nest it to serve it under another path.
    pub fn into_router(self) -> Router {
        Router::new().route("/", any(serve)).with_state(self)
    }
}

async fn serve(State(webhook): State<WebhookHandler>, request: Request) -> WebhookReply {
    let (parts, body) = request.into_parts();

    // Checked here too so a wrong method is rejected without reading the body.
    if parts.method != Method::POST {
        return webhook.handle(&parts.method, &parts.headers, &[]).await;
    }

    let body = match axum::body::to_bytes(body, webhook.inner.body_limit).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot read webhook request body");
            return WebhookReply::UNREADABLE_BODY;
        }
    };

    webhook.handle(&parts.method, &parts.headers, &body).await
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("verify", &self.inner.public_key.is_some())
            .field("body_limit", &self.inner.body_limit)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WebhookHandler`].
///
/// Verification against [`DEFAULT_PUBLIC_KEY_PEM`](crate::webhook::DEFAULT_PUBLIC_KEY_PEM)
/// is on unless disabled.
pub struct WebhookHandlerBuilder {
    public_key_pem: Option<String>,
    verify: bool,
    dispatcher: EventDispatcher,
    event_handler: Option<Box<dyn EventHandler>>,
    body_limit: usize,
}

impl WebhookHandlerBuilder {
    pub fn new() -> Self {
        Self {
            public_key_pem: None,
            verify: true,
            dispatcher: EventDispatcher::new(),
            event_handler: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Verifies deliveries against this PEM key instead of the built-in one.
    pub fn public_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.public_key_pem = Some(pem.into());
        self
    }

    /// Accepts deliveries without checking their signature.
    pub fn disable_verification(mut self) -> Self {
        self.verify = false;
        self
    }

    pub fn tracker(mut self, tracker: impl EventsTracker + 'static) -> Self {
        self.dispatcher = self.dispatcher.tracker(tracker);
        self
    }

    pub fn shared_tracker(mut self, tracker: Arc<dyn EventsTracker>) -> Self {
        self.dispatcher = self.dispatcher.shared_tracker(tracker);
        self
    }

    /// Replaces the built-in [`EventDispatcher`].
    ///
    /// Trackers and callbacks registered on this builder are then unused.
    pub fn event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.event_handler = Some(Box::new(handler));
        self
    }

    /// Largest body the axum adapter accepts. Larger bodies are answered `500`.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn on_chat_message<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChatMessageEvent) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.on_chat_message(callback);
        self
    }

    pub fn on_channel_follow<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelFollowEvent) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.on_channel_follow(callback);
        self
    }

    pub fn on_channel_subscription_renewal<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelSubscriptionRenewalEvent) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.on_channel_subscription_renewal(callback);
        self
    }

    pub fn on_channel_subscription_gifts<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelSubscriptionGiftsEvent) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.on_channel_subscription_gifts(callback);
        self
    }

    pub fn on_channel_subscription_created<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelSubscriptionCreatedEvent) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.on_channel_subscription_created(callback);
        self
    }

    pub fn on_livestream_status_updated<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, LivestreamStatusUpdatedEvent) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.on_livestream_status_updated(callback);
        self
    }

    /// Builds the handler.
    ///
    /// # Errors
    ///
    /// Fails with the parse errors of [`PublicKey::from_pem`] if verification
    /// is enabled and the configured key is not a PEM RSA public key.
    pub fn build(self) -> Result<WebhookHandler> {
        let public_key = if self.verify {
            let key = match &self.public_key_pem {
                Some(pem) => PublicKey::from_pem(pem)?,
                None => PublicKey::kick_default()?,
            };
            Some(key)
        } else {
            if self.public_key_pem.is_some() {
                tracing::warn!("Public key is ignored when verification is disabled");
            }
            None
        };

        let events = match self.event_handler {
            Some(handler) => handler,
            None => Box::new(self.dispatcher),
        };

        Ok(WebhookHandler {
            inner: Arc::new(WebhookHandlerInner {
                public_key,
                events,
                body_limit: self.body_limit,
            }),
        })
    }
}

impl Default for WebhookHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WebhookHandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandlerBuilder")
            .field("verify", &self.verify)
            .field("custom_public_key", &self.public_key_pem.is_some())
            .field("dispatcher", &self.dispatcher)
            .field("custom_event_handler", &self.event_handler.is_some())
            .field("body_limit", &self.body_limit)
            .finish()
    }
}
