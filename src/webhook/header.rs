use http::HeaderMap;

pub const MESSAGE_ID_HEADER: &str = "Kick-Event-Message-Id";
pub const SUBSCRIPTION_ID_HEADER: &str = "Kick-Event-Subscription-Id";
pub const SIGNATURE_HEADER: &str = "Kick-Event-Signature";
pub const MESSAGE_TIMESTAMP_HEADER: &str = "Kick-Event-Message-Timestamp";
pub const EVENT_TYPE_HEADER: &str = "Kick-Event-Type";
pub const EVENT_VERSION_HEADER: &str = "Kick-Event-Version";

/// The `Kick-Event-*` headers of a webhook delivery, copied verbatim.
///
/// Missing or non UTF-8 headers become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookEventHeader {
    pub message_id: String,
    pub subscription_id: String,
    pub signature: String,
    pub message_timestamp: String,
    pub event_type: String,
    pub event_version: String,
}

impl WebhookEventHeader {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            message_id: get(MESSAGE_ID_HEADER),
            subscription_id: get(SUBSCRIPTION_ID_HEADER),
            signature: get(SIGNATURE_HEADER),
            message_timestamp: get(MESSAGE_TIMESTAMP_HEADER),
            event_type: get(EVENT_TYPE_HEADER),
            event_version: get(EVENT_VERSION_HEADER),
        }
    }
}
