use crate::webhook::event::{
    ChannelFollowEvent, ChannelSubscriptionCreatedEvent, ChannelSubscriptionGiftsEvent,
    ChannelSubscriptionRenewalEvent, ChatMessageEvent, LivestreamStatusUpdatedEvent, WebhookEvent,
};
use crate::webhook::{EventsTracker, WebhookEventHeader};
use crate::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Handles a delivery once it has passed signature verification.
///
/// [`EventDispatcher`] is the bundled implementation. Returning an error makes
/// the webhook endpoint answer `500 Cannot handle event`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, header: &WebhookEventHeader, body: &[u8]) -> Result<()>;
}

/// A callback invoked with the headers and decoded payload of one event type.
pub type EventCallback<E> = Arc<dyn Fn(WebhookEventHeader, E) + Send + Sync>;

/// Deduplicates deliveries, decodes them by event type and hands the payload
/// to the registered callback.
///
/// Callbacks run on tokio's blocking pool and are not awaited: the delivery is
/// acknowledged as soon as the payload decodes. A callback that panics only
/// takes down its own task, and nothing reports its outcome. Event types
/// without a callback are decoded and then dropped.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    tracker: Option<Arc<dyn EventsTracker>>,
    on_chat_message: Option<EventCallback<ChatMessageEvent>>,
    on_channel_follow: Option<EventCallback<ChannelFollowEvent>>,
    on_channel_subscription_renewal: Option<EventCallback<ChannelSubscriptionRenewalEvent>>,
    on_channel_subscription_gifts: Option<EventCallback<ChannelSubscriptionGiftsEvent>>,
    on_channel_subscription_created: Option<EventCallback<ChannelSubscriptionCreatedEvent>>,
    on_livestream_status_updated: Option<EventCallback<LivestreamStatusUpdatedEvent>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips deliveries whose message ID the tracker has seen before.
    pub fn tracker(mut self, tracker: impl EventsTracker + 'static) -> Self {
        self.tracker = Some(Arc::new(tracker));
        self
    }

    /// Same as [`tracker`](Self::tracker) for a tracker shared with other code.
    pub fn shared_tracker(mut self, tracker: Arc<dyn EventsTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn on_chat_message<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChatMessageEvent) + Send + Sync + 'static,
    {
        self.on_chat_message = Some(Arc::new(callback));
        self
    }

    pub fn on_channel_follow<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelFollowEvent) + Send + Sync + 'static,
    {
        self.on_channel_follow = Some(Arc::new(callback));
        self
    }

    pub fn on_channel_subscription_renewal<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelSubscriptionRenewalEvent) + Send + Sync + 'static,
    {
        self.on_channel_subscription_renewal = Some(Arc::new(callback));
        self
    }

    pub fn on_channel_subscription_gifts<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelSubscriptionGiftsEvent) + Send + Sync + 'static,
    {
        self.on_channel_subscription_gifts = Some(Arc::new(callback));
        self
    }

    pub fn on_channel_subscription_created<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, ChannelSubscriptionCreatedEvent) + Send + Sync + 'static,
    {
        self.on_channel_subscription_created = Some(Arc::new(callback));
        self
    }

    pub fn on_livestream_status_updated<F>(mut self, callback: F) -> Self
    where
        F: Fn(WebhookEventHeader, LivestreamStatusUpdatedEvent) + Send + Sync + 'static,
    {
        self.on_livestream_status_updated = Some(Arc::new(callback));
        self
    }

    fn dispatch(&self, header: &WebhookEventHeader, event: WebhookEvent) {
        match event {
            WebhookEvent::ChatMessage(event) => spawn(&self.on_chat_message, header, event),
            WebhookEvent::ChannelFollow(event) => spawn(&self.on_channel_follow, header, event),
            WebhookEvent::ChannelSubscriptionRenewal(event) => {
                spawn(&self.on_channel_subscription_renewal, header, event)
            }
            WebhookEvent::ChannelSubscriptionGifts(event) => {
                spawn(&self.on_channel_subscription_gifts, header, event)
            }
            WebhookEvent::ChannelSubscriptionCreated(event) => {
                spawn(&self.on_channel_subscription_created, header, event)
            }
            WebhookEvent::LivestreamStatusUpdated(event) => {
                spawn(&self.on_livestream_status_updated, header, event)
            }
        }
    }
}

fn spawn<E: Send + 'static>(
    callback: &Option<EventCallback<E>>,
    header: &WebhookEventHeader,
    event: E,
) {
    if let Some(callback) = callback {
        let callback = Arc::clone(callback);
        let header = header.clone();
        // Detached: the JoinHandle is dropped and a panic stays inside the task.
        drop(tokio::task::spawn_blocking(move || callback(header, event)));
    }
}

#[async_trait]
impl EventHandler for EventDispatcher {
    async fn handle(&self, header: &WebhookEventHeader, body: &[u8]) -> Result<()> {
        if let Some(tracker) = &self.tracker {
            if tracker.track(&header.message_id).await? {
                tracing::debug!(
                    message_id = %header.message_id,
                    event_type = %header.event_type,
                    "Skipping duplicate webhook delivery"
                );
                return Ok(());
            }
        }

        let event = WebhookEvent::decode(&header.event_type, body)?;
        self.dispatch(header, event);

        Ok(())
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("tracker", &self.tracker.is_some())
            .field("on_chat_message", &self.on_chat_message.is_some())
            .field("on_channel_follow", &self.on_channel_follow.is_some())
            .field(
                "on_channel_subscription_renewal",
                &self.on_channel_subscription_renewal.is_some(),
            )
            .field(
                "on_channel_subscription_gifts",
                &self.on_channel_subscription_gifts.is_some(),
            )
            .field(
                "on_channel_subscription_created",
                &self.on_channel_subscription_created.is_some(),
            )
            .field(
                "on_livestream_status_updated",
                &self.on_livestream_status_updated.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::MemoryEventsTracker;
    use crate::{BoxError, Error};
    use std::time::Duration;
    use tokio::sync::mpsc;

    const FOLLOW_BODY: &[u8] = br#"{"broadcaster": {"user_id": 1}, "follower": {"user_id": 2}}"#;

    fn header(message_id: &str, event_type: &str) -> WebhookEventHeader {
        WebhookEventHeader {
            message_id: message_id.to_string(),
            event_type: event_type.to_string(),
            ..Default::default()
        }
    }

    struct FailingTracker;

    #[async_trait]
    impl EventsTracker for FailingTracker {
        async fn track(&self, _message_id: &str) -> Result<bool> {
            Err(Error::Tracker(BoxError::from("storage unavailable")))
        }
    }

    #[tokio::test]
    async fn test_callback_receives_header_and_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = EventDispatcher::new().on_channel_follow(move |header, event| {
            tx.send((header, event)).unwrap();
        });

        dispatcher
            .handle(&header("msg-1", "channel.followed"), FOLLOW_BODY)
            .await
            .unwrap();

        let (header, event) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(header.message_id, "msg-1");
        assert_eq!(event.follower.user_id, Some(2));
    }

    #[tokio::test]
    async fn test_unregistered_event_type_is_a_no_op() {
        let dispatcher = EventDispatcher::new().on_chat_message(|_, _| panic!("wrong callback"));

        dispatcher
            .handle(&header("msg-1", "channel.followed"), FOLLOW_BODY)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_is_skipped_without_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = EventDispatcher::new()
            .tracker(MemoryEventsTracker::new())
            .on_channel_follow(move |header, _| {
                tx.send(header.message_id).unwrap();
            });

        let header = header("msg-1", "channel.followed");
        dispatcher.handle(&header, FOLLOW_BODY).await.unwrap();
        dispatcher.handle(&header, FOLLOW_BODY).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), "msg-1");
        drop(dispatcher);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_tracker_runs_before_decoding() {
        let tracker = Arc::new(MemoryEventsTracker::new());
        let dispatcher = EventDispatcher::new().shared_tracker(tracker.clone());

        let header = header("msg-1", "unknown.event");
        assert!(matches!(
            dispatcher.handle(&header, b"{}").await,
            Err(Error::UnexpectedEventType(_))
        ));
        // The ID was recorded, so a redelivery is accepted as a duplicate.
        dispatcher.handle(&header, b"{}").await.unwrap();
        assert_eq!(tracker.len(), 1);
    }

    #[tokio::test]
    async fn test_tracker_failure_is_propagated() {
        let dispatcher = EventDispatcher::new().tracker(FailingTracker);

        assert!(matches!(
            dispatcher
                .handle(&header("msg-1", "channel.followed"), FOLLOW_BODY)
                .await,
            Err(Error::Tracker(_))
        ));
    }

    #[tokio::test]
    async fn test_decode_failure_is_an_error() {
        let dispatcher = EventDispatcher::new();

        assert!(matches!(
            dispatcher
                .handle(&header("msg-1", "chat.message.sent"), b"{\"content\": 1}")
                .await,
            Err(Error::EventDecode { .. })
        ));
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_fail_delivery() {
        let dispatcher = EventDispatcher::new().on_channel_follow(|_, _| panic!("callback failed"));

        dispatcher
            .handle(&header("msg-1", "channel.followed"), FOLLOW_BODY)
            .await
            .unwrap();
        dispatcher
            .handle(&header("msg-2", "channel.followed"), FOLLOW_BODY)
            .await
            .unwrap();
    }
}
