use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Remembers which webhook deliveries were already handled.
///
/// Kick delivers at least once, so the same message ID can arrive more than
/// once. Implement this trait to back deduplication with shared storage or to
/// bound its memory use.
#[async_trait]
pub trait EventsTracker: Send + Sync {
    /// Records `message_id` and returns `true` if it had been recorded before.
    ///
    /// Checking and recording must happen atomically: of two concurrent calls
    /// with the same ID, exactly one may return `false`.
    async fn track(&self, message_id: &str) -> Result<bool>;
}

/// An [`EventsTracker`] that keeps every seen message ID in memory.
///
/// The set is never pruned and lives as long as the tracker.
#[derive(Debug, Default)]
pub struct MemoryEventsTracker {
    seen: Mutex<HashSet<String>>,
}

impl MemoryEventsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

#[async_trait]
impl EventsTracker for MemoryEventsTracker {
    async fn track(&self, message_id: &str) -> Result<bool> {
        Ok(!self.seen.lock().insert(message_id.to_string()))
    }
}
