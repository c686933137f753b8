//! In-process invalidation bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`InvalidationBus`] is the only path by which a write made on one screen
//! reaches the others: a mutation publishes an [`InvalidationEvent`] for a
//! key family, and every observer of a matching key re-fetches. It is meant
//! to be shared via `Arc<InvalidationBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use upbreed_core::query_key::{KeyFilter, QueryKey, Resource};

// ---------------------------------------------------------------------------
// InvalidationEvent
// ---------------------------------------------------------------------------

/// "Everything matching `filter` is stale."
///
/// Constructed via [`InvalidationEvent::new`] and enriched with
/// [`with_reason`](InvalidationEvent::with_reason).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidationEvent {
    /// The key family that must be considered stale.
    pub filter: KeyFilter,

    /// Short description of what caused the invalidation, e.g.
    /// `"instructor.deleted"` or `"retry"`.
    pub reason: Option<String>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl InvalidationEvent {
    pub fn new(filter: impl Into<KeyFilter>) -> Self {
        Self {
            filter: filter.into(),
            reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn resource(&self) -> Resource {
        self.filter.resource
    }

    /// Whether `key` is affected by this event.
    pub fn affects(&self, key: &QueryKey) -> bool {
        key.matches(&self.filter)
    }
}

// ---------------------------------------------------------------------------
// InvalidationBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus for [`InvalidationEvent`]s.
///
/// # Usage
///
/// ```rust
/// use upbreed_core::query_key::Resource;
/// use upbreed_events::bus::{InvalidationBus, InvalidationEvent};
///
/// let bus = InvalidationBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(InvalidationEvent::new(Resource::Courses));
/// ```
pub struct InvalidationBus {
    sender: broadcast::Sender<InvalidationEvent>,
}

impl InvalidationBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`; observers treat a lag as
    /// "everything may be stale".
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped; nothing is fetched.
    pub fn publish(&self, event: InvalidationEvent) {
        tracing::debug!(
            filter = %event.filter,
            reason = event.reason.as_deref().unwrap_or(""),
            "Publishing invalidation",
        );
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
