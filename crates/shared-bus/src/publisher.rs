//! # Event Publisher
//!
//! Outbound half of the coordinator's lifecycle bus. The coordinator publishes
//! each adapter event here once its own state already reflects it.

use crate::events::{AdapterEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Sink for lifecycle events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Fan `event` out to every listener.
    ///
    /// Returns how many listeners were attached when the event was sent.
    async fn publish(&self, event: AdapterEvent) -> usize;

    /// Events published since the bus was created.
    fn events_published(&self) -> u64;
}

/// Broadcast backed lifecycle bus.
///
/// Listeners attach with [`InMemoryEventBus::subscribe`] or
/// [`InMemoryEventBus::event_stream`] and see only events published after they
/// attached. A listener that falls more than `capacity` events behind skips
/// the overflow.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<AdapterEvent>,
    published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Attach a listener that receives events matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(kinds = ?filter.kinds, adapter = ?filter.adapter, "Listener attached");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Same as [`subscribe`](Self::subscribe), as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Listeners currently attached, whatever their filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: AdapterEvent) -> usize {
        let kind = event.kind();
        let adapter = event.adapter().to_string();
        self.published.fetch_add(1, Ordering::Relaxed);

        // A send error only means nobody is listening.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(kind = %kind, adapter = %adapter, receivers, "Lifecycle event published");
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn disconnected() -> AdapterEvent {
        AdapterEvent::Disconnected {
            adapter: "openlogin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_listeners_still_counts() {
        let bus = InMemoryEventBus::new();

        assert_eq!(bus.publish(disconnected()).await, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_every_listener_receives_regardless_of_filter() {
        let bus = InMemoryEventBus::new();
        let _all = bus.subscribe(EventFilter::all());
        let _also_all = bus.subscribe(EventFilter::all());
        let _connected_only = bus.subscribe(EventFilter::kinds(vec![EventKind::Connected]));

        // Filters apply on the receiving side
        assert_eq!(bus.publish(disconnected()).await, 3);
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[tokio::test]
    async fn test_dropped_listener_detaches() {
        let bus = InMemoryEventBus::new();
        let listener = bus.subscribe(EventFilter::all());
        let stream = bus.event_stream(EventFilter::all());
        assert_eq!(bus.subscriber_count(), 2);

        drop(listener);
        drop(stream);

        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(disconnected()).await, 0);
    }

    #[test]
    fn test_default_bus() {
        let bus = InMemoryEventBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.events_published(), 0);
    }
}
