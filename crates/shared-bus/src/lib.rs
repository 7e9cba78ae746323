//! # Shared Bus - Lifecycle Event Plumbing
//!
//! Two channels carry connection lifecycle events:
//!
//! ```text
//! ┌───────────┐  emit()                              subscribe()  ┌──────────┐
//! │ Adapter A │ ───────┐                                   ┌───── │ Listener │
//! └───────────┘        ▼                                   │      └──────────┘
//!              ┌───────────────┐   apply   ┌─────────────────┐
//!              │ mpsc (1 queue)│ ────────→ │ InMemoryEventBus│
//!              └───────────────┘ coordinator└─────────────────┘
//! ┌───────────┐        ▲                                   │      ┌──────────┐
//! │ Adapter B │ ───────┘                                   └───── │ Listener │
//! └───────────┘                                                   └──────────┘
//! ```
//!
//! - **Inbound:** every adapter gets an `AdapterEventEmitter`; all emitters
//!   feed one unbounded queue drained by the coordinator.
//! - **Outbound:** the coordinator re-publishes each event on a broadcast
//!   bus after its own state reflects it.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod emitter;
pub mod events;
pub mod publisher;
pub mod subscriber;

pub use emitter::{adapter_event_channel, AdapterEventEmitter, AdapterEventReceiver, EmitterFactory};
pub use events::{AdapterEvent, ConnectedEventData, EventFilter, EventKind};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
