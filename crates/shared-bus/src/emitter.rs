//! # Adapter Event Emitter
//!
//! The sending half handed to each adapter when the coordinator subscribes
//! to it. All emitters share one queue so the coordinator observes every
//! adapter's events in a single total order.

use crate::events::{AdapterEvent, ConnectedEventData};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Receiving half of the adapter event queue.
pub type AdapterEventReceiver = mpsc::UnboundedReceiver<AdapterEvent>;

/// Create the shared queue adapters emit into.
///
/// The returned `EmitterFactory` hands out one emitter per adapter.
#[must_use]
pub fn adapter_event_channel() -> (EmitterFactory, AdapterEventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EmitterFactory { sender }, receiver)
}

/// Hands out emitters bound to adapter names.
#[derive(Clone)]
pub struct EmitterFactory {
    sender: mpsc::UnboundedSender<AdapterEvent>,
}

impl EmitterFactory {
    /// Emitter for the named adapter.
    #[must_use]
    pub fn emitter_for(&self, adapter: impl Into<String>) -> AdapterEventEmitter {
        AdapterEventEmitter {
            adapter: adapter.into(),
            sender: self.sender.clone(),
        }
    }
}

/// Sending handle owned by one adapter.
///
/// Emitting never blocks. Events sent after the coordinator is gone are
/// dropped with a warning.
#[derive(Clone, Debug)]
pub struct AdapterEventEmitter {
    adapter: String,
    sender: mpsc::UnboundedSender<AdapterEvent>,
}

impl AdapterEventEmitter {
    /// Name of the adapter this emitter is bound to.
    #[must_use]
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// Send an arbitrary event. Returns false if nobody is listening.
    pub fn emit(&self, event: AdapterEvent) -> bool {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(()) => {
                debug!(adapter = %self.adapter, kind = %kind, "Adapter event emitted");
                true
            }
            Err(_) => {
                warn!(
                    adapter = %self.adapter,
                    kind = %kind,
                    "Adapter event dropped (coordinator gone)"
                );
                false
            }
        }
    }

    pub fn connecting(&self) -> bool {
        self.emit(AdapterEvent::Connecting {
            adapter: self.adapter.clone(),
        })
    }

    pub fn connected(&self, reconnected: bool) -> bool {
        self.emit(AdapterEvent::Connected(ConnectedEventData {
            adapter: self.adapter.clone(),
            reconnected,
        }))
    }

    pub fn disconnected(&self) -> bool {
        self.emit(AdapterEvent::Disconnected {
            adapter: self.adapter.clone(),
        })
    }

    pub fn errored(&self, message: impl Into<String>) -> bool {
        self.emit(AdapterEvent::Errored {
            adapter: self.adapter.clone(),
            message: message.into(),
        })
    }
}
