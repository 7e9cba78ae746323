//! # Lifecycle Events
//!
//! Typed events adapters emit and the coordinator re-emits after updating
//! its own state. The same shape flows on both sides.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload of a `connected` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedEventData {
    /// Name of the adapter that now owns the session.
    pub adapter: String,
    /// True when the session was restored without user interaction.
    #[serde(default)]
    pub reconnected: bool,
}

/// All lifecycle events.
///
/// Every variant carries the name of the adapter it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AdapterEvent {
    /// A connection attempt started.
    Connecting {
        adapter: String,
    },

    /// A session was established.
    Connected(ConnectedEventData),

    /// The session ended.
    Disconnected {
        adapter: String,
    },

    /// The adapter failed. `message` is for diagnostics only.
    Errored {
        adapter: String,
        message: String,
    },
}

impl AdapterEvent {
    /// Kind of this event, used for filtering.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connecting { .. } => EventKind::Connecting,
            Self::Connected(_) => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::Errored { .. } => EventKind::Errored,
        }
    }

    /// Adapter name carried by the event.
    pub fn adapter(&self) -> &str {
        match self {
            Self::Connecting { adapter }
            | Self::Disconnected { adapter }
            | Self::Errored { adapter, .. } => adapter,
            Self::Connected(data) => &data.adapter,
        }
    }
}

/// Event kinds for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connecting,
    Connected,
    Disconnected,
    Errored,
}

impl EventKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Connecting,
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Errored,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to receive. Empty means every kind.
    pub kinds: Vec<EventKind>,
    /// Only events concerning this adapter, if set.
    pub adapter: Option<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds,
            adapter: None,
        }
    }

    /// Restrict the filter to one adapter.
    #[must_use]
    pub fn for_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &AdapterEvent) -> bool {
        let kind_ok = self.kinds.is_empty() || self.kinds.contains(&event.kind());
        let adapter_ok = self
            .adapter
            .as_deref()
            .map_or(true, |name| name == event.adapter());
        kind_ok && adapter_ok
    }
}
