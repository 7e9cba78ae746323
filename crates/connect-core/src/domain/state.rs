//! # Connection State Machine
//!
//! The coordinator's authoritative status plus the handle of whichever
//! adapter owns the session.
//!
//! | Adapter event | Status       | Session owner | Cache   |
//! |---------------|--------------|---------------|---------|
//! | connected(X)  | `Connected`  | X             | persist |
//! | disconnected  | `Ready`      | none          | clear   |
//! | connecting    | `Connecting` | none          | keep    |
//! | errored       | `Errored`    | none          | clear   |
//!
//! The session owner and provider are only ever set together with
//! `Connected`. The last `connected` event wins; nothing arbitrates between
//! adapters racing each other.

use shared_bus::AdapterEvent;
use shared_types::AdapterStatus;

/// What the caller must do with the persisted adapter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheAction {
    /// Remember this adapter for silent reconnection.
    Persist(String),
    /// Forget any remembered adapter.
    Clear,
    /// Leave the cache alone.
    Keep,
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: AdapterStatus,
    pub to: AdapterStatus,
    pub cache: CacheAction,
}

/// Connection state, generic over the provider handle type.
#[derive(Debug, Clone)]
pub struct ConnectionState<P> {
    status: AdapterStatus,
    connected_adapter: Option<String>,
    provider: Option<P>,
}

impl<P> Default for ConnectionState<P> {
    fn default() -> Self {
        Self {
            status: AdapterStatus::NotReady,
            connected_adapter: None,
            provider: None,
        }
    }
}

impl<P: Clone> ConnectionState<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AdapterStatus {
        self.status
    }

    pub fn connected_adapter(&self) -> Option<&str> {
        self.connected_adapter.as_deref()
    }

    pub fn provider(&self) -> Option<P> {
        self.provider.clone()
    }

    /// Name of the session owner, only while `Connected`.
    pub fn session_owner(&self) -> Option<&str> {
        match self.status {
            AdapterStatus::Connected => self.connected_adapter.as_deref(),
            _ => None,
        }
    }

    /// `NotReady -> Ready`, the only transition not driven by an adapter.
    ///
    /// Returns false and leaves the state untouched from any other status.
    pub fn mark_ready(&mut self) -> bool {
        if self.status != AdapterStatus::NotReady {
            return false;
        }
        self.status = AdapterStatus::Ready;
        true
    }

    /// Apply one adapter event.
    ///
    /// `provider` is the handle of the adapter named by a `Connected` event
    /// and is ignored for every other event.
    pub fn apply(&mut self, event: &AdapterEvent, provider: Option<P>) -> Transition {
        let from = self.status;
        let cache = match event {
            AdapterEvent::Connected(data) => {
                self.status = AdapterStatus::Connected;
                self.connected_adapter = Some(data.adapter.clone());
                self.provider = provider;
                CacheAction::Persist(data.adapter.clone())
            }
            AdapterEvent::Disconnected { .. } => {
                self.enter(AdapterStatus::Ready);
                CacheAction::Clear
            }
            AdapterEvent::Connecting { .. } => {
                self.enter(AdapterStatus::Connecting);
                CacheAction::Keep
            }
            AdapterEvent::Errored { .. } => {
                self.enter(AdapterStatus::Errored);
                CacheAction::Clear
            }
        };

        Transition {
            from,
            to: self.status,
            cache,
        }
    }

    fn enter(&mut self, status: AdapterStatus) {
        self.status = status;
        self.connected_adapter = None;
        self.provider = None;
    }
}
