//! # Session Cache
//!
//! Remembers which adapter last connected successfully so the next process
//! can ask it to reconnect silently.
//!
//! The persisted value is read once at construction and mirrored in memory.
//! Every storage failure is logged and otherwise behaves like unavailable
//! storage; callers never see it.

use crate::ports::outbound::StorageGate;
use parking_lot::RwLock;
use shared_types::StorageKind;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key under which the adapter name is stored.
pub const ADAPTER_CACHE_KEY: &str = "Web3Auth-cachedAdapter";

pub struct SessionCache {
    storage: Arc<dyn StorageGate>,
    kind: StorageKind,
    cached: RwLock<Option<String>>,
}

impl SessionCache {
    /// Read the remembered adapter from `storage`.
    pub fn load(storage: Arc<dyn StorageGate>, kind: StorageKind) -> Self {
        let cached = if storage.is_available(kind) {
            match storage.get(kind, ADAPTER_CACHE_KEY) {
                Ok(value) => value.filter(|name| !name.is_empty()),
                Err(e) => {
                    warn!(error = %e, storage = %kind, "Failed to read cached adapter");
                    None
                }
            }
        } else {
            debug!(storage = %kind, "Storage unavailable, starting without cached adapter");
            None
        };

        Self {
            storage,
            kind,
            cached: RwLock::new(cached),
        }
    }

    /// Remembered adapter name.
    pub fn get(&self) -> Option<String> {
        self.cached.read().clone()
    }

    /// Remember `adapter`. The mirror only changes if the write went through.
    pub fn set(&self, adapter: &str) {
        if !self.storage.is_available(self.kind) {
            return;
        }
        match self.storage.set(self.kind, ADAPTER_CACHE_KEY, adapter) {
            Ok(()) => {
                *self.cached.write() = Some(adapter.to_string());
                debug!(adapter, "Cached adapter");
            }
            Err(e) => warn!(error = %e, adapter, "Failed to cache adapter"),
        }
    }

    /// Forget the remembered adapter.
    pub fn clear(&self) {
        if !self.storage.is_available(self.kind) {
            return;
        }
        match self.storage.remove(self.kind, ADAPTER_CACHE_KEY) {
            Ok(()) => {
                *self.cached.write() = None;
                debug!("Cleared cached adapter");
            }
            Err(e) => warn!(error = %e, "Failed to clear cached adapter"),
        }
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.kind
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("kind", &self.kind)
            .field("cached", &*self.cached.read())
            .finish()
    }
}
