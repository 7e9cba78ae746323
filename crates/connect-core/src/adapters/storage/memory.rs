use crate::ports::outbound::{StorageError, StorageGate};
use parking_lot::RwLock;
use shared_types::StorageKind;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct Areas {
    session: HashMap<String, String>,
    local: HashMap<String, String>,
    session_available: bool,
    local_available: bool,
}

impl Default for Areas {
    fn default() -> Self {
        Self {
            session: HashMap::new(),
            local: HashMap::new(),
            session_available: true,
            local_available: true,
        }
    }
}

impl Areas {
    fn area(&self, kind: StorageKind) -> &HashMap<String, String> {
        match kind {
            StorageKind::Session => &self.session,
            StorageKind::Local => &self.local,
        }
    }

    fn area_mut(&mut self, kind: StorageKind) -> &mut HashMap<String, String> {
        match kind {
            StorageKind::Session => &mut self.session,
            StorageKind::Local => &mut self.local,
        }
    }

    fn available(&self, kind: StorageKind) -> bool {
        match kind {
            StorageKind::Session => self.session_available,
            StorageKind::Local => self.local_available,
        }
    }
}

/// In-memory storage gate.
///
/// Clones share the same data, so two coordinators built on clones of one
/// instance see each other's writes the way two page loads see the same
/// browser storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<RwLock<Areas>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage where `kind` reports itself unavailable.
    pub fn unavailable(kind: StorageKind) -> Self {
        let storage = Self::new();
        storage.set_available(kind, false);
        storage
    }

    /// Toggle availability of one area. Stored data is kept.
    pub fn set_available(&self, kind: StorageKind, available: bool) {
        let mut areas = self.inner.write();
        match kind {
            StorageKind::Session => areas.session_available = available,
            StorageKind::Local => areas.local_available = available,
        }
    }

    /// Drop everything in the session area.
    pub fn end_session(&self) {
        self.inner.write().session.clear();
    }

    /// Number of keys held in one area.
    pub fn len(&self, kind: StorageKind) -> usize {
        self.inner.read().area(kind).len()
    }

    pub fn is_empty(&self, kind: StorageKind) -> bool {
        self.len(kind) == 0
    }
}

impl StorageGate for InMemoryStorage {
    fn is_available(&self, kind: StorageKind) -> bool {
        self.inner.read().available(kind)
    }

    fn get(&self, kind: StorageKind, key: &str) -> Result<Option<String>, StorageError> {
        let areas = self.inner.read();
        if !areas.available(kind) {
            return Err(StorageError::Unavailable(kind));
        }
        Ok(areas.area(kind).get(key).cloned())
    }

    fn set(&self, kind: StorageKind, key: &str, value: &str) -> Result<(), StorageError> {
        let mut areas = self.inner.write();
        if !areas.available(kind) {
            return Err(StorageError::Unavailable(kind));
        }
        areas.area_mut(kind).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, kind: StorageKind, key: &str) -> Result<(), StorageError> {
        let mut areas = self.inner.write();
        if !areas.available(kind) {
            return Err(StorageError::Unavailable(kind));
        }
        areas.area_mut(kind).remove(key);
        Ok(())
    }
}
