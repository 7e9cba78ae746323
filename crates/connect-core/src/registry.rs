//! # Adapter Registry
//!
//! Name keyed map of the adapters a coordinator drives.
//!
//! Registration checks run in a fixed order and the first failure wins:
//!
//! 1. coordinator status (`Connecting`, `Connected`, then anything past `NotReady`)
//! 2. `openlogin` / `customAuth` mutual exclusivity
//! 3. duplicate name
//! 4. namespace compatibility (declared namespace, then the namespace a
//!    multi-chain adapter has committed to)

use crate::domain::{CoordinatorError, CoordinatorResult};
use crate::ports::outbound::SharedAdapter;
use shared_types::{adapter_names, AdapterNamespace, AdapterStatus, ChainNamespace};
use std::collections::HashMap;

/// Adapter families that cannot be registered together.
const MUTUALLY_EXCLUSIVE: [(&str, &str); 1] =
    [(adapter_names::OPENLOGIN, adapter_names::CUSTOM_AUTH)];

pub struct AdapterRegistry {
    namespace: ChainNamespace,
    adapters: HashMap<String, SharedAdapter>,
}

impl AdapterRegistry {
    pub fn new(namespace: ChainNamespace) -> Self {
        Self {
            namespace,
            adapters: HashMap::new(),
        }
    }

    /// Validate and store `adapter` given the coordinator's current status.
    pub fn register(
        &mut self,
        adapter: SharedAdapter,
        status: AdapterStatus,
    ) -> CoordinatorResult<()> {
        match status {
            AdapterStatus::Connecting => return Err(CoordinatorError::AlreadyConnecting),
            AdapterStatus::Connected => return Err(CoordinatorError::AlreadyConnected),
            AdapterStatus::NotReady => {}
            _ => return Err(CoordinatorError::AlreadyInitialized),
        }

        let name = adapter.name().to_string();

        if let Some(existing) = self.exclusive_counterpart(&name) {
            return Err(CoordinatorError::MutualExclusivityViolation {
                existing: existing.to_string(),
                incoming: name,
            });
        }

        if self.adapters.contains_key(&name) {
            return Err(CoordinatorError::DuplicateAdapter(name));
        }

        self.check_namespace(&adapter)?;

        self.adapters.insert(name, adapter);
        Ok(())
    }

    fn exclusive_counterpart(&self, name: &str) -> Option<&'static str> {
        MUTUALLY_EXCLUSIVE.iter().find_map(|&(a, b)| {
            if name == a && self.adapters.contains_key(b) {
                Some(b)
            } else if name == b && self.adapters.contains_key(a) {
                Some(a)
            } else {
                None
            }
        })
    }

    fn check_namespace(&self, adapter: &SharedAdapter) -> CoordinatorResult<()> {
        let incompatible = |adapter_namespace: String| CoordinatorError::IncompatibleNamespace {
            adapter: adapter.name().to_string(),
            adapter_namespace,
            expected: self.namespace,
        };

        match adapter.adapter_namespace() {
            AdapterNamespace::Chain(ns) if ns != self.namespace => {
                Err(incompatible(ns.to_string()))
            }
            AdapterNamespace::Chain(_) => Ok(()),
            AdapterNamespace::Multichain => match adapter.current_chain_namespace() {
                Some(ns) if ns != self.namespace => Err(incompatible(ns.to_string())),
                _ => Ok(()),
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedAdapter> {
        self.adapters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Handles to every registered adapter, so callers can release the lock
    /// before awaiting on them.
    pub fn snapshot(&self) -> Vec<SharedAdapter> {
        self.adapters.values().cloned().collect()
    }

    pub fn namespace(&self) -> ChainNamespace {
        self.namespace
    }
}
