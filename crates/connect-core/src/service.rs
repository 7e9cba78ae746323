//! # Connection Coordinator
//!
//! The application service implementing [`CoordinatorApi`].
//!
//! ## Architecture
//!
//! ```text
//! adapter A ──emitter──┐
//! adapter B ──emitter──┼──→ mpsc queue ──→ pump task ──→ ConnectionState::apply
//! adapter C ──emitter──┘                        │              │
//!                                               │        SessionCache
//!                                               ↓
//!                                        InMemoryEventBus ──→ subscribers
//! ```
//!
//! The pump is the only writer of connection state. It applies an event and
//! updates the cache under the state lock, and only then republishes the
//! event. A façade query never observes a status whose cache update is still
//! pending, and a subscriber that queries on receipt sees the new state.

use crate::config::{ConfigError, CoreOptions};
use crate::domain::{CacheAction, ConnectionState, CoordinatorError, CoordinatorResult};
use crate::ports::inbound::CoordinatorApi;
use crate::ports::outbound::{
    AdapterInitOptions, LoginParams, SharedAdapter, SharedProvider, StorageGate,
};
use crate::registry::AdapterRegistry;
use crate::session_cache::SessionCache;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use shared_bus::{
    adapter_event_channel, AdapterEvent, AdapterEventReceiver, EmitterFactory, EventFilter,
    EventPublisher, EventStream, InMemoryEventBus, Subscription,
};
use shared_types::{AdapterStatus, UserInfo};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Coordinates a set of wallet adapters behind one connection lifecycle.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    options: CoreOptions,
    // Lock order: registry, then state, then the cache mirror
    registry: RwLock<AdapterRegistry>,
    state: Mutex<ConnectionState<SharedProvider>>,
    cache: SessionCache,
    bus: InMemoryEventBus,
    emitters: EmitterFactory,
    receiver: Mutex<Option<AdapterEventReceiver>>,
}

impl Coordinator {
    /// Create a coordinator. The remembered adapter is read from `storage`
    /// here and never again.
    ///
    /// # Errors
    ///
    /// Options that fail [`CoreOptions::validate`], e.g. namespace `other`
    /// without an explicit chain id and RPC target.
    pub fn new(
        options: CoreOptions,
        storage: Arc<dyn StorageGate>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        let cache = SessionCache::load(storage, options.storage_kind);
        let (emitters, receiver) = adapter_event_channel();

        info!(
            namespace = %options.chain_namespace,
            cached_adapter = ?cache.get(),
            "Coordinator created"
        );

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                registry: RwLock::new(AdapterRegistry::new(options.chain_namespace)),
                state: Mutex::new(ConnectionState::new()),
                cache,
                bus: InMemoryEventBus::new(),
                emitters,
                receiver: Mutex::new(Some(receiver)),
                options,
            }),
        })
    }

    /// Register an adapter. Only allowed before [`CoordinatorApi::init`].
    ///
    /// Returns `self` so registrations can be chained with `?`.
    pub fn register(&self, adapter: SharedAdapter) -> CoordinatorResult<&Self> {
        let name = adapter.name().to_string();
        let mut registry = self.inner.registry.write();
        let status = self.inner.state.lock().status();

        registry.register(adapter, status).inspect_err(|e| {
            warn!(adapter = %name, code = e.code(), error = %e, "Adapter registration rejected");
        })?;

        info!(adapter = %name, total = registry.len(), "Adapter registered");
        Ok(self)
    }

    pub fn adapter(&self, name: &str) -> Option<SharedAdapter> {
        self.inner.registry.read().get(name)
    }

    /// Registered adapter names, sorted.
    pub fn adapter_names(&self) -> Vec<String> {
        self.inner.registry.read().names()
    }

    pub fn adapter_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    pub fn options(&self) -> &CoreOptions {
        &self.inner.options
    }

    /// Coordinator level events matching `filter`, published after the
    /// state change they describe has been applied.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.inner.bus.subscribe(filter)
    }

    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.inner.bus.event_stream(filter)
    }

    /// Number of events republished so far.
    pub fn events_published(&self) -> u64 {
        self.inner.bus.events_published()
    }

    fn spawn_pump(&self) {
        let Some(receiver) = self.inner.receiver.lock().take() else {
            return;
        };
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(run_pump(weak, receiver));
    }

    /// Adapter owning the current session.
    fn session_adapter(&self) -> CoordinatorResult<SharedAdapter> {
        let registry = self.inner.registry.read();
        let state = self.inner.state.lock();
        state
            .session_owner()
            .and_then(|name| registry.get(name))
            .ok_or(CoordinatorError::NotConnected)
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let adapters = self.adapter_names();
        let state = self.inner.state.lock();
        f.debug_struct("Coordinator")
            .field("options", &self.inner.options)
            .field("status", &state.status())
            .field("connected_adapter", &state.session_owner())
            .field("adapters", &adapters)
            .finish_non_exhaustive()
    }
}

fn check_init_requirements(status: AdapterStatus) -> CoordinatorResult<()> {
    match status {
        AdapterStatus::NotReady => Ok(()),
        AdapterStatus::Connecting => Err(CoordinatorError::AlreadyConnecting),
        AdapterStatus::Connected => Err(CoordinatorError::AlreadyConnected),
        _ => Err(CoordinatorError::AlreadyInitialized),
    }
}

/// Drain adapter events until every emitter is gone or the coordinator is
/// dropped.
async fn run_pump(inner: Weak<CoordinatorInner>, mut receiver: AdapterEventReceiver) {
    while let Some(event) = receiver.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if let Some(event) = inner.handle_adapter_event(event) {
            inner.bus.publish(event).await;
        }
    }
    debug!("Adapter event pump stopped");
}

impl CoordinatorInner {
    /// Apply one adapter event. Returns the event to republish, or `None`
    /// if it was ignored.
    fn handle_adapter_event(&self, event: AdapterEvent) -> Option<AdapterEvent> {
        let provider = match &event {
            AdapterEvent::Connected(data) => {
                let Some(adapter) = self.registry.read().get(&data.adapter) else {
                    warn!(adapter = %data.adapter, "Ignoring connected event from unknown adapter");
                    return None;
                };
                let provider = adapter.provider();
                if provider.is_none() {
                    warn!(adapter = %data.adapter, "Adapter connected without a provider");
                }
                provider
            }
            _ => None,
        };

        let mut state = self.state.lock();
        let transition = state.apply(&event, provider);
        match &transition.cache {
            CacheAction::Persist(name) => self.cache.set(name),
            CacheAction::Clear => self.cache.clear(),
            CacheAction::Keep => {}
        }
        drop(state);

        debug!(
            adapter = %event.adapter(),
            event = %event.kind(),
            from = %transition.from,
            to = %transition.to,
            "Connection state changed"
        );

        if let AdapterEvent::Errored { adapter, message } = &event {
            warn!(adapter = %adapter, message = %message, "Adapter errored");
        }

        Some(event)
    }
}

#[async_trait]
impl CoordinatorApi for Coordinator {
    async fn init(&self) -> CoordinatorResult<()> {
        let adapters = {
            let registry = self.inner.registry.read();
            let mut state = self.inner.state.lock();
            check_init_requirements(state.status())?;
            state.mark_ready();
            registry.snapshot()
        };

        self.spawn_pump();

        let cached = self.inner.cache.get();
        let default_chain = self.inner.options.resolved_chain_config();

        let inits: Vec<_> = adapters
            .iter()
            .map(|adapter| {
                adapter.subscribe(self.inner.emitters.emitter_for(adapter.name()));
                if adapter.chain_config().is_none() {
                    adapter.set_chain_config(default_chain.clone());
                }
                let options = AdapterInitOptions {
                    auto_connect: cached.as_deref() == Some(adapter.name()),
                };
                async move { (adapter.name(), adapter.init(options).await) }
            })
            .collect();

        info!(adapters = adapters.len(), cached_adapter = ?cached, "Initializing adapters");

        for (name, result) in join_all(inits).await {
            if let Err(e) = result {
                warn!(
                    adapter = %name,
                    code = e.code(),
                    error = %e,
                    "Adapter initialization failed"
                );
            }
        }

        Ok(())
    }

    async fn connect_to(&self, adapter: &str, params: LoginParams) -> CoordinatorResult<()> {
        let target = self
            .adapter(adapter)
            .ok_or_else(|| CoordinatorError::AdapterNotFound(adapter.to_string()))?;

        debug!(adapter, "Connecting");
        target
            .connect(params)
            .await
            .map_err(|source| CoordinatorError::Adapter {
                adapter: adapter.to_string(),
                source,
            })
    }

    async fn logout(&self) -> CoordinatorResult<()> {
        let adapter = self.session_adapter()?;
        debug!(adapter = %adapter.name(), "Logging out");
        adapter
            .disconnect()
            .await
            .map_err(|source| CoordinatorError::Adapter {
                adapter: adapter.name().to_string(),
                source,
            })
    }

    async fn get_user_info(&self) -> CoordinatorResult<UserInfo> {
        let adapter = self.session_adapter()?;
        debug!(adapter = %adapter.name(), "Fetching user info");
        adapter
            .get_user_info()
            .await
            .map_err(|source| CoordinatorError::Adapter {
                adapter: adapter.name().to_string(),
                source,
            })
    }

    fn clear_cache(&self) {
        let _state = self.inner.state.lock();
        self.inner.cache.clear();
    }

    fn status(&self) -> AdapterStatus {
        self.inner.state.lock().status()
    }

    fn provider(&self) -> Option<SharedProvider> {
        self.inner.state.lock().provider()
    }

    fn connected_adapter_name(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .session_owner()
            .map(str::to_string)
    }

    fn cached_adapter(&self) -> Option<String> {
        let _state = self.inner.state.lock();
        self.inner.cache.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;
    use crate::ports::outbound::{StorageError, WalletAdapter};
    use crate::testing::{next_event, wait_for_status, MockAdapter};
    use shared_bus::EventKind;
    use shared_types::{ChainNamespace, PartialChainConfig, StorageKind};
    use std::time::{Duration, Instant};

    fn coordinator(storage: &InMemoryStorage) -> Coordinator {
        Coordinator::new(
            CoreOptions::new(ChainNamespace::Eip155),
            Arc::new(storage.clone()),
        )
        .unwrap()
    }

    fn evm(name: &str) -> Arc<MockAdapter> {
        MockAdapter::new(name, ChainNamespace::Eip155.into()).shared()
    }

    #[tokio::test]
    async fn test_init_marks_ready_and_subscribes() {
        let storage = InMemoryStorage::new();
        let coord = coordinator(&storage);
        let metamask = evm("metamask");
        coord.register(metamask.clone()).unwrap();

        assert_eq!(coord.status(), AdapterStatus::NotReady);
        coord.init().await.unwrap();

        assert_eq!(coord.status(), AdapterStatus::Ready);
        assert!(metamask.is_subscribed());
        assert_eq!(
            metamask.init_calls(),
            vec![AdapterInitOptions {
                auto_connect: false
            }]
        );
    }

    #[tokio::test]
    async fn test_second_init_rejected() {
        let coord = coordinator(&InMemoryStorage::new());
        coord.init().await.unwrap();

        let err = coord.init().await.unwrap_err();
        assert!(matches!(err, CoordinatorError::AlreadyInitialized));
    }

    #[tokio::test]
    async fn test_register_chaining_and_after_init() {
        let coord = coordinator(&InMemoryStorage::new());
        coord
            .register(evm("metamask"))
            .and_then(|c| c.register(evm("torus-evm")))
            .unwrap();
        assert_eq!(coord.adapter_names(), vec!["metamask", "torus-evm"]);

        coord.init().await.unwrap();
        assert!(matches!(
            coord.register(evm("late")),
            Err(CoordinatorError::AlreadyInitialized)
        ));
        assert_eq!(coord.adapter_count(), 2);
    }

    #[tokio::test]
    async fn test_connect_updates_state_before_republishing() {
        let storage = InMemoryStorage::new();
        let coord = coordinator(&storage);
        coord.register(evm("metamask")).unwrap();
        coord.init().await.unwrap();

        let mut sub = coord.subscribe(EventFilter::kinds(vec![EventKind::Connected]));
        coord.connect_to("metamask", None).await.unwrap();

        let event = next_event(&mut sub).await.unwrap();
        assert_eq!(event.adapter(), "metamask");
        assert_eq!(coord.status(), AdapterStatus::Connected);
        assert_eq!(coord.connected_adapter_name().as_deref(), Some("metamask"));
        assert_eq!(coord.cached_adapter().as_deref(), Some("metamask"));
        assert_eq!(coord.provider().map(|p| p.chain_id()).as_deref(), Some("0x1"));
    }

    #[tokio::test]
    async fn test_default_chain_config_assigned() {
        let storage = InMemoryStorage::new();
        let options =
            CoreOptions::new(ChainNamespace::Eip155).with_chain_config(PartialChainConfig {
                chain_id: Some("0x5".to_string()),
                rpc_target: Some("http://localhost:8545".to_string()),
                ..PartialChainConfig::default()
            });
        let coord = Coordinator::new(options, Arc::new(storage)).unwrap();
        let metamask = evm("metamask");
        coord.register(metamask.clone()).unwrap();

        coord.init().await.unwrap();

        let assigned = metamask.chain_config().unwrap();
        assert_eq!(assigned.chain_id, "0x5");
        assert_eq!(assigned.rpc_target, "http://localhost:8545");
        assert_eq!(assigned.ticker, "ETH");
    }

    #[tokio::test]
    async fn test_existing_chain_config_kept() {
        let own =
            shared_types::default_chain_config(ChainNamespace::Eip155, Some("0x89")).unwrap();
        let adapter = MockAdapter::new("metamask", ChainNamespace::Eip155.into())
            .with_chain_config(own.clone())
            .shared();
        let coord = coordinator(&InMemoryStorage::new());
        coord.register(adapter.clone()).unwrap();

        coord.init().await.unwrap();
        assert_eq!(adapter.chain_config(), Some(own));
    }

    #[tokio::test]
    async fn test_connected_from_unknown_adapter_ignored() {
        let coord = coordinator(&InMemoryStorage::new());
        coord.init().await.unwrap();

        let stray = evm("stray");
        stray.subscribe(coord.inner.emitters.emitter_for("stray"));
        let mut sub = coord.subscribe(EventFilter::all());

        stray.emit_connected();
        stray.emit_connecting();

        // Only the connecting event makes it through
        let event = next_event(&mut sub).await.unwrap();
        assert_eq!(event.kind(), EventKind::Connecting);
        assert_eq!(coord.status(), AdapterStatus::Connecting);
        assert!(coord.cached_adapter().is_none());
    }

    #[tokio::test]
    async fn test_connected_without_provider() {
        let coord = coordinator(&InMemoryStorage::new());
        let adapter = evm("metamask");
        coord.register(adapter.clone()).unwrap();
        coord.init().await.unwrap();

        adapter.emit_connected_without_provider();
        assert!(wait_for_status(&coord, AdapterStatus::Connected).await);
        assert!(coord.provider().is_none());
        assert_eq!(coord.connected_adapter_name().as_deref(), Some("metamask"));
    }

    #[tokio::test]
    async fn test_local_storage_kind() {
        let storage = InMemoryStorage::new();
        let coord = Coordinator::new(
            CoreOptions::new(ChainNamespace::Eip155).with_storage_kind(StorageKind::Local),
            Arc::new(storage.clone()),
        )
        .unwrap();
        coord.register(evm("metamask")).unwrap();
        coord.init().await.unwrap();

        coord.connect_to("metamask", None).await.unwrap();
        assert!(wait_for_status(&coord, AdapterStatus::Connected).await);

        assert!(storage.is_empty(StorageKind::Session));
        assert_eq!(storage.len(StorageKind::Local), 1);
    }

    #[tokio::test]
    async fn test_pump_stops_when_coordinator_dropped() {
        let coord = coordinator(&InMemoryStorage::new());
        let adapter = evm("metamask");
        coord.register(adapter.clone()).unwrap();
        coord.init().await.unwrap();

        let weak = Arc::downgrade(&coord.inner);
        drop(coord);
        assert!(weak.upgrade().is_none());

        // The pump exits on the next event instead of resurrecting state
        adapter.emit_connecting();
        tokio::task::yield_now().await;
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_debug_shows_options_status_and_adapters() {
        let coord = coordinator(&InMemoryStorage::new());
        coord.register(evm("metamask")).unwrap();

        let err = coord.register(evm("metamask")).unwrap_err();
        assert!(matches!(err, CoordinatorError::DuplicateAdapter(ref n) if n == "metamask"));

        let rendered = format!("{coord:?}");
        assert!(rendered.starts_with("Coordinator {"));
        assert!(rendered.contains("Eip155"));
        assert!(rendered.contains("NotReady"));
        assert!(rendered.contains("\"metamask\""));
    }

    #[test]
    fn test_new_rejects_other_namespace_without_chain_params() {
        let result = Coordinator::new(
            CoreOptions::new(ChainNamespace::Other),
            Arc::new(InMemoryStorage::new()),
        );
        assert!(matches!(
            result,
            Err(ConfigError::IncompleteChainConfig {
                namespace: ChainNamespace::Other,
                field: "chainId",
            })
        ));

        let complete =
            CoreOptions::new(ChainNamespace::Other).with_chain_config(PartialChainConfig {
                chain_id: Some("0x2a".to_string()),
                rpc_target: Some("http://localhost:8545".to_string()),
                ..PartialChainConfig::default()
            });
        assert!(Coordinator::new(complete, Arc::new(InMemoryStorage::new())).is_ok());
    }

    /// Storage whose writes take a while, like an fsync on a slow disk.
    struct SlowStorage {
        inner: InMemoryStorage,
        delay: Duration,
    }

    impl StorageGate for SlowStorage {
        fn is_available(&self, kind: StorageKind) -> bool {
            self.inner.is_available(kind)
        }

        fn get(&self, kind: StorageKind, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(kind, key)
        }

        fn set(&self, kind: StorageKind, key: &str, value: &str) -> Result<(), StorageError> {
            std::thread::sleep(self.delay);
            self.inner.set(kind, key, value)
        }

        fn remove(&self, kind: StorageKind, key: &str) -> Result<(), StorageError> {
            self.inner.remove(kind, key)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_connected_status_never_visible_before_cache_write() {
        let storage = SlowStorage {
            inner: InMemoryStorage::new(),
            delay: Duration::from_millis(200),
        };
        let coord =
            Coordinator::new(CoreOptions::new(ChainNamespace::Eip155), Arc::new(storage)).unwrap();
        let metamask = evm("metamask");
        coord.register(metamask.clone()).unwrap();
        coord.init().await.unwrap();

        metamask.emit_connected();

        let deadline = Instant::now() + Duration::from_secs(2);
        while coord.status() != AdapterStatus::Connected {
            assert!(Instant::now() < deadline, "never connected");
            std::hint::spin_loop();
        }
        assert_eq!(coord.connected_adapter_name().as_deref(), Some("metamask"));
        assert_eq!(coord.cached_adapter().as_deref(), Some("metamask"));
    }
}
