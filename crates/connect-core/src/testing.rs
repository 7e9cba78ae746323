//! Centralized Testing Utilities
//!
//! Scriptable adapter and provider doubles plus small async helpers. Available
//! to unit tests and, with the `test-utils` feature, to integration tests.

use crate::ports::inbound::CoordinatorApi;
use crate::ports::outbound::{
    AdapterError, AdapterInitOptions, LoginParams, Provider, SharedProvider, WalletAdapter,
};
use crate::service::Coordinator;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_bus::{AdapterEvent, AdapterEventEmitter, Subscription};
use shared_types::{AdapterNamespace, AdapterStatus, ChainConfig, ChainNamespace, UserInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long helpers wait for an asynchronous event before giving up.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Provider double answering a couple of chain id methods.
#[derive(Debug, Clone)]
pub struct MockProvider {
    chain_id: String,
    adapter: String,
}

impl MockProvider {
    pub fn new(adapter: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            adapter: adapter.into(),
        }
    }

    /// Adapter that created this provider.
    pub fn adapter(&self) -> &str {
        &self.adapter
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn chain_id(&self) -> String {
        self.chain_id.clone()
    }

    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AdapterError> {
        match method {
            "eth_chainId" | "getChainId" => Ok(serde_json::Value::String(self.chain_id.clone())),
            "unsupported" => Err(AdapterError::Rpc(format!("method {method} not supported"))),
            _ => Ok(serde_json::json!({
                "adapter": self.adapter,
                "method": method,
                "params": params,
            })),
        }
    }
}

/// Adapter double.
///
/// Behaves like a well mannered wallet: `connect` emits `connecting` then
/// `connected`, `init` with `auto_connect` reconnects silently, `disconnect`
/// emits `disconnected`. Failures can be scripted per operation and events
/// can be emitted by hand with the `emit_*` methods.
pub struct MockAdapter {
    name: String,
    namespace: AdapterNamespace,
    committed: Option<ChainNamespace>,
    user_info: UserInfo,
    init_error: Option<AdapterError>,
    connect_error: Option<AdapterError>,
    chain_config: RwLock<Option<ChainConfig>>,
    emitter: RwLock<Option<AdapterEventEmitter>>,
    provider: RwLock<Option<SharedProvider>>,
    init_calls: Mutex<Vec<AdapterInitOptions>>,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    user_info_calls: AtomicUsize,
}

impl MockAdapter {
    pub fn new(name: impl Into<String>, namespace: AdapterNamespace) -> Self {
        let name = name.into();
        Self {
            user_info: UserInfo {
                name: Some(format!("{name} user")),
                verifier: Some(name.clone()),
                ..UserInfo::default()
            },
            name,
            namespace,
            committed: None,
            init_error: None,
            connect_error: None,
            chain_config: RwLock::new(None),
            emitter: RwLock::new(None),
            provider: RwLock::new(None),
            init_calls: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            user_info_calls: AtomicUsize::new(0),
        }
    }

    /// Multi-chain adapter already bound to `namespace`.
    pub fn committed_to(mut self, namespace: ChainNamespace) -> Self {
        self.committed = Some(namespace);
        self
    }

    pub fn with_user_info(mut self, user_info: UserInfo) -> Self {
        self.user_info = user_info;
        self
    }

    /// Start with a chain config, so the coordinator leaves it alone.
    pub fn with_chain_config(self, config: ChainConfig) -> Self {
        *self.chain_config.write() = Some(config);
        self
    }

    pub fn failing_init(mut self, error: AdapterError) -> Self {
        self.init_error = Some(error);
        self
    }

    /// `connect` emits `errored` and returns `error`.
    pub fn failing_connect(mut self, error: AdapterError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Options passed to every `init` call so far.
    pub fn init_calls(&self) -> Vec<AdapterInitOptions> {
        self.init_calls.lock().clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn user_info_calls(&self) -> usize {
        self.user_info_calls.load(Ordering::SeqCst)
    }

    /// Whether the coordinator has attached an emitter.
    pub fn is_subscribed(&self) -> bool {
        self.emitter.read().is_some()
    }

    pub fn emit_connecting(&self) -> bool {
        self.with_emitter(|e| e.connecting())
    }

    /// Attach a provider and emit `connected`.
    pub fn emit_connected(&self) -> bool {
        self.attach_provider();
        self.with_emitter(|e| e.connected(false))
    }

    /// Emit `connected` without attaching a provider.
    pub fn emit_connected_without_provider(&self) -> bool {
        self.with_emitter(|e| e.connected(false))
    }

    pub fn emit_disconnected(&self) -> bool {
        *self.provider.write() = None;
        self.with_emitter(|e| e.disconnected())
    }

    pub fn emit_errored(&self, message: &str) -> bool {
        *self.provider.write() = None;
        self.with_emitter(|e| e.errored(message))
    }

    fn with_emitter(&self, f: impl FnOnce(&AdapterEventEmitter) -> bool) -> bool {
        match self.emitter.read().as_ref() {
            Some(emitter) => f(emitter),
            None => false,
        }
    }

    fn attach_provider(&self) {
        let chain_id = self
            .chain_config
            .read()
            .as_ref()
            .map(|c| c.chain_id.clone())
            .unwrap_or_else(|| "0x1".to_string());
        let provider: SharedProvider = Arc::new(MockProvider::new(self.name.clone(), chain_id));
        *self.provider.write() = Some(provider);
    }
}

#[async_trait]
impl WalletAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_namespace(&self) -> AdapterNamespace {
        self.namespace
    }

    fn current_chain_namespace(&self) -> Option<ChainNamespace> {
        self.committed
    }

    fn chain_config(&self) -> Option<ChainConfig> {
        self.chain_config.read().clone()
    }

    fn set_chain_config(&self, config: ChainConfig) {
        *self.chain_config.write() = Some(config);
    }

    fn subscribe(&self, emitter: AdapterEventEmitter) {
        *self.emitter.write() = Some(emitter);
    }

    async fn init(&self, options: AdapterInitOptions) -> Result<(), AdapterError> {
        self.init_calls.lock().push(options);
        if let Some(error) = &self.init_error {
            return Err(error.clone());
        }
        if options.auto_connect {
            self.attach_provider();
            self.with_emitter(|e| e.connected(true));
        }
        Ok(())
    }

    async fn connect(&self, _params: LoginParams) -> Result<(), AdapterError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if !self.is_subscribed() {
            return Err(AdapterError::NotReady(self.name.clone()));
        }
        self.emit_connecting();

        if let Some(error) = &self.connect_error {
            self.emit_errored(&error.to_string());
            return Err(error.clone());
        }

        self.emit_connected();
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.provider.read().is_none() {
            return Err(AdapterError::DisconnectionFailed("not connected".to_string()));
        }
        self.emit_disconnected();
        Ok(())
    }

    async fn get_user_info(&self) -> Result<UserInfo, AdapterError> {
        self.user_info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.user_info.clone())
    }

    fn provider(&self) -> Option<SharedProvider> {
        self.provider.read().clone()
    }
}

/// Next event on `subscription`, or `None` after [`EVENT_TIMEOUT`].
pub async fn next_event(subscription: &mut Subscription) -> Option<AdapterEvent> {
    tokio::time::timeout(EVENT_TIMEOUT, subscription.recv())
        .await
        .ok()
        .flatten()
}

/// Poll until the coordinator reports `status`. Returns false on timeout.
pub async fn wait_for_status(coordinator: &Coordinator, status: AdapterStatus) -> bool {
    let poll = async {
        while coordinator.status() != status {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(EVENT_TIMEOUT, poll).await.is_ok()
}
