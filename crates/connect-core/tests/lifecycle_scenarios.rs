//! # Lifecycle Scenarios
//!
//! End-to-end behavior of the coordinator through its public API only:
//! registration rules, the event driven status machine, the remembered
//! adapter across restarts, and façade gating.

use std::sync::Arc;

use connect_core::testing::{next_event, wait_for_status, MockAdapter};
use connect_core::{
    AdapterError, AdapterEvent, AdapterInitOptions, AdapterStatus, ChainNamespace, Coordinator,
    CoordinatorApi, CoordinatorError, CoreOptions, EventFilter, EventKind, FileStorage,
    InMemoryStorage, StorageGate, StorageKind, UserInfo, ADAPTER_CACHE_KEY,
};
use futures::StreamExt;
use tempfile::TempDir;

fn eip155(storage: Arc<dyn StorageGate>) -> Coordinator {
    Coordinator::new(CoreOptions::new(ChainNamespace::Eip155), storage).unwrap()
}

fn evm(name: &str) -> Arc<MockAdapter> {
    MockAdapter::new(name, ChainNamespace::Eip155.into()).shared()
}

fn cached_in(storage: &InMemoryStorage) -> Option<String> {
    storage.get(StorageKind::Session, ADAPTER_CACHE_KEY).unwrap()
}

async fn assert_not_connected(coordinator: &Coordinator) {
    assert!(matches!(
        coordinator.logout().await,
        Err(CoordinatorError::NotConnected)
    ));
    let err = coordinator.get_user_info().await.unwrap_err();
    assert_eq!(err.code(), 5113);
}

#[tokio::test]
async fn test_duplicate_name_rejected_in_any_order() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    coordinator.register(evm("metamask")).unwrap();
    coordinator.register(evm("torus-evm")).unwrap();

    for name in ["torus-evm", "metamask"] {
        let err = coordinator.register(evm(name)).unwrap_err();
        assert!(matches!(err, CoordinatorError::DuplicateAdapter(ref n) if n == name));
    }
    assert_eq!(coordinator.adapter_count(), 2);
}

#[tokio::test]
async fn test_register_after_init_rejected() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    coordinator.register(evm("metamask")).unwrap();
    coordinator.init().await.unwrap();

    let err = coordinator.register(evm("torus-evm")).unwrap_err();
    assert!(matches!(err, CoordinatorError::AlreadyInitialized));
    assert!(coordinator.adapter("torus-evm").is_none());
}

#[tokio::test]
async fn test_connected_then_disconnected_returns_to_ready() {
    // Arrange
    let storage = InMemoryStorage::new();
    let coordinator = eip155(Arc::new(storage.clone()));
    let metamask = evm("metamask");
    coordinator.register(metamask.clone()).unwrap();
    coordinator.init().await.unwrap();
    let mut events = coordinator.subscribe(EventFilter::all());

    // Act
    metamask.emit_connected();
    metamask.emit_disconnected();

    // Assert
    assert_eq!(next_event(&mut events).await.map(|e| e.kind()), Some(EventKind::Connected));
    assert_eq!(
        next_event(&mut events).await.map(|e| e.kind()),
        Some(EventKind::Disconnected)
    );
    assert_eq!(coordinator.status(), AdapterStatus::Ready);
    assert!(coordinator.provider().is_none());
    assert!(coordinator.connected_adapter_name().is_none());
    assert_eq!(cached_in(&storage), None);
}

#[tokio::test]
async fn test_user_info_delegates_to_connected_adapter_only() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    let metamask = evm("metamask");
    let torus = MockAdapter::new("torus-evm", ChainNamespace::Eip155.into())
        .with_user_info(UserInfo {
            email: Some("torus@example.com".to_string()),
            ..UserInfo::default()
        })
        .shared();
    coordinator
        .register(metamask.clone())
        .and_then(|c| c.register(torus.clone()))
        .unwrap();
    coordinator.init().await.unwrap();

    coordinator.connect_to("torus-evm", None).await.unwrap();
    assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);

    let info = coordinator.get_user_info().await.unwrap();
    assert_eq!(info.email.as_deref(), Some("torus@example.com"));
    assert_eq!(torus.user_info_calls(), 1);
    assert_eq!(metamask.user_info_calls(), 0);
}

#[tokio::test]
async fn test_session_operations_require_connection() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    let metamask = evm("metamask");
    coordinator.register(metamask.clone()).unwrap();

    // NotReady
    assert_not_connected(&coordinator).await;

    // Ready
    coordinator.init().await.unwrap();
    assert_not_connected(&coordinator).await;

    // Connecting
    metamask.emit_connecting();
    assert!(wait_for_status(&coordinator, AdapterStatus::Connecting).await);
    assert_not_connected(&coordinator).await;

    // Errored
    metamask.emit_errored("network down");
    assert!(wait_for_status(&coordinator, AdapterStatus::Errored).await);
    assert_not_connected(&coordinator).await;

    assert_eq!(metamask.disconnect_calls(), 0);
    assert_eq!(metamask.user_info_calls(), 0);
}

#[tokio::test]
async fn test_cached_adapter_reconnects_after_restart() {
    let storage = InMemoryStorage::new();

    // First process: connect and remember metamask
    {
        let coordinator = eip155(Arc::new(storage.clone()));
        coordinator.register(evm("metamask")).unwrap();
        coordinator.init().await.unwrap();
        coordinator.connect_to("metamask", None).await.unwrap();
        assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);
    }
    assert_eq!(cached_in(&storage).as_deref(), Some("metamask"));

    // Second process on the same storage
    let coordinator = eip155(Arc::new(storage.clone()));
    assert_eq!(coordinator.cached_adapter().as_deref(), Some("metamask"));

    let metamask = evm("metamask");
    let torus = evm("torus-evm");
    coordinator.register(metamask.clone()).unwrap();
    coordinator.register(torus.clone()).unwrap();
    let mut events = coordinator.subscribe(EventFilter::kinds(vec![EventKind::Connected]));

    coordinator.init().await.unwrap();

    assert_eq!(
        metamask.init_calls(),
        vec![AdapterInitOptions { auto_connect: true }]
    );
    assert_eq!(
        torus.init_calls(),
        vec![AdapterInitOptions {
            auto_connect: false
        }]
    );

    match next_event(&mut events).await {
        Some(AdapterEvent::Connected(data)) => {
            assert_eq!(data.adapter, "metamask");
            assert!(data.reconnected);
        }
        other => panic!("expected reconnect, got {other:?}"),
    }
    assert_eq!(coordinator.status(), AdapterStatus::Connected);
}

#[tokio::test]
async fn test_stale_cached_adapter_ignored() {
    let storage = InMemoryStorage::new();
    storage
        .set(StorageKind::Session, ADAPTER_CACHE_KEY, "uninstalled-wallet")
        .unwrap();

    let coordinator = eip155(Arc::new(storage));
    let metamask = evm("metamask");
    coordinator.register(metamask.clone()).unwrap();
    coordinator.init().await.unwrap();

    assert_eq!(
        metamask.init_calls(),
        vec![AdapterInitOptions {
            auto_connect: false
        }]
    );
    assert_eq!(coordinator.status(), AdapterStatus::Ready);
}

#[tokio::test]
async fn test_error_after_connect_clears_session() {
    let storage = InMemoryStorage::new();
    let coordinator = eip155(Arc::new(storage.clone()));
    let openlogin =
        MockAdapter::new("openlogin", connect_core::AdapterNamespace::Multichain).shared();
    coordinator.register(openlogin.clone()).unwrap();
    coordinator.init().await.unwrap();

    coordinator.connect_to("openlogin", None).await.unwrap();
    assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);
    assert_eq!(coordinator.connected_adapter_name().as_deref(), Some("openlogin"));
    assert_eq!(cached_in(&storage).as_deref(), Some("openlogin"));

    openlogin.emit_errored("session expired");
    assert!(wait_for_status(&coordinator, AdapterStatus::Errored).await);

    assert_eq!(cached_in(&storage), None);
    assert!(coordinator.cached_adapter().is_none());
    assert!(coordinator.provider().is_none());
    assert!(matches!(
        coordinator.get_user_info().await,
        Err(CoordinatorError::NotConnected)
    ));
}

#[tokio::test]
async fn test_incompatible_adapter_never_registered() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    let phantom = MockAdapter::new("phantom", ChainNamespace::Solana.into()).shared();

    let err = coordinator.register(phantom).unwrap_err();
    assert_eq!(err.code(), 5006);
    assert!(coordinator.adapter_names().is_empty());

    coordinator.init().await.unwrap();
    let err = coordinator.connect_to("phantom", None).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::AdapterNotFound(ref n) if n == "phantom"));
    assert_eq!(err.code(), 5001);
}

#[tokio::test]
async fn test_failing_init_does_not_block_others() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    let broken = MockAdapter::new("wallet-connect-v1", ChainNamespace::Eip155.into())
        .failing_init(AdapterError::InitializationFailed("bridge unreachable".to_string()))
        .shared();
    let metamask = evm("metamask");
    coordinator.register(broken.clone()).unwrap();
    coordinator.register(metamask.clone()).unwrap();

    coordinator.init().await.unwrap();

    assert_eq!(broken.init_calls().len(), 1);
    assert_eq!(metamask.init_calls().len(), 1);
    assert_eq!(coordinator.status(), AdapterStatus::Ready);

    coordinator.connect_to("metamask", None).await.unwrap();
    assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);
}

#[tokio::test]
async fn test_logout_through_connected_adapter() {
    let storage = InMemoryStorage::new();
    let coordinator = eip155(Arc::new(storage.clone()));
    let metamask = evm("metamask");
    coordinator.register(metamask.clone()).unwrap();
    coordinator.init().await.unwrap();
    coordinator.connect_to("metamask", None).await.unwrap();
    assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);

    coordinator.logout().await.unwrap();
    assert!(wait_for_status(&coordinator, AdapterStatus::Ready).await);

    assert_eq!(metamask.disconnect_calls(), 1);
    assert_eq!(cached_in(&storage), None);
}

#[tokio::test]
async fn test_failed_connect_surfaces_adapter_error() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    let openlogin = MockAdapter::new("openlogin", ChainNamespace::Eip155.into())
        .failing_connect(AdapterError::UserClosedPopup)
        .shared();
    coordinator.register(openlogin).unwrap();
    coordinator.init().await.unwrap();

    let err = coordinator.connect_to("openlogin", None).await.unwrap_err();
    assert_eq!(err.code(), 5114);
    assert!(matches!(
        err,
        CoordinatorError::Adapter {
            source: AdapterError::UserClosedPopup,
            ..
        }
    ));
    assert!(wait_for_status(&coordinator, AdapterStatus::Errored).await);
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let storage = FileStorage::open(dir.path()).unwrap();
        let coordinator = eip155(Arc::new(storage));
        coordinator.register(evm("torus-evm")).unwrap();
        coordinator.init().await.unwrap();
        coordinator.connect_to("torus-evm", None).await.unwrap();
        assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);
    }

    let storage = FileStorage::open(dir.path()).unwrap();
    let coordinator = eip155(Arc::new(storage));
    assert_eq!(coordinator.cached_adapter().as_deref(), Some("torus-evm"));

    // A new browser session forgets session scoped state
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.end_session().unwrap();
    let coordinator = eip155(Arc::new(storage));
    assert!(coordinator.cached_adapter().is_none());
}

#[tokio::test]
async fn test_event_filter_by_adapter() {
    let coordinator = eip155(Arc::new(InMemoryStorage::new()));
    let metamask = evm("metamask");
    let torus = evm("torus-evm");
    coordinator.register(metamask.clone()).unwrap();
    coordinator.register(torus.clone()).unwrap();
    coordinator.init().await.unwrap();

    let mut torus_only = coordinator.event_stream(EventFilter::all().for_adapter("torus-evm"));

    metamask.emit_connecting();
    torus.emit_connecting();
    torus.emit_connected();

    let first = tokio::time::timeout(connect_core::testing::EVENT_TIMEOUT, torus_only.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.adapter(), "torus-evm");
    assert_eq!(first.kind(), EventKind::Connecting);

    let second = tokio::time::timeout(connect_core::testing::EVENT_TIMEOUT, torus_only.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.kind(), EventKind::Connected);
    assert_eq!(coordinator.events_published(), 3);
}

#[tokio::test]
async fn test_clear_cache_is_manual_invalidation() {
    let storage = InMemoryStorage::new();
    storage
        .set(StorageKind::Session, ADAPTER_CACHE_KEY, "metamask")
        .unwrap();
    let coordinator = eip155(Arc::new(storage.clone()));
    assert_eq!(coordinator.cached_adapter().as_deref(), Some("metamask"));

    coordinator.clear_cache();

    assert!(coordinator.cached_adapter().is_none());
    assert_eq!(cached_in(&storage), None);
}

#[tokio::test]
async fn test_unavailable_storage_never_remembers() {
    let storage = InMemoryStorage::unavailable(StorageKind::Session);
    let coordinator = eip155(Arc::new(storage.clone()));
    coordinator.register(evm("metamask")).unwrap();
    coordinator.init().await.unwrap();

    coordinator.connect_to("metamask", None).await.unwrap();
    assert!(wait_for_status(&coordinator, AdapterStatus::Connected).await);

    assert!(coordinator.cached_adapter().is_none());
    storage.set_available(StorageKind::Session, true);
    assert!(storage.is_empty(StorageKind::Session));
}
