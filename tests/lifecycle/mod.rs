use std::sync::Arc;
use std::time::Duration;

use storage_cleaner::status_channel;
use storage_cleaner::CleanerConfig;
use storage_cleaner::CleanerState;
use storage_cleaner::Error;
use storage_cleaner::LifecycleError;
use storage_cleaner::MemoryStorage;
use storage_cleaner::ReadOnlyStorage;
use storage_cleaner::ServiceConfig;
use storage_cleaner::SledStorage;
use storage_cleaner::StorageCleaner;
use storage_cleaner::StorageRegistry;
use tempfile::TempDir;
use tokio::net::TcpStream;

use crate::common::post;
use crate::common::start_cleaner;
use crate::common::STOP_TIMEOUT;

#[tokio::test]
async fn test_archive_backend_refuses_to_start() {
    let dir = TempDir::new().unwrap();
    let sled = Arc::new(SledStorage::open(dir.path().join("archive")).unwrap());
    let registry = StorageRegistry::new();
    registry.register("archive", Arc::new(ReadOnlyStorage::new(sled))).unwrap();

    let (reporter, _rx) = status_channel();
    let mut cleaner = StorageCleaner::new(
        CleanerConfig::new("archive", 0),
        Arc::new(reporter),
    );
    let err = cleaner.start(&registry).unwrap_err();

    assert!(matches!(err, Error::Lifecycle(LifecycleError::PurgeUnsupported { .. })));
    assert_eq!(err.to_string(), "storage archive does not implement Purger interface");
    assert_eq!(cleaner.state(), CleanerState::Created);
}

#[tokio::test]
async fn test_unknown_backend_error_names_it() {
    let registry = StorageRegistry::new();
    registry.register("memstore", Arc::new(MemoryStorage::new())).unwrap();

    let (reporter, _rx) = status_channel();
    let mut cleaner = StorageCleaner::new(
        CleanerConfig::new("badger", 0),
        Arc::new(reporter),
    );
    let err = cleaner.start(&registry).unwrap_err();

    assert_eq!(err.to_string(), "cannot find storage backend 'badger'");
}

#[tokio::test]
async fn test_stop_releases_port_and_reports_nothing() {
    let mut running = start_cleaner("memstore", Arc::new(MemoryStorage::new()));
    let (status, _) = post(&running.url()).await;
    assert_eq!(status, reqwest::StatusCode::OK);

    running.cleaner.stop(STOP_TIMEOUT).await.unwrap();

    assert_eq!(running.cleaner.state(), CleanerState::Stopped);
    assert!(TcpStream::connect(running.addr).await.is_err());
    // The port can be bound again once the listener is gone
    assert!(std::net::TcpListener::bind(("0.0.0.0", running.addr.port())).is_ok());
    // A requested close is not a failure
    assert!(tokio::time::timeout(Duration::from_millis(100), running.status_rx.recv())
        .await
        .map_or(true, |event| event.is_none()));
}

#[tokio::test]
async fn test_registry_from_default_config_serves_memstore() {
    let settings = ServiceConfig::default().validate().unwrap();
    let registry = StorageRegistry::from_config(&settings.storage).unwrap();

    let (reporter, _rx) = status_channel();
    let mut cleaner = StorageCleaner::new(
        CleanerConfig::new(&settings.cleaner.trace_storage, 0),
        Arc::new(reporter),
    );
    cleaner.start(&registry).unwrap();
    let addr = cleaner.local_addr().unwrap();

    let (status, _) = post(&crate::common::purge_url(addr)).await;
    assert_eq!(status, reqwest::StatusCode::OK);

    cleaner.stop(STOP_TIMEOUT).await.unwrap();
}
