use std::sync::Arc;

use storage_cleaner::constants::PURGE_SUCCESS_BODY;
use storage_cleaner::MemoryStorage;
use storage_cleaner::SledStorage;
use tempfile::TempDir;

use crate::common::post;
use crate::common::start_cleaner;
use crate::common::STOP_TIMEOUT;

#[tokio::test]
async fn test_purge_clears_memory_backend() {
    let storage = Arc::new(MemoryStorage::new());
    for i in 0..100 {
        storage.insert(format!("trace-{i}"), "payload");
    }
    let mut running = start_cleaner("memstore", storage.clone());

    let (status, body) = post(&running.url()).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, PURGE_SUCCESS_BODY);
    assert!(storage.is_empty());

    // Purging an empty backend is still a success
    let (status, _) = post(&running.url()).await;
    assert_eq!(status, reqwest::StatusCode::OK);

    running.cleaner.stop(STOP_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_purge_clears_every_sled_tree() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(SledStorage::open(dir.path().join("traces")).unwrap());
    storage.insert("trace-1", "span").unwrap();
    storage.tree("dependencies").unwrap().insert("a->b", "3").unwrap();
    assert_eq!(storage.len().unwrap(), 2);
    let mut running = start_cleaner("badger", storage.clone());

    let (status, body) = post(&running.url()).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, PURGE_SUCCESS_BODY);
    assert!(storage.is_empty().unwrap());

    running.cleaner.stop(STOP_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_other_methods_leave_data_untouched() {
    let storage = Arc::new(MemoryStorage::new());
    storage.insert("trace-1", "span");
    let mut running = start_cleaner("memstore", storage.clone());
    let client = reqwest::Client::new();

    for response in [
        client.get(running.url()).send().await.unwrap(),
        client.put(running.url()).send().await.unwrap(),
        client.delete(running.url()).send().await.unwrap(),
    ] {
        assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    }
    assert_eq!(storage.len(), 1);

    running.cleaner.stop(STOP_TIMEOUT).await.unwrap();
}
