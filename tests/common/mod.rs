use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use storage_cleaner::status_channel;
use storage_cleaner::CleanerConfig;
use storage_cleaner::StatusEvent;
use storage_cleaner::StorageCleaner;
use storage_cleaner::StorageFactory;
use storage_cleaner::StorageRegistry;
use tokio::sync::mpsc;

pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RunningCleaner {
    pub cleaner: StorageCleaner,
    pub addr: SocketAddr,
    pub status_rx: mpsc::Receiver<StatusEvent>,
}

impl RunningCleaner {
    pub fn url(&self) -> String {
        purge_url(self.addr)
    }
}

pub fn purge_url(addr: SocketAddr) -> String {
    format!("http://127.0.0.1:{}/purge", addr.port())
}

/// Registers `backend` as `name` and starts a cleaner for it on an ephemeral port
pub fn start_cleaner(
    name: &str,
    backend: Arc<dyn StorageFactory>,
) -> RunningCleaner {
    crate::enable_logger();

    let registry = StorageRegistry::new();
    registry.register(name, backend).expect("register backend");

    let (reporter, status_rx) = status_channel();
    let mut cleaner = StorageCleaner::new(CleanerConfig::new(name, 0), Arc::new(reporter));
    cleaner.start(&registry).expect("start cleaner");
    let addr = cleaner.local_addr().expect("cleaner bound");

    RunningCleaner {
        cleaner,
        addr,
        status_rx,
    }
}

pub async fn post(url: &str) -> (reqwest::StatusCode, String) {
    let response = reqwest::Client::new().post(url).send().await.expect("request sent");
    let status = response.status();
    (status, response.text().await.expect("response body"))
}
