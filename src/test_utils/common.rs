use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::BackendCapability;
use crate::CleanerConfig;
use crate::MockPurger;
use crate::Purger;
use crate::Result;
use crate::StorageError;
use crate::StorageFactory;

pub(crate) const STOP_DEADLINE: Duration = Duration::from_secs(5);

/// Cleaner config on an OS-assigned port so tests never collide
pub(crate) fn ephemeral_config(trace_storage: &str) -> CleanerConfig {
    CleanerConfig::new(trace_storage, 0)
}

/// A port that was free a moment ago
pub(crate) fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub(crate) fn purge_url(addr: SocketAddr) -> String {
    format!("http://127.0.0.1:{}/purge", addr.port())
}

/// Backend exposing a fixed capability
pub(crate) struct FakeStorage {
    purger: Option<Arc<dyn Purger>>,
}

impl FakeStorage {
    pub(crate) fn purgeable(purger: impl Purger) -> Arc<Self> {
        Arc::new(Self {
            purger: Some(Arc::new(purger)),
        })
    }

    pub(crate) fn without_purge() -> Arc<Self> {
        Arc::new(Self { purger: None })
    }
}

impl StorageFactory for FakeStorage {
    fn kind(&self) -> &'static str {
        "fake"
    }

    fn capability(self: Arc<Self>) -> BackendCapability {
        match &self.purger {
            Some(purger) => BackendCapability::Purge(purger.clone()),
            None => BackendCapability::Unsupported,
        }
    }
}

/// Purger that counts calls and fails when told to
#[derive(Default)]
pub(crate) struct CountingPurger {
    calls: Arc<AtomicUsize>,
    failure: Option<String>,
}

impl CountingPurger {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            calls: Arc::default(),
            failure: Some(message.to_string()),
        }
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Purger for CountingPurger {
    fn purge(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(StorageError::PurgeFailed(message.clone()).into()),
            None => Ok(()),
        }
    }
}

/// Mock purger expecting exactly `times` successful calls
pub(crate) fn expect_purges(times: usize) -> MockPurger {
    let mut purger = MockPurger::new();
    purger.expect_purge().times(times).returning(|| Ok(()));
    purger
}
