use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use super::ListenerHandle;
use super::PurgeContext;
use crate::constants::STORAGE_CLEANER_ID;
use crate::BackendResolver;
use crate::CleanerConfig;
use crate::CleanerState;
use crate::ComponentId;
use crate::Dependent;
use crate::LifecycleError;
use crate::Result;
use crate::StatusReporter;
use crate::StorageRegistry;

const DEPENDENCIES: &[ComponentId] = &[StorageRegistry::ID];

/// Serves `POST /purge` against the backend named in its config.
///
/// Started once, stopped at most once; a stopped cleaner cannot be restarted.
/// The backend is shared with the rest of the host: concurrent purge requests
/// race at the backend's discretion.
pub struct StorageCleaner {
    config: CleanerConfig,
    reporter: Arc<dyn StatusReporter>,
    state: CleanerState,
    listener: Option<ListenerHandle>,
}

impl StorageCleaner {
    pub const ID: ComponentId = ComponentId::new(STORAGE_CLEANER_ID);

    pub fn new(
        config: CleanerConfig,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        Self {
            config,
            reporter,
            state: CleanerState::Created,
            listener: None,
        }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    pub fn state(&self) -> CleanerState {
        self.state
    }

    /// Address the listener is bound to while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(ListenerHandle::local_addr)
    }

    /// Resolves the backend, checks it can purge and spawns the listener.
    ///
    /// Returns as soon as the listener is bound. Must be called from within
    /// a Tokio runtime.
    ///
    /// # Errors
    /// - `LifecycleError::BackendNotFound` if nothing is registered under
    ///   `trace_storage`
    /// - `LifecycleError::PurgeUnsupported` if the backend cannot purge
    /// - `LifecycleError::Listener` if the port cannot be bound
    /// - `LifecycleError::InvalidState` unless the cleaner is `Created`
    ///
    /// On any error no listener is left running and the state stays `Created`.
    #[instrument(skip_all, fields(storage = %self.config.trace_storage))]
    pub fn start(
        &mut self,
        resolver: &dyn BackendResolver,
    ) -> Result<()> {
        if self.state != CleanerState::Created {
            return Err(LifecycleError::InvalidState {
                state: self.state,
                operation: "start",
            }
            .into());
        }

        self.state = CleanerState::Starting;
        match self.spawn_listener(resolver) {
            Ok(listener) => {
                info!("storage cleaner serving on {}", listener.local_addr());
                self.listener = Some(listener);
                self.state = CleanerState::Running;
                Ok(())
            }
            Err(e) => {
                warn!("storage cleaner failed to start: {}", e);
                self.state = CleanerState::Created;
                Err(e)
            }
        }
    }

    fn spawn_listener(
        &self,
        resolver: &dyn BackendResolver,
    ) -> Result<ListenerHandle> {
        let name = &self.config.trace_storage;

        let backend = resolver
            .resolve(name)
            .ok_or_else(|| LifecycleError::BackendNotFound { name: name.clone() })?;

        let purger = backend
            .clone()
            .capability()
            .purger()
            .ok_or_else(|| LifecycleError::PurgeUnsupported { name: name.clone() })?;
        debug!("resolved {} backend '{}' with purge capability", backend.kind(), name);

        let ctx = Arc::new(PurgeContext {
            storage: name.clone(),
            purger,
        });

        let listener = ListenerHandle::spawn(
            self.config.listen_addr(),
            ctx,
            Self::ID,
            self.reporter.clone(),
        )
        .map_err(LifecycleError::from)?;

        Ok(listener)
    }

    /// Closes the listener, draining in-flight requests for at most `deadline`.
    ///
    /// A no-op when no listener is running (never started, or already
    /// stopped). Otherwise the cleaner ends `Stopped` whether or not the
    /// close was clean.
    ///
    /// # Errors
    /// `LifecycleError::Shutdown` if the listener did not close within budget
    #[instrument(skip(self), fields(storage = %self.config.trace_storage))]
    pub async fn stop(
        &mut self,
        deadline: Duration,
    ) -> Result<()> {
        let Some(listener) = self.listener.take() else {
            debug!("storage cleaner has no active listener, nothing to stop");
            return Ok(());
        };

        self.state = CleanerState::Stopping;
        let result = listener.close(deadline).await;
        self.state = CleanerState::Stopped;

        match result {
            Ok(()) => {
                info!("storage cleaner stopped");
                Ok(())
            }
            Err(e) => Err(LifecycleError::Shutdown(e).into()),
        }
    }
}

impl Dependent for StorageCleaner {
    fn dependencies(&self) -> &'static [ComponentId] {
        DEPENDENCIES
    }
}
