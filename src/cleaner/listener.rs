use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::Stream;
use futures::StreamExt;
use hyper::server::accept;
use hyper::service::make_service_fn;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::purge_routes;
use super::PurgeContext;
use crate::constants::ACCEPT_ERROR_BACKOFF;
use crate::constants::PURGE_HEADER_READ_TIMEOUT;
use crate::metrics::LISTENER_FAILURES_TOTAL;
use crate::ComponentId;
use crate::LifecycleError;
use crate::ListenerError;
use crate::ShutdownError;
use crate::StatusReporter;

/// Owning handle of the background purge listener.
///
/// Dropping the handle requests a graceful close without waiting for it.
pub(crate) struct ListenerHandle {
    pub(super) local_addr: SocketAddr,
    pub(super) shutdown: CancellationToken,
    pub(super) task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Binds `addr` and spawns the serve loop.
    ///
    /// Binding happens before this returns, so a taken port is reported to
    /// the caller. Must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        addr: SocketAddr,
        ctx: Arc<PurgeContext>,
        component: ComponentId,
        reporter: Arc<dyn StatusReporter>,
    ) -> Result<Self, ListenerError> {
        let bind_err = |source| ListenerError::Bind { addr, source };

        let std_listener = std::net::TcpListener::bind(addr).map_err(bind_err)?;
        std_listener.set_nonblocking(true).map_err(bind_err)?;
        let local_addr = std_listener.local_addr().map_err(bind_err)?;
        let listener = tokio::net::TcpListener::from_std(std_listener).map_err(bind_err)?;

        let service = warp::service(purge_routes(ctx));
        let make_svc = make_service_fn(move |_| {
            let service = service.clone();
            async move { Ok::<_, Infallible>(service) }
        });

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let incoming = accept::from_stream(accept_retrying(TcpListenerStream::new(listener)));
        let server = hyper::Server::builder(incoming)
            .http1_header_read_timeout(PURGE_HEADER_READ_TIMEOUT)
            .serve(make_svc)
            .with_graceful_shutdown(async move { signal.cancelled().await });
        let server = async move {
            if let Err(e) = server.await {
                error!("purge listener on {} failed: {}", local_addr, e);
            }
        };

        let task = supervise(server, shutdown.clone(), local_addr, component, reporter);

        info!("purge listener bound on {}", local_addr);
        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests, at
    /// most `deadline`. Past the deadline the serve loop is aborted.
    pub(crate) async fn close(
        mut self,
        deadline: Duration,
    ) -> Result<(), ShutdownError> {
        self.shutdown.cancel();

        match tokio::time::timeout(deadline, &mut self.task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ShutdownError::TaskFailed(e)),
            Err(_) => {
                warn!(
                    "purge listener on {} did not drain within {:?}, aborting",
                    self.local_addr, deadline
                );
                self.task.abort();
                Err(ShutdownError::DeadlineExceeded(deadline))
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Runs the serve loop and classifies how it ended.
///
/// Ending after `closing` was cancelled is a normal close; anything else is
/// pushed to the host as a fatal listener failure.
pub(crate) fn supervise<F>(
    server: F,
    closing: CancellationToken,
    local_addr: SocketAddr,
    component: ComponentId,
    reporter: Arc<dyn StatusReporter>,
) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = AssertUnwindSafe(server).catch_unwind().await;

        let failure = match outcome {
            Ok(()) if closing.is_cancelled() => {
                debug!("purge listener on {} closed", local_addr);
                None
            }
            Ok(()) => Some(ListenerError::Exited),
            Err(panic) => Some(ListenerError::Panicked(panic_message(&*panic))),
        };

        if let Some(e) = failure {
            LISTENER_FAILURES_TOTAL.inc();
            reporter.report_fatal(component, LifecycleError::Listener(e).into());
        }
    })
}

/// Accepted connections with accept failures logged and skipped.
///
/// A connection that failed during its handshake is dropped at once; any
/// other failure, typically fd exhaustion, pauses accepting for
/// [`ACCEPT_ERROR_BACKOFF`]. The stream only ends when `incoming` does.
pub(crate) fn accept_retrying<S, T>(incoming: S) -> impl Stream<Item = io::Result<T>>
where
    S: Stream<Item = io::Result<T>> + Unpin,
{
    futures::stream::unfold(incoming, |mut incoming| async move {
        loop {
            match incoming.next().await? {
                Ok(conn) => return Some((Ok(conn), incoming)),
                Err(e) if is_connection_error(&e) => {
                    debug!("dropping failed connection: {}", e);
                }
                Err(e) => {
                    warn!("accept error, retrying in {:?}: {}", ACCEPT_ERROR_BACKOFF, e);
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }
    })
}

fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
