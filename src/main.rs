use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use storage_cleaner::metrics;
use storage_cleaner::status_channel;
use storage_cleaner::Dependent;
use storage_cleaner::Error;
use storage_cleaner::LoggingConfig;
use storage_cleaner::Result;
use storage_cleaner::ServiceConfig;
use storage_cleaner::StatusEvent;
use storage_cleaner::StorageCleaner;
use storage_cleaner::StorageRegistry;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

const LOG_FILE_NAME: &str = "cleaner.log";

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let settings = match ServiceConfig::new().and_then(ServiceConfig::validate) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initializing Logs
    let _guard = match init_observability(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(settings).await {
        Ok(()) => {
            info!("Exiting program.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("storage cleaner terminated: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: ServiceConfig) -> Result<()> {
    let registry = StorageRegistry::from_config(&settings.storage)?;
    info!("storage registry ready with backends {:?}", registry.names());

    let (reporter, mut status_rx) = status_channel();
    let mut cleaner = StorageCleaner::new(settings.cleaner, Arc::new(reporter));
    for dependency in cleaner.dependencies() {
        info!("{} depends on {}", StorageCleaner::ID, dependency);
    }

    // Initializing Shutdown Signal
    let (metrics_tx, metrics_rx) = watch::channel(());
    let metrics_task = settings.monitoring.prometheus_enabled.then(|| {
        let port = settings.monitoring.prometheus_port;
        tokio::spawn(metrics::start_server(port, metrics_rx))
    });

    cleaner.start(&registry)?;
    info!("Application started. Waiting for shutdown signal...");

    let fatal = tokio::select! {
        result = graceful_shutdown() => result.err(),
        event = next_fatal(&mut status_rx) => event,
    };

    let shutdown_timeout = cleaner.config().shutdown_timeout();
    let stopped = cleaner.stop(shutdown_timeout).await;

    if metrics_tx.send(()).is_err() {
        warn!("metrics server already gone");
    }
    if let Some(task) = metrics_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("metrics server failed: {}", e),
            Err(e) => warn!("metrics server task failed: {}", e),
        }
    }

    stopped?;
    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Waits for the first fatal status event
async fn next_fatal(rx: &mut mpsc::Receiver<StatusEvent>) -> Option<Error> {
    match rx.recv().await {
        Some(StatusEvent::FatalError { component, error }) => {
            error!("{} reported a fatal error: {}", component, error);
            Some(error)
        }
        None => futures::future::pending().await,
    }
}

async fn graceful_shutdown() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    info!("Shutdown server..");
    Ok(())
}

fn init_observability(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let appender = tracing_appender::rolling::never(Path::new(log_dir), LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).init();
            Ok(Some(guard))
        }
        None => {
            let stdout_layer = tracing_subscriber::fmt::layer().with_filter(filter);
            tracing_subscriber::registry().with(stdout_layer).init();
            Ok(None)
        }
    }
}
