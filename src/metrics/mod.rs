
use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::HistogramOpts;
use prometheus::HistogramVec;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

use crate::Error;
use crate::Result;

lazy_static! {
    pub static ref PURGE_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("purge_requests_total", "Purge requests handled, by outcome"),
        &["storage", "outcome"]
    )
    .expect("metric can not be created");

    pub static ref PURGE_DURATION_MS: HistogramVec = HistogramVec::new(
        HistogramOpts::new("purge_duration_ms", "Histogram of backend purge duration in ms")
            .buckets(exponential_buckets(1.0, 2.0, 16).expect("valid bucket layout")),
        &["storage"]
    )
    .expect("metric can not be created");

    pub static ref LISTENER_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "listener_failures_total",
        "Purge listeners that died while running"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new_custom(Some("cleaner".to_string()), None)
            .expect("registry can be created");
        register_custom_metrics(&registry);
        registry
    };
}

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(PURGE_REQUESTS_TOTAL.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(PURGE_DURATION_MS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(LISTENER_FAILURES_TOTAL.clone()))
        .expect("collector can be registered");
}

/// Serves `GET /metrics` until the shutdown signal fires
pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let metrics_route = warp::path!("metrics").and(warp::get()).and_then(metrics_handler);

    let (addr, server) = warp::serve(metrics_route)
        .try_bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        })
        .map_err(|e| Error::Fatal(format!("metrics server failed to bind port {port}: {e}")))?;
    info!("metrics server listening on {}", addr);
    server.await;
    info!("metrics server stopped");
    Ok(())
}

async fn metrics_handler() -> std::result::Result<impl Reply, Rejection> {
    Ok(encode_metrics(&REGISTRY))
}

pub(crate) fn encode_metrics(registry: &Registry) -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
