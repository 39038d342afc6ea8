use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;
use warp::http::StatusCode;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

use crate::constants::PURGE_PATH;
use crate::constants::PURGE_SUCCESS_BODY;
use crate::metrics::PURGE_DURATION_MS;
use crate::metrics::PURGE_REQUESTS_TOTAL;
use crate::Purger;
use crate::Result;
use crate::StorageError;

/// Per-listener state handed to every purge request
pub(crate) struct PurgeContext {
    pub(crate) storage: String,
    pub(crate) purger: Arc<dyn Purger>,
}

/// `POST /purge`; other methods are rejected by warp with 405 before the
/// handler runs
pub(crate) fn purge_routes(
    ctx: Arc<PurgeContext>
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path(PURGE_PATH)
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::any().map(move || ctx.clone()))
        .and_then(purge_handler)
}

pub(crate) async fn purge_handler(ctx: Arc<PurgeContext>) -> std::result::Result<impl Reply, Infallible> {
    debug!("purge requested for storage '{}'", ctx.storage);
    let started = Instant::now();

    let result = run_purge(ctx.purger.clone()).await;

    PURGE_DURATION_MS
        .with_label_values(&[&ctx.storage])
        .observe(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(()) => {
            info!("storage '{}' purged", ctx.storage);
            PURGE_REQUESTS_TOTAL.with_label_values(&[&ctx.storage, "success"]).inc();
            Ok(warp::reply::with_status(PURGE_SUCCESS_BODY.to_string(), StatusCode::OK))
        }
        Err(e) => {
            let message = format!("error purging storage: {e}");
            warn!("storage '{}': {}", ctx.storage, message);
            PURGE_REQUESTS_TOTAL.with_label_values(&[&ctx.storage, "failure"]).inc();
            Ok(warp::reply::with_status(message, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// Runs the backend purge on the blocking pool
async fn run_purge(purger: Arc<dyn Purger>) -> Result<()> {
    match tokio::task::spawn_blocking(move || purger.purge()).await {
        Ok(result) => result,
        Err(e) => Err(StorageError::PurgeFailed(format!("purge task failed: {e}")).into()),
    }
}
