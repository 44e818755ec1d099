//! Demo application router.
//!
//! A handful of routes with distinct shapes (fixed body, echo, slow, streamed)
//! so the four instruments have something to show.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    routing::{get, post},
    Router,
};

use crate::{meter::HttpMetrics, ops};

pub fn build_router(metrics: &HttpMetrics) -> Router {
    let app = Router::new()
        .route("/", get(index))
        .route("/echo", post(echo))
        .route("/slow", get(slow))
        .route("/stream", get(stream))
        .route("/healthz", get(ops::healthz));
    metrics.install(app)
}

async fn index() -> &'static str {
    "httpmeter demo\n"
}

async fn echo(body: Bytes) -> Bytes {
    body
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(100)).await;
    "done\n"
}

async fn stream() -> Body {
    let chunks = (0..4).map(|i| Ok::<_, Infallible>(format!("chunk {i}\n")));
    Body::from_stream(futures_util::stream::iter(chunks))
}
