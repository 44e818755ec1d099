//! httpmeter demo host.
//!
//! Serves a few routes with the interceptor installed and the metrics on
//! `metrics.path` (default `/metrics`).

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use httpmeter_core::Registry;
use tracing_subscriber::{fmt, EnvFilter};

use httpmeter_axum::{config, router, HttpMetrics};

const CONFIG_PATH: &str = "httpmeter.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = if Path::new(CONFIG_PATH).exists() {
        config::load_from_file(CONFIG_PATH).expect("config load failed")
    } else {
        tracing::info!(path = CONFIG_PATH, "no config file; using defaults");
        config::load_from_str("version: 1\n").expect("default config must parse")
    };
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    // Instrument registration errors are configuration errors: refuse to start.
    let registry = Arc::new(Registry::with_namespace(cfg.metrics.namespace.clone()));
    let metrics = HttpMetrics::from_config(registry, &cfg.metrics).expect("metrics setup failed");
    let app = router::build_router(&metrics);

    tracing::info!(%listen, metrics_path = metrics.metrics_path(), "httpmeter-demo starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
