//! The metrics object owned by the middleware.
//!
//! `HttpMetrics` registers the four HTTP instruments on an explicit
//! [`Registry`] and carries the settings the interceptor needs. It is cheap
//! to clone and is the state of both the middleware and the exposition route.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use futures_util::future::BoxFuture;
use httpmeter_core::error::Result;
use httpmeter_core::metrics::{CounterVec, Opts, Registry, Summary};

use crate::config::{validate_metrics_path, MetricsSection};
use crate::middleware::{track, RequestHead};
use crate::ops;

pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_REQUEST_SIZE_TIMEOUT: Duration = Duration::from_secs(1);

/// `handler` label value for requests no route matched.
pub const UNMATCHED_HANDLER: &str = "unmatched";

pub const REQUEST_LABELS: [&str; 3] = ["code", "method", "handler"];

/// Measures a request head off the request path. Swappable in tests.
pub(crate) type HeadMeasure =
    Arc<dyn Fn(RequestHead) -> BoxFuture<'static, io::Result<u64>> + Send + Sync>;

fn wire_head_measure() -> HeadMeasure {
    Arc::new(|head: RequestHead| -> BoxFuture<'static, io::Result<u64>> {
        Box::pin(async move { head.wire_len() })
    })
}

struct Instruments {
    requests_total: Arc<CounterVec>,
    request_duration: Arc<Summary>,
    request_size: Arc<Summary>,
    response_size: Arc<Summary>,
}

#[derive(Clone)]
pub struct HttpMetrics {
    registry: Arc<Registry>,
    instruments: Arc<Instruments>,
    metrics_path: Arc<str>,
    request_size_timeout: Duration,
    head_measure: HeadMeasure,
}

impl HttpMetrics {
    /// Register (or reuse) the HTTP instruments under `subsystem`.
    ///
    /// Errors are configuration errors: an invalid subsystem, or a metric of
    /// the same name registered with another schema. Do not serve traffic
    /// when this fails.
    pub fn new(registry: Arc<Registry>, subsystem: &str) -> Result<Self> {
        let requests_total = registry.counter_vec(
            Opts::new(
                "requests_total",
                "How many HTTP requests processed, partitioned by status code and HTTP method.",
            )
            .subsystem(subsystem),
            &REQUEST_LABELS,
        )?;
        let request_duration = registry.summary(
            Opts::new(
                "request_duration_microseconds",
                "The HTTP request latencies in microseconds.",
            )
            .subsystem(subsystem),
        )?;
        let request_size = registry.summary(
            Opts::new("request_size_bytes", "The HTTP request sizes in bytes.")
                .subsystem(subsystem),
        )?;
        let response_size = registry.summary(
            Opts::new("response_size_bytes", "The HTTP response sizes in bytes.")
                .subsystem(subsystem),
        )?;

        tracing::info!(subsystem, namespace = registry.namespace(), "http metrics ready");

        Ok(Self {
            registry,
            instruments: Arc::new(Instruments {
                requests_total,
                request_duration,
                request_size,
                response_size,
            }),
            metrics_path: Arc::from(DEFAULT_METRICS_PATH),
            request_size_timeout: DEFAULT_REQUEST_SIZE_TIMEOUT,
            head_measure: wire_head_measure(),
        })
    }

    /// Build from a validated config section.
    pub fn from_config(registry: Arc<Registry>, cfg: &MetricsSection) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(registry, &cfg.subsystem)?
            .with_metrics_path(&cfg.path)?
            .with_request_size_timeout(cfg.request_size_timeout()))
    }

    /// Serve the exposition route on `path` instead of `/metrics`.
    ///
    /// Rejects paths axum could not register as a literal route.
    pub fn with_metrics_path(mut self, path: &str) -> Result<Self> {
        validate_metrics_path(path)?;
        self.metrics_path = Arc::from(path);
        Ok(self)
    }

    pub fn with_request_size_timeout(mut self, timeout: Duration) -> Self {
        self.request_size_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_head_measure(mut self, measure: HeadMeasure) -> Self {
        self.head_measure = measure;
        self
    }

    pub(crate) fn head_measure(&self) -> &HeadMeasure {
        &self.head_measure
    }

    /// Wrap every route registered so far with [`track`], without adding the
    /// exposition route. For hosts that serve the registry elsewhere.
    pub fn instrument<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self.clone(), track))
    }

    /// Serve the exposition route on `metrics_path` and wrap every route
    /// registered so far with [`track`].
    ///
    /// Call this after the application routes are added; axum layers only
    /// apply to routes that already exist.
    ///
    /// # Panics
    ///
    /// axum panics when `router` already has a route at `metrics_path`.
    /// Pick a metrics path the application does not use.
    pub fn install<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let router = router.route(
            &self.metrics_path,
            get(ops::metrics).with_state(self.clone()),
        );
        self.instrument(router)
    }

    /// Rendered exposition body and its content type.
    pub fn expose(&self) -> Result<(String, &'static str)> {
        self.registry.expose()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn metrics_path(&self) -> &str {
        &self.metrics_path
    }

    pub fn request_size_timeout(&self) -> Duration {
        self.request_size_timeout
    }

    pub fn requests_total(&self) -> &Arc<CounterVec> {
        &self.instruments.requests_total
    }

    pub fn request_duration(&self) -> &Arc<Summary> {
        &self.instruments.request_duration
    }

    pub fn request_size(&self) -> &Arc<Summary> {
        &self.instruments.request_size
    }

    pub fn response_size(&self) -> &Arc<Summary> {
        &self.instruments.response_size
    }
}
