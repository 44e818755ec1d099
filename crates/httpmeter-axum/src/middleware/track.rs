//! The request interceptor.
//!
//! Per request: time the handler chain, measure the request on the side,
//! then record count, latency, request size and response size. Nothing here
//! can fail or alter the request or the response.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use http_body::Body as _;
use httpmeter_core::Summary;
use tokio::task::JoinHandle;

use crate::meter::{HeadMeasure, HttpMetrics, UNMATCHED_HANDLER};
use crate::middleware::body::{BodyTally, CountingBody};
use crate::middleware::wire::RequestHead;

/// Interceptor for `axum::middleware::from_fn_with_state(metrics, track)`.
///
/// Records `requests_total`, request duration, request size and response
/// size for every request except those to the metrics path.
pub async fn track(State(metrics): State<HttpMetrics>, req: Request, next: Next) -> Response {
    // Control flow, not an optimization: the exposition route must never be
    // measured, or every scrape would record itself.
    if req.uri().path() == metrics.metrics_path() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().clone();
    let handler = handler_label(&req);
    let (req, pending) = PendingSize::start(req, metrics.head_measure());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    let elapsed = start.elapsed().as_nanos() as f64 / 1_000.0;

    metrics.request_duration().observe(elapsed);
    if let Err(e) = metrics
        .requests_total()
        .inc(&[status.as_str(), method.as_str(), handler.as_str()])
    {
        tracing::warn!(error = %e, class = e.class().as_str(), "request not counted");
    }
    let req_sz = pending.finish(metrics.request_size_timeout()).await;
    metrics.request_size().observe(req_sz as f64);

    observe_response_size(response, metrics.response_size())
}

fn handler_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_HANDLER.to_owned())
}

/// Request size measurement in flight for one request.
struct PendingSize {
    head: JoinHandle<io::Result<u64>>,
    tally: Arc<BodyTally>,
    body_hint: Option<u64>,
}

impl PendingSize {
    /// Spawn head serialization and wrap the body so consumed bytes are
    /// counted. The body content is never read twice.
    fn start(req: Request, measure: &HeadMeasure) -> (Request, Self) {
        let (parts, body) = req.into_parts();
        let head = RequestHead::from_parts(&parts);
        let body_hint = body
            .size_hint()
            .exact()
            .or_else(|| content_length(&parts.headers));

        let handle = tokio::spawn(measure(head));
        let (body, tally) = CountingBody::new(body);

        let pending = Self {
            head: handle,
            tally,
            body_hint,
        };
        (Request::from_parts(parts, Body::new(body)), pending)
    }

    /// Head plus body bytes; 0 when the head could not be measured in time.
    async fn finish(mut self, timeout: Duration) -> u64 {
        let head = match tokio::time::timeout(timeout, &mut self.head).await {
            Ok(Ok(Ok(n))) => n,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "request serialization failed; size recorded as 0");
                return 0;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "request size task failed; size recorded as 0");
                return 0;
            }
            Err(_) => {
                self.head.abort();
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "request size timed out; size recorded as 0"
                );
                return 0;
            }
        };
        head + self.body_len()
    }

    /// The handler may not read the whole body. Then the declared length is
    /// what went over the wire.
    fn body_len(&self) -> u64 {
        if self.tally.is_complete() {
            return self.tally.bytes();
        }
        self.body_hint.unwrap_or_else(|| self.tally.bytes())
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Known-length bodies are observed now; streamed bodies when they finish.
fn observe_response_size(response: Response, summary: &Arc<Summary>) -> Response {
    if let Some(n) = response.body().size_hint().exact() {
        summary.observe(n as f64);
        return response;
    }
    let summary = Arc::clone(summary);
    response.map(|body| Body::new(CountingBody::observed(body, summary)))
}
