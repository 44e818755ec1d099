#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use futures_util::future::join_all;
use tower::ServiceExt;

use httpmeter_axum::HttpMetrics;
use httpmeter_core::metrics::CONTENT_TYPE;
use httpmeter_core::{ErrorClass, Registry};

fn app(metrics: &HttpMetrics) -> Router {
    let router = Router::new()
        .route("/foo", get(|| async { "foo" }))
        .route("/echo", post(|body: Bytes| async move { body }))
        .route("/peek", post(|| async { "ignored the body" }))
        .route("/fixed", get(|| async { vec![b'x'; 1024] }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                "slow"
            }),
        )
        .route(
            "/stream",
            get(|| async {
                let chunks = vec![Ok::<_, Infallible>("abc"), Ok("defgh"), Ok("ij")];
                Body::from_stream(futures_util::stream::iter(chunks))
            }),
        )
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    metrics.install(router)
}

fn setup(subsystem: &str) -> (HttpMetrics, Router) {
    let metrics = HttpMetrics::new(Arc::new(Registry::new()), subsystem).unwrap();
    let router = app(&metrics);
    (metrics, router)
}

async fn send(router: &Router, req: Request<Body>) -> Response {
    router.clone().oneshot(req).await.unwrap()
}

async fn get_and_drain(router: &Router, uri: &str) -> (StatusCode, Bytes) {
    let resp = send(router, Request::get(uri).body(Body::empty()).unwrap()).await;
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

#[tokio::test]
async fn counts_every_concurrent_request() {
    let (metrics, router) = setup("api");
    const N: usize = 64;

    let tasks = (0..N).map(|i| {
        let router = router.clone();
        tokio::spawn(async move {
            let uri = if i % 2 == 0 { "/foo" } else { "/boom" };
            get_and_drain(&router, uri).await
        })
    });
    for r in join_all(tasks).await {
        r.unwrap();
    }

    assert_eq!(metrics.requests_total().total(), N as u64);
    assert_eq!(metrics.requests_total().get(&["200", "GET", "/foo"]).unwrap(), 32);
    assert_eq!(metrics.requests_total().get(&["500", "GET", "/boom"]).unwrap(), 32);
    assert_eq!(metrics.request_duration().count(), N as u64);
    assert_eq!(metrics.request_size().count(), N as u64);
    assert_eq!(metrics.response_size().count(), N as u64);
}

#[tokio::test]
async fn metrics_path_is_never_measured() {
    let (metrics, router) = setup("api");
    get_and_drain(&router, "/foo").await;

    for _ in 0..5 {
        let resp = send(&router, Request::get("/metrics").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
        to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    }

    assert_eq!(metrics.requests_total().total(), 1);
    assert_eq!(metrics.request_duration().count(), 1);
    assert_eq!(metrics.request_size().count(), 1);
    assert_eq!(metrics.response_size().count(), 1);
}

#[tokio::test]
async fn request_size_is_head_plus_body() {
    let (metrics, router) = setup("api");
    let body = vec![b'a'; 1000];

    let req = Request::post("/echo")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, "1000")
        .body(Body::from(body))
        .unwrap();
    let resp = send(&router, req).await;
    assert_eq!(to_bytes(resp.into_body(), usize::MAX).await.unwrap().len(), 1000);

    let head = "POST /echo HTTP/1.1\r\n\
                content-type: application/octet-stream\r\n\
                content-length: 1000\r\n\
                \r\n";
    let snap = metrics.request_size().snapshot();
    assert_eq!(snap.count, 1);
    assert_eq!(snap.sum, (head.len() + 1000) as f64);
}

#[tokio::test]
async fn unread_body_falls_back_to_declared_length() {
    let (metrics, router) = setup("api");
    let req = Request::post("/peek?v=2")
        .header(header::CONTENT_LENGTH, "300")
        .body(Body::from(vec![b'z'; 300]))
        .unwrap();
    send(&router, req).await;

    let head = "POST /peek?v=2 HTTP/1.1\r\ncontent-length: 300\r\n\r\n";
    assert_eq!(metrics.request_size().sum(), (head.len() + 300) as f64);
}

#[tokio::test]
async fn response_size_matches_fixed_payload() {
    let (metrics, router) = setup("api");
    let (status, body) = get_and_drain(&router, "/fixed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 1024);

    let snap = metrics.response_size().snapshot();
    assert_eq!(snap.count, 1);
    assert_eq!(snap.sum, 1024.0);
}

#[tokio::test]
async fn streamed_response_is_counted_when_finished() {
    let (metrics, router) = setup("api");
    let (_, body) = get_and_drain(&router, "/stream").await;
    assert_eq!(&body[..], b"abcdefghij");

    let snap = metrics.response_size().snapshot();
    assert_eq!(snap.count, 1);
    assert_eq!(snap.sum, 10.0);
}

#[tokio::test]
async fn duration_covers_slow_handler() {
    let (metrics, router) = setup("api");
    get_and_drain(&router, "/slow").await;

    let snap = metrics.request_duration().snapshot();
    assert_eq!(snap.count, 1);
    assert!(snap.sum >= 100_000.0, "duration {}us", snap.sum);
    assert!(snap.sum < 2_000_000.0, "duration {}us", snap.sum);
}

#[tokio::test]
async fn same_subsystem_shares_instruments() {
    let registry = Arc::new(Registry::new());
    let a = HttpMetrics::new(Arc::clone(&registry), "shared").unwrap();
    let b = HttpMetrics::new(Arc::clone(&registry), "shared").unwrap();

    assert!(Arc::ptr_eq(a.requests_total(), b.requests_total()));
    assert!(Arc::ptr_eq(a.request_duration(), b.request_duration()));
    assert!(Arc::ptr_eq(a.request_size(), b.request_size()));
    assert!(Arc::ptr_eq(a.response_size(), b.response_size()));
    assert_eq!(registry.len(), 4);

    let ra = app(&a);
    let rb = app(&b);
    get_and_drain(&ra, "/foo").await;
    get_and_drain(&rb, "/foo").await;
    assert_eq!(a.requests_total().get(&["200", "GET", "/foo"]).unwrap(), 2);
}

#[tokio::test]
async fn exposition_reports_labeled_counter() {
    let (_metrics, router) = setup("api");
    for _ in 0..3 {
        get_and_drain(&router, "/foo").await;
    }

    let (status, body) = get_and_drain(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(
        text.contains("api_requests_total{code=\"200\",method=\"GET\",handler=\"/foo\"} 3\n"),
        "{text}"
    );
    assert!(text.contains("# TYPE api_request_duration_microseconds summary\n"));
    assert!(text.contains("api_request_size_bytes_count 3\n"));
    assert!(text.contains("api_response_size_bytes_sum 9\n"));
}

#[tokio::test]
async fn custom_metrics_path() {
    let metrics = HttpMetrics::new(Arc::new(Registry::new()), "api")
        .unwrap()
        .with_metrics_path("/internal/metrics")
        .unwrap();
    let router = app(&metrics);

    let (status, _) = get_and_drain(&router, "/internal/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics.requests_total().total(), 0);
}

#[tokio::test]
async fn application_errors_are_just_labels() {
    let (metrics, router) = setup("api");
    let (status, body) = get_and_drain(&router, "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(&body[..], b"boom");
    assert_eq!(metrics.requests_total().get(&["500", "GET", "/boom"]).unwrap(), 1);
}

#[test]
fn unroutable_metrics_paths_are_config_errors() {
    for bad in ["metrics", "", "/metrics/:id", "/files/*rest", "/with space"] {
        let err = HttpMetrics::new(Arc::new(Registry::new()), "api")
            .unwrap()
            .with_metrics_path(bad)
            .err()
            .unwrap_or_else(|| panic!("accepted metrics path {bad:?}"));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }
}

#[tokio::test]
async fn instrument_only_measures_without_exposition_route() {
    let metrics = HttpMetrics::new(Arc::new(Registry::new()), "api").unwrap();
    let router = metrics.instrument(Router::new().route("/foo", get(|| async { "foo" })));

    let (status, _) = get_and_drain(&router, "/foo").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get_and_drain(&router, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(metrics.requests_total().get(&["200", "GET", "/foo"]).unwrap(), 1);
    assert_eq!(metrics.requests_total().total(), 1);
}
