#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use httpmeter_axum::{config, HttpMetrics};
use httpmeter_core::{ErrorClass, Registry};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  subsystem: "api"
  pth: "/metrics" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.class(), ErrorClass::Configuration);
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.metrics.path, "/metrics");
    assert_eq!(cfg.metrics.subsystem, "");
    assert_eq!(cfg.metrics.request_size_timeout(), Duration::from_millis(1000));
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
}

#[test]
fn rejects_bad_values() {
    for bad in [
        "version: 2\n",
        "version: 1\nmetrics:\n  path: \"metrics\"\n",
        "version: 1\nmetrics:\n  path: \"/metrics/:id\"\n",
        "version: 1\nmetrics:\n  request_size_timeout_ms: 0\n",
        "version: 1\nmetrics:\n  subsystem: \"my-app\"\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "accepted: {bad}");
    }
}

#[test]
fn config_drives_metrics() {
    let cfg = config::load_from_str(
        r#"
version: 1
metrics:
  namespace: "acme"
  subsystem: "api"
  path: "/internal/metrics"
  request_size_timeout_ms: 250
"#,
    )
    .unwrap();

    let registry = Arc::new(Registry::with_namespace(cfg.metrics.namespace.clone()));
    let m = HttpMetrics::from_config(Arc::clone(&registry), &cfg.metrics).unwrap();
    assert_eq!(m.metrics_path(), "/internal/metrics");
    assert_eq!(m.request_size_timeout(), Duration::from_millis(250));
    assert!(registry.contains("acme_api_requests_total"));
    assert!(registry.contains("acme_api_request_duration_microseconds"));
    assert!(registry.contains("acme_api_request_size_bytes"));
    assert!(registry.contains("acme_api_response_size_bytes"));
}
