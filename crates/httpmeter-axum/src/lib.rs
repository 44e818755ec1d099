//! httpmeter axum adapter.
//!
//! Wires the core instruments into an axum router: the request interceptor,
//! the exposition endpoint, and a strict YAML config for hosts that want one.
//! Consumed by the demo binary (`main.rs`) and by integration tests.

pub mod config;
pub mod meter;
pub mod middleware;
pub mod ops;
pub mod router;

pub use meter::HttpMetrics;
pub use middleware::track;
