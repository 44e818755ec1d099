//! Top-level facade crate for httpmeter.
//!
//! Re-exports the core instruments and the axum adapter so users can depend on a single crate.

pub mod core {
    pub use httpmeter_core::*;
}

pub mod axum {
    pub use httpmeter_axum::*;
}

pub use httpmeter_axum::HttpMetrics;
pub use httpmeter_core::{MetricsError, Registry};
