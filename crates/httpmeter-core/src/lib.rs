//! httpmeter core: transport-agnostic instruments, registry and exposition.
//!
//! This crate owns the metric types shared by every HTTP adapter: counters,
//! summaries, the registry that hands them out, and the Prometheus text
//! renderer. It carries no HTTP or runtime dependencies so adapters for other
//! frameworks can reuse it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Every fallible path surfaces as `MetricsError`/`Result` so a metrics bug
//! cannot take the host process down after startup.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod size;

/// Shared result type.
pub use error::{ErrorClass, MetricsError, Result};
pub use metrics::{CounterVec, Registry, Summary};
pub use size::SizeCounter;
