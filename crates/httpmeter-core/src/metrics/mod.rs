//! In-process metric instruments and their registry.
//!
//! Instruments are plain atomics/locks; the registry maps fully-qualified
//! names to typed handles and renders everything in the Prometheus text
//! exposition format.

pub mod counter;
pub mod descriptor;
pub mod exposition;
pub mod registry;
pub mod summary;

pub use counter::CounterVec;
pub use descriptor::{Descriptor, MetricKind, Opts};
pub use exposition::CONTENT_TYPE;
pub use registry::Registry;
pub use summary::{Summary, SummarySnapshot};
