//! Shared error type across httpmeter crates.

use thiserror::Error;

/// Where an error belongs in the failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad names, schema collisions, invalid config. Fatal at construction.
    Configuration,
    /// Failures while measuring a request. Logged and recovered.
    Measurement,
    /// Rendering the exposition body failed. 5xx on the metrics path only.
    Exposition,
}

impl ErrorClass {
    /// Stable string form used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Configuration => "CONFIGURATION",
            ErrorClass::Measurement => "MEASUREMENT",
            ErrorClass::Exposition => "EXPOSITION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and adapters.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("descriptor mismatch for {name}: {detail}")]
    DescriptorMismatch { name: String, detail: String },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("label cardinality mismatch for {name}: expected {expected} values, got {got}")]
    LabelCardinality {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("measurement failed: {0}")]
    Measurement(String),
    #[error("render failed: {0}")]
    Render(String),
}

impl MetricsError {
    /// Map the error onto the taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            MetricsError::InvalidName(_)
            | MetricsError::DescriptorMismatch { .. }
            | MetricsError::Config(_) => ErrorClass::Configuration,
            MetricsError::LabelCardinality { .. } | MetricsError::Measurement(_) => {
                ErrorClass::Measurement
            }
            MetricsError::Render(_) => ErrorClass::Exposition,
        }
    }

    /// True for errors the process must not start serving with.
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }
}

impl From<std::fmt::Error> for MetricsError {
    fn from(e: std::fmt::Error) -> Self {
        MetricsError::Render(e.to_string())
    }
}
