use std::time::Duration;

use httpmeter_core::error::{MetricsError, Result};
use httpmeter_core::metrics::descriptor::is_valid_metric_name;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    pub version: u32,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub server: ServerSection,
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub subsystem: String,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_request_size_timeout_ms")]
    pub request_size_timeout_ms: u64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            subsystem: String::new(),
            path: default_path(),
            request_size_timeout_ms: default_request_size_timeout_ms(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_metrics_path(&self.path)?;
        if !(1..=60000).contains(&self.request_size_timeout_ms) {
            return Err(MetricsError::Config(
                "metrics.request_size_timeout_ms must be between 1 and 60000".into(),
            ));
        }
        for (field, v) in [("namespace", &self.namespace), ("subsystem", &self.subsystem)] {
            if !v.is_empty() && !is_valid_metric_name(v) {
                return Err(MetricsError::Config(format!(
                    "metrics.{field} {v:?} is not a valid metric name segment"
                )));
            }
        }
        Ok(())
    }

    pub fn request_size_timeout(&self) -> Duration {
        Duration::from_millis(self.request_size_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// A literal absolute route path: leading `/`, no whitespace, and no `:` or
/// `*` segments, which axum would treat as captures.
pub fn validate_metrics_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(MetricsError::Config(format!(
            "metrics.path {path:?} must start with '/'"
        )));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(MetricsError::Config(format!(
            "metrics.path {path:?} must not contain whitespace"
        )));
    }
    if path.split('/').any(|seg| seg.starts_with(':') || seg.starts_with('*')) {
        return Err(MetricsError::Config(format!(
            "metrics.path {path:?} must not contain capture segments"
        )));
    }
    Ok(())
}

fn default_path() -> String {
    "/metrics".into()
}
fn default_request_size_timeout_ms() -> u64 {
    1000
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
