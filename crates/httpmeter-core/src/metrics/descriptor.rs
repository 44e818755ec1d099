//! Metric descriptors and name validation.

use crate::error::{MetricsError, Result};

/// Instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Summary,
}

impl MetricKind {
    /// Value used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Summary => "summary",
        }
    }
}

/// Caller-facing naming options. The registry adds its namespace.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    pub subsystem: String,
    pub name: String,
    pub help: String,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            subsystem: String::new(),
            name: name.into(),
            help: help.into(),
        }
    }

    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }
}

/// Fully resolved identity of an instrument.
///
/// Two descriptors are compatible only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub fq_name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
}

impl Descriptor {
    pub fn new(
        namespace: &str,
        opts: &Opts,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Self> {
        if opts.name.is_empty() {
            return Err(MetricsError::InvalidName("metric name must not be empty".into()));
        }
        let fq_name = fq_name(namespace, &opts.subsystem, &opts.name);
        if !is_valid_metric_name(&fq_name) {
            return Err(MetricsError::InvalidName(format!("metric name {fq_name:?}")));
        }

        let mut labels: Vec<String> = Vec::with_capacity(label_names.len());
        for l in label_names {
            if !is_valid_label_name(l) {
                return Err(MetricsError::InvalidName(format!(
                    "label name {l:?} on {fq_name}"
                )));
            }
            if labels.iter().any(|x| x == l) {
                return Err(MetricsError::InvalidName(format!(
                    "duplicate label name {l:?} on {fq_name}"
                )));
            }
            labels.push((*l).to_string());
        }

        Ok(Self {
            fq_name,
            help: opts.help.clone(),
            kind,
            label_names: labels,
        })
    }

    /// Describe the first difference from `other`, if any.
    pub fn diff(&self, other: &Descriptor) -> Option<String> {
        if self.kind != other.kind {
            return Some(format!(
                "registered as {}, requested as {}",
                self.kind.as_str(),
                other.kind.as_str()
            ));
        }
        if self.label_names != other.label_names {
            return Some(format!(
                "registered labels {:?}, requested {:?}",
                self.label_names, other.label_names
            ));
        }
        if self.help != other.help {
            return Some("help text differs".into());
        }
        None
    }
}

/// Join non-empty segments with `_`.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, `__` prefix reserved.
pub fn is_valid_label_name(s: &str) -> bool {
    if s.starts_with("__") {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
