//! Instrument registry with idempotent, typed registration.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::counter::CounterVec;
use super::descriptor::{Descriptor, MetricKind, Opts};
use super::exposition::CONTENT_TYPE;
use super::summary::Summary;
use crate::error::{MetricsError, Result};

#[derive(Clone)]
enum Instrument {
    Counter(Arc<CounterVec>),
    Summary(Arc<Summary>),
}

impl Instrument {
    fn desc(&self) -> &Descriptor {
        match self {
            Instrument::Counter(c) => c.desc(),
            Instrument::Summary(s) => s.desc(),
        }
    }

    fn render(&self, out: &mut String) -> Result<()> {
        match self {
            Instrument::Counter(c) => c.render(out),
            Instrument::Summary(s) => s.render(out),
        }
    }
}

/// Maps fully-qualified metric names to live instruments.
///
/// Registering a descriptor that already exists returns the existing
/// instrument. A name collision with a different kind, label set or help
/// text is a configuration error.
#[derive(Default)]
pub struct Registry {
    namespace: String,
    metrics: DashMap<String, Instrument>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every metric name with `namespace_`.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metrics: DashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn counter_vec(&self, opts: Opts, label_names: &[&str]) -> Result<Arc<CounterVec>> {
        let desc = Descriptor::new(&self.namespace, &opts, MetricKind::Counter, label_names)?;
        match self.register_or_get(desc, |d| Instrument::Counter(Arc::new(CounterVec::new(d))))? {
            Instrument::Counter(c) => Ok(c),
            Instrument::Summary(s) => Err(kind_mismatch(s.desc())),
        }
    }

    pub fn summary(&self, opts: Opts) -> Result<Arc<Summary>> {
        let desc = Descriptor::new(&self.namespace, &opts, MetricKind::Summary, &[])?;
        match self.register_or_get(desc, |d| Instrument::Summary(Arc::new(Summary::new(d))))? {
            Instrument::Summary(s) => Ok(s),
            Instrument::Counter(c) => Err(kind_mismatch(c.desc())),
        }
    }

    /// The entry lock settles construction races: exactly one caller builds
    /// the instrument, every other caller gets a clone of it.
    fn register_or_get(
        &self,
        desc: Descriptor,
        make: impl FnOnce(Descriptor) -> Instrument,
    ) -> Result<Instrument> {
        match self.metrics.entry(desc.fq_name.clone()) {
            Entry::Occupied(e) => {
                let existing = e.get();
                if let Some(detail) = existing.desc().diff(&desc) {
                    return Err(MetricsError::DescriptorMismatch {
                        name: desc.fq_name,
                        detail,
                    });
                }
                tracing::debug!(metric = %desc.fq_name, "metric already registered; reusing");
                Ok(existing.clone())
            }
            Entry::Vacant(v) => {
                tracing::debug!(
                    metric = %desc.fq_name,
                    kind = desc.kind.as_str(),
                    "metric registered"
                );
                let inst = make(desc);
                v.insert(inst.clone());
                Ok(inst)
            }
        }
    }

    pub fn contains(&self, fq_name: &str) -> bool {
        self.metrics.contains_key(fq_name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Render every instrument, families sorted by name.
    ///
    /// Each instrument is read consistently on its own; there is no snapshot
    /// across instruments.
    pub fn render(&self) -> Result<String> {
        let mut insts: Vec<(String, Instrument)> = self
            .metrics
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        insts.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        for (_, inst) in &insts {
            inst.render(&mut out)?;
        }
        Ok(out)
    }

    /// Rendered body plus the content type to serve it with.
    pub fn expose(&self) -> Result<(String, &'static str)> {
        Ok((self.render()?, CONTENT_TYPE))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("namespace", &self.namespace)
            .field("metrics", &self.metrics.len())
            .finish()
    }
}

fn kind_mismatch(existing: &Descriptor) -> MetricsError {
    MetricsError::DescriptorMismatch {
        name: existing.fq_name.clone(),
        detail: format!("registered as {}", existing.kind.as_str()),
    }
}
