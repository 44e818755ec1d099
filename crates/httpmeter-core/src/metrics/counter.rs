//! Labeled monotonic counter.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::descriptor::Descriptor;
use super::exposition::{write_header, write_labels};
use crate::error::{MetricsError, Result};

/// Counter partitioned by a fixed label schema.
///
/// Children are keyed by label values in declared order and created on first
/// use. They are never removed.
#[derive(Debug)]
pub struct CounterVec {
    desc: Descriptor,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub(crate) fn new(desc: Descriptor) -> Self {
        Self {
            desc,
            map: DashMap::new(),
        }
    }

    pub fn desc(&self) -> &Descriptor {
        &self.desc
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[&str], v: u64) -> Result<()> {
        let key = self.key(values)?;
        // Existing children only need the shard read lock.
        if let Some(c) = self.map.get(&key) {
            c.fetch_add(v, Ordering::Relaxed);
            return Ok(());
        }
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value of one child. 0 when the child does not exist yet.
    pub fn get(&self, values: &[&str]) -> Result<u64> {
        let key = self.key(values)?;
        Ok(self
            .map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    /// Sum across every label combination.
    pub fn total(&self) -> u64 {
        self.map.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    /// Number of label combinations seen.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn key(&self, values: &[&str]) -> Result<Vec<String>> {
        if values.len() != self.desc.label_names.len() {
            return Err(MetricsError::LabelCardinality {
                name: self.desc.fq_name.clone(),
                expected: self.desc.label_names.len(),
                got: values.len(),
            });
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, out: &mut String) -> Result<()> {
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        rows.sort();

        write_header(out, &self.desc)?;
        for (values, val) in rows {
            out.push_str(&self.desc.fq_name);
            write_labels(out, &self.desc.label_names, &values)?;
            writeln!(out, " {}", val)?;
        }
        Ok(())
    }
}
