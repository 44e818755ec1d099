//! Streaming count/sum summary.

use std::fmt::Write;

use parking_lot::Mutex;

use super::descriptor::Descriptor;
use super::exposition::{fmt_float, write_header};
use crate::error::Result;

/// Point-in-time view of a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummarySnapshot {
    pub count: u64,
    pub sum: f64,
}

#[derive(Default)]
struct State {
    count: u64,
    sum: f64,
}

/// Unlabeled summary tracking count and sum of observed values.
///
/// Count and sum are updated under one lock so a snapshot never pairs a
/// count with a sum from a different set of observations.
pub struct Summary {
    desc: Descriptor,
    state: Mutex<State>,
}

impl Summary {
    pub(crate) fn new(desc: Descriptor) -> Self {
        Self {
            desc,
            state: Mutex::new(State::default()),
        }
    }

    pub fn desc(&self) -> &Descriptor {
        &self.desc
    }

    pub fn observe(&self, v: f64) {
        let mut s = self.state.lock();
        s.count += 1;
        s.sum += v;
    }

    pub fn snapshot(&self) -> SummarySnapshot {
        let s = self.state.lock();
        SummarySnapshot {
            count: s.count,
            sum: s.sum,
        }
    }

    pub fn count(&self) -> u64 {
        self.snapshot().count
    }

    pub fn sum(&self) -> f64 {
        self.snapshot().sum
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, out: &mut String) -> Result<()> {
        let snap = self.snapshot();
        write_header(out, &self.desc)?;
        writeln!(out, "{}_sum {}", self.desc.fq_name, fmt_float(snap.sum))?;
        writeln!(out, "{}_count {}", self.desc.fq_name, snap.count)?;
        Ok(())
    }
}

impl std::fmt::Debug for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summary")
            .field("name", &self.desc.fq_name)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
