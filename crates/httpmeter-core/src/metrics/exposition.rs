//! Prometheus text exposition helpers (format 0.0.4).

use std::fmt::Write;

use super::descriptor::Descriptor;
use crate::error::Result;

/// Content type served with the rendered body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// HELP text escapes backslash and newline only.
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

pub fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

pub(crate) fn write_header(out: &mut String, desc: &Descriptor) -> Result<()> {
    writeln!(out, "# HELP {} {}", desc.fq_name, escape_help(&desc.help))?;
    writeln!(out, "# TYPE {} {}", desc.fq_name, desc.kind.as_str())?;
    Ok(())
}

/// `{k1="v1",k2="v2"}`; nothing when there are no labels.
pub(crate) fn write_labels(out: &mut String, names: &[String], values: &[String]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    out.push('{');
    for (i, (k, v)) in names.iter().zip(values).enumerate() {
        if i > 0 {
            out.push(',');
        }
        write!(out, "{}=\"{}\"", k, escape_label(v))?;
    }
    out.push('}');
    Ok(())
}
