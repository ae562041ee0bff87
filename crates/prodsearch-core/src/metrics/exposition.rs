//! Prometheus text exposition format (0.0.4).

use std::fmt::Write;

use super::descriptor::MetricKind;
use super::snapshot::{FamilySnapshot, SampleValue};
use crate::error::Result;

/// Content type served with [`encode_text`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        v.to_string()
    }
}

fn label_block(pairs: &[(String, String)], extra: Option<(&str, &str)>) -> String {
    let mut parts: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some((k, v)) = extra {
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

/// Encode snapshots: `# HELP` and `# TYPE` once per family, then one line per
/// series (three or more for histograms).
pub fn encode_text(families: &[FamilySnapshot]) -> Result<String> {
    let mut out = String::new();
    for family in families {
        encode_family(family, &mut out)?;
    }
    Ok(out)
}

fn encode_family(family: &FamilySnapshot, out: &mut String) -> Result<()> {
    let name = &family.name;
    writeln!(out, "# HELP {} {}", name, escape_help(&family.help))?;
    writeln!(out, "# TYPE {} {}", name, family.kind.as_str())?;

    for series in &family.series {
        match (&series.value, family.kind) {
            (SampleValue::Counter(v), MetricKind::Counter) => {
                writeln!(out, "{}{} {}", name, label_block(&series.labels, None), v)?;
            }
            (SampleValue::Gauge(v), MetricKind::Gauge) => {
                writeln!(out, "{}{} {}", name, label_block(&series.labels, None), v)?;
            }
            (SampleValue::Histogram(h), MetricKind::Histogram) => {
                for (le, count) in &h.buckets {
                    let le = format_float(*le);
                    writeln!(
                        out,
                        "{}_bucket{} {}",
                        name,
                        label_block(&series.labels, Some(("le", le.as_str()))),
                        count
                    )?;
                }
                writeln!(
                    out,
                    "{}_bucket{} {}",
                    name,
                    label_block(&series.labels, Some(("le", "+Inf"))),
                    h.count
                )?;
                let labels = label_block(&series.labels, None);
                writeln!(out, "{}_sum{} {}", name, labels, format_float(h.sum))?;
                writeln!(out, "{}_count{} {}", name, labels, h.count)?;
            }
            _ => {
                tracing::warn!(metric = %name, "sample kind does not match family type, skipped");
            }
        }
    }
    Ok(())
}
