//! Prometheus text exposition format (0.0.4).

use std::fmt::Write;

use super::{MetricFamily, Value};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn label_str(labels: &[(String, String)], extra: Option<(&str, &str)>) -> String {
    let mut parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some((k, v)) = extra {
        parts.push(format!("{}=\"{}\"", k, v));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

pub fn encode_text(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for fam in families {
        let name = &fam.name;
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&fam.help));
        let _ = writeln!(out, "# TYPE {} {}", name, fam.kind.as_str());

        for m in &fam.metrics {
            match &m.value {
                Value::Counter(v) => {
                    let _ = writeln!(out, "{}{} {}", name, label_str(&m.labels, None), v);
                }
                Value::Histogram(h) => {
                    for (le, count) in &h.buckets {
                        let le = le.to_string();
                        let _ = writeln!(
                            out,
                            "{}_bucket{} {}",
                            name,
                            label_str(&m.labels, Some(("le", &le))),
                            count
                        );
                    }
                    let _ = writeln!(
                        out,
                        "{}_bucket{} {}",
                        name,
                        label_str(&m.labels, Some(("le", "+Inf"))),
                        h.count
                    );
                    let labels = label_str(&m.labels, None);
                    let _ = writeln!(out, "{}_sum{} {}", name, labels, h.sum_seconds);
                    let _ = writeln!(out, "{}_count{} {}", name, labels, h.count);
                }
            }
        }
    }
    out
}
