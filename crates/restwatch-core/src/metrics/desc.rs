use crate::error::{Result, RestwatchError};

/// Naming options for a metric, joined into `namespace_subsystem_name`.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    pub namespace: String,
    pub subsystem: String,
    pub name: String,
    pub help: String,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            ..Self::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    /// Fully-qualified name. Empty parts are skipped.
    pub fn fq_name(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Immutable description of a metric series: name, help text, label schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub fq_name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl Desc {
    pub fn new(opts: &Opts, label_names: &[&str]) -> Result<Self> {
        let fq_name = opts.fq_name();
        if !valid_metric_name(&fq_name) {
            return Err(RestwatchError::InvalidMetric(format!(
                "'{fq_name}' is not a valid metric name"
            )));
        }
        if opts.help.is_empty() {
            return Err(RestwatchError::InvalidMetric(format!(
                "{fq_name}: help text must not be empty"
            )));
        }

        let mut names: Vec<String> = Vec::with_capacity(label_names.len());
        for &l in label_names {
            if !valid_label_name(l) {
                return Err(RestwatchError::InvalidMetric(format!(
                    "{fq_name}: '{l}' is not a valid label name"
                )));
            }
            if names.iter().any(|n| n == l) {
                return Err(RestwatchError::InvalidMetric(format!(
                    "{fq_name}: duplicate label name '{l}'"
                )));
            }
            names.push(l.to_string());
        }

        Ok(Self {
            fq_name,
            help: opts.help.clone(),
            label_names: names,
        })
    }

    /// Turn label values into an owned map key, checking cardinality.
    pub(crate) fn label_key(&self, values: &[&str]) -> Result<Vec<String>> {
        if values.len() != self.label_names.len() {
            return Err(RestwatchError::LabelMismatch {
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    /// Pair a stored key back up with the schema.
    pub(crate) fn label_pairs(&self, key: &[String]) -> Vec<(String, String)> {
        self.label_names
            .iter()
            .cloned()
            .zip(key.iter().cloned())
            .collect()
    }
}

fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

// `le` is reserved for histogram buckets, `__` prefixes for internal use.
fn valid_label_name(name: &str) -> bool {
    if name == "le" || name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
