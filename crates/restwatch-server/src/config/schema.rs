use std::net::SocketAddr;

use serde::Deserialize;

use restwatch_core::error::{Result, RestwatchError};
use restwatch_core::metrics::DEFAULT_BUCKETS;

use crate::obs::MetricsOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestwatchConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for RestwatchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl RestwatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RestwatchError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.max_body_bytes == 0 {
            return Err(RestwatchError::Config(
                "server.max_body_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            RestwatchError::Config(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_subsystem")]
    pub subsystem: String,

    #[serde(default = "default_endpoint_label")]
    pub endpoint_label: bool,

    #[serde(default = "default_buckets")]
    pub buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
            endpoint_label: default_endpoint_label(),
            buckets: default_buckets(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [("namespace", &self.namespace), ("subsystem", &self.subsystem)] {
            if !v.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(RestwatchError::Config(format!(
                    "metrics.{field} may only contain [a-zA-Z0-9_]"
                )));
            }
        }
        if self.buckets.is_empty() {
            return Err(RestwatchError::Config("metrics.buckets must not be empty".into()));
        }
        if self.buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(RestwatchError::Config(
                "metrics.buckets must be positive and finite".into(),
            ));
        }
        if self.buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RestwatchError::Config(
                "metrics.buckets must be strictly increasing".into(),
            ));
        }
        Ok(())
    }
}

impl From<&MetricsSection> for MetricsOptions {
    fn from(m: &MetricsSection) -> Self {
        Self {
            namespace: m.namespace.clone(),
            subsystem: m.subsystem.clone(),
            endpoint_label: m.endpoint_label,
            buckets: m.buckets.clone(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}
fn default_namespace() -> String {
    "monitoring".into()
}
fn default_subsystem() -> String {
    "rest".into()
}
fn default_endpoint_label() -> bool {
    true
}
fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
