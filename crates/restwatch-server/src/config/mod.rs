//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io;
use std::path::Path;

use restwatch_core::error::{Result, RestwatchError};

pub use schema::{MetricsSection, RestwatchConfig, ServerSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<RestwatchConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        RestwatchError::Config(format!("read {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

/// Like `load_from_file`, but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<RestwatchConfig> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(RestwatchConfig::default())
        }
        Err(e) => Err(RestwatchError::Config(format!(
            "read {} failed: {e}",
            path.display()
        ))),
    }
}

pub fn load_from_str(s: &str) -> Result<RestwatchConfig> {
    let cfg: RestwatchConfig = serde_yaml::from_str(s)
        .map_err(|e| RestwatchError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
