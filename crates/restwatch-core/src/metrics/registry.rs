use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use super::{encode_text, Desc, MetricFamily};
use crate::error::{Result, RestwatchError};

/// Something that can describe and report its own metric series.
///
/// Both calls run synchronously inside a scrape: read in-memory state only,
/// never block or do I/O.
pub trait Collector: Send + Sync {
    fn describe(&self) -> Vec<Desc>;
    fn collect(&self) -> Vec<MetricFamily>;
}

struct Registered {
    names: Vec<String>,
    collector: Arc<dyn Collector>,
}

#[derive(Default)]
struct RegistryInner {
    names: HashSet<String>,
    collectors: Vec<Registered>,
}

/// Process-wide set of collectors, scraped on demand.
///
/// Construct once at startup and inject it; there is no ambient global.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Fails without side effects if any of its
    /// series names is already taken.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let descs = collector.describe();
        if descs.is_empty() {
            return Err(RestwatchError::InvalidMetric(
                "collector describes no metrics".into(),
            ));
        }

        let mut names: Vec<String> = Vec::with_capacity(descs.len());
        for d in descs {
            if names.contains(&d.fq_name) {
                return Err(RestwatchError::AlreadyRegistered(d.fq_name));
            }
            names.push(d.fq_name);
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(taken) = names.iter().find(|n| inner.names.contains(*n)) {
            return Err(RestwatchError::AlreadyRegistered(taken.clone()));
        }
        inner.names.extend(names.iter().cloned());
        tracing::debug!(metrics = ?names, "metrics collector registered");
        inner.collectors.push(Registered { names, collector });
        Ok(())
    }

    /// Remove a previously registered collector. Returns false if unknown.
    pub fn unregister(&self, collector: &Arc<dyn Collector>) -> bool {
        let target = Arc::as_ptr(collector) as *const ();
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = inner
            .collectors
            .iter()
            .position(|r| Arc::as_ptr(&r.collector) as *const () == target)
        else {
            return false;
        };
        let removed = inner.collectors.remove(pos);
        for n in &removed.names {
            inner.names.remove(n);
        }
        true
    }

    /// Names of all registered series, sorted.
    pub fn metric_names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = inner.names.iter().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot every registered collector, families sorted by name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        // collect outside the lock so a slow collector never stalls register
        let collectors: Vec<Arc<dyn Collector>> = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            inner
                .collectors
                .iter()
                .map(|r| Arc::clone(&r.collector))
                .collect()
        };

        let mut families: Vec<MetricFamily> =
            collectors.iter().flat_map(|c| c.collect()).collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        families
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        encode_text(&self.gather())
    }
}
