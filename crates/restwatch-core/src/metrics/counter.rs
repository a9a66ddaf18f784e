use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::{Collector, Desc, Metric, MetricFamily, MetricKind, Opts, Value};
use crate::error::Result;

/// Monotonic counters partitioned by a fixed label schema.
pub struct CounterVec {
    desc: Desc,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(opts: Opts, label_names: &[&str]) -> Result<Self> {
        Ok(Self {
            desc: Desc::new(&opts, label_names)?,
            map: DashMap::new(),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[&str], v: u64) -> Result<()> {
        let key = self.desc.label_key(values)?;
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value; zero for a label tuple that was never touched.
    pub fn get(&self, values: &[&str]) -> Result<u64> {
        let key = self.desc.label_key(values)?;
        Ok(self
            .map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    pub(crate) fn snapshot(&self) -> MetricFamily {
        let mut metrics: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        metrics.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.desc.fq_name.clone(),
            help: self.desc.help.clone(),
            kind: MetricKind::Counter,
            metrics: metrics
                .into_iter()
                .map(|(key, v)| Metric {
                    labels: self.desc.label_pairs(&key),
                    value: Value::Counter(v),
                })
                .collect(),
        }
    }
}

impl Collector for CounterVec {
    fn describe(&self) -> Vec<Desc> {
        vec![self.desc.clone()]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        vec![self.snapshot()]
    }
}
