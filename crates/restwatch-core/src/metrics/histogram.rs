use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use super::{Collector, Desc, HistogramSnapshot, Metric, MetricFamily, MetricKind, Opts, Value};
use crate::error::{Result, RestwatchError};

/// Default upper bounds in seconds: 5ms .. 10s.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

struct AtomicHistogram {
    count: AtomicU64,
    sum_nanos: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(len: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
            buckets: (0..len).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Duration histograms partitioned by a fixed label schema.
///
/// Sums are accumulated in nanoseconds and exported in seconds.
pub struct HistogramVec {
    desc: Desc,
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    pub fn new(opts: Opts, label_names: &[&str]) -> Result<Self> {
        Self::with_buckets(opts, label_names, DEFAULT_BUCKETS.to_vec())
    }

    pub fn with_buckets(opts: Opts, label_names: &[&str], bounds: Vec<f64>) -> Result<Self> {
        let desc = Desc::new(&opts, label_names)?;
        validate_bounds(&desc.fq_name, &bounds)?;
        Ok(Self {
            desc,
            bounds,
            map: DashMap::new(),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, values: &[&str], duration: Duration) -> Result<()> {
        let key = self.desc.label_key(values)?;
        let bounds_len = self.bounds.len();
        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(bounds_len));

        let secs = duration.as_secs_f64();
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        // count goes first: a concurrent snapshot never sees a bucket above it
        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_nanos.fetch_add(nanos, Ordering::Relaxed);
        for (i, &b) in self.bounds.iter().enumerate() {
            if secs <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Number of observations for one label tuple.
    pub fn sample_count(&self, values: &[&str]) -> Result<u64> {
        let key = self.desc.label_key(values)?;
        Ok(self
            .map
            .get(&key)
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    pub(crate) fn snapshot(&self) -> MetricFamily {
        let mut metrics: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| {
                let hist = r.value();
                let buckets = self
                    .bounds
                    .iter()
                    .zip(hist.buckets.iter())
                    .map(|(&le, c)| (le, c.load(Ordering::Relaxed)))
                    .collect();
                let sum_nanos = hist.sum_nanos.load(Ordering::Relaxed);
                let count = hist.count.load(Ordering::Relaxed);
                let snap = HistogramSnapshot {
                    count,
                    sum_seconds: sum_nanos as f64 / 1e9,
                    buckets,
                };
                (r.key().clone(), snap)
            })
            .collect();
        metrics.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.desc.fq_name.clone(),
            help: self.desc.help.clone(),
            kind: MetricKind::Histogram,
            metrics: metrics
                .into_iter()
                .map(|(key, snap)| Metric {
                    labels: self.desc.label_pairs(&key),
                    value: Value::Histogram(snap),
                })
                .collect(),
        }
    }
}

impl Collector for HistogramVec {
    fn describe(&self) -> Vec<Desc> {
        vec![self.desc.clone()]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        vec![self.snapshot()]
    }
}

fn validate_bounds(name: &str, bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(RestwatchError::InvalidMetric(format!(
            "{name}: histogram needs at least one bucket"
        )));
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(RestwatchError::InvalidMetric(format!(
            "{name}: bucket bounds must be finite (+Inf is implicit)"
        )));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(RestwatchError::InvalidMetric(format!(
            "{name}: bucket bounds must be strictly increasing"
        )));
    }
    Ok(())
}
