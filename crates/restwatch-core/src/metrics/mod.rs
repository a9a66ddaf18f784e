//! Pull-based metrics registry (dependency-light).
//!
//! Collectors own their series and hand out read-only snapshots when the
//! registry is scraped. Label-scoped values live in `DashMap`s of atomics so
//! concurrent writers never lose updates and scrapes never block them for
//! longer than a shard read.
//!
//! The registry is an explicit value: construct it once at startup and pass
//! it (usually as `Arc<Registry>`) to whatever registers or scrapes.

mod counter;
mod desc;
mod encode;
mod histogram;
mod registry;

pub use counter::CounterVec;
pub use desc::{Desc, Opts};
pub use encode::{encode_text, TEXT_CONTENT_TYPE};
pub use histogram::{HistogramVec, DEFAULT_BUCKETS};
pub use registry::{Collector, Registry};

/// Kind of a metric family, as printed on its `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Point-in-time histogram values for one label tuple.
///
/// `buckets` holds `(upper_bound_seconds, cumulative_count)` pairs; the
/// implicit `+Inf` bucket equals `count`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum_seconds: f64,
    pub buckets: Vec<(f64, u64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Counter(u64),
    Histogram(HistogramSnapshot),
}

/// One labeled series inside a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub labels: Vec<(String, String)>,
    pub value: Value,
}

impl Metric {
    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Everything a collector reports for one metric name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub metrics: Vec<Metric>,
}

impl MetricFamily {
    /// Find the series whose label values match `values` in schema order.
    pub fn find(&self, values: &[&str]) -> Option<&Metric> {
        self.metrics.iter().find(|m| {
            m.labels.len() == values.len()
                && m.labels.iter().zip(values).all(|((_, v), want)| v == want)
        })
    }
}
