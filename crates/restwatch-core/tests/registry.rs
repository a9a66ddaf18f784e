//! Registry registration and scrape contract.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use restwatch_core::metrics::{Collector, CounterVec, HistogramVec, Opts, Registry, Value};
use restwatch_core::RestwatchError;

fn requests() -> Arc<CounterVec> {
    let opts = Opts::new("http_requests_total", "Total number of requests received.")
        .namespace("monitoring")
        .subsystem("rest");
    Arc::new(CounterVec::new(opts, &["code", "method"]).unwrap())
}

#[test]
fn duplicate_name_is_rejected() {
    let registry = Registry::new();
    registry.register(requests()).unwrap();

    let err = registry.register(requests()).expect_err("second must fail");
    assert!(err.is_startup_fatal());
    match err {
        RestwatchError::AlreadyRegistered(name) => {
            assert_eq!(name, "monitoring_rest_http_requests_total")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(registry.metric_names().len(), 1);
}

#[test]
fn failed_registration_leaves_registry_unchanged() {
    struct Pair(Arc<CounterVec>, Arc<HistogramVec>);
    impl Collector for Pair {
        fn describe(&self) -> Vec<restwatch_core::metrics::Desc> {
            let mut d = self.0.describe();
            d.extend(self.1.describe());
            d
        }
        fn collect(&self) -> Vec<restwatch_core::metrics::MetricFamily> {
            let mut f = self.0.collect();
            f.extend(self.1.collect());
            f
        }
    }

    let registry = Registry::new();
    registry.register(requests()).unwrap();

    let hist = Arc::new(
        HistogramVec::new(Opts::new("latency_seconds", "Latency."), &["code"]).unwrap(),
    );
    let err = registry.register(Arc::new(Pair(requests(), hist.clone())));
    assert!(matches!(err, Err(RestwatchError::AlreadyRegistered(_))));

    // the histogram name must still be free
    registry.register(hist).unwrap();
    assert_eq!(
        registry.metric_names(),
        vec![
            "latency_seconds".to_string(),
            "monitoring_rest_http_requests_total".to_string()
        ]
    );
}

#[test]
fn unregister_frees_the_name() {
    let registry = Registry::new();
    let c: Arc<dyn Collector> = requests();
    registry.register(c.clone()).unwrap();
    assert!(registry.unregister(&c));
    assert!(!registry.unregister(&c));
    registry.register(requests()).unwrap();
}

#[test]
fn gather_is_sorted_and_reads_current_values() {
    let registry = Registry::new();
    let counter = requests();
    let hist = Arc::new(
        HistogramVec::new(Opts::new("a_duration_seconds", "Duration."), &["code"]).unwrap(),
    );
    registry.register(counter.clone()).unwrap();
    registry.register(hist.clone()).unwrap();

    counter.inc(&["200", "GET"]).unwrap();
    counter.inc(&["200", "GET"]).unwrap();
    counter.inc(&["404", "GET"]).unwrap();
    hist.observe(&["200"], Duration::from_millis(3)).unwrap();

    let families = registry.gather();
    assert_eq!(families[0].name, "a_duration_seconds");
    assert_eq!(families[1].name, "monitoring_rest_http_requests_total");

    let ok = families[1].find(&["200", "GET"]).unwrap();
    assert_eq!(ok.value, Value::Counter(2));
    assert_eq!(ok.label("method"), Some("GET"));
    let codes: Vec<_> = families[1]
        .metrics
        .iter()
        .map(|m| m.label("code").unwrap())
        .collect();
    assert_eq!(codes, vec!["200", "404"]);
}

#[test]
fn label_cardinality_is_checked() {
    let counter = requests();
    let err = counter.inc(&["200"]).unwrap_err();
    assert!(matches!(
        err,
        RestwatchError::LabelMismatch { expected: 2, got: 1 }
    ));
    assert!(!err.is_startup_fatal());
}

#[test]
fn invalid_names_are_rejected() {
    assert!(CounterVec::new(Opts::new("1bad", "help"), &[]).is_err());
    assert!(CounterVec::new(Opts::new("ok", ""), &[]).is_err());
    assert!(CounterVec::new(Opts::new("ok", "help"), &["le"]).is_err());
    assert!(CounterVec::new(Opts::new("ok", "help"), &["__x"]).is_err());
    assert!(CounterVec::new(Opts::new("ok", "help"), &["a", "a"]).is_err());
    assert!(HistogramVec::with_buckets(Opts::new("h", "help"), &[], vec![]).is_err());
    assert!(HistogramVec::with_buckets(Opts::new("h", "help"), &[], vec![1.0, 0.5]).is_err());
    assert!(
        HistogramVec::with_buckets(Opts::new("h", "help"), &[], vec![1.0, f64::INFINITY])
            .is_err()
    );
}
