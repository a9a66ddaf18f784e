use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use restwatch_core::error::Result;
use restwatch_core::metrics::{
    Collector, CounterVec, Desc, HistogramVec, MetricFamily, Opts, Registry, DEFAULT_BUCKETS,
};

use super::recorder::ResponseRecorder;
use crate::http::{Handler, HttpRequest, ResponseSink};

/// Endpoint label value for requests no route claimed.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Naming and label options for the request metrics.
#[derive(Debug, Clone)]
pub struct MetricsOptions {
    pub namespace: String,
    pub subsystem: String,
    /// Add an `endpoint` label carrying the route template (never the raw path).
    pub endpoint_label: bool,
    /// Histogram upper bounds in seconds.
    pub buckets: Vec<f64>,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            namespace: "monitoring".into(),
            subsystem: "rest".into(),
            endpoint_label: true,
            buckets: DEFAULT_BUCKETS.to_vec(),
        }
    }
}

/// Everything known about one finished request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestObservation {
    pub remote_addr: String,
    pub method: String,
    pub uri: String,
    pub protocol: &'static str,
    pub user_agent: String,
    pub status: u16,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

impl RequestObservation {
    pub fn new(req: &HttpRequest, recorder: &ResponseRecorder<'_>, elapsed: Duration) -> Self {
        // nothing written means the sink sends its implicit 200
        let status = match recorder.status_code() {
            0 => 200,
            s => s,
        };
        Self {
            remote_addr: req.client_addr().to_string(),
            method: req.method.as_str().to_string(),
            uri: req.request_uri().to_string(),
            protocol: req.proto(),
            user_agent: req.user_agent().to_string(),
            status,
            bytes_written: recorder.response_size(),
            elapsed,
        }
    }
}

/// Access log line:
/// `<remote> - "<METHOD> <URI> <PROTO>" <status> <bytes> "<agent>" Took: <elapsed>`
impl fmt::Display for RequestObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - \"{} {} {}\" {} {} \"{}\" Took: {:?}",
            self.remote_addr,
            self.method,
            self.uri,
            self.protocol,
            self.status,
            self.bytes_written,
            self.user_agent,
            self.elapsed
        )
    }
}

/// Wraps a handler with an access log and request count/duration metrics.
pub struct InstrumentedHandler {
    inner: Arc<dyn Handler>,
    requests: CounterVec,
    duration: HistogramVec,
    endpoint_label: bool,
}

impl InstrumentedHandler {
    /// Build the wrapper and register it with `registry`.
    ///
    /// Fails if the series names are already taken there; the process should
    /// not start serving in that case.
    pub fn new(
        inner: Arc<dyn Handler>,
        registry: &Registry,
        opts: MetricsOptions,
    ) -> Result<Arc<Self>> {
        let labels: &[&str] = if opts.endpoint_label {
            &["code", "method", "endpoint"]
        } else {
            &["code", "method"]
        };

        let duration = HistogramVec::with_buckets(
            Opts::new("http_durations_histogram_seconds", "Request time duration.")
                .namespace(opts.namespace.as_str())
                .subsystem(opts.subsystem.as_str()),
            labels,
            opts.buckets,
        )?;
        let requests = CounterVec::new(
            Opts::new("http_requests_total", "Total number of requests received.")
                .namespace(opts.namespace.as_str())
                .subsystem(opts.subsystem.as_str()),
            labels,
        )?;

        let handler = Arc::new(Self {
            inner,
            requests,
            duration,
            endpoint_label: opts.endpoint_label,
        });
        registry.register(handler.clone())?;
        Ok(handler)
    }

    pub fn requests(&self) -> &CounterVec {
        &self.requests
    }

    pub fn duration(&self) -> &HistogramVec {
        &self.duration
    }

    fn log(&self, obs: &RequestObservation) {
        tracing::info!(
            target: "restwatch::access",
            remote_addr = %obs.remote_addr,
            method = %obs.method,
            uri = %obs.uri,
            protocol = obs.protocol,
            status = obs.status,
            bytes = obs.bytes_written,
            user_agent = %obs.user_agent,
            elapsed_ms = obs.elapsed.as_secs_f64() * 1000.0,
            "{obs}"
        );
    }

    fn observe(&self, obs: &RequestObservation, route: Option<&'static str>) {
        let code = obs.status.to_string();
        let mut values: Vec<&str> = vec![code.as_str(), obs.method.as_str()];
        if self.endpoint_label {
            values.push(route.unwrap_or(UNMATCHED_ENDPOINT));
        }

        if let Err(e) = self.requests.inc(&values) {
            tracing::warn!(
                target: "restwatch::metrics",
                error = %e,
                "request counter update dropped"
            );
        }
        if let Err(e) = self.duration.observe(&values, obs.elapsed) {
            tracing::warn!(
                target: "restwatch::metrics",
                error = %e,
                "duration observation dropped"
            );
        }
    }
}

#[async_trait]
impl Handler for InstrumentedHandler {
    async fn serve(&self, req: &HttpRequest, sink: &mut dyn ResponseSink) {
        let start = Instant::now();
        let mut recorder = ResponseRecorder::new(sink);
        self.inner.serve(req, &mut recorder).await;
        // the client has the whole response before anything below runs
        recorder.finish();
        let elapsed = start.elapsed();

        let obs = RequestObservation::new(req, &recorder, elapsed);
        self.log(&obs);
        self.observe(&obs, self.inner.route(req));
    }

    fn route(&self, req: &HttpRequest) -> Option<&'static str> {
        self.inner.route(req)
    }
}

impl Collector for InstrumentedHandler {
    fn describe(&self) -> Vec<Desc> {
        let mut descs = self.duration.describe();
        descs.extend(self.requests.describe());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.duration.collect();
        families.extend(self.requests.collect());
        families
    }
}
