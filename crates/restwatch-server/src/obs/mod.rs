//! Request instrumentation: response capture, access log, request metrics.
//!
//! `InstrumentedHandler` wraps any `Handler` and is itself a `Handler` and a
//! metrics `Collector`. Log and metric output are side channels; nothing in
//! here can change what the client receives.

pub mod instrument;
pub mod recorder;

pub use instrument::{InstrumentedHandler, MetricsOptions, RequestObservation};
pub use recorder::{CallStats, ResponseRecorder};
