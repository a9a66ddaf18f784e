//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : Prometheus text format, scraped from the injected registry

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use restwatch_core::metrics::{Registry, TEXT_CONTENT_TYPE};

use crate::http::{Handler, HttpRequest, ResponseSink};
use crate::reply;

pub struct Healthz;

#[async_trait]
impl Handler for Healthz {
    async fn serve(&self, _req: &HttpRequest, sink: &mut dyn ResponseSink) {
        let _ = reply::bytes(sink, StatusCode::OK, "text/plain; charset=utf-8", b"ok");
    }
}

pub struct MetricsEndpoint {
    registry: Arc<Registry>,
}

impl MetricsEndpoint {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Handler for MetricsEndpoint {
    async fn serve(&self, _req: &HttpRequest, sink: &mut dyn ResponseSink) {
        let body = self.registry.render();
        if let Err(e) = reply::bytes(sink, StatusCode::OK, TEXT_CONTENT_TYPE, body.as_bytes()) {
            tracing::warn!(error = %e, "metrics write failed");
        }
    }
}
