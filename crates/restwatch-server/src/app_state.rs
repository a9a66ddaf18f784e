//! Shared application state for the restwatch server.
//!
//! Builds the route table, wraps it in the instrumentation layer and
//! registers that layer with the injected registry. Startup errors are
//! returned, not panicked on.

use std::sync::Arc;

use restwatch_core::error::Result;
use restwatch_core::metrics::Registry;

use crate::config::RestwatchConfig;
use crate::http::Handler;
use crate::obs::{InstrumentedHandler, MetricsOptions};
use crate::services::{demo_routes, UserStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: RestwatchConfig,
    registry: Arc<Registry>,
    handler: Arc<InstrumentedHandler>,
}

impl AppState {
    /// Build application state.
    /// Fails if the request metrics cannot be registered with `registry`.
    pub fn new(cfg: RestwatchConfig, registry: Arc<Registry>) -> Result<Self> {
        let store = Arc::new(UserStore::seeded());
        let routes = demo_routes(store, Arc::clone(&registry));
        tracing::debug!(routes = ?routes.templates(), "routes registered");

        let handler = InstrumentedHandler::new(
            Arc::new(routes),
            &registry,
            MetricsOptions::from(&cfg.metrics),
        )?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                handler,
            }),
        })
    }

    pub fn cfg(&self) -> &RestwatchConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn instrumented(&self) -> Arc<InstrumentedHandler> {
        Arc::clone(&self.inner.handler)
    }

    pub fn handler(&self) -> Arc<dyn Handler> {
        self.inner.handler.clone()
    }
}
