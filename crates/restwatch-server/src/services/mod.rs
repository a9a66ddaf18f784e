//! Demo endpoints served behind the instrumentation layer.

pub mod users;

use std::sync::Arc;

use restwatch_core::metrics::Registry;

use crate::ops::{Healthz, MetricsEndpoint};
use crate::routes::Routes;

pub use users::{AlwaysFails, GetUser, ListUsers, User, UserStore};

/// Route table for the demo service.
pub fn demo_routes(store: Arc<UserStore>, registry: Arc<Registry>) -> Routes {
    let routes = Routes::new();
    routes.get("/users", Arc::new(ListUsers::new(store.clone())));
    routes.get("/users/{id}", Arc::new(GetUser::new(store)));
    routes.get("/error", Arc::new(AlwaysFails));
    routes.get("/metrics", Arc::new(MetricsEndpoint::new(registry)));
    routes.get("/healthz", Arc::new(Healthz));
    routes
}
