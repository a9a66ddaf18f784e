//! restwatch server library entry.
//!
//! Wires the demo route table behind the request instrumentation layer and
//! exposes the result through axum. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod http;
pub mod obs;
pub mod ops;
pub mod reply;
pub mod router;
pub mod routes;
pub mod services;
