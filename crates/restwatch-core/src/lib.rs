//! restwatch core: transport-agnostic error types and the pull-based metrics
//! registry.
//!
//! This crate carries no HTTP or runtime dependencies. The server crate
//! builds its request instrumentation on top of the collectors defined here.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RestwatchError`/`Result`; scrapes and
//! observations never crash the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{Result, RestwatchError};
