//! Top-level facade crate for restwatch.
//!
//! Re-exports the metrics core and the server library so users can depend on a single crate.

pub mod core {
    pub use restwatch_core::*;
}

pub mod server {
    pub use restwatch_server::*;
}
