//! Warden service manager.
//!
//! This crate provides a dependency-aware manager for OS-level background
//! services: graph-validated startup ordering, a lifecycle state machine,
//! and continuous status reconciliation.

pub use warden_core as core;
pub use warden_daemon as daemon;
pub use warden_resolver as resolver;

/// Initialize logging for the entire system
pub fn init() {
    tracing_subscriber::fmt::init();
}

/// Version of the Warden system
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
