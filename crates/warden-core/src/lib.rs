//! Core types and traits for the Warden service manager.
//!
//! This crate provides the fundamental types, traits, and utilities that are
//! used throughout the Warden ecosystem: the service record model, the state
//! machine, the error taxonomy, and the narrow interfaces behind which the
//! OS-facing collaborators live.

pub mod artifact;
pub mod config;
pub mod error;
pub mod gateway;
pub mod record;
pub mod security;
pub mod store;

// Re-export commonly used types
pub use crate::artifact::ArtifactWriter;
pub use crate::config::{MonitorConfig, WardenConfig};
pub use crate::error::{WardenError, WardenResult};
pub use crate::gateway::{GatewayOutcome, RawServiceState, ServiceGateway};
pub use crate::record::{
    ServiceId, ServiceRecord, ServiceSpec, ServiceStatus, ServiceUpdate, StartupOutcome,
};
pub use crate::security::SecurityGate;
pub use crate::store::ServiceStore;

/// Initialize the library
pub fn init() {
    // Set up logging if not already configured
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();
}
