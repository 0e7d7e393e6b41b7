//! Background engine for the Warden service manager.
//!
//! This crate provides the lifecycle orchestrator that drives services
//! through their state machine and the status monitor that reconciles and
//! broadcasts service status.

pub mod gateway;
pub mod monitor;
pub mod orchestrator;
pub mod store;

// Re-export commonly used types
pub use gateway::WrapperGateway;
pub use monitor::{SnapshotCallback, StatusMonitor, SubscriptionId};
pub use orchestrator::LifecycleOrchestrator;
pub use store::{JsonStore, MemoryStore};
