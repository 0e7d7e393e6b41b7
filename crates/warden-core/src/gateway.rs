use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WardenResult;
use crate::record::ServiceRecord;

/// Result of one privileged gateway action. Expected failures (the wrapper
/// refused, the OS said no) come back as `success == false`; an `Err` from
/// the trait methods means the gateway itself could not be reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOutcome {
    /// Whether the action took effect
    pub success: bool,
    /// Human-readable detail from the wrapper or the OS
    pub message: String,
    /// Wall time the action took
    pub elapsed_ms: u64,
}

impl GatewayOutcome {
    pub fn ok(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            success: true,
            message: message.into(),
            elapsed_ms,
        }
    }

    pub fn failed(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            success: false,
            message: message.into(),
            elapsed_ms,
        }
    }
}

/// OS-level service status vocabulary as the wrapper reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawServiceState {
    Running,
    /// The OS accepted a start request and is still working on it
    StartPending,
    /// The OS accepted a stop request and is still working on it
    StopPending,
    Stopped,
    Paused,
    /// The wrapper knows nothing about this service
    NotFound,
    /// A status string the wrapper did not recognize
    Unknown(String),
}

impl fmt::Display for RawServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawServiceState::Running => write!(f, "running"),
            RawServiceState::StartPending => write!(f, "start pending"),
            RawServiceState::StopPending => write!(f, "stop pending"),
            RawServiceState::Stopped => write!(f, "stopped"),
            RawServiceState::Paused => write!(f, "paused"),
            RawServiceState::NotFound => write!(f, "not found"),
            RawServiceState::Unknown(s) => write!(f, "unknown ({})", s),
        }
    }
}

/// The component that performs privileged OS service operations on behalf
/// of the orchestrator.
#[async_trait]
pub trait ServiceGateway: Send + Sync + 'static {
    /// Register the service with the OS
    async fn install(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome>;

    /// Start the registered service
    async fn start(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome>;

    /// Stop the registered service
    async fn stop(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome>;

    /// Remove the service registration from the OS
    async fn uninstall(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome>;

    /// Ask the OS for the service's actual state
    async fn query(&self, record: &ServiceRecord) -> WardenResult<RawServiceState>;
}
