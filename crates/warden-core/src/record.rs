use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::RawServiceState;

/// Opaque identifier of a managed service. Never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(Uuid);

impl ServiceId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operational state of a managed service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// Initial state; the service wrapper is not registered with the OS
    NotInstalled,
    /// Registration with the OS is in progress
    Installing,
    Stopped,
    Starting,
    Running,
    Stopping,
    Paused,
    /// The last operation on the service failed
    Error,
    Uninstalling,
}

impl ServiceStatus {
    /// Whether a direct transition from `self` to `to` is part of the
    /// state machine. Reconciliation from observed OS state bypasses this
    /// table; it only constrains orchestrator-driven transitions.
    pub fn can_transition(self, to: ServiceStatus) -> bool {
        use ServiceStatus::*;
        matches!(
            (self, to),
            (NotInstalled, Installing)
                | (Installing, Stopped)
                | (Installing, Running)
                | (Installing, Error)
                | (Installing, NotInstalled)
                | (Stopped, Starting)
                | (Stopped, Running)
                | (Stopped, Uninstalling)
                | (Starting, Running)
                | (Starting, Stopping)
                | (Starting, Stopped)
                | (Starting, Error)
                | (Running, Stopping)
                | (Running, Stopped)
                | (Running, Paused)
                | (Running, Error)
                | (Stopping, Stopped)
                | (Stopping, Error)
                | (Paused, Running)
                | (Paused, Stopping)
                | (Paused, Stopped)
                | (Error, Starting)
                | (Error, Running)
                | (Error, Stopped)
                | (Error, Uninstalling)
                | (Uninstalling, NotInstalled)
                | (Uninstalling, Error)
        )
    }

    /// Map the OS-level status vocabulary reported by the gateway onto the
    /// state machine. Anything the gateway cannot account for reads as not
    /// installed.
    pub fn from_raw(raw: &RawServiceState) -> Self {
        match raw {
            RawServiceState::Running => ServiceStatus::Running,
            RawServiceState::StartPending => ServiceStatus::Starting,
            RawServiceState::StopPending => ServiceStatus::Stopping,
            RawServiceState::Stopped => ServiceStatus::Stopped,
            RawServiceState::Paused => ServiceStatus::Paused,
            RawServiceState::NotFound => ServiceStatus::NotInstalled,
            RawServiceState::Unknown(_) => ServiceStatus::NotInstalled,
        }
    }

    /// Whether the service process is live in this state
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ServiceStatus::Running | ServiceStatus::Starting | ServiceStatus::Paused
        )
    }

    /// Whether the service wrapper is registered with the OS in this state
    pub fn is_installed(self) -> bool {
        !matches!(self, ServiceStatus::NotInstalled | ServiceStatus::Installing)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceStatus::NotInstalled => "not installed",
            ServiceStatus::Installing => "installing",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Starting => "starting",
            ServiceStatus::Running => "running",
            ServiceStatus::Stopping => "stopping",
            ServiceStatus::Paused => "paused",
            ServiceStatus::Error => "error",
            ServiceStatus::Uninstalling => "uninstalling",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of the most recent startup attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupOutcome {
    /// Whether the startup succeeded
    pub success: bool,
    /// Failure detail, if any
    pub message: Option<String>,
    /// Wall time the gateway reported for the attempt
    pub elapsed_ms: u64,
    /// When the attempt finished
    pub at: DateTime<Utc>,
}

impl StartupOutcome {
    pub fn succeeded(elapsed_ms: u64) -> Self {
        Self {
            success: true,
            message: None,
            elapsed_ms,
            at: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            elapsed_ms,
            at: Utc::now(),
        }
    }
}

/// Request payload for creating a new service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Display name
    pub name: String,
    /// Program the wrapper will run
    pub executable: PathBuf,
    /// Arguments passed to the program
    pub arguments: Vec<String>,
    /// Working directory for the program
    pub working_dir: Option<PathBuf>,
    /// Identifiers of services this one depends on
    pub dependencies: Vec<ServiceId>,
    /// Start the service right after a successful install
    pub auto_start: bool,
    /// Ask the wrapper to restart the program when it exits
    pub restart_on_exit: bool,
}

/// Partial configuration change applied to an existing service. Fields
/// left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub executable: Option<PathBuf>,
    pub arguments: Option<Vec<String>>,
    /// `Some(None)` clears the working directory
    pub working_dir: Option<Option<PathBuf>>,
    pub dependencies: Option<Vec<ServiceId>>,
    pub auto_start: Option<bool>,
    pub restart_on_exit: Option<bool>,
}

/// The persisted definition of one managed service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Immutable identifier
    pub id: ServiceId,
    /// Display name
    pub name: String,
    /// Program the wrapper runs
    pub executable: PathBuf,
    /// Arguments passed to the program
    pub arguments: Vec<String>,
    /// Working directory for the program
    pub working_dir: Option<PathBuf>,
    /// Declared dependencies, in declaration order, duplicates removed
    pub dependencies: Vec<ServiceId>,
    /// Current operational status
    pub status: ServiceStatus,
    /// Outcome of the most recent startup attempt
    pub last_startup: Option<StartupOutcome>,
    /// Start the service right after install
    pub auto_start: bool,
    /// Restart the program when it exits
    pub restart_on_exit: bool,
    /// Record creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl ServiceRecord {
    /// Build a fresh record from a creation request. The record starts in
    /// `Installing`; dependency order is preserved with duplicates dropped.
    pub fn from_spec(spec: ServiceSpec) -> Self {
        let now = Utc::now();
        let mut seen = HashSet::new();
        let dependencies = spec
            .dependencies
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        Self {
            id: ServiceId::new(),
            name: spec.name,
            executable: spec.executable,
            arguments: spec.arguments,
            working_dir: spec.working_dir,
            dependencies,
            status: ServiceStatus::Installing,
            last_startup: None,
            auto_start: spec.auto_start,
            restart_on_exit: spec.restart_on_exit,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the status and refresh the mutation timestamp
    pub fn set_status(&mut self, status: ServiceStatus) {
        self.status = status;
        self.touch();
    }

    /// Record a startup attempt and refresh the mutation timestamp
    pub fn record_startup(&mut self, outcome: StartupOutcome) {
        self.last_startup = Some(outcome);
        self.touch();
    }

    /// Refresh the mutation timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Apply a configuration change. Operational status is untouched;
    /// dependency order is preserved with duplicates dropped.
    pub fn apply_update(&mut self, update: ServiceUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(executable) = update.executable {
            self.executable = executable;
        }
        if let Some(arguments) = update.arguments {
            self.arguments = arguments;
        }
        if let Some(working_dir) = update.working_dir {
            self.working_dir = working_dir;
        }
        if let Some(dependencies) = update.dependencies {
            let mut seen = HashSet::new();
            self.dependencies = dependencies
                .into_iter()
                .filter(|id| seen.insert(*id))
                .collect();
        }
        if let Some(auto_start) = update.auto_start {
            self.auto_start = auto_start;
        }
        if let Some(restart_on_exit) = update.restart_on_exit {
            self.restart_on_exit = restart_on_exit;
        }
        self.touch();
    }

    /// View of the record as a request payload, for re-vetting after an
    /// update
    pub fn as_spec(&self) -> ServiceSpec {
        ServiceSpec {
            name: self.name.clone(),
            executable: self.executable.clone(),
            arguments: self.arguments.clone(),
            working_dir: self.working_dir.clone(),
            dependencies: self.dependencies.clone(),
            auto_start: self.auto_start,
            restart_on_exit: self.restart_on_exit,
        }
    }
}
