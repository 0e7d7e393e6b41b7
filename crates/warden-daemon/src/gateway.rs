//! Gateway implementation that drives a service-wrapper executable.

use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use warden_core::artifact::ArtifactWriter;
use warden_core::error::WardenResult;
use warden_core::gateway::{GatewayOutcome, RawServiceState, ServiceGateway};
use warden_core::record::ServiceRecord;

/// Parse the wrapper's status vocabulary. Unrecognized strings are carried
/// through so the caller can log what the wrapper actually said.
pub fn parse_raw_state(s: &str) -> RawServiceState {
    match s.trim().to_ascii_lowercase().as_str() {
        "running" => RawServiceState::Running,
        "startpending" | "start-pending" => RawServiceState::StartPending,
        "stoppending" | "stop-pending" => RawServiceState::StopPending,
        "stopped" => RawServiceState::Stopped,
        "paused" => RawServiceState::Paused,
        "nonexistent" | "notfound" | "not-found" => RawServiceState::NotFound,
        other => RawServiceState::Unknown(other.to_string()),
    }
}

/// Executes install/start/stop/uninstall against the OS by invoking the
/// configured wrapper executable once per action. Expected failures (a
/// non-zero exit) come back as unsuccessful outcomes, never as `Err`.
#[derive(Debug, Clone)]
pub struct WrapperGateway {
    wrapper_path: PathBuf,
    artifacts: ArtifactWriter,
}

impl WrapperGateway {
    pub fn new(wrapper_path: PathBuf, artifacts: ArtifactWriter) -> Self {
        Self {
            wrapper_path,
            artifacts,
        }
    }

    async fn run(&self, action: &str, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        let started = Instant::now();
        let mut command = Command::new(&self.wrapper_path);
        command.arg(action).arg(record.id.to_string());
        if action == "install" {
            command.arg(self.artifacts.artifact_path(&record.id));
        }

        debug!(service = %record.name, action, "invoking wrapper");
        let output = command.output().await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if output.status.success() {
            let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok(GatewayOutcome::ok(message, elapsed_ms))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("wrapper exited with {}", output.status)
            } else {
                stderr
            };
            Ok(GatewayOutcome::failed(message, elapsed_ms))
        }
    }
}

#[async_trait]
impl ServiceGateway for WrapperGateway {
    async fn install(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        self.run("install", record).await
    }

    async fn start(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        self.run("start", record).await
    }

    async fn stop(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        self.run("stop", record).await
    }

    async fn uninstall(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        self.run("uninstall", record).await
    }

    async fn query(&self, record: &ServiceRecord) -> WardenResult<RawServiceState> {
        let outcome = self.run("status", record).await?;
        if !outcome.success {
            return Ok(RawServiceState::NotFound);
        }
        Ok(parse_raw_state(&outcome.message))
    }
}
