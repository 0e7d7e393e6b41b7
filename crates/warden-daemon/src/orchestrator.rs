//! Lifecycle orchestration for managed services.
//!
//! Drives create/start/stop/restart/uninstall/delete/update through the
//! state machine, composing the record store and the gateway, gated by the
//! dependency validator and the security gate. Operations are synchronous
//! request/response; validation and state-conflict failures come back as
//! typed error values callers can branch on.

use std::sync::Arc;

use tracing::{error, info, warn};

use warden_core::artifact::ArtifactWriter;
use warden_core::error::{WardenError, WardenResult};
use warden_core::gateway::ServiceGateway;
use warden_core::record::{
    ServiceId, ServiceRecord, ServiceSpec, ServiceStatus, ServiceUpdate, StartupOutcome,
};
use warden_core::security::SecurityGate;
use warden_core::store::ServiceStore;
use warden_resolver::{DependencyValidator, ValidationReport};

/// State machine driving service lifecycle operations
pub struct LifecycleOrchestrator {
    store: Arc<dyn ServiceStore>,
    gateway: Arc<dyn ServiceGateway>,
    security: SecurityGate,
    validator: DependencyValidator,
    artifacts: ArtifactWriter,
}

impl LifecycleOrchestrator {
    pub fn new(
        store: Arc<dyn ServiceStore>,
        gateway: Arc<dyn ServiceGateway>,
        security: SecurityGate,
        artifacts: ArtifactWriter,
    ) -> Self {
        Self {
            store,
            gateway,
            security,
            validator: DependencyValidator::new(),
            artifacts,
        }
    }

    async fn fetch(&self, id: &ServiceId) -> WardenResult<ServiceRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| WardenError::not_found(id.to_string()))
    }

    /// Create a new service: vet, validate dependencies, install, persist.
    /// A failed install leaves nothing behind; a failed auto-start still
    /// persists the record as `Stopped` since the install stands.
    pub async fn create(&self, spec: ServiceSpec) -> WardenResult<ServiceRecord> {
        self.security.vet_spec(&spec)?;

        let mut record = ServiceRecord::from_spec(spec);
        info!(service = %record.name, id = %record.id, "creating service");

        let known = self.store.load_all().await?;
        let report = self.validator.validate(&record, &known);
        if !report.is_valid {
            return Err(WardenError::validation(report.messages()));
        }

        self.artifacts.write(&record).await?;
        let outcome = self.gateway.install(&record).await?;
        if !outcome.success {
            error!(service = %record.name, message = %outcome.message, "install failed");
            // no partial state survives a failed create
            self.artifacts.remove(&record.id).await.ok();
            return Err(WardenError::gateway(outcome.message, outcome.elapsed_ms));
        }

        record.set_status(ServiceStatus::Stopped);
        self.store.add(record.clone()).await?;

        if record.auto_start {
            let start = self.gateway.start(&record).await?;
            if start.success {
                record.set_status(ServiceStatus::Running);
                record.record_startup(StartupOutcome::succeeded(start.elapsed_ms));
            } else {
                // install succeeded even if start did not
                warn!(service = %record.name, message = %start.message, "auto-start failed");
                record.set_status(ServiceStatus::Stopped);
                record.record_startup(StartupOutcome::failed(start.message, start.elapsed_ms));
            }
            self.store.update(record.clone()).await?;
        }

        info!(service = %record.name, status = %record.status, "service created");
        Ok(record)
    }

    /// Start a service. The stored status is only updated after the
    /// gateway reports success.
    pub async fn start(&self, id: &ServiceId) -> WardenResult<ServiceRecord> {
        let record = self.fetch(id).await?;
        if !record.status.can_transition(ServiceStatus::Running) {
            return Err(WardenError::state_conflict("start", record.status));
        }
        self.start_record(record).await
    }

    async fn start_record(&self, mut record: ServiceRecord) -> WardenResult<ServiceRecord> {
        let outcome = self.gateway.start(&record).await?;
        if !outcome.success {
            error!(service = %record.name, message = %outcome.message, "start failed");
            return Err(WardenError::gateway(outcome.message, outcome.elapsed_ms));
        }
        record.set_status(ServiceStatus::Running);
        record.record_startup(StartupOutcome::succeeded(outcome.elapsed_ms));
        self.store.update(record.clone()).await?;
        info!(service = %record.name, "service started");
        Ok(record)
    }

    /// Stop a service. The stored status is only updated after the gateway
    /// reports success.
    pub async fn stop(&self, id: &ServiceId) -> WardenResult<ServiceRecord> {
        let mut record = self.fetch(id).await?;
        if !record.status.can_transition(ServiceStatus::Stopped) {
            return Err(WardenError::state_conflict("stop", record.status));
        }

        let outcome = self.gateway.stop(&record).await?;
        if !outcome.success {
            error!(service = %record.name, message = %outcome.message, "stop failed");
            return Err(WardenError::gateway(outcome.message, outcome.elapsed_ms));
        }
        record.set_status(ServiceStatus::Stopped);
        self.store.update(record.clone()).await?;
        info!(service = %record.name, "service stopped");
        Ok(record)
    }

    /// Stop then start, sequential. A stop failure short-circuits; start is
    /// never attempted and the stop failure is returned.
    pub async fn restart(&self, id: &ServiceId) -> WardenResult<ServiceRecord> {
        self.stop(id).await?;
        self.start(id).await
    }

    /// Unregister the service from the OS and remove its record. A running
    /// service is stopped first, and the stop must succeed. A gateway
    /// failure during uninstall leaves the record in place.
    pub async fn uninstall(&self, id: &ServiceId) -> WardenResult<()> {
        let mut record = self.fetch(id).await?;
        if record.status == ServiceStatus::Running {
            record = self.stop(id).await?;
        }

        record.set_status(ServiceStatus::Uninstalling);
        let outcome = self.gateway.uninstall(&record).await?;
        if !outcome.success {
            error!(service = %record.name, message = %outcome.message, "uninstall failed");
            return Err(WardenError::gateway(outcome.message, outcome.elapsed_ms));
        }

        self.artifacts.remove(id).await.ok();
        self.store.remove(id).await?;
        info!(service = %record.name, "service uninstalled");
        Ok(())
    }

    /// Remove the record regardless of wrapper state. Forbidden while the
    /// service is running; for installed services a best-effort uninstall
    /// is attempted, but its failure does not block removal from the store.
    pub async fn delete(&self, id: &ServiceId) -> WardenResult<()> {
        let record = self.fetch(id).await?;
        if record.status == ServiceStatus::Running {
            return Err(WardenError::state_conflict("delete", record.status));
        }

        if record.status.is_installed() {
            match self.gateway.uninstall(&record).await {
                Ok(outcome) if !outcome.success => {
                    warn!(service = %record.name, message = %outcome.message,
                        "best-effort uninstall failed, removing record anyway");
                }
                Err(e) => {
                    warn!(service = %record.name, error = %e,
                        "best-effort uninstall unreachable, removing record anyway");
                }
                Ok(_) => {}
            }
        }

        self.artifacts.remove(id).await.ok();
        self.store.remove(id).await?;
        info!(service = %record.name, "service deleted");
        Ok(())
    }

    /// Apply a configuration change. Permitted in any status; rewrites the
    /// generated wrapper artifact and persists the record without touching
    /// the operational status.
    pub async fn update(&self, id: &ServiceId, changes: ServiceUpdate) -> WardenResult<ServiceRecord> {
        let mut record = self.fetch(id).await?;
        record.apply_update(changes);
        self.security.vet_spec(&record.as_spec())?;

        let known = self.store.load_all().await?;
        let report = self.validator.validate(&record, &known);
        if !report.is_valid {
            return Err(WardenError::validation(report.messages()));
        }

        self.artifacts.write(&record).await?;
        self.store.update(record.clone()).await?;
        info!(service = %record.name, "service configuration updated");
        Ok(record)
    }

    /// Compute the dependency validation report for a service, including
    /// its startup order
    pub async fn startup_order(&self, id: &ServiceId) -> WardenResult<ValidationReport> {
        let record = self.fetch(id).await?;
        let known = self.store.load_all().await?;
        Ok(self.validator.validate(&record, &known))
    }

    /// Start a service together with everything it transitively depends
    /// on, dependencies first. Services already running are skipped. The
    /// first failure aborts the remainder; services already started stay
    /// running.
    pub async fn start_with_dependencies(&self, id: &ServiceId) -> WardenResult<Vec<ServiceId>> {
        let record = self.fetch(id).await?;
        let known = self.store.load_all().await?;
        let report = self.validator.validate(&record, &known);
        if !report.is_valid {
            return Err(WardenError::validation(report.messages()));
        }

        let mut started = Vec::new();
        for dep_id in &report.startup_order {
            let dep = self.fetch(dep_id).await?;
            if dep.status == ServiceStatus::Running {
                continue;
            }
            self.start_record(dep).await?;
            started.push(*dep_id);
        }
        info!(service = %record.name, started = started.len(), "startup chain complete");
        Ok(started)
    }
}
