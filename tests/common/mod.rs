//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use warden_core::artifact::ArtifactWriter;
use warden_core::error::{WardenError, WardenResult};
use warden_core::gateway::{GatewayOutcome, RawServiceState, ServiceGateway};
use warden_core::record::{ServiceId, ServiceRecord, ServiceSpec};
use warden_core::security::SecurityGate;
use warden_core::store::ServiceStore;
use warden_daemon::{LifecycleOrchestrator, MemoryStore};

/// Gateway double with scriptable failures and a call log
#[derive(Default)]
pub struct FakeGateway {
    failures: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    states: Mutex<HashMap<ServiceId, RawServiceState>>,
    unreachable: Mutex<bool>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make one action fail with the given message until cleared
    pub fn fail(&self, action: &str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(action.to_string(), message.to_string());
    }

    pub fn clear_failure(&self, action: &str) {
        self.failures.lock().unwrap().remove(action);
    }

    /// Script the raw state reported for a service
    pub fn set_state(&self, id: ServiceId, state: RawServiceState) {
        self.states.lock().unwrap().insert(id, state);
    }

    /// Make `query` return an error instead of a state
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn perform(&self, action: &str, record: &ServiceRecord) -> GatewayOutcome {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", action, record.name));
        match self.failures.lock().unwrap().get(action) {
            Some(message) => GatewayOutcome::failed(message.clone(), 3),
            None => GatewayOutcome::ok(format!("{} ok", action), 3),
        }
    }
}

#[async_trait]
impl ServiceGateway for FakeGateway {
    async fn install(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        Ok(self.perform("install", record))
    }

    async fn start(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        Ok(self.perform("start", record))
    }

    async fn stop(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        Ok(self.perform("stop", record))
    }

    async fn uninstall(&self, record: &ServiceRecord) -> WardenResult<GatewayOutcome> {
        Ok(self.perform("uninstall", record))
    }

    async fn query(&self, record: &ServiceRecord) -> WardenResult<RawServiceState> {
        if *self.unreachable.lock().unwrap() {
            return Err(WardenError::other("gateway unreachable"));
        }
        Ok(self
            .states
            .lock()
            .unwrap()
            .get(&record.id)
            .cloned()
            .unwrap_or(RawServiceState::Stopped))
    }
}

/// Store double that can be switched into a failing mode
#[derive(Clone)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Arc<Mutex<bool>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn check(&self) -> WardenResult<()> {
        if *self.failing.lock().unwrap() {
            Err(WardenError::storage("store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ServiceStore for FlakyStore {
    async fn load_all(&self) -> WardenResult<Vec<ServiceRecord>> {
        self.check()?;
        self.inner.load_all().await
    }

    async fn get(&self, id: &ServiceId) -> WardenResult<Option<ServiceRecord>> {
        self.check()?;
        self.inner.get(id).await
    }

    async fn add(&self, record: ServiceRecord) -> WardenResult<()> {
        self.check()?;
        self.inner.add(record).await
    }

    async fn update(&self, record: ServiceRecord) -> WardenResult<()> {
        self.check()?;
        self.inner.update(record).await
    }

    async fn remove(&self, id: &ServiceId) -> WardenResult<()> {
        self.check()?;
        self.inner.remove(id).await
    }
}

/// Spec fixture with a gate-clean executable path
pub fn spec(name: &str, deps: Vec<ServiceId>) -> ServiceSpec {
    ServiceSpec {
        name: name.to_string(),
        executable: PathBuf::from("/opt/services/bin").join(name),
        arguments: Vec::new(),
        working_dir: None,
        dependencies: deps,
        auto_start: false,
        restart_on_exit: false,
    }
}

/// Orchestrator wired against a `MemoryStore` and a `FakeGateway`, with
/// artifacts under a temp directory kept alive by the returned guard
pub fn orchestrator(
    store: Arc<dyn ServiceStore>,
    gateway: Arc<FakeGateway>,
) -> (LifecycleOrchestrator, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = LifecycleOrchestrator::new(
        store,
        gateway,
        SecurityGate::new(),
        ArtifactWriter::new(dir.path().join("artifacts")),
    );
    (orchestrator, dir)
}
