//! Background status monitoring for managed services.
//!
//! One periodic task reconciles stored status with what the OS actually
//! reports and broadcasts the reconciled snapshot to subscribers. Ticks are
//! single-flight: the tick body runs inline in the loop task and delayed
//! ticks are skipped, never queued behind one another.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};
use uuid::Uuid;

use warden_core::config::MonitorConfig;
use warden_core::error::WardenResult;
use warden_core::gateway::ServiceGateway;
use warden_core::record::{ServiceId, ServiceRecord, ServiceStatus};
use warden_core::store::ServiceStore;

/// Handle identifying one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback receiving the reconciled snapshot after each tick. Errors are
/// logged and isolated; they never reach other subscribers or the loop.
pub type SnapshotCallback = Arc<dyn Fn(&[ServiceRecord]) -> WardenResult<()> + Send + Sync>;

/// State shared between the monitor handle and the polling task
struct MonitorShared {
    store: Arc<dyn ServiceStore>,
    gateway: Arc<dyn ServiceGateway>,
    /// Guarded only for list mutation and cloning, never held across store
    /// or gateway I/O or while callbacks run
    subscribers: Mutex<Vec<(SubscriptionId, SnapshotCallback)>>,
    /// Snapshot from the previous tick, reused when the store cannot be
    /// read and as the fallback status when the gateway cannot be
    last_snapshot: Mutex<Vec<ServiceRecord>>,
}

impl MonitorShared {
    async fn run_tick(&self) {
        let mut records = match self.store.load_all().await {
            Ok(records) => records,
            Err(e) => {
                // degrade gracefully: the previous snapshot stands in
                error!(error = %e, "store load failed, reusing previous snapshot");
                self.last_snapshot.lock().unwrap().clone()
            }
        };

        let prior: HashMap<ServiceId, ServiceStatus> = self
            .last_snapshot
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.id, r.status))
            .collect();

        for record in &mut records {
            match self.gateway.query(record).await {
                Ok(raw) => {
                    let observed = ServiceStatus::from_raw(&raw);
                    if observed != record.status {
                        debug!(service = %record.name, stored = %record.status,
                            observed = %observed, "reconciling status");
                        record.status = observed;
                    }
                }
                Err(e) => {
                    error!(service = %record.name, error = %e, "status query failed");
                    if let Some(prior_status) = prior.get(&record.id) {
                        record.status = *prior_status;
                    }
                }
            }
        }

        *self.last_snapshot.lock().unwrap() = records.clone();
        self.notify(&records);
    }

    /// Invoke every subscriber with the same snapshot. The list is cloned
    /// out of the lock first, so callbacks are free to subscribe or
    /// unsubscribe from inside the notification.
    fn notify(&self, snapshot: &[ServiceRecord]) {
        let subscribers = self.subscribers.lock().unwrap().clone();
        for (id, callback) in subscribers {
            if let Err(e) = callback(snapshot) {
                error!(subscription = %id, error = %e, "subscriber callback failed");
            }
        }
    }
}

struct RunningLoop {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

struct MonitorInner {
    shared: Arc<MonitorShared>,
    config: MonitorConfig,
    running: Mutex<Option<RunningLoop>>,
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        if let Some(running) = self.running.lock().unwrap().take() {
            let _ = running.shutdown_tx.send(());
            running.handle.abort();
        }
    }
}

/// Background polling loop reconciling stored status with actual OS status
/// and broadcasting snapshots to subscribers
#[derive(Clone)]
pub struct StatusMonitor {
    inner: Arc<MonitorInner>,
}

impl StatusMonitor {
    pub fn new(
        store: Arc<dyn ServiceStore>,
        gateway: Arc<dyn ServiceGateway>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                shared: Arc::new(MonitorShared {
                    store,
                    gateway,
                    subscribers: Mutex::new(Vec::new()),
                    last_snapshot: Mutex::new(Vec::new()),
                }),
                config,
                running: Mutex::new(None),
            }),
        }
    }

    /// Register a callback for reconciled snapshots. Registering the same
    /// callback handle twice returns the existing subscription.
    pub fn subscribe(&self, callback: SnapshotCallback) -> SubscriptionId {
        let mut subscribers = self.inner.shared.subscribers.lock().unwrap();
        if let Some((id, _)) = subscribers
            .iter()
            .find(|(_, existing)| Arc::ptr_eq(existing, &callback))
        {
            return *id;
        }
        let id = SubscriptionId(Uuid::new_v4());
        subscribers.push((id, callback));
        id
    }

    /// Remove a subscription. Removing an unknown id is a no-op and
    /// returns false.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.shared.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.shared.subscribers.lock().unwrap().len()
    }

    /// Start the polling loop. Starting an already-started monitor is a
    /// no-op.
    pub fn start(&self) {
        let mut running = self.inner.running.lock().unwrap();
        if running.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let shared = Arc::clone(&self.inner.shared);
        let poll_interval = self.inner.config.poll_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => shared.run_tick().await,
                    _ = shutdown_rx.recv() => {
                        debug!("monitor received shutdown signal");
                        break;
                    }
                }
            }
        });

        *running = Some(RunningLoop {
            shutdown_tx,
            handle,
        });
        info!(interval_ms = poll_interval.as_millis() as u64, "status monitor started");
    }

    /// Stop the polling loop without waiting for an in-flight tick to
    /// drain. Stopping a non-started monitor is a no-op.
    pub fn stop(&self) {
        let mut running = self.inner.running.lock().unwrap();
        if let Some(running) = running.take() {
            let _ = running.shutdown_tx.send(());
            info!("status monitor stopped");
        }
    }

    /// Whether the polling loop is currently running
    pub fn is_running(&self) -> bool {
        self.inner.running.lock().unwrap().is_some()
    }

    /// Run a single reconciliation tick on demand, outside the timer
    pub async fn tick_once(&self) {
        self.inner.shared.run_tick().await;
    }

    /// The snapshot produced by the most recent tick
    pub fn last_snapshot(&self) -> Vec<ServiceRecord> {
        self.inner.shared.last_snapshot.lock().unwrap().clone()
    }
}
