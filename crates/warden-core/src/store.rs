use async_trait::async_trait;

use crate::error::WardenResult;
use crate::record::{ServiceId, ServiceRecord};

/// Persistence boundary for service records.
///
/// Implementations must serialize mutations internally: two concurrent
/// `add`/`update`/`remove` calls on the same id must not interleave their
/// load-modify-save round trips.
#[async_trait]
pub trait ServiceStore: Send + Sync + 'static {
    /// Load every known record
    async fn load_all(&self) -> WardenResult<Vec<ServiceRecord>>;

    /// Look up a record by id
    async fn get(&self, id: &ServiceId) -> WardenResult<Option<ServiceRecord>>;

    /// Insert a new record; fails if the id is already present
    async fn add(&self, record: ServiceRecord) -> WardenResult<()>;

    /// Replace an existing record; fails with not-found if absent
    async fn update(&self, record: ServiceRecord) -> WardenResult<()>;

    /// Remove a record; fails with not-found if absent
    async fn remove(&self, id: &ServiceId) -> WardenResult<()>;
}
