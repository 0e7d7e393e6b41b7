//! Service record store implementations.
//!
//! Both stores serialize mutations behind their own `RwLock` write guard,
//! so two concurrent load-modify-save round trips on the same id cannot
//! interleave.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;

use warden_core::error::{WardenError, WardenResult};
use warden_core::record::{ServiceId, ServiceRecord};
use warden_core::store::ServiceStore;

fn sorted(mut records: Vec<ServiceRecord>) -> Vec<ServiceRecord> {
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    records
}

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<ServiceId, ServiceRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn load_all(&self) -> WardenResult<Vec<ServiceRecord>> {
        Ok(sorted(self.records.read().await.values().cloned().collect()))
    }

    async fn get(&self, id: &ServiceId) -> WardenResult<Option<ServiceRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn add(&self, record: ServiceRecord) -> WardenResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(WardenError::storage(format!(
                "service {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn update(&self, record: ServiceRecord) -> WardenResult<()> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(WardenError::not_found(record.id.to_string()));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn remove(&self, id: &ServiceId) -> WardenResult<()> {
        let mut records = self.records.write().await;
        if records.remove(id).is_none() {
            return Err(WardenError::not_found(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistentState {
    records: Vec<ServiceRecord>,
}

/// Record store backed by a single JSON file. The whole record set is held
/// in memory and rewritten to disk after every mutation, while the write
/// guard is still held.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    records: Arc<RwLock<HashMap<ServiceId, ServiceRecord>>>,
}

impl JsonStore {
    /// Open a store, loading existing state if the file is present
    pub async fn open(path: PathBuf) -> WardenResult<Self> {
        let mut records = HashMap::new();
        if path.exists() {
            let contents = fs::read_to_string(&path)
                .await
                .map_err(|e| WardenError::storage(format!("failed to read store file: {}", e)))?;
            let state: PersistentState = serde_json::from_str(&contents)
                .map_err(|e| WardenError::storage(format!("failed to parse store file: {}", e)))?;
            for record in state.records {
                records.insert(record.id, record);
            }
        }
        Ok(Self {
            path,
            records: Arc::new(RwLock::new(records)),
        })
    }

    async fn persist(&self, records: &HashMap<ServiceId, ServiceRecord>) -> WardenResult<()> {
        let state = PersistentState {
            records: sorted(records.values().cloned().collect()),
        };
        let contents = serde_json::to_string_pretty(&state)
            .map_err(|e| WardenError::storage(format!("failed to serialize store: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, contents)
            .await
            .map_err(|e| WardenError::storage(format!("failed to write store file: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for JsonStore {
    async fn load_all(&self) -> WardenResult<Vec<ServiceRecord>> {
        Ok(sorted(self.records.read().await.values().cloned().collect()))
    }

    async fn get(&self, id: &ServiceId) -> WardenResult<Option<ServiceRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn add(&self, record: ServiceRecord) -> WardenResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(WardenError::storage(format!(
                "service {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record);
        self.persist(&records).await
    }

    async fn update(&self, record: ServiceRecord) -> WardenResult<()> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(WardenError::not_found(record.id.to_string()));
        }
        records.insert(record.id, record);
        self.persist(&records).await
    }

    async fn remove(&self, id: &ServiceId) -> WardenResult<()> {
        let mut records = self.records.write().await;
        if records.remove(id).is_none() {
            return Err(WardenError::not_found(id.to_string()));
        }
        self.persist(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::record::ServiceSpec;

    fn record(name: &str) -> ServiceRecord {
        ServiceRecord::from_spec(ServiceSpec {
            name: name.to_string(),
            executable: PathBuf::from("/opt/app/bin").join(name),
            arguments: Vec::new(),
            working_dir: None,
            dependencies: Vec::new(),
            auto_start: false,
            restart_on_exit: false,
        })
    }

    #[tokio::test]
    async fn test_memory_store_duplicate_add_fails() {
        let store = MemoryStore::new();
        let r = record("a");
        store.add(r.clone()).await.unwrap();
        assert!(store.add(r).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_update_missing_fails() {
        let store = MemoryStore::new();
        let err = store.update(record("a")).await.unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");

        let store = JsonStore::open(path.clone()).await.unwrap();
        let r = record("a");
        store.add(r.clone()).await.unwrap();
        store.remove(&record("never-added").id).await.unwrap_err();

        // Reopen from disk
        let reopened = JsonStore::open(path).await.unwrap();
        let all = reopened.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, r.id);
        assert_eq!(all[0].name, "a");
    }
}
