//! Per-user record storage and the merge-upsert adapter.
//!
//! A user record is an open mapping from field key to encoded value, owned
//! by the storage collaborator and persisted indefinitely. The pipeline
//! only ever updates one field at a time, via read-modify-write, and never
//! deletes records.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument};

use crate::error::Result;

/// Open mapping from field key to encoded field value.
pub type UserRecord = BTreeMap<String, String>;

/// Capability to read and write a named record per user.
///
/// Both operations may fail with [`StoreUnavailable`]. A failed `put` must
/// not be treated as persisted.
///
/// [`StoreUnavailable`]: crate::DocsnapError::StoreUnavailable
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the record for a user; `None` when no record exists yet.
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Write the full record for a user, replacing any previous version.
    async fn put(&self, user_id: &str, record: UserRecord) -> Result<()>;
}

/// Merge one field into a user's record, preserving every other key.
///
/// An absent record is treated as empty. A fetch failure leaves the record
/// unmodified; the whole record is written back in one `put`.
#[instrument(level = "debug", skip(store, value))]
pub async fn merge_field(
    store: &dyn RecordStore,
    user_id: &str,
    field_key: &str,
    value: String,
) -> Result<()> {
    let mut record = store.get(user_id).await?.unwrap_or_default();
    record.insert(field_key.to_string(), value);
    store.put(user_id, record).await?;
    debug!("Merged field into user record");
    Ok(())
}

/// In-memory record store for tests and development.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, UserRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.records.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, user_id: &str, record: UserRecord) -> Result<()> {
        self.records.insert(user_id.to_string(), record);
        Ok(())
    }
}
