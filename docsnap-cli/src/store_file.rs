//! JSON-file record store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use docsnap_core::{DocsnapError, RecordStore, UserRecord};
use tracing::debug;

type Document = BTreeMap<String, UserRecord>;

/// Record store over one JSON document shaped
/// `{ "<user_id>": { "<field_key>": "<encoded_value>" } }`.
///
/// Suited to the CLI's single-process use; concurrent writers get
/// last-writer-wins, like the remote store this stands in for.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<Document, DocsnapError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                DocsnapError::StoreUnavailable(format!("malformed record file: {e}"))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(DocsnapError::StoreUnavailable(format!(
                "failed to read record file: {e}"
            ))),
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn get(&self, user_id: &str) -> docsnap_core::Result<Option<UserRecord>> {
        let mut document = self.load()?;
        Ok(document.remove(user_id))
    }

    async fn put(&self, user_id: &str, record: UserRecord) -> docsnap_core::Result<()> {
        let mut document = self.load()?;
        document.insert(user_id.to_string(), record);

        let json = serde_json::to_vec_pretty(&document).map_err(|e| {
            DocsnapError::StoreUnavailable(format!("failed to serialize records: {e}"))
        })?;
        std::fs::write(&self.path, json).map_err(|e| {
            DocsnapError::StoreUnavailable(format!("failed to write record file: {e}"))
        })?;

        debug!(path = %self.path.display(), "Record file updated");
        Ok(())
    }
}
