//! Persistence of submitted registration records

mod firestore;
mod json_file;
mod traits;

pub use firestore::FirestoreStore;
pub use json_file::JsonFileStore;
pub use traits::{RecordStore, StoreError};

#[cfg(test)]
pub use traits::MockRecordStore;

use crate::config::SignupConfig;
use anyhow::Result;
use std::sync::Arc;

/// Pick the record store described by the configuration.
///
/// Firestore is used when a project id is configured, otherwise records are
/// appended to JSON lines files in the data directory.
pub fn from_config(config: &SignupConfig) -> Result<Arc<dyn RecordStore>> {
    match config.firestore_project.as_deref() {
        Some(project) if !project.is_empty() => {
            let store = FirestoreStore::new(
                project,
                config.firestore_api_key.as_deref(),
                config.request_timeout(),
            )?;
            Ok(Arc::new(store))
        }
        _ => Ok(Arc::new(JsonFileStore::new(config.data_dir()?))),
    }
}
