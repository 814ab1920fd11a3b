//! Trait abstraction for the record store to enable mocking in tests

use crate::state::forms::Record;
use async_trait::async_trait;
use thiserror::Error;

/// Why a record could not be stored
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("document store answered with status {0}")]
    Status(u16),
    #[error("could not write record: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination of submitted records ("add record" on a collection)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Add a record to a collection; the stored document is not returned
    async fn add_record(&self, collection: &str, record: Record) -> Result<(), StoreError>;

    /// Human readable destination, for logs and the status bar
    fn describe(&self) -> String;
}
