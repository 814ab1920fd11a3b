//! Local JSON lines store, used when no remote document store is configured

use super::{RecordStore, StoreError};
use crate::state::forms::Record;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// One line of a collection file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub fields: Record,
}

/// Appends records to `{dir}/{collection}.jsonl`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.jsonl"))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn add_record(&self, collection: &str, record: Record) -> Result<(), StoreError> {
        let stored = StoredRecord {
            id: Uuid::new_v4(),
            collection: collection.to_string(),
            created_at: Utc::now(),
            fields: record,
        };
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.collection_path(collection);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(collection, id = %stored.id, path = %path.display(), "record stored");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local:{}", self.dir().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(name: &str) -> Record {
        let mut record = Record::new();
        record.insert("name".to_string(), json!(name));
        record.insert("ownField".to_string(), json!(true));
        record
    }

    fn read_lines(path: &Path) -> Vec<StoredRecord> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("records"));

        store.add_record("club", record("Estrela FC")).await.unwrap();
        store.add_record("club", record("Unidos da Vila")).await.unwrap();

        let lines = read_lines(&dir.path().join("records/club.jsonl"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].collection, "club");
        assert_eq!(lines[0].fields["name"], json!("Estrela FC"));
        assert_eq!(lines[1].fields["name"], json!("Unidos da Vila"));
        assert_ne!(lines[0].id, lines[1].id);
    }

    #[tokio::test]
    async fn test_collections_use_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.add_record("club", record("a")).await.unwrap();
        store.add_record("sponsor", record("b")).await.unwrap();

        assert_eq!(read_lines(&dir.path().join("club.jsonl")).len(), 1);
        assert_eq!(read_lines(&dir.path().join("sponsor.jsonl")).len(), 1);
    }

    #[test]
    fn test_describe() {
        let store = JsonFileStore::new("/tmp/signup");
        assert_eq!(store.describe(), "local:/tmp/signup");
        assert_eq!(store.dir(), Path::new("/tmp/signup"));
    }
}
