//! Cloud Firestore REST store
//!
//! Records become documents with auto-generated ids via
//! `POST .../documents/{collection}`; every JSON value is wrapped in the
//! typed value envelope Firestore expects (`stringValue`, `booleanValue`, ...).

use super::{RecordStore, StoreError};
use crate::state::forms::Record;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Record store backed by a Firestore project
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    endpoint: String,
    project: String,
    api_key: Option<String>,
}

impl FirestoreStore {
    pub fn new(project: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self, StoreError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, project, api_key, timeout)
    }

    pub fn with_endpoint(
        endpoint: &str,
        project: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project: project.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.endpoint, self.project, collection
        )
    }
}

/// Wrap a JSON value in Firestore's typed value envelope
pub(crate) fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            // int64 travels as a decimal string
            json!({ "integerValue": n.to_string() })
        }
        Value::Number(n) => json!({ "doubleValue": n.as_f64() }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) if items.is_empty() => json!({ "arrayValue": {} }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_fields(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), to_firestore_value(value)))
        .collect()
}

/// Request body for creating a document from a record
pub(crate) fn document_body(record: &Record) -> Value {
    json!({ "fields": encode_fields(record) })
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn add_record(&self, collection: &str, record: Record) -> Result<(), StoreError> {
        let mut request = self
            .http
            .post(self.documents_url(collection))
            .json(&document_body(&record));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        tracing::info!(collection, project = %self.project, "record stored in firestore");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("firestore:{}", self.project)
    }
}
