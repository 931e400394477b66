//! In-memory collection store keyed by `code`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use verger_client::{ApiError, CollectionBackend};

#[derive(Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    /// Codes whose deletion is refused with 409 "in use".
    pub in_use: Mutex<HashSet<String>>,
}

impl MemoryBackend {
    pub fn with(collection: &str, records: Value) -> Arc<Self> {
        let backend = Self::default();
        if let Value::Array(records) = records {
            backend
                .collections
                .lock()
                .unwrap()
                .insert(collection.to_string(), records);
        }
        Arc::new(backend)
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

fn code_of(record: &Value) -> Option<&str> {
    record.get("code").and_then(Value::as_str)
}

#[async_trait]
impl CollectionBackend for MemoryBackend {
    async fn list(&self, collection: &str) -> Result<Value, ApiError> {
        Ok(Value::Array(self.records(collection)))
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Value, ApiError> {
        self.records(collection)
            .into_iter()
            .find(|r| code_of(r) == Some(id))
            .ok_or_else(|| ApiError::from_body(404, ""))
    }

    async fn create(&self, collection: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(body.clone());
        Ok(Some(body.clone()))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> Result<Option<Value>, ApiError> {
        let mut collections = self.collections.lock().unwrap();
        let records = collections.entry(collection.to_string()).or_default();
        match records.iter_mut().find(|r| code_of(r) == Some(id)) {
            Some(slot) => {
                *slot = body.clone();
                Ok(None)
            }
            None => Err(ApiError::from_body(404, "")),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        if self.in_use.lock().unwrap().contains(id) {
            return Err(ApiError::from_body(409, r#"{"message":"in use"}"#));
        }
        let mut collections = self.collections.lock().unwrap();
        if let Some(records) = collections.get_mut(collection) {
            records.retain(|r| code_of(r) != Some(id));
        }
        Ok(())
    }
}
