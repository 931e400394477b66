//! In-memory [`CollectionBackend`] for controller tests.
//!
//! Records every call as `METHOD /collection[/id]`, can be told to fail
//! specific operations, and can hold requests at a gate so tests can
//! observe the controller while a request is outstanding.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;
use verger_client::{ApiError, CollectionBackend};
use verger_core::form::{FieldValue, FormValues};

/// A canned failure: status code and raw body.
#[derive(Debug, Clone)]
pub struct Failure {
    pub status: u16,
    pub body: String,
}

impl Failure {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    fn to_error(&self) -> ApiError {
        ApiError::from_body(self.status, &self.body)
    }
}

#[derive(Default)]
pub struct FakeState {
    pub records: Vec<Value>,
    pub calls: Vec<String>,
    pub single_object: bool,
    pub no_echo: bool,
    /// Answer create/update with this body instead of the stored record.
    pub acknowledgement: Option<Value>,
    pub fail_list: Option<Failure>,
    pub fail_fetch: Option<Failure>,
    pub fail_create: Option<Failure>,
    pub fail_update: Option<Failure>,
    pub fail_delete: Option<Failure>,
    next_id: i64,
}

pub struct FakeBackend {
    key: &'static str,
    state: Mutex<FakeState>,
    /// When set, every request waits for a permit before answering.
    gate: Option<Arc<Notify>>,
    /// Signalled each time a request reaches the backend.
    pub entered: Arc<Notify>,
}

impl FakeBackend {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            state: Mutex::new(FakeState::default()),
            gate: None,
            entered: Arc::new(Notify::new()),
        }
    }

    /// A backend whose requests block until [`FakeBackend::release`].
    pub fn gated(key: &'static str) -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::new(key)
        }
    }

    pub fn with_records(self, records: Vec<Value>) -> Self {
        self.state().records = records;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend poisoned")
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    async fn enter(&self, call: String) {
        self.state().calls.push(call);
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn key_of(&self, record: &Value) -> Option<String> {
        match record.get(self.key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[async_trait]
impl CollectionBackend for FakeBackend {
    async fn list(&self, collection: &str) -> Result<Value, ApiError> {
        self.enter(format!("GET /{collection}")).await;
        let state = self.state();
        if let Some(f) = &state.fail_list {
            return Err(f.to_error());
        }
        if state.single_object {
            return Ok(state.records.first().cloned().unwrap_or(Value::Null));
        }
        Ok(Value::Array(state.records.clone()))
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Value, ApiError> {
        self.enter(format!("GET /{collection}/{id}")).await;
        let state = self.state();
        if let Some(f) = &state.fail_fetch {
            return Err(f.to_error());
        }
        state
            .records
            .iter()
            .find(|r| self.key_of(r).as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| ApiError::from_body(404, r#"{"message":"not found"}"#))
    }

    async fn create(&self, collection: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        self.enter(format!("POST /{collection}")).await;
        let mut state = self.state();
        if let Some(f) = &state.fail_create {
            return Err(f.to_error());
        }
        let mut record = body.clone();
        if self.key_of(&record).is_none() {
            state.next_id += 1;
            record[self.key] = Value::from(state.next_id);
        }
        state.records.push(record.clone());
        if let Some(ack) = &state.acknowledgement {
            return Ok(Some(ack.clone()));
        }
        Ok((!state.no_echo).then_some(record))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> Result<Option<Value>, ApiError> {
        self.enter(format!("PUT /{collection}/{id}")).await;
        let mut state = self.state();
        if let Some(f) = &state.fail_update {
            return Err(f.to_error());
        }
        let position = state
            .records
            .iter()
            .position(|r| self.key_of(r).as_deref() == Some(id));
        match position {
            Some(i) => {
                state.records[i] = body.clone();
                if let Some(ack) = &state.acknowledgement {
                    return Ok(Some(ack.clone()));
                }
                Ok((!state.no_echo).then(|| body.clone()))
            }
            None => Err(ApiError::from_body(404, "")),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        self.enter(format!("DELETE /{collection}/{id}")).await;
        let mut state = self.state();
        if let Some(f) = &state.fail_delete {
            return Err(f.to_error());
        }
        let key = self.key;
        state.records.retain(|r| match r.get(key) {
            Some(Value::String(s)) => s != id,
            Some(Value::Number(n)) => n.to_string() != id,
            _ => true,
        });
        Ok(())
    }
}

/// Build form input from text pairs.
pub fn input(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FieldValue::Text(v.to_string())))
        .collect()
}

/// Build a JSON object record from text pairs.
pub fn record(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}
