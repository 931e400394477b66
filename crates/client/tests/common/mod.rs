//! In-process mock of the orchard backend.
//!
//! Serves `/api/{collection}` and `/api/{collection}/{id}` from an in-memory store
//! keyed by the `code` field, on an ephemeral port. Knobs on
//! [`MockBackend`] reproduce the backend quirks the client must tolerate.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use verger_client::{ClientConfig, RestClient};

#[derive(Default)]
pub struct Store {
    pub records: HashMap<String, Vec<Value>>,
    /// Codes whose deletion is refused with 409 "in use".
    pub in_use: HashSet<String>,
    /// Answer list requests with the first record instead of an array.
    pub single_object: bool,
    /// Answer create/update with an empty 201/200 body.
    pub no_echo: bool,
    /// Answer every request with a bare 500 and no message.
    pub broken: bool,
    /// `METHOD path` of every request received.
    pub requests: Vec<String>,
    /// Headers of the last request received.
    pub last_headers: HeaderMap,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
}

impl MockBackend {
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().expect("mock store poisoned")
    }

    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        self.store().records.insert(collection.to_string(), records);
    }

    pub fn requests(&self) -> Vec<String> {
        self.store().requests.clone()
    }

    /// Bind to an ephemeral port and serve in the background.
    pub async fn spawn(&self) -> SocketAddr {
        let collections = Router::new()
            .route("/{collection}", get(list).post(create))
            .route(
                "/{collection}/{id}",
                get(fetch).put(update).delete(remove),
            );
        let app = Router::new()
            .nest("/api", collections)
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });
        addr
    }

    /// Spawn the server and build a client pointed at it.
    pub async fn client(&self, token: Option<&str>) -> RestClient {
        let addr = self.spawn().await;
        let config = ClientConfig {
            base_url: format!("http://{addr}/api"),
            timeout_secs: 5,
            api_token: token.map(str::to_string),
        };
        RestClient::new(&config).expect("client")
    }
}

fn code_of(record: &Value) -> Option<String> {
    match record.get("code")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_request(store: &mut Store, method: &str, path: String, headers: HeaderMap) {
    store.requests.push(format!("{method} {path}"));
    store.last_headers = headers;
}

fn broken() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn list(
    State(mock): State<MockBackend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut store = mock.store();
    record_request(&mut store, "GET", format!("/{collection}"), headers);
    if store.broken {
        return broken();
    }
    let records = store.records.get(&collection).cloned().unwrap_or_default();
    if store.single_object {
        return Json(records.into_iter().next().unwrap_or(Value::Null)).into_response();
    }
    Json(Value::Array(records)).into_response()
}

async fn fetch(
    State(mock): State<MockBackend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut store = mock.store();
    record_request(&mut store, "GET", format!("/{collection}/{id}"), headers);
    if store.broken {
        return broken();
    }
    let found = store
        .records
        .get(&collection)
        .and_then(|rs| rs.iter().find(|r| code_of(r).as_deref() == Some(id.as_str())))
        .cloned();
    match found {
        Some(record) => Json(record).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("{collection} {id} not found")})),
        )
            .into_response(),
    }
}

async fn create(
    State(mock): State<MockBackend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = mock.store();
    record_request(&mut store, "POST", format!("/{collection}"), headers);
    if store.broken {
        return broken();
    }
    let code = code_of(&body);
    let records = store.records.entry(collection).or_default();
    if code.is_some() && records.iter().any(|r| code_of(r) == code) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "code already exists"})),
        )
            .into_response();
    }
    records.push(body.clone());
    if store.no_echo {
        return StatusCode::CREATED.into_response();
    }
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update(
    State(mock): State<MockBackend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = mock.store();
    record_request(&mut store, "PUT", format!("/{collection}/{id}"), headers);
    if store.broken {
        return broken();
    }
    let no_echo = store.no_echo;
    let records = store.records.entry(collection).or_default();
    match records
        .iter_mut()
        .find(|r| code_of(r).as_deref() == Some(id.as_str()))
    {
        Some(slot) => {
            *slot = body.clone();
            if no_echo {
                StatusCode::OK.into_response()
            } else {
                Json(body).into_response()
            }
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
    }
}

async fn remove(
    State(mock): State<MockBackend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut store = mock.store();
    record_request(&mut store, "DELETE", format!("/{collection}/{id}"), headers);
    if store.broken {
        return broken();
    }
    if store.in_use.contains(&id) {
        return (StatusCode::CONFLICT, Json(json!({"message": "in use"}))).into_response();
    }
    let records = store.records.entry(collection).or_default();
    let before = records.len();
    records.retain(|r| code_of(r).as_deref() != Some(id.as_str()));
    if records.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
