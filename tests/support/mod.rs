#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use minicrm::api::{CrmApi, HttpApi};
use minicrm::config::ClientConfig;

#[derive(Default)]
struct Store {
    next_id: i64,
    collections: HashMap<String, BTreeMap<i64, Value>>,
}

type Db = Arc<Mutex<Store>>;

/// In-memory stand-in for the CRM store, listening on a random local port.
pub struct FakeCrm {
    pub base_url: String,
    store: Db,
    handle: JoinHandle<()>,
}

impl FakeCrm {
    pub async fn spawn() -> Self {
        let store = Db::default();
        let app = Router::new()
            .route("/{collection}", get(list).post(create))
            .route(
                "/{collection}/{id}",
                get(fetch).put(update).patch(set_done).delete(remove),
            )
            .with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake CRM");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake CRM stopped");
        });

        Self {
            base_url: format!("http://{}", addr),
            store,
            handle,
        }
    }

    pub fn api(&self) -> Arc<dyn CrmApi> {
        let config = ClientConfig::from_base_url(Some(&self.base_url)).expect("Invalid fake CRM url");
        Arc::new(HttpApi::new(config).expect("Failed to build HTTP client"))
    }

    /// Stores `record` directly and returns its new id.
    pub fn seed(&self, collection: &str, mut record: Value) -> i64 {
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = store.next_id;
        record["id"] = json!(id);
        store
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
        id
    }

    pub fn record(&self, collection: &str, id: i64) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store.collections.get(collection)?.get(&id).cloned()
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        let store = self.store.lock().unwrap();
        store
            .collections
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Drop for FakeCrm {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn not_found(collection: &str, id: i64) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": format!("{} {} not found", collection, id) })),
    )
}

async fn list(
    State(store): State<Db>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let store = store.lock().unwrap();
    let items = store
        .collections
        .get(&collection)
        .map(|records| {
            records
                .values()
                .filter(|r| params.get("assignee").is_none_or(|a| r["assignee"] == a.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(items)
}

async fn create(
    State(store): State<Db>,
    Path(collection): Path<String>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut store = store.lock().unwrap();
    store.next_id += 1;
    let id = store.next_id;
    body["id"] = json!(id);
    store
        .collections
        .entry(collection)
        .or_default()
        .insert(id, body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn fetch(
    State(store): State<Db>,
    Path((collection, id)): Path<(String, i64)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let store = store.lock().unwrap();
    store
        .collections
        .get(&collection)
        .and_then(|records| records.get(&id))
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(&collection, id))
}

async fn update(
    State(store): State<Db>,
    Path((collection, id)): Path<(String, i64)>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut store = store.lock().unwrap();
    let record = store
        .collections
        .get_mut(&collection)
        .and_then(|records| records.get_mut(&id))
        .ok_or_else(|| not_found(&collection, id))?;
    body["id"] = json!(id);
    *record = body.clone();
    Ok(Json(body))
}

/// Only the `done` column changes, like the real store.
async fn set_done(
    State(store): State<Db>,
    Path((collection, id)): Path<(String, i64)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut store = store.lock().unwrap();
    let record = store
        .collections
        .get_mut(&collection)
        .and_then(|records| records.get_mut(&id))
        .ok_or_else(|| not_found(&collection, id))?;
    record["done"] = json!(params.get("done").map(String::as_str) == Some("true"));
    Ok(Json(record.clone()))
}

async fn remove(
    State(store): State<Db>,
    Path((collection, id)): Path<(String, i64)>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut store = store.lock().unwrap();
    store
        .collections
        .get_mut(&collection)
        .and_then(|records| records.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(&collection, id))
}
