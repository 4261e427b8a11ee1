//! Fixture JSON API used to exercise the client against real HTTP.
//!
//! `/items` is a small in-memory CRUD resource. The remaining routes produce
//! specific shapes of response on demand: arbitrary status codes, a
//! malformed JSON body, an empty body, a credential-gated route, a header
//! echo and a JSON string of any requested length.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const NOT_FOUND_BODY: &str = "not found";
pub const MALFORMED_BODY: &str = "this is not json";
pub const UNAUTHORIZED_BODY: &str = "missing credentials";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub done: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: usize,
}

/// Headers the client is expected to set, as the server saw them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EchoedHeaders {
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub authorization: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Principal {
    pub principal: String,
}

#[derive(Default)]
pub struct Store {
    items: RwLock<HashMap<u64, Item>>,
    next_id: AtomicU64,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    let db: Db = Arc::new(Store::default());
    Router::new()
        .route("/items", get(list_items).post(create_item).delete(delete_items))
        .route("/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/status/{code}", any(status))
        .route("/malformed", get(malformed))
        .route("/empty", get(empty))
        .route("/secure", get(secure))
        .route("/headers", any(echo_headers))
        .route("/bulk/{len}", get(bulk))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let items = db.items.read().await;
    let mut all: Vec<Item> = items.values().cloned().collect();
    all.sort_by_key(|item| item.id);
    Json(all)
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: db.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        name: input.name,
        done: input.done,
    };
    debug!("created item {}", item.id);
    db.items.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, (StatusCode, &'static str)> {
    let items = db.items.read().await;
    items.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Item>, (StatusCode, &'static str)> {
    let mut items = db.items.write().await;
    let item = items.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(done) = input.done {
        item.done = done;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let mut items = db.items.write().await;
    items
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

async fn delete_items(State(db): State<Db>, Json(ids): Json<Vec<u64>>) -> Json<Deleted> {
    let mut items = db.items.write().await;
    let deleted = ids.iter().filter(|id| items.remove(*id).is_some()).count();
    Json(Deleted { deleted })
}

async fn status(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return (StatusCode::BAD_REQUEST, "bad status code").into_response();
    };
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return status.into_response();
    }
    (status, format!("status {code}")).into_response()
}

async fn malformed() -> (StatusCode, &'static str) {
    (StatusCode::OK, MALFORMED_BODY)
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

/// A JSON string of `len` `x` characters; the body is `len + 2` bytes.
async fn bulk(Path(len): Path<usize>) -> Json<String> {
    debug!("serving a {len} character body");
    Json("x".repeat(len))
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn secure(headers: HeaderMap) -> Result<Json<Principal>, (StatusCode, &'static str)> {
    header(&headers, "authorization")
        .or_else(|| header(&headers, "session-id"))
        .map(|principal| Json(Principal { principal }))
        .ok_or((StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY))
}

async fn echo_headers(headers: HeaderMap) -> Json<EchoedHeaders> {
    Json(EchoedHeaders {
        content_type: header(&headers, "content-type"),
        accept: header(&headers, "accept"),
        user_agent: header(&headers, "user-agent"),
        authorization: header(&headers, "authorization"),
        session_id: header(&headers, "session-id"),
    })
}
