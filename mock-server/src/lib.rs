//! In-memory stand-in for the RAWS services (META, RASS, RATS).
//!
//! Implements just enough of each service for end-to-end tests: content
//! and vocabulary CRUD with the `entry` envelope, CDN items and directories,
//! source uploads and transcoding jobs. Every route requires HTTP Basic
//! auth. Like the real META service it fills in server-owned fields
//! (`meta_updated`, file `size`) on write.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Timestamp stamped on every content write.
pub const META_UPDATED: &str = "2024-01-01 00:00:00";
/// Size reported for files whose size the client did not send.
pub const DEFAULT_FILE_SIZE: u64 = 1024;

#[derive(Debug, Default)]
pub struct Store {
    /// (user, name) -> inner `entry` object.
    content: BTreeMap<(String, String), Value>,
    vocabs: BTreeMap<(String, String), Value>,
    /// Normalised path ("videos/clip.mp4") -> bytes.
    items: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    srcs: HashMap<String, usize>,
    jobs: HashMap<String, Value>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = Result<(StatusCode, Json<Value>), (StatusCode, String)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/content/{user}/", get(list_content).post(create_content))
        .route(
            "/content/{user}/{name}/",
            get(get_content).post(update_content).delete(delete_content),
        )
        .route("/contentdir/{user}/", get(list_content))
        .route("/ext/json/{user}/", get(list_content))
        .route("/vocab/{user}/", get(list_vocabs).post(create_vocab))
        .route(
            "/vocab/{user}/{name}/",
            get(get_vocab).post(update_vocab).delete(delete_vocab),
        )
        .route(
            "/item/{*path}",
            get(head_item).post(upload_item).put(put_item).delete(delete_item),
        )
        .route(
            "/dir/{*path}",
            get(list_dir).post(create_dir_forced).put(create_dir).delete(delete_dir),
        )
        .route("/meta/{user}/{*path}", get(meta_info))
        .route("/src/", put(upload_src))
        .route("/job/", post(create_job))
        .route("/job/{id}/", get(get_job))
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(request: Request, next: Next) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic ") && v.len() > "Basic ".len());
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn error(status: StatusCode, message: &str) -> (StatusCode, String) {
    (status, json!({ "error": message }).to_string())
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// `clip.mp4` -> `clip_1.mp4`, `clip_2.mp4`, ... until the name is free.
pub fn next_free_name(taken: impl Fn(&str) -> bool, name: &str) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    (1..)
        .map(|n| format!("{stem}_{n}{ext}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn feed(entries: impl Iterator<Item = Value>) -> Value {
    json!({ "feed": { "entry": entries.collect::<Vec<_>>() } })
}

fn params_name(body: &Value) -> Option<String> {
    body.pointer("/entry/content/params/name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Stamp server-owned fields and return the inner `entry` object.
fn enrich_content(mut body: Value) -> Value {
    if let Some(params) = body
        .pointer_mut("/entry/content/params")
        .and_then(Value::as_object_mut)
    {
        params.insert("meta_updated".to_string(), json!(META_UPDATED));
    }
    if let Some(files) = body
        .pointer_mut("/entry/content/file")
        .and_then(Value::as_array_mut)
    {
        for file in files.iter_mut().filter_map(Value::as_object_mut) {
            file.entry("size").or_insert(json!(DEFAULT_FILE_SIZE));
        }
    }
    body["entry"].take()
}

// --- content ---

async fn list_content(State(db): State<Db>, Path(user): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let entries = store
        .content
        .iter()
        .filter(|((owner, _), _)| *owner == user)
        .map(|(_, entry)| entry.clone());
    Json(feed(entries))
}

async fn create_content(
    State(db): State<Db>,
    Path(user): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let name = params_name(&body).ok_or_else(|| error(StatusCode::BAD_REQUEST, "name is required"))?;
    let has_file = body
        .pointer("/entry/content/file")
        .and_then(Value::as_array)
        .is_some_and(|files| !files.is_empty());
    if !has_file {
        return Err(error(StatusCode::BAD_REQUEST, "at least one file is required"));
    }

    let mut store = db.write().await;
    let key = (user, name);
    if store.content.contains_key(&key) {
        return Err(error(StatusCode::CONFLICT, "content already exists"));
    }
    let entry = enrich_content(body);
    store.content.insert(key, entry.clone());
    Ok((StatusCode::CREATED, Json(json!({ "entry": entry }))))
}

async fn get_content(State(db): State<Db>, Path((user, name)): Path<(String, String)>) -> Reply {
    let store = db.read().await;
    store
        .content
        .get(&(user, name))
        .map(|entry| (StatusCode::OK, Json(json!({ "entry": entry }))))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "content does not exist"))
}

async fn update_content(
    State(db): State<Db>,
    Path((user, name)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply {
    let new_name = params_name(&body).ok_or_else(|| error(StatusCode::BAD_REQUEST, "name is required"))?;
    let mut store = db.write().await;
    if store.content.remove(&(user.clone(), name)).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "content does not exist"));
    }
    let entry = enrich_content(body);
    store.content.insert((user, new_name), entry.clone());
    Ok((StatusCode::OK, Json(json!({ "entry": entry }))))
}

async fn delete_content(
    State(db): State<Db>,
    Path((user, name)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = db.write().await;
    store
        .content
        .remove(&(user, name))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "content does not exist"))
}

// --- vocabularies ---

fn check_vocab(body: &Value) -> Result<String, (StatusCode, String)> {
    let name = params_name(body).ok_or_else(|| error(StatusCode::BAD_REQUEST, "name is required"))?;
    let namespace = body
        .pointer("/entry/content/params/xml_namespace")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if namespace.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "xml_namespace is required"));
    }
    Ok(name)
}

async fn list_vocabs(State(db): State<Db>, Path(user): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let entries = store
        .vocabs
        .iter()
        .filter(|((owner, _), _)| *owner == user)
        .map(|(_, entry)| entry.clone());
    Json(feed(entries))
}

async fn create_vocab(
    State(db): State<Db>,
    Path(user): Path<String>,
    Json(mut body): Json<Value>,
) -> Reply {
    let name = check_vocab(&body)?;
    let mut store = db.write().await;
    let key = (user, name);
    if store.vocabs.contains_key(&key) {
        return Err(error(StatusCode::CONFLICT, "vocab already exists"));
    }
    let entry = body["entry"].take();
    store.vocabs.insert(key, entry.clone());
    Ok((StatusCode::CREATED, Json(json!({ "entry": entry }))))
}

async fn get_vocab(State(db): State<Db>, Path((user, name)): Path<(String, String)>) -> Reply {
    let store = db.read().await;
    store
        .vocabs
        .get(&(user, name))
        .map(|entry| (StatusCode::OK, Json(json!({ "entry": entry }))))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "vocab does not exist"))
}

async fn update_vocab(
    State(db): State<Db>,
    Path((user, name)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> Reply {
    let new_name = check_vocab(&body)?;
    let mut store = db.write().await;
    if store.vocabs.remove(&(user.clone(), name)).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "vocab does not exist"));
    }
    let entry = body["entry"].take();
    store.vocabs.insert((user, new_name), entry.clone());
    Ok((StatusCode::CREATED, Json(json!({ "entry": entry }))))
}

async fn delete_vocab(
    State(db): State<Db>,
    Path((user, name)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = db.write().await;
    store
        .vocabs
        .remove(&(user, name))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "vocab does not exist"))
}

// --- items ---

fn slug(headers: &HeaderMap) -> Result<String, (StatusCode, String)> {
    headers
        .get("slug")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Slug header is required"))
}

fn item_entry(path: &str, size: usize) -> Value {
    json!({ "entry": { "content": { "params": { "path": format!("/{path}"), "size": size } } } })
}

async fn head_item(State(db): State<Db>, Path(path): Path<String>) -> StatusCode {
    let store = db.read().await;
    if store.items.contains_key(&normalize(&path)) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn upload_item(
    State(db): State<Db>,
    Path(dir): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let requested = slug(&headers)?;
    let dir = normalize(&dir);
    let mut store = db.write().await;
    let in_dir = |name: &str| {
        if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        }
    };
    let name = next_free_name(|candidate| store.items.contains_key(&in_dir(candidate)), &requested);
    let path = in_dir(&name);
    let size = body.len();
    store.items.insert(path.clone(), body.to_vec());
    if !dir.is_empty() {
        store.dirs.insert(dir.clone());
    }
    Ok((StatusCode::CREATED, Json(item_entry(&path, size))))
}

async fn put_item(
    State(db): State<Db>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    slug(&headers)?;
    let path = normalize(&path);
    let mut store = db.write().await;
    if store.items.contains_key(&path) {
        return Err(error(StatusCode::CONFLICT, "item already exists"));
    }
    if let Some((dir, _)) = path.rsplit_once('/') {
        store.dirs.insert(dir.to_string());
    }
    let size = body.len();
    store.items.insert(path.clone(), body.to_vec());
    Ok((StatusCode::CREATED, Json(item_entry(&path, size))))
}

async fn delete_item(
    State(db): State<Db>,
    Path(path): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = db.write().await;
    store
        .items
        .remove(&normalize(&path))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "item does not exist"))
}

// --- directories ---

fn dir_entry(path: &str) -> Value {
    json!({ "entry": { "content": { "params": { "path": format!("/{path}/") } } } })
}

async fn list_dir(State(db): State<Db>, Path(path): Path<String>) -> Reply {
    let dir = normalize(&path);
    let store = db.read().await;
    if !store.dirs.contains(&dir) {
        return Err(error(StatusCode::NOT_FOUND, "dir does not exist"));
    }
    let prefix = format!("{dir}/");
    let entries = store
        .items
        .iter()
        .filter(|(item, _)| item.starts_with(&prefix))
        .map(|(item, bytes)| item_entry(item, bytes.len())["entry"].clone());
    Ok((StatusCode::OK, Json(feed(entries))))
}

async fn create_dir(State(db): State<Db>, Path(path): Path<String>) -> Reply {
    let dir = normalize(&path);
    let mut store = db.write().await;
    if !store.dirs.insert(dir.clone()) {
        return Err(error(StatusCode::CONFLICT, "dir already exists"));
    }
    Ok((StatusCode::CREATED, Json(dir_entry(&dir))))
}

async fn create_dir_forced(State(db): State<Db>, Path(path): Path<String>) -> Reply {
    let requested = normalize(&path);
    let mut store = db.write().await;
    let dir = next_free_name(|candidate| store.dirs.contains(candidate), &requested);
    store.dirs.insert(dir.clone());
    Ok((StatusCode::CREATED, Json(dir_entry(&dir))))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteDirParams {
    #[serde(default)]
    pub recursive: Option<String>,
}

async fn delete_dir(
    State(db): State<Db>,
    Path(path): Path<String>,
    Query(params): Query<DeleteDirParams>,
) -> Result<StatusCode, (StatusCode, String)> {
    let dir = normalize(&path);
    let recursive = params.recursive.as_deref() == Some("1");
    let prefix = format!("{dir}/");
    let mut store = db.write().await;
    if !store.dirs.contains(&dir) {
        return Err(error(StatusCode::NOT_FOUND, "dir does not exist"));
    }
    let has_children = store.items.keys().any(|item| item.starts_with(&prefix));
    if has_children && !recursive {
        return Err(error(StatusCode::CONFLICT, "dir is not empty"));
    }
    store.items.retain(|item, _| !item.starts_with(&prefix));
    store.dirs.retain(|d| d != &dir && !d.starts_with(&prefix));
    Ok(StatusCode::NO_CONTENT)
}

async fn meta_info(
    State(db): State<Db>,
    Path((_user, path)): Path<(String, String)>,
) -> Reply {
    let path = normalize(&path);
    let store = db.read().await;
    match store.items.get(&path) {
        Some(bytes) => Ok((StatusCode::OK, Json(item_entry(&path, bytes.len())))),
        None if store.dirs.contains(&path) => Ok((StatusCode::OK, Json(dir_entry(&path)))),
        None => Err(error(StatusCode::NOT_FOUND, "path does not exist")),
    }
}

// --- transcoding ---

async fn upload_src(State(db): State<Db>, headers: HeaderMap, body: Bytes) -> Reply {
    let filename = slug(&headers)?;
    let mut store = db.write().await;
    let filename = next_free_name(|candidate| store.srcs.contains_key(candidate), &filename);
    store.srcs.insert(filename.clone(), body.len());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "entry": { "content": { "params": {
            "filename": filename, "size": body.len()
        } } } })),
    ))
}

async fn create_job(State(db): State<Db>, Json(body): Json<Value>) -> Reply {
    let params = body
        .pointer("/entry/content/params")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "params are required"))?;
    if !params.contains_key("format") && !params.contains_key("formatgroup") {
        return Err(error(StatusCode::BAD_REQUEST, "format or formatgroup is required"));
    }

    let mut store = db.write().await;
    if let Some(src) = params.get("src_location").and_then(Value::as_str) {
        if !store.srcs.contains_key(src.trim_start_matches('/')) {
            return Err(error(StatusCode::BAD_REQUEST, "src_location does not exist"));
        }
    }
    let id = Uuid::new_v4().to_string();
    let entry = json!({ "entry": {
        "id": format!("/job/{id}/"),
        "content": { "params": params, "status": "queued" }
    } });
    store.jobs.insert(id, entry.clone());
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_job(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    let store = db.read().await;
    store
        .jobs
        .get(&id)
        .map(|entry| (StatusCode::OK, Json(entry.clone())))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "job does not exist"))
}
