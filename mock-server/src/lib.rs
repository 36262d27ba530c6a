//! In-memory fake of the Warren API for client tests.
//!
//! Every request is appended to a journal before authentication, so tests
//! can assert on what reached the server (or that nothing did). Requests
//! whose `apikey` header does not match the configured key get `401`.
//! Unknown routes answer `404 not found`; `GET /ok` answers `200 OK`.

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, error};
use uuid::Uuid;

pub const API_KEY: &str = "secret";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Request target as sent on the wire: path plus query.
    pub uri: String,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Location {
    pub display_name: String,
    pub is_default: bool,
    pub is_preferred: bool,
    pub description: String,
    pub order_nr: i64,
    pub slug: String,
    pub country_code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Disk {
    pub uuid: Uuid,
    pub size_gb: u32,
    pub billing_account_id: u64,
    pub user_id: u64,
    pub status: String,
    pub source_image_type: String,
    pub source_image: Option<String>,
    pub attached_to: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: u64,
    pub address: String,
    pub user_id: u64,
    pub billing_account_id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub enabled: bool,
    pub assigned_to: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub size_bytes: u64,
    pub billing_account_id: u64,
    pub num_objects: u64,
    pub created_at: String,
    pub modified_at: String,
    pub is_suspended: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credential {
    pub access_key: String,
    pub secret_key: String,
    pub user_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3User {
    pub display_name: String,
    pub email: String,
    pub max_buckets: u32,
    pub s3_credentials: Vec<S3Credential>,
    pub suspended: u8,
    #[serde(rename = "UserID")]
    pub user_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Network {
    pub vlan_id: u32,
    pub uuid: Uuid,
    pub name: String,
    pub subnet: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_default: bool,
    pub resources_count: u32,
    pub vm_uuids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateDisk {
    pub size_gb: u32,
    pub billing_account_id: u64,
    pub source_image_type: Option<String>,
    pub source_image: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDisk {
    pub billing_account_id: u64,
}

#[derive(Deserialize)]
pub struct VmStorage {
    pub uuid: Uuid,
    pub storage_uuid: Uuid,
}

#[derive(Deserialize)]
pub struct FloatingIpInput {
    pub name: String,
    pub billing_account_id: u64,
}

#[derive(Deserialize)]
pub struct AssignIp {
    pub vm_uuid: Uuid,
}

#[derive(Deserialize)]
pub struct BucketName {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateBucket {
    pub name: String,
    pub billing_account_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct UpdateBucket {
    pub name: String,
    pub billing_account_id: u64,
}

#[derive(Deserialize)]
pub struct BucketFilter {
    pub billing_account_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct AccessKey {
    pub access_key: String,
}

#[derive(Deserialize)]
pub struct NetworkName {
    pub name: String,
}

const MOCK_USER: &str = "mock-user";

#[derive(Default)]
pub struct Store {
    disks: HashMap<Uuid, Disk>,
    ips: HashMap<String, FloatingIp>,
    next_ip: u64,
    buckets: HashMap<String, Bucket>,
    keys: Vec<S3Credential>,
    networks: HashMap<Uuid, Network>,
    next_vlan: u32,
}

pub type Db = Arc<RwLock<Store>>;
pub type Journal = Arc<RwLock<Vec<RecordedRequest>>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
    journal: Journal,
}

impl AppState {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
            db: Db::default(),
            journal: Journal::default(),
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.journal.read().await.clone()
    }
}

type ApiResult<T> = Result<T, (StatusCode, &'static str)>;

const NOT_FOUND: (StatusCode, &str) = (StatusCode::NOT_FOUND, "not found");

pub fn app() -> Router {
    router(AppState::new(API_KEY))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/v1/config/locations", get(list_locations))
        .route("/v1/storage/api/s3", get(s3_api_url))
        .route("/v1/storage/user", get(s3_user))
        .route(
            "/v1/storage/user/keys",
            get(list_keys).post(generate_key).delete(delete_key),
        )
        .route("/v1/storage/bucket/list", get(list_buckets))
        .route(
            "/v1/storage/bucket",
            get(get_bucket).put(create_bucket).patch(update_bucket).delete(delete_bucket),
        )
        .route("/v1/storage/disks", get(list_disks).post(create_disk))
        .route("/v1/storage/disks/{id}", get(get_disk).patch(update_disk).delete(delete_disk))
        .route("/v1/user-resource/vm/storage/attach", post(attach_disk))
        .route("/v1/user-resource/vm/storage/detach", post(detach_disk))
        .route("/v1/{location}/network/networks", get(list_networks))
        .route("/v1/{location}/network/network", post(get_or_create_default_network))
        .route(
            "/v1/{location}/network/network/{id}",
            get(get_network).patch(rename_network).delete(delete_network),
        )
        .route("/v1/{location}/network/network/{id}/default", put(set_default_network))
        .route("/v1/{location}/network/ip_addresses", get(list_ips).post(create_ip))
        .route(
            "/v1/{location}/network/ip_addresses/{address}",
            get(get_ip).patch(update_ip).delete(delete_ip),
        )
        .route("/v1/{location}/network/ip_addresses/{address}/assign", post(assign_ip))
        .route("/v1/{location}/network/ip_addresses/{address}/unassign", post(unassign_ip))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), record_and_authenticate))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

/// A mock server running on a random local port in a background thread.
pub struct MockServer {
    addr: SocketAddr,
    state: AppState,
}

impl MockServer {
    pub fn spawn() -> std::io::Result<Self> {
        Self::spawn_with_key(API_KEY)
    }

    pub fn spawn_with_key(api_key: &str) -> std::io::Result<Self> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let state = AppState::new(api_key);
        let server_state = state.clone();
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "failed to start mock server runtime");
                    return;
                }
            };
            let result = rt.block_on(async {
                let listener = TcpListener::from_std(std_listener)?;
                run(listener, server_state).await
            });
            if let Err(e) = result {
                error!(error = %e, "mock server stopped");
            }
        });

        Ok(Self { addr, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Snapshot of the journal. Must not be called from async code.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.journal.blocking_read().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.journal.blocking_read().len()
    }
}

async fn record_and_authenticate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return (StatusCode::BAD_REQUEST, "unreadable body").into_response(),
    };
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        api_key: header("apikey"),
        content_type: header(CONTENT_TYPE.as_str()),
        body: bytes.to_vec(),
    };
    debug!(method = %recorded.method, uri = %recorded.uri, "mock request");
    let authorized = recorded.api_key.as_deref() == Some(&*state.api_key);
    state.journal.write().await.push(recorded);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn ok() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    NOT_FOUND
}

fn locations() -> Vec<Location> {
    vec![
        Location {
            display_name: "Tallinn".to_string(),
            is_default: true,
            is_preferred: true,
            description: "Tallinn, Estonia".to_string(),
            order_nr: 1,
            slug: "tll".to_string(),
            country_code: "EE".to_string(),
        },
        Location {
            display_name: "Jakarta".to_string(),
            is_default: false,
            is_preferred: false,
            description: "Jakarta, Indonesia".to_string(),
            order_nr: 2,
            slug: "jkt01".to_string(),
            country_code: "ID".to_string(),
        },
    ]
}

fn check_location(slug: &str) -> ApiResult<()> {
    if locations().iter().any(|l| l.slug == slug) {
        Ok(())
    } else {
        Err(NOT_FOUND)
    }
}

async fn list_locations() -> Json<Vec<Location>> {
    Json(locations())
}

async fn s3_api_url() -> Json<HashMap<&'static str, &'static str>> {
    Json(HashMap::from([("s3_api_url", "https://s3.tll.warren.io")]))
}

async fn s3_user(State(state): State<AppState>) -> Json<S3User> {
    let store = state.db.read().await;
    Json(S3User {
        display_name: "Mock User".to_string(),
        email: "mock@example.com".to_string(),
        max_buckets: 1000,
        s3_credentials: store.keys.clone(),
        suspended: 0,
        user_id: MOCK_USER.to_string(),
    })
}

async fn list_keys(State(state): State<AppState>) -> Json<Vec<S3Credential>> {
    Json(state.db.read().await.keys.clone())
}

async fn generate_key(State(state): State<AppState>) -> Json<Vec<S3Credential>> {
    let mut store = state.db.write().await;
    store.keys.push(S3Credential {
        access_key: Uuid::new_v4().simple().to_string().to_uppercase(),
        secret_key: Uuid::new_v4().simple().to_string(),
        user_id: MOCK_USER.to_string(),
    });
    Json(store.keys.clone())
}

async fn delete_key(State(state): State<AppState>, Query(input): Query<AccessKey>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    let before = store.keys.len();
    store.keys.retain(|k| k.access_key != input.access_key);
    if store.keys.len() == before {
        return Err(NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_buckets(State(state): State<AppState>, Query(filter): Query<BucketFilter>) -> Json<Vec<Bucket>> {
    let store = state.db.read().await;
    Json(
        store
            .buckets
            .values()
            .filter(|b| filter.billing_account_id.map_or(true, |id| b.billing_account_id == id))
            .cloned()
            .collect(),
    )
}

async fn get_bucket(State(state): State<AppState>, Query(input): Query<BucketName>) -> ApiResult<Json<Bucket>> {
    let store = state.db.read().await;
    store.buckets.get(&input.name).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn create_bucket(State(state): State<AppState>, Form(input): Form<CreateBucket>) -> ApiResult<Json<Bucket>> {
    let mut store = state.db.write().await;
    if store.buckets.contains_key(&input.name) {
        return Err((StatusCode::CONFLICT, "bucket already exists"));
    }
    let bucket = Bucket {
        name: input.name,
        size_bytes: 0,
        billing_account_id: input.billing_account_id.unwrap_or(1),
        num_objects: 0,
        created_at: "2024-01-01 00:00:00".to_string(),
        modified_at: "2024-01-01 00:00:00".to_string(),
        is_suspended: false,
    };
    store.buckets.insert(bucket.name.clone(), bucket.clone());
    Ok(Json(bucket))
}

async fn update_bucket(State(state): State<AppState>, Form(input): Form<UpdateBucket>) -> ApiResult<Json<Bucket>> {
    let mut store = state.db.write().await;
    let bucket = store.buckets.get_mut(&input.name).ok_or(NOT_FOUND)?;
    bucket.billing_account_id = input.billing_account_id;
    Ok(Json(bucket.clone()))
}

async fn delete_bucket(State(state): State<AppState>, Query(input): Query<BucketName>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    store.buckets.remove(&input.name).map(|_| StatusCode::NO_CONTENT).ok_or(NOT_FOUND)
}

async fn list_disks(State(state): State<AppState>) -> Json<Vec<Disk>> {
    let store = state.db.read().await;
    Json(store.disks.values().cloned().collect())
}

async fn create_disk(State(state): State<AppState>, Form(input): Form<CreateDisk>) -> (StatusCode, Json<Disk>) {
    let disk = Disk {
        uuid: Uuid::new_v4(),
        size_gb: input.size_gb,
        billing_account_id: input.billing_account_id,
        user_id: 1,
        status: "available".to_string(),
        source_image_type: input.source_image_type.unwrap_or_else(|| "EMPTY".to_string()),
        source_image: input.source_image.filter(|s| !s.is_empty()),
        attached_to: None,
    };
    state.db.write().await.disks.insert(disk.uuid, disk.clone());
    (StatusCode::CREATED, Json(disk))
}

async fn get_disk(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Disk>> {
    let store = state.db.read().await;
    store.disks.get(&id).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn update_disk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(input): Form<UpdateDisk>,
) -> ApiResult<Json<Disk>> {
    let mut store = state.db.write().await;
    let disk = store.disks.get_mut(&id).ok_or(NOT_FOUND)?;
    disk.billing_account_id = input.billing_account_id;
    Ok(Json(disk.clone()))
}

async fn delete_disk(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    store.disks.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(NOT_FOUND)
}

async fn attach_disk(State(state): State<AppState>, Form(input): Form<VmStorage>) -> ApiResult<Json<Disk>> {
    let mut store = state.db.write().await;
    let disk = store.disks.get_mut(&input.storage_uuid).ok_or(NOT_FOUND)?;
    disk.attached_to = Some(input.uuid);
    disk.status = "in-use".to_string();
    Ok(Json(disk.clone()))
}

async fn detach_disk(State(state): State<AppState>, Form(input): Form<VmStorage>) -> ApiResult<Json<Disk>> {
    let mut store = state.db.write().await;
    let disk = store.disks.get_mut(&input.storage_uuid).ok_or(NOT_FOUND)?;
    if disk.attached_to != Some(input.uuid) {
        return Err((StatusCode::CONFLICT, "disk is not attached to this vm"));
    }
    disk.attached_to = None;
    disk.status = "available".to_string();
    Ok(Json(disk.clone()))
}

async fn list_networks(State(state): State<AppState>, Path(location): Path<String>) -> ApiResult<Json<Vec<Network>>> {
    check_location(&location)?;
    let store = state.db.read().await;
    Ok(Json(store.networks.values().cloned().collect()))
}

async fn get_or_create_default_network(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(input): Query<NetworkName>,
) -> ApiResult<Json<Network>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    if let Some(network) = store.networks.values().find(|n| n.is_default) {
        return Ok(Json(network.clone()));
    }
    store.next_vlan += 1;
    let network = Network {
        vlan_id: store.next_vlan,
        uuid: Uuid::new_v4(),
        name: input.name,
        subnet: format!("10.{}.0.0/24", store.next_vlan),
        kind: "private".to_string(),
        is_default: true,
        resources_count: 0,
        vm_uuids: Vec::new(),
    };
    store.networks.insert(network.uuid, network.clone());
    Ok(Json(network))
}

async fn get_network(
    State(state): State<AppState>,
    Path((location, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<Network>> {
    check_location(&location)?;
    let store = state.db.read().await;
    store.networks.get(&id).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn rename_network(
    State(state): State<AppState>,
    Path((location, id)): Path<(String, Uuid)>,
    Json(input): Json<NetworkName>,
) -> ApiResult<Json<Network>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    let network = store.networks.get_mut(&id).ok_or(NOT_FOUND)?;
    network.name = input.name;
    Ok(Json(network.clone()))
}

async fn delete_network(
    State(state): State<AppState>,
    Path((location, id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    store.networks.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(NOT_FOUND)
}

async fn set_default_network(
    State(state): State<AppState>,
    Path((location, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<Network>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    if !store.networks.contains_key(&id) {
        return Err(NOT_FOUND);
    }
    for network in store.networks.values_mut() {
        network.is_default = network.uuid == id;
    }
    store.networks.get(&id).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn list_ips(State(state): State<AppState>, Path(location): Path<String>) -> ApiResult<Json<Vec<FloatingIp>>> {
    check_location(&location)?;
    let store = state.db.read().await;
    Ok(Json(store.ips.values().cloned().collect()))
}

async fn create_ip(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Json(input): Json<FloatingIpInput>,
) -> ApiResult<Json<FloatingIp>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    store.next_ip += 1;
    let ip = FloatingIp {
        id: store.next_ip,
        address: format!("185.0.0.{}", store.next_ip),
        user_id: 1,
        billing_account_id: input.billing_account_id,
        kind: "public".to_string(),
        name: input.name,
        enabled: true,
        assigned_to: None,
    };
    store.ips.insert(ip.address.clone(), ip.clone());
    Ok(Json(ip))
}

async fn get_ip(
    State(state): State<AppState>,
    Path((location, address)): Path<(String, String)>,
) -> ApiResult<Json<FloatingIp>> {
    check_location(&location)?;
    let store = state.db.read().await;
    store.ips.get(&address).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn update_ip(
    State(state): State<AppState>,
    Path((location, address)): Path<(String, String)>,
    Json(input): Json<FloatingIpInput>,
) -> ApiResult<Json<FloatingIp>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    let ip = store.ips.get_mut(&address).ok_or(NOT_FOUND)?;
    ip.name = input.name;
    ip.billing_account_id = input.billing_account_id;
    Ok(Json(ip.clone()))
}

async fn delete_ip(
    State(state): State<AppState>,
    Path((location, address)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    store.ips.remove(&address).map(|_| StatusCode::NO_CONTENT).ok_or(NOT_FOUND)
}

async fn assign_ip(
    State(state): State<AppState>,
    Path((location, address)): Path<(String, String)>,
    Json(input): Json<AssignIp>,
) -> ApiResult<Json<FloatingIp>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    let ip = store.ips.get_mut(&address).ok_or(NOT_FOUND)?;
    ip.assigned_to = Some(input.vm_uuid);
    Ok(Json(ip.clone()))
}

async fn unassign_ip(
    State(state): State<AppState>,
    Path((location, address)): Path<(String, String)>,
    Json(input): Json<AssignIp>,
) -> ApiResult<Json<FloatingIp>> {
    check_location(&location)?;
    let mut store = state.db.write().await;
    let ip = store.ips.get_mut(&address).ok_or(NOT_FOUND)?;
    if ip.assigned_to != Some(input.vm_uuid) {
        return Err((StatusCode::CONFLICT, "address is not assigned to this vm"));
    }
    ip.assigned_to = None;
    Ok(Json(ip.clone()))
}
