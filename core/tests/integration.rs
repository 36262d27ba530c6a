//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives the real ureq
//! transport, then inspects the server's request journal to check what went
//! over the wire.

use std::time::Duration;

use mock_server::{MockServer, API_KEY};
use serde_json::json;
use uuid::Uuid;
use warren_core::{
    ApiClient, ApiError, ClientResponse, Context, CreateDisk, ErrorKind, RequestConfig, SourceImageType, Values,
    Warren,
};

fn start() -> (MockServer, ApiClient) {
    let server = MockServer::spawn().unwrap();
    let client = ApiClient::new(&server.base_url(), API_KEY);
    (server, client)
}

#[test]
fn get_returns_body_and_sends_apikey() {
    let (server, client) = start();
    let resp = client.form_request(&Context::background(), &RequestConfig::get("/ok"));
    assert_eq!(resp, ClientResponse::ok(b"OK".to_vec()));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].uri, "/ok");
    assert_eq!(requests[0].api_key.as_deref(), Some(API_KEY));
}

#[test]
fn get_with_query_params() {
    let (server, client) = start();
    let cfg = RequestConfig::get("ok").query_pair("name", "test");
    let resp = client.form_request(&Context::background(), &cfg);
    assert!(resp.is_success());
    assert_eq!(server.requests()[0].uri, "/ok?name=test");
}

#[test]
fn form_request_sends_urlencoded_body() {
    let (server, client) = start();
    let form: Values = [("name", "test"), ("age", "20")].into_iter().collect();
    client.form_request(&Context::background(), &RequestConfig::post("/test").form(form));

    let recorded = &server.requests()[0];
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.uri, "/test");
    assert_eq!(recorded.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
    let body = Values::parse(&recorded.body_text());
    assert_eq!(body.get("name"), Some("test"));
    assert_eq!(body.get("age"), Some("20"));
}

#[test]
fn json_request_sends_json_object() {
    let (server, client) = start();
    let cfg = RequestConfig::post("/test").json_value(json!({"name": "test", "age": 20}));
    client.json_request(&Context::background(), &cfg);

    let recorded = &server.requests()[0];
    assert_eq!(recorded.content_type.as_deref(), Some("application/json"));
    assert_eq!(recorded.api_key.as_deref(), Some(API_KEY));
    assert_eq!(recorded.json(), Some(json!({"name": "test", "age": 20})));
}

#[test]
fn not_found_keeps_body_and_status() {
    let (_server, client) = start();
    let resp = client.form_request(&Context::background(), &RequestConfig::get("/missing"));
    assert_eq!(resp.body, b"not found");
    let err = resp.error.unwrap();
    assert!(err.to_string().contains("404"));
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[test]
fn wrong_key_is_rejected_by_provider() {
    let (server, client) = start();
    let resp = client
        .with_api_key("wrong")
        .form_request(&Context::background(), &RequestConfig::get("/ok"));
    assert_eq!(resp.error.and_then(|e| e.status()), Some(401));
    assert_eq!(server.requests()[0].api_key.as_deref(), Some("wrong"));
}

#[test]
fn cancelled_context_sends_nothing() {
    let (server, client) = start();
    let ctx = Context::background();
    ctx.cancel();
    let resp = client.form_request(&ctx, &RequestConfig::get("/ok"));
    assert!(matches!(resp.error, Some(ApiError::InvalidRequest(_))));

    // A live request afterwards proves the server was reachable all along.
    client.form_request(&Context::background(), &RequestConfig::get("/ok"));
    assert_eq!(server.request_count(), 1);
}

#[test]
fn invalid_method_sends_nothing() {
    let (server, client) = start();
    let resp = client.form_request(&Context::background(), &RequestConfig::new("**BAD METHOD**", "/ok"));
    assert!(matches!(resp.error, Some(ApiError::InvalidRequest(_))));

    client.form_request(&Context::background(), &RequestConfig::get("/ok"));
    assert_eq!(server.request_count(), 1);
}

#[test]
fn connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}"), API_KEY);
    let resp = client.send(&Context::background().with_timeout(Duration::from_secs(5)), &RequestConfig::get("/ok"));
    assert!(resp.body.is_empty());
    assert!(matches!(resp.error, Some(ApiError::Transport(_))));
}

#[test]
fn block_storage_lifecycle() {
    let (server, client) = start();
    let warren = Warren::new(client, "");
    let ctx = Context::background();

    assert!(warren.block_storage.list_disks(&ctx).unwrap().is_empty());

    let disk = warren
        .block_storage
        .create_disk(
            &ctx,
            &CreateDisk {
                size_gb: 20,
                billing_account_id: 5,
                source_image_type: SourceImageType::OsBase,
                source_image: "ubuntu_22.04".to_string(),
            },
        )
        .unwrap();
    assert_eq!(disk.size_gb, 20);
    assert_eq!(disk.source_image_type, Some(SourceImageType::OsBase));

    let vm = Uuid::new_v4();
    warren.block_storage.attach_disk(&ctx, disk.uuid, vm).unwrap();
    assert_eq!(warren.block_storage.get_disk(&ctx, disk.uuid).unwrap().status, "in-use");

    let err = warren.block_storage.detach_disk(&ctx, disk.uuid, Uuid::nil()).unwrap_err();
    assert_eq!(err.status(), Some(409));
    warren.block_storage.detach_disk(&ctx, disk.uuid, vm).unwrap();

    warren.block_storage.update_disk_billing_account(&ctx, disk.uuid, 9).unwrap();
    assert_eq!(warren.block_storage.get_disk(&ctx, disk.uuid).unwrap().billing_account_id, 9);

    warren.block_storage.delete_disk(&ctx, disk.uuid).unwrap();
    let err = warren.block_storage.get_disk(&ctx, disk.uuid).unwrap_err();
    assert!(err.is_not_found());

    assert!(server
        .requests()
        .iter()
        .all(|r| r.content_type.as_deref() == Some("application/x-www-form-urlencoded")));
}

#[test]
fn floating_ip_lifecycle() {
    let (server, client) = start();
    let warren = Warren::new(client, "tll");
    let ctx = Context::background();

    let ip = warren.floating_ips.create(&ctx, "web", 3).unwrap();
    assert_eq!(ip.name, "web");
    assert_eq!(ip.kind, "public");

    warren.floating_ips.update(&ctx, &ip.address, "api", 4).unwrap();
    let fetched = warren.floating_ips.get(&ctx, &ip.address).unwrap();
    assert_eq!(fetched.name, "api");
    assert_eq!(fetched.billing_account_id, 4);

    let vm = Uuid::new_v4();
    warren.floating_ips.assign(&ctx, &ip.address, vm).unwrap();
    assert_eq!(warren.floating_ips.get(&ctx, &ip.address).unwrap().assigned_to, Some(vm));
    warren.floating_ips.unassign(&ctx, &ip.address, vm).unwrap();

    assert_eq!(warren.floating_ips.list(&ctx).unwrap().len(), 1);
    warren.floating_ips.delete(&ctx, &ip.address).unwrap();
    assert!(warren.floating_ips.list(&ctx).unwrap().is_empty());

    assert!(server
        .requests()
        .iter()
        .all(|r| r.content_type.as_deref() == Some("application/json")));
}

#[test]
fn object_storage_lifecycle() {
    let (server, client) = start();
    let warren = Warren::new(client, "");
    let ctx = Context::background();
    let storage = warren.object_storage.for_billing_account(5);

    assert!(storage.s3_api_url(&ctx).unwrap().contains_key("s3_api_url"));

    let keys = storage.generate_user_key(&ctx).unwrap();
    assert_eq!(keys.len(), 1);
    let user = storage.user_info(&ctx).unwrap();
    assert_eq!(user.s3_credentials, keys);
    storage.delete_user_key(&ctx, &keys[0].access_key).unwrap();
    assert!(storage.user_keys(&ctx).unwrap().is_empty());

    let bucket = storage.create_bucket(&ctx, "logs").unwrap();
    assert_eq!(bucket.billing_account_id, 5);
    assert_eq!(storage.list_buckets(&ctx).unwrap().len(), 1);

    storage.update_bucket_billing_account(&ctx, "logs", 6).unwrap();
    assert_eq!(storage.get_bucket(&ctx, "logs").unwrap().billing_account_id, 6);
    assert!(storage.list_buckets(&ctx).unwrap().is_empty());

    storage.delete_bucket(&ctx, "logs").unwrap();
    assert!(storage.get_bucket(&ctx, "logs").unwrap_err().is_not_found());

    assert!(server
        .requests()
        .iter()
        .all(|r| r.content_type.as_deref() == Some("application/x-www-form-urlencoded")));
}

#[test]
fn vpc_lifecycle() {
    let (server, client) = start();
    let warren = Warren::new(client, "jkt01");
    let ctx = Context::background();

    let network = warren.vpc.get_or_create_default_network(&ctx, "Default").unwrap();
    assert!(network.is_default);
    assert_eq!(warren.vpc.get_or_create_default_network(&ctx, "Other").unwrap().uuid, network.uuid);
    assert_eq!(warren.vpc.list_networks(&ctx).unwrap().len(), 1);

    warren.vpc.rename_network(&ctx, network.uuid, "Renamed").unwrap();
    assert_eq!(warren.vpc.get_network(&ctx, network.uuid).unwrap().name, "Renamed");
    warren.vpc.set_default_network(&ctx, network.uuid).unwrap();

    warren.vpc.delete_network(&ctx, network.uuid).unwrap();
    assert!(warren.vpc.get_network(&ctx, network.uuid).unwrap_err().is_not_found());

    let requests = server.requests();
    assert_eq!(requests[0].uri, "/v1/jkt01/network/network?name=Default");
    assert!(requests
        .iter()
        .all(|r| r.content_type.as_deref() == Some("application/json")));
}

#[test]
fn locations_are_listed() {
    let (_server, client) = start();
    let locations = Warren::new(client, "").locations.list_locations(&Context::background()).unwrap();
    assert!(locations.iter().any(|l| l.slug == "tll" && l.is_default));
}

#[test]
fn unknown_location_propagates_not_found() {
    let (_server, client) = start();
    let err = Warren::new(client, "mars")
        .floating_ips
        .list(&Context::background())
        .unwrap_err();
    assert!(err.is_not_found());
}
