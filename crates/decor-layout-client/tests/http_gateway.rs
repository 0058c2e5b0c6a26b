// crates/decor-layout-client/tests/http_gateway.rs
// ============================================================================
// Module: HTTP Gateway Unit Tests
// Description: Protocol envelope parsing and error classification.
// Purpose: Validate gateway behavior against a scripted local HTTP stub.
// ============================================================================

//! ## Overview
//! Unit tests for the blocking HTTP gateway against a scripted `tiny_http`
//! stub:
//! - Envelope decoding for loads and saves
//! - Status classification (validation, storage-unavailable, transport)
//! - Hard load timeout against a stalled service
//! - Request shape observed by the service

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use decor_layout_client::HttpLayoutGateway;
use decor_layout_client::HttpLayoutGatewayConfig;
use decor_layout_core::GatewayError;
use decor_layout_core::LayoutGateway;
use decor_layout_core::MIGRATION_REQUIRED_MESSAGE;
use decor_layout_core::WarehouseId;
use serde_json::Value;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Service
// ============================================================================

/// One request as observed by the stub service.
struct ReceivedRequest {
    method: String,
    url: String,
    body: String,
}

/// Serves the scripted responses in order, then shuts down.
fn spawn_stub(
    responses: Vec<(u16, String)>,
) -> (String, mpsc::Receiver<ReceivedRequest>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("bind stub server");
    let port = server.server_addr().to_ip().expect("ip listener").port();
    let base_url = format!("http://127.0.0.1:{port}");
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || {
        for (status, body) in responses {
            let mut request = server.recv().expect("receive request");
            let mut request_body = String::new();
            let _ = request.as_reader().read_to_string(&mut request_body);
            let _ = sender.send(ReceivedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: request_body,
            });
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });
    (base_url, receiver, handle)
}

fn gateway_for(base_url: &str) -> HttpLayoutGateway {
    HttpLayoutGateway::new(&HttpLayoutGatewayConfig::for_base_url(base_url))
        .expect("build gateway")
}

fn layout_body(version: i64) -> String {
    json!({
        "data": {
            "warehouseId": "warehouse-main",
            "version": version,
            "updatedAt": 1_700_000_000_000_i64,
            "items": [{
                "id": "item-0",
                "kind": "box",
                "x": 3,
                "z": 4,
                "width": 2,
                "depth": 2,
                "height": 2,
                "rotationY": 0.0,
            }],
        }
    })
    .to_string()
}

// ============================================================================
// SECTION: Load
// ============================================================================

#[test]
fn load_decodes_enveloped_layout() {
    let (base_url, requests, handle) = spawn_stub(vec![(200, layout_body(4))]);
    let gateway = gateway_for(&base_url);
    let layout = gateway.load(&WarehouseId::new("warehouse-main")).expect("load");
    assert_eq!(layout.version, 4);
    assert_eq!(layout.items.len(), 1);

    let request = requests.recv().expect("request observed");
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "/layout?warehouse=warehouse-main");
    handle.join().expect("stub thread");
}

#[test]
fn load_rejection_maps_to_validation() {
    let (base_url, _requests, handle) =
        spawn_stub(vec![(400, json!({"error": "bad batch"}).to_string())]);
    let gateway = gateway_for(&base_url);
    let error = gateway.load(&WarehouseId::new("warehouse-main")).expect_err("must fail");
    assert_eq!(error, GatewayError::Validation("bad batch".to_string()));
    handle.join().expect("stub thread");
}

#[test]
fn migration_message_maps_to_storage_unavailable() {
    let (base_url, _requests, handle) = spawn_stub(vec![(
        500,
        json!({"error": MIGRATION_REQUIRED_MESSAGE}).to_string(),
    )]);
    let gateway = gateway_for(&base_url);
    let error = gateway.load(&WarehouseId::new("warehouse-main")).expect_err("must fail");
    assert_eq!(
        error,
        GatewayError::StorageUnavailable(MIGRATION_REQUIRED_MESSAGE.to_string())
    );
    handle.join().expect("stub thread");
}

#[test]
fn generic_server_failure_maps_to_transport() {
    let (base_url, _requests, handle) =
        spawn_stub(vec![(500, json!({"error": "disk on fire"}).to_string())]);
    let gateway = gateway_for(&base_url);
    let error = gateway.load(&WarehouseId::new("warehouse-main")).expect_err("must fail");
    assert!(matches!(error, GatewayError::Transport(message) if message.contains("disk on fire")));
    handle.join().expect("stub thread");
}

#[test]
fn missing_data_in_success_body_fails_closed() {
    let (base_url, _requests, handle) = spawn_stub(vec![(200, "{}".to_string())]);
    let gateway = gateway_for(&base_url);
    let error = gateway.load(&WarehouseId::new("warehouse-main")).expect_err("must fail");
    assert!(matches!(error, GatewayError::Transport(_)));
    handle.join().expect("stub thread");
}

#[test]
fn unreachable_service_maps_to_transport() {
    let gateway = gateway_for("http://127.0.0.1:1");
    let error = gateway.load(&WarehouseId::new("warehouse-main")).expect_err("must fail");
    assert!(matches!(error, GatewayError::Transport(_)));
}

#[test]
fn stalled_load_times_out() {
    let server = Server::http("127.0.0.1:0").expect("bind stub server");
    let port = server.server_addr().to_ip().expect("ip listener").port();
    let base_url = format!("http://127.0.0.1:{port}");
    let handle = thread::spawn(move || {
        let request = server.recv().expect("receive request");
        thread::sleep(Duration::from_secs(3));
        let _ = request.respond(Response::from_string(layout_body(1)));
    });

    let gateway = HttpLayoutGateway::new(&HttpLayoutGatewayConfig {
        base_url,
        load_timeout_secs: 1,
    })
    .expect("build gateway");
    let error = gateway.load(&WarehouseId::new("warehouse-main")).expect_err("must time out");
    assert_eq!(error, GatewayError::Timeout(1));
    handle.join().expect("stub thread");
}

// ============================================================================
// SECTION: Save
// ============================================================================

#[test]
fn save_posts_full_replacement_list() {
    let (base_url, requests, handle) = spawn_stub(vec![(200, layout_body(2))]);
    let gateway = gateway_for(&base_url);
    let items = vec![decor_layout_core::DecorItem {
        id: decor_layout_core::ItemId::new("item-0"),
        kind: decor_layout_core::DecorKind::Shelf,
        x: 1,
        z: 2,
        width: 3,
        depth: 4,
        height: 5,
        rotation_y: 0.5,
    }];
    let layout = gateway.save(&WarehouseId::new("warehouse-main"), &items).expect("save");
    assert_eq!(layout.version, 2);

    let request = requests.recv().expect("request observed");
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/layout");
    let body: Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(body["warehouseId"], "warehouse-main");
    assert_eq!(body["items"][0]["id"], "item-0");
    assert_eq!(body["items"][0]["rotationY"], 0.5);
    handle.join().expect("stub thread");
}

#[test]
fn save_rejection_maps_to_validation() {
    let (base_url, _requests, handle) =
        spawn_stub(vec![(413, json!({"error": "too large"}).to_string())]);
    let gateway = gateway_for(&base_url);
    let error = gateway
        .save(&WarehouseId::new("warehouse-main"), &[])
        .expect_err("must fail");
    assert_eq!(error, GatewayError::Validation("too large".to_string()));
    handle.join().expect("stub thread");
}
