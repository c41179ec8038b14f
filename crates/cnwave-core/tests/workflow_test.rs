#![allow(clippy::unwrap_used)]
// End-to-end tests for `OneTouchWorkflow` against a wiremock controller.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

use cnwave_api::{ControllerClient, Credentials, RetryPolicy, TransportConfig};
use cnwave_core::{
    CoreError, NodeSpec, OneTouchWorkflow, WorkflowStatus, WorkflowTimings, wait_for_link_active,
};

// ── Helpers ─────────────────────────────────────────────────────────

const NODE_A: &str = "node-V5000-ddee01";
const NODE_B: &str = "node-V3000-ddee02";

fn timings() -> WorkflowTimings {
    WorkflowTimings {
        online_timeout: Duration::from_millis(150),
        online_interval: Duration::from_millis(10),
        validate_timeout: Duration::from_millis(150),
        validate_interval: Duration::from_millis(10),
    }
}

fn node_a() -> NodeSpec {
    serde_json::from_value(json!({
        "mac": "AA:BB:CC:DD:EE:01",
        "model": "V5000",
        "wlan_mac": "AA:BB:CC:DD:EF:01",
        "latitude": 12.9716,
        "longitude": 77.5946,
        "node_type": 2,
        "is_pop": true
    }))
    .unwrap()
}

fn node_b() -> NodeSpec {
    serde_json::from_value(json!({
        "mac": "AA:BB:CC:DD:EE:02",
        "model": "V3000",
        "wlan_mac": "AA:BB:CC:DD:EF:02",
        "latitude": 12.9720,
        "longitude": 77.5950,
        "node_type": "CN",
        "is_pop": false
    }))
    .unwrap()
}

async fn setup() -> (MockServer, ControllerClient) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/local/userLogin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "tok" })),
        )
        .mount(&server)
        .await;

    let client = ControllerClient::connect(
        Url::parse(&server.uri()).unwrap(),
        Credentials::new("admin", SecretString::from("pw".to_owned())),
        &TransportConfig::default(),
        RetryPolicy::no_retry(),
    )
    .await
    .unwrap();
    (server, client)
}

async fn mount_ok(server: &MockServer, endpoint: &str, times: impl Into<Times>) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(times)
        .mount(server)
        .await;
}

/// First topology read sees a stale link, later reads see `link_alive`.
async fn mount_topology(server: &MockServer, link_alive: bool) {
    Mock::given(method("POST"))
        .and(path("/api/getTopology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sites": [{ "name": "old-site", "location": { "latitude": 0.0, "longitude": 0.0 } }],
            "nodes": [{ "name": "old-node", "node_type": 2, "mac_addr": "00:00:00:00:00:01" }],
            "links": [{ "name": "old-link", "a_node_name": "old-node", "z_node_name": "gone", "is_alive": true }]
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/getTopology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [],
            "links": [{
                "name": format!("link-{NODE_A}-{NODE_B}"),
                "a_node_name": NODE_A,
                "z_node_name": NODE_B,
                "is_alive": link_alive
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_nodes(server: &MockServer, node_b_status: i64) {
    Mock::given(method("GET"))
        .and(path("/api/getNodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [
                { "name": NODE_A, "nodeType": "DN", "macAddr": "aa:bb:cc:dd:ee:01", "status": 3 },
                { "name": NODE_B, "nodeType": "CN", "macAddr": "aa:bb:cc:dd:ee:02", "status": node_b_status }
            ]
        })))
        .mount(server)
        .await;
}

async fn request_bodies(server: &MockServer, endpoint: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_workflow_success() {
    let (server, client) = setup().await;
    mount_topology(&server, true).await;
    mount_nodes(&server, 3).await;
    mount_ok(&server, "/internal/api/delLink", 1).await;
    mount_ok(&server, "/internal/api/delNode", 1).await;
    mount_ok(&server, "/internal/api/delSite", 1).await;
    mount_ok(&server, "/internal/api/addSite", 2).await;
    mount_ok(&server, "/internal/api/addNode", 2).await;
    mount_ok(&server, "/internal/api/addLink", 1).await;

    let result = OneTouchWorkflow::new(&client, timings())
        .run(&node_a(), &node_b())
        .await
        .unwrap();

    assert_eq!(result.status, WorkflowStatus::Success);
    assert_eq!(result.node_a, NODE_A);
    assert_eq!(result.node_b, NODE_B);
    assert_eq!(result.link_name, Some(format!("link-{NODE_A}-{NODE_B}")));
    assert_eq!(result.reason, None);

    // Teardown addressed the stale topology.
    assert_eq!(
        request_bodies(&server, "/internal/api/delLink").await,
        vec![json!({ "aNodeName": "old-node", "zNodeName": "gone", "force": true })]
    );

    let sites = request_bodies(&server, "/internal/api/addSite").await;
    assert_eq!(
        sites[0],
        json!({ "site": {
            "name": "site-V5000-ddee01",
            "location": { "latitude": 12.9716, "longitude": 77.5946, "altitude": 0.0, "accuracy": 10000.0 }
        }})
    );

    let nodes = request_bodies(&server, "/internal/api/addNode").await;
    assert_eq!(
        nodes[1],
        json!({ "node": {
            "name": NODE_B,
            "node_type": 1,
            "mac_addr": "AA:BB:CC:DD:EE:02",
            "wlan_mac_addrs": ["AA:BB:CC:DD:EF:02"],
            "pop_node": false,
            "site_name": "site-V3000-ddee02",
            "hw_model": "V3000"
        }})
    );

    assert_eq!(
        request_bodies(&server, "/internal/api/addLink").await,
        vec![json!({ "link": {
            "name": format!("link-{NODE_A}-{NODE_B}"),
            "a_node_name": NODE_A,
            "z_node_name": NODE_B,
            "a_node_mac": "AA:BB:CC:DD:EF:01",
            "z_node_mac": "AA:BB:CC:DD:EF:02",
            "link_type": 1
        }})]
    );
}

#[tokio::test]
async fn test_node_never_online_is_an_error() {
    let (server, client) = setup().await;
    mount_topology(&server, true).await;
    mount_nodes(&server, 1).await;
    for endpoint in [
        "/internal/api/delLink",
        "/internal/api/delNode",
        "/internal/api/delSite",
        "/internal/api/addSite",
        "/internal/api/addNode",
        "/internal/api/addLink",
    ] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;
    }

    let err = OneTouchWorkflow::new(&client, timings())
        .run(&node_a(), &node_b())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::NodeOfflineTimeout { ref node, .. } if node == NODE_B),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_link_never_alive_is_a_failed_result() {
    let (server, client) = setup().await;
    mount_topology(&server, false).await;
    mount_nodes(&server, 3).await;
    for endpoint in [
        "/internal/api/delLink",
        "/internal/api/delNode",
        "/internal/api/delSite",
        "/internal/api/addSite",
        "/internal/api/addNode",
        "/internal/api/addLink",
    ] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;
    }

    let result = OneTouchWorkflow::new(&client, timings())
        .run(&node_a(), &node_b())
        .await
        .unwrap();

    assert_eq!(result.status, WorkflowStatus::Failed);
    assert_eq!(result.reason.as_deref(), Some("Link did not come alive"));
    assert_eq!(result.link_name, None);
}

#[tokio::test]
async fn test_invalid_record_touches_nothing() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/getTopology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut bad = node_b();
    bad.wlan_mac = "not-a-mac".into();

    let err = OneTouchWorkflow::new(&client, timings())
        .run(&node_a(), &bad)
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::InvalidNodeSpec { ref role, .. } if role == "node_b"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_controller_rejection_aborts_provisioning() {
    let (server, client) = setup().await;
    mount_topology(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/internal/api/addSite"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "invalid location" })),
        )
        .mount(&server)
        .await;
    for endpoint in ["/internal/api/delLink", "/internal/api/delNode", "/internal/api/delSite"] {
        mount_ok(&server, endpoint, 1).await;
    }
    mount_ok(&server, "/internal/api/addNode", 0).await;

    let err = OneTouchWorkflow::new(&client, timings())
        .run(&node_a(), &node_b())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Api { .. }), "got {err:?}");
    assert_eq!(
        err.details(),
        Some(&json!({ "success": false, "message": "invalid location" }))
    );
}

#[tokio::test]
async fn test_teardown_and_provision_run_in_order() {
    let (server, client) = setup().await;
    mount_topology(&server, true).await;
    mount_nodes(&server, 3).await;
    for endpoint in [
        "/internal/api/delLink",
        "/internal/api/delNode",
        "/internal/api/delSite",
        "/internal/api/addSite",
        "/internal/api/addNode",
        "/internal/api/addLink",
    ] {
        mount_ok(&server, endpoint, 0..).await;
    }

    let result = OneTouchWorkflow::new(&client, timings())
        .run(&node_a(), &node_b())
        .await
        .unwrap();
    assert!(result.is_success());

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_owned())
        .collect();

    let writes: Vec<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|p| p.starts_with("/internal/api/"))
        .collect();
    assert_eq!(
        writes,
        vec![
            "/internal/api/delLink",
            "/internal/api/delNode",
            "/internal/api/delSite",
            "/internal/api/addSite",
            "/internal/api/addSite",
            "/internal/api/addNode",
            "/internal/api/addNode",
            "/internal/api/addLink",
        ]
    );

    // Online wait and link validation only start after every create.
    let last_create = paths.iter().rposition(|p| p == "/internal/api/addLink").unwrap();
    let first_online_poll = paths.iter().position(|p| p == "/api/getNodes").unwrap();
    let last_topology_read = paths.iter().rposition(|p| p == "/api/getTopology").unwrap();
    assert!(last_create < first_online_poll);
    assert!(first_online_poll < last_topology_read);
}

#[tokio::test]
async fn test_client_reports_any_live_link_in_topology() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/getTopology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [
                { "name": "link-x-y", "a_node_name": "x", "z_node_name": "y", "is_alive": false },
                { "name": "link-y-z", "a_node_name": "y", "z_node_name": "z", "is_alive": true }
            ]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/getTopology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [{ "name": "link-x-y", "a_node_name": "x", "z_node_name": "y", "is_alive": false }]
        })))
        .mount(&server)
        .await;

    let interval = Duration::from_millis(10);
    assert!(wait_for_link_active(&client, Duration::from_millis(200), interval).await.unwrap());
    assert!(!wait_for_link_active(&client, Duration::from_millis(50), interval).await.unwrap());
}
