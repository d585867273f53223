//! Live-listener tests
//!
//! Boots the full server on an ephemeral port and talks to it over real
//! HTTP, covering the lifecycle controller and the wire formats together.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};

use a2a_dispatch::config::ServerConfig;
use a2a_dispatch::engine::EchoEngine;
use a2a_dispatch::server::lifecycle;

async fn spawn_server() -> SocketAddr {
    let config = ServerConfig {
        name: "e2e-agent".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    };

    let listener = lifecycle::bind(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(lifecycle::serve_on(listener, config, Arc::new(EchoEngine)));

    addr
}

#[tokio::test]
async fn health_reports_running() {
    let addr = spawn_server().await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "e2e-agent");
    assert_eq!(body["status"], "running");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn agent_card_served_over_the_wire() {
    let addr = spawn_server().await;

    let response = reqwest::get(format!("http://{addr}/.well-known/agent.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let card: Value = response.json().await.unwrap();
    assert_eq!(card["name"], "e2e-agent");
    assert_eq!(card["capabilities"]["pushNotifications"], false);
}

#[tokio::test]
async fn jsonrpc_echo_round_trip() {
    let addr = spawn_server().await;

    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "message/send",
        "params": {
            "message": {"messageId": "m1", "parts": [{"kind": "text", "text": "hello"}]},
            "contextId": "ctx-1"
        }
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["result"], "hello");
    assert_eq!(body["result"]["thread_id"], "ctx-1");
}

#[tokio::test]
async fn occupied_port_fails_bind() {
    let holder = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = holder.local_addr().unwrap().port();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ServerConfig::default()
    };

    let err = lifecycle::bind(&config).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("already in use"));
}
