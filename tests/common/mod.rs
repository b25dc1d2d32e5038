//! Shared test helpers: a builder for a [`GameClient`] wired to a
//! [`MockTransport`], plus small JSON-frame constructors so tests read as
//! "given this frame arrives" rather than hand-assembled `json!` blocks.

use std::sync::Arc;
use std::time::Duration;

use interactive_client::{GameClient, GameClientBuilder, MockTransport};
use serde_json::{json, Value};

/// Builds a client already past the `hello` handshake, backed by a
/// [`MockTransport`] the test can push frames into and inspect sends from.
///
/// Spawns `connect()` as its own task and waits for the `hello` frame to
/// actually land in `sent` before answering it, rather than pre-seeding
/// the reply: the latter races the handshake's pending-request
/// registration against the reader task picking up an already-queued
/// frame.
pub async fn connected_client() -> (GameClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let transport_for_connect = transport.clone();

    let connect_task = tokio::spawn(async move {
        GameClientBuilder::new("project-1", "client-1")
            .transport(transport_for_connect as Arc<dyn interactive_client::Transport>)
            .request_timeout(Duration::from_millis(500))
            .connect()
            .await
    });

    while transport.sent.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }
    transport.push_text(reply_json(1, json!({"ok": true})));

    let client = connect_task
        .await
        .expect("connect task panicked")
        .expect("connect against a mock transport should succeed");

    (client, transport)
}

pub fn reply_json(id: u32, result: Value) -> String {
    serde_json::to_string(&json!({
        "type": "reply",
        "id": id,
        "result": result,
        "seq": id,
    }))
    .expect("reply frame serializes")
}

pub fn error_reply_json(id: u32, code: i32, message: &str) -> String {
    serde_json::to_string(&json!({
        "type": "reply",
        "id": id,
        "error": {"code": code, "message": message},
        "seq": id,
    }))
    .expect("error reply frame serializes")
}

pub fn method_json(method: &str, params: Value) -> String {
    serde_json::to_string(&json!({
        "type": "method",
        "method": method,
        "params": params,
    }))
    .expect("method frame serializes")
}
