//! Shared mock services for integration tests.
//!
//! The mock signer and mock MCP server bind to an ephemeral port and record
//! every request they receive.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use mcp_did_relay::RelayConfig;

pub const TEST_DID: &str = "did:wba:localhost%3A9511:wba:user:27c0b1d11180f973";

/// Deterministic signature the mock signer returns for `payload`.
pub fn jws_for(payload: &str) -> String {
    format!("eyJhbGciOiJFUzI1NksifQ.{}.sig", payload.len())
}

/// Configuration pointing at the given mocks.
pub fn config(server_url: &str, signer_url: &str, requires_signing: bool) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.server.url = server_url.to_string();
    config.signer.url = signer_url.to_string();
    config.auth.requires_signing = requires_signing;
    config.timeouts.request_ms = 2_000;
    config
}

/// URL on which nothing is listening.
pub fn closed_url() -> String {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{}", port)
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

/// Raw HTTP backend that answers every request with `response` verbatim
/// (`Connection: close`). With `max_requests` set, the listener is dropped
/// after that many requests, so later connections are refused.
pub async fn start_raw_backend(response: &'static str, max_requests: Option<usize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut served = 0;
        while max_requests.map_or(true, |max| served < max) {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            served += 1;
        }
    });

    format!("http://{}", addr)
}

// ── Mock signer ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SignerBehavior {
    pub health_status: u16,
    pub did: Option<String>,
    pub sign_status: u16,
    pub omit_jws: bool,
}

impl Default for SignerBehavior {
    fn default() -> Self {
        Self {
            health_status: 200,
            did: Some(TEST_DID.to_string()),
            sign_status: 200,
            omit_jws: false,
        }
    }
}

#[derive(Default)]
pub struct SignerState {
    pub behavior: Mutex<SignerBehavior>,
    pub requests: AtomicUsize,
    pub signed: Mutex<Vec<String>>,
}

pub struct MockSigner {
    pub url: String,
    pub state: Arc<SignerState>,
}

impl MockSigner {
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn signed(&self) -> Vec<String> {
        self.state.signed.lock().unwrap().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut SignerBehavior)) {
        f(&mut self.state.behavior.lock().unwrap());
    }
}

pub async fn start_mock_signer(behavior: SignerBehavior) -> MockSigner {
    let state = Arc::new(SignerState {
        behavior: Mutex::new(behavior),
        ..Default::default()
    });

    let app = Router::new()
        .route("/health", get(signer_health))
        .route("/did", get(signer_did))
        .route("/sign", post(signer_sign))
        .route("/verify", post(signer_verify))
        .with_state(state.clone());

    MockSigner {
        url: serve(app).await,
        state,
    }
}

async fn signer_health(State(state): State<Arc<SignerState>>) -> (StatusCode, String) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let code = state.behavior.lock().unwrap().health_status;
    (status(code), json!({"status": "healthy", "service": "DID-Agent"}).to_string())
}

async fn signer_did(State(state): State<Arc<SignerState>>) -> (StatusCode, String) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let did = state.behavior.lock().unwrap().did.clone();
    match did {
        Some(did) => (StatusCode::OK, json!({ "did": did }).to_string()),
        None => (StatusCode::OK, json!({ "status": "no identity" }).to_string()),
    }
}

async fn signer_sign(State(state): State<Arc<SignerState>>, body: String) -> (StatusCode, String) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let behavior = state.behavior.lock().unwrap().clone();

    let payload = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("payload").and_then(Value::as_str).map(String::from));
    let Some(payload) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string());
    };
    state.signed.lock().unwrap().push(payload.clone());

    if behavior.sign_status != 200 {
        return (status(behavior.sign_status), "signer failure".to_string());
    }
    if behavior.omit_jws {
        return (StatusCode::OK, json!({ "detail": "no key" }).to_string());
    }
    (StatusCode::OK, json!({ "jws": jws_for(&payload) }).to_string())
}

async fn signer_verify(State(state): State<Arc<SignerState>>, body: String) -> (StatusCode, String) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Ok(req) = serde_json::from_str::<Value>(&body) else {
        return (StatusCode::BAD_REQUEST, "bad body".to_string());
    };
    let payload = req.get("payload").and_then(Value::as_str).unwrap_or_default();
    let signature = req.get("signature").and_then(Value::as_str).unwrap_or_default();
    let did = req.get("did").and_then(Value::as_str).unwrap_or_default();

    let valid = did == TEST_DID && signature == jws_for(payload);
    (StatusCode::OK, json!({ "valid": valid }).to_string())
}

// ── Mock MCP server ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerBehavior {
    pub capabilities_status: u16,
    pub rpc_status: u16,
    /// Fixed RPC response body; `None` echoes a JSON-RPC result.
    pub rpc_body: Option<String>,
    /// Delay before answering `/mcp/rpc`.
    pub rpc_delay_ms: u64,
}

impl Default for ServerBehavior {
    fn default() -> Self {
        Self {
            capabilities_status: 200,
            rpc_status: 200,
            rpc_body: None,
            rpc_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRpc {
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRpc {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Default)]
pub struct ServerState {
    pub behavior: Mutex<ServerBehavior>,
    pub capabilities_hits: AtomicUsize,
    pub rpc_calls: Mutex<Vec<RecordedRpc>>,
}

pub struct MockServer {
    pub url: String,
    pub state: Arc<ServerState>,
}

impl MockServer {
    pub fn rpc_calls(&self) -> Vec<RecordedRpc> {
        self.state.rpc_calls.lock().unwrap().clone()
    }

    pub fn capabilities_hits(&self) -> usize {
        self.state.capabilities_hits.load(Ordering::SeqCst)
    }

    pub fn update(&self, f: impl FnOnce(&mut ServerBehavior)) {
        f(&mut self.state.behavior.lock().unwrap());
    }
}

pub async fn start_mock_server(behavior: ServerBehavior) -> MockServer {
    let state = Arc::new(ServerState {
        behavior: Mutex::new(behavior),
        ..Default::default()
    });

    let app = Router::new()
        .route("/mcp/capabilities", get(server_capabilities))
        .route("/mcp/rpc", post(server_rpc))
        .with_state(state.clone());

    MockServer {
        url: serve(app).await,
        state,
    }
}

pub fn capabilities_body() -> Value {
    json!({
        "capabilities": {
            "tools": [
                { "name": "echo", "description": "Echo the input" },
                { "name": "time", "description": "Current time" }
            ]
        },
        "auth": { "type": "did" }
    })
}

async fn server_capabilities(State(state): State<Arc<ServerState>>) -> (StatusCode, String) {
    state.capabilities_hits.fetch_add(1, Ordering::SeqCst);
    let code = state.behavior.lock().unwrap().capabilities_status;
    (status(code), capabilities_body().to_string())
}

async fn server_rpc(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.rpc_calls.lock().unwrap().push(RecordedRpc {
        authorization,
        body: body.clone(),
    });

    let behavior = state.behavior.lock().unwrap().clone();
    if behavior.rpc_delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(behavior.rpc_delay_ms)).await;
    }
    if let Some(fixed) = behavior.rpc_body {
        return (status(behavior.rpc_status), fixed);
    }

    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let response = json!({
        "jsonrpc": "2.0",
        "id": request.get("id").cloned().unwrap_or(Value::Null),
        "result": { "method": request.get("method").cloned().unwrap_or(Value::Null) },
    });
    (status(behavior.rpc_status), response.to_string())
}
