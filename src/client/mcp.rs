//! MCP JSON-RPC client with optional DID request signing.
//!
//! # Responsibilities
//! - Verify signer and server reachability once, at `initialize`
//! - Sign each request over its canonical payload
//! - Classify non-2xx responses into typed errors

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};

use crate::client::error::{McpError, McpResult};
use crate::config::schema::RelayConfig;
use crate::config::validation::validate_config;
use crate::protocol::{unix_timestamp, AuthToken, Params, RpcRequest, SigningPayload};
use crate::signer::SignerClient;

pub const RPC_PATH: &str = "/mcp/rpc";
pub const CAPABILITIES_PATH: &str = "/mcp/capabilities";

/// Input signed once during `initialize` to prove the signing path works.
const TRIAL_PAYLOAD: &str = "test_payload";

/// Client for a single MCP server.
///
/// Created uninitialized; every [`call`](McpClient::call) fails with
/// [`McpError::NotInitialized`] until [`initialize`](McpClient::initialize)
/// succeeds. With signing disabled the signer is never contacted and no
/// `Authorization` header is sent.
#[derive(Debug)]
pub struct McpClient {
    http: Client,
    server_url: String,
    /// Present iff requests are signed.
    signer: Option<SignerClient>,
    timeout: Duration,
    identity: Option<String>,
    initialized: bool,
}

impl McpClient {
    /// Build a client from configuration. No network traffic happens here.
    pub fn new(config: &RelayConfig) -> McpResult<Self> {
        validate_config(config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            McpError::InvalidConfig(messages.join(", "))
        })?;

        let timeout = Duration::from_millis(config.timeouts.request_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(McpError::Transport)?;

        let signer = config
            .auth
            .requires_signing
            .then(|| SignerClient::new(http.clone(), &config.signer.url));

        Ok(Self {
            http,
            server_url: config.server.url.trim_end_matches('/').to_string(),
            signer,
            timeout,
            identity: None,
            initialized: false,
        })
    }

    pub fn requires_signing(&self) -> bool {
        self.signer.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// DID used for signing; `None` until initialized or when unsigned.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check reachability and fetch the signing identity.
    ///
    /// Signed mode runs, in order: signer health, DID fetch, server
    /// liveness, and one trial signature. Unsigned mode only checks server
    /// liveness. On failure the client stays uninitialized. Calling this
    /// again after success is a no-op.
    pub async fn initialize(&mut self) -> McpResult<()> {
        if self.initialized {
            tracing::debug!("MCP client already initialized");
            return Ok(());
        }

        let identity = match &self.signer {
            Some(signer) => {
                signer.health().await?;
                let did = signer.did().await?;
                tracing::debug!(did = %did, "Fetched identity from signer");

                self.check_server().await?;

                signer.sign(TRIAL_PAYLOAD).await?;
                Some(did)
            }
            None => {
                self.check_server().await?;
                None
            }
        };

        self.identity = identity;
        self.initialized = true;

        tracing::info!(
            server_url = %self.server_url,
            requires_signing = self.requires_signing(),
            did = self.identity.as_deref().unwrap_or("-"),
            "MCP client initialized"
        );
        Ok(())
    }

    async fn check_server(&self) -> McpResult<()> {
        let resp = self
            .http
            .get(format!("{}{}", self.server_url, CAPABILITIES_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| McpError::ServerUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(McpError::ServerUnavailable(format!(
                "capabilities returned status {}",
                status
            )));
        }
        Ok(())
    }

    /// Issue one JSON-RPC call and return the response body verbatim.
    pub async fn call(&self, method: &str, params: Params) -> McpResult<Value> {
        if !self.initialized {
            return Err(McpError::NotInitialized);
        }

        let timestamp = unix_timestamp()?;
        let request = RpcRequest::new(method, params, timestamp);

        let mut builder = self
            .http
            .post(format!("{}{}", self.server_url, RPC_PATH))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(signer) = &self.signer {
            let did = self.identity.as_deref().ok_or(McpError::NotInitialized)?;
            let payload = SigningPayload::from_request(&request).to_canonical();
            tracing::debug!(payload = %payload, "Signing request payload");

            let signature = signer.sign(&payload).await?;
            let token = AuthToken::new(did, signature);
            let header = HeaderValue::from_str(&token.to_bearer()).map_err(|e| {
                McpError::InvalidRequest(format!("bearer credential is not a valid header: {}", e))
            })?;
            builder = builder.header(AUTHORIZATION, header);
        }

        tracing::debug!(method = %method, id = %request.id, "Sending RPC request");

        let resp = builder
            .json(&request)
            .send()
            .await
            .map_err(McpError::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(McpError::Transport)?;

        if !status.is_success() {
            tracing::warn!(method = %method, status = %status, "RPC call rejected");
            return Err(McpError::from_rpc_status(status, text));
        }

        serde_json::from_str(&text).map_err(|e| McpError::MalformedResponse(e.to_string()))
    }

    /// `tools/list` with empty params.
    pub async fn list_tools(&self) -> McpResult<Value> {
        self.call("tools/list", Params::new()).await
    }

    /// `tools/call` with `{name, arguments}`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Value> {
        let mut params = Params::new();
        params.insert("name".to_string(), json!(name));
        params.insert("arguments".to_string(), arguments);
        self.call("tools/call", params).await
    }

    /// Fetch the server's capability descriptor. Never signed.
    pub async fn get_capabilities(&self) -> McpResult<Value> {
        let resp = self
            .http
            .get(format!("{}{}", self.server_url, CAPABILITIES_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(McpError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(McpError::CapabilitiesUnavailable {
                status: status.as_u16(),
            });
        }

        let text = resp.text().await.map_err(McpError::Transport)?;
        serde_json::from_str(&text).map_err(|e| McpError::MalformedResponse(e.to_string()))
    }

    /// True if the capabilities endpoint answers with valid JSON.
    pub async fn check_connection(&self) -> bool {
        match self.get_capabilities().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Connection check failed");
                false
            }
        }
    }
}
