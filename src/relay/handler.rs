//! Relay state and request dispatch.

use std::time::Instant;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::client::{McpClient, McpError, McpResult};
use crate::config::schema::RelayConfig;
use crate::protocol::Params;
use crate::relay::message::{ConnectionStatus, RelayEvent, RelayRequest, RelayResponse, RelayStatus};

const REQUEST_QUEUE: usize = 32;
const EVENT_CAPACITY: usize = 16;

type Envelope = (RelayRequest, oneshot::Sender<McpResult<RelayResponse>>);

/// Owns the current client and answers relay requests one at a time.
pub struct Relay {
    client: Option<McpClient>,
    status: ConnectionStatus,
    events: broadcast::Sender<RelayEvent>,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client: None,
            status: ConnectionStatus::Disconnected,
            events,
        }
    }

    /// Subscribe to connection events.
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> RelayStatus {
        RelayStatus {
            connection: self.status,
            has_client: self.client.is_some(),
            initialized: self.client.as_ref().is_some_and(McpClient::is_initialized),
            requires_signing: self.client.as_ref().is_some_and(McpClient::requires_signing),
        }
    }

    /// Handle one request.
    pub async fn handle(&mut self, request: RelayRequest) -> McpResult<RelayResponse> {
        match request {
            RelayRequest::Init(config) => self.init(&config).await,
            RelayRequest::Rpc { method, params } => self.rpc(&method, params).await,
            RelayRequest::Status => Ok(RelayResponse::Status(self.status())),
            RelayRequest::Ping => Ok(RelayResponse::Pong),
        }
    }

    async fn init(&mut self, config: &RelayConfig) -> McpResult<RelayResponse> {
        tracing::info!(
            server_url = %config.server.url,
            signer_url = %config.signer.url,
            requires_signing = config.auth.requires_signing,
            "Initializing MCP client"
        );

        let mut client = match McpClient::new(config) {
            Ok(client) => client,
            Err(e) => {
                self.client = None;
                return Err(self.fail(e));
            }
        };
        let result = client.initialize().await;
        // replaced even on failure, so status reports an uninitialized client
        self.client = Some(client);

        match result {
            Ok(()) => {
                self.status = ConnectionStatus::Connected;
                let requires_signing = config.auth.requires_signing;
                // no subscribers is fine
                let _ = self.events.send(RelayEvent::Connected {
                    server_url: config.server.url.clone(),
                    requires_signing,
                });
                Ok(RelayResponse::Connected { requires_signing })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: McpError) -> McpError {
        tracing::error!(error = %error, "MCP initialization failed");
        self.status = ConnectionStatus::Error;
        let _ = self.events.send(RelayEvent::Failed {
            error: error.to_string(),
        });
        error
    }

    /// Forward an RPC with the caller's params as given.
    ///
    /// `tools/call` must carry a string `name` and gets `arguments: {}` when absent.
    async fn rpc(&self, method: &str, mut params: Params) -> McpResult<RelayResponse> {
        let client = self.client.as_ref().ok_or(McpError::NotInitialized)?;
        let started = Instant::now();

        if method == "tools/call" {
            if !params.get("name").is_some_and(Value::is_string) {
                return Err(McpError::InvalidRequest(
                    "tools/call requires a string 'name'".to_string(),
                ));
            }
            params
                .entry("arguments")
                .or_insert_with(|| Value::Object(Params::new()));
        }

        let data = client.call(method, params).await?;

        let duration = started.elapsed();
        tracing::debug!(method = %method, duration_ms = duration.as_millis() as u64, "RPC completed");
        Ok(RelayResponse::RpcResult { data, duration })
    }

    /// Move the relay onto its own task and return a handle to it.
    ///
    /// Requests are processed strictly in arrival order.
    pub fn spawn(mut self) -> RelayHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(REQUEST_QUEUE);
        let events = self.events.clone();

        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                let response = self.handle(request).await;
                if reply.send(response).is_err() {
                    tracing::debug!("Relay caller dropped before reply");
                }
            }
            tracing::debug!("Relay task exiting");
        });

        RelayHandle { tx, events }
    }
}

/// Cloneable handle to a spawned [`Relay`].
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<Envelope>,
    events: broadcast::Sender<RelayEvent>,
}

impl RelayHandle {
    /// Send a request and wait for its reply.
    pub async fn request(&self, request: RelayRequest) -> McpResult<RelayResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| McpError::RelayClosed)?;
        reply_rx.await.map_err(|_| McpError::RelayClosed)?
    }

    pub async fn init(&self, config: RelayConfig) -> McpResult<RelayResponse> {
        self.request(RelayRequest::Init(Box::new(config))).await
    }

    pub async fn rpc(&self, method: &str, params: Params) -> McpResult<RelayResponse> {
        self.request(RelayRequest::Rpc {
            method: method.to_string(),
            params,
        })
        .await
    }

    pub async fn status(&self) -> McpResult<RelayStatus> {
        match self.request(RelayRequest::Status).await? {
            RelayResponse::Status(status) => Ok(status),
            other => Err(McpError::InvalidRequest(format!("unexpected relay reply: {:?}", other))),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.events.subscribe()
    }
}
