//! HTTP client for the signer service.

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::client::error::{McpError, McpResult};

const HEALTH_PATH: &str = "/health";
const DID_PATH: &str = "/did";
const SIGN_PATH: &str = "/sign";
const VERIFY_PATH: &str = "/verify";

#[derive(Debug, Deserialize)]
struct DidResponse {
    did: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    payload: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    jws: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    payload: &'a str,
    signature: &'a str,
    did: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: Option<bool>,
}

/// Client for a local DID signer.
#[derive(Debug, Clone)]
pub struct SignerClient {
    http: Client,
    base_url: String,
}

impl SignerClient {
    /// Create a signer client sharing `http`'s connection settings.
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness check.
    pub async fn health(&self) -> McpResult<()> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| McpError::SignerUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(McpError::SignerUnavailable(format!(
                "health check returned status {}",
                status
            )));
        }
        Ok(())
    }

    /// Fetch the signer's DID.
    pub async fn did(&self) -> McpResult<String> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, DID_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| McpError::IdentityFetchFailed(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| McpError::IdentityFetchFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(McpError::IdentityFetchFailed(format!(
                "signer returned status {}: {}",
                status, text
            )));
        }

        let body: DidResponse = serde_json::from_str(&text)
            .map_err(|e| McpError::IdentityFetchFailed(format!("invalid DID response: {}", e)))?;

        match body.did {
            Some(did) if !did.is_empty() => Ok(did),
            _ => Err(McpError::IdentityFetchFailed("no DID in response".to_string())),
        }
    }

    /// Sign `payload` exactly as given.
    pub async fn sign(&self, payload: &str) -> McpResult<String> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, SIGN_PATH))
            .header(ACCEPT, "application/json")
            .json(&SignRequest { payload })
            .send()
            .await
            .map_err(|e| McpError::SigningFailed(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| McpError::SigningFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(McpError::SigningFailed(format!(
                "signer returned status {}: {}",
                status, text
            )));
        }

        let body: SignResponse = serde_json::from_str(&text)
            .map_err(|e| McpError::SigningFailed(format!("invalid sign response: {}", e)))?;

        match body.jws {
            Some(jws) if !jws.is_empty() => {
                tracing::debug!(payload_len = payload.len(), "Payload signed");
                Ok(jws)
            }
            _ => Err(McpError::SigningFailed("no JWS signature in response".to_string())),
        }
    }

    /// Ask the signer whether `signature` is valid for `payload` under `did`.
    pub async fn verify(&self, payload: &str, signature: &str, did: &str) -> McpResult<bool> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, VERIFY_PATH))
            .header(ACCEPT, "application/json")
            .json(&VerifyRequest {
                payload,
                signature,
                did,
            })
            .send()
            .await
            .map_err(|e| McpError::SignerUnavailable(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| McpError::SignerUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(McpError::SignerUnavailable(format!(
                "verify returned status {}: {}",
                status, text
            )));
        }

        let body: VerifyResponse =
            serde_json::from_str(&text).map_err(|e| McpError::MalformedResponse(e.to_string()))?;
        body.valid
            .ok_or_else(|| McpError::MalformedResponse("no 'valid' field in response".to_string()))
    }
}
