//! mcp-relay: command-line front end for the MCP relay.
//!
//! ```text
//! mcp-relay [--config relay.toml] [--server-url URL] [--signer-url URL] [--no-signing] <COMMAND>
//!
//!   connect        initialize and print relay status
//!   capabilities   GET /mcp/capabilities (unsigned)
//!   check          exit status reflects server reachability
//!   tools          tools/list
//!   call           tools/call NAME [ARGUMENTS_JSON]
//!   rpc            METHOD [PARAMS_JSON]
//!   verify         ask the signer to verify a signature
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use mcp_did_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use mcp_did_relay::observability::logging;
use mcp_did_relay::protocol::Params;
use mcp_did_relay::relay::{Relay, RelayHandle, RelayResponse};
use mcp_did_relay::signer::SignerClient;
use mcp_did_relay::McpClient;

#[derive(Parser)]
#[command(name = "mcp-relay")]
#[command(about = "Relay MCP JSON-RPC calls with DID request signing", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MCP server base URL.
    #[arg(long)]
    server_url: Option<String>,

    /// DID signer base URL.
    #[arg(long)]
    signer_url: Option<String>,

    /// Send requests without a DID signature.
    #[arg(long)]
    no_signing: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the client and print relay status
    Connect,
    /// Fetch the server's capability descriptor
    Capabilities,
    /// Check server reachability
    Check,
    /// List available tools
    Tools,
    /// Call a tool
    Call {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Issue a raw JSON-RPC call
    Rpc {
        method: String,
        /// Params as a JSON object
        #[arg(default_value = "{}")]
        params: String,
    },
    /// Verify a signature with the signer
    Verify {
        payload: String,
        signature: String,
        did: String,
    },
}

impl Cli {
    fn resolve_config(&self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RelayConfig::default(),
        };

        if let Some(url) = &self.server_url {
            config.server.url = url.clone();
        }
        if let Some(url) = &self.signer_url {
            config.signer.url = url.clone();
        }
        if self.no_signing {
            config.auth.requires_signing = false;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeouts.request_ms = ms;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(&config.observability.log_filter);

    tracing::debug!(
        server_url = %config.server.url,
        signer_url = %config.signer.url,
        requires_signing = config.auth.requires_signing,
        request_ms = config.timeouts.request_ms,
        "Configuration resolved"
    );

    match cli.command {
        Commands::Connect => {
            let relay = connect(config).await?;
            let status = relay.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Capabilities => {
            let client = McpClient::new(&config)?;
            print_json(&client.get_capabilities().await?)?;
        }
        Commands::Check => {
            let client = McpClient::new(&config)?;
            if client.check_connection().await {
                println!("connected: {}", client.server_url());
            } else {
                eprintln!("Error: MCP server at {} is unreachable", client.server_url());
                std::process::exit(1);
            }
        }
        Commands::Tools => {
            let relay = connect(config).await?;
            print_result(relay.rpc("tools/list", Params::new()).await?)?;
        }
        Commands::Call { name, arguments } => {
            let arguments: Value = serde_json::from_str(&arguments)?;
            let mut params = Params::new();
            params.insert("name".to_string(), Value::String(name));
            params.insert("arguments".to_string(), arguments);

            let relay = connect(config).await?;
            print_result(relay.rpc("tools/call", params).await?)?;
        }
        Commands::Rpc { method, params } => {
            let params: Params = serde_json::from_str(&params)?;
            let relay = connect(config).await?;
            print_result(relay.rpc(&method, params).await?)?;
        }
        Commands::Verify {
            payload,
            signature,
            did,
        } => {
            let http = reqwest::Client::builder()
                .timeout(std::time::Duration::from_millis(config.timeouts.request_ms))
                .build()?;
            let signer = SignerClient::new(http, &config.signer.url);
            let valid = signer.verify(&payload, &signature, &did).await?;
            println!("{}", serde_json::json!({ "valid": valid }));
        }
    }

    Ok(())
}

async fn connect(config: RelayConfig) -> Result<RelayHandle, Box<dyn std::error::Error>> {
    let relay = Relay::new().spawn();
    relay.init(config).await?;
    Ok(relay)
}

fn print_result(response: RelayResponse) -> Result<(), Box<dyn std::error::Error>> {
    if let RelayResponse::RpcResult { data, duration } = response {
        tracing::info!(duration_ms = duration.as_millis() as u64, "RPC completed");
        print_json(&data)?;
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
