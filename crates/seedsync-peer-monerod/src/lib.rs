// # Monero Daemon Peer Source
//
// This crate provides a PeerSource backed by the monerod JSON-RPC method
// `get_connections`.
//
// ## Implementation
//
// - ✅ One HTTP request per call, no retries (the scheduler re-runs the job)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ JSON-RPC `error` objects and non-OK `status` are failures
// - ✅ `port` accepted as a JSON string or number
//
// ## API Reference
//
// ```http
// POST /json_rpc
// {"jsonrpc":"2.0","id":"0","method":"get_connections"}
// ```
//
// ```json
// {"id":"0","jsonrpc":"2.0","result":{"connections":[{"ip":"1.2.3.4","port":"18080","state":"normal",...}],"status":"OK"}}
// ```

use async_trait::async_trait;
use seedsync_core::config::PeerSourceConfig;
use seedsync_core::traits::{Peer, PeerSource, PeerSourceFactory};
use seedsync_core::{Error, Registry, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default HTTP timeout for RPC requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// monerod peer source
#[derive(Debug)]
pub struct MonerodPeerSource {
    /// JSON-RPC endpoint
    rpc_url: String,

    /// HTTP client for RPC requests
    client: reqwest::Client,
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<ConnectionsResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionsResult {
    /// monerod omits empty arrays
    #[serde(default)]
    connections: Vec<Connection>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Connection {
    ip: String,
    #[serde(deserialize_with = "port_from_str_or_int")]
    port: u16,
    state: Option<String>,
}

impl From<Connection> for Peer {
    fn from(connection: Connection) -> Self {
        Peer {
            address: connection.ip,
            port: connection.port,
            state: connection.state,
        }
    }
}

fn port_from_str_or_int<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Int(u16),
        Str(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Int(port) => Ok(port),
        Port::Str(port) => port.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl MonerodPeerSource {
    /// Create a new monerod peer source
    ///
    /// # Parameters
    ///
    /// - `rpc_url`: JSON-RPC endpoint (e.g., "http://127.0.0.1:18081/json_rpc")
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            rpc_url: rpc_url.into(),
            client,
        })
    }
}

#[async_trait]
impl PeerSource for MonerodPeerSource {
    async fn connections(&self) -> Result<Vec<Peer>> {
        tracing::debug!("Calling get_connections on {}", self.rpc_url);

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "0",
            "method": "get_connections",
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::http(format!("monerod request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!(
                    "monerod rejected the request (restricted RPC or login required). Status: {}",
                    status
                ))),
                _ => Err(Error::peer_source(format!(
                    "monerod returned HTTP {}",
                    status
                ))),
            };
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read monerod response: {}", e)))?;

        let envelope: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Invalid get_connections response: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(Error::rpc(error.code, error.message));
        }

        let result = envelope
            .result
            .ok_or_else(|| Error::decode("get_connections response has no result"))?;

        if let Some(status) = result.status.as_deref() {
            if status != "OK" {
                return Err(Error::peer_source(format!(
                    "get_connections returned status {}",
                    status
                )));
            }
        }

        let peers: Vec<Peer> = result.connections.into_iter().map(Peer::from).collect();
        tracing::debug!("monerod reported {} connection(s)", peers.len());
        Ok(peers)
    }

    fn source_name(&self) -> &'static str {
        "monerod"
    }
}

/// Factory for creating monerod peer sources
pub struct MonerodFactory;

impl PeerSourceFactory for MonerodFactory {
    fn create(&self, config: &PeerSourceConfig) -> Result<Box<dyn PeerSource>> {
        match config {
            PeerSourceConfig::Monerod { rpc_url } => {
                if rpc_url.is_empty() {
                    return Err(Error::config("monerod RPC URL is required"));
                }
                Ok(Box::new(MonerodPeerSource::new(rpc_url.clone())?))
            }
            _ => Err(Error::config("Invalid config for monerod peer source")),
        }
    }
}

/// Register the monerod peer source with a registry
pub fn register(registry: &mut Registry) {
    registry.register_peer_source("monerod", Box::new(MonerodFactory));
}
