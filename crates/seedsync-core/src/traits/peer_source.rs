// # Peer Source Trait
//
// Defines the interface for fetching the live connection table of a node.
//
// ## Implementations
//
// - Monero daemon JSON-RPC: `seedsync-peer-monerod` crate
//
// ## Usage
//
// ```rust,ignore
// use seedsync_core::PeerSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* PeerSource implementation */;
//
//     for peer in source.connections().await? {
//         println!("{}:{}", peer.address, peer.port);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// One entry of a node's connection table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Remote IP address, as reported by the node
    pub address: String,
    /// Remote port
    pub port: u16,
    /// Connection state reported by the node, if any
    pub state: Option<String>,
}

impl Peer {
    /// Create a peer without state information
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            state: None,
        }
    }

    /// Attach the node-reported connection state
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Whether the node reports this connection as fully established
    ///
    /// Accepts both the current (`normal`) and legacy (`state_normal`) spellings.
    pub fn is_normal(&self) -> bool {
        self.state
            .as_deref()
            .map(|s| s.trim_start_matches("state_") == "normal")
            .unwrap_or(false)
    }
}

/// Trait for peer source implementations
///
/// A peer source performs exactly one request per call and returns the
/// complete connection table. Any failure is returned as an error; partial
/// tables are never returned.
#[async_trait]
pub trait PeerSource: Send + Sync {
    /// Fetch the node's current connections
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Peer>)`: Every connection reported by the node, in node order
    /// - `Err(Error)`: Transport failure, RPC error or malformed response
    async fn connections(&self) -> Result<Vec<Peer>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing peer sources from configuration
pub trait PeerSourceFactory: Send + Sync {
    /// Create a PeerSource instance from configuration
    fn create(
        &self,
        config: &crate::config::PeerSourceConfig,
    ) -> Result<Box<dyn PeerSource>, crate::Error>;
}
