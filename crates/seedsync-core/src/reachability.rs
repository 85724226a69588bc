//! Reachability check
//!
//! Optional second stage of candidate selection: a peer is only published if
//! a TCP connection to its P2P port can be opened from here. The connection
//! is closed right away; no protocol handshake is attempted.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Decides whether a candidate accepts inbound connections
#[async_trait]
pub trait Reachability: Send + Sync {
    /// Whether `address:port` accepted a connection
    ///
    /// Never fails; any error counts as unreachable.
    async fn is_reachable(&self, address: &str, port: u16) -> bool;
}

/// Plain TCP connect with a timeout
#[derive(Debug, Clone, Copy)]
pub struct TcpConnect {
    timeout: Duration,
}

impl TcpConnect {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Reachability for TcpConnect {
    async fn is_reachable(&self, address: &str, port: u16) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect((address, port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("{}:{} is unreachable: {}", address, port, e);
                false
            }
            Err(_) => {
                debug!("{}:{} did not answer within {:?}", address, port, self.timeout);
                false
            }
        }
    }
}
