//! Peer filter
//!
//! Selects which peers of the node's connection table are published as seeds.
//! DNS `A` records carry no port, so only peers on the network's standard
//! P2P port can be represented; listening on that port is also taken as a
//! sign that the peer accepts inbound connections.
//!
//! Order is kept and duplicates pass through. Addresses are not validated.

use crate::config::FilterConfig;
use crate::traits::Peer;
use tracing::debug;

/// Bootstrap candidate selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerFilter {
    p2p_port: u16,
    require_normal_state: bool,
}

impl PeerFilter {
    /// Keep peers on the given port
    pub fn new(p2p_port: u16) -> Self {
        Self {
            p2p_port,
            require_normal_state: false,
        }
    }

    /// Additionally require an established connection state
    pub fn with_normal_state_required(mut self, required: bool) -> Self {
        self.require_normal_state = required;
        self
    }

    /// Whether a single peer is a bootstrap candidate
    pub fn accepts(&self, peer: &Peer) -> bool {
        if peer.port != self.p2p_port {
            debug!(
                "Ignoring {}:{} as the port is not {}",
                peer.address, peer.port, self.p2p_port
            );
            return false;
        }
        if self.require_normal_state && !peer.is_normal() {
            debug!(
                "Ignoring {}:{} as the state is {:?}",
                peer.address, peer.port, peer.state
            );
            return false;
        }
        true
    }

    /// Candidate IP addresses, in connection-table order
    pub fn candidates(&self, peers: &[Peer]) -> Vec<String> {
        peers
            .iter()
            .filter(|peer| self.accepts(peer))
            .map(|peer| peer.address.clone())
            .collect()
    }
}

impl From<&FilterConfig> for PeerFilter {
    fn from(config: &FilterConfig) -> Self {
        PeerFilter::new(config.p2p_port).with_normal_state_required(config.require_normal_state)
    }
}
