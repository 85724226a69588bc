//! Core traits for seedsync
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`PeerSource`]: Fetch a node's current peer connections
//! - [`ZoneEditor`]: Edit and activate versions of a DNS zone

pub mod peer_source;
pub mod zone_editor;

pub use peer_source::{Peer, PeerSource, PeerSourceFactory};
pub use zone_editor::{NewRecord, ZoneEditor, ZoneEditorFactory, ZoneRecord, ZoneSummary};
