// # seedsync-core
//
// Core library for the DNS seed synchronization job.
//
// ## Architecture Overview
//
// One run of the job refreshes the `seeds` records of a DNS zone from the
// live peer table of a running node:
// - **PeerSource**: Trait for fetching the node's current peer connections
// - **ZoneEditor**: Trait for the versioned zone-editing API of a DNS provider
// - **PeerFilter**: Selects the peers usable as bootstrap targets
// - **Reachability**: Optional connect check on the selected peers
// - **ChangeSet**: Staged deletions/additions for the inactive zone version
// - **SeedSync**: Driver that runs fetch → filter → plan → apply → activate
// - **Registry**: Plugin-based registry for peer sources and zone editors
// - **RunLock**: Optional lock file guarding against overlapping runs
//
// ## Design Principles
//
// 1. **Run to completion**: No background tasks, no loops; the scheduler re-runs us
// 2. **Single commit point**: The live zone only changes on version activation
// 3. **Typed outcomes**: Failures carry their cause and the stage reached
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod traits;
pub mod filter;
pub mod reachability;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod lock;

// Re-export core types for convenience
pub use traits::{PeerSource, ZoneEditor};
pub use filter::PeerFilter;
pub use reachability::{Reachability, TcpConnect};
pub use engine::{ChangeSet, RunReport, RunStage, SeedSync, SyncFailure};
pub use registry::Registry;
pub use config::{
    MultiZoneConfig, PeerSourceConfig, SeedSyncConfig, ZoneConfig, ZoneEditorConfig, ZoneSelector,
};
pub use error::{Error, Result};
pub use lock::RunLock;
