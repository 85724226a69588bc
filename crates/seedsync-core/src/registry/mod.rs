//! Plugin-based registry
//!
//! The registry lets peer sources and zone editors be registered by name at
//! startup, so the binary selects implementations from configuration instead
//! of hardcoding them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seedsync_core::Registry;
//!
//! let mut registry = Registry::new();
//! seedsync_peer_monerod::register(&mut registry);
//! seedsync_zone_gandi::register(&mut registry);
//!
//! let peer_source = registry.create_peer_source(&config.peer_source)?;
//! let zone_editor = registry.create_zone_editor(&config.zone_editor)?;
//! ```

use crate::config::{PeerSourceConfig, ZoneEditorConfig};
use crate::error::{Error, Result};
use crate::traits::{PeerSource, PeerSourceFactory, ZoneEditor, ZoneEditorFactory};
use std::collections::HashMap;

/// Registry of peer source and zone editor factories
///
/// Populated once during startup, then only read.
#[derive(Default)]
pub struct Registry {
    /// Registered peer source factories
    peer_sources: HashMap<String, Box<dyn PeerSourceFactory>>,

    /// Registered zone editor factories
    zone_editors: HashMap<String, Box<dyn ZoneEditorFactory>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Peer source type name (e.g., "monerod")
    /// - `factory`: Factory object for creating peer source instances
    pub fn register_peer_source(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn PeerSourceFactory>,
    ) {
        self.peer_sources.insert(name.into(), factory);
    }

    /// Register a zone editor factory
    ///
    /// # Parameters
    ///
    /// - `name`: Zone editor type name (e.g., "gandi")
    /// - `factory`: Factory object for creating zone editor instances
    pub fn register_zone_editor(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn ZoneEditorFactory>,
    ) {
        self.zone_editors.insert(name.into(), factory);
    }

    /// Create a peer source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn PeerSource>)`: Created peer source instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_peer_source(&self, config: &PeerSourceConfig) -> Result<Box<dyn PeerSource>> {
        let source_type = config.type_name();

        let factory = self
            .peer_sources
            .get(source_type)
            .ok_or_else(|| Error::config(format!("Unknown peer source type: {}", source_type)))?;

        factory.create(config)
    }

    /// Create a zone editor from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ZoneEditor>)`: Created zone editor instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_zone_editor(&self, config: &ZoneEditorConfig) -> Result<Box<dyn ZoneEditor>> {
        let editor_type = config.type_name();

        let factory = self
            .zone_editors
            .get(editor_type)
            .ok_or_else(|| Error::config(format!("Unknown zone editor type: {}", editor_type)))?;

        factory.create(config)
    }

    /// List all registered peer source types
    pub fn list_peer_sources(&self) -> Vec<String> {
        self.peer_sources.keys().cloned().collect()
    }

    /// List all registered zone editor types
    pub fn list_zone_editors(&self) -> Vec<String> {
        self.zone_editors.keys().cloned().collect()
    }

    /// Check if a peer source type is registered
    pub fn has_peer_source(&self, name: &str) -> bool {
        self.peer_sources.contains_key(name)
    }

    /// Check if a zone editor type is registered
    pub fn has_zone_editor(&self, name: &str) -> bool {
        self.zone_editors.contains_key(name)
    }
}
