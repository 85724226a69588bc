//! Configuration types for seedsync
//!
//! This module defines all configuration structures used throughout the crate.
//! Nothing here is read from the environment; the binary builds a
//! [`SeedSyncConfig`] from environment variables or a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default monerod JSON-RPC endpoint
pub const DEFAULT_NODE_RPC_URL: &str = "http://127.0.0.1:18081/json_rpc";

/// Default Gandi XML-RPC endpoint
pub const DEFAULT_GANDI_API_URL: &str = "https://rpc.gandi.net/xmlrpc/";

/// Main seedsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSyncConfig {
    /// Peer source configuration
    #[serde(default)]
    pub peer_source: PeerSourceConfig,

    /// Zone editor configuration
    pub zone_editor: ZoneEditorConfig,

    /// Zone and seed record settings
    pub zone: ZoneConfig,

    /// Peer filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Per-run settings
    #[serde(default)]
    pub run: RunConfig,
}

impl SeedSyncConfig {
    /// Create a configuration for the given zone with defaults elsewhere
    pub fn new(zone_editor: ZoneEditorConfig, zone_id: i64) -> Self {
        Self {
            peer_source: PeerSourceConfig::default(),
            zone_editor,
            zone: ZoneConfig::new(zone_id),
            filter: FilterConfig::default(),
            run: RunConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.peer_source.validate()?;
        self.zone_editor.validate()?;
        self.zone.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}

/// Peer source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeerSourceConfig {
    /// Monero daemon JSON-RPC `get_connections`
    Monerod {
        /// JSON-RPC endpoint (e.g. "http://127.0.0.1:18081/json_rpc")
        #[serde(default = "default_node_rpc_url")]
        rpc_url: String,
    },

    /// Custom peer source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl PeerSourceConfig {
    /// Validate the peer source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            PeerSourceConfig::Monerod { rpc_url } => validate_url("monerod RPC URL", rpc_url),
            PeerSourceConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom peer source factory cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the peer source type name
    pub fn type_name(&self) -> &str {
        match self {
            PeerSourceConfig::Monerod { .. } => "monerod",
            PeerSourceConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for PeerSourceConfig {
    fn default() -> Self {
        PeerSourceConfig::Monerod {
            rpc_url: default_node_rpc_url(),
        }
    }
}

/// Zone editor configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneEditorConfig {
    /// Gandi XML-RPC zone API
    Gandi {
        /// Gandi API key
        api_key: String,
        /// XML-RPC endpoint
        #[serde(default = "default_gandi_api_url")]
        api_url: String,
        /// Verify the endpoint's TLS certificate
        #[serde(default)]
        verify_tls: bool,
    },

    /// Custom zone editor
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ZoneEditorConfig {
    /// Gandi configuration with the default endpoint and TLS verification off
    pub fn gandi(api_key: impl Into<String>) -> Self {
        ZoneEditorConfig::Gandi {
            api_key: api_key.into(),
            api_url: default_gandi_api_url(),
            verify_tls: false,
        }
    }

    /// Validate the zone editor configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ZoneEditorConfig::Gandi {
                api_key, api_url, ..
            } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("Gandi API key cannot be empty"));
                }
                if api_key == "PUTYOURAPIKEYHERE" {
                    return Err(crate::Error::config(
                        "Gandi API key is still the placeholder value",
                    ));
                }
                validate_url("Gandi API URL", api_url)
            }
            ZoneEditorConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom zone editor factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom zone editor config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the zone editor type name
    pub fn type_name(&self) -> &str {
        match self {
            ZoneEditorConfig::Gandi { .. } => "gandi",
            ZoneEditorConfig::Custom { factory, .. } => factory,
        }
    }
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ZoneEditorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneEditorConfig::Gandi {
                api_url,
                verify_tls,
                ..
            } => f
                .debug_struct("Gandi")
                .field("api_key", &"<REDACTED>")
                .field("api_url", api_url)
                .field("verify_tls", verify_tls)
                .finish(),
            ZoneEditorConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

/// Zone and seed record settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Provider-assigned zone identifier
    pub zone_id: i64,

    /// Name of the records owned by this job
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// Type of the created records
    #[serde(default = "default_record_type")]
    pub record_type: String,

    /// TTL of the created records (seconds)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// The two pre-provisioned zone versions alternated between runs
    #[serde(default = "default_versions")]
    pub versions: [u32; 2],
}

impl ZoneConfig {
    /// Create a zone configuration with default record settings
    pub fn new(zone_id: i64) -> Self {
        Self {
            zone_id,
            record_name: default_record_name(),
            record_type: default_record_type(),
            ttl: default_ttl(),
            versions: default_versions(),
        }
    }

    /// Set the alternated version pair
    pub fn with_versions(mut self, first: u32, second: u32) -> Self {
        self.versions = [first, second];
        self
    }

    /// Set the record TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Pick the version to edit given the currently active one
    ///
    /// Returns the other member of the pair, or
    /// [`Error::UnexpectedVersion`](crate::Error::UnexpectedVersion) when the
    /// active version is outside the pair.
    pub fn target_version(&self, active: u32) -> Result<u32, crate::Error> {
        let [first, second] = self.versions;
        if active == first {
            Ok(second)
        } else if active == second {
            Ok(first)
        } else {
            Err(crate::Error::UnexpectedVersion {
                active,
                versions: self.versions,
            })
        }
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id == 0 {
            return Err(crate::Error::config("Zone ID must be set"));
        }
        if self.record_name.is_empty() {
            return Err(crate::Error::config("Record name cannot be empty"));
        }
        if self.record_type.is_empty() {
            return Err(crate::Error::config("Record type cannot be empty"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("Record TTL must be > 0"));
        }
        if self.versions[0] == self.versions[1] {
            return Err(crate::Error::config(format!(
                "Zone versions must differ, got {} twice",
                self.versions[0]
            )));
        }
        Ok(())
    }
}

/// Peer filter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Standard peer-to-peer listening port of the network
    #[serde(default = "default_p2p_port")]
    pub p2p_port: u16,

    /// Also require the node to report the connection as established
    #[serde(default)]
    pub require_normal_state: bool,

    /// Also require a TCP connection to the candidate's P2P port to succeed
    #[serde(default)]
    pub check_reachability: bool,

    /// Connect timeout of the reachability check (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl FilterConfig {
    /// Validate the filter configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.p2p_port == 0 {
            return Err(crate::Error::config("P2P port must be > 0"));
        }
        if self.check_reachability && self.connect_timeout_ms == 0 {
            return Err(crate::Error::config(
                "Reachability connect timeout must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            p2p_port: default_p2p_port(),
            require_normal_state: false,
            check_reachability: false,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Per-run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Plan and log the change set without editing the zone
    #[serde(default)]
    pub dry_run: bool,

    /// Lock file guarding against overlapping runs
    #[serde(default)]
    pub lock_path: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            lock_path: None,
        }
    }
}

/// Which configured zones one invocation refreshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneSelector {
    /// Every configured zone, in name order
    All,
    /// A single zone by name
    Named(String),
}

impl std::str::FromStr for ZoneSelector {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(crate::Error::config("Zone selector cannot be empty")),
            "all" => Ok(ZoneSelector::All),
            name => Ok(ZoneSelector::Named(name.to_string())),
        }
    }
}

/// Several independent zones, each with its own node, provider and settings
///
/// ```json
/// {
///   "zones": {
///     "mainnet": { "zone_editor": { "type": "gandi", "api_key": "..." }, "zone": { "zone_id": 1 } },
///     "testnet": { "zone_editor": { "type": "gandi", "api_key": "..." }, "zone": { "zone_id": 2 },
///                  "filter": { "p2p_port": 28080 } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiZoneConfig {
    /// Zone configurations by name
    pub zones: BTreeMap<String, SeedSyncConfig>,
}

impl MultiZoneConfig {
    /// Wrap a single configuration under the given name
    pub fn single(name: impl Into<String>, config: SeedSyncConfig) -> Self {
        let mut zones = BTreeMap::new();
        zones.insert(name.into(), config);
        Self { zones }
    }

    /// Validate every zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zones.is_empty() {
            return Err(crate::Error::config("At least one zone must be configured"));
        }
        if self.zones.contains_key("all") {
            return Err(crate::Error::config(
                "'all' is reserved and cannot name a zone",
            ));
        }
        for (name, config) in &self.zones {
            config
                .validate()
                .map_err(|e| crate::Error::config(format!("zone '{}': {}", name, e)))?;
        }
        Ok(())
    }

    /// The zones picked by `selector`, in name order
    pub fn select(
        &self,
        selector: &ZoneSelector,
    ) -> Result<Vec<(&str, &SeedSyncConfig)>, crate::Error> {
        match selector {
            ZoneSelector::All => Ok(self
                .zones
                .iter()
                .map(|(name, config)| (name.as_str(), config))
                .collect()),
            ZoneSelector::Named(name) => self
                .zones
                .get_key_value(name)
                .map(|(name, config)| vec![(name.as_str(), config)])
                .ok_or_else(|| {
                    crate::Error::config(format!(
                        "Zone '{}' is not configured. Configured zones: {}",
                        name,
                        self.zones.keys().cloned().collect::<Vec<_>>().join(", ")
                    ))
                }),
        }
    }
}

fn validate_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn default_node_rpc_url() -> String {
    DEFAULT_NODE_RPC_URL.to_string()
}

fn default_gandi_api_url() -> String {
    DEFAULT_GANDI_API_URL.to_string()
}

fn default_record_name() -> String {
    "seeds".to_string()
}

fn default_record_type() -> String {
    "A".to_string()
}

fn default_ttl() -> u32 {
    300
}

fn default_versions() -> [u32; 2] {
    [3, 4]
}

fn default_p2p_port() -> u16 {
    18080
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SeedSyncConfig {
        SeedSyncConfig::new(ZoneEditorConfig::gandi("0123456789abcdef"), 1234)
    }

    #[test]
    fn test_defaults() {
        let config = valid_config();
        assert_eq!(config.zone.record_name, "seeds");
        assert_eq!(config.zone.record_type, "A");
        assert_eq!(config.zone.ttl, 300);
        assert_eq!(config.zone.versions, [3, 4]);
        assert_eq!(config.filter.p2p_port, 18080);
        assert!(!config.filter.require_normal_state);
        assert!(!config.filter.check_reachability);
        assert_eq!(config.filter.connect_timeout_ms, 1000);
        assert!(!config.run.dry_run);
        assert_eq!(config.peer_source.type_name(), "monerod");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_version_alternates() {
        let zone = ZoneConfig::new(1);
        assert_eq!(zone.target_version(3).unwrap(), 4);
        assert_eq!(zone.target_version(4).unwrap(), 3);
    }

    #[test]
    fn test_target_version_rejects_unknown_active() {
        let zone = ZoneConfig::new(1);
        for active in [0, 1, 2, 5, 7] {
            match zone.target_version(active) {
                Err(crate::Error::UnexpectedVersion { active: a, versions }) => {
                    assert_eq!(a, active);
                    assert_eq!(versions, [3, 4]);
                }
                other => panic!("expected UnexpectedVersion for {}, got {:?}", active, other),
            }
        }
    }

    #[test]
    fn test_custom_version_pair() {
        let zone = ZoneConfig::new(1).with_versions(10, 11);
        assert_eq!(zone.target_version(10).unwrap(), 11);
        assert!(zone.target_version(3).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = valid_config();
        config.zone.zone_id = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.zone.versions = [3, 3];
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.zone.ttl = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.filter.p2p_port = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.filter.check_reachability = true;
        config.filter.connect_timeout_ms = 0;
        assert!(config.validate().is_err());

        let config = SeedSyncConfig::new(ZoneEditorConfig::gandi("PUTYOURAPIKEYHERE"), 1234);
        assert!(config.validate().is_err());

        let config = SeedSyncConfig::new(ZoneEditorConfig::gandi(""), 1234);
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.peer_source = PeerSourceConfig::Monerod {
            rpc_url: "127.0.0.1:18081".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let json = r#"{
            "zone_editor": { "type": "gandi", "api_key": "0123456789abcdef" },
            "zone": { "zone_id": 1234 }
        }"#;

        let config: SeedSyncConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.zone.zone_id, 1234);
        assert_eq!(config.zone.versions, [3, 4]);
        assert_eq!(config.filter.p2p_port, 18080);
        match config.zone_editor {
            ZoneEditorConfig::Gandi {
                ref api_url,
                verify_tls,
                ..
            } => {
                assert_eq!(api_url, DEFAULT_GANDI_API_URL);
                assert!(!verify_tls);
            }
            _ => panic!("expected gandi zone editor"),
        }
        match config.peer_source {
            PeerSourceConfig::Monerod { ref rpc_url } => assert_eq!(rpc_url, DEFAULT_NODE_RPC_URL),
            _ => panic!("expected monerod peer source"),
        }
    }

    #[test]
    fn test_multi_zone_json() {
        let json = r#"{
            "zones": {
                "testnet": {
                    "zone_editor": { "type": "gandi", "api_key": "0123456789abcdef" },
                    "zone": { "zone_id": 2 },
                    "filter": { "p2p_port": 28080, "check_reachability": true }
                },
                "mainnet": {
                    "zone_editor": { "type": "gandi", "api_key": "0123456789abcdef" },
                    "zone": { "zone_id": 1 }
                }
            }
        }"#;

        let config: MultiZoneConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());

        let all = config.select(&ZoneSelector::All).unwrap();
        let names: Vec<&str> = all.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["mainnet", "testnet"]);

        let testnet = config
            .select(&"testnet".parse::<ZoneSelector>().unwrap())
            .unwrap();
        assert_eq!(testnet.len(), 1);
        assert_eq!(testnet[0].1.zone.zone_id, 2);
        assert_eq!(testnet[0].1.filter.p2p_port, 28080);
        assert!(testnet[0].1.filter.check_reachability);
    }

    #[test]
    fn test_multi_zone_selection_errors() {
        let config = MultiZoneConfig::single("mainnet", valid_config());
        assert!(matches!(
            config.select(&ZoneSelector::Named("stagenet".to_string())),
            Err(crate::Error::Config(_))
        ));
        assert_eq!("all".parse::<ZoneSelector>().unwrap(), ZoneSelector::All);
        assert!("".parse::<ZoneSelector>().is_err());

        let empty = MultiZoneConfig {
            zones: BTreeMap::new(),
        };
        assert!(empty.validate().is_err());

        let reserved = MultiZoneConfig::single("all", valid_config());
        assert!(reserved.validate().is_err());

        let mut broken = valid_config();
        broken.zone.zone_id = 0;
        let invalid = MultiZoneConfig::single("mainnet", broken);
        match invalid.validate() {
            Err(crate::Error::Config(message)) => assert!(message.contains("mainnet")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let config = valid_config();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("0123456789abcdef"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
