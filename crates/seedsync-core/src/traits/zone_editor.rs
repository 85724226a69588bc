// # Zone Editor Trait
//
// Defines the interface for a DNS provider's versioned zone API.
//
// ## Versioning Model
//
// The provider keeps exactly one *active* version per zone. Records can only
// be edited in an inactive version, which is then activated in one call.
// Activation is the only operation that changes what resolvers see.
//
// ## Implementations
//
// - Gandi XML-RPC: `seedsync-zone-gandi` crate

use async_trait::async_trait;

/// A zone as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSummary {
    /// Provider-assigned zone identifier
    pub id: i64,
    /// Currently active version
    pub version: u32,
}

/// A record stored in one zone version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    /// Provider-assigned record identifier
    pub id: i64,
    /// Record name relative to the zone (e.g. "seeds")
    pub name: String,
    /// Record type (e.g. "A")
    pub record_type: String,
    /// Record value
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Fields of a record to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Record name relative to the zone
    pub name: String,
    /// Record type
    pub record_type: String,
    /// Record value
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl NewRecord {
    /// Create an `A` record
    pub fn a(name: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type: "A".to_string(),
            value: value.into(),
            ttl,
        }
    }
}

/// Trait for zone editor implementations
///
/// Every method performs exactly one remote call. Implementations hold their
/// own credentials; callers never see the API key. No retries: a failed call
/// is returned as an error and the next scheduled run starts over.
#[async_trait]
pub trait ZoneEditor: Send + Sync {
    /// List all zones visible to the credentials, with their active version
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>, crate::Error>;

    /// List the records of one zone version
    async fn list_records(
        &self,
        zone_id: i64,
        version: u32,
    ) -> Result<Vec<ZoneRecord>, crate::Error>;

    /// Add a record to a zone version
    ///
    /// # Returns
    ///
    /// The provider-assigned id of the new record
    async fn add_record(
        &self,
        zone_id: i64,
        version: u32,
        record: &NewRecord,
    ) -> Result<i64, crate::Error>;

    /// Delete one record, by id, from a zone version
    async fn delete_record(
        &self,
        zone_id: i64,
        version: u32,
        record_id: i64,
    ) -> Result<(), crate::Error>;

    /// Make the given version the zone's active version
    async fn activate_version(&self, zone_id: i64, version: u32) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone editors from configuration
pub trait ZoneEditorFactory: Send + Sync {
    /// Create a ZoneEditor instance from configuration
    fn create(
        &self,
        config: &crate::config::ZoneEditorConfig,
    ) -> Result<Box<dyn ZoneEditor>, crate::Error>;
}
