//! Staged change set for one run
//!
//! The zone edit is planned in full before any remote call is made, so the
//! driver can log it, skip it (dry-run) or report precisely how far it got.

use crate::config::ZoneConfig;
use crate::traits::{NewRecord, ZoneRecord};

/// Deletions and additions to apply to the target zone version
///
/// All deletions are applied before any addition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Existing seed records of the target version
    pub deletions: Vec<ZoneRecord>,
    /// One record per candidate address
    pub additions: Vec<NewRecord>,
}

impl ChangeSet {
    /// Plan the replacement of every seed record in a zone version
    ///
    /// Every existing record whose name equals the configured record name is
    /// deleted regardless of its type or value; one record is added per
    /// candidate, duplicates included.
    pub fn plan(existing: &[ZoneRecord], candidates: &[String], zone: &ZoneConfig) -> Self {
        let deletions = existing
            .iter()
            .filter(|record| record.name == zone.record_name)
            .cloned()
            .collect();

        let additions = candidates
            .iter()
            .map(|address| NewRecord {
                name: zone.record_name.clone(),
                record_type: zone.record_type.clone(),
                value: address.clone(),
                ttl: zone.ttl,
            })
            .collect();

        Self {
            deletions,
            additions,
        }
    }

    /// Whether applying this set would leave the records untouched
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.additions.is_empty()
    }
}

/// Result of one successful remote mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedChange {
    /// A stale seed record was deleted
    Deleted {
        /// Id of the deleted record
        record_id: i64,
    },
    /// A seed record was created
    Added {
        /// Record value (the peer address)
        value: String,
        /// Id assigned by the provider
        record_id: i64,
    },
    /// The target version was made active
    Activated {
        /// The newly active version
        version: u32,
    },
}
