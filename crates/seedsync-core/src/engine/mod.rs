//! Seed synchronization driver
//!
//! [`SeedSync`] runs one synchronization to completion:
//! - Fetching the node's peers via PeerSource
//! - Filtering them to bootstrap candidates (optionally only reachable ones)
//! - Resolving the inactive zone version via ZoneEditor
//! - Replacing the seed records of that version
//! - Activating it
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   peers   ┌──────────────┐  change set  ┌─────────────┐
//! │ PeerSource  │──────────▶│   SeedSync   │─────────────▶│ ZoneEditor  │
//! └─────────────┘           └──────────────┘              └─────────────┘
//!                                  │
//!                                  ▼
//!                      RunReport / SyncFailure
//! ```
//!
//! ## Stages
//!
//! ```text
//! Start → PeersFetched → ZoneVersionResolved → RecordsPurged
//!       → RecordsInserted → VersionActivated
//! ```
//!
//! Any error ends the run with a [`SyncFailure`] carrying the last stage
//! reached. Nothing is rolled back: an interrupted edit stays in the inactive
//! version and is overwritten by the next successful run, while the active
//! version is untouched until the final activation call.

mod plan;

pub use plan::{AppliedChange, ChangeSet};

use crate::config::{SeedSyncConfig, ZoneConfig};
use crate::error::{Error, Result};
use crate::filter::PeerFilter;
use crate::reachability::{Reachability, TcpConnect};
use crate::traits::{PeerSource, ZoneEditor};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Progress marker of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    /// Nothing done yet
    Start,
    /// Peer table fetched and filtered
    PeersFetched,
    /// Active version found and target version chosen
    ZoneVersionResolved,
    /// Stale seed records deleted from the target version
    RecordsPurged,
    /// Fresh seed records added to the target version
    RecordsInserted,
    /// Target version activated (run complete)
    VersionActivated,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Start => "start",
            RunStage::PeersFetched => "peers fetched",
            RunStage::ZoneVersionResolved => "zone version resolved",
            RunStage::RecordsPurged => "records purged",
            RunStage::RecordsInserted => "records inserted",
            RunStage::VersionActivated => "version activated",
        };
        f.write_str(name)
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Version that was active when the run started
    pub previous_version: u32,
    /// Version that was edited (and activated, unless dry-run)
    pub target_version: u32,
    /// Addresses published as seeds
    pub candidates: Vec<String>,
    /// The planned edit
    pub change_set: ChangeSet,
    /// Every remote mutation performed, in order
    pub applied: Vec<AppliedChange>,
    /// Last stage reached
    pub reached: RunStage,
    /// Whether the zone was left untouched on purpose
    pub dry_run: bool,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// A run that stopped before activating the target version
#[derive(Debug, Error)]
#[error("sync failed after stage '{reached}': {source}")]
pub struct SyncFailure {
    /// Last stage completed before the failure
    pub reached: RunStage,
    /// Target version, if it was resolved
    pub target_version: Option<u32>,
    /// Remote mutations that did succeed before the failure
    pub applied: Vec<AppliedChange>,
    /// The cause
    #[source]
    pub source: Error,
}

impl SyncFailure {
    /// Whether the next scheduled run can be expected to succeed unchanged
    pub fn is_transient(&self) -> bool {
        self.source.is_transient()
    }

    /// Whether the staged version was left partially edited
    pub fn left_partial_edit(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Mutable bookkeeping of one run
#[derive(Debug)]
struct Progress {
    reached: RunStage,
    target_version: Option<u32>,
    applied: Vec<AppliedChange>,
}

impl Progress {
    fn new() -> Self {
        Self {
            reached: RunStage::Start,
            target_version: None,
            applied: Vec::new(),
        }
    }

    fn advance(&mut self, stage: RunStage) {
        debug!("Stage reached: {}", stage);
        self.reached = stage;
    }
}

/// Everything the stages produce besides progress
struct Outcome {
    previous_version: u32,
    target_version: u32,
    candidates: Vec<String>,
    change_set: ChangeSet,
}

/// Seed synchronization driver
///
/// Holds the two clients and the run settings. Each call to [`SeedSync::run`]
/// is an independent run; nothing is carried over between runs.
///
/// ## Lifecycle
///
/// 1. Create with [`SeedSync::new()`]
/// 2. Call [`SeedSync::run()`] once per scheduled invocation
/// 3. Map the result to an exit status
pub struct SeedSync {
    /// Source of the node's peer table
    peer_source: Box<dyn PeerSource>,

    /// Client for the provider's zone API
    zone_editor: Box<dyn ZoneEditor>,

    /// Zone and record settings
    zone: ZoneConfig,

    /// Candidate selection
    filter: PeerFilter,

    /// Port the reachability check connects to
    p2p_port: u16,

    /// Connect check applied after filtering, if enabled
    reachability: Option<Box<dyn Reachability>>,

    /// Plan only, never mutate the zone
    dry_run: bool,
}

impl SeedSync {
    /// Create a new driver
    ///
    /// # Parameters
    ///
    /// - `peer_source`: Peer source implementation
    /// - `zone_editor`: Zone editor implementation
    /// - `config`: seedsync configuration (validated here)
    pub fn new(
        peer_source: Box<dyn PeerSource>,
        zone_editor: Box<dyn ZoneEditor>,
        config: &SeedSyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        let reachability: Option<Box<dyn Reachability>> = if config.filter.check_reachability {
            Some(Box::new(TcpConnect::new(Duration::from_millis(
                config.filter.connect_timeout_ms,
            ))))
        } else {
            None
        };

        Ok(Self {
            peer_source,
            zone_editor,
            zone: config.zone.clone(),
            filter: PeerFilter::from(&config.filter),
            p2p_port: config.filter.p2p_port,
            reachability,
            dry_run: config.run.dry_run,
        })
    }

    /// Replace the reachability check, enabling it if it was off
    pub fn with_reachability(mut self, reachability: Box<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    /// Keep the candidates that accept a connection, in order
    async fn reachable(&self, candidates: Vec<String>) -> Vec<String> {
        let Some(check) = &self.reachability else {
            return candidates;
        };

        let mut reachable = Vec::with_capacity(candidates.len());
        for address in candidates {
            if check.is_reachable(&address, self.p2p_port).await {
                reachable.push(address);
            } else {
                debug!("Ignoring {}:{} as it is not reachable", address, self.p2p_port);
            }
        }
        reachable
    }

    /// Run one synchronization to completion
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: Target version populated and activated (or planned, in dry-run)
    /// - `Err(SyncFailure)`: The cause, the stage reached and what was already applied
    pub async fn run(&self) -> std::result::Result<RunReport, SyncFailure> {
        let started_at = Utc::now();
        let mut progress = Progress::new();

        info!(
            "Starting seed sync for zone {} [mode: {}]",
            self.zone.zone_id,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        match self.run_stages(&mut progress).await {
            Ok(outcome) => {
                let report = RunReport {
                    previous_version: outcome.previous_version,
                    target_version: outcome.target_version,
                    candidates: outcome.candidates,
                    change_set: outcome.change_set,
                    applied: progress.applied,
                    reached: progress.reached,
                    dry_run: self.dry_run,
                    started_at,
                    finished_at: Utc::now(),
                };
                info!(
                    "Seed sync done: version {} -> {}, {} seed record(s)",
                    report.previous_version,
                    report.target_version,
                    report.candidates.len()
                );
                Ok(report)
            }
            Err(source) => {
                let failure = SyncFailure {
                    reached: progress.reached,
                    target_version: progress.target_version,
                    applied: progress.applied,
                    source,
                };
                error!("{}", failure);
                if failure.left_partial_edit() {
                    warn!(
                        "Version {:?} left partially edited after {} change(s); the active version is unchanged",
                        failure.target_version,
                        failure.applied.len()
                    );
                }
                Err(failure)
            }
        }
    }

    async fn run_stages(&self, progress: &mut Progress) -> Result<Outcome> {
        let zone_id = self.zone.zone_id;

        // Peers
        let peers = self.peer_source.connections().await?;
        let candidates = self.reachable(self.filter.candidates(&peers)).await;
        info!(
            "Fetched {} peer(s) from {}, {} candidate(s)",
            peers.len(),
            self.peer_source.source_name(),
            candidates.len()
        );
        progress.advance(RunStage::PeersFetched);

        // Version alternation
        let zones = self.zone_editor.list_zones().await?;
        let previous_version = zones
            .iter()
            .find(|zone| zone.id == zone_id)
            .map(|zone| zone.version)
            .ok_or(Error::ZoneNotFound(zone_id))?;
        let target_version = self.zone.target_version(previous_version)?;
        progress.target_version = Some(target_version);
        info!(
            "Zone {} active version is {}, editing version {}",
            zone_id, previous_version, target_version
        );
        progress.advance(RunStage::ZoneVersionResolved);

        let existing = self.zone_editor.list_records(zone_id, target_version).await?;
        let change_set = ChangeSet::plan(&existing, &candidates, &self.zone);
        info!(
            "Planned {} deletion(s) and {} addition(s) in version {}",
            change_set.deletions.len(),
            change_set.additions.len(),
            target_version
        );

        if self.dry_run {
            warn!("[DRY-RUN] Zone {} will not be modified", zone_id);
            if change_set.is_empty() {
                info!("[DRY-RUN] No record changes in version {}", target_version);
            }
            for record in &change_set.deletions {
                info!(
                    "[DRY-RUN] Would delete record {} ({} -> {})",
                    record.id, record.name, record.value
                );
            }
            for record in &change_set.additions {
                info!(
                    "[DRY-RUN] Would add {} {} -> {} (ttl {})",
                    record.record_type, record.name, record.value, record.ttl
                );
            }
            info!("[DRY-RUN] Would activate version {}", target_version);
            return Ok(Outcome {
                previous_version,
                target_version,
                candidates,
                change_set,
            });
        }

        for record in &change_set.deletions {
            debug!("Deleting record {} ({} -> {})", record.id, record.name, record.value);
            self.zone_editor
                .delete_record(zone_id, target_version, record.id)
                .await?;
            progress.applied.push(AppliedChange::Deleted {
                record_id: record.id,
            });
        }
        progress.advance(RunStage::RecordsPurged);

        for record in &change_set.additions {
            debug!("Adding {} {} -> {}", record.record_type, record.name, record.value);
            let record_id = self
                .zone_editor
                .add_record(zone_id, target_version, record)
                .await?;
            progress.applied.push(AppliedChange::Added {
                value: record.value.clone(),
                record_id,
            });
        }
        progress.advance(RunStage::RecordsInserted);

        self.zone_editor
            .activate_version(zone_id, target_version)
            .await?;
        progress.applied.push(AppliedChange::Activated {
            version: target_version,
        });
        progress.advance(RunStage::VersionActivated);

        Ok(Outcome {
            previous_version,
            target_version,
            candidates,
            change_set,
        })
    }
}
