//! Test doubles and common utilities for contract tests
//!
//! This module provides an in-memory versioned zone that behaves like the
//! provider API (one active version, edits only on inactive versions) and
//! peer sources with fixed answers.

#![allow(dead_code)]

use seedsync_core::config::{SeedSyncConfig, ZoneEditorConfig};
use seedsync_core::error::{Error, Result};
use seedsync_core::reachability::Reachability;
use seedsync_core::traits::{
    NewRecord, Peer, PeerSource, ZoneEditor, ZoneRecord, ZoneSummary,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: i64 = 1234;

/// A peer source that always returns the same table
pub struct StaticPeerSource {
    peers: Vec<Peer>,
    call_count: Arc<AtomicUsize>,
}

impl StaticPeerSource {
    pub fn new(peers: Vec<Peer>) -> Self {
        Self {
            peers,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Peers on the given port, one per address
    pub fn on_port(addresses: &[&str], port: u16) -> Self {
        Self::new(addresses.iter().map(|a| Peer::new(*a, port)).collect())
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PeerSource for StaticPeerSource {
    async fn connections(&self) -> Result<Vec<Peer>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.peers.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// A peer source whose node is unreachable
pub struct FailingPeerSource;

#[async_trait::async_trait]
impl PeerSource for FailingPeerSource {
    async fn connections(&self) -> Result<Vec<Peer>> {
        Err(Error::http("connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "failing"
    }
}

/// Reachability decided by a fixed set of answering addresses
#[derive(Debug, Clone)]
pub struct KnownReachable {
    reachable: Vec<String>,
    checked: Arc<Mutex<Vec<(String, u16)>>>,
}

impl KnownReachable {
    pub fn new(reachable: &[&str]) -> Self {
        Self {
            reachable: reachable.iter().map(|a| a.to_string()).collect(),
            checked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every address:port checked so far, in order
    pub fn checked(&self) -> Vec<(String, u16)> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Reachability for KnownReachable {
    async fn is_reachable(&self, address: &str, port: u16) -> bool {
        self.checked
            .lock()
            .unwrap()
            .push((address.to_string(), port));
        self.reachable.iter().any(|a| a == address)
    }
}

/// Remote calls observed by the in-memory zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones,
    ListRecords { version: u32 },
    Delete { version: u32, record_id: i64 },
    Add { version: u32, value: String },
    Activate { version: u32 },
}

/// Where the in-memory zone should start failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    ListZones,
    ListRecords,
    /// Fail the delete call after this many succeeded
    DeleteAfter(usize),
    /// Fail the add call after this many succeeded
    AddAfter(usize),
    Activate,
}

#[derive(Debug)]
struct ZoneState {
    zone_id: i64,
    active_version: u32,
    versions: HashMap<u32, Vec<ZoneRecord>>,
    next_id: i64,
    calls: Vec<Call>,
    fail_at: Option<FailPoint>,
    deletes: usize,
    adds: usize,
}

/// A provider-like versioned zone held in memory
///
/// Clones share the same zone, so a test keeps one handle for assertions and
/// hands another to the driver.
#[derive(Debug, Clone)]
pub struct InMemoryZone {
    state: Arc<Mutex<ZoneState>>,
}

impl InMemoryZone {
    /// Zone `ZONE_ID` with empty versions 3 and 4, version `active` live
    pub fn new(active_version: u32) -> Self {
        let mut versions = HashMap::new();
        versions.insert(3, Vec::new());
        versions.insert(4, Vec::new());

        Self {
            state: Arc::new(Mutex::new(ZoneState {
                zone_id: ZONE_ID,
                active_version,
                versions,
                next_id: 100,
                calls: Vec::new(),
                fail_at: None,
                deletes: 0,
                adds: 0,
            })),
        }
    }

    /// Insert a record directly, bypassing the API
    pub fn seed_record(&self, version: u32, name: &str, record_type: &str, value: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.versions.entry(version).or_default().push(ZoneRecord {
            id,
            name: name.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
            ttl: 10800,
        });
        id
    }

    pub fn fail_at(&self, point: FailPoint) {
        self.state.lock().unwrap().fail_at = Some(point);
    }

    pub fn clear_failure(&self) {
        self.state.lock().unwrap().fail_at = None;
    }

    pub fn active_version(&self) -> u32 {
        self.state.lock().unwrap().active_version
    }

    pub fn records(&self, version: u32) -> Vec<ZoneRecord> {
        self.state
            .lock()
            .unwrap()
            .versions
            .get(&version)
            .cloned()
            .unwrap_or_default()
    }

    /// (type, value, ttl) of every record with the given name, sorted
    pub fn named(&self, version: u32, name: &str) -> Vec<(String, String, u32)> {
        let mut out: Vec<_> = self
            .records(version)
            .into_iter()
            .filter(|r| r.name == name)
            .map(|r| (r.record_type, r.value, r.ttl))
            .collect();
        out.sort();
        out
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of delete/add/activate calls observed
    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::Delete { .. } | Call::Add { .. } | Call::Activate { .. }
                )
            })
            .count()
    }

    fn check_editable(state: &ZoneState, zone_id: i64, version: u32) -> Result<()> {
        if zone_id != state.zone_id {
            return Err(Error::rpc(404, format!("zone {} not found", zone_id)));
        }
        if version == state.active_version {
            return Err(Error::rpc(
                510042,
                format!("version {} is active and cannot be edited", version),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ZoneEditor for InMemoryZone {
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListZones);
        if state.fail_at == Some(FailPoint::ListZones) {
            return Err(Error::http("provider unavailable"));
        }

        Ok(vec![
            ZoneSummary {
                id: 999,
                version: 1,
            },
            ZoneSummary {
                id: state.zone_id,
                version: state.active_version,
            },
        ])
    }

    async fn list_records(&self, zone_id: i64, version: u32) -> Result<Vec<ZoneRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListRecords { version });
        if state.fail_at == Some(FailPoint::ListRecords) {
            return Err(Error::http("provider unavailable"));
        }
        if zone_id != state.zone_id {
            return Err(Error::rpc(404, "zone not found"));
        }

        Ok(state.versions.get(&version).cloned().unwrap_or_default())
    }

    async fn add_record(&self, zone_id: i64, version: u32, record: &NewRecord) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Add {
            version,
            value: record.value.clone(),
        });
        if let Some(FailPoint::AddAfter(n)) = state.fail_at {
            if state.adds >= n {
                return Err(Error::http("connection reset"));
            }
        }
        Self::check_editable(&state, zone_id, version)?;

        let id = state.next_id;
        state.next_id += 1;
        state.adds += 1;
        state.versions.entry(version).or_default().push(ZoneRecord {
            id,
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            value: record.value.clone(),
            ttl: record.ttl,
        });
        Ok(id)
    }

    async fn delete_record(&self, zone_id: i64, version: u32, record_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete { version, record_id });
        if let Some(FailPoint::DeleteAfter(n)) = state.fail_at {
            if state.deletes >= n {
                return Err(Error::http("connection reset"));
            }
        }
        Self::check_editable(&state, zone_id, version)?;

        let records = state.versions.entry(version).or_default();
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(Error::rpc(404, format!("record {} not found", record_id)));
        }
        state.deletes += 1;
        Ok(())
    }

    async fn activate_version(&self, zone_id: i64, version: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Activate { version });
        if state.fail_at == Some(FailPoint::Activate) {
            return Err(Error::http("provider unavailable"));
        }
        if zone_id != state.zone_id || !state.versions.contains_key(&version) {
            return Err(Error::rpc(404, "version not found"));
        }

        state.active_version = version;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Helper to create a minimal SeedSyncConfig for testing
pub fn minimal_config() -> SeedSyncConfig {
    SeedSyncConfig::new(ZoneEditorConfig::gandi("test-api-key"), ZONE_ID)
}

/// Helper to build (type, value, ttl) tuples for seed assertions
pub fn seeds(values: &[&str]) -> Vec<(String, String, u32)> {
    let mut out: Vec<_> = values
        .iter()
        .map(|v| ("A".to_string(), v.to_string(), 300))
        .collect();
    out.sort();
    out
}
