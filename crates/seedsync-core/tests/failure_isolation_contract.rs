//! Contract Test: Failure Isolation
//!
//! This test verifies that a failed run never changes the live zone.
//!
//! Constraints verified:
//! - A peer fetch failure aborts before any zone call
//! - A missing zone or an unexpected active version is a typed failure, not a default
//! - Any failure before activation leaves the active version and its records as they were
//! - The failure reports the last stage reached and every change already applied
//!
//! If this test fails, a broken run can publish a partial seed set.

mod common;

use common::*;
use seedsync_core::engine::AppliedChange;
use seedsync_core::{Error, RunStage, SeedSync};

#[tokio::test]
async fn peer_fetch_failure_touches_nothing() {
    let zone = InMemoryZone::new(3);

    let sync = SeedSync::new(
        Box::new(FailingPeerSource),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    assert_eq!(failure.reached, RunStage::Start);
    assert!(failure.target_version.is_none());
    assert!(failure.applied.is_empty());
    assert!(failure.is_transient());
    assert!(zone.calls().is_empty());
}

#[tokio::test]
async fn missing_zone_is_reported() {
    let zone = InMemoryZone::new(3);
    let mut config = minimal_config();
    config.zone.zone_id = 4321;

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4"], 18080)),
        Box::new(zone.clone()),
        &config,
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    assert!(matches!(failure.source, Error::ZoneNotFound(4321)));
    assert_eq!(failure.reached, RunStage::PeersFetched);
    assert!(!failure.is_transient());
    assert_eq!(zone.calls(), vec![Call::ListZones]);
}

#[tokio::test]
async fn unexpected_active_version_is_reported() {
    let zone = InMemoryZone::new(7);
    zone.seed_record(3, "seeds", "A", "198.51.100.7");

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4"], 18080)),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    match failure.source {
        Error::UnexpectedVersion { active, versions } => {
            assert_eq!(active, 7);
            assert_eq!(versions, [3, 4]);
        }
        ref other => panic!("expected UnexpectedVersion, got {:?}", other),
    }
    assert!(!failure.is_transient());
    assert_eq!(zone.mutation_count(), 0);
    assert_eq!(zone.active_version(), 7);
    assert_eq!(zone.records(3).len(), 1);
}

#[tokio::test]
async fn insert_failure_leaves_active_version_unchanged() {
    let zone = InMemoryZone::new(3);
    zone.seed_record(3, "seeds", "A", "198.51.100.1");
    let stale = zone.seed_record(4, "seeds", "A", "198.51.100.7");
    zone.fail_at(FailPoint::AddAfter(1));

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4", "5.6.7.8"], 18080)),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    assert_eq!(failure.reached, RunStage::RecordsPurged);
    assert_eq!(failure.target_version, Some(4));
    assert_eq!(failure.applied.len(), 2);
    assert_eq!(
        failure.applied[0],
        AppliedChange::Deleted { record_id: stale }
    );
    assert!(matches!(
        failure.applied[1],
        AppliedChange::Added { ref value, .. } if value == "1.2.3.4"
    ));
    assert!(failure.left_partial_edit());

    // Live zone unaffected
    assert_eq!(zone.active_version(), 3);
    assert_eq!(zone.named(3, "seeds").len(), 1);
    assert!(!zone.calls().contains(&Call::Activate { version: 4 }));
}

#[tokio::test]
async fn delete_failure_stops_before_inserting() {
    let zone = InMemoryZone::new(3);
    zone.seed_record(4, "seeds", "A", "198.51.100.7");
    zone.seed_record(4, "seeds", "A", "198.51.100.8");
    zone.fail_at(FailPoint::DeleteAfter(1));

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4"], 18080)),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    assert_eq!(failure.reached, RunStage::ZoneVersionResolved);
    assert_eq!(failure.applied.len(), 1);
    assert!(
        !zone
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Add { .. } | Call::Activate { .. }))
    );
    assert_eq!(zone.active_version(), 3);
}

#[tokio::test]
async fn activation_failure_keeps_old_version_live() {
    let zone = InMemoryZone::new(4);
    zone.fail_at(FailPoint::Activate);

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4"], 18080)),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    assert_eq!(failure.reached, RunStage::RecordsInserted);
    assert_eq!(failure.target_version, Some(3));
    assert_eq!(zone.active_version(), 4);
    // The staged version holds the new seeds, ready for the next run to overwrite
    assert_eq!(zone.named(3, "seeds"), seeds(&["1.2.3.4"]));
}

#[tokio::test]
async fn zone_listing_failure_is_transient() {
    let zone = InMemoryZone::new(3);
    zone.fail_at(FailPoint::ListZones);

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4"], 18080)),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    let failure = sync.run().await.expect_err("run fails");

    assert_eq!(failure.reached, RunStage::PeersFetched);
    assert!(failure.is_transient());
    assert_eq!(zone.mutation_count(), 0);
}

#[tokio::test]
async fn next_run_recovers_from_partial_edit() {
    let zone = InMemoryZone::new(3);
    zone.seed_record(4, "seeds", "A", "198.51.100.7");
    zone.fail_at(FailPoint::AddAfter(0));

    let sync = SeedSync::new(
        Box::new(StaticPeerSource::on_port(&["1.2.3.4", "5.6.7.8"], 18080)),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("driver construction succeeds");

    sync.run().await.expect_err("first run fails");
    assert!(zone.named(4, "seeds").is_empty());

    zone.clear_failure();
    sync.run().await.expect("second run succeeds");

    assert_eq!(zone.active_version(), 4);
    assert_eq!(zone.named(4, "seeds"), seeds(&["1.2.3.4", "5.6.7.8"]));
}
