//! Scenario: the scan halts once a store identity is held; a location-only
//! resolution keeps scanning. Batches delivered after the halt are dropped
//! and never move the state. A failed stop is retried on the next batch.

use bcn_scan::{EventOutcome, ScanPhase};
use bcn_schemas::{ProximityClass, ScanState};
use bcn_testkit::{location_id, obs, region_rig, store_id};

#[tokio::test]
async fn store_resolution_halts_scan_and_publishes_view() {
    let mut rig = region_rig(31, true);
    let mut view = rig.controller.view();
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem.emit(vec![obs("ffffffff-0000-0000-0000-000000000000", -40, ProximityClass::Immediate)]);
    let first = rig.controller.process_next().await.unwrap();
    assert!(matches!(first, EventOutcome::Applied(ref o) if !o.state_changed()));
    assert_eq!(rig.controller.phase(), ScanPhase::Active);

    rig.subsystem.emit(vec![obs(store_id(), -60, ProximityClass::Far)]);
    rig.controller.process_next().await.unwrap();

    assert_eq!(rig.controller.phase(), ScanPhase::Halted);
    assert_eq!(rig.journal.count("stop_scanning"), 1);
    assert!(view.has_changed().unwrap());
    let seen = view.borrow_and_update().clone();
    assert_eq!(seen.scan_state, ScanState::StoreResolved);
    assert_eq!(
        seen.store.unwrap().label.as_deref(),
        Some("Identit Store order form")
    );

    // Listeners are still attached after a halt; late batches are dropped.
    rig.subsystem.emit(vec![obs(location_id(), -30, ProximityClass::Immediate)]);
    let late = rig.controller.process_next().await.unwrap();
    assert!(matches!(late, EventOutcome::Dropped { source: "beaconsDidUpdate" }));
    assert_eq!(rig.controller.current().scan_state, ScanState::StoreResolved);
    assert_eq!(rig.controller.stats().batches_dropped, 1);
}

#[tokio::test]
async fn without_halt_location_is_tracked_live() {
    let mut rig = region_rig(31, false);
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem.emit(vec![obs(store_id(), -60, ProximityClass::Far)]);
    rig.controller.process_next().await.unwrap();
    assert_eq!(rig.controller.phase(), ScanPhase::Active);

    rig.subsystem.emit(vec![obs(location_id(), -30, ProximityClass::Immediate)]);
    rig.controller.process_next().await.unwrap();
    assert_eq!(rig.controller.current().scan_state, ScanState::LocationResolved);

    rig.subsystem.emit(vec![obs(location_id(), -72, ProximityClass::Near)]);
    rig.controller.process_next().await.unwrap();
    let current = rig.controller.current();
    assert_eq!(current.scan_state, ScanState::StoreResolved);
    assert!(current.location.is_none());
    assert!(current.store.is_some());
    assert_eq!(rig.journal.count("stop_scanning"), 0);
}

#[tokio::test]
async fn failed_stop_is_retried_on_next_batch() {
    let mut rig = region_rig(31, true);
    rig.subsystem.fail_on("stop_scanning", "binder died");
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem.emit(vec![obs(store_id(), -60, ProximityClass::Far)]);
    rig.controller.process_next().await.unwrap();

    assert_eq!(rig.controller.current().scan_state, ScanState::StoreResolved);
    assert_eq!(rig.controller.phase(), ScanPhase::Active);
    assert_eq!(rig.journal.count("stop_scanning"), 1);

    rig.subsystem.clear_failures();
    rig.subsystem.emit(vec![obs(store_id(), -58, ProximityClass::Far)]);
    let next = rig.controller.process_next().await.unwrap();

    assert!(matches!(next, EventOutcome::Applied(_)));
    assert_eq!(rig.controller.phase(), ScanPhase::Halted);
    assert_eq!(rig.journal.count("stop_scanning"), 2);
}

#[tokio::test]
async fn location_first_keeps_scanning_until_store_resolves() {
    let mut rig = region_rig(31, true);
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem.emit(vec![obs(location_id(), -30, ProximityClass::Immediate)]);
    rig.controller.process_next().await.unwrap();

    assert_eq!(rig.controller.current().scan_state, ScanState::LocationResolved);
    assert!(rig.controller.current().store.is_none());
    assert_eq!(rig.controller.phase(), ScanPhase::Active);
    assert_eq!(rig.journal.count("stop_scanning"), 0);

    rig.subsystem.emit(vec![obs(store_id(), -60, ProximityClass::Far)]);
    let outcome = rig.controller.process_next().await.unwrap();

    let EventOutcome::Applied(applied) = outcome else {
        panic!("store batch must be applied, got {outcome:?}");
    };
    assert!(applied.store_committed);
    assert!(rig.controller.current().store.is_some());
    assert_eq!(rig.controller.phase(), ScanPhase::Halted);
    assert_eq!(rig.journal.count("stop_scanning"), 1);
}

#[tokio::test]
async fn rescan_resets_without_duplicating_listeners() {
    let mut rig = region_rig(31, true);
    rig.controller.start_scanning().await.unwrap();
    rig.subsystem.emit(vec![obs(store_id(), -60, ProximityClass::Far)]);
    rig.controller.process_next().await.unwrap();
    assert_eq!(rig.controller.phase(), ScanPhase::Halted);

    rig.controller.rescan().await.unwrap();

    assert_eq!(rig.controller.phase(), ScanPhase::Active);
    assert_eq!(rig.controller.current().scan_state, ScanState::Scanning);
    assert_eq!(rig.journal.count("connect"), 2);
    assert_eq!(rig.subsystem.listener_count(), 1);
}

#[tokio::test]
async fn run_loop_returns_once_halted() {
    let mut rig = region_rig(31, true);
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem.emit(vec![]);
    rig.subsystem.emit(vec![obs(store_id(), -60, ProximityClass::Far)]);

    let stats = rig.controller.run(std::future::pending()).await;
    assert_eq!(stats.batches_applied, 2);
    assert_eq!(rig.controller.phase(), ScanPhase::Halted);
}
