//! Scenario: on a ranging host only `didRangeBeacons` feeds the resolver.
//! `didDiscoverDevices` is observed but never moves the state, even when it
//! carries a store beacon.

use bcn_scan::{EventOutcome, ScanPhase};
use bcn_schemas::{ProximityClass, ScanState};
use bcn_testkit::{location_id, obs, ranging_rig, store_id};

#[tokio::test]
async fn discovered_devices_never_resolve() {
    let mut rig = ranging_rig(true);
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem
        .emit_discovered(vec![obs(store_id(), -50, ProximityClass::Immediate)]);
    let outcome = rig.controller.process_next().await.unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Observed {
            source: "didDiscoverDevices",
            count: 1
        }
    );
    assert_eq!(rig.controller.current().scan_state, ScanState::Scanning);
    assert_eq!(rig.controller.stats().discovery_events, 1);
    assert_eq!(rig.controller.stats().batches_applied, 0);
}

#[tokio::test]
async fn ranged_location_resolves_and_halts_ranging() {
    let mut rig = ranging_rig(true);
    rig.controller.start_scanning().await.unwrap();

    rig.subsystem.emit_ranged(vec![
        obs(store_id(), -70, ProximityClass::Far),
        obs(location_id(), -35, ProximityClass::Immediate),
    ]);
    let outcome = rig.controller.process_next().await.unwrap();

    let EventOutcome::Applied(applied) = outcome else {
        panic!("ranged batch must be applied, got {outcome:?}");
    };
    assert!(applied.store_committed);
    assert_eq!(applied.current.scan_state, ScanState::LocationResolved);
    assert_eq!(rig.controller.phase(), ScanPhase::Halted);

    let calls = rig.journal.calls();
    let stop_ranging = calls.iter().position(|c| c == "stop_ranging").unwrap();
    let stop_discovery = calls.iter().position(|c| c == "stop_discovery").unwrap();
    assert!(stop_ranging < stop_discovery);
}

#[tokio::test]
async fn discovery_still_observed_after_halt() {
    let mut rig = ranging_rig(true);
    rig.controller.start_scanning().await.unwrap();
    rig.subsystem.emit_ranged(vec![obs(store_id(), -70, ProximityClass::Far)]);
    rig.controller.process_next().await.unwrap();
    assert_eq!(rig.controller.phase(), ScanPhase::Halted);

    rig.subsystem.emit_discovered(vec![]);
    let outcome = rig.controller.process_next().await.unwrap();
    assert!(matches!(outcome, EventOutcome::Observed { count: 0, .. }));
}
