//! Scenario: an empty batch never errors and never changes state, whatever
//! state the resolver is in.

use bcn_engine::{classify, select_nearest, ProximityResolver, ResolverSets};
use bcn_schemas::{BeaconId, BeaconObservation, IdentitySet, ProximityClass, ScanState};
use chrono::{TimeZone, Utc};

fn obs(id: &str, rssi: i32, p: ProximityClass) -> BeaconObservation {
    BeaconObservation {
        identifier: BeaconId::new(id),
        major: 1,
        minor: 1,
        signal_strength: rssi,
        proximity: p,
        accuracy: None,
        display_name: None,
        observed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

fn sets() -> ResolverSets {
    ResolverSets::new(
        IdentitySet::new("store").with_member("S1"),
        IdentitySet::new("location").with_member("L1"),
    )
}

#[test]
fn scenario_empty_batch_from_scanning() {
    let mut r = ProximityResolver::new(sets());
    let out = r.apply(&[]);
    assert_eq!(out.previous, ScanState::Scanning);
    assert_eq!(out.current.scan_state, ScanState::Scanning);
    assert!(!out.state_changed());
}

#[test]
fn scenario_empty_batch_keeps_location_resolved() {
    let mut r = ProximityResolver::new(sets());
    r.apply(&[
        obs("S1", -60, ProximityClass::Near),
        obs("L1", -30, ProximityClass::Immediate),
    ]);
    let before = r.current().clone();

    let out = r.apply(&[]);

    assert_eq!(out.current, before);
    assert!(!out.location_changed);
}

#[test]
fn scenario_batch_without_matches_does_not_crash_selection() {
    // Non-empty batch whose classified sets are both empty: the selector sees
    // empty slices and must yield None rather than panic.
    let batch = vec![obs("FOREIGN", -20, ProximityClass::Immediate)];
    let classified = classify(&batch, sets().as_slice());
    for members in classified.values() {
        assert!(members.is_empty());
        assert!(select_nearest(members).is_none());
    }

    let mut r = ProximityResolver::new(sets());
    let out = r.apply(&batch);
    assert_eq!(out.current.scan_state, ScanState::Scanning);
}

#[test]
fn scenario_classification_is_deterministic() {
    let batch = vec![
        obs("L1", -50, ProximityClass::Near),
        obs("S1", -60, ProximityClass::Far),
        obs("X", -10, ProximityClass::Immediate),
        obs("L1", -45, ProximityClass::Immediate),
    ];
    let a = classify(&batch, sets().as_slice());
    let b = classify(&batch, sets().as_slice());
    assert_eq!(a, b);
}
