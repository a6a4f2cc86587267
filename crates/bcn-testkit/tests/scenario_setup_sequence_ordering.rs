//! Scenario: subsystem setup runs strictly in order, and listeners are only
//! attached once setup has completed.

use bcn_config::identities::default_ranging_region;
use bcn_scan::{ScanError, ScanPhase};
use bcn_testkit::{ranging_rig, region_rig};

#[tokio::test]
async fn android_requests_permissions_then_connects_then_scans() {
    let mut rig = region_rig(31, true);
    assert_eq!(rig.subsystem.listener_count(), 0);

    rig.controller.start_scanning().await.unwrap();

    assert_eq!(
        rig.journal.calls(),
        vec![
            "request_permission:android.permission.BLUETOOTH_SCAN",
            "request_permission:android.permission.BLUETOOTH_CONNECT",
            "request_permission:android.permission.ACCESS_FINE_LOCATION",
            "connect",
            "start_scanning",
        ]
    );
    assert_eq!(rig.subsystem.listener_count(), 1);
    assert_eq!(rig.controller.subscription_count(), 1);
}

#[tokio::test]
async fn ios_inits_discovers_then_ranges_default_region() {
    let mut rig = ranging_rig(true);
    rig.controller.start_scanning().await.unwrap();

    // No runtime permission model on iOS: the fake would deny if asked.
    assert_eq!(rig.journal.calls(), vec!["init", "start_discovery", "start_ranging"]);
    assert_eq!(rig.subsystem.ranged_region(), Some(default_ranging_region()));
    assert_eq!(rig.subsystem.listener_count(), 2);
}

#[tokio::test]
async fn connect_failure_skips_remaining_setup() {
    let mut rig = region_rig(30, true);
    rig.subsystem.fail_on("connect", "service unbound");

    let err = rig.controller.start_scanning().await.unwrap_err();
    assert!(matches!(err, ScanError::SubsystemSetup(ref e) if e.operation == "connect"));
    assert_eq!(rig.controller.phase(), ScanPhase::NotStarted);
    assert_eq!(rig.journal.count("start_scanning"), 0);
    assert_eq!(rig.subsystem.listener_count(), 0);
}

#[tokio::test]
async fn setup_can_be_retried_after_failure() {
    let mut rig = ranging_rig(true);
    rig.subsystem.fail_on("start_ranging", "region rejected");
    assert!(rig.controller.start_scanning().await.is_err());
    assert_eq!(rig.subsystem.listener_count(), 0);

    rig.subsystem.clear_failures();
    rig.controller.start_scanning().await.unwrap();
    assert_eq!(rig.controller.phase(), ScanPhase::Active);
    assert_eq!(rig.journal.count("init"), 2);
}

#[tokio::test]
async fn starting_twice_does_not_duplicate_listeners() {
    let mut rig = region_rig(31, true);
    rig.controller.start_scanning().await.unwrap();
    rig.controller.start_scanning().await.unwrap();

    assert_eq!(rig.journal.count("connect"), 1);
    assert_eq!(rig.subsystem.listener_count(), 1);
}
