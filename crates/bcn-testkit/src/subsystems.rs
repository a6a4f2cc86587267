use async_trait::async_trait;
use bcn_scan::port::{
    BeaconsRanged, BeaconsUpdated, DevicesDiscovered, RangingBeaconSubsystem, RegionBeaconSubsystem,
};
use bcn_scan::SubsystemError;
use bcn_schemas::{BeaconObservation, RangingRegion, RegionInfo};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::CallJournal;

const EVENT_CAPACITY: usize = 64;

/// Operations scripted to fail, keyed by operation name.
#[derive(Debug, Default)]
struct Failures(Mutex<HashMap<&'static str, String>>);

impl Failures {
    fn set(&self, op: &'static str, reason: &str) {
        if let Ok(mut f) = self.0.lock() {
            f.insert(op, reason.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut f) = self.0.lock() {
            f.clear();
        }
    }

    fn check(&self, op: &'static str) -> Result<(), SubsystemError> {
        let reason = self.0.lock().ok().and_then(|f| f.get(op).cloned());
        match reason {
            Some(reason) => Err(SubsystemError::new(op, reason)),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Region-event subsystem
// ---------------------------------------------------------------------------

pub struct FakeRegionSubsystem {
    journal: CallJournal,
    failures: Failures,
    region: RegionInfo,
    updates: broadcast::Sender<BeaconsUpdated>,
}

impl FakeRegionSubsystem {
    pub fn new(journal: CallJournal) -> Self {
        let (updates, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            journal,
            failures: Failures::default(),
            region: RegionInfo {
                identifier: "all-beacons".to_string(),
                ..RegionInfo::default()
            },
            updates,
        }
    }

    /// Make `op` (`connect`, `start_scanning`, `stop_scanning`) fail.
    pub fn fail_on(&self, op: &'static str, reason: &str) {
        self.failures.set(op, reason);
    }

    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Deliver one `beaconsDidUpdate` snapshot. Returns the number of
    /// listeners that received it.
    pub fn emit(&self, beacons: Vec<BeaconObservation>) -> usize {
        self.updates
            .send(BeaconsUpdated {
                beacons,
                region: self.region.clone(),
            })
            .unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.updates.receiver_count()
    }
}

#[async_trait]
impl RegionBeaconSubsystem for FakeRegionSubsystem {
    async fn connect(&self) -> Result<(), SubsystemError> {
        self.journal.record("connect");
        self.failures.check("connect")
    }

    async fn start_scanning(&self) -> Result<(), SubsystemError> {
        self.journal.record("start_scanning");
        self.failures.check("start_scanning")
    }

    async fn stop_scanning(&self) -> Result<(), SubsystemError> {
        self.journal.record("stop_scanning");
        self.failures.check("stop_scanning")
    }

    fn beacons_updated(&self) -> broadcast::Receiver<BeaconsUpdated> {
        self.updates.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Ranging subsystem
// ---------------------------------------------------------------------------

pub struct FakeRangingSubsystem {
    journal: CallJournal,
    failures: Failures,
    ranged_region: Mutex<Option<RangingRegion>>,
    discovered: broadcast::Sender<DevicesDiscovered>,
    ranged: broadcast::Sender<BeaconsRanged>,
}

impl FakeRangingSubsystem {
    pub fn new(journal: CallJournal) -> Self {
        let (discovered, _) = broadcast::channel(EVENT_CAPACITY);
        let (ranged, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            journal,
            failures: Failures::default(),
            ranged_region: Mutex::new(None),
            discovered,
            ranged,
        }
    }

    /// Make `op` (`init`, `start_discovery`, `start_ranging`, ...) fail.
    pub fn fail_on(&self, op: &'static str, reason: &str) {
        self.failures.set(op, reason);
    }

    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Region passed to the last successful `start_ranging`.
    pub fn ranged_region(&self) -> Option<RangingRegion> {
        self.ranged_region.lock().ok().and_then(|r| r.clone())
    }

    pub fn emit_discovered(&self, beacons: Vec<BeaconObservation>) -> usize {
        self.discovered.send(DevicesDiscovered { beacons }).unwrap_or(0)
    }

    /// Deliver one `didRangeBeacons` snapshot for the ranged region.
    pub fn emit_ranged(&self, beacons: Vec<BeaconObservation>) -> usize {
        let region = self
            .ranged_region()
            .map(|r| RegionInfo::from(&r))
            .unwrap_or_default();
        self.ranged.send(BeaconsRanged { beacons, region }).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.discovered.receiver_count() + self.ranged.receiver_count()
    }
}

#[async_trait]
impl RangingBeaconSubsystem for FakeRangingSubsystem {
    async fn init(&self) -> Result<(), SubsystemError> {
        self.journal.record("init");
        self.failures.check("init")
    }

    async fn start_discovery(&self) -> Result<(), SubsystemError> {
        self.journal.record("start_discovery");
        self.failures.check("start_discovery")
    }

    async fn stop_discovery(&self) -> Result<(), SubsystemError> {
        self.journal.record("stop_discovery");
        self.failures.check("stop_discovery")
    }

    async fn start_ranging(&self, region: &RangingRegion) -> Result<(), SubsystemError> {
        self.journal.record("start_ranging");
        self.failures.check("start_ranging")?;
        if let Ok(mut r) = self.ranged_region.lock() {
            *r = Some(region.clone());
        }
        Ok(())
    }

    async fn stop_ranging(&self, _region: &RangingRegion) -> Result<(), SubsystemError> {
        self.journal.record("stop_ranging");
        self.failures.check("stop_ranging")
    }

    fn devices_discovered(&self) -> broadcast::Receiver<DevicesDiscovered> {
        self.discovered.subscribe()
    }

    fn beacons_ranged(&self) -> broadcast::Receiver<BeaconsRanged> {
        self.ranged.subscribe()
    }
}
