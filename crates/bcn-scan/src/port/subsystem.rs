use async_trait::async_trait;
use bcn_schemas::{BeaconObservation, RangingRegion, RegionInfo};
use tokio::sync::broadcast;

use crate::error::SubsystemError;

/// One `beaconsDidUpdate` callback: a complete snapshot, not a delta.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconsUpdated {
    pub beacons: Vec<BeaconObservation>,
    pub region: RegionInfo,
}

/// One `didRangeBeacons` callback.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconsRanged {
    pub beacons: Vec<BeaconObservation>,
    pub region: RegionInfo,
}

/// One `didDiscoverDevices` callback (vendor beacons only).
#[derive(Debug, Clone, PartialEq)]
pub struct DevicesDiscovered {
    pub beacons: Vec<BeaconObservation>,
}

/// Beacon subsystem that reports region snapshots (Android).
///
/// `connect` must complete before `start_scanning`; listeners are attached
/// only after both.
#[async_trait]
pub trait RegionBeaconSubsystem: Send + Sync {
    async fn connect(&self) -> Result<(), SubsystemError>;
    async fn start_scanning(&self) -> Result<(), SubsystemError>;
    async fn stop_scanning(&self) -> Result<(), SubsystemError>;
    fn beacons_updated(&self) -> broadcast::Receiver<BeaconsUpdated>;
}

/// Beacon subsystem that ranges a region and separately discovers devices
/// (iOS). The two streams fire independently and need not agree.
#[async_trait]
pub trait RangingBeaconSubsystem: Send + Sync {
    async fn init(&self) -> Result<(), SubsystemError>;
    async fn start_discovery(&self) -> Result<(), SubsystemError>;
    async fn stop_discovery(&self) -> Result<(), SubsystemError>;
    async fn start_ranging(&self, region: &RangingRegion) -> Result<(), SubsystemError>;
    async fn stop_ranging(&self, region: &RangingRegion) -> Result<(), SubsystemError>;
    fn devices_discovered(&self) -> broadcast::Receiver<DevicesDiscovered>;
    fn beacons_ranged(&self) -> broadcast::Receiver<BeaconsRanged>;
}
