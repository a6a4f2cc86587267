//! Scanning strategies.
//!
//! A strategy owns the native setup sequence for one subsystem flavour and
//! knows which event streams feed the resolver. Listeners can only be
//! attached with a [`ScanStarted`] token, and only `start()` in this crate
//! can mint one, so subscriptions never precede a completed setup.

mod ranging;
mod region_event;
mod subscription;

use std::sync::Arc;

use async_trait::async_trait;
use bcn_schemas::{BeaconObservation, HostPlatform, RangingRegion};
use tokio::sync::mpsc;

use crate::error::{ScanError, SubsystemError};
use crate::port::{BeaconsRanged, BeaconsUpdated, DevicesDiscovered, RangingBeaconSubsystem, RegionBeaconSubsystem};

pub use ranging::RangingStrategy;
pub use region_event::RegionEventStrategy;
pub use subscription::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// `connect → start_scanning`, snapshots via `beaconsDidUpdate`.
    RegionEvent,
    /// `init → start_discovery → start_ranging`, snapshots via `didRangeBeacons`.
    Ranging,
}

impl StrategyKind {
    pub fn for_platform(platform: HostPlatform) -> Self {
        match platform {
            HostPlatform::Android { .. } => StrategyKind::RegionEvent,
            HostPlatform::Ios => StrategyKind::Ranging,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RegionEvent => "region_event",
            StrategyKind::Ranging => "ranging",
        }
    }
}

/// Proof that a strategy finished its setup sequence.
#[derive(Debug)]
pub struct ScanStarted {
    kind: StrategyKind,
}

impl ScanStarted {
    pub(crate) fn new(kind: StrategyKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }
}

/// Everything that arrives on the controller's queue.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    BeaconsUpdated(BeaconsUpdated),
    BeaconsRanged(BeaconsRanged),
    DevicesDiscovered(DevicesDiscovered),
}

impl ScanEvent {
    /// Native event name, for logs.
    pub fn source(&self) -> &'static str {
        match self {
            ScanEvent::BeaconsUpdated(_) => "beaconsDidUpdate",
            ScanEvent::BeaconsRanged(_) => "didRangeBeacons",
            ScanEvent::DevicesDiscovered(_) => "didDiscoverDevices",
        }
    }

    /// The snapshot to feed the resolver, or `None` for events that are only
    /// observed.
    pub fn resolution_batch(&self) -> Option<&[BeaconObservation]> {
        match self {
            ScanEvent::BeaconsUpdated(e) => Some(&e.beacons),
            ScanEvent::BeaconsRanged(e) => Some(&e.beacons),
            ScanEvent::DevicesDiscovered(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ScanEvent::BeaconsUpdated(e) => e.beacons.len(),
            ScanEvent::BeaconsRanged(e) => e.beacons.len(),
            ScanEvent::DevicesDiscovered(e) => e.beacons.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
pub trait ScanStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Run the setup sequence. Each step is awaited before the next; the
    /// first failure aborts the rest.
    async fn start(&self) -> Result<ScanStarted, SubsystemError>;

    async fn stop(&self) -> Result<(), SubsystemError>;

    /// Attach forwarders from every native stream this strategy listens to
    /// onto `queue`. Must be called from within a tokio runtime.
    fn subscribe(&self, started: &ScanStarted, queue: &mpsc::UnboundedSender<ScanEvent>) -> Vec<Subscription>;
}

/// Native subsystem handed to [`select_strategy`].
#[derive(Clone)]
pub enum BeaconBackend {
    RegionEvent(Arc<dyn RegionBeaconSubsystem>),
    Ranging {
        subsystem: Arc<dyn RangingBeaconSubsystem>,
        region: RangingRegion,
    },
}

impl BeaconBackend {
    pub fn kind(&self) -> StrategyKind {
        match self {
            BeaconBackend::RegionEvent(_) => StrategyKind::RegionEvent,
            BeaconBackend::Ranging { .. } => StrategyKind::Ranging,
        }
    }
}

/// Pick the strategy for `platform`. The backend must be the one that
/// platform ships.
pub fn select_strategy(platform: HostPlatform, backend: BeaconBackend) -> Result<Box<dyn ScanStrategy>, ScanError> {
    let wanted = StrategyKind::for_platform(platform);
    if backend.kind() != wanted {
        return Err(ScanError::StrategyMismatch {
            platform,
            backend: backend.kind(),
        });
    }

    Ok(match backend {
        BeaconBackend::RegionEvent(subsystem) => Box::new(RegionEventStrategy::new(subsystem)),
        BeaconBackend::Ranging { subsystem, region } => Box::new(RangingStrategy::new(subsystem, region)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcn_schemas::RegionInfo;

    #[test]
    fn platform_picks_strategy() {
        assert_eq!(
            StrategyKind::for_platform(HostPlatform::Android { api_level: 28 }),
            StrategyKind::RegionEvent
        );
        assert_eq!(StrategyKind::for_platform(HostPlatform::Ios), StrategyKind::Ranging);
    }

    #[test]
    fn discovery_events_carry_no_resolution_batch() {
        let discovered = ScanEvent::DevicesDiscovered(DevicesDiscovered { beacons: vec![] });
        assert!(discovered.resolution_batch().is_none());

        let ranged = ScanEvent::BeaconsRanged(BeaconsRanged {
            beacons: vec![],
            region: RegionInfo::default(),
        });
        assert_eq!(ranged.resolution_batch().map(|b| b.len()), Some(0));
        assert_eq!(ranged.source(), "didRangeBeacons");
    }
}
