use std::sync::Arc;

use async_trait::async_trait;
use bcn_schemas::RangingRegion;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{ScanEvent, ScanStarted, ScanStrategy, StrategyKind, Subscription};
use crate::error::SubsystemError;
use crate::port::RangingBeaconSubsystem;

/// iOS: `init → start_discovery → start_ranging(region)`.
///
/// Both `didDiscoverDevices` and `didRangeBeacons` are listened to, but only
/// ranged batches reach the resolver.
pub struct RangingStrategy {
    subsystem: Arc<dyn RangingBeaconSubsystem>,
    region: RangingRegion,
}

impl RangingStrategy {
    pub fn new(subsystem: Arc<dyn RangingBeaconSubsystem>, region: RangingRegion) -> Self {
        Self { subsystem, region }
    }

    pub fn region(&self) -> &RangingRegion {
        &self.region
    }
}

#[async_trait]
impl ScanStrategy for RangingStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ranging
    }

    async fn start(&self) -> Result<ScanStarted, SubsystemError> {
        self.subsystem.init().await?;
        self.subsystem.start_discovery().await?;
        self.subsystem.start_ranging(&self.region).await?;
        info!(
            region = %self.region.identifier,
            uuid = %self.region.uuid,
            "beacon ranging started"
        );
        Ok(ScanStarted::new(self.kind()))
    }

    /// Ranging is stopped first; discovery is stopped even if that fails.
    async fn stop(&self) -> Result<(), SubsystemError> {
        let ranging = self.subsystem.stop_ranging(&self.region).await;
        if let Err(e) = &ranging {
            warn!(error = %e, "stop ranging failed");
        }
        self.subsystem.stop_discovery().await?;
        ranging?;
        info!(region = %self.region.identifier, "beacon ranging stopped");
        Ok(())
    }

    fn subscribe(&self, _started: &ScanStarted, queue: &mpsc::UnboundedSender<ScanEvent>) -> Vec<Subscription> {
        vec![
            Subscription::forward(
                "didDiscoverDevices",
                self.subsystem.devices_discovered(),
                queue.clone(),
                ScanEvent::DevicesDiscovered,
            ),
            Subscription::forward(
                "didRangeBeacons",
                self.subsystem.beacons_ranged(),
                queue.clone(),
                ScanEvent::BeaconsRanged,
            ),
        ]
    }
}
