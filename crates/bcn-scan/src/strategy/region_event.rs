use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use super::{ScanEvent, ScanStarted, ScanStrategy, StrategyKind, Subscription};
use crate::error::SubsystemError;
use crate::port::RegionBeaconSubsystem;

/// Android: `connect`, then `start_scanning`; resolves from `beaconsDidUpdate`.
pub struct RegionEventStrategy {
    subsystem: Arc<dyn RegionBeaconSubsystem>,
}

impl RegionEventStrategy {
    pub fn new(subsystem: Arc<dyn RegionBeaconSubsystem>) -> Self {
        Self { subsystem }
    }
}

#[async_trait]
impl ScanStrategy for RegionEventStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RegionEvent
    }

    async fn start(&self) -> Result<ScanStarted, SubsystemError> {
        self.subsystem.connect().await?;
        info!("beacon subsystem connected");
        self.subsystem.start_scanning().await?;
        info!("beacon scanning started");
        Ok(ScanStarted::new(self.kind()))
    }

    async fn stop(&self) -> Result<(), SubsystemError> {
        self.subsystem.stop_scanning().await?;
        info!("beacon scanning stopped");
        Ok(())
    }

    fn subscribe(&self, _started: &ScanStarted, queue: &mpsc::UnboundedSender<ScanEvent>) -> Vec<Subscription> {
        vec![Subscription::forward(
            "beaconsDidUpdate",
            self.subsystem.beacons_updated(),
            queue.clone(),
            ScanEvent::BeaconsUpdated,
        )]
    }
}
