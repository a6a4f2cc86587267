use async_trait::async_trait;
use bcn_schemas::DiscoveredDevice;
use tokio::sync::mpsc;

use crate::error::RadioError;

/// One device-scan callback: either a device or an error, never both.
pub type RadioCallback = Result<DiscoveredDevice, RadioError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Ask the radio to report repeat advertisements of the same device.
    pub allow_duplicates: bool,
}

/// Low-level radio scan API, independent of the beacon subsystems.
#[async_trait]
pub trait RadioApi: Send + Sync {
    /// Start scanning for peripherals advertising any of `service_filters`.
    /// Callbacks arrive on the returned receiver until the scan is stopped.
    fn start_device_scan(
        &self,
        service_filters: &[String],
        options: ScanOptions,
    ) -> Result<mpsc::UnboundedReceiver<RadioCallback>, RadioError>;

    fn stop_device_scan(&self);

    async fn connect_to_device(&self, device_id: &str) -> Result<DiscoveredDevice, RadioError>;

    async fn discover_services_and_characteristics(&self, device_id: &str) -> Result<(), RadioError>;
}
