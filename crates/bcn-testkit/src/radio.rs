use async_trait::async_trait;
use bcn_scan::port::{RadioApi, RadioCallback, ScanOptions};
use bcn_scan::RadioError;
use bcn_schemas::DiscoveredDevice;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::CallJournal;

#[derive(Default)]
struct RadioState {
    scan: Option<mpsc::UnboundedSender<RadioCallback>>,
    last_filters: Vec<String>,
    advertised: HashMap<String, DiscoveredDevice>,
    scan_failure: Option<String>,
    connect_failures: HashMap<String, String>,
    discovery_failures: HashMap<String, String>,
}

/// Scripted radio. `advertise` pushes a device callback into the running
/// scan; connect looks the device up among everything advertised so far.
pub struct FakeRadio {
    journal: CallJournal,
    state: Mutex<RadioState>,
}

impl FakeRadio {
    pub fn new(journal: CallJournal) -> Self {
        Self {
            journal,
            state: Mutex::new(RadioState::default()),
        }
    }

    pub fn device(id: &str, name: &str, rssi: i32) -> DiscoveredDevice {
        DiscoveredDevice {
            id: id.to_string(),
            name: Some(name.to_string()),
            rssi: Some(rssi),
            service_uuids: Vec::new(),
        }
    }

    /// Deliver a device callback. `false` when no scan is running.
    pub fn advertise(&self, device: DiscoveredDevice) -> bool {
        let Ok(mut s) = self.state.lock() else {
            return false;
        };
        s.advertised.insert(device.id.clone(), device.clone());
        s.scan.as_ref().map(|tx| tx.send(Ok(device)).is_ok()).unwrap_or(false)
    }

    /// Deliver an error callback. `false` when no scan is running.
    pub fn report_error(&self, err: RadioError) -> bool {
        let Ok(s) = self.state.lock() else {
            return false;
        };
        s.scan.as_ref().map(|tx| tx.send(Err(err)).is_ok()).unwrap_or(false)
    }

    pub fn fail_scan(&self, reason: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.scan_failure = Some(reason.to_string());
        }
    }

    pub fn fail_connect(&self, device_id: &str, reason: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.connect_failures.insert(device_id.to_string(), reason.to_string());
        }
    }

    pub fn fail_discovery(&self, device_id: &str, reason: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.discovery_failures.insert(device_id.to_string(), reason.to_string());
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.state.lock().map(|s| s.scan.is_some()).unwrap_or(false)
    }

    pub fn last_filters(&self) -> Vec<String> {
        self.state.lock().map(|s| s.last_filters.clone()).unwrap_or_default()
    }

    fn poisoned() -> RadioError {
        RadioError::Unrecoverable("fake radio poisoned".to_string())
    }
}

#[async_trait]
impl RadioApi for FakeRadio {
    fn start_device_scan(
        &self,
        service_filters: &[String],
        _options: ScanOptions,
    ) -> Result<mpsc::UnboundedReceiver<RadioCallback>, RadioError> {
        self.journal.record("start_device_scan");
        let mut s = self.state.lock().map_err(|_| Self::poisoned())?;
        if let Some(reason) = s.scan_failure.clone() {
            return Err(RadioError::ScanFailed(reason));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        s.scan = Some(tx);
        s.last_filters = service_filters.to_vec();
        Ok(rx)
    }

    fn stop_device_scan(&self) {
        self.journal.record("stop_device_scan");
        if let Ok(mut s) = self.state.lock() {
            s.scan = None;
        }
    }

    async fn connect_to_device(&self, device_id: &str) -> Result<DiscoveredDevice, RadioError> {
        self.journal.record("connect_to_device");
        let s = self.state.lock().map_err(|_| Self::poisoned())?;
        if let Some(reason) = s.connect_failures.get(device_id) {
            return Err(RadioError::ConnectFailed {
                device_id: device_id.to_string(),
                reason: reason.clone(),
            });
        }
        s.advertised.get(device_id).cloned().ok_or_else(|| RadioError::ConnectFailed {
            device_id: device_id.to_string(),
            reason: "device not in range".to_string(),
        })
    }

    async fn discover_services_and_characteristics(&self, device_id: &str) -> Result<(), RadioError> {
        self.journal.record("discover_services_and_characteristics");
        let s = self.state.lock().map_err(|_| Self::poisoned())?;
        match s.discovery_failures.get(device_id) {
            Some(reason) => Err(RadioError::DiscoveryFailed {
                device_id: device_id.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}
