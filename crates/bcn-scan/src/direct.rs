//! Direct radio path: scan for peripherals by service UUID, keep a
//! de-duplicated device list, connect to one on request.
//!
//! Independent of the beacon subsystems and the resolver.

use std::sync::Arc;

use bcn_config::DirectScanConfig;
use bcn_schemas::DiscoveredDevice;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::RadioError;
use crate::port::{RadioApi, RadioCallback, ScanOptions};

pub struct DirectScanner {
    radio: Arc<dyn RadioApi>,
    service_filters: Vec<String>,
    callbacks: Option<mpsc::UnboundedReceiver<RadioCallback>>,
    devices: Vec<DiscoveredDevice>,
    connected: Option<DiscoveredDevice>,
    last_error: Option<RadioError>,
}

impl DirectScanner {
    pub fn new(radio: Arc<dyn RadioApi>, service_filters: Vec<String>) -> Self {
        Self {
            radio,
            service_filters,
            callbacks: None,
            devices: Vec::new(),
            connected: None,
            last_error: None,
        }
    }

    /// Scanner filtered on the configured `direct.service_uuids`.
    pub fn from_config(radio: Arc<dyn RadioApi>, config: &DirectScanConfig) -> Self {
        Self::new(radio, config.service_uuids.clone())
    }

    pub fn service_filters(&self) -> &[String] {
        &self.service_filters
    }

    pub fn is_scanning(&self) -> bool {
        self.callbacks.is_some()
    }

    /// Discovered devices in first-seen order, one entry per id.
    pub fn devices(&self) -> &[DiscoveredDevice] {
        &self.devices
    }

    pub fn connected_device(&self) -> Option<&DiscoveredDevice> {
        self.connected.as_ref()
    }

    pub fn last_error(&self) -> Option<&RadioError> {
        self.last_error.as_ref()
    }

    pub fn scan_for_peripherals(&mut self) -> Result<(), RadioError> {
        if self.is_scanning() {
            return Ok(());
        }
        let rx = self
            .radio
            .start_device_scan(&self.service_filters, ScanOptions::default())
            .map_err(|e| {
                error!(error = %e, "device scan failed to start");
                e
            })?;
        self.callbacks = Some(rx);
        info!(filters = ?self.service_filters, "device scan started");
        Ok(())
    }

    /// Wait for one callback and record it. `false` once the scan has ended.
    pub async fn pump(&mut self) -> bool {
        let Some(rx) = self.callbacks.as_mut() else {
            return false;
        };
        match rx.recv().await {
            Some(cb) => {
                self.record(cb);
                self.is_scanning()
            }
            None => {
                self.callbacks = None;
                false
            }
        }
    }

    /// Record every callback already delivered, without waiting. Returns the
    /// number of new devices.
    pub fn drain_pending(&mut self) -> usize {
        let mut added = 0;
        while let Some(rx) = self.callbacks.as_mut() {
            match rx.try_recv() {
                Ok(cb) => {
                    if self.record(cb) {
                        added += 1;
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.callbacks = None;
                }
            }
        }
        added
    }

    /// Connect, remember the device, discover its services, then stop the
    /// device scan.
    pub async fn connect_to_device(&mut self, device_id: &str) -> Result<(), RadioError> {
        let device = self.radio.connect_to_device(device_id).await.map_err(|e| {
            error!(device_id, error = %e, "connect failed");
            e
        })?;
        info!(device_id, name = ?device.name, "device connected");
        self.connected = Some(device);

        self.radio
            .discover_services_and_characteristics(device_id)
            .await
            .map_err(|e| {
                error!(device_id, error = %e, "service discovery failed");
                e
            })?;

        self.stop();
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.callbacks.take().is_some() {
            self.radio.stop_device_scan();
            info!(devices = self.devices.len(), "device scan stopped");
        }
    }

    fn record(&mut self, cb: RadioCallback) -> bool {
        match cb {
            Ok(device) => {
                if self.devices.iter().any(|d| d.id == device.id) {
                    return false;
                }
                debug!(device_id = %device.id, rssi = ?device.rssi, "device discovered");
                self.devices.push(device);
                true
            }
            Err(e) if e.is_unrecoverable() => {
                error!(error = %e, "radio unavailable; device scan abandoned");
                self.callbacks = None;
                self.last_error = Some(e);
                false
            }
            Err(e) => {
                warn!(error = %e, "device scan callback error");
                self.last_error = Some(e);
                false
            }
        }
    }
}
