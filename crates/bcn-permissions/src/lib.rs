//! bcn-permissions
//!
//! Permission gate that must pass before any beacon scan starts.
//!
//! | Host                       | Requested                                   |
//! |----------------------------|---------------------------------------------|
//! | Android, API level >= 31   | BLUETOOTH_SCAN, BLUETOOTH_CONNECT, ACCESS_FINE_LOCATION |
//! | Android, API level < 31    | ACCESS_FINE_LOCATION                        |
//! | iOS                        | nothing (no runtime request model)          |
//!
//! The gate never returns an error: a denial and a failing permission API
//! both collapse to `false`. Retrying is the caller's decision.

use async_trait::async_trait;
use bcn_schemas::HostPlatform;
use thiserror::Error;
use tracing::{info, warn};

/// First Android API level with the split Bluetooth runtime permissions.
pub const SPLIT_BLUETOOTH_PERMISSIONS_API_LEVEL: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    BluetoothScan,
    BluetoothConnect,
    AccessFineLocation,
}

impl PermissionKind {
    /// Platform permission string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::BluetoothScan => "android.permission.BLUETOOTH_SCAN",
            PermissionKind::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
            PermissionKind::AccessFineLocation => "android.permission.ACCESS_FINE_LOCATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("permission request for {kind:?} failed: {reason}")]
    RequestFailed { kind: PermissionKind, reason: String },
}

/// Host permission API. One call shows at most one system dialog.
#[async_trait]
pub trait PermissionApi: Send + Sync {
    async fn request_permission(&self, kind: PermissionKind) -> Result<PermissionStatus, PermissionError>;
}

/// Permissions `platform` needs before scanning; empty when the platform
/// has no runtime request model.
pub fn required_permissions(platform: HostPlatform) -> &'static [PermissionKind] {
    match platform {
        HostPlatform::Android { api_level } if api_level >= SPLIT_BLUETOOTH_PERMISSIONS_API_LEVEL => &[
            PermissionKind::BluetoothScan,
            PermissionKind::BluetoothConnect,
            PermissionKind::AccessFineLocation,
        ],
        HostPlatform::Android { .. } => &[PermissionKind::AccessFineLocation],
        HostPlatform::Ios => &[],
    }
}

pub struct PermissionGate {
    platform: HostPlatform,
    api: Box<dyn PermissionApi>,
}

impl PermissionGate {
    pub fn new(platform: HostPlatform, api: Box<dyn PermissionApi>) -> Self {
        Self { platform, api }
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    pub fn required_permissions(&self) -> &'static [PermissionKind] {
        required_permissions(self.platform)
    }

    /// Request everything the platform needs; `true` only if all granted.
    ///
    /// Every required permission is requested even after a denial so the
    /// user sees each dialog once per attempt.
    pub async fn request_required_permissions(&self) -> bool {
        let required = self.required_permissions();
        if required.is_empty() {
            return true;
        }

        let mut all_granted = true;
        for kind in required {
            let granted = match self.api.request_permission(*kind).await {
                Ok(PermissionStatus::Granted) => true,
                Ok(PermissionStatus::Denied) => false,
                Err(e) => {
                    warn!(permission = kind.as_str(), error = %e, "permission api failed; treating as denied");
                    false
                }
            };
            info!(permission = kind.as_str(), granted, "permission request answered");
            all_granted &= granted;
        }

        all_granted
    }
}
