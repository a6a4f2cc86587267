//! Error types for the scan lifecycle and the direct radio path.

use bcn_schemas::HostPlatform;
use thiserror::Error;

use crate::strategy::StrategyKind;

/// A native beacon-subsystem call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {reason}")]
pub struct SubsystemError {
    pub operation: &'static str,
    pub reason: String,
}

impl SubsystemError {
    pub fn new<S: Into<String>>(operation: &'static str, reason: S) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }
}

/// Lifecycle failures surfaced to the UI as user-actionable prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The user declined (or the permission API failed). Recoverable through
    /// an explicit retry.
    #[error("required permissions were not granted")]
    PermissionDenied,

    #[error("scan setup failed: {0}")]
    SubsystemSetup(SubsystemError),

    #[error("scan stop failed: {0}")]
    SubsystemStop(SubsystemError),

    #[error("{platform:?} cannot use the {backend:?} scanning strategy")]
    StrategyMismatch {
        platform: HostPlatform,
        backend: StrategyKind,
    },

    #[error("scan controller has been disposed")]
    Disposed,
}

/// Failures of the low-level radio scan path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadioError {
    #[error("device scan failed: {0}")]
    ScanFailed(String),

    #[error("connection to {device_id} failed: {reason}")]
    ConnectFailed { device_id: String, reason: String },

    #[error("service discovery on {device_id} failed: {reason}")]
    DiscoveryFailed { device_id: String, reason: String },

    /// Radio is unusable (powered off, unsupported, unauthorized). Reported,
    /// never retried automatically.
    #[error("radio unavailable: {0}")]
    Unrecoverable(String),
}

impl RadioError {
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, RadioError::Unrecoverable(_))
    }
}
