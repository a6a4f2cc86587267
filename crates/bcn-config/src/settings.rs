//! Typed view of the merged configuration document.

use anyhow::{bail, Context, Result};
use bcn_schemas::{HostPlatform, RangingRegion};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Android,
    Ios,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Android => "ANDROID",
            PlatformKind::Ios => "IOS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    pub platform: PlatformKind,
    /// Only read on Android; 31+ switches to the split Bluetooth permissions.
    #[serde(default = "default_api_level")]
    pub android_api_level: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            platform: PlatformKind::Android,
            android_api_level: default_api_level(),
        }
    }
}

impl HostConfig {
    pub fn platform(&self) -> HostPlatform {
        match self.platform {
            PlatformKind::Android => HostPlatform::Android {
                api_level: self.android_api_level,
            },
            PlatformKind::Ios => HostPlatform::Ios,
        }
    }
}

fn default_api_level() -> u32 {
    31
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Stop the active scan once the store is resolved.
    #[serde(default = "default_true")]
    pub halt_on_resolve: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            halt_on_resolve: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangingConfig {
    #[serde(default = "identities::default_ranging_region")]
    pub region: RangingRegion,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            region: identities::default_ranging_region(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectScanConfig {
    #[serde(default = "default_service_uuids")]
    pub service_uuids: Vec<String>,
}

impl Default for DirectScanConfig {
    fn default() -> Self {
        Self {
            service_uuids: default_service_uuids(),
        }
    }
}

fn default_service_uuids() -> Vec<String> {
    vec![identities::DEFAULT_SERVICE_UUID.to_string()]
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProximityConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub ranging: RangingConfig,
    #[serde(default)]
    pub direct: DirectScanConfig,
}

impl ProximityConfig {
    pub fn from_json(v: &Value) -> Result<Self> {
        let cfg: ProximityConfig =
            serde_json::from_value(v.clone()).context("config does not match proximity schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// UUID-shaped fields must parse as UUIDs; the native layers reject
    /// anything else at runtime, long after startup. The ranging region is
    /// only read on iOS and only checked there.
    pub fn validate(&self) -> Result<()> {
        if self.host.platform == PlatformKind::Ios {
            uuid::Uuid::parse_str(&self.ranging.region.uuid).with_context(|| {
                format!(
                    "CONFIG_INVALID_UUID /ranging/region/uuid={}",
                    self.ranging.region.uuid
                )
            })?;
        }

        if self.direct.service_uuids.is_empty() {
            bail!("CONFIG_EMPTY /direct/service_uuids: at least one service UUID is required");
        }
        for (i, s) in self.direct.service_uuids.iter().enumerate() {
            uuid::Uuid::parse_str(s)
                .with_context(|| format!("CONFIG_INVALID_UUID /direct/service_uuids/{i}={s}"))?;
        }
        Ok(())
    }
}
