//! bcn-schemas
//!
//! Shared data model for beacon proximity resolution: observations as they
//! arrive from the native scan layer, the identity sets they are classified
//! against, and the resolved proximity handed to the UI.
//!
//! Plain data only. No IO, no clock reads.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable beacon identifier (proximity UUID or region key).
///
/// Normalized on construction (trimmed, ASCII-lowercased) so identifiers
/// reported as `FDA50693-…` by one platform and `fda50693-…` by another
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BeaconId(String);

impl BeaconId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BeaconId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for BeaconId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<BeaconId> for String {
    fn from(id: BeaconId) -> Self {
        id.0
    }
}

impl fmt::Display for BeaconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of an identity set (e.g. `"store"`, `"location"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetName(pub String);

impl SetName {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// Categorical distance estimate derived by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProximityClass {
    Immediate,
    Near,
    Far,
    Unknown,
}

impl ProximityClass {
    /// Lenient parse of the native proximity string. Anything unrecognised
    /// is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMMEDIATE" => ProximityClass::Immediate,
            "NEAR" => ProximityClass::Near,
            "FAR" => ProximityClass::Far,
            _ => ProximityClass::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProximityClass::Immediate => "IMMEDIATE",
            ProximityClass::Near => "NEAR",
            ProximityClass::Far => "FAR",
            ProximityClass::Unknown => "UNKNOWN",
        }
    }
}

/// One sighting of a beacon within a single scan callback batch.
///
/// Never mutated; each batch supersedes the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconObservation {
    pub identifier: BeaconId,
    pub major: u16,
    pub minor: u16,
    /// RSSI in dBm. Higher (less negative) is closer.
    pub signal_strength: i32,
    pub proximity: ProximityClass,
    /// Native distance estimate in metres, when the platform reports one.
    pub accuracy: Option<f64>,
    pub display_name: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// Beacon as emitted by the native event layer and stored in replay files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBeacon {
    pub uuid: String,
    #[serde(default)]
    pub major: u16,
    #[serde(default)]
    pub minor: u16,
    pub rssi: i32,
    #[serde(default)]
    pub proximity: String,
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub store_name: Option<String>,
}

impl RawBeacon {
    pub fn into_observation(self) -> BeaconObservation {
        let observed_at = Utc
            .timestamp_millis_opt(self.timestamp)
            .single()
            .unwrap_or_default();

        BeaconObservation {
            identifier: BeaconId::new(&self.uuid),
            major: self.major,
            minor: self.minor,
            signal_strength: self.rssi,
            proximity: ProximityClass::parse(&self.proximity),
            accuracy: self.accuracy,
            display_name: self.store_name,
            observed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Identity sets
// ---------------------------------------------------------------------------

/// A named allow-list of beacon identifiers defining one semantic category.
///
/// Members may carry a label shown to the user once that beacon is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySet {
    pub name: SetName,
    members: BTreeMap<BeaconId, Option<String>>,
}

impl IdentitySet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: SetName::new(name),
            members: BTreeMap::new(),
        }
    }

    pub fn with_member<I: Into<BeaconId>>(mut self, id: I) -> Self {
        self.members.insert(id.into(), None);
        self
    }

    pub fn with_labeled_member<I: Into<BeaconId>, L: Into<String>>(mut self, id: I, label: L) -> Self {
        self.members.insert(id.into(), Some(label.into()));
        self
    }

    pub fn contains(&self, id: &BeaconId) -> bool {
        self.members.contains_key(id)
    }

    pub fn label_for(&self, id: &BeaconId) -> Option<&str> {
        self.members.get(id).and_then(|l| l.as_deref())
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &BeaconId> {
        self.members.keys()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolved proximity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanState {
    #[default]
    Scanning,
    StoreResolved,
    LocationResolved,
}

impl ScanState {
    pub fn is_post_discovery(&self) -> bool {
        !matches!(self, ScanState::Scanning)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Scanning => "SCANNING",
            ScanState::StoreResolved => "STORE_RESOLVED",
            ScanState::LocationResolved => "LOCATION_RESOLVED",
        }
    }
}

/// The beacon committed for one identity set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub identifier: BeaconId,
    pub major: u16,
    pub minor: u16,
    pub label: Option<String>,
}

impl ResolvedIdentity {
    /// Identity-set label wins over the beacon's own display name.
    pub fn from_observation(obs: &BeaconObservation, set_label: Option<&str>) -> Self {
        Self {
            identifier: obs.identifier.clone(),
            major: obs.major,
            minor: obs.minor,
            label: set_label
                .map(str::to_string)
                .or_else(|| obs.display_name.clone()),
        }
    }
}

/// Engine output rendered by the UI.
///
/// `location` is only ever set while `scan_state` is `LocationResolved`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedProximity {
    pub scan_state: ScanState,
    pub store: Option<ResolvedIdentity>,
    pub location: Option<ResolvedIdentity>,
}

impl ResolvedProximity {
    pub fn scanning() -> Self {
        Self::default()
    }

    /// Derive the state from what is held, so the invariant cannot drift.
    pub fn from_parts(store: Option<ResolvedIdentity>, location: Option<ResolvedIdentity>) -> Self {
        let scan_state = if location.is_some() {
            ScanState::LocationResolved
        } else if store.is_some() {
            ScanState::StoreResolved
        } else {
            ScanState::Scanning
        };
        Self {
            scan_state,
            store,
            location,
        }
    }
}

// ---------------------------------------------------------------------------
// Host platform
// ---------------------------------------------------------------------------

/// Host OS the engine runs on. Decides the permission model and which
/// scanning strategy is used; fixed for the life of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "os", rename_all = "lowercase")]
pub enum HostPlatform {
    Android { api_level: u32 },
    Ios,
}

impl HostPlatform {
    pub fn name(&self) -> &'static str {
        match self {
            HostPlatform::Android { .. } => "android",
            HostPlatform::Ios => "ios",
        }
    }
}

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Region metadata delivered alongside a region-event batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionInfo {
    pub identifier: String,
    pub uuid: Option<String>,
    pub major: Option<u16>,
    pub minor: Option<u16>,
}

/// Region handed to the ranging subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangingRegion {
    #[serde(default)]
    pub identifier: String,
    pub uuid: String,
    pub major: Option<u16>,
    pub minor: Option<u16>,
}

impl From<&RangingRegion> for RegionInfo {
    fn from(r: &RangingRegion) -> Self {
        Self {
            identifier: r.identifier.clone(),
            uuid: Some(r.uuid.clone()),
            major: r.major,
            minor: r.minor,
        }
    }
}

// ---------------------------------------------------------------------------
// Direct radio path
// ---------------------------------------------------------------------------

/// A peripheral reported by the low-level radio scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub id: String,
    pub name: Option<String>,
    pub rssi: Option<i32>,
    #[serde(default)]
    pub service_uuids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beacon_id_is_case_insensitive() {
        let a = BeaconId::new("FDA50693-A4E2-4FB1-AFCF-C6EB07647825");
        let b = BeaconId::new(" fda50693-a4e2-4fb1-afcf-c6eb07647825 ");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "fda50693-a4e2-4fb1-afcf-c6eb07647825");
    }

    #[test]
    fn proximity_parse_is_lenient() {
        assert_eq!(ProximityClass::parse("IMMEDIATE"), ProximityClass::Immediate);
        assert_eq!(ProximityClass::parse("near"), ProximityClass::Near);
        assert_eq!(ProximityClass::parse("Far"), ProximityClass::Far);
        assert_eq!(ProximityClass::parse(""), ProximityClass::Unknown);
        assert_eq!(ProximityClass::parse("bogus"), ProximityClass::Unknown);
    }

    #[test]
    fn raw_beacon_decodes_native_json_shape() {
        let raw: RawBeacon = serde_json::from_str(
            r#"{"uuid":"FDA50693-A4E2-4FB1-AFCF-C6EB07647825","major":10001,"minor":19641,
                "rssi":-61,"proximity":"NEAR","accuracy":1.8,"timestamp":1700000000000,
                "storeName":"front"}"#,
        )
        .unwrap();

        let obs = raw.into_observation();
        assert_eq!(obs.identifier.as_str(), "fda50693-a4e2-4fb1-afcf-c6eb07647825");
        assert_eq!(obs.signal_strength, -61);
        assert_eq!(obs.proximity, ProximityClass::Near);
        assert_eq!(obs.display_name.as_deref(), Some("front"));
        assert_eq!(obs.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn raw_beacon_with_missing_optional_fields() {
        let raw: RawBeacon = serde_json::from_str(r#"{"uuid":"abc","rssi":-90}"#).unwrap();
        let obs = raw.into_observation();
        assert_eq!(obs.proximity, ProximityClass::Unknown);
        assert_eq!(obs.observed_at, DateTime::<Utc>::default());
    }

    #[test]
    fn from_parts_derives_state() {
        let id = ResolvedIdentity {
            identifier: BeaconId::new("x"),
            major: 1,
            minor: 2,
            label: None,
        };
        assert_eq!(ResolvedProximity::from_parts(None, None).scan_state, ScanState::Scanning);
        assert_eq!(
            ResolvedProximity::from_parts(Some(id.clone()), None).scan_state,
            ScanState::StoreResolved
        );
        assert_eq!(
            ResolvedProximity::from_parts(Some(id.clone()), Some(id)).scan_state,
            ScanState::LocationResolved
        );
    }

    #[test]
    fn identity_set_label_lookup() {
        let set = IdentitySet::new("store").with_labeled_member("ABC", "Main St");
        assert!(set.contains(&BeaconId::new("abc")));
        assert_eq!(set.label_for(&BeaconId::new("abc")), Some("Main St"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn host_platform_names() {
        assert_eq!(HostPlatform::Android { api_level: 31 }.name(), "android");
        assert_eq!(HostPlatform::Ios.name(), "ios");
    }

    #[test]
    fn resolved_proximity_serializes_state_name() {
        let json = serde_json::to_value(ResolvedProximity::scanning()).unwrap();
        assert_eq!(json["scan_state"], "SCANNING");
    }
}
