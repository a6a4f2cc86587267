//! Scripted fakes and fixtures for scenario tests and offline replay.
//!
//! Nothing here talks to a radio. Every fake records the calls it receives
//! in a [`CallJournal`] so tests can assert on ordering across collaborators.

use anyhow::{Context, Result};
use bcn_engine::ResolverSets;
use bcn_schemas::{BeaconId, BeaconObservation, ProximityClass, RawBeacon};
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::sync::{Arc, Mutex};

mod permissions;
mod radio;
mod replay;
mod rig;
mod subsystems;

pub use permissions::FakePermissionApi;
pub use radio::FakeRadio;
pub use replay::{replay_batches, ReplayReport, ReplayStep};
pub use rig::{ranging_rig, region_rig, RangingRig, RegionRig};
pub use subsystems::{FakeRangingSubsystem, FakeRegionSubsystem};

/// Shared, ordered log of calls made on fakes.
#[derive(Clone, Debug, Default)]
pub struct CallJournal(Arc<Mutex<Vec<String>>>);

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<S: Into<String>>(&self, call: S) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call.into());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

/// Fixed instant used for every fixture observation.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default()
}

pub fn obs(id: &str, rssi: i32, proximity: ProximityClass) -> BeaconObservation {
    BeaconObservation {
        identifier: BeaconId::new(id),
        major: 1,
        minor: 0,
        signal_strength: rssi,
        proximity,
        accuracy: None,
        display_name: None,
        observed_at: fixture_time(),
    }
}

/// Shipped store beacon identifier.
pub fn store_id() -> &'static str {
    bcn_config::identities::STORE_IDENTIFIERS[0].0
}

/// Shipped location beacon identifier.
pub fn location_id() -> &'static str {
    bcn_config::identities::LOCATION_IDENTIFIERS[0]
}

/// Resolver sets used by the shipped app.
pub fn shipped_sets() -> ResolverSets {
    ResolverSets::new(
        bcn_config::identities::store_identity_set(),
        bcn_config::identities::location_identity_set(),
    )
}

/// Parse one recorded batch: a JSON array of native beacon records.
pub fn parse_batch_json(s: &str) -> Result<Vec<BeaconObservation>> {
    let raw: Vec<RawBeacon> = serde_json::from_str(s).context("parse beacon batch json")?;
    Ok(raw.into_iter().map(RawBeacon::into_observation).collect())
}

/// Parse a recording: a JSON array of batches.
pub fn parse_batches_json(s: &str) -> Result<Vec<Vec<BeaconObservation>>> {
    let raw: Vec<Vec<RawBeacon>> = serde_json::from_str(s).context("parse beacon batches json")?;
    Ok(raw
        .into_iter()
        .map(|batch| batch.into_iter().map(RawBeacon::into_observation).collect())
        .collect())
}

pub fn load_batch_json(path: &str) -> Result<Vec<BeaconObservation>> {
    let s = fs::read_to_string(path).with_context(|| format!("read batch: {path}"))?;
    parse_batch_json(&s)
}

pub fn load_batches_json(path: &str) -> Result<Vec<Vec<BeaconObservation>>> {
    let s = fs::read_to_string(path).with_context(|| format!("read batches: {path}"))?;
    parse_batches_json(&s)
}
