//! Static beacon identity allow-lists.
//!
//! These are build-time constants, not configuration: changing which beacons
//! count as a store or a seat is a code change.

use bcn_schemas::{IdentitySet, RangingRegion};

/// Store beacons: `(proximity UUID, order-form title)`.
pub const STORE_IDENTIFIERS: &[(&str, &str)] =
    &[("fda50693-a4e2-4fb1-afcf-c6eb07647825", "Identit Store order form")];

/// Location (seat / pickup spot) beacons.
pub const LOCATION_IDENTIFIERS: &[&str] = &["a4826de4-1ea9-4e47-8321-cb7a61e4667e"];

/// Service UUID filter for the direct radio scan path.
pub const DEFAULT_SERVICE_UUID: &str = "FDA50693-A4E2-4FB1-AFCF-C6EB07647825";

pub const DEFAULT_RANGING_UUID: &str = "A4826DE4-1EA9-4E47-8321-CB7A61E4667E";
pub const DEFAULT_RANGING_MAJOR: u16 = 1;
pub const DEFAULT_RANGING_MINOR: u16 = 34;

pub fn store_identity_set() -> IdentitySet {
    STORE_IDENTIFIERS
        .iter()
        .fold(IdentitySet::new("store"), |set, (id, label)| {
            set.with_labeled_member(*id, *label)
        })
}

pub fn location_identity_set() -> IdentitySet {
    LOCATION_IDENTIFIERS
        .iter()
        .fold(IdentitySet::new("location"), |set, id| set.with_member(*id))
}

pub fn default_ranging_region() -> RangingRegion {
    RangingRegion {
        identifier: String::new(),
        uuid: DEFAULT_RANGING_UUID.to_string(),
        major: Some(DEFAULT_RANGING_MAJOR),
        minor: Some(DEFAULT_RANGING_MINOR),
    }
}
