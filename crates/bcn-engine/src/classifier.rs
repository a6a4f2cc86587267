use std::collections::BTreeMap;

use bcn_schemas::{BeaconObservation, IdentitySet, SetName};

/// Partition a batch into the configured identity sets.
///
/// Every set gets an entry, empty when nothing in the batch matches. Sets are
/// independent: an observation lands in each set that lists its identifier.
/// Batch order is preserved within each set so the selector's first-seen tie
/// rule stays meaningful.
pub fn classify(
    batch: &[BeaconObservation],
    sets: &[IdentitySet],
) -> BTreeMap<SetName, Vec<BeaconObservation>> {
    let mut out: BTreeMap<SetName, Vec<BeaconObservation>> = BTreeMap::new();
    for set in sets {
        let members: Vec<BeaconObservation> = batch
            .iter()
            .filter(|obs| set.contains(&obs.identifier))
            .cloned()
            .collect();
        out.entry(set.name.clone()).or_default().extend(members);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcn_schemas::{BeaconId, ProximityClass};
    use chrono::{TimeZone, Utc};

    fn obs(id: &str, rssi: i32) -> BeaconObservation {
        BeaconObservation {
            identifier: BeaconId::new(id),
            major: 0,
            minor: 0,
            signal_strength: rssi,
            proximity: ProximityClass::Unknown,
            accuracy: None,
            display_name: None,
            observed_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn sets() -> Vec<IdentitySet> {
        vec![
            IdentitySet::new("store").with_member("S1"),
            IdentitySet::new("location").with_member("L1").with_member("L2"),
        ]
    }

    #[test]
    fn empty_batch_yields_empty_sets() {
        let out = classify(&[], &sets());
        assert_eq!(out.len(), 2);
        assert!(out.values().all(|v| v.is_empty()));
    }

    #[test]
    fn foreign_beacons_are_dropped() {
        let out = classify(&[obs("X9", -40), obs("s1", -70)], &sets());
        assert_eq!(out[&SetName::new("store")].len(), 1);
        assert!(out[&SetName::new("location")].is_empty());
    }

    #[test]
    fn observation_listed_in_two_sets_appears_in_both() {
        let sets = vec![
            IdentitySet::new("a").with_member("shared"),
            IdentitySet::new("b").with_member("shared"),
        ];
        let out = classify(&[obs("shared", -50)], &sets);
        assert_eq!(out[&SetName::new("a")].len(), 1);
        assert_eq!(out[&SetName::new("b")].len(), 1);
    }

    #[test]
    fn batch_order_is_preserved() {
        let batch = vec![obs("L2", -50), obs("L1", -40), obs("L2", -30)];
        let out = classify(&batch, &sets());
        let rssi: Vec<i32> = out[&SetName::new("location")]
            .iter()
            .map(|o| o.signal_strength)
            .collect();
        assert_eq!(rssi, vec![-50, -40, -30]);
    }
}
