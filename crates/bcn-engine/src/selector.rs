use bcn_schemas::BeaconObservation;

/// Reduce a set of observations to the strongest-signal one.
///
/// Only a strictly greater signal replaces the current winner, so on an
/// exact tie the first observation seen wins. Empty input yields `None`.
pub fn select_nearest(observations: &[BeaconObservation]) -> Option<&BeaconObservation> {
    let mut it = observations.iter();
    let mut best = it.next()?;
    for obs in it {
        if obs.signal_strength > best.signal_strength {
            best = obs;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcn_schemas::{BeaconId, ProximityClass};
    use chrono::{TimeZone, Utc};

    fn obs(id: &str, minor: u16, rssi: i32) -> BeaconObservation {
        BeaconObservation {
            identifier: BeaconId::new(id),
            major: 1,
            minor,
            signal_strength: rssi,
            proximity: ProximityClass::Near,
            accuracy: None,
            display_name: None,
            observed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn empty_input_is_none() {
        assert!(select_nearest(&[]).is_none());
    }

    #[test]
    fn single_element_wins() {
        let v = vec![obs("a", 1, -80)];
        assert_eq!(select_nearest(&v).unwrap().minor, 1);
    }

    #[test]
    fn strongest_signal_wins() {
        let v = vec![obs("a", 1, -80), obs("a", 2, -45), obs("a", 3, -60)];
        let best = select_nearest(&v).unwrap();
        assert_eq!(best.minor, 2);
        assert!(v.iter().all(|o| best.signal_strength >= o.signal_strength));
    }

    #[test]
    fn exact_tie_keeps_first_seen() {
        let v = vec![obs("a", 1, -70), obs("a", 2, -50), obs("a", 3, -50)];
        assert_eq!(select_nearest(&v).unwrap().minor, 2);
    }
}
