use bcn_schemas::{
    BeaconObservation, IdentitySet, ProximityClass, ResolvedIdentity, ResolvedProximity,
    ScanState, SetName,
};
use tracing::{debug, info};

use crate::{classify, select_nearest};

/// Set name the resolver gives its store allow-list.
pub const STORE_SET: &str = "store";
/// Set name the resolver gives its location (seat / pickup spot) allow-list.
pub const LOCATION_SET: &str = "location";

/// The two identity sets the resolver classifies against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverSets {
    /// `[store, location]`, in the order handed to the classifier.
    sets: [IdentitySet; 2],
}

impl ResolverSets {
    /// Incoming set names are replaced with [`STORE_SET`] / [`LOCATION_SET`]
    /// so the two never collide in the classifier output.
    pub fn new(mut store: IdentitySet, mut location: IdentitySet) -> Self {
        store.name = SetName::new(STORE_SET);
        location.name = SetName::new(LOCATION_SET);
        Self {
            sets: [store, location],
        }
    }

    pub fn store(&self) -> &IdentitySet {
        &self.sets[0]
    }

    pub fn location(&self) -> &IdentitySet {
        &self.sets[1]
    }

    pub fn as_slice(&self) -> &[IdentitySet] {
        &self.sets
    }
}

/// Result of applying one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub previous: ScanState,
    pub current: ResolvedProximity,
    /// A store identity was committed by this batch (first time only).
    pub store_committed: bool,
    /// The held location identity differs from the one before this batch.
    pub location_changed: bool,
}

impl ResolveOutcome {
    /// `Scanning` → any post-discovery state.
    pub fn entered_resolution(&self) -> bool {
        !self.previous.is_post_discovery() && self.current.scan_state.is_post_discovery()
    }

    pub fn state_changed(&self) -> bool {
        self.previous != self.current.scan_state
    }
}

/// State holder for the `SCANNING → STORE_RESOLVED → LOCATION_RESOLVED`
/// machine. Owned by the scan controller; replaced wholesale per batch.
#[derive(Clone, Debug)]
pub struct ProximityResolver {
    sets: ResolverSets,
    current: ResolvedProximity,
    batches_applied: u64,
}

impl ProximityResolver {
    pub fn new(sets: ResolverSets) -> Self {
        Self {
            sets,
            current: ResolvedProximity::scanning(),
            batches_applied: 0,
        }
    }

    pub fn current(&self) -> &ResolvedProximity {
        &self.current
    }

    pub fn sets(&self) -> &ResolverSets {
        &self.sets
    }

    pub fn batches_applied(&self) -> u64 {
        self.batches_applied
    }

    /// Drop everything and go back to `Scanning`.
    pub fn reset(&mut self) {
        info!(from = self.current.scan_state.as_str(), "proximity resolver reset");
        self.current = ResolvedProximity::scanning();
    }

    /// Evaluate one batch.
    ///
    /// 1. classify into store / location sets
    /// 2. store: nearest store beacon is committed once and kept thereafter
    /// 3. location: nearest location beacon is held only while `IMMEDIATE`
    ///
    /// A batch with no observations at all carries no evidence and leaves the
    /// state untouched.
    pub fn apply(&mut self, batch: &[BeaconObservation]) -> ResolveOutcome {
        let previous = self.current.scan_state;

        if batch.is_empty() {
            debug!("empty batch; state unchanged");
            return ResolveOutcome {
                previous,
                current: self.current.clone(),
                store_committed: false,
                location_changed: false,
            };
        }

        self.batches_applied += 1;

        let classified = classify(batch, self.sets.as_slice());
        let store_obs = classified
            .get(&SetName::new(STORE_SET))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let location_obs = classified
            .get(&SetName::new(LOCATION_SET))
            .map(Vec::as_slice)
            .unwrap_or_default();

        debug!(
            batch_len = batch.len(),
            store_matches = store_obs.len(),
            location_matches = location_obs.len(),
            "classified batch"
        );

        let mut store = self.current.store.clone();
        let mut store_committed = false;
        if store.is_none() {
            if let Some(nearest) = select_nearest(store_obs) {
                if self.sets.store().contains(&nearest.identifier) {
                    let label = self.sets.store().label_for(&nearest.identifier);
                    store = Some(ResolvedIdentity::from_observation(nearest, label));
                    store_committed = true;
                }
            }
        }

        let location = select_nearest(location_obs)
            .filter(|nearest| nearest.proximity == ProximityClass::Immediate)
            .map(|nearest| {
                let label = self.sets.location().label_for(&nearest.identifier);
                ResolvedIdentity::from_observation(nearest, label)
            });
        let location_changed = location != self.current.location;

        self.current = ResolvedProximity::from_parts(store, location);

        let outcome = ResolveOutcome {
            previous,
            current: self.current.clone(),
            store_committed,
            location_changed,
        };

        if outcome.state_changed() {
            info!(
                from = previous.as_str(),
                to = self.current.scan_state.as_str(),
                store = ?self.current.store.as_ref().map(|s| s.identifier.as_str()),
                location = ?self.current.location.as_ref().map(|l| l.identifier.as_str()),
                "proximity state transition"
            );
        }

        outcome
    }
}
