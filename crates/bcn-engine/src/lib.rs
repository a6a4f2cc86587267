//! bcn-engine
//!
//! Beacon classification, nearest-beacon selection and proximity resolution.
//!
//! - Classification never fails: a set with no matches is an empty vector.
//! - Selection over an empty set is `None`, never a panic.
//! - Store resolution is sticky once committed; location resolution is
//!   re-evaluated on every non-empty batch.
//!
//! Pure deterministic logic. No IO, no wall-clock, no async. The scan
//! controller calls [`ProximityResolver::apply`] once per delivered batch.

mod classifier;
mod resolver;
mod selector;

pub use classifier::classify;
pub use resolver::{ProximityResolver, ResolveOutcome, ResolverSets, LOCATION_SET, STORE_SET};
pub use selector::select_nearest;
