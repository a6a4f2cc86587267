//! `bcn classify`: offline classification of one recorded batch.

use anyhow::Result;
use bcn_config::identities::{location_identity_set, store_identity_set};
use bcn_engine::{classify, select_nearest, ResolverSets};

pub fn classify_batch(path: &str) -> Result<()> {
    let batch = bcn_testkit::load_batch_json(path)?;
    let sets = ResolverSets::new(store_identity_set(), location_identity_set());

    println!("batch_len={}", batch.len());
    for (set, members) in classify(&batch, sets.as_slice()) {
        match select_nearest(&members) {
            Some(nearest) => println!(
                "set={} matches={} nearest={} signal_strength={} proximity={}",
                set.as_str(),
                members.len(),
                nearest.identifier,
                nearest.signal_strength,
                nearest.proximity.as_str()
            ),
            None => println!("set={} matches=0 nearest=none", set.as_str()),
        }
    }

    Ok(())
}
