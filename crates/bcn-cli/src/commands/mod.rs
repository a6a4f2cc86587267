//! Command handler modules for the `bcn` binary.
//!
//! Shared config loading lives here; command logic lives in the submodules.

pub mod classify;
pub mod replay;

use anyhow::Result;
use bcn_config::{report_unused_keys, LoadedConfig, ProximityConfig, UnusedKeyPolicy};

/// Load layered config, report keys the configured platform never reads,
/// and return the typed view.
pub fn load_config(config_paths: &[String], strict: bool) -> Result<(LoadedConfig, ProximityConfig)> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = bcn_config::load_layered_yaml(&path_refs)?;
    let typed = loaded.typed()?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(typed.host.platform, &loaded.config_json, policy)?;
    if !report.is_clean() {
        eprintln!(
            "WARN: CONFIG_UNUSED_KEYS platform={} unused_leaf_keys={}",
            report.platform,
            report.unused_leaf_pointers.len()
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            eprintln!("  unused={}", p);
        }
    }

    Ok((loaded, typed))
}
