//! bcn-config
//!
//! Layered YAML configuration for the proximity engine.
//!
//! Documents are merged in order (earlier = base, later = override), converted
//! to JSON, canonicalized and hashed so a replay can be tied to the exact
//! configuration it ran under. [`ProximityConfig`] is the typed view consumed
//! by the CLI; identity allow-lists are compile-time constants in
//! [`identities`] and are deliberately not part of the YAML surface.

pub mod consumption;
pub mod identities;
mod settings;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

pub use consumption::{report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};
pub use settings::{DirectScanConfig, HostConfig, PlatformKind, ProximityConfig, RangingConfig, ScanConfig};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view of the merged document; missing sections take defaults.
    pub fn typed(&self) -> Result<ProximityConfig> {
        ProximityConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::with_capacity(paths.len());
    for p in paths {
        let raw = fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml (layer {i})"))?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // A comment-only document parses as null.
        if v_json.is_null() {
            continue;
        }
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key-by-key; anything else in `b` replaces `a` outright
/// (arrays are not concatenated).
fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_overrides_earlier() {
        let loaded = load_layered_yaml_from_strings(&[
            "host:\n  platform: android\n  android_api_level: 30\n",
            "host:\n  android_api_level: 33\n",
        ])
        .unwrap();
        assert_eq!(loaded.config_json["host"]["platform"], "android");
        assert_eq!(loaded.config_json["host"]["android_api_level"], 33);
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let loaded = load_layered_yaml_from_strings(&[
            "direct:\n  service_uuids: [a, b]\n",
            "direct:\n  service_uuids: [c]\n",
        ])
        .unwrap();
        assert_eq!(loaded.config_json["direct"]["service_uuids"], serde_json::json!(["c"]));
    }

    #[test]
    fn empty_layer_is_ignored() {
        let a = load_layered_yaml_from_strings(&["scan:\n  halt_on_resolve: false\n"]).unwrap();
        let b = load_layered_yaml_from_strings(&["scan:\n  halt_on_resolve: false\n", ""]).unwrap();
        assert_eq!(a.config_hash, b.config_hash);
    }

    #[test]
    fn invalid_yaml_names_the_layer() {
        let err = load_layered_yaml_from_strings(&["ok: 1\n", "host: [unclosed\n"]).unwrap_err();
        assert!(format!("{err:#}").contains("layer 1"));
    }

    #[test]
    fn hash_is_hex_sha256() {
        let loaded = load_layered_yaml_from_strings(&["host:\n  platform: ios\n"]).unwrap();
        assert_eq!(loaded.config_hash.len(), 64);
        assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
