//! Config consumption map + unused-key guard.
//!
//! Each platform reads a different subset of the document: Android never
//! ranges a region, iOS has no API-level permission split. A key that the
//! selected platform never reads is almost always a mistake in a layer, so it
//! is reported (or rejected, under [`UnusedKeyPolicy::Fail`]).
//!
//! Consumed entries are JSON-pointer prefixes: `/ranging` consumes
//! `/ranging/region/uuid`, but `/scan/halt` does not consume `/scan/halt_on_resolve`.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::PlatformKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub platform: String,
    /// Sorted, unique.
    pub consumed_prefixes: Vec<String>,
    /// Sorted, unique.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Pointers actually read by the engine when running on `platform`.
pub fn consumed_pointers_for_platform(platform: PlatformKind) -> &'static [&'static str] {
    match platform {
        PlatformKind::Android => &[
            "/host/platform",
            "/host/android_api_level",
            "/scan/halt_on_resolve",
            "/direct/service_uuids",
        ],
        PlatformKind::Ios => &[
            "/host/platform",
            "/scan/halt_on_resolve",
            "/ranging/region",
            "/direct/service_uuids",
        ],
    }
}

pub fn report_unused_keys(
    platform: PlatformKind,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = consumed_pointers_for_platform(platform)
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();

    let mut leaves = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let unused: BTreeSet<String> = leaves
        .into_iter()
        .filter(|leaf| !consumed.iter().any(|prefix| pointer_covers(prefix, leaf)))
        .collect();

    let report = UnusedKeyReport {
        platform: platform.as_str().to_string(),
        consumed_prefixes: consumed.into_iter().collect(),
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS (platform={}): {} unused config leaf key(s): {:?}",
            report.platform,
            report.unused_leaf_pointers.len(),
            report.unused_leaf_pointers.iter().take(12).collect::<Vec<_>>()
        );
    }

    Ok(report)
}

fn normalize_pointer(p: &str) -> String {
    let trimmed = p.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// `prefix` covers `leaf` on an exact match or at a `/` segment boundary.
fn pointer_covers(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                let token = k.replace('~', "~0").replace('/', "~1");
                collect_leaf_pointers(child, &format!("{prefix}/{token}"), out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, child) in arr.iter().enumerate() {
                collect_leaf_pointers(child, &format!("{prefix}/{i}"), out);
            }
        }
        _ => out.push(if prefix.is_empty() { "/".to_string() } else { prefix.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_boundary_is_respected() {
        assert!(pointer_covers("/scan", "/scan/halt_on_resolve"));
        assert!(pointer_covers("/scan/halt_on_resolve", "/scan/halt_on_resolve"));
        assert!(!pointer_covers("/scan/halt", "/scan/halt_on_resolve"));
    }

    #[test]
    fn ranging_is_unused_on_android() {
        let cfg = json!({
            "host": { "platform": "android", "android_api_level": 31 },
            "ranging": { "region": { "uuid": "A4826DE4-1EA9-4E47-8321-CB7A61E4667E" } }
        });
        let report = report_unused_keys(PlatformKind::Android, &cfg, UnusedKeyPolicy::Warn).unwrap();
        assert_eq!(report.unused_leaf_pointers, vec!["/ranging/region/uuid".to_string()]);
    }

    #[test]
    fn api_level_is_unused_on_ios() {
        let cfg = json!({ "host": { "platform": "ios", "android_api_level": 33 } });
        let err = report_unused_keys(PlatformKind::Ios, &cfg, UnusedKeyPolicy::Fail).unwrap_err();
        assert!(err.to_string().contains("/host/android_api_level"));
    }

    #[test]
    fn array_elements_are_covered_by_parent_prefix() {
        let cfg = json!({ "direct": { "service_uuids": ["a", "b"] } });
        let report = report_unused_keys(PlatformKind::Ios, &cfg, UnusedKeyPolicy::Fail).unwrap();
        assert!(report.is_clean());
    }
}
