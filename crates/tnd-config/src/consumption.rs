//! Unknown-key guard.
//!
//! Every leaf in the merged config must map to an `EngineConfig` field. A
//! misspelled key would otherwise silently fall back to its default and two
//! replicas with "the same" config could score bids differently.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownKeyReport {
    /// Leaf pointers in the config that no engine setting reads (sorted).
    pub unknown_leaf_pointers: Vec<String>,
}

impl UnknownKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_leaf_pointers.is_empty()
    }
}

/// JSON pointers read by `EngineConfig`.
pub fn consumed_pointers() -> &'static [&'static str] {
    &[
        "/collections/bids",
        "/collections/milestones",
        "/validation/weight_total",
        "/validation/weight_tolerance",
        "/scoring/price_criterion",
        "/scoring/price_scale",
        "/scoring/price_penalty",
        "/scoring/quantitative_default",
        "/scoring/qualitative_met",
        "/scoring/qualitative_unmet",
        "/scoring/pass_score",
        "/scoring/fail_score",
        "/scoring/other_score",
    ]
}

pub fn report_unknown_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnknownKeyReport> {
    let settings = consumed_pointers();
    let unknown: BTreeSet<String> = leaf_pointers(config_json)
        .into_iter()
        .filter(|leaf| !settings.iter().any(|setting| covers(setting, leaf)))
        .collect();
    let report = UnknownKeyReport {
        unknown_leaf_pointers: unknown.into_iter().collect(),
    };

    match policy {
        UnusedKeyPolicy::Fail if !report.is_clean() => bail!(
            "CONFIG_UNKNOWN_KEYS: {} config leaf key(s) are not engine settings: {:?}",
            report.unknown_leaf_pointers.len(),
            report.unknown_leaf_pointers
        ),
        _ => Ok(report),
    }
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn covers(setting: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(setting) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// RFC 6901 pointers to every scalar, empty object and empty array.
fn leaf_pointers(root: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = vec![(String::new(), root)];
    while let Some((path, node)) = pending.pop() {
        match node {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    let token = key.replace('~', "~0").replace('/', "~1");
                    pending.push((format!("{path}/{token}"), child));
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (idx, child) in items.iter().enumerate() {
                    pending.push((format!("{path}/{idx}"), child));
                }
            }
            _ if path.is_empty() => {}
            _ => out.push(path),
        }
    }
    out
}
