//! tnd-config
//!
//! Layered YAML configuration for the procurement engine.
//!
//! - Documents merge in order; later documents override earlier ones key by key.
//! - The merged tree is hashed over its canonical JSON (sorted keys, compact),
//!   so every replica can prove it runs the same scoring constants and
//!   collection names.
//! - `EngineConfig` is the typed view. Every field defaults to the production
//!   constants, so an empty document is a valid configuration.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;

mod consumption;
mod engine;

pub use consumption::{consumed_pointers, report_unknown_keys, UnknownKeyReport, UnusedKeyPolicy};
pub use engine::{CollectionsConfig, EngineConfig, ScoringConfig, ValidationConfig};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read each path in order and merge the documents.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let layers = paths
        .iter()
        .map(|path| fs::read_to_string(path).with_context(|| format!("read config layer {path}")))
        .collect::<Result<Vec<String>>>()?;
    let layers: Vec<&str> = layers.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&layers)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut tree = Value::Object(Map::new());
    for (layer, doc) in yaml_docs.iter().enumerate() {
        let parsed: serde_yaml::Value = serde_yaml::from_str(doc)
            .with_context(|| format!("config layer {layer} is not valid YAML"))?;
        // Empty document: no overrides.
        if parsed.is_null() {
            continue;
        }
        let overlay = serde_json::to_value(parsed)
            .with_context(|| format!("config layer {layer} has no JSON form"))?;
        overlay_into(&mut tree, overlay);
    }

    let canonical_json =
        serde_json::to_string(&tree).context("serialize merged config")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: tree,
    })
}

/// Objects merge key by key; anything else in `overlay` replaces `base`.
/// `serde_json::Map` is key-ordered, so the compact form is canonical.
fn overlay_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                overlay_into(base_map.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}
