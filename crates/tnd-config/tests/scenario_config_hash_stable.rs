//! Config hash stability
//!
//! GREEN when:
//! - Loading the same layers twice yields the same config_hash.
//! - Key order inside a YAML document does not affect the hash.
//! - A changed scoring constant changes the hash.
//! - Overlays take effect and the merged result hashes stably.

use tnd_config::{load_layered_yaml_from_strings, EngineConfig};

const BASE_YAML: &str = r#"
collections:
  bids: bidsCollection
  milestones: milestonesCollection
validation:
  weight_total: 100.0
  weight_tolerance: 0.01
scoring:
  price_criterion: Price
  price_scale: 1000000.0
  price_penalty: 10.0
"#;

const BASE_YAML_REORDERED: &str = r#"
scoring:
  price_penalty: 10.0
  price_criterion: Price
  price_scale: 1000000.0
validation:
  weight_tolerance: 0.01
  weight_total: 100.0
collections:
  milestones: milestonesCollection
  bids: bidsCollection
"#;

const OVERLAY_YAML: &str = r#"
scoring:
  price_penalty: 12.5
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        a.config_hash, b.config_hash,
        "key order in the source document must not change the hash"
    );
}

#[test]
fn changed_scoring_constant_changes_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_reaches_the_typed_config() {
    let (cfg, loaded) = EngineConfig::from_yaml_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(cfg.scoring.price_penalty, 12.5);
    assert_eq!(cfg.scoring.price_scale, 1_000_000.0);

    let again = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(loaded.config_hash, again.config_hash);
}
