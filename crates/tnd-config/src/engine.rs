use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tnd_schemas::WeightRule;

use crate::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};

/// Typed engine settings. Missing sections and fields take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub collections: CollectionsConfig,
    pub validation: ValidationConfig,
    pub scoring: ScoringConfig,
}

/// Names of the private data collections holding bid and milestone payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub bids: String,
    pub milestones: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            bids: "bidsCollection".to_string(),
            milestones: "milestonesCollection".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub weight_total: f64,
    pub weight_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            weight_total: 100.0,
            weight_tolerance: 0.01,
        }
    }
}

/// Constants of the criterion scoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// QUANTITATIVE criterion scored from the bid amount.
    pub price_criterion: String,
    pub price_scale: f64,
    pub price_penalty: f64,
    pub quantitative_default: f64,
    pub qualitative_met: f64,
    pub qualitative_unmet: f64,
    pub pass_score: f64,
    pub fail_score: f64,
    pub other_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            price_criterion: "Price".to_string(),
            price_scale: 1_000_000.0,
            price_penalty: 10.0,
            quantitative_default: 75.0,
            qualitative_met: 100.0,
            qualitative_unmet: 50.0,
            pass_score: 100.0,
            fail_score: 0.0,
            other_score: 50.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_value(config_json.clone())
            .context("config does not match the engine schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load, merge, hash and type-check YAML layers from disk.
    pub fn load(paths: &[&str]) -> Result<(Self, LoadedConfig)> {
        let loaded = load_layered_yaml(paths)?;
        let cfg = Self::from_json(&loaded.config_json)?;
        Ok((cfg, loaded))
    }

    pub fn from_yaml_strings(yaml_docs: &[&str]) -> Result<(Self, LoadedConfig)> {
        let loaded = load_layered_yaml_from_strings(yaml_docs)?;
        let cfg = Self::from_json(&loaded.config_json)?;
        Ok((cfg, loaded))
    }

    pub fn weight_rule(&self) -> WeightRule {
        WeightRule {
            total: self.validation.weight_total,
            tolerance: self.validation.weight_tolerance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.collections;
        if c.bids.trim().is_empty() || c.milestones.trim().is_empty() {
            bail!("CONFIG_INVALID collections: names must be non-empty");
        }
        if c.bids == c.milestones {
            bail!("CONFIG_INVALID collections: bids and milestones must differ");
        }

        let v = &self.validation;
        if !(v.weight_total.is_finite() && v.weight_total > 0.0) {
            bail!("CONFIG_INVALID validation.weight_total: must be positive");
        }
        if !(v.weight_tolerance.is_finite() && v.weight_tolerance >= 0.0) {
            bail!("CONFIG_INVALID validation.weight_tolerance: must be >= 0");
        }

        let s = &self.scoring;
        if s.price_criterion.trim().is_empty() {
            bail!("CONFIG_INVALID scoring.price_criterion: must be non-empty");
        }
        if !(s.price_scale.is_finite() && s.price_scale > 0.0) {
            bail!("CONFIG_INVALID scoring.price_scale: must be positive");
        }
        let scores = [
            ("price_penalty", s.price_penalty),
            ("quantitative_default", s.quantitative_default),
            ("qualitative_met", s.qualitative_met),
            ("qualitative_unmet", s.qualitative_unmet),
            ("pass_score", s.pass_score),
            ("fail_score", s.fail_score),
            ("other_score", s.other_score),
        ];
        for (name, value) in scores {
            if !value.is_finite() || value < 0.0 {
                bail!("CONFIG_INVALID scoring.{name}: must be a finite non-negative number");
            }
        }
        Ok(())
    }
}
