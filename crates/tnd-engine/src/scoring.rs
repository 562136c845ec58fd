//! Criterion scoring. Pure: same bid, criteria and config give the same score.

use serde::{Deserialize, Serialize};
use tnd_config::ScoringConfig;
use tnd_schemas::{BidPrivate, CriterionType, EvalCriterion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScore {
    pub name: String,
    pub kind: CriterionType,
    pub weight: f64,
    /// Score on the 0..=100 scale before weighting.
    pub raw: f64,
    pub weighted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidScore {
    pub total: f64,
    pub breakdown: Vec<CriterionScore>,
}

/// Unweighted score of one criterion for one bid.
pub fn criterion_score(criterion: &EvalCriterion, bid: &BidPrivate, cfg: &ScoringConfig) -> f64 {
    match criterion.kind {
        CriterionType::Quantitative if criterion.name == cfg.price_criterion => {
            (100.0 - bid.total_amount / cfg.price_scale * cfg.price_penalty).max(0.0)
        }
        CriterionType::Quantitative => cfg.quantitative_default,
        CriterionType::Qualitative => {
            if bid.checklist_passes(&criterion.name) {
                cfg.qualitative_met
            } else {
                cfg.qualitative_unmet
            }
        }
        CriterionType::PassFail => {
            if bid.checklist_passes(&criterion.name) {
                cfg.pass_score
            } else {
                cfg.fail_score
            }
        }
        CriterionType::Other => cfg.other_score,
    }
}

/// Weighted sum over `criteria`, accumulated in the given order.
pub fn score_bid(
    bid: &BidPrivate,
    criteria: &[EvalCriterion],
    cfg: &ScoringConfig,
    weight_total: f64,
) -> BidScore {
    let mut total = 0.0;
    let mut breakdown = Vec::with_capacity(criteria.len());
    for c in criteria {
        let raw = criterion_score(c, bid, cfg);
        let weighted = raw * (c.weight / weight_total);
        total += weighted;
        breakdown.push(CriterionScore {
            name: c.name.clone(),
            kind: c.kind,
            weight: c.weight,
            raw,
            weighted,
        });
    }
    BidScore { total, breakdown }
}
