use serde::{Deserialize, Serialize};

pub const AUTOMATED_EVALUATION_NOTE: &str = "Automated evaluation based on criteria";

/// Derived score for one bid. Recomputable; written only by the evaluation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub tender_id: String,
    pub bid_id: String,
    pub score: f64,
    #[serde(default)]
    pub notes: String,
}
