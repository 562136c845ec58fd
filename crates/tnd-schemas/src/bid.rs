use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public commitment to a sealed bid. Replicated to every participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRef {
    pub tender_id: String,
    pub bid_id: String,
    pub contractor_id: String,
    /// sha256 lowercase hex of the private payload bytes exactly as submitted.
    pub bid_hash: String,
}

/// Confidential bid payload, stored only in the bids collection.
///
/// Accepts both the structured proposal and the legacy flat shape
/// (`amount` + `docsHash`). The engine never re-serializes this type for
/// storage; the submitted bytes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPrivate {
    pub tender_id: String,
    pub bid_id: String,
    #[serde(default)]
    pub contractor_id: String,
    #[serde(default, alias = "amount")]
    pub total_amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub technical_proposal: TechnicalProposal,
    #[serde(default)]
    pub financial_proposal: FinancialProposal,
    #[serde(default)]
    pub compliance_checklist: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub document_hashes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

impl BidPrivate {
    pub fn checklist_passes(&self, item: &str) -> bool {
        self.compliance_checklist.get(item).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalProposal {
    #[serde(default)]
    pub methodology: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub timeline: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_composition: Vec<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quality_assurance: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub risk_mitigation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub innovation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProposal {
    #[serde(default)]
    pub breakdown_by_phase: Vec<PhaseCosting>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown_by_category: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_schedule: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cost_assumptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_validity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCosting {
    pub phase: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}
