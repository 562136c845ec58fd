use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    Submitted,
    Approved,
    Rejected,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Submitted => "SUBMITTED",
            MilestoneStatus::Approved => "APPROVED",
            MilestoneStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MilestoneStatus::Submitted)
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public milestone record. `payment_released` only ever moves false -> true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRef {
    pub tender_id: String,
    pub milestone_id: String,
    #[serde(default)]
    pub title: String,
    /// Digest of the off-ledger evidence documents, supplied by the contractor.
    #[serde(default)]
    pub evidence_hash: String,
    /// sha256 hex of the private milestone payload bytes.
    #[serde(default)]
    pub payload_hash: String,
    pub status: MilestoneStatus,
    pub payment_released: bool,
}

/// Confidential milestone claim, stored only in the milestones collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePrivate {
    pub tender_id: String,
    pub milestone_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub evidence_hash: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

/// Running total of payments against an approved milestone. Kept apart from
/// the claim so the claim bytes, and therefore `payload_hash`, never change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePayments {
    pub tender_id: String,
    pub milestone_id: String,
    pub paid_amount: f64,
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    pub amount: f64,
    pub recorded_at: String,
}
