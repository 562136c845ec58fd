use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::criteria::EvalCriterion;

/// Fields a record does not model explicitly. Kept sorted so the stored bytes
/// are identical on every replica.
pub type Extra = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderStatus {
    #[default]
    Draft,
    Open,
    Closed,
    Awarded,
    Cancelled,
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Draft => "DRAFT",
            TenderStatus::Open => "OPEN",
            TenderStatus::Closed => "CLOSED",
            TenderStatus::Awarded => "AWARDED",
            TenderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Some(TenderStatus::Draft),
            "OPEN" => Some(TenderStatus::Open),
            "CLOSED" => Some(TenderStatus::Closed),
            "AWARDED" => Some(TenderStatus::Awarded),
            "CANCELLED" => Some(TenderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TenderStatus::Awarded | TenderStatus::Cancelled)
    }
}

impl std::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which contract surface created the tender.
///
/// `Basic` tenders open immediately with a fixed window and allow the loose
/// award path. `Enhanced` tenders carry the full structured RFQ and follow the
/// strict lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderSchema {
    Basic,
    #[default]
    Enhanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: String,
    #[serde(default)]
    pub schema: TenderSchema,
    #[serde(default)]
    pub status: TenderStatus,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub project_scope: ProjectScope,
    #[serde(default)]
    pub deadlines: TenderDeadlines,
    #[serde(default)]
    pub evaluation_criteria: Vec<EvalCriterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_text: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub bid_requirements: Value,
    #[serde(default)]
    pub contract_terms: ContractTerms,
    #[serde(default)]
    pub compliance_requirements: Vec<ComplianceReq>,
    #[serde(default)]
    pub owner: OwnerInfo,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub document_hashes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarded_bid_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Tender {
    pub fn description(&self) -> &str {
        &self.project_scope.description
    }

    /// Start of the bid window (inclusive).
    pub fn open_date(&self) -> Option<&str> {
        self.deadlines
            .rfq_issue_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// End of the bid window (exclusive).
    pub fn submission_deadline(&self) -> &str {
        &self.deadlines.bid_submission_deadline
    }

    pub fn currency(&self) -> &str {
        &self.project_scope.budget.currency
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScope {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<String>,
    #[serde(default)]
    pub budget: Budget,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_max: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderDeadlines {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfq_issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_deadline: Option<String>,
    #[serde(default)]
    pub bid_submission_deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestone_deadlines: Vec<MilestoneDeadline>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDeadline {
    pub name: String,
    pub deadline: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub critical: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTerms {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contract_type: String,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReq {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub standard: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub auditable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    #[serde(default)]
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub legal_entity: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One-shot release of the retention held on an awarded tender. Lives under its
/// own key so the awarded tender record is never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionRelease {
    pub tender_id: String,
    pub retention_percentage: f64,
    pub released_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sub_structure_fields_survive_a_round_trip() {
        let raw = r#"{
            "id": "RFQ-1",
            "projectScope": {"description": "Bridge", "siteSurvey": {"done": true},
                             "budget": {"currency": "EUR", "paymentTerms": "net 30"}},
            "deadlines": {"bidSubmissionDeadline": "2025-06-01T00:00:00Z"},
            "owner": {"organizationName": "City", "taxInfo": {"vat": "X1"}}
        }"#;
        let t: Tender = serde_json::from_str(raw).unwrap();
        assert_eq!(t.project_scope.extra["siteSurvey"]["done"], Value::Bool(true));
        assert_eq!(t.project_scope.budget.extra["paymentTerms"], "net 30");

        let back = serde_json::to_value(&t).unwrap();
        assert_eq!(back["owner"]["taxInfo"]["vat"], "X1");
        assert_eq!(back["status"], "DRAFT");
        assert_eq!(back["schema"], "ENHANCED");
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(TenderStatus::parse("open"), Some(TenderStatus::Open));
        assert_eq!(TenderStatus::parse(" Awarded "), Some(TenderStatus::Awarded));
        assert_eq!(TenderStatus::parse("PENDING"), None);
    }

    #[test]
    fn blank_issue_date_means_no_open_date() {
        let mut t: Tender = serde_json::from_str(r#"{"id":"RFQ-1"}"#).unwrap();
        assert!(t.open_date().is_none());
        t.deadlines.rfq_issue_date = Some("  ".into());
        assert!(t.open_date().is_none());
        t.deadlines.rfq_issue_date = Some("2025-01-01T00:00:00Z".into());
        assert_eq!(t.open_date(), Some("2025-01-01T00:00:00Z"));
    }
}
