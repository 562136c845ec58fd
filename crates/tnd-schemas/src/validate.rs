//! Structural validation for records entering the ledger.
//!
//! Pure functions over the domain types. Callers decide how a failure is
//! surfaced; everything here reports the offending field and why.

use crate::bid::BidPrivate;
use crate::criteria::EvalCriterion;
use crate::milestone::MilestonePrivate;
use crate::tender::{Tender, TenderSchema};
use crate::time::parse_ts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Criteria weights must add up to `total` within `tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightRule {
    pub total: f64,
    pub tolerance: f64,
}

impl Default for WeightRule {
    fn default() -> Self {
        Self {
            total: 100.0,
            tolerance: 0.01,
        }
    }
}

/// Ids become key segments (`BIDREF_<tender>_<bid>`), so `_` would let one
/// id's range swallow another's and `~` would escape the range end.
pub fn validate_id(field: &str, id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !c.is_ascii_graphic() || *c == '_' || *c == '~')
    {
        return Err(ValidationError::new(
            field,
            format!("contains disallowed character {bad:?}"),
        ));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}

fn require_ts(field: &str, value: &str) -> Result<(), ValidationError> {
    parse_ts(value)
        .map(|_| ())
        .map_err(|e| ValidationError::new(field, format!("invalid RFC 3339 timestamp: {e}")))
}

fn optional_ts(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => require_ts(field, v),
        _ => Ok(()),
    }
}

pub fn validate_criteria(criteria: &[EvalCriterion], rule: WeightRule) -> Result<(), ValidationError> {
    if criteria.is_empty() {
        return Err(ValidationError::new(
            "evaluationCriteria",
            "at least one criterion is required",
        ));
    }

    let mut total = 0.0;
    for (i, c) in criteria.iter().enumerate() {
        let field = format!("evaluationCriteria[{i}]");
        if c.name.trim().is_empty() {
            return Err(ValidationError::new(format!("{field}.name"), "is required"));
        }
        if !c.weight.is_finite() || c.weight < 0.0 || c.weight > rule.total {
            return Err(ValidationError::new(
                format!("{field}.weight"),
                format!("must be between 0 and {}, got {}", rule.total, c.weight),
            ));
        }
        total += c.weight;
    }

    if (total - rule.total).abs() > rule.tolerance {
        return Err(ValidationError::new(
            "evaluationCriteria",
            format!("weights must sum to {}, got {total:.2}", rule.total),
        ));
    }
    Ok(())
}

/// Full check of a structured RFQ before it is first stored.
pub fn validate_enhanced_tender(t: &Tender, rule: WeightRule) -> Result<(), ValidationError> {
    validate_id("id", &t.id)?;
    require("projectScope.description", t.description())?;
    require(
        "deadlines.bidSubmissionDeadline",
        &t.deadlines.bid_submission_deadline,
    )?;
    require("owner.organizationName", &t.owner.organization_name)?;

    let d = &t.deadlines;
    require_ts("deadlines.bidSubmissionDeadline", &d.bid_submission_deadline)?;
    optional_ts("deadlines.rfqIssueDate", d.rfq_issue_date.as_deref())?;
    optional_ts("deadlines.questionsDeadline", d.questions_deadline.as_deref())?;
    optional_ts("deadlines.projectStartDate", d.project_start_date.as_deref())?;
    optional_ts("deadlines.projectEndDate", d.project_end_date.as_deref())?;
    for (i, m) in d.milestone_deadlines.iter().enumerate() {
        require_ts(&format!("deadlines.milestoneDeadlines[{i}].deadline"), &m.deadline)?;
    }

    if let Some(open) = t.open_date() {
        let open = parse_ts(open).map_err(|e| ValidationError::new("deadlines.rfqIssueDate", e.to_string()))?;
        let close = parse_ts(&d.bid_submission_deadline)
            .map_err(|e| ValidationError::new("deadlines.bidSubmissionDeadline", e.to_string()))?;
        if close <= open {
            return Err(ValidationError::new(
                "deadlines.bidSubmissionDeadline",
                "must be after rfqIssueDate",
            ));
        }
    }

    validate_criteria(&t.evaluation_criteria, rule)
}

/// Window of a legacy tender: both ends must parse and close must follow open.
pub fn validate_basic_window(open_at: &str, close_at: &str) -> Result<(), ValidationError> {
    require("openAt", open_at)?;
    require("closeAt", close_at)?;
    let open = parse_ts(open_at)
        .map_err(|e| ValidationError::new("openAt", format!("invalid RFC 3339 timestamp: {e}")))?;
    let close = parse_ts(close_at)
        .map_err(|e| ValidationError::new("closeAt", format!("invalid RFC 3339 timestamp: {e}")))?;
    if close <= open {
        return Err(ValidationError::new("closeAt", "must be after openAt"));
    }
    Ok(())
}

pub fn validate_bid(bid: &BidPrivate, schema: TenderSchema) -> Result<(), ValidationError> {
    validate_id("contractorId", &bid.contractor_id)?;
    if !bid.total_amount.is_finite() || bid.total_amount <= 0.0 {
        return Err(ValidationError::new("totalAmount", "must be greater than zero"));
    }
    if schema == TenderSchema::Basic {
        return Ok(());
    }

    require("currency", &bid.currency)?;
    require(
        "technicalProposal.methodology",
        &bid.technical_proposal.methodology,
    )?;
    if bid.financial_proposal.breakdown_by_phase.is_empty() {
        return Err(ValidationError::new(
            "financialProposal.breakdownByPhase",
            "at least one phase is required",
        ));
    }
    if bid.compliance_checklist.is_empty() {
        return Err(ValidationError::new("complianceChecklist", "is required"));
    }
    Ok(())
}

pub fn validate_milestone(ms: &MilestonePrivate) -> Result<(), ValidationError> {
    if !ms.amount.is_finite() || ms.amount < 0.0 {
        return Err(ValidationError::new("amount", "must be a non-negative number"));
    }
    Ok(())
}
