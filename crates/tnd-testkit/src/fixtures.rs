//! Payload builders for scenario tests. All timestamps sit on a fixed
//! calendar so scenarios never depend on the wall clock.

use serde_json::{json, Value};

pub const ISSUE_DATE: &str = "2025-01-01T00:00:00Z";
pub const DURING_WINDOW: &str = "2025-01-15T12:00:00Z";
pub const DEADLINE: &str = "2025-02-01T00:00:00Z";
pub const AFTER_DEADLINE: &str = "2025-02-02T00:00:00Z";
pub const BEFORE_ISSUE: &str = "2024-12-15T00:00:00Z";

/// A structured RFQ with one criterion per `(name, weight, type)`.
pub fn tender_value(id: &str, criteria: &[(&str, f64, &str)]) -> Value {
    let criteria: Vec<Value> = criteria
        .iter()
        .enumerate()
        .map(|(i, (name, weight, kind))| {
            json!({
                "id": format!("C{}", i + 1),
                "name": name,
                "weight": weight,
                "type": kind,
                "description": format!("{name} criterion"),
            })
        })
        .collect();

    json!({
        "id": id,
        "projectScope": {
            "description": "Bridge deck resurfacing, spans 3 to 7",
            "objectives": ["Restore load rating"],
            "deliverables": ["As-built drawings"],
            "budget": { "currency": "USD", "estimatedMin": 400000.0, "estimatedMax": 900000.0 },
            "siteVisitRequired": true
        },
        "deadlines": {
            "rfqIssueDate": ISSUE_DATE,
            "questionsDeadline": "2025-01-10T00:00:00Z",
            "bidSubmissionDeadline": DEADLINE,
            "projectStartDate": "2025-03-01T00:00:00Z",
            "milestoneDeadlines": [
                { "name": "Demolition", "deadline": "2025-04-01T00:00:00Z", "critical": true }
            ]
        },
        "evaluationCriteria": criteria,
        "bidRequirements": { "bondRequired": true },
        "contractTerms": {
            "contractType": "FIXED_PRICE",
            "paymentTerms": { "retentionPercentage": 5.0, "retentionPeriod": 90 }
        },
        "complianceRequirements": [
            { "type": "CERTIFICATION", "standard": "ISO9001", "description": "Quality system", "mandatory": true }
        ],
        "owner": { "organizationName": "County Roads Authority", "legalEntity": "CRA-001" }
    })
}

pub fn tender_json(id: &str, criteria: &[(&str, f64, &str)]) -> Vec<u8> {
    tender_value(id, criteria).to_string().into_bytes()
}

/// Price (quantitative) and Quality (pass/fail), 50/50.
pub fn price_quality_tender(id: &str) -> Vec<u8> {
    tender_json(id, &[("Price", 50.0, "QUANTITATIVE"), ("Quality", 50.0, "PASS_FAIL")])
}

pub fn bid_value(
    tender_id: &str,
    bid_id: &str,
    contractor_id: &str,
    amount: f64,
    checklist: &[(&str, bool)],
) -> Value {
    let checklist: serde_json::Map<String, Value> = checklist
        .iter()
        .map(|(k, v)| (k.to_string(), Value::Bool(*v)))
        .collect();
    json!({
        "tenderId": tender_id,
        "bidId": bid_id,
        "contractorId": contractor_id,
        "totalAmount": amount,
        "currency": "USD",
        "technicalProposal": {
            "methodology": "Staged lane closures with night pours",
            "qualityAssurance": "Third-party testing lab"
        },
        "financialProposal": {
            "breakdownByPhase": [
                { "phase": "Demolition", "cost": amount * 0.4 },
                { "phase": "Resurfacing", "cost": amount * 0.6 }
            ]
        },
        "complianceChecklist": checklist
    })
}

pub fn bid_json(
    tender_id: &str,
    bid_id: &str,
    contractor_id: &str,
    amount: f64,
    checklist: &[(&str, bool)],
) -> Vec<u8> {
    bid_value(tender_id, bid_id, contractor_id, amount, checklist)
        .to_string()
        .into_bytes()
}

/// Flat payload accepted by BASIC tenders.
pub fn basic_bid_json(tender_id: &str, bid_id: &str, contractor_id: &str, amount: f64) -> Vec<u8> {
    json!({
        "tenderId": tender_id,
        "bidId": bid_id,
        "contractorId": contractor_id,
        "amount": amount,
        "docsHash": "9f2c1a"
    })
    .to_string()
    .into_bytes()
}

pub fn milestone_json(tender_id: &str, milestone_id: &str, title: &str, amount: f64) -> Vec<u8> {
    json!({
        "tenderId": tender_id,
        "milestoneId": milestone_id,
        "title": title,
        "evidenceHash": format!("evidence-{milestone_id}"),
        "amount": amount,
        "details": { "inspector": "J. Ortiz" }
    })
    .to_string()
    .into_bytes()
}
