//! Money movement after award: partial payments against approved milestones,
//! the one-shot retention release, and a read-only financial summary.

use serde::{Deserialize, Serialize};
use tnd_ledger::LedgerGateway;
use tnd_schemas::{
    format_ts, BidPrivate, LedgerEvent, MilestonePayments, MilestonePrivate, MilestoneRef,
    MilestoneStatus, PartialPaymentRecorded, PaymentEntry, RetentionRelease, RetentionReleased,
    Tender, TenderStatus,
};

use crate::error::{EngineError, EngineResult};
use crate::keys;
use crate::store;

/// Rounding slack when comparing cumulative payments against a claim.
const PAYMENT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneCounts {
    pub submitted: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub tender_id: String,
    pub status: TenderStatus,
    pub currency: String,
    pub awarded_bid_id: Option<String>,
    pub awarded_amount: Option<f64>,
    pub milestones: MilestoneCounts,
    /// Milestones whose private claim could not be read by this caller.
    pub unreadable_milestones: usize,
    pub claimed_total: f64,
    pub approved_total: f64,
    pub paid_total: f64,
    pub outstanding_total: f64,
    pub retention_percentage: f64,
    pub retention_amount: Option<f64>,
    pub retention_released: bool,
    pub retention_released_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Payments {
    bids_collection: String,
    milestones_collection: String,
}

impl Payments {
    pub fn new(bids_collection: impl Into<String>, milestones_collection: impl Into<String>) -> Self {
        Self {
            bids_collection: bids_collection.into(),
            milestones_collection: milestones_collection.into(),
        }
    }

    pub fn record_partial_payment(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
        amount: f64,
    ) -> EngineResult<MilestonePayments> {
        let ms_ref: MilestoneRef = store::require_json(
            stub,
            &keys::milestone_ref(tender_id, milestone_id),
            &format!("milestone {milestone_id} for tender {tender_id}"),
        )?;
        if ms_ref.status != MilestoneStatus::Approved || !ms_ref.payment_released {
            return Err(EngineError::InvalidState(format!(
                "milestone {milestone_id} is {}, payments require APPROVED",
                ms_ref.status
            )));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidInput(
                "payment amount must be greater than zero".to_string(),
            ));
        }

        let claim: MilestonePrivate = store::read_private(
            stub,
            &self.milestones_collection,
            &keys::milestone_private(tender_id, milestone_id),
        )?
        .map(|(_, c)| c)
        .ok_or_else(|| {
            EngineError::NotFound(format!("private milestone {milestone_id} not found"))
        })?;

        let pay_key = keys::milestone_payments(tender_id, milestone_id);
        let mut ledger: MilestonePayments =
            store::read_private(stub, &self.milestones_collection, &pay_key)?
                .map(|(_, p)| p)
                .unwrap_or_else(|| MilestonePayments {
                    tender_id: tender_id.to_string(),
                    milestone_id: milestone_id.to_string(),
                    ..MilestonePayments::default()
                });

        let paid = ledger.paid_amount + amount;
        if paid > claim.amount + PAYMENT_TOLERANCE {
            return Err(EngineError::InvalidInput(format!(
                "payment would exceed the claimed amount for milestone {milestone_id}"
            )));
        }

        let now = format_ts(store::now(stub)?);
        ledger.paid_amount = paid;
        ledger.payments.push(PaymentEntry {
            amount,
            recorded_at: now.clone(),
        });
        let bytes = serde_json::to_vec(&ledger)
            .map_err(|e| EngineError::DependencyFailure(format!("serialize {pay_key}: {e}")))?;
        stub.put_private_data(&self.milestones_collection, &pay_key, bytes)?;

        let fully_paid = paid >= claim.amount - PAYMENT_TOLERANCE;
        store::emit(
            stub,
            &LedgerEvent::PartialPaymentRecorded(PartialPaymentRecorded {
                tender_id: tender_id.to_string(),
                milestone_id: milestone_id.to_string(),
                fully_paid,
                recorded_at: now,
            }),
        )?;
        tracing::info!(tender_id = %tender_id, milestone_id = %milestone_id, fully_paid, "payment recorded");
        Ok(ledger)
    }

    /// Release the retention held on an awarded tender. Refused while any
    /// milestone is still awaiting a decision.
    pub fn release_retention(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
    ) -> EngineResult<RetentionRelease> {
        let tender: Tender =
            store::require_json(stub, &keys::tender(tender_id), &format!("tender {tender_id}"))?;
        if tender.status != TenderStatus::Awarded {
            return Err(EngineError::InvalidState(format!(
                "tender {tender_id} is {}, retention requires AWARDED",
                tender.status
            )));
        }
        let key = keys::retention(tender_id);
        if store::exists(stub, &key)? {
            return Err(EngineError::AlreadyExists(format!(
                "retention for tender {tender_id} already released"
            )));
        }
        let pending = milestone_refs(stub, tender_id)?
            .into_iter()
            .filter(|m| m.status == MilestoneStatus::Submitted)
            .count();
        if pending > 0 {
            return Err(EngineError::InvalidState(format!(
                "{pending} milestone(s) of tender {tender_id} still awaiting approval"
            )));
        }

        let release = RetentionRelease {
            tender_id: tender_id.to_string(),
            retention_percentage: retention_percentage(&tender),
            released_at: format_ts(store::now(stub)?),
        };
        store::write_json(stub, &key, &release)?;
        store::emit(
            stub,
            &LedgerEvent::RetentionReleased(RetentionReleased {
                tender_id: release.tender_id.clone(),
                retention_percentage: release.retention_percentage,
                released_at: release.released_at.clone(),
            }),
        )?;
        tracing::info!(tender_id = %tender_id, "retention released");
        Ok(release)
    }

    pub fn financial_summary(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
    ) -> EngineResult<FinancialSummary> {
        let tender: Tender =
            store::require_json(stub, &keys::tender(tender_id), &format!("tender {tender_id}"))?;

        let awarded_amount = tender.awarded_bid_id.as_deref().and_then(|bid_id| {
            store::read_private_lenient::<BidPrivate>(
                stub,
                &self.bids_collection,
                &keys::bid_private(tender_id, bid_id),
            )
            .map(|b| b.total_amount)
        });

        let mut counts = MilestoneCounts::default();
        let mut unreadable = 0;
        let (mut claimed, mut approved, mut paid) = (0.0, 0.0, 0.0);
        for ms in milestone_refs(stub, tender_id)? {
            match ms.status {
                MilestoneStatus::Submitted => counts.submitted += 1,
                MilestoneStatus::Approved => counts.approved += 1,
                MilestoneStatus::Rejected => counts.rejected += 1,
            }
            let claim: Option<MilestonePrivate> = store::read_private_lenient(
                stub,
                &self.milestones_collection,
                &keys::milestone_private(tender_id, &ms.milestone_id),
            );
            let Some(claim) = claim else {
                unreadable += 1;
                continue;
            };
            if ms.status != MilestoneStatus::Rejected {
                claimed += claim.amount;
            }
            if ms.status == MilestoneStatus::Approved {
                approved += claim.amount;
                let pay_key = keys::milestone_payments(tender_id, &ms.milestone_id);
                if let Ok(Some((_, p))) = store::read_private::<MilestonePayments>(
                    stub,
                    &self.milestones_collection,
                    &pay_key,
                ) {
                    paid += p.paid_amount;
                }
            }
        }

        let release: Option<RetentionRelease> = store::read_json(stub, &keys::retention(tender_id))?;
        let pct = retention_percentage(&tender);
        Ok(FinancialSummary {
            tender_id: tender.id.clone(),
            status: tender.status,
            currency: tender.currency().to_string(),
            awarded_bid_id: tender.awarded_bid_id.clone(),
            awarded_amount,
            milestones: counts,
            unreadable_milestones: unreadable,
            claimed_total: claimed,
            approved_total: approved,
            paid_total: paid,
            outstanding_total: (approved - paid).max(0.0),
            retention_percentage: pct,
            retention_amount: awarded_amount.map(|a| a * pct / 100.0),
            retention_released: release.is_some(),
            retention_released_at: release.map(|r| r.released_at),
        })
    }
}

fn retention_percentage(tender: &Tender) -> f64 {
    tender
        .contract_terms
        .payment_terms
        .retention_percentage
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

fn milestone_refs(stub: &dyn LedgerGateway, tender_id: &str) -> EngineResult<Vec<MilestoneRef>> {
    Ok(store::scan_json::<MilestoneRef>(stub, &keys::milestone_refs(tender_id))?
        .into_iter()
        .map(|(_, r)| r)
        .collect())
}
