//! Milestone claims.
//!
//! SUBMITTED -> APPROVED (payment released) or SUBMITTED -> REJECTED. Both
//! outcomes are final: an approved milestone is never un-paid and a rejected
//! one never becomes payable.

use tnd_ledger::LedgerGateway;
use tnd_schemas::{
    format_ts, validate_id, validate_milestone, LedgerEvent, MilestonePrivate, MilestoneRef,
    MilestoneRejected, MilestoneStatus, PaymentReleased,
};

use crate::commitment::content_digest;
use crate::error::{EngineError, EngineResult};
use crate::keys;
use crate::store;

pub const MILESTONE_TRANSIENT_FIELD: &str = "milestone";

#[derive(Debug, Clone)]
pub struct MilestoneLifecycle {
    collection: String,
}

impl MilestoneLifecycle {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn submit(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        if !store::exists(stub, &keys::tender(tender_id))? {
            return Err(EngineError::NotFound(format!("tender {tender_id} not found")));
        }

        let raw = store::transient_field(stub, MILESTONE_TRANSIENT_FIELD)?;
        let claim: MilestonePrivate = serde_json::from_slice(&raw)
            .map_err(|e| EngineError::InvalidInput(format!("malformed milestone JSON: {e}")))?;
        if claim.tender_id != tender_id || claim.milestone_id != milestone_id {
            return Err(EngineError::InvalidInput(format!(
                "milestone payload is for {}/{}, not {tender_id}/{milestone_id}",
                claim.tender_id, claim.milestone_id
            )));
        }
        validate_id("milestoneId", milestone_id)?;

        let ref_key = keys::milestone_ref(tender_id, milestone_id);
        if store::exists(stub, &ref_key)? {
            return Err(EngineError::AlreadyExists(format!(
                "milestone {milestone_id} already submitted for tender {tender_id}"
            )));
        }
        validate_milestone(&claim)?;

        let ms_ref = MilestoneRef {
            tender_id: tender_id.to_string(),
            milestone_id: milestone_id.to_string(),
            title: claim.title.clone(),
            evidence_hash: claim.evidence_hash.clone(),
            payload_hash: content_digest(&raw),
            status: MilestoneStatus::Submitted,
            payment_released: false,
        };

        stub.put_private_data(
            &self.collection,
            &keys::milestone_private(tender_id, milestone_id),
            raw,
        )?;
        store::write_json(stub, &ref_key, &ms_ref)?;
        store::emit(stub, &LedgerEvent::MilestoneSubmitted(ms_ref.clone()))?;
        tracing::info!(tender_id = %tender_id, milestone_id = %milestone_id, "milestone submitted");
        Ok(ms_ref)
    }

    pub fn approve(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        let mut ms_ref = self.pending(stub, tender_id, milestone_id)?;
        let now = format_ts(store::now(stub)?);

        ms_ref.status = MilestoneStatus::Approved;
        ms_ref.payment_released = true;
        store::write_json(stub, &keys::milestone_ref(tender_id, milestone_id), &ms_ref)?;

        store::emit(stub, &LedgerEvent::MilestoneApproved(ms_ref.clone()))?;
        store::emit(
            stub,
            &LedgerEvent::PaymentReleased(PaymentReleased {
                tender_id: tender_id.to_string(),
                milestone_id: milestone_id.to_string(),
                evidence_hash: ms_ref.evidence_hash.clone(),
                released_at: now,
            }),
        )?;
        tracing::info!(tender_id = %tender_id, milestone_id = %milestone_id, "milestone approved, payment released");
        Ok(ms_ref)
    }

    /// The reason travels in the event only; the public reference keeps its shape.
    pub fn reject(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
        reason: &str,
    ) -> EngineResult<MilestoneRef> {
        let mut ms_ref = self.pending(stub, tender_id, milestone_id)?;
        let now = format_ts(store::now(stub)?);

        ms_ref.status = MilestoneStatus::Rejected;
        store::write_json(stub, &keys::milestone_ref(tender_id, milestone_id), &ms_ref)?;
        store::emit(
            stub,
            &LedgerEvent::MilestoneRejected(MilestoneRejected {
                tender_id: tender_id.to_string(),
                milestone_id: milestone_id.to_string(),
                status: ms_ref.status,
                reason: reason.to_string(),
                rejected_at: now,
            }),
        )?;
        tracing::info!(tender_id = %tender_id, milestone_id = %milestone_id, "milestone rejected");
        Ok(ms_ref)
    }

    pub fn list_public(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
    ) -> EngineResult<Vec<MilestoneRef>> {
        Ok(store::scan_json::<MilestoneRef>(stub, &keys::milestone_refs(tender_id))?
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| r.tender_id == tender_id)
            .collect())
    }

    pub fn get_ref(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        store::require_json(
            stub,
            &keys::milestone_ref(tender_id, milestone_id),
            &format!("milestone {milestone_id} for tender {tender_id}"),
        )
    }

    pub fn read_private(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestonePrivate> {
        store::read_private(
            stub,
            &self.collection,
            &keys::milestone_private(tender_id, milestone_id),
        )?
        .map(|(_, claim)| claim)
        .ok_or_else(|| {
            EngineError::NotFound(format!(
                "private milestone {milestone_id} for tender {tender_id} not found"
            ))
        })
    }

    fn pending(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        let ms_ref = self.get_ref(stub, tender_id, milestone_id)?;
        if ms_ref.status != MilestoneStatus::Submitted {
            return Err(EngineError::InvalidState(format!(
                "milestone {milestone_id} is already {}",
                ms_ref.status
            )));
        }
        Ok(ms_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tnd_ledger::{MemoryLedger, TxInput};
    use tnd_schemas::parse_ts;

    const COLLECTION: &str = "milestonesCollection";

    fn input(nonce: u64) -> TxInput {
        TxInput::at(parse_ts("2025-03-01T00:00:00Z").unwrap()).nonce(nonce)
    }

    fn ledger_with_claim(ms: &MilestoneLifecycle) -> MemoryLedger {
        let mut ledger = MemoryLedger::with_collections([COLLECTION]);
        ledger
            .submit(input(0), |s| -> EngineResult<()> {
                s.put_state(&keys::tender("T1"), br#"{"id":"T1"}"#.to_vec())?;
                Ok(())
            })
            .unwrap();
        let claim = br#"{"tenderId":"T1","milestoneId":"M1","title":"Base course","evidenceHash":"ev-1","amount":1000}"#;
        ledger
            .submit(input(1).transient(MILESTONE_TRANSIENT_FIELD, claim.to_vec()), |s| {
                ms.submit(s, "T1", "M1")
            })
            .unwrap();
        ledger
    }

    #[test]
    fn approved_is_final() {
        let ms = MilestoneLifecycle::new(COLLECTION);
        let mut ledger = ledger_with_claim(&ms);

        let approved = ledger.submit(input(2), |s| ms.approve(s, "T1", "M1")).unwrap();
        assert_eq!(approved.status, MilestoneStatus::Approved);
        assert!(approved.payment_released);

        let again = ledger.submit(input(3), |s| ms.approve(s, "T1", "M1")).unwrap_err();
        assert_eq!(again.kind(), ErrorKind::InvalidState);
        let reject = ledger
            .submit(input(4), |s| ms.reject(s, "T1", "M1", "late"))
            .unwrap_err();
        assert_eq!(reject.kind(), ErrorKind::InvalidState);

        let stored = ledger.query(input(5), |s| ms.get_ref(&*s, "T1", "M1")).unwrap();
        assert!(stored.payment_released);
    }

    #[test]
    fn rejected_never_becomes_payable() {
        let ms = MilestoneLifecycle::new(COLLECTION);
        let mut ledger = ledger_with_claim(&ms);

        let rejected = ledger
            .submit(input(2), |s| ms.reject(s, "T1", "M1", "evidence unreadable"))
            .unwrap();
        assert_eq!(rejected.status, MilestoneStatus::Rejected);
        assert!(!rejected.payment_released);

        let approve = ledger.submit(input(3), |s| ms.approve(s, "T1", "M1")).unwrap_err();
        assert_eq!(approve.kind(), ErrorKind::InvalidState);
    }
}
