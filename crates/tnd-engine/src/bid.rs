//! Sealed bids.
//!
//! A bid is split in two: the full payload goes to the bids collection only,
//! and a public reference carrying its sha256 is replicated to everyone.
//! Anyone holding the payload can later prove it is the bid that was
//! committed to before the deadline.

use chrono::{DateTime, Utc};
use tnd_ledger::LedgerGateway;
use tnd_schemas::{
    format_ts, validate_bid, validate_id, BidPrivate, BidRef, BidSubmitted, LedgerEvent, Tender,
    TenderSchema, TenderStatus,
};

use crate::commitment::{content_digest, CommitmentCheck};
use crate::error::{EngineError, EngineResult};
use crate::keys;
use crate::store;
use crate::tender::stored_ts;

pub const BID_TRANSIENT_FIELD: &str = "bid";

#[derive(Debug, Clone)]
pub struct BidCommitments {
    collection: String,
}

impl BidCommitments {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Commit a sealed bid read from the `bid` transient field.
    pub fn submit(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<BidRef> {
        let tender: Tender =
            store::require_json(stub, &keys::tender(tender_id), &format!("tender {tender_id}"))?;
        if tender.status != TenderStatus::Open {
            return Err(EngineError::InvalidState(format!(
                "tender {tender_id} is {}, bids require OPEN",
                tender.status
            )));
        }
        let now = store::now(stub)?;
        check_window(&tender, now)?;

        let raw = store::transient_field(stub, BID_TRANSIENT_FIELD)?;
        let bid: BidPrivate = serde_json::from_slice(&raw)
            .map_err(|e| EngineError::InvalidInput(format!("malformed bid JSON: {e}")))?;
        if bid.tender_id != tender_id || bid.bid_id != bid_id {
            return Err(EngineError::InvalidInput(format!(
                "bid payload is for {}/{}, not {tender_id}/{bid_id}",
                bid.tender_id, bid.bid_id
            )));
        }
        validate_id("bidId", bid_id)?;

        let ref_key = keys::bid_ref(tender_id, bid_id);
        if store::exists(stub, &ref_key)? {
            return Err(EngineError::AlreadyExists(format!(
                "bid {bid_id} already submitted for tender {tender_id}"
            )));
        }
        validate_bid(&bid, tender.schema)?;

        let bid_ref = BidRef {
            tender_id: tender_id.to_string(),
            bid_id: bid_id.to_string(),
            contractor_id: bid.contractor_id.clone(),
            bid_hash: content_digest(&raw),
        };

        stub.put_private_data(&self.collection, &keys::bid_private(tender_id, bid_id), raw)?;
        store::write_json(stub, &ref_key, &bid_ref)?;

        let payload = BidSubmitted {
            tender_id: bid_ref.tender_id.clone(),
            bid_id: bid_ref.bid_id.clone(),
            contractor_id: bid_ref.contractor_id.clone(),
            bid_hash: bid_ref.bid_hash.clone(),
            submitted_at: format_ts(now),
        };
        let event = match tender.schema {
            TenderSchema::Basic => LedgerEvent::BidSubmitted(payload),
            TenderSchema::Enhanced => LedgerEvent::EnhancedBidSubmitted(payload),
        };
        store::emit(stub, &event)?;
        tracing::info!(tender_id = %tender_id, bid_id = %bid_id, "bid committed");
        Ok(bid_ref)
    }

    /// Public references in key order.
    pub fn list_public(&self, stub: &dyn LedgerGateway, tender_id: &str) -> EngineResult<Vec<BidRef>> {
        Ok(store::scan_json::<BidRef>(stub, &keys::bid_refs(tender_id))?
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| r.tender_id == tender_id)
            .collect())
    }

    pub fn get_ref(&self, stub: &dyn LedgerGateway, tender_id: &str, bid_id: &str) -> EngineResult<BidRef> {
        store::require_json(
            stub,
            &keys::bid_ref(tender_id, bid_id),
            &format!("bid {bid_id} for tender {tender_id}"),
        )
    }

    /// Collection membership is enforced by the gateway; a denied read is a
    /// `DependencyFailure`.
    pub fn read_private(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<BidPrivate> {
        store::read_private(stub, &self.collection, &keys::bid_private(tender_id, bid_id))?
            .map(|(_, bid)| bid)
            .ok_or_else(|| {
                EngineError::NotFound(format!("private bid {bid_id} for tender {tender_id} not found"))
            })
    }

    /// Re-hash the stored payload and compare it with the public commitment.
    pub fn verify(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<CommitmentCheck> {
        let bid_ref = self.get_ref(stub, tender_id, bid_id)?;
        let raw = stub
            .get_private_data(&self.collection, &keys::bid_private(tender_id, bid_id))?
            .ok_or_else(|| {
                EngineError::NotFound(format!("private bid {bid_id} for tender {tender_id} not found"))
            })?;
        Ok(CommitmentCheck::new(tender_id, bid_id, &bid_ref.bid_hash, &raw))
    }
}

/// `[open date, submission deadline)`, open end exclusive.
pub fn check_window(tender: &Tender, now: DateTime<Utc>) -> EngineResult<()> {
    if let Some(open) = tender.open_date() {
        let open_at = stored_ts("rfqIssueDate", open)?;
        if now < open_at {
            return Err(EngineError::WindowViolation(format!(
                "bid window for tender {} opens at {open}",
                tender.id
            )));
        }
    }
    let deadline = stored_ts("bidSubmissionDeadline", tender.submission_deadline())?;
    if now >= deadline {
        return Err(EngineError::WindowViolation(format!(
            "bid window for tender {} closed at {}",
            tender.id,
            tender.submission_deadline()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tnd_schemas::parse_ts;

    fn tender_with_window(open: Option<&str>, close: &str) -> Tender {
        let mut t: Tender = serde_json::from_str(r#"{"id":"T1","status":"OPEN"}"#).unwrap();
        t.deadlines.rfq_issue_date = open.map(str::to_string);
        t.deadlines.bid_submission_deadline = close.to_string();
        t
    }

    #[test]
    fn window_is_closed_open() {
        let t = tender_with_window(Some("2025-01-01T00:00:00Z"), "2025-02-01T00:00:00Z");

        assert!(check_window(&t, parse_ts("2025-01-01T00:00:00Z").unwrap()).is_ok());
        assert!(check_window(&t, parse_ts("2025-01-31T23:59:59Z").unwrap()).is_ok());

        let early = check_window(&t, parse_ts("2024-12-31T23:59:59Z").unwrap()).unwrap_err();
        assert_eq!(early.kind(), ErrorKind::WindowViolation);
        let at_deadline = check_window(&t, parse_ts("2025-02-01T00:00:00Z").unwrap()).unwrap_err();
        assert_eq!(at_deadline.kind(), ErrorKind::WindowViolation);
    }

    #[test]
    fn no_open_date_means_only_the_deadline_applies() {
        let t = tender_with_window(None, "2025-02-01T00:00:00Z");
        assert!(check_window(&t, parse_ts("2000-01-01T00:00:00Z").unwrap()).is_ok());
    }
}
