//! Tender lifecycle.
//!
//! ```text
//! DRAFT --publish--> OPEN --close--> CLOSED --award--> AWARDED
//! ```
//!
//! One table serves both schemas. `Basic` tenders are born OPEN and may be
//! awarded from any non-terminal status; `Enhanced` tenders are born DRAFT and
//! award only from CLOSED. AWARDED and CANCELLED are terminal.

use serde::{Deserialize, Serialize};
use tnd_ledger::LedgerGateway;
use tnd_schemas::{
    format_ts, parse_ts, validate_basic_window, validate_enhanced_tender, validate_id,
    LedgerEvent, ProjectScope, Tender, TenderAwarded, TenderClosed, TenderCreated,
    TenderDeadlines, TenderPublished, TenderSchema, TenderStatus, WeightRule,
};

use crate::error::{EngineError, EngineResult};
use crate::keys;
use crate::store;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenderTransition {
    Publish,
    Close,
    Award,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub schema: TenderSchema,
    pub from: TenderStatus,
    pub transition: TenderTransition,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.from == TenderStatus::Awarded && self.transition == TenderTransition::Award {
            return f.write_str("tender is already AWARDED");
        }
        write!(
            f,
            "illegal tender transition: {} + {:?} ({:?} schema)",
            self.from, self.transition, self.schema
        )
    }
}

impl std::error::Error for TransitionError {}

impl From<TransitionError> for EngineError {
    fn from(e: TransitionError) -> Self {
        EngineError::InvalidState(e.to_string())
    }
}

pub fn next_status(
    schema: TenderSchema,
    from: TenderStatus,
    transition: TenderTransition,
) -> Result<TenderStatus, TransitionError> {
    use TenderStatus::*;
    use TenderTransition::*;

    match (schema, from, transition) {
        (_, Draft, Publish) => Ok(Open),
        (_, Open, Close) => Ok(Closed),
        (TenderSchema::Enhanced, Closed, Award) => Ok(Awarded),
        (TenderSchema::Basic, Draft | Open | Closed, Award) => Ok(Awarded),
        _ => Err(TransitionError {
            schema,
            from,
            transition,
        }),
    }
}

/// One committed version of a tender record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderVersion {
    pub tx_id: String,
    pub tx_time: String,
    pub block: u64,
    pub tender: Tender,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TenderLifecycle {
    weight_rule: WeightRule,
}

impl TenderLifecycle {
    pub fn new(weight_rule: WeightRule) -> Self {
        Self { weight_rule }
    }

    /// Structured RFQ constructor. The stored tender is always DRAFT at
    /// version 1, whatever lifecycle fields the caller sent.
    pub fn create(&self, stub: &mut dyn LedgerGateway, tender_json: &[u8]) -> EngineResult<Tender> {
        let mut tender: Tender = serde_json::from_slice(tender_json)
            .map_err(|e| EngineError::InvalidInput(format!("malformed tender JSON: {e}")))?;
        validate_id("id", &tender.id)?;

        let key = keys::tender(&tender.id);
        if store::exists(stub, &key)? {
            return Err(EngineError::AlreadyExists(format!(
                "tender {} already exists",
                tender.id
            )));
        }
        validate_enhanced_tender(&tender, self.weight_rule)?;

        let now = format_ts(store::now(stub)?);
        tender.schema = TenderSchema::Enhanced;
        tender.status = TenderStatus::Draft;
        tender.version = 1;
        tender.awarded_bid_id = None;
        tender.created_at = now.clone();
        tender.updated_at = now;

        store::write_json(stub, &key, &tender)?;
        store::emit(stub, &LedgerEvent::EnhancedRfqCreated(created_event(&tender)))?;
        tracing::info!(tender_id = %tender.id, "tender created");
        Ok(tender)
    }

    /// Legacy constructor: a fixed `[open_at, close_at)` window, open at once.
    pub fn create_basic(
        &self,
        stub: &mut dyn LedgerGateway,
        id: &str,
        description: &str,
        open_at: &str,
        close_at: &str,
        criteria_text: &str,
    ) -> EngineResult<Tender> {
        validate_id("id", id)?;
        let key = keys::tender(id);
        if store::exists(stub, &key)? {
            return Err(EngineError::AlreadyExists(format!("tender {id} already exists")));
        }
        // Bounds are stored verbatim, sub-second precision included.
        validate_basic_window(open_at, close_at)?;

        let now = format_ts(store::now(stub)?);
        let tender = Tender {
            id: id.to_string(),
            schema: TenderSchema::Basic,
            status: TenderStatus::Open,
            version: 1,
            project_scope: ProjectScope {
                description: description.to_string(),
                ..ProjectScope::default()
            },
            deadlines: TenderDeadlines {
                rfq_issue_date: Some(open_at.to_string()),
                bid_submission_deadline: close_at.to_string(),
                ..TenderDeadlines::default()
            },
            evaluation_criteria: Vec::new(),
            criteria_text: Some(criteria_text.to_string()),
            bid_requirements: serde_json::Value::Null,
            contract_terms: Default::default(),
            compliance_requirements: Vec::new(),
            owner: Default::default(),
            document_hashes: Default::default(),
            awarded_bid_id: None,
            created_at: now.clone(),
            updated_at: now,
        };

        store::write_json(stub, &key, &tender)?;
        store::emit(stub, &LedgerEvent::RfqCreated(created_event(&tender)))?;
        tracing::info!(tender_id = %id, "basic tender created");
        Ok(tender)
    }

    pub fn publish(&self, stub: &mut dyn LedgerGateway, id: &str) -> EngineResult<Tender> {
        let mut tender = self.get(stub, id)?;
        let next = next_status(tender.schema, tender.status, TenderTransition::Publish)?;

        let now = store::now(stub)?;
        let deadline = stored_ts("bidSubmissionDeadline", tender.submission_deadline())?;
        if deadline <= now {
            return Err(EngineError::WindowViolation(format!(
                "bid submission deadline {} is not after {}",
                tender.submission_deadline(),
                format_ts(now)
            )));
        }

        let now_s = format_ts(now);
        if tender.open_date().is_none() {
            tender.deadlines.rfq_issue_date = Some(now_s.clone());
        }
        apply(&mut tender, next, &now_s);

        store::write_json(stub, &keys::tender(id), &tender)?;
        store::emit(
            stub,
            &LedgerEvent::TenderPublished(TenderPublished {
                tender_id: tender.id.clone(),
                status: tender.status,
                published_at: now_s,
            }),
        )?;
        tracing::info!(tender_id = %id, "tender published");
        Ok(tender)
    }

    pub fn close(&self, stub: &mut dyn LedgerGateway, id: &str) -> EngineResult<Tender> {
        let mut tender = self.get(stub, id)?;
        let next = next_status(tender.schema, tender.status, TenderTransition::Close)?;

        let now_s = format_ts(store::now(stub)?);
        apply(&mut tender, next, &now_s);
        store::write_json(stub, &keys::tender(id), &tender)?;

        let payload = TenderClosed {
            tender_id: tender.id.clone(),
            status: tender.status,
            closed_at: now_s,
        };
        let event = match tender.schema {
            TenderSchema::Basic => LedgerEvent::BidWindowClosed(payload),
            TenderSchema::Enhanced => LedgerEvent::TenderClosed(payload),
        };
        store::emit(stub, &event)?;
        tracing::info!(tender_id = %id, "tender closed");
        Ok(tender)
    }

    pub fn award(
        &self,
        stub: &mut dyn LedgerGateway,
        id: &str,
        bid_id: &str,
    ) -> EngineResult<Tender> {
        let mut tender = self.get(stub, id)?;
        let next = next_status(tender.schema, tender.status, TenderTransition::Award)?;
        if !store::exists(stub, &keys::bid_ref(id, bid_id))? {
            return Err(EngineError::NotFound(format!(
                "bid {bid_id} not found for tender {id}"
            )));
        }

        let now_s = format_ts(store::now(stub)?);
        tender.awarded_bid_id = Some(bid_id.to_string());
        apply(&mut tender, next, &now_s);

        store::write_json(stub, &keys::tender(id), &tender)?;
        store::emit(
            stub,
            &LedgerEvent::TenderAwarded(TenderAwarded {
                tender_id: tender.id.clone(),
                bid_id: bid_id.to_string(),
                status: tender.status,
                awarded_at: now_s,
            }),
        )?;
        tracing::info!(tender_id = %id, bid_id = %bid_id, "tender awarded");
        Ok(tender)
    }

    pub fn get(&self, stub: &dyn LedgerGateway, id: &str) -> EngineResult<Tender> {
        store::require_json(stub, &keys::tender(id), &format!("tender {id}"))
    }

    /// Every tender, in key order.
    pub fn list(&self, stub: &dyn LedgerGateway) -> EngineResult<Vec<Tender>> {
        Ok(store::scan_json::<Tender>(stub, &keys::tenders())?
            .into_iter()
            .map(|(_, t)| t)
            .collect())
    }

    pub fn list_by_status(
        &self,
        stub: &dyn LedgerGateway,
        status: TenderStatus,
    ) -> EngineResult<Vec<Tender>> {
        Ok(self
            .list(stub)?
            .into_iter()
            .filter(|t| t.status == status)
            .collect())
    }

    /// Committed versions of the tender record, oldest first.
    pub fn history(&self, stub: &dyn LedgerGateway, id: &str) -> EngineResult<Vec<TenderVersion>> {
        let records = stub.get_history(&keys::tender(id))?;
        if records.is_empty() {
            return Err(EngineError::NotFound(format!("tender {id} not found")));
        }
        let mut out = Vec::with_capacity(records.len());
        for rec in records {
            match serde_json::from_slice::<Tender>(rec.value.as_bytes()) {
                Ok(tender) => out.push(TenderVersion {
                    tx_id: rec.tx_id,
                    tx_time: format_ts(rec.tx_time),
                    block: rec.block,
                    tender,
                }),
                Err(e) => tracing::warn!(tender_id = %id, tx_id = %rec.tx_id, error = %e,
                    "skipping undecodable history entry"),
            }
        }
        Ok(out)
    }
}

fn apply(tender: &mut Tender, next: TenderStatus, now: &str) {
    tender.status = next;
    tender.version += 1;
    tender.updated_at = now.to_string();
}

fn created_event(t: &Tender) -> TenderCreated {
    TenderCreated {
        tender_id: t.id.clone(),
        schema: t.schema,
        status: t.status,
        created_at: t.created_at.clone(),
        owner: t.owner.organization_name.clone(),
        description: t.description().to_string(),
    }
}

/// Timestamps on stored tenders were validated at create time; failing to
/// parse one now means the record is corrupt.
pub(crate) fn stored_ts(field: &str, raw: &str) -> EngineResult<chrono::DateTime<chrono::Utc>> {
    parse_ts(raw).map_err(|e| {
        EngineError::DependencyFailure(format!("stored {field} '{raw}' does not parse: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::TenderTransition::*;
    use super::*;
    use tnd_schemas::TenderSchema::{Basic, Enhanced};
    use tnd_schemas::TenderStatus::*;

    #[test]
    fn enhanced_happy_path() {
        assert_eq!(next_status(Enhanced, Draft, Publish), Ok(Open));
        assert_eq!(next_status(Enhanced, Open, Close), Ok(Closed));
        assert_eq!(next_status(Enhanced, Closed, Award), Ok(Awarded));
    }

    #[test]
    fn enhanced_award_is_strict() {
        assert!(next_status(Enhanced, Draft, Award).is_err());
        assert!(next_status(Enhanced, Open, Award).is_err());
    }

    #[test]
    fn basic_award_is_loose_but_not_repeatable() {
        for from in [Draft, Open, Closed] {
            assert_eq!(next_status(Basic, from, Award), Ok(Awarded), "from {from}");
        }
        let err = next_status(Basic, Awarded, Award).unwrap_err();
        assert_eq!(err.to_string(), "tender is already AWARDED");
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        for schema in [Basic, Enhanced] {
            for t in [Publish, Close, Award] {
                assert!(next_status(schema, Awarded, t).is_err());
                assert!(next_status(schema, Cancelled, t).is_err());
            }
        }
    }

    #[test]
    fn out_of_order_transitions_are_invalid_state() {
        let err: EngineError = next_status(Enhanced, Open, Publish).unwrap_err().into();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidState);
        assert!(next_status(Enhanced, Closed, Close).is_err());
        assert!(next_status(Enhanced, Draft, Close).is_err());
    }
}
