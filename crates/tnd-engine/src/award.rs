//! Award selector: pick the best evaluated bid and award the tender to it.

use serde::{Deserialize, Serialize};
use tnd_ledger::LedgerGateway;
use tnd_schemas::{Evaluation, Tender, TenderStatus};

use crate::error::{EngineError, EngineResult};
use crate::evaluation::Evaluator;
use crate::tender::TenderLifecycle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardOutcome {
    pub tender: Tender,
    pub winner: Evaluation,
}

/// Highest score wins; equal scores go to the lowest bid id in byte order.
/// Non-finite scores never win.
pub fn select_winner(evaluations: &[Evaluation]) -> Option<&Evaluation> {
    let mut best: Option<&Evaluation> = None;
    for e in evaluations.iter().filter(|e| e.score.is_finite()) {
        best = match best {
            None => Some(e),
            Some(b) if e.score > b.score => Some(e),
            Some(b) if e.score == b.score && e.bid_id.as_bytes() < b.bid_id.as_bytes() => Some(e),
            keep => keep,
        };
    }
    best
}

#[derive(Debug, Clone)]
pub struct AwardSelector;

impl AwardSelector {
    pub fn award_best(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        tenders: &TenderLifecycle,
        evaluator: &Evaluator,
    ) -> EngineResult<AwardOutcome> {
        let tender = tenders.get(stub, tender_id)?;
        if tender.status != TenderStatus::Closed {
            return Err(EngineError::InvalidState(format!(
                "tender {tender_id} is {}, award requires CLOSED",
                tender.status
            )));
        }

        let evaluations = evaluator.list_evaluations(stub, tender_id)?;
        let winner = select_winner(&evaluations)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("no evaluations for tender {tender_id}")))?;
        tracing::debug!(tender_id = %tender_id, bid_id = %winner.bid_id, "winner selected");

        let tender = tenders.award(stub, tender_id, &winner.bid_id)?;
        Ok(AwardOutcome { tender, winner })
    }
}
