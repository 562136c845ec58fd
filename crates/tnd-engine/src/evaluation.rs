//! Evaluation engine: automated scoring of every sealed bid of a closed
//! tender, plus externally computed scores.

use tnd_config::ScoringConfig;
use tnd_ledger::LedgerGateway;
use tnd_schemas::{
    BidEvaluated, BidPrivate, BidRef, Evaluation, LedgerEvent, Tender, TenderStatus,
    AUTOMATED_EVALUATION_NOTE,
};

use crate::error::{EngineError, EngineResult};
use crate::keys;
use crate::scoring::score_bid;
use crate::store;

#[derive(Debug, Clone)]
pub struct Evaluator {
    bids_collection: String,
    scoring: ScoringConfig,
    weight_total: f64,
}

impl Evaluator {
    pub fn new(bids_collection: impl Into<String>, scoring: ScoringConfig, weight_total: f64) -> Self {
        Self {
            bids_collection: bids_collection.into(),
            scoring,
            weight_total,
        }
    }

    /// Score every readable bid in key order. Bids whose private payload
    /// cannot be loaded are skipped; the rest are still written.
    pub fn evaluate(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
    ) -> EngineResult<Vec<Evaluation>> {
        let tender: Tender =
            store::require_json(stub, &keys::tender(tender_id), &format!("tender {tender_id}"))?;
        if tender.status != TenderStatus::Closed {
            return Err(EngineError::InvalidState(format!(
                "tender {tender_id} is {}, evaluation requires CLOSED",
                tender.status
            )));
        }

        let refs: Vec<BidRef> = store::scan_json::<BidRef>(stub, &keys::bid_refs(tender_id))?
            .into_iter()
            .map(|(_, r)| r)
            .collect();
        if refs.is_empty() {
            return Err(EngineError::InvalidState(format!(
                "no bids to evaluate for tender {tender_id}"
            )));
        }

        let mut written = Vec::with_capacity(refs.len());
        for bid_ref in refs {
            let bid: Option<BidPrivate> = store::read_private_lenient(
                stub,
                &self.bids_collection,
                &keys::bid_private(tender_id, &bid_ref.bid_id),
            );
            let Some(bid) = bid else { continue };

            let score = score_bid(
                &bid,
                &tender.evaluation_criteria,
                &self.scoring,
                self.weight_total,
            );
            let eval = Evaluation {
                tender_id: tender_id.to_string(),
                bid_id: bid_ref.bid_id.clone(),
                score: score.total,
                notes: AUTOMATED_EVALUATION_NOTE.to_string(),
            };
            self.persist(stub, &eval)?;
            written.push(eval);
        }
        tracing::info!(tender_id = %tender_id, evaluated = written.len(), "bids evaluated");
        Ok(written)
    }

    pub fn record_evaluation(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
        score: f64,
        notes: &str,
    ) -> EngineResult<Evaluation> {
        let tender: Tender =
            store::require_json(stub, &keys::tender(tender_id), &format!("tender {tender_id}"))?;
        if tender.status.is_terminal() {
            return Err(EngineError::InvalidState(format!(
                "tender {tender_id} is {}",
                tender.status
            )));
        }
        if !store::exists(stub, &keys::bid_ref(tender_id, bid_id))? {
            return Err(EngineError::NotFound(format!(
                "bid {bid_id} not found for tender {tender_id}"
            )));
        }
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(EngineError::InvalidInput(format!(
                "score must be within [0, 100], got {score}"
            )));
        }

        let eval = Evaluation {
            tender_id: tender_id.to_string(),
            bid_id: bid_id.to_string(),
            score,
            notes: notes.to_string(),
        };
        self.persist(stub, &eval)?;
        tracing::info!(tender_id = %tender_id, bid_id = %bid_id, "evaluation recorded");
        Ok(eval)
    }

    pub fn list_evaluations(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
    ) -> EngineResult<Vec<Evaluation>> {
        Ok(store::scan_json::<Evaluation>(stub, &keys::evaluations(tender_id))?
            .into_iter()
            .map(|(_, e)| e)
            .collect())
    }

    fn persist(&self, stub: &mut dyn LedgerGateway, eval: &Evaluation) -> EngineResult<()> {
        store::write_json(stub, &keys::evaluation(&eval.tender_id, &eval.bid_id), eval)?;
        store::emit(
            stub,
            &LedgerEvent::BidEvaluated(BidEvaluated {
                tender_id: eval.tender_id.clone(),
                bid_id: eval.bid_id.clone(),
                score: eval.score,
            }),
        )
    }
}
