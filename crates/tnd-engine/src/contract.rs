//! The public entry points of the procurement contract.
//!
//! Every method is one transaction handler: it runs against a single
//! `LedgerGateway` and either returns `Ok` with all writes and events staged,
//! or an `EngineError` after which the caller must discard the transaction.

use tnd_config::EngineConfig;
use tnd_ledger::LedgerGateway;
use tnd_schemas::{
    BidPrivate, BidRef, Evaluation, MilestonePayments, MilestonePrivate, MilestoneRef,
    RetentionRelease, Tender, TenderStatus,
};

use crate::award::{AwardOutcome, AwardSelector};
use crate::bid::BidCommitments;
use crate::commitment::CommitmentCheck;
use crate::error::EngineResult;
use crate::evaluation::Evaluator;
use crate::milestone::MilestoneLifecycle;
use crate::payments::{FinancialSummary, Payments};
use crate::stats::{tender_statistics, TenderStatistics};
use crate::tender::{TenderLifecycle, TenderVersion};

#[derive(Debug, Clone)]
pub struct Contract {
    tenders: TenderLifecycle,
    bids: BidCommitments,
    milestones: MilestoneLifecycle,
    evaluator: Evaluator,
    award: AwardSelector,
    payments: Payments,
}

impl Contract {
    pub fn new(cfg: &EngineConfig) -> Self {
        let c = &cfg.collections;
        Self {
            tenders: TenderLifecycle::new(cfg.weight_rule()),
            bids: BidCommitments::new(c.bids.clone()),
            milestones: MilestoneLifecycle::new(c.milestones.clone()),
            evaluator: Evaluator::new(
                c.bids.clone(),
                cfg.scoring.clone(),
                cfg.validation.weight_total,
            ),
            award: AwardSelector,
            payments: Payments::new(c.bids.clone(), c.milestones.clone()),
        }
    }

    pub fn bids_collection(&self) -> &str {
        self.bids.collection()
    }

    pub fn milestones_collection(&self) -> &str {
        self.milestones.collection()
    }

    // -----------------------------------------------------------------------
    // Tenders
    // -----------------------------------------------------------------------

    pub fn create_tender(&self, stub: &mut dyn LedgerGateway, tender_json: &[u8]) -> EngineResult<Tender> {
        self.tenders.create(stub, tender_json)
    }

    pub fn create_basic_tender(
        &self,
        stub: &mut dyn LedgerGateway,
        id: &str,
        description: &str,
        open_at: &str,
        close_at: &str,
        criteria_text: &str,
    ) -> EngineResult<Tender> {
        self.tenders
            .create_basic(stub, id, description, open_at, close_at, criteria_text)
    }

    pub fn publish_tender(&self, stub: &mut dyn LedgerGateway, id: &str) -> EngineResult<Tender> {
        self.tenders.publish(stub, id)
    }

    pub fn close_tender(&self, stub: &mut dyn LedgerGateway, id: &str) -> EngineResult<Tender> {
        self.tenders.close(stub, id)
    }

    pub fn award_tender(
        &self,
        stub: &mut dyn LedgerGateway,
        id: &str,
        bid_id: &str,
    ) -> EngineResult<Tender> {
        self.tenders.award(stub, id, bid_id)
    }

    pub fn award_best_bid(&self, stub: &mut dyn LedgerGateway, id: &str) -> EngineResult<AwardOutcome> {
        self.award.award_best(stub, id, &self.tenders, &self.evaluator)
    }

    pub fn get_tender(&self, stub: &dyn LedgerGateway, id: &str) -> EngineResult<Tender> {
        self.tenders.get(stub, id)
    }

    pub fn list_tenders(&self, stub: &dyn LedgerGateway) -> EngineResult<Vec<Tender>> {
        self.tenders.list(stub)
    }

    pub fn list_tenders_by_status(
        &self,
        stub: &dyn LedgerGateway,
        status: TenderStatus,
    ) -> EngineResult<Vec<Tender>> {
        self.tenders.list_by_status(stub, status)
    }

    pub fn tender_history(&self, stub: &dyn LedgerGateway, id: &str) -> EngineResult<Vec<TenderVersion>> {
        self.tenders.history(stub, id)
    }

    pub fn tender_statistics(&self, stub: &dyn LedgerGateway, id: &str) -> EngineResult<TenderStatistics> {
        tender_statistics(stub, self.bids.collection(), id)
    }

    // -----------------------------------------------------------------------
    // Bids
    // -----------------------------------------------------------------------

    /// Payload in transient field `bid`.
    pub fn submit_bid(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<BidRef> {
        self.bids.submit(stub, tender_id, bid_id)
    }

    pub fn list_bids(&self, stub: &dyn LedgerGateway, tender_id: &str) -> EngineResult<Vec<BidRef>> {
        self.bids.list_public(stub, tender_id)
    }

    pub fn get_bid_ref(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<BidRef> {
        self.bids.get_ref(stub, tender_id, bid_id)
    }

    pub fn read_bid_private(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<BidPrivate> {
        self.bids.read_private(stub, tender_id, bid_id)
    }

    pub fn verify_bid(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
    ) -> EngineResult<CommitmentCheck> {
        self.bids.verify(stub, tender_id, bid_id)
    }

    // -----------------------------------------------------------------------
    // Evaluations
    // -----------------------------------------------------------------------

    pub fn evaluate_bids(&self, stub: &mut dyn LedgerGateway, tender_id: &str) -> EngineResult<Vec<Evaluation>> {
        self.evaluator.evaluate(stub, tender_id)
    }

    pub fn record_evaluation(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        bid_id: &str,
        score: f64,
        notes: &str,
    ) -> EngineResult<Evaluation> {
        self.evaluator
            .record_evaluation(stub, tender_id, bid_id, score, notes)
    }

    pub fn list_evaluations(&self, stub: &dyn LedgerGateway, tender_id: &str) -> EngineResult<Vec<Evaluation>> {
        self.evaluator.list_evaluations(stub, tender_id)
    }

    // -----------------------------------------------------------------------
    // Milestones
    // -----------------------------------------------------------------------

    /// Payload in transient field `milestone`.
    pub fn submit_milestone(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        self.milestones.submit(stub, tender_id, milestone_id)
    }

    pub fn approve_milestone(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        self.milestones.approve(stub, tender_id, milestone_id)
    }

    pub fn reject_milestone(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
        reason: &str,
    ) -> EngineResult<MilestoneRef> {
        self.milestones.reject(stub, tender_id, milestone_id, reason)
    }

    pub fn list_milestones(&self, stub: &dyn LedgerGateway, tender_id: &str) -> EngineResult<Vec<MilestoneRef>> {
        self.milestones.list_public(stub, tender_id)
    }

    pub fn get_milestone_ref(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestoneRef> {
        self.milestones.get_ref(stub, tender_id, milestone_id)
    }

    pub fn read_milestone_private(
        &self,
        stub: &dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
    ) -> EngineResult<MilestonePrivate> {
        self.milestones.read_private(stub, tender_id, milestone_id)
    }

    // -----------------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------------

    pub fn record_partial_payment(
        &self,
        stub: &mut dyn LedgerGateway,
        tender_id: &str,
        milestone_id: &str,
        amount: f64,
    ) -> EngineResult<MilestonePayments> {
        self.payments
            .record_partial_payment(stub, tender_id, milestone_id, amount)
    }

    pub fn release_retention(&self, stub: &mut dyn LedgerGateway, tender_id: &str) -> EngineResult<RetentionRelease> {
        self.payments.release_retention(stub, tender_id)
    }

    pub fn financial_summary(&self, stub: &dyn LedgerGateway, tender_id: &str) -> EngineResult<FinancialSummary> {
        self.payments.financial_summary(stub, tender_id)
    }
}
