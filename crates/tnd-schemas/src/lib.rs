//! tnd-schemas
//!
//! Ledger records for the procurement engine: tenders, sealed bids,
//! milestones, evaluations and the typed events emitted on each transition.
//!
//! Every record serializes as camelCase JSON. Maps are `BTreeMap` so the
//! bytes written by one replica match every other replica.

mod bid;
mod criteria;
mod evaluation;
mod events;
mod milestone;
mod tender;
mod time;
mod validate;

pub use bid::{BidPrivate, BidRef, FinancialProposal, PhaseCosting, TechnicalProposal};
pub use criteria::{CriterionType, EvalCriterion, SubCriterion};
pub use evaluation::{Evaluation, AUTOMATED_EVALUATION_NOTE};
pub use events::{
    BidEvaluated, BidSubmitted, EventDecodeError, LedgerEvent, MilestoneRejected,
    PartialPaymentRecorded, PaymentReleased, RetentionReleased, TenderAwarded, TenderClosed,
    TenderCreated, TenderPublished,
};
pub use milestone::{
    MilestonePayments, MilestonePrivate, MilestoneRef, MilestoneStatus, PaymentEntry,
};
pub use tender::{
    Budget, ComplianceReq, ContractTerms, Extra, MilestoneDeadline, OwnerInfo, PaymentTerms,
    ProjectScope, RetentionRelease, Tender, TenderDeadlines, TenderSchema, TenderStatus,
};
pub use time::{format_ts, parse_ts};
pub use validate::{
    validate_basic_window, validate_bid, validate_criteria, validate_enhanced_tender, validate_id,
    validate_milestone, ValidationError, WeightRule,
};
