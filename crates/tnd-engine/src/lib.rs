//! tnd-engine
//!
//! Tender, bid and milestone lifecycle handlers over a `LedgerGateway`.
//!
//! - `Contract` is the only entry surface. Each method is one transaction.
//! - Handlers are deterministic: time comes from the transaction clock, ids
//!   and collection names from the caller, ordering from key order.
//! - Private payloads are stored verbatim; the public side only ever sees
//!   their sha256 commitment.
//! - Any `EngineError` aborts the transaction; nothing is retried here.

mod award;
mod bid;
mod commitment;
mod contract;
mod error;
mod evaluation;
mod milestone;
mod payments;
mod stats;
mod store;
mod tender;

pub mod keys;
pub mod scoring;

pub use award::{select_winner, AwardOutcome, AwardSelector};
pub use bid::{check_window, BidCommitments, BID_TRANSIENT_FIELD};
pub use commitment::{content_digest, CommitmentCheck};
pub use contract::Contract;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use evaluation::Evaluator;
pub use milestone::{MilestoneLifecycle, MILESTONE_TRANSIENT_FIELD};
pub use payments::{FinancialSummary, MilestoneCounts, Payments};
pub use stats::{BidStatistics, TenderStatistics};
pub use tender::{next_status, TenderLifecycle, TenderTransition, TenderVersion, TransitionError};
