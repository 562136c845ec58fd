//! tnd-ledger
//!
//! The ledger seam of the procurement engine.
//!
//! - `LedgerGateway` is the contract every handler is written against:
//!   versioned public key-value state, ordered range scans, key history,
//!   access-controlled private collections, transient inputs, a deterministic
//!   transaction clock and advisory events.
//! - `MemoryLedger` is a deterministic in-memory implementation with
//!   execute-then-validate commits. It backs tests and the operator CLI. It is
//!   not a consensus implementation.

mod blob;
mod gateway;
mod memory;

pub use blob::Blob;
pub use gateway::{id_range, prefix_range, GatewayError, HistoryRecord, LedgerGateway, Transient};
pub use memory::{
    CommitError, CommitReceipt, CommittedEvent, MemoryLedger, PrivateAccess, RwSet, Simulated,
    TxInput, TxStub,
};
