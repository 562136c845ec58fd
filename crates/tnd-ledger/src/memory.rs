//! Deterministic in-memory ledger.
//!
//! Execute-then-validate, the way an endorsing ledger runs chaincode:
//! - `simulate` runs a handler against the committed snapshot and returns the
//!   handler output plus a read/write set. Nothing is applied.
//! - `commit` re-checks every version the handler observed (keys, private
//!   keys and range scans). Any drift is a `CommitError` and the whole
//!   transaction is dropped. Otherwise writes, private writes and events are
//!   applied together in one new block.
//! - A handler that returns `Err` never yields a read/write set, so a failed
//!   transaction leaves no trace.
//!
//! No randomness and no wall clock. Transaction ids are uuid v5 over
//! (height, nonce, tx time).

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::Blob;
use crate::gateway::{GatewayError, HistoryRecord, LedgerGateway, Transient};

// ---------------------------------------------------------------------------
// Committed state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Versioned {
    value: Blob,
    version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedEvent {
    pub block: u64,
    pub tx_id: String,
    pub name: String,
    pub payload: Blob,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    height: u64,
    state: BTreeMap<String, Versioned>,
    history: BTreeMap<String, Vec<HistoryRecord>>,
    collections: BTreeMap<String, BTreeMap<String, Versioned>>,
    events: Vec<CommittedEvent>,
}

// ---------------------------------------------------------------------------
// Transaction input / output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateAccess {
    All,
    Only(BTreeSet<String>),
}

impl PrivateAccess {
    fn allows(&self, collection: &str) -> bool {
        match self {
            PrivateAccess::All => true,
            PrivateAccess::Only(set) => set.contains(collection),
        }
    }
}

/// Everything the submitting client contributes to a transaction.
#[derive(Debug, Clone)]
pub struct TxInput {
    pub tx_time: DateTime<Utc>,
    pub transient: Transient,
    pub access: PrivateAccess,
    pub nonce: u64,
}

impl TxInput {
    pub fn at(tx_time: DateTime<Utc>) -> Self {
        Self {
            tx_time,
            transient: Transient::new(),
            access: PrivateAccess::All,
            nonce: 0,
        }
    }

    pub fn transient(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.transient.insert(name.to_string(), bytes.into());
        self
    }

    /// Restrict private reads to the named collections.
    pub fn private_access(mut self, collections: &[&str]) -> Self {
        self.access = PrivateAccess::Only(collections.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RangeRead {
    start: String,
    end: String,
    seen: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ReadSet {
    keys: BTreeMap<String, Option<u64>>,
    ranges: Vec<RangeRead>,
    private: BTreeMap<(String, String), Option<u64>>,
}

/// Result of simulating one transaction. Feed it to `MemoryLedger::commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RwSet {
    tx_id: String,
    tx_time: DateTime<Utc>,
    reads: ReadSet,
    writes: BTreeMap<String, Vec<u8>>,
    private_writes: BTreeMap<(String, String), Vec<u8>>,
    events: Vec<(String, Vec<u8>)>,
}

impl RwSet {
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty() && self.private_writes.is_empty() && self.events.is_empty()
    }
}

#[derive(Debug)]
pub struct Simulated<T> {
    pub output: T,
    pub rw_set: RwSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub block: u64,
    pub tx_id: String,
    pub writes: usize,
    pub events: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// A key read during simulation changed version before commit.
    MvccConflict { key: String },
    /// A range scan would now return a different key set.
    PhantomRead { start: String, end: String },
}

impl std::fmt::Display for CommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitError::MvccConflict { key } => {
                write!(f, "read conflict on '{key}', transaction invalidated")
            }
            CommitError::PhantomRead { start, end } => {
                write!(f, "phantom read in range ['{start}', '{end}'), transaction invalidated")
            }
        }
    }
}

impl std::error::Error for CommitError {}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with the given private collections defined.
    pub fn with_collections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = Self::new();
        for name in names {
            ledger.define_collection(name);
        }
        ledger
    }

    pub fn define_collection(&mut self, name: impl Into<String>) {
        self.collections.entry(name.into()).or_default();
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn events(&self) -> &[CommittedEvent] {
        &self.events
    }

    /// Committed public value, for inspection outside a transaction.
    pub fn state_value(&self, key: &str) -> Option<&[u8]> {
        self.state.get(key).map(|v| v.value.as_bytes())
    }

    /// Committed private value, for inspection outside a transaction.
    pub fn private_value(&self, collection: &str, key: &str) -> Option<&[u8]> {
        self.collections
            .get(collection)
            .and_then(|c| c.get(key))
            .map(|v| v.value.as_bytes())
    }

    /// Drop a private value (retention expiry). The public record is untouched.
    pub fn purge_private(&mut self, collection: &str, key: &str) -> bool {
        self.collections
            .get_mut(collection)
            .map(|c| c.remove(key).is_some())
            .unwrap_or(false)
    }

    fn derive_tx_id(&self, input: &TxInput) -> String {
        let seed = format!(
            "tnd-tx:{}:{}:{}",
            self.height,
            input.nonce,
            input.tx_time.to_rfc3339_opts(SecondsFormat::Nanos, true)
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
    }

    fn range_versions(&self, start: &str, end: &str) -> Vec<(String, u64)> {
        if start >= end {
            return Vec::new();
        }
        self.state
            .range::<str, _>((
                std::ops::Bound::Included(start),
                std::ops::Bound::Excluded(end),
            ))
            .map(|(k, v)| (k.clone(), v.version))
            .collect()
    }

    /// Run `handler` against the committed snapshot without applying anything.
    pub fn simulate<T, E>(
        &self,
        input: TxInput,
        handler: impl FnOnce(&mut TxStub<'_>) -> Result<T, E>,
    ) -> Result<Simulated<T>, E> {
        let tx_id = self.derive_tx_id(&input);
        let mut stub = TxStub {
            ledger: self,
            input,
            tx_id,
            reads: RefCell::new(ReadSet::default()),
            writes: BTreeMap::new(),
            private_writes: BTreeMap::new(),
            events: Vec::new(),
        };
        let output = handler(&mut stub)?;
        Ok(Simulated {
            output,
            rw_set: stub.into_rw_set(),
        })
    }

    /// Validate `rw` against current state and apply it as one block.
    pub fn commit(&mut self, rw: RwSet) -> Result<CommitReceipt, CommitError> {
        for (key, seen) in &rw.reads.keys {
            let current = self.state.get(key).map(|v| v.version);
            if current != *seen {
                tracing::warn!(tx_id = %rw.tx_id, key = %key, "mvcc conflict");
                return Err(CommitError::MvccConflict { key: key.clone() });
            }
        }
        for range in &rw.reads.ranges {
            if self.range_versions(&range.start, &range.end) != range.seen {
                tracing::warn!(tx_id = %rw.tx_id, start = %range.start, "phantom read");
                return Err(CommitError::PhantomRead {
                    start: range.start.clone(),
                    end: range.end.clone(),
                });
            }
        }
        for ((collection, key), seen) in &rw.reads.private {
            let current = self
                .collections
                .get(collection)
                .and_then(|c| c.get(key))
                .map(|v| v.version);
            if current != *seen {
                return Err(CommitError::MvccConflict {
                    key: format!("{collection}/{key}"),
                });
            }
        }

        if rw.is_read_only() {
            return Ok(CommitReceipt {
                block: self.height,
                tx_id: rw.tx_id,
                writes: 0,
                events: 0,
            });
        }

        self.height += 1;
        let block = self.height;
        let writes = rw.writes.len() + rw.private_writes.len();
        let events = rw.events.len();

        for (key, value) in rw.writes {
            self.history.entry(key.clone()).or_default().push(HistoryRecord {
                tx_id: rw.tx_id.clone(),
                tx_time: rw.tx_time,
                block,
                value: Blob(value.clone()),
            });
            self.state.insert(
                key,
                Versioned {
                    value: Blob(value),
                    version: block,
                },
            );
        }
        for ((collection, key), value) in rw.private_writes {
            self.collections.entry(collection).or_default().insert(
                key,
                Versioned {
                    value: Blob(value),
                    version: block,
                },
            );
        }
        for (name, payload) in rw.events {
            self.events.push(CommittedEvent {
                block,
                tx_id: rw.tx_id.clone(),
                name,
                payload: Blob(payload),
            });
        }

        tracing::debug!(block, tx_id = %rw.tx_id, writes, events, "block committed");
        Ok(CommitReceipt {
            block,
            tx_id: rw.tx_id,
            writes,
            events,
        })
    }

    /// Simulate and commit in one step.
    pub fn submit<T, E>(
        &mut self,
        input: TxInput,
        handler: impl FnOnce(&mut TxStub<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<CommitError>,
    {
        let sim = self.simulate(input, handler)?;
        self.commit(sim.rw_set)?;
        Ok(sim.output)
    }

    /// Simulate and discard the read/write set.
    pub fn query<T, E>(
        &self,
        input: TxInput,
        handler: impl FnOnce(&mut TxStub<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        self.simulate(input, handler).map(|sim| sim.output)
    }
}

// ---------------------------------------------------------------------------
// Transaction stub
// ---------------------------------------------------------------------------

/// Per-transaction view handed to handlers.
pub struct TxStub<'a> {
    ledger: &'a MemoryLedger,
    input: TxInput,
    tx_id: String,
    reads: RefCell<ReadSet>,
    writes: BTreeMap<String, Vec<u8>>,
    private_writes: BTreeMap<(String, String), Vec<u8>>,
    events: Vec<(String, Vec<u8>)>,
}

impl TxStub<'_> {
    fn into_rw_set(self) -> RwSet {
        RwSet {
            tx_id: self.tx_id,
            tx_time: self.input.tx_time,
            reads: self.reads.into_inner(),
            writes: self.writes,
            private_writes: self.private_writes,
            events: self.events,
        }
    }

    fn check_collection(&self, collection: &str) -> Result<(), GatewayError> {
        if !self.ledger.collections.contains_key(collection) {
            return Err(GatewayError::UnknownCollection(collection.to_string()));
        }
        Ok(())
    }
}

impl LedgerGateway for TxStub<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, GatewayError> {
        let current = self.ledger.state.get(key);
        self.reads
            .borrow_mut()
            .keys
            .entry(key.to_string())
            .or_insert_with(|| current.map(|v| v.version));
        Ok(current.map(|v| v.value.0.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), GatewayError> {
        if key.is_empty() {
            return Err(GatewayError::Unavailable("empty key".to_string()));
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, GatewayError> {
        let seen = self.ledger.range_versions(start, end);
        let out = seen
            .iter()
            .filter_map(|(k, _)| {
                self.ledger
                    .state
                    .get(k)
                    .map(|v| (k.clone(), v.value.0.clone()))
            })
            .collect();
        self.reads.borrow_mut().ranges.push(RangeRead {
            start: start.to_string(),
            end: end.to_string(),
            seen,
        });
        Ok(out)
    }

    fn get_history(&self, key: &str) -> Result<Vec<HistoryRecord>, GatewayError> {
        Ok(self.ledger.history.get(key).cloned().unwrap_or_default())
    }

    fn get_private_data(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, GatewayError> {
        self.check_collection(collection)?;
        if !self.input.access.allows(collection) {
            return Err(GatewayError::AccessDenied {
                collection: collection.to_string(),
            });
        }
        let current = self
            .ledger
            .collections
            .get(collection)
            .and_then(|c| c.get(key));
        self.reads
            .borrow_mut()
            .private
            .entry((collection.to_string(), key.to_string()))
            .or_insert_with(|| current.map(|v| v.version));
        Ok(current.map(|v| v.value.0.clone()))
    }

    fn put_private_data(
        &mut self,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), GatewayError> {
        self.check_collection(collection)?;
        self.private_writes
            .insert((collection.to_string(), key.to_string()), value);
        Ok(())
    }

    fn get_transient(&self) -> Result<Transient, GatewayError> {
        Ok(self.input.transient.clone())
    }

    fn tx_time(&self) -> Result<DateTime<Utc>, GatewayError> {
        Ok(self.input.tx_time)
    }

    fn tx_id(&self) -> String {
        self.tx_id.clone()
    }

    fn emit_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), GatewayError> {
        self.events.push((name.to_string(), payload));
        Ok(())
    }
}
