//! Ledger Gateway: the only way handler code touches the replicated ledger.
//!
//! # Contract
//!
//! - Reads observe committed state as of the start of the transaction. A
//!   transaction never sees its own writes.
//! - `get_state_range(start, end)` is start-inclusive, end-exclusive and
//!   returns keys in ascending byte order. `"<prefix>_<id>_"` ..
//!   `"<prefix>_<id>_~"` addresses everything filed under one id.
//! - `tx_time` is the deterministic, consensus-agreed timestamp of the
//!   transaction. Handlers must never consult a wall clock.
//! - `emit_event` is advisory. Events commit together with the writes or not
//!   at all.
//! - Private collections are access-controlled by the gateway; a denied read
//!   is a `GatewayError::AccessDenied`, not an absent value.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::blob::Blob;

/// Caller-supplied fields that are visible to the handler but never written
/// to the ledger.
pub type Transient = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The collection exists but this caller may not read or write it.
    AccessDenied { collection: String },
    /// The collection is not defined on this ledger.
    UnknownCollection(String),
    /// Substrate failure (peer unavailable, storage error, ...).
    Unavailable(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::AccessDenied { collection } => {
                write!(f, "access to private collection '{collection}' denied")
            }
            GatewayError::UnknownCollection(c) => write!(f, "unknown private collection '{c}'"),
            GatewayError::Unavailable(msg) => write!(f, "ledger unavailable: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// One committed version of a key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryRecord {
    pub tx_id: String,
    pub tx_time: DateTime<Utc>,
    pub block: u64,
    pub value: Blob,
}

pub trait LedgerGateway {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, GatewayError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), GatewayError>;

    fn get_state_range(&self, start: &str, end: &str)
        -> Result<Vec<(String, Vec<u8>)>, GatewayError>;

    /// Committed versions of `key`, oldest first.
    fn get_history(&self, key: &str) -> Result<Vec<HistoryRecord>, GatewayError>;

    fn get_private_data(&self, collection: &str, key: &str)
        -> Result<Option<Vec<u8>>, GatewayError>;

    fn put_private_data(
        &mut self,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), GatewayError>;

    fn get_transient(&self) -> Result<Transient, GatewayError>;

    fn tx_time(&self) -> Result<DateTime<Utc>, GatewayError>;

    fn tx_id(&self) -> String;

    fn emit_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), GatewayError>;
}

/// Range bounds covering every key under `"<prefix>_<id>_"`.
pub fn id_range(prefix: &str, id: &str) -> (String, String) {
    (format!("{prefix}_{id}_"), format!("{prefix}_{id}_~"))
}

/// Range bounds covering every key of the form `"<prefix>_*"`.
pub fn prefix_range(prefix: &str) -> (String, String) {
    (format!("{prefix}_"), format!("{prefix}_~"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_follow_the_tilde_convention() {
        assert_eq!(
            id_range("BIDREF", "T1"),
            ("BIDREF_T1_".to_string(), "BIDREF_T1_~".to_string())
        );
        assert_eq!(
            prefix_range("TENDER"),
            ("TENDER_".to_string(), "TENDER_~".to_string())
        );
    }
}
