//! Typed helpers over the raw gateway. Every read is a fresh lookup.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tnd_ledger::LedgerGateway;
use tnd_schemas::LedgerEvent;

use crate::error::{EngineError, EngineResult};

pub(crate) fn now(stub: &dyn LedgerGateway) -> EngineResult<DateTime<Utc>> {
    Ok(stub.tx_time()?)
}

pub(crate) fn exists(stub: &dyn LedgerGateway, key: &str) -> EngineResult<bool> {
    Ok(stub.get_state(key)?.is_some())
}

/// Public record at `key`. A value that no longer decodes is a corrupt ledger,
/// not a caller error.
pub(crate) fn read_json<T: DeserializeOwned>(
    stub: &dyn LedgerGateway,
    key: &str,
) -> EngineResult<Option<T>> {
    match stub.get_state(key)? {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| EngineError::DependencyFailure(format!("undecodable record at {key}: {e}"))),
    }
}

pub(crate) fn require_json<T: DeserializeOwned>(
    stub: &dyn LedgerGateway,
    key: &str,
    what: &str,
) -> EngineResult<T> {
    read_json(stub, key)?.ok_or_else(|| EngineError::NotFound(format!("{what} not found")))
}

pub(crate) fn write_json<T: Serialize>(
    stub: &mut dyn LedgerGateway,
    key: &str,
    value: &T,
) -> EngineResult<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| EngineError::DependencyFailure(format!("serialize {key}: {e}")))?;
    stub.put_state(key, bytes)?;
    Ok(())
}

/// Decode every record in `[start, end)`. Rows that do not decode are
/// skipped so one bad record cannot block a listing.
pub(crate) fn scan_json<T: DeserializeOwned>(
    stub: &dyn LedgerGateway,
    range: &(String, String),
) -> EngineResult<Vec<(String, T)>> {
    let rows = stub.get_state_range(&range.0, &range.1)?;
    let mut out = Vec::with_capacity(rows.len());
    for (key, bytes) in rows {
        match serde_json::from_slice(&bytes) {
            Ok(v) => out.push((key, v)),
            Err(e) => tracing::warn!(key = %key, error = %e, "skipping undecodable record"),
        }
    }
    tracing::debug!(start = %range.0, rows = out.len(), "range scan");
    Ok(out)
}

pub(crate) fn emit(stub: &mut dyn LedgerGateway, event: &LedgerEvent) -> EngineResult<()> {
    let payload = event
        .payload_json()
        .map_err(|e| EngineError::DependencyFailure(format!("serialize {} event: {e}", event.name())))?;
    stub.emit_event(event.name(), payload)?;
    Ok(())
}

pub(crate) fn transient_field(stub: &dyn LedgerGateway, name: &str) -> EngineResult<Vec<u8>> {
    let mut transient = stub.get_transient()?;
    transient
        .remove(name)
        .ok_or_else(|| EngineError::InvalidInput(format!("transient field '{name}' is required")))
}

/// Raw bytes of a private record plus its decoded form.
pub(crate) fn read_private<T: DeserializeOwned>(
    stub: &dyn LedgerGateway,
    collection: &str,
    key: &str,
) -> EngineResult<Option<(Vec<u8>, T)>> {
    match stub.get_private_data(collection, key)? {
        None => Ok(None),
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes).map_err(|e| {
                EngineError::DependencyFailure(format!("undecodable private record at {key}: {e}"))
            })?;
            Ok(Some((bytes, value)))
        }
    }
}

/// Private record, or `None` when it is absent, denied or undecodable. For
/// aggregate reads that must not fail on one unreadable payload.
pub(crate) fn read_private_lenient<T: DeserializeOwned>(
    stub: &dyn LedgerGateway,
    collection: &str,
    key: &str,
) -> Option<T> {
    match read_private::<T>(stub, collection, key) {
        Ok(Some((_, value))) => Some(value),
        Ok(None) => {
            tracing::warn!(key = %key, "private record missing, skipped");
            None
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "private record unavailable, skipped");
            None
        }
    }
}
