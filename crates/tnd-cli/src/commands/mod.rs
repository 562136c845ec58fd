use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

pub mod bid;
pub mod evaluation;
pub mod milestone;
pub mod payment;
pub mod tender;

/// Reads print pretty JSON; writes print `key=value` lines.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

/// Payload bytes exactly as they sit on disk. Commitments are computed over
/// these bytes, so nothing is re-encoded.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read payload: {}", path.display()))
}
