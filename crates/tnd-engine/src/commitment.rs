use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// sha256 of `bytes` as lowercase hex. This is the public commitment to a
/// private payload.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Outcome of re-hashing a stored private payload against its public commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentCheck {
    pub tender_id: String,
    pub record_id: String,
    pub committed: String,
    pub recomputed: String,
    pub matches: bool,
}

impl CommitmentCheck {
    pub fn new(tender_id: &str, record_id: &str, committed: &str, payload: &[u8]) -> Self {
        let recomputed = content_digest(payload);
        Self {
            tender_id: tender_id.to_string(),
            record_id: record_id.to_string(),
            matches: recomputed == committed,
            committed: committed.to_string(),
            recomputed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            content_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn a_single_byte_changes_the_commitment() {
        let committed = content_digest(br#"{"amount":100}"#);
        assert!(CommitmentCheck::new("T", "B", &committed, br#"{"amount":100}"#).matches);
        assert!(!CommitmentCheck::new("T", "B", &committed, br#"{"amount":101}"#).matches);
        // Whitespace is part of the committed bytes.
        assert!(!CommitmentCheck::new("T", "B", &committed, br#"{"amount": 100}"#).matches);
    }
}
