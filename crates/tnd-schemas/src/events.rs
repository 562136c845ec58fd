//! Typed ledger events. One record type per lifecycle transition, emitted
//! under a fixed name with a camelCase JSON payload.

use serde::{Deserialize, Serialize};

use crate::milestone::{MilestoneRef, MilestoneStatus};
use crate::tender::{TenderSchema, TenderStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderCreated {
    pub tender_id: String,
    pub schema: TenderSchema,
    pub status: TenderStatus,
    pub created_at: String,
    pub owner: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderPublished {
    pub tender_id: String,
    pub status: TenderStatus,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderClosed {
    pub tender_id: String,
    pub status: TenderStatus,
    pub closed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderAwarded {
    pub tender_id: String,
    pub bid_id: String,
    pub status: TenderStatus,
    pub awarded_at: String,
}

/// Public reference plus submission time. Never carries private payload fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidSubmitted {
    pub tender_id: String,
    pub bid_id: String,
    pub contractor_id: String,
    pub bid_hash: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidEvaluated {
    pub tender_id: String,
    pub bid_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReleased {
    pub tender_id: String,
    pub milestone_id: String,
    pub evidence_hash: String,
    pub released_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRejected {
    pub tender_id: String,
    pub milestone_id: String,
    pub status: MilestoneStatus,
    pub reason: String,
    pub rejected_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPaymentRecorded {
    pub tender_id: String,
    pub milestone_id: String,
    pub fully_paid: bool,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionReleased {
    pub tender_id: String,
    pub retention_percentage: f64,
    pub released_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    RfqCreated(TenderCreated),
    EnhancedRfqCreated(TenderCreated),
    TenderPublished(TenderPublished),
    BidWindowClosed(TenderClosed),
    TenderClosed(TenderClosed),
    TenderAwarded(TenderAwarded),
    BidSubmitted(BidSubmitted),
    EnhancedBidSubmitted(BidSubmitted),
    BidEvaluated(BidEvaluated),
    MilestoneSubmitted(MilestoneRef),
    MilestoneApproved(MilestoneRef),
    PaymentReleased(PaymentReleased),
    MilestoneRejected(MilestoneRejected),
    PartialPaymentRecorded(PartialPaymentRecorded),
    RetentionReleased(RetentionReleased),
}

#[derive(Debug)]
pub enum EventDecodeError {
    UnknownName(String),
    Payload { name: String, source: serde_json::Error },
}

impl std::fmt::Display for EventDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventDecodeError::UnknownName(name) => write!(f, "unknown event name '{name}'"),
            EventDecodeError::Payload { name, source } => {
                write!(f, "malformed '{name}' payload: {source}")
            }
        }
    }
}

impl std::error::Error for EventDecodeError {}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::RfqCreated(_) => "RFQCreated",
            LedgerEvent::EnhancedRfqCreated(_) => "EnhancedRFQCreated",
            LedgerEvent::TenderPublished(_) => "TenderPublished",
            LedgerEvent::BidWindowClosed(_) => "BidWindowClosed",
            LedgerEvent::TenderClosed(_) => "TenderClosed",
            LedgerEvent::TenderAwarded(_) => "TenderAwarded",
            LedgerEvent::BidSubmitted(_) => "BidSubmitted",
            LedgerEvent::EnhancedBidSubmitted(_) => "EnhancedBidSubmitted",
            LedgerEvent::BidEvaluated(_) => "BidEvaluated",
            LedgerEvent::MilestoneSubmitted(_) => "MilestoneSubmitted",
            LedgerEvent::MilestoneApproved(_) => "MilestoneApproved",
            LedgerEvent::PaymentReleased(_) => "PaymentReleased",
            LedgerEvent::MilestoneRejected(_) => "MilestoneRejected",
            LedgerEvent::PartialPaymentRecorded(_) => "PartialPaymentRecorded",
            LedgerEvent::RetentionReleased(_) => "RetentionReleased",
        }
    }

    pub fn tender_id(&self) -> &str {
        match self {
            LedgerEvent::RfqCreated(e) | LedgerEvent::EnhancedRfqCreated(e) => &e.tender_id,
            LedgerEvent::TenderPublished(e) => &e.tender_id,
            LedgerEvent::BidWindowClosed(e) | LedgerEvent::TenderClosed(e) => &e.tender_id,
            LedgerEvent::TenderAwarded(e) => &e.tender_id,
            LedgerEvent::BidSubmitted(e) | LedgerEvent::EnhancedBidSubmitted(e) => &e.tender_id,
            LedgerEvent::BidEvaluated(e) => &e.tender_id,
            LedgerEvent::MilestoneSubmitted(e) | LedgerEvent::MilestoneApproved(e) => &e.tender_id,
            LedgerEvent::PaymentReleased(e) => &e.tender_id,
            LedgerEvent::MilestoneRejected(e) => &e.tender_id,
            LedgerEvent::PartialPaymentRecorded(e) => &e.tender_id,
            LedgerEvent::RetentionReleased(e) => &e.tender_id,
        }
    }

    pub fn payload_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            LedgerEvent::RfqCreated(e) | LedgerEvent::EnhancedRfqCreated(e) => serde_json::to_vec(e),
            LedgerEvent::TenderPublished(e) => serde_json::to_vec(e),
            LedgerEvent::BidWindowClosed(e) | LedgerEvent::TenderClosed(e) => serde_json::to_vec(e),
            LedgerEvent::TenderAwarded(e) => serde_json::to_vec(e),
            LedgerEvent::BidSubmitted(e) | LedgerEvent::EnhancedBidSubmitted(e) => {
                serde_json::to_vec(e)
            }
            LedgerEvent::BidEvaluated(e) => serde_json::to_vec(e),
            LedgerEvent::MilestoneSubmitted(e) | LedgerEvent::MilestoneApproved(e) => {
                serde_json::to_vec(e)
            }
            LedgerEvent::PaymentReleased(e) => serde_json::to_vec(e),
            LedgerEvent::MilestoneRejected(e) => serde_json::to_vec(e),
            LedgerEvent::PartialPaymentRecorded(e) => serde_json::to_vec(e),
            LedgerEvent::RetentionReleased(e) => serde_json::to_vec(e),
        }
    }

    /// Rebuild a typed event from what a listener sees on the wire.
    pub fn decode(name: &str, payload: &[u8]) -> Result<Self, EventDecodeError> {
        fn parse<T: serde::de::DeserializeOwned>(
            name: &str,
            payload: &[u8],
        ) -> Result<T, EventDecodeError> {
            serde_json::from_slice(payload).map_err(|source| EventDecodeError::Payload {
                name: name.to_string(),
                source,
            })
        }

        let ev = match name {
            "RFQCreated" => LedgerEvent::RfqCreated(parse(name, payload)?),
            "EnhancedRFQCreated" => LedgerEvent::EnhancedRfqCreated(parse(name, payload)?),
            "TenderPublished" => LedgerEvent::TenderPublished(parse(name, payload)?),
            "BidWindowClosed" => LedgerEvent::BidWindowClosed(parse(name, payload)?),
            "TenderClosed" => LedgerEvent::TenderClosed(parse(name, payload)?),
            "TenderAwarded" => LedgerEvent::TenderAwarded(parse(name, payload)?),
            "BidSubmitted" => LedgerEvent::BidSubmitted(parse(name, payload)?),
            "EnhancedBidSubmitted" => LedgerEvent::EnhancedBidSubmitted(parse(name, payload)?),
            "BidEvaluated" => LedgerEvent::BidEvaluated(parse(name, payload)?),
            "MilestoneSubmitted" => LedgerEvent::MilestoneSubmitted(parse(name, payload)?),
            "MilestoneApproved" => LedgerEvent::MilestoneApproved(parse(name, payload)?),
            "PaymentReleased" => LedgerEvent::PaymentReleased(parse(name, payload)?),
            "MilestoneRejected" => LedgerEvent::MilestoneRejected(parse(name, payload)?),
            "PartialPaymentRecorded" => LedgerEvent::PartialPaymentRecorded(parse(name, payload)?),
            "RetentionReleased" => LedgerEvent::RetentionReleased(parse(name, payload)?),
            other => return Err(EventDecodeError::UnknownName(other.to_string())),
        };
        Ok(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_events_share_a_payload_but_not_a_name() {
        let closed = TenderClosed {
            tender_id: "T1".into(),
            status: TenderStatus::Closed,
            closed_at: "2025-01-01T00:00:00Z".into(),
        };
        let basic = LedgerEvent::BidWindowClosed(closed.clone());
        let enhanced = LedgerEvent::TenderClosed(closed);
        assert_eq!(basic.name(), "BidWindowClosed");
        assert_eq!(enhanced.name(), "TenderClosed");
        assert_eq!(basic.payload_json().unwrap(), enhanced.payload_json().unwrap());
    }

    #[test]
    fn decode_restores_the_variant_from_the_wire_name() {
        let ev = LedgerEvent::BidEvaluated(BidEvaluated {
            tender_id: "T1".into(),
            bid_id: "B2".into(),
            score: 97.5,
        });
        let payload = ev.payload_json().unwrap();
        let text = String::from_utf8(payload.clone()).unwrap();
        assert!(text.contains("\"bidId\":\"B2\""), "camelCase payload: {text}");

        assert_eq!(LedgerEvent::decode(ev.name(), &payload).unwrap(), ev);
    }

    #[test]
    fn decode_rejects_unknown_names_and_bad_payloads() {
        assert!(matches!(
            LedgerEvent::decode("TenderCancelled", b"{}"),
            Err(EventDecodeError::UnknownName(_))
        ));
        assert!(matches!(
            LedgerEvent::decode("TenderAwarded", b"{\"tenderId\":1}"),
            Err(EventDecodeError::Payload { .. })
        ));
    }

    #[test]
    fn partial_payment_event_carries_no_amounts() {
        let ev = LedgerEvent::PartialPaymentRecorded(PartialPaymentRecorded {
            tender_id: "T1".into(),
            milestone_id: "M1".into(),
            fully_paid: false,
            recorded_at: "2025-01-01T00:00:00Z".into(),
        });
        let text = String::from_utf8(ev.payload_json().unwrap()).unwrap();
        assert!(!text.to_lowercase().contains("amount"), "{text}");
    }
}
