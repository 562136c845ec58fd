//! Read-only tender statistics.

use serde::{Deserialize, Serialize};
use tnd_ledger::LedgerGateway;
use tnd_schemas::{BidPrivate, BidRef, MilestoneRef, Tender, TenderSchema, TenderStatus};

use crate::error::EngineResult;
use crate::keys;
use crate::store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidStatistics {
    pub total_amount: f64,
    pub average_bid: f64,
    pub lowest_bid: f64,
    pub highest_bid: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderStatistics {
    pub tender_id: String,
    pub status: TenderStatus,
    pub schema: TenderSchema,
    pub description: String,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_bids: usize,
    pub readable_bids: usize,
    pub evaluations: usize,
    pub milestones: usize,
    /// Present only when at least one private bid could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_statistics: Option<BidStatistics>,
}

pub fn tender_statistics(
    stub: &dyn LedgerGateway,
    bids_collection: &str,
    tender_id: &str,
) -> EngineResult<TenderStatistics> {
    let tender: Tender =
        store::require_json(stub, &keys::tender(tender_id), &format!("tender {tender_id}"))?;

    let refs = store::scan_json::<BidRef>(stub, &keys::bid_refs(tender_id))?;
    let amounts: Vec<f64> = refs
        .iter()
        .filter_map(|(_, r)| {
            store::read_private_lenient::<BidPrivate>(
                stub,
                bids_collection,
                &keys::bid_private(tender_id, &r.bid_id),
            )
        })
        .map(|b| b.total_amount)
        .collect();

    let (eval_start, eval_end) = keys::evaluations(tender_id);
    let evaluations = stub.get_state_range(&eval_start, &eval_end)?;
    let milestones = store::scan_json::<MilestoneRef>(stub, &keys::milestone_refs(tender_id))?;

    Ok(TenderStatistics {
        tender_id: tender.id.clone(),
        status: tender.status,
        schema: tender.schema,
        description: tender.description().to_string(),
        owner: tender.owner.organization_name.clone(),
        created_at: tender.created_at.clone(),
        updated_at: tender.updated_at.clone(),
        total_bids: refs.len(),
        readable_bids: amounts.len(),
        evaluations: evaluations.len(),
        milestones: milestones.len(),
        bid_statistics: bid_statistics(&amounts, tender.currency()),
    })
}

fn bid_statistics(amounts: &[f64], currency: &str) -> Option<BidStatistics> {
    if amounts.is_empty() {
        return None;
    }
    let total: f64 = amounts.iter().sum();
    Some(BidStatistics {
        total_amount: total,
        average_bid: total / amounts.len() as f64,
        lowest_bid: amounts.iter().copied().fold(f64::INFINITY, f64::min),
        highest_bid: amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        currency: currency.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_amounts() {
        let s = bid_statistics(&[100.0, 300.0, 200.0], "USD").unwrap();
        assert_eq!(s.total_amount, 600.0);
        assert_eq!(s.average_bid, 200.0);
        assert_eq!(s.lowest_bid, 100.0);
        assert_eq!(s.highest_bid, 300.0);
        assert_eq!(s.currency, "USD");
    }

    #[test]
    fn no_readable_bids_means_no_figures() {
        assert!(bid_statistics(&[], "USD").is_none());
    }
}
