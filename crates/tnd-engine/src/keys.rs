//! Ledger key scheme. Shared by both tender schemas.
//!
//! | key              | where                  |
//! |------------------|------------------------|
//! | `TENDER_<t>`     | public                 |
//! | `BIDREF_<t>_<b>` | public                 |
//! | `BID_<t>_<b>`    | bids collection        |
//! | `EVAL_<t>_<b>`   | public                 |
//! | `MSREF_<t>_<m>`  | public                 |
//! | `MS_<t>_<m>`     | milestones collection  |
//! | `MSPAY_<t>_<m>`  | milestones collection  |
//! | `RETENTION_<t>`  | public                 |

use tnd_ledger::{id_range, prefix_range};

pub fn tender(tender_id: &str) -> String {
    format!("TENDER_{tender_id}")
}

pub fn tenders() -> (String, String) {
    prefix_range("TENDER")
}

pub fn bid_ref(tender_id: &str, bid_id: &str) -> String {
    format!("BIDREF_{tender_id}_{bid_id}")
}

pub fn bid_refs(tender_id: &str) -> (String, String) {
    id_range("BIDREF", tender_id)
}

pub fn bid_private(tender_id: &str, bid_id: &str) -> String {
    format!("BID_{tender_id}_{bid_id}")
}

pub fn evaluation(tender_id: &str, bid_id: &str) -> String {
    format!("EVAL_{tender_id}_{bid_id}")
}

pub fn evaluations(tender_id: &str) -> (String, String) {
    id_range("EVAL", tender_id)
}

pub fn milestone_ref(tender_id: &str, milestone_id: &str) -> String {
    format!("MSREF_{tender_id}_{milestone_id}")
}

pub fn milestone_refs(tender_id: &str) -> (String, String) {
    id_range("MSREF", tender_id)
}

pub fn milestone_private(tender_id: &str, milestone_id: &str) -> String {
    format!("MS_{tender_id}_{milestone_id}")
}

pub fn milestone_payments(tender_id: &str, milestone_id: &str) -> String {
    format!("MSPAY_{tender_id}_{milestone_id}")
}

pub fn retention(tender_id: &str) -> String {
    format!("RETENTION_{tender_id}")
}
