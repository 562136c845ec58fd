//! Aggregates over partially readable private data
//!
//! GREEN when:
//! - statistics counts every bid reference but aggregates amounts only over
//!   readable private payloads.
//! - evaluate skips a bid whose private payload is gone and scores the rest.
//! - With no readable payloads, statistics carries counts but no bid figures.

use tnd_engine::keys;
use tnd_testkit::fixtures::{self, bid_json, price_quality_tender};
use tnd_testkit::Harness;

fn three_bids() -> Harness {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();
    for (bid_id, amount) in [("A", 300_000.0), ("B", 500_000.0), ("C", 700_000.0)] {
        h.submit_bid("T1", bid_id, &bid_json("T1", bid_id, "ACME", amount, &[("Quality", true)]))
            .unwrap();
    }
    h
}

#[test]
fn statistics_over_all_bids() {
    let h = three_bids();
    let st = h.query(|c, s| c.tender_statistics(s, "T1")).unwrap();

    assert_eq!(st.total_bids, 3);
    assert_eq!(st.readable_bids, 3);
    assert_eq!(st.owner, "County Roads Authority");
    let figures = st.bid_statistics.unwrap();
    assert_eq!(figures.total_amount, 1_500_000.0);
    assert_eq!(figures.average_bid, 500_000.0);
    assert_eq!(figures.lowest_bid, 300_000.0);
    assert_eq!(figures.highest_bid, 700_000.0);
    assert_eq!(figures.currency, "USD");
}

#[test]
fn purged_payload_is_skipped() {
    let mut h = three_bids();
    let bids = h.contract.bids_collection().to_string();
    assert!(h.ledger.purge_private(&bids, &keys::bid_private("T1", "C")));

    let st = h.query(|c, s| c.tender_statistics(s, "T1")).unwrap();
    assert_eq!(st.total_bids, 3);
    assert_eq!(st.readable_bids, 2);
    assert_eq!(st.bid_statistics.unwrap().highest_bid, 500_000.0);

    h.set_clock(fixtures::AFTER_DEADLINE).unwrap();
    h.close("T1").unwrap();
    let evals = h.invoke(|c, s| c.evaluate_bids(s, "T1")).unwrap();
    let ids: Vec<&str> = evals.iter().map(|e| e.bid_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);

    let st = h.query(|c, s| c.tender_statistics(s, "T1")).unwrap();
    assert_eq!(st.evaluations, 2);
}

#[test]
fn no_collection_access_means_no_figures() {
    let mut h = three_bids();
    let input = h.tx().private_access(&[]);
    let contract = &h.contract;
    let st = h
        .ledger
        .query(input, |s| contract.tender_statistics(&*s, "T1"))
        .unwrap();
    assert_eq!(st.total_bids, 3);
    assert_eq!(st.readable_bids, 0);
    assert!(st.bid_statistics.is_none());
}
