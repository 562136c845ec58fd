//! Automated evaluation and best-bid award
//!
//! GREEN when:
//! - Price 50 / Quality 50 with 500000 and Quality=true scores 97.5.
//! - evaluate writes one record per readable bid with the automated note.
//! - award_best picks the highest score and breaks ties by lowest bid id.
//! - evaluate needs CLOSED and at least one bid; award_best needs evaluations.
//! - record_evaluation bounds the score and needs the bid reference.

use tnd_engine::ErrorKind;
use tnd_schemas::{TenderStatus, AUTOMATED_EVALUATION_NOTE};
use tnd_testkit::fixtures::{self, bid_json, price_quality_tender};
use tnd_testkit::Harness;

fn closed_with_bids(bids: &[(&str, f64, bool)]) -> Harness {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();
    for (bid_id, amount, quality) in bids {
        let payload = bid_json("T1", bid_id, &format!("C-{bid_id}"), *amount, &[("Quality", *quality)]);
        h.submit_bid("T1", bid_id, &payload).unwrap();
    }
    h.set_clock(fixtures::AFTER_DEADLINE).unwrap();
    h.close("T1").unwrap();
    h
}

#[test]
fn evaluate_scores_every_bid() {
    let mut h = closed_with_bids(&[("A", 500_000.0, true), ("B", 2_000_000.0, false)]);

    let evals = h.invoke(|c, s| c.evaluate_bids(s, "T1")).unwrap();
    assert_eq!(evals.len(), 2);
    assert!((evals[0].score - 97.5).abs() < 1e-9, "A scored {}", evals[0].score);
    // 100 - 2.0 * 10 = 80 on price, 0 on quality.
    assert!((evals[1].score - 40.0).abs() < 1e-9, "B scored {}", evals[1].score);
    assert!(evals.iter().all(|e| e.notes == AUTOMATED_EVALUATION_NOTE));

    let stored = h.query(|c, s| c.list_evaluations(s, "T1")).unwrap();
    assert_eq!(stored, evals);

    let evaluated = h.event_names().iter().filter(|n| *n == "BidEvaluated").count();
    assert_eq!(evaluated, 2);
}

#[test]
fn award_best_breaks_ties_by_lowest_bid_id() {
    let mut h = closed_with_bids(&[("A", 1.0, true), ("B", 1.0, true), ("C", 1.0, true)]);
    for (bid_id, score) in [("C", 95.0), ("A", 80.0), ("B", 95.0)] {
        h.invoke(|c, s| c.record_evaluation(s, "T1", bid_id, score, "panel"))
            .unwrap();
    }

    let outcome = h.invoke(|c, s| c.award_best_bid(s, "T1")).unwrap();
    assert_eq!(outcome.winner.bid_id, "B");
    assert_eq!(outcome.tender.status, TenderStatus::Awarded);
    assert_eq!(outcome.tender.awarded_bid_id.as_deref(), Some("B"));
    assert_eq!(h.event_names().last().map(String::as_str), Some("TenderAwarded"));
}

#[test]
fn evaluate_then_award_best_end_to_end() {
    let mut h = closed_with_bids(&[("A", 900_000.0, true), ("B", 450_000.0, true), ("C", 450_000.0, false)]);
    h.invoke(|c, s| c.evaluate_bids(s, "T1")).unwrap();

    let outcome = h.invoke(|c, s| c.award_best_bid(s, "T1")).unwrap();
    assert_eq!(outcome.winner.bid_id, "B");
}

#[test]
fn evaluate_preconditions() {
    // No bids at all.
    let mut h = closed_with_bids(&[]);
    let err = h.invoke(|c, s| c.evaluate_bids(s, "T1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(err.to_string().contains("no bids"), "{err}");

    // Still OPEN.
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T2")).unwrap();
    let err = h.invoke(|c, s| c.evaluate_bids(s, "T2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn award_best_preconditions() {
    let mut h = closed_with_bids(&[("A", 1.0, true)]);
    let err = h.invoke(|c, s| c.award_best_bid(s, "T1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "no evaluations yet");

    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T2")).unwrap();
    let err = h.invoke(|c, s| c.award_best_bid(s, "T2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn record_evaluation_validation() {
    let mut h = closed_with_bids(&[("A", 1.0, true)]);

    let err = h.invoke(|c, s| c.record_evaluation(s, "T1", "A", 100.5, "")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = h.invoke(|c, s| c.record_evaluation(s, "T1", "A", f64::NAN, "")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = h.invoke(|c, s| c.record_evaluation(s, "T1", "Z", 50.0, "")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    h.invoke(|c, s| c.record_evaluation(s, "T1", "A", 0.0, "floor")).unwrap();
    h.invoke(|c, s| c.award_tender(s, "T1", "A")).unwrap();

    let err = h.invoke(|c, s| c.record_evaluation(s, "T1", "A", 10.0, "")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState, "AWARDED is terminal");
}
