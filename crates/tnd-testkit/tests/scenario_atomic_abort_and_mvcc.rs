//! Transaction atomicity
//!
//! GREEN when:
//! - A failing handler commits nothing: no state, no private data, no events.
//! - Two transactions racing on the same bid id: the second commit is a
//!   read conflict, maps to DEPENDENCY_FAILURE, and leaves the first bid intact.
//! - award_best racing a new evaluation fails as a phantom read.
//! - Reads inside a handler never observe the handler's own writes.

use tnd_engine::{keys, EngineError, ErrorKind, BID_TRANSIENT_FIELD};
use tnd_ledger::{CommitError, LedgerGateway};
use tnd_schemas::TenderStatus;
use tnd_testkit::fixtures::{self, bid_json, price_quality_tender};
use tnd_testkit::Harness;

#[test]
fn failed_handler_commits_nothing() {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();
    let height = h.ledger.height();
    let events = h.ledger.events().len();

    // Window violation after the tender read.
    h.set_clock(fixtures::DEADLINE).unwrap();
    let payload = bid_json("T1", "B1", "ACME", 5.0, &[("Quality", true)]);
    assert!(h.submit_bid("T1", "B1", &payload).is_err());

    assert_eq!(h.ledger.height(), height);
    assert_eq!(h.ledger.events().len(), events);
    assert!(h.ledger.state_value(&keys::bid_ref("T1", "B1")).is_none());
    let bids = h.contract.bids_collection().to_string();
    assert!(h.ledger.private_value(&bids, &keys::bid_private("T1", "B1")).is_none());
}

#[test]
fn racing_submissions_of_the_same_bid_conflict() {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();

    let first = bid_json("T1", "B1", "ACME", 100.0, &[("Quality", true)]);
    let second = bid_json("T1", "B1", "ACME", 90.0, &[("Quality", true)]);
    let in_a = h.tx().transient(BID_TRANSIENT_FIELD, first.clone());
    let in_b = h.tx().transient(BID_TRANSIENT_FIELD, second);

    let contract = &h.contract;
    let a = h
        .ledger
        .simulate(in_a, |s| contract.submit_bid(s, "T1", "B1"))
        .unwrap();
    let b = h
        .ledger
        .simulate(in_b, |s| contract.submit_bid(s, "T1", "B1"))
        .unwrap();

    h.ledger.commit(a.rw_set).unwrap();
    let conflict = h.ledger.commit(b.rw_set).unwrap_err();
    assert!(matches!(conflict, CommitError::MvccConflict { .. }), "{conflict}");
    assert_eq!(EngineError::from(conflict).kind(), ErrorKind::DependencyFailure);

    let bids = h.contract.bids_collection().to_string();
    assert_eq!(
        h.ledger.private_value(&bids, &keys::bid_private("T1", "B1")),
        Some(first.as_slice())
    );
    let submitted = h.event_names().iter().filter(|n| *n == "EnhancedBidSubmitted").count();
    assert_eq!(submitted, 1);
}

#[test]
fn award_best_racing_a_new_evaluation_is_a_phantom_read() {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();
    for bid_id in ["A", "B"] {
        h.submit_bid("T1", bid_id, &bid_json("T1", bid_id, "ACME", 1.0, &[("Quality", true)]))
            .unwrap();
    }
    h.close("T1").unwrap();
    h.invoke(|c, s| c.record_evaluation(s, "T1", "A", 60.0, "")).unwrap();

    let in_award = h.tx();
    let in_eval = h.tx();
    let contract = &h.contract;
    let award = h
        .ledger
        .simulate(in_award, |s| contract.award_best_bid(s, "T1"))
        .unwrap();
    assert_eq!(award.output.winner.bid_id, "A");
    let late = h
        .ledger
        .simulate(in_eval, |s| contract.record_evaluation(s, "T1", "B", 99.0, ""))
        .unwrap();

    h.ledger.commit(late.rw_set).unwrap();
    let err = h.ledger.commit(award.rw_set).unwrap_err();
    assert!(matches!(err, CommitError::PhantomRead { .. }), "{err}");

    let t = h.query(|c, s| c.get_tender(s, "T1")).unwrap();
    assert_eq!(t.status, TenderStatus::Closed);

    // Retried against fresh state, B wins.
    let outcome = h.invoke(|c, s| c.award_best_bid(s, "T1")).unwrap();
    assert_eq!(outcome.winner.bid_id, "B");
}

#[test]
fn handler_reads_see_committed_state_only() {
    let mut h = Harness::new().unwrap();
    let seen = h
        .invoke(|_, s| {
            s.put_state("PROBE", b"1".to_vec())?;
            Ok(s.get_state("PROBE")?)
        })
        .unwrap();
    assert_eq!(seen, None);
    assert_eq!(h.ledger.state_value("PROBE"), Some(&b"1"[..]));
}
