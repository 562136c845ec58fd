//! Post-award money flow
//!
//! GREEN when:
//! - Partial payments need an APPROVED milestone and a positive amount.
//! - Cumulative payments may not exceed the claim; the last one reports fullyPaid.
//! - The milestone commitment (payloadHash) is unchanged by payments.
//! - Retention needs AWARDED, no pending milestones, and releases once.
//! - The financial summary adds up.

use tnd_engine::ErrorKind;
use tnd_schemas::{LedgerEvent, TenderStatus};
use tnd_testkit::fixtures::{self, bid_json, milestone_json, price_quality_tender};
use tnd_testkit::Harness;

/// Awarded to B1 at 500000 with M1 (100000) approved and M2 (50000) pending.
fn awarded_with_milestones() -> Harness {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();
    h.submit_bid("T1", "B1", &bid_json("T1", "B1", "ACME", 500_000.0, &[("Quality", true)]))
        .unwrap();
    h.set_clock(fixtures::AFTER_DEADLINE).unwrap();
    h.close("T1").unwrap();
    h.invoke(|c, s| c.evaluate_bids(s, "T1")).unwrap();
    h.invoke(|c, s| c.award_best_bid(s, "T1")).unwrap();

    h.submit_milestone("T1", "M1", &milestone_json("T1", "M1", "Demolition", 100_000.0))
        .unwrap();
    h.invoke(|c, s| c.approve_milestone(s, "T1", "M1")).unwrap();
    h.submit_milestone("T1", "M2", &milestone_json("T1", "M2", "Resurfacing", 50_000.0))
        .unwrap();
    h
}

fn last_fully_paid(h: &Harness) -> bool {
    match h.decoded_events().unwrap().pop().unwrap() {
        LedgerEvent::PartialPaymentRecorded(e) => e.fully_paid,
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn partial_payments_accumulate_up_to_the_claim() {
    let mut h = awarded_with_milestones();
    let before = h.query(|c, s| c.get_milestone_ref(s, "T1", "M1")).unwrap();

    let p = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M1", 40_000.0)).unwrap();
    assert_eq!(p.paid_amount, 40_000.0);
    assert!(!last_fully_paid(&h));

    let err = h
        .invoke(|c, s| c.record_partial_payment(s, "T1", "M1", 70_000.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput, "overpayment");

    let p = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M1", 60_000.0)).unwrap();
    assert_eq!(p.paid_amount, 100_000.0);
    assert_eq!(p.payments.len(), 2);
    assert!(last_fully_paid(&h));

    let after = h.query(|c, s| c.get_milestone_ref(s, "T1", "M1")).unwrap();
    assert_eq!(before.payload_hash, after.payload_hash);

    let raw = h.ledger.events().last().unwrap().payload.as_bytes().to_vec();
    let text = String::from_utf8(raw).unwrap();
    assert!(!text.contains("60000"), "payment event must not carry amounts: {text}");
}

#[test]
fn payment_preconditions() {
    let mut h = awarded_with_milestones();

    let err = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M2", 1.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState, "M2 is still SUBMITTED");

    let err = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M1", 0.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M1", -3.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M9", 1.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    h.invoke(|c, s| c.reject_milestone(s, "T1", "M2", "scope dispute")).unwrap();
    let err = h.invoke(|c, s| c.record_partial_payment(s, "T1", "M2", 1.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState, "rejected claims are never payable");
}

#[test]
fn retention_release_rules() {
    let mut h = awarded_with_milestones();

    let err = h.invoke(|c, s| c.release_retention(s, "T1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState, "M2 pending");

    h.invoke(|c, s| c.approve_milestone(s, "T1", "M2")).unwrap();
    let release = h.invoke(|c, s| c.release_retention(s, "T1")).unwrap();
    assert_eq!(release.retention_percentage, 5.0);
    assert_eq!(release.released_at, fixtures::AFTER_DEADLINE);
    assert_eq!(h.event_names().last().map(String::as_str), Some("RetentionReleased"));

    let err = h.invoke(|c, s| c.release_retention(s, "T1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    // The awarded tender record itself is untouched.
    let t = h.query(|c, s| c.get_tender(s, "T1")).unwrap();
    assert_eq!(t.status, TenderStatus::Awarded);
    assert_eq!(t.version, 4);
}

#[test]
fn retention_needs_an_awarded_tender() {
    let mut h = Harness::new().unwrap();
    h.open_tender(&price_quality_tender("T1")).unwrap();
    let err = h.invoke(|c, s| c.release_retention(s, "T1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn financial_summary_adds_up() {
    let mut h = awarded_with_milestones();
    h.invoke(|c, s| c.record_partial_payment(s, "T1", "M1", 30_000.0)).unwrap();

    let fs = h.query(|c, s| c.financial_summary(s, "T1")).unwrap();
    assert_eq!(fs.status, TenderStatus::Awarded);
    assert_eq!(fs.currency, "USD");
    assert_eq!(fs.awarded_bid_id.as_deref(), Some("B1"));
    assert_eq!(fs.awarded_amount, Some(500_000.0));
    assert_eq!((fs.milestones.submitted, fs.milestones.approved, fs.milestones.rejected), (1, 1, 0));
    assert_eq!(fs.claimed_total, 150_000.0);
    assert_eq!(fs.approved_total, 100_000.0);
    assert_eq!(fs.paid_total, 30_000.0);
    assert_eq!(fs.outstanding_total, 70_000.0);
    assert_eq!(fs.retention_percentage, 5.0);
    assert_eq!(fs.retention_amount, Some(25_000.0));
    assert!(!fs.retention_released);

    h.invoke(|c, s| c.reject_milestone(s, "T1", "M2", "late")).unwrap();
    h.invoke(|c, s| c.release_retention(s, "T1")).unwrap();
    let fs = h.query(|c, s| c.financial_summary(s, "T1")).unwrap();
    assert_eq!(fs.claimed_total, 100_000.0, "rejected claims drop out");
    assert_eq!(fs.milestones.rejected, 1);
    assert!(fs.retention_released);
    assert_eq!(fs.retention_released_at.as_deref(), Some(fixtures::AFTER_DEADLINE));
}
