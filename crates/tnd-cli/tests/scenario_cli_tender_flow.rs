//! CLI tender flow against a snapshot file
//!
//! GREEN when:
//! - create, publish, bid, close, evaluate and award-best each commit and
//!   print `key=value` lines, with `--at` pinning the transaction time.
//! - The snapshot survives between invocations.
//! - `events --tender` lists only that tender's events, oldest first.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tnd_testkit::fixtures::{self, bid_json, price_quality_tender};

fn tnd(ledger: &Path, at: &str) -> Command {
    let mut cmd = Command::cargo_bin("tnd").unwrap();
    cmd.env_remove("TND_LEDGER")
        .env("RUST_LOG", "warn")
        .arg("--ledger")
        .arg(ledger)
        .args(["--at", at]);
    cmd
}

#[test]
fn create_through_award_best() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");

    let tender_file = dir.path().join("tender.json");
    std::fs::write(&tender_file, price_quality_tender("T1")).unwrap();
    let cheap = dir.path().join("bid-a.json");
    std::fs::write(&cheap, bid_json("T1", "A", "C-A", 500_000.0, &[("Quality", true)])).unwrap();
    let costly = dir.path().join("bid-b.json");
    std::fs::write(&costly, bid_json("T1", "B", "C-B", 2_000_000.0, &[("Quality", false)])).unwrap();

    tnd(&ledger, fixtures::ISSUE_DATE)
        .args(["tender", "create", "--file"])
        .arg(&tender_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("created=true tender_id=T1 status=DRAFT"));
    assert!(ledger.exists());

    tnd(&ledger, fixtures::ISSUE_DATE)
        .args(["tender", "publish", "--id", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status=OPEN"));

    for (bid, file) in [("A", &cheap), ("B", &costly)] {
        tnd(&ledger, fixtures::DURING_WINDOW)
            .args(["bid", "submit", "--tender", "T1", "--bid", bid, "--file"])
            .arg(file)
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("bid_id={bid}")))
            .stdout(predicate::str::contains("bid_hash="));
    }

    tnd(&ledger, fixtures::DURING_WINDOW)
        .args(["bid", "verify", "--tender", "T1", "--bid", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matches=true"));

    tnd(&ledger, fixtures::AFTER_DEADLINE)
        .args(["tender", "close", "--id", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status=CLOSED"));

    tnd(&ledger, fixtures::AFTER_DEADLINE)
        .args(["eval", "run", "--tender", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluated=2 tender_id=T1"))
        .stdout(predicate::str::contains("bid_id=A score=97.5"));

    tnd(&ledger, fixtures::AFTER_DEADLINE)
        .args(["tender", "award-best", "--id", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status=AWARDED"))
        .stdout(predicate::str::contains("awarded_bid_id=A"))
        .stdout(predicate::str::contains("winning_score=97.5"));

    let out = tnd(&ledger, fixtures::AFTER_DEADLINE)
        .args(["events", "--tender", "T1"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let events: Vec<Value> = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = events.iter().filter_map(|e| e["name"].as_str()).collect();
    assert_eq!(names.first().copied(), Some("EnhancedRFQCreated"));
    assert_eq!(names.last().copied(), Some("TenderAwarded"));
    assert_eq!(names.iter().filter(|n| **n == "BidEvaluated").count(), 2);

    let blocks: Vec<u64> = events.iter().filter_map(|e| e["block"].as_u64()).collect();
    assert!(blocks.windows(2).all(|w| w[0] <= w[1]), "{blocks:?}");
}

#[test]
fn events_filter_by_tender() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");

    for id in ["T1", "T2"] {
        tnd(&ledger, fixtures::DURING_WINDOW)
            .args([
                "tender",
                "create-basic",
                "--id",
                id,
                "--description",
                "Culvert repair",
                "--open-at",
                fixtures::ISSUE_DATE,
                "--close-at",
                fixtures::DEADLINE,
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("status=OPEN"));
    }

    let out = tnd(&ledger, fixtures::DURING_WINDOW)
        .args(["events", "--tender", "T2"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let events: Vec<Value> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "RFQCreated");
    assert_eq!(events[0]["payload"]["tenderId"], "T2");
}
