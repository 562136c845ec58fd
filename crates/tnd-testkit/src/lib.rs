//! tnd-testkit
//!
//! In-process harness for end-to-end scenarios: a `MemoryLedger` with both
//! private collections defined, a `Contract` built from config, and a
//! controllable transaction clock.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tnd_config::EngineConfig;
use tnd_engine::{Contract, EngineResult, BID_TRANSIENT_FIELD, MILESTONE_TRANSIENT_FIELD};
use tnd_ledger::{LedgerGateway, MemoryLedger, TxInput};
use tnd_schemas::{parse_ts, BidRef, LedgerEvent, MilestoneRef, Tender};

pub mod fixtures;

pub struct Harness {
    pub ledger: MemoryLedger,
    pub contract: Contract,
    clock: DateTime<Utc>,
    nonce: u64,
}

impl Harness {
    /// Default config, clock at `fixtures::DURING_WINDOW`.
    pub fn new() -> Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(cfg: EngineConfig) -> Result<Self> {
        let contract = Contract::new(&cfg);
        let ledger = MemoryLedger::with_collections([
            contract.bids_collection().to_string(),
            contract.milestones_collection().to_string(),
        ]);
        Ok(Self {
            ledger,
            contract,
            clock: parse_ts(fixtures::DURING_WINDOW).context("fixture clock")?,
            nonce: 0,
        })
    }

    pub fn set_clock(&mut self, rfc3339: &str) -> Result<()> {
        self.clock = parse_ts(rfc3339).with_context(|| format!("parse clock '{rfc3339}'"))?;
        Ok(())
    }

    /// Transaction input at the current clock. Every call gets a fresh nonce
    /// so two otherwise identical transactions have distinct ids.
    pub fn tx(&mut self) -> TxInput {
        self.nonce += 1;
        TxInput::at(self.clock).nonce(self.nonce)
    }

    /// Simulate and commit one handler.
    pub fn invoke_with<T>(
        &mut self,
        input: TxInput,
        f: impl FnOnce(&Contract, &mut dyn LedgerGateway) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let contract = &self.contract;
        self.ledger.submit(input, |stub| f(contract, stub))
    }

    pub fn invoke<T>(
        &mut self,
        f: impl FnOnce(&Contract, &mut dyn LedgerGateway) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let input = self.tx();
        self.invoke_with(input, f)
    }

    /// Read-only call against committed state.
    pub fn query<T>(
        &self,
        f: impl FnOnce(&Contract, &dyn LedgerGateway) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let contract = &self.contract;
        self.ledger.query(TxInput::at(self.clock), |stub| f(contract, &*stub))
    }

    // -----------------------------------------------------------------------
    // Shorthands
    // -----------------------------------------------------------------------

    pub fn create_tender(&mut self, tender_json: &[u8]) -> EngineResult<Tender> {
        self.invoke(|c, s| c.create_tender(s, tender_json))
    }

    pub fn publish(&mut self, tender_id: &str) -> EngineResult<Tender> {
        self.invoke(|c, s| c.publish_tender(s, tender_id))
    }

    pub fn close(&mut self, tender_id: &str) -> EngineResult<Tender> {
        self.invoke(|c, s| c.close_tender(s, tender_id))
    }

    pub fn submit_bid(&mut self, tender_id: &str, bid_id: &str, payload: &[u8]) -> EngineResult<BidRef> {
        let input = self.tx().transient(BID_TRANSIENT_FIELD, payload.to_vec());
        self.invoke_with(input, |c, s| c.submit_bid(s, tender_id, bid_id))
    }

    pub fn submit_milestone(
        &mut self,
        tender_id: &str,
        milestone_id: &str,
        payload: &[u8],
    ) -> EngineResult<MilestoneRef> {
        let input = self.tx().transient(MILESTONE_TRANSIENT_FIELD, payload.to_vec());
        self.invoke_with(input, |c, s| c.submit_milestone(s, tender_id, milestone_id))
    }

    /// Create and publish with the clock at the issue date, then move the
    /// clock into the bid window.
    pub fn open_tender(&mut self, tender_json: &[u8]) -> Result<Tender> {
        self.set_clock(fixtures::ISSUE_DATE)?;
        let created = self.create_tender(tender_json)?;
        self.publish(&created.id)?;
        self.set_clock(fixtures::DURING_WINDOW)?;
        Ok(self.query(|c, s| c.get_tender(s, &created.id))?)
    }

    /// Names of every committed event, in commit order.
    pub fn event_names(&self) -> Vec<String> {
        self.ledger.events().iter().map(|e| e.name.clone()).collect()
    }

    pub fn decoded_events(&self) -> Result<Vec<LedgerEvent>> {
        self.ledger
            .events()
            .iter()
            .map(|e| {
                LedgerEvent::decode(&e.name, e.payload.as_bytes())
                    .with_context(|| format!("decode event {}", e.name))
            })
            .collect()
    }
}
