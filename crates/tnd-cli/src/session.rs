use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tnd_config::EngineConfig;
use tnd_engine::{Contract, EngineResult};
use tnd_ledger::{LedgerGateway, MemoryLedger, TxInput};

/// One CLI invocation: a ledger snapshot loaded from disk, the contract built
/// from config, and the transaction time every handler in this run sees.
pub struct Session {
    path: PathBuf,
    ledger: MemoryLedger,
    contract: Contract,
    at: DateTime<Utc>,
}

impl Session {
    pub fn open(path: &Path, cfg: &EngineConfig, at: DateTime<Utc>) -> Result<Self> {
        let mut ledger = if path.exists() {
            let raw = fs::read(path).with_context(|| format!("read ledger: {}", path.display()))?;
            serde_json::from_slice::<MemoryLedger>(&raw)
                .with_context(|| format!("parse ledger: {}", path.display()))?
        } else {
            tracing::info!(path = %path.display(), "starting empty ledger");
            MemoryLedger::new()
        };
        let contract = Contract::new(cfg);
        ledger.define_collection(contract.bids_collection());
        ledger.define_collection(contract.milestones_collection());

        Ok(Self {
            path: path.to_path_buf(),
            ledger,
            contract,
            at,
        })
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Run one write handler, commit it, and persist the snapshot.
    pub fn write<T>(
        &mut self,
        transient: Option<(&str, Vec<u8>)>,
        f: impl FnOnce(&Contract, &mut dyn LedgerGateway) -> EngineResult<T>,
    ) -> Result<T> {
        let mut input = TxInput::at(self.at).nonce(self.ledger.height());
        if let Some((name, bytes)) = transient {
            input = input.transient(name, bytes);
        }
        let contract = &self.contract;
        let out = self.ledger.submit(input, |stub| f(contract, stub))?;
        self.save()?;
        Ok(out)
    }

    pub fn read<T>(&self, f: impl FnOnce(&Contract, &dyn LedgerGateway) -> EngineResult<T>) -> Result<T> {
        let contract = &self.contract;
        Ok(self
            .ledger
            .query(TxInput::at(self.at), |stub| f(contract, &*stub))?)
    }

    fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.ledger).context("serialize ledger")?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace ledger: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), height = self.ledger.height(), "ledger saved");
        Ok(())
    }
}
