use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tnd_config::{report_unknown_keys, EngineConfig, UnusedKeyPolicy};
use tnd_schemas::{parse_ts, LedgerEvent};

mod commands;
mod session;

use commands::bid::BidCmd;
use commands::evaluation::EvalCmd;
use commands::milestone::MilestoneCmd;
use commands::payment::PaymentCmd;
use commands::tender::TenderCmd;
use session::Session;

#[derive(Parser)]
#[command(name = "tnd")]
#[command(about = "Procurement ledger operator CLI", long_about = None)]
struct Cli {
    /// Ledger snapshot file. Created on the first write.
    #[arg(long, global = true, env = "TND_LEDGER", default_value = "tnd-ledger.json")]
    ledger: PathBuf,

    /// Layered config paths in merge order (base -> site -> overrides)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    /// Transaction time, RFC 3339. Defaults to now.
    #[arg(long, global = true)]
    at: Option<String>,

    /// Refuse config keys that no engine setting reads
    #[arg(long, global = true, default_value_t = false)]
    strict_config: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Tender lifecycle
    Tender {
        #[command(subcommand)]
        cmd: TenderCmd,
    },

    /// Sealed bids
    Bid {
        #[command(subcommand)]
        cmd: BidCmd,
    },

    /// Bid evaluation
    Eval {
        #[command(subcommand)]
        cmd: EvalCmd,
    },

    /// Milestone claims
    Milestone {
        #[command(subcommand)]
        cmd: MilestoneCmd,
    },

    /// Partial payments, retention, financial summary
    Payment {
        #[command(subcommand)]
        cmd: PaymentCmd,
    },

    /// Committed events, oldest first
    Events {
        #[arg(long)]
        tender: Option<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    if let Commands::ConfigHash { paths } = &cli.cmd {
        let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        let loaded = tnd_config::load_layered_yaml(&path_refs)?;
        println!("config_hash={}", loaded.config_hash);
        println!("{}", loaded.canonical_json);
        return Ok(());
    }

    let cfg = load_config(&cli.config_paths, cli.strict_config)?;
    let at = match &cli.at {
        Some(raw) => parse_ts(raw).with_context(|| format!("invalid --at '{raw}'"))?,
        None => Utc::now(),
    };
    let mut session = Session::open(&cli.ledger, &cfg, at)?;

    match cli.cmd {
        Commands::ConfigHash { .. } => {}
        Commands::Tender { cmd } => commands::tender::run(cmd, &mut session)?,
        Commands::Bid { cmd } => commands::bid::run(cmd, &mut session)?,
        Commands::Eval { cmd } => commands::evaluation::run(cmd, &mut session)?,
        Commands::Milestone { cmd } => commands::milestone::run(cmd, &mut session)?,
        Commands::Payment { cmd } => commands::payment::run(cmd, &mut session)?,
        Commands::Events { tender } => print_events(&session, tender.as_deref())?,
    }
    Ok(())
}

fn init_tracing() {
    // stderr: stdout carries the command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn load_config(paths: &[String], strict: bool) -> Result<EngineConfig> {
    if paths.is_empty() {
        return Ok(EngineConfig::default());
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let (cfg, loaded) = EngineConfig::load(&path_refs)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unknown_keys(&loaded.config_json, policy)?;
    for pointer in &report.unknown_leaf_pointers {
        tracing::warn!(key = %pointer, "config key is not an engine setting");
    }
    tracing::info!(config_hash = %loaded.config_hash, "config loaded");
    Ok(cfg)
}

fn print_events(session: &Session, tender: Option<&str>) -> Result<()> {
    let mut out = Vec::new();
    for e in session.ledger().events() {
        let decoded = LedgerEvent::decode(&e.name, e.payload.as_bytes())
            .with_context(|| format!("decode event {} in block {}", e.name, e.block))?;
        if tender.is_some_and(|t| decoded.tender_id() != t) {
            continue;
        }
        let payload: Value = serde_json::from_slice(e.payload.as_bytes())
            .with_context(|| format!("event {} payload is not JSON", e.name))?;
        out.push(json!({
            "block": e.block,
            "txId": e.tx_id,
            "name": e.name,
            "payload": payload,
        }));
    }
    commands::print_json(&out)
}
