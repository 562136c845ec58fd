use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use tnd_schemas::{Tender, TenderStatus};

use super::{print_json, read_payload};
use crate::session::Session;

#[derive(Subcommand)]
pub enum TenderCmd {
    /// Create a structured (ENHANCED) tender from a JSON file. Starts DRAFT.
    Create {
        #[arg(long)]
        file: PathBuf,
    },

    /// Create a legacy BASIC tender with a fixed bid window. Starts OPEN.
    CreateBasic {
        #[arg(long)]
        id: String,
        #[arg(long)]
        description: String,
        /// RFC 3339, inclusive
        #[arg(long)]
        open_at: String,
        /// RFC 3339, exclusive
        #[arg(long)]
        close_at: String,
        #[arg(long, default_value = "")]
        criteria: String,
    },

    /// DRAFT -> OPEN
    Publish {
        #[arg(long)]
        id: String,
    },

    /// OPEN -> CLOSED
    Close {
        #[arg(long)]
        id: String,
    },

    /// Award to a named bid
    Award {
        #[arg(long)]
        id: String,
        #[arg(long)]
        bid: String,
    },

    /// Award to the best evaluated bid (CLOSED only)
    AwardBest {
        #[arg(long)]
        id: String,
    },

    Get {
        #[arg(long)]
        id: String,
    },

    /// All tenders in key order, optionally filtered by status
    List {
        #[arg(long)]
        status: Option<String>,
    },

    /// Committed versions of a tender record
    History {
        #[arg(long)]
        id: String,
    },

    /// Bid counts and amount figures
    Stats {
        #[arg(long)]
        id: String,
    },
}

pub fn run(cmd: TenderCmd, session: &mut Session) -> Result<()> {
    match cmd {
        TenderCmd::Create { file } => {
            let raw = read_payload(&file)?;
            let t = session.write(None, |c, s| c.create_tender(s, &raw))?;
            print_transition("created", &t);
        }

        TenderCmd::CreateBasic {
            id,
            description,
            open_at,
            close_at,
            criteria,
        } => {
            let t = session.write(None, |c, s| {
                c.create_basic_tender(s, &id, &description, &open_at, &close_at, &criteria)
            })?;
            print_transition("created", &t);
        }

        TenderCmd::Publish { id } => {
            let t = session.write(None, |c, s| c.publish_tender(s, &id))?;
            print_transition("published", &t);
        }

        TenderCmd::Close { id } => {
            let t = session.write(None, |c, s| c.close_tender(s, &id))?;
            print_transition("closed", &t);
        }

        TenderCmd::Award { id, bid } => {
            let t = session.write(None, |c, s| c.award_tender(s, &id, &bid))?;
            print_transition("awarded", &t);
        }

        TenderCmd::AwardBest { id } => {
            let outcome = session.write(None, |c, s| c.award_best_bid(s, &id))?;
            print_transition("awarded", &outcome.tender);
            println!("winning_score={}", outcome.winner.score);
        }

        TenderCmd::Get { id } => print_json(&session.read(|c, s| c.get_tender(s, &id))?)?,

        TenderCmd::List { status } => {
            let tenders = match status {
                None => session.read(|c, s| c.list_tenders(s))?,
                Some(raw) => {
                    let status = TenderStatus::parse(&raw)
                        .ok_or_else(|| anyhow!("unknown tender status '{raw}'"))?;
                    session.read(|c, s| c.list_tenders_by_status(s, status))?
                }
            };
            print_json(&tenders)?;
        }

        TenderCmd::History { id } => print_json(&session.read(|c, s| c.tender_history(s, &id))?)?,

        TenderCmd::Stats { id } => print_json(&session.read(|c, s| c.tender_statistics(s, &id))?)?,
    }
    Ok(())
}

fn print_transition(flag: &str, t: &Tender) {
    println!("{flag}=true tender_id={} status={} version={}", t.id, t.status, t.version);
    if let Some(bid) = &t.awarded_bid_id {
        println!("awarded_bid_id={bid}");
    }
}
