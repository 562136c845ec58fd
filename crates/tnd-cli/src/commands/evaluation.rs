use anyhow::Result;
use clap::Subcommand;

use super::print_json;
use crate::session::Session;

#[derive(Subcommand)]
pub enum EvalCmd {
    /// Score every readable bid of a CLOSED tender
    Run {
        #[arg(long)]
        tender: String,
    },

    /// Record an externally computed score in [0, 100]
    Record {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        bid: String,
        #[arg(long)]
        score: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },

    List {
        #[arg(long)]
        tender: String,
    },
}

pub fn run(cmd: EvalCmd, session: &mut Session) -> Result<()> {
    match cmd {
        EvalCmd::Run { tender } => {
            let evals = session.write(None, |c, s| c.evaluate_bids(s, &tender))?;
            println!("evaluated={} tender_id={}", evals.len(), tender);
            for e in &evals {
                println!("bid_id={} score={}", e.bid_id, e.score);
            }
        }

        EvalCmd::Record {
            tender,
            bid,
            score,
            notes,
        } => {
            let e = session.write(None, |c, s| c.record_evaluation(s, &tender, &bid, score, &notes))?;
            println!("recorded=true tender_id={} bid_id={} score={}", e.tender_id, e.bid_id, e.score);
        }

        EvalCmd::List { tender } => {
            print_json(&session.read(|c, s| c.list_evaluations(s, &tender))?)?
        }
    }
    Ok(())
}
