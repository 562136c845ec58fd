use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use tnd_engine::BID_TRANSIENT_FIELD;

use super::{print_json, read_payload};
use crate::session::Session;

#[derive(Subcommand)]
pub enum BidCmd {
    /// Commit a sealed bid. The file bytes are the private payload.
    Submit {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        bid: String,
        #[arg(long)]
        file: PathBuf,
    },

    /// Public references only
    List {
        #[arg(long)]
        tender: String,
    },

    /// Private payload (needs bids collection access)
    Show {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        bid: String,
    },

    /// Re-hash the stored payload against its public commitment
    Verify {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        bid: String,
    },
}

pub fn run(cmd: BidCmd, session: &mut Session) -> Result<()> {
    match cmd {
        BidCmd::Submit { tender, bid, file } => {
            let payload = read_payload(&file)?;
            let r = session.write(Some((BID_TRANSIENT_FIELD, payload)), |c, s| {
                c.submit_bid(s, &tender, &bid)
            })?;
            println!("submitted=true tender_id={} bid_id={}", r.tender_id, r.bid_id);
            println!("bid_hash={}", r.bid_hash);
        }

        BidCmd::List { tender } => print_json(&session.read(|c, s| c.list_bids(s, &tender))?)?,

        BidCmd::Show { tender, bid } => {
            print_json(&session.read(|c, s| c.read_bid_private(s, &tender, &bid))?)?
        }

        BidCmd::Verify { tender, bid } => {
            let check = session.read(|c, s| c.verify_bid(s, &tender, &bid))?;
            println!("matches={}", check.matches);
            println!("committed={}", check.committed);
            println!("recomputed={}", check.recomputed);
        }
    }
    Ok(())
}
