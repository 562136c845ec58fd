use anyhow::Result;
use clap::Subcommand;

use super::print_json;
use crate::session::Session;

#[derive(Subcommand)]
pub enum PaymentCmd {
    /// Pay part of an APPROVED milestone claim
    Record {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        milestone: String,
        #[arg(long)]
        amount: f64,
    },

    /// One-shot retention release on an AWARDED tender
    ReleaseRetention {
        #[arg(long)]
        tender: String,
    },

    Summary {
        #[arg(long)]
        tender: String,
    },
}

pub fn run(cmd: PaymentCmd, session: &mut Session) -> Result<()> {
    match cmd {
        PaymentCmd::Record {
            tender,
            milestone,
            amount,
        } => {
            let p = session.write(None, |c, s| {
                c.record_partial_payment(s, &tender, &milestone, amount)
            })?;
            println!(
                "recorded=true tender_id={} milestone_id={} payments={}",
                p.tender_id,
                p.milestone_id,
                p.payments.len()
            );
            println!("paid_amount={}", p.paid_amount);
        }

        PaymentCmd::ReleaseRetention { tender } => {
            let r = session.write(None, |c, s| c.release_retention(s, &tender))?;
            println!(
                "released=true tender_id={} retention_percentage={} released_at={}",
                r.tender_id, r.retention_percentage, r.released_at
            );
        }

        PaymentCmd::Summary { tender } => {
            print_json(&session.read(|c, s| c.financial_summary(s, &tender))?)?
        }
    }
    Ok(())
}
