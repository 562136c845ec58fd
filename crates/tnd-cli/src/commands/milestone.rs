use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use tnd_engine::MILESTONE_TRANSIENT_FIELD;
use tnd_schemas::MilestoneRef;

use super::{print_json, read_payload};
use crate::session::Session;

#[derive(Subcommand)]
pub enum MilestoneCmd {
    /// Submit a milestone claim. The file bytes are the private payload.
    Submit {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        milestone: String,
        #[arg(long)]
        file: PathBuf,
    },

    /// SUBMITTED -> APPROVED, releases payment
    Approve {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        milestone: String,
    },

    /// SUBMITTED -> REJECTED
    Reject {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        milestone: String,
        #[arg(long)]
        reason: String,
    },

    List {
        #[arg(long)]
        tender: String,
    },

    /// Private claim (needs milestones collection access)
    Show {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        milestone: String,
    },
}

pub fn run(cmd: MilestoneCmd, session: &mut Session) -> Result<()> {
    match cmd {
        MilestoneCmd::Submit {
            tender,
            milestone,
            file,
        } => {
            let payload = read_payload(&file)?;
            let r = session.write(Some((MILESTONE_TRANSIENT_FIELD, payload)), |c, s| {
                c.submit_milestone(s, &tender, &milestone)
            })?;
            print_ref("submitted", &r);
            println!("payload_hash={}", r.payload_hash);
        }

        MilestoneCmd::Approve { tender, milestone } => {
            let r = session.write(None, |c, s| c.approve_milestone(s, &tender, &milestone))?;
            print_ref("approved", &r);
        }

        MilestoneCmd::Reject {
            tender,
            milestone,
            reason,
        } => {
            let r = session.write(None, |c, s| {
                c.reject_milestone(s, &tender, &milestone, &reason)
            })?;
            print_ref("rejected", &r);
        }

        MilestoneCmd::List { tender } => {
            print_json(&session.read(|c, s| c.list_milestones(s, &tender))?)?
        }

        MilestoneCmd::Show { tender, milestone } => print_json(
            &session.read(|c, s| c.read_milestone_private(s, &tender, &milestone))?,
        )?,
    }
    Ok(())
}

fn print_ref(flag: &str, r: &MilestoneRef) {
    println!(
        "{flag}=true tender_id={} milestone_id={} status={} payment_released={}",
        r.tender_id, r.milestone_id, r.status, r.payment_released
    );
}
