use anyhow::{Result, bail};

use crate::cli::context::RunContext;
use crate::models::Submission;
use crate::output::format::OutputMode;
use crate::output::json::{SubmissionDetailJson, to_json};
use crate::output::table::{format_submission_detail, format_submission_row};

pub fn list(org: Option<&str>, ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;
    let snapshot = super::load(&store, false)?;

    let subs: Vec<Submission> = match org {
        Some(org) => store.submissions_for_organization(org),
        None => snapshot.submissions.clone(),
    };

    match ctx.output_mode {
        OutputMode::Json => println!("{}", to_json(&subs)),
        OutputMode::Tty => {
            if subs.is_empty() {
                match org {
                    Some(org) => println!("No submissions found for \"{}\".", org),
                    None => println!("No submissions found."),
                }
                return Ok(());
            }
            for sub in &subs {
                println!("{}", format_submission_row(sub, &ctx.tz));
            }
        }
    }

    Ok(())
}

pub fn show(submission_id: &str, ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;
    let snapshot = super::load(&store, false)?;

    let Some(sub) = snapshot.submission(submission_id) else {
        bail!("No submission found with ID \"{}\"", submission_id);
    };
    let entries = store.entries_for(sub.id());
    let payments = store.payments_for(sub.id());

    match ctx.output_mode {
        OutputMode::Json => {
            let detail = SubmissionDetailJson {
                submission: sub,
                entries: &entries,
                payments: &payments,
            };
            println!("{}", to_json(&detail));
        }
        OutputMode::Tty => {
            println!("{}", format_submission_detail(sub, &entries, &payments, &ctx.tz));
        }
    }

    Ok(())
}
