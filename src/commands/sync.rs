//! `subsync sync`: fetch everything once and report what came back.
//!
//! A failed sync still reports the partial counts and the error, then exits
//! non-zero.

use std::time::Instant;

use anyhow::{Result, bail};
use colored::Colorize;

use crate::cli::context::RunContext;
use crate::output::format::OutputMode;
use crate::output::json::{SyncSummary, to_json};
use crate::output::progress::format_duration;
use crate::store::RefreshOutcome;

pub fn run(ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;

    let start = Instant::now();
    let outcome = super::refresh(&store, true)?;
    if outcome == RefreshOutcome::AlreadyRefreshing {
        bail!("A refresh is already running");
    }

    let error = store.last_error();
    let summary = SyncSummary::from_snapshot(&store.snapshot(), start.elapsed().as_millis())
        .with_error(error.as_ref());

    match ctx.output_mode {
        OutputMode::Json => println!("{}", to_json(&summary)),
        OutputMode::Tty => print_summary(&summary, start.elapsed()),
    }

    match error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn print_summary(summary: &SyncSummary, elapsed: std::time::Duration) {
    match &summary.error {
        None => println!("{} in {}", "Sync complete".bold(), format_duration(elapsed)),
        Some(error) => {
            let code = error.code.map_or_else(|| "none".to_string(), |c| c.to_string());
            println!(
                "{} after {} (code {})",
                "Sync failed".red().bold(),
                format_duration(elapsed),
                code
            );
        }
    }
    println!(
        "  Submissions:  {} ({} with entries, {} entries)",
        summary.submissions, summary.submissions_with_entries, summary.entries
    );
    println!("  Forms:        {}", summary.forms);
    println!("  Reviews:      {}", summary.reviews);
    println!("  Team members: {}", summary.team_members);
    println!("  Payments:     {}", summary.payment_details);
}
