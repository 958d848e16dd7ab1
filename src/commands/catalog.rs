//! Listings that come straight from the snapshot: forms, reviews, team.

use anyhow::Result;

use crate::cli::context::RunContext;
use crate::output::format::OutputMode;
use crate::output::json::to_json;
use crate::output::table::{format_form_row, format_review_row, format_team_row};

pub fn forms(ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;
    let snapshot = super::load(&store, false)?;

    match ctx.output_mode {
        OutputMode::Json => println!("{}", to_json(&snapshot.forms)),
        OutputMode::Tty => {
            if snapshot.forms.is_empty() {
                println!("No forms found.");
            }
            for form in &snapshot.forms {
                println!("{}", format_form_row(form));
            }
        }
    }

    Ok(())
}

pub fn reviews(ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;
    let snapshot = super::load(&store, false)?;

    match ctx.output_mode {
        OutputMode::Json => println!("{}", to_json(&snapshot.reviews)),
        OutputMode::Tty => {
            if snapshot.reviews.is_empty() {
                println!("No reviews found.");
            }
            for review in &snapshot.reviews {
                println!("{}", format_review_row(review, &ctx.tz));
            }
        }
    }

    Ok(())
}

pub fn team(ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;
    let snapshot = super::load(&store, false)?;

    match ctx.output_mode {
        OutputMode::Json => println!("{}", to_json(&snapshot.team_members)),
        OutputMode::Tty => {
            if snapshot.team_members.is_empty() {
                println!("No team members found.");
            }
            for member in &snapshot.team_members {
                println!("{}", format_team_row(member));
            }
        }
    }

    Ok(())
}
