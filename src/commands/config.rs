//! `subsync config`: inspect and edit `config.toml`. Never needs a key.

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::cli::args::ConfigAction;
use crate::cli::context::RunContext;
use crate::config::mask_key;
use crate::output::format::OutputMode;

pub fn run(action: &ConfigAction, ctx: &RunContext) -> Result<()> {
    match action {
        ConfigAction::Show => show(ctx),
        ConfigAction::SetKey { key } => set_key(key, ctx),
        ConfigAction::ClearKey => clear_key(ctx),
        ConfigAction::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show(ctx: &RunContext) -> Result<()> {
    let config = &ctx.config;
    let masked = config.api_key.as_deref().map(mask_key);

    match ctx.output_mode {
        OutputMode::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "path": ctx.config_path,
                    "api_key": masked,
                    "base_url": config.base_url(),
                    "page_size": config.page_size(),
                    "timeout_secs": config.timeout().as_secs(),
                    "payment_form_id": config.payment_form_id(),
                }))?
            );
        }
        OutputMode::Tty => {
            println!("Config file:     {}", ctx.config_path.display());
            println!(
                "API key:         {}",
                masked.as_deref().unwrap_or("(not set)")
            );
            let base_note = if config.base_url() == DEFAULT_BASE_URL { "" } else { " (custom)" };
            println!("Base URL:        {}{}", config.base_url(), base_note);
            let size_note = if config.page_size() == DEFAULT_PAGE_SIZE { "" } else { " (custom)" };
            println!("Page size:       {}{}", config.page_size(), size_note);
            println!("Timeout:         {}s", config.timeout().as_secs());
            println!(
                "Payment form:    {}",
                config.payment_form_id().unwrap_or("(detect)")
            );
        }
    }

    Ok(())
}

fn set_key(key: &str, ctx: &RunContext) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API key cannot be empty");
    }

    let mut config = ctx.config.clone();
    config.api_key = Some(key.to_string());
    config
        .save_to(&ctx.config_path)
        .with_context(|| format!("Failed to save {}", ctx.config_path.display()))?;

    eprintln!("[subsync] API key saved to {}", ctx.config_path.display());
    Ok(())
}

fn clear_key(ctx: &RunContext) -> Result<()> {
    if ctx.config.api_key.is_none() {
        eprintln!("[subsync] No API key stored.");
        return Ok(());
    }

    let mut config = ctx.config.clone();
    config.api_key = None;
    config
        .save_to(&ctx.config_path)
        .with_context(|| format!("Failed to save {}", ctx.config_path.display()))?;

    eprintln!("[subsync] API key removed from {}", ctx.config_path.display());
    Ok(())
}
