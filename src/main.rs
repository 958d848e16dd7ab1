mod api;
mod cli;
mod commands;
mod config;
mod models;
mod output;
mod platform;
mod store;

use anyhow::Result;
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::context::RunContext;

fn main() -> Result<()> {
    setup_broken_pipe_handling();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = RunContext::from_args(cli.json, cli.no_color, cli.utc, cli.config, cli.api_key)?;

    match &cli.command {
        // Config commands work without an API key
        Commands::Config { action } => commands::config::run(action, &ctx)?,

        Commands::Sync => commands::sync::run(&ctx)?,
        Commands::Submissions { org } => commands::submissions::list(org.as_deref(), &ctx)?,
        Commands::Show { submission } => commands::submissions::show(submission, &ctx)?,
        Commands::Forms => commands::catalog::forms(&ctx)?,
        Commands::Reviews => commands::catalog::reviews(&ctx)?,
        Commands::Team => commands::catalog::team(&ctx)?,
        Commands::Payments { form } => commands::payments::run(form.as_deref(), &ctx)?,
    }

    Ok(())
}

/// Initialize logging based on the `--verbose` flag or `SUBSYNC_LOG` env var.
///
/// - `SUBSYNC_LOG` env var: full filter control (e.g. `SUBSYNC_LOG=subsync::api=trace`)
/// - `--verbose`: sets `subsync` crate to `Debug` level
/// - Otherwise: `Warn` level only (effectively silent)
fn init_logging(verbose: bool) {
    let env_var = std::env::var("SUBSYNC_LOG").ok();

    let mut builder = env_logger::Builder::new();
    builder.format_target(true);
    builder.format_module_path(false);

    if let Some(ref filter) = env_var {
        builder.parse_filters(filter);
    } else if verbose {
        builder.filter_module("subsync", log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Warn);
    }

    builder.init();
}

/// Handle broken pipe gracefully instead of panicking.
///
/// When output is piped to a process that exits early (e.g., `subsync ls --json | head -1`),
/// Rust's `println!` panics because the runtime sets SIGPIPE to SIG_IGN. This function:
/// - On Unix: resets SIGPIPE to default behavior so the OS terminates the process cleanly
/// - On all platforms: installs a panic hook that exits silently on stdout pipe failures
fn setup_broken_pipe_handling() {
    #[cfg(unix)]
    unsafe {
        // SIGPIPE = 13, SIG_DFL = 0
        unsafe extern "C" {
            fn signal(sig: i32, handler: usize) -> usize;
        }
        signal(13, 0);
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info
            .payload()
            .downcast_ref::<String>()
            .map(|s| s.as_str())
            .or_else(|| info.payload().downcast_ref::<&str>().copied())
            .unwrap_or("");

        if msg.contains("failed printing to stdout") {
            std::process::exit(0);
        }

        default_hook(info);
    }));
}
