use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "subsync", version = env!("SUBSYNC_VERSION"), about = "Browse your Submittable submissions, forms, reviews, and team")]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (uses human-readable format without ANSI codes)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Display timestamps in UTC instead of local time
    #[arg(long, global = true)]
    pub utc: bool,

    /// Use a specific API key instead of SUBMITTABLE_API_KEY or the config file
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Use a specific config file instead of the default
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Enable verbose output for debugging API calls and refreshes
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch everything and report what was loaded
    Sync,

    /// List submissions, newest first
    #[command(visible_alias = "ls")]
    Submissions {
        /// Only submissions for this organization name
        #[arg(long)]
        org: Option<String>,
    },

    /// Show a submission with its form entries and payment details
    Show {
        /// Submission ID
        submission: String,
    },

    /// List forms
    Forms,

    /// List reviews
    Reviews,

    /// List team members
    Team,

    /// List payment details
    Payments {
        /// Load entries from this form instead of the detected payment form
        #[arg(long)]
        form: Option<String>,
    },

    /// Manage the stored API key
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the current configuration (key masked)
    Show,
    /// Store an API key in the config file
    SetKey {
        /// Submittable API key
        key: String,
    },
    /// Remove the stored API key
    ClearKey,
    /// Print the config file path
    Path,
}
