use std::path::PathBuf;

use anyhow::Result;
use chrono::FixedOffset;

use crate::config::{Config, default_config_path};
use crate::output::format::OutputMode;

pub struct RunContext {
    pub output_mode: OutputMode,
    pub tz: FixedOffset,
    pub config_path: PathBuf,
    pub config: Config,
    /// `--api-key`, if given
    pub api_key_override: Option<String>,
}

impl RunContext {
    /// Create context from CLI arguments
    pub fn from_args(
        json: bool,
        no_color: bool,
        utc: bool,
        config_path: Option<PathBuf>,
        api_key: Option<String>,
    ) -> Result<Self> {
        if no_color {
            colored::control::set_override(false);
        }

        let output_mode = OutputMode::from_flag(json);
        let tz = if utc {
            FixedOffset::east_opt(0).unwrap_or_else(|| *chrono::Local::now().offset())
        } else {
            *chrono::Local::now().offset()
        };
        let config_path = match config_path {
            Some(path) => path,
            None => default_config_path()?,
        };
        let config = Config::load_from(&config_path)?;

        Ok(RunContext {
            output_mode,
            tz,
            config_path,
            config,
            api_key_override: api_key,
        })
    }
}
