use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};

fn dirs_home() -> Option<PathBuf> {
    env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| env::var("USERPROFILE").ok().map(PathBuf::from))
}

/// Get the config directory for subsync (holds `config.toml`)
pub fn config_dir() -> Result<PathBuf> {
    let dir = if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("subsync")
    } else if cfg!(target_os = "windows") && env::var("APPDATA").is_ok() {
        PathBuf::from(env::var("APPDATA")?).join("subsync")
    } else if let Some(home) = dirs_home() {
        if cfg!(target_os = "macos") {
            home.join("Library").join("Application Support").join("subsync")
        } else {
            // Linux (including WSL)
            home.join(".config").join("subsync")
        }
    } else {
        bail!("Cannot determine config directory");
    };

    Ok(dir)
}
