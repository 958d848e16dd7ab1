use std::fmt;
use std::sync::{Arc, RwLock};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;

/// Environment variable consulted when no `--api-key` is given
pub const API_KEY_ENV: &str = "SUBMITTABLE_API_KEY";

/// Shared, updatable Submittable API key.
///
/// Clones share the same key. A change is picked up by the next request that
/// reads it; requests already in flight keep the header they were built with.
#[derive(Clone, Default)]
pub struct Credential(Arc<RwLock<String>>);

impl Credential {
    #[cfg(test)]
    pub fn new(api_key: impl Into<String>) -> Self {
        let credential = Self::default();
        credential.set(api_key);
        credential
    }

    /// Replace the key for subsequent requests. Surrounding whitespace is
    /// dropped, so a blank key counts as no key.
    pub fn set(&self, api_key: impl Into<String>) {
        let api_key = api_key.into().trim().to_string();
        debug!("API key updated ({} chars)", api_key.len());
        let mut guard = self.0.write().unwrap_or_else(|e| e.into_inner());
        *guard = api_key;
    }

    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_present(&self) -> bool {
        !self.0.read().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    /// `Authorization` header value for the current key, if one is set.
    pub fn authorization(&self) -> Option<String> {
        let key = self.get();
        if key.is_empty() {
            None
        } else {
            Some(basic_auth_header(&key))
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.read().map(|k| k.len()).unwrap_or(0);
        write!(f, "Credential(<{} chars>)", len)
    }
}

/// Basic auth with the API key as username and an empty password.
pub fn basic_auth_header(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", api_key)))
}

/// Resolve the API key: `--api-key` flag, then `SUBMITTABLE_API_KEY`, then the
/// config file. Empty values are skipped.
pub fn resolve_api_key(flag: Option<&str>, config_key: Option<&str>) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    pick_api_key(flag, env_key.as_deref(), config_key)
}

fn pick_api_key(flag: Option<&str>, env: Option<&str>, config: Option<&str>) -> Option<String> {
    let sources = [("--api-key", flag), (API_KEY_ENV, env), ("config file", config)];
    for (source, key) in sources {
        if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
            debug!("Using API key from {} ({} chars)", source, key.len());
            return Some(key.to_string());
        }
    }
    debug!("No API key configured");
    None
}
