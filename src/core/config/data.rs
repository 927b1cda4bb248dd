use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::builtin_providers::ProviderProfile;
use crate::core::message::Message;

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Persisted history keeps at most this many messages; older ones are dropped.
pub const HISTORY_LIMIT: usize = 100;

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Provider ID → API key
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
    #[serde(default)]
    pub history: Vec<Message>,
    /// Upper bound for a whole exchange. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_keys: BTreeMap::new(),
            history: Vec::new(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Stored key for a provider, ignoring blank entries.
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys
            .get(provider)
            .map(String::as_str)
            .filter(|key| !key.trim().is_empty())
    }

    /// Key from the config file, then from the profile's environment variable.
    pub fn resolve_api_key(&self, profile: &ProviderProfile) -> Option<String> {
        self.api_key(&profile.id)
            .map(str::to_string)
            .or_else(|| profile.env_api_key())
    }

    pub fn set_api_key(&mut self, provider: &str, key: &str) {
        self.api_keys
            .insert(provider.to_string(), key.trim().to_string());
    }

    /// Providers that have a non-blank key stored.
    pub fn providers_with_keys(&self) -> Vec<&str> {
        self.api_keys
            .iter()
            .filter(|(_, key)| !key.trim().is_empty())
            .map(|(provider, _)| provider.as_str())
            .collect()
    }

    pub fn push_history(&mut self, message: Message) {
        self.history.push(message);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Get a user-friendly display string for a path, using `~` for the home
/// directory on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
