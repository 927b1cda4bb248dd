use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use crate::core::message::Message;
use std::path::{Path, PathBuf};

/// Read-modify-write access to one config file.
///
/// Every mutation reloads the file, applies the change and rewrites the whole
/// file. Concurrent processes race last-writer-wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store backed by `~/.nexly/config.json`.
    pub fn open_default() -> Result<Self, ConfigError> {
        Config::default_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to the defaults when the file is
    /// unreadable or malformed.
    pub fn load(&self) -> Config {
        match Config::load_from_path(&self.path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}; using default configuration");
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.save_to_path(&self.path)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    pub fn mutate<F, T>(&self, mutator: F) -> Result<T, ConfigError>
    where
        F: FnOnce(&mut Config) -> T,
    {
        let mut working = self.load();
        let result = mutator(&mut working);
        self.save(&working)?;
        Ok(result)
    }

    pub fn set_provider(&self, provider: &str) -> Result<(), ConfigError> {
        self.mutate(|config| config.provider = provider.to_string())
    }

    pub fn set_model(&self, model: &str) -> Result<(), ConfigError> {
        self.mutate(|config| config.model = model.to_string())
    }

    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), ConfigError> {
        self.mutate(|config| config.set_api_key(provider, key))
    }

    /// Append messages to the persisted history, keeping the newest entries.
    pub fn append_history(&self, messages: &[Message]) -> Result<(), ConfigError> {
        self.mutate(|config| {
            for message in messages {
                config.push_history(message.clone());
            }
        })
    }

    pub fn clear_history(&self) -> Result<(), ConfigError> {
        self.mutate(Config::clear_history)
    }
}
