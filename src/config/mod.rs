//! Configuration (layered: code > env > config file > defaults).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ChatError;
use crate::session::ThinkingDelay;
use crate::storage::file::normalize_key;
use crate::storage::FileStoreConfig;
use crate::store::{StoreKeys, DEFAULT_KEY_PREFIX};

/// Environment variables read by [`ChatConfig::from_env`].
pub const ENV_CONFIG_FILE: &str = "JAAT_CHAT_CONFIG";
pub const ENV_DATA_DIR: &str = "JAAT_CHAT_DATA_DIR";
pub const ENV_KEY_PREFIX: &str = "JAAT_CHAT_KEY_PREFIX";
pub const ENV_THINKING_DELAY_MS: &str = "JAAT_CHAT_THINKING_DELAY_MS";
pub const ENV_THINKING_JITTER_MS: &str = "JAAT_CHAT_THINKING_JITTER_MS";
pub const ENV_PRODUCT_NAME: &str = "JAAT_CHAT_PRODUCT_NAME";

/// Runtime settings for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Directory holding the persisted state.
    pub data_dir: PathBuf,
    /// Namespace for storage keys.
    pub key_prefix: String,
    pub thinking_delay_ms: u64,
    pub thinking_jitter_ms: u64,
    /// Name used in canned replies.
    pub product_name: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            data_dir: FileStoreConfig::default_dir(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            thinking_delay_ms: 1000,
            thinking_jitter_ms: 2000,
            product_name: "Jaat-AI".to_string(),
        }
    }
}

/// On-disk TOML layout; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    key_prefix: Option<String>,
    thinking_delay_ms: Option<u64>,
    thinking_jitter_ms: Option<u64>,
    product_name: Option<String>,
}

impl ChatConfig {
    /// Default config file location (`<data dir>/config.toml`).
    pub fn default_config_path() -> PathBuf {
        FileStoreConfig::default_dir().join("config.toml")
    }

    /// Defaults overlaid with a TOML file. A missing file yields defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ChatError::Io(err)),
        };
        let file: ConfigFile = toml::from_str(&raw).map_err(|err| {
            ChatError::Configuration(format!("Invalid config file {}: {err}", path.display()))
        })?;

        let mut config = Self::default();
        if let Some(dir) = file.data_dir {
            config.data_dir = dir;
        }
        if let Some(prefix) = file.key_prefix {
            config.key_prefix = prefix;
        }
        if let Some(ms) = file.thinking_delay_ms {
            config.thinking_delay_ms = ms;
        }
        if let Some(ms) = file.thinking_jitter_ms {
            config.thinking_jitter_ms = ms;
        }
        if let Some(name) = file.product_name {
            config.product_name = name;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load `.env`, the config file, then environment overrides.
    pub fn from_env() -> Result<Self, ChatError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ChatConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let path = lookup(ENV_CONFIG_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        let mut config = Self::from_file(path)?;

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup(ENV_KEY_PREFIX) {
            config.key_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_THINKING_DELAY_MS) {
            config.thinking_delay_ms = parse_millis(ENV_THINKING_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_THINKING_JITTER_MS) {
            config.thinking_jitter_ms = parse_millis(ENV_THINKING_JITTER_MS, &raw)?;
        }
        if let Some(name) = lookup(ENV_PRODUCT_NAME) {
            config.product_name = name;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_thinking_delay(mut self, delay: ThinkingDelay) -> Self {
        self.thinking_delay_ms = delay.base.as_millis() as u64;
        self.thinking_jitter_ms = delay.jitter.as_millis() as u64;
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    pub fn thinking_delay(&self) -> ThinkingDelay {
        ThinkingDelay::new(
            Duration::from_millis(self.thinking_delay_ms),
            Duration::from_millis(self.thinking_jitter_ms),
        )
    }

    pub fn store_keys(&self) -> StoreKeys {
        StoreKeys::with_prefix(&self.key_prefix)
    }

    /// Reject settings that cannot work, such as an empty or non-canonical
    /// key prefix. Applied by the loaders; call it after builder overrides.
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.key_prefix.trim().is_empty() {
            return Err(ChatError::Configuration("key_prefix must not be empty".to_string()));
        }
        if normalize_key(&self.key_prefix) != self.key_prefix {
            return Err(ChatError::Configuration(format!(
                "key_prefix '{}' may only contain lowercase ASCII letters, digits, '-' and '_'",
                self.key_prefix
            )));
        }
        if self.product_name.trim().is_empty() {
            return Err(ChatError::Configuration(
                "product_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_millis(var: &str, raw: &str) -> Result<u64, ChatError> {
    raw.trim().parse().map_err(|_| {
        ChatError::Configuration(format!("{var} must be a whole number of milliseconds, got '{raw}'"))
    })
}
