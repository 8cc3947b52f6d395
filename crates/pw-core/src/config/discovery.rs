//! Configuration discovery and resolution

use super::types::Config;
use crate::home::config_dir;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override store file location
    pub store_path: Option<PathBuf>,
    /// Path to config file override
    pub config_path: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables (`PW_STORE_PATH`, `PW_TELEGRAM_BOT_TOKEN`,
///    `PW_TELEGRAM_CHAT_ID`)
/// 3. Config file (`--config` path, or `~/.config/parcel-watch/config.toml`)
/// 4. Defaults
///
/// A fresh install with no config file at all resolves cleanly; an
/// unparseable global config is logged and skipped, while an explicitly
/// requested `--config` file must parse.
pub fn resolve_config(overrides: &ConfigOverrides, home_dir: &Path) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // 3. Config file
    if let Some(ref explicit) = overrides.config_path {
        merge_config(&mut config, load_config_file(explicit)?);
    } else {
        let global_path = config_dir(home_dir).join("config.toml");
        if global_path.exists() {
            match load_config_file(&global_path) {
                Ok(file_config) => merge_config(&mut config, file_config),
                Err(e) => warn!("Failed to parse global config at {global_path:?}: {e}"),
            }
        }
    }

    // 2. Environment variables
    apply_env_overrides(&mut config);

    // 1. Command-line overrides
    if let Some(ref path) = overrides.store_path {
        config.store.path = Some(path.clone());
    }

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn merge_config(config: &mut Config, file_config: Config) {
    if file_config.store.path.is_some() {
        config.store.path = file_config.store.path;
    }
    if file_config.telegram.bot_token.is_some() {
        config.telegram.bot_token = file_config.telegram.bot_token;
    }
    if file_config.telegram.chat_id.is_some() {
        config.telegram.chat_id = file_config.telegram.chat_id;
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = std::env::var("PW_STORE_PATH")
        && !path.is_empty()
    {
        config.store.path = Some(PathBuf::from(path));
    }
    if let Ok(token) = std::env::var("PW_TELEGRAM_BOT_TOKEN")
        && !token.is_empty()
    {
        config.telegram.bot_token = Some(token);
    }
    if let Ok(chat) = std::env::var("PW_TELEGRAM_CHAT_ID")
        && !chat.is_empty()
    {
        config.telegram.chat_id = Some(chat);
    }
}
