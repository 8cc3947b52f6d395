//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Telegram transport configuration
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file location; defaults to
    /// `~/.config/parcel-watch/tracking.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Effective store file path given the resolved home directory
    pub fn resolved_path(&self, home_dir: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| crate::home::config_dir(home_dir).join("tracking.json"))
    }
}

/// Telegram transport configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Destination chat id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Both credentials, when the transport is fully configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => {
                Some((token, chat))
            }
            _ => None,
        }
    }
}
