//! Configuration resolution for pw binaries

mod discovery;
mod types;

pub use discovery::{ConfigError, ConfigOverrides, resolve_config};
pub use types::{Config, StoreConfig, TelegramConfig};
