//! On-disk store document schema

use super::TrackedItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current store schema version
pub const STORE_VERSION: u32 = 1;

/// The full durable store document
///
/// The `packages` key and entry shape come from the original tracking file;
/// `version` and `last_run` are store metadata added on top. Files written
/// before the metadata existed (bare `{"packages": [...]}`) still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFile {
    /// Schema version marker
    #[serde(default = "default_version")]
    pub version: u32,

    /// RFC 3339 timestamp of the last completed pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,

    /// Tracked shipments in insertion order
    #[serde(default)]
    pub packages: Vec<TrackedItem>,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

fn default_version() -> u32 {
    STORE_VERSION
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            last_run: None,
            packages: Vec::new(),
            unknown_fields: HashMap::new(),
        }
    }
}
