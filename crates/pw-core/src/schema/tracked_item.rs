//! Tracked shipment schema

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One shipment under watch
///
/// Stored in the `packages` array of the tracking store file, keyed by
/// `number`. `last_status` doubles as the "never observed" sentinel: a
/// freshly added item carries `None` until its first successful poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Opaque tracking identifier, unique within the store
    pub number: String,

    /// Courier discriminator selecting the backend that resolves this item.
    /// Legacy store files omit it; the store fills it in on load by
    /// inferring from the identifier shape.
    #[serde(default)]
    pub courier: String,

    /// Most recent status label observed, `None` if never polled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,

    /// Location/detail text paired with `last_status`; display only, never
    /// part of change detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checkpoint: Option<String>,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl TrackedItem {
    /// Create a new item that has never been polled
    pub fn new(number: impl Into<String>, courier: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            courier: courier.into(),
            last_status: None,
            last_checkpoint: None,
            unknown_fields: HashMap::new(),
        }
    }

    /// Whether this item has at least one successful observation
    pub fn is_observed(&self) -> bool {
        self.last_status.is_some()
    }
}
