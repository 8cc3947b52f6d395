//! Pluggable courier backends
//!
//! A courier backend resolves one tracking number to its current
//! `(status, checkpoint)` pair. The engine only ever talks to the
//! [`CourierBackend`] trait; couriers register in a flat
//! [`CourierRegistry`] keyed by discriminator string, so adding a courier
//! touches nothing outside this module.

mod fedex;
mod uniuni;

pub use fedex::FedexBackend;
pub use uniuni::UniUniBackend;

use std::time::Duration;
use thiserror::Error;

/// Discriminator for the UniUni backend
pub const UNIUNI: &str = "uniuni";
/// Discriminator for the FedEx backend
pub const FEDEX: &str = "fedex";

/// Per-call network timeout shared by the bundled backends
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// A fresh observation of a shipment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Short canonical status label, e.g. "In Transit", "Delivered"
    pub status: String,

    /// Free-text detail (last scan location/time); display only
    pub checkpoint: String,
}

/// Errors from a single tracking lookup
///
/// All of these are per-item and transient from the engine's point of
/// view: the item is skipped this pass and retried on the next one.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Network-level failure reaching the courier
    #[error("request to {courier} failed for {number}: {source}")]
    Http {
        courier: &'static str,
        number: String,
        source: reqwest::Error,
    },

    /// The courier answered but the payload was not in the expected shape
    #[error("could not parse {courier} response for {number}: {message}")]
    Parse {
        courier: &'static str,
        number: String,
        message: String,
    },

    /// The courier does not know this tracking number
    #[error("{courier} has no record of {number}")]
    NotFound {
        courier: &'static str,
        number: String,
    },
}

/// Capability interface: resolve a tracking number to its current status
///
/// Implementations must be safe to invoke repeatedly and independently per
/// item; no shared mutable state is required between calls.
pub trait CourierBackend {
    fn resolve(&self, number: &str) -> Result<Observation, LookupError>;
}

/// Flat map from courier discriminator to backend, in registration order
#[derive(Default)]
pub struct CourierRegistry {
    backends: Vec<(String, Box<dyn CourierBackend>)>,
}

impl CourierRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled couriers (uniuni, fedex) behind one
    /// shared HTTP client
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let mut registry = Self::new();
        registry.register(UNIUNI, UniUniBackend::new(client.clone()));
        registry.register(FEDEX, FedexBackend::new(client));
        Ok(registry)
    }

    /// Register (or replace) a backend under `courier`
    pub fn register(&mut self, courier: impl Into<String>, backend: impl CourierBackend + 'static) {
        let courier = courier.into();
        self.backends.retain(|(name, _)| *name != courier);
        self.backends.push((courier, Box::new(backend)));
    }

    /// Backend for `courier`, if one is registered
    pub fn backend(&self, courier: &str) -> Option<&dyn CourierBackend> {
        self.backends
            .iter()
            .find(|(name, _)| name == courier)
            .map(|(_, backend)| backend.as_ref())
    }

    /// Whether a backend is registered under `courier`
    pub fn contains(&self, courier: &str) -> bool {
        self.backends.iter().any(|(name, _)| name == courier)
    }

    /// Registered discriminators in registration order
    pub fn couriers(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|(name, _)| name.as_str())
    }
}

impl std::fmt::Debug for CourierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.backends.iter().map(|(name, _)| name))
            .finish()
    }
}

/// Guess the courier for an identifier added without an explicit one
///
/// FedEx numbers are all digits at 12, 15, 20, or 22 characters; anything
/// else defaults to UniUni.
pub fn infer_courier(number: &str) -> &'static str {
    let all_digits = !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit());
    if all_digits && matches!(number.len(), 12 | 15 | 20 | 22) {
        FEDEX
    } else {
        UNIUNI
    }
}
