//! Core types and engine for parcel-watch (pw)
//!
//! This crate provides everything behind the `pw` CLI: the durable status
//! store, the pluggable courier backends, the diff-and-notify pass, and the
//! add/remove lifecycle for tracked shipments.
//!
//! All schema types are designed to:
//! - Preserve unknown fields for forward compatibility
//! - Support round-trip serialization without data loss

pub mod config;
pub mod courier;
pub mod engine;
pub mod home;
pub mod logging;
pub mod notify;
pub mod registry;
pub mod runner;
pub mod schema;
pub mod store;

pub use courier::{CourierBackend, CourierRegistry, LookupError, Observation};
pub use engine::{ItemOutcome, PassOptions, RunSummary};
pub use notify::{NotifyError, Notifier};
pub use schema::TrackedItem;
pub use store::{StatusStore, StoreError};
