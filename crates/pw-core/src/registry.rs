//! Tracking registry: operator add/remove commands
//!
//! Registry commands mutate which numbers exist in the store before the
//! poll pass runs. Adds validate their courier against the backend
//! registry and are idempotent for already-tracked numbers. Adds apply
//! before removes, so supplying both for the same number in one invocation
//! nets out to "untracked": remove wins. That ordering is a deliberate,
//! tested decision, not an accident of iteration.

use crate::courier::{CourierRegistry, infer_courier};
use crate::schema::TrackedItem;
use crate::store::StatusStore;
use thiserror::Error;
use tracing::info;

/// Add-time validation errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The requested courier has no registered backend
    #[error("no courier backend registered for '{courier}' (known: {known})")]
    UnknownCourier { courier: String, known: String },
}

/// An operator request to start tracking a number
#[derive(Debug, Clone)]
pub struct AddCommand {
    pub number: String,

    /// Explicit courier; inferred from the identifier shape when absent
    pub courier: Option<String>,
}

impl AddCommand {
    pub fn new(number: impl Into<String>, courier: Option<String>) -> Self {
        Self {
            number: number.into(),
            courier,
        }
    }
}

/// What an add actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// New entry created, never polled yet
    Inserted { courier: String },

    /// Number already tracked; nothing changed, observed status kept
    AlreadyTracked,

    /// Number already tracked; explicit courier replaced the old one,
    /// observed status kept
    CourierUpdated { from: String, to: String },
}

/// What a remove actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,

    /// Reported, not fatal: the number was never tracked
    NotTracked,
}

/// Net effect of one invocation's registry commands
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryReport {
    pub added: Option<AddOutcome>,
    pub removed: Option<RemoveOutcome>,
}

/// Apply one invocation's registry commands to the store
///
/// Both commands are optional and independent. The add runs first and the
/// remove second; a remove always deletes unconditionally, including an
/// entry the same invocation just added.
///
/// # Errors
///
/// `RegistryError::UnknownCourier` rejects an add whose courier (explicit
/// or inferred) names no registered backend. The store is not modified in
/// that case.
pub fn apply(
    store: &mut StatusStore,
    couriers: &CourierRegistry,
    add: Option<&AddCommand>,
    remove: Option<&str>,
) -> Result<RegistryReport, RegistryError> {
    let mut report = RegistryReport::default();

    if let Some(command) = add {
        report.added = Some(apply_add(store, couriers, command)?);
    }

    if let Some(number) = remove {
        let outcome = if store.remove(number) {
            info!("Stopped tracking {number}");
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotTracked
        };
        report.removed = Some(outcome);
    }

    Ok(report)
}

fn apply_add(
    store: &mut StatusStore,
    couriers: &CourierRegistry,
    command: &AddCommand,
) -> Result<AddOutcome, RegistryError> {
    let courier = command
        .courier
        .clone()
        .unwrap_or_else(|| infer_courier(&command.number).to_string());

    if !couriers.contains(&courier) {
        return Err(RegistryError::UnknownCourier {
            courier,
            known: couriers.couriers().collect::<Vec<_>>().join(", "),
        });
    }

    let Some(existing) = store.get(&command.number) else {
        info!("Now tracking {} via {courier}", command.number);
        store.upsert(TrackedItem::new(command.number.clone(), courier.clone()));
        return Ok(AddOutcome::Inserted { courier });
    };

    // Idempotent re-add: never reset the observed status. An explicit
    // courier may still re-home the item to a different backend.
    if command.courier.is_some() && existing.courier != courier {
        let mut updated = existing.clone();
        let from = std::mem::replace(&mut updated.courier, courier.clone());
        store.upsert(updated);
        info!("Re-homed {} from {from} to {courier}", command.number);
        return Ok(AddOutcome::CourierUpdated { from, to: courier });
    }

    Ok(AddOutcome::AlreadyTracked)
}
