//! Run controller
//!
//! One run is: take the store lock, load, apply registry commands, walk
//! every item through the diff & notify pass, persist. The save happens
//! even when items failed lookup or delivery, because partial progress
//! (statuses observed for the items that succeeded) must survive the run.
//! Only store-level faults and add-time validation abort.
//!
//! The flock held across the whole load-mutate-save sequence is the
//! mutual-exclusion mechanism for concurrent runs against one store file:
//! a second run fails fast with a lock timeout instead of interleaving.

use crate::courier::CourierRegistry;
use crate::engine::{self, PassOptions, RunSummary};
use crate::notify::Notifier;
use crate::registry::{self, AddCommand, RegistryError, RegistryReport};
use crate::store::{self, StatusStore, StoreError};
use chrono::Utc;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Lock retry attempts shared by both entry points
const LOCK_RETRIES: u32 = 5;

/// Whole-run failures
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result of one complete run
#[derive(Debug)]
pub struct RunOutcome {
    /// What the registry commands did, if any were supplied
    pub registry: RegistryReport,

    /// Per-item outcomes of the poll pass
    pub summary: RunSummary,

    /// Whether the store file was rewritten
    pub saved: bool,
}

/// Execute one full pass: lock, load, registry ops, poll all, save
pub fn run(
    store_path: &Path,
    couriers: &CourierRegistry,
    notifier: &dyn Notifier,
    add: Option<&AddCommand>,
    remove: Option<&str>,
    options: &PassOptions,
) -> Result<RunOutcome, RunError> {
    let _lock = lock_store(store_path)?;
    let mut store = StatusStore::load(store_path);

    let registry_report = registry::apply(&mut store, couriers, add, remove)?;
    let summary = engine::run_pass(&mut store, couriers, notifier, options);
    let saved = persist(&mut store)?;

    info!(
        "Pass complete: {} notified, {} unchanged, {} failed",
        summary.notified(),
        summary.unchanged(),
        summary.failed()
    );

    Ok(RunOutcome {
        registry: registry_report,
        summary,
        saved,
    })
}

/// Apply registry commands without polling anyone
///
/// Backs the standalone `add`/`remove` CLI commands: same lock and save
/// discipline as a full run, no network.
pub fn apply_registry(
    store_path: &Path,
    couriers: &CourierRegistry,
    add: Option<&AddCommand>,
    remove: Option<&str>,
) -> Result<(RegistryReport, bool), RunError> {
    let _lock = lock_store(store_path)?;
    let mut store = StatusStore::load(store_path);

    let report = registry::apply(&mut store, couriers, add, remove)?;
    let saved = store.save()?;

    Ok((report, saved))
}

fn lock_store(store_path: &Path) -> Result<store::StoreLock, StoreError> {
    // Fresh installs have no store directory yet; the lock file needs one.
    if let Some(parent) = store_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    store::acquire_lock(&StatusStore::lock_path(store_path), LOCK_RETRIES)
}

/// Stamp the run timestamp and save, skipping both when nothing changed
///
/// `last_run` therefore records the last pass that altered the store, and
/// a pass that observed nothing new leaves the file byte-identical.
fn persist(store: &mut StatusStore) -> Result<bool, StoreError> {
    if store.content_changed()? {
        store.set_last_run(Utc::now().to_rfc3339());
    }
    store.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courier::{CourierBackend, LookupError, Observation};
    use crate::engine::ItemOutcome;
    use crate::notify::NotifyError;
    use crate::registry::{AddOutcome, RemoveOutcome};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct FixedBackend {
        status: &'static str,
        checkpoint: &'static str,
    }

    impl CourierBackend for FixedBackend {
        fn resolve(&self, _number: &str) -> Result<Observation, LookupError> {
            Ok(Observation {
                status: self.status.to_string(),
                checkpoint: self.checkpoint.to_string(),
            })
        }
    }

    struct FailingBackend;

    impl CourierBackend for FailingBackend {
        fn resolve(&self, number: &str) -> Result<Observation, LookupError> {
            Err(LookupError::NotFound {
                courier: "flaky",
                number: number.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, text: &str) -> Result<(), NotifyError> {
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("pw").join("tracking.json")
    }

    fn uniuni_registry(status: &'static str, checkpoint: &'static str) -> CourierRegistry {
        let mut registry = CourierRegistry::new();
        registry.register("uniuni", FixedBackend { status, checkpoint });
        registry
    }

    #[test]
    fn test_full_run_add_poll_save() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let couriers = uniuni_registry("In Transit", "Warehouse A");
        let notifier = RecordingNotifier::default();

        let add = AddCommand::new("UUS123", Some("uniuni".to_string()));
        let outcome = run(
            &path,
            &couriers,
            &notifier,
            Some(&add),
            None,
            &PassOptions::default(),
        )
        .unwrap();

        assert_eq!(
            outcome.registry.added,
            Some(AddOutcome::Inserted {
                courier: "uniuni".to_string()
            })
        );
        assert_eq!(outcome.summary.notified(), 1);
        assert!(outcome.saved);
        assert_eq!(notifier.sent.borrow().len(), 1);

        let reloaded = StatusStore::load(&path);
        assert_eq!(
            reloaded.get("UUS123").unwrap().last_status.as_deref(),
            Some("In Transit")
        );
        assert!(reloaded.last_run().is_some());
    }

    #[test]
    fn test_unchanged_pass_skips_save() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let couriers = uniuni_registry("In Transit", "Warehouse A");
        let notifier = RecordingNotifier::default();

        let add = AddCommand::new("UUS123", Some("uniuni".to_string()));
        run(
            &path,
            &couriers,
            &notifier,
            Some(&add),
            None,
            &PassOptions::default(),
        )
        .unwrap();
        let first_run = StatusStore::load(&path).last_run().unwrap().to_string();

        // Second pass observes the exact same state
        let outcome = run(&path, &couriers, &notifier, None, None, &PassOptions::default()).unwrap();

        assert_eq!(outcome.summary.unchanged(), 1);
        assert!(!outcome.saved);
        assert_eq!(StatusStore::load(&path).last_run().unwrap(), first_run);
    }

    #[test]
    fn test_add_and_remove_same_number_ends_untracked() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let couriers = uniuni_registry("In Transit", "");
        let notifier = RecordingNotifier::default();

        let add = AddCommand::new("UUS123", Some("uniuni".to_string()));
        let outcome = run(
            &path,
            &couriers,
            &notifier,
            Some(&add),
            Some("UUS123"),
            &PassOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.registry.removed, Some(RemoveOutcome::Removed));
        assert!(outcome.summary.items.is_empty());
        assert!(notifier.sent.borrow().is_empty());
        assert!(StatusStore::load(&path).get("UUS123").is_none());
    }

    #[test]
    fn test_invalid_courier_aborts_before_polling() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let couriers = uniuni_registry("In Transit", "");
        let notifier = RecordingNotifier::default();

        let add = AddCommand::new("X1", Some("dhl".to_string()));
        let result = run(
            &path,
            &couriers,
            &notifier,
            Some(&add),
            None,
            &PassOptions::default(),
        );

        assert!(matches!(result, Err(RunError::Registry(_))));
        assert!(notifier.sent.borrow().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_item_does_not_block_saving_others() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let notifier = RecordingNotifier::default();

        // Seed two items under different couriers
        let mut couriers = CourierRegistry::new();
        couriers.register(
            "uniuni",
            FixedBackend {
                status: "Delivered",
                checkpoint: "Front Door",
            },
        );
        couriers.register("flaky", FailingBackend);

        let add_ok = AddCommand::new("UUS123", Some("uniuni".to_string()));
        run(&path, &couriers, &notifier, Some(&add_ok), None, &PassOptions::default()).unwrap();
        let add_bad = AddCommand::new("UUS999", Some("flaky".to_string()));
        let outcome = run(
            &path,
            &couriers,
            &notifier,
            Some(&add_bad),
            None,
            &PassOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.summary.failed(), 1);
        assert!(
            outcome
                .summary
                .items
                .iter()
                .any(|r| r.number == "UUS999"
                    && matches!(r.outcome, ItemOutcome::LookupFailed { .. }))
        );

        // The failed item persisted as never-observed; the good one kept
        // its delivered status.
        let reloaded = StatusStore::load(&path);
        assert!(reloaded.get("UUS999").unwrap().last_status.is_none());
        assert_eq!(
            reloaded.get("UUS123").unwrap().last_status.as_deref(),
            Some("Delivered")
        );
    }

    #[test]
    fn test_apply_registry_without_polling() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let couriers = uniuni_registry("In Transit", "");

        let add = AddCommand::new("UUS123", Some("uniuni".to_string()));
        let (report, saved) = apply_registry(&path, &couriers, Some(&add), None).unwrap();

        assert_eq!(
            report.added,
            Some(AddOutcome::Inserted {
                courier: "uniuni".to_string()
            })
        );
        assert!(saved);

        // Nothing polled: the item is still unobserved
        let reloaded = StatusStore::load(&path);
        assert!(reloaded.get("UUS123").unwrap().last_status.is_none());
        assert!(reloaded.last_run().is_none());
    }
}
