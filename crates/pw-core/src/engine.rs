//! Diff & notify pass
//!
//! One pass walks every tracked item in store order, asks the matching
//! courier backend for a fresh observation, compares it to the last known
//! status, and notifies on change. The guarantee this module carries:
//! at most one notification per item per status value, independent of what
//! happens to other items in the same pass.
//!
//! Failure policy, per item:
//! - unsupported courier: recorded, item skipped, pass continues
//! - lookup failure: recorded, stored state untouched, no notification
//! - delivery failure: recorded, but the status still counts as observed,
//!   so a transport outage cannot storm the recipient on later passes

use crate::courier::CourierRegistry;
use crate::notify::{Notifier, format_status_message};
use crate::store::StatusStore;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Options for one pass
#[derive(Debug, Clone, Copy, Default)]
pub struct PassOptions {
    /// Re-send the current status of every successfully polled item even
    /// when unchanged. Change accounting in the summary is unaffected.
    pub force: bool,
}

/// What happened to one item during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Status changed (or was observed for the first time) and the
    /// notification went out
    Notified { status: String },

    /// Fresh poll matched the stored status; checkpoint refreshed silently
    Unchanged { status: String },

    /// Backend lookup failed; stored state untouched
    LookupFailed { reason: String },

    /// No backend registered for the item's courier
    UnsupportedCourier { courier: String },

    /// Status changed but delivery failed; the new status is still
    /// recorded as observed
    NotifyFailed { status: String, reason: String },
}

/// Per-item record in the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub number: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Aggregated outcomes of one pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub items: Vec<ItemReport>,
}

impl RunSummary {
    fn record(&mut self, number: &str, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            number: number.to_string(),
            outcome,
        });
    }

    /// Items whose change notification went out
    pub fn notified(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Notified { .. }))
    }

    /// Items polled successfully with no status change
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Unchanged { .. }))
    }

    /// Items that failed lookup, courier resolution, or delivery
    pub fn failed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                ItemOutcome::LookupFailed { .. }
                    | ItemOutcome::UnsupportedCourier { .. }
                    | ItemOutcome::NotifyFailed { .. }
            )
        })
    }

    fn count(&self, predicate: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Run one diff & notify pass over every tracked item
///
/// Items are processed sequentially in store order. Each item's
/// compare-and-update is self-contained; no per-item failure aborts the
/// pass, and the caller persists the store once afterwards.
pub fn run_pass(
    store: &mut StatusStore,
    couriers: &CourierRegistry,
    notifier: &dyn Notifier,
    options: &PassOptions,
) -> RunSummary {
    let mut summary = RunSummary::default();

    let items: Vec<_> = store.list_all().to_vec();
    for mut item in items {
        let number = item.number.clone();

        let Some(backend) = couriers.backend(&item.courier) else {
            warn!("No backend for courier '{}' (item {number})", item.courier);
            summary.record(
                &number,
                ItemOutcome::UnsupportedCourier {
                    courier: item.courier.clone(),
                },
            );
            continue;
        };

        let observation = match backend.resolve(&number) {
            Ok(observation) => observation,
            Err(e) => {
                warn!("Lookup failed for {number}: {e}");
                summary.record(
                    &number,
                    ItemOutcome::LookupFailed {
                        reason: e.to_string(),
                    },
                );
                continue;
            }
        };

        // Checkpoint text is display-only; status equality is the whole
        // change-detection contract.
        let changed = item.last_status.as_deref() != Some(observation.status.as_str());

        let outcome = if changed || options.force {
            let message = format_status_message(
                &number,
                &item.courier,
                &observation.status,
                &observation.checkpoint,
            );
            match notifier.notify(&message) {
                Ok(()) if changed => {
                    info!("Notified {number}: {}", observation.status);
                    ItemOutcome::Notified {
                        status: observation.status.clone(),
                    }
                }
                Ok(()) => {
                    debug!("Force-reported {number}: {}", observation.status);
                    ItemOutcome::Unchanged {
                        status: observation.status.clone(),
                    }
                }
                Err(e) if changed => {
                    warn!("Delivery failed for {number}: {e}");
                    ItemOutcome::NotifyFailed {
                        status: observation.status.clone(),
                        reason: e.to_string(),
                    }
                }
                Err(e) => {
                    warn!("Forced delivery failed for {number}: {e}");
                    ItemOutcome::Unchanged {
                        status: observation.status.clone(),
                    }
                }
            }
        } else {
            debug!("{number} unchanged: {}", observation.status);
            ItemOutcome::Unchanged {
                status: observation.status.clone(),
            }
        };

        // The fresh observation is recorded whether or not delivery
        // succeeded; the status has been observed either way.
        item.last_status = Some(observation.status);
        item.last_checkpoint = if observation.checkpoint.is_empty() {
            None
        } else {
            Some(observation.checkpoint)
        };
        store.upsert(item);

        summary.record(&number, outcome);
    }

    summary
}
