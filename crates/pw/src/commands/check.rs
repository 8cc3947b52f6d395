//! Check command implementation

use anyhow::Result;
use clap::Args;
use parcel_watch_core::courier::CourierRegistry;
use parcel_watch_core::engine::{ItemOutcome, ItemReport, PassOptions};
use parcel_watch_core::notify::TelegramNotifier;
use parcel_watch_core::registry::{AddCommand, AddOutcome, RemoveOutcome};
use parcel_watch_core::runner;
use std::path::PathBuf;

/// Run one poll pass over all tracked shipments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Start tracking this number before the pass
    #[arg(long, value_name = "NUMBER")]
    add: Option<String>,

    /// Courier for --add (inferred from the number shape when omitted)
    #[arg(long, requires = "add")]
    courier: Option<String>,

    /// Stop tracking this number before the pass
    #[arg(long, value_name = "NUMBER")]
    remove: Option<String>,

    /// Re-send current statuses even when unchanged
    #[arg(long)]
    force: bool,

    /// Output the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Override store file location
    #[arg(long)]
    store: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let (config, store_path) = super::resolve(args.store, args.config)?;

    let Some((bot_token, chat_id)) = config.telegram.credentials() else {
        anyhow::bail!(
            "Telegram transport not configured: set [telegram] bot_token and chat_id \
             in config.toml, or PW_TELEGRAM_BOT_TOKEN / PW_TELEGRAM_CHAT_ID"
        );
    };

    let couriers = CourierRegistry::with_defaults()?;
    let notifier = TelegramNotifier::new(bot_token, chat_id)?;

    let add = args.add.map(|number| AddCommand::new(number, args.courier));
    let options = PassOptions { force: args.force };

    let outcome = runner::run(
        &store_path,
        &couriers,
        &notifier,
        add.as_ref(),
        args.remove.as_deref(),
        &options,
    )?;

    if args.json {
        let value = serde_json::json!({
            "items": outcome.summary.items,
            "notified": outcome.summary.notified(),
            "unchanged": outcome.summary.unchanged(),
            "failed": outcome.summary.failed(),
            "saved": outcome.saved,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if let Some(added) = &outcome.registry.added {
        match added {
            AddOutcome::Inserted { courier } => println!("Now tracking via {courier}"),
            AddOutcome::AlreadyTracked => println!("Already tracked, status kept"),
            AddOutcome::CourierUpdated { from, to } => println!("Courier updated: {from} -> {to}"),
        }
    }
    if let Some(removed) = &outcome.registry.removed {
        match removed {
            RemoveOutcome::Removed => println!("Stopped tracking"),
            RemoveOutcome::NotTracked => println!("Remove target was not tracked"),
        }
    }

    for report in &outcome.summary.items {
        println!("{}", render_item(report));
    }
    println!(
        "{} notified, {} unchanged, {} failed",
        outcome.summary.notified(),
        outcome.summary.unchanged(),
        outcome.summary.failed()
    );

    // Per-item failures are reported above, never an exit code: only
    // whole-run faults (store I/O, invalid courier) bubble up as errors.
    Ok(())
}

fn render_item(report: &ItemReport) -> String {
    match &report.outcome {
        ItemOutcome::Notified { status } => {
            format!("{}: {} (notified)", report.number, status)
        }
        ItemOutcome::Unchanged { status } => {
            format!("{}: {} (unchanged)", report.number, status)
        }
        ItemOutcome::LookupFailed { reason } => {
            format!("{}: lookup failed: {}", report.number, reason)
        }
        ItemOutcome::UnsupportedCourier { courier } => {
            format!("{}: no backend for courier '{}'", report.number, courier)
        }
        ItemOutcome::NotifyFailed { status, reason } => {
            format!(
                "{}: {} (delivery failed: {})",
                report.number, status, reason
            )
        }
    }
}
