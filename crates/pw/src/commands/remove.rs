//! Remove command implementation

use anyhow::Result;
use clap::Args;
use parcel_watch_core::courier::CourierRegistry;
use parcel_watch_core::registry::RemoveOutcome;
use parcel_watch_core::runner;
use std::path::PathBuf;

/// Stop tracking a shipment
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Tracking number
    number: String,

    /// Override store file location
    #[arg(long)]
    store: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Execute the remove command
pub fn execute(args: RemoveArgs) -> Result<()> {
    let (_config, store_path) = super::resolve(args.store, args.config)?;
    let couriers = CourierRegistry::with_defaults()?;

    let (report, _saved) =
        runner::apply_registry(&store_path, &couriers, None, Some(&args.number))?;

    match report.removed {
        Some(RemoveOutcome::Removed) => println!("Stopped tracking {}", args.number),
        // Reported, not an error: removing an untracked number is harmless
        Some(RemoveOutcome::NotTracked) => println!("{} was not tracked", args.number),
        None => {}
    }

    Ok(())
}
