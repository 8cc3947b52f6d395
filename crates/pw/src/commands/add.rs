//! Add command implementation

use anyhow::Result;
use clap::Args;
use parcel_watch_core::courier::CourierRegistry;
use parcel_watch_core::registry::{AddCommand, AddOutcome};
use parcel_watch_core::runner;
use std::path::PathBuf;

/// Start tracking a shipment
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Tracking number
    number: String,

    /// Courier (inferred from the number shape when omitted)
    #[arg(long)]
    courier: Option<String>,

    /// Override store file location
    #[arg(long)]
    store: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Execute the add command
pub fn execute(args: AddArgs) -> Result<()> {
    let (_config, store_path) = super::resolve(args.store, args.config)?;
    let couriers = CourierRegistry::with_defaults()?;

    let add = AddCommand::new(args.number.clone(), args.courier);
    let (report, _saved) = runner::apply_registry(&store_path, &couriers, Some(&add), None)?;

    match report.added {
        Some(AddOutcome::Inserted { courier }) => {
            println!("Now tracking {} via {courier}", args.number);
            println!("It will be polled on the next check");
        }
        Some(AddOutcome::AlreadyTracked) => {
            println!("{} is already tracked; status kept", args.number);
        }
        Some(AddOutcome::CourierUpdated { from, to }) => {
            println!("{} courier updated: {from} -> {to}", args.number);
        }
        None => {}
    }

    Ok(())
}
