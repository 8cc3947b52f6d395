//! List command implementation

use anyhow::Result;
use clap::Args;
use parcel_watch_core::store::StatusStore;
use std::path::PathBuf;

/// List tracked shipments
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Override store file location
    #[arg(long)]
    store: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Execute the list command
pub fn execute(args: ListArgs) -> Result<()> {
    let (_config, store_path) = super::resolve(args.store, args.config)?;

    // Read-only view; no lock needed
    let store = StatusStore::load(&store_path);

    if args.json {
        println!("{}", serde_json::to_string_pretty(store.list_all())?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No shipments tracked. Add one with: pw add <NUMBER>");
        return Ok(());
    }

    for (index, item) in store.list_all().iter().enumerate() {
        let status = item.last_status.as_deref().unwrap_or("New");
        println!(
            "{}. ({}) {}: {}",
            index + 1,
            item.courier,
            item.number,
            status
        );
        if let Some(checkpoint) = &item.last_checkpoint {
            println!("   {checkpoint}");
        }
    }
    if let Some(last_run) = store.last_run() {
        println!("Last updated: {last_run}");
    }

    Ok(())
}
