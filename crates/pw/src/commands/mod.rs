//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};
use parcel_watch_core::config::{Config, ConfigOverrides, resolve_config};
use parcel_watch_core::home::get_home_dir;
use std::path::PathBuf;

mod add;
mod check;
mod list;
mod remove;

/// pw - shipment tracking change notifier
#[derive(Parser, Debug)]
#[command(
    name = "pw",
    version,
    about = "Shipment tracking change notifier",
    long_about = "Polls courier backends for every tracked shipment and sends a notification once per status change"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one poll pass over all tracked shipments
    Check(check::CheckArgs),

    /// Start tracking a shipment
    Add(add::AddArgs),

    /// Stop tracking a shipment
    Remove(remove::RemoveArgs),

    /// List tracked shipments
    List(list::ListArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Check(args) => check::execute(args),
            Commands::Add(args) => add::execute(args),
            Commands::Remove(args) => remove::execute(args),
            Commands::List(args) => list::execute(args),
        }
    }
}

/// Resolve configuration and the effective store path for one command
fn resolve(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let home_dir = get_home_dir()?;
    let overrides = ConfigOverrides {
        store_path: store,
        config_path: config,
    };
    let config = resolve_config(&overrides, &home_dir)?;
    let store_path = config.store.resolved_path(&home_dir);
    Ok((config, store_path))
}
