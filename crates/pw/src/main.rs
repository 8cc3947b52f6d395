//! pw - shipment tracking change notifier
//!
//! A thin CLI over the parcel-watch core: poll couriers for every tracked
//! number, notify once per status change, and manage the tracked list.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    parcel_watch_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
