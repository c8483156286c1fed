#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Bastion Defence simulation headlessly.
//!
//! The binary wires the authoritative world, the flow and spawning systems,
//! and a scripted pilot into the fixed-step tick driver, then reports how the
//! defence went. An optional ASCII backend visualises frames, and fortress
//! layouts can be exported as single-line transfer strings.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod config;
mod driver;
mod layout_transfer;
mod pilot;
mod scene;
mod text_backend;
mod ui;

use config::RunConfig;
use driver::Driver;
use layout_transfer::FortressLayoutSnapshot;

/// Headless island fortress defence simulation.
#[derive(Debug, Parser)]
#[command(name = "bastion-defence")]
struct Args {
    /// Seed for the deterministic simulation streams.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop once this many waves have been survived.
    #[arg(long)]
    waves: Option<u32>,

    /// Hard tick limit for the run.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Print an ASCII frame every N ticks.
    #[arg(long)]
    render_every: Option<u64>,

    /// Optional TOML file with run settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final fortress layout as a transfer string.
    #[arg(long)]
    export_layout: bool,

    /// Decode a layout transfer string and print its summary, then exit.
    #[arg(long)]
    inspect_layout: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(encoded) = &args.inspect_layout {
        let snapshot = FortressLayoutSnapshot::decode(encoded)?;
        println!(
            "layout: {}x{} grid, {} wall tiles, {} turrets",
            snapshot.columns,
            snapshot.rows,
            snapshot.walls.len(),
            snapshot.turrets.len(),
        );
        return Ok(());
    }

    let config = RunConfig::resolve(&args)?;
    println!(
        "bastion-defence: seed {} / target {} waves",
        config.seed, config.waves
    );

    let mut driver = Driver::new(&config);
    let outcome = driver.run(&config)?;

    if args.export_layout {
        println!("{}", driver.layout_snapshot().encode());
    }

    match outcome.defeat {
        Some(message) => println!(
            "defeated on wave {} after {} ticks: {message}",
            outcome.wave_reached, outcome.ticks
        ),
        None => println!(
            "survived {} waves in {} ticks",
            outcome.wave_reached, outcome.ticks
        ),
    }

    Ok(())
}
