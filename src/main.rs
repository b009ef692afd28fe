//! Platformer - headless demo
//!
//! Runs a level for a fixed number of ticks and logs where everything ends
//! up. Without a level path the built-in test arena is used. Set `RUST_LOG`
//! to `debug` to watch carrying links form and break.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use platformer_game::{Level, Simulation, SimulationConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level file (TOML). Defaults to the built-in test arena.
    level: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(default_value_t = 600)]
    ticks: u64,

    /// Simulation ticks per second
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let level = match &args.level {
        Some(path) => {
            Level::load(path).with_context(|| format!("loading level {}", path.display()))?
        }
        None => Level::test_arena(),
    };
    let ticks = args.ticks;

    let config = SimulationConfig {
        tick_rate: args.tick_rate,
    };
    let tick_rate = u64::from(config.tick_rate.max(1));
    let mut simulation = Simulation::new(config, &level)?;

    log::info!("running '{}' for {ticks} ticks", simulation.name);

    for _ in 0..ticks {
        simulation.step()?;

        if simulation.frame % tick_rate == 0 {
            report(&simulation);
        }
    }

    summarize(&simulation);
    Ok(())
}

/// Once-per-second snapshot.
fn report(simulation: &Simulation) {
    let seconds = simulation.frame / u64::from(simulation.config.tick_rate.max(1));
    for actor in simulation.actors() {
        let Some(position) = simulation.position(actor.controller) else {
            continue;
        };
        let parent = simulation.controllers.parent_of(actor.controller);
        log::info!(
            "[{seconds:>3}s] {:<8} at ({:>7.3}, {:>7.3}) riding {parent:?}",
            actor.name,
            position.x,
            position.y
        );
    }
}

fn summarize(simulation: &Simulation) {
    println!("{} after {} ticks", simulation.name, simulation.frame);

    for mover in simulation.movers() {
        if let Some(position) = simulation.position(mover.controller) {
            println!(
                "  platform {:<8} ({:.3}, {:.3}) -> waypoint #{}",
                mover.name,
                position.x,
                position.y,
                mover.path.target_index()
            );
        }
    }

    for actor in simulation.actors() {
        let Some(position) = simulation.position(actor.controller) else {
            continue;
        };
        let stats = actor.stats();
        println!(
            "  actor    {:<8} ({:.3}, {:.3}) landings={} ceilings={} walls={} {}",
            actor.name,
            position.x,
            position.y,
            stats.landings,
            stats.ceiling_hits,
            stats.wall_hits,
            if stats.airborne { "airborne" } else { "grounded" }
        );
    }
}
