//! Demographics simulation runner
//!
//! Generates a seeded world, runs the daily demographics cycle for a number of
//! days and prints a summary.
//!
//! Usage:
//!   cargo run --release --bin demographics_sim -- --days 365 --json

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use pop_demographics::core::{CycleConfig, Defines, Result};
use pop_demographics::simulation::{run_daily_cycle, Phase, SimState};
use pop_demographics::world::{generate_world, GenerationConfig, World};

#[derive(Parser, Debug)]
#[command(name = "demographics_sim")]
#[command(about = "Run the daily demographics cycle over a generated world")]
struct Args {
    /// Random seed for world generation
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Number of days to simulate
    #[arg(long, default_value_t = 30)]
    days: u32,

    #[arg(long, default_value_t = 200)]
    provinces: u32,

    #[arg(long, default_value_t = 12)]
    nations: u32,

    /// Pops generated per land province
    #[arg(long, default_value_t = 12)]
    pops_per_province: u32,

    /// Worker divisions per updater (0 = one per rayon thread)
    #[arg(long, default_value_t = 0)]
    divisions: u32,

    /// Pop count at which updaters switch to the thread pool
    #[arg(long, default_value_t = 1000)]
    parallel_threshold: usize,

    /// TOML file overriding game-rule defines
    #[arg(long)]
    defines: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PhaseSummary {
    phase: Phase,
    total_ms: f64,
}

/// JSON output structure
#[derive(Serialize)]
struct DemographicsSummary {
    seed: u64,
    days: u32,
    divisions: u32,
    pops_start: usize,
    pops_end: usize,
    pops_removed: usize,
    population_start: f64,
    population_end: f64,
    mean_militancy: f32,
    mean_consciousness: f32,
    mean_literacy: f32,
    /// Nations whose dominant ideology is each ideology, by ideology index
    dominant_ideology_nations: Vec<usize>,
    phases: Vec<PhaseSummary>,
    total_ms: f64,
}

/// Size-weighted mean of a pop column
fn weighted_mean(world: &World, column: &[f32]) -> f32 {
    let total: f64 = world.population();
    if total <= 0.0 {
        return 0.0;
    }
    let sum: f64 = column
        .iter()
        .zip(&world.pops.sizes)
        .map(|(&v, &s)| v as f64 * s as f64)
        .sum();
    (sum / total) as f32
}

fn ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pop_demographics=info".into()),
        )
        .init();

    let args = Args::parse();

    let defines = match &args.defines {
        Some(path) => Defines::load(path)?,
        None => Defines::default(),
    };
    let generation = GenerationConfig {
        seed: args.seed,
        land_provinces: args.provinces,
        nations: args.nations,
        pops_per_province: args.pops_per_province,
        ..Default::default()
    };
    let cycle = CycleConfig {
        divisions: args.divisions,
        parallel_threshold: args.parallel_threshold,
    };

    let (world, triggers) = generate_world(&generation)?;
    let pops_start = world.pops.count();
    let population_start = world.population();
    tracing::info!(
        seed = args.seed,
        pops = pops_start,
        provinces = world.provinces.count(),
        nations = world.nations.count(),
        "starting demographics simulation"
    );

    let mut state = SimState::new(world, Arc::new(triggers))
        .with_defines(defines)
        .with_cycle(cycle);

    let mut pops_removed = 0;
    let mut divisions = 0;
    let mut phases: Vec<PhaseSummary> = Vec::new();
    for _ in 0..args.days {
        let report = run_daily_cycle(&mut state);
        pops_removed += report.pops_removed;
        divisions = report.divisions;
        for timing in &report.phases {
            match phases.iter_mut().find(|p| p.phase == timing.phase) {
                Some(summary) => summary.total_ms += ms(timing.elapsed),
                None => phases.push(PhaseSummary {
                    phase: timing.phase,
                    total_ms: ms(timing.elapsed),
                }),
            }
        }
        if report.day % 30 == 0 {
            tracing::info!(
                day = report.day,
                pops = state.world.pops.count(),
                population = report.population,
                "day complete"
            );
        }
    }

    let world = &state.world;
    let mut dominant_ideology_nations = vec![0; world.scenario.ideologies.len()];
    for ideology in world.nations.dominant.ideology.iter().flatten() {
        dominant_ideology_nations[ideology.index()] += 1;
    }

    let summary = DemographicsSummary {
        seed: args.seed,
        days: args.days,
        divisions,
        pops_start,
        pops_end: world.pops.count(),
        pops_removed,
        population_start,
        population_end: world.population(),
        mean_militancy: weighted_mean(world, &world.pops.militancy),
        mean_consciousness: weighted_mean(world, &world.pops.consciousness),
        mean_literacy: weighted_mean(world, &world.pops.literacy),
        dominant_ideology_nations,
        total_ms: phases.iter().map(|p| p.total_ms).sum(),
        phases,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== Demographics after {} days ===", summary.days);
        println!(
            "Pops: {} -> {} ({} removed)",
            summary.pops_start, summary.pops_end, summary.pops_removed
        );
        println!(
            "Population: {:.0} -> {:.0}",
            summary.population_start, summary.population_end
        );
        println!(
            "Mean militancy {:.3}, consciousness {:.3}, literacy {:.3}",
            summary.mean_militancy, summary.mean_consciousness, summary.mean_literacy
        );
        for phase in &summary.phases {
            println!("  {:?}: {:.2} ms", phase.phase, phase.total_ms);
        }
        println!("Total: {:.2} ms over {} divisions", summary.total_ms, summary.divisions);
    }

    Ok(())
}
