//! Simulation context and daily cycle

pub mod state;
pub mod tick;

pub use state::SimState;
pub use tick::{run_daily_cycle, CycleReport, Phase, PhaseTiming};
