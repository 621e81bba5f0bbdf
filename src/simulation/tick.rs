//! Tick system - orchestrates the daily demographics cycle
//!
//! culture flags -> aggregation + dominant categories -> stage militancy,
//! consciousness, literacy, ideologies, issues and growth -> commit -> eviction
//!
//! Every rule is staged against the world as it stood after aggregation and
//! writes only scratch buffers, so no rule sees another rule's output of the
//! same day. All staged values are committed together before eviction. The
//! staging phases run on the rayon pool once the pop count reaches
//! `CycleConfig::parallel_threshold`, otherwise their offsets run in order.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::types::Day;
use crate::demographics::attraction;
use crate::demographics::batch::{self, ColumnRule};
use crate::demographics::consciousness::ConsciousnessRule;
use crate::demographics::growth::GrowthRule;
use crate::demographics::ideology::IdeologyRule;
use crate::demographics::issues::IssueRule;
use crate::demographics::literacy::LiteracyRule;
use crate::demographics::militancy::MilitancyRule;
use crate::demographics::scratch::{DemographicsScratch, StagedColumns};
use crate::demographics::{lifecycle, regenerate_from_pop_data, regenerate_is_primary_or_accepted};
use crate::simulation::SimState;
use crate::world::{PopColumn, World};

/// Phases of the daily cycle in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Culture,
    Aggregation,
    Militancy,
    Consciousness,
    Literacy,
    Ideologies,
    Issues,
    Growth,
    Commit,
    Eviction,
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub elapsed: Duration,
}

/// Result of one simulated day
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Day that was simulated
    pub day: Day,
    pub divisions: u32,
    pub parallel: bool,
    pub pops_removed: usize,
    /// Total pop size after eviction
    pub population: f64,
    pub phases: Vec<PhaseTiming>,
}

impl CycleReport {
    pub fn elapsed(&self) -> Duration {
        self.phases.iter().map(|p| p.elapsed).sum()
    }

    pub fn phase(&self, phase: Phase) -> Option<Duration> {
        self.phases.iter().find(|p| p.phase == phase).map(|p| p.elapsed)
    }
}

struct PhaseClock {
    phases: Vec<PhaseTiming>,
}

impl PhaseClock {
    fn time<R>(&mut self, phase: Phase, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        tracing::trace!(?phase, elapsed_us = elapsed.as_micros() as u64, "phase complete");
        self.phases.push(PhaseTiming { phase, elapsed });
        result
    }
}

/// Which way the staging phases spread over workers
#[derive(Clone, Copy)]
struct Dispatch {
    divisions: u32,
    parallel: bool,
}

fn stage_column<R: ColumnRule>(
    clock: &mut PhaseClock,
    phase: Phase,
    world: &World,
    rule: &R,
    staged: &mut StagedColumns,
    dispatch: Dispatch,
) {
    clock.time(phase, || {
        batch::stage_all(world, rule, staged.column_mut(R::COLUMN), dispatch.divisions, dispatch.parallel)
    });
}

/// Stage every batched rule against the post-aggregation world
fn stage_rules(state: &mut SimState, clock: &mut PhaseClock, dispatch: Dispatch) {
    let SimState {
        world,
        defines,
        triggers,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let world: &World = world;
    let Dispatch { divisions, parallel } = dispatch;

    stage_column(clock, Phase::Militancy, world, &MilitancyRule::new(world, defines), &mut scratch.staged, dispatch);
    stage_column(
        clock,
        Phase::Consciousness,
        world,
        &ConsciousnessRule::new(world, defines),
        &mut scratch.staged,
        dispatch,
    );
    stage_column(clock, Phase::Literacy, world, &LiteracyRule::new(world, defines), &mut scratch.staged, dispatch);

    let rule = IdeologyRule::new(world, &**triggers);
    clock.time(Phase::Ideologies, || {
        attraction::stage_all(world, &mut scratch.ideologies, &rule, divisions, parallel)
    });
    let rule = IssueRule::new(world, &**triggers);
    clock.time(Phase::Issues, || {
        attraction::stage_all(world, &mut scratch.issues, &rule, divisions, parallel)
    });

    stage_column(clock, Phase::Growth, world, &GrowthRule::new(world, defines), &mut scratch.staged, dispatch);
}

/// Write every staged value into the world
fn commit_rules(world: &mut World, scratch: &DemographicsScratch, dispatch: Dispatch) {
    for column in PopColumn::ALL {
        batch::commit(world, column, scratch.staged.column(column));
    }
    attraction::commit_all(world, &scratch.ideologies, dispatch.divisions, dispatch.parallel);
    attraction::commit_all(world, &scratch.issues, dispatch.divisions, dispatch.parallel);
}

/// Advance the demographics by one day
pub fn run_daily_cycle(state: &mut SimState) -> CycleReport {
    let dispatch = Dispatch {
        divisions: state.cycle.effective_divisions(),
        parallel: state.world.pops.count() >= state.cycle.parallel_threshold,
    };
    let mut clock = PhaseClock { phases: Vec::with_capacity(10) };

    clock.time(Phase::Culture, || regenerate_is_primary_or_accepted(&mut state.world));
    clock.time(Phase::Aggregation, || {
        regenerate_from_pop_data(&mut state.world, &mut state.scratch)
    });

    stage_rules(state, &mut clock, dispatch);
    clock.time(Phase::Commit, || commit_rules(&mut state.world, &state.scratch, dispatch));

    let pops_removed = clock.time(Phase::Eviction, || {
        lifecycle::remove_size_zero_pops(&mut state.world)
    });

    let report = CycleReport {
        day: state.day,
        divisions: dispatch.divisions,
        parallel: dispatch.parallel,
        pops_removed,
        population: state.world.population(),
        phases: clock.phases,
    };
    state.day += 1;

    tracing::debug!(
        day = report.day,
        pops = state.world.pops.count(),
        pops_removed,
        parallel = report.parallel,
        elapsed_ms = report.elapsed().as_millis() as u64,
        "daily demographics cycle complete"
    );
    report
}
