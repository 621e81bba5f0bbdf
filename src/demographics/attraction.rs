//! Drivers for attraction-and-renormalize rules
//!
//! Ideology and issue support follow the same two-phase scheme:
//! 1. stage: every participating category gets a non-negative amount per pop,
//!    summed into the pop's total, and a blend rate is recorded
//! 2. commit: `support = rate * amount / total + (1 - rate) * support` for
//!    participating categories of pops with a positive total
//!
//! Staging reads the whole world and writes only scratch buffers. Commit reads
//! only scratch buffers and writes the per-pop demographics rows.

use rayon::prelude::*;

use crate::demographics::scratch::AttractionBuffers;
use crate::demographics::staggered::{execute_staggered_blocks, staggered_partition};
use crate::world::World;

pub trait AttractionRule: Sync {
    /// Number of categories the rule spans
    fn count(&self) -> usize;

    /// Whether a category takes part in attraction and renormalization
    fn participates(&self, category: usize) -> bool;

    /// Offset of a category's support in the per-pop demographics row
    fn row_offset(&self, category: usize) -> usize;

    fn amount(&self, world: &World, pop: usize, category: usize) -> f32;

    fn rate(&self, world: &World, pop: usize) -> f32;
}

/// Stage one pop
#[inline]
fn attract<R: AttractionRule>(rule: &R, world: &World, pop: usize, amounts: &mut [f32]) -> (f32, f32) {
    let mut total = 0.0;
    for (category, amount) in amounts.iter_mut().enumerate() {
        *amount = if rule.participates(category) {
            rule.amount(world, pop, category)
        } else {
            0.0
        };
        total += *amount;
    }
    (total, rule.rate(world, pop))
}

/// Commit one pop
#[inline]
fn renormalize(targets: &[Option<usize>], amounts: &[f32], total: f32, rate: f32, row: &mut [f32]) {
    // A zero total leaves support untouched; never divide by it
    if total <= 0.0 {
        return;
    }
    for (&target, &amount) in targets.iter().zip(amounts) {
        if let Some(offset) = target {
            let slot = &mut row[offset];
            *slot = rate * (amount / total) + (1.0 - rate) * *slot;
        }
    }
}

/// Record where each category of `rule` commits to
fn plan<R: AttractionRule>(buffers: &mut AttractionBuffers, rule: &R) {
    buffers.targets.clear();
    buffers
        .targets
        .extend((0..rule.count()).map(|c| rule.participates(c).then(|| rule.row_offset(c))));
}

/// Stage the pops of worker `offset` out of `divisions`
///
/// `buffers` must be sized for the current pop count with `rule.count()`
/// values per pop.
pub fn stage_staggered<R: AttractionRule>(
    world: &World,
    buffers: &mut AttractionBuffers,
    rule: &R,
    offset: u32,
    divisions: u32,
) {
    let count = rule.count();
    debug_assert_eq!(buffers.stride(), count);
    plan(buffers, rule);
    if count == 0 {
        return;
    }

    let AttractionBuffers {
        amounts,
        totals,
        rates,
        ..
    } = buffers;
    execute_staggered_blocks(offset, divisions, world.pops.count(), |range| {
        for pop in range {
            let (total, rate) = attract(rule, world, pop, &mut amounts[pop * count..(pop + 1) * count]);
            totals[pop] = total;
            rates[pop] = rate;
        }
    });
}

/// Stage every pop, one rayon task per worker offset
pub fn stage_parallel<R: AttractionRule>(world: &World, buffers: &mut AttractionBuffers, rule: &R, divisions: u32) {
    let count = rule.count();
    debug_assert_eq!(buffers.stride(), count);
    plan(buffers, rule);
    if count == 0 {
        return;
    }
    let pop_count = world.pops.count();

    let AttractionBuffers {
        amounts,
        totals,
        rates,
        ..
    } = buffers;
    staggered_partition(&mut amounts[..pop_count * count], count, divisions)
        .into_par_iter()
        .zip(staggered_partition(&mut totals[..pop_count], 1, divisions))
        .zip(staggered_partition(&mut rates[..pop_count], 1, divisions))
        .for_each(|((amount_blocks, total_blocks), rate_blocks)| {
            let blocks = amount_blocks.into_iter().zip(total_blocks).zip(rate_blocks);
            for (((first, amounts), (_, totals)), (_, rates)) in blocks {
                for (i, ((amounts, total), rate)) in amounts
                    .chunks_mut(count)
                    .zip(totals.iter_mut())
                    .zip(rates.iter_mut())
                    .enumerate()
                {
                    (*total, *rate) = attract(rule, world, first + i, amounts);
                }
            }
        });
}

/// Stage every offset, on the thread pool when `parallel` is set
pub fn stage_all<R: AttractionRule>(
    world: &World,
    buffers: &mut AttractionBuffers,
    rule: &R,
    divisions: u32,
    parallel: bool,
) {
    if parallel {
        stage_parallel(world, buffers, rule, divisions);
    } else {
        for offset in 0..divisions {
            stage_staggered(world, buffers, rule, offset, divisions);
        }
    }
}

/// Commit the staged pops of worker `offset`
pub fn commit_staggered(world: &mut World, buffers: &AttractionBuffers, offset: u32, divisions: u32) {
    let count = buffers.targets.len();
    if count == 0 {
        return;
    }
    let pop_count = world.pops.count();
    let stride = world.pops.stride();
    let rows = &mut world.pops.demographics;
    execute_staggered_blocks(offset, divisions, pop_count, |range| {
        for pop in range {
            renormalize(
                &buffers.targets,
                &buffers.amounts[pop * count..(pop + 1) * count],
                buffers.totals[pop],
                buffers.rates[pop],
                &mut rows[pop * stride..(pop + 1) * stride],
            );
        }
    });
}

/// Commit every staged pop, one rayon task per worker offset
pub fn commit_parallel(world: &mut World, buffers: &AttractionBuffers, divisions: u32) {
    let count = buffers.targets.len();
    if count == 0 {
        return;
    }
    let pop_count = world.pops.count();
    let stride = world.pops.stride();
    let targets = &buffers.targets;
    let amounts = &buffers.amounts[..pop_count * count];
    let totals = &buffers.totals[..pop_count];
    let rates = &buffers.rates[..pop_count];

    staggered_partition(&mut world.pops.demographics, stride, divisions)
        .into_par_iter()
        .for_each(|row_blocks| {
            for (first, rows) in row_blocks {
                for (i, row) in rows.chunks_mut(stride).enumerate() {
                    let pop = first + i;
                    renormalize(
                        targets,
                        &amounts[pop * count..(pop + 1) * count],
                        totals[pop],
                        rates[pop],
                        row,
                    );
                }
            }
        });
}

/// Commit every offset, on the thread pool when `parallel` is set
pub fn commit_all(world: &mut World, buffers: &AttractionBuffers, divisions: u32, parallel: bool) {
    if parallel {
        commit_parallel(world, buffers, divisions);
    } else {
        for offset in 0..divisions {
            commit_staggered(world, buffers, offset, divisions);
        }
    }
}

/// Stage and commit the pops of worker `offset`
pub fn apply_staggered<R: AttractionRule>(
    world: &mut World,
    buffers: &mut AttractionBuffers,
    rule: &R,
    offset: u32,
    divisions: u32,
) {
    stage_staggered(world, buffers, rule, offset, divisions);
    commit_staggered(world, buffers, offset, divisions);
}

/// Stage and commit every pop
pub fn apply_parallel<R: AttractionRule>(
    world: &mut World,
    buffers: &mut AttractionBuffers,
    rule: &R,
    divisions: u32,
) {
    stage_parallel(world, buffers, rule, divisions);
    commit_parallel(world, buffers, divisions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CultureId, IdeologyId, PopTypeId, ReligionId, Strata};
    use crate::demographics::scratch::DemographicsScratch;
    use crate::world::{PopSpawn, PopType, Scenario};

    /// Fixed 70/30 attraction over two ideologies, third one sits out
    struct Split;

    impl AttractionRule for Split {
        fn count(&self) -> usize {
            3
        }

        fn participates(&self, category: usize) -> bool {
            category < 2
        }

        fn row_offset(&self, category: usize) -> usize {
            category
        }

        fn amount(&self, world: &World, pop: usize, category: usize) -> f32 {
            if world.pops.sizes[pop] < 0.0 {
                return 0.0;
            }
            [7.0, 3.0, 100.0][category]
        }

        fn rate(&self, _world: &World, _pop: usize) -> f32 {
            0.1
        }
    }

    fn world(pops: usize) -> (World, DemographicsScratch) {
        let mut scenario = Scenario::new();
        scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        scenario.add_culture("north");
        scenario.add_religion("sun");
        for name in ["a", "b", "c"] {
            scenario.add_ideology(name, false);
        }
        let mut world = World::new(scenario);
        let province = world.add_land_province(30.0).unwrap();
        for _ in 0..pops {
            world
                .add_pop(PopSpawn::new(province, PopTypeId(0), CultureId(0), ReligionId(0), 10.0))
                .unwrap();
        }
        let mut scratch = DemographicsScratch::new();
        scratch.ensure_capacity(&world);
        (world, scratch)
    }

    #[test]
    fn test_single_step_blends_towards_normalized_share() {
        let (mut world, mut scratch) = world(1);
        let c = world.keys().pop_ideology(IdeologyId(2));
        world.pops.set_fraction(crate::core::types::PopId(0), c, 0.5);

        apply_staggered(&mut world, &mut scratch.ideologies, &Split, 0, 1);

        let row = world.pops.row(crate::core::types::PopId(0));
        assert!((row[0] - 0.07).abs() < 1e-6);
        assert!((row[1] - 0.03).abs() < 1e-6);
        // non-participating category is left alone
        assert_eq!(row[2], 0.5);
    }

    #[test]
    fn test_zero_total_leaves_support_unchanged() {
        let (mut world, mut scratch) = world(1);
        world.pops.sizes[0] = -1.0;
        let a = world.keys().pop_ideology(IdeologyId(0));
        world.pops.set_fraction(crate::core::types::PopId(0), a, 0.4);

        apply_staggered(&mut world, &mut scratch.ideologies, &Split, 0, 1);

        assert_eq!(world.pops.row(crate::core::types::PopId(0))[0], 0.4);
        assert!(world.pops.demographics.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (mut sequential, mut seq_scratch) = world(50);
        let (mut parallel, mut par_scratch) = world(50);

        for offset in 0..3 {
            apply_staggered(&mut sequential, &mut seq_scratch.ideologies, &Split, offset, 3);
        }
        apply_parallel(&mut parallel, &mut par_scratch.ideologies, &Split, 3);

        assert_eq!(sequential.pops.demographics, parallel.pops.demographics);
    }
}
