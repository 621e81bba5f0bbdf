//! Drivers for per-pop scalar update rules
//!
//! A column rule maps a pop's current value of one column to its new value.
//! Rules run in two steps: `stage` writes the new values into a staging buffer
//! while the world stays untouched, `commit` copies them into the world. A rule
//! staged before another rule commits only sees prior-day values.

use rayon::prelude::*;

use crate::demographics::staggered::{execute_staggered_blocks, staggered_partition};
use crate::world::{PopColumn, World};

pub trait ColumnRule: Sync {
    const COLUMN: PopColumn;

    fn apply(&self, world: &World, pop: usize, old: f32) -> f32;
}

/// Stage `rule` for the pops of worker `offset` out of `divisions`
///
/// `staged` must hold at least one value per pop.
pub fn stage_staggered<R: ColumnRule>(world: &World, rule: &R, staged: &mut [f32], offset: u32, divisions: u32) {
    let column = world.pops.column(R::COLUMN);
    execute_staggered_blocks(offset, divisions, column.len(), |range| {
        for pop in range {
            staged[pop] = rule.apply(world, pop, column[pop]);
        }
    });
}

/// Stage `rule` for every pop, one rayon task per worker offset
pub fn stage_parallel<R: ColumnRule>(world: &World, rule: &R, staged: &mut [f32], divisions: u32) {
    let column = world.pops.column(R::COLUMN);
    staggered_partition(&mut staged[..column.len()], 1, divisions)
        .into_par_iter()
        .for_each(|blocks| {
            for (first, values) in blocks {
                for (i, value) in values.iter_mut().enumerate() {
                    *value = rule.apply(world, first + i, column[first + i]);
                }
            }
        });
}

/// Stage every offset, on the thread pool when `parallel` is set
pub fn stage_all<R: ColumnRule>(world: &World, rule: &R, staged: &mut [f32], divisions: u32, parallel: bool) {
    if parallel {
        stage_parallel(world, rule, staged, divisions);
    } else {
        for offset in 0..divisions {
            stage_staggered(world, rule, staged, offset, divisions);
        }
    }
}

/// Copy the staged values of worker `offset` into the world column
pub fn commit_staggered(world: &mut World, column: PopColumn, staged: &[f32], offset: u32, divisions: u32) {
    let values = world.pops.column_mut(column);
    let max = values.len();
    execute_staggered_blocks(offset, divisions, max, |range| {
        values[range.clone()].copy_from_slice(&staged[range]);
    });
}

/// Copy every staged value into the world column
pub fn commit(world: &mut World, column: PopColumn, staged: &[f32]) {
    let values = world.pops.column_mut(column);
    let max = values.len();
    values.copy_from_slice(&staged[..max]);
}

/// Stage and commit `rule` for the pops of worker `offset`
pub fn apply_staggered<R: ColumnRule>(
    world: &mut World,
    rule: &R,
    staged: &mut [f32],
    offset: u32,
    divisions: u32,
) {
    stage_staggered(world, rule, staged, offset, divisions);
    commit_staggered(world, R::COLUMN, staged, offset, divisions);
}

/// Stage and commit `rule` for every pop
pub fn apply_parallel<R: ColumnRule>(world: &mut World, rule: &R, staged: &mut [f32], divisions: u32) {
    stage_parallel(world, rule, staged, divisions);
    commit(world, R::COLUMN, staged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CultureId, PopTypeId, ReligionId, Strata};
    use crate::world::{PopSpawn, PopType, Scenario};

    /// Adds the pop's literacy to its militancy
    struct AddLiteracy;

    impl ColumnRule for AddLiteracy {
        const COLUMN: PopColumn = PopColumn::Militancy;

        fn apply(&self, world: &World, pop: usize, old: f32) -> f32 {
            old + world.pops.literacy[pop]
        }
    }

    fn world(pops: usize) -> World {
        let mut scenario = Scenario::new();
        scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        scenario.add_culture("north");
        scenario.add_religion("sun");
        let mut world = World::new(scenario);
        let province = world.add_land_province(30.0).unwrap();
        for i in 0..pops {
            let mut spawn = PopSpawn::new(province, PopTypeId(0), CultureId(0), ReligionId(0), 10.0);
            spawn.literacy = i as f32;
            world.add_pop(spawn).unwrap();
        }
        world
    }

    #[test]
    fn test_all_offsets_apply_rule_once() {
        let mut world = world(70);
        let mut staged = vec![0.0; 70];
        for offset in 0..3 {
            apply_staggered(&mut world, &AddLiteracy, &mut staged, offset, 3);
        }
        let expected: Vec<f32> = (0..70).map(|i| i as f32).collect();
        assert_eq!(world.pops.militancy, expected);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = world(100);
        let mut parallel = sequential.clone();

        let mut staged = vec![0.0; 100];
        for offset in 0..4 {
            apply_staggered(&mut sequential, &AddLiteracy, &mut staged, offset, 4);
        }
        apply_parallel(&mut parallel, &AddLiteracy, &mut vec![0.0; 100], 4);

        assert_eq!(sequential.pops.militancy, parallel.pops.militancy);
    }

    #[test]
    fn test_single_offset_touches_only_its_blocks() {
        let mut world = world(40);
        apply_staggered(&mut world, &AddLiteracy, &mut vec![0.0; 40], 1, 2);

        assert_eq!(world.pops.militancy[15], 0.0);
        assert_eq!(world.pops.militancy[16], 16.0);
        assert_eq!(world.pops.militancy[32], 0.0);
    }

    #[test]
    fn test_stage_leaves_world_untouched_until_commit() {
        let mut world = world(20);
        let mut staged = vec![0.0; 20];

        stage_all(&world, &AddLiteracy, &mut staged, 2, false);
        assert!(world.pops.militancy.iter().all(|&m| m == 0.0));
        assert_eq!(staged[19], 19.0);

        commit(&mut world, PopColumn::Militancy, &staged);
        assert_eq!(world.pops.militancy[19], 19.0);
    }
}
