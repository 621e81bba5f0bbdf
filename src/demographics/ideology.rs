//! Daily ideology support update
//!
//! Each pop type carries a multiplicative attraction trigger per ideology.
//! Support moves a fixed fraction of the way towards the normalized
//! attraction every day. Disabled ideologies neither attract nor change.

use crate::core::types::{IdeologyId, PopId};
use crate::demographics::attraction::{self, AttractionRule};
use crate::demographics::keys::Keyspace;
use crate::simulation::SimState;
use crate::trigger::{Scope, TriggerEvaluator};
use crate::world::World;

/// Daily blend rate towards the normalized attraction
pub const IDEOLOGY_CHANGE_RATE: f32 = 0.10;

pub struct IdeologyRule<'a> {
    triggers: &'a dyn TriggerEvaluator,
    keys: Keyspace,
    enabled: Vec<bool>,
}

impl<'a> IdeologyRule<'a> {
    pub fn new(world: &World, triggers: &'a dyn TriggerEvaluator) -> Self {
        let keys = *world.keys();
        let ideologies = &world.scenario.ideologies;
        Self {
            triggers,
            keys,
            enabled: keys
                .ideology_ids()
                .map(|i| ideologies.get(i.index()).is_some_and(|ideology| ideology.enabled))
                .collect(),
        }
    }
}

impl AttractionRule for IdeologyRule<'_> {
    fn count(&self) -> usize {
        self.enabled.len()
    }

    fn participates(&self, category: usize) -> bool {
        self.enabled[category]
    }

    fn row_offset(&self, category: usize) -> usize {
        self.keys.pop_ideology(IdeologyId::new(category)).index()
    }

    fn amount(&self, world: &World, pop: usize, category: usize) -> f32 {
        let id = PopId::new(pop);
        let ideology = IdeologyId::new(category);
        let owner = world.owner_of_pop(id);

        if world.scenario.ideology(ideology).civilized_only {
            let civilized = owner.is_some_and(|n| world.nations.is_civilized[n.index()]);
            if !civilized {
                return 0.0;
            }
        }

        let pop_type = world.scenario.pop_type(world.pops.pop_types[pop]);
        pop_type.ideology_trigger(ideology).map_or(0.0, |trigger| {
            self.triggers.evaluate_multiplicative_modifier(
                world,
                trigger,
                Scope::Pop(id),
                Scope::from(owner),
                Scope::None,
            )
        })
    }

    fn rate(&self, _world: &World, _pop: usize) -> f32 {
        IDEOLOGY_CHANGE_RATE
    }
}

/// Update ideology support of the pops assigned to worker `offset`
///
/// Offsets run one after another; see [`update_ideologies_parallel`].
pub fn update_ideologies(state: &mut SimState, offset: u32, divisions: u32) {
    let SimState {
        world,
        triggers,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = IdeologyRule::new(world, &**triggers);
    attraction::apply_staggered(world, &mut scratch.ideologies, &rule, offset, divisions);
}

pub fn update_ideologies_parallel(state: &mut SimState, divisions: u32) {
    let SimState {
        world,
        triggers,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = IdeologyRule::new(world, &**triggers);
    attraction::apply_parallel(world, &mut scratch.ideologies, &rule, divisions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::types::{CultureId, PopTypeId, ReligionId, Strata, TriggerId};
    use crate::trigger::TriggerTable;
    use crate::world::{PopSpawn, PopType, Scenario};

    /// Two ideologies attracting 7:3, a third civilized-only one attracting 5
    fn state(civilized: bool) -> SimState {
        let mut scenario = Scenario::new();
        let farmers = scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        scenario.add_culture("north");
        scenario.add_religion("sun");
        let a = scenario.add_ideology("traditional", false);
        let b = scenario.add_ideology("reformist", false);
        let c = scenario.add_ideology("modernist", true);
        scenario.set_ideology_attraction(farmers, a, Some(TriggerId(0))).unwrap();
        scenario.set_ideology_attraction(farmers, b, Some(TriggerId(1))).unwrap();
        scenario.set_ideology_attraction(farmers, c, Some(TriggerId(2))).unwrap();

        let mut world = World::new(scenario);
        let province = world.add_land_province(30.0).unwrap();
        let nation = world.add_nation(Some(CultureId(0)), civilized).unwrap();
        world.add_state(nation, &[province]).unwrap();
        world
            .add_pop(PopSpawn::new(province, PopTypeId(0), CultureId(0), ReligionId(0), 100.0))
            .unwrap();

        let mut triggers = TriggerTable::new();
        triggers.set(TriggerId(0), 7.0).set(TriggerId(1), 3.0).set(TriggerId(2), 5.0);
        SimState::new(world, Arc::new(triggers))
    }

    fn support(state: &SimState, ideology: u32) -> f32 {
        let key = state.world.keys().pop_ideology(IdeologyId(ideology));
        state.world.pop_fraction(PopId(0), key)
    }

    #[test]
    fn test_uncivilized_owner_converges_to_split() {
        let mut state = state(false);
        for _ in 0..60 {
            update_ideologies(&mut state, 0, 1);
        }

        assert!(support(&state, 0) >= 0.995 * 0.7);
        assert!(support(&state, 1) >= 0.995 * 0.3);
        assert_eq!(support(&state, 2), 0.0);
        let sum: f32 = (0..3).map(|i| support(&state, i)).sum();
        assert!((sum - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_civilized_owner_feels_civilized_only_ideology() {
        let mut state = state(true);
        update_ideologies(&mut state, 0, 1);

        assert!((support(&state, 2) - 0.1 * 5.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_ideology_keeps_support() {
        let mut state = state(true);
        state.world.scenario.ideologies[1].enabled = false;
        let key = state.world.keys().pop_ideology(IdeologyId(1));
        state.world.pops.set_fraction(PopId(0), key, 0.25);

        update_ideologies(&mut state, 0, 1);

        assert_eq!(support(&state, 1), 0.25);
        assert!((support(&state, 0) - 0.1 * 7.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_trigger_contributes_nothing() {
        let mut state = state(true);
        state
            .world
            .scenario
            .set_ideology_attraction(PopTypeId(0), IdeologyId(2), None)
            .unwrap();

        update_ideologies(&mut state, 0, 1);

        assert_eq!(support(&state, 2), 0.0);
        assert!((support(&state, 0) - 0.07).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_matches_staggered() {
        let mut sequential = state(true);
        let mut parallel = state(true);
        for _ in 0..5 {
            update_ideologies(&mut sequential, 0, 1);
            update_ideologies_parallel(&mut parallel, 3);
        }
        assert_eq!(sequential.world.pops.demographics, parallel.world.pops.demographics);
    }

    #[test]
    fn test_ideology_outside_keyspace_is_ignored() {
        let mut state = state(true);
        let stride = state.world.pops.stride();
        let late = state.world.scenario.add_ideology("late", false);
        state
            .world
            .scenario
            .set_ideology_attraction(PopTypeId(0), late, Some(TriggerId(0)))
            .unwrap();

        update_ideologies(&mut state, 0, 1);
        update_ideologies_parallel(&mut state, 2);

        assert_eq!(state.world.pops.stride(), stride);
        assert_eq!(state.scratch.ideologies.stride(), 3);
        let expected = 0.1 * 7.0 / 15.0;
        let expected = expected + 0.9 * expected;
        assert!((support(&state, 0) - expected).abs() < 1e-6);
    }
}
