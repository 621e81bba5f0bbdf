//! Daily militancy update
//!
//! Militancy drifts with the local militancy modifiers and grows with unmet
//! needs, separatism and unanswered reform desire. Pops without an owning
//! nation are forced to zero. The result is clamped to `[0, 10]`.

use crate::core::config::Defines;
use crate::core::types::{IdeologyId, NationId, PopId};
use crate::demographics::batch::{self, ColumnRule};
use crate::demographics::keys::PopDemographicsKey;
use crate::simulation::SimState;
use crate::world::{NationalModifier, PopColumn, ProvinceModifier, World};

pub const MAX_MILITANCY: f32 = 10.0;

pub struct MilitancyRule<'a> {
    defines: &'a Defines,
    conservative: Option<PopDemographicsKey>,
}

impl<'a> MilitancyRule<'a> {
    pub fn new(world: &World, defines: &'a Defines) -> Self {
        Self {
            defines,
            conservative: world
                .scenario
                .roles
                .conservative
                .map(|ideology| world.keys().pop_ideology(ideology)),
        }
    }

    fn ruling_ideology(world: &World, owner: NationId) -> Option<IdeologyId> {
        let party = world.nations.ruling_party[owner.index()]?;
        world.scenario.parties[party.index()].ideology
    }
}

impl ColumnRule for MilitancyRule<'_> {
    const COLUMN: PopColumn = PopColumn::Militancy;

    fn apply(&self, world: &World, pop: usize, old: f32) -> f32 {
        let d = self.defines;
        let id = PopId::new(pop);
        let Some(owner) = world.owner_of_pop(id) else {
            return 0.0;
        };
        let pops = &world.pops;
        let location = pops.locations[pop];
        let colonial = world.provinces.is_colonial[location.index()];
        let nation = |m| world.nations.modifier(Some(owner), m);

        let luxury = (pops.luxury_needs[pop] - 0.5).max(0.0) * d.mil_has_luxury_need;
        let conservatism = self
            .conservative
            .map_or(0.0, |key| pops.fraction(id, key) * d.mil_ideology);
        let ruling_party = Self::ruling_ideology(world, owner).map_or(0.0, |ideology| {
            pops.fraction(id, world.keys().pop_ideology(ideology)) * d.mil_ruling_party
        });
        let reform = if colonial {
            0.0
        } else {
            (pops.social_reform_desire[pop] + pops.political_reform_desire[pop]) * d.mil_require_reform
        };

        let core = if colonial {
            0.0
        } else {
            nation(NationalModifier::CorePopMilitancy)
        };
        let local = world.provinces.modifier(location, ProvinceModifier::PopMilitancy)
            + nation(NationalModifier::GlobalPopMilitancy)
            + core;

        let separatism = if pops.is_primary_or_accepted_culture[pop] {
            0.0
        } else {
            (nation(NationalModifier::Separatism) + 1.0) * d.mil_non_accepted
        };
        let life_shortfall = (pops.life_needs[pop] - 0.5).min(0.0) * d.mil_no_life_need;
        let everyday = pops.everyday_needs[pop] - 0.5;
        let everyday_lack = everyday.min(0.0) * d.mil_lack_everyday_need;
        let everyday_has = everyday.max(0.0) * d.mil_has_everyday_need;

        let new = (luxury + ruling_party)
            + (conservatism + reform)
            + (local + old)
            + (separatism - life_shortfall)
            + (everyday_has - everyday_lack);
        new.clamp(0.0, MAX_MILITANCY)
    }
}

/// Update militancy of the pops assigned to worker `offset`
///
/// Takes the whole state mutably, so offsets of one call run one after
/// another. Use [`update_militancy_parallel`] to run all offsets on the
/// thread pool.
pub fn update_militancy(state: &mut SimState, offset: u32, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = MilitancyRule::new(world, defines);
    batch::apply_staggered(world, &rule, &mut scratch.staged.militancy, offset, divisions);
}

pub fn update_militancy_parallel(state: &mut SimState, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = MilitancyRule::new(world, defines);
    batch::apply_parallel(world, &rule, &mut scratch.staged.militancy, divisions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CultureId, PopTypeId, ReligionId, Strata};
    use crate::world::{PopSpawn, PopType, Scenario};

    fn owned_world() -> World {
        let mut scenario = Scenario::new();
        scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        scenario.add_culture("north");
        scenario.add_religion("sun");
        let conservative = scenario.add_ideology("conservative", false);
        scenario.roles.conservative = Some(conservative);

        let mut world = World::new(scenario);
        let province = world.add_land_province(30.0).unwrap();
        let nation = world.add_nation(Some(CultureId(0)), true).unwrap();
        world.add_state(nation, &[province]).unwrap();
        let mut spawn = PopSpawn::new(province, PopTypeId(0), CultureId(0), ReligionId(0), 100.0);
        spawn.militancy = 1.0;
        spawn.life_needs = 0.5;
        spawn.everyday_needs = 0.5;
        world.add_pop(spawn).unwrap();
        world.pops.is_primary_or_accepted_culture[0] = true;
        world
    }

    #[test]
    fn test_neutral_pop_keeps_militancy() {
        let world = owned_world();
        let defines = Defines::default();
        let rule = MilitancyRule::new(&world, &defines);

        assert!((rule.apply(&world, 0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_starving_pop_gains_militancy() {
        let mut world = owned_world();
        world.pops.life_needs[0] = 0.0;
        world.pops.everyday_needs[0] = 0.0;
        let defines = Defines::default();
        let rule = MilitancyRule::new(&world, &defines);

        let expected = 1.0 + 0.5 * defines.mil_no_life_need + 0.5 * defines.mil_lack_everyday_need;
        assert!((rule.apply(&world, 0, 1.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_extreme_modifiers_clamp_to_range() {
        let mut world = owned_world();
        let defines = Defines::default();

        world.provinces.modifiers.set(0, ProvinceModifier::PopMilitancy, -1000.0);
        let rule = MilitancyRule::new(&world, &defines);
        assert_eq!(rule.apply(&world, 0, 5.0), 0.0);

        world.provinces.modifiers.set(0, ProvinceModifier::PopMilitancy, 1000.0);
        assert_eq!(rule.apply(&world, 0, 5.0), MAX_MILITANCY);
    }

    #[test]
    fn test_unowned_pop_forced_to_zero() {
        let mut world = owned_world();
        world.provinces.owners[0] = None;
        let defines = Defines::default();
        let rule = MilitancyRule::new(&world, &defines);

        assert_eq!(rule.apply(&world, 0, 7.0), 0.0);
    }

    #[test]
    fn test_separatism_and_colonial_core_modifier() {
        let mut world = owned_world();
        world.pops.is_primary_or_accepted_culture[0] = false;
        world.nations.modifiers.set(0, NationalModifier::Separatism, 1.0);
        world.nations.modifiers.set(0, NationalModifier::CorePopMilitancy, 0.5);
        let defines = Defines::default();

        let rule = MilitancyRule::new(&world, &defines);
        let core = rule.apply(&world, 0, 1.0);
        assert!((core - (1.0 + 2.0 * defines.mil_non_accepted + 0.5)).abs() < 1e-6);

        world.provinces.is_colonial[0] = true;
        let colony = rule.apply(&world, 0, 1.0);
        assert!((colony - (1.0 + 2.0 * defines.mil_non_accepted)).abs() < 1e-6);
    }

    #[test]
    fn test_conservative_support_raises_militancy() {
        let mut world = owned_world();
        let key = world.keys().pop_ideology(IdeologyId(0));
        world.pops.set_fraction(PopId(0), key, 1.0);
        let defines = Defines::default();
        let rule = MilitancyRule::new(&world, &defines);

        assert!((rule.apply(&world, 0, 1.0) - (1.0 + defines.mil_ideology)).abs() < 1e-6);
    }
}
