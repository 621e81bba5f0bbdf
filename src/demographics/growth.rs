//! Daily population growth
//!
//! Growth depends on life needs satisfaction and the province's modified life
//! rating. Slave pops and pops in unowned provinces never change size here.

use crate::core::config::Defines;
use crate::core::types::{PopId, PopTypeId, ProvinceId};
use crate::demographics::batch::{self, ColumnRule};
use crate::simulation::SimState;
use crate::world::{NationalModifier, PopColumn, ProvinceModifier, World};

/// Cap on the modified life rating used for growth
pub const MAX_LIFE_RATING: f32 = 40.0;

pub struct GrowthRule<'a> {
    defines: &'a Defines,
    slaves: Option<PopTypeId>,
}

impl<'a> GrowthRule<'a> {
    pub fn new(world: &World, defines: &'a Defines) -> Self {
        Self {
            defines,
            slaves: world.scenario.roles.slaves,
        }
    }

    /// Growth contribution of a province's life rating
    pub fn province_factor(&self, world: &World, province: ProvinceId) -> f32 {
        let d = self.defines;
        let modifier = world.provinces.modifier(province, ProvinceModifier::LifeRating);
        let life_rating =
            (world.provinces.life_rating[province.index()] * (modifier + 1.0)).min(MAX_LIFE_RATING);
        ((life_rating - d.min_life_rating_for_growth) * d.life_rating_growth_bonus).max(0.0)
            + d.base_popgrowth
    }

    /// Daily relative change of a pop's size
    pub fn growth_factor(&self, world: &World, pop: usize) -> f32 {
        let location = world.pops.locations[pop];
        let owner = world.owner_of_pop(PopId::new(pop));
        let life = world.pops.life_needs[pop];

        (life - self.defines.life_need_starvation_limit) * self.province_factor(world, location) * 4.0
            + world.provinces.modifier(location, ProvinceModifier::PopulationGrowth)
            + world.nations.modifier(owner, NationalModifier::PopGrowth) * 0.1
    }
}

impl ColumnRule for GrowthRule<'_> {
    const COLUMN: PopColumn = PopColumn::Size;

    fn apply(&self, world: &World, pop: usize, old: f32) -> f32 {
        if world.owner_of_pop(PopId::new(pop)).is_none()
            || Some(world.pops.pop_types[pop]) == self.slaves
        {
            return old;
        }
        old + old * self.growth_factor(world, pop)
    }
}

/// Grow or shrink the pops assigned to worker `offset`
///
/// Offsets run one after another; see [`update_growth_parallel`].
pub fn update_growth(state: &mut SimState, offset: u32, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = GrowthRule::new(world, defines);
    batch::apply_staggered(world, &rule, &mut scratch.staged.sizes, offset, divisions);
}

pub fn update_growth_parallel(state: &mut SimState, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = GrowthRule::new(world, defines);
    batch::apply_parallel(world, &rule, &mut scratch.staged.sizes, divisions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CultureId, ReligionId, Strata};
    use crate::world::{PopSpawn, PopType, Scenario};

    fn world(life_rating: f32) -> World {
        let mut scenario = Scenario::new();
        scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        let slaves = scenario.add_pop_type(PopType::new("slaves", Strata::Poor));
        scenario.roles.slaves = Some(slaves);
        scenario.add_culture("north");
        scenario.add_religion("sun");

        let mut world = World::new(scenario);
        let province = world.add_land_province(life_rating).unwrap();
        let nation = world.add_nation(Some(CultureId(0)), true).unwrap();
        world.add_state(nation, &[province]).unwrap();
        for pop_type in [PopTypeId(0), slaves] {
            world
                .add_pop(PopSpawn::new(province, pop_type, CultureId(0), ReligionId(0), 1000.0))
                .unwrap();
        }
        world
    }

    #[test]
    fn test_province_factor_caps_life_rating() {
        let mut world = world(35.0);
        let defines = Defines::default();
        let rule = GrowthRule::new(&world, &defines);

        let expected = 5.0 * defines.life_rating_growth_bonus + defines.base_popgrowth;
        assert!((rule.province_factor(&world, ProvinceId(0)) - expected).abs() < 1e-8);

        world.provinces.modifiers.set(0, ProvinceModifier::LifeRating, 1.0);
        let capped = 10.0 * defines.life_rating_growth_bonus + defines.base_popgrowth;
        assert!((rule.province_factor(&world, ProvinceId(0)) - capped).abs() < 1e-8);
    }

    #[test]
    fn test_low_life_rating_gives_base_growth_only() {
        let world = world(10.0);
        let defines = Defines::default();
        let rule = GrowthRule::new(&world, &defines);

        assert!((rule.province_factor(&world, ProvinceId(0)) - defines.base_popgrowth).abs() < 1e-8);
    }

    #[test]
    fn test_fed_pops_grow_and_starving_pops_shrink() {
        let mut world = world(35.0);
        let defines = Defines::default();
        let rule = GrowthRule::new(&world, &defines);

        assert!(rule.apply(&world, 0, 1000.0) > 1000.0);
        world.pops.life_needs[0] = 0.0;
        assert!(rule.apply(&world, 0, 1000.0) < 1000.0);
    }

    #[test]
    fn test_national_modifier_scaled_down() {
        let mut world = world(35.0);
        let defines = Defines::default();
        world.pops.life_needs[0] = defines.life_need_starvation_limit;
        world.nations.modifiers.set(0, NationalModifier::PopGrowth, 0.01);
        let rule = GrowthRule::new(&world, &defines);

        assert!((rule.growth_factor(&world, 0) - 0.001).abs() < 1e-7);
    }

    #[test]
    fn test_slaves_and_unowned_pops_keep_size() {
        let mut world = world(35.0);
        let defines = Defines::default();
        let rule = GrowthRule::new(&world, &defines);

        assert_eq!(rule.apply(&world, 1, 1000.0), 1000.0);
        world.provinces.owners[0] = None;
        assert_eq!(rule.apply(&world, 0, 1000.0), 1000.0);
    }
}
