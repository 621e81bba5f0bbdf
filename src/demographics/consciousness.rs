//! Daily consciousness update
//!
//! Consciousness (clamped to `[0, 10]`) rises with luxury consumption, clergy
//! presence and literacy weighted by national plurality.

use crate::core::config::Defines;
use crate::core::types::{PopId, ProvinceId, Strata};
use crate::demographics::batch::{self, ColumnRule};
use crate::demographics::keys::{self, DemographicsKey};
use crate::simulation::SimState;
use crate::world::{NationalModifier, PopColumn, ProvinceModifier, World};

pub const MAX_CONSCIOUSNESS: f32 = 10.0;

/// Share of a province's population belonging to the clergy pop type
///
/// Zero when the province is empty or the scenario has no clergy.
pub fn clergy_fraction(world: &World, clergy: Option<DemographicsKey>, province: ProvinceId) -> f32 {
    let Some(key) = clergy else {
        return 0.0;
    };
    let total = world.province_total(province, keys::TOTAL);
    if total <= 0.0 {
        0.0
    } else {
        world.province_total(province, key) / total
    }
}

pub(crate) fn clergy_key(world: &World) -> Option<DemographicsKey> {
    world
        .scenario
        .roles
        .clergy
        .map(|pop_type| world.keys().pop_type(pop_type))
}

pub struct ConsciousnessRule<'a> {
    defines: &'a Defines,
    clergy: Option<DemographicsKey>,
}

impl<'a> ConsciousnessRule<'a> {
    pub fn new(world: &World, defines: &'a Defines) -> Self {
        Self {
            defines,
            clergy: clergy_key(world),
        }
    }
}

impl ColumnRule for ConsciousnessRule<'_> {
    const COLUMN: PopColumn = PopColumn::Consciousness;

    fn apply(&self, world: &World, pop: usize, old: f32) -> f32 {
        let d = self.defines;
        let Some(owner) = world.owner_of_pop(PopId::new(pop)) else {
            return 0.0;
        };
        let pops = &world.pops;
        let location = pops.locations[pop];
        let colonial = world.provinces.is_colonial[location.index()];
        let nation = |m| world.nations.modifier(Some(owner), m);

        let luxury = pops.luxury_needs[pop] * d.con_luxury_goods;

        let strata = world.scenario.pop_type(pops.pop_types[pop]).strata;
        let clergy_factor = if strata == Strata::Poor {
            d.con_poor_clergy
        } else {
            d.con_midrich_clergy
        };
        let clergy = clergy_fraction(world, self.clergy, location) * clergy_factor;

        let plurality = world.nations.plurality[owner.index()] / 10000.0;
        let mut literacy = plurality
            * (nation(NationalModifier::LiteracyConImpact) + 1.0)
            * d.con_literacy
            * pops.literacy[pop];
        if colonial {
            literacy *= d.con_colonial_factor;
        }

        let core = if colonial {
            0.0
        } else {
            nation(NationalModifier::CorePopConsciousness)
        };
        let local = world.provinces.modifier(location, ProvinceModifier::PopConsciousness)
            + nation(NationalModifier::GlobalPopConsciousness)
            + core;

        let non_accepted = if pops.is_primary_or_accepted_culture[pop] {
            0.0
        } else {
            nation(NationalModifier::NonAcceptedPopConsciousness)
        };

        (old + luxury + clergy + literacy + local + non_accepted).clamp(0.0, MAX_CONSCIOUSNESS)
    }
}

/// Update consciousness of the pops assigned to worker `offset`
///
/// Offsets run one after another; see [`update_consciousness_parallel`].
pub fn update_consciousness(state: &mut SimState, offset: u32, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = ConsciousnessRule::new(world, defines);
    batch::apply_staggered(world, &rule, &mut scratch.staged.consciousness, offset, divisions);
}

pub fn update_consciousness_parallel(state: &mut SimState, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = ConsciousnessRule::new(world, defines);
    batch::apply_parallel(world, &rule, &mut scratch.staged.consciousness, divisions);
}
