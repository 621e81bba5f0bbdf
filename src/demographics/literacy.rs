//! Daily literacy update driven by education spending and clergy presence

use crate::core::config::Defines;
use crate::core::types::PopId;
use crate::demographics::batch::{self, ColumnRule};
use crate::demographics::consciousness::{clergy_fraction, clergy_key};
use crate::demographics::keys::DemographicsKey;
use crate::simulation::SimState;
use crate::world::{NationalModifier, PopColumn, World};

pub const MIN_LITERACY: f32 = 0.01;
pub const MAX_LITERACY: f32 = 1.0;

/// Literacy moves with education spending scaled by the local clergy share
///
/// A scenario without a clergy role reads as zero clergy everywhere. The
/// clergy term is then negative and owned pops' literacy falls to
/// [`MIN_LITERACY`].
pub struct LiteracyRule<'a> {
    defines: &'a Defines,
    clergy: Option<DemographicsKey>,
}

impl<'a> LiteracyRule<'a> {
    pub fn new(world: &World, defines: &'a Defines) -> Self {
        Self {
            defines,
            clergy: clergy_key(world),
        }
    }

    /// Clergy share mapped onto `[.., 1]` between the base and max thresholds
    fn clergy_effect(&self, fraction: f32) -> f32 {
        let d = self.defines;
        let span = d.max_clergy_for_literacy - d.base_clergy_for_literacy;
        ((fraction - d.base_clergy_for_literacy) / span).min(1.0)
    }
}

impl ColumnRule for LiteracyRule<'_> {
    const COLUMN: PopColumn = PopColumn::Literacy;

    fn apply(&self, world: &World, pop: usize, old: f32) -> f32 {
        // Unowned pops keep whatever literacy they had
        let Some(owner) = world.owner_of_pop(PopId::new(pop)) else {
            return old;
        };
        let nations = &world.nations;
        let n = owner.index();
        let location = world.pops.locations[pop];

        let spending = (nations.education_spending[n] as f32 / 100.0) * nations.spending_level[n];
        let clergy = self.clergy_effect(clergy_fraction(world, self.clergy, location));
        let efficiency = nations.modifier(Some(owner), NationalModifier::EducationEfficiency) + 1.0;
        let efficiency_modifier =
            nations.modifier(Some(owner), NationalModifier::EducationEfficiencyModifier) + 1.0;

        let change = 0.01
            * self.defines.literacy_change_speed
            * spending
            * clergy
            * efficiency
            * efficiency_modifier;
        (old + change).clamp(MIN_LITERACY, MAX_LITERACY)
    }
}

/// Update literacy of the pops assigned to worker `offset`
///
/// Offsets run one after another; see [`update_literacy_parallel`].
pub fn update_literacy(state: &mut SimState, offset: u32, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = LiteracyRule::new(world, defines);
    batch::apply_staggered(world, &rule, &mut scratch.staged.literacy, offset, divisions);
}

pub fn update_literacy_parallel(state: &mut SimState, divisions: u32) {
    let SimState {
        world,
        defines,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = LiteracyRule::new(world, defines);
    batch::apply_parallel(world, &rule, &mut scratch.staged.literacy, divisions);
}
