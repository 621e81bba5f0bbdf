//! Value functions of the hardcoded aggregate keys
//!
//! Each special key sums one per-pop quantity. The rules live in a fixed table
//! indexed by key so each can be looked up and tested on its own.

use crate::core::types::{IssueType, Strata};
use crate::demographics::keys::{self, DemographicsKey, COUNT_SPECIAL_KEYS};
use crate::world::World;

/// Per-pop contribution to an aggregate key
pub type PopValueFn = fn(&World, usize) -> f32;

#[derive(Clone, Copy)]
pub struct SpecialKeyRule {
    pub key: DemographicsKey,
    pub name: &'static str,
    pub value: PopValueFn,
}

impl std::fmt::Debug for SpecialKeyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialKeyRule")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish()
    }
}

#[inline]
fn strata_of(world: &World, pop: usize) -> Strata {
    world.scenario.pop_types[world.pops.pop_types[pop].index()].strata
}

#[inline]
fn size_if_strata(world: &World, pop: usize, strata: Strata) -> f32 {
    if strata_of(world, pop) == strata {
        world.pops.sizes[pop]
    } else {
        0.0
    }
}

fn total(world: &World, pop: usize) -> f32 {
    world.pops.sizes[pop]
}

fn employable(world: &World, pop: usize) -> f32 {
    if world.scenario.pop_types[world.pops.pop_types[pop].index()].has_unemployment {
        world.pops.sizes[pop]
    } else {
        0.0
    }
}

fn employed(world: &World, pop: usize) -> f32 {
    world.pops.employment[pop]
}

fn consciousness(world: &World, pop: usize) -> f32 {
    world.pops.consciousness[pop] * world.pops.sizes[pop]
}

fn militancy(world: &World, pop: usize) -> f32 {
    world.pops.militancy[pop] * world.pops.sizes[pop]
}

fn literacy(world: &World, pop: usize) -> f32 {
    world.pops.literacy[pop] * world.pops.sizes[pop]
}

/// Size of a pop backing a movement for an issue of `issue_type`, outside colonies
fn movement_support(world: &World, pop: usize, issue_type: IssueType) -> f32 {
    if world.provinces.is_colonial[world.pops.locations[pop].index()] {
        return 0.0;
    }
    let backs_issue = world.pops.movements[pop]
        .and_then(|movement| world.scenario.movements[movement.index()].associated_issue_option)
        .is_some_and(|option| world.scenario.option_issue_type(option) == issue_type);
    if backs_issue {
        world.pops.sizes[pop]
    } else {
        0.0
    }
}

fn political_reform_desire(world: &World, pop: usize) -> f32 {
    movement_support(world, pop, IssueType::Political)
}

fn social_reform_desire(world: &World, pop: usize) -> f32 {
    movement_support(world, pop, IssueType::Social)
}

macro_rules! strata_rule {
    ($name:ident, $strata:expr, $column:ident) => {
        fn $name(world: &World, pop: usize) -> f32 {
            if strata_of(world, pop) == $strata {
                world.pops.$column[pop] * world.pops.sizes[pop]
            } else {
                0.0
            }
        }
    };
}

strata_rule!(poor_militancy, Strata::Poor, militancy);
strata_rule!(middle_militancy, Strata::Middle, militancy);
strata_rule!(rich_militancy, Strata::Rich, militancy);
strata_rule!(poor_life_needs, Strata::Poor, life_needs);
strata_rule!(middle_life_needs, Strata::Middle, life_needs);
strata_rule!(rich_life_needs, Strata::Rich, life_needs);
strata_rule!(poor_everyday_needs, Strata::Poor, everyday_needs);
strata_rule!(middle_everyday_needs, Strata::Middle, everyday_needs);
strata_rule!(rich_everyday_needs, Strata::Rich, everyday_needs);
strata_rule!(poor_luxury_needs, Strata::Poor, luxury_needs);
strata_rule!(middle_luxury_needs, Strata::Middle, luxury_needs);
strata_rule!(rich_luxury_needs, Strata::Rich, luxury_needs);

fn poor_total(world: &World, pop: usize) -> f32 {
    size_if_strata(world, pop, Strata::Poor)
}

fn middle_total(world: &World, pop: usize) -> f32 {
    size_if_strata(world, pop, Strata::Middle)
}

fn rich_total(world: &World, pop: usize) -> f32 {
    size_if_strata(world, pop, Strata::Rich)
}

const fn rule(key: DemographicsKey, name: &'static str, value: PopValueFn) -> SpecialKeyRule {
    SpecialKeyRule { key, name, value }
}

/// Rules for keys `0..COUNT_SPECIAL_KEYS`, in key order
pub static SPECIAL_KEY_RULES: [SpecialKeyRule; COUNT_SPECIAL_KEYS as usize] = [
    rule(keys::TOTAL, "total", total),
    rule(keys::EMPLOYABLE, "employable", employable),
    rule(keys::EMPLOYED, "employed", employed),
    rule(keys::CONSCIOUSNESS, "consciousness", consciousness),
    rule(keys::MILITANCY, "militancy", militancy),
    rule(keys::LITERACY, "literacy", literacy),
    rule(keys::POLITICAL_REFORM_DESIRE, "political_reform_desire", political_reform_desire),
    rule(keys::SOCIAL_REFORM_DESIRE, "social_reform_desire", social_reform_desire),
    rule(keys::POOR_MILITANCY, "poor_militancy", poor_militancy),
    rule(keys::MIDDLE_MILITANCY, "middle_militancy", middle_militancy),
    rule(keys::RICH_MILITANCY, "rich_militancy", rich_militancy),
    rule(keys::POOR_LIFE_NEEDS, "poor_life_needs", poor_life_needs),
    rule(keys::MIDDLE_LIFE_NEEDS, "middle_life_needs", middle_life_needs),
    rule(keys::RICH_LIFE_NEEDS, "rich_life_needs", rich_life_needs),
    rule(keys::POOR_EVERYDAY_NEEDS, "poor_everyday_needs", poor_everyday_needs),
    rule(keys::MIDDLE_EVERYDAY_NEEDS, "middle_everyday_needs", middle_everyday_needs),
    rule(keys::RICH_EVERYDAY_NEEDS, "rich_everyday_needs", rich_everyday_needs),
    rule(keys::POOR_LUXURY_NEEDS, "poor_luxury_needs", poor_luxury_needs),
    rule(keys::MIDDLE_LUXURY_NEEDS, "middle_luxury_needs", middle_luxury_needs),
    rule(keys::RICH_LUXURY_NEEDS, "rich_luxury_needs", rich_luxury_needs),
    rule(keys::POOR_TOTAL, "poor_total", poor_total),
    rule(keys::MIDDLE_TOTAL, "middle_total", middle_total),
    rule(keys::RICH_TOTAL, "rich_total", rich_total),
];

/// Rule of a special key, `None` for category keys
pub fn special_rule(key: DemographicsKey) -> Option<&'static SpecialKeyRule> {
    SPECIAL_KEY_RULES.get(key.index())
}
