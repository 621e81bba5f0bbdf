//! Daily issue support update
//!
//! Works like ideology support, with attraction gated per option by what the
//! owning nation could actually enact next.

use crate::core::types::{IssueId, IssueOptionId, IssueType, NationId, PopId, TriggerId};
use crate::demographics::attraction::{self, AttractionRule};
use crate::demographics::keys::Keyspace;
use crate::simulation::SimState;
use crate::trigger::{Scope, TriggerEvaluator};
use crate::world::{NationalModifier, World};

/// Daily blend rate before the national issue change speed modifier
pub const ISSUE_CHANGE_RATE: f32 = 0.10;

/// Per-option facts the rule looks up for every pop
#[derive(Debug, Clone, Copy)]
struct OptionInfo {
    issue: IssueId,
    issue_type: IssueType,
    next_step_only: bool,
    allow: Option<TriggerId>,
    position: usize,
}

pub struct IssueRule<'a> {
    triggers: &'a dyn TriggerEvaluator,
    keys: Keyspace,
    options: Vec<OptionInfo>,
}

impl<'a> IssueRule<'a> {
    pub fn new(world: &World, triggers: &'a dyn TriggerEvaluator) -> Self {
        let scenario = &world.scenario;
        let options = world
            .keys()
            .issue_option_ids()
            .map(|option| {
                let info = scenario.issue_option(option);
                let issue = scenario.issue(info.parent);
                OptionInfo {
                    issue: info.parent,
                    issue_type: issue.issue_type,
                    next_step_only: issue.next_step_only,
                    allow: info.allow,
                    position: scenario.option_position(option).unwrap_or(0),
                }
            })
            .collect();
        Self {
            triggers,
            keys: *world.keys(),
            options,
        }
    }

    /// Whether `owner` could move the issue to `option` from its current setting
    fn is_eligible(&self, world: &World, owner: NationId, option: usize, info: &OptionInfo) -> bool {
        if !world.nations.is_civilized[owner.index()] && info.issue_type != IssueType::Party {
            return false;
        }

        let current = world.nations.issue_setting(owner, info.issue);
        if current == Some(IssueOptionId::new(option)) {
            return false;
        }

        if info.next_step_only {
            // An unset issue sits one step below its first option
            let current_position = current
                .and_then(|c| world.scenario.option_position(c))
                .map_or(-1, |p| p as i64);
            if (info.position as i64 - current_position).abs() != 1 {
                return false;
            }
        }

        info.allow.map_or(true, |trigger| {
            self.triggers.evaluate_trigger(
                world,
                trigger,
                Scope::Nation(owner),
                Scope::Nation(owner),
                Scope::None,
            )
        })
    }
}

impl AttractionRule for IssueRule<'_> {
    fn count(&self) -> usize {
        self.options.len()
    }

    fn participates(&self, _category: usize) -> bool {
        true
    }

    fn row_offset(&self, category: usize) -> usize {
        self.keys.pop_issue_option(IssueOptionId::new(category)).index()
    }

    fn amount(&self, world: &World, pop: usize, category: usize) -> f32 {
        let id = PopId::new(pop);
        let Some(owner) = world.owner_of_pop(id) else {
            return 0.0;
        };
        let info = &self.options[category];
        if !self.is_eligible(world, owner, category, info) {
            return 0.0;
        }

        let pop_type = world.scenario.pop_type(world.pops.pop_types[pop]);
        let Some(trigger) = pop_type.issue_trigger(IssueOptionId::new(category)) else {
            return 0.0;
        };
        let attraction = self.triggers.evaluate_multiplicative_modifier(
            world,
            trigger,
            Scope::Pop(id),
            Scope::Nation(owner),
            Scope::None,
        );

        let reform_desire = match info.issue_type {
            IssueType::Social => Some(NationalModifier::SocialReformDesire),
            IssueType::Political => Some(NationalModifier::PoliticalReformDesire),
            _ => None,
        };
        let scale = reform_desire.map_or(1.0, |m| world.nations.modifier(Some(owner), m) + 1.0);
        attraction * scale
    }

    fn rate(&self, world: &World, pop: usize) -> f32 {
        let owner = world.owner_of_pop(PopId::new(pop));
        ISSUE_CHANGE_RATE * (world.nations.modifier(owner, NationalModifier::IssueChangeSpeed) + 1.0)
    }
}

/// Update issue support of the pops assigned to worker `offset`
///
/// Offsets run one after another; see [`update_issues_parallel`].
pub fn update_issues(state: &mut SimState, offset: u32, divisions: u32) {
    let SimState {
        world,
        triggers,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = IssueRule::new(world, &**triggers);
    attraction::apply_staggered(world, &mut scratch.issues, &rule, offset, divisions);
}

pub fn update_issues_parallel(state: &mut SimState, divisions: u32) {
    let SimState {
        world,
        triggers,
        scratch,
        ..
    } = state;
    scratch.ensure_capacity(world);
    let rule = IssueRule::new(world, &**triggers);
    attraction::apply_parallel(world, &mut scratch.issues, &rule, divisions);
}
