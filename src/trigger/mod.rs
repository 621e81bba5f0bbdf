//! Trigger evaluation contract
//!
//! Scripted conditions and attraction weights are owned by an external
//! scripting layer. The demographics engine only needs their numeric and
//! boolean results, evaluated against a world snapshot.

use ahash::AHashMap;

use crate::core::types::{NationId, PopId, ProvinceId, TriggerId};
use crate::world::World;

/// Entity a trigger is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    None,
    Pop(PopId),
    Nation(NationId),
    Province(ProvinceId),
}

impl From<Option<NationId>> for Scope {
    fn from(nation: Option<NationId>) -> Self {
        nation.map_or(Scope::None, Scope::Nation)
    }
}

/// Evaluates scripted triggers
///
/// Implementations are called concurrently from worker threads and must not
/// mutate shared state.
pub trait TriggerEvaluator: Send + Sync {
    /// Product of all modifier factors whose conditions hold
    fn evaluate_multiplicative_modifier(
        &self,
        world: &World,
        trigger: TriggerId,
        primary: Scope,
        this: Scope,
        from: Scope,
    ) -> f32;

    fn evaluate_trigger(
        &self,
        world: &World,
        trigger: TriggerId,
        primary: Scope,
        this: Scope,
        from: Scope,
    ) -> bool;
}

/// Table-driven evaluator with fixed results per trigger
///
/// Each trigger has a default weight, optionally overridden for a specific
/// primary scope. A boolean trigger holds when its weight is positive.
/// Unknown triggers evaluate to 0.0 and false.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    weights: AHashMap<TriggerId, f32>,
    overrides: AHashMap<(TriggerId, Scope), f32>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, trigger: TriggerId, weight: f32) -> &mut Self {
        self.weights.insert(trigger, weight);
        self
    }

    pub fn set_for(&mut self, trigger: TriggerId, primary: Scope, weight: f32) -> &mut Self {
        self.overrides.insert((trigger, primary), weight);
        self
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty() && self.overrides.is_empty()
    }

    fn weight(&self, trigger: TriggerId, primary: Scope) -> f32 {
        self.overrides
            .get(&(trigger, primary))
            .or_else(|| self.weights.get(&trigger))
            .copied()
            .unwrap_or(0.0)
    }
}

impl TriggerEvaluator for TriggerTable {
    fn evaluate_multiplicative_modifier(
        &self,
        _world: &World,
        trigger: TriggerId,
        primary: Scope,
        _this: Scope,
        _from: Scope,
    ) -> f32 {
        self.weight(trigger, primary)
    }

    fn evaluate_trigger(
        &self,
        _world: &World,
        trigger: TriggerId,
        primary: Scope,
        _this: Scope,
        _from: Scope,
    ) -> bool {
        self.weight(trigger, primary) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Scenario;

    #[test]
    fn test_override_beats_default_weight() {
        let world = World::new(Scenario::new());
        let mut table = TriggerTable::new();
        table
            .set(TriggerId(1), 2.0)
            .set_for(TriggerId(1), Scope::Pop(PopId(3)), 0.5);

        let eval = |primary| {
            table.evaluate_multiplicative_modifier(&world, TriggerId(1), primary, Scope::None, Scope::None)
        };
        assert_eq!(eval(Scope::Pop(PopId(3))), 0.5);
        assert_eq!(eval(Scope::Pop(PopId(4))), 2.0);
    }

    #[test]
    fn test_unknown_trigger_is_zero_and_false() {
        let world = World::new(Scenario::new());
        let table = TriggerTable::new();

        assert!(!table.evaluate_trigger(&world, TriggerId(9), Scope::None, Scope::None, Scope::None));
        assert_eq!(
            table.evaluate_multiplicative_modifier(&world, TriggerId(9), Scope::None, Scope::None, Scope::None),
            0.0
        );
    }

    #[test]
    fn test_missing_nation_scope_is_none() {
        assert_eq!(Scope::from(None), Scope::None);
        assert_eq!(Scope::from(Some(NationId(2))), Scope::Nation(NationId(2)));
    }
}
