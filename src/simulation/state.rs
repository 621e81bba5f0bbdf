//! Simulation context shared by every demographics phase

use std::sync::Arc;

use crate::core::config::{CycleConfig, Defines};
use crate::core::types::Day;
use crate::demographics::scratch::DemographicsScratch;
use crate::trigger::TriggerEvaluator;
use crate::world::World;

pub struct SimState {
    pub world: World,
    pub defines: Defines,
    pub cycle: CycleConfig,
    pub triggers: Arc<dyn TriggerEvaluator>,
    pub scratch: DemographicsScratch,
    pub day: Day,
}

impl SimState {
    pub fn new(world: World, triggers: Arc<dyn TriggerEvaluator>) -> Self {
        Self {
            world,
            defines: Defines::default(),
            cycle: CycleConfig::default(),
            triggers,
            scratch: DemographicsScratch::new(),
            day: 0,
        }
    }

    pub fn with_defines(mut self, defines: Defines) -> Self {
        self.defines = defines;
        self
    }

    pub fn with_cycle(mut self, cycle: CycleConfig) -> Self {
        self.cycle = cycle;
        self
    }
}

impl std::fmt::Debug for SimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimState")
            .field("day", &self.day)
            .field("pops", &self.world.pops.count())
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}
