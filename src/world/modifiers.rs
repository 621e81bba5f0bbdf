//! Dense modifier tables for provinces and nations
//!
//! Modifier values are produced by the economy, technology and event systems
//! and are only read here. Each entity owns one slot per offset.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A typed offset into a modifier table row
pub trait ModifierOffset: Copy {
    const COUNT: usize;

    fn offset(self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvinceModifier {
    PopMilitancy,
    PopConsciousness,
    LifeRating,
    PopulationGrowth,
}

impl ModifierOffset for ProvinceModifier {
    const COUNT: usize = 4;

    fn offset(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NationalModifier {
    GlobalPopMilitancy,
    /// Only applies to pops in non-colonial provinces
    CorePopMilitancy,
    Separatism,
    GlobalPopConsciousness,
    /// Only applies to pops in non-colonial provinces
    CorePopConsciousness,
    NonAcceptedPopConsciousness,
    LiteracyConImpact,
    EducationEfficiency,
    EducationEfficiencyModifier,
    SocialReformDesire,
    PoliticalReformDesire,
    IssueChangeSpeed,
    PopGrowth,
}

impl ModifierOffset for NationalModifier {
    const COUNT: usize = 13;

    fn offset(self) -> usize {
        self as usize
    }
}

/// Entity-major table: row `entity` holds `M::COUNT` values
#[derive(Debug, Clone)]
pub struct ModifierTable<M> {
    values: Vec<f32>,
    marker: PhantomData<M>,
}

impl<M: ModifierOffset> ModifierTable<M> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Append a zeroed row for a new entity
    pub fn push_row(&mut self) {
        self.values.extend(std::iter::repeat(0.0).take(M::COUNT));
    }

    pub fn rows(&self) -> usize {
        self.values.len() / M::COUNT
    }

    #[inline]
    pub fn get(&self, entity: usize, modifier: M) -> f32 {
        self.values[entity * M::COUNT + modifier.offset()]
    }

    pub fn set(&mut self, entity: usize, modifier: M, value: f32) {
        self.values[entity * M::COUNT + modifier.offset()] = value;
    }
}

impl<M: ModifierOffset> Default for ModifierTable<M> {
    fn default() -> Self {
        Self::new()
    }
}
