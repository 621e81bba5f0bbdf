//! Pop storage with SoA layout

use crate::core::types::{
    CultureId, IdeologyId, IssueOptionId, MovementId, PopId, PopTypeId, ProvinceId, ReligionId,
};
use crate::demographics::keys::PopDemographicsKey;

/// Initial attributes of a new pop
#[derive(Debug, Clone)]
pub struct PopSpawn {
    pub location: ProvinceId,
    pub pop_type: PopTypeId,
    pub culture: CultureId,
    pub religion: ReligionId,
    pub size: f32,
    pub militancy: f32,
    pub consciousness: f32,
    pub literacy: f32,
    pub life_needs: f32,
    pub everyday_needs: f32,
    pub luxury_needs: f32,
    pub employment: f32,
    pub social_reform_desire: f32,
    pub political_reform_desire: f32,
    pub movement: Option<MovementId>,
}

impl PopSpawn {
    pub fn new(
        location: ProvinceId,
        pop_type: PopTypeId,
        culture: CultureId,
        religion: ReligionId,
        size: f32,
    ) -> Self {
        Self {
            location,
            pop_type,
            culture,
            religion,
            size,
            militancy: 0.0,
            consciousness: 0.0,
            literacy: 0.1,
            life_needs: 1.0,
            everyday_needs: 0.5,
            luxury_needs: 0.0,
            employment: 0.0,
            social_reform_desire: 0.0,
            political_reform_desire: 0.0,
            movement: None,
        }
    }
}

/// Scalar pop columns rewritten by the batched updaters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopColumn {
    Size,
    Militancy,
    Consciousness,
    Literacy,
}

impl PopColumn {
    pub const ALL: [PopColumn; 4] = [
        PopColumn::Size,
        PopColumn::Militancy,
        PopColumn::Consciousness,
        PopColumn::Literacy,
    ];
}

/// Structure of Arrays for pops
///
/// Per-pop demographic fractions live in one pop-major buffer: pop `p` owns
/// `demographics[p * stride..(p + 1) * stride]`, indexed by [`PopDemographicsKey`].
#[derive(Debug, Clone, Default)]
pub struct PopStore {
    pub sizes: Vec<f32>,
    pub locations: Vec<ProvinceId>,
    pub pop_types: Vec<PopTypeId>,
    pub cultures: Vec<CultureId>,
    pub religions: Vec<ReligionId>,
    /// 0.0 to 10.0
    pub militancy: Vec<f32>,
    /// 0.0 to 10.0
    pub consciousness: Vec<f32>,
    /// 0.01 to 1.0
    pub literacy: Vec<f32>,
    pub life_needs: Vec<f32>,
    pub everyday_needs: Vec<f32>,
    pub luxury_needs: Vec<f32>,
    pub employment: Vec<f32>,
    pub is_primary_or_accepted_culture: Vec<bool>,
    pub social_reform_desire: Vec<f32>,
    pub political_reform_desire: Vec<f32>,
    pub movements: Vec<Option<MovementId>>,
    pub dominant_ideology: Vec<Option<IdeologyId>>,
    pub dominant_issue_option: Vec<Option<IssueOptionId>>,
    pub demographics: Vec<f32>,
    stride: usize,
}

impl PopStore {
    pub fn new(stride: usize) -> Self {
        Self {
            stride,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Row length of the per-pop demographics buffer
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn spawn(&mut self, spawn: PopSpawn) -> PopId {
        let id = PopId::new(self.count());
        self.sizes.push(spawn.size);
        self.locations.push(spawn.location);
        self.pop_types.push(spawn.pop_type);
        self.cultures.push(spawn.culture);
        self.religions.push(spawn.religion);
        self.militancy.push(spawn.militancy);
        self.consciousness.push(spawn.consciousness);
        self.literacy.push(spawn.literacy);
        self.life_needs.push(spawn.life_needs);
        self.everyday_needs.push(spawn.everyday_needs);
        self.luxury_needs.push(spawn.luxury_needs);
        self.employment.push(spawn.employment);
        self.is_primary_or_accepted_culture.push(false);
        self.social_reform_desire.push(spawn.social_reform_desire);
        self.political_reform_desire.push(spawn.political_reform_desire);
        self.movements.push(spawn.movement);
        self.dominant_ideology.push(None);
        self.dominant_issue_option.push(None);
        self.demographics
            .extend(std::iter::repeat(0.0).take(self.stride));
        id
    }

    /// Remove a pop by moving the last pop into its slot
    ///
    /// Ids greater than or equal to `id` are invalidated; the former last pop
    /// now answers to `id`.
    pub fn delete(&mut self, id: PopId) {
        let index = id.index();
        let last = self.count() - 1;

        self.sizes.swap_remove(index);
        self.locations.swap_remove(index);
        self.pop_types.swap_remove(index);
        self.cultures.swap_remove(index);
        self.religions.swap_remove(index);
        self.militancy.swap_remove(index);
        self.consciousness.swap_remove(index);
        self.literacy.swap_remove(index);
        self.life_needs.swap_remove(index);
        self.everyday_needs.swap_remove(index);
        self.luxury_needs.swap_remove(index);
        self.employment.swap_remove(index);
        self.is_primary_or_accepted_culture.swap_remove(index);
        self.social_reform_desire.swap_remove(index);
        self.political_reform_desire.swap_remove(index);
        self.movements.swap_remove(index);
        self.dominant_ideology.swap_remove(index);
        self.dominant_issue_option.swap_remove(index);

        if index != last {
            let stride = self.stride;
            self.demographics
                .copy_within(last * stride..(last + 1) * stride, index * stride);
        }
        self.demographics.truncate(last * self.stride);
    }

    #[inline]
    pub fn fraction(&self, pop: PopId, key: PopDemographicsKey) -> f32 {
        debug_assert!(key.index() < self.stride, "pop demographics key out of range");
        self.demographics[pop.index() * self.stride + key.index()]
    }

    pub fn set_fraction(&mut self, pop: PopId, key: PopDemographicsKey, value: f32) {
        debug_assert!(key.index() < self.stride, "pop demographics key out of range");
        self.demographics[pop.index() * self.stride + key.index()] = value;
    }

    pub fn row(&self, pop: PopId) -> &[f32] {
        let start = pop.index() * self.stride;
        &self.demographics[start..start + self.stride]
    }

    pub fn column(&self, column: PopColumn) -> &[f32] {
        match column {
            PopColumn::Size => &self.sizes,
            PopColumn::Militancy => &self.militancy,
            PopColumn::Consciousness => &self.consciousness,
            PopColumn::Literacy => &self.literacy,
        }
    }

    pub fn column_mut(&mut self, column: PopColumn) -> &mut Vec<f32> {
        match column {
            PopColumn::Size => &mut self.sizes,
            PopColumn::Militancy => &mut self.militancy,
            PopColumn::Consciousness => &mut self.consciousness,
            PopColumn::Literacy => &mut self.literacy,
        }
    }

    /// Replace the demographics buffer with rows of a different stride
    pub(crate) fn replace_rows(&mut self, rows: Vec<f32>, stride: usize) {
        debug_assert_eq!(rows.len(), self.count() * stride);
        self.demographics = rows;
        self.stride = stride;
    }

    pub fn ids(&self) -> impl Iterator<Item = PopId> {
        (0..self.count()).map(PopId::new)
    }
}
