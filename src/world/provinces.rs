//! Province storage
//!
//! Land provinces occupy ids `[0, first_sea_province)`; sea provinces are
//! appended after every land province and never hold pops.

use crate::core::types::{NationId, ProvinceId, StateInstanceId};
use crate::world::modifiers::{ModifierTable, ProvinceModifier};
use crate::world::totals::DominantCategories;

#[derive(Debug, Clone, Default)]
pub struct ProvinceStore {
    pub owners: Vec<Option<NationId>>,
    pub state_membership: Vec<Option<StateInstanceId>>,
    pub is_colonial: Vec<bool>,
    /// Intrinsic life rating before modifiers
    pub life_rating: Vec<f32>,
    pub modifiers: ModifierTable<ProvinceModifier>,
    pub dominant: DominantCategories,
    first_sea_province: Option<usize>,
}

impl ProvinceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.owners.len()
    }

    /// Number of land provinces
    pub fn land_count(&self) -> usize {
        self.first_sea_province.unwrap_or(self.count())
    }

    pub fn is_land(&self, province: ProvinceId) -> bool {
        province.index() < self.land_count()
    }

    pub fn has_sea(&self) -> bool {
        self.first_sea_province.is_some()
    }

    pub(crate) fn push(&mut self, life_rating: f32, sea: bool) -> ProvinceId {
        let id = ProvinceId::new(self.count());
        if sea && self.first_sea_province.is_none() {
            self.first_sea_province = Some(id.index());
        }
        self.owners.push(None);
        self.state_membership.push(None);
        self.is_colonial.push(false);
        self.life_rating.push(life_rating);
        self.modifiers.push_row();
        self.dominant.push();
        id
    }

    pub fn land_ids(&self) -> impl Iterator<Item = ProvinceId> {
        (0..self.land_count()).map(ProvinceId::new)
    }

    #[inline]
    pub fn modifier(&self, province: ProvinceId, modifier: ProvinceModifier) -> f32 {
        self.modifiers.get(province.index(), modifier)
    }
}
