//! World - entity-relationship store for the demographics engine
//!
//! Pops belong to provinces, provinces to state instances, state instances to
//! nations. Every store is struct-of-arrays, addressed by dense typed ids.

pub mod generation;
pub mod modifiers;
pub mod nations;
pub mod pops;
pub mod provinces;
pub mod scenario;
pub mod totals;

pub use generation::{generate_world, GenerationConfig};
pub use modifiers::{ModifierTable, NationalModifier, ProvinceModifier};
pub use nations::{NationStore, StateStore};
pub use pops::{PopColumn, PopSpawn, PopStore};
pub use provinces::ProvinceStore;
pub use scenario::{PopType, Scenario};
pub use totals::{DemographicTotals, DemographicsTable, DominantCategories};

use crate::core::error::{DemographicsError, Result};
use crate::core::types::{CultureId, NationId, PartyId, PopId, ProvinceId, StateInstanceId};
use crate::demographics::keys::{DemographicsKey, Keyspace, PopDemographicsKey};

/// The world state read and written by the demographics engine
#[derive(Debug, Clone)]
pub struct World {
    pub scenario: Scenario,
    pub pops: PopStore,
    pub provinces: ProvinceStore,
    pub states: StateStore,
    pub nations: NationStore,
    pub totals: DemographicTotals,
    keys: Keyspace,
}

impl World {
    pub fn new(scenario: Scenario) -> Self {
        let keys = Keyspace::from_scenario(&scenario);
        Self {
            scenario,
            pops: PopStore::new(keys.pop_size() as usize),
            provinces: ProvinceStore::new(),
            states: StateStore::default(),
            nations: NationStore::default(),
            totals: DemographicTotals::new(keys.size() as usize),
            keys,
        }
    }

    pub fn keys(&self) -> &Keyspace {
        &self.keys
    }

    /// Recompute both keyspaces after scenario categories were added
    ///
    /// Per-pop fractions are carried over to their new key positions. All
    /// aggregate totals are discarded and must be regenerated.
    pub fn rebuild_keyspace(&mut self) {
        let new_keys = Keyspace::from_scenario(&self.scenario);
        if new_keys == self.keys {
            return;
        }

        let rows = new_keys.remap_pop_rows(&self.keys, &self.pops.demographics, self.pops.count());
        self.pops.replace_rows(rows, new_keys.pop_size() as usize);
        self.totals.reset_keys(new_keys.size() as usize);

        tracing::debug!(
            old_size = self.keys.size(),
            new_size = new_keys.size(),
            "rebuilt demographics keyspace"
        );
        self.keys = new_keys;
    }

    // === BUILDING ===

    pub fn add_land_province(&mut self, life_rating: f32) -> Result<ProvinceId> {
        if self.provinces.has_sea() {
            return Err(DemographicsError::InvalidConfig(
                "land provinces must be added before sea provinces".into(),
            ));
        }
        let id = self.provinces.push(life_rating, false);
        self.totals.provinces.push_container();
        Ok(id)
    }

    pub fn add_sea_province(&mut self) -> ProvinceId {
        let id = self.provinces.push(0.0, true);
        self.totals.provinces.push_container();
        id
    }

    pub fn add_nation(&mut self, primary_culture: Option<CultureId>, civilized: bool) -> Result<NationId> {
        if let Some(culture) = primary_culture {
            if culture.index() >= self.scenario.cultures.len() {
                return Err(DemographicsError::unknown_culture(culture));
            }
        }
        let id = self.nations.push(primary_culture, civilized);
        self.totals.nations.push_container();
        Ok(id)
    }

    /// Create a state instance owned by `nation` made of `provinces`
    ///
    /// The provinces become members of the state and owned by the nation. The
    /// first province is the capital.
    pub fn add_state(&mut self, nation: NationId, provinces: &[ProvinceId]) -> Result<StateInstanceId> {
        if nation.index() >= self.nations.count() {
            return Err(DemographicsError::NationNotFound(nation));
        }
        let capital = *provinces.first().ok_or_else(|| {
            DemographicsError::InvalidConfig("a state needs at least one province".into())
        })?;
        for (i, &province) in provinces.iter().enumerate() {
            if !self.provinces.is_land(province) {
                return Err(DemographicsError::ProvinceNotFound(province));
            }
            if let Some(state) = self.provinces.state_membership[province.index()] {
                return Err(DemographicsError::ProvinceInState { province, state });
            }
            if provinces[..i].contains(&province) {
                return Err(DemographicsError::InvalidConfig(format!(
                    "province {:?} listed twice for one state",
                    province
                )));
            }
        }

        let id = self.states.push(nation, capital);
        self.totals.states.push_container();
        for &province in provinces {
            self.provinces.state_membership[province.index()] = Some(id);
            self.provinces.owners[province.index()] = Some(nation);
        }
        Ok(id)
    }

    pub fn set_ruling_party(&mut self, nation: NationId, party: Option<PartyId>) -> Result<()> {
        if nation.index() >= self.nations.count() {
            return Err(DemographicsError::NationNotFound(nation));
        }
        if let Some(party) = party {
            if party.index() >= self.scenario.parties.len() {
                return Err(DemographicsError::unknown_party(party));
            }
        }
        self.nations.ruling_party[nation.index()] = party;
        Ok(())
    }

    pub fn add_pop(&mut self, spawn: PopSpawn) -> Result<PopId> {
        if spawn.location.index() >= self.provinces.count() {
            return Err(DemographicsError::ProvinceNotFound(spawn.location));
        }
        if !self.provinces.is_land(spawn.location) {
            return Err(DemographicsError::SeaProvince(spawn.location));
        }
        if spawn.pop_type.index() >= self.scenario.pop_types.len() {
            return Err(DemographicsError::unknown_pop_type(spawn.pop_type));
        }
        if spawn.culture.index() >= self.scenario.cultures.len() {
            return Err(DemographicsError::unknown_culture(spawn.culture));
        }
        if spawn.religion.index() >= self.scenario.religions.len() {
            return Err(DemographicsError::unknown_religion(spawn.religion));
        }
        if let Some(movement) = spawn.movement {
            if movement.index() >= self.scenario.movements.len() {
                return Err(DemographicsError::unknown_movement(movement));
            }
        }
        Ok(self.pops.spawn(spawn))
    }

    pub fn delete_pop(&mut self, pop: PopId) {
        self.pops.delete(pop);
    }

    // === QUERIES ===

    /// Nation owning the province the pop lives in
    #[inline]
    pub fn owner_of_pop(&self, pop: PopId) -> Option<NationId> {
        self.provinces.owners[self.pops.locations[pop.index()].index()]
    }

    pub fn pop_fraction(&self, pop: PopId, key: PopDemographicsKey) -> f32 {
        self.pops.fraction(pop, key)
    }

    pub fn province_total(&self, province: ProvinceId, key: DemographicsKey) -> f32 {
        self.totals.provinces.get(province.index(), key)
    }

    pub fn state_total(&self, state: StateInstanceId, key: DemographicsKey) -> f32 {
        self.totals.states.get(state.index(), key)
    }

    pub fn nation_total(&self, nation: NationId, key: DemographicsKey) -> f32 {
        self.totals.nations.get(nation.index(), key)
    }

    /// Sum of all pop sizes
    pub fn population(&self) -> f64 {
        self.pops.sizes.iter().map(|&s| s as f64).sum()
    }
}
