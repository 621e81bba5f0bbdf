//! Hierarchical aggregation of pop data into province, state and nation totals
//!
//! Every key is recomputed from the pops on each call: zero the province
//! slots, add each pop into its province, then roll land provinces up into
//! their state instances and state instances into their nations. Keys are
//! independent columns, so the outer loop over keys runs on rayon.

use std::time::Instant;

use rayon::prelude::*;

use crate::core::types::{CultureId, NationId, PopTypeId, ProvinceId, ReligionId};
use crate::demographics::dominant::regenerate_dominant_categories;
use crate::demographics::keys::{self, DemographicsKey, KeyKind, Keyspace, PopDemographicsKey};
use crate::demographics::scratch::DemographicsScratch;
use crate::demographics::special::{special_rule, PopValueFn};
use crate::world::{DemographicTotals, World};

/// Per-pop value summed into one aggregate key
#[derive(Debug, Clone, Copy)]
pub enum KeySource {
    Special(PopValueFn),
    /// Per-pop fraction times size
    Fraction(PopDemographicsKey),
    PopType(PopTypeId),
    Culture(CultureId),
    Religion(ReligionId),
    /// Employment of unemployment-tracking types, size otherwise
    Employment(PopTypeId),
}

impl KeySource {
    /// Source of `key`, `None` past the end of the keyspace
    pub fn for_key(keys: &Keyspace, key: DemographicsKey) -> Option<Self> {
        let source = match keys.classify(key)? {
            KeyKind::Special(special) => KeySource::Special(special_rule(special)?.value),
            KeyKind::Ideology(ideology) => KeySource::Fraction(keys.pop_ideology(ideology)),
            KeyKind::IssueOption(option) => KeySource::Fraction(keys.pop_issue_option(option)),
            KeyKind::PopType(pop_type) => KeySource::PopType(pop_type),
            KeyKind::Culture(culture) => KeySource::Culture(culture),
            KeyKind::Religion(religion) => KeySource::Religion(religion),
            KeyKind::Employment(pop_type) => KeySource::Employment(pop_type),
        };
        Some(source)
    }

    #[inline]
    pub fn value(&self, world: &World, pop: usize) -> f32 {
        let pops = &world.pops;
        match *self {
            KeySource::Special(value) => value(world, pop),
            KeySource::Fraction(key) => {
                pops.demographics[pop * pops.stride() + key.index()] * pops.sizes[pop]
            }
            KeySource::PopType(pop_type) => size_if(pops.pop_types[pop] == pop_type, pops.sizes[pop]),
            KeySource::Culture(culture) => size_if(pops.cultures[pop] == culture, pops.sizes[pop]),
            KeySource::Religion(religion) => size_if(pops.religions[pop] == religion, pops.sizes[pop]),
            KeySource::Employment(pop_type) => {
                if pops.pop_types[pop] != pop_type {
                    0.0
                } else if world.scenario.pop_types[pop_type.index()].has_unemployment {
                    pops.employment[pop]
                } else {
                    pops.sizes[pop]
                }
            }
        }
    }
}

#[inline]
fn size_if(matches: bool, size: f32) -> f32 {
    if matches {
        size
    } else {
        0.0
    }
}

/// Roll one key up the location hierarchy into its three columns
fn roll_up<F>(world: &World, source: F, provinces: &mut [f32], states: &mut [f32], nations: &mut [f32])
where
    F: Fn(&World, usize) -> f32,
{
    let land = world.provinces.land_count();

    provinces[..land].fill(0.0);
    for (pop, location) in world.pops.locations.iter().enumerate() {
        provinces[location.index()] += source(world, pop);
    }

    states.fill(0.0);
    for (province, membership) in world.provinces.state_membership[..land].iter().enumerate() {
        if let Some(state) = membership {
            states[state.index()] += provinces[province];
        }
    }

    nations.fill(0.0);
    for (state, nation) in world.states.nations.iter().enumerate() {
        nations[nation.index()] += states[state];
    }
}

/// Recompute the totals of a single key from an arbitrary per-pop value
pub fn sum_over_demographics<F>(world: &mut World, key: DemographicsKey, source: F)
where
    F: Fn(&World, usize) -> f32,
{
    let mut totals = std::mem::take(&mut world.totals);
    {
        let DemographicTotals {
            provinces,
            states,
            nations,
        } = &mut totals;
        roll_up(
            world,
            source,
            &mut provinces.columns_mut()[key.index()],
            &mut states.columns_mut()[key.index()],
            &mut nations.columns_mut()[key.index()],
        );
    }
    world.totals = totals;
}

/// Recompute every aggregate key, one rayon task per key
pub fn aggregate_all_keys(world: &mut World) {
    let keys = *world.keys();
    let mut totals = std::mem::take(&mut world.totals);
    let world_ref: &World = world;

    {
        let DemographicTotals {
            provinces,
            states,
            nations,
        } = &mut totals;

        provinces
            .columns_mut()
            .par_iter_mut()
            .zip(states.columns_mut().par_iter_mut())
            .zip(nations.columns_mut().par_iter_mut())
            .enumerate()
            .for_each(|(index, ((province_column, state_column), nation_column))| {
                let key = DemographicsKey(index as u32);
                if let Some(source) = KeySource::for_key(&keys, key) {
                    roll_up(
                        world_ref,
                        |w, pop| source.value(w, pop),
                        province_column,
                        state_column,
                        nation_column,
                    );
                }
            });
    }

    tracing::trace!(keys = keys.size(), "aggregated key columns");
    world.totals = totals;
}

/// Per-nation sum of a state column over states whose capital is not colonial
pub fn non_colonial_total(
    state_column: &[f32],
    nations: &[NationId],
    capitals: &[ProvinceId],
    colonial: &[bool],
    out: &mut [f32],
) {
    out.fill(0.0);
    for (state, nation) in nations.iter().enumerate() {
        if !colonial[capitals[state].index()] {
            out[nation.index()] += state_column[state];
        }
    }
}

/// Daily regeneration of all aggregate totals and dominant categories
///
/// Runs in two phases separated by a barrier: per-key aggregation, then the
/// dominant-category passes and the derived national scalars.
pub fn regenerate_from_pop_data(world: &mut World, scratch: &mut DemographicsScratch) {
    let start = Instant::now();
    aggregate_all_keys(world);
    let aggregated = start.elapsed();

    scratch.ensure_capacity(world);
    regenerate_dominant_categories(world, scratch);

    tracing::debug!(
        keys = world.keys().size(),
        pops = world.pops.count(),
        aggregate_ms = aggregated.as_secs_f64() * 1000.0,
        total_ms = start.elapsed().as_secs_f64() * 1000.0,
        "regenerated demographics from pop data"
    );
}

/// Key of the bureaucrat pop type, if the scenario defines one
pub fn bureaucrat_key(world: &World) -> Option<DemographicsKey> {
    world.scenario.roles.bureaucrat.map(|b| world.keys().pop_type(b))
}

/// Key summed into non-colonial population
pub const NON_COLONIAL_POPULATION_KEY: DemographicsKey = keys::TOTAL;
