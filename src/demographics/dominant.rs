//! Dominant-category selection
//!
//! For each container the dominant culture, religion, ideology and issue
//! option is the category with the strictly greatest aggregate weight. The
//! running maximum starts at zero, so a container whose categories all weigh
//! zero keeps its previous dominant value. Ties keep the earlier category.

use crate::core::types::{NationId, ProvinceId};
use crate::demographics::aggregate::{bureaucrat_key, non_colonial_total, NON_COLONIAL_POPULATION_KEY};
use crate::demographics::keys::DemographicsKey;
use crate::demographics::scratch::DemographicsScratch;
use crate::world::{DemographicsTable, DominantCategories, World};

/// Argmax over category columns for every container
///
/// `categories` yields each category with its per-container weights, in
/// category index order.
pub fn select_dominant<'a, C, I>(categories: I, max: &mut [f32], dominant: &mut [Option<C>])
where
    C: Copy,
    I: IntoIterator<Item = (C, &'a [f32])>,
{
    let count = dominant.len();
    let max = &mut max[..count];
    max.fill(0.0);

    for (category, weights) in categories {
        for ((value, best), slot) in weights[..count].iter().zip(max.iter_mut()).zip(dominant.iter_mut()) {
            if *value > *best {
                *best = *value;
                *slot = Some(category);
            }
        }
    }
}

/// Argmax over per-pop fractions stored in pop-major rows
pub fn select_dominant_in_rows<C, I>(
    categories: I,
    rows: &[f32],
    stride: usize,
    max: &mut [f32],
    dominant: &mut [Option<C>],
) where
    C: Copy,
    I: IntoIterator<Item = (C, usize)>,
{
    let count = dominant.len();
    let max = &mut max[..count];
    max.fill(0.0);
    if stride == 0 {
        return;
    }

    for (category, key) in categories {
        for (pop, (best, slot)) in max.iter_mut().zip(dominant.iter_mut()).enumerate() {
            let value = rows[pop * stride + key];
            if value > *best {
                *best = value;
                *slot = Some(category);
            }
        }
    }
}

fn columns<'a, C: Copy>(
    table: &'a DemographicsTable,
    categories: &'a [(C, DemographicsKey)],
) -> impl Iterator<Item = (C, &'a [f32])> + 'a {
    categories
        .iter()
        .map(move |&(category, key)| (category, table.column(key)))
}

/// Run every dominant-category pass plus the derived national scalars
///
/// Each pass writes its own dominant field and its own max buffer, so all
/// sixteen run as independent rayon tasks. `scratch` must already be sized
/// for the world.
pub fn regenerate_dominant_categories(world: &mut World, scratch: &mut DemographicsScratch) {
    let keys = *world.keys();
    let land = world.provinces.land_count();
    let bureaucrats = bureaucrat_key(world);

    let cultures: Vec<_> = keys.culture_ids().map(|c| (c, keys.culture(c))).collect();
    let religions: Vec<_> = keys.religion_ids().map(|r| (r, keys.religion(r))).collect();
    let ideologies: Vec<_> = keys.ideology_ids().map(|i| (i, keys.ideology(i))).collect();
    let options: Vec<_> = keys
        .issue_option_ids()
        .map(|o| (o, keys.issue_option(o)))
        .collect();
    let pop_ideologies: Vec<_> = keys
        .ideology_ids()
        .map(|i| (i, keys.pop_ideology(i).index()))
        .collect();
    let pop_options: Vec<_> = keys
        .issue_option_ids()
        .map(|o| (o, keys.pop_issue_option(o).index()))
        .collect();
    let (cultures, religions, ideologies, options) = (&cultures, &religions, &ideologies, &options);
    let (pop_ideologies, pop_options) = (&pop_ideologies, &pop_options);

    let provinces = &world.totals.provinces;
    let states = &world.totals.states;
    let nations = &world.totals.nations;
    let rows = &world.pops.demographics[..];
    let stride = world.pops.stride();
    let hierarchy = NonColonial {
        nations: &world.states.nations,
        capitals: &world.states.capitals,
        colonial: &world.provinces.is_colonial,
    };

    let DominantCategories {
        culture: province_culture,
        religion: province_religion,
        ideology: province_ideology,
        issue_option: province_issue,
    } = &mut world.provinces.dominant;
    let DominantCategories {
        culture: state_culture,
        religion: state_religion,
        ideology: state_ideology,
        issue_option: state_issue,
    } = &mut world.states.dominant;
    let DominantCategories {
        culture: nation_culture,
        religion: nation_religion,
        ideology: nation_ideology,
        issue_option: nation_issue,
    } = &mut world.nations.dominant;
    let pop_issue = &mut world.pops.dominant_issue_option;
    let pop_ideology = &mut world.pops.dominant_ideology;
    let non_colonial_population = &mut world.nations.non_colonial_population;
    let non_colonial_bureaucrats = &mut world.nations.non_colonial_bureaucrats;

    let [max_pc, max_pr, max_pi, max_po] = &mut scratch.max.provinces;
    let [max_sc, max_sr, max_si, max_so] = &mut scratch.max.states;
    let [max_nc, max_nr, max_ni, max_no] = &mut scratch.max.nations;
    let [max_pop_issue, max_pop_ideology] = &mut scratch.max.pops;

    rayon::scope(move |s| {
        s.spawn(move |_| select_dominant(columns(provinces, cultures), max_pc, &mut province_culture[..land]));
        s.spawn(move |_| select_dominant(columns(provinces, religions), max_pr, &mut province_religion[..land]));
        s.spawn(move |_| select_dominant(columns(provinces, ideologies), max_pi, &mut province_ideology[..land]));
        s.spawn(move |_| select_dominant(columns(provinces, options), max_po, &mut province_issue[..land]));

        s.spawn(move |_| select_dominant(columns(states, cultures), max_sc, state_culture));
        s.spawn(move |_| select_dominant(columns(states, religions), max_sr, state_religion));
        s.spawn(move |_| select_dominant(columns(states, ideologies), max_si, state_ideology));
        s.spawn(move |_| select_dominant(columns(states, options), max_so, state_issue));

        s.spawn(move |_| select_dominant(columns(nations, cultures), max_nc, nation_culture));
        s.spawn(move |_| select_dominant(columns(nations, religions), max_nr, nation_religion));
        s.spawn(move |_| select_dominant(columns(nations, ideologies), max_ni, nation_ideology));
        s.spawn(move |_| select_dominant(columns(nations, options), max_no, nation_issue));

        s.spawn(move |_| {
            select_dominant_in_rows(pop_options.iter().copied(), rows, stride, max_pop_issue, pop_issue)
        });
        s.spawn(move |_| {
            select_dominant_in_rows(pop_ideologies.iter().copied(), rows, stride, max_pop_ideology, pop_ideology)
        });

        s.spawn(move |_| {
            hierarchy.sum(states.column(NON_COLONIAL_POPULATION_KEY), non_colonial_population)
        });
        s.spawn(move |_| match bureaucrats {
            Some(key) => hierarchy.sum(states.column(key), non_colonial_bureaucrats),
            None => non_colonial_bureaucrats.fill(0.0),
        });
    });
}

/// State-to-nation relations needed by the non-colonial sums
#[derive(Clone, Copy)]
struct NonColonial<'a> {
    nations: &'a [NationId],
    capitals: &'a [ProvinceId],
    colonial: &'a [bool],
}

impl NonColonial<'_> {
    fn sum(&self, state_column: &[f32], out: &mut [f32]) {
        non_colonial_total(state_column, self.nations, self.capitals, self.colonial, out);
    }
}
