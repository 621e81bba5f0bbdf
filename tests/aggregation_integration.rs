//! Integration tests for the hierarchical aggregator and dominant selection
//!
//! These tests verify:
//! - province totals of the size key equal the sizes of the pops located there
//! - state and nation totals equal the sums of their children for every key
//! - the aggregate keyspace tiles `[COUNT_SPECIAL_KEYS, size())` without gaps
//! - dominant-category ties resolve to the lower category index
//! - containers added after a regeneration get totals and dominants on the next one

use proptest::prelude::*;

use pop_demographics::core::types::{
    CultureId, IdeologyId, IssueOptionId, IssueType, NationId, PopTypeId, ProvinceId, ReligionId,
    StateInstanceId, Strata,
};
use pop_demographics::demographics::keys::{self, KeyKind, COUNT_SPECIAL_KEYS};
use pop_demographics::demographics::{regenerate_from_pop_data, DemographicsScratch, DemographicsKey};
use pop_demographics::world::{generate_world, GenerationConfig, PopSpawn, PopType, Scenario, World};

fn base_scenario() -> Scenario {
    let mut scenario = Scenario::new();
    scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
    scenario.add_pop_type(PopType::new("clerks", Strata::Middle).with_unemployment());
    scenario.add_culture("north");
    scenario.add_culture("south");
    scenario.add_religion("sun");
    scenario
}

#[test]
fn test_total_key_matches_pop_sizes() {
    let mut world = World::new(base_scenario());
    let provinces: Vec<ProvinceId> = (0..3)
        .map(|_| world.add_land_province(30.0).unwrap())
        .collect();
    let nation = world.add_nation(Some(CultureId(0)), true).unwrap();
    world.add_state(nation, &provinces[..2]).unwrap();
    world.add_state(nation, &provinces[2..]).unwrap();

    let placements = [(0, 100.0), (0, 250.0), (1, 40.0), (2, 7.5), (2, 2.5)];
    for (province, size) in placements {
        world
            .add_pop(PopSpawn::new(provinces[province], PopTypeId(0), CultureId(0), ReligionId(0), size))
            .unwrap();
    }

    let mut scratch = DemographicsScratch::new();
    regenerate_from_pop_data(&mut world, &mut scratch);

    assert_eq!(world.province_total(provinces[0], keys::TOTAL), 350.0);
    assert_eq!(world.province_total(provinces[1], keys::TOTAL), 40.0);
    assert_eq!(world.province_total(provinces[2], keys::TOTAL), 10.0);
    assert_eq!(world.nation_total(nation, keys::TOTAL), 400.0);
    assert_eq!(world.nations.non_colonial_population[0], 400.0);
}

#[test]
fn test_keyspace_ranges_tile_aggregate_keys() {
    let mut scenario = Scenario::new();
    for i in 0..4 {
        scenario.add_ideology(format!("ideology_{i}"), false);
    }
    let issue = scenario.add_issue("reform", IssueType::Political, false);
    for i in 0..6 {
        scenario.add_issue_option(issue, format!("option_{i}"), None).unwrap();
    }
    for (name, strata) in [("poor", Strata::Poor), ("middle", Strata::Middle), ("rich", Strata::Rich)] {
        scenario.add_pop_type(PopType::new(name, strata));
    }
    scenario.add_culture("a");
    scenario.add_culture("b");
    scenario.add_religion("x");
    scenario.add_religion("y");

    let world = World::new(scenario);
    let keyspace = world.keys();
    let ranges = [
        keyspace.ideology_range(),
        keyspace.issue_option_range(),
        keyspace.pop_type_range(),
        keyspace.culture_range(),
        keyspace.religion_range(),
        keyspace.employment_range(),
    ];
    let lengths: Vec<u32> = ranges.iter().map(|r| r.end - r.start).collect();
    assert_eq!(lengths, vec![4, 6, 3, 2, 2, 3]);

    assert_eq!(ranges[0].start, COUNT_SPECIAL_KEYS);
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(ranges[5].end, keyspace.size());
    assert_eq!(keyspace.size(), COUNT_SPECIAL_KEYS + 20);

    // Every key classifies back to the category it was issued for
    assert_eq!(keyspace.classify(keyspace.ideology(IdeologyId(3))), Some(KeyKind::Ideology(IdeologyId(3))));
    assert_eq!(
        keyspace.classify(keyspace.issue_option(IssueOptionId(5))),
        Some(KeyKind::IssueOption(IssueOptionId(5)))
    );
    assert_eq!(keyspace.classify(keyspace.employment(PopTypeId(2))), Some(KeyKind::Employment(PopTypeId(2))));
    assert_eq!(keyspace.classify(DemographicsKey(keyspace.size())), None);
}

#[test]
fn test_equal_culture_weight_keeps_lower_index() {
    let mut world = World::new(base_scenario());
    let province = world.add_land_province(30.0).unwrap();
    let nation = world.add_nation(Some(CultureId(1)), true).unwrap();
    world.add_state(nation, &[province]).unwrap();
    for culture in [CultureId(1), CultureId(0)] {
        world
            .add_pop(PopSpawn::new(province, PopTypeId(0), culture, ReligionId(0), 500.0))
            .unwrap();
    }

    let mut scratch = DemographicsScratch::new();
    regenerate_from_pop_data(&mut world, &mut scratch);

    assert_eq!(world.provinces.dominant.culture[0], Some(CultureId(0)));
    assert_eq!(world.states.dominant.culture[0], Some(CultureId(0)));
    assert_eq!(world.nations.dominant.culture[0], Some(CultureId(0)));
}

#[test]
fn test_larger_weight_displaces_dominant_culture() {
    let mut world = World::new(base_scenario());
    let province = world.add_land_province(30.0).unwrap();
    world
        .add_pop(PopSpawn::new(province, PopTypeId(0), CultureId(0), ReligionId(0), 500.0))
        .unwrap();
    let newcomer = world
        .add_pop(PopSpawn::new(province, PopTypeId(0), CultureId(1), ReligionId(0), 100.0))
        .unwrap();

    let mut scratch = DemographicsScratch::new();
    regenerate_from_pop_data(&mut world, &mut scratch);
    assert_eq!(world.provinces.dominant.culture[0], Some(CultureId(0)));

    world.pops.sizes[newcomer.index()] = 900.0;
    regenerate_from_pop_data(&mut world, &mut scratch);
    assert_eq!(world.provinces.dominant.culture[0], Some(CultureId(1)));
}

#[test]
fn test_regenerate_covers_containers_added_later() {
    let mut world = World::new(base_scenario());
    let first = world.add_land_province(30.0).unwrap();
    let old_nation = world.add_nation(Some(CultureId(0)), true).unwrap();
    world.add_state(old_nation, &[first]).unwrap();
    world
        .add_pop(PopSpawn::new(first, PopTypeId(0), CultureId(0), ReligionId(0), 250.0))
        .unwrap();

    let mut scratch = DemographicsScratch::new();
    regenerate_from_pop_data(&mut world, &mut scratch);
    assert_eq!(scratch.max.nations[0].len(), 1);

    let second = world.add_land_province(30.0).unwrap();
    let nation = world.add_nation(Some(CultureId(1)), true).unwrap();
    let state = world.add_state(nation, &[second]).unwrap();
    for (culture, size) in [(CultureId(1), 300.0), (CultureId(0), 100.0)] {
        world
            .add_pop(PopSpawn::new(second, PopTypeId(1), culture, ReligionId(0), size))
            .unwrap();
    }
    regenerate_from_pop_data(&mut world, &mut scratch);

    assert_eq!(nation, NationId(1));
    assert_eq!(state, StateInstanceId(1));
    assert!(scratch.max.nations[0].len() >= 2);
    assert!(scratch.max.provinces[0].len() >= 2);

    assert_eq!(world.provinces.dominant.culture[second.index()], Some(CultureId(1)));
    assert_eq!(world.states.dominant.culture[state.index()], Some(CultureId(1)));
    assert_eq!(world.nations.dominant.culture[nation.index()], Some(CultureId(1)));
    assert_eq!(world.nations.dominant.religion[nation.index()], Some(ReligionId(0)));

    assert_eq!(world.province_total(second, keys::TOTAL), 400.0);
    assert_eq!(world.state_total(state, keys::TOTAL), 400.0);
    assert_eq!(world.nation_total(nation, keys::TOTAL), 400.0);
    assert_eq!(world.nation_total(nation, world.keys().culture(CultureId(0))), 100.0);
    assert_eq!(world.nations.non_colonial_population[nation.index()], 400.0);

    // The first nation is unchanged
    assert_eq!(world.nation_total(old_nation, keys::TOTAL), 250.0);
    assert_eq!(world.nations.dominant.culture[old_nation.index()], Some(CultureId(0)));
    assert_hierarchy_consistent(&world);
}

fn assert_hierarchy_consistent(world: &World) {
    let key_count = world.keys().size();
    for k in 0..key_count {
        let key = DemographicsKey(k);
        let mut state_sums = vec![0.0f64; world.states.count()];
        for province in world.provinces.land_ids() {
            if let Some(state) = world.provinces.state_membership[province.index()] {
                state_sums[state.index()] += world.province_total(province, key) as f64;
            }
        }
        for state in world.states.ids() {
            let total = world.state_total(state, key) as f64;
            let expected = state_sums[state.index()];
            assert!(
                (total - expected).abs() <= 1e-3 * expected.abs().max(1.0),
                "state {:?} key {}: {} != {}",
                state,
                k,
                total,
                expected
            );
        }

        let mut nation_sums = vec![0.0f64; world.nations.count()];
        for state in world.states.ids() {
            nation_sums[world.states.nations[state.index()].index()] += world.state_total(state, key) as f64;
        }
        for nation in world.nations.ids() {
            let total = world.nation_total(nation, key) as f64;
            let expected = nation_sums[nation.index()];
            assert!(
                (total - expected).abs() <= 1e-3 * expected.abs().max(1.0),
                "nation {:?} key {}: {} != {}",
                nation,
                k,
                total,
                expected
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn proptest_totals_roll_up_consistently(
        seed in any::<u64>(),
        land_provinces in 1u32..40,
        nations in 1u32..6,
        pops_per_province in 0u32..6,
    ) {
        let config = GenerationConfig {
            seed,
            land_provinces,
            sea_provinces: 2,
            nations,
            pops_per_province,
            ..Default::default()
        };
        let (mut world, _) = generate_world(&config).unwrap();
        let mut scratch = DemographicsScratch::new();
        regenerate_from_pop_data(&mut world, &mut scratch);

        assert_hierarchy_consistent(&world);

        let population: f64 = world
            .provinces
            .land_ids()
            .map(|p| world.province_total(p, keys::TOTAL) as f64)
            .sum();
        prop_assert!((population - world.population()).abs() <= 1e-3 * world.population().max(1.0));
    }
}
