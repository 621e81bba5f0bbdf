//! Seeded scenario and world generation
//!
//! Builds a synthetic but well-formed world for the demo binary, benches and
//! integration tests. The same config always yields the same world.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{DemographicsError, Result};
use crate::core::types::{
    CultureId, IdeologyId, IssueId, IssueType, MovementId, NationId, PartyId, PopId, PopTypeId,
    ProvinceId, ReligionId, Strata, TriggerId,
};
use crate::trigger::TriggerTable;
use crate::world::{NationalModifier, PopSpawn, PopType, ProvinceModifier, Scenario, World};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: u64,
    pub land_provinces: u32,
    pub sea_provinces: u32,
    pub nations: u32,
    pub provinces_per_state: u32,
    pub pops_per_province: u32,
    pub ideologies: u32,
    pub issues: u32,
    pub options_per_issue: u32,
    pub cultures: u32,
    pub religions: u32,
    /// Chance that a state-sized chunk of land is left without owner
    pub unowned_fraction: f32,
    pub colonial_fraction: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            land_provinces: 200,
            sea_provinces: 20,
            nations: 12,
            provinces_per_state: 4,
            pops_per_province: 12,
            ideologies: 6,
            issues: 8,
            options_per_issue: 4,
            cultures: 10,
            religions: 4,
            unowned_fraction: 0.05,
            colonial_fraction: 0.15,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pops_per_province > 0 && self.land_provinces == 0 {
            return Err(DemographicsError::InvalidConfig(
                "pops need at least one land province".into(),
            ));
        }
        if self.cultures == 0 || self.religions == 0 {
            return Err(DemographicsError::InvalidConfig(
                "at least one culture and one religion are required".into(),
            ));
        }
        if self.provinces_per_state == 0 {
            return Err(DemographicsError::InvalidConfig(
                "provinces_per_state must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.unowned_fraction)
            || !(0.0..=1.0).contains(&self.colonial_fraction)
        {
            return Err(DemographicsError::InvalidConfig(
                "fractions must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Pop types of a generated scenario with their spawn weights
const POP_TYPES: [(&str, Strata, bool, f32); 6] = [
    ("farmers", Strata::Poor, false, 0.45),
    ("labourers", Strata::Poor, true, 0.2),
    ("slaves", Strata::Poor, false, 0.05),
    ("clergymen", Strata::Middle, false, 0.06),
    ("bureaucrats", Strata::Middle, false, 0.04),
    ("capitalists", Strata::Rich, false, 0.2),
];

const ISSUE_TYPES: [IssueType; 5] = [
    IssueType::Party,
    IssueType::Political,
    IssueType::Social,
    IssueType::Economic,
    IssueType::Military,
];

/// Hands out trigger ids and records their fixed weights
struct TriggerBuilder {
    table: TriggerTable,
    next: u32,
}

impl TriggerBuilder {
    fn add(&mut self, weight: f32) -> TriggerId {
        let id = TriggerId(self.next);
        self.next += 1;
        self.table.set(id, weight);
        id
    }
}

/// Generate the scenario categories and their attraction triggers
pub fn generate_scenario(config: &GenerationConfig, rng: &mut ChaCha8Rng) -> Result<(Scenario, TriggerTable)> {
    let mut scenario = Scenario::new();
    let mut triggers = TriggerBuilder {
        table: TriggerTable::new(),
        next: 0,
    };

    for &(name, strata, unemployment, _) in &POP_TYPES {
        let pop_type = PopType::new(name, strata);
        scenario.add_pop_type(if unemployment {
            pop_type.with_unemployment()
        } else {
            pop_type
        });
    }
    scenario.roles.slaves = Some(PopTypeId(2));
    scenario.roles.clergy = Some(PopTypeId(3));
    scenario.roles.bureaucrat = Some(PopTypeId(4));

    for c in 0..config.cultures {
        scenario.add_culture(format!("Culture_{}", c));
    }
    for r in 0..config.religions {
        scenario.add_religion(format!("Religion_{}", r));
    }

    for i in 0..config.ideologies {
        // The last ideology only appeals in civilized nations
        let civilized_only = config.ideologies > 1 && i == config.ideologies - 1;
        let ideology = scenario.add_ideology(format!("Ideology_{}", i), civilized_only);
        scenario.add_party(format!("Party_{}", i), Some(ideology))?;
    }
    if config.ideologies > 0 {
        scenario.roles.conservative = Some(IdeologyId(0));
    }

    for i in 0..config.issues {
        let issue_type = ISSUE_TYPES[i as usize % ISSUE_TYPES.len()];
        let next_step_only = matches!(issue_type, IssueType::Political | IssueType::Social);
        let issue = scenario.add_issue(format!("Issue_{}", i), issue_type, next_step_only);
        for o in 0..config.options_per_issue {
            let allow = if o > 0 && rng.gen::<f32>() < 0.3 {
                let weight = if rng.gen::<f32>() < 0.6 { 1.0 } else { 0.0 };
                Some(triggers.add(weight))
            } else {
                None
            };
            let option = scenario.add_issue_option(issue, format!("Issue_{}_{}", i, o), allow)?;
            if next_step_only && o > 0 && rng.gen::<f32>() < 0.5 {
                scenario.add_movement(Some(option))?;
            }
        }
    }

    for pop_type in 0..POP_TYPES.len() {
        let pop_type = PopTypeId::new(pop_type);
        for ideology in scenario.ideology_ids().collect::<Vec<_>>() {
            let trigger = triggers.add(rng.gen_range(0.1..5.0));
            scenario.set_ideology_attraction(pop_type, ideology, Some(trigger))?;
        }
        for option in scenario.issue_option_ids().collect::<Vec<_>>() {
            // Some pop types are indifferent to some options
            if rng.gen::<f32>() < 0.8 {
                let trigger = triggers.add(rng.gen_range(0.1..5.0));
                scenario.set_issue_attraction(pop_type, option, Some(trigger))?;
            }
        }
    }

    Ok((scenario, triggers.table))
}

fn pick_pop_type(rng: &mut ChaCha8Rng) -> PopTypeId {
    let roll: f32 = rng.gen();
    let mut acc = 0.0;
    for (index, &(_, _, _, weight)) in POP_TYPES.iter().enumerate() {
        acc += weight;
        if roll < acc {
            return PopTypeId::new(index);
        }
    }
    PopTypeId::new(0)
}

/// Fill a pop's demographics row with random normalized support
fn seed_support(world: &mut World, pop: PopId, rng: &mut ChaCha8Rng) {
    let keys = *world.keys();
    let ideologies: Vec<_> = world.scenario.ideology_ids().collect();
    let weights: Vec<f32> = ideologies.iter().map(|_| rng.gen_range(0.0..1.0)).collect();
    let total: f32 = weights.iter().sum();
    if total > 0.0 {
        for (&ideology, weight) in ideologies.iter().zip(&weights) {
            world.pops.set_fraction(pop, keys.pop_ideology(ideology), weight / total);
        }
    }

    for issue in 0..world.scenario.issues.len() {
        let options = world.scenario.issues[issue].options.clone();
        let weights: Vec<f32> = options.iter().map(|_| rng.gen_range(0.0..1.0)).collect();
        // Each issue holds an equal share of the pop's issue support
        let total: f32 = weights.iter().sum::<f32>() * world.scenario.issues.len() as f32;
        if total > 0.0 {
            for (&option, weight) in options.iter().zip(&weights) {
                world.pops.set_fraction(pop, keys.pop_issue_option(option), weight / total);
            }
        }
    }
}

/// Generate a complete world and the trigger table its scenario refers to
pub fn generate_world(config: &GenerationConfig) -> Result<(World, TriggerTable)> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let (scenario, triggers) = generate_scenario(config, &mut rng)?;
    let party_count = scenario.parties.len();
    let movement_count = scenario.movements.len();
    let mut world = World::new(scenario);

    for _ in 0..config.land_provinces {
        let province = world.add_land_province(rng.gen_range(10.0..40.0))?;
        let modifiers = &mut world.provinces.modifiers;
        modifiers.set(province.index(), ProvinceModifier::LifeRating, rng.gen_range(-0.1..0.2));
        modifiers.set(province.index(), ProvinceModifier::PopMilitancy, rng.gen_range(-0.01..0.01));
        modifiers.set(province.index(), ProvinceModifier::PopulationGrowth, rng.gen_range(-0.0001..0.0001));
    }
    for _ in 0..config.sea_provinces {
        world.add_sea_province();
    }

    for _ in 0..config.nations {
        let culture = CultureId(rng.gen_range(0..config.cultures));
        let nation = world.add_nation(Some(culture), rng.gen::<f32>() < 0.7)?;
        let n = nation.index();

        if rng.gen::<f32>() < 0.5 {
            world.nations.accepted_cultures[n].push(CultureId(rng.gen_range(0..config.cultures)));
        }
        if party_count > 0 {
            world.set_ruling_party(nation, Some(PartyId::new(rng.gen_range(0..party_count))))?;
        }
        world.nations.plurality[n] = rng.gen_range(0.0..10000.0);
        world.nations.education_spending[n] = rng.gen_range(0..=100);
        world.nations.spending_level[n] = rng.gen_range(0.5..1.0);
        for issue in 0..world.scenario.issues.len() {
            let options = &world.scenario.issues[issue].options;
            if !options.is_empty() {
                let setting = options[rng.gen_range(0..options.len())];
                world.nations.set_issue(nation, IssueId::new(issue), Some(setting));
            }
        }

        let modifiers = &mut world.nations.modifiers;
        modifiers.set(n, NationalModifier::GlobalPopMilitancy, rng.gen_range(-0.005..0.005));
        modifiers.set(n, NationalModifier::Separatism, rng.gen_range(0.0..0.5));
        modifiers.set(n, NationalModifier::GlobalPopConsciousness, rng.gen_range(-0.005..0.005));
        modifiers.set(n, NationalModifier::EducationEfficiency, rng.gen_range(0.0..0.5));
        modifiers.set(n, NationalModifier::SocialReformDesire, rng.gen_range(0.0..0.3));
        modifiers.set(n, NationalModifier::PoliticalReformDesire, rng.gen_range(0.0..0.3));
        modifiers.set(n, NationalModifier::IssueChangeSpeed, rng.gen_range(-0.2..0.2));
        modifiers.set(n, NationalModifier::PopGrowth, rng.gen_range(-0.001..0.001));
    }

    if config.nations > 0 {
        let land: Vec<ProvinceId> = world.provinces.land_ids().collect();
        for (k, chunk) in land.chunks(config.provinces_per_state as usize).enumerate() {
            if rng.gen::<f32>() < config.unowned_fraction {
                continue;
            }
            let nation = NationId::new(k % config.nations as usize);
            world.add_state(nation, chunk)?;
            for &province in chunk {
                world.provinces.is_colonial[province.index()] =
                    rng.gen::<f32>() < config.colonial_fraction;
            }
        }
        if world.states.count() < world.nations.count() {
            tracing::warn!(
                states = world.states.count(),
                nations = world.nations.count(),
                "some nations own no states"
            );
        }
    }

    for province in world.provinces.land_ids().collect::<Vec<_>>() {
        let owner_culture = world.provinces.owners[province.index()]
            .and_then(|n| world.nations.primary_culture[n.index()]);
        for _ in 0..config.pops_per_province {
            let culture = match owner_culture {
                Some(culture) if rng.gen::<f32>() < 0.7 => culture,
                _ => CultureId(rng.gen_range(0..config.cultures)),
            };
            let religion = ReligionId(rng.gen_range(0..config.religions));
            let pop_type = pick_pop_type(&mut rng);
            let size = rng.gen_range(100.0..10000.0f32);

            let mut spawn = PopSpawn::new(province, pop_type, culture, religion, size);
            spawn.militancy = rng.gen_range(0.0..3.0);
            spawn.consciousness = rng.gen_range(0.0..3.0);
            spawn.literacy = rng.gen_range(0.05..0.6);
            spawn.life_needs = rng.gen_range(0.3..1.0);
            spawn.everyday_needs = rng.gen_range(0.0..1.0);
            spawn.luxury_needs = rng.gen_range(0.0..0.6);
            spawn.employment = size * rng.gen_range(0.6..1.0);
            spawn.social_reform_desire = rng.gen_range(0.0..0.3);
            spawn.political_reform_desire = rng.gen_range(0.0..0.3);
            if movement_count > 0 && rng.gen::<f32>() < 0.1 {
                spawn.movement = Some(MovementId::new(rng.gen_range(0..movement_count)));
            }

            let pop = world.add_pop(spawn)?;
            seed_support(&mut world, pop, &mut rng);
        }
    }

    tracing::debug!(
        seed = config.seed,
        pops = world.pops.count(),
        provinces = world.provinces.count(),
        states = world.states.count(),
        nations = world.nations.count(),
        triggers = triggers.len(),
        "generated world"
    );
    Ok((world, triggers))
}
