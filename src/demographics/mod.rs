//! Demographics engine
//!
//! Daily pipeline over the world store:
//! - keyspace allocation for aggregate and per-pop demographic keys
//! - hierarchical roll-up of per-pop values into province, state and nation totals
//! - dominant-category selection
//! - batched per-pop updaters (militancy, consciousness, literacy, ideology and
//!   issue support, growth) run as staggered disjoint blocks
//! - removal of pops that have shrunk away

pub mod aggregate;
pub mod attraction;
pub mod batch;
pub mod consciousness;
pub mod culture;
pub mod dominant;
pub mod growth;
pub mod ideology;
pub mod issues;
pub mod keys;
pub mod lifecycle;
pub mod literacy;
pub mod militancy;
pub mod scratch;
pub mod special;
pub mod staggered;

pub use aggregate::{aggregate_all_keys, regenerate_from_pop_data, sum_over_demographics};
pub use consciousness::{update_consciousness, update_consciousness_parallel};
pub use culture::regenerate_is_primary_or_accepted;
pub use dominant::regenerate_dominant_categories;
pub use growth::{update_growth, update_growth_parallel};
pub use ideology::{update_ideologies, update_ideologies_parallel};
pub use issues::{update_issues, update_issues_parallel};
pub use keys::{DemographicsKey, Keyspace, PopDemographicsKey};
pub use lifecycle::remove_size_zero_pops;
pub use literacy::{update_literacy, update_literacy_parallel};
pub use militancy::{update_militancy, update_militancy_parallel};
pub use scratch::DemographicsScratch;
pub use staggered::execute_staggered_blocks;
