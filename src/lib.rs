//! Pop Demographics - population aggregation and daily update engine
//!
//! Rolls per-pop values up the province, state and nation hierarchy, selects
//! dominant categories, and runs the batched daily updaters for militancy,
//! consciousness, literacy, ideology and issue support and growth.

pub mod core;
pub mod demographics;
pub mod simulation;
pub mod trigger;
pub mod world;
