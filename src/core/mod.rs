pub mod config;
pub mod error;
pub mod types;

pub use config::{CycleConfig, Defines};
pub use error::{DemographicsError, Result};
