use thiserror::Error;

use crate::core::types::{
    CultureId, IdeologyId, IssueId, IssueOptionId, MovementId, NationId, PartyId, PopTypeId,
    ProvinceId, ReligionId, StateInstanceId,
};

#[derive(Error, Debug)]
pub enum DemographicsError {
    #[error("Province not found: {0:?}")]
    ProvinceNotFound(ProvinceId),

    #[error("Province {province:?} already belongs to state {state:?}")]
    ProvinceInState {
        province: ProvinceId,
        state: StateInstanceId,
    },

    #[error("Nation not found: {0:?}")]
    NationNotFound(NationId),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Pops cannot be placed in sea province {0:?}")]
    SeaProvince(ProvinceId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl DemographicsError {
    pub fn unknown_ideology(id: IdeologyId) -> Self {
        Self::UnknownCategory(format!("ideology {}", id.0))
    }

    pub fn unknown_issue(id: IssueId) -> Self {
        Self::UnknownCategory(format!("issue {}", id.0))
    }

    pub fn unknown_issue_option(id: IssueOptionId) -> Self {
        Self::UnknownCategory(format!("issue option {}", id.0))
    }

    pub fn unknown_pop_type(id: PopTypeId) -> Self {
        Self::UnknownCategory(format!("pop type {}", id.0))
    }

    pub fn unknown_culture(id: CultureId) -> Self {
        Self::UnknownCategory(format!("culture {}", id.0))
    }

    pub fn unknown_religion(id: ReligionId) -> Self {
        Self::UnknownCategory(format!("religion {}", id.0))
    }

    pub fn unknown_movement(id: MovementId) -> Self {
        Self::UnknownCategory(format!("movement {}", id.0))
    }

    pub fn unknown_party(id: PartyId) -> Self {
        Self::UnknownCategory(format!("party {}", id.0))
    }
}

pub type Result<T> = std::result::Result<T, DemographicsError>;
