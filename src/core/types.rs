//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Declares a dense index newtype. Every entity and category in the world is
/// addressed by position in its store, so ids are only valid for the store
/// (and the scenario) they were issued by.
macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

dense_id!(
    /// Population group
    PopId
);
dense_id!(ProvinceId);
dense_id!(
    /// Instance of a regional state owned by one nation
    StateInstanceId
);
dense_id!(NationId);
dense_id!(IdeologyId);
dense_id!(IssueId);
dense_id!(IssueOptionId);
dense_id!(PopTypeId);
dense_id!(CultureId);
dense_id!(ReligionId);
dense_id!(MovementId);
dense_id!(PartyId);
dense_id!(
    /// Handle into the external trigger evaluator
    TriggerId
);

/// Simulated day counter
pub type Day = u64;

/// Economic class tier of a pop type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strata {
    Poor,
    Middle,
    Rich,
}

impl Strata {
    pub const ALL: [Strata; 3] = [Strata::Poor, Strata::Middle, Strata::Rich];
}

/// Category of a political issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Party,
    Political,
    Social,
    Economic,
    Military,
}
