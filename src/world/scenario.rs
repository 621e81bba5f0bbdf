//! Scenario-defined demographic categories
//!
//! Ideologies, issues, pop types, cultures and religions are registered once at
//! load time. Registration order is category index order, which is also the
//! order dominant-category ties are broken in.

use serde::{Deserialize, Serialize};

use crate::core::error::{DemographicsError, Result};
use crate::core::types::{
    CultureId, IdeologyId, IssueId, IssueOptionId, IssueType, MovementId, PartyId, PopTypeId,
    ReligionId, Strata, TriggerId,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ideology {
    pub name: String,
    /// Only ideologies past their enable date attract support
    pub enabled: bool,
    /// Pops of uncivilized nations never feel attraction to these
    pub civilized_only: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub name: String,
    pub issue_type: IssueType,
    /// Only the options next to the current setting can gain support
    pub next_step_only: bool,
    /// Options in their ladder order
    pub options: Vec<IssueOptionId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueOption {
    pub name: String,
    pub parent: IssueId,
    /// Nation-scoped condition for the option to be attractive at all
    pub allow: Option<TriggerId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopType {
    pub name: String,
    pub strata: Strata,
    /// Whether employment is tracked separately from size
    pub has_unemployment: bool,
    /// Multiplicative attraction per ideology (indexed by ideology)
    pub ideology_attraction: Vec<Option<TriggerId>>,
    /// Multiplicative attraction per issue option (indexed by issue option)
    pub issue_attraction: Vec<Option<TriggerId>>,
}

impl PopType {
    pub fn new(name: impl Into<String>, strata: Strata) -> Self {
        Self {
            name: name.into(),
            strata,
            has_unemployment: false,
            ideology_attraction: Vec::new(),
            issue_attraction: Vec::new(),
        }
    }

    pub fn with_unemployment(mut self) -> Self {
        self.has_unemployment = true;
        self
    }

    pub fn ideology_trigger(&self, ideology: IdeologyId) -> Option<TriggerId> {
        self.ideology_attraction.get(ideology.index()).copied().flatten()
    }

    pub fn issue_trigger(&self, option: IssueOptionId) -> Option<TriggerId> {
        self.issue_attraction.get(option.index()).copied().flatten()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Culture {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Religion {
    pub name: String,
}

/// A political movement pops can join
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub associated_issue_option: Option<IssueOptionId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoliticalParty {
    pub name: String,
    pub ideology: Option<IdeologyId>,
}

/// Categories with hardcoded meaning in the update rules
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoryRoles {
    pub conservative: Option<IdeologyId>,
    pub clergy: Option<PopTypeId>,
    pub bureaucrat: Option<PopTypeId>,
    pub slaves: Option<PopTypeId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub ideologies: Vec<Ideology>,
    pub issues: Vec<Issue>,
    pub issue_options: Vec<IssueOption>,
    pub pop_types: Vec<PopType>,
    pub cultures: Vec<Culture>,
    pub religions: Vec<Religion>,
    pub movements: Vec<Movement>,
    pub parties: Vec<PoliticalParty>,
    pub roles: CategoryRoles,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ideology(&mut self, name: impl Into<String>, civilized_only: bool) -> IdeologyId {
        let id = IdeologyId::new(self.ideologies.len());
        self.ideologies.push(Ideology {
            name: name.into(),
            enabled: true,
            civilized_only,
        });
        id
    }

    pub fn add_issue(
        &mut self,
        name: impl Into<String>,
        issue_type: IssueType,
        next_step_only: bool,
    ) -> IssueId {
        let id = IssueId::new(self.issues.len());
        self.issues.push(Issue {
            name: name.into(),
            issue_type,
            next_step_only,
            options: Vec::new(),
        });
        id
    }

    /// Register an option at the end of its issue's ladder
    pub fn add_issue_option(
        &mut self,
        issue: IssueId,
        name: impl Into<String>,
        allow: Option<TriggerId>,
    ) -> Result<IssueOptionId> {
        let id = IssueOptionId::new(self.issue_options.len());
        let parent = self
            .issues
            .get_mut(issue.index())
            .ok_or_else(|| DemographicsError::unknown_issue(issue))?;
        parent.options.push(id);
        self.issue_options.push(IssueOption {
            name: name.into(),
            parent: issue,
            allow,
        });
        Ok(id)
    }

    pub fn add_pop_type(&mut self, pop_type: PopType) -> PopTypeId {
        let id = PopTypeId::new(self.pop_types.len());
        self.pop_types.push(pop_type);
        id
    }

    pub fn add_culture(&mut self, name: impl Into<String>) -> CultureId {
        let id = CultureId::new(self.cultures.len());
        self.cultures.push(Culture { name: name.into() });
        id
    }

    pub fn add_religion(&mut self, name: impl Into<String>) -> ReligionId {
        let id = ReligionId::new(self.religions.len());
        self.religions.push(Religion { name: name.into() });
        id
    }

    pub fn add_movement(&mut self, associated_issue_option: Option<IssueOptionId>) -> Result<MovementId> {
        if let Some(option) = associated_issue_option {
            self.check_issue_option(option)?;
        }
        let id = MovementId::new(self.movements.len());
        self.movements.push(Movement {
            associated_issue_option,
        });
        Ok(id)
    }

    pub fn add_party(&mut self, name: impl Into<String>, ideology: Option<IdeologyId>) -> Result<PartyId> {
        if let Some(ideology) = ideology {
            self.check_ideology(ideology)?;
        }
        let id = PartyId::new(self.parties.len());
        self.parties.push(PoliticalParty {
            name: name.into(),
            ideology,
        });
        Ok(id)
    }

    /// Set the attraction trigger of a pop type towards an ideology
    pub fn set_ideology_attraction(
        &mut self,
        pop_type: PopTypeId,
        ideology: IdeologyId,
        trigger: Option<TriggerId>,
    ) -> Result<()> {
        self.check_ideology(ideology)?;
        let count = self.ideologies.len();
        let slots = &mut self.pop_type_mut(pop_type)?.ideology_attraction;
        if slots.len() < count {
            slots.resize(count, None);
        }
        slots[ideology.index()] = trigger;
        Ok(())
    }

    /// Set the attraction trigger of a pop type towards an issue option
    pub fn set_issue_attraction(
        &mut self,
        pop_type: PopTypeId,
        option: IssueOptionId,
        trigger: Option<TriggerId>,
    ) -> Result<()> {
        self.check_issue_option(option)?;
        let count = self.issue_options.len();
        let slots = &mut self.pop_type_mut(pop_type)?.issue_attraction;
        if slots.len() < count {
            slots.resize(count, None);
        }
        slots[option.index()] = trigger;
        Ok(())
    }

    fn check_ideology(&self, ideology: IdeologyId) -> Result<()> {
        if ideology.index() < self.ideologies.len() {
            Ok(())
        } else {
            Err(DemographicsError::unknown_ideology(ideology))
        }
    }

    fn check_issue_option(&self, option: IssueOptionId) -> Result<()> {
        if option.index() < self.issue_options.len() {
            Ok(())
        } else {
            Err(DemographicsError::unknown_issue_option(option))
        }
    }

    fn pop_type_mut(&mut self, pop_type: PopTypeId) -> Result<&mut PopType> {
        self.pop_types
            .get_mut(pop_type.index())
            .ok_or_else(|| DemographicsError::unknown_pop_type(pop_type))
    }

    pub fn ideology(&self, id: IdeologyId) -> &Ideology {
        &self.ideologies[id.index()]
    }

    pub fn issue(&self, id: IssueId) -> &Issue {
        &self.issues[id.index()]
    }

    pub fn issue_option(&self, id: IssueOptionId) -> &IssueOption {
        &self.issue_options[id.index()]
    }

    pub fn pop_type(&self, id: PopTypeId) -> &PopType {
        &self.pop_types[id.index()]
    }

    /// Type of the issue an option belongs to
    pub fn option_issue_type(&self, option: IssueOptionId) -> IssueType {
        self.issue(self.issue_option(option).parent).issue_type
    }

    /// Ladder position of an option within its parent issue
    pub fn option_position(&self, option: IssueOptionId) -> Option<usize> {
        let parent = self.issue_option(option).parent;
        self.issue(parent).options.iter().position(|&o| o == option)
    }

    pub fn ideology_ids(&self) -> impl Iterator<Item = IdeologyId> {
        (0..self.ideologies.len()).map(IdeologyId::new)
    }

    pub fn issue_option_ids(&self) -> impl Iterator<Item = IssueOptionId> {
        (0..self.issue_options.len()).map(IssueOptionId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_options_register_in_ladder_order() {
        let mut scenario = Scenario::new();
        let slavery = scenario.add_issue("slavery", IssueType::Social, false);
        let tariffs = scenario.add_issue("tariffs", IssueType::Economic, true);
        let a = scenario.add_issue_option(slavery, "yes", None).unwrap();
        let b = scenario.add_issue_option(tariffs, "low", None).unwrap();
        let c = scenario.add_issue_option(tariffs, "high", None).unwrap();

        assert_eq!(scenario.issue(tariffs).options, vec![b, c]);
        assert_eq!(scenario.option_position(c), Some(1));
        assert_eq!(scenario.option_position(a), Some(0));
        assert_eq!(scenario.option_issue_type(a), IssueType::Social);
    }

    #[test]
    fn test_attraction_slots_grow_on_demand() {
        let mut scenario = Scenario::new();
        let farmers = scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        scenario.add_ideology("conservative", false);
        let liberal = scenario.add_ideology("liberal", false);

        scenario.set_ideology_attraction(farmers, liberal, Some(TriggerId(3))).unwrap();

        let pop_type = scenario.pop_type(farmers);
        assert_eq!(pop_type.ideology_trigger(liberal), Some(TriggerId(3)));
        assert_eq!(pop_type.ideology_trigger(IdeologyId(0)), None);
        // Out-of-range lookups read as "no trigger"
        assert_eq!(pop_type.ideology_trigger(IdeologyId(9)), None);
    }

    #[test]
    fn test_builders_reject_unknown_ids() {
        let mut scenario = Scenario::new();
        let farmers = scenario.add_pop_type(PopType::new("farmers", Strata::Poor));
        let ideology = scenario.add_ideology("conservative", false);

        assert!(scenario.add_issue_option(IssueId(0), "free", None).is_err());
        assert!(scenario.issue_options.is_empty());
        assert!(scenario.set_ideology_attraction(PopTypeId(7), ideology, None).is_err());
        assert!(scenario.set_ideology_attraction(farmers, IdeologyId(4), None).is_err());
        assert!(scenario.set_issue_attraction(farmers, IssueOptionId(0), None).is_err());
        assert!(scenario.add_movement(Some(IssueOptionId(2))).is_err());
        assert!(scenario.add_party("radicals", Some(IdeologyId(9))).is_err());

        let err = scenario.add_issue_option(IssueId(3), "free", None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown category: issue 3");
    }
}
