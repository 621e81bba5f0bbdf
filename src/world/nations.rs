//! Nation and state-instance storage

use crate::core::types::{
    CultureId, IssueId, IssueOptionId, NationId, PartyId, ProvinceId, StateInstanceId,
};
use crate::world::modifiers::{ModifierTable, NationalModifier};
use crate::world::totals::DominantCategories;

/// State instances (a nation's share of a region)
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    pub nations: Vec<NationId>,
    pub capitals: Vec<ProvinceId>,
    pub dominant: DominantCategories,
}

impl StateStore {
    pub fn count(&self) -> usize {
        self.nations.len()
    }

    pub(crate) fn push(&mut self, nation: NationId, capital: ProvinceId) -> StateInstanceId {
        let id = StateInstanceId::new(self.count());
        self.nations.push(nation);
        self.capitals.push(capital);
        self.dominant.push();
        id
    }

    pub fn ids(&self) -> impl Iterator<Item = StateInstanceId> {
        (0..self.count()).map(StateInstanceId::new)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NationStore {
    pub primary_culture: Vec<Option<CultureId>>,
    pub accepted_cultures: Vec<Vec<CultureId>>,
    pub ruling_party: Vec<Option<PartyId>>,
    pub is_civilized: Vec<bool>,
    /// 0 to 10000
    pub plurality: Vec<f32>,
    /// Education budget slider, 0 to 100
    pub education_spending: Vec<u8>,
    /// Fraction of the budget actually funded
    pub spending_level: Vec<f32>,
    /// Current setting of each issue, indexed by issue
    pub issues: Vec<Vec<Option<IssueOptionId>>>,
    pub modifiers: ModifierTable<NationalModifier>,
    pub non_colonial_population: Vec<f32>,
    pub non_colonial_bureaucrats: Vec<f32>,
    pub dominant: DominantCategories,
}

impl NationStore {
    pub fn count(&self) -> usize {
        self.is_civilized.len()
    }

    pub(crate) fn push(&mut self, primary_culture: Option<CultureId>, civilized: bool) -> NationId {
        let id = NationId::new(self.count());
        self.primary_culture.push(primary_culture);
        self.accepted_cultures.push(Vec::new());
        self.ruling_party.push(None);
        self.is_civilized.push(civilized);
        self.plurality.push(0.0);
        self.education_spending.push(0);
        self.spending_level.push(1.0);
        self.issues.push(Vec::new());
        self.modifiers.push_row();
        self.non_colonial_population.push(0.0);
        self.non_colonial_bureaucrats.push(0.0);
        self.dominant.push();
        id
    }

    pub fn ids(&self) -> impl Iterator<Item = NationId> {
        (0..self.count()).map(NationId::new)
    }

    /// National modifier of an optional owner; unowned reads as zero
    #[inline]
    pub fn modifier(&self, nation: Option<NationId>, modifier: NationalModifier) -> f32 {
        nation.map_or(0.0, |n| self.modifiers.get(n.index(), modifier))
    }

    pub fn issue_setting(&self, nation: NationId, issue: IssueId) -> Option<IssueOptionId> {
        self.issues[nation.index()].get(issue.index()).copied().flatten()
    }

    pub fn set_issue(&mut self, nation: NationId, issue: IssueId, option: Option<IssueOptionId>) {
        let settings = &mut self.issues[nation.index()];
        if settings.len() <= issue.index() {
            settings.resize(issue.index() + 1, None);
        }
        settings[issue.index()] = option;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_owner_modifier_is_zero() {
        let mut store = NationStore::default();
        let nation = store.push(None, true);
        store.modifiers.set(nation.index(), NationalModifier::Separatism, 2.0);

        assert_eq!(store.modifier(Some(nation), NationalModifier::Separatism), 2.0);
        assert_eq!(store.modifier(None, NationalModifier::Separatism), 0.0);
    }

    #[test]
    fn test_issue_settings_grow() {
        let mut store = NationStore::default();
        let nation = store.push(None, true);

        assert_eq!(store.issue_setting(nation, IssueId(3)), None);
        store.set_issue(nation, IssueId(3), Some(IssueOptionId(7)));
        assert_eq!(store.issue_setting(nation, IssueId(3)), Some(IssueOptionId(7)));
        assert_eq!(store.issue_setting(nation, IssueId(0)), None);
    }
}
