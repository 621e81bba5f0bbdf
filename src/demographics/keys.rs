//! Dense keyspaces for demographic quantities
//!
//! Two keyspaces map scenario categories onto small integer keys:
//!
//! - the per-pop keyspace (`PopDemographicsKey`): ideology support followed by
//!   issue-option support, stored as fractions on each pop
//! - the aggregate keyspace (`DemographicsKey`): a fixed block of special keys,
//!   then ideology, issue option, pop type, culture, religion and
//!   employment-by-pop-type totals, stored on provinces, states and nations
//!
//! Indices at or past `size()` are invalid. Table accessors check this with
//! `debug_assert!`; release builds rely on slice bounds checks only.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::types::{CultureId, IdeologyId, IssueOptionId, PopTypeId, ReligionId, Strata};
use crate::world::scenario::Scenario;

/// Number of hardcoded aggregate keys preceding the category keys
pub const COUNT_SPECIAL_KEYS: u32 = 23;

/// Number of hardcoded per-pop keys preceding the category keys
pub const COUNT_POP_SPECIAL_KEYS: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DemographicsKey(pub u32);

impl DemographicsKey {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PopDemographicsKey(pub u32);

impl PopDemographicsKey {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub const TOTAL: DemographicsKey = DemographicsKey(0);
pub const EMPLOYABLE: DemographicsKey = DemographicsKey(1);
pub const EMPLOYED: DemographicsKey = DemographicsKey(2);
pub const CONSCIOUSNESS: DemographicsKey = DemographicsKey(3);
pub const MILITANCY: DemographicsKey = DemographicsKey(4);
pub const LITERACY: DemographicsKey = DemographicsKey(5);
pub const POLITICAL_REFORM_DESIRE: DemographicsKey = DemographicsKey(6);
pub const SOCIAL_REFORM_DESIRE: DemographicsKey = DemographicsKey(7);
pub const POOR_MILITANCY: DemographicsKey = DemographicsKey(8);
pub const MIDDLE_MILITANCY: DemographicsKey = DemographicsKey(9);
pub const RICH_MILITANCY: DemographicsKey = DemographicsKey(10);
pub const POOR_LIFE_NEEDS: DemographicsKey = DemographicsKey(11);
pub const MIDDLE_LIFE_NEEDS: DemographicsKey = DemographicsKey(12);
pub const RICH_LIFE_NEEDS: DemographicsKey = DemographicsKey(13);
pub const POOR_EVERYDAY_NEEDS: DemographicsKey = DemographicsKey(14);
pub const MIDDLE_EVERYDAY_NEEDS: DemographicsKey = DemographicsKey(15);
pub const RICH_EVERYDAY_NEEDS: DemographicsKey = DemographicsKey(16);
pub const POOR_LUXURY_NEEDS: DemographicsKey = DemographicsKey(17);
pub const MIDDLE_LUXURY_NEEDS: DemographicsKey = DemographicsKey(18);
pub const RICH_LUXURY_NEEDS: DemographicsKey = DemographicsKey(19);
pub const POOR_TOTAL: DemographicsKey = DemographicsKey(20);
pub const MIDDLE_TOTAL: DemographicsKey = DemographicsKey(21);
pub const RICH_TOTAL: DemographicsKey = DemographicsKey(22);

fn strata_offset(strata: Strata) -> u32 {
    match strata {
        Strata::Poor => 0,
        Strata::Middle => 1,
        Strata::Rich => 2,
    }
}

pub fn strata_militancy(strata: Strata) -> DemographicsKey {
    DemographicsKey(POOR_MILITANCY.0 + strata_offset(strata))
}

pub fn strata_life_needs(strata: Strata) -> DemographicsKey {
    DemographicsKey(POOR_LIFE_NEEDS.0 + strata_offset(strata))
}

pub fn strata_everyday_needs(strata: Strata) -> DemographicsKey {
    DemographicsKey(POOR_EVERYDAY_NEEDS.0 + strata_offset(strata))
}

pub fn strata_luxury_needs(strata: Strata) -> DemographicsKey {
    DemographicsKey(POOR_LUXURY_NEEDS.0 + strata_offset(strata))
}

pub fn strata_total(strata: Strata) -> DemographicsKey {
    DemographicsKey(POOR_TOTAL.0 + strata_offset(strata))
}

/// What an aggregate key measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Special(DemographicsKey),
    Ideology(IdeologyId),
    IssueOption(IssueOptionId),
    PopType(PopTypeId),
    Culture(CultureId),
    Religion(ReligionId),
    Employment(PopTypeId),
}

/// What a per-pop key measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopKeyKind {
    Ideology(IdeologyId),
    IssueOption(IssueOptionId),
}

/// Category counts the keys are laid out from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keyspace {
    pub ideologies: u32,
    pub issue_options: u32,
    pub pop_types: u32,
    pub cultures: u32,
    pub religions: u32,
}

impl Keyspace {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            ideologies: scenario.ideologies.len() as u32,
            issue_options: scenario.issue_options.len() as u32,
            pop_types: scenario.pop_types.len() as u32,
            cultures: scenario.cultures.len() as u32,
            religions: scenario.religions.len() as u32,
        }
    }

    /// Categories the keyspace was laid out for
    ///
    /// Rules iterate these rather than the scenario, so categories registered
    /// after the last `World::rebuild_keyspace` stay out of every key range.
    pub fn ideology_ids(&self) -> impl Iterator<Item = IdeologyId> {
        (0..self.ideologies as usize).map(IdeologyId::new)
    }

    pub fn issue_option_ids(&self) -> impl Iterator<Item = IssueOptionId> {
        (0..self.issue_options as usize).map(IssueOptionId::new)
    }

    pub fn culture_ids(&self) -> impl Iterator<Item = CultureId> {
        (0..self.cultures as usize).map(CultureId::new)
    }

    pub fn religion_ids(&self) -> impl Iterator<Item = ReligionId> {
        (0..self.religions as usize).map(ReligionId::new)
    }

    // === PER-POP KEYSPACE ===

    pub fn pop_ideology(&self, ideology: IdeologyId) -> PopDemographicsKey {
        PopDemographicsKey(COUNT_POP_SPECIAL_KEYS + ideology.0)
    }

    pub fn pop_issue_option(&self, option: IssueOptionId) -> PopDemographicsKey {
        PopDemographicsKey(COUNT_POP_SPECIAL_KEYS + self.ideologies + option.0)
    }

    /// First index past the last per-pop key
    pub fn pop_size(&self) -> u32 {
        COUNT_POP_SPECIAL_KEYS + self.ideologies + self.issue_options
    }

    pub fn classify_pop(&self, key: PopDemographicsKey) -> Option<PopKeyKind> {
        let index = key.0.checked_sub(COUNT_POP_SPECIAL_KEYS)?;
        if index < self.ideologies {
            Some(PopKeyKind::Ideology(IdeologyId(index)))
        } else if index < self.ideologies + self.issue_options {
            Some(PopKeyKind::IssueOption(IssueOptionId(index - self.ideologies)))
        } else {
            None
        }
    }

    // === AGGREGATE KEYSPACE ===

    fn ideology_base(&self) -> u32 {
        COUNT_SPECIAL_KEYS
    }

    fn issue_option_base(&self) -> u32 {
        self.ideology_base() + self.ideologies
    }

    fn pop_type_base(&self) -> u32 {
        self.issue_option_base() + self.issue_options
    }

    fn culture_base(&self) -> u32 {
        self.pop_type_base() + self.pop_types
    }

    fn religion_base(&self) -> u32 {
        self.culture_base() + self.cultures
    }

    fn employment_base(&self) -> u32 {
        self.religion_base() + self.religions
    }

    pub fn ideology(&self, ideology: IdeologyId) -> DemographicsKey {
        DemographicsKey(self.ideology_base() + ideology.0)
    }

    pub fn issue_option(&self, option: IssueOptionId) -> DemographicsKey {
        DemographicsKey(self.issue_option_base() + option.0)
    }

    pub fn pop_type(&self, pop_type: PopTypeId) -> DemographicsKey {
        DemographicsKey(self.pop_type_base() + pop_type.0)
    }

    pub fn culture(&self, culture: CultureId) -> DemographicsKey {
        DemographicsKey(self.culture_base() + culture.0)
    }

    pub fn religion(&self, religion: ReligionId) -> DemographicsKey {
        DemographicsKey(self.religion_base() + religion.0)
    }

    pub fn employment(&self, pop_type: PopTypeId) -> DemographicsKey {
        DemographicsKey(self.employment_base() + pop_type.0)
    }

    /// First index past the last aggregate key
    pub fn size(&self) -> u32 {
        self.employment_base() + self.pop_types
    }

    pub fn ideology_range(&self) -> Range<u32> {
        self.ideology_base()..self.issue_option_base()
    }

    pub fn issue_option_range(&self) -> Range<u32> {
        self.issue_option_base()..self.pop_type_base()
    }

    pub fn pop_type_range(&self) -> Range<u32> {
        self.pop_type_base()..self.culture_base()
    }

    pub fn culture_range(&self) -> Range<u32> {
        self.culture_base()..self.religion_base()
    }

    pub fn religion_range(&self) -> Range<u32> {
        self.religion_base()..self.employment_base()
    }

    pub fn employment_range(&self) -> Range<u32> {
        self.employment_base()..self.size()
    }

    pub fn classify(&self, key: DemographicsKey) -> Option<KeyKind> {
        let k = key.0;
        if k < COUNT_SPECIAL_KEYS {
            Some(KeyKind::Special(key))
        } else if k < self.issue_option_base() {
            Some(KeyKind::Ideology(IdeologyId(k - self.ideology_base())))
        } else if k < self.pop_type_base() {
            Some(KeyKind::IssueOption(IssueOptionId(k - self.issue_option_base())))
        } else if k < self.culture_base() {
            Some(KeyKind::PopType(PopTypeId(k - self.pop_type_base())))
        } else if k < self.religion_base() {
            Some(KeyKind::Culture(CultureId(k - self.culture_base())))
        } else if k < self.employment_base() {
            Some(KeyKind::Religion(ReligionId(k - self.religion_base())))
        } else if k < self.size() {
            Some(KeyKind::Employment(PopTypeId(k - self.employment_base())))
        } else {
            None
        }
    }

    /// Move per-pop rows laid out for `old` into the layout of `self`
    ///
    /// Categories are only ever appended, so every old category still exists
    /// and keeps its index; new categories start at zero support.
    pub fn remap_pop_rows(&self, old: &Keyspace, rows: &[f32], pop_count: usize) -> Vec<f32> {
        let old_stride = old.pop_size() as usize;
        let new_stride = self.pop_size() as usize;
        let mut out = vec![0.0; pop_count * new_stride];

        for pop in 0..pop_count {
            let src = &rows[pop * old_stride..(pop + 1) * old_stride];
            let dst = &mut out[pop * new_stride..(pop + 1) * new_stride];

            for i in 0..old.ideologies.min(self.ideologies) {
                let id = IdeologyId(i);
                dst[self.pop_ideology(id).index()] = src[old.pop_ideology(id).index()];
            }
            for o in 0..old.issue_options.min(self.issue_options) {
                let id = IssueOptionId(o);
                dst[self.pop_issue_option(id).index()] = src[old.pop_issue_option(id).index()];
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Keyspace {
        Keyspace {
            ideologies: 4,
            issue_options: 6,
            pop_types: 3,
            cultures: 2,
            religions: 2,
        }
    }

    #[test]
    fn test_aggregate_layout_offsets() {
        let keys = sample();
        assert_eq!(keys.ideology(IdeologyId(0)), DemographicsKey(23));
        assert_eq!(keys.issue_option(IssueOptionId(0)), DemographicsKey(27));
        assert_eq!(keys.pop_type(PopTypeId(0)), DemographicsKey(33));
        assert_eq!(keys.culture(CultureId(1)), DemographicsKey(37));
        assert_eq!(keys.religion(ReligionId(0)), DemographicsKey(38));
        assert_eq!(keys.employment(PopTypeId(2)), DemographicsKey(42));
        assert_eq!(keys.size(), 43);
    }

    #[test]
    fn test_pop_layout_offsets() {
        let keys = sample();
        assert_eq!(keys.pop_ideology(IdeologyId(3)), PopDemographicsKey(3));
        assert_eq!(keys.pop_issue_option(IssueOptionId(0)), PopDemographicsKey(4));
        assert_eq!(keys.pop_size(), 10);
    }

    #[test]
    fn test_classify_inverts_key_functions() {
        let keys = sample();
        assert_eq!(keys.classify(MILITANCY), Some(KeyKind::Special(MILITANCY)));
        assert_eq!(
            keys.classify(keys.issue_option(IssueOptionId(5))),
            Some(KeyKind::IssueOption(IssueOptionId(5)))
        );
        assert_eq!(
            keys.classify(keys.employment(PopTypeId(1))),
            Some(KeyKind::Employment(PopTypeId(1)))
        );
        assert_eq!(keys.classify(DemographicsKey(keys.size())), None);
        assert_eq!(keys.classify_pop(PopDemographicsKey(keys.pop_size())), None);
    }

    #[test]
    fn test_strata_keys() {
        assert_eq!(strata_militancy(Strata::Rich), RICH_MILITANCY);
        assert_eq!(strata_life_needs(Strata::Middle), MIDDLE_LIFE_NEEDS);
        assert_eq!(strata_everyday_needs(Strata::Poor), POOR_EVERYDAY_NEEDS);
        assert_eq!(strata_luxury_needs(Strata::Rich), RICH_LUXURY_NEEDS);
        assert_eq!(strata_total(Strata::Rich), DemographicsKey(COUNT_SPECIAL_KEYS - 1));
    }

    #[test]
    fn test_remap_keeps_issue_support_after_new_ideology() {
        let old = Keyspace {
            ideologies: 1,
            issue_options: 2,
            ..Keyspace::default()
        };
        let new = Keyspace {
            ideologies: 2,
            ..old
        };
        // one pop: ideology 0 = 0.9, options = 0.3, 0.7
        let rows = vec![0.9, 0.3, 0.7];

        let remapped = new.remap_pop_rows(&old, &rows, 1);

        assert_eq!(remapped, vec![0.9, 0.0, 0.3, 0.7]);
    }
}
