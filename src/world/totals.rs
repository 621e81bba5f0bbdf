//! Aggregate demographic totals and dominant categories of containers

use crate::core::types::{CultureId, IdeologyId, IssueOptionId, ReligionId};
use crate::demographics::keys::DemographicsKey;

/// Key-major dense table: one column per aggregate key, one slot per container
///
/// Keeping every key in its own buffer lets the aggregator hand each key to a
/// separate task without any sharing between tasks.
#[derive(Debug, Clone, Default)]
pub struct DemographicsTable {
    columns: Vec<Vec<f32>>,
    len: usize,
}

impl DemographicsTable {
    pub fn new(key_count: usize, len: usize) -> Self {
        Self {
            columns: vec![vec![0.0; len]; key_count],
            len,
        }
    }

    /// Number of containers
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn key_count(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn get(&self, container: usize, key: DemographicsKey) -> f32 {
        debug_assert!(key.index() < self.columns.len(), "demographics key out of range");
        self.columns[key.index()][container]
    }

    pub fn set(&mut self, container: usize, key: DemographicsKey, value: f32) {
        debug_assert!(key.index() < self.columns.len(), "demographics key out of range");
        self.columns[key.index()][container] = value;
    }

    pub fn column(&self, key: DemographicsKey) -> &[f32] {
        &self.columns[key.index()]
    }

    pub fn columns_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.columns
    }

    /// Add a zeroed slot for a new container in every column
    pub fn push_container(&mut self) {
        for column in &mut self.columns {
            column.push(0.0);
        }
        self.len += 1;
    }

    /// Reshape to a new key count, discarding all totals
    pub fn reset_keys(&mut self, key_count: usize) {
        self.columns = vec![vec![0.0; self.len]; key_count];
    }
}

/// Running totals for every level of the location hierarchy
#[derive(Debug, Clone, Default)]
pub struct DemographicTotals {
    pub provinces: DemographicsTable,
    pub states: DemographicsTable,
    pub nations: DemographicsTable,
}

impl DemographicTotals {
    pub fn new(key_count: usize) -> Self {
        Self {
            provinces: DemographicsTable::new(key_count, 0),
            states: DemographicsTable::new(key_count, 0),
            nations: DemographicsTable::new(key_count, 0),
        }
    }

    pub fn reset_keys(&mut self, key_count: usize) {
        self.provinces.reset_keys(key_count);
        self.states.reset_keys(key_count);
        self.nations.reset_keys(key_count);
    }
}

/// Dominant category fields of one container level
#[derive(Debug, Clone, Default)]
pub struct DominantCategories {
    pub culture: Vec<Option<CultureId>>,
    pub religion: Vec<Option<ReligionId>>,
    pub ideology: Vec<Option<IdeologyId>>,
    pub issue_option: Vec<Option<IssueOptionId>>,
}

impl DominantCategories {
    pub fn push(&mut self) {
        self.culture.push(None);
        self.religion.push(None);
        self.ideology.push(None);
        self.issue_option.push(None);
    }
}
