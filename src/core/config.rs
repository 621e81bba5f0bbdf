//! Game-rule constants and cycle scheduling configuration
//!
//! All magic numbers of the demographic update rules are collected here with
//! the direction of their effect. Values can be overridden from a TOML file;
//! any key left out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DemographicsError, Result};

/// Constants read by the batched attribute updaters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defines {
    // === MILITANCY ===
    /// Applied to luxury satisfaction above 0.5 (negative calms pops)
    pub mil_has_luxury_need: f32,
    /// Applied to support for the conservative ideology
    pub mil_ideology: f32,
    /// Applied to support for the ruling party's ideology
    pub mil_ruling_party: f32,
    /// Applied to social plus political reform desire outside colonies
    pub mil_require_reform: f32,
    /// Base daily militancy for pops outside the primary/accepted cultures
    pub mil_non_accepted: f32,
    /// Applied to the life needs shortfall below 0.5
    pub mil_no_life_need: f32,
    /// Applied to the everyday needs shortfall below 0.5
    pub mil_lack_everyday_need: f32,
    /// Applied to everyday satisfaction above 0.5 (negative calms pops)
    pub mil_has_everyday_need: f32,

    // === CONSCIOUSNESS ===
    pub con_luxury_goods: f32,
    /// Clergy fraction multiplier for poor strata
    pub con_poor_clergy: f32,
    /// Clergy fraction multiplier for middle and rich strata
    pub con_midrich_clergy: f32,
    pub con_literacy: f32,
    /// Scales the literacy term for pops in colonial provinces
    pub con_colonial_factor: f32,

    // === LITERACY ===
    pub literacy_change_speed: f32,
    /// Clergy fraction at which education has no effect
    pub base_clergy_for_literacy: f32,
    /// Clergy fraction at which education reaches full effect
    pub max_clergy_for_literacy: f32,

    // === GROWTH ===
    /// Modified life rating a province needs before the growth bonus applies
    pub min_life_rating_for_growth: f32,
    pub life_rating_growth_bonus: f32,
    pub base_popgrowth: f32,
    /// Life needs satisfaction below which pops shrink
    pub life_need_starvation_limit: f32,
}

impl Default for Defines {
    fn default() -> Self {
        Self {
            mil_has_luxury_need: -0.1,
            mil_ideology: 0.05,
            mil_ruling_party: -0.05,
            mil_require_reform: 0.25,
            mil_non_accepted: 0.1,
            mil_no_life_need: 0.2,
            mil_lack_everyday_need: 0.1,
            mil_has_everyday_need: -0.05,

            con_luxury_goods: 0.1,
            con_poor_clergy: 0.3,
            con_midrich_clergy: 0.2,
            con_literacy: 0.0025,
            con_colonial_factor: 0.5,

            literacy_change_speed: 0.5,
            base_clergy_for_literacy: 0.005,
            max_clergy_for_literacy: 0.02,

            min_life_rating_for_growth: 30.0,
            life_rating_growth_bonus: 0.0001,
            base_popgrowth: 0.0001,
            life_need_starvation_limit: 0.5,
        }
    }
}

impl Defines {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let defines: Defines = toml::from_str(content)?;
        defines.validate()?;
        Ok(defines)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        // The literacy clergy term divides by this span
        if self.max_clergy_for_literacy <= self.base_clergy_for_literacy {
            return Err(DemographicsError::InvalidConfig(format!(
                "max_clergy_for_literacy ({}) must exceed base_clergy_for_literacy ({})",
                self.max_clergy_for_literacy, self.base_clergy_for_literacy
            )));
        }

        if self.literacy_change_speed < 0.0 {
            return Err(DemographicsError::InvalidConfig(
                "literacy_change_speed must not be negative".into(),
            ));
        }

        let all = [
            self.mil_has_luxury_need,
            self.mil_ideology,
            self.mil_ruling_party,
            self.mil_require_reform,
            self.mil_non_accepted,
            self.mil_no_life_need,
            self.mil_lack_everyday_need,
            self.mil_has_everyday_need,
            self.con_luxury_goods,
            self.con_poor_clergy,
            self.con_midrich_clergy,
            self.con_literacy,
            self.con_colonial_factor,
            self.min_life_rating_for_growth,
            self.life_rating_growth_bonus,
            self.base_popgrowth,
            self.life_need_starvation_limit,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(DemographicsError::InvalidConfig(
                "defines must all be finite".into(),
            ));
        }

        Ok(())
    }
}

/// How the daily cycle spreads the batched updaters over worker threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Number of staggered worker offsets per updater call
    ///
    /// Zero means one division per rayon worker thread.
    pub divisions: u32,

    /// Minimum pop count before the updaters run on the thread pool
    ///
    /// Below this the offsets run one after another on the calling thread.
    pub parallel_threshold: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            divisions: 0,
            parallel_threshold: 1000,
        }
    }
}

impl CycleConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Division count actually used for a cycle
    pub fn effective_divisions(&self) -> u32 {
        if self.divisions == 0 {
            rayon::current_num_threads().max(1) as u32
        } else {
            self.divisions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_defines_validate() {
        assert!(Defines::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let defines = Defines::from_toml_str("mil_ideology = 0.5\n").unwrap();
        assert_eq!(defines.mil_ideology, 0.5);
        assert_eq!(defines.base_popgrowth, Defines::default().base_popgrowth);
    }

    #[test]
    fn test_inverted_clergy_span_rejected() {
        let result = Defines::from_toml_str(
            "base_clergy_for_literacy = 0.05\nmax_clergy_for_literacy = 0.01\n",
        );
        assert!(matches!(result, Err(DemographicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = Defines::from_toml_str("mil_ideology = \"high\"");
        assert!(matches!(result, Err(DemographicsError::TomlError(_))));
    }

    #[test]
    fn test_cycle_config_explicit_divisions() {
        let config = CycleConfig::from_toml_str("divisions = 4").unwrap();
        assert_eq!(config.effective_divisions(), 4);
        assert_eq!(config.parallel_threshold, 1000);
    }

    #[test]
    fn test_cycle_config_zero_divisions_uses_pool() {
        let config = CycleConfig::default();
        assert!(config.effective_divisions() >= 1);
    }
}
