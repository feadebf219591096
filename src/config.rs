//! Scenario files: one attacker profile plus a named defender table
//!
//! ```yaml
//! attacker:
//!   model_count: 10
//!   attacks: D3+1
//!   hit_threshold: 3
//!   strength: 4
//!   armor_penetration: 1
//!   damage: 2
//!   sustained_hits: D3
//! defenders:
//!   marine: { toughness: 4, armor_save: 3, wounds: 2 }
//!   terminator: { toughness: 5, armor_save: 2, invulnerable_save: 4, wounds: 3 }
//! ```

use crate::attacker::AttackerProfile;
use crate::defender::DefenderProfile;
use crate::error::{Error, Result};
use crate::threshold::{MIN_THRESHOLD, NO_ROLL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub attacker: AttackerProfile,
    #[serde(default)]
    pub defenders: BTreeMap<String, DefenderProfile>,
}

fn check_threshold(owner: &str, field: &str, value: u8) -> Result<()> {
    if (MIN_THRESHOLD..=NO_ROLL).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidProfile(format!(
            "{owner}: {field} must be between {MIN_THRESHOLD} and {NO_ROLL}, got {value}"
        )))
    }
}

impl ScenarioConfig {
    /// Load a scenario from a YAML or JSON file (picked by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let path_str = path.as_ref().to_string_lossy().to_lowercase();

        let config = if path_str.ends_with(".json") {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Look up one defender by name
    pub fn defender(&self, name: &str) -> Result<&DefenderProfile> {
        self.defenders
            .get(name)
            .ok_or_else(|| Error::UnknownDefender(name.to_string()))
    }

    /// Keep only the named defender
    pub fn only(&self, name: &str) -> Result<BTreeMap<String, DefenderProfile>> {
        let defender = self.defender(name)?;
        Ok(BTreeMap::from([(name.to_string(), *defender)]))
    }

    /// Check thresholds are legal and every dice field parses
    pub fn validate(&self) -> Result<()> {
        let a = &self.attacker;
        check_threshold("attacker", "hit_threshold", a.hit_threshold)?;
        check_threshold("attacker", "critical_hit", a.critical_hit)?;
        check_threshold("attacker", "critical_wound", a.critical_wound)?;
        a.attacks.expression()?;
        a.damage.expression()?;
        a.sustained_hits.expression()?;

        for (name, d) in &self.defenders {
            check_threshold(name, "armor_save", d.armor_save)?;
            check_threshold(name, "invulnerable_save", d.invulnerable_save)?;
            check_threshold(name, "feel_no_pain", d.feel_no_pain)?;
            if d.toughness == 0 {
                return Err(Error::InvalidProfile(format!("{name}: toughness must be positive")));
            }
            if d.wounds == 0 {
                return Err(Error::InvalidProfile(format!("{name}: wounds must be positive")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DiceValue;
    use crate::error::FormatError;

    const SCENARIO: &str = r#"
attacker:
  model_count: 10
  attacks: D3+1
  hit_threshold: 3
  strength: 4
  armor_penetration: 1
  damage: 2
  sustained_hits: D3
defenders:
  marine: { toughness: 4, armor_save: 3, wounds: 2 }
  terminator: { toughness: 5, armor_save: 2, invulnerable_save: 4, wounds: 3 }
"#;

    #[test]
    fn test_yaml_scenario() {
        let config = ScenarioConfig::from_yaml(SCENARIO).unwrap();
        config.validate().unwrap();

        assert_eq!(config.attacker.attacks, DiceValue::Notation("D3+1".to_string()));
        assert_eq!(config.attacker.damage, DiceValue::Constant(2));
        assert_eq!(config.defenders.len(), 2);
        assert_eq!(config.defender("marine").unwrap().invulnerable_save, 7);
        assert_eq!(config.defender("terminator").unwrap().invulnerable_save, 4);
    }

    #[test]
    fn test_unknown_defender() {
        let config = ScenarioConfig::from_yaml(SCENARIO).unwrap();
        assert!(matches!(config.defender("ork"), Err(Error::UnknownDefender(name)) if name == "ork"));
        assert_eq!(config.only("marine").unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let config = ScenarioConfig::from_yaml(
            "attacker: { hit_threshold: 9 }\ndefenders: {}\n",
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_rejects_zero_wounds() {
        let config = ScenarioConfig::from_yaml(
            "defenders:\n  ghost: { toughness: 3, armor_save: 4, wounds: 0 }\n",
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_rejects_bad_notation() {
        let config = ScenarioConfig::from_json(r#"{"attacker": {"damage": "heavy"}}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::Format(FormatError::MissingDiceMarker(_)))
        ));
    }
}
