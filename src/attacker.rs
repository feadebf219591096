//! Attacking weapon profile and its preset builders

use crate::dice::DiceValue;
use serde::{Deserialize, Serialize};

/// Everything the pipeline needs to know about one weapon fired by a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerProfile {
    /// Number of models firing the weapon
    pub model_count: u32,
    /// Attacks per model ("D3+1" or 2)
    pub attacks: DiceValue,
    /// Hit roll needed (3 means 3+, 7 never hits)
    pub hit_threshold: u8,
    pub strength: u32,
    /// Armor penetration (1 means AP-1), added to the defender's save
    pub armor_penetration: u8,
    /// Damage per failed save ("D6" or 2)
    pub damage: DiceValue,
    /// Hit roll that counts as a critical hit
    pub critical_hit: u8,
    /// Wound roll that counts as a critical wound
    pub critical_wound: u8,
    /// +1 makes wounding easier, -1 harder
    pub wound_modifier: i32,

    // Weapon abilities
    pub torrent: bool,
    pub reroll_hit_ones: bool,
    pub reroll_hit_all: bool,
    /// Extra hits per critical hit (0 for none)
    pub sustained_hits: DiceValue,
    pub lethal_hits: bool,
    pub reroll_wound_ones: bool,
    /// Twin-linked: reroll every failed wound
    pub reroll_wound_all: bool,
    pub devastating_wounds: bool,
    /// Reroll non-critical dice hunting for criticals instead of raw successes
    pub fish: bool,
}

impl Default for AttackerProfile {
    fn default() -> Self {
        Self {
            model_count: 1,
            attacks: DiceValue::Constant(1),
            hit_threshold: 4,
            strength: 4,
            armor_penetration: 0,
            damage: DiceValue::Constant(1),
            critical_hit: 6,
            critical_wound: 6,
            wound_modifier: 0,
            torrent: false,
            reroll_hit_ones: false,
            reroll_hit_all: false,
            sustained_hits: DiceValue::Constant(0),
            lethal_hits: false,
            reroll_wound_ones: false,
            reroll_wound_all: false,
            devastating_wounds: false,
            fish: false,
        }
    }
}

impl AttackerProfile {
    /// A plain weapon with no abilities, criticals on 6
    pub fn new(
        model_count: u32,
        attacks: impl Into<DiceValue>,
        hit_threshold: u8,
        strength: u32,
        damage: impl Into<DiceValue>,
    ) -> Self {
        Self {
            model_count,
            attacks: attacks.into(),
            hit_threshold,
            strength,
            damage: damage.into(),
            ..Self::default()
        }
    }

    pub fn with_armor_penetration(mut self, armor_penetration: u8) -> Self {
        self.armor_penetration = armor_penetration;
        self
    }

    pub fn with_critical_hit(mut self, critical_hit: u8) -> Self {
        self.critical_hit = critical_hit;
        self
    }

    pub fn with_critical_wound(mut self, critical_wound: u8) -> Self {
        self.critical_wound = critical_wound;
        self
    }

    pub fn with_wound_modifier(mut self, wound_modifier: i32) -> Self {
        self.wound_modifier = wound_modifier;
        self
    }

    pub fn with_torrent(mut self) -> Self {
        self.torrent = true;
        self
    }

    pub fn with_reroll_hit_ones(mut self) -> Self {
        self.reroll_hit_ones = true;
        self
    }

    pub fn with_reroll_hit_all(mut self) -> Self {
        self.reroll_hit_all = true;
        self
    }

    pub fn with_sustained_hits(mut self, amount: impl Into<DiceValue>) -> Self {
        self.sustained_hits = amount.into();
        self
    }

    pub fn with_lethal_hits(mut self) -> Self {
        self.lethal_hits = true;
        self
    }

    pub fn with_reroll_wound_ones(mut self) -> Self {
        self.reroll_wound_ones = true;
        self
    }

    pub fn with_twin(mut self) -> Self {
        self.reroll_wound_all = true;
        self
    }

    pub fn with_devastating_wounds(mut self) -> Self {
        self.devastating_wounds = true;
        self
    }

    pub fn with_fish(mut self) -> Self {
        self.fish = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let profile = AttackerProfile::new(5, "D3", 3, 5, 2)
            .with_armor_penetration(1)
            .with_sustained_hits("D3")
            .with_twin();

        assert_eq!(profile.model_count, 5);
        assert_eq!(profile.attacks, DiceValue::Notation("D3".to_string()));
        assert_eq!(profile.damage, DiceValue::Constant(2));
        assert_eq!(profile.armor_penetration, 1);
        assert!(profile.reroll_wound_all);
        assert!(!profile.reroll_hit_all);
        assert_eq!(profile.critical_hit, 6);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let profile: AttackerProfile =
            serde_yaml::from_str("model_count: 10\nattacks: D6\nlethal_hits: true\n").unwrap();

        assert_eq!(profile.model_count, 10);
        assert_eq!(profile.attacks, DiceValue::Notation("D6".to_string()));
        assert!(profile.lethal_hits);
        assert_eq!(profile.hit_threshold, 4);
        assert!(profile.sustained_hits.is_zero());
    }
}
