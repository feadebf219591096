//! Defending unit profile

use crate::threshold::NO_ROLL;
use serde::{Deserialize, Serialize};

/// A defender with every threshold filled in (7 = none)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DefenderRecord")]
pub struct DefenderProfile {
    pub toughness: u32,
    pub armor_save: u8,
    pub invulnerable_save: u8,
    pub feel_no_pain: u8,
    /// Wounds per model
    pub wounds: u32,
}

/// Raw defender row as it comes out of a datasheet table.
/// Blank cells (missing or null) mean "no save" / "no feel-no-pain".
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DefenderRecord {
    pub toughness: u32,
    #[serde(default)]
    pub armor_save: Option<u8>,
    #[serde(default)]
    pub invulnerable_save: Option<u8>,
    #[serde(default)]
    pub feel_no_pain: Option<u8>,
    pub wounds: u32,
}

impl From<DefenderRecord> for DefenderProfile {
    fn from(record: DefenderRecord) -> Self {
        Self {
            toughness: record.toughness,
            armor_save: record.armor_save.unwrap_or(NO_ROLL),
            invulnerable_save: record.invulnerable_save.unwrap_or(NO_ROLL),
            feel_no_pain: record.feel_no_pain.unwrap_or(NO_ROLL),
            wounds: record.wounds,
        }
    }
}

impl DefenderProfile {
    /// A defender with only an armor save
    pub fn new(toughness: u32, armor_save: u8, wounds: u32) -> Self {
        Self {
            toughness,
            armor_save,
            invulnerable_save: NO_ROLL,
            feel_no_pain: NO_ROLL,
            wounds,
        }
    }

    pub fn with_invulnerable_save(mut self, invulnerable_save: u8) -> Self {
        self.invulnerable_save = invulnerable_save;
        self
    }

    pub fn with_feel_no_pain(mut self, feel_no_pain: u8) -> Self {
        self.feel_no_pain = feel_no_pain;
        self
    }
}
