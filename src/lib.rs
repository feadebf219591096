//! Expected casualties for one attack in a dice-based skirmish wargame
//!
//! Given an attacking weapon profile and a defending unit profile, computes
//! the average number of models destroyed and the health left on the model
//! currently taking damage. Everything is closed-form probability; nothing is
//! rolled.

pub mod attacker;
pub mod casualty;
pub mod config;
pub mod defender;
pub mod dice;
pub mod error;
pub mod pipeline;
pub mod roster;
pub mod threshold;

#[cfg(feature = "python")]
mod python;

pub use attacker::AttackerProfile;
pub use casualty::{average_health_lost, average_models_destroyed, CombatResult};
pub use defender::DefenderProfile;
pub use dice::{
    critical_probability, evaluate_average, reroll_all_probability, reroll_ones_probability,
    success_probability, DiceExpression, DiceValue,
};
pub use error::{Error, FormatError, Result};
pub use pipeline::{resolve, trace, ResolutionState, StageTrace};
pub use threshold::{effective_save, wound_threshold};
