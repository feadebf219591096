//! One attacker against a whole table of defenders

use crate::attacker::AttackerProfile;
use crate::defender::DefenderProfile;
use crate::error::FormatError;
use crate::pipeline::resolve;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result row for one defender
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupReport {
    pub defender: String,
    pub wounds_per_model: u32,
    pub models_destroyed: f64,
    pub remaining_health: f64,
    /// Destroyed models plus the lost fraction of the damaged one
    pub average_models_lost: f64,
    pub average_health_lost: f64,
}

fn evaluate_one(
    attacker: &AttackerProfile,
    name: &str,
    defender: &DefenderProfile,
) -> Result<MatchupReport, FormatError> {
    let result = resolve(attacker, defender)?;
    let wounds = defender.wounds as f64;

    Ok(MatchupReport {
        defender: name.to_string(),
        wounds_per_model: defender.wounds,
        models_destroyed: result.average_models_destroyed,
        remaining_health: result.average_remaining_health,
        average_models_lost: result.average_total_models_lost(wounds),
        average_health_lost: result.average_health_lost(wounds),
    })
}

/// Evaluate every defender, one after the other
pub fn evaluate_sequential(
    attacker: &AttackerProfile,
    defenders: &BTreeMap<String, DefenderProfile>,
) -> Result<Vec<MatchupReport>, FormatError> {
    defenders
        .iter()
        .map(|(name, defender)| evaluate_one(attacker, name, defender))
        .collect()
}

/// Evaluate every defender across the rayon pool
pub fn evaluate_parallel(
    attacker: &AttackerProfile,
    defenders: &BTreeMap<String, DefenderProfile>,
) -> Result<Vec<MatchupReport>, FormatError> {
    defenders
        .par_iter()
        .map(|(name, defender)| evaluate_one(attacker, name, defender))
        .collect()
}

/// Reports ordered by defender name
pub fn evaluate_roster(
    attacker: &AttackerProfile,
    defenders: &BTreeMap<String, DefenderProfile>,
    parallel: bool,
) -> Result<Vec<MatchupReport>, FormatError> {
    if parallel {
        evaluate_parallel(attacker, defenders)
    } else {
        evaluate_sequential(attacker, defenders)
    }
}
