//! Python bindings using PyO3

use crate::attacker::AttackerProfile;
use crate::casualty;
use crate::config::ScenarioConfig;
use crate::defender::DefenderProfile;
use crate::dice::DiceValue;
use crate::pipeline;
use crate::roster::evaluate_roster;
use crate::threshold::NO_ROLL;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// Accept either an int or a dice notation string
fn dice_field(value: &Bound<'_, PyAny>) -> PyResult<DiceValue> {
    if let Ok(v) = value.extract::<i32>() {
        return Ok(DiceValue::Constant(v));
    }
    let text: String = value.extract()?;
    Ok(DiceValue::Notation(text))
}

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Expected (models destroyed, remaining health) for one attacker/defender pair.
/// A bad dice entry raises ValueError.
#[pyfunction]
#[pyo3(signature = (
    model_count, attacks, hit_threshold, strength, damage,
    toughness, wounds, armor_save=None, invulnerable_save=None, feel_no_pain=None,
    armor_penetration=0, critical_hit=6, critical_wound=6, wound_modifier=0,
    torrent=false, reroll_hit_ones=false, reroll_hit_all=false, sustained_hits=None,
    lethal_hits=false, reroll_wound_ones=false, twin=false, devastating_wounds=false, fish=false
))]
#[allow(clippy::too_many_arguments)]
fn resolve(
    py: Python<'_>,
    model_count: u32,
    attacks: &Bound<'_, PyAny>,
    hit_threshold: u8,
    strength: u32,
    damage: &Bound<'_, PyAny>,
    toughness: u32,
    wounds: u32,
    armor_save: Option<u8>,
    invulnerable_save: Option<u8>,
    feel_no_pain: Option<u8>,
    armor_penetration: u8,
    critical_hit: u8,
    critical_wound: u8,
    wound_modifier: i32,
    torrent: bool,
    reroll_hit_ones: bool,
    reroll_hit_all: bool,
    sustained_hits: Option<&Bound<'_, PyAny>>,
    lethal_hits: bool,
    reroll_wound_ones: bool,
    twin: bool,
    devastating_wounds: bool,
    fish: bool,
) -> PyResult<(f64, f64)> {
    let attacker = AttackerProfile {
        model_count,
        attacks: dice_field(attacks)?,
        hit_threshold,
        strength,
        armor_penetration,
        damage: dice_field(damage)?,
        critical_hit,
        critical_wound,
        wound_modifier,
        torrent,
        reroll_hit_ones,
        reroll_hit_all,
        sustained_hits: sustained_hits.map(dice_field).transpose()?.unwrap_or_default(),
        lethal_hits,
        reroll_wound_ones,
        reroll_wound_all: twin,
        devastating_wounds,
        fish,
    };
    let defender = DefenderProfile {
        toughness,
        armor_save: armor_save.unwrap_or(NO_ROLL),
        invulnerable_save: invulnerable_save.unwrap_or(NO_ROLL),
        feel_no_pain: feel_no_pain.unwrap_or(NO_ROLL),
        wounds,
    };

    let result = py
        .allow_threads(|| pipeline::resolve(&attacker, &defender))
        .map_err(value_error)?;
    Ok((result.average_models_destroyed, result.average_remaining_health))
}

#[pyfunction]
fn average_models_destroyed(kill_count: f64, remaining_health: f64, wounds_per_model: f64) -> f64 {
    casualty::average_models_destroyed(kill_count, remaining_health, wounds_per_model)
}

#[pyfunction]
fn average_health_lost(kill_count: f64, remaining_health: f64, wounds_per_model: f64) -> f64 {
    casualty::average_health_lost(kill_count, remaining_health, wounds_per_model)
}

/// Evaluate a JSON scenario against its whole defender table.
/// Returns the reports as a JSON array.
#[pyfunction]
#[pyo3(signature = (config_json, parallel=false))]
fn evaluate_scenario_json(py: Python<'_>, config_json: &str, parallel: bool) -> PyResult<String> {
    let config = ScenarioConfig::from_json(config_json).map_err(value_error)?;
    config.validate().map_err(value_error)?;

    // Release GIL during computation
    let reports = py
        .allow_threads(|| evaluate_roster(&config.attacker, &config.defenders, parallel))
        .map_err(value_error)?;

    serde_json::to_string(&reports)
        .map_err(|e| PyRuntimeError::new_err(format!("Failed to serialize results: {}", e)))
}

/// Python module definition
#[pymodule]
fn dice_odds(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(resolve, m)?)?;
    m.add_function(wrap_pyfunction!(average_models_destroyed, m)?)?;
    m.add_function(wrap_pyfunction!(average_health_lost, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_scenario_json, m)?)?;
    Ok(())
}
