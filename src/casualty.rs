//! Turning expected failed saves into casualties
//!
//! The pipeline ends with a fractional number of failed saves. Whole failed
//! saves are applied to the defending unit model by model, so damage
//! spilling past a model's last wound is lost exactly as it is on the table;
//! the fractional rest only chips the model currently taking damage.

use serde::Serialize;

/// Outcome of one attacker/defender resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombatResult {
    /// Whole models destroyed
    pub average_models_destroyed: f64,
    /// Health left on the one model currently absorbing damage
    pub average_remaining_health: f64,
}

impl CombatResult {
    /// Destroyed models plus the lost fraction of the damaged one
    pub fn average_total_models_lost(&self, wounds_per_model: f64) -> f64 {
        average_models_destroyed(
            self.average_models_destroyed,
            self.average_remaining_health,
            wounds_per_model,
        )
    }

    /// Total health stripped from the unit
    pub fn average_health_lost(&self, wounds_per_model: f64) -> f64 {
        average_health_lost(
            self.average_models_destroyed,
            self.average_remaining_health,
            wounds_per_model,
        )
    }
}

/// Round to 2 decimal places for display
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Tolerance on "this event finishes the model", so that three events of
/// 1/3 damage kill a 1-wound model despite rounding
const KILL_EPSILON: f64 = 1e-9;

/// Apply `failed_saves` damage events of `damage_per_failed_save` each to a
/// unit of `wounds_per_model`-health models.
///
/// Every model takes the same number of whole events to die, so the whole
/// events are divided out rather than applied one at a time.
pub fn allocate_damage(
    failed_saves: f64,
    damage_per_failed_save: f64,
    wounds_per_model: f64,
) -> CombatResult {
    if damage_per_failed_save <= 0.0 || failed_saves <= 0.0 {
        return CombatResult {
            average_models_destroyed: 0.0,
            average_remaining_health: wounds_per_model,
        };
    }

    let whole = failed_saves.trunc();
    let remainder = failed_saves - whole;

    // Excess damage does not carry over to the next model
    let events_per_kill = (wounds_per_model / damage_per_failed_save - KILL_EPSILON)
        .ceil()
        .max(1.0);
    let mut kills = (whole / events_per_kill).floor();
    let hits_on_current = whole - kills * events_per_kill;
    let mut remaining = wounds_per_model - hits_on_current * damage_per_failed_save;

    remaining -= remainder * damage_per_failed_save;
    if remaining < 0.0 {
        remaining = 0.0;
        kills += 1.0;
    }

    CombatResult {
        average_models_destroyed: kills,
        average_remaining_health: remaining,
    }
}

/// Average number of models lost, counting the damaged model fractionally
pub fn average_models_destroyed(kill_count: f64, remaining_health: f64, wounds_per_model: f64) -> f64 {
    round2(kill_count + (wounds_per_model - remaining_health) / wounds_per_model)
}

/// Average health points lost across the unit
pub fn average_health_lost(kill_count: f64, remaining_health: f64, wounds_per_model: f64) -> f64 {
    round2(kill_count * wounds_per_model + (wounds_per_model - remaining_health))
}
