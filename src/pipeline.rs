//! Expected-value resolution of one attack sequence
//!
//! Stage 0 builds a `ResolutionPlan`: legal thresholds plus the reroll
//! options that survive their mutual exclusions. Each following roll maps one
//! `ResolutionState` to the next:
//!
//! attacks -> hits -> wounds -> saves -> damage/casualties
//!
//! Counts are expectations over dice, never samples, so every stage is a
//! handful of multiplications. Lethal hits ride along from the hit roll to
//! the wound roll as `auto_wounds`; devastating wounds ride from the wound
//! roll to the save roll as `auto_failed_saves`.

use crate::attacker::AttackerProfile;
use crate::casualty::{allocate_damage, CombatResult};
use crate::defender::DefenderProfile;
use crate::dice::{
    critical_probability, reroll_all_probability, reroll_ones_probability, success_probability,
};
use crate::error::FormatError;
use crate::threshold::{clamp_threshold, effective_save, wound_threshold};
use serde::Serialize;
use tracing::debug;

/// Stage 0: thresholds and reroll options fixed for one resolution
#[derive(Debug, Clone)]
pub struct ResolutionPlan<'a> {
    pub attacker: &'a AttackerProfile,
    pub hit_threshold: u8,
    pub wound_threshold: u8,
    pub critical_hit: u8,
    pub critical_wound: u8,
    /// Save after AP and the invulnerable save comparison
    pub save: u8,
    pub feel_no_pain: u8,
    pub wounds_per_model: f64,
    pub torrent: bool,
    pub reroll_hit_ones: bool,
    pub reroll_hit_all: bool,
    pub reroll_wound_ones: bool,
    pub reroll_wound_all: bool,
    pub fish_hits: bool,
    pub fish_wounds: bool,
}

impl<'a> ResolutionPlan<'a> {
    pub fn new(attacker: &'a AttackerProfile, defender: &DefenderProfile) -> Self {
        let mut reroll_hit_ones = attacker.reroll_hit_ones;
        let mut reroll_hit_all = attacker.reroll_hit_all;
        let mut reroll_wound_ones = attacker.reroll_wound_ones;
        let reroll_wound_all = attacker.reroll_wound_all;

        // Reroll exclusions

        if reroll_hit_all && reroll_hit_ones {
            debug!("reroll hit ones disabled: all failed hits are already rerolled");
            reroll_hit_ones = false;
        }
        if attacker.torrent && (reroll_hit_all || reroll_hit_ones) {
            debug!("hit rerolls disabled: torrent rolls no hit dice");
            reroll_hit_all = false;
            reroll_hit_ones = false;
        }
        if reroll_wound_all && reroll_wound_ones {
            debug!("reroll wound ones disabled: twin rerolls all failed wounds");
            reroll_wound_ones = false;
        }

        // Fishing needs a full reroll and something that triggers on criticals
        let critical_hit_effect = !attacker.sustained_hits.is_zero() || attacker.lethal_hits;
        let fish_hits = attacker.fish && reroll_hit_all && critical_hit_effect;
        let fish_wounds = attacker.fish && reroll_wound_all && attacker.devastating_wounds;
        if attacker.fish && !fish_hits {
            debug!(
                reroll_hit_all,
                sustained_hits = %attacker.sustained_hits,
                lethal_hits = attacker.lethal_hits,
                "cannot fish hits"
            );
        }
        if attacker.fish && !fish_wounds {
            debug!(
                reroll_wound_all,
                devastating_wounds = attacker.devastating_wounds,
                "cannot fish wounds"
            );
        }

        // Thresholds
        let critical_hit = clamp_threshold(attacker.critical_hit as i32);
        let critical_wound = clamp_threshold(attacker.critical_wound as i32);

        // A critical is always at least a success
        let base_wound = wound_threshold(attacker.strength, defender.toughness) as i32;
        let wound = clamp_threshold(base_wound - attacker.wound_modifier).min(critical_wound);
        let hit = clamp_threshold(attacker.hit_threshold as i32).min(critical_hit);

        let save = clamp_threshold(effective_save(
            defender.armor_save,
            attacker.armor_penetration,
            defender.invulnerable_save,
        ) as i32);

        Self {
            attacker,
            hit_threshold: hit,
            wound_threshold: wound,
            critical_hit,
            critical_wound,
            save,
            feel_no_pain: clamp_threshold(defender.feel_no_pain as i32),
            wounds_per_model: defender.wounds as f64,
            torrent: attacker.torrent,
            reroll_hit_ones,
            reroll_hit_all,
            reroll_wound_ones,
            reroll_wound_all,
            fish_hits,
            fish_wounds,
        }
    }
}

/// Expected counts at one stage boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResolutionState {
    /// Dice that go on to the next roll
    pub dice: f64,
    /// Criticals scored on the roll that produced this state
    pub criticals: f64,
    /// Lethal hits that skip the wound roll
    pub auto_wounds: f64,
    /// Devastating wounds that skip the save roll
    pub auto_failed_saves: f64,
    /// Dice of the last roll that did not end up critical
    pub non_critical: f64,
}

/// Stage 1: number of attack dice
pub fn roll_attacks(plan: &ResolutionPlan<'_>) -> Result<ResolutionState, FormatError> {
    let per_model = plan.attacker.attacks.average()?.max(0.0);
    let attacks = per_model * plan.attacker.model_count as f64;
    debug!(attacks, "attacks");

    Ok(ResolutionState {
        dice: attacks,
        non_critical: attacks,
        ..ResolutionState::default()
    })
}

/// Stage 2: hit roll, with sustained and lethal hits
pub fn roll_hits(
    plan: &ResolutionPlan<'_>,
    state: ResolutionState,
) -> Result<ResolutionState, FormatError> {
    let attacks = state.dice;
    let plain = success_probability(plan.hit_threshold, true);

    // Pick the reroll policy
    let probability = if plan.torrent {
        1.0
    } else if plan.reroll_hit_ones {
        reroll_ones_probability(plan.hit_threshold)
    } else if plan.reroll_hit_all && !plan.fish_hits {
        reroll_all_probability(plan.hit_threshold)
    } else {
        plain
    };

    let critical_chance = critical_probability(plan.critical_hit);
    let mut criticals = critical_chance * attacks;
    let mut non_critical = attacks - criticals;

    let mut hits = if plan.fish_hits {
        // Keep the criticals, reroll everything else once
        criticals += critical_chance * non_critical;
        non_critical = attacks - criticals;
        plain * non_critical
    } else {
        probability * attacks
    };

    // Extra hits from criticals
    let sustained = if plan.attacker.sustained_hits.is_zero() {
        0.0
    } else {
        plan.attacker.sustained_hits.average()?.max(0.0) * criticals
    };
    hits += sustained;

    let lethal = if plan.attacker.lethal_hits { criticals } else { 0.0 };
    if !plan.fish_hits {
        // Fishing already left the criticals out of `hits`
        hits -= lethal;
    }

    debug!(hits, criticals, sustained, lethal, fished = plan.fish_hits, "hits");

    Ok(ResolutionState {
        dice: hits,
        criticals,
        auto_wounds: lethal,
        auto_failed_saves: 0.0,
        non_critical,
    })
}

/// Stage 3: wound roll, with lethal hits added back and devastating wounds set aside
pub fn roll_wounds(plan: &ResolutionPlan<'_>, state: ResolutionState) -> ResolutionState {
    let hits = state.dice;
    let plain = success_probability(plan.wound_threshold, true);

    // Pick the reroll policy
    let probability = if plan.reroll_wound_ones {
        reroll_ones_probability(plan.wound_threshold)
    } else if plan.reroll_wound_all && !plan.fish_wounds {
        reroll_all_probability(plan.wound_threshold)
    } else {
        plain
    };

    let critical_chance = critical_probability(plan.critical_wound);
    let mut criticals = critical_chance * hits;
    let mut non_critical = hits - criticals;

    // Lethal hits join as already-successful wounds
    let mut wounds = if plan.fish_wounds {
        criticals += critical_chance * non_critical;
        non_critical = hits - criticals;
        state.auto_wounds + non_critical * plain
    } else {
        state.auto_wounds + hits * probability
    };

    let devastating = if plan.attacker.devastating_wounds { criticals } else { 0.0 };
    if !plan.fish_wounds {
        wounds -= devastating;
    }

    debug!(
        wounds,
        criticals,
        lethal = state.auto_wounds,
        devastating,
        fished = plan.fish_wounds,
        "wounds"
    );

    ResolutionState {
        dice: wounds,
        criticals,
        auto_wounds: state.auto_wounds,
        auto_failed_saves: devastating,
        non_critical,
    }
}

/// Stage 4: save roll; devastating wounds bypass it
pub fn roll_saves(plan: &ResolutionPlan<'_>, state: ResolutionState) -> ResolutionState {
    let failed = state.dice * success_probability(plan.save, false) + state.auto_failed_saves;
    debug!(failed, save = plan.save, devastating = state.auto_failed_saves, "saves");

    ResolutionState {
        dice: failed,
        ..state
    }
}

/// Stage 5 input: average damage of one failed save that gets past feel-no-pain
pub fn damage_per_failed_save(plan: &ResolutionPlan<'_>) -> Result<f64, FormatError> {
    let damage = plan.attacker.damage.average()?.max(0.0);
    Ok(damage * success_probability(plan.feel_no_pain, false))
}

/// Every stage boundary of one resolution
#[derive(Debug, Clone, Serialize)]
pub struct StageTrace {
    pub attacks: ResolutionState,
    pub hits: ResolutionState,
    pub wounds: ResolutionState,
    pub saves: ResolutionState,
    pub damage_per_failed_save: f64,
    pub result: CombatResult,
}

/// Run all stages and keep the intermediate states
pub fn trace(
    attacker: &AttackerProfile,
    defender: &DefenderProfile,
) -> Result<StageTrace, FormatError> {
    let plan = ResolutionPlan::new(attacker, defender);

    // Dice stages
    let attacks = roll_attacks(&plan)?;
    let hits = roll_hits(&plan, attacks)?;
    let wounds = roll_wounds(&plan, hits);
    let saves = roll_saves(&plan, wounds);

    // Damage, feel-no-pain, casualties
    let damage = damage_per_failed_save(&plan)?;
    let result = allocate_damage(saves.dice, damage, plan.wounds_per_model);
    debug!(
        damage,
        destroyed = result.average_models_destroyed,
        remaining_health = result.average_remaining_health,
        "casualties"
    );

    Ok(StageTrace {
        attacks,
        hits,
        wounds,
        saves,
        damage_per_failed_save: damage,
        result,
    })
}

/// Expected (models destroyed, remaining health of the damaged model)
pub fn resolve(
    attacker: &AttackerProfile,
    defender: &DefenderProfile,
) -> Result<CombatResult, FormatError> {
    trace(attacker, defender).map(|t| t.result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn marine() -> DefenderProfile {
        DefenderProfile::new(4, 4, 1)
    }

    #[test]
    fn test_reroll_all_disables_reroll_ones() {
        let attacker = AttackerProfile::default()
            .with_reroll_hit_ones()
            .with_reroll_hit_all()
            .with_reroll_wound_ones()
            .with_twin();
        let plan = ResolutionPlan::new(&attacker, &marine());

        assert!(plan.reroll_hit_all);
        assert!(!plan.reroll_hit_ones);
        assert!(plan.reroll_wound_all);
        assert!(!plan.reroll_wound_ones);
    }

    #[test]
    fn test_torrent_disables_hit_rerolls() {
        let attacker = AttackerProfile::default()
            .with_torrent()
            .with_reroll_hit_ones()
            .with_reroll_wound_ones();
        let plan = ResolutionPlan::new(&attacker, &marine());

        assert!(!plan.reroll_hit_ones);
        assert!(!plan.reroll_hit_all);
        assert!(plan.reroll_wound_ones);
    }

    #[test]
    fn test_thresholds_respect_criticals_and_modifiers() {
        let attacker = AttackerProfile::new(1, 1, 6, 4, 1)
            .with_critical_hit(5)
            .with_wound_modifier(1);
        let plan = ResolutionPlan::new(&attacker, &DefenderProfile::new(5, 3, 1));
        assert_eq!(plan.hit_threshold, 5);
        // S4 vs T5 is 5+, +1 to wound makes it 4+
        assert_eq!(plan.wound_threshold, 4);

        let attacker = AttackerProfile::new(1, 1, 4, 8, 1)
            .with_wound_modifier(2)
            .with_critical_wound(4);
        let plan = ResolutionPlan::new(&attacker, &DefenderProfile::new(4, 3, 1));
        assert_eq!(plan.wound_threshold, 2);

        let attacker = AttackerProfile::new(1, 1, 4, 1, 1)
            .with_wound_modifier(-2)
            .with_critical_wound(5);
        let plan = ResolutionPlan::new(&attacker, &DefenderProfile::new(4, 3, 1));
        assert_eq!(plan.wound_threshold, 5);
    }

    #[test]
    fn test_save_after_armor_penetration() {
        let attacker = AttackerProfile::default().with_armor_penetration(2);
        let defender = DefenderProfile::new(4, 3, 2).with_invulnerable_save(4);
        assert_eq!(ResolutionPlan::new(&attacker, &defender).save, 4);

        let defender = DefenderProfile::new(4, 3, 2);
        assert_eq!(ResolutionPlan::new(&attacker, &defender).save, 5);
    }

    #[test]
    fn test_fishing_hits_needs_reroll_and_critical_effect() {
        let sustained = AttackerProfile::default().with_fish().with_sustained_hits(1);
        assert!(!ResolutionPlan::new(&sustained, &marine()).fish_hits);

        let rerolled = AttackerProfile::default().with_fish().with_reroll_hit_all();
        assert!(!ResolutionPlan::new(&rerolled, &marine()).fish_hits);

        let lethal = rerolled.clone().with_lethal_hits();
        assert!(ResolutionPlan::new(&lethal, &marine()).fish_hits);

        let sustained = rerolled.clone().with_sustained_hits("D3");
        assert!(ResolutionPlan::new(&sustained, &marine()).fish_hits);

        let torrent = lethal.clone().with_torrent();
        assert!(!ResolutionPlan::new(&torrent, &marine()).fish_hits);
    }

    #[test]
    fn test_fishing_wounds_needs_twin_and_devastating() {
        let twin = AttackerProfile::default().with_fish().with_twin();
        assert!(!ResolutionPlan::new(&twin, &marine()).fish_wounds);

        let devastating = AttackerProfile::default().with_fish().with_devastating_wounds();
        assert!(!ResolutionPlan::new(&devastating, &marine()).fish_wounds);

        let both = twin.with_devastating_wounds();
        assert!(ResolutionPlan::new(&both, &marine()).fish_wounds);
    }

    #[test]
    fn test_attacks_scale_with_models() {
        let attacker = AttackerProfile::new(10, "D3+1", 4, 4, 1);
        let plan = ResolutionPlan::new(&attacker, &marine());
        let state = roll_attacks(&plan).unwrap();
        assert_eq!(state.dice, 30.0);
    }

    #[test]
    fn test_lethal_hits_skip_wound_roll() {
        let attacker = AttackerProfile::new(10, 1, 4, 4, 1).with_lethal_hits();
        let plan = ResolutionPlan::new(&attacker, &marine());

        let hits = roll_hits(&plan, roll_attacks(&plan).unwrap()).unwrap();
        assert!(close(hits.criticals, 10.0 / 6.0));
        assert!(close(hits.auto_wounds, 10.0 / 6.0));
        assert!(close(hits.dice, 5.0 - 10.0 / 6.0));

        let wounds = roll_wounds(&plan, hits);
        assert!(close(wounds.dice, (5.0 - 10.0 / 6.0) * 0.5 + 10.0 / 6.0));
    }

    #[test]
    fn test_sustained_hits_add_dice() {
        let attacker = AttackerProfile::new(10, 1, 4, 4, 1).with_sustained_hits(2);
        let plan = ResolutionPlan::new(&attacker, &marine());

        let hits = roll_hits(&plan, roll_attacks(&plan).unwrap()).unwrap();
        assert!(close(hits.dice, 5.0 + 2.0 * 10.0 / 6.0));
        assert_eq!(hits.auto_wounds, 0.0);
    }

    #[test]
    fn test_fishing_hits_keeps_more_criticals() {
        let attacker = AttackerProfile::new(10, 1, 4, 4, 1)
            .with_reroll_hit_all()
            .with_lethal_hits()
            .with_fish();
        let plan = ResolutionPlan::new(&attacker, &marine());

        let hits = roll_hits(&plan, roll_attacks(&plan).unwrap()).unwrap();
        assert!(close(hits.criticals, 10.0 * 11.0 / 36.0));
        assert!(close(hits.non_critical, 10.0 * 25.0 / 36.0));
        assert!(close(hits.dice, 0.5 * 10.0 * 25.0 / 36.0));
        assert!(close(hits.auto_wounds, hits.criticals));
    }

    #[test]
    fn test_fishing_hits_for_sustained_only() {
        let attacker = AttackerProfile::new(10, 1, 4, 4, 1)
            .with_reroll_hit_all()
            .with_sustained_hits(1)
            .with_fish();
        let plan = ResolutionPlan::new(&attacker, &marine());
        assert!(plan.fish_hits);

        let hits = roll_hits(&plan, roll_attacks(&plan).unwrap()).unwrap();
        let criticals = 10.0 * 11.0 / 36.0;
        assert!(close(hits.criticals, criticals));
        assert_eq!(hits.auto_wounds, 0.0);
        // Plain hits from the rerolled remainder plus one extra hit per critical
        assert!(close(hits.dice, 0.5 * 10.0 * 25.0 / 36.0 + criticals));
    }

    #[test]
    fn test_devastating_wounds_bypass_saves() {
        let attacker = AttackerProfile::new(10, 1, 4, 4, 1).with_devastating_wounds();
        let plan = ResolutionPlan::new(&attacker, &marine());

        let hits = roll_hits(&plan, roll_attacks(&plan).unwrap()).unwrap();
        let wounds = roll_wounds(&plan, hits);
        assert!(close(wounds.auto_failed_saves, 5.0 / 6.0));
        assert!(close(wounds.dice, 2.5 - 5.0 / 6.0));

        let saves = roll_saves(&plan, wounds);
        assert!(close(saves.dice, (2.5 - 5.0 / 6.0) * 0.5 + 5.0 / 6.0));
    }

    #[test]
    fn test_fishing_wounds() {
        let attacker = AttackerProfile::new(12, 1, 4, 4, 1)
            .with_torrent()
            .with_twin()
            .with_devastating_wounds()
            .with_fish();
        let plan = ResolutionPlan::new(&attacker, &marine());

        let hits = roll_hits(&plan, roll_attacks(&plan).unwrap()).unwrap();
        let wounds = roll_wounds(&plan, hits);
        // 12 hits: 2 crits, then 10 rerolled for another 10/6
        assert!(close(wounds.auto_failed_saves, 2.0 + 10.0 / 6.0));
        assert!(close(wounds.dice, (12.0 - 2.0 - 10.0 / 6.0) * 0.5));
    }

    #[test]
    fn test_feel_no_pain_scales_damage() {
        let attacker = AttackerProfile::new(1, 1, 4, 4, "D6");
        let defender = marine().with_feel_no_pain(5);
        let plan = ResolutionPlan::new(&attacker, &defender);
        assert!(close(damage_per_failed_save(&plan).unwrap(), 3.5 * 4.0 / 6.0));
    }

    #[test]
    fn test_bad_notation_propagates() {
        let attacker = AttackerProfile::new(1, "lots", 4, 4, 1);
        assert!(matches!(
            resolve(&attacker, &marine()),
            Err(FormatError::MissingDiceMarker(_))
        ));

        let attacker = AttackerProfile::new(1, 1, 4, 4, "Dx");
        assert!(resolve(&attacker, &marine()).is_err());
    }

    #[test]
    fn test_trace_matches_resolve() {
        let attacker = AttackerProfile::new(10, 2, 3, 5, "D3").with_sustained_hits(1);
        let defender = DefenderProfile::new(4, 3, 2);

        let traced = trace(&attacker, &defender).unwrap();
        assert_eq!(traced.result, resolve(&attacker, &defender).unwrap());
        assert_eq!(traced.attacks.dice, 20.0);
        assert_eq!(traced.damage_per_failed_save, 2.0);
    }
}
