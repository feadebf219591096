//! Roll thresholds derived from the two profiles

/// Lowest legal roll threshold ("2+")
pub const MIN_THRESHOLD: u8 = 2;
/// Threshold that can never be met: no save, no feel-no-pain, never hits
pub const NO_ROLL: u8 = 7;

/// Wound roll needed (e.g. 4 means 4+) for a given strength against toughness
pub fn wound_threshold(strength: u32, toughness: u32) -> u8 {
    // Doubling is done in u64 so huge profiles cannot overflow
    let (strength, toughness) = (strength as u64, toughness as u64);
    if strength >= 2 * toughness {
        2
    } else if strength > toughness {
        3
    } else if strength == toughness {
        4
    } else if 2 * strength >= toughness {
        5
    } else {
        6
    }
}

/// Save the defender actually rolls after armor penetration.
///
/// AP only worsens the armor save. When the penetrated armor save is worse
/// than the invulnerable save, the invulnerable save is used instead, and
/// if there is none (anything above 6) the result is 7: no save at all.
pub fn effective_save(armor_save: u8, armor_pen: u8, invulnerable_save: u8) -> u8 {
    let candidate = armor_save.saturating_add(armor_pen).min(NO_ROLL);
    if candidate > invulnerable_save {
        if invulnerable_save > 6 {
            return NO_ROLL;
        }
        return invulnerable_save;
    }
    candidate
}

/// Force a threshold into the legal [2,7] range
#[inline]
pub fn clamp_threshold(threshold: i32) -> u8 {
    threshold.clamp(MIN_THRESHOLD as i32, NO_ROLL as i32) as u8
}
