//! Dice notation and single-die probabilities
//!
//! Parses notation like "2D6+1" or "D3" into a `DiceExpression` and computes
//! average values. The probability helpers work on a 6-sided die rolled
//! against an "N+" threshold (3 means 3+).

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed "<count>D<face>+<bonus>" expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpression {
    /// Number of dice rolled (0 for a plain constant)
    pub dice_count: u32,
    /// Number of faces per die
    pub dice_face: u32,
    /// Flat value added to the roll
    pub bonus: i32,
}

impl DiceExpression {
    pub fn new(dice_count: u32, dice_face: u32, bonus: i32) -> Self {
        Self { dice_count, dice_face, bonus }
    }

    /// A fixed value with no dice involved
    pub fn constant(value: i32) -> Self {
        Self { dice_count: 0, dice_face: 6, bonus: value }
    }

    /// Mean result: one die averages (face + 1) / 2
    #[inline]
    pub fn average(&self) -> f64 {
        let per_die = (self.dice_face as f64 + 1.0) / 2.0;
        self.dice_count as f64 * per_die + self.bonus as f64
    }
}

impl FromStr for DiceExpression {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_notation(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dice_count == 0 {
            return write!(f, "{}", self.bonus);
        }
        if self.dice_count > 1 {
            write!(f, "{}", self.dice_count)?;
        }
        write!(f, "D{}", self.dice_face)?;
        if self.bonus > 0 {
            write!(f, "+{}", self.bonus)
        } else if self.bonus < 0 {
            write!(f, "{}", self.bonus)
        } else {
            Ok(())
        }
    }
}

fn invalid(notation: &str, component: &'static str, text: &str) -> FormatError {
    FormatError::InvalidComponent {
        notation: notation.to_string(),
        component,
        text: text.to_string(),
    }
}

/// Parse a dice notation string like "2D6+1", "d3" or "4"
///
/// Case-insensitive. A missing count means one die, a missing bonus means 0,
/// and a bare integer is read as a constant.
pub fn parse_notation(notation: &str) -> Result<DiceExpression, FormatError> {
    let cleaned: String = notation
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if let Ok(value) = cleaned.parse::<i32>() {
        return Ok(DiceExpression::constant(value));
    }

    let d_pos = cleaned
        .find('D')
        .ok_or_else(|| FormatError::MissingDiceMarker(notation.to_string()))?;

    let count_str = &cleaned[..d_pos];
    let dice_count = if count_str.is_empty() {
        1 // "D6" means "1D6"
    } else {
        count_str
            .parse::<u32>()
            .map_err(|_| invalid(notation, "dice count", count_str))?
    };

    let rest = &cleaned[d_pos + 1..];
    let (face_str, bonus) = match rest.find(['+', '-']) {
        Some(pos) => {
            let bonus_str = &rest[pos..];
            let bonus = bonus_str
                .parse::<i32>()
                .map_err(|_| invalid(notation, "bonus", bonus_str))?;
            (&rest[..pos], bonus)
        }
        None => (rest, 0),
    };

    let dice_face = face_str
        .parse::<u32>()
        .ok()
        .filter(|&face| face > 0)
        .ok_or_else(|| invalid(notation, "dice face", face_str))?;

    Ok(DiceExpression { dice_count, dice_face, bonus })
}

/// A profile field holding either a plain integer or dice notation
///
/// Deserializes from a YAML/JSON integer or string. Notation is kept as text
/// and parsed when the value is evaluated, so a bad entry surfaces as a
/// `FormatError` at the stage that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiceValue {
    Constant(i32),
    Notation(String),
}

impl DiceValue {
    /// Parse into a structured expression
    pub fn expression(&self) -> Result<DiceExpression, FormatError> {
        match self {
            DiceValue::Constant(value) => Ok(DiceExpression::constant(*value)),
            DiceValue::Notation(text) => parse_notation(text),
        }
    }

    /// Average value of the field
    pub fn average(&self) -> Result<f64, FormatError> {
        match self {
            DiceValue::Constant(value) => Ok(*value as f64),
            DiceValue::Notation(text) => parse_notation(text).map(|d| d.average()),
        }
    }

    /// True for the "not configured" value (0 or "0")
    pub fn is_zero(&self) -> bool {
        match self {
            DiceValue::Constant(value) => *value == 0,
            DiceValue::Notation(text) => text.trim() == "0",
        }
    }
}

impl Default for DiceValue {
    fn default() -> Self {
        DiceValue::Constant(0)
    }
}

impl From<i32> for DiceValue {
    fn from(value: i32) -> Self {
        DiceValue::Constant(value)
    }
}

impl From<&str> for DiceValue {
    fn from(value: &str) -> Self {
        DiceValue::Notation(value.to_string())
    }
}

impl From<String> for DiceValue {
    fn from(value: String) -> Self {
        DiceValue::Notation(value)
    }
}

impl fmt::Display for DiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceValue::Constant(value) => write!(f, "{}", value),
            DiceValue::Notation(text) => write!(f, "{}", text),
        }
    }
}

/// Average value of an integer or a dice notation string
///
/// `evaluate_average("2D6+1") == Ok(8.0)`, `evaluate_average(3) == Ok(3.0)`
pub fn evaluate_average<V: Into<DiceValue>>(value: V) -> Result<f64, FormatError> {
    value.into().average()
}

/// Probability of rolling `threshold`+ on a D6 (`succeed = true`), or of
/// rolling strictly below it (`succeed = false`).
///
/// No clamping: `threshold` must already be in [1,7]. A threshold of 7 never
/// succeeds and always fails.
#[inline]
pub fn success_probability(threshold: u8, succeed: bool) -> f64 {
    if succeed {
        (7.0 - threshold as f64) / 6.0
    } else {
        (threshold as f64 - 1.0) / 6.0
    }
}

/// Success probability when a natural 1 is rerolled once
#[inline]
pub fn reroll_ones_probability(threshold: u8) -> f64 {
    let p = success_probability(threshold, true);
    p + p / 6.0
}

/// Success probability when every failed die is rerolled once
#[inline]
pub fn reroll_all_probability(threshold: u8) -> f64 {
    let p = success_probability(threshold, true);
    p + p * (1.0 - p)
}

/// Probability of a critical result at `critical_threshold`+
#[inline]
pub fn critical_probability(critical_threshold: u8) -> f64 {
    success_probability(critical_threshold, true)
}
