//! Dice notation parsing and rolling.
//!
//! Supports the `NdM` and `NdM+B` forms used by effect formulas. Every formula in
//! the engine works from [`DiceExpression::expected_value`]; actual rolling is a
//! separate, explicit operation that takes the caller's RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified in {0}")]
    NoDice(String),
}

/// Standard die types used for skill checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    /// All die types, smallest first.
    pub const ALL: [DieType; 7] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
        DieType::D100,
    ];

    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            4 => Some(DieType::D4),
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            20 => Some(DieType::D20),
            100 => Some(DieType::D100),
            _ => None,
        }
    }

    /// Draw a single face uniformly from `[1, sides]`.
    pub fn roll_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(1..=self.sides())
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl FromStr for DieType {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let sides = trimmed
            .strip_prefix('d')
            .and_then(|rest| rest.parse::<u32>().ok())
            .ok_or_else(|| DiceError::InvalidNotation(s.to_string()))?;
        DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))
    }
}

/// Inclusive `[min, max]` range a dice expression can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceBounds {
    pub min: u32,
    pub max: u32,
}

/// A parsed `NdM+B` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceExpression {
    pub count: u32,
    pub sides: u32,
    pub bonus: u32,
}

impl DiceExpression {
    /// Parse a dice notation string such as `2d8`, `2d8+2` or `1d6 + 3`.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let invalid = || DiceError::InvalidNotation(notation.to_string());
        let normalized = notation.trim().to_lowercase();

        let (count_str, rest) = normalized.split_once('d').ok_or_else(invalid)?;
        let (sides_str, bonus_str) = match rest.split_once('+') {
            Some((sides, bonus)) => (sides.trim_end(), Some(bonus.trim_start())),
            None => (rest, None),
        };

        let count = parse_digits(count_str).ok_or_else(invalid)?;
        let sides = parse_digits(sides_str).ok_or_else(invalid)?;
        let bonus = match bonus_str {
            Some(b) => parse_digits(b).ok_or_else(invalid)?,
            None => 0,
        };

        if count == 0 {
            return Err(DiceError::NoDice(notation.to_string()));
        }
        if sides == 0 {
            return Err(DiceError::InvalidDieSize(sides));
        }

        Ok(DiceExpression {
            count,
            sides,
            bonus,
        })
    }

    pub fn new(count: u32, sides: u32, bonus: u32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// Deterministic average: `count * (sides + 1) / 2 + bonus`.
    pub fn expected_value(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0 + f64::from(self.bonus)
    }

    pub fn bounds(&self) -> DiceBounds {
        DiceBounds {
            min: self.count.saturating_add(self.bonus),
            max: self
                .count
                .saturating_mul(self.sides)
                .saturating_add(self.bonus),
        }
    }

    /// The same expression with `removed` fewer dice, or `None` once no dice remain.
    pub fn with_fewer_dice(&self, removed: u32) -> Option<Self> {
        let count = self.count.checked_sub(removed).filter(|c| *c > 0)?;
        Some(Self { count, ..*self })
    }

    /// Roll with a specific RNG.
    pub fn roll_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> RollResult {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let total = rolls
            .iter()
            .fold(self.bonus, |sum, r| sum.saturating_add(*r));

        RollResult {
            expression: *self,
            rolls,
            total,
        }
    }

    /// Roll with the thread-local RNG.
    pub fn roll(&self) -> RollResult {
        self.roll_with_rng(&mut rand::thread_rng())
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bonus > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.bonus)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Result of rolling a dice expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    pub expression: DiceExpression,
    pub rolls: Vec<u32>,
    pub total: u32,
}

impl RollResult {
    /// Format the individual dice results for display.
    pub fn dice_display(&self) -> String {
        let dice = format!(
            "[{}]",
            self.rolls
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if self.expression.bonus > 0 {
            format!("{} + {}", dice, self.expression.bonus)
        } else {
            dice
        }
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dice_display(), self.total)
    }
}

/// Convenience function for the expected value of a notation string.
pub fn expected_value(notation: &str) -> Result<f64, DiceError> {
    Ok(DiceExpression::parse(notation)?.expected_value())
}

/// Convenience function for the bounds of a notation string.
pub fn bounds(notation: &str) -> Result<DiceBounds, DiceError> {
    Ok(DiceExpression::parse(notation)?.bounds())
}
