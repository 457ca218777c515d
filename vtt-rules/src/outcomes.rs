//! Rollable outcome tables.
//!
//! A table maps every face of one die to exactly one narrative outcome. Tables are
//! content, so coverage is checked once at load time via
//! [`OutcomeTable::validate_coverage`]; a roll that still finds no entry at play
//! time is a data-integrity failure and is reported, never papered over.

use crate::dice::DieType;
use crate::skills::SkillRank;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum OutcomeError {
    #[error("No outcome in table {table} for roll {roll}")]
    NoMatchingOutcome { table: String, roll: u32 },

    #[error("Table {table} has no outcome for roll {roll}")]
    CoverageGap { table: String, roll: u32 },

    #[error("Table {table} has overlapping outcomes for roll {roll}")]
    Overlap { table: String, roll: u32 },

    #[error("Table {table} has range {lo}-{hi} outside 1-{sides}")]
    OutOfRange {
        table: String,
        lo: u32,
        hi: u32,
        sides: u32,
    },
}

/// Severity band of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTier {
    Failure,
    Normal,
    Success,
    Critical,
}

impl fmt::Display for OutcomeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeTier::Failure => "failure",
            OutcomeTier::Normal => "normal",
            OutcomeTier::Success => "success",
            OutcomeTier::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

/// Inclusive roll range, serialized as `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRange(pub u32, pub u32);

impl RollRange {
    pub fn contains(&self, roll: u32) -> bool {
        self.0 <= roll && roll <= self.1
    }
}

impl fmt::Display for RollRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == self.1 {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{}-{}", self.0, self.1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    #[serde(rename = "roll")]
    pub roll_range: RollRange,
    #[serde(rename = "result")]
    pub text: String,
    #[serde(rename = "type")]
    pub tier: OutcomeTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeTable {
    /// Filled from the content key when loaded from a map.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_rank: Option<SkillRank>,
    #[serde(rename = "table")]
    pub entries: Vec<OutcomeEntry>,
}

impl OutcomeTable {
    pub fn new(id: impl Into<String>, name: impl Into<String>, entries: Vec<OutcomeEntry>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            required_rank: None,
            entries,
        }
    }

    /// Check that the entries partition `[1, sides]` of `die`.
    pub fn validate_coverage(&self, die: DieType) -> Result<(), OutcomeError> {
        let sides = die.sides();
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.roll_range.0 < 1 || e.roll_range.0 > e.roll_range.1 || e.roll_range.1 > sides)
        {
            return Err(OutcomeError::OutOfRange {
                table: self.id.clone(),
                lo: entry.roll_range.0,
                hi: entry.roll_range.1,
                sides,
            });
        }

        for roll in 1..=sides {
            match self.entries.iter().filter(|e| e.roll_range.contains(roll)).count() {
                0 => {
                    return Err(OutcomeError::CoverageGap {
                        table: self.id.clone(),
                        roll,
                    })
                }
                1 => {}
                _ => {
                    return Err(OutcomeError::Overlap {
                        table: self.id.clone(),
                        roll,
                    })
                }
            }
        }
        Ok(())
    }
}

/// The unique entry whose range contains `roll`.
pub fn resolve_check(table: &OutcomeTable, roll: u32) -> Result<&OutcomeEntry, OutcomeError> {
    table
        .entries
        .iter()
        .find(|e| e.roll_range.contains(roll))
        .ok_or_else(|| {
            error!(table = %table.id, roll, "roll fell outside every outcome range");
            OutcomeError::NoMatchingOutcome {
                table: table.id.clone(),
                roll,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(lo: u32, hi: u32, tier: OutcomeTier) -> OutcomeEntry {
        OutcomeEntry {
            roll_range: RollRange(lo, hi),
            text: format!("{lo}-{hi}"),
            tier,
        }
    }

    fn d4_table() -> OutcomeTable {
        OutcomeTable::new(
            "acrobatics_untrained_d4",
            "Untrained Acrobatics (d4)",
            vec![
                entry(1, 1, OutcomeTier::Failure),
                entry(2, 2, OutcomeTier::Normal),
                entry(3, 4, OutcomeTier::Success),
            ],
        )
    }

    #[test]
    fn test_resolve_check() {
        let table = d4_table();
        assert_eq!(resolve_check(&table, 1).unwrap().tier, OutcomeTier::Failure);
        assert_eq!(resolve_check(&table, 4).unwrap().tier, OutcomeTier::Success);
        assert_eq!(
            resolve_check(&table, 5).unwrap_err(),
            OutcomeError::NoMatchingOutcome {
                table: "acrobatics_untrained_d4".to_string(),
                roll: 5
            }
        );
    }

    #[test]
    fn test_valid_coverage() {
        assert!(d4_table().validate_coverage(DieType::D4).is_ok());
    }

    #[test]
    fn test_coverage_errors() {
        let table = d4_table();
        assert!(matches!(
            table.validate_coverage(DieType::D6),
            Err(OutcomeError::CoverageGap { roll: 5, .. })
        ));

        let mut overlapping = d4_table();
        overlapping.entries.push(entry(2, 3, OutcomeTier::Critical));
        assert!(matches!(
            overlapping.validate_coverage(DieType::D4),
            Err(OutcomeError::Overlap { roll: 2, .. })
        ));

        let mut too_wide = d4_table();
        too_wide.entries[2] = entry(3, 6, OutcomeTier::Success);
        assert!(matches!(
            too_wide.validate_coverage(DieType::D4),
            Err(OutcomeError::OutOfRange { hi: 6, sides: 4, .. })
        ));

        let mut inverted = d4_table();
        inverted.entries[2] = entry(4, 3, OutcomeTier::Success);
        assert!(matches!(
            inverted.validate_coverage(DieType::D4),
            Err(OutcomeError::OutOfRange { lo: 4, hi: 3, .. })
        ));
    }

    #[test]
    fn test_deserialize_content_shape() {
        let table: OutcomeTable = serde_json::from_str(
            r#"{
                "name": "Untrained Acrobatics (d4)",
                "icon": "ability_rogue_sprint",
                "requiredRank": "UNTRAINED",
                "table": [
                    { "roll": [1, 1], "result": "You trip", "type": "failure" },
                    { "roll": [2, 4], "result": "You make it", "type": "critical" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(table.required_rank, Some(SkillRank::Untrained));
        assert_eq!(table.entries[1].roll_range, RollRange(2, 4));
        assert_eq!(table.entries[1].tier, OutcomeTier::Critical);
        assert!(table.validate_coverage(DieType::D4).is_ok());
    }
}
