//! Quest-gated skill progression.
//!
//! A skill's rank is never stored: it is recomputed from the number of completed
//! quests (or taken from a rank assigned at character creation). The rank then
//! selects which quests are offered and which outcome tables a check rolls on.

use crate::character::{Attribute, AttributeSet};
use crate::content::ContentProvider;
use crate::dice::DieType;
use crate::equipment::EquipmentBonuses;
use crate::outcomes::{resolve_check, OutcomeEntry, OutcomeError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    #[error("Unknown quest {quest} for skill {skill}")]
    UnknownQuest { skill: String, quest: String },

    #[error("No {die} table for skill {skill} at rank {rank}")]
    NoTable {
        skill: String,
        rank: SkillRank,
        die: DieType,
    },

    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

/// Proficiency ranks, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillRank {
    #[default]
    Untrained,
    Novice,
    Apprentice,
    Trained,
    Adept,
    Expert,
    Master,
}

impl SkillRank {
    pub const ALL: [SkillRank; 7] = [
        SkillRank::Untrained,
        SkillRank::Novice,
        SkillRank::Apprentice,
        SkillRank::Trained,
        SkillRank::Adept,
        SkillRank::Expert,
        SkillRank::Master,
    ];

    /// Position in the rank order, which is also the rank's bonus to skill checks.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Completed quests needed to reach this rank.
    pub fn quests_required(&self) -> usize {
        match self {
            SkillRank::Untrained => 0,
            SkillRank::Novice => 1,
            SkillRank::Apprentice => 3,
            SkillRank::Trained => 6,
            SkillRank::Adept => 9,
            SkillRank::Expert => 11,
            SkillRank::Master => 12,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillRank::Untrained => "Untrained",
            SkillRank::Novice => "Novice",
            SkillRank::Apprentice => "Apprentice",
            SkillRank::Trained => "Trained",
            SkillRank::Adept => "Adept",
            SkillRank::Expert => "Expert",
            SkillRank::Master => "Master",
        }
    }

    /// Highest rank whose requirement is met by `completed` quests.
    pub fn for_completed(completed: usize) -> SkillRank {
        SkillRank::ALL
            .iter()
            .rev()
            .copied()
            .find(|rank| completed >= rank.quests_required())
            .unwrap_or(SkillRank::Untrained)
    }
}

impl fmt::Display for SkillRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-skill progress record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillProgress {
    pub completed_quests: BTreeSet<String>,
    /// Rank chosen at character creation; overrides quest-based progression.
    pub assigned_rank: Option<SkillRank>,
}

impl SkillProgress {
    /// Mark a quest completed. Returns `false` if it already was.
    pub fn complete(&mut self, quest_id: impl Into<String>) -> bool {
        self.completed_quests.insert(quest_id.into())
    }

    /// Mark a quest not completed. Returns `false` if it wasn't.
    pub fn uncomplete(&mut self, quest_id: &str) -> bool {
        self.completed_quests.remove(quest_id)
    }

    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed_quests.contains(quest_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rank: SkillRank,
    #[serde(default)]
    pub unlocks: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Quest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rank: SkillRank) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            rank,
            unlocks: Vec::new(),
            icon: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefinition {
    /// Filled from the content key when loaded from a map.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub primary_stat: Attribute,
    pub secondary_stat: Attribute,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Table ids by rank and die.
    #[serde(default)]
    pub rollable_tables: BTreeMap<SkillRank, BTreeMap<DieType, String>>,
}

impl SkillDefinition {
    /// Table id for a rank and die. A rank with no tables of its own uses the
    /// Untrained tables.
    pub fn table_id(&self, rank: SkillRank, die: DieType) -> Option<&str> {
        self.rollable_tables
            .get(&rank)
            .or_else(|| self.rollable_tables.get(&SkillRank::Untrained))
            .and_then(|tables| tables.get(&die))
            .map(String::as_str)
    }

    /// Every table id referenced by this skill.
    pub fn table_ids(&self) -> impl Iterator<Item = (DieType, &str)> {
        self.rollable_tables
            .values()
            .flat_map(|tables| tables.iter().map(|(die, id)| (*die, id.as_str())))
    }
}

/// Current rank: the assigned rank if any, otherwise the highest rank whose quest
/// requirement is met.
pub fn rank_of(progress: &SkillProgress) -> SkillRank {
    progress
        .assigned_rank
        .unwrap_or_else(|| SkillRank::for_completed(progress.completed_quests.len()))
}

/// Quests to show: everything already completed plus anything at most one rank
/// above the current rank.
pub fn available_quests<'a>(quests: &'a [Quest], progress: &SkillProgress) -> Vec<&'a Quest> {
    let current = rank_of(progress).index();
    quests
        .iter()
        .filter(|q| progress.is_completed(&q.id) || q.rank.index() <= current + 1)
        .collect()
}

/// Check modifier for a skill:
/// `mod(primary) + floor(mod(secondary) / 2) + rank index + equipment skill bonus`.
///
/// `attributes` should already include equipment attribute bonuses.
pub fn skill_modifier(
    skill: &SkillDefinition,
    attributes: &AttributeSet,
    rank: SkillRank,
    bonuses: &EquipmentBonuses,
) -> i32 {
    attributes
        .modifier(skill.primary_stat)
        .saturating_add(attributes.modifier(skill.secondary_stat).div_euclid(2))
        .saturating_add(rank.index() as i32)
        .saturating_add(bonuses.skill(&skill.id))
}

/// The result of rolling on a skill's outcome table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRoll {
    pub skill_id: String,
    pub rank: SkillRank,
    pub die: DieType,
    pub table_id: String,
    pub table_name: String,
    pub roll: u32,
    pub outcome: OutcomeEntry,
}

/// Roll `die` on the table a skill uses at `rank`.
pub fn roll_skill_table<C, R>(
    content: &C,
    skill_id: &str,
    rank: SkillRank,
    die: DieType,
    rng: &mut R,
) -> Result<SkillRoll, SkillError>
where
    C: ContentProvider + ?Sized,
    R: Rng + ?Sized,
{
    if content.skill(skill_id).is_none() {
        return Err(SkillError::UnknownSkill(skill_id.to_string()));
    }
    let table = content
        .table_for(skill_id, rank, die)
        .ok_or_else(|| SkillError::NoTable {
            skill: skill_id.to_string(),
            rank,
            die,
        })?;

    let roll = die.roll_with_rng(rng);
    let outcome = resolve_check(table, roll)?.clone();
    debug!(
        skill = skill_id,
        table = %table.id,
        roll,
        tier = %outcome.tier,
        "skill check rolled"
    );

    Ok(SkillRoll {
        skill_id: skill_id.to_string(),
        rank,
        die,
        table_id: table.id.clone(),
        table_name: table.name.clone(),
        roll,
        outcome,
    })
}
