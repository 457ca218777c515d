//! Read-only game content: skills, quests, outcome tables, items and damage types.
//!
//! The engine only sees content through [`ContentProvider`]. [`StaticContent`] is
//! the in-memory implementation, loaded from JSON. Records may carry fields the
//! engine does not know about; they are ignored.

use crate::dice::DieType;
use crate::equipment::Item;
use crate::outcomes::{OutcomeError, OutcomeTable};
use crate::skills::{Quest, SkillDefinition, SkillRank};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to parse content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid outcome table: {0}")]
    InvalidTable(#[from] OutcomeError),

    #[error("Skill {skill} references missing table {table}")]
    MissingTable { skill: String, table: String },
}

/// Source of static game content.
pub trait ContentProvider {
    fn skill(&self, skill_id: &str) -> Option<&SkillDefinition>;

    /// Quests belonging to a skill; empty for unknown skills.
    fn quests(&self, skill_id: &str) -> &[Quest];

    fn outcome_table(&self, table_id: &str) -> Option<&OutcomeTable>;

    fn item(&self, item_id: &str) -> Option<&Item>;

    fn damage_type(&self, damage_type_id: &str) -> Option<&DamageTypeInfo>;

    /// The table a skill rolls on at `rank` with `die`.
    fn table_for(&self, skill_id: &str, rank: SkillRank, die: DieType) -> Option<&OutcomeTable> {
        let table_id = self.skill(skill_id)?.table_id(rank, die)?;
        self.outcome_table(table_id)
    }

    fn quest(&self, skill_id: &str, quest_id: &str) -> Option<&Quest> {
        self.quests(skill_id).iter().find(|q| q.id == quest_id)
    }

    /// Integrity check run before the content is used. Accepts everything unless
    /// overridden.
    fn validate(&self) -> Result<(), ContentError> {
        Ok(())
    }
}

/// Display metadata for a damage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageTypeInfo {
    /// Filled from the content key when loaded from a map.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// In-memory content, deserialized from a JSON document of the form
/// `{ "skills": {..}, "quests": {..}, "tables": {..}, "items": [..], "damageTypes": {..} }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticContent {
    skills: BTreeMap<String, SkillDefinition>,
    quests: BTreeMap<String, Vec<Quest>>,
    tables: BTreeMap<String, OutcomeTable>,
    items: Vec<Item>,
    damage_types: BTreeMap<String, DamageTypeInfo>,
}

impl StaticContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let content: StaticContent = serde_json::from_str(json)?;
        Ok(content.with_keyed_ids())
    }

    pub fn from_value(value: Value) -> Result<Self, ContentError> {
        let content: StaticContent = serde_json::from_value(value)?;
        Ok(content.with_keyed_ids())
    }

    /// Records keyed by id may omit their own `id`; fill it from the key.
    fn with_keyed_ids(mut self) -> Self {
        for (key, skill) in self.skills.iter_mut() {
            if skill.id.is_empty() {
                skill.id = key.clone();
            }
        }
        for (key, table) in self.tables.iter_mut() {
            if table.id.is_empty() {
                table.id = key.clone();
            }
        }
        for (key, damage_type) in self.damage_types.iter_mut() {
            if damage_type.id.is_empty() {
                damage_type.id = key.clone();
            }
        }
        debug!(
            skills = self.skills.len(),
            tables = self.tables.len(),
            items = self.items.len(),
            "content loaded"
        );
        self
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.insert(skill.id.clone(), skill);
        self
    }

    pub fn with_quests(mut self, skill_id: impl Into<String>, quests: Vec<Quest>) -> Self {
        self.quests.insert(skill_id.into(), quests);
        self
    }

    pub fn with_table(mut self, table: OutcomeTable) -> Self {
        self.tables.insert(table.id.clone(), table);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_damage_type(mut self, damage_type: DamageTypeInfo) -> Self {
        self.damage_types.insert(damage_type.id.clone(), damage_type);
        self
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }
}

impl ContentProvider for StaticContent {
    fn skill(&self, skill_id: &str) -> Option<&SkillDefinition> {
        self.skills.get(skill_id)
    }

    fn quests(&self, skill_id: &str) -> &[Quest] {
        self.quests.get(skill_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn outcome_table(&self, table_id: &str) -> Option<&OutcomeTable> {
        self.tables.get(table_id)
    }

    fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    fn damage_type(&self, damage_type_id: &str) -> Option<&DamageTypeInfo> {
        self.damage_types.get(damage_type_id)
    }

    /// Check that every table a skill references exists and covers its die.
    fn validate(&self) -> Result<(), ContentError> {
        for skill in self.skills.values() {
            for (die, table_id) in skill.table_ids() {
                let Some(table) = self.tables.get(table_id) else {
                    error!(skill = %skill.id, table = table_id, "referenced table is missing");
                    return Err(ContentError::MissingTable {
                        skill: skill.id.clone(),
                        table: table_id.to_string(),
                    });
                };
                if let Err(e) = table.validate_coverage(die) {
                    error!(skill = %skill.id, error = %e, "outcome table failed validation");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}
