//! Testing utilities.
//!
//! This module provides fixtures for unit and integration tests:
//! - `sample_content` with a small but valid content set
//! - `sample_item` / `sample_engine` builders
//! - `TestHarness` for scripted character scenarios

use crate::character::Attribute;
use crate::config::EngineConfig;
use crate::content::StaticContent;
use crate::engine::CharacterEngine;
use crate::equipment::{EquipmentSlot, Item, ItemEffect};
use crate::resources::{ResourceKind, ResourceUpdate};
use crate::skills::SkillRank;
use serde_json::json;

/// Seed used by `sample_engine` so rolls are reproducible.
pub const SAMPLE_SEED: u64 = 0x5eed;

/// Content with two skills, their quests and tables, two items and two damage types.
///
/// Acrobatics has Untrained d4/d6 tables and a Novice d4 table; every other rank
/// falls back to Untrained. Weapon Mastery has a single Untrained d20 table.
pub fn sample_content() -> StaticContent {
    let acrobatics_quests: Vec<_> = [
        ("balance_beam", "NOVICE"),
        ("tumble", "NOVICE"),
        ("ledge_run", "APPRENTICE"),
        ("cartwheel", "APPRENTICE"),
        ("rooftop_chase", "TRAINED"),
        ("tightrope", "TRAINED"),
        ("wall_run", "ADEPT"),
        ("backflip", "ADEPT"),
        ("cliff_dive", "EXPERT"),
        ("storm_walk", "EXPERT"),
        ("feather_fall", "MASTER"),
        ("sky_dance", "MASTER"),
    ]
    .iter()
    .map(|(id, rank)| json!({ "id": id, "name": id.replace('_', " "), "rank": rank }))
    .collect();

    let value = json!({
        "skills": {
            "acrobatics": {
                "name": "Acrobatics",
                "category": "Exploration & Survival",
                "primaryStat": "agility",
                "secondaryStat": "strength",
                "rollableTables": {
                    "UNTRAINED": {
                        "d4": "acrobatics_untrained_d4",
                        "d6": "acrobatics_untrained_d6"
                    },
                    "NOVICE": { "d4": "acrobatics_novice_d4" }
                }
            },
            "weaponMastery": {
                "name": "Weapon Mastery",
                "category": "Combat Mastery",
                "primaryStat": "strength",
                "secondaryStat": "agility",
                "rollableTables": {
                    "UNTRAINED": { "d20": "weaponmastery_untrained_d20" }
                }
            }
        },
        "quests": {
            "acrobatics": acrobatics_quests,
            "weaponMastery": [
                { "id": "first_blood", "name": "First Blood", "rank": "NOVICE", "completed": false },
                { "id": "combat_stance", "name": "Combat Stance", "rank": "NOVICE" }
            ]
        },
        "tables": {
            "acrobatics_untrained_d4": {
                "name": "Untrained Acrobatics (d4)",
                "requiredRank": "UNTRAINED",
                "table": [
                    { "roll": [1, 1], "result": "You trip over your own feet", "type": "failure" },
                    { "roll": [2, 2], "result": "You stumble but catch yourself", "type": "normal" },
                    { "roll": [3, 3], "result": "You manage the movement awkwardly", "type": "success" },
                    { "roll": [4, 4], "result": "You complete it with clumsy grace", "type": "success" }
                ]
            },
            "acrobatics_untrained_d6": {
                "name": "Untrained Acrobatics (d6)",
                "requiredRank": "UNTRAINED",
                "table": [
                    { "roll": [1, 2], "result": "You lose balance and fall", "type": "failure" },
                    { "roll": [3, 4], "result": "You wobble but stay upright", "type": "normal" },
                    { "roll": [5, 6], "result": "You land ungracefully but safely", "type": "success" }
                ]
            },
            "acrobatics_novice_d4": {
                "name": "Novice Acrobatics (d4)",
                "requiredRank": "NOVICE",
                "table": [
                    { "roll": [1, 1], "result": "You misjudge the distance", "type": "failure" },
                    { "roll": [2, 3], "result": "You land cleanly", "type": "success" },
                    { "roll": [4, 4], "result": "You flow through it effortlessly", "type": "critical" }
                ]
            },
            "weaponmastery_untrained_d20": {
                "name": "Untrained Weapon Mastery (d20)",
                "table": [
                    { "roll": [1, 5], "result": "You fumble the swing", "type": "failure" },
                    { "roll": [6, 12], "result": "A clumsy but serviceable strike", "type": "normal" },
                    { "roll": [13, 19], "result": "A solid hit", "type": "success" },
                    { "roll": [20, 20], "result": "A perfect strike", "type": "critical" }
                ]
            }
        },
        "items": [
            {
                "id": "ember_amulet",
                "name": "Ember Amulet",
                "type": "accessory",
                "allowedSlots": ["neck"],
                "effects": { "resistances": { "fire": 10 } }
            },
            {
                "id": "iron_helm",
                "name": "Iron Helm",
                "type": "armor",
                "allowedSlots": ["head"],
                "effects": { "armor": 5, "resistances": { "fire": 10 } }
            }
        ],
        "damageTypes": {
            "fire": { "name": "Fire", "category": "elemental" },
            "necrotic": { "name": "Necrotic", "category": "shadow" }
        }
    });

    match StaticContent::from_value(value) {
        Ok(content) => content,
        Err(e) => panic!("sample content is malformed: {e}"),
    }
}

/// An item that fits any slot.
pub fn sample_item(id: &str, effects: Vec<ItemEffect>) -> Item {
    Item::new(id, id.replace('_', " ")).with_effects(effects)
}

/// A seeded engine named "Tester" over `sample_content`.
pub fn sample_engine() -> CharacterEngine {
    let config = EngineConfig::new("Tester").with_seed(SAMPLE_SEED);
    match CharacterEngine::new(config, sample_content()) {
        Ok(engine) => engine,
        Err(e) => panic!("sample engine failed to start: {e}"),
    }
}

/// Test harness for running character scenarios.
pub struct TestHarness {
    pub engine: CharacterEngine,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            engine: sample_engine(),
        }
    }

    /// Set several attributes at once.
    pub fn with_attributes(mut self, attributes: &[(Attribute, i32)]) -> Self {
        let mut set = *self.engine.attributes();
        for (attribute, value) in attributes {
            set.set(*attribute, *value);
        }
        self.engine.set_attributes(set);
        self
    }

    /// Equip an any-slot item carrying `effects`.
    pub fn equip(&mut self, slot: EquipmentSlot, id: &str, effects: Vec<ItemEffect>) -> &mut Self {
        if let Err(e) = self.engine.equip(slot, Some(sample_item(id, effects))) {
            panic!("equip failed: {e}");
        }
        self
    }

    /// Complete the first `count` quests of a skill, in content order.
    pub fn complete_quests(&mut self, skill_id: &str, count: usize) -> SkillRank {
        let ids: Vec<String> = crate::content::ContentProvider::quests(self.engine.content(), skill_id)
            .iter()
            .take(count)
            .map(|q| q.id.clone())
            .collect();
        for id in &ids {
            if let Err(e) = self.engine.complete_quest(skill_id, id) {
                panic!("completing {id} failed: {e}");
            }
        }
        self.engine.skill_rank(skill_id)
    }

    /// Wound the character down to `current` health.
    pub fn wound_to(&mut self, current: i32) -> &mut Self {
        self.engine
            .set_resource(ResourceKind::Health, ResourceUpdate::current(current));
        self
    }

    pub fn health(&self) -> (i32, i32) {
        let pool = self.engine.resource(ResourceKind::Health);
        (pool.current(), pool.max())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_basics() {
        let mut harness = TestHarness::new().with_attributes(&[(Attribute::Constitution, 14)]);
        // A raised maximum does not refill the pool.
        assert_eq!(harness.health(), (50, 70));

        harness.wound_to(10);
        assert_eq!(harness.health(), (10, 70));

        harness.equip(EquipmentSlot::Chest, "vest", vec![ItemEffect::scalar("maxHealth", 5)]);
        assert_eq!(harness.health(), (10, 75));

        assert_eq!(harness.complete_quests("acrobatics", 3), SkillRank::Apprentice);
    }
}
