//! Derived stat calculation.
//!
//! `derive` is a pure function of (attributes, equipment bonuses, encumbrance).
//! The pipeline runs in a fixed order:
//! 1. Effective attributes (base + attribute-named equipment bonuses)
//! 2. Base formulas
//! 3. Flat equipment bonuses for every matching derived field
//! 4. Percentage equipment bonuses
//! 5. Encumbrance scaling of movement and regeneration

use crate::character::{Attribute, AttributeSet};
use crate::equipment::EquipmentBonuses;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Base movement speed in feet per round.
pub const BASE_MOVE_SPEED: i32 = 30;
pub const BASE_SWIM_SPEED: i32 = 10;
pub const BASE_CLIMB_SPEED: i32 = 15;

/// Carry-weight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncumbranceTier {
    #[default]
    Normal,
    Encumbered,
    Overencumbered,
}

impl EncumbranceTier {
    /// Classify a carried load. Capacity is split into three equal sections:
    /// the first third is unencumbered, the second encumbered, anything beyond
    /// overencumbered.
    pub fn from_load(carried: f64, capacity: f64) -> Self {
        if capacity <= 0.0 {
            return if carried > 0.0 {
                EncumbranceTier::Overencumbered
            } else {
                EncumbranceTier::Normal
            };
        }
        let ratio = carried / capacity;
        if ratio <= 1.0 / 3.0 {
            EncumbranceTier::Normal
        } else if ratio <= 2.0 / 3.0 {
            EncumbranceTier::Encumbered
        } else {
            EncumbranceTier::Overencumbered
        }
    }
}

impl fmt::Display for EncumbranceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncumbranceTier::Normal => "normal",
            EncumbranceTier::Encumbered => "encumbered",
            EncumbranceTier::Overencumbered => "overencumbered",
        };
        write!(f, "{name}")
    }
}

/// Everything computed from attributes and equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub max_health: i32,
    pub max_mana: i32,
    pub health_regen: i32,
    pub mana_regen: i32,
    pub melee_damage: i32,
    pub spell_damage: i32,
    pub healing_power: i32,
    pub ranged_damage: i32,
    pub armor: i32,
    pub crit_chance: i32,
    pub carrying_capacity: i32,
    pub move_speed: i32,
    pub swim_speed: i32,
    pub climb_speed: i32,
}

/// Percentage bonus keys and the field each one scales.
const PERCENT_BONUSES: [(&str, &str); 5] = [
    ("maxHealthPercent", "maxHealth"),
    ("maxManaPercent", "maxMana"),
    ("healthRegenPercent", "healthRegen"),
    ("manaRegenPercent", "manaRegen"),
    ("healingPowerPercent", "healingPower"),
];

impl DerivedStats {
    /// Base formulas, before any equipment bonus. Products saturate at the `i32`
    /// limits.
    pub fn base(attrs: &AttributeSet) -> Self {
        Self {
            max_health: attrs.constitution.saturating_mul(5),
            max_mana: attrs.intelligence.saturating_mul(5),
            health_regen: attrs.constitution.div_euclid(2),
            mana_regen: attrs.intelligence.saturating_add(attrs.spirit).div_euclid(4),
            melee_damage: attrs.strength.div_euclid(2),
            spell_damage: attrs.intelligence.div_euclid(2),
            healing_power: attrs.spirit.div_euclid(2),
            ranged_damage: attrs.agility.div_euclid(2),
            armor: attrs.agility.div_euclid(2),
            crit_chance: attrs.agility.div_euclid(5),
            carrying_capacity: attrs.strength.saturating_mul(15),
            move_speed: BASE_MOVE_SPEED,
            swim_speed: BASE_SWIM_SPEED,
            climb_speed: BASE_CLIMB_SPEED,
        }
    }

    /// Look up a field by its camelCase name.
    pub fn get(&self, name: &str) -> Option<i32> {
        let mut copy = *self;
        copy.field_mut(name).map(|v| *v)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut i32> {
        let field = match name {
            "maxHealth" => &mut self.max_health,
            "maxMana" => &mut self.max_mana,
            "healthRegen" => &mut self.health_regen,
            "manaRegen" => &mut self.mana_regen,
            "meleeDamage" | "damage" => &mut self.melee_damage,
            "spellDamage" => &mut self.spell_damage,
            "healingPower" => &mut self.healing_power,
            "rangedDamage" => &mut self.ranged_damage,
            "armor" => &mut self.armor,
            "critChance" => &mut self.crit_chance,
            "carryingCapacity" => &mut self.carrying_capacity,
            "moveSpeed" => &mut self.move_speed,
            "swimSpeed" => &mut self.swim_speed,
            "climbSpeed" => &mut self.climb_speed,
            _ => return None,
        };
        Some(field)
    }

    fn apply_flat_bonuses(&mut self, bonuses: &EquipmentBonuses) {
        for (stat, delta) in &bonuses.scalars {
            if let Some(field) = self.field_mut(stat) {
                *field = field.saturating_add(*delta);
            }
        }
    }

    fn apply_percent_bonuses(&mut self, bonuses: &EquipmentBonuses) {
        for (key, target) in PERCENT_BONUSES {
            let percent = bonuses.scalar(key);
            if percent == 0 {
                continue;
            }
            if let Some(field) = self.field_mut(target) {
                *field = scale(*field, 1.0 + f64::from(percent) / 100.0);
            }
        }
    }

    fn apply_encumbrance(&mut self, tier: EncumbranceTier) {
        match tier {
            EncumbranceTier::Normal => {}
            EncumbranceTier::Encumbered => {
                self.move_speed = scale(self.move_speed, 0.75);
                self.health_regen = scale(self.health_regen, 0.5);
                self.mana_regen = scale(self.mana_regen, 0.5);
                self.swim_speed = scale(self.swim_speed, 0.95);
                self.climb_speed = scale(self.climb_speed, 0.95);
            }
            EncumbranceTier::Overencumbered => {
                self.move_speed = scale(self.move_speed, 0.25);
                self.health_regen = 0;
                self.mana_regen = 0;
                self.swim_speed = scale(self.swim_speed, 0.85);
                self.climb_speed = scale(self.climb_speed, 0.85);
            }
        }
    }
}

fn scale(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor).floor() as i32
}

/// Base attributes plus any equipment bonus named after an attribute.
pub fn effective_attributes(attrs: &AttributeSet, bonuses: &EquipmentBonuses) -> AttributeSet {
    let mut effective = *attrs;
    for attribute in Attribute::ALL {
        let bonus = bonuses.scalar(attribute.key());
        if bonus != 0 {
            effective.set(attribute, attrs.get(attribute).saturating_add(bonus));
        }
    }
    effective
}

/// Compute the full derived stat set.
pub fn derive(
    attrs: &AttributeSet,
    bonuses: &EquipmentBonuses,
    tier: EncumbranceTier,
) -> DerivedStats {
    let effective = effective_attributes(attrs, bonuses);
    let mut stats = DerivedStats::base(&effective);
    stats.apply_flat_bonuses(bonuses);
    stats.apply_percent_bonuses(bonuses);
    stats.apply_encumbrance(tier);

    debug!(
        encumbrance = %tier,
        max_health = stats.max_health,
        max_mana = stats.max_mana,
        armor = stats.armor,
        move_speed = stats.move_speed,
        "derived stats recomputed"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{EquipmentSlot, EquipmentSlots, Item, ItemEffect};

    fn bonuses_from(effects: Vec<ItemEffect>) -> EquipmentBonuses {
        let mut slots = EquipmentSlots::new();
        slots.set(
            EquipmentSlot::Chest,
            Some(Item::new("test", "Test Item").with_effects(effects)),
        );
        slots.bonuses()
    }

    #[test]
    fn test_strength_sixteen_no_equipment() {
        let attrs = AttributeSet::default().with(Attribute::Strength, 16);
        let stats = derive(&attrs, &EquipmentBonuses::new(), EncumbranceTier::Normal);
        assert_eq!(stats.melee_damage, 8);
        assert_eq!(stats.carrying_capacity, 240);
    }

    #[test]
    fn test_base_formulas() {
        let attrs = AttributeSet::new(12, 15, 14, 13, 11, 10);
        let stats = derive(&attrs, &EquipmentBonuses::new(), EncumbranceTier::Normal);
        assert_eq!(stats.max_health, 55);
        assert_eq!(stats.max_mana, 70);
        assert_eq!(stats.health_regen, 5);
        assert_eq!(stats.mana_regen, 6);
        assert_eq!(stats.spell_damage, 7);
        assert_eq!(stats.healing_power, 6);
        assert_eq!(stats.ranged_damage, 7);
        assert_eq!(stats.armor, 7);
        assert_eq!(stats.crit_chance, 3);
        assert_eq!(stats.move_speed, 30);
    }

    #[test]
    fn test_flat_bonuses_add_after_base() {
        let bonuses = bonuses_from(vec![
            ItemEffect::scalar("armor", 5),
            ItemEffect::scalar("moveSpeed", 10),
            ItemEffect::scalar("damage", 2),
            ItemEffect::scalar("critChance", 1),
        ]);
        let stats = derive(&AttributeSet::default(), &bonuses, EncumbranceTier::Normal);
        assert_eq!(stats.armor, 10);
        assert_eq!(stats.move_speed, 40);
        assert_eq!(stats.melee_damage, 7);
        assert_eq!(stats.crit_chance, 3);
    }

    #[test]
    fn test_attribute_bonuses_feed_formulas() {
        let bonuses = bonuses_from(vec![ItemEffect::scalar("constitution", 4)]);
        let stats = derive(&AttributeSet::default(), &bonuses, EncumbranceTier::Normal);
        assert_eq!(stats.max_health, 70);
        assert_eq!(stats.health_regen, 7);
    }

    #[test]
    fn test_percent_bonuses() {
        let bonuses = bonuses_from(vec![
            ItemEffect::scalar("maxHealth", 10),
            ItemEffect::scalar("maxHealthPercent", 10),
        ]);
        let stats = derive(&AttributeSet::default(), &bonuses, EncumbranceTier::Normal);
        // (50 + 10) * 1.1
        assert_eq!(stats.max_health, 66);
    }

    #[test]
    fn test_encumbrance_scales_post_equipment_values() {
        let bonuses = bonuses_from(vec![
            ItemEffect::scalar("moveSpeed", 10),
            ItemEffect::scalar("healthRegen", 3),
        ]);
        let attrs = AttributeSet::default();

        let encumbered = derive(&attrs, &bonuses, EncumbranceTier::Encumbered);
        assert_eq!(encumbered.move_speed, 30); // floor(40 * 0.75)
        assert_eq!(encumbered.health_regen, 4); // floor(8 * 0.5)
        assert_eq!(encumbered.mana_regen, 2); // floor(5 * 0.5)

        let over = derive(&attrs, &bonuses, EncumbranceTier::Overencumbered);
        assert_eq!(over.move_speed, 10);
        assert_eq!(over.health_regen, 0);
        assert_eq!(over.mana_regen, 0);
        assert_eq!(over.swim_speed, 8);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let attrs = AttributeSet::new(17, 9, 13, 8, 15, 12);
        let bonuses = bonuses_from(vec![ItemEffect::scalar("armor", 3)]);
        let first = derive(&attrs, &bonuses, EncumbranceTier::Encumbered);
        let second = derive(&attrs, &bonuses, EncumbranceTier::Encumbered);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let attrs = AttributeSet::new(i32::MIN, 10, i32::MAX, i32::MAX, i32::MAX, 10);
        let bonuses = bonuses_from(vec![
            ItemEffect::scalar("armor", i32::MAX),
            ItemEffect::scalar("armor", 1),
            ItemEffect::scalar("constitution", i32::MAX),
            ItemEffect::scalar("maxHealthPercent", 50),
        ]);
        let stats = derive(&attrs, &bonuses, EncumbranceTier::Normal);
        assert_eq!(stats.max_health, i32::MAX);
        assert_eq!(stats.max_mana, i32::MAX);
        assert_eq!(stats.mana_regen, i32::MAX / 4);
        assert_eq!(stats.carrying_capacity, i32::MIN);
        assert_eq!(stats.armor, i32::MAX);
    }

    #[test]
    fn test_get_by_name() {
        let stats = DerivedStats::base(&AttributeSet::default());
        assert_eq!(stats.get("maxHealth"), Some(50));
        assert_eq!(stats.get("moveSpeed"), Some(30));
        assert_eq!(stats.get("charm"), None);
    }

    #[test]
    fn test_encumbrance_from_load() {
        assert_eq!(EncumbranceTier::from_load(50.0, 150.0), EncumbranceTier::Normal);
        assert_eq!(EncumbranceTier::from_load(90.0, 150.0), EncumbranceTier::Encumbered);
        assert_eq!(
            EncumbranceTier::from_load(120.0, 150.0),
            EncumbranceTier::Overencumbered
        );
        assert_eq!(EncumbranceTier::from_load(0.0, 0.0), EncumbranceTier::Normal);
    }
}
