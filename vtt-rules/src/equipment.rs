//! Equipment slots, items and bonus aggregation.
//!
//! Item effects are a tagged union ([`ItemEffect`]) folded by variant into an
//! [`EquipmentBonuses`] record. Bonuses are never stored; they are recomputed from
//! the slots every time the slots change.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

// ============================================================================
// Slots
// ============================================================================

/// Named equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentSlot {
    Head,
    Neck,
    Shoulders,
    Back,
    Chest,
    Shirt,
    Tabard,
    Wrists,
    Hands,
    Waist,
    Legs,
    Feet,
    Ring1,
    Ring2,
    Trinket1,
    Trinket2,
    MainHand,
    OffHand,
    Ranged,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 19] = [
        EquipmentSlot::Head,
        EquipmentSlot::Neck,
        EquipmentSlot::Shoulders,
        EquipmentSlot::Back,
        EquipmentSlot::Chest,
        EquipmentSlot::Shirt,
        EquipmentSlot::Tabard,
        EquipmentSlot::Wrists,
        EquipmentSlot::Hands,
        EquipmentSlot::Waist,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
        EquipmentSlot::Ring1,
        EquipmentSlot::Ring2,
        EquipmentSlot::Trinket1,
        EquipmentSlot::Trinket2,
        EquipmentSlot::MainHand,
        EquipmentSlot::OffHand,
        EquipmentSlot::Ranged,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Head => "head",
            EquipmentSlot::Neck => "neck",
            EquipmentSlot::Shoulders => "shoulders",
            EquipmentSlot::Back => "back",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Shirt => "shirt",
            EquipmentSlot::Tabard => "tabard",
            EquipmentSlot::Wrists => "wrists",
            EquipmentSlot::Hands => "hands",
            EquipmentSlot::Waist => "waist",
            EquipmentSlot::Legs => "legs",
            EquipmentSlot::Feet => "feet",
            EquipmentSlot::Ring1 => "ring1",
            EquipmentSlot::Ring2 => "ring2",
            EquipmentSlot::Trinket1 => "trinket1",
            EquipmentSlot::Trinket2 => "trinket2",
            EquipmentSlot::MainHand => "mainHand",
            EquipmentSlot::OffHand => "offHand",
            EquipmentSlot::Ranged => "ranged",
        }
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Items
// ============================================================================

/// A single bonus contributed by an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemEffect {
    /// Flat bonus to a named stat (`armor`, `maxHealth`, `strength`, ...).
    Scalar { stat: String, delta: i32 },
    /// Bonus to resistance against a damage type.
    Resistance { damage_type: String, delta: i32 },
    /// Bonus to spell power of one element.
    SpellPower { element: String, delta: i32 },
    /// Bonus to a skill.
    Skill { skill_id: String, delta: i32 },
    /// Complete immunity to a damage type.
    Immunity { damage_type: String },
}

impl ItemEffect {
    pub fn scalar(stat: impl Into<String>, delta: i32) -> Self {
        ItemEffect::Scalar {
            stat: stat.into(),
            delta,
        }
    }

    pub fn resistance(damage_type: impl Into<String>, delta: i32) -> Self {
        ItemEffect::Resistance {
            damage_type: damage_type.into(),
            delta,
        }
    }

    pub fn spell_power(element: impl Into<String>, delta: i32) -> Self {
        ItemEffect::SpellPower {
            element: element.into(),
            delta,
        }
    }

    pub fn skill(skill_id: impl Into<String>, delta: i32) -> Self {
        ItemEffect::Skill {
            skill_id: skill_id.into(),
            delta,
        }
    }

    /// Convert a legacy effects bag (`{ "armor": 5, "resistances": { "fire": 10 } }`)
    /// into tagged effects. Entries that are neither numbers nor one of the known
    /// nested maps are skipped.
    pub fn from_legacy_payload(payload: &Value) -> Vec<ItemEffect> {
        let Some(entries) = payload.as_object() else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        for (key, value) in entries {
            if value.is_number() {
                match json_number(value) {
                    Some(delta) => effects.push(ItemEffect::scalar(key.clone(), delta)),
                    None => warn!(key = %key, value = %value, "skipping out-of-range effect value"),
                }
                continue;
            }

            let Some(nested) = value.as_object() else {
                if key == "immunities" {
                    if let Some(list) = value.as_array() {
                        effects.extend(list.iter().filter_map(Value::as_str).map(|t| {
                            ItemEffect::Immunity {
                                damage_type: t.to_string(),
                            }
                        }));
                        continue;
                    }
                }
                warn!(key = %key, "skipping non-numeric effect entry");
                continue;
            };

            let make: fn(String, i32) -> ItemEffect = match key.as_str() {
                "resistances" => |damage_type, delta| ItemEffect::Resistance { damage_type, delta },
                "spellDamageTypes" => |element, delta| ItemEffect::SpellPower { element, delta },
                "skills" => |skill_id, delta| ItemEffect::Skill { skill_id, delta },
                _ => {
                    warn!(key = %key, "skipping unknown nested effect map");
                    continue;
                }
            };

            for (name, nested_value) in nested {
                match json_number(nested_value) {
                    Some(delta) => effects.push(make(name.clone(), delta)),
                    None => warn!(key = %key, entry = %name, "skipping unreadable nested effect"),
                }
            }
        }
        effects
    }
}

/// A JSON number that fits in an `i32`. Fractions are rounded.
fn json_number(value: &Value) -> Option<i32> {
    if let Some(v) = value.as_i64() {
        return i32::try_from(v).ok();
    }
    value
        .as_f64()
        .map(f64::round)
        .filter(|v| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(v))
        .map(|v| v as i32)
}

/// Broad item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Accessory,
    Clothing,
    Consumable,
    #[default]
    #[serde(other)]
    Miscellaneous,
}

/// An equippable item. Display metadata is carried but never read by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "deserialize_effects")]
    pub effects: Vec<ItemEffect>,
    /// Slots this item may occupy. Empty means any slot.
    #[serde(default)]
    pub allowed_slots: Vec<EquipmentSlot>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Accept either the tagged list or the legacy effects bag.
fn deserialize_effects<'de, D>(deserializer: D) -> Result<Vec<ItemEffect>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        Value::Null => Ok(Vec::new()),
        other => Ok(ItemEffect::from_legacy_payload(&other)),
    }
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: ItemType::default(),
            subtype: None,
            effects: Vec::new(),
            allowed_slots: Vec::new(),
            icon: None,
            description: None,
        }
    }

    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    pub fn with_effect(mut self, effect: ItemEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: Vec<ItemEffect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_slots(mut self, slots: Vec<EquipmentSlot>) -> Self {
        self.allowed_slots = slots;
        self
    }

    pub fn fits(&self, slot: EquipmentSlot) -> bool {
        self.allowed_slots.is_empty() || self.allowed_slots.contains(&slot)
    }
}

/// What is currently equipped, slot by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSlots {
    slots: BTreeMap<EquipmentSlot, Item>,
}

impl EquipmentSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `item` in `slot` (or clear it with `None`), returning what was there.
    pub fn set(&mut self, slot: EquipmentSlot, item: Option<Item>) -> Option<Item> {
        match item {
            Some(item) => self.slots.insert(slot, item),
            None => self.slots.remove(&slot),
        }
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&Item> {
        self.slots.get(&slot)
    }

    pub fn is_occupied(&self, slot: EquipmentSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn occupied(&self) -> impl Iterator<Item = (EquipmentSlot, &Item)> {
        self.slots.iter().map(|(slot, item)| (*slot, item))
    }

    pub fn bonuses(&self) -> EquipmentBonuses {
        aggregate(self)
    }
}

// ============================================================================
// Bonuses
// ============================================================================

/// Additive fold of every equipped item's effects. Missing entries read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentBonuses {
    pub scalars: BTreeMap<String, i32>,
    pub resistances: BTreeMap<String, i32>,
    pub spell_damage_types: BTreeMap<String, i32>,
    pub skills: BTreeMap<String, i32>,
    pub immunities: BTreeSet<String>,
}

impl EquipmentBonuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(&self, stat: &str) -> i32 {
        self.scalars.get(stat).copied().unwrap_or(0)
    }

    pub fn armor(&self) -> i32 {
        self.scalar("armor")
    }

    pub fn resistance(&self, damage_type: &str) -> i32 {
        self.resistances.get(damage_type).copied().unwrap_or(0)
    }

    pub fn spell_power(&self, element: &str) -> i32 {
        self.spell_damage_types.get(element).copied().unwrap_or(0)
    }

    pub fn skill(&self, skill_id: &str) -> i32 {
        self.skills.get(skill_id).copied().unwrap_or(0)
    }

    pub fn is_immune(&self, damage_type: &str) -> bool {
        self.immunities.contains(damage_type)
    }

    /// Fold one effect into the record.
    pub fn add(&mut self, effect: &ItemEffect) {
        match effect {
            ItemEffect::Scalar { stat, delta } => add_into(&mut self.scalars, stat, *delta),
            ItemEffect::Resistance { damage_type, delta } => {
                add_into(&mut self.resistances, damage_type, *delta)
            }
            ItemEffect::SpellPower { element, delta } => {
                add_into(&mut self.spell_damage_types, element, *delta)
            }
            ItemEffect::Skill { skill_id, delta } => add_into(&mut self.skills, skill_id, *delta),
            ItemEffect::Immunity { damage_type } => {
                self.immunities.insert(damage_type.clone());
            }
        }
    }

    /// Field-by-field sum of two bonus records.
    pub fn merge(&self, other: &EquipmentBonuses) -> EquipmentBonuses {
        let mut merged = self.clone();
        for (k, v) in &other.scalars {
            add_into(&mut merged.scalars, k, *v);
        }
        for (k, v) in &other.resistances {
            add_into(&mut merged.resistances, k, *v);
        }
        for (k, v) in &other.spell_damage_types {
            add_into(&mut merged.spell_damage_types, k, *v);
        }
        for (k, v) in &other.skills {
            add_into(&mut merged.skills, k, *v);
        }
        merged.immunities.extend(other.immunities.iter().cloned());
        merged
    }
}

fn add_into(map: &mut BTreeMap<String, i32>, key: &str, delta: i32) {
    let total = map.entry(key.to_string()).or_insert(0);
    *total = total.saturating_add(delta);
}

/// Fold every occupied slot into a single bonus record.
pub fn aggregate(slots: &EquipmentSlots) -> EquipmentBonuses {
    let mut bonuses = EquipmentBonuses::new();
    for (_, item) in slots.occupied() {
        for effect in &item.effects {
            bonuses.add(effect);
        }
    }
    bonuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fire_helm() -> Item {
        Item::new("fire_helm", "Helm of Embers")
            .with_effect(ItemEffect::scalar("armor", 5))
            .with_effect(ItemEffect::resistance("fire", 10))
    }

    #[test]
    fn test_equip_then_unequip_leaves_no_residue() {
        let mut slots = EquipmentSlots::new();
        slots.set(EquipmentSlot::Head, Some(fire_helm()));

        let bonuses = aggregate(&slots);
        assert_eq!(bonuses.armor(), 5);
        assert_eq!(bonuses.resistance("fire"), 10);

        let removed = slots.set(EquipmentSlot::Head, None);
        assert_eq!(removed.map(|i| i.id), Some("fire_helm".to_string()));

        let bonuses = aggregate(&slots);
        assert_eq!(bonuses.armor(), 0);
        assert_eq!(bonuses.resistance("fire"), 0);
        assert_eq!(bonuses, EquipmentBonuses::new());
    }

    #[test]
    fn test_bonuses_stack_across_slots() {
        let mut slots = EquipmentSlots::new();
        slots.set(EquipmentSlot::Head, Some(fire_helm()));
        slots.set(
            EquipmentSlot::Ring1,
            Some(
                Item::new("ember_ring", "Ember Ring")
                    .with_effect(ItemEffect::resistance("fire", 5))
                    .with_effect(ItemEffect::spell_power("fire", 3))
                    .with_effect(ItemEffect::scalar("glimmer", 2)),
            ),
        );

        let bonuses = aggregate(&slots);
        assert_eq!(bonuses.resistance("fire"), 15);
        assert_eq!(bonuses.spell_power("fire"), 3);
        // Unknown stat names are still accumulated.
        assert_eq!(bonuses.scalar("glimmer"), 2);
    }

    #[test]
    fn test_item_without_effects_contributes_nothing() {
        let mut slots = EquipmentSlots::new();
        slots.set(EquipmentSlot::Shirt, Some(Item::new("shirt", "Linen Shirt")));
        assert_eq!(aggregate(&slots), EquipmentBonuses::new());
    }

    #[test]
    fn test_legacy_payload_conversion() {
        let effects = ItemEffect::from_legacy_payload(&json!({
            "armor": 5,
            "maxHealth": 12.0,
            "resistances": { "fire": 10, "cold": "lots" },
            "spellDamageTypes": { "frost": 4 },
            "skills": { "stealth": 1 },
            "immunities": ["poison"],
            "flavor": "shiny"
        }));

        assert!(effects.contains(&ItemEffect::scalar("armor", 5)));
        assert!(effects.contains(&ItemEffect::scalar("maxHealth", 12)));
        assert!(effects.contains(&ItemEffect::resistance("fire", 10)));
        assert!(effects.contains(&ItemEffect::spell_power("frost", 4)));
        assert!(effects.contains(&ItemEffect::skill("stealth", 1)));
        assert!(effects.contains(&ItemEffect::Immunity {
            damage_type: "poison".to_string()
        }));
        assert_eq!(effects.len(), 6);
    }

    #[test]
    fn test_legacy_values_outside_i32_are_skipped() {
        let effects = ItemEffect::from_legacy_payload(&json!({
            "armor": 4294967301u64,
            "maxHealth": -1e12,
            "critChance": 2,
            "resistances": { "fire": 4294967301u64, "cold": 3 }
        }));

        assert_eq!(effects.len(), 2);
        assert!(effects.contains(&ItemEffect::scalar("critChance", 2)));
        assert!(effects.contains(&ItemEffect::resistance("cold", 3)));
    }

    #[test]
    fn test_stacked_bonuses_saturate() {
        let mut slots = EquipmentSlots::new();
        slots.set(
            EquipmentSlot::Head,
            Some(Item::new("crown", "Crown").with_effect(ItemEffect::scalar("armor", i32::MAX))),
        );
        slots.set(
            EquipmentSlot::Feet,
            Some(Item::new("boots", "Boots").with_effect(ItemEffect::scalar("armor", 1))),
        );
        let bonuses = aggregate(&slots);
        assert_eq!(bonuses.armor(), i32::MAX);
        assert_eq!(bonuses.merge(&bonuses).armor(), i32::MAX);
    }

    #[test]
    fn test_item_deserializes_legacy_and_tagged_effects() {
        let legacy: Item = serde_json::from_value(json!({
            "id": "buckler",
            "name": "Buckler",
            "type": "armor",
            "effects": { "armor": 2 },
            "rarity": "common"
        }))
        .unwrap();
        assert_eq!(legacy.effects, vec![ItemEffect::scalar("armor", 2)]);
        assert_eq!(legacy.item_type, ItemType::Armor);

        let tagged: Item = serde_json::from_value(json!({
            "id": "charm",
            "name": "Charm",
            "type": "trinket",
            "effects": [{ "kind": "skill", "skill_id": "stealth", "delta": 2 }]
        }))
        .unwrap();
        assert_eq!(tagged.effects, vec![ItemEffect::skill("stealth", 2)]);
        assert_eq!(tagged.item_type, ItemType::Miscellaneous);
    }

    #[test]
    fn test_slot_restrictions() {
        let ring = Item::new("ring", "Ring").with_slots(vec![EquipmentSlot::Ring1, EquipmentSlot::Ring2]);
        assert!(ring.fits(EquipmentSlot::Ring2));
        assert!(!ring.fits(EquipmentSlot::Head));
        assert!(fire_helm().fits(EquipmentSlot::Feet));
    }

    #[test]
    fn test_merge_matches_combined_aggregate() {
        let mut a = EquipmentSlots::new();
        a.set(EquipmentSlot::Head, Some(fire_helm()));
        let mut b = EquipmentSlots::new();
        b.set(
            EquipmentSlot::Feet,
            Some(Item::new("boots", "Boots").with_effect(ItemEffect::scalar("moveSpeed", 5))),
        );

        let mut both = a.clone();
        both.set(EquipmentSlot::Feet, b.get(EquipmentSlot::Feet).cloned());

        assert_eq!(aggregate(&both), aggregate(&a).merge(&aggregate(&b)));
    }
}
