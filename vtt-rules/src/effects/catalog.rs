//! Built-in healing and shield catalog.
//!
//! Contains the healing types, healing categories and absorption shield variants
//! that the resolution functions look up by id.

use super::EffectError;
use serde::Serialize;

/// Get a healing type by id.
pub fn healing_type_info(id: &str) -> Option<&'static HealingTypeInfo> {
    HEALING_TYPES.iter().find(|t| t.id == id)
}

/// Get a healing category by id.
pub fn healing_category(id: &str) -> Option<&'static HealingCategory> {
    HEALING_CATEGORIES.iter().find(|c| c.id == id)
}

/// Get a shield variant by id.
pub fn shield_type(id: &str) -> Option<&'static ShieldType> {
    SHIELD_TYPES.iter().find(|s| s.id == id)
}

/// All healing types belonging to a category.
///
/// Category members without a calculable healing type (such as `shield`) are
/// skipped.
pub fn healing_types_by_category(
    category_id: &str,
) -> Result<Vec<&'static HealingTypeInfo>, EffectError> {
    let category = healing_category(category_id)
        .ok_or_else(|| EffectError::InvalidHealingCategory(category_id.to_string()))?;
    Ok(category
        .types
        .iter()
        .filter_map(|id| healing_type_info(id))
        .collect())
}

/// Reference data for a healing type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingTypeInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub action_point_cost: u32,
    /// Healing per resource point relative to direct healing.
    pub base_efficiency: f64,
    pub strong_against: &'static [&'static str],
    pub weak_against: &'static [&'static str],
}

/// A grouping of healing types for presentation and lookup.
#[derive(Debug, Clone, Serialize)]
pub struct HealingCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub types: &'static [&'static str],
    pub priority: &'static str,
}

/// How much punishment a shield is built to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Durability {
    Low,
    BelowAverage,
    Average,
    High,
}

/// Regeneration behavior of a shield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenSpec {
    /// Rounds before regeneration starts.
    pub delay: u32,
    /// Percent of total capacity restored per round.
    pub rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectSpec {
    /// Percent chance to reflect.
    pub chance: u32,
    /// Percent of the blocked damage reflected.
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementalSpec {
    pub damage_types: &'static [&'static str],
    pub specialization_multiplier: f64,
    pub other_types_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    pub layers: u32,
    pub regen_delay: u32,
    pub regen_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplosionSpec {
    /// Radius in feet.
    pub radius: u32,
    pub damage_type: &'static str,
}

/// An absorption shield variant. Optional descriptors are `None` when the variant
/// does not have that property at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldType {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub durability: Durability,
    pub multiplier: f64,
    pub action_point_cost: u32,
    pub regeneration: Option<RegenSpec>,
    pub damage_reduction: Option<u32>,
    pub reflect: Option<ReflectSpec>,
    pub elemental: Option<ElementalSpec>,
    pub layered: Option<LayerSpec>,
    /// Percent of absorbed damage converted into healing.
    pub absorption_rate: Option<u32>,
    pub explosion: Option<ExplosionSpec>,
}

impl ShieldType {
    const fn basic(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        durability: Durability,
        action_point_cost: u32,
    ) -> Self {
        Self {
            id,
            name,
            description,
            durability,
            multiplier: 1.0,
            action_point_cost,
            regeneration: None,
            damage_reduction: None,
            reflect: None,
            elemental: None,
            layered: None,
            absorption_rate: None,
            explosion: None,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

lazy_static::lazy_static! {
    /// Calculable healing types.
    pub static ref HEALING_TYPES: Vec<HealingTypeInfo> = vec![
        HealingTypeInfo {
            id: "direct",
            name: "Direct Healing",
            description: "Immediate healing effect that restores hit points",
            action_point_cost: 2,
            base_efficiency: 1.0,
            strong_against: &["burst damage", "spike damage"],
            weak_against: &["sustained damage", "damage over time"],
        },
        HealingTypeInfo {
            id: "regeneration",
            name: "Regeneration",
            description: "Healing over time effect that restores hit points gradually",
            action_point_cost: 2,
            base_efficiency: 1.5,
            strong_against: &["sustained damage", "damage over time"],
            weak_against: &["burst damage", "spike damage"],
        },
        HealingTypeInfo {
            id: "vampiric",
            name: "Vampiric Healing",
            description: "Drains health from a target and heals the caster",
            action_point_cost: 3,
            base_efficiency: 0.8,
            strong_against: &["solo content", "multiple weak enemies"],
            weak_against: &["healing others", "enemies with drain resistance"],
        },
        HealingTypeInfo {
            id: "conditional",
            name: "Conditional Healing",
            description: "More effective healing under specific conditions",
            action_point_cost: 2,
            base_efficiency: 1.2,
            strong_against: &["specific situations", "tactical play"],
            weak_against: &["unpredictable combat", "condition not being met"],
        },
        HealingTypeInfo {
            id: "resurrection",
            name: "Resurrection",
            description: "Brings fallen allies back to life",
            action_point_cost: 5,
            base_efficiency: 0.5,
            strong_against: &["defeating permadeath", "recovering from wipes"],
            weak_against: &["in-combat recovery", "cost efficiency"],
        },
        HealingTypeInfo {
            id: "spirit",
            name: "Spirit Healing",
            description: "Channeled healing that draws from spiritual energy",
            action_point_cost: 3,
            base_efficiency: 2.0,
            strong_against: &["predictable damage", "stationary targets"],
            weak_against: &["movement", "interrupts"],
        },
        HealingTypeInfo {
            id: "chain",
            name: "Chain Healing",
            description: "Healing that jumps between allies, weakening with each jump",
            action_point_cost: 3,
            base_efficiency: 1.3,
            strong_against: &["group damage", "spread out allies"],
            weak_against: &["single target emergencies"],
        },
    ];

    pub static ref HEALING_CATEGORIES: Vec<HealingCategory> = vec![
        HealingCategory {
            id: "direct",
            name: "Direct Healing",
            description: "Immediate healing effects",
            types: &["direct", "spirit"],
            priority: "immediate recovery",
        },
        HealingCategory {
            id: "overtime",
            name: "Healing Over Time",
            description: "Gradual healing effects",
            types: &["regeneration"],
            priority: "sustained recovery",
        },
        HealingCategory {
            id: "proactive",
            name: "Proactive Healing",
            description: "Preventative healing effects",
            types: &["absorption", "shield"],
            priority: "damage prevention",
        },
        HealingCategory {
            id: "specialized",
            name: "Specialized Healing",
            description: "Healing with special properties",
            types: &["vampiric", "conditional", "resurrection"],
            priority: "situational",
        },
        HealingCategory {
            id: "group",
            name: "Group Healing",
            description: "Healing multiple targets",
            types: &["chain", "aoe", "smart"],
            priority: "multiple targets",
        },
    ];

    /// Absorption shield variants.
    pub static ref SHIELD_TYPES: Vec<ShieldType> = vec![
        ShieldType::basic(
            "standard",
            "Standard Shield",
            "Basic protective barrier that absorbs all damage types equally",
            Durability::Average,
            2,
        ),
        ShieldType {
            multiplier: 1.5,
            ..ShieldType::basic(
                "fortified",
                "Fortified Shield",
                "Stronger shield with higher capacity but no regeneration",
                Durability::High,
                3,
            )
        },
        ShieldType {
            regeneration: Some(RegenSpec { delay: 1, rate: 20 }),
            ..ShieldType::basic(
                "regenerating",
                "Regenerating Shield",
                "Shield that regenerates over time while not taking damage",
                Durability::Average,
                3,
            )
        },
        ShieldType {
            multiplier: 0.75,
            damage_reduction: Some(25),
            reflect: Some(ReflectSpec { chance: 20, amount: 30 }),
            ..ShieldType::basic(
                "reactive",
                "Reactive Shield",
                "Shield that reduces damage and can reflect part of it",
                Durability::Low,
                3,
            )
        },
        ShieldType {
            elemental: Some(ElementalSpec {
                damage_types: &["fire", "cold", "lightning", "acid", "thunder"],
                specialization_multiplier: 2.0,
                other_types_multiplier: 0.5,
            }),
            ..ShieldType::basic(
                "elemental",
                "Elemental Shield",
                "Shield specialized against specific damage types",
                Durability::Average,
                2,
            )
        },
        ShieldType {
            layered: Some(LayerSpec { layers: 3, regen_delay: 2, regen_rate: 25 }),
            ..ShieldType::basic(
                "layered",
                "Layered Shield",
                "Multiple shield layers that absorb damage sequentially",
                Durability::High,
                4,
            )
        },
        ShieldType {
            multiplier: 0.8,
            absorption_rate: Some(25),
            ..ShieldType::basic(
                "absorbing",
                "Absorbing Shield",
                "Shield that converts a portion of absorbed damage into healing",
                Durability::BelowAverage,
                3,
            )
        },
        ShieldType {
            explosion: Some(ExplosionSpec { radius: 15, damage_type: "force" }),
            ..ShieldType::basic(
                "overloading",
                "Overloading Shield",
                "Shield that explodes when depleted, damaging nearby enemies",
                Durability::Average,
                3,
            )
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(healing_type_info("spirit").unwrap().action_point_cost, 3);
        assert!(healing_type_info("smite").is_none());
        assert_eq!(shield_type("fortified").unwrap().multiplier, 1.5);
        assert!(shield_type("regenerating").unwrap().regeneration.is_some());
        assert!(shield_type("standard").unwrap().regeneration.is_none());
    }

    #[test]
    fn test_types_by_category() {
        let ids: Vec<_> = healing_types_by_category("specialized")
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["vampiric", "conditional", "resurrection"]);

        // Only calculable members are returned.
        let group: Vec<_> = healing_types_by_category("group")
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(group, vec!["chain"]);

        assert_eq!(
            healing_types_by_category("mystery").unwrap_err(),
            EffectError::InvalidHealingCategory("mystery".to_string())
        );
    }
}
