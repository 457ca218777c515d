//! Situational recommendation of a healing approach.

use super::EffectType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncomingDamage {
    #[default]
    None,
    Low,
    Moderate,
    High,
    Spike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatState {
    #[default]
    Normal,
    Critical,
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mobility {
    #[default]
    Stationary,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceConstraint {
    #[default]
    None,
    Low,
    Critical,
}

/// What the healer knows about the fight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Situation {
    /// Target health percent.
    pub target_health: f64,
    pub incoming_damage: IncomingDamage,
    pub target_count: u32,
    pub combat_state: CombatState,
    pub target_mobility: Mobility,
    pub resource_constraint: ResourceConstraint,
}

impl Default for Situation {
    fn default() -> Self {
        Self {
            target_health: 100.0,
            incoming_damage: IncomingDamage::None,
            target_count: 1,
            combat_state: CombatState::Normal,
            target_mobility: Mobility::Stationary,
            resource_constraint: ResourceConstraint::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_type: EffectType,
    pub secondary_type: EffectType,
    pub rationale: &'static str,
    pub target_priority: &'static str,
    pub resource_efficiency: &'static str,
}

impl Recommendation {
    const fn new(
        recommended_type: EffectType,
        secondary_type: EffectType,
        rationale: &'static str,
        target_priority: &'static str,
        resource_efficiency: &'static str,
    ) -> Self {
        Self {
            recommended_type,
            secondary_type,
            rationale,
            target_priority,
            resource_efficiency,
        }
    }
}

/// Pick a healing approach. Rules are checked in priority order and the first
/// match wins.
pub fn recommend_effect_type(situation: &Situation) -> Recommendation {
    use EffectType::*;

    if situation.target_health < 30.0
        || situation.incoming_damage == IncomingDamage::Spike
        || situation.combat_state == CombatState::Critical
    {
        return Recommendation::new(
            Direct,
            Shield,
            "Emergency situation requires immediate healing",
            "single target focus",
            "low",
        );
    }

    if situation.target_count > 2 {
        return match situation.resource_constraint {
            ResourceConstraint::Low | ResourceConstraint::Critical => Recommendation::new(
                Regeneration,
                Chain,
                "Multiple targets with resource constraints",
                "multi-target efficiency",
                "high",
            ),
            ResourceConstraint::None => Recommendation::new(
                Chain,
                Spirit,
                "Efficient multi-target healing",
                "group healing",
                "moderate",
            ),
        };
    }

    if situation.incoming_damage == IncomingDamage::Moderate
        && situation.target_mobility == Mobility::Stationary
    {
        return Recommendation::new(
            Spirit,
            Regeneration,
            "Stationary target with predictable damage",
            "single target focus",
            "very high",
        );
    }

    if situation.target_mobility == Mobility::Mobile
        && situation.incoming_damage != IncomingDamage::None
    {
        return Recommendation::new(
            Regeneration,
            Direct,
            "Mobile target with ongoing damage",
            "single target focus",
            "high",
        );
    }

    Recommendation::new(
        Conditional,
        Regeneration,
        "Stable situation allows for optimal resource usage",
        "efficiency",
        "moderate",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(situation: Situation) -> (EffectType, EffectType) {
        let r = recommend_effect_type(&situation);
        (r.recommended_type, r.secondary_type)
    }

    #[test]
    fn test_emergency_wins_over_everything() {
        let situation = Situation {
            target_health: 25.0,
            target_count: 5,
            ..Default::default()
        };
        assert_eq!(pick(situation), (EffectType::Direct, EffectType::Shield));

        let spike = Situation {
            incoming_damage: IncomingDamage::Spike,
            ..Default::default()
        };
        assert_eq!(pick(spike), (EffectType::Direct, EffectType::Shield));

        let critical = Situation {
            combat_state: CombatState::Critical,
            ..Default::default()
        };
        assert_eq!(pick(critical), (EffectType::Direct, EffectType::Shield));
    }

    #[test]
    fn test_group_healing() {
        let group = Situation {
            target_count: 3,
            ..Default::default()
        };
        assert_eq!(pick(group), (EffectType::Chain, EffectType::Spirit));

        let starved = Situation {
            resource_constraint: ResourceConstraint::Critical,
            ..group
        };
        assert_eq!(pick(starved), (EffectType::Regeneration, EffectType::Chain));
    }

    #[test]
    fn test_single_target_rules() {
        let steady = Situation {
            incoming_damage: IncomingDamage::Moderate,
            ..Default::default()
        };
        assert_eq!(pick(steady), (EffectType::Spirit, EffectType::Regeneration));

        let moving = Situation {
            incoming_damage: IncomingDamage::Low,
            target_mobility: Mobility::Mobile,
            ..Default::default()
        };
        assert_eq!(pick(moving), (EffectType::Regeneration, EffectType::Direct));

        assert_eq!(
            pick(Situation::default()),
            (EffectType::Conditional, EffectType::Regeneration)
        );
    }

    #[test]
    fn test_deserialize_partial_situation() {
        let situation: Situation =
            serde_json::from_str(r#"{ "targetCount": 4, "resourceConstraint": "low" }"#).unwrap();
        assert_eq!(situation.target_health, 100.0);
        assert_eq!(pick(situation), (EffectType::Regeneration, EffectType::Chain));
    }
}
