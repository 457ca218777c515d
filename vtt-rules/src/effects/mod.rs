//! Effect resolution: healing, absorption shields, chain falloff and the
//! situational recommendation table.
//!
//! Every resolver is pure and total. A bad request never panics and never returns
//! `Err`; it yields a zero-amount result with [`EffectError`] attached, so callers
//! can surface the failure without unwinding.

pub mod catalog;
pub mod healing;
pub mod recommend;
pub mod shields;

pub use catalog::{healing_category, healing_type_info, healing_types_by_category, shield_type};
pub use healing::{calculate_healing, ChainFalloff, HealingDetail, HealingParams, HealingResult};
pub use recommend::{recommend_effect_type, Recommendation, Situation};
pub use shields::{shield_effectiveness, ShieldParams, ShieldResult};

use crate::character::{attribute_modifier, AttributeSet};
use crate::dice::{DiceError, DiceExpression};
use crate::equipment::EquipmentBonuses;
use crate::CharacterId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum EffectError {
    #[error("Missing required parameter: {field}")]
    MissingParameter { field: String },

    #[error("Invalid dice notation in {field}: {error}")]
    InvalidDiceNotation { field: String, error: DiceError },

    #[error("{field} is {value}, above the limit of {max}")]
    ParameterOutOfRange { field: String, value: u32, max: u32 },

    #[error("Invalid effect type: {0}")]
    InvalidEffectType(String),

    #[error("Invalid shield type: {0}")]
    InvalidShieldType(String),

    #[error("Invalid healing category: {0}")]
    InvalidHealingCategory(String),
}

/// Parse a required dice field, tagging the failure with the field name.
pub(crate) fn required_dice(
    field: &str,
    notation: Option<&str>,
) -> Result<DiceExpression, EffectError> {
    let notation = notation
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| EffectError::MissingParameter {
            field: field.to_string(),
        })?;
    DiceExpression::parse(notation).map_err(|error| EffectError::InvalidDiceNotation {
        field: field.to_string(),
        error,
    })
}

/// The resolvable effect families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectType {
    Direct,
    Regeneration,
    Vampiric,
    Conditional,
    Resurrection,
    Spirit,
    Chain,
    Shield,
}

impl EffectType {
    pub fn id(&self) -> &'static str {
        match self {
            EffectType::Direct => "direct",
            EffectType::Regeneration => "regeneration",
            EffectType::Vampiric => "vampiric",
            EffectType::Conditional => "conditional",
            EffectType::Resurrection => "resurrection",
            EffectType::Spirit => "spirit",
            EffectType::Chain => "chain",
            EffectType::Shield => "shield",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for EffectType {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "direct" => Ok(EffectType::Direct),
            "regeneration" => Ok(EffectType::Regeneration),
            "vampiric" => Ok(EffectType::Vampiric),
            "conditional" => Ok(EffectType::Conditional),
            "resurrection" => Ok(EffectType::Resurrection),
            "spirit" => Ok(EffectType::Spirit),
            "chain" => Ok(EffectType::Chain),
            "shield" => Ok(EffectType::Shield),
            other => Err(EffectError::InvalidEffectType(other.to_string())),
        }
    }
}

// ============================================================================
// Caster
// ============================================================================

/// The caster-side inputs to effect formulas.
///
/// Ability scores that are absent count as 10. Modifiers are percentages, so a
/// `healing_modifier` of 20 means ×1.2.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CasterProfile {
    pub wisdom: Option<i32>,
    pub spirit: Option<i32>,
    pub healing_modifier: f64,
    pub hots_modifier: f64,
    pub vampiric_modifier: f64,
    pub spirit_modifier: f64,
    pub shield_modifier: f64,
    pub absorb_modifier: f64,
}

impl CasterProfile {
    /// Build a profile for a character from its effective attributes and gear.
    ///
    /// Characters have no wisdom score, so only spirit feeds the casting modifier.
    /// Percentage modifiers come from scalar bonuses of the same name.
    pub fn from_character(attributes: &AttributeSet, bonuses: &EquipmentBonuses) -> Self {
        let pct = |name: &str| f64::from(bonuses.scalar(name));
        Self {
            wisdom: None,
            spirit: Some(attributes.spirit),
            healing_modifier: pct("healingModifier"),
            hots_modifier: pct("hotsModifier"),
            vampiric_modifier: pct("vampiricModifier"),
            spirit_modifier: pct("spiritModifier"),
            shield_modifier: pct("shieldModifier"),
            absorb_modifier: pct("absorbModifier"),
        }
    }

    pub fn casting_modifier(&self) -> i32 {
        let wisdom = attribute_modifier(self.wisdom.unwrap_or(10));
        let spirit = attribute_modifier(self.spirit.unwrap_or(10));
        wisdom.max(spirit)
    }
}

/// `1 + percent / 100`.
pub(crate) fn percent_factor(percent: f64) -> f64 {
    1.0 + percent / 100.0
}

// ============================================================================
// Requests
// ============================================================================

/// An effect cast by a character, with explicit target references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EffectRequest {
    #[serde(rename_all = "camelCase")]
    Healing {
        effect_type: String,
        #[serde(default)]
        params: HealingParams,
        /// Who receives the healing. Vampiric healing always heals the caster and
        /// drains this target instead.
        #[serde(default)]
        target: Option<CharacterId>,
    },
    #[serde(rename_all = "camelCase")]
    Shield {
        shield_id: String,
        #[serde(default)]
        params: ShieldParams,
        #[serde(default)]
        target: Option<CharacterId>,
    },
}

impl EffectRequest {
    pub fn healing(effect_type: impl Into<String>, params: HealingParams) -> Self {
        EffectRequest::Healing {
            effect_type: effect_type.into(),
            params,
            target: None,
        }
    }

    pub fn shield(shield_id: impl Into<String>, params: ShieldParams) -> Self {
        EffectRequest::Shield {
            shield_id: shield_id.into(),
            params,
            target: None,
        }
    }

    pub fn with_target(mut self, id: CharacterId) -> Self {
        match &mut self {
            EffectRequest::Healing { target, .. } | EffectRequest::Shield { target, .. } => {
                *target = Some(id)
            }
        }
        self
    }

    pub fn target(&self) -> Option<CharacterId> {
        match self {
            EffectRequest::Healing { target, .. } | EffectRequest::Shield { target, .. } => {
                *target
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EffectResult {
    Healing(HealingResult),
    Shield(ShieldResult),
}

impl EffectResult {
    pub fn amount(&self) -> i32 {
        match self {
            EffectResult::Healing(r) => r.amount,
            EffectResult::Shield(r) => r.amount,
        }
    }

    pub fn error(&self) -> Option<&EffectError> {
        match self {
            EffectResult::Healing(r) => r.error.as_ref(),
            EffectResult::Shield(r) => r.error.as_ref(),
        }
    }
}

/// Resolve a request against an optional caster.
pub fn resolve_effect(request: &EffectRequest, caster: Option<&CasterProfile>) -> EffectResult {
    match request {
        EffectRequest::Healing {
            effect_type,
            params,
            ..
        } => EffectResult::Healing(calculate_healing(effect_type, params, caster)),
        EffectRequest::Shield {
            shield_id, params, ..
        } => EffectResult::Shield(shield_effectiveness(shield_id, params, caster)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::ItemEffect;

    #[test]
    fn test_effect_type_ids() {
        assert_eq!("chain".parse::<EffectType>().unwrap(), EffectType::Chain);
        assert_eq!(EffectType::Regeneration.to_string(), "regeneration");
        assert_eq!(
            "smite".parse::<EffectType>().unwrap_err(),
            EffectError::InvalidEffectType("smite".to_string())
        );
    }

    #[test]
    fn test_casting_modifier() {
        let caster = CasterProfile {
            wisdom: Some(14),
            spirit: Some(17),
            ..Default::default()
        };
        assert_eq!(caster.casting_modifier(), 3);

        let low = CasterProfile {
            wisdom: Some(7),
            spirit: None,
            ..Default::default()
        };
        assert_eq!(low.casting_modifier(), 0);
    }

    #[test]
    fn test_profile_from_character() {
        let mut bonuses = EquipmentBonuses::default();
        bonuses.add(&ItemEffect::scalar("healingModifier", 20));
        bonuses.add(&ItemEffect::scalar("shieldModifier", 10));
        let attrs = AttributeSet::default().with(crate::Attribute::Spirit, 16);

        let caster = CasterProfile::from_character(&attrs, &bonuses);
        assert_eq!(caster.spirit, Some(16));
        assert_eq!(caster.casting_modifier(), 3);
        assert_eq!(caster.healing_modifier, 20.0);
        assert_eq!(caster.shield_modifier, 10.0);
        assert_eq!(caster.hots_modifier, 0.0);
    }

    #[test]
    fn test_required_dice() {
        assert_eq!(
            required_dice("diceNotation", None).unwrap_err(),
            EffectError::MissingParameter {
                field: "diceNotation".to_string()
            }
        );
        assert!(matches!(
            required_dice("diceNotation", Some("lots")).unwrap_err(),
            EffectError::InvalidDiceNotation { .. }
        ));
        assert_eq!(
            required_dice("diceNotation", Some("2d8+2")).unwrap(),
            DiceExpression::new(2, 8, 2)
        );
    }

    #[test]
    fn test_request_targets() {
        let target = CharacterId::new();
        let request = EffectRequest::healing("direct", HealingParams::dice("1d8")).with_target(target);
        assert_eq!(request.target(), Some(target));
        assert_eq!(resolve_effect(&request, None).amount(), 4);
    }
}
