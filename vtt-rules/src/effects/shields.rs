//! Absorption shield resolution.

use super::catalog::{self, Durability, ElementalSpec, ReflectSpec};
use super::{percent_factor, required_dice, CasterProfile, EffectError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShieldParams {
    pub shield_amount: Option<String>,
}

impl ShieldParams {
    pub fn amount(notation: impl Into<String>) -> Self {
        Self {
            shield_amount: Some(notation.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldRegeneration {
    pub rate: u32,
    pub delay: u32,
    /// Capacity restored per round once regeneration starts.
    pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldLayers {
    pub count: u32,
    pub per_layer: i32,
    pub regen_delay: u32,
    pub regen_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldAbsorption {
    pub rate: u32,
    /// Healing produced if the whole shield is consumed.
    pub max_healing: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldExplosion {
    pub radius: u32,
    pub damage_type: &'static str,
    pub max_damage: i32,
}

/// A resolved shield. Descriptors are only present for shields that have the
/// corresponding property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldResult {
    pub shield_id: String,
    pub amount: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability: Option<Durability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regeneration: Option<ShieldRegeneration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_reduction: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflect: Option<ReflectSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elemental: Option<ElementalSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<ShieldLayers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absorption: Option<ShieldAbsorption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explosion: Option<ShieldExplosion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EffectError>,
}

impl ShieldResult {
    fn empty(shield_id: &str) -> Self {
        Self {
            shield_id: shield_id.to_string(),
            amount: 0,
            shield_type: None,
            durability: None,
            min: None,
            max: None,
            regeneration: None,
            damage_reduction: None,
            reflect: None,
            elemental: None,
            layers: None,
            absorption: None,
            explosion: None,
            error: None,
        }
    }

    fn failed(shield_id: &str, error: EffectError) -> Self {
        warn!(shield_id, %error, "shield could not be resolved");
        Self {
            error: Some(error),
            ..Self::empty(shield_id)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn floor(value: f64) -> i32 {
    value.floor() as i32
}

/// Resolve an absorption shield by id.
///
/// `amount = ev(shield_amount) × shield multiplier × (1 + shield/100) × (1 + absorb/100)`.
/// Bounds apply the shield multiplier only.
pub fn shield_effectiveness(
    shield_id: &str,
    params: &ShieldParams,
    caster: Option<&CasterProfile>,
) -> ShieldResult {
    let Some(shield) = catalog::shield_type(shield_id) else {
        return ShieldResult::failed(
            shield_id,
            EffectError::InvalidShieldType(shield_id.to_string()),
        );
    };
    let expr = match required_dice("shieldAmount", params.shield_amount.as_deref()) {
        Ok(expr) => expr,
        Err(error) => return ShieldResult::failed(shield_id, error),
    };

    let mut base = expr.expected_value() * shield.multiplier;
    if let Some(c) = caster {
        base *= percent_factor(c.shield_modifier) * percent_factor(c.absorb_modifier);
    }
    let amount = floor(base);
    let bounds = expr.bounds();

    let result = ShieldResult {
        amount,
        shield_type: Some(shield.name),
        durability: Some(shield.durability),
        min: Some(floor(f64::from(bounds.min) * shield.multiplier)),
        max: Some(floor(f64::from(bounds.max) * shield.multiplier)),
        regeneration: shield
            .regeneration
            .filter(|r| r.rate > 0)
            .map(|r| ShieldRegeneration {
                rate: r.rate,
                delay: r.delay,
                amount: floor(base * f64::from(r.rate) / 100.0),
            }),
        damage_reduction: shield.damage_reduction,
        reflect: shield.reflect,
        elemental: shield.elemental,
        layers: shield.layered.map(|l| ShieldLayers {
            count: l.layers,
            per_layer: floor(base / f64::from(l.layers.max(1))),
            regen_delay: l.regen_delay,
            regen_rate: l.regen_rate,
        }),
        absorption: shield.absorption_rate.map(|rate| ShieldAbsorption {
            rate,
            max_healing: floor(base * f64::from(rate) / 100.0),
        }),
        explosion: shield.explosion.map(|e| ShieldExplosion {
            radius: e.radius,
            damage_type: e.damage_type,
            max_damage: amount,
        }),
        ..ShieldResult::empty(shield_id)
    };
    debug!(shield_id, amount, "shield resolved");
    result
}
