//! Healing formulas.
//!
//! All amounts are computed from dice expected values, then floored once at the end.
//! The `min`/`max` bounds are raw dice bounds and ignore caster modifiers.

use super::{percent_factor, required_dice, CasterProfile, EffectError, EffectType};
use crate::dice::DiceExpression;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Average of a single d6, subtracted per jump by linear chain falloff.
const LINEAR_JUMP_REDUCTION: f64 = 3.5;
const PERCENTAGE_JUMP_RETAIN: f64 = 0.8;
const PROGRESSIVE_JUMP_RETAIN: f64 = 0.75;
const SECONDS_PER_ROUND: f64 = 6.0;
/// Upper bounds on caller-supplied counts.
const MAX_TICK_COUNT: u32 = 100;
const MAX_CHAIN_TARGETS: u32 = 20;

/// How often a regeneration effect ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TickFrequency {
    Turn,
    #[serde(rename = "6seconds")]
    SixSeconds,
    /// Also used for unrecognized names.
    #[default]
    #[serde(other)]
    Round,
}

impl fmt::Display for TickFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TickFrequency::Round => "round",
            TickFrequency::Turn => "turn",
            TickFrequency::SixSeconds => "6seconds",
        };
        write!(f, "{name}")
    }
}

/// Distribution of a regeneration effect's healing across its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalingCurve {
    FrontLoaded,
    BackLoaded,
    Pulsing,
    /// Also used for unrecognized names.
    #[default]
    #[serde(other)]
    Flat,
}

impl ScalingCurve {
    /// Multiplier for tick `i` of `ticks`.
    pub fn factor(&self, i: u32, ticks: u32) -> f64 {
        let progress = f64::from(i) / f64::from(ticks.max(1));
        match self {
            ScalingCurve::Flat => 1.0,
            ScalingCurve::FrontLoaded => 1.5 - progress,
            ScalingCurve::BackLoaded => 0.5 + progress,
            ScalingCurve::Pulsing => {
                if i % 2 == 0 {
                    1.3
                } else {
                    0.7
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFalloff {
    Linear,
    #[default]
    Percentage,
    DiceReduction,
    Adaptive,
    Progressive,
}

impl ChainFalloff {
    /// Reduce `value` for the target at position `jump` (0 is the primary target).
    fn apply(&self, value: f64, jump: u32, target_health: Option<f64>) -> f64 {
        if jump == 0 {
            return value;
        }
        let exponent = jump as i32;
        match self {
            ChainFalloff::Linear => (value - LINEAR_JUMP_REDUCTION * f64::from(jump)).max(0.0),
            ChainFalloff::Percentage => value * PERCENTAGE_JUMP_RETAIN.powi(exponent),
            ChainFalloff::Progressive => value * PROGRESSIVE_JUMP_RETAIN.powi(exponent),
            ChainFalloff::Adaptive => {
                let reduction = match target_health {
                    Some(h) if h < 30.0 => 0.10,
                    Some(h) if h > 70.0 => 0.40,
                    _ => 0.25,
                };
                value * (1.0 - reduction)
            }
            // Handled by shrinking the expression itself.
            ChainFalloff::DiceReduction => value,
        }
    }
}

/// Inputs for every healing variant. Each variant reads only its own fields;
/// absent optional fields take the defaults noted below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealingParams {
    // direct, chain
    pub dice_notation: Option<String>,
    /// Defaults to 1.0.
    pub potency_multiplier: Option<f64>,

    // regeneration
    pub tick_amount: Option<String>,
    /// Defaults to 5, at most 100.
    pub tick_count: Option<u32>,
    pub tick_frequency: TickFrequency,
    pub scaling_type: ScalingCurve,

    // vampiric
    pub drain_amount: Option<String>,
    /// Defaults to 0.5.
    pub conversion_rate: Option<f64>,
    /// Defaults to `necrotic`.
    pub damage_type: Option<String>,

    // conditional
    pub base_healing: Option<String>,
    pub bonus_condition: Option<String>,
    /// Defaults to 1.5.
    pub bonus_multiplier: Option<f64>,
    pub condition_met: bool,

    // resurrection
    /// Defaults to 30.
    pub health_percent: Option<u32>,
    pub penalties: Vec<String>,
    pub material_components: Vec<String>,
    /// Defaults to `minute`.
    pub time_limit: Option<String>,

    // spirit
    pub healing_per_second: Option<String>,
    /// Rounds; defaults to 3.
    pub channel_duration: Option<u32>,
    pub spirit_cost: u32,
    pub aura_size: u32,

    // chain
    /// Number of targets healed; defaults to 3, at most 20.
    pub jumps: Option<u32>,
    pub falloff: ChainFalloff,
    /// Current health percent of each chained target, in jump order.
    pub target_health_percents: Vec<f64>,
}

impl HealingParams {
    /// Params carrying only a `dice_notation`.
    pub fn dice(notation: impl Into<String>) -> Self {
        Self {
            dice_notation: Some(notation.into()),
            ..Default::default()
        }
    }
}

/// Variant-specific breakdown of a healing result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HealingDetail {
    #[serde(rename_all = "camelCase")]
    Regeneration {
        per_tick: i32,
        ticks: u32,
        frequency: TickFrequency,
        scaling_type: ScalingCurve,
    },
    #[serde(rename_all = "camelCase")]
    Vampiric {
        conversion_rate: f64,
        damage_type: String,
    },
    #[serde(rename_all = "camelCase")]
    Conditional {
        base_amount: i32,
        bonus_amount: i32,
        condition: Option<String>,
        condition_met: bool,
        bonus_multiplier: f64,
    },
    #[serde(rename_all = "camelCase")]
    Resurrection {
        health_percent: u32,
        penalties: Vec<String>,
        material_components: Vec<String>,
        time_limit: String,
    },
    #[serde(rename_all = "camelCase")]
    Spirit {
        per_second: i32,
        channel_duration: u32,
        spirit_cost: u32,
        aura_size: u32,
        is_aura: bool,
    },
    #[serde(rename_all = "camelCase")]
    Chain {
        falloff: ChainFalloff,
        amounts: Vec<i32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingResult {
    pub healing_type: String,
    pub amount: i32,
    /// Damage dealt to the drained target (vampiric only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_amount: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<HealingDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EffectError>,
}

impl HealingResult {
    /// The variant that produced this result, if the type id is a known one.
    pub fn effect_type(&self) -> Option<EffectType> {
        self.healing_type.parse().ok()
    }

    fn new(effect_type: EffectType, amount: f64) -> Self {
        Self {
            healing_type: effect_type.id().to_string(),
            amount: floor(amount),
            damage_amount: None,
            min: None,
            max: None,
            detail: None,
            error: None,
        }
    }

    fn failed(healing_type: &str, error: EffectError) -> Self {
        warn!(healing_type, %error, "healing could not be resolved");
        Self {
            healing_type: healing_type.to_string(),
            amount: 0,
            damage_amount: None,
            min: None,
            max: None,
            detail: None,
            error: Some(error),
        }
    }

    fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(floor(min));
        self.max = Some(floor(max));
        self
    }

    fn with_detail(mut self, detail: HealingDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn floor(value: f64) -> i32 {
    value.floor() as i32
}

fn raw_bounds(expr: &DiceExpression) -> (f64, f64) {
    let b = expr.bounds();
    (f64::from(b.min), f64::from(b.max))
}

/// General healing modifier combined with one variant-specific modifier.
fn modifier_factor(caster: Option<&CasterProfile>, specific: fn(&CasterProfile) -> f64) -> f64 {
    caster
        .map(|c| percent_factor(c.healing_modifier) * percent_factor(specific(c)))
        .unwrap_or(1.0)
}

fn no_specific(_: &CasterProfile) -> f64 {
    0.0
}

fn at_most(field: &str, value: u32, max: u32) -> Result<u32, EffectError> {
    if value > max {
        return Err(EffectError::ParameterOutOfRange {
            field: field.to_string(),
            value,
            max,
        });
    }
    Ok(value)
}

/// Resolve a healing effect by type id.
///
/// Never fails outright: an unknown type, a shield id, or a missing/invalid dice
/// field yields a zero-amount result carrying the error.
pub fn calculate_healing(
    type_id: &str,
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> HealingResult {
    let resolved = type_id
        .parse::<EffectType>()
        .and_then(|effect_type| match effect_type {
            EffectType::Direct => direct(params, caster),
            EffectType::Regeneration => regeneration(params, caster),
            EffectType::Vampiric => vampiric(params, caster),
            EffectType::Conditional => conditional(params, caster),
            EffectType::Resurrection => Ok(resurrection(params)),
            EffectType::Spirit => spirit(params, caster),
            EffectType::Chain => chain(params, caster),
            EffectType::Shield => Err(EffectError::InvalidEffectType(type_id.to_string())),
        });

    match resolved {
        Ok(result) => {
            debug!(
                healing_type = %result.healing_type,
                amount = result.amount,
                "healing resolved"
            );
            result
        }
        Err(error) => HealingResult::failed(type_id, error),
    }
}

fn direct(
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> Result<HealingResult, EffectError> {
    let expr = required_dice("diceNotation", params.dice_notation.as_deref())?;
    let mut amount = expr.expected_value();
    if let Some(c) = caster {
        amount = (amount + f64::from(c.casting_modifier())) * percent_factor(c.healing_modifier);
    }
    amount *= params.potency_multiplier.unwrap_or(1.0);

    let (min, max) = raw_bounds(&expr);
    Ok(HealingResult::new(EffectType::Direct, amount).with_bounds(min, max))
}

fn regeneration(
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> Result<HealingResult, EffectError> {
    let expr = required_dice("tickAmount", params.tick_amount.as_deref())?;
    let ticks = at_most("tickCount", params.tick_count.unwrap_or(5), MAX_TICK_COUNT)?;
    let base_tick = expr.expected_value();

    let total: f64 = (0..ticks)
        .map(|i| base_tick * params.scaling_type.factor(i, ticks))
        .sum();
    let amount = total * modifier_factor(caster, |c| c.hots_modifier);

    let (min, max) = raw_bounds(&expr);
    let ticks_f = f64::from(ticks);
    Ok(HealingResult::new(EffectType::Regeneration, amount)
        .with_bounds(min * ticks_f, max * ticks_f)
        .with_detail(HealingDetail::Regeneration {
            per_tick: floor(base_tick),
            ticks,
            frequency: params.tick_frequency,
            scaling_type: params.scaling_type,
        }))
}

fn vampiric(
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> Result<HealingResult, EffectError> {
    let expr = required_dice("drainAmount", params.drain_amount.as_deref())?;
    let conversion_rate = params.conversion_rate.unwrap_or(0.5);
    let drain = expr.expected_value();
    let amount = drain * conversion_rate * modifier_factor(caster, |c| c.vampiric_modifier);

    let (min, max) = raw_bounds(&expr);
    let mut result = HealingResult::new(EffectType::Vampiric, amount)
        .with_bounds(min * conversion_rate, max * conversion_rate)
        .with_detail(HealingDetail::Vampiric {
            conversion_rate,
            damage_type: params
                .damage_type
                .clone()
                .unwrap_or_else(|| "necrotic".to_string()),
        });
    result.damage_amount = Some(floor(drain));
    Ok(result)
}

fn conditional(
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> Result<HealingResult, EffectError> {
    let expr = required_dice("baseHealing", params.base_healing.as_deref())?;
    let bonus_multiplier = params.bonus_multiplier.unwrap_or(1.5);
    let base = expr.expected_value();

    let mut amount = base;
    if params.condition_met {
        amount *= bonus_multiplier;
    }
    amount *= modifier_factor(caster, no_specific);

    let bonus_amount = if params.condition_met {
        floor(base * (bonus_multiplier - 1.0))
    } else {
        0
    };

    let (min, max) = raw_bounds(&expr);
    Ok(HealingResult::new(EffectType::Conditional, amount)
        .with_bounds(min, max)
        .with_detail(HealingDetail::Conditional {
            base_amount: floor(base),
            bonus_amount,
            condition: params.bonus_condition.clone(),
            condition_met: params.condition_met,
            bonus_multiplier,
        }))
}

/// Resurrection restores a share of the target's maximum health, which is not
/// known here, so the amount is always 0.
fn resurrection(params: &HealingParams) -> HealingResult {
    HealingResult::new(EffectType::Resurrection, 0.0).with_detail(HealingDetail::Resurrection {
        health_percent: params.health_percent.unwrap_or(30),
        penalties: params.penalties.clone(),
        material_components: params.material_components.clone(),
        time_limit: params
            .time_limit
            .clone()
            .unwrap_or_else(|| "minute".to_string()),
    })
}

fn spirit(
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> Result<HealingResult, EffectError> {
    let expr = required_dice("healingPerSecond", params.healing_per_second.as_deref())?;
    let channel_duration = params.channel_duration.unwrap_or(3);
    let per_second = expr.expected_value();
    let seconds = f64::from(channel_duration) * SECONDS_PER_ROUND;

    let amount = per_second * seconds * modifier_factor(caster, |c| c.spirit_modifier);

    let (min, max) = raw_bounds(&expr);
    Ok(HealingResult::new(EffectType::Spirit, amount)
        .with_bounds(min * seconds, max * seconds)
        .with_detail(HealingDetail::Spirit {
            per_second: floor(per_second),
            channel_duration,
            spirit_cost: params.spirit_cost,
            aura_size: params.aura_size,
            is_aura: params.aura_size > 0,
        }))
}

fn chain(
    params: &HealingParams,
    caster: Option<&CasterProfile>,
) -> Result<HealingResult, EffectError> {
    let expr = required_dice("diceNotation", params.dice_notation.as_deref())?;
    let targets = at_most("jumps", params.jumps.unwrap_or(3), MAX_CHAIN_TARGETS)?;
    let falloff = params.falloff;
    let factor = modifier_factor(caster, no_specific);

    let mut amounts = Vec::new();
    let (mut min, mut max) = (0.0, 0.0);
    for jump in 0..targets {
        let jump_expr = match falloff {
            // Never drops below a single die.
            ChainFalloff::DiceReduction => expr
                .with_fewer_dice(jump)
                .unwrap_or(DiceExpression { count: 1, ..expr }),
            _ => expr,
        };
        let health = params.target_health_percents.get(jump as usize).copied();
        let reduce = |value: f64| falloff.apply(value, jump, health);

        amounts.push(floor(reduce(jump_expr.expected_value()) * factor));
        let (lo, hi) = raw_bounds(&jump_expr);
        min += reduce(lo).floor();
        max += reduce(hi).floor();
    }

    let total = amounts.iter().fold(0i32, |sum, a| sum.saturating_add(*a));
    let mut result = HealingResult::new(EffectType::Chain, 0.0)
        .with_bounds(min, max)
        .with_detail(HealingDetail::Chain { falloff, amounts });
    result.amount = total;
    Ok(result)
}
