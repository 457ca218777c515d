//! Effect resolution tests.
//!
//! These tests exercise healing and shield resolution through the public API:
//! - Resolution without a caster
//! - Caster modifiers from attributes and gear
//! - Error-tagged results for bad input
//! - Situational recommendations

use serde_json::json;
use vtt_rules::effects::recommend::{CombatState, IncomingDamage, ResourceConstraint};
use vtt_rules::effects::{
    calculate_healing, healing_types_by_category, recommend_effect_type, resolve_effect,
    shield_effectiveness, CasterProfile, HealingDetail, HealingParams, ShieldParams, Situation,
};
use vtt_rules::testing::TestHarness;
use vtt_rules::{
    Attribute, CharacterId, EffectError, EffectRequest, EffectResult, EffectType, EquipmentSlot,
    ItemEffect, ResourceKind,
};

// =============================================================================
// HEALING
// =============================================================================

#[test]
fn test_direct_healing_without_caster() {
    let result = calculate_healing("direct", &HealingParams::dice("2d8+2"), None);
    assert_eq!(result.healing_type, "direct");
    assert_eq!(result.amount, 11);
    assert_eq!(result.min, Some(4));
    assert_eq!(result.max, Some(18));
    assert_eq!(result.error, None);
}

#[test]
fn test_params_from_ui_record() {
    let params: HealingParams = serde_json::from_value(json!({
        "tickAmount": "1d6",
        "tickCount": 4,
        "tickFrequency": "6seconds",
        "scalingType": "flat",
        "color": "green"
    }))
    .unwrap();

    let result = calculate_healing("regeneration", &params, None);
    // 3.5 per tick over 4 ticks
    assert_eq!(result.amount, 14);
    assert_eq!(result.min, Some(4));
    assert_eq!(result.max, Some(24));
    assert!(matches!(
        result.detail,
        Some(HealingDetail::Regeneration { per_tick: 3, ticks: 4, .. })
    ));
}

#[test]
fn test_missing_and_malformed_dice() {
    let missing = calculate_healing("direct", &HealingParams::default(), None);
    assert_eq!(missing.amount, 0);
    assert_eq!(
        missing.error,
        Some(EffectError::MissingParameter {
            field: "diceNotation".to_string()
        })
    );

    let malformed = calculate_healing("direct", &HealingParams::dice("lots of d"), None);
    assert_eq!(malformed.amount, 0);
    assert!(matches!(
        malformed.error,
        Some(EffectError::InvalidDiceNotation { ref field, .. }) if field == "diceNotation"
    ));
}

#[test]
fn test_unknown_ids_are_tagged() {
    let healing = calculate_healing("smite", &HealingParams::dice("1d4"), None);
    assert_eq!(healing.error, Some(EffectError::InvalidEffectType("smite".to_string())));

    let shield = shield_effectiveness("mirror", &ShieldParams::amount("1d4"), None);
    assert_eq!(shield.amount, 0);
    assert_eq!(shield.error, Some(EffectError::InvalidShieldType("mirror".to_string())));

    assert_eq!(
        healing_types_by_category("arcane").unwrap_err(),
        EffectError::InvalidHealingCategory("arcane".to_string())
    );
}

#[test]
fn test_caster_spirit_and_gear_boost_healing() {
    let mut harness = TestHarness::new().with_attributes(&[(Attribute::Spirit, 16)]);
    harness.equip(
        EquipmentSlot::MainHand,
        "lifewood_staff",
        vec![ItemEffect::scalar("healingModifier", 50)],
    );

    let caster = harness.engine.caster_profile();
    assert_eq!(caster.casting_modifier(), 3);
    assert_eq!(caster.healing_modifier, 50.0);

    // (11 + 3) * 1.5
    let result = calculate_healing("direct", &HealingParams::dice("2d8+2"), Some(&caster));
    assert_eq!(result.amount, 21);
    assert_eq!(result.max, Some(18));
}

#[test]
fn test_vampiric_reports_drain() {
    let params = HealingParams {
        drain_amount: Some("4d6".to_string()),
        conversion_rate: Some(0.75),
        ..Default::default()
    };
    let result = calculate_healing("vampiric", &params, None);
    // 14 drained, 10.5 healed
    assert_eq!(result.damage_amount, Some(14));
    assert_eq!(result.amount, 10);
    assert!(matches!(
        result.detail,
        Some(HealingDetail::Vampiric { ref damage_type, .. }) if damage_type == "necrotic"
    ));
}

#[test]
fn test_conditional_bonus_is_caller_supplied() {
    let mut params = HealingParams {
        base_healing: Some("2d6".to_string()),
        bonus_condition: Some("target below half health".to_string()),
        ..Default::default()
    };
    assert_eq!(calculate_healing("conditional", &params, None).amount, 7);

    params.condition_met = true;
    assert_eq!(calculate_healing("conditional", &params, None).amount, 10);
}

#[test]
fn test_chain_heals_fewer_per_jump() {
    let params = HealingParams {
        dice_notation: Some("4d8".to_string()),
        jumps: Some(3),
        ..Default::default()
    };
    let result = calculate_healing("chain", &params, None);
    let Some(HealingDetail::Chain { amounts, .. }) = &result.detail else {
        panic!("expected chain detail, got {:?}", result.detail);
    };
    assert_eq!(amounts.len(), 3);
    assert!(amounts.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(result.amount, amounts.iter().sum::<i32>());
}

// =============================================================================
// SHIELDS
// =============================================================================

#[test]
fn test_shield_variants() {
    let params = ShieldParams::amount("2d10+5");

    let standard = shield_effectiveness("standard", &params, None);
    assert_eq!(standard.amount, 16);

    let fortified = shield_effectiveness("fortified", &params, None);
    assert_eq!(fortified.amount, 24);
    assert_eq!(fortified.max, Some(37));

    let layered = shield_effectiveness("layered", &params, None);
    let layers = layered.layers.unwrap();
    assert_eq!(layers.count, 3);
    assert_eq!(layers.per_layer, 5);

    let reactive = shield_effectiveness("reactive", &params, None);
    assert_eq!(reactive.damage_reduction, Some(25));
    assert!(reactive.reflect.is_some());
}

#[test]
fn test_shield_modifiers_stack() {
    let caster = CasterProfile {
        shield_modifier: 20.0,
        absorb_modifier: 50.0,
        ..Default::default()
    };
    // 16 * 1.2 * 1.5
    let result = shield_effectiveness("standard", &ShieldParams::amount("2d10+5"), Some(&caster));
    assert_eq!(result.amount, 28);
    assert_eq!(result.max, Some(25));
}

// =============================================================================
// REQUESTS AND THE ENGINE
// =============================================================================

#[test]
fn test_request_round_trip_through_engine() {
    let mut harness = TestHarness::new();
    harness.wound_to(10);

    let request: EffectRequest = serde_json::from_value(json!({
        "kind": "healing",
        "effectType": "direct",
        "params": { "diceNotation": "2d8+2" }
    }))
    .unwrap();
    let outcome = harness.engine.cast_effect(request).clone();

    assert_eq!(outcome.result.amount(), 11);
    assert_eq!(outcome.applied, 11);
    assert_eq!(harness.engine.resource(ResourceKind::Health).current(), 21);
    assert_eq!(harness.engine.resource(ResourceKind::ActionPoints).current(), 3);
}

#[test]
fn test_resolve_shield_request_for_ally() {
    let ally = CharacterId::new();
    let request = EffectRequest::shield("absorbing", ShieldParams::amount("3d6")).with_target(ally);
    let result = resolve_effect(&request, None);

    let EffectResult::Shield(shield) = &result else {
        panic!("expected a shield result");
    };
    // 10.5 * 0.8
    assert_eq!(shield.amount, 8);
    assert_eq!(shield.absorption.map(|a| a.max_healing), Some(2));
    assert_eq!(request.target(), Some(ally));
}

#[test]
fn test_healing_overflow_is_clamped() {
    let mut harness = TestHarness::new();
    let (_, max) = harness.health();
    harness.wound_to(max - 2);

    let outcome = harness
        .engine
        .cast_effect(EffectRequest::healing("direct", HealingParams::dice("2d8+2")));
    assert_eq!(outcome.applied, 2);
    assert_eq!(harness.health(), (max, max));
}

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

#[test]
fn test_recommendations() {
    let emergency = recommend_effect_type(&Situation {
        target_health: 20.0,
        ..Default::default()
    });
    assert_eq!(emergency.recommended_type, EffectType::Direct);
    assert_eq!(emergency.secondary_type, EffectType::Shield);

    let group = recommend_effect_type(&Situation {
        target_count: 4,
        ..Default::default()
    });
    assert_eq!(group.recommended_type, EffectType::Chain);

    let thrifty = recommend_effect_type(&Situation {
        target_count: 4,
        resource_constraint: ResourceConstraint::Low,
        ..Default::default()
    });
    assert_eq!(thrifty.recommended_type, EffectType::Regeneration);

    let critical = recommend_effect_type(&Situation {
        target_health: 90.0,
        incoming_damage: IncomingDamage::Moderate,
        combat_state: CombatState::Critical,
        ..Default::default()
    });
    assert_eq!(critical.recommended_type, EffectType::Direct);
}
