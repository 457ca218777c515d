//! The character engine.
//!
//! A `CharacterEngine` owns one character's authoritative inputs (attributes,
//! equipment, encumbrance, resource pools, skill progress) and keeps the derived
//! views (equipment bonuses, derived stats) recomputed after every mutation, so
//! readers never observe a stale or half-updated state.

use crate::character::{Attribute, AttributeSet, CharacterId};
use crate::config::EngineConfig;
use crate::content::{ContentError, ContentProvider, StaticContent};
use crate::dice::DieType;
use crate::effects::{resolve_effect, CasterProfile, EffectRequest, EffectResult, EffectType};
use crate::equipment::{aggregate, EquipmentBonuses, EquipmentSlot, EquipmentSlots, Item};
use crate::resources::{ResourceKind, ResourcePool, ResourceUpdate, Resources};
use crate::skills::{
    available_quests, rank_of, roll_skill_table, skill_modifier, Quest, SkillError,
    SkillProgress, SkillRank, SkillRoll,
};
use crate::stats::{derive, effective_attributes, DerivedStats, EncumbranceTier};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Skill(#[from] SkillError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Invalid character record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error("{item} cannot be equipped in the {slot} slot")]
    SlotMismatch { item: String, slot: EquipmentSlot },

    #[error("Unknown item: {0}")]
    UnknownItem(String),
}

/// A resolved effect, with the characters involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectOutcome {
    pub caster: CharacterId,
    pub target: Option<CharacterId>,
    pub result: EffectResult,
    /// Health actually restored to this character.
    pub applied: i32,
}

/// Resources restored by one regeneration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegenTick {
    pub health: i32,
    pub mana: i32,
}

/// Resistance to one damage type, with display metadata when the content knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resistance {
    pub damage_type: String,
    pub name: Option<String>,
    pub value: i32,
    pub immune: bool,
}

/// One character's rules state.
pub struct CharacterEngine<C: ContentProvider = StaticContent> {
    id: CharacterId,
    config: EngineConfig,
    content: C,
    rng: StdRng,

    attributes: AttributeSet,
    equipment: EquipmentSlots,
    encumbrance: EncumbranceTier,
    resources: Resources,
    skills: BTreeMap<String, SkillProgress>,

    bonuses: EquipmentBonuses,
    derived: DerivedStats,

    last_effect: Option<EffectOutcome>,
    last_outcome: Option<SkillRoll>,
}

impl<C: ContentProvider> CharacterEngine<C> {
    /// Create an engine for a fresh character with default attributes.
    ///
    /// Content is validated first when the config asks for it. With pool sync
    /// enabled, health and mana start full at their derived maximums.
    pub fn new(config: EngineConfig, content: C) -> Result<Self, EngineError> {
        if config.validate_content {
            content.validate()?;
        }

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let attributes = AttributeSet::default();
        let bonuses = EquipmentBonuses::new();
        let derived = derive(&attributes, &bonuses, EncumbranceTier::Normal);

        let mut resources = config.starting_resources();
        if config.sync_pools_with_stats {
            resources.health = ResourcePool::full(derived.max_health);
            resources.mana = ResourcePool::full(derived.max_mana);
        }

        let engine = Self {
            id: CharacterId::new(),
            config,
            content,
            rng,
            attributes,
            equipment: EquipmentSlots::new(),
            encumbrance: EncumbranceTier::Normal,
            resources,
            skills: BTreeMap::new(),
            bonuses,
            derived,
            last_effect: None,
            last_outcome: None,
        };
        info!(
            character = %engine.config.character_name,
            id = %engine.id,
            "character engine created"
        );
        Ok(engine)
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.character_name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    // ========================================================================
    // Attributes, equipment, encumbrance
    // ========================================================================

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Attributes including equipment attribute bonuses.
    pub fn effective_attributes(&self) -> AttributeSet {
        effective_attributes(&self.attributes, &self.bonuses)
    }

    pub fn set_attribute(&mut self, attribute: Attribute, value: i32) {
        self.attributes.set(attribute, value);
        self.recompute();
    }

    /// Replace every attribute at once.
    pub fn set_attributes(&mut self, attributes: AttributeSet) {
        self.attributes = attributes;
        self.recompute();
    }

    /// Replace attributes from a loose JSON record (`n` or `{ "value": n }`).
    pub fn load_attributes(&mut self, record: serde_json::Value) -> Result<(), EngineError> {
        let attributes = AttributeSet::from_json(record)?;
        self.set_attributes(attributes);
        Ok(())
    }

    pub fn equipment(&self) -> &EquipmentSlots {
        &self.equipment
    }

    /// Put `item` into `slot` (or empty it with `None`), returning what was there.
    pub fn equip(
        &mut self,
        slot: EquipmentSlot,
        item: Option<Item>,
    ) -> Result<Option<Item>, EngineError> {
        if let Some(item) = &item {
            if !item.fits(slot) {
                return Err(EngineError::SlotMismatch {
                    item: item.id.clone(),
                    slot,
                });
            }
            debug!(slot = %slot, item = %item.id, "equipping item");
        }
        let previous = self.equipment.set(slot, item);
        self.recompute();
        Ok(previous)
    }

    /// Equip an item from the content catalog by id.
    pub fn equip_by_id(
        &mut self,
        slot: EquipmentSlot,
        item_id: &str,
    ) -> Result<Option<Item>, EngineError> {
        let item = self
            .content
            .item(item_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownItem(item_id.to_string()))?;
        self.equip(slot, Some(item))
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Item> {
        let previous = self.equipment.set(slot, None);
        self.recompute();
        previous
    }

    pub fn encumbrance(&self) -> EncumbranceTier {
        self.encumbrance
    }

    pub fn set_encumbrance(&mut self, tier: EncumbranceTier) {
        self.encumbrance = tier;
        self.recompute();
    }

    /// Set encumbrance from a carried load against the current carrying capacity.
    pub fn set_carried_load(&mut self, carried: f64) -> EncumbranceTier {
        let tier = EncumbranceTier::from_load(carried, f64::from(self.derived.carrying_capacity));
        self.set_encumbrance(tier);
        tier
    }

    pub fn equipment_bonuses(&self) -> &EquipmentBonuses {
        &self.bonuses
    }

    pub fn derived_stats(&self) -> &DerivedStats {
        &self.derived
    }

    pub fn resistance(&self, damage_type: &str) -> Resistance {
        Resistance {
            damage_type: damage_type.to_string(),
            name: self.content.damage_type(damage_type).map(|d| d.name.clone()),
            value: self.bonuses.resistance(damage_type),
            immune: self.bonuses.is_immune(damage_type),
        }
    }

    fn recompute(&mut self) {
        self.bonuses = aggregate(&self.equipment);
        self.derived = derive(&self.attributes, &self.bonuses, self.encumbrance);
        if self.config.sync_pools_with_stats {
            self.resources
                .set(ResourceKind::Health, ResourceUpdate::max(self.derived.max_health));
            self.resources
                .set(ResourceKind::Mana, ResourceUpdate::max(self.derived.max_mana));
        }
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub fn resource(&self, kind: ResourceKind) -> ResourcePool {
        self.resources.get(kind)
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn set_resource(&mut self, kind: ResourceKind, update: ResourceUpdate) -> ResourcePool {
        let pool = self.resources.set(kind, update);
        debug!(resource = %kind, pool = %pool, "resource updated");
        pool
    }

    /// One regeneration step: add the derived regen rates to the health and mana
    /// pools, clamped to their maximums.
    pub fn apply_regeneration(&mut self) -> RegenTick {
        let tick = RegenTick {
            health: self.resources.health.restore(self.derived.health_regen),
            mana: self.resources.mana.restore(self.derived.mana_regen),
        };
        debug!(health = tick.health, mana = tick.mana, "regeneration applied");
        tick
    }

    // ========================================================================
    // Effects
    // ========================================================================

    pub fn caster_profile(&self) -> CasterProfile {
        CasterProfile::from_character(&self.effective_attributes(), &self.bonuses)
    }

    /// Resolve an effect cast by this character.
    ///
    /// Healing aimed at this character (no target, or this character's id) is
    /// applied to the health pool. Vampiric healing always heals the caster; its
    /// drain, like any effect aimed at another character, is left to the caller
    /// to apply to that character.
    pub fn cast_effect(&mut self, request: EffectRequest) -> &EffectOutcome {
        let result = resolve_effect(&request, Some(&self.caster_profile()));
        let target = request.target();

        let applied = match &result {
            EffectResult::Healing(healing) if healing.is_ok() => {
                let heals_self = healing.effect_type() == Some(EffectType::Vampiric)
                    || target.map_or(true, |t| t == self.id);
                if heals_self {
                    self.resources.health.restore(healing.amount)
                } else {
                    0
                }
            }
            _ => 0,
        };

        debug!(amount = result.amount(), applied, "effect cast");
        &*self.last_effect.insert(EffectOutcome {
            caster: self.id,
            target,
            result,
            applied,
        })
    }

    pub fn last_effect(&self) -> Option<&EffectOutcome> {
        self.last_effect.as_ref()
    }

    // ========================================================================
    // Skills
    // ========================================================================

    fn require_skill(&self, skill_id: &str) -> Result<(), EngineError> {
        match self.content.skill(skill_id) {
            Some(_) => Ok(()),
            None => Err(SkillError::UnknownSkill(skill_id.to_string()).into()),
        }
    }

    fn require_quest(&self, skill_id: &str, quest_id: &str) -> Result<(), EngineError> {
        self.require_skill(skill_id)?;
        match self.content.quest(skill_id, quest_id) {
            Some(_) => Ok(()),
            None => Err(SkillError::UnknownQuest {
                skill: skill_id.to_string(),
                quest: quest_id.to_string(),
            }
            .into()),
        }
    }

    pub fn skill_progress(&self, skill_id: &str) -> Option<&SkillProgress> {
        self.skills.get(skill_id)
    }

    pub fn skill_rank(&self, skill_id: &str) -> SkillRank {
        self.skills
            .get(skill_id)
            .map(rank_of)
            .unwrap_or(SkillRank::Untrained)
    }

    /// Mark a quest completed and return the skill's rank afterwards.
    pub fn complete_quest(&mut self, skill_id: &str, quest_id: &str) -> Result<SkillRank, EngineError> {
        self.require_quest(skill_id, quest_id)?;
        let before = self.skill_rank(skill_id);
        let newly = self
            .skills
            .entry(skill_id.to_string())
            .or_default()
            .complete(quest_id);
        let after = self.skill_rank(skill_id);

        if newly {
            info!(skill = skill_id, quest = quest_id, "quest completed");
        }
        if after != before {
            info!(skill = skill_id, from = %before, to = %after, "skill rank changed");
        }
        Ok(after)
    }

    /// Mark a quest not completed and return the skill's rank afterwards.
    pub fn uncomplete_quest(&mut self, skill_id: &str, quest_id: &str) -> Result<SkillRank, EngineError> {
        self.require_quest(skill_id, quest_id)?;
        let before = self.skill_rank(skill_id);
        if let Some(progress) = self.skills.get_mut(skill_id) {
            if progress.uncomplete(quest_id) {
                info!(skill = skill_id, quest = quest_id, "quest reopened");
            }
        }
        let after = self.skill_rank(skill_id);
        if after != before {
            info!(skill = skill_id, from = %before, to = %after, "skill rank changed");
        }
        Ok(after)
    }

    /// Pin a skill to a rank regardless of quests, or clear the pin with `None`.
    pub fn assign_skill_rank(
        &mut self,
        skill_id: &str,
        rank: Option<SkillRank>,
    ) -> Result<SkillRank, EngineError> {
        self.require_skill(skill_id)?;
        self.skills
            .entry(skill_id.to_string())
            .or_default()
            .assigned_rank = rank;
        Ok(self.skill_rank(skill_id))
    }

    pub fn available_quests(&self, skill_id: &str) -> Vec<&Quest> {
        let quests = self.content.quests(skill_id);
        match self.skills.get(skill_id) {
            Some(progress) => available_quests(quests, progress),
            None => available_quests(quests, &SkillProgress::default()),
        }
    }

    pub fn skill_modifier(&self, skill_id: &str) -> Result<i32, EngineError> {
        let skill = self
            .content
            .skill(skill_id)
            .ok_or_else(|| SkillError::UnknownSkill(skill_id.to_string()))?;
        Ok(skill_modifier(
            skill,
            &self.effective_attributes(),
            self.skill_rank(skill_id),
            &self.bonuses,
        ))
    }

    /// Roll `die` on the skill's table for its current rank.
    pub fn roll_skill(&mut self, skill_id: &str, die: DieType) -> Result<&SkillRoll, EngineError> {
        let rank = self.skill_rank(skill_id);
        let roll = roll_skill_table(&self.content, skill_id, rank, die, &mut self.rng)?;
        Ok(&*self.last_outcome.insert(roll))
    }

    pub fn last_outcome(&self) -> Option<&SkillRoll> {
        self.last_outcome.as_ref()
    }
}
