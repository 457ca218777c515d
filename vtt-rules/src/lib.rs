//! Character rules engine for a tabletop RPG companion.
//!
//! This crate provides:
//! - Dice notation parsing, bounds and rolling
//! - Equipment bonus aggregation and derived stats
//! - Bounded resource pools (health, mana, action points)
//! - Healing and shield effect resolution, with a situational recommender
//! - Quest-based skill ranks and outcome table rolls
//!
//! # Quick Start
//!
//! ```ignore
//! use vtt_rules::{CharacterEngine, EngineConfig, StaticContent};
//! use vtt_rules::dice::DieType;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let content = StaticContent::from_json_str(&std::fs::read_to_string("content.json")?)?;
//!     let config = EngineConfig::new("Thorin").with_seed(7);
//!
//!     let mut engine = CharacterEngine::new(config, content)?;
//!     engine.complete_quest("acrobatics", "balance_beam")?;
//!
//!     let roll = engine.roll_skill("acrobatics", DieType::D6)?;
//!     println!("{} ({})", roll.outcome.text, roll.outcome.tier);
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod config;
pub mod content;
pub mod dice;
pub mod effects;
pub mod engine;
pub mod equipment;
pub mod outcomes;
pub mod resources;
pub mod skills;
pub mod stats;
pub mod testing;

// Primary public API
pub use character::{Attribute, AttributeSet, CharacterId};
pub use config::EngineConfig;
pub use content::{ContentError, ContentProvider, StaticContent};
pub use dice::{DiceError, DiceExpression, DieType};
pub use effects::{EffectError, EffectRequest, EffectResult, EffectType};
pub use engine::{CharacterEngine, EffectOutcome, EngineError};
pub use equipment::{EquipmentBonuses, EquipmentSlot, Item, ItemEffect};
pub use outcomes::{OutcomeTable, OutcomeTier};
pub use resources::{ResourceKind, ResourcePool, ResourceUpdate};
pub use skills::{SkillError, SkillRank};
pub use stats::{DerivedStats, EncumbranceTier};
pub use testing::TestHarness;
