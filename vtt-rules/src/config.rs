//! Engine configuration.

use crate::resources::{ResourcePool, Resources};
use serde::{Deserialize, Serialize};

/// Configuration for a character engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Character name.
    pub character_name: String,

    /// Seed for skill rolls. `None` seeds from entropy.
    pub rng_seed: Option<u64>,

    /// Keep the health and mana pool maximums equal to the derived maximums.
    pub sync_pools_with_stats: bool,

    /// Check outcome table coverage when the engine is created.
    pub validate_content: bool,

    /// Starting pool maximums; pools start full.
    pub starting_health: i32,
    pub starting_mana: i32,
    pub starting_action_points: i32,
}

impl EngineConfig {
    /// Create a new engine config with a character name.
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            ..Self::default()
        }
    }

    /// Make skill rolls reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Enable or disable pool sync with derived stats.
    pub fn with_pool_sync(mut self, enabled: bool) -> Self {
        self.sync_pools_with_stats = enabled;
        self
    }

    /// Enable or disable content validation on engine creation.
    pub fn with_content_validation(mut self, enabled: bool) -> Self {
        self.validate_content = enabled;
        self
    }

    /// Set the starting pool maximums.
    pub fn with_starting_resources(mut self, health: i32, mana: i32, action_points: i32) -> Self {
        self.starting_health = health;
        self.starting_mana = mana;
        self.starting_action_points = action_points;
        self
    }

    pub fn starting_resources(&self) -> Resources {
        Resources {
            health: ResourcePool::full(self.starting_health),
            mana: ResourcePool::full(self.starting_mana),
            action_points: ResourcePool::full(self.starting_action_points),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let resources = Resources::default();
        Self {
            character_name: "Adventurer".to_string(),
            rng_seed: None,
            sync_pools_with_stats: true,
            validate_content: true,
            starting_health: resources.health.max(),
            starting_mana: resources.mana.max(),
            starting_action_points: resources.action_points.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = EngineConfig::new("Vex")
            .with_seed(42)
            .with_pool_sync(false)
            .with_starting_resources(80, 20, 4);
        assert_eq!(config.character_name, "Vex");
        assert_eq!(config.rng_seed, Some(42));
        assert!(!config.sync_pools_with_stats);
        assert!(config.validate_content);
        assert_eq!(config.starting_resources().action_points, ResourcePool::full(4));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "rngSeed": 9 }"#).unwrap();
        assert_eq!(config.character_name, "Adventurer");
        assert_eq!(config.rng_seed, Some(9));
        assert!(config.sync_pools_with_stats);
        assert_eq!(config.starting_resources(), Resources::default());
    }
}
