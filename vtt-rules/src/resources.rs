//! Resource pools (health, mana, action points).
//!
//! A pool is a `{ current, max }` pair with `0 <= current <= max` held after every
//! update. Pools are independent of stat derivation; the engine decides when a
//! derived maximum is pushed into a pool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which pool an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Health,
    Mana,
    ActionPoints,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Health => "health",
            ResourceKind::Mana => "mana",
            ResourceKind::ActionPoints => "actionPoints",
        };
        write!(f, "{name}")
    }
}

/// Partial update: omitted fields keep their previous value (subject to clamping).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUpdate {
    #[serde(default)]
    pub current: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

impl ResourceUpdate {
    pub fn current(current: i32) -> Self {
        Self {
            current: Some(current),
            max: None,
        }
    }

    pub fn max(max: i32) -> Self {
        Self {
            current: None,
            max: Some(max),
        }
    }

    pub fn both(current: i32, max: i32) -> Self {
        Self {
            current: Some(current),
            max: Some(max),
        }
    }
}

/// A clamped `{ current, max }` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    current: i32,
    max: i32,
}

impl ResourcePool {
    /// Create a pool, clamping the inputs into a valid state.
    pub fn new(current: i32, max: i32) -> Self {
        Self { current: 0, max: 0 }.apply(ResourceUpdate::both(current, max))
    }

    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.current) / f64::from(self.max)
        }
    }

    /// Apply a partial update.
    ///
    /// A supplied `max` is floored at zero; a supplied `current` is clamped into
    /// `[0, max']`; an omitted `current` is pulled down to the new cap if it shrank.
    pub fn apply(self, update: ResourceUpdate) -> Self {
        let max = update.max.map(|m| m.max(0)).unwrap_or(self.max);
        let current = match update.current {
            Some(c) => c.clamp(0, max),
            None => self.current.min(max),
        };
        Self { current, max }
    }

    /// Restore up to `amount`, returning how much was actually restored.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        *self = self.apply(ResourceUpdate::current(self.current.saturating_add(amount.max(0))));
        self.current - before
    }

    /// Spend up to `amount`, returning how much was actually spent.
    pub fn spend(&mut self, amount: i32) -> i32 {
        let before = self.current;
        *self = self.apply(ResourceUpdate::current(self.current.saturating_sub(amount.max(0))));
        before - self.current
    }
}

impl fmt::Display for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// The three pools a character owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub health: ResourcePool,
    pub mana: ResourcePool,
    pub action_points: ResourcePool,
}

impl Resources {
    pub fn get(&self, kind: ResourceKind) -> ResourcePool {
        match kind {
            ResourceKind::Health => self.health,
            ResourceKind::Mana => self.mana,
            ResourceKind::ActionPoints => self.action_points,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourcePool {
        match kind {
            ResourceKind::Health => &mut self.health,
            ResourceKind::Mana => &mut self.mana,
            ResourceKind::ActionPoints => &mut self.action_points,
        }
    }

    /// Replace one pool with the result of applying `update`.
    pub fn set(&mut self, kind: ResourceKind, update: ResourceUpdate) -> ResourcePool {
        let pool = self.get_mut(kind);
        *pool = pool.apply(update);
        *pool
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            health: ResourcePool::full(50),
            mana: ResourcePool::full(50),
            action_points: ResourcePool::full(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_above_new_max_is_clamped() {
        let pool = ResourcePool::new(45, 100).apply(ResourceUpdate::both(200, 50));
        assert_eq!(pool, ResourcePool::new(50, 50));
        assert_eq!(pool.current(), 50);
        assert_eq!(pool.max(), 50);
    }

    #[test]
    fn test_shrinking_max_pulls_current_down() {
        let pool = ResourcePool::new(40, 50).apply(ResourceUpdate::max(30));
        assert_eq!((pool.current(), pool.max()), (30, 30));
    }

    #[test]
    fn test_growing_max_keeps_current() {
        let pool = ResourcePool::new(40, 50).apply(ResourceUpdate::max(80));
        assert_eq!((pool.current(), pool.max()), (40, 80));
    }

    #[test]
    fn test_negative_inputs() {
        let pool = ResourcePool::new(10, 20).apply(ResourceUpdate::both(-5, -10));
        assert_eq!((pool.current(), pool.max()), (0, 0));

        let pool = ResourcePool::new(10, 20).apply(ResourceUpdate::current(-1));
        assert_eq!((pool.current(), pool.max()), (0, 20));
    }

    #[test]
    fn test_setting_current_preserves_max() {
        let pool = ResourcePool::new(10, 20).apply(ResourceUpdate::current(15));
        assert_eq!((pool.current(), pool.max()), (15, 20));
    }

    #[test]
    fn test_restore_and_spend() {
        let mut pool = ResourcePool::new(10, 20);
        assert_eq!(pool.restore(15), 10);
        assert!(pool.is_full());
        assert_eq!(pool.spend(25), 20);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_resources_set() {
        let mut resources = Resources::default();
        let ap = resources.set(ResourceKind::ActionPoints, ResourceUpdate::current(1));
        assert_eq!(ap, ResourcePool::new(1, 3));
        assert_eq!(resources.get(ResourceKind::ActionPoints).current(), 1);
    }
}
