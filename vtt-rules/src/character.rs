//! Character attribute types.
//!
//! Contains the six base attributes, the attribute container, and the ingestion
//! adapter that accepts the loose `n` / `{ "value": n }` shapes found in saved
//! character records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six base attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Strength,
    Agility,
    Intelligence,
    Spirit,
    Constitution,
    Charisma,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Strength,
        Attribute::Agility,
        Attribute::Intelligence,
        Attribute::Spirit,
        Attribute::Constitution,
        Attribute::Charisma,
    ];

    /// Key used for this attribute in bonus maps and content records.
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Strength => "strength",
            Attribute::Agility => "agility",
            Attribute::Intelligence => "intelligence",
            Attribute::Spirit => "spirit",
            Attribute::Constitution => "constitution",
            Attribute::Charisma => "charisma",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Agility => "AGI",
            Attribute::Intelligence => "INT",
            Attribute::Spirit => "SPI",
            Attribute::Constitution => "CON",
            Attribute::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strength" | "str" => Ok(Attribute::Strength),
            "agility" | "agi" => Ok(Attribute::Agility),
            "intelligence" | "int" => Ok(Attribute::Intelligence),
            "spirit" | "spir" | "spi" => Ok(Attribute::Spirit),
            "constitution" | "con" => Ok(Attribute::Constitution),
            "charisma" | "cha" => Ok(Attribute::Charisma),
            other => Err(format!("Unknown attribute: {other}")),
        }
    }
}

/// Standard modifier for an attribute or ability score: `floor((score - 10) / 2)`.
pub fn attribute_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}

/// Attribute container. No bounds are enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
    pub spirit: i32,
    pub constitution: i32,
    pub charisma: i32,
}

impl AttributeSet {
    pub fn new(
        strength: i32,
        agility: i32,
        intelligence: i32,
        spirit: i32,
        constitution: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            spirit,
            constitution,
            charisma,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Intelligence => self.intelligence,
            Attribute::Spirit => self.spirit,
            Attribute::Constitution => self.constitution,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Agility => self.agility = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Spirit => self.spirit = value,
            Attribute::Constitution => self.constitution = value,
            Attribute::Charisma => self.charisma = value,
        }
    }

    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn modifier(&self, attribute: Attribute) -> i32 {
        attribute_modifier(self.get(attribute))
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// A stat as stored in character records: either a bare number or `{ "value": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Plain(f64),
    Wrapped { value: f64 },
}

impl StatValue {
    pub fn value(&self) -> i32 {
        let raw = match self {
            StatValue::Plain(v) => *v,
            StatValue::Wrapped { value } => *value,
        };
        raw.floor() as i32
    }
}

/// Attribute record as it arrives from the outside. Use [`AttributeSet::from`] to
/// normalize it before it reaches any calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAttributeSet {
    #[serde(default, alias = "str")]
    pub strength: Option<StatValue>,
    #[serde(default, alias = "agi")]
    pub agility: Option<StatValue>,
    #[serde(default, alias = "int")]
    pub intelligence: Option<StatValue>,
    #[serde(default, alias = "spir")]
    pub spirit: Option<StatValue>,
    #[serde(default, alias = "con")]
    pub constitution: Option<StatValue>,
    #[serde(default, alias = "cha")]
    pub charisma: Option<StatValue>,
}

impl From<RawAttributeSet> for AttributeSet {
    fn from(raw: RawAttributeSet) -> Self {
        let read = |v: Option<StatValue>| v.map(|s| s.value()).unwrap_or(10);
        AttributeSet {
            strength: read(raw.strength),
            agility: read(raw.agility),
            intelligence: read(raw.intelligence),
            spirit: read(raw.spirit),
            constitution: read(raw.constitution),
            charisma: read(raw.charisma),
        }
    }
}

impl AttributeSet {
    /// Normalize a JSON attribute record into an `AttributeSet`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let raw: RawAttributeSet = serde_json::from_value(value)?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_modifier_floors_toward_negative() {
        assert_eq!(attribute_modifier(10), 0);
        assert_eq!(attribute_modifier(11), 0);
        assert_eq!(attribute_modifier(16), 3);
        assert_eq!(attribute_modifier(9), -1);
        assert_eq!(attribute_modifier(7), -2);
    }

    #[test]
    fn test_get_set() {
        let mut attrs = AttributeSet::default();
        attrs.set(Attribute::Strength, 16);
        assert_eq!(attrs.get(Attribute::Strength), 16);
        assert_eq!(attrs.modifier(Attribute::Strength), 3);
        assert_eq!(attrs.get(Attribute::Charisma), 10);
    }

    #[test]
    fn test_normalizes_mixed_stat_shapes() {
        let attrs = AttributeSet::from_json(json!({
            "strength": 14,
            "agility": { "value": 12 },
            "con": 15,
            "spirit": { "value": 9.0, "source": "race" }
        }))
        .unwrap();

        assert_eq!(attrs.strength, 14);
        assert_eq!(attrs.agility, 12);
        assert_eq!(attrs.constitution, 15);
        assert_eq!(attrs.spirit, 9);
        assert_eq!(attrs.intelligence, 10);
    }

    #[test]
    fn test_attribute_from_str() {
        assert_eq!("spir".parse::<Attribute>().unwrap(), Attribute::Spirit);
        assert_eq!("Strength".parse::<Attribute>().unwrap(), Attribute::Strength);
        assert!("wisdom".parse::<Attribute>().is_err());
    }
}
