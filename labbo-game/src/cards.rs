//! Card catalog: static action card definitions and boss reward cards.
use crate::boss::{EnemyTag, SkillId};
use crate::numbers::scale_ceil;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

const DEFAULT_CARD_DATA: &str = include_str!("../data/cards.json");

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Attack,
    Defend,
    Heal,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Heal => "heal",
        })
    }
}

/// What a counter card answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterTarget {
    Skill(SkillId),
    Universal,
}

/// Bonus granted on top of a card's normal effect when it counters a skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterEffect {
    Shield(i32),
    Heal(i32),
    ExtraDamage(i32),
    ClearDebuffs,
    Reflect(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub target: CounterTarget,
    pub effect: CounterEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub power: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_bonus: Option<i32>,
    #[serde(default)]
    pub cures_burn: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<Counter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_for: Option<EnemyTag>,
}

impl Card {
    /// Whether this card answers the telegraphed `skill`.
    #[must_use]
    pub fn counters(&self, skill: SkillId) -> bool {
        match self.counter {
            Some(Counter {
                target: CounterTarget::Universal,
                ..
            }) => true,
            Some(Counter {
                target: CounterTarget::Skill(target),
                ..
            }) => target == skill,
            None => false,
        }
    }

    #[must_use]
    pub const fn is_boss_reward(&self) -> bool {
        self.reward_for.is_some()
    }
}

/// Errors raised while loading or validating the card catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("card data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate card id `{0}`")]
    DuplicateId(CardId),
    #[error("card `{id}` has non-positive power {power}")]
    NonPositivePower { id: CardId, power: i32 },
    #[error("card `{id}` is a reward for the ordinary enemy")]
    OrdinaryReward { id: CardId },
    #[error("{enemy} has more than one reward card (`{first}`, `{second}`)")]
    DuplicateReward {
        enemy: EnemyTag,
        first: CardId,
        second: CardId,
    },
    #[error("{0} has no reward card")]
    MissingReward(EnemyTag),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    cards: Vec<Card>,
}

/// Immutable, ordered set of card definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self::from_json(DEFAULT_CARD_DATA).unwrap_or_else(|err| {
            log::warn!("embedded cards.json unusable ({err}); starting with an empty catalog");
            Self { cards: Vec::new() }
        })
    }
}

impl CardCatalog {
    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the JSON is malformed or breaks a catalog invariant.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let catalog = Self { cards: file.cards };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check catalog invariants: unique ids, positive power, one reward per boss.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for card in &self.cards {
            if !seen.insert(&card.id) {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
            if card.power <= 0 {
                return Err(CatalogError::NonPositivePower {
                    id: card.id.clone(),
                    power: card.power,
                });
            }
            if card.reward_for == Some(EnemyTag::Ordinary) {
                return Err(CatalogError::OrdinaryReward {
                    id: card.id.clone(),
                });
            }
        }
        for enemy in EnemyTag::BOSSES {
            let mut rewards = self
                .cards
                .iter()
                .filter(|card| card.reward_for == Some(enemy));
            let Some(first) = rewards.next() else {
                return Err(CatalogError::MissingReward(enemy));
            };
            if let Some(second) = rewards.next() {
                return Err(CatalogError::DuplicateReward {
                    enemy,
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards that can be owned from the start or found by exploring.
    pub fn basic_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|card| !card.is_boss_reward())
    }

    /// The unique reward card for defeating `enemy`.
    #[must_use]
    pub fn reward_for(&self, enemy: EnemyTag) -> Option<&Card> {
        self.cards
            .iter()
            .find(|card| card.reward_for == Some(enemy))
    }

    /// Derived copy of `card` with power scaled by `factor`, rounded up.
    #[must_use]
    pub fn boosted(card: &Card, factor: f64) -> Card {
        Card {
            power: scale_ceil(card.power, factor),
            ..card.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_validates() {
        let catalog = CardCatalog::default();
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.basic_cards().count(), 9);
        for enemy in EnemyTag::BOSSES {
            assert!(catalog.reward_for(enemy).is_some(), "{enemy} lacks reward");
        }
        assert!(catalog.reward_for(EnemyTag::Ordinary).is_none());
    }

    #[test]
    fn counter_data_decodes_into_variants() {
        let catalog = CardCatalog::default();
        let extinguisher = catalog.get(&CardId::from("atk1")).unwrap();
        assert_eq!(
            extinguisher.counter,
            Some(Counter {
                target: CounterTarget::Skill(SkillId::ElectricalFire),
                effect: CounterEffect::ExtraDamage(10),
            })
        );
        assert!(extinguisher.counters(SkillId::ElectricalFire));
        assert!(!extinguisher.counters(SkillId::ChemicalFire));

        let triangle = catalog.get(&CardId::from("atk5")).unwrap();
        assert!(SkillId::ALL.iter().all(|skill| triangle.counters(*skill)));

        let socket = catalog.get(&CardId::from("def1")).unwrap();
        assert!(matches!(
            socket.counter.map(|c| c.effect),
            Some(CounterEffect::Reflect(ratio)) if (ratio - 0.5).abs() < f64::EPSILON
        ));

        let kit = catalog.get(&CardId::from("heal1")).unwrap();
        assert!(kit.cures_burn);
        assert!(kit.counter.is_none());
    }

    #[test]
    fn boosted_is_a_copy() {
        let catalog = CardCatalog::default();
        let original = catalog.get(&CardId::from("def2")).unwrap();
        let boosted = CardCatalog::boosted(original, 1.5);
        assert_eq!(boosted.power, 20);
        assert_eq!(boosted.id, original.id);
        assert_eq!(catalog.get(&CardId::from("def2")).unwrap().power, 13);
    }

    #[test]
    fn validation_flags_duplicates_and_gaps() {
        let dup = r#"{"cards": [
            {"id": "a", "name": "A", "kind": "attack", "power": 1},
            {"id": "a", "name": "B", "kind": "attack", "power": 1}
        ]}"#;
        assert!(matches!(
            CardCatalog::from_json(dup),
            Err(CatalogError::DuplicateId(id)) if id.as_str() == "a"
        ));

        let weak = r#"{"cards": [{"id": "a", "name": "A", "kind": "heal", "power": 0}]}"#;
        assert!(matches!(
            CardCatalog::from_json(weak),
            Err(CatalogError::NonPositivePower { power: 0, .. })
        ));

        let missing = r#"{"cards": [{"id": "a", "name": "A", "kind": "defend", "power": 3}]}"#;
        assert!(matches!(
            CardCatalog::from_json(missing),
            Err(CatalogError::MissingReward(EnemyTag::Fire))
        ));
    }
}
