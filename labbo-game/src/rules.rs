//! Run-economy configuration: HP scaling, exploration odds, burn and dev-mode tuning.
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_RULES_DATA: &str = include_str!("../data/rules.json");

/// Burn damage-over-time tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRules {
    pub min_damage: i32,
    pub max_damage: i32,
    pub turns: u8,
}

impl Default for BurnRules {
    fn default() -> Self {
        Self {
            min_damage: 3,
            max_damage: 5,
            turns: 3,
        }
    }
}

/// Exploration pickup odds and amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreRules {
    pub card_chance: f64,
    pub health_chance: f64,
    pub empty_pool_health_chance: f64,
    pub health_amount: i32,
    pub shield_amount: i32,
}

impl Default for ExploreRules {
    fn default() -> Self {
        Self {
            card_chance: 0.7,
            health_chance: 0.2,
            empty_pool_health_chance: 0.6,
            health_amount: 5,
            shield_amount: 1,
        }
    }
}

/// Debug/demo overrides applied by `enable_dev_mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevRules {
    pub max_hp: i32,
    pub card_boost: f64,
    pub boss_mitigation: f64,
}

impl Default for DevRules {
    fn default() -> Self {
        Self {
            max_hp: 80,
            card_boost: 1.5,
            boss_mitigation: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub base_max_hp: i32,
    pub hp_per_badge: i32,
    pub boss_reward_hp: i32,
    pub equipment_reduction: f64,
    pub support_surcharge: f64,
    #[serde(default)]
    pub burn: BurnRules,
    #[serde(default)]
    pub explore: ExploreRules,
    #[serde(default)]
    pub dev: DevRules,
    pub explorable_pool_size: usize,
    pub deaths_allowed: u8,
}

impl Default for RulesConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_RULES_DATA).unwrap_or_else(|err| {
            log::warn!("embedded rules.json unreadable ({err}); using built-in rules");
            Self::builtin()
        })
    }
}

/// Errors raised when rules configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum RulesConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be above 0 and at most 1 (got {value:.2})")]
    FractionViolation { field: &'static str, value: f64 },
    #[error("burn damage minimum {min} exceeds maximum {max}")]
    BurnMinExceedsMax { min: i32, max: i32 },
    #[error("explore odds exceed certainty: card {card:.2} + health {health:.2}")]
    ExploreOdds { card: f64, health: f64 },
}

impl RulesConfig {
    fn builtin() -> Self {
        Self {
            base_max_hp: 50,
            hp_per_badge: 10,
            boss_reward_hp: 10,
            equipment_reduction: 0.9,
            support_surcharge: 1.15,
            burn: BurnRules::default(),
            explore: ExploreRules::default(),
            dev: DevRules::default(),
            explorable_pool_size: 3,
            deaths_allowed: 2,
        }
    }

    /// Parse a rules document and validate it.
    ///
    /// # Errors
    ///
    /// Returns a message-bearing error when the JSON is malformed or violates bounds.
    pub fn from_json(json: &str) -> Result<Self, RulesLoadError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Maximum HP granted by `badges` earned badges.
    #[must_use]
    pub fn max_hp_for(&self, badges: usize) -> i32 {
        let badges = i32::try_from(badges).unwrap_or(i32::MAX);
        self.base_max_hp
            .saturating_add(self.hp_per_badge.saturating_mul(badges))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RulesConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), RulesConfigError> {
        min_int("base_max_hp", self.base_max_hp.into(), 1)?;
        min_int("hp_per_badge", self.hp_per_badge.into(), 0)?;
        min_int("boss_reward_hp", self.boss_reward_hp.into(), 0)?;
        unit_range("equipment_reduction", self.equipment_reduction, 0.0, 1.0)?;
        unit_range("support_surcharge", self.support_surcharge, 1.0, 3.0)?;
        min_int("burn.min_damage", self.burn.min_damage.into(), 0)?;
        min_int("burn.turns", self.burn.turns.into(), 1)?;
        if self.burn.min_damage > self.burn.max_damage {
            return Err(RulesConfigError::BurnMinExceedsMax {
                min: self.burn.min_damage,
                max: self.burn.max_damage,
            });
        }
        unit_range("explore.card_chance", self.explore.card_chance, 0.0, 1.0)?;
        unit_range("explore.health_chance", self.explore.health_chance, 0.0, 1.0)?;
        unit_range(
            "explore.empty_pool_health_chance",
            self.explore.empty_pool_health_chance,
            0.0,
            1.0,
        )?;
        if self.explore.card_chance + self.explore.health_chance > 1.0 {
            return Err(RulesConfigError::ExploreOdds {
                card: self.explore.card_chance,
                health: self.explore.health_chance,
            });
        }
        min_int("explore.health_amount", self.explore.health_amount.into(), 0)?;
        min_int("explore.shield_amount", self.explore.shield_amount.into(), 0)?;
        min_int("dev.max_hp", self.dev.max_hp.into(), 1)?;
        unit_range("dev.card_boost", self.dev.card_boost, 1.0, 10.0)?;
        positive_fraction("dev.boss_mitigation", self.dev.boss_mitigation)?;
        min_int("deaths_allowed", self.deaths_allowed.into(), 1)?;
        Ok(())
    }
}

/// Failure to load a rules document.
#[derive(Debug, Error)]
pub enum RulesLoadError {
    #[error("rules document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] RulesConfigError),
}

fn min_int(field: &'static str, value: i64, min: i64) -> Result<(), RulesConfigError> {
    if value < min {
        return Err(RulesConfigError::MinViolation { field, min, value });
    }
    Ok(())
}

fn positive_fraction(field: &'static str, value: f64) -> Result<(), RulesConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(RulesConfigError::FractionViolation { field, value });
    }
    Ok(())
}

fn unit_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RulesConfigError> {
    if !(min..=max).contains(&value) {
        return Err(RulesConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
