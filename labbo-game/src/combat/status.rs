//! Player status effects and incoming-damage mitigation.
use crate::numbers::scale_floor;
use crate::rules::BurnRules;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Active burn: a damage-over-time debuff ticking at the start of each player turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnStatus {
    pub remaining: u8,
}

/// Result of one burn tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnTick {
    pub damage: i32,
    pub remaining: u8,
}

impl BurnStatus {
    #[must_use]
    pub const fn ignite(rules: &BurnRules) -> Self {
        Self {
            remaining: rules.turns,
        }
    }

    /// Roll this turn's burn damage and count the tick down.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, rules: &BurnRules) -> BurnTick {
        let damage = rng.gen_range(rules.min_damage..=rules.max_damage);
        self.remaining = self.remaining.saturating_sub(1);
        BurnTick {
            damage,
            remaining: self.remaining,
        }
    }

    #[must_use]
    pub const fn expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Breakdown of an enemy hit after shield and equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingHit {
    pub raw: i32,
    pub taken: i32,
    pub absorbed: i32,
    pub equipment_saved: i32,
}

/// Apply an active shield, or failing that the full-equipment reduction, to `raw` damage.
///
/// The shield is consumed by any hit regardless of surplus, so callers reset it to 0.
#[must_use]
pub fn mitigate_incoming(
    raw: i32,
    shield: i32,
    fully_equipped: bool,
    equipment_reduction: f64,
) -> IncomingHit {
    let raw = raw.max(0);
    if shield > 0 {
        let taken = (raw - shield).max(0);
        return IncomingHit {
            raw,
            taken,
            absorbed: raw - taken,
            equipment_saved: 0,
        };
    }
    if fully_equipped {
        let taken = scale_floor(raw, equipment_reduction).max(0);
        return IncomingHit {
            raw,
            taken,
            absorbed: 0,
            equipment_saved: raw - taken,
        };
    }
    IncomingHit {
        raw,
        taken: raw,
        absorbed: 0,
        equipment_saved: 0,
    }
}
