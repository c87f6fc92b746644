//! Encounter selection: which encounter a tile launches and what exploration yields.
use crate::boss::EnemyTag;
use crate::cards::CardId;
use crate::constants::EQUIPMENT_GATE_TILE;
use crate::map::{MapGraph, TileActivity, TileId};
use crate::rules::ExploreRules;
use crate::state::ProgressionState;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    Battle(EnemyTag),
    Exploration,
}

/// Why a tile could not be entered. Blocking never changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Completed, out of reach, or not on the board.
    #[error("tile is locked")]
    Locked,
    #[error("equip all three slots first")]
    EquipmentRequired,
    /// The tile has nothing to launch.
    #[error("nothing happens on this tile")]
    NoEncounter,
    #[error("finish the current encounter first")]
    EncounterInProgress,
    #[error("the run is over, reset to play again")]
    RunOver,
}

/// Decide what entering `tile` launches for the player in `state`.
///
/// # Errors
///
/// Returns the [`BlockReason`] when the tile cannot be entered right now.
pub fn resolve(
    map: &MapGraph,
    tile: TileId,
    state: &ProgressionState,
) -> Result<EncounterKind, BlockReason> {
    if state.is_over() {
        return Err(BlockReason::RunOver);
    }
    if !map.can_access(tile, state) {
        return Err(BlockReason::Locked);
    }
    if tile == EQUIPMENT_GATE_TILE && !state.is_fully_equipped() {
        return Err(BlockReason::EquipmentRequired);
    }
    match map.tile_activity(tile) {
        TileActivity::Battle => Ok(EncounterKind::Battle(map.enemy_for(tile))),
        _ if map.is_forced_boss(tile) => Ok(EncounterKind::Battle(map.enemy_for(tile))),
        TileActivity::Explore => Ok(EncounterKind::Exploration),
        TileActivity::None => Err(BlockReason::NoEncounter),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExploreReward {
    Card(CardId),
    Health(i32),
    Shield(i32),
}

impl fmt::Display for ExploreReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(id) => write!(f, "card {id}"),
            Self::Health(amount) => write!(f, "+{amount} health"),
            Self::Shield(amount) => write!(f, "+{amount} shield"),
        }
    }
}

/// The single pickup waiting on an exploration tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreOffer {
    pub tile: TileId,
    pub reward: ExploreReward,
}

/// Roll the one item an exploration tile holds, drawing cards from `pool`.
pub fn roll_exploration<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[CardId],
    rules: &ExploreRules,
) -> ExploreReward {
    let roll: f64 = rng.r#gen();
    let health = ExploreReward::Health(rules.health_amount);
    let shield = ExploreReward::Shield(rules.shield_amount);
    if pool.is_empty() {
        return if roll < rules.empty_pool_health_chance {
            health
        } else {
            shield
        };
    }
    if roll < rules.card_chance {
        return pool
            .choose(rng)
            .map_or(health, |card| ExploreReward::Card(card.clone()));
    }
    if roll < rules.card_chance + rules.health_chance {
        health
    } else {
        shield
    }
}
