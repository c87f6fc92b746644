//! Labbo Fantasy Rules Engine
//!
//! Platform-agnostic core rules for the Labbo Fantasy lab-safety board and card battler.
//! This crate covers the board, encounters, card combat and run progression without
//! any presentation or storage concerns.

pub mod boss;
pub mod cards;
pub mod combat;
pub mod constants;
pub mod encounters;
pub mod ledger;
pub mod map;
pub mod numbers;
pub mod rng;
pub mod rules;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use boss::{EnemyProfile, EnemyTag, SkillId, TelegraphedSkill};
pub use cards::{
    Card, CardCatalog, CardId, CardKind, CatalogError, Counter, CounterEffect, CounterTarget,
};
pub use combat::{
    ActionRejected, BattleAction, BattleEvent, BattleOutcome, BattlePhase, BattleReport,
    BattleSession, BattleSetup, BurnStatus, CombatTuning, RewardOption, RewardOptions,
    mitigate_incoming,
};
pub use encounters::{BlockReason, EncounterKind, ExploreOffer, ExploreReward};
pub use ledger::{HealingRejected, ProgressionLedger};
pub use map::{Branch, Direction, MapGraph, Region, Tile, TileActivity, TileId};
pub use rng::RngBundle;
pub use rules::{RulesConfig, RulesConfigError, RulesLoadError};
pub use session::{EncounterLaunch, GameSession};
pub use state::{Equipment, EquipmentSlot, Gear, ProgressionState, RunStatus};
