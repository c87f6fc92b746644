//! Progression ledger: the only writer of [`ProgressionState`].
//!
//! Each operation is applied atomically against the single active encounter.
//! Run lifecycle changes are mirrored to the `log` facade at info level and
//! recorded as log keys in the capped journal on the state.
use crate::boss::EnemyTag;
use crate::cards::{Card, CardCatalog, CardId};
use crate::combat::RewardOption;
use crate::constants::DEV_MODE_POSITION;
use crate::encounters::ExploreReward;
use crate::map::{MapGraph, TileId};
use crate::numbers::restore;
use crate::rules::RulesConfig;
use crate::state::{EncounterSnapshot, Equipment, EquipmentSlot, Gear, ProgressionState, RunStatus};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

pub const LOG_RUN_RESET: &str = "log.run.reset";
pub const LOG_DEV_MODE: &str = "log.run.dev-mode";
pub const LOG_VICTORY: &str = "log.battle.victory";
pub const LOG_DEFEAT: &str = "log.battle.defeat";
pub const LOG_GAME_OVER: &str = "log.run.game-over";
pub const LOG_RUN_WON: &str = "log.run.won";
pub const LOG_BADGE_PREFIX: &str = "log.badge.";
pub const LOG_ABORT: &str = "log.encounter.abort";
pub const LOG_EXPLORE: &str = "log.explore.complete";
pub const LOG_HEALING: &str = "log.healing.used";
pub const LOG_BRANCH_ENTER: &str = "log.branch.enter";
pub const LOG_BRANCH_RETURN: &str = "log.branch.return";

/// Why the healing station refused service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HealingRejected {
    #[error("the healing station has already been used since the last badge")]
    AlreadyUsed,
    #[error("HP is already full")]
    AlreadyFull,
    #[error("cannot heal during an encounter")]
    EncounterInProgress,
    #[error("the run is over")]
    RunOver,
}

#[derive(Debug, Clone)]
pub struct ProgressionLedger {
    state: ProgressionState,
    rules: RulesConfig,
}

impl ProgressionLedger {
    #[must_use]
    pub fn new(rules: RulesConfig) -> Self {
        let mut state = ProgressionState::default();
        state.max_hp = rules.max_hp_for(0);
        state.current_hp = state.max_hp;
        Self { state, rules }
    }

    #[must_use]
    pub const fn state(&self) -> &ProgressionState {
        &self.state
    }

    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Maximum HP implied by the current badges, or the dev-mode pin.
    #[must_use]
    pub fn computed_max_hp(&self) -> i32 {
        if self.state.dev_mode {
            self.rules.dev.max_hp
        } else {
            self.rules.max_hp_for(self.state.badges.len())
        }
    }

    /// Boss mitigation override in effect for new battles.
    #[must_use]
    pub fn boss_mitigation_override(&self) -> Option<f64> {
        self.state.dev_mode.then_some(self.rules.dev.boss_mitigation)
    }

    /// Owned cards as they play in battle. Dev mode boosts every non-boss card.
    #[must_use]
    pub fn hand(&self, catalog: &CardCatalog) -> Vec<Card> {
        self.state
            .owned_cards
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|card| {
                if self.state.dev_mode && !card.is_boss_reward() {
                    CardCatalog::boosted(card, self.rules.dev.card_boost)
                } else {
                    card.clone()
                }
            })
            .collect()
    }

    /// Start a fresh run: three random basic cards go to the exploration pool,
    /// the rest of the basic deck is owned from the start.
    pub fn reset_run<R: Rng + ?Sized>(&mut self, catalog: &CardCatalog, rng: &mut R) {
        let mut basic: Vec<CardId> = catalog.basic_cards().map(|card| card.id.clone()).collect();
        basic.shuffle(rng);
        let pool_size = self.rules.explorable_pool_size.min(basic.len());
        let owned = basic.split_off(pool_size);

        let mut state = ProgressionState::default();
        state.max_hp = self.rules.max_hp_for(0);
        state.current_hp = state.max_hp;
        state.explorable_pool = basic;
        state.owned_cards = owned.into_iter().collect();
        state.push_log(LOG_RUN_RESET);
        log::info!(
            "run reset: {} cards owned, pool {:?}",
            state.owned_cards.len(),
            state.explorable_pool
        );
        self.state = state;
    }

    /// Debug surface: jump to the final tile fully kitted with boosted cards.
    pub fn enable_dev_mode(&mut self, map: &MapGraph, catalog: &CardCatalog) {
        let state = &mut self.state;
        state.dev_mode = true;
        state.max_hp = self.rules.dev.max_hp;
        state.current_hp = state.max_hp;
        state.owned_cards.extend(catalog.basic_cards().map(|card| card.id.clone()));
        state.explorable_pool.clear();
        state.completed_tiles.extend(map.start_tile()..map.final_tile());
        state.current_position = DEV_MODE_POSITION;
        state.previous_position = DEV_MODE_POSITION;
        state.on_branch = false;
        state.branch_return_tile = None;
        state.equipment = Equipment::full_set();
        state.encounter = None;
        state.push_log(LOG_DEV_MODE);
        log::info!("dev mode enabled at tile {DEV_MODE_POSITION}");
    }

    pub fn equip(&mut self, gear: Gear) -> Option<Gear> {
        self.state.equipment.equip(gear)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Gear> {
        self.state.equipment.unequip(slot)
    }

    /// Move onto `tile` and snapshot what an abort would restore.
    pub fn begin_encounter(&mut self, map: &MapGraph, tile: TileId) {
        let entered_branch = map
            .branch_of(tile)
            .filter(|branch| branch.first() == Some(tile))
            .map(|branch| branch.origin);
        let state = &mut self.state;
        state.current_position = tile;
        if let Some(origin) = entered_branch {
            state.on_branch = true;
            state.branch_return_tile = Some(origin);
            state.push_log(format!("{LOG_BRANCH_ENTER}.{origin}"));
        }
        state.encounter = Some(EncounterSnapshot {
            tile,
            battle_start_hp: state.current_hp,
            entered_branch: entered_branch.is_some(),
        });
    }

    /// Fold a won battle back into progression and complete its tile.
    pub fn record_victory(
        &mut self,
        map: &MapGraph,
        enemy: EnemyTag,
        hp_after: i32,
        reward: Option<&RewardOption>,
    ) {
        let tile = self.encounter_tile();
        self.state.current_hp = hp_after.clamp(0, self.state.max_hp);
        if enemy.is_boss() && self.state.badges.insert(enemy) {
            self.state.healing_available = true;
            self.state.max_hp = self.computed_max_hp();
            self.state
                .push_log(format!("{LOG_BADGE_PREFIX}{}", enemy.key()));
            log::info!(
                "badge earned: {} (max HP {})",
                enemy.badge_name().unwrap_or_default(),
                self.state.max_hp
            );
        }
        match reward {
            Some(RewardOption::Card(card)) => {
                self.state.owned_cards.insert(card.clone());
            }
            Some(RewardOption::MaxHpBoost(_)) => {
                self.state.current_hp = self.state.max_hp;
            }
            None => {}
        }
        self.state.push_log(LOG_VICTORY);
        log::info!("victory over {enemy} on tile {tile}");
        self.state.encounter = None;
        self.complete_tile(map, tile);
        if enemy == EnemyTag::Final {
            self.state.run_status = RunStatus::Won;
            self.state.push_log(LOG_RUN_WON);
            log::info!("run won");
        }
    }

    /// Roll HP back to the battle start and count the death.
    pub fn record_defeat(&mut self) {
        if let Some(hp) = self.state.battle_start_hp() {
            self.state.current_hp = hp;
        }
        self.state.encounter = None;
        self.state.death_count = self.state.death_count.saturating_add(1);
        self.state.push_log(LOG_DEFEAT);
        if self.state.death_count >= self.rules.deaths_allowed {
            self.state.run_status = RunStatus::GameOver;
            self.state.push_log(LOG_GAME_OVER);
            log::info!("game over after {} deaths", self.state.death_count);
        } else {
            self.state.healing_available = true;
            log::info!(
                "defeat {} of {}; healing reopened",
                self.state.death_count,
                self.rules.deaths_allowed
            );
        }
    }

    /// Leave the active encounter without completing it.
    pub fn abort_encounter(&mut self) {
        let Some(snapshot) = self.state.encounter.take() else {
            return;
        };
        let state = &mut self.state;
        state.current_position = state.previous_position;
        if snapshot.entered_branch {
            state.on_branch = false;
            state.branch_return_tile = None;
        }
        state.current_hp = snapshot.battle_start_hp;
        state.push_log(LOG_ABORT);
        log::debug!(
            "encounter on tile {} abandoned, back to {}",
            snapshot.tile,
            state.current_position
        );
    }

    /// Apply exploration pickups and complete the tile.
    pub fn complete_exploration(&mut self, map: &MapGraph, rewards: &[ExploreReward]) {
        let tile = self.encounter_tile();
        for reward in rewards {
            match reward {
                ExploreReward::Card(id) => {
                    self.state.explorable_pool.retain(|candidate| candidate != id);
                    self.state.owned_cards.insert(id.clone());
                }
                ExploreReward::Health(amount) | ExploreReward::Shield(amount) => {
                    self.state.current_hp =
                        restore(self.state.current_hp, *amount, self.state.max_hp);
                }
            }
        }
        self.state.push_log(LOG_EXPLORE);
        self.state.encounter = None;
        self.complete_tile(map, tile);
    }

    /// Full heal at a healing station. One use between badges.
    ///
    /// # Errors
    ///
    /// Returns [`HealingRejected`] when the station is spent or HP is already full.
    pub fn use_healing_station(&mut self) -> Result<(), HealingRejected> {
        if self.state.is_over() {
            return Err(HealingRejected::RunOver);
        }
        if self.state.encounter.is_some() {
            return Err(HealingRejected::EncounterInProgress);
        }
        if !self.state.healing_available {
            return Err(HealingRejected::AlreadyUsed);
        }
        if self.state.current_hp >= self.state.max_hp {
            return Err(HealingRejected::AlreadyFull);
        }
        self.state.current_hp = self.state.max_hp;
        self.state.healing_available = false;
        self.state.push_log(LOG_HEALING);
        Ok(())
    }

    /// Mark `tile` complete. Completing a branch terminal returns to the origin.
    pub fn complete_tile(&mut self, map: &MapGraph, tile: TileId) {
        let state = &mut self.state;
        state.completed_tiles.insert(tile);
        state.previous_position = tile;
        if state.on_branch && map.is_branch_terminal(tile) {
            let origin = state
                .branch_return_tile
                .take()
                .or_else(|| map.branch_of(tile).map(|branch| branch.origin))
                .unwrap_or(state.current_position);
            state.on_branch = false;
            state.current_position = origin;
            state.previous_position = origin;
            state.push_log(format!("{LOG_BRANCH_RETURN}.{origin}"));
        }
    }

    fn encounter_tile(&self) -> TileId {
        self.state
            .encounter
            .map_or(self.state.current_position, |snapshot| snapshot.tile)
    }
}
