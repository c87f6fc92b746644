use crate::boss::{EnemyProfile, EnemyTag};
use crate::cards::{Card, CardCatalog};
use crate::combat::{
    ActionRejected, BattleAction, BattlePhase, BattleReport, BattleSession, BattleSetup,
    CombatTuning, RewardOption,
};
use crate::encounters::{
    BlockReason, EncounterKind, ExploreOffer, ExploreReward, resolve, roll_exploration,
};
use crate::ledger::{HealingRejected, ProgressionLedger};
use crate::map::{MapGraph, TileId};
use crate::rng::RngBundle;
use crate::rules::{RulesConfig, RulesConfigError};
use crate::state::{EquipmentSlot, Gear, ProgressionState};
use serde::{Deserialize, Serialize};

/// What entering a tile started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncounterLaunch {
    Battle {
        tile: TileId,
        enemy: EnemyTag,
        enemy_hp: i32,
        player_hp: i32,
    },
    Exploration(ExploreOffer),
}

#[derive(Debug, Clone)]
enum ActiveEncounter {
    Battle { tile: TileId, battle: BattleSession },
    Exploration(ExploreOffer),
}

/// High-level session binding the board, the catalog, the ledger and the
/// seeded random streams, with at most one encounter in flight.
#[derive(Debug)]
pub struct GameSession {
    map: MapGraph,
    catalog: CardCatalog,
    ledger: ProgressionLedger,
    rng: RngBundle,
    encounter: Option<ActiveEncounter>,
}

impl GameSession {
    /// Start a freshly dealt run with the default rules.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(seed, RulesConfig::default(), CardCatalog::default())
    }

    /// Start a freshly dealt run with custom rules.
    ///
    /// # Errors
    ///
    /// Returns [`RulesConfigError`] when `rules` fails validation.
    pub fn with_rules(seed: u64, rules: RulesConfig) -> Result<Self, RulesConfigError> {
        rules.validate()?;
        Ok(Self::build(seed, rules, CardCatalog::default()))
    }

    fn build(seed: u64, rules: RulesConfig, catalog: CardCatalog) -> Self {
        let mut session = Self {
            map: MapGraph::default(),
            catalog,
            ledger: ProgressionLedger::new(rules),
            rng: RngBundle::from_user_seed(seed),
            encounter: None,
        };
        session.reset_run();
        session
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn state(&self) -> &ProgressionState {
        self.ledger.state()
    }

    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        self.ledger.rules()
    }

    #[must_use]
    pub const fn map(&self) -> &MapGraph {
        &self.map
    }

    #[must_use]
    pub const fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// The battle in progress, if any.
    #[must_use]
    pub fn battle(&self) -> Option<&BattleSession> {
        match &self.encounter {
            Some(ActiveEncounter::Battle { battle, .. }) => Some(battle),
            _ => None,
        }
    }

    /// The exploration pickup waiting to be collected, if any.
    #[must_use]
    pub fn exploration(&self) -> Option<&ExploreOffer> {
        match &self.encounter {
            Some(ActiveEncounter::Exploration(offer)) => Some(offer),
            _ => None,
        }
    }

    /// Cards the player would fight with right now.
    #[must_use]
    pub fn hand(&self) -> Vec<Card> {
        self.ledger.hand(&self.catalog)
    }

    /// Tiles that `enter_tile` would currently accept.
    #[must_use]
    pub fn accessible_tiles(&self) -> Vec<TileId> {
        if self.encounter.is_some() || self.state().is_over() {
            return Vec::new();
        }
        self.map
            .tiles()
            .into_iter()
            .map(|tile| tile.id)
            .filter(|id| resolve(&self.map, *id, self.state()).is_ok())
            .collect()
    }

    /// Try to enter `tile` and launch its encounter.
    ///
    /// # Errors
    ///
    /// Returns the [`BlockReason`] when the tile cannot be entered. Nothing changes.
    pub fn enter_tile(&mut self, tile: TileId) -> Result<EncounterLaunch, BlockReason> {
        if self.encounter.is_some() {
            return Err(BlockReason::EncounterInProgress);
        }
        let kind = resolve(&self.map, tile, self.state())?;
        self.ledger.begin_encounter(&self.map, tile);
        match kind {
            EncounterKind::Battle(enemy) => {
                let battle = self.start_battle(tile, enemy);
                let launch = EncounterLaunch::Battle {
                    tile,
                    enemy,
                    enemy_hp: battle.enemy_hp(),
                    player_hp: battle.player_hp(),
                };
                self.encounter = Some(ActiveEncounter::Battle { tile, battle });
                Ok(launch)
            }
            EncounterKind::Exploration => {
                let reward = roll_exploration(
                    &mut *self.rng.loot(),
                    &self.state().explorable_pool,
                    &self.rules().explore,
                );
                log::debug!("exploration on tile {tile} holds {reward}");
                let offer = ExploreOffer { tile, reward };
                self.encounter = Some(ActiveEncounter::Exploration(offer.clone()));
                Ok(EncounterLaunch::Exploration(offer))
            }
        }
    }

    fn start_battle(&self, tile: TileId, enemy: EnemyTag) -> BattleSession {
        let region = self
            .map
            .region_of(tile)
            .map_or(1, crate::map::Region::number);
        let profile =
            EnemyProfile::for_enemy(enemy, region, self.ledger.boss_mitigation_override());
        log::debug!(
            "battle on tile {tile}: {enemy} with {} HP, mitigation {:.2}",
            profile.max_hp,
            profile.mitigation
        );
        let state = self.state();
        BattleSession::new(BattleSetup {
            profile,
            player_hp: state.current_hp,
            player_max_hp: state.max_hp,
            hand: self.hand(),
            fully_equipped: state.is_fully_equipped(),
            dev_mode: state.dev_mode,
            reward_card: self.catalog.reward_for(enemy).map(|card| card.id.clone()),
            tuning: CombatTuning::from(self.rules()),
        })
    }

    /// Drive the active battle one step. Ordinary victories and defeats are
    /// folded into progression immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ActionRejected`] when no battle is active or the battle refuses the action.
    pub fn resolve_battle_action(
        &mut self,
        action: BattleAction,
    ) -> Result<BattleReport, ActionRejected> {
        let Some(ActiveEncounter::Battle { battle, .. }) = self.encounter.as_mut() else {
            return Err(ActionRejected::NoActiveBattle);
        };
        let report = battle.act(action, &mut *self.rng.combat())?;
        if report.phase.is_terminal() {
            if report.phase == BattlePhase::PlayerLost {
                self.ledger.record_defeat();
            } else {
                self.ledger
                    .record_victory(&self.map, report.enemy, report.player_hp, None);
            }
            self.encounter = None;
        }
        Ok(report)
    }

    /// Take one of the boss rewards on offer and close the battle.
    ///
    /// # Errors
    ///
    /// Returns [`ActionRejected`] outside reward selection or for options not on offer.
    pub fn choose_reward(
        &mut self,
        option: RewardOption,
    ) -> Result<&ProgressionState, ActionRejected> {
        let Some(ActiveEncounter::Battle { battle, .. }) = self.encounter.as_mut() else {
            return Err(ActionRejected::NoActiveBattle);
        };
        let report = battle.choose_reward(option.clone())?;
        self.ledger
            .record_victory(&self.map, report.enemy, report.player_hp, Some(&option));
        self.encounter = None;
        Ok(self.state())
    }

    /// Walk away from an unfinished battle. Position and HP roll back.
    ///
    /// # Errors
    ///
    /// Returns [`ActionRejected`] when no battle is active or a boss reward is pending.
    pub fn exit_battle(&mut self) -> Result<&ProgressionState, ActionRejected> {
        let Some(ActiveEncounter::Battle { battle, tile }) = &self.encounter else {
            return Err(ActionRejected::NoActiveBattle);
        };
        if battle.phase() == BattlePhase::RewardSelection {
            return Err(ActionRejected::WrongPhase {
                action: "exit",
                phase: battle.phase(),
            });
        }
        log::debug!("leaving battle on tile {tile}");
        self.ledger.abort_encounter();
        self.encounter = None;
        Ok(self.state())
    }

    /// Collect the exploration pickup and complete the tile. Anything that
    /// was not on offer is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ActionRejected::NoActiveExploration`] when no exploration is active.
    pub fn complete_exploration(
        &mut self,
        collected: &[ExploreReward],
    ) -> Result<&ProgressionState, ActionRejected> {
        let Some(ActiveEncounter::Exploration(offer)) = &self.encounter else {
            return Err(ActionRejected::NoActiveExploration);
        };
        let accepted: Vec<ExploreReward> = collected
            .iter()
            .find(|reward| **reward == offer.reward)
            .cloned()
            .into_iter()
            .collect();
        self.ledger.complete_exploration(&self.map, &accepted);
        self.encounter = None;
        Ok(self.state())
    }

    /// Deal a new run from the deck stream, dropping any encounter in flight.
    pub fn reset_run(&mut self) -> &ProgressionState {
        self.encounter = None;
        self.ledger.reset_run(&self.catalog, &mut *self.rng.deck());
        self.state()
    }

    /// Debug surface: abandon any encounter and jump to the final boss kitted out.
    pub fn enable_dev_mode(&mut self) -> &ProgressionState {
        if self.encounter.take().is_some() {
            self.ledger.abort_encounter();
        }
        self.ledger.enable_dev_mode(&self.map, &self.catalog);
        self.state()
    }

    /// Full heal, once between badges.
    ///
    /// # Errors
    ///
    /// Returns [`HealingRejected`] when the station cannot be used.
    pub fn use_healing_station(&mut self) -> Result<&ProgressionState, HealingRejected> {
        if self.encounter.is_some() {
            return Err(HealingRejected::EncounterInProgress);
        }
        self.ledger.use_healing_station()?;
        Ok(self.state())
    }

    /// Equip `gear`, returning the piece it replaced.
    ///
    /// # Errors
    ///
    /// Gear cannot change during an encounter.
    pub fn equip(&mut self, gear: Gear) -> Result<Option<Gear>, BlockReason> {
        if self.encounter.is_some() {
            return Err(BlockReason::EncounterInProgress);
        }
        Ok(self.ledger.equip(gear))
    }

    /// Empty `slot`, returning what was in it.
    ///
    /// # Errors
    ///
    /// Gear cannot change during an encounter.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<Option<Gear>, BlockReason> {
        if self.encounter.is_some() {
            return Err(BlockReason::EncounterInProgress);
        }
        Ok(self.ledger.unequip(slot))
    }
}
