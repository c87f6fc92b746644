//! Turn-based battle state machine.
//!
//! A [`BattleSession`] is created per encounter from the player's current
//! progression and discarded when the encounter ends. Every call to
//! [`BattleSession::act`] consumes one player input and runs the resulting
//! enemy turn inline, so the session is never observed mid-enemy-turn.

mod event;
mod status;

pub use event::{BattleEvent, RewardOption, RewardOptions};
pub use status::{BurnStatus, BurnTick, IncomingHit, mitigate_incoming};

use crate::boss::{EnemyProfile, EnemyTag, SkillId, TelegraphedSkill};
use crate::cards::{Card, CardId, CardKind, CounterEffect};
use crate::numbers::{drain, restore, scale_floor};
use crate::rules::{BurnRules, RulesConfig};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    PlayerTurn,
    CounterChoice,
    PlayerWon,
    PlayerLost,
    RewardSelection,
    Finished,
}

impl BattlePhase {
    /// No further battle actions are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PlayerWon | Self::PlayerLost | Self::Finished)
    }
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlayerTurn => "player-turn",
            Self::CounterChoice => "counter-choice",
            Self::PlayerWon => "player-won",
            Self::PlayerLost => "player-lost",
            Self::RewardSelection => "reward-selection",
            Self::Finished => "finished",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleAction {
    Attack(CardId),
    Defend(CardId),
    Heal(CardId),
    Skip,
    CallForHelp,
    ChooseCounter(CardId),
    InstantKill,
}

impl BattleAction {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Attack(_) => "attack",
            Self::Defend(_) => "defend",
            Self::Heal(_) => "heal",
            Self::Skip => "skip",
            Self::CallForHelp => "call for help",
            Self::ChooseCounter(_) => "choose counter",
            Self::InstantKill => "instant kill",
        }
    }
}

/// Invalid player inputs. A rejected action never changes any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("no battle is in progress")]
    NoActiveBattle,
    #[error("no exploration is in progress")]
    NoActiveExploration,
    #[error("cannot {action} during {phase}")]
    WrongPhase {
        action: &'static str,
        phase: BattlePhase,
    },
    #[error("card `{0}` is not in hand")]
    CardNotInHand(CardId),
    #[error("card `{card}` is a {found} card, not {expected}")]
    WrongCardKind {
        card: CardId,
        expected: CardKind,
        found: CardKind,
    },
    #[error("support can only be called in boss fights")]
    SupportUnavailable,
    #[error("support was already called this battle")]
    SupportAlreadyCalled,
    #[error("instant kill requires dev mode")]
    DevModeRequired,
    #[error("reward `{0}` was not offered")]
    RewardNotOffered(RewardOption),
}

/// Combat knobs lifted from [`RulesConfig`] for the duration of one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatTuning {
    pub support_surcharge: f64,
    pub equipment_reduction: f64,
    pub boss_reward_hp: i32,
    pub burn: BurnRules,
}

impl From<&RulesConfig> for CombatTuning {
    fn from(rules: &RulesConfig) -> Self {
        Self {
            support_surcharge: rules.support_surcharge,
            equipment_reduction: rules.equipment_reduction,
            boss_reward_hp: rules.boss_reward_hp,
            burn: rules.burn.clone(),
        }
    }
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self::from(&RulesConfig::default())
    }
}

/// Everything a battle needs from the outside world.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub profile: EnemyProfile,
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub hand: Vec<Card>,
    pub fully_equipped: bool,
    pub dev_mode: bool,
    pub reward_card: Option<CardId>,
    pub tuning: CombatTuning,
}

/// How a battle ended, as reported to the progression ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory {
        enemy: EnemyTag,
        player_hp: i32,
        reward: Option<RewardOption>,
    },
    Defeat {
        enemy: EnemyTag,
    },
}

/// Snapshot returned after each accepted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub phase: BattlePhase,
    pub enemy: EnemyTag,
    pub enemy_hp: i32,
    pub enemy_max_hp: i32,
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub shield: i32,
    pub burn: Option<BurnStatus>,
    pub pending_skill: Option<TelegraphedSkill>,
    pub support_called: bool,
    /// Events produced by this action only.
    pub events: Vec<BattleEvent>,
    pub outcome: Option<BattleOutcome>,
}

#[derive(Debug, Clone)]
pub struct BattleSession {
    profile: EnemyProfile,
    enemy_hp: i32,
    player_hp: i32,
    player_max_hp: i32,
    hand: Vec<Card>,
    fully_equipped: bool,
    dev_mode: bool,
    reward_card: Option<CardId>,
    tuning: CombatTuning,
    phase: BattlePhase,
    shield: i32,
    burn: Option<BurnStatus>,
    pending_skill: Option<TelegraphedSkill>,
    support_called: bool,
    reward_options: RewardOptions,
    chosen_reward: Option<RewardOption>,
    turn: u32,
    log: Vec<BattleEvent>,
}

impl BattleSession {
    #[must_use]
    pub fn new(setup: BattleSetup) -> Self {
        let BattleSetup {
            profile,
            player_hp,
            player_max_hp,
            hand,
            fully_equipped,
            dev_mode,
            reward_card,
            tuning,
        } = setup;
        let mut session = Self {
            enemy_hp: profile.max_hp,
            player_hp: player_hp.clamp(0, player_max_hp),
            player_max_hp,
            hand,
            fully_equipped,
            dev_mode,
            reward_card,
            tuning,
            phase: BattlePhase::PlayerTurn,
            shield: 0,
            burn: None,
            pending_skill: None,
            support_called: false,
            reward_options: RewardOptions::new(),
            chosen_reward: None,
            turn: 1,
            log: Vec::new(),
            profile,
        };
        session.push(BattleEvent::BattleStarted {
            enemy: session.profile.tag,
            enemy_hp: session.enemy_hp,
            player_hp: session.player_hp,
        });
        session
    }

    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    #[must_use]
    pub const fn enemy(&self) -> EnemyTag {
        self.profile.tag
    }

    #[must_use]
    pub const fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    #[must_use]
    pub const fn enemy_hp(&self) -> i32 {
        self.enemy_hp
    }

    #[must_use]
    pub const fn player_hp(&self) -> i32 {
        self.player_hp
    }

    #[must_use]
    pub const fn player_max_hp(&self) -> i32 {
        self.player_max_hp
    }

    #[must_use]
    pub const fn shield(&self) -> i32 {
        self.shield
    }

    #[must_use]
    pub const fn burn(&self) -> Option<BurnStatus> {
        self.burn
    }

    #[must_use]
    pub const fn pending_skill(&self) -> Option<TelegraphedSkill> {
        self.pending_skill
    }

    #[must_use]
    pub const fn support_called(&self) -> bool {
        self.support_called
    }

    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    #[must_use]
    pub fn reward_options(&self) -> &[RewardOption] {
        &self.reward_options
    }

    #[must_use]
    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    /// Hand cards that would counter the pending skill.
    #[must_use]
    pub fn counter_candidates(&self) -> Vec<&Card> {
        let Some(pending) = self.pending_skill else {
            return Vec::new();
        };
        self.hand
            .iter()
            .filter(|card| card.counters(pending.skill))
            .collect()
    }

    /// The final outcome once the battle is over.
    #[must_use]
    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::PlayerLost => Some(BattleOutcome::Defeat {
                enemy: self.profile.tag,
            }),
            BattlePhase::PlayerWon | BattlePhase::Finished => Some(BattleOutcome::Victory {
                enemy: self.profile.tag,
                player_hp: self.player_hp,
                reward: self.chosen_reward.clone(),
            }),
            _ => None,
        }
    }

    /// Apply one player action and run any enemy turn it triggers.
    ///
    /// # Errors
    ///
    /// Returns [`ActionRejected`] without touching the session when the action
    /// does not fit the current phase, hand or enemy.
    pub fn act<R: Rng + ?Sized>(
        &mut self,
        action: BattleAction,
        rng: &mut R,
    ) -> Result<BattleReport, ActionRejected> {
        let mark = self.log.len();
        match self.phase {
            BattlePhase::PlayerTurn => self.player_turn(action, rng)?,
            BattlePhase::CounterChoice => self.counter_choice(action, rng)?,
            phase => {
                return Err(ActionRejected::WrongPhase {
                    action: action.name(),
                    phase,
                });
            }
        }
        Ok(self.report(mark))
    }

    /// Take one of the offered boss rewards and finish the battle.
    ///
    /// # Errors
    ///
    /// Rejects choices outside reward selection and options that were not offered.
    pub fn choose_reward(&mut self, option: RewardOption) -> Result<BattleReport, ActionRejected> {
        if self.phase != BattlePhase::RewardSelection {
            return Err(ActionRejected::WrongPhase {
                action: "choose reward",
                phase: self.phase,
            });
        }
        if !self.reward_options.contains(&option) {
            return Err(ActionRejected::RewardNotOffered(option));
        }
        let mark = self.log.len();
        self.push(BattleEvent::RewardChosen {
            option: option.clone(),
        });
        self.chosen_reward = Some(option);
        self.phase = BattlePhase::Finished;
        Ok(self.report(mark))
    }

    fn player_turn<R: Rng + ?Sized>(
        &mut self,
        action: BattleAction,
        rng: &mut R,
    ) -> Result<(), ActionRejected> {
        match action {
            BattleAction::Attack(id) => {
                let card = self.card_of_kind(&id, CardKind::Attack)?.clone();
                self.apply_card(&card);
            }
            BattleAction::Defend(id) => {
                let card = self.card_of_kind(&id, CardKind::Defend)?.clone();
                self.apply_card(&card);
            }
            BattleAction::Heal(id) => {
                let card = self.card_of_kind(&id, CardKind::Heal)?.clone();
                self.apply_card(&card);
            }
            BattleAction::Skip => {
                self.shield = 0;
                self.push(BattleEvent::TurnSkipped);
            }
            BattleAction::CallForHelp => {
                if !self.profile.tag.is_boss() {
                    return Err(ActionRejected::SupportUnavailable);
                }
                if self.support_called {
                    return Err(ActionRejected::SupportAlreadyCalled);
                }
                self.support_called = true;
                self.push(BattleEvent::SupportCalled);
                return Ok(());
            }
            BattleAction::InstantKill => {
                self.instant_kill()?;
                return Ok(());
            }
            BattleAction::ChooseCounter(_) => {
                return Err(ActionRejected::WrongPhase {
                    action: action.name(),
                    phase: self.phase,
                });
            }
        }
        if self.enemy_hp == 0 {
            self.enemy_defeated();
        } else {
            self.enemy_turn(rng);
        }
        Ok(())
    }

    fn counter_choice<R: Rng + ?Sized>(
        &mut self,
        action: BattleAction,
        rng: &mut R,
    ) -> Result<(), ActionRejected> {
        let Some(pending) = self.pending_skill else {
            return Err(ActionRejected::WrongPhase {
                action: action.name(),
                phase: self.phase,
            });
        };
        let chosen = match action {
            BattleAction::Attack(id)
            | BattleAction::Defend(id)
            | BattleAction::Heal(id)
            | BattleAction::ChooseCounter(id) => Some(self.card_in_hand(&id)?.clone()),
            BattleAction::Skip => None,
            BattleAction::InstantKill => {
                self.instant_kill()?;
                return Ok(());
            }
            BattleAction::CallForHelp => {
                return Err(ActionRejected::WrongPhase {
                    action: action.name(),
                    phase: self.phase,
                });
            }
        };
        self.pending_skill = None;
        match chosen {
            Some(card) if card.counters(pending.skill) => {
                self.resolve_counter(&card, pending);
                if self.enemy_hp == 0 {
                    self.enemy_defeated();
                } else {
                    self.enemy_turn(rng);
                }
            }
            card => {
                self.push(BattleEvent::CounterMissed {
                    card: card.map(|card| card.id),
                    skill: pending.skill,
                });
                self.land_skill(pending, rng);
            }
        }
        Ok(())
    }

    fn card_in_hand(&self, id: &CardId) -> Result<&Card, ActionRejected> {
        self.hand
            .iter()
            .find(|card| &card.id == id)
            .ok_or_else(|| ActionRejected::CardNotInHand(id.clone()))
    }

    fn card_of_kind(&self, id: &CardId, expected: CardKind) -> Result<&Card, ActionRejected> {
        let card = self.card_in_hand(id)?;
        if card.kind != expected {
            return Err(ActionRejected::WrongCardKind {
                card: id.clone(),
                expected,
                found: card.kind,
            });
        }
        Ok(card)
    }

    fn instant_kill(&mut self) -> Result<(), ActionRejected> {
        if !self.dev_mode {
            return Err(ActionRejected::DevModeRequired);
        }
        self.pending_skill = None;
        self.enemy_hp = 0;
        self.push(BattleEvent::InstantKill);
        self.enemy_defeated();
        Ok(())
    }

    /// A card's normal effect at full value.
    fn apply_card(&mut self, card: &Card) {
        match card.kind {
            CardKind::Attack => {
                self.damage_enemy_mitigated(card, card.power);
                if let Some(bonus) = card.shield_bonus {
                    self.gain_shield(bonus);
                }
            }
            CardKind::Defend => self.gain_shield(card.power),
            CardKind::Heal => {
                self.heal(card.power);
                if card.cures_burn && self.burn.take().is_some() {
                    self.push(BattleEvent::BurnCured);
                }
            }
        }
    }

    fn resolve_counter(&mut self, card: &Card, pending: TelegraphedSkill) {
        self.push(BattleEvent::SkillCountered {
            card: card.id.clone(),
            skill: pending.skill,
        });
        self.apply_card(card);
        if self.enemy_hp == 0 {
            return;
        }
        let Some(counter) = card.counter else {
            return;
        };
        match counter.effect {
            CounterEffect::Shield(amount) => self.gain_shield(amount),
            CounterEffect::Heal(amount) => self.heal(amount),
            CounterEffect::ExtraDamage(amount) => {
                let dealt = self.profile.mitigate(amount);
                self.enemy_hp = drain(self.enemy_hp, dealt);
                self.push(BattleEvent::CounterDamage {
                    dealt,
                    enemy_hp: self.enemy_hp,
                });
            }
            CounterEffect::ClearDebuffs => {
                if self.burn.take().is_some() {
                    self.push(BattleEvent::BurnCured);
                }
            }
            CounterEffect::Reflect(ratio) => {
                let dealt = scale_floor(pending.damage, ratio).max(0);
                self.enemy_hp = drain(self.enemy_hp, dealt);
                self.push(BattleEvent::Reflected {
                    dealt,
                    enemy_hp: self.enemy_hp,
                });
                self.gain_shield(card.power);
            }
        }
    }

    fn damage_enemy_mitigated(&mut self, card: &Card, power: i32) {
        let dealt = self.profile.mitigate(power);
        self.enemy_hp = drain(self.enemy_hp, dealt);
        self.push(BattleEvent::PlayerAttacked {
            card: card.id.clone(),
            dealt,
            enemy_hp: self.enemy_hp,
        });
    }

    fn gain_shield(&mut self, amount: i32) {
        self.shield = self.shield.saturating_add(amount.max(0));
        self.push(BattleEvent::ShieldGained {
            amount,
            total: self.shield,
        });
    }

    fn heal(&mut self, amount: i32) {
        let before = self.player_hp;
        self.player_hp = restore(self.player_hp, amount, self.player_max_hp);
        self.push(BattleEvent::PlayerHealed {
            amount: self.player_hp - before,
            hp: self.player_hp,
        });
    }

    fn enemy_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.profile.telegraph_chance > 0.0 && rng.gen_bool(self.profile.telegraph_chance) {
            let skill = SkillId::ALL
                .choose(rng)
                .copied()
                .unwrap_or(SkillId::ElectricalFire);
            let telegraphed = self.profile.telegraph(skill);
            self.pending_skill = Some(telegraphed);
            self.phase = BattlePhase::CounterChoice;
            self.push(BattleEvent::SkillTelegraphed {
                skill,
                damage: telegraphed.damage,
            });
            return;
        }

        let mut raw = rng.gen_range(self.profile.damage_min..=self.profile.damage_max);
        if self.profile.tag.is_boss() && !self.support_called {
            raw = scale_floor(raw, self.tuning.support_surcharge);
        }
        let hit = self.take_hit(raw);
        self.push(BattleEvent::EnemyAttacked {
            raw: hit.raw,
            taken: hit.taken,
            absorbed: hit.absorbed,
            equipment_saved: hit.equipment_saved,
            hp: self.player_hp,
        });
        self.after_enemy_hit(hit, rng);
    }

    fn land_skill<R: Rng + ?Sized>(&mut self, pending: TelegraphedSkill, rng: &mut R) {
        let hit = self.take_hit(pending.damage);
        self.push(BattleEvent::SkillLanded {
            skill: pending.skill,
            raw: hit.raw,
            taken: hit.taken,
            hp: self.player_hp,
        });
        self.after_enemy_hit(hit, rng);
    }

    fn take_hit(&mut self, raw: i32) -> IncomingHit {
        let hit = mitigate_incoming(
            raw,
            self.shield,
            self.fully_equipped,
            self.tuning.equipment_reduction,
        );
        self.shield = 0;
        self.player_hp = drain(self.player_hp, hit.taken);
        hit
    }

    fn after_enemy_hit<R: Rng + ?Sized>(&mut self, hit: IncomingHit, rng: &mut R) {
        if self.player_hp == 0 {
            self.player_defeated();
            return;
        }
        if hit.taken > 0
            && self.burn.is_none()
            && self.profile.can_burn()
            && rng.gen_bool(self.profile.burn_chance)
        {
            let burn = BurnStatus::ignite(&self.tuning.burn);
            self.push(BattleEvent::BurnApplied {
                turns: burn.remaining,
            });
            self.burn = Some(burn);
        }
        self.start_player_turn(rng);
    }

    fn start_player_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.phase = BattlePhase::PlayerTurn;
        self.turn = self.turn.saturating_add(1);
        let Some(mut burn) = self.burn else {
            return;
        };
        let tick = burn.tick(rng, &self.tuning.burn);
        self.player_hp = drain(self.player_hp, tick.damage);
        self.push(BattleEvent::BurnTick {
            damage: tick.damage,
            remaining: tick.remaining,
            hp: self.player_hp,
        });
        if burn.expired() {
            self.burn = None;
            self.push(BattleEvent::BurnExpired);
        } else {
            self.burn = Some(burn);
        }
        if self.player_hp == 0 {
            self.player_defeated();
        }
    }

    fn enemy_defeated(&mut self) {
        self.phase = BattlePhase::PlayerWon;
        self.push(BattleEvent::EnemyDefeated {
            enemy: self.profile.tag,
        });
        if !self.profile.tag.is_boss() {
            return;
        }
        let mut options = RewardOptions::new();
        if let Some(card) = &self.reward_card {
            options.push(RewardOption::Card(card.clone()));
        }
        options.push(RewardOption::MaxHpBoost(self.tuning.boss_reward_hp));
        self.reward_options = options.clone();
        self.phase = BattlePhase::RewardSelection;
        self.push(BattleEvent::RewardOffered { options });
    }

    fn player_defeated(&mut self) {
        self.phase = BattlePhase::PlayerLost;
        self.pending_skill = None;
        self.push(BattleEvent::PlayerDefeated);
    }

    fn push(&mut self, event: BattleEvent) {
        log::debug!("[{}] {event}", self.profile.tag.key());
        self.log.push(event);
    }

    fn report(&self, mark: usize) -> BattleReport {
        BattleReport {
            phase: self.phase,
            enemy: self.profile.tag,
            enemy_hp: self.enemy_hp,
            enemy_max_hp: self.profile.max_hp,
            player_hp: self.player_hp,
            player_max_hp: self.player_max_hp,
            shield: self.shield,
            burn: self.burn,
            pending_skill: self.pending_skill,
            support_called: self.support_called,
            events: self.log.get(mark..).map(<[_]>::to_vec).unwrap_or_default(),
            outcome: self.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardCatalog;
    use rand::rngs::mock::StepRng;

    /// Every probability hits, every range yields its low bound, skill choice is the first skill.
    fn always_low() -> StepRng {
        StepRng::new(0, 0)
    }

    fn setup(tag: EnemyTag, region: u8, hp: i32, max_hp: i32, equipped: bool) -> BattleSetup {
        let catalog = CardCatalog::default();
        BattleSetup {
            profile: EnemyProfile::for_enemy(tag, region, None),
            player_hp: hp,
            player_max_hp: max_hp,
            hand: catalog.basic_cards().cloned().collect(),
            fully_equipped: equipped,
            dev_mode: false,
            reward_card: catalog.reward_for(tag).map(|card| card.id.clone()),
            tuning: CombatTuning::default(),
        }
    }

    fn id(raw: &str) -> CardId {
        CardId::from(raw)
    }

    #[test]
    fn ordinary_attack_is_unmitigated() {
        let mut battle = BattleSession::new(setup(EnemyTag::Ordinary, 2, 50, 50, false));
        let before = battle.enemy_hp();
        let report = battle
            .act(BattleAction::Attack(id("atk1")), &mut always_low())
            .unwrap();
        assert_eq!(before - report.enemy_hp, 10);
        assert_eq!(report.phase, BattlePhase::PlayerTurn);
    }

    #[test]
    fn fire_boss_mitigates_plain_attack() {
        let mut battle = BattleSession::new(setup(EnemyTag::Fire, 1, 50, 50, false));
        let report = battle
            .act(BattleAction::Attack(id("atk1")), &mut always_low())
            .unwrap();
        assert_eq!(report.enemy_hp, 73);
        assert_eq!(report.phase, BattlePhase::CounterChoice);
        assert_eq!(
            report.pending_skill,
            Some(TelegraphedSkill {
                skill: SkillId::ElectricalFire,
                damage: 8,
            })
        );
    }

    #[test]
    fn extinguisher_counters_electrical_fire() {
        let mut battle = BattleSession::new(setup(EnemyTag::Fire, 1, 50, 50, false));
        let mut rng = always_low();
        battle.act(BattleAction::Attack(id("atk1")), &mut rng).unwrap();
        assert_eq!(battle.counter_candidates().len(), 3);

        let report = battle
            .act(BattleAction::ChooseCounter(id("atk1")), &mut rng)
            .unwrap();
        // 73 - floor(10 * 0.7) base - floor(10 * 0.7) bonus
        assert_eq!(report.enemy_hp, 59);
        assert_eq!(report.player_hp, 50);
        assert!(report.events.iter().any(|event| matches!(
            event,
            BattleEvent::CounterDamage { dealt: 7, .. }
        )));
        assert!(
            !report
                .events
                .iter()
                .any(|event| matches!(event, BattleEvent::SkillLanded { .. }))
        );
    }

    #[test]
    fn non_counter_card_lets_skill_land() {
        let mut battle = BattleSession::new(setup(EnemyTag::Fire, 1, 50, 50, true));
        let mut rng = always_low();
        battle.act(BattleAction::Attack(id("atk1")), &mut rng).unwrap();
        let report = battle
            .act(BattleAction::Heal(id("heal1")), &mut rng)
            .unwrap();
        // floor(8 * 0.9) then a fresh burn ticks for 3 at the next turn start
        assert_eq!(report.enemy_hp, 73);
        assert!(report.events.contains(&BattleEvent::SkillLanded {
            skill: SkillId::ElectricalFire,
            raw: 8,
            taken: 7,
            hp: 43,
        }));
        assert_eq!(report.player_hp, 40);
        assert_eq!(report.burn, Some(BurnStatus { remaining: 2 }));
        assert_eq!(report.phase, BattlePhase::PlayerTurn);
    }

    #[test]
    fn reflect_counter_grants_shield_and_reflects() {
        let mut battle = BattleSession::new(setup(EnemyTag::Fire, 1, 50, 50, false));
        let mut rng = always_low();
        battle.act(BattleAction::Attack(id("atk1")), &mut rng).unwrap();
        let report = battle
            .act(BattleAction::Defend(id("def1")), &mut rng)
            .unwrap();
        assert!(report.events.contains(&BattleEvent::Reflected {
            dealt: 4,
            enemy_hp: 69,
        }));
        // base 10 + bonus 10, untouched because the follow-up enemy turn telegraphs again
        assert_eq!(report.shield, 20);
        assert_eq!(report.phase, BattlePhase::CounterChoice);
    }

    /// Fire boss in region 1 with `skill` telegraphed after an opening attack.
    fn awaiting_counter(skill: SkillId, hp: i32) -> (BattleSession, StepRng) {
        let mut battle = BattleSession::new(setup(EnemyTag::Fire, 1, hp, 50, false));
        let mut rng = always_low();
        battle.act(BattleAction::Attack(id("atk1")), &mut rng).unwrap();
        assert_eq!(battle.phase(), BattlePhase::CounterChoice);
        battle.pending_skill = Some(battle.profile.telegraph(skill));
        (battle, rng)
    }

    fn retelegraphs(report: &BattleReport) -> bool {
        report.phase == BattlePhase::CounterChoice
            && report.events.last()
                == Some(&BattleEvent::SkillTelegraphed {
                    skill: SkillId::ElectricalFire,
                    damage: 8,
                })
    }

    #[test]
    fn shovel_counter_grants_shield_against_debris() {
        let (mut battle, mut rng) = awaiting_counter(SkillId::DebrisAccumulation, 50);
        let report = battle
            .act(BattleAction::ChooseCounter(id("atk4")), &mut rng)
            .unwrap();
        assert_eq!(
            report.events[0],
            BattleEvent::SkillCountered {
                card: id("atk4"),
                skill: SkillId::DebrisAccumulation,
            }
        );
        assert!(report.events.contains(&BattleEvent::ShieldGained {
            amount: 10,
            total: 10,
        }));
        assert_eq!(report.enemy_hp, 66);
        assert_eq!(report.player_hp, 50);
        assert_eq!(report.shield, 10);
        assert_eq!(report.burn, None);
        assert!(retelegraphs(&report));
    }

    #[test]
    fn sand_bucket_counter_heals_against_chemical_fire() {
        let (mut battle, mut rng) = awaiting_counter(SkillId::ChemicalFire, 30);
        let report = battle
            .act(BattleAction::ChooseCounter(id("atk2")), &mut rng)
            .unwrap();
        assert_eq!(
            report.events[0],
            BattleEvent::SkillCountered {
                card: id("atk2"),
                skill: SkillId::ChemicalFire,
            }
        );
        assert!(report.events.contains(&BattleEvent::PlayerHealed { amount: 10, hp: 40 }));
        assert_eq!(report.enemy_hp, 66);
        assert_eq!(report.player_hp, 40);
        assert_eq!(report.shield, 0);
        assert_eq!(report.burn, None);
        assert!(retelegraphs(&report));
    }

    #[test]
    fn fire_triangle_counter_clears_burn() {
        let (mut battle, mut rng) = awaiting_counter(SkillId::ChemicalFire, 50);
        battle.burn = Some(BurnStatus { remaining: 2 });
        let report = battle
            .act(BattleAction::ChooseCounter(id("atk5")), &mut rng)
            .unwrap();
        assert_eq!(
            report.events[0],
            BattleEvent::SkillCountered {
                card: id("atk5"),
                skill: SkillId::ChemicalFire,
            }
        );
        assert!(report.events.contains(&BattleEvent::BurnCured));
        // 73 - floor(5 * 0.7)
        assert_eq!(report.enemy_hp, 70);
        assert_eq!(report.player_hp, 50);
        assert_eq!(report.shield, 0);
        assert_eq!(report.burn, None);
        assert!(retelegraphs(&report));
    }

    #[test]
    fn shield_is_consumed_by_any_hit() {
        let mut battle = BattleSession::new(setup(EnemyTag::Ordinary, 3, 50, 50, true));
        let report = battle
            .act(BattleAction::Defend(id("def2")), &mut always_low())
            .unwrap();
        assert_eq!(report.shield, 0);
        assert_eq!(report.player_hp, 50);
        assert!(report.events.contains(&BattleEvent::EnemyAttacked {
            raw: 8,
            taken: 0,
            absorbed: 8,
            equipment_saved: 0,
            hp: 50,
        }));
    }

    #[test]
    fn boss_surcharge_until_support_called() {
        let mut battle = BattleSession::new(setup(EnemyTag::Elec, 2, 50, 50, false));
        let mut rng = always_low();
        let report = battle.act(BattleAction::Skip, &mut rng).unwrap();
        // floor(7 * 1.15)
        assert_eq!(report.player_hp, 42);

        battle.act(BattleAction::CallForHelp, &mut rng).unwrap();
        assert_eq!(
            battle.act(BattleAction::CallForHelp, &mut rng),
            Err(ActionRejected::SupportAlreadyCalled)
        );
        let report = battle.act(BattleAction::Skip, &mut rng).unwrap();
        assert_eq!(report.player_hp, 35);
    }

    #[test]
    fn rejected_actions_leave_state_untouched() {
        let mut battle = BattleSession::new(setup(EnemyTag::Ordinary, 1, 50, 50, false));
        let mut rng = always_low();
        let log_len = battle.log().len();
        assert_eq!(
            battle.act(BattleAction::Attack(id("def1")), &mut rng),
            Err(ActionRejected::WrongCardKind {
                card: id("def1"),
                expected: CardKind::Attack,
                found: CardKind::Defend,
            })
        );
        assert_eq!(
            battle.act(BattleAction::Attack(id("boss_fire")), &mut rng),
            Err(ActionRejected::CardNotInHand(id("boss_fire")))
        );
        assert_eq!(
            battle.act(BattleAction::CallForHelp, &mut rng),
            Err(ActionRejected::SupportUnavailable)
        );
        assert_eq!(
            battle.act(BattleAction::InstantKill, &mut rng),
            Err(ActionRejected::DevModeRequired)
        );
        assert!(matches!(
            battle.act(BattleAction::ChooseCounter(id("atk1")), &mut rng),
            Err(ActionRejected::WrongPhase { .. })
        ));
        assert!(matches!(
            battle.choose_reward(RewardOption::MaxHpBoost(10)),
            Err(ActionRejected::WrongPhase { .. })
        ));
        assert_eq!(battle.log().len(), log_len);
        assert_eq!(battle.enemy_hp(), 30);
    }

    #[test]
    fn burn_ticks_at_turn_start_and_expires() {
        let mut battle = BattleSession::new(setup(EnemyTag::Ordinary, 1, 50, 50, false));
        let mut rng = always_low();
        // hit 5, burn applied then ticks 3
        let report = battle.act(BattleAction::Skip, &mut rng).unwrap();
        assert_eq!(report.player_hp, 42);
        assert_eq!(report.burn, Some(BurnStatus { remaining: 2 }));
        // hit 5 (already burning, no restack), tick 3
        let report = battle.act(BattleAction::Skip, &mut rng).unwrap();
        assert_eq!(report.player_hp, 34);
        assert_eq!(report.burn, Some(BurnStatus { remaining: 1 }));
        let report = battle.act(BattleAction::Skip, &mut rng).unwrap();
        assert_eq!(report.player_hp, 26);
        assert_eq!(report.burn, None);
        assert!(report.events.contains(&BattleEvent::BurnExpired));
    }

    #[test]
    fn medical_kit_cures_burn() {
        let mut battle = BattleSession::new(setup(EnemyTag::Ordinary, 1, 50, 50, false));
        let mut rng = always_low();
        battle.act(BattleAction::Skip, &mut rng).unwrap();
        let report = battle.act(BattleAction::Heal(id("heal1")), &mut rng).unwrap();
        assert!(report.events.contains(&BattleEvent::BurnCured));
        assert!(report.events.contains(&BattleEvent::PlayerHealed { amount: 8, hp: 50 }));
    }

    #[test]
    fn boss_victory_offers_two_rewards() {
        let mut config = setup(EnemyTag::Fire, 1, 50, 50, false);
        config.dev_mode = true;
        let mut battle = BattleSession::new(config);
        let report = battle
            .act(BattleAction::InstantKill, &mut always_low())
            .unwrap();
        assert_eq!(report.phase, BattlePhase::RewardSelection);
        assert!(!report.phase.is_terminal());
        assert_eq!(
            battle.reward_options(),
            &[
                RewardOption::Card(id("boss_fire")),
                RewardOption::MaxHpBoost(10)
            ]
        );
        assert!(matches!(
            battle.choose_reward(RewardOption::MaxHpBoost(99)),
            Err(ActionRejected::RewardNotOffered(_))
        ));
        let report = battle.choose_reward(RewardOption::MaxHpBoost(10)).unwrap();
        assert_eq!(report.phase, BattlePhase::Finished);
        assert!(report.phase.is_terminal());
        assert_eq!(
            report.outcome,
            Some(BattleOutcome::Victory {
                enemy: EnemyTag::Fire,
                player_hp: 50,
                reward: Some(RewardOption::MaxHpBoost(10)),
            })
        );
    }

    #[test]
    fn ordinary_victory_skips_rewards() {
        let mut battle = BattleSession::new(setup(EnemyTag::Ordinary, 1, 50, 50, false));
        let mut rng = always_low();
        let mut report = battle.act(BattleAction::Attack(id("atk1")), &mut rng).unwrap();
        while report.phase == BattlePhase::PlayerTurn {
            report = battle.act(BattleAction::Attack(id("atk1")), &mut rng).unwrap();
        }
        assert_eq!(report.phase, BattlePhase::PlayerWon);
        assert!(battle.reward_options().is_empty());
        assert!(matches!(
            battle.act(BattleAction::Skip, &mut rng),
            Err(ActionRejected::WrongPhase { .. })
        ));
    }

    #[test]
    fn lethal_hit_ends_in_defeat() {
        let mut battle = BattleSession::new(setup(EnemyTag::Final, 4, 3, 50, false));
        let mut rng = always_low();
        battle.act(BattleAction::Skip, &mut rng).unwrap();
        let report = battle.act(BattleAction::Skip, &mut rng).unwrap();
        assert_eq!(report.phase, BattlePhase::PlayerLost);
        assert_eq!(report.player_hp, 0);
        assert_eq!(
            report.outcome,
            Some(BattleOutcome::Defeat {
                enemy: EnemyTag::Final
            })
        );
    }
}
