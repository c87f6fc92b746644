use std::fmt;

use labbo_game::{
    BattleAction, BattlePhase, BattleSession, Card, CardKind, GameSession, ProgressionState,
    RewardOption, TileId,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Decision returned by a [`PlayerPolicy`] for one battle input.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: BattleAction,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(action: BattleAction, rationale: Option<String>) -> Self {
        Self { action, rationale }
    }

    fn because(action: BattleAction, rationale: &str) -> Self {
        Self::new(action, Some(rationale.to_string()))
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select the next tile from the ones the session currently accepts.
    fn pick_tile(&mut self, session: &GameSession, open: &[TileId]) -> Option<TileId> {
        let map = session.map();
        open.iter()
            .copied()
            .find(|tile| map.is_main(*tile))
            .or_else(|| open.first().copied())
    }

    /// Select an input for the battle in progress.
    fn pick_action(&mut self, battle: &BattleSession) -> PolicyDecision;

    /// Select one of the boss rewards on offer.
    fn pick_reward(&mut self, options: &[RewardOption]) -> Option<RewardOption> {
        options
            .iter()
            .find(|option| matches!(option, RewardOption::MaxHpBoost(_)))
            .cloned()
    }

    /// Whether to spend the healing station before the next tile.
    fn wants_healing(&self, state: &ProgressionState) -> bool {
        state.current_hp * 2 < state.max_hp
    }
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum GameplayStrategy {
    Aggressive,
    Cautious,
    CounterAware,
    BranchExplorer,
    Random,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Cautious => "Cautious",
            Self::CounterAware => "Counter Aware",
            Self::BranchExplorer => "Branch Explorer",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Aggressive => Box::new(AggressivePolicy),
            Self::Cautious => Box::new(CautiousPolicy),
            Self::CounterAware => Box::new(CounterAwarePolicy),
            Self::BranchExplorer => Box::new(BranchExplorerPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct AggressivePolicy;
struct CautiousPolicy;
struct CounterAwarePolicy;
struct BranchExplorerPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn strongest(hand: &[Card], kind: CardKind) -> Option<&Card> {
    hand.iter()
        .filter(|card| card.kind == kind)
        .max_by_key(|card| card.power)
}

fn play(card: &Card) -> BattleAction {
    match card.kind {
        CardKind::Attack => BattleAction::Attack(card.id.clone()),
        CardKind::Defend => BattleAction::Defend(card.id.clone()),
        CardKind::Heal => BattleAction::Heal(card.id.clone()),
    }
}

fn attack_or_skip(battle: &BattleSession) -> PolicyDecision {
    strongest(battle.hand(), CardKind::Attack).map_or_else(
        || PolicyDecision::because(BattleAction::Skip, "no attack card"),
        |card| {
            PolicyDecision::because(
                BattleAction::Attack(card.id.clone()),
                &format!("strongest attack {}", card.power),
            )
        },
    )
}

fn take_counter(battle: &BattleSession) -> Option<PolicyDecision> {
    battle.counter_candidates().first().map(|card| {
        PolicyDecision::because(
            BattleAction::ChooseCounter(card.id.clone()),
            "counter available",
        )
    })
}

fn wants_support(battle: &BattleSession) -> bool {
    battle.enemy().is_boss() && !battle.support_called()
}

impl PlayerPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "Aggressive"
    }

    fn pick_action(&mut self, battle: &BattleSession) -> PolicyDecision {
        if battle.phase() == BattlePhase::CounterChoice {
            return PolicyDecision::because(BattleAction::Skip, "ignores telegraphs");
        }
        attack_or_skip(battle)
    }

    fn pick_reward(&mut self, options: &[RewardOption]) -> Option<RewardOption> {
        options
            .iter()
            .find(|option| matches!(option, RewardOption::Card(_)))
            .or_else(|| options.first())
            .cloned()
    }

    fn wants_healing(&self, state: &ProgressionState) -> bool {
        state.current_hp * 4 < state.max_hp
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_action(&mut self, battle: &BattleSession) -> PolicyDecision {
        if battle.phase() == BattlePhase::CounterChoice {
            return take_counter(battle)
                .unwrap_or_else(|| PolicyDecision::because(BattleAction::Skip, "no counter"));
        }
        if wants_support(battle) {
            return PolicyDecision::because(BattleAction::CallForHelp, "boss fight");
        }
        let hand = battle.hand();
        let burning = battle.burn().is_some();
        if let Some(cure) = hand.iter().find(|card| card.cures_burn)
            && burning
        {
            return PolicyDecision::because(play(cure), "cure burn");
        }
        if battle.player_hp() * 2 < battle.player_max_hp()
            && let Some(heal) = strongest(hand, CardKind::Heal)
        {
            return PolicyDecision::because(BattleAction::Heal(heal.id.clone()), "low HP");
        }
        if battle.shield() == 0
            && battle.enemy().is_boss()
            && battle.turn() % 3 == 0
            && let Some(guard) = strongest(hand, CardKind::Defend)
        {
            return PolicyDecision::because(BattleAction::Defend(guard.id.clone()), "no shield");
        }
        attack_or_skip(battle)
    }
}

impl PlayerPolicy for CounterAwarePolicy {
    fn name(&self) -> &'static str {
        "Counter Aware"
    }

    fn pick_action(&mut self, battle: &BattleSession) -> PolicyDecision {
        if battle.phase() == BattlePhase::CounterChoice {
            return take_counter(battle)
                .unwrap_or_else(|| PolicyDecision::because(BattleAction::Skip, "no counter"));
        }
        if wants_support(battle) {
            return PolicyDecision::because(BattleAction::CallForHelp, "boss fight");
        }
        if battle.player_hp() * 3 < battle.player_max_hp()
            && let Some(heal) = strongest(battle.hand(), CardKind::Heal)
        {
            return PolicyDecision::because(BattleAction::Heal(heal.id.clone()), "low HP");
        }
        attack_or_skip(battle)
    }

    fn pick_reward(&mut self, options: &[RewardOption]) -> Option<RewardOption> {
        options
            .iter()
            .find(|option| matches!(option, RewardOption::Card(_)))
            .or_else(|| options.first())
            .cloned()
    }
}

impl PlayerPolicy for BranchExplorerPolicy {
    fn name(&self) -> &'static str {
        "Branch Explorer"
    }

    fn pick_tile(&mut self, session: &GameSession, open: &[TileId]) -> Option<TileId> {
        let map = session.map();
        open.iter()
            .copied()
            .find(|tile| !map.is_main(*tile))
            .or_else(|| open.iter().copied().find(|tile| map.is_main(*tile)))
    }

    fn pick_action(&mut self, battle: &BattleSession) -> PolicyDecision {
        CounterAwarePolicy.pick_action(battle)
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_tile(&mut self, _session: &GameSession, open: &[TileId]) -> Option<TileId> {
        open.choose(&mut self.rng).copied()
    }

    fn pick_action(&mut self, battle: &BattleSession) -> PolicyDecision {
        if battle.phase() == BattlePhase::CounterChoice {
            if self.rng.gen_bool(0.5)
                && let Some(decision) = take_counter(battle)
            {
                return decision;
            }
            return PolicyDecision::because(BattleAction::Skip, "coin flip");
        }
        let Some(card) = battle.hand().choose(&mut self.rng) else {
            return PolicyDecision::because(BattleAction::Skip, "empty hand");
        };
        PolicyDecision::because(play(card), "random card")
    }

    fn pick_reward(&mut self, options: &[RewardOption]) -> Option<RewardOption> {
        options.choose(&mut self.rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labbo_game::{BattleSetup, CardCatalog, CombatTuning, EnemyProfile, EnemyTag};
    use rand::rngs::mock::StepRng;

    fn battle(tag: EnemyTag) -> BattleSession {
        let catalog = CardCatalog::default();
        BattleSession::new(BattleSetup {
            profile: EnemyProfile::for_enemy(tag, 1, None),
            player_hp: 50,
            player_max_hp: 50,
            hand: catalog.basic_cards().cloned().collect(),
            fully_equipped: false,
            dev_mode: false,
            reward_card: None,
            tuning: CombatTuning::default(),
        })
    }

    #[test]
    fn aggressive_plays_strongest_attack() {
        let decision = AggressivePolicy.pick_action(&battle(EnemyTag::Ordinary));
        let BattleAction::Attack(card) = decision.action else {
            panic!("expected an attack, got {:?}", decision.action);
        };
        let catalog = CardCatalog::default();
        assert_eq!(catalog.get(&card).map(|c| c.power), Some(10));
    }

    #[test]
    fn cautious_calls_support_against_bosses() {
        let decision = CautiousPolicy.pick_action(&battle(EnemyTag::Fire));
        assert_eq!(decision.action, BattleAction::CallForHelp);
    }

    #[test]
    fn counter_aware_answers_telegraphs() {
        let mut fight = battle(EnemyTag::Fire);
        let mut rng = StepRng::new(0, 0);
        fight.act(BattleAction::Skip, &mut rng).unwrap();
        assert_eq!(fight.phase(), BattlePhase::CounterChoice);
        let decision = CounterAwarePolicy.pick_action(&fight);
        assert!(matches!(decision.action, BattleAction::ChooseCounter(_)));
    }

    #[test]
    fn reward_preferences_differ() {
        let options = [
            RewardOption::Card("boss_fire".into()),
            RewardOption::MaxHpBoost(10),
        ];
        assert_eq!(
            CautiousPolicy.pick_reward(&options),
            Some(RewardOption::MaxHpBoost(10))
        );
        assert_eq!(
            AggressivePolicy.pick_reward(&options),
            Some(RewardOption::Card("boss_fire".into()))
        );
    }

    #[test]
    fn random_policy_replays_with_same_seed() {
        let fight = battle(EnemyTag::Ordinary);
        let mut a = RandomPolicy::new(9);
        let mut b = RandomPolicy::new(9);
        for _ in 0..8 {
            assert_eq!(a.pick_action(&fight).action, b.pick_action(&fight).action);
        }
    }
}
