use labbo_game::{
    BattleAction, BattlePhase, CardKind, EncounterLaunch, EnemyTag, GameSession, Gear,
    ProgressionState, RewardOption, RunStatus,
};
use std::collections::BTreeSet;

const STEP_LIMIT: usize = 10_000;

/// Plays forward along the main path: counters when it can, heals when low,
/// otherwise attacks with its strongest card.
fn next_action(session: &GameSession) -> BattleAction {
    let battle = session.battle().expect("battle in progress");
    if battle.phase() == BattlePhase::CounterChoice {
        return battle
            .counter_candidates()
            .first()
            .map_or(BattleAction::Skip, |card| {
                BattleAction::ChooseCounter(card.id.clone())
            });
    }
    if battle.enemy().is_boss() && !battle.support_called() {
        return BattleAction::CallForHelp;
    }
    let hand = battle.hand();
    if battle.player_hp() * 3 < battle.player_max_hp()
        && let Some(heal) = hand.iter().find(|card| card.kind == CardKind::Heal)
    {
        return BattleAction::Heal(heal.id.clone());
    }
    hand.iter()
        .filter(|card| card.kind == CardKind::Attack)
        .max_by_key(|card| card.power)
        .map_or(BattleAction::Skip, |card| BattleAction::Attack(card.id.clone()))
}

fn assert_invariants(state: &ProgressionState, completed_before: &BTreeSet<u32>) {
    assert!(state.completed_tiles.is_superset(completed_before));
    assert!(state.current_hp >= 0 && state.current_hp <= state.max_hp);
    assert!(state.death_count <= 2);
    if !state.dev_mode {
        let badges = i32::try_from(state.badges.len()).unwrap();
        assert_eq!(state.max_hp, 50 + 10 * badges);
    }
}

fn play_run(seed: u64) -> GameSession {
    let mut session = GameSession::new(seed);
    for gear in [Gear::Goggles, Gear::LabCoat, Gear::Gloves] {
        session.equip(gear).unwrap();
    }
    for _ in 0..STEP_LIMIT {
        if session.state().is_over() {
            break;
        }
        let completed_before = session.state().completed_tiles.clone();
        if session.battle().is_some() {
            let action = next_action(&session);
            let report = session.resolve_battle_action(action).unwrap();
            if report.phase == BattlePhase::RewardSelection {
                session
                    .choose_reward(RewardOption::MaxHpBoost(10))
                    .unwrap();
            }
        } else {
            if session.state().current_hp < session.state().max_hp
                && session.state().healing_available
            {
                session.use_healing_station().unwrap();
            }
            let tile = *session
                .accessible_tiles()
                .first()
                .expect("an open tile while the run is active");
            match session.enter_tile(tile).unwrap() {
                EncounterLaunch::Exploration(offer) => {
                    session.complete_exploration(&[offer.reward]).unwrap();
                }
                EncounterLaunch::Battle { .. } => {}
            }
        }
        assert_invariants(session.state(), &completed_before);
    }
    session
}

#[test]
fn seeded_runs_reach_an_ending() {
    for seed in [1_u64, 7, 42, 0xC0FFEE] {
        let session = play_run(seed);
        let state = session.state();
        assert!(
            matches!(state.run_status, RunStatus::Won | RunStatus::GameOver),
            "seed {seed} stalled at tile {}",
            state.current_position
        );
        if state.run_status == RunStatus::Won {
            assert!(state.badges.contains(&EnemyTag::Final));
            assert!(state.completed_tiles.contains(&17));
        }
    }
}

#[test]
fn same_seed_replays_identically() {
    let a = play_run(0x5EED);
    let b = play_run(0x5EED);
    assert_eq!(a.state(), b.state());
    assert_eq!(a.rng().combat().draws(), b.rng().combat().draws());
}
