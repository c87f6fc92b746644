use labbo_game::{
    ActionRejected, BattleAction, BattleEvent, BattlePhase, BattleSession, BattleSetup,
    BlockReason, CardCatalog, CardId, CombatTuning, EncounterLaunch, EnemyProfile, EnemyTag,
    GameSession, Gear, MapGraph, RunStatus, SkillId, mitigate_incoming,
};
use rand::rngs::mock::StepRng;

fn battle(tag: EnemyTag, region: u8, equipped: bool) -> BattleSession {
    let catalog = CardCatalog::default();
    BattleSession::new(BattleSetup {
        profile: EnemyProfile::for_enemy(tag, region, None),
        player_hp: 50,
        player_max_hp: 50,
        hand: catalog.basic_cards().cloned().collect(),
        fully_equipped: equipped,
        dev_mode: false,
        reward_card: catalog.reward_for(tag).map(|card| card.id.clone()),
        tuning: CombatTuning::default(),
    })
}

fn card(id: &str) -> CardId {
    CardId::from(id)
}

fn kitted_session(seed: u64) -> GameSession {
    let mut session = GameSession::new(seed);
    for gear in [Gear::Mask, Gear::Armor, Gear::Gauntlets] {
        session.equip(gear).unwrap();
    }
    session
}

#[test]
fn ordinary_enemy_takes_full_card_power() {
    let mut fight = battle(EnemyTag::Ordinary, 1, false);
    let report = fight
        .act(BattleAction::Attack(card("atk2")), &mut StepRng::new(0, 0))
        .unwrap();
    assert_eq!(report.enemy_hp, 20);
    assert!(report.events.contains(&BattleEvent::PlayerAttacked {
        card: card("atk2"),
        dealt: 10,
        enemy_hp: 20,
    }));
}

#[test]
fn fire_boss_absorbs_thirty_percent() {
    let mut fight = battle(EnemyTag::Fire, 1, false);
    assert_eq!(fight.enemy_hp(), 80);
    let report = fight
        .act(BattleAction::Attack(card("atk4")), &mut StepRng::new(0, 0))
        .unwrap();
    assert_eq!(report.enemy_hp, 73);
}

#[test]
fn full_equipment_trims_ordinary_hits() {
    let hit = mitigate_incoming(6, 0, true, 0.9);
    assert_eq!(50 - hit.taken, 45);

    let mut fight = battle(EnemyTag::Ordinary, 1, true);
    let report = fight.act(BattleAction::Skip, &mut StepRng::new(0, 0)).unwrap();
    // raw 5 at region 1, floor(5 * 0.9) = 4, then a 3 point burn tick
    assert!(report.events.contains(&BattleEvent::EnemyAttacked {
        raw: 5,
        taken: 4,
        absorbed: 0,
        equipment_saved: 1,
        hp: 46,
    }));
}

#[test]
fn electrical_fire_countered_by_extinguisher() {
    let mut fight = battle(EnemyTag::Fire, 1, false);
    let mut rng = StepRng::new(0, 0);
    let report = fight.act(BattleAction::Defend(card("def3")), &mut rng).unwrap();
    assert_eq!(report.phase, BattlePhase::CounterChoice);
    let pending = report.pending_skill.unwrap();
    assert_eq!(pending.skill, SkillId::ElectricalFire);
    assert_eq!(pending.damage, 8);

    let report = fight
        .act(BattleAction::ChooseCounter(card("atk1")), &mut rng)
        .unwrap();
    assert_eq!(report.enemy_hp, 80 - 7 - 7);
    assert_eq!(report.player_hp, 50);
    assert!(report.events.contains(&BattleEvent::SkillCountered {
        card: card("atk1"),
        skill: SkillId::ElectricalFire,
    }));
}

#[test]
fn counter_choice_rejects_unknown_cards_without_side_effects() {
    let mut fight = battle(EnemyTag::Fire, 1, false);
    let mut rng = StepRng::new(0, 0);
    fight.act(BattleAction::Skip, &mut rng).unwrap();
    let before = fight.log().len();
    assert_eq!(
        fight.act(BattleAction::ChooseCounter(card("boss_fire")), &mut rng),
        Err(ActionRejected::CardNotInHand(card("boss_fire")))
    );
    assert_eq!(fight.log().len(), before);
    assert_eq!(fight.phase(), BattlePhase::CounterChoice);
}

#[test]
fn reset_run_then_tile_two_is_blocked() {
    let mut session = kitted_session(21);
    session.reset_run();
    assert_eq!(session.enter_tile(2), Err(BlockReason::EquipmentRequired));
}

#[test]
fn completed_tiles_stay_closed() {
    let mut session = kitted_session(8);
    let Ok(EncounterLaunch::Exploration(offer)) = session.enter_tile(2) else {
        panic!("tile 2 explores");
    };
    session.complete_exploration(&[offer.reward]).unwrap();
    let map = MapGraph::default();
    assert!(!map.can_access(2, session.state()));
    assert_eq!(session.enter_tile(2), Err(BlockReason::Locked));
    assert_eq!(session.enter_tile(1), Err(BlockReason::Locked));
}

#[test]
fn two_defeats_end_the_run() {
    let mut session = kitted_session(4);
    let Ok(EncounterLaunch::Exploration(offer)) = session.enter_tile(2) else {
        panic!("tile 2 explores");
    };
    session.complete_exploration(&[offer.reward]).unwrap();

    for expected_deaths in 1..=2 {
        session.enter_tile(3).unwrap();
        loop {
            let report = session.resolve_battle_action(BattleAction::Skip).unwrap();
            match report.phase {
                BattlePhase::PlayerLost => break,
                BattlePhase::PlayerTurn => {}
                other => panic!("unexpected phase {other}"),
            }
        }
        assert_eq!(session.state().death_count, expected_deaths);
        assert!(session.battle().is_none());
    }
    assert_eq!(session.state().run_status, RunStatus::GameOver);
    assert_eq!(session.enter_tile(3), Err(BlockReason::RunOver));
    session.reset_run();
    assert_eq!(session.state().run_status, RunStatus::Active);
    assert_eq!(session.state().death_count, 0);
}
