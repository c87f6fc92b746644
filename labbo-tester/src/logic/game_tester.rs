use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use anyhow::{Result, bail};
use labbo_game::{
    BattleAction, BattleEvent, BattlePhase, EncounterLaunch, GameSession, Gear, ProgressionState,
    RulesConfig, RunStatus, TileId,
};
use serde::Serialize;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

pub const DEFAULT_STEP_LIMIT: usize = 10_000;

pub type Expectation = fn(&RunSummary) -> Result<()>;

/// How a run is prepared before the policy takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunSetup {
    /// Fresh run, no gear.
    Bare,
    /// One piece of gear in every slot.
    Kitted,
    /// Dev mode: straight to the final boss.
    DevMode,
}

#[derive(Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub setup: RunSetup,
    pub max_steps: usize,
    pub verify_replay: bool,
    pub expectations: Vec<Expectation>,
}

impl fmt::Debug for SimulationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationPlan")
            .field("strategy", &self.strategy)
            .field("setup", &self.setup)
            .field("max_steps", &self.max_steps)
            .field("verify_replay", &self.verify_replay)
            .field("expectations", &self.expectations.len())
            .finish()
    }
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            setup: RunSetup::Kitted,
            max_steps: DEFAULT_STEP_LIMIT,
            verify_replay: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_setup(mut self, setup: RunSetup) -> Self {
        self.setup = setup;
        self
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.verify_replay = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

/// One policy decision, kept for failure context.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub step: usize,
    pub tile: TileId,
    pub action: String,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    pub battles: u32,
    pub victories: u32,
    pub defeats: u32,
    pub explorations: u32,
    pub counters: u32,
    pub burns: u32,
    pub branch_tiles: u32,
    pub healing_used: u32,
    pub rejected_actions: u32,
    /// The latest decisions, oldest first.
    pub decision_log: VecDeque<DecisionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub setup: RunSetup,
    pub steps: usize,
    pub halted: bool,
    pub invariant_violations: Vec<String>,
    pub metrics: RunMetrics,
    pub final_state: ProgressionState,
}

impl RunSummary {
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.final_state.run_status
    }
}

const DECISION_LOG_CAP: usize = 64;

/// Drives a [`GameSession`] with a [`PlayerPolicy`] until the run ends.
#[derive(Debug, Clone)]
pub struct GameTester {
    rules: RulesConfig,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            rules: RulesConfig::default(),
            verbose,
        }
    }

    #[must_use]
    pub const fn with_rules(rules: RulesConfig, verbose: bool) -> Self {
        Self { rules, verbose }
    }

    /// Play one seeded run, and a second one when the plan asks for a replay check.
    ///
    /// # Errors
    ///
    /// Fails when the rules are invalid or a replay diverges from the first run.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<RunSummary> {
        let summary = self.play(plan, seed)?;
        if plan.verify_replay {
            let replay = self.play(plan, seed)?;
            if replay.final_state != summary.final_state || replay.steps != summary.steps {
                bail!(
                    "seed {seed} diverged on replay: {} steps vs {} steps",
                    summary.steps,
                    replay.steps
                );
            }
        }
        Ok(summary)
    }

    fn play(&self, plan: &SimulationPlan, seed: u64) -> Result<RunSummary> {
        let mut session = GameSession::with_rules(seed, self.rules.clone())?;
        prepare(&mut session, plan.setup)?;
        let mut policy = plan.strategy.create_policy(seed);
        let mut metrics = RunMetrics::default();
        let mut violations = Vec::new();
        let mut steps = 0;

        while steps < plan.max_steps && !session.state().is_over() {
            steps += 1;
            let completed_before = session.state().completed_tiles.clone();
            if session.battle().is_some() {
                self.battle_step(&mut session, policy.as_mut(), &mut metrics, steps);
            } else if !self.travel_step(&mut session, policy.as_mut(), &mut metrics)? {
                break;
            }
            check_invariants(
                session.state(),
                &completed_before,
                &self.rules,
                &mut violations,
            );
        }

        let summary = RunSummary {
            seed,
            strategy: plan.strategy,
            setup: plan.setup,
            steps,
            halted: !session.state().is_over(),
            invariant_violations: violations,
            metrics,
            final_state: session.state().clone(),
        };
        log::info!(
            "seed {seed} {} finished {:?} after {steps} steps at tile {}",
            plan.strategy,
            summary.status(),
            summary.final_state.current_position
        );
        Ok(summary)
    }

    fn battle_step(
        &self,
        session: &mut GameSession,
        policy: &mut dyn PlayerPolicy,
        metrics: &mut RunMetrics,
        step: usize,
    ) {
        let Some(battle) = session.battle() else {
            return;
        };
        let decision = policy.pick_action(battle);
        record_decision(
            &mut metrics.decision_log,
            DecisionRecord {
                step,
                tile: session.state().current_position,
                action: decision.action.name().to_string(),
                rationale: decision.rationale.clone(),
            },
        );

        let report = match session.resolve_battle_action(decision.action.clone()) {
            Ok(report) => report,
            Err(rejected) => {
                metrics.rejected_actions += 1;
                log::debug!("{} rejected: {rejected}", policy.name());
                // A rejected choice must not stall the fight.
                match session.resolve_battle_action(BattleAction::Skip) {
                    Ok(report) => report,
                    Err(err) => {
                        log::warn!("fallback skip rejected: {err}");
                        return;
                    }
                }
            }
        };

        for event in &report.events {
            match event {
                BattleEvent::SkillCountered { .. } => metrics.counters += 1,
                BattleEvent::BurnApplied { .. } => metrics.burns += 1,
                _ => {}
            }
        }
        if self.verbose {
            for event in &report.events {
                println!("    {event}");
            }
        }

        match report.phase {
            BattlePhase::PlayerWon => metrics.victories += 1,
            BattlePhase::PlayerLost => metrics.defeats += 1,
            BattlePhase::RewardSelection => {
                metrics.victories += 1;
                let options = session
                    .battle()
                    .map(|battle| battle.reward_options().to_vec())
                    .unwrap_or_default();
                if let Some(option) = policy.pick_reward(&options)
                    && let Err(err) = session.choose_reward(option)
                {
                    log::warn!("reward refused: {err}");
                }
            }
            _ => {}
        }
    }

    /// Returns `false` when the policy has nowhere left to go.
    fn travel_step(
        &self,
        session: &mut GameSession,
        policy: &mut dyn PlayerPolicy,
        metrics: &mut RunMetrics,
    ) -> Result<bool> {
        if session.state().healing_available
            && session.state().current_hp < session.state().max_hp
            && policy.wants_healing(session.state())
            && session.use_healing_station().is_ok()
        {
            metrics.healing_used += 1;
        }

        let open = session.accessible_tiles();
        let Some(tile) = policy.pick_tile(session, &open) else {
            log::warn!(
                "{} stuck at tile {} with no open tiles",
                policy.name(),
                session.state().current_position
            );
            return Ok(false);
        };
        if !session.map().is_main(tile) {
            metrics.branch_tiles += 1;
        }
        match session.enter_tile(tile) {
            Ok(EncounterLaunch::Battle { enemy, .. }) => {
                metrics.battles += 1;
                if self.verbose {
                    println!("  tile {tile}: battle vs {enemy}");
                }
            }
            Ok(EncounterLaunch::Exploration(offer)) => {
                metrics.explorations += 1;
                if self.verbose {
                    println!("  tile {tile}: found {}", offer.reward);
                }
                session.complete_exploration(&[offer.reward])?;
            }
            Err(reason) => bail!("tile {tile} was listed open but refused: {reason}"),
        }
        Ok(true)
    }
}

fn record_decision(log: &mut VecDeque<DecisionRecord>, record: DecisionRecord) {
    if log.len() == DECISION_LOG_CAP {
        log.pop_front();
    }
    log.push_back(record);
}

fn prepare(session: &mut GameSession, setup: RunSetup) -> Result<()> {
    match setup {
        RunSetup::Bare => {}
        RunSetup::Kitted => {
            for gear in [Gear::Goggles, Gear::LabCoat, Gear::Gloves] {
                session.equip(gear)?;
            }
        }
        RunSetup::DevMode => {
            session.enable_dev_mode();
        }
    }
    Ok(())
}

fn check_invariants(
    state: &ProgressionState,
    completed_before: &BTreeSet<TileId>,
    rules: &RulesConfig,
    violations: &mut Vec<String>,
) {
    if !state.completed_tiles.is_superset(completed_before) {
        violations.push(format!(
            "completed tiles shrank at tile {}",
            state.current_position
        ));
    }
    if state.current_hp < 0 || state.current_hp > state.max_hp {
        violations.push(format!(
            "HP {} outside 0..={}",
            state.current_hp, state.max_hp
        ));
    }
    if state.death_count > rules.deaths_allowed {
        violations.push(format!("death count {} over limit", state.death_count));
    }
    if !state.dev_mode && state.max_hp != rules.max_hp_for(state.badges.len()) {
        violations.push(format!(
            "max HP {} does not match {} badges",
            state.max_hp,
            state.badges.len()
        ));
    }
}
