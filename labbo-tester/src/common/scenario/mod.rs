use anyhow::{Result, ensure};

use crate::logic::{GameplayStrategy, RunSetup, RunSummary, SimulationPlan};

const SMOKE_STEP_LIMIT: usize = 40;

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn invariants_hold(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.invariant_violations.is_empty(),
        "invariants broken: {}",
        summary.invariant_violations.join("; ")
    );
    Ok(())
}

fn made_progress(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.final_state.completed_tiles.len() > 1,
        "no tile completed beyond the start"
    );
    Ok(())
}

fn run_finished(summary: &RunSummary) -> Result<()> {
    ensure!(
        !summary.halted && summary.status().is_over(),
        "run still {:?} after {} steps",
        summary.status(),
        summary.steps
    );
    Ok(())
}

fn branch_taken(summary: &RunSummary) -> Result<()> {
    let first_origin_cleared = summary.final_state.completed_tiles.contains(&3);
    ensure!(
        !first_origin_cleared || summary.metrics.branch_tiles > 0,
        "cleared a branch origin without taking the branch"
    );
    Ok(())
}

fn held_at_gate(summary: &RunSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.current_position == 1 && state.completed_tiles.len() == 1,
        "left the start without gear, reached tile {}",
        state.current_position
    );
    Ok(())
}

fn dev_mode_kit(summary: &RunSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(state.dev_mode, "dev mode flag lost");
    ensure!(state.max_hp == 80, "dev mode max HP is {}", state.max_hp);
    ensure!(
        summary.metrics.explorations == 0,
        "dev mode should start at the final boss"
    );
    Ok(())
}

fn full_run(name: &'static str, strategy: GameplayStrategy) -> TestScenario {
    TestScenario::new(
        name,
        SimulationPlan::new(strategy)
            .with_expectation(invariants_hold)
            .with_expectation(run_finished),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name.to_lowercase().as_str() {
        "smoke" => TestScenario::new(
            "Smoke Test",
            SimulationPlan::new(GameplayStrategy::Cautious)
                .with_max_steps(SMOKE_STEP_LIMIT)
                .with_expectation(invariants_hold)
                .with_expectation(made_progress),
        ),
        "aggressive" => full_run("Aggressive Full Run", GameplayStrategy::Aggressive),
        "cautious" => full_run("Cautious Full Run", GameplayStrategy::Cautious),
        "counter-aware" | "counter" => {
            full_run("Counter Aware Full Run", GameplayStrategy::CounterAware)
        }
        "branch-explorer" | "branches" => {
            let base = full_run("Branch Explorer Full Run", GameplayStrategy::BranchExplorer);
            TestScenario::new(base.name, base.plan.with_expectation(branch_taken))
        }
        "equipment-gate" | "gate" => TestScenario::new(
            "Equipment Gate",
            SimulationPlan::new(GameplayStrategy::Aggressive)
                .with_setup(RunSetup::Bare)
                .with_max_steps(SMOKE_STEP_LIMIT)
                .with_expectation(held_at_gate),
        ),
        "random" => full_run("Random Full Run", GameplayStrategy::Random),
        "dev-mode" | "dev" => TestScenario::new(
            "Dev Mode Final Boss",
            SimulationPlan::new(GameplayStrategy::CounterAware)
                .with_setup(RunSetup::DevMode)
                .with_expectation(dev_mode_kit)
                .with_expectation(run_finished),
        ),
        "deterministic" | "replay" => TestScenario::new(
            "Deterministic Replay",
            SimulationPlan::new(GameplayStrategy::Random)
                .with_replay_check()
                .with_expectation(invariants_hold),
        ),
        _ => return None,
    };
    Some(scenario)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("aggressive", "Aggressive Full Run"),
        ("cautious", "Cautious Full Run"),
        ("counter-aware", "Counter Aware Full Run"),
        ("branch-explorer", "Branch Explorer Full Run"),
        ("equipment-gate", "Equipment Gate"),
        ("random", "Random Full Run"),
        ("dev-mode", "Dev Mode Final Boss"),
        ("deterministic", "Deterministic Replay"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, description);
        }
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(get_scenario("DEV").unwrap().name, "Dev Mode Final Boss");
        assert!(get_scenario("replay").unwrap().plan.verify_replay);
    }
}
