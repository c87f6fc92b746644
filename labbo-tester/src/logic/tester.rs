use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::game_tester::{GameTester, RunSummary, SimulationPlan};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub wins: usize,
    pub game_overs: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct LogicTester {
    tester: GameTester,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(tester: GameTester, verbose: bool) -> Self {
        Self { tester, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (strategy: {} seed: {})",
                        scenario.name.bright_white(),
                        scenario.plan.strategy,
                        seed
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut wins = 0;
        let mut game_overs = 0;
        let mut failures = Vec::new();
        let mut durations = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let outcome = self
                .tester
                .run_plan(&scenario.plan, iteration_seed)
                .and_then(|summary| {
                    evaluate_expectations(&scenario.plan, &summary).map(|()| summary)
                });
            durations.push(start_time.elapsed());

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    match summary.status() {
                        labbo_game::RunStatus::Won => wins += 1,
                        labbo_game::RunStatus::GameOver => game_overs += 1,
                        labbo_game::RunStatus::Active => {}
                    }
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed: {:?} at tile {} after {} steps",
                            i + 1,
                            iterations,
                            summary.status(),
                            summary.final_state.current_position,
                            summary.steps
                        );
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            wins,
            game_overs,
            failures,
            average_duration,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &RunSummary) -> anyhow::Result<()> {
    for expectation in &plan.expectations {
        expectation(summary).map_err(|err| err.context(summarize_decision_path(summary)))?;
    }
    Ok(())
}

fn summarize_decision_path(summary: &RunSummary) -> String {
    let journal = summary.final_state.recent_logs(3).join(", ");
    if summary.metrics.decision_log.is_empty() {
        return format!("no decisions recorded (journal: {journal})");
    }
    let recent = summary
        .metrics
        .decision_log
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            format!(
                "step {} tile {}: {} [{}]",
                entry.step,
                entry.tile,
                entry.action,
                entry.rationale.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "{} {:?} at tile {} HP {}/{}: {recent} (journal: {journal})",
        summary.strategy,
        summary.status(),
        summary.final_state.current_position,
        summary.final_state.current_hp,
        summary.final_state.max_hp
    )
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
