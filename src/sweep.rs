//! Calibration sweep
//!
//! Plays many independent simulated duels per (tier, personality, player
//! skill) scenario and aggregates how often each side recalls correctly.
//! Matches run in parallel with rayon; each match owns its duel, opponent
//! state and RNG, derived from the sweep seed and the match index.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::duel::{Duel, DuelSummary};
use crate::opponent::recall::reproduce;
use crate::types::{Cell, DifficultyTier, Pattern, Personality};

/// Scripted human that retains each cell with a fixed probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedPlayer {
    pub skill: f64,
    pub response_time_ms: u64,
}

impl SimulatedPlayer {
    pub fn new(skill: f64, response_time_ms: u64) -> Self {
        Self {
            skill: crate::sanitize::clamp_unit(skill),
            response_time_ms,
        }
    }

    pub fn respond<R: Rng + ?Sized>(&self, pattern: &[Cell], grid_size: u32, rng: &mut R) -> Pattern {
        reproduce(pattern, grid_size, self.skill, 0.5, rng)
    }

    /// Response time jittered by up to ±25%
    pub fn response_time<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let base = self.response_time_ms as f64;
        (base * rng.gen_range(0.75..1.25)).round().max(1.0) as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepScenario {
    pub tier: DifficultyTier,
    pub personality: Personality,
    pub player: SimulatedPlayer,
}

impl SweepScenario {
    /// Every tier and personality against one player
    pub fn grid(player: SimulatedPlayer) -> Vec<Self> {
        DifficultyTier::ALL
            .iter()
            .flat_map(|&tier| {
                Personality::ALL.iter().map(move |&personality| Self {
                    tier,
                    personality,
                    player,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub scenario: SweepScenario,
    pub matches: usize,
    pub rounds_per_match: usize,
    pub human_success_rate: f64,
    pub opponent_success_rate: f64,
    /// Share of matches where the opponent recalled more rounds than the human
    pub opponent_win_rate: f64,
    pub mean_final_accuracy: f64,
    pub mean_final_level: f64,
}

fn play_match(
    config: &EngineConfig,
    scenario: &SweepScenario,
    rounds: usize,
    seed: u64,
) -> DuelSummary {
    let mut duel = Duel::with_seed(config, scenario.tier, scenario.personality, seed);
    let mut player_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
    for _ in 0..rounds {
        let setup = duel.start_round();
        let submission = scenario
            .player
            .respond(&setup.pattern, setup.grid_size, &mut player_rng);
        let response_time = scenario.player.response_time(&mut player_rng);
        // a round was just started
        if duel.finish_round(&submission, response_time).is_err() {
            break;
        }
    }
    duel.summary()
}

fn mean(summaries: &[DuelSummary], f: impl Fn(&DuelSummary) -> f64) -> f64 {
    if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(f).sum::<f64>() / summaries.len() as f64
    }
}

fn aggregate(scenario: SweepScenario, rounds: usize, summaries: &[DuelSummary]) -> SweepResult {
    SweepResult {
        scenario,
        matches: summaries.len(),
        rounds_per_match: rounds,
        human_success_rate: mean(summaries, |s| s.human_success_rate),
        opponent_success_rate: mean(summaries, |s| s.opponent_success_rate),
        opponent_win_rate: mean(summaries, |s| {
            if s.opponent_correct > s.human_correct {
                1.0
            } else {
                0.0
            }
        }),
        mean_final_accuracy: mean(summaries, |s| s.opponent_base_accuracy),
        mean_final_level: mean(summaries, |s| s.level as f64),
    }
}

/// Run `matches` duels of `rounds` rounds for every scenario.
///
/// Results are in scenario order and do not depend on the thread count.
pub fn run_sweep(
    config: &EngineConfig,
    scenarios: &[SweepScenario],
    matches: usize,
    rounds: usize,
    seed: u64,
) -> Vec<SweepResult> {
    let tasks: Vec<(usize, u64)> = (0..scenarios.len())
        .flat_map(|s| (0..matches).map(move |m| (s, (s * matches + m) as u64)))
        .collect();

    let summaries: Vec<(usize, DuelSummary)> = tasks
        .into_par_iter()
        .map(|(s, index)| {
            let match_seed = seed.wrapping_add(index);
            (s, play_match(config, &scenarios[s], rounds, match_seed))
        })
        .collect();

    let results: Vec<SweepResult> = scenarios
        .iter()
        .enumerate()
        .map(|(s, scenario)| {
            let own: Vec<DuelSummary> = summaries
                .iter()
                .filter(|(idx, _)| *idx == s)
                .map(|(_, summary)| summary.clone())
                .collect();
            aggregate(*scenario, rounds, &own)
        })
        .collect();

    info!(
        scenarios = scenarios.len(),
        matches,
        rounds,
        "calibration sweep finished"
    );
    results
}
