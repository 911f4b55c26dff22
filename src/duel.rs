//! Duel
//!
//! Round orchestration between a human and one opponent. Each round runs
//! start-to-finish in a fixed order:
//!
//! 1. `start_round` picks grid size and pattern length from the level and
//!    shows either a plain pattern from one of the configured generators or a
//!    composed challenge
//! 2. `finish_round` records the human outcome, lets the opponent recall the
//!    same pattern, scores both sides, moves the level and recalibrates
//!
//! The duel owns its opponent state and a seeded RNG, so a duel replayed with
//! the same seed and the same human inputs produces the same rounds.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DuelConfig, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::opponent::{OpponentEngine, OpponentState, Recalibration};
use crate::pattern;
use crate::sanitize::same_cells;
use crate::types::{
    max_pattern_length, Cell, ChallengeOptions, DifficultyTier, GenerationStrategy, Pattern,
    Personality, PlayerStats, RoundMetadata,
};

/// What the human is shown at the start of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSetup {
    pub round: u64,
    pub level: u32,
    pub grid_size: u32,
    pub pattern: Pattern,
    pub is_challenge: bool,
    /// Generator of a plain round; `None` on challenge rounds
    pub strategy: Option<GenerationStrategy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundWinner {
    Human,
    Opponent,
    Both,
    Neither,
}

impl RoundWinner {
    fn score(human: bool, opponent: bool) -> Self {
        match (human, opponent) {
            (true, true) => RoundWinner::Both,
            (true, false) => RoundWinner::Human,
            (false, true) => RoundWinner::Opponent,
            (false, false) => RoundWinner::Neither,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub round: u64,
    pub human_success: bool,
    pub opponent_success: bool,
    pub winner: RoundWinner,
    pub opponent_guess: Pattern,
    pub effective_accuracy: f64,
    /// Level for the next round
    pub level: u32,
    pub recalibration: Option<Recalibration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelSummary {
    pub rounds: u64,
    pub human_correct: u64,
    pub opponent_correct: u64,
    pub human_success_rate: f64,
    pub opponent_success_rate: f64,
    pub level: u32,
    pub opponent_base_accuracy: f64,
}

#[derive(Debug, Clone, Default)]
struct HumanRecord {
    rounds: u64,
    correct: u64,
    streak: u32,
    total_response_ms: u64,
    timed_rounds: u64,
}

impl HumanRecord {
    fn record(&mut self, success: bool, response_time_ms: u64) {
        self.rounds += 1;
        if success {
            self.correct += 1;
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
        }
        if response_time_ms > 0 {
            self.total_response_ms = self.total_response_ms.saturating_add(response_time_ms);
            self.timed_rounds += 1;
        }
    }

    fn success_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.correct as f64 / self.rounds as f64
        }
    }

    fn average_response_time_ms(&self) -> f64 {
        if self.timed_rounds == 0 {
            0.0
        } else {
            self.total_response_ms as f64 / self.timed_rounds as f64
        }
    }
}

pub struct Duel {
    config: DuelConfig,
    engine: OpponentEngine,
    state: OpponentState,
    rng: ChaCha8Rng,
    level: u32,
    round: u64,
    pending: Option<RoundSetup>,
    human: HumanRecord,
    opponent_correct: u64,
}

impl Duel {
    pub fn new(config: &EngineConfig, tier: DifficultyTier, personality: Personality) -> Self {
        Self::with_seed(config, tier, personality, config.duel.seed)
    }

    pub fn with_seed(
        config: &EngineConfig,
        tier: DifficultyTier,
        personality: Personality,
        seed: u64,
    ) -> Self {
        Self {
            config: config.duel.clone(),
            engine: OpponentEngine::new(config),
            state: OpponentState::new(tier, personality),
            rng: ChaCha8Rng::seed_from_u64(seed),
            level: 1,
            round: 0,
            pending: None,
            human: HumanRecord::default(),
            opponent_correct: 0,
        }
    }

    pub fn state(&self) -> &OpponentState {
        &self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn pending(&self) -> Option<&RoundSetup> {
        self.pending.as_ref()
    }

    pub fn grid_size_for(&self, level: u32) -> u32 {
        let step = self.config.levels_per_grid_step.max(1);
        let grid = self
            .config
            .start_grid_size
            .saturating_add(level.saturating_sub(1) / step);
        grid.min(self.config.max_grid_size).max(1)
    }

    /// Level-scaled length, capped at the configured share of the grid and at least one cell
    pub fn pattern_length_for(&self, level: u32, grid_size: u32) -> usize {
        let cap = max_pattern_length(grid_size, self.config.max_pattern_share).max(1);
        let wanted = self
            .config
            .start_pattern_length
            .saturating_add(level.saturating_sub(1) as usize);
        wanted.clamp(1, cap)
    }

    /// Show the next pattern. A round still pending is discarded.
    pub fn start_round(&mut self) -> RoundSetup {
        if let Some(stale) = self.pending.take() {
            debug!(round = stale.round, "discarding unfinished round");
        }
        self.round += 1;
        let grid_size = self.grid_size_for(self.level);
        let length = self.pattern_length_for(self.level, grid_size);

        let is_challenge = self.config.challenge_every > 0
            && self.round % self.config.challenge_every == 0
            && !self.state.mistake_frequency().is_empty();

        let (pattern, strategy) = if is_challenge {
            let challenge = self.engine.compose_challenge(
                &self.state,
                length,
                grid_size,
                &ChallengeOptions::targeted(self.config.challenge_difficulty),
                &mut self.rng,
            );
            (challenge, None)
        } else {
            let strategy = self
                .config
                .strategies
                .choose(&mut self.rng)
                .copied()
                .unwrap_or_default();
            let plain = pattern::generate(grid_size, length, strategy, &mut self.rng);
            (plain, Some(strategy))
        };

        let setup = RoundSetup {
            round: self.round,
            level: self.level,
            grid_size,
            pattern,
            is_challenge,
            strategy,
        };
        debug!(
            round = setup.round,
            level = setup.level,
            grid_size,
            length = setup.pattern.len(),
            strategy = strategy.map(|s| s.as_str()),
            is_challenge,
            "round started"
        );
        self.pending = Some(setup.clone());
        setup
    }

    /// Score the pending round against the human's submission
    pub fn finish_round(
        &mut self,
        submission: &[Cell],
        response_time_ms: u64,
    ) -> EngineResult<RoundOutcome> {
        let setup = self.pending.take().ok_or(EngineError::NoPendingRound)?;
        let human_success = same_cells(submission, &setup.pattern);

        let meta = RoundMetadata::new(setup.grid_size, response_time_ms, setup.level);
        self.engine.record_outcome(
            &mut self.state,
            human_success,
            &setup.pattern,
            submission,
            &meta,
        );
        self.human.record(human_success, response_time_ms);

        let timed = (response_time_ms > 0).then_some(response_time_ms);
        let attempt = self.engine.attempt_recall(
            &mut self.state,
            &setup.pattern,
            setup.grid_size,
            setup.level,
            timed,
            &mut self.rng,
        );
        let opponent_success = attempt.matches(&setup.pattern);
        if opponent_success {
            self.opponent_correct += 1;
        }

        if human_success {
            self.level = self.level.saturating_add(1);
        }

        // current pace against the opponent's response-time window
        let pace = if response_time_ms > 0 {
            response_time_ms as f64
        } else {
            self.human.average_response_time_ms()
        };
        let stats = PlayerStats {
            average_response_time_ms: pace,
            level: self.level,
            consecutive_correct: self.human.streak,
        };
        let recalibration =
            self.engine
                .recalibrate(&mut self.state, self.human.success_rate(), &stats);

        let winner = RoundWinner::score(human_success, opponent_success);
        info!(
            round = setup.round,
            ?winner,
            effective_accuracy = attempt.effective_accuracy,
            level = self.level,
            "round finished"
        );

        Ok(RoundOutcome {
            round: setup.round,
            human_success,
            opponent_success,
            winner,
            opponent_guess: attempt.guess,
            effective_accuracy: attempt.effective_accuracy,
            level: self.level,
            recalibration,
        })
    }

    pub fn summary(&self) -> DuelSummary {
        let rounds = self.human.rounds;
        let rate = |n: u64| if rounds == 0 { 0.0 } else { n as f64 / rounds as f64 };
        DuelSummary {
            rounds,
            human_correct: self.human.correct,
            opponent_correct: self.opponent_correct,
            human_success_rate: rate(self.human.correct),
            opponent_success_rate: rate(self.opponent_correct),
            level: self.level,
            opponent_base_accuracy: self.state.base_accuracy(),
        }
    }
}
