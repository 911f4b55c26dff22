//! Adaptive opponent.
//!
//! - [`state`] - the opponent's configuration and running statistics
//! - [`recall`] - simulated memorisation of a shown pattern
//! - [`recorder`] - per-round outcome bookkeeping
//! - [`difficulty`] - between-round recalibration
//! - [`challenge`] - weakness-targeting pattern composition
//! - [`insights`] - read-only statistics snapshot
//!
//! Every component is a small stateless struct holding its parameters; the
//! mutable data lives in one [`OpponentState`] passed in by reference, and the
//! caller serialises calls round by round.

pub mod challenge;
pub mod difficulty;
pub mod insights;
pub mod recall;
pub mod recorder;
pub mod state;

use rand::Rng;

use crate::config::EngineConfig;
use crate::types::{Cell, ChallengeOptions, Pattern, PlayerStats, RoundMetadata};

pub use challenge::ChallengeComposer;
pub use difficulty::{DifficultyAdjuster, Recalibration, SignalDelta};
pub use insights::OpponentInsights;
pub use recall::{RecallAttempt, RecallSimulator};
pub use recorder::{OutcomeRecorder, SubmissionDiff};
pub use state::{OpponentState, PatternRecord};

/// The four engine components configured from one [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct OpponentEngine {
    recall: RecallSimulator,
    recorder: OutcomeRecorder,
    adjuster: DifficultyAdjuster,
    composer: ChallengeComposer,
}

impl OpponentEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            recall: RecallSimulator::new(config.recall.clone()),
            recorder: OutcomeRecorder::new(config.recorder.clone()),
            adjuster: DifficultyAdjuster::new(config.adjuster.clone()),
            composer: ChallengeComposer::new(config.challenge.clone()),
        }
    }

    pub fn attempt_recall<R: Rng + ?Sized>(
        &self,
        state: &mut OpponentState,
        pattern: &[Cell],
        grid_size: u32,
        level: u32,
        human_response_time_ms: Option<u64>,
        rng: &mut R,
    ) -> RecallAttempt {
        self.recall
            .attempt(state, pattern, grid_size, level, human_response_time_ms, rng)
    }

    pub fn record_outcome(
        &self,
        state: &mut OpponentState,
        success: bool,
        pattern: &[Cell],
        submission: &[Cell],
        meta: &RoundMetadata,
    ) {
        self.recorder.record(state, success, pattern, submission, meta);
    }

    pub fn recalibrate(
        &self,
        state: &mut OpponentState,
        player_success_rate: f64,
        stats: &PlayerStats,
    ) -> Option<Recalibration> {
        self.adjuster.recalibrate(state, player_success_rate, stats)
    }

    pub fn compose_challenge<R: Rng + ?Sized>(
        &self,
        state: &OpponentState,
        length: usize,
        grid_size: u32,
        options: &ChallengeOptions,
        rng: &mut R,
    ) -> Pattern {
        self.composer.compose(state, length, grid_size, options, rng)
    }
}
