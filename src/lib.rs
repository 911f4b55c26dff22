//! # recall-rival - adaptive opponent engine for grid memory games
//!
//! This crate provides the simulated competitor of a tile-pattern memory game:
//!
//! - **Pattern Generator** - unique cell sequences on an N×N grid (random, walk, shapes)
//! - **Recall Simulator** - noisy reproduction of a pattern from a layered effective accuracy
//! - **Outcome Recorder** - per-round bookkeeping of hits, misses and mistaken cells
//! - **Difficulty Adjuster** - recalibration of accuracy and learning rate from player performance
//! - **Challenge Composer** - patterns built to attack the player's observed weaknesses
//!
//! ## Design
//!
//! - **Deterministic learning** - every adaptation is a clamped numeric update over running statistics
//! - **Caller-owned randomness** - every stochastic operation takes a `rand::Rng`
//! - **Single owner** - one [`OpponentState`] per match, mutated round by round
//!
//! ## Modules
//!
//! - [`types`] - shared enums, records and constants
//! - [`sanitize`] - numeric clamps and pattern cleaning
//! - [`pattern`] - pattern generation and structural classification
//! - [`opponent`] - opponent state and the four engine components
//! - [`duel`] - round orchestration between a human and one opponent
//! - [`sweep`] - parallel calibration over independent simulated matches
//! - [`config`] - engine and simulation configuration
//! - [`logging`] - tracing subscriber setup
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use recall_rival::{pattern, DifficultyTier, GenerationStrategy, OpponentEngine, OpponentState, Personality, RoundMetadata};
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let engine = OpponentEngine::default();
//! let mut state = OpponentState::new(DifficultyTier::Medium, Personality::Balanced);
//!
//! let shown = pattern::generate(4, 5, GenerationStrategy::Sequential, &mut rng);
//! engine.record_outcome(&mut state, false, &shown, &shown[..3], &RoundMetadata::new(4, 2400, 1));
//! let attempt = engine.attempt_recall(&mut state, &shown, 4, 1, Some(2400), &mut rng);
//! assert_eq!(attempt.guess.len(), shown.len());
//! ```

// ============================================================================
// Module declarations
// ============================================================================

pub mod config;
pub mod duel;
pub mod error;
pub mod logging;
pub mod opponent;
pub mod pattern;
pub mod sanitize;
pub mod sweep;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export all shared types
pub use types::*;

pub use config::{
    AdjusterParams, ChallengeParams, DuelConfig, EngineConfig, RecallParams, RecorderParams,
    SimConfig,
};
pub use duel::{Duel, DuelSummary, RoundOutcome, RoundSetup, RoundWinner};
pub use error::{EngineError, EngineResult};
pub use opponent::{
    ChallengeComposer, DifficultyAdjuster, OpponentEngine, OpponentInsights, OpponentState,
    OutcomeRecorder, PatternRecord, RecallAttempt, RecallSimulator, Recalibration,
};
pub use sweep::{run_sweep, SimulatedPlayer, SweepResult, SweepScenario};
