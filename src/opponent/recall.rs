//! Recall Simulator
//!
//! Computes the opponent's effective accuracy for one round and reproduces the
//! shown pattern with that per-cell retention probability.
//!
//! Effective accuracy is a fold over a fixed, ordered list of pure adjustment
//! steps starting from the baseline accuracy:
//!
//! 1. level penalty
//! 2. repetition bonus (similar patterns in history)
//! 3. personality pattern-recognition bonus
//! 4. consistency shrinkage toward the baseline
//! 5. cross-dimension transfer from strong player dimensions
//! 6. tempo (reaction-speed factor when the human answers faster than usual)
//! 7. risk-taking jitter
//!
//! The folded value is clamped to `[min_accuracy, max_accuracy]` once at the end.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::RecallParams;
use crate::opponent::state::{OpponentState, PatternRecord};
use crate::sanitize::{same_cells, unique_cells};
use crate::types::{
    clamp_grid_size, grid_cells, AdaptiveFactor, AdaptiveFactors, Cell, Pattern,
    PersonalityTraits,
};

/// Everything the adjustment steps may read, gathered before folding
#[derive(Debug, Clone)]
pub struct RecallContext {
    pub base_accuracy: f64,
    pub learning_rate: f64,
    pub level: u32,
    pub similar_patterns: usize,
    pub traits: PersonalityTraits,
    pub factors: AdaptiveFactors,
    /// Player success rate at this grid size, if observed
    pub grid_rate: Option<f64>,
    /// Player success rate at this pattern length, if observed
    pub length_rate: Option<f64>,
    /// Historical mean response time divided by this round's, if both are known
    pub tempo_ratio: Option<f64>,
    /// Zero-mean draw in `[-1, 1)`
    pub jitter: f64,
}

pub type AdjustmentStep = fn(f64, &RecallContext, &RecallParams) -> f64;

pub const ADJUSTMENT_PIPELINE: [(&str, AdjustmentStep); 7] = [
    ("level_penalty", level_penalty),
    ("repetition_bonus", repetition_bonus),
    ("pattern_recognition", pattern_recognition_bonus),
    ("consistency", consistency_shrinkage),
    ("cross_dimension", cross_dimension_transfer),
    ("tempo", tempo_adjustment),
    ("risk_jitter", risk_jitter),
];

pub fn level_penalty(acc: f64, ctx: &RecallContext, params: &RecallParams) -> f64 {
    let levels_above_first = ctx.level.saturating_sub(1) as f64;
    acc - (levels_above_first * params.level_penalty_per_level).min(params.max_level_penalty)
}

pub fn repetition_bonus(acc: f64, ctx: &RecallContext, params: &RecallParams) -> f64 {
    acc + (ctx.similar_patterns as f64 * ctx.learning_rate).min(params.max_repetition_bonus)
}

pub fn pattern_recognition_bonus(acc: f64, ctx: &RecallContext, _params: &RecallParams) -> f64 {
    acc + ctx.traits.pattern_recognition * ctx.factors.get(AdaptiveFactor::PatternRecognition)
}

pub fn consistency_shrinkage(acc: f64, ctx: &RecallContext, _params: &RecallParams) -> f64 {
    let c = ctx.traits.consistency;
    if c > 0.0 {
        acc + (ctx.base_accuracy - acc) * c.min(1.0)
    } else {
        acc
    }
}

pub fn cross_dimension_transfer(acc: f64, ctx: &RecallContext, params: &RecallParams) -> f64 {
    let mut next = acc;
    if ctx.grid_rate.is_some_and(|r| r > params.transfer_threshold) {
        next += params.transfer_bonus * ctx.factors.get(AdaptiveFactor::SpatialMemory);
    }
    if ctx.length_rate.is_some_and(|r| r > params.transfer_threshold) {
        next += params.transfer_bonus * ctx.factors.get(AdaptiveFactor::SequenceMemory);
    }
    next
}

pub fn tempo_adjustment(acc: f64, ctx: &RecallContext, params: &RecallParams) -> f64 {
    match ctx.tempo_ratio {
        Some(ratio) if ratio > 1.0 => {
            acc + params.tempo_bonus * (ctx.factors.get(AdaptiveFactor::ReactionSpeed) - 1.0)
        }
        _ => acc,
    }
}

pub fn risk_jitter(acc: f64, ctx: &RecallContext, _params: &RecallParams) -> f64 {
    acc + ctx.traits.risk_taking * ctx.jitter
}

/// Fold the pipeline and clamp
pub fn effective_accuracy(ctx: &RecallContext, params: &RecallParams) -> f64 {
    let raw = ADJUSTMENT_PIPELINE
        .iter()
        .fold(ctx.base_accuracy, |acc, (name, step)| {
            let next = step(acc, ctx, params);
            trace!(step = *name, before = acc, after = next, "accuracy adjustment");
            next
        });
    if raw.is_finite() {
        raw.clamp(params.min_accuracy, params.max_accuracy)
    } else {
        params.min_accuracy
    }
}

/// Two patterns are similar when they share at least `share` of the current pattern's cells
pub fn is_similar(previous: &[Cell], current: &[Cell], share: f64) -> bool {
    if current.is_empty() {
        return false;
    }
    let current_set: HashSet<Cell> = current.iter().copied().collect();
    let shared = previous.iter().filter(|c| current_set.contains(c)).count();
    shared as f64 >= current.len() as f64 * share
}

/// Noisy reproduction of `pattern`.
///
/// Each cell survives with probability `accuracy`; the shortfall is filled with
/// cells not yet guessed, drawn from outside the pattern with probability
/// `outside_preference` when such cells exist. The result is shuffled.
pub fn reproduce<R: Rng + ?Sized>(
    pattern: &[Cell],
    grid_size: u32,
    accuracy: f64,
    outside_preference: f64,
    rng: &mut R,
) -> Pattern {
    let total = grid_cells(grid_size);
    let mut guess: Pattern = pattern
        .iter()
        .copied()
        .filter(|_| rng.gen::<f64>() < accuracy)
        .collect();
    let mut chosen: HashSet<Cell> = guess.iter().copied().collect();
    let in_pattern: HashSet<Cell> = pattern.iter().copied().collect();

    while guess.len() < pattern.len() {
        let prefer_outside = rng.gen::<f64>() < outside_preference;
        let mut pool: Pattern = (0..total)
            .filter(|c| !chosen.contains(c) && !(prefer_outside && in_pattern.contains(c)))
            .collect();
        if pool.is_empty() && prefer_outside {
            pool = (0..total).filter(|c| !chosen.contains(c)).collect();
        }
        let Some(&cell) = pool.choose(rng) else {
            break;
        };
        guess.push(cell);
        chosen.insert(cell);
    }

    guess.shuffle(rng);
    guess
}

/// Result of one simulated recall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallAttempt {
    pub guess: Pattern,
    pub effective_accuracy: f64,
}

impl RecallAttempt {
    /// The caller's round test: same cells, order irrelevant
    pub fn matches(&self, pattern: &[Cell]) -> bool {
        same_cells(&self.guess, pattern)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecallSimulator {
    params: RecallParams,
}

impl RecallSimulator {
    pub fn new(params: RecallParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RecallParams {
        &self.params
    }

    /// Simulate the opponent memorising `pattern`.
    ///
    /// Appends the pattern to the state's history tagged with a fresh round
    /// index; the repetition scan skips that index, so an identical earlier
    /// pattern still counts as a repeat.
    pub fn attempt<R: Rng + ?Sized>(
        &self,
        state: &mut OpponentState,
        pattern: &[Cell],
        grid_size: u32,
        level: u32,
        human_response_time_ms: Option<u64>,
        rng: &mut R,
    ) -> RecallAttempt {
        let grid_size = clamp_grid_size(grid_size);
        let pattern = unique_cells(pattern, grid_cells(grid_size));
        if pattern.is_empty() {
            return RecallAttempt {
                guess: Vec::new(),
                effective_accuracy: state.base_accuracy,
            };
        }

        let round = state.pattern_history.len() as u64;
        state.pattern_history.push(PatternRecord {
            round,
            cells: pattern.clone(),
        });

        let ctx = self.context(state, &pattern, round, grid_size, level, human_response_time_ms, rng);
        let accuracy = effective_accuracy(&ctx, &self.params);
        let guess = reproduce(
            &pattern,
            grid_size,
            accuracy,
            self.params.outside_error_preference,
            rng,
        );

        debug!(
            round,
            grid_size,
            level,
            length = pattern.len(),
            similar = ctx.similar_patterns,
            effective_accuracy = accuracy,
            "recall simulated"
        );

        RecallAttempt {
            guess,
            effective_accuracy: accuracy,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn context<R: Rng + ?Sized>(
        &self,
        state: &OpponentState,
        pattern: &[Cell],
        round: u64,
        grid_size: u32,
        level: u32,
        human_response_time_ms: Option<u64>,
        rng: &mut R,
    ) -> RecallContext {
        let similar_patterns = state
            .pattern_history
            .iter()
            .filter(|r| r.round != round)
            .filter(|r| is_similar(&r.cells, pattern, self.params.similarity_share))
            .count();

        let tempo_ratio = match (human_response_time_ms, state.average_response_time_ms()) {
            (Some(human), Some(avg)) if human > 0 => Some(avg / human as f64),
            _ => None,
        };

        RecallContext {
            base_accuracy: state.base_accuracy,
            learning_rate: state.learning_rate,
            level,
            similar_patterns,
            traits: state.traits(),
            factors: state.adaptive_factors.clone(),
            grid_rate: state.performance_by_grid_size.get(&grid_size).map(|s| s.rate),
            length_rate: state
                .performance_by_pattern_length
                .get(&pattern.len())
                .map(|s| s.rate),
            tempo_ratio,
            jitter: rng.gen_range(-1.0..1.0),
        }
    }
}
