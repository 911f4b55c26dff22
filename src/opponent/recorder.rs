//! Outcome Recorder
//!
//! Folds one finished round into the opponent state: attempt counters,
//! per-grid-size and per-length hit tables, cell-level success and mistake
//! frequencies, adaptive factors and, for the self-adjusting tier, the
//! baseline accuracy itself.

use std::collections::HashSet;

use tracing::debug;

use crate::config::RecorderParams;
use crate::opponent::state::OpponentState;
use crate::pattern::{is_clustered, is_sequential};
use crate::types::{clamp_grid_size, grid_cells, AdaptiveFactor, Cell, Pattern, RoundMetadata};

/// Cells the human left out and cells they added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDiff {
    pub missed: Pattern,
    pub spurious: Pattern,
}

impl SubmissionDiff {
    pub fn between(pattern: &[Cell], submission: &[Cell]) -> Self {
        let shown: HashSet<Cell> = pattern.iter().copied().collect();
        let given: HashSet<Cell> = submission.iter().copied().collect();
        let mut spurious_seen = HashSet::new();

        Self {
            missed: pattern.iter().copied().filter(|c| !given.contains(c)).collect(),
            spurious: submission
                .iter()
                .copied()
                .filter(|c| !shown.contains(c) && spurious_seen.insert(*c))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutcomeRecorder {
    params: RecorderParams,
}

impl OutcomeRecorder {
    pub fn new(params: RecorderParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RecorderParams {
        &self.params
    }

    pub fn record(
        &self,
        state: &mut OpponentState,
        success: bool,
        pattern: &[Cell],
        submission: &[Cell],
        meta: &RoundMetadata,
    ) {
        let previous_average = state.average_response_time_ms();
        state.total_attempts = state.total_attempts.saturating_add(1);

        state
            .performance_by_grid_size
            .entry(clamp_grid_size(meta.grid_size))
            .or_default()
            .record(success);
        state
            .performance_by_pattern_length
            .entry(pattern.len())
            .or_default()
            .record(success);

        if success {
            self.record_success(state, pattern, meta, previous_average);
        } else {
            self.record_failure(state, pattern, submission, meta);
        }

        if meta.response_time_ms > 0 {
            state.response_times.push_back(meta.response_time_ms);
            while state.response_times.len() > self.params.response_time_window.max(1) {
                state.response_times.pop_front();
            }
        }

        let credit = if success { 1.0 } else { 0.5 };
        state.learning_progress += state.learning_rate.max(0.0) * credit;
    }

    fn record_success(
        &self,
        state: &mut OpponentState,
        pattern: &[Cell],
        meta: &RoundMetadata,
        previous_average: Option<f64>,
    ) {
        state.correct_attempts = state.correct_attempts.saturating_add(1);
        state.consecutive_correct = state.consecutive_correct.saturating_add(1);

        let total = grid_cells(meta.grid_size);
        for &cell in pattern.iter().filter(|&&c| on_grid(c, total)) {
            *state.success_frequency.entry(cell).or_insert(0) += 1;
        }

        let speed = 1.0 + state.traits().adaptation_speed;
        if state.tier.is_self_adjusting() {
            let step = self.params.success_step * state.consecutive_correct as f64 * speed;
            state.base_accuracy = (state.base_accuracy + step)
                .clamp(self.params.min_accuracy, self.params.max_accuracy);
        }

        let bump = self.params.factor_bump;
        let factors = &mut state.adaptive_factors;
        factors.nudge(AdaptiveFactor::PatternRecognition, bump);
        if is_sequential(pattern, meta.grid_size) {
            factors.nudge(AdaptiveFactor::SequenceMemory, bump);
        }
        if is_clustered(pattern, self.params.cluster_threshold) {
            factors.nudge(AdaptiveFactor::SpatialMemory, bump);
        }
        if let Some(avg) = previous_average {
            if meta.response_time_ms > 0 && (meta.response_time_ms as f64) < avg {
                factors.nudge(AdaptiveFactor::ReactionSpeed, bump);
            }
        }

        debug!(
            streak = state.consecutive_correct,
            base_accuracy = state.base_accuracy,
            "round success recorded"
        );
    }

    fn record_failure(
        &self,
        state: &mut OpponentState,
        pattern: &[Cell],
        submission: &[Cell],
        meta: &RoundMetadata,
    ) {
        state.consecutive_correct = 0;

        let total = grid_cells(meta.grid_size);
        let diff = SubmissionDiff::between(pattern, submission);
        for &cell in diff.missed.iter().chain(diff.spurious.iter()) {
            if on_grid(cell, total) {
                *state.mistake_frequency.entry(cell).or_insert(0) += 1;
            }
        }

        if state.tier.is_self_adjusting() {
            let speed = 1.0 + state.traits().adaptation_speed;
            state.base_accuracy = (state.base_accuracy - self.params.failure_step * speed)
                .clamp(self.params.min_accuracy, self.params.max_accuracy);
        }

        state
            .adaptive_factors
            .nudge(AdaptiveFactor::ErrorRecovery, self.params.factor_bump);
        state
            .adaptive_factors
            .decay_except(AdaptiveFactor::ErrorRecovery, self.params.factor_decay);

        debug!(
            missed = diff.missed.len(),
            spurious = diff.spurious.len(),
            base_accuracy = state.base_accuracy,
            "round failure recorded"
        );
    }
}

/// Cell guard shared by both frequency tables; a zero-cell grid filters nothing
fn on_grid(cell: Cell, total: u32) -> bool {
    total == 0 || cell < total
}
