use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::opponent::state::OpponentState;
use crate::types::{AdaptiveFactor, Cell, DifficultyTier, DimensionStats, Personality};

/// Read-only statistics snapshot for the insights display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentInsights {
    pub difficulty_tier: DifficultyTier,
    pub personality: Personality,
    pub base_accuracy: f64,
    pub learning_rate: f64,
    pub total_attempts: u64,
    pub correct_attempts: u64,
    pub success_rate: f64,
    pub consecutive_correct: u32,
    pub learning_progress: f64,
    pub patterns_seen: usize,
    pub average_response_time_ms: Option<f64>,
    pub performance_by_grid_size: BTreeMap<u32, DimensionStats>,
    pub performance_by_pattern_length: BTreeMap<usize, DimensionStats>,
    pub adaptive_factors: BTreeMap<AdaptiveFactor, f64>,
    pub top_mistakes: Vec<(Cell, u32)>,
    pub top_successes: Vec<(Cell, u32)>,
}

impl OpponentState {
    pub fn insights(&self, top_n: usize) -> OpponentInsights {
        OpponentInsights {
            difficulty_tier: self.tier,
            personality: self.personality,
            base_accuracy: self.base_accuracy,
            learning_rate: self.learning_rate,
            total_attempts: self.total_attempts,
            correct_attempts: self.correct_attempts,
            success_rate: self.success_rate(),
            consecutive_correct: self.consecutive_correct,
            learning_progress: self.learning_progress,
            patterns_seen: self.pattern_history.len(),
            average_response_time_ms: self.average_response_time_ms(),
            performance_by_grid_size: self.performance_by_grid_size.clone(),
            performance_by_pattern_length: self.performance_by_pattern_length.clone(),
            adaptive_factors: self.adaptive_factors.iter().collect(),
            top_mistakes: self.most_mistaken(top_n),
            top_successes: self.most_succeeded(top_n),
        }
    }
}
