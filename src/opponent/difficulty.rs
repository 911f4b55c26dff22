//! Difficulty Adjuster
//!
//! Between rounds, a self-adjusting opponent recalibrates its baseline accuracy
//! and learning rate from four independent signals of player performance:
//!
//! - success rate crossing the high/low thresholds
//! - player speed relative to the historical response-time average
//! - player level beyond the level threshold
//! - correct-answer streak beyond the streak threshold
//!
//! The summed delta is scaled by `1 + adaptation_speed`. A trend scan over the
//! per-dimension tables then lets the opponent specialise in the player's weak
//! area when the weaker value is the larger grid or the longer pattern.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AdjusterParams;
use crate::opponent::state::OpponentState;
use crate::types::{AdaptiveFactor, DimensionStats, PlayerStats};

/// Additive change proposed by one signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalDelta {
    pub accuracy: f64,
    pub learning_rate: f64,
}

impl std::ops::Add for SignalDelta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            accuracy: self.accuracy + rhs.accuracy,
            learning_rate: self.learning_rate + rhs.learning_rate,
        }
    }
}

/// What one recalibration changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recalibration {
    pub accuracy_delta: f64,
    pub learning_rate_delta: f64,
    pub specialized: Vec<AdaptiveFactor>,
}

#[derive(Debug, Clone, Default)]
pub struct DifficultyAdjuster {
    params: AdjusterParams,
}

impl DifficultyAdjuster {
    pub fn new(params: AdjusterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AdjusterParams {
        &self.params
    }

    /// Recalibrate a self-adjusting opponent; fixed tiers are left untouched and yield `None`
    pub fn recalibrate(
        &self,
        state: &mut OpponentState,
        player_success_rate: f64,
        stats: &PlayerStats,
    ) -> Option<Recalibration> {
        if !state.tier.is_self_adjusting() {
            return None;
        }
        let p = &self.params;

        let total = self.success_signal(player_success_rate)
            + self.speed_signal(state.average_response_time_ms(), stats.average_response_time_ms)
            + self.level_signal(stats.level)
            + self.streak_signal(stats.consecutive_correct);
        let scale = 1.0 + state.traits().adaptation_speed;

        let before_accuracy = state.base_accuracy;
        let before_learning = state.learning_rate;
        state.base_accuracy =
            (state.base_accuracy + total.accuracy * scale).clamp(p.min_accuracy, p.max_accuracy);
        state.learning_rate = (state.learning_rate + total.learning_rate * scale)
            .clamp(p.min_learning_rate, p.max_learning_rate);

        let mut specialized = Vec::new();
        if self.weak_on_larger(&state.performance_by_grid_size) {
            specialized.push(AdaptiveFactor::SpatialMemory);
        }
        if self.weak_on_larger(&state.performance_by_pattern_length) {
            specialized.push(AdaptiveFactor::SequenceMemory);
        }
        for &factor in &specialized {
            state.adaptive_factors.nudge(factor, p.specialization_bump);
            info!(
                factor = factor.as_str(),
                value = state.adaptive_factors.get(factor),
                "opponent specialising in player weakness"
            );
        }

        let report = Recalibration {
            accuracy_delta: state.base_accuracy - before_accuracy,
            learning_rate_delta: state.learning_rate - before_learning,
            specialized,
        };
        debug!(
            player_success_rate,
            accuracy_delta = report.accuracy_delta,
            learning_rate_delta = report.learning_rate_delta,
            base_accuracy = state.base_accuracy,
            "opponent recalibrated"
        );
        Some(report)
    }

    pub fn success_signal(&self, success_rate: f64) -> SignalDelta {
        let p = &self.params;
        if success_rate > p.high_success_rate {
            SignalDelta {
                accuracy: p.success_accuracy_delta,
                learning_rate: p.success_learning_delta,
            }
        } else if success_rate < p.low_success_rate {
            SignalDelta {
                accuracy: -p.success_accuracy_delta,
                learning_rate: -p.success_learning_delta,
            }
        } else {
            SignalDelta::default()
        }
    }

    /// Historical average over the player's current average; above `fast_ratio` the player got faster
    pub fn speed_signal(&self, historical_ms: Option<f64>, player_ms: f64) -> SignalDelta {
        let p = &self.params;
        let Some(historical) = historical_ms else {
            return SignalDelta::default();
        };
        if player_ms <= 0.0 || historical <= 0.0 {
            return SignalDelta::default();
        }
        let ratio = historical / player_ms;
        let accuracy = if ratio > p.fast_ratio {
            p.fast_accuracy_delta
        } else if ratio < p.slow_ratio {
            -p.slow_accuracy_delta
        } else {
            0.0
        };
        SignalDelta {
            accuracy,
            learning_rate: 0.0,
        }
    }

    pub fn level_signal(&self, level: u32) -> SignalDelta {
        let p = &self.params;
        if level <= p.level_threshold {
            return SignalDelta::default();
        }
        let above = (level - p.level_threshold) as f64;
        SignalDelta {
            accuracy: (above * p.level_accuracy_step).min(p.max_level_delta),
            learning_rate: p.level_learning_delta,
        }
    }

    pub fn streak_signal(&self, streak: u32) -> SignalDelta {
        let p = &self.params;
        if streak <= p.streak_threshold {
            return SignalDelta::default();
        }
        let above = (streak - p.streak_threshold) as f64;
        SignalDelta {
            accuracy: (above * p.streak_accuracy_step).min(p.max_streak_delta),
            learning_rate: 0.0,
        }
    }

    /// Best and worst observed rates differ by more than the spread and the worst
    /// belongs to the larger dimension value
    pub fn weak_on_larger<K: Ord + Copy>(&self, table: &BTreeMap<K, DimensionStats>) -> bool {
        let observed = table
            .iter()
            .filter(|(_, s)| s.attempts >= self.params.trend_min_attempts);
        let mut best: Option<(K, f64)> = None;
        let mut worst: Option<(K, f64)> = None;
        for (&key, stats) in observed {
            if best.map_or(true, |(_, rate)| stats.rate > rate) {
                best = Some((key, stats.rate));
            }
            if worst.map_or(true, |(_, rate)| stats.rate <= rate) {
                worst = Some((key, stats.rate));
            }
        }
        match (best, worst) {
            (Some((best_key, best_rate)), Some((worst_key, worst_rate))) => {
                best_rate - worst_rate > self.params.trend_spread && worst_key > best_key
            }
            _ => false,
        }
    }
}
