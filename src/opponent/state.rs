//! Opponent State
//!
//! The single-owner record of one opponent: immutable configuration plus every
//! running statistic the engine components read and mutate. The snapshot is
//! serialized verbatim because adaptive factors and frequency tables cannot be
//! recomputed from the pattern history alone.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::sanitize::{has_duplicates, has_invalid_values};
use crate::types::{
    AdaptiveFactor, AdaptiveFactors, Cell, DifficultyTier, DimensionStats, Pattern, Personality,
    PersonalityTraits, MAX_FACTOR, MIN_FACTOR,
};

/// One previously shown pattern, tagged with the round that showed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub round: u64,
    pub cells: Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentState {
    pub(crate) tier: DifficultyTier,
    pub(crate) personality: Personality,
    pub(crate) base_accuracy: f64,
    pub(crate) learning_rate: f64,
    pub(crate) pattern_history: Vec<PatternRecord>,
    pub(crate) mistake_frequency: BTreeMap<Cell, u32>,
    pub(crate) success_frequency: BTreeMap<Cell, u32>,
    pub(crate) performance_by_grid_size: BTreeMap<u32, DimensionStats>,
    pub(crate) performance_by_pattern_length: BTreeMap<usize, DimensionStats>,
    pub(crate) adaptive_factors: AdaptiveFactors,
    pub(crate) consecutive_correct: u32,
    pub(crate) total_attempts: u64,
    pub(crate) correct_attempts: u64,
    pub(crate) learning_progress: f64,
    #[serde(default)]
    pub(crate) response_times: VecDeque<u64>,
}

impl OpponentState {
    pub fn new(tier: DifficultyTier, personality: Personality) -> Self {
        Self {
            tier,
            personality,
            base_accuracy: tier.initial_accuracy(),
            learning_rate: tier.initial_learning_rate(),
            pattern_history: Vec::new(),
            mistake_frequency: BTreeMap::new(),
            success_frequency: BTreeMap::new(),
            performance_by_grid_size: BTreeMap::new(),
            performance_by_pattern_length: BTreeMap::new(),
            adaptive_factors: AdaptiveFactors::default(),
            consecutive_correct: 0,
            total_attempts: 0,
            correct_attempts: 0,
            learning_progress: 0.0,
            response_times: VecDeque::new(),
        }
    }

    /// Discard all statistics, keeping tier and personality
    pub fn reset(&mut self) {
        *self = Self::new(self.tier, self.personality);
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn traits(&self) -> PersonalityTraits {
        self.personality.traits()
    }

    pub fn base_accuracy(&self) -> f64 {
        self.base_accuracy
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn pattern_history(&self) -> &[PatternRecord] {
        &self.pattern_history
    }

    pub fn mistake_frequency(&self) -> &BTreeMap<Cell, u32> {
        &self.mistake_frequency
    }

    pub fn success_frequency(&self) -> &BTreeMap<Cell, u32> {
        &self.success_frequency
    }

    pub fn performance_by_grid_size(&self) -> &BTreeMap<u32, DimensionStats> {
        &self.performance_by_grid_size
    }

    pub fn performance_by_pattern_length(&self) -> &BTreeMap<usize, DimensionStats> {
        &self.performance_by_pattern_length
    }

    pub fn adaptive_factors(&self) -> &AdaptiveFactors {
        &self.adaptive_factors
    }

    pub fn factor(&self, factor: AdaptiveFactor) -> f64 {
        self.adaptive_factors.get(factor)
    }

    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    pub fn correct_attempts(&self) -> u64 {
        self.correct_attempts
    }

    pub fn learning_progress(&self) -> f64 {
        self.learning_progress
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.correct_attempts as f64 / self.total_attempts as f64
        }
    }

    /// Mean of the recorded human response times, `None` before the first timed round
    pub fn average_response_time_ms(&self) -> Option<f64> {
        if self.response_times.is_empty() {
            return None;
        }
        let sum: u64 = self.response_times.iter().sum();
        Some(sum as f64 / self.response_times.len() as f64)
    }

    /// Cells ranked by descending count, ties by ascending cell index
    pub(crate) fn ranked(table: &BTreeMap<Cell, u32>, n: usize) -> Vec<(Cell, u32)> {
        let mut entries: Vec<(Cell, u32)> = table.iter().map(|(&c, &count)| (c, count)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    pub fn most_mistaken(&self, n: usize) -> Vec<(Cell, u32)> {
        Self::ranked(&self.mistake_frequency, n)
    }

    pub fn most_succeeded(&self, n: usize) -> Vec<(Cell, u32)> {
        Self::ranked(&self.success_frequency, n)
    }

    // ==================== Persistence ====================

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a snapshot, rejecting any field outside its documented range
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_range("baseAccuracy", self.base_accuracy, 0.0, 1.0)?;
        check_range("learningRate", self.learning_rate, 0.0, 1.0)?;
        for (factor, value) in self.adaptive_factors.iter() {
            check_range(factor.as_str(), value, MIN_FACTOR, MAX_FACTOR)?;
        }
        if has_invalid_values(&[self.learning_progress]) || self.learning_progress < 0.0 {
            return Err(EngineError::OutOfRange {
                field: "learningProgress",
                value: self.learning_progress,
                min: 0.0,
                max: f64::MAX,
            });
        }
        if self.correct_attempts > self.total_attempts {
            return Err(EngineError::InconsistentCounters {
                correct: self.correct_attempts,
                total: self.total_attempts,
            });
        }
        let tables = self
            .performance_by_grid_size
            .values()
            .chain(self.performance_by_pattern_length.values());
        for stats in tables {
            if stats.hits > stats.attempts {
                return Err(EngineError::InconsistentCounters {
                    correct: u64::from(stats.hits),
                    total: u64::from(stats.attempts),
                });
            }
            check_range("rate", stats.rate, 0.0, 1.0)?;
        }
        if let Some(record) = self.pattern_history.iter().find(|r| has_duplicates(&r.cells)) {
            return Err(EngineError::InvalidPattern(format!(
                "round {} repeats a cell",
                record.round
            )));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> EngineResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
