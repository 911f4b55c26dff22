//! Common Types and Constants
//!
//! Shared data structures used across all engine modules.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lower bound of every adaptive factor
pub const MIN_FACTOR: f64 = 0.5;

/// Upper bound of every adaptive factor
pub const MAX_FACTOR: f64 = 2.0;

/// Starting value of every adaptive factor
pub const NEUTRAL_FACTOR: f64 = 1.0;

/// Floor of the per-round effective accuracy
pub const MIN_EFFECTIVE_ACCURACY: f64 = 0.1;

/// Ceiling of the per-round effective accuracy
pub const MAX_EFFECTIVE_ACCURACY: f64 = 0.95;

/// Floor of the self-adjusting baseline accuracy
pub const MIN_BASE_ACCURACY: f64 = 0.3;

/// Ceiling of the self-adjusting baseline accuracy
pub const MAX_BASE_ACCURACY: f64 = 0.95;

/// Learning rate clamp used by recalibration
pub const MIN_LEARNING_RATE: f64 = 0.01;
pub const MAX_LEARNING_RATE: f64 = 0.5;

/// Largest share of the grid a game pattern may cover
pub const MAX_PATTERN_SHARE: f64 = 0.75;

/// Grid sizes above this are treated as this size
pub const MAX_GRID_SIZE: u32 = 256;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Pattern Types ====================

/// Index of a grid cell, row-major: `row * grid_size + col`
pub type Cell = u32;

/// Ordered sequence of distinct cells
pub type Pattern = Vec<Cell>;

/// Grid size as the engine sees it, capped at [`MAX_GRID_SIZE`]
pub fn clamp_grid_size(grid_size: u32) -> u32 {
    grid_size.min(MAX_GRID_SIZE)
}

/// Number of cells on a `grid_size`×`grid_size` grid, after [`clamp_grid_size`]
pub fn grid_cells(grid_size: u32) -> u32 {
    let g = clamp_grid_size(grid_size);
    g * g
}

/// Longest pattern the game shows on a grid: `share` of its cells, at least 1 on non-empty grids
pub fn max_pattern_length(grid_size: u32, share: f64) -> usize {
    let total = grid_cells(grid_size) as usize;
    if total == 0 {
        return 0;
    }
    let share = if share.is_finite() { share.clamp(0.0, 1.0) } else { MAX_PATTERN_SHARE };
    ((total as f64 * share).floor() as usize).max(1)
}

/// Strategy used by the plain pattern generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    #[default]
    Random,
    Sequential,
    Shape,
}

impl GenerationStrategy {
    pub const ALL: [GenerationStrategy; 3] = [
        GenerationStrategy::Random,
        GenerationStrategy::Sequential,
        GenerationStrategy::Shape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sequential => "sequential",
            Self::Shape => "shape",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" => Some(Self::Random),
            "sequential" => Some(Self::Sequential),
            "shape" => Some(Self::Shape),
            _ => None,
        }
    }
}

/// Geometric shapes available to [`GenerationStrategy::Shape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Line,
    Diagonal,
    Square,
    Cross,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Line, Shape::Diagonal, Shape::Square, Shape::Cross];
}

// ==================== Opponent Configuration ====================

/// Difficulty tier of an opponent, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Low,
    #[default]
    Medium,
    High,
    SelfAdjusting,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Low,
        DifficultyTier::Medium,
        DifficultyTier::High,
        DifficultyTier::SelfAdjusting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::SelfAdjusting => "self_adjusting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "low" | "easy" => Some(Self::Low),
            "medium" | "mid" => Some(Self::Medium),
            "high" | "hard" => Some(Self::High),
            "self_adjusting" | "adaptive" => Some(Self::SelfAdjusting),
            _ => None,
        }
    }

    /// Baseline accuracy a fresh opponent starts with
    pub fn initial_accuracy(&self) -> f64 {
        match self {
            Self::Low => 0.4,
            Self::Medium => 0.6,
            Self::High => 0.8,
            Self::SelfAdjusting => 0.6,
        }
    }

    /// Learning rate a fresh opponent starts with
    pub fn initial_learning_rate(&self) -> f64 {
        match self {
            Self::Low => 0.05,
            Self::Medium => 0.1,
            Self::High => 0.15,
            Self::SelfAdjusting => 0.1,
        }
    }

    pub fn is_self_adjusting(&self) -> bool {
        matches!(self, Self::SelfAdjusting)
    }
}

/// Behavioural traits attached to a personality profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    /// Additive accuracy bonus, scaled by the pattern-recognition factor
    pub pattern_recognition: f64,
    /// Fraction by which effective accuracy is pulled back toward the baseline
    pub consistency: f64,
    /// Multiplier offset on every self-adjustment (`1 + adaptation_speed`)
    pub adaptation_speed: f64,
    /// Amplitude of the zero-mean accuracy jitter
    pub risk_taking: f64,
}

/// Personality profile, fixed for the opponent's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    #[default]
    Balanced,
    PatternFocused,
    FastAdapting,
    Steady,
    RiskTaking,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Balanced,
        Personality::PatternFocused,
        Personality::FastAdapting,
        Personality::Steady,
        Personality::RiskTaking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::PatternFocused => "pattern_focused",
            Self::FastAdapting => "fast_adapting",
            Self::Steady => "steady",
            Self::RiskTaking => "risk_taking",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "balanced" => Some(Self::Balanced),
            "pattern_focused" => Some(Self::PatternFocused),
            "fast_adapting" => Some(Self::FastAdapting),
            "steady" => Some(Self::Steady),
            "risk_taking" => Some(Self::RiskTaking),
            _ => None,
        }
    }

    pub fn traits(&self) -> PersonalityTraits {
        match self {
            Self::Balanced => PersonalityTraits {
                pattern_recognition: 0.0,
                consistency: 0.0,
                adaptation_speed: 0.0,
                risk_taking: 0.0,
            },
            Self::PatternFocused => PersonalityTraits {
                pattern_recognition: 0.1,
                consistency: 0.0,
                adaptation_speed: 0.0,
                risk_taking: 0.0,
            },
            Self::FastAdapting => PersonalityTraits {
                pattern_recognition: 0.0,
                consistency: 0.0,
                adaptation_speed: 0.5,
                risk_taking: 0.0,
            },
            Self::Steady => PersonalityTraits {
                pattern_recognition: 0.0,
                consistency: 0.5,
                adaptation_speed: -0.2,
                risk_taking: 0.0,
            },
            Self::RiskTaking => PersonalityTraits {
                pattern_recognition: 0.0,
                consistency: 0.0,
                adaptation_speed: 0.2,
                risk_taking: 0.15,
            },
        }
    }
}

// ==================== Adaptive Factors ====================

/// One cognitive dimension the opponent can specialise in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveFactor {
    PatternRecognition,
    SpatialMemory,
    SequenceMemory,
    ReactionSpeed,
    ErrorRecovery,
}

impl AdaptiveFactor {
    pub const ALL: [AdaptiveFactor; 5] = [
        AdaptiveFactor::PatternRecognition,
        AdaptiveFactor::SpatialMemory,
        AdaptiveFactor::SequenceMemory,
        AdaptiveFactor::ReactionSpeed,
        AdaptiveFactor::ErrorRecovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatternRecognition => "pattern_recognition",
            Self::SpatialMemory => "spatial_memory",
            Self::SequenceMemory => "sequence_memory",
            Self::ReactionSpeed => "reaction_speed",
            Self::ErrorRecovery => "error_recovery",
        }
    }
}

/// Five independent multipliers, each kept in `[MIN_FACTOR, MAX_FACTOR]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveFactors {
    pattern_recognition: f64,
    spatial_memory: f64,
    sequence_memory: f64,
    reaction_speed: f64,
    error_recovery: f64,
}

impl Default for AdaptiveFactors {
    fn default() -> Self {
        Self {
            pattern_recognition: NEUTRAL_FACTOR,
            spatial_memory: NEUTRAL_FACTOR,
            sequence_memory: NEUTRAL_FACTOR,
            reaction_speed: NEUTRAL_FACTOR,
            error_recovery: NEUTRAL_FACTOR,
        }
    }
}

impl AdaptiveFactors {
    pub fn get(&self, factor: AdaptiveFactor) -> f64 {
        match factor {
            AdaptiveFactor::PatternRecognition => self.pattern_recognition,
            AdaptiveFactor::SpatialMemory => self.spatial_memory,
            AdaptiveFactor::SequenceMemory => self.sequence_memory,
            AdaptiveFactor::ReactionSpeed => self.reaction_speed,
            AdaptiveFactor::ErrorRecovery => self.error_recovery,
        }
    }

    fn slot(&mut self, factor: AdaptiveFactor) -> &mut f64 {
        match factor {
            AdaptiveFactor::PatternRecognition => &mut self.pattern_recognition,
            AdaptiveFactor::SpatialMemory => &mut self.spatial_memory,
            AdaptiveFactor::SequenceMemory => &mut self.sequence_memory,
            AdaptiveFactor::ReactionSpeed => &mut self.reaction_speed,
            AdaptiveFactor::ErrorRecovery => &mut self.error_recovery,
        }
    }

    /// Set a factor, clamped to its range
    pub fn set(&mut self, factor: AdaptiveFactor, value: f64) {
        *self.slot(factor) = crate::sanitize::clamp_factor(value);
    }

    /// Add `delta` to a factor and clamp
    pub fn nudge(&mut self, factor: AdaptiveFactor, delta: f64) {
        let next = self.get(factor) + delta;
        self.set(factor, next);
    }

    /// Multiply every factor except `keep` by `rate` and clamp
    pub fn decay_except(&mut self, keep: AdaptiveFactor, rate: f64) {
        for factor in AdaptiveFactor::ALL {
            if factor != keep {
                let next = self.get(factor) * rate;
                self.set(factor, next);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdaptiveFactor, f64)> + '_ {
        AdaptiveFactor::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

// ==================== Statistics ====================

/// Hit/attempt tally for one grid size or one pattern length
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub hits: u32,
    pub attempts: u32,
    pub rate: f64,
}

impl DimensionStats {
    pub fn record(&mut self, hit: bool) {
        self.attempts = self.attempts.saturating_add(1);
        if hit {
            self.hits = self.hits.saturating_add(1);
        }
        self.rate = self.hits as f64 / self.attempts as f64;
    }
}

// ==================== Call Parameters ====================

/// End-of-round metadata handed to the outcome recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMetadata {
    pub grid_size: u32,
    pub response_time_ms: u64,
    pub level: u32,
}

impl RoundMetadata {
    pub fn new(grid_size: u32, response_time_ms: u64, level: u32) -> Self {
        Self {
            grid_size,
            response_time_ms,
            level,
        }
    }
}

impl Default for RoundMetadata {
    fn default() -> Self {
        Self {
            grid_size: 3,
            response_time_ms: 0,
            level: 1,
        }
    }
}

/// Aggregate human performance used for recalibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub average_response_time_ms: f64,
    pub level: u32,
    pub consecutive_correct: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            average_response_time_ms: 0.0,
            level: 1,
            consecutive_correct: 0,
        }
    }
}

/// How the challenge composer builds its pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStrategy {
    /// Seed with the most-mistaken cells, then attack the weaker memory skill
    #[default]
    Targeted,
    Sequential,
    Clustered,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChallengeOptions {
    pub strategy: ChallengeStrategy,
    /// Scrambling intensity in `[0, 1]`; values above 0.5 swap cells
    pub difficulty: Option<f64>,
}

impl ChallengeOptions {
    pub fn targeted(difficulty: f64) -> Self {
        Self {
            strategy: ChallengeStrategy::Targeted,
            difficulty: Some(difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_roundtrip() {
        for tier in DifficultyTier::ALL {
            assert_eq!(DifficultyTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(DifficultyTier::parse("self-adjusting"), Some(DifficultyTier::SelfAdjusting));
        assert_eq!(DifficultyTier::parse("legendary"), None);
    }

    #[test]
    fn test_initial_parameters_in_range() {
        for tier in DifficultyTier::ALL {
            let acc = tier.initial_accuracy();
            assert!((MIN_BASE_ACCURACY..=MAX_BASE_ACCURACY).contains(&acc));
            let lr = tier.initial_learning_rate();
            assert!((MIN_LEARNING_RATE..=MAX_LEARNING_RATE).contains(&lr));
        }
    }

    #[test]
    fn test_adaptation_speed_keeps_positive_multiplier() {
        for personality in Personality::ALL {
            assert!(1.0 + personality.traits().adaptation_speed > 0.0);
        }
    }

    #[test]
    fn test_factor_nudge_clamps() {
        let mut factors = AdaptiveFactors::default();
        factors.nudge(AdaptiveFactor::SpatialMemory, 5.0);
        assert_eq!(factors.get(AdaptiveFactor::SpatialMemory), MAX_FACTOR);
        factors.nudge(AdaptiveFactor::SpatialMemory, -5.0);
        assert_eq!(factors.get(AdaptiveFactor::SpatialMemory), MIN_FACTOR);
    }

    #[test]
    fn test_decay_except_spares_kept_factor() {
        let mut factors = AdaptiveFactors::default();
        factors.decay_except(AdaptiveFactor::ErrorRecovery, 0.5);
        assert_eq!(factors.get(AdaptiveFactor::ErrorRecovery), NEUTRAL_FACTOR);
        assert_eq!(factors.get(AdaptiveFactor::ReactionSpeed), 0.5);
    }

    #[test]
    fn test_dimension_stats_rate() {
        let mut stats = DimensionStats::default();
        stats.record(true);
        stats.record(false);
        stats.record(true);
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.hits, 2);
        assert!((stats.rate - 2.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_max_pattern_length() {
        assert_eq!(max_pattern_length(0, MAX_PATTERN_SHARE), 0);
        assert_eq!(max_pattern_length(1, MAX_PATTERN_SHARE), 1);
        assert_eq!(max_pattern_length(3, MAX_PATTERN_SHARE), 6);
        assert_eq!(max_pattern_length(4, MAX_PATTERN_SHARE), 12);
        assert_eq!(max_pattern_length(4, 0.5), 8);
        assert_eq!(max_pattern_length(3, f64::NAN), 6);
    }

    #[test]
    fn test_grid_cells_caps_huge_grids() {
        assert_eq!(grid_cells(0), 0);
        assert_eq!(grid_cells(3), 9);
        assert_eq!(grid_cells(u32::MAX), MAX_GRID_SIZE * MAX_GRID_SIZE);
        assert_eq!(clamp_grid_size(70_000), MAX_GRID_SIZE);
    }

    #[test]
    fn test_strategy_parse_roundtrip() {
        for strategy in GenerationStrategy::ALL {
            assert_eq!(GenerationStrategy::parse(strategy.as_str()), Some(strategy));
        }
        assert_eq!(GenerationStrategy::parse("Shape"), Some(GenerationStrategy::Shape));
        assert_eq!(GenerationStrategy::parse("spiral"), None);
    }
}
