//! Engine Configuration
//!
//! Tunable parameters for each opponent component and the duel, with defaults
//! and `RECALL_RIVAL_*` environment overrides.

use serde::{Deserialize, Serialize};

use crate::types::{
    DifficultyTier, GenerationStrategy, Personality, MAX_BASE_ACCURACY, MAX_EFFECTIVE_ACCURACY, MAX_LEARNING_RATE, MAX_PATTERN_SHARE,
    MIN_BASE_ACCURACY, MIN_EFFECTIVE_ACCURACY, MIN_LEARNING_RATE,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallParams {
    pub min_accuracy: f64,
    pub max_accuracy: f64,
    pub level_penalty_per_level: f64,
    pub max_level_penalty: f64,
    pub max_repetition_bonus: f64,
    /// Share of the current pattern two patterns must have in common to count as similar
    pub similarity_share: f64,
    pub transfer_threshold: f64,
    pub transfer_bonus: f64,
    pub tempo_bonus: f64,
    /// Probability that a padding cell is drawn from outside the true pattern
    pub outside_error_preference: f64,
}

impl Default for RecallParams {
    fn default() -> Self {
        Self {
            min_accuracy: MIN_EFFECTIVE_ACCURACY,
            max_accuracy: MAX_EFFECTIVE_ACCURACY,
            level_penalty_per_level: 0.02,
            max_level_penalty: 0.3,
            max_repetition_bonus: 0.2,
            similarity_share: 0.5,
            transfer_threshold: 0.7,
            transfer_bonus: 0.05,
            tempo_bonus: 0.03,
            outside_error_preference: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderParams {
    pub success_step: f64,
    pub failure_step: f64,
    pub min_accuracy: f64,
    pub max_accuracy: f64,
    pub factor_bump: f64,
    pub factor_decay: f64,
    pub response_time_window: usize,
    /// Mean pairwise index distance below which a pattern counts as clustered
    pub cluster_threshold: f64,
}

impl Default for RecorderParams {
    fn default() -> Self {
        Self {
            success_step: 0.01,
            failure_step: 0.02,
            min_accuracy: MIN_BASE_ACCURACY,
            max_accuracy: MAX_BASE_ACCURACY,
            factor_bump: 0.05,
            factor_decay: 0.98,
            response_time_window: 20,
            cluster_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjusterParams {
    pub high_success_rate: f64,
    pub low_success_rate: f64,
    pub success_accuracy_delta: f64,
    pub success_learning_delta: f64,
    pub fast_ratio: f64,
    pub slow_ratio: f64,
    pub fast_accuracy_delta: f64,
    pub slow_accuracy_delta: f64,
    pub level_threshold: u32,
    pub level_accuracy_step: f64,
    pub max_level_delta: f64,
    pub level_learning_delta: f64,
    pub streak_threshold: u32,
    pub streak_accuracy_step: f64,
    pub max_streak_delta: f64,
    pub trend_spread: f64,
    pub trend_min_attempts: u32,
    pub specialization_bump: f64,
    pub min_accuracy: f64,
    pub max_accuracy: f64,
    pub min_learning_rate: f64,
    pub max_learning_rate: f64,
}

impl Default for AdjusterParams {
    fn default() -> Self {
        Self {
            high_success_rate: 0.8,
            low_success_rate: 0.4,
            success_accuracy_delta: 0.05,
            success_learning_delta: 0.02,
            fast_ratio: 1.2,
            slow_ratio: 0.8,
            fast_accuracy_delta: 0.03,
            slow_accuracy_delta: 0.02,
            level_threshold: 5,
            level_accuracy_step: 0.01,
            max_level_delta: 0.1,
            level_learning_delta: 0.01,
            streak_threshold: 3,
            streak_accuracy_step: 0.01,
            max_streak_delta: 0.05,
            trend_spread: 0.3,
            trend_min_attempts: 2,
            specialization_bump: 0.05,
            min_accuracy: MIN_BASE_ACCURACY,
            max_accuracy: MAX_BASE_ACCURACY,
            min_learning_rate: MIN_LEARNING_RATE,
            max_learning_rate: MAX_LEARNING_RATE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeParams {
    pub scramble_pivot: f64,
    pub swaps_per_unit: f64,
    pub min_scramble_length: usize,
}

impl Default for ChallengeParams {
    fn default() -> Self {
        Self {
            scramble_pivot: 0.5,
            swaps_per_unit: 4.0,
            min_scramble_length: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelConfig {
    pub start_grid_size: u32,
    pub max_grid_size: u32,
    pub start_pattern_length: usize,
    pub levels_per_grid_step: u32,
    /// Every n-th round is a composed challenge once mistakes exist; 0 disables
    pub challenge_every: u64,
    pub challenge_difficulty: f64,
    pub max_pattern_share: f64,
    /// Generators plain rounds draw from; empty falls back to random
    pub strategies: Vec<GenerationStrategy>,
    pub seed: u64,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            start_grid_size: 3,
            max_grid_size: 6,
            start_pattern_length: 3,
            levels_per_grid_step: 3,
            challenge_every: 3,
            challenge_difficulty: 0.75,
            max_pattern_share: MAX_PATTERN_SHARE,
            strategies: GenerationStrategy::ALL.to_vec(),
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub recall: RecallParams,
    pub recorder: RecorderParams,
    pub adjuster: AdjusterParams,
    pub challenge: ChallengeParams,
    pub duel: DuelConfig,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_parse("RECALL_RIVAL_SEED") {
            config.duel.seed = val;
        }
        if let Some(val) = env_parse("RECALL_RIVAL_START_GRID") {
            config.duel.start_grid_size = val;
        }
        if let Some(val) = env_parse("RECALL_RIVAL_MAX_GRID") {
            config.duel.max_grid_size = val;
        }
        if let Some(val) = env_parse("RECALL_RIVAL_START_LENGTH") {
            config.duel.start_pattern_length = val;
        }
        if let Some(val) = env_parse("RECALL_RIVAL_CHALLENGE_EVERY") {
            config.duel.challenge_every = val;
        }
        if let Ok(val) = std::env::var("RECALL_RIVAL_STRATEGIES") {
            let strategies = parse_strategies(&val);
            if !strategies.is_empty() {
                config.duel.strategies = strategies;
            }
        }
        if let Some(val) = env_parse::<f64>("RECALL_RIVAL_CHALLENGE_DIFFICULTY") {
            config.duel.challenge_difficulty = val.clamp(0.0, 1.0);
        }
        if let Some(val) = env_parse::<f64>("RECALL_RIVAL_OUTSIDE_ERROR_PREFERENCE") {
            config.recall.outside_error_preference = val.clamp(0.0, 1.0);
        }
        if let Some(val) = env_parse::<f64>("RECALL_RIVAL_CLUSTER_THRESHOLD") {
            config.recorder.cluster_threshold = val.max(0.0);
        }

        config
    }
}

/// Settings of the simulation binary
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub log_level: String,
    pub rounds: usize,
    pub matches: usize,
    /// Opponent of the narrated duel
    pub tier: DifficultyTier,
    pub personality: Personality,
}

impl SimConfig {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            log_level,
            rounds: env_parse("RECALL_RIVAL_SIM_ROUNDS").unwrap_or(12),
            matches: env_parse("RECALL_RIVAL_SIM_MATCHES").unwrap_or(64),
            tier: std::env::var("RECALL_RIVAL_SIM_TIER")
                .ok()
                .and_then(|v| DifficultyTier::parse(v.trim()))
                .unwrap_or(DifficultyTier::SelfAdjusting),
            personality: std::env::var("RECALL_RIVAL_SIM_PERSONALITY")
                .ok()
                .and_then(|v| Personality::parse(v.trim()))
                .unwrap_or(Personality::Balanced),
        }
    }
}

/// Comma-separated strategy names; unknown names are skipped
pub fn parse_strategies(list: &str) -> Vec<GenerationStrategy> {
    let mut strategies = Vec::new();
    for strategy in list.split(',').filter_map(|name| GenerationStrategy::parse(name.trim())) {
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    strategies
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = EngineConfig::default();
        assert!(config.recall.min_accuracy < config.recall.max_accuracy);
        assert!(config.recorder.min_accuracy < config.recorder.max_accuracy);
        assert!(config.adjuster.low_success_rate < config.adjuster.high_success_rate);
        assert!(config.duel.start_grid_size <= config.duel.max_grid_size);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.duel.seed, config.duel.seed);
        assert_eq!(parsed.recorder.response_time_window, 20);
    }

    #[test]
    fn test_parse_strategies() {
        assert_eq!(
            parse_strategies("shape, Sequential,bogus,shape"),
            vec![GenerationStrategy::Shape, GenerationStrategy::Sequential]
        );
        assert!(parse_strategies("").is_empty());
        assert_eq!(
            EngineConfig::default().duel.strategies,
            GenerationStrategy::ALL.to_vec()
        );
    }
}
