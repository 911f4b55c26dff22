//! Integration tests for the opponent engine and duel orchestration.
//!
//! Covers the documented game scenarios end to end through the public API.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use recall_rival::pattern;
use recall_rival::{
    AdaptiveFactor, ChallengeOptions, DifficultyTier, Duel, EngineConfig, EngineError,
    GenerationStrategy, OpponentEngine, OpponentState, Personality, PlayerStats, RoundMetadata,
    RoundWinner, MAX_BASE_ACCURACY,
};

const SEED: u64 = 20_240_611;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

fn player_stats() -> PlayerStats {
    PlayerStats {
        average_response_time_ms: 2000.0,
        level: 3,
        consecutive_correct: 1,
    }
}

// ============================================================================
// Pattern generation
// ============================================================================

#[test]
fn random_pattern_is_clamped_to_grid() {
    let mut rng = rng();
    let p = pattern::generate(3, 20, GenerationStrategy::Random, &mut rng);
    assert_eq!(p.len(), 9);
    let mut sorted = p.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..9).collect::<Vec<_>>());
}

#[test]
fn every_strategy_returns_distinct_cells() {
    let mut rng = rng();
    for strategy in [
        GenerationStrategy::Random,
        GenerationStrategy::Sequential,
        GenerationStrategy::Shape,
    ] {
        for grid in 1..=6u32 {
            let p = pattern::generate(grid, 5, strategy, &mut rng);
            assert_eq!(p.len(), 5.min((grid * grid) as usize));
            let mut dedup = p.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(dedup.len(), p.len());
        }
    }
}

// ============================================================================
// Outcome recording
// ============================================================================

#[test]
fn failure_records_missed_and_spurious_cells() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::Medium, Personality::Balanced);

    engine.record_outcome(
        &mut state,
        false,
        &[0, 3, 6],
        &[0, 3, 8],
        &RoundMetadata::new(3, 0, 1),
    );

    assert_eq!(state.mistake_frequency().get(&6), Some(&1));
    assert_eq!(state.mistake_frequency().get(&8), Some(&1));
    assert_eq!(state.mistake_frequency().get(&0), None);
    assert_eq!(state.consecutive_correct(), 0);
    assert_eq!(state.total_attempts(), 1);
    assert_eq!(state.correct_attempts(), 0);
}

#[test]
fn self_adjusting_accuracy_climbs_with_streak_until_ceiling() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::SelfAdjusting, Personality::Balanced);
    let meta = RoundMetadata::new(3, 0, 1);

    let mut previous = state.base_accuracy();
    for _ in 0..3 {
        engine.record_outcome(&mut state, true, &[0, 4, 8], &[0, 4, 8], &meta);
        assert!(state.base_accuracy() > previous);
        previous = state.base_accuracy();
    }
    assert!((state.base_accuracy() - 0.66).abs() < 1e-9);

    for _ in 0..30 {
        engine.record_outcome(&mut state, true, &[0, 4, 8], &[0, 4, 8], &meta);
        let now = state.base_accuracy();
        assert!(now > previous || now == MAX_BASE_ACCURACY);
        previous = now;
    }
    assert_eq!(state.base_accuracy(), MAX_BASE_ACCURACY);
}

#[test]
fn fixed_tier_accuracy_ignores_outcomes() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::Low, Personality::FastAdapting);
    for success in [true, false, true, true, false] {
        engine.record_outcome(&mut state, success, &[1, 2], &[1], &RoundMetadata::default());
    }
    assert_eq!(state.base_accuracy(), 0.4);
    assert_eq!(state.total_attempts(), 5);
    assert_eq!(state.correct_attempts(), 3);
}

// ============================================================================
// Challenge composition
// ============================================================================

#[test]
fn challenge_contains_repeatedly_mistaken_cell() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::Medium, Personality::Balanced);
    for _ in 0..2 {
        engine.record_outcome(&mut state, false, &[0, 8], &[0], &RoundMetadata::new(3, 0, 1));
    }
    assert_eq!(state.mistake_frequency().get(&8), Some(&2));

    let mut rng = rng();
    let challenge =
        engine.compose_challenge(&state, 3, 3, &ChallengeOptions::default(), &mut rng);
    assert_eq!(challenge.len(), 3);
    assert!(challenge.contains(&8));
}

// ============================================================================
// Recalibration
// ============================================================================

#[test]
fn recalibrate_raises_self_adjusting_accuracy() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::SelfAdjusting, Personality::Balanced);
    let before = state.base_accuracy();

    let report = engine.recalibrate(&mut state, 0.9, &player_stats());
    assert!(report.is_some());
    assert!(state.base_accuracy() > before);
}

#[test]
fn recalibrate_leaves_fixed_tiers_untouched() {
    let engine = OpponentEngine::default();
    for tier in [DifficultyTier::Low, DifficultyTier::Medium, DifficultyTier::High] {
        let mut state = OpponentState::new(tier, Personality::RiskTaking);
        engine.record_outcome(&mut state, false, &[0, 1], &[2], &RoundMetadata::default());
        let before = state.clone();
        assert!(engine.recalibrate(&mut state, 0.9, &player_stats()).is_none());
        assert_eq!(state, before);
    }
}

// ============================================================================
// Recall simulation
// ============================================================================

#[test]
fn recall_guess_has_pattern_length() {
    let engine = OpponentEngine::default();
    let mut rng = rng();
    for personality in Personality::ALL {
        let mut state = OpponentState::new(DifficultyTier::High, personality);
        for level in 1..=12 {
            let shown = pattern::generate(5, 7, GenerationStrategy::Shape, &mut rng);
            let attempt = engine.attempt_recall(&mut state, &shown, 5, level, Some(1800), &mut rng);
            assert_eq!(attempt.guess.len(), shown.len());
            assert!(attempt.guess.iter().all(|&c| c < 25));
            assert!((0.1..=0.95).contains(&attempt.effective_accuracy));
        }
    }
}

#[test]
fn recall_tempo_rewards_fast_human_round() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::Medium, Personality::Balanced);
    engine.record_outcome(&mut state, true, &[0, 8], &[0, 8], &RoundMetadata::new(3, 8000, 1));
    engine.record_outcome(&mut state, true, &[0, 8], &[0, 8], &RoundMetadata::new(3, 2000, 1));
    let reaction = state.factor(AdaptiveFactor::ReactionSpeed);
    assert!(reaction > 1.0);

    let mut timed_state = state.clone();
    let timed = engine.attempt_recall(&mut timed_state, &[0, 8], 3, 1, Some(2000), &mut rng());
    let mut untimed_state = state.clone();
    let untimed = engine.attempt_recall(&mut untimed_state, &[0, 8], 3, 1, None, &mut rng());

    let bonus = EngineConfig::default().recall.tempo_bonus * (reaction - 1.0);
    assert!((timed.effective_accuracy - untimed.effective_accuracy - bonus).abs() < 1e-9);

    // slower than the 5000ms window mean: no tempo step
    let mut slow_state = state.clone();
    let slow = engine.attempt_recall(&mut slow_state, &[0, 8], 3, 1, Some(9000), &mut rng());
    assert!((slow.effective_accuracy - untimed.effective_accuracy).abs() < 1e-12);
}

#[test]
fn recall_empty_pattern() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::Medium, Personality::Balanced);
    let attempt = engine.attempt_recall(&mut state, &[], 3, 1, None, &mut rng());
    assert!(attempt.guess.is_empty());
}

#[test]
fn insights_report_top_mistakes() {
    let engine = OpponentEngine::default();
    let mut state = OpponentState::new(DifficultyTier::SelfAdjusting, Personality::Steady);
    engine.record_outcome(&mut state, false, &[0, 3, 6], &[0, 3, 8], &RoundMetadata::new(3, 1200, 1));
    engine.record_outcome(&mut state, false, &[6, 7], &[7], &RoundMetadata::new(3, 1400, 2));

    let insights = state.insights(2);
    assert_eq!(insights.top_mistakes[0], (6, 2));
    assert_eq!(insights.total_attempts, 2);
    assert_eq!(insights.average_response_time_ms, Some(1300.0));
    assert_eq!(insights, state.insights(2));
}

// ============================================================================
// Duel flow
// ============================================================================

#[test]
fn duel_plays_full_match() {
    let config = EngineConfig::default();
    let mut duel = Duel::new(&config, DifficultyTier::SelfAdjusting, Personality::PatternFocused);

    for round in 1..=9u64 {
        let setup = duel.start_round();
        assert_eq!(setup.round, round);
        let answer = if round % 2 == 0 { setup.pattern.clone() } else { Vec::new() };
        let outcome = duel.finish_round(&answer, 1500).unwrap();
        assert_eq!(outcome.human_success, round % 2 == 0);
        assert_eq!(outcome.opponent_guess.len(), setup.pattern.len());
        match outcome.winner {
            RoundWinner::Both | RoundWinner::Human => assert!(outcome.human_success),
            RoundWinner::Opponent | RoundWinner::Neither => assert!(!outcome.human_success),
        }
    }

    let summary = duel.summary();
    assert_eq!(summary.rounds, 9);
    assert_eq!(summary.human_correct, 4);
    assert_eq!(summary.level, 5);
    assert_eq!(duel.state().total_attempts(), 9);
    assert!(duel.state().validate().is_ok());
}

#[test]
fn duel_rejects_double_finish() {
    let mut duel = Duel::new(&EngineConfig::default(), DifficultyTier::Medium, Personality::Balanced);
    let setup = duel.start_round();
    duel.finish_round(&setup.pattern, 1000).unwrap();
    assert!(matches!(
        duel.finish_round(&setup.pattern, 1000),
        Err(EngineError::NoPendingRound)
    ));
}

#[test]
fn duel_state_survives_snapshot() {
    let mut duel = Duel::new(&EngineConfig::default(), DifficultyTier::SelfAdjusting, Personality::Balanced);
    for _ in 0..5 {
        let setup = duel.start_round();
        duel.finish_round(&setup.pattern[..1], 900).unwrap();
    }
    let json = duel.state().to_json().unwrap();
    let restored = OpponentState::from_json(&json).unwrap();
    assert_eq!(&restored, duel.state());
}
