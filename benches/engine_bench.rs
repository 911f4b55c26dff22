//! Benchmark suite for recall-rival
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use recall_rival::pattern;
use recall_rival::{
    run_sweep, ChallengeOptions, DifficultyTier, EngineConfig, GenerationStrategy, OpponentEngine,
    OpponentState, Personality, RoundMetadata, SimulatedPlayer, SweepScenario,
};

fn warmed_state(engine: &OpponentEngine, rng: &mut ChaCha8Rng) -> OpponentState {
    let mut state = OpponentState::new(DifficultyTier::SelfAdjusting, Personality::Balanced);
    for round in 0..200u32 {
        let shown = pattern::generate(5, 8, GenerationStrategy::Random, rng);
        let success = round % 3 != 0;
        let submission = if success { shown.clone() } else { shown[..4].to_vec() };
        engine.record_outcome(&mut state, success, &shown, &submission, &RoundMetadata::new(5, 1800, 4));
        engine.attempt_recall(&mut state, &shown, 5, 4, Some(1800), rng);
    }
    state
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern::generate");
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for strategy in [
        GenerationStrategy::Random,
        GenerationStrategy::Sequential,
        GenerationStrategy::Shape,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy.as_str()),
            &strategy,
            |b, &strategy| b.iter(|| pattern::generate(black_box(6), 20, strategy, &mut rng)),
        );
    }
    group.finish();
}

fn bench_attempt_recall(c: &mut Criterion) {
    let engine = OpponentEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let state = warmed_state(&engine, &mut rng);
    let shown = pattern::generate(5, 8, GenerationStrategy::Sequential, &mut rng);

    c.bench_function("attempt_recall/200_history", |b| {
        b.iter(|| {
            let mut s = state.clone();
            engine.attempt_recall(&mut s, black_box(&shown), 5, 4, Some(1500), &mut rng)
        })
    });
}

fn bench_compose_challenge(c: &mut Criterion) {
    let engine = OpponentEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let state = warmed_state(&engine, &mut rng);
    let options = ChallengeOptions::targeted(0.9);

    c.bench_function("compose_challenge/targeted", |b| {
        b.iter(|| engine.compose_challenge(&state, black_box(12), 6, &options, &mut rng))
    });
}

fn bench_sweep(c: &mut Criterion) {
    let config = EngineConfig::default();
    let scenarios = SweepScenario::grid(SimulatedPlayer::new(0.8, 2000));

    c.bench_function("run_sweep/20x8x12", |b| {
        b.iter(|| run_sweep(&config, black_box(&scenarios), 8, 12, 1))
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_attempt_recall,
    bench_compose_challenge,
    bench_sweep
);
criterion_main!(benches);
