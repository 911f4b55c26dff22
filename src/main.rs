use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use recall_rival::logging::{init_tracing, LogTargets};
use recall_rival::{
    run_sweep, Duel, EngineConfig, EngineError, SimConfig, SimulatedPlayer, SweepScenario,
};

fn main() -> Result<(), EngineError> {
    dotenvy::dotenv().ok();

    let config = EngineConfig::from_env();
    let sim = SimConfig::from_env();
    let _log_guard = init_tracing(&LogTargets::from_env(&sim.log_level));

    info!(
        seed = config.duel.seed,
        rounds = sim.rounds,
        matches = sim.matches,
        tier = sim.tier.as_str(),
        personality = sim.personality.as_str(),
        "starting recall-rival simulation"
    );

    let player = SimulatedPlayer::new(0.8, 2000);
    let scenarios = SweepScenario::grid(player);
    let results = run_sweep(&config, &scenarios, sim.matches, sim.rounds, config.duel.seed);
    println!("{}", serde_json::to_string_pretty(&results)?);

    let mut duel = Duel::new(&config, sim.tier, sim.personality);
    let mut player_rng = ChaCha8Rng::seed_from_u64(config.duel.seed.wrapping_add(1));
    for _ in 0..sim.rounds {
        let setup = duel.start_round();
        let submission = player.respond(&setup.pattern, setup.grid_size, &mut player_rng);
        let outcome = duel.finish_round(&submission, player.response_time(&mut player_rng))?;
        info!(
            round = outcome.round,
            challenge = setup.is_challenge,
            strategy = setup.strategy.map(|s| s.as_str()),
            shown = ?setup.pattern,
            human = ?submission,
            opponent = ?outcome.opponent_guess,
            winner = ?outcome.winner,
            "round"
        );
    }

    println!("{}", serde_json::to_string_pretty(&duel.summary())?);
    println!("{}", serde_json::to_string_pretty(&duel.state().insights(5))?);
    Ok(())
}
