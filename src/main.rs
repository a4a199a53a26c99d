//! Arena Rush headless entry point
//!
//! Runs one autopiloted session and prints the session report as JSON.
//!
//! Usage: `arena-rush [seed] [ticks] [tuning.json]`

use std::env;
use std::process::ExitCode;

use arena_rush::consts::TICK_RATE;
use arena_rush::sim::{GamePhase, SimulationState, autopilot, tick};
use arena_rush::{HighScores, SimError, Tuning};

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_TICKS: u64 = 5 * 60 * TICK_RATE as u64;
/// Progress is logged this often
const LOG_INTERVAL_TICKS: u64 = 10 * TICK_RATE as u64;

fn parse_arg<T: std::str::FromStr>(value: Option<&String>, default: T, what: &str) -> Option<T> {
    match value {
        None => Some(default),
        Some(raw) => match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                log::error!("Invalid {}: {}", what, raw);
                None
            }
        },
    }
}

fn run(seed: u64, max_ticks: u64, tuning: Tuning) -> Result<(), SimError> {
    let mut state = SimulationState::new(seed, tuning);

    while state.elapsed_ticks < max_ticks && state.phase != GamePhase::GameOver {
        let input = autopilot(&state);
        tick(&mut state, &input);

        if state.phase == GamePhase::Playing
            && state.elapsed_ticks % LOG_INTERVAL_TICKS == 0
        {
            log::info!(
                "t={:.0}s level {} score {} hp {:.0}/{:.0} enemies {} projectiles {}",
                state.elapsed_secs(),
                state.player.level,
                state.player.score,
                state.player.health,
                state.player.max_health,
                state.enemies.active_count(),
                state.projectiles.active_count()
            );
        }
    }

    let board = HighScores::new();
    let report = state.session_report(&board);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Arena Rush (headless) starting...");

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(seed) = parse_arg(args.first(), DEFAULT_SEED, "seed") else {
        return ExitCode::FAILURE;
    };
    let Some(ticks) = parse_arg(args.get(1), DEFAULT_TICKS, "tick count") else {
        return ExitCode::FAILURE;
    };
    let tuning = match args.get(2) {
        Some(path) => match Tuning::load(path) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Failed to load tuning: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    match run(seed, ticks, tuning) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
