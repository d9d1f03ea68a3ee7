//! Fireball Quest entry point
//!
//! Headless runner: loads the levels, lets the autopilot play for a number
//! of fixed ticks and logs what happens.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use fireball_quest::sim::{Autopilot, GameEvent, LevelController, LevelSet, Rules};
use fireball_quest::{GameError, Settings};

/// Fireball Quest - collect fireballs, dodge enemies, reach the exit
#[derive(Parser, Debug)]
#[command(name = "fireball-quest")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding level1.json, level2.json and level3.json
    #[arg(short = 'l', long = "levels", default_value = "assets/tilemaps")]
    levels: PathBuf,

    /// Use the built-in levels instead of loading tilemaps
    #[arg(short = 'b', long = "builtin")]
    builtin: bool,

    /// Settings JSON file
    #[arg(short = 's', long = "settings")]
    settings: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short = 'f', long = "frames", default_value_t = 60 * 60 * 5)]
    frames: u64,

    /// Autopilot seed
    #[arg(long = "seed", default_value_t = 1)]
    seed: u64,

    /// Print the final game state as JSON
    #[arg(long = "dump-state")]
    dump_state: bool,
}

fn run(args: &Args) -> Result<(), GameError> {
    let settings = match &args.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let levels = if args.builtin {
        LevelSet::builtin()?
    } else {
        LevelSet::load_dir(&args.levels)?
    };

    let rules = Rules::from_settings(&settings);
    let dt = settings.dt();
    let mut game = LevelController::new(levels, rules);
    let mut pilot = Autopilot::new(args.seed);
    game.drain_events();

    let mut deaths = 0u32;
    let mut wins = 0u32;
    for _ in 0..args.frames {
        let input = pilot.next_input(&game.state, &game.rules);
        for event in game.tick(&input, dt) {
            match event {
                GameEvent::PlayerCaught { .. } => deaths += 1,
                GameEvent::GameRestarted => wins += 1,
                GameEvent::CountdownTick { remaining } => {
                    log::info!("Restarting in {}", remaining);
                }
                _ => log::debug!("{:?}", event),
            }
        }
    }

    log::info!(
        "Finished {} ticks: level {}, {} fireballs, score {}, {} deaths, {} wins",
        game.state.time_ticks,
        game.state.current_level,
        game.state.counters.fireballs,
        game.state.counters.score,
        deaths,
        wins
    );

    if args.dump_state {
        println!("{}", serde_json::to_string_pretty(&game.state)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Fireball Quest (headless) starting...");

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
