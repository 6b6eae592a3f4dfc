//! Pika Volley Sim headless runner
//!
//! Plays a computer-vs-computer match and checks that its replay reproduces it.
//!
//! Usage: `pika-volley-sim [seed] [preset | settings.json]`

use std::process::ExitCode;

use pika_volley_sim::replay::{self, ReplayRecorder};
use pika_volley_sim::settings::{AiPreset, SimConfig};
use pika_volley_sim::sim::{Match, MatchEvent, UserInput};

/// Stop a match that somehow never ends
const MAX_TICKS: u64 = 500_000;

fn load_config(arg: Option<&str>) -> Result<SimConfig, pika_volley_sim::ConfigError> {
    match arg {
        None => Ok(SimConfig::default()),
        Some(name) => match AiPreset::from_name(name) {
            Some(preset) => {
                log::info!("Using {} preset", preset.as_str());
                Ok(SimConfig::from_preset(preset))
            }
            None => SimConfig::load(name),
        },
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match args.first().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed {:?}: {}", args[0], e);
            return ExitCode::FAILURE;
        }
        None => 1,
    };
    let config = match load_config(args.get(1).map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Pika Volley Sim starting, seed {}", seed);
    let mut game = Match::new(seed, config, [true, true]);
    let mut recorder = ReplayRecorder::for_match(&game);

    while !game.is_game_over() && game.ticks < MAX_TICKS {
        let report = game.step([UserInput::NONE; 2]);
        recorder.record(&report);
        for event in &report.events {
            if let MatchEvent::PointScored { side, scores } = event {
                println!("tick {:>6}: point {:?} ({} - {})", game.ticks, side, scores[0], scores[1]);
            }
        }
    }

    match game.winner() {
        Some(side) => println!(
            "{:?} wins {} - {} after {} ticks",
            side, game.scores[0], game.scores[1], game.ticks
        ),
        None => println!("No winner after {} ticks", game.ticks),
    }

    let log = recorder.finish();
    match replay::play(&log) {
        Ok(replayed)
            if replayed.scores == game.scores
                && replayed.ball.pos == game.ball.pos
                && replayed.players[0].pos == game.players[0].pos
                && replayed.players[1].pos == game.players[1].pos =>
        {
            println!("✓ Replay of {} ticks reproduces the match", log.len());
            ExitCode::SUCCESS
        }
        Ok(_) => {
            eprintln!("Replay diverged from the recorded match");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
