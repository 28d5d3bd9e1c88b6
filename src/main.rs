//! Maze Chase headless runner
//!
//! Plays one session with a seeded autopilot in place of a human and prints a
//! JSON summary. Useful for soak testing and for comparing tuning files.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use maze_chase::Tuning;
use maze_chase::consts::FRAME_MS;
use maze_chase::sim::{Direction, GameEvent, GameState, GameStatus};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Session seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// Tick budget
    #[arg(long, default_value_t = 60 * 60 * 5)]
    ticks: u64,
    /// Elapsed milliseconds fed to each tick
    #[arg(long, default_value_t = FRAME_MS)]
    tick_ms: f32,
    /// JSON file overriding the default balance
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Print the summary on a single line
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    status: Option<GameStatus>,
    score: u64,
    lives: u8,
    remaining: u32,
    dots_eaten: u32,
    power_pellets_eaten: u32,
    pursuers_eaten: u32,
    lives_lost: u32,
}

impl Summary {
    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::DotEaten { .. } => self.dots_eaten += 1,
                GameEvent::PowerPelletEaten { .. } => self.power_pellets_eaten += 1,
                GameEvent::PursuerEaten { .. } => self.pursuers_eaten += 1,
                GameEvent::LifeLost { .. } => self.lives_lost += 1,
                GameEvent::PowerModeEnded | GameEvent::Won | GameEvent::Lost => {}
            }
        }
    }
}

/// Stand-in for a player: changes its mind at random intervals
struct Autopilot {
    rng: Pcg32,
    next_change: u64,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_a070),
            next_change: 0,
        }
    }

    fn drive(&mut self, state: &mut GameState, tick: u64) {
        if tick < self.next_change {
            return;
        }
        let dir = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
        state.request_direction(dir);
        self.next_change = tick + self.rng.random_range(10..90);
    }
}

fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}

fn run(cli: &Cli) -> Summary {
    let seed = cli.seed.unwrap_or_else(default_seed);
    let tuning = cli
        .tuning
        .as_deref()
        .map(Tuning::load)
        .unwrap_or_default();

    log::info!("Running seed {} for up to {} ticks", seed, cli.ticks);
    let mut state = GameState::with_tuning(seed, tuning);
    let mut autopilot = Autopilot::new(seed);
    let mut summary = Summary {
        seed,
        ..Summary::default()
    };

    while summary.ticks < cli.ticks && !state.status().is_terminal() {
        autopilot.drive(&mut state, summary.ticks);
        state.tick(cli.tick_ms);
        summary.ticks += 1;
        summary.record(state.events());
    }

    summary.status = Some(state.status());
    summary.score = state.score();
    summary.lives = state.lives();
    summary.remaining = state.maze().remaining_collectibles();
    log::info!(
        "Finished after {} ticks: {:?}, score {}",
        summary.ticks,
        state.status(),
        summary.score
    );
    summary
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let summary = run(&cli);

    let json = if cli.quiet {
        serde_json::to_string(&summary)
    } else {
        serde_json::to_string_pretty(&summary)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to encode summary: {}", e);
            std::process::exit(1);
        }
    }
}
