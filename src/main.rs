//! Grove Runner headless driver
//!
//! Runs an autopilot session against the simulation core, logs snapshots and
//! audio cues, and records the final score on a leaderboard.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use grove_runner::audio::{AudioManager, LogAudioSink};
use grove_runner::consts::{FRAME_DT, FRAMES_PER_SECOND};
use grove_runner::persistence::{JsonFileStore, MemoryStore, ScoreStore};
use grove_runner::platform::{Autopilot, InputProvider, SurfaceMetrics};
use grove_runner::renderer::{LogRenderer, Renderer};
use grove_runner::sim::{GamePhase, GameState, tick};
use grove_runner::{Difficulty, Tuning};

/// Upper bound on a headless session, in minutes of game time
const DEFAULT_MINUTES: u64 = 10;
/// Seconds between renderer status lines
const STATUS_SECONDS: u64 = 10;

#[derive(Parser, Debug)]
#[command(name = "grove-runner")]
#[command(about = "Headless autopilot session for the Grove Runner simulation core")]
struct Cli {
    /// RNG seed (defaults to the current unix time)
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of frames to simulate
    #[arg(long, default_value_t = DEFAULT_MINUTES * 60 * FRAMES_PER_SECOND as u64)]
    frames: u64,
    /// Difficulty preset (overrides the tuning file)
    #[arg(long, value_enum)]
    difficulty: Option<CliDifficulty>,
    /// JSON tuning file
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Leaderboard file
    #[arg(long, default_value = "grove_runner_scores.json")]
    scores: PathBuf,
    /// Keep the leaderboard in memory instead of writing it
    #[arg(long, default_value_t = false)]
    no_save: bool,
    /// Name recorded on the leaderboard
    #[arg(long, default_value = "autopilot")]
    name: String,
    /// Simulated surface width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    /// Simulated surface height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,
    /// Master volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    volume: f32,
    /// Sound effect volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    sfx_volume: f32,
    /// Drop every audio cue
    #[arg(long, default_value_t = false)]
    muted: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliDifficulty {
    Easy,
    Normal,
    Hard,
}

impl From<CliDifficulty> for Difficulty {
    fn from(value: CliDifficulty) -> Self {
        match value {
            CliDifficulty::Easy => Difficulty::Easy,
            CliDifficulty::Normal => Difficulty::Normal,
            CliDifficulty::Hard => Difficulty::Hard,
        }
    }
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn load_tuning(cli: &Cli) -> Tuning {
    let difficulty = cli.difficulty.map(Difficulty::from);
    match &cli.tuning {
        Some(path) => {
            let mut tuning = Tuning::load_or_default(path);
            if let Some(difficulty) = difficulty {
                tuning.difficulty = difficulty;
            }
            tuning
        }
        None => Tuning::from_difficulty(difficulty.unwrap_or_default()),
    }
}

fn score_store(cli: &Cli) -> Box<dyn ScoreStore> {
    if cli.no_save {
        log::info!("Leaderboard kept in memory only");
        Box::new(MemoryStore::default())
    } else {
        Box::new(JsonFileStore::new(cli.scores.clone()))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(unix_time);
    log::info!("Grove Runner (headless) starting with seed {}", seed);

    let tuning = load_tuning(&cli);
    log::info!("Difficulty: {}", tuning.difficulty.as_str());

    let mut renderer = LogRenderer::new(
        SurfaceMetrics::new(cli.width, cli.height),
        STATUS_SECONDS * FRAMES_PER_SECOND as u64,
    );
    let mut audio = AudioManager::new(LogAudioSink::default());
    audio.set_master_volume(cli.volume);
    audio.set_sfx_volume(cli.sfx_volume);
    audio.set_muted(cli.muted);
    let mut pilot = Autopilot::default();
    let mut state = GameState::new(seed, tuning, renderer.surface_metrics());

    let mut frames = 0;
    while frames < cli.frames && state.phase != GamePhase::GameOver {
        let input = pilot.next_input(&state.snapshot());
        tick(&mut state, &input, FRAME_DT);
        audio.handle_events(&state.drain_events());
        renderer.render(&state.snapshot());
        frames += 1;
    }

    log::info!(
        "Session over after {} frames: score {}, stage {}, lives {}, {} cues",
        frames,
        state.score,
        state.stage.index,
        state.lives,
        audio.sink().played
    );

    let mut store = score_store(&cli);
    let mut scores = store.load_or_default();
    match scores.add_score(&cli.name, state.score, state.stage.index, unix_time()) {
        Some(rank) => {
            log::info!("New high score, rank {}", rank);
            if let Err(err) = store.save(&scores) {
                log::error!("Could not save high scores: {}", err);
            }
        }
        None => log::info!(
            "Score {} did not make the board (top: {:?})",
            state.score,
            scores.top_score()
        ),
    }
}
