//! # Pandora Main Entry Point
//!
//! Parses the command line, sets up logging and storage, and runs the game
//! either in a macroquad window or headless in the terminal.

use clap::{Parser, ValueEnum};
use log::{error, info};
use macroquad::window::Conf;
use pandora::{
    config, create_rng, Command, FileStore, GameConfig, InputHandler, KeyValueStore,
    MacroquadDisplay, PandoraResult, ProgressionController, RunOutcome, ScriptedInput,
    StepStatus, TranscriptDisplay,
};
use pandora::scenes::SceneManager;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Answer given to the protocol prompt in headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Choice {
    Yes,
    No,
}

/// Command line arguments for Pandora.
#[derive(Parser, Debug)]
#[command(name = "pandora")]
#[command(about = "A terminal-styled descent through Pandora's Box")]
#[command(version)]
struct Args {
    /// Random seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where checkpoints are stored
    #[arg(long, default_value = config::DEFAULT_SAVE_PATH)]
    save_path: PathBuf,

    /// Erase all saved data before starting
    #[arg(long)]
    new_game: bool,

    /// Print the run to the terminal and play it automatically
    #[arg(long)]
    headless: bool,

    /// Headless answer to the protocol prompt
    #[arg(long, value_enum, default_value_t = Choice::Yes)]
    choice: Choice,

    /// Headless command script, played before the autopilot takes over
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> PandoraResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Pandora v{}", pandora::VERSION);

    let mut game_config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            GameConfig::from_json_file(path)?
        }
        None => GameConfig::new(args.seed),
    };
    if args.seed.is_some() {
        game_config.generation.seed = args.seed;
    }

    let mut store = FileStore::open(&args.save_path);
    if args.new_game {
        info!("Erasing saved data at {}", args.save_path.display());
        store.clear()?;
    }

    if args.headless {
        return run_headless(game_config, store, args.choice, args.script.as_deref());
    }

    let window_config = Conf {
        window_title: "Pandora".to_string(),
        window_width: 1024,
        window_height: 768,
        ..Default::default()
    };
    macroquad::Window::from_config(window_config, async move {
        if let Err(e) = run_windowed(game_config, store).await {
            error!("Game ended with an error: {}", e);
        }
    });
    Ok(())
}

/// Initializes logging; `RUST_LOG` overrides the command line level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        tracing::debug!("Logging through tracing-subscriber");
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .format_target(false)
            .init();
    }
}

async fn run_windowed(game_config: GameConfig, store: FileStore) -> PandoraResult<()> {
    let dice = Box::new(create_rng(&game_config.generation));
    let controller = ProgressionController::new(
        game_config,
        MacroquadDisplay::default(),
        InputHandler::new(),
        store,
        dice,
    )?;

    SceneManager::new(controller).run().await
}

/// Plays a whole run in the terminal with a fixed tick and scripted input.
fn run_headless(
    game_config: GameConfig,
    store: FileStore,
    choice: Choice,
    script: Option<&Path>,
) -> PandoraResult<()> {
    let answer = match choice {
        Choice::Yes => Command::ChoiceYes,
        Choice::No => Command::ChoiceNo,
    };
    let dice = Box::new(create_rng(&game_config.generation));
    let input = match script {
        Some(path) => {
            info!("Playing command script {}", path.display());
            ScriptedInput::from_file(path)?
        }
        None => ScriptedInput::new(),
    }
    .with_cycle(vec![answer, Command::Attack]);
    let mut controller = ProgressionController::new(
        game_config,
        TranscriptDisplay::echoing(),
        input,
        store,
        dice,
    )?;

    let tick = Duration::from_millis(1000 / config::TARGET_FPS);
    let outcome = loop {
        if let StepStatus::Finished(outcome) = controller.step(tick)? {
            break outcome;
        }
    };

    let run = controller.run_state();
    match outcome {
        RunOutcome::Victory => info!(
            "Run complete with {}/{} HP",
            run.player_health, run.player_max_health
        ),
        RunOutcome::Defeat => info!("Run lost on floor {}", run.current_floor),
        RunOutcome::Quit => info!("Run suspended on floor {}", run.current_floor),
    }
    Ok(())
}
