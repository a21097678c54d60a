//! Grid Snake entry point
//!
//! Loads settings, brings up the terminal backend and runs the loop until
//! quit. Startup failures are logged and end the process cleanly.

use std::fs::File;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use env_logger::{Env, Target};

use grid_snake::consts::{LOG_FILE, SETTINGS_FILE};
use grid_snake::engine::GameLoop;
use grid_snake::platform::TerminalPlatform;
use grid_snake::{EngineResult, Settings, SnakeGame};

/// The terminal owns stdout and stderr, so records go to a file
fn init_logging() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    match File::create(LOG_FILE) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("Cannot open {}: {}, logging to stderr", LOG_FILE, e),
    }
    builder.init();
}

fn run(settings: Settings) -> EngineResult<()> {
    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("Game initialized with seed: {}", seed);

    let game = SnakeGame::new(settings.clone(), seed)?;
    let platform = TerminalPlatform::new(settings.grid_size);
    let mut game_loop = GameLoop::create(
        platform,
        game,
        &settings.title,
        settings.width,
        settings.height,
        settings.vsync,
        settings.fullscreen,
    )?
    .with_fps_in_title(settings.show_fps);

    game_loop.start()
}

fn main() {
    init_logging();
    log::info!("Grid Snake starting...");

    let settings = Settings::load(Path::new(SETTINGS_FILE));
    if let Err(e) = run(settings) {
        log::error!("Grid Snake stopped: {}", e);
        eprintln!("Grid Snake could not start: {}", e);
        return;
    }
    log::info!("Grid Snake exited cleanly");
}
