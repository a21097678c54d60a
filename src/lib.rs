//! Grid Snake - a grid arcade game on a decoupled-timestep loop
//!
//! Core modules:
//! - `engine`: Game loop, frame timing, entity registry, particle pool
//! - `sim`: Deterministic grid simulation (movement, collision, apple placement)
//! - `game`: The MENU/PLAYING/LOSE state machine wired onto the loop
//! - `platform`: Graphics/audio/input collaborator (terminal and headless)
//! - `settings`: Data-driven configuration

pub mod assets;
pub mod audio;
pub mod engine;
pub mod error;
pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{EngineError, EngineResult};
pub use game::SnakeGame;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Default window dimensions (pixels)
    pub const SCREEN_WIDTH: u32 = 640;
    pub const SCREEN_HEIGHT: u32 = 480;

    /// Size of one board cell in pixels
    pub const GRID_SIZE: u32 = 32;

    /// Simulation ticks per real second
    pub const MOVES_PER_SECOND: f32 = 10.0;

    /// Snake spawn
    pub const START_LENGTH: usize = 6;
    pub const START_CELL: (i32, i32) = (8, 8);

    /// Length of one frame-rate / cadence measurement window (ms)
    pub const SECOND_MS: f32 = 1000.0;

    /// Rejection-sampling budget for apple placement, per board cell
    pub const APPLE_ATTEMPTS_PER_CELL: usize = 4;

    /// Largest board the settings accept, in cells
    pub const MAX_BOARD_CELLS: usize = 65_536;

    /// Point size for the HUD font
    pub const FONT_SIZE: u32 = 24;

    /// Settings file looked up in the working directory
    pub const SETTINGS_FILE: &str = "snake.json";

    /// Log file used while the terminal backend owns the screen
    pub const LOG_FILE: &str = "snake.log";

    /// Read-only colour palette
    pub mod colors {
        use crate::platform::Color;

        pub const BACKGROUND: Color = Color::rgb(135, 206, 235);
        pub const RED: Color = Color::rgb(255, 0, 0);
        pub const GREEN: Color = Color::rgb(0, 255, 0);
        pub const BLUE: Color = Color::rgb(0, 0, 255);
        pub const WHITE: Color = Color::rgb(255, 255, 255);
        pub const YELLOW: Color = Color::rgb(255, 220, 60);
        pub const SCORE_TEXT: Color = WHITE;
        pub const BANNER_TEXT: Color = RED;
    }
}
