//! Game settings and preferences
//!
//! Read from a JSON file in the working directory; any field left out of the
//! file takes its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, EngineResult};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Particle pool capacity for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Sparkle spawn rate (particles per second)
    pub fn sparkle_rate(&self) -> u32 {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 8,
            QualityPreset::High => 16,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Window ===
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub fullscreen: bool,

    // === Board ===
    /// Cell size in pixels
    pub grid_size: u32,
    /// Simulation ticks per second
    pub moves_per_second: f32,
    pub start_length: usize,
    pub start_cell: (i32, i32),
    /// Fixed RNG seed (random per run when absent)
    pub seed: Option<u64>,

    // === Effects ===
    /// Apple sparkle particles
    pub particles: bool,
    pub sound: bool,

    // === HUD ===
    /// Show FPS in the window title
    pub show_fps: bool,

    /// Directory holding textures, fonts and clips
    pub asset_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            title: "Snake".to_string(),
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            // Terminal presents are only paced with vsync on
            vsync: true,
            fullscreen: false,

            grid_size: GRID_SIZE,
            moves_per_second: MOVES_PER_SECOND,
            start_length: START_LENGTH,
            start_cell: START_CELL,
            seed: None,

            particles: true,
            sound: true,

            show_fps: true,

            asset_dir: PathBuf::from("assets"),
        }
    }
}

impl Settings {
    /// Board width in cells
    pub fn grid_width(&self) -> i32 {
        i32::try_from(self.width / self.grid_size.max(1)).unwrap_or(i32::MAX)
    }

    /// Board height in cells
    pub fn grid_height(&self) -> i32 {
        i32::try_from(self.height / self.grid_size.max(1)).unwrap_or(i32::MAX)
    }

    /// Effective particle pool capacity
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Check the values the simulation depends on
    pub fn validate(&self) -> EngineResult<()> {
        if self.grid_size == 0 {
            return Err(EngineError::Config("grid_size must be positive".into()));
        }
        if self.grid_width() < 1 || self.grid_height() < 1 {
            return Err(EngineError::Config(format!(
                "{}x{} window holds no {}px cells",
                self.width, self.height, self.grid_size
            )));
        }
        if self.moves_per_second.is_nan() || self.moves_per_second <= 0.0 {
            return Err(EngineError::Config("moves_per_second must be positive".into()));
        }
        let cells = (self.grid_width() as usize).saturating_mul(self.grid_height() as usize);
        if cells > MAX_BOARD_CELLS {
            return Err(EngineError::Config(format!(
                "{}x{} board exceeds {} cells",
                self.grid_width(),
                self.grid_height(),
                MAX_BOARD_CELLS
            )));
        }
        // The snake spawns as one straight row and needs a cell left for the apple
        if self.start_length == 0 || self.start_length > self.grid_width() as usize || self.start_length >= cells {
            return Err(EngineError::Config(format!(
                "start_length {} does not fit a {}x{} board",
                self.start_length,
                self.grid_width(),
                self.grid_height()
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from a file
    pub fn read(path: &Path) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.grid_width(), 20);
        assert_eq!(s.grid_height(), 15);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "moves_per_second": 15.0, "seed": 7 }"#).unwrap();
        assert_eq!(s.moves_per_second, 15.0);
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.grid_size, GRID_SIZE);
        assert_eq!(s.title, "Snake");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let s = Settings {
            moves_per_second: 0.0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(EngineError::Config(_))));

        let s = Settings {
            width: 16,
            ..Settings::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            start_length: 301,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_oversized_board_is_a_config_error() {
        let s = Settings {
            width: 100_000,
            height: 100_000,
            grid_size: 1,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(EngineError::Config(_))));

        let s = Settings {
            width: u32::MAX,
            height: u32::MAX,
            grid_size: 1,
            ..Settings::default()
        };
        assert_eq!(s.grid_width(), i32::MAX);
        assert!(matches!(s.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_largest_board_is_accepted() {
        let s = Settings {
            width: 256,
            height: 256,
            grid_size: 1,
            ..Settings::default()
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_particles_off_means_no_pool() {
        let mut s = Settings {
            quality: QualityPreset::High,
            ..Settings::default()
        };
        assert_eq!(s.max_particles(), 2000);
        s.particles = false;
        assert_eq!(s.max_particles(), 0);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(QualityPreset::High.as_str(), "High");
        assert_eq!(QualityPreset::default().as_str(), "Medium");
    }

    #[test]
    fn test_save_then_read() {
        let path = std::env::temp_dir().join(format!("grid_snake_settings_{}.json", std::process::id()));
        let s = Settings {
            seed: Some(42),
            quality: QualityPreset::Low,
            ..Settings::default()
        };
        s.save(&path).unwrap();
        let loaded = Settings::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let s = Settings::load(Path::new("definitely/not/here.json"));
        assert_eq!(s, Settings::default());
    }
}
