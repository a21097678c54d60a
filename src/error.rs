//! Error types
//!
//! Initialization failures abort startup. Everything else is logged by the
//! caller and degrades to "draw nothing" rather than crossing the frame.

use thiserror::Error;

/// Errors produced by the loop, the platform and the simulation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A collaborator subsystem (window, renderer, font, audio) failed to start.
    #[error("failed to initialize {subsystem}: {reason}")]
    Init {
        /// The subsystem that failed.
        subsystem: &'static str,
        /// Backend-supplied reason.
        reason: String,
    },

    /// An asset could not be loaded.
    #[error("failed to load {path}: {reason}")]
    ResourceLoad {
        /// Path or name of the asset.
        path: String,
        /// Backend-supplied reason.
        reason: String,
    },

    /// Apple placement found the board completely occupied.
    #[error("no free cell left on a {width}x{height} board")]
    NoFreeCell {
        /// Board width in cells.
        width: i32,
        /// Board height in cells.
        height: i32,
    },

    /// Settings failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Settings file could not be parsed.
    #[error("invalid settings file: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn init(subsystem: &'static str, reason: impl ToString) -> Self {
        Self::Init {
            subsystem,
            reason: reason.to_string(),
        }
    }

    pub fn resource(path: impl ToString, reason: impl ToString) -> Self {
        Self::ResourceLoad {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that must stop startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Init { .. })
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_init_is_fatal() {
        assert!(EngineError::init("window", "no display").is_fatal());
        assert!(!EngineError::resource("assets/apple.png", "missing").is_fatal());
        assert!(!EngineError::NoFreeCell { width: 2, height: 2 }.is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = EngineError::init("renderer", "no adapter");
        assert_eq!(err.to_string(), "failed to initialize renderer: no adapter");

        let err = EngineError::NoFreeCell { width: 20, height: 15 };
        assert_eq!(err.to_string(), "no free cell left on a 20x15 board");
    }
}
