//! Deterministic grid simulation
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Ticks are driven by [`MoveCadence`], never by the render rate
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod cadence;
pub mod state;
pub mod tick;

pub use cadence::MoveCadence;
pub use state::{Board, Direction, GamePhase, GameState, Snake};
pub use tick::{TickOutcome, advance, place_apple, tick};
