//! Game state and core simulation types
//!
//! Cells are integer grid coordinates with y growing downward. The board is
//! a torus: stepping off any edge re-enters on the opposite one.

use std::collections::VecDeque;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cadence::MoveCadence;
use super::tick::place_apple;
use crate::error::EngineResult;
use crate::settings::Settings;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for confirm
    #[default]
    Menu,
    /// Round in progress
    Playing,
    /// Round ended by self-collision
    Lose,
}

/// One of the four unit moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in cells
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Board dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn cells(&self) -> usize {
        (self.width.max(0) as usize).saturating_mul(self.height.max(0) as usize)
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Fold a cell back onto the board, each axis independently
    pub fn wrap(&self, cell: IVec2) -> IVec2 {
        IVec2::new(cell.x.rem_euclid(self.width), cell.y.rem_euclid(self.height))
    }

    /// The neighbour of `cell` one step in `dir`
    pub fn step(&self, cell: IVec2, dir: Direction) -> IVec2 {
        self.wrap(cell + dir.delta())
    }

    /// Every cell in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x, y)))
    }
}

/// The snake: a heading and its body, head first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    pub direction: Direction,
    pub body: VecDeque<IVec2>,
}

impl Snake {
    /// A straight snake of `length` cells with its head at `head`, trailing
    /// away from `direction`
    pub fn new(board: &Board, head: IVec2, length: usize, direction: Direction) -> Self {
        let back = direction.reverse().delta();
        let body = (0..length as i32).map(|k| board.wrap(head + back * k)).collect();
        Self { direction, body }
    }

    /// # Panics
    ///
    /// Panics if the body is empty.
    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.body.contains(&cell)
    }

    /// Request a new heading. The exact reverse of the current heading is
    /// refused; anything else replaces it immediately.
    pub fn steer(&mut self, dir: Direction) -> bool {
        if dir == self.direction.reverse() {
            return false;
        }
        self.direction = dir;
        true
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub board: Board,
    pub snake: Snake,
    pub apple: IVec2,
    pub score: u32,
    pub cadence: MoveCadence,
    /// Apple placement stream
    pub rng: Pcg32,
    start_cell: IVec2,
    start_length: usize,
    start_direction: Direction,
}

impl GameState {
    /// Build a state in `Menu` with a round already laid out
    pub fn new(
        board: Board,
        start_cell: IVec2,
        start_length: usize,
        moves_per_second: f32,
        seed: u64,
    ) -> EngineResult<Self> {
        let mut state = Self {
            phase: GamePhase::Menu,
            board,
            snake: Snake::new(&board, start_cell, start_length, Direction::Right),
            apple: IVec2::ZERO,
            score: 0,
            cadence: MoveCadence::new(moves_per_second),
            rng: Pcg32::seed_from_u64(seed),
            start_cell,
            start_length,
            start_direction: Direction::Right,
        };
        state.apple = place_apple(&state.board, &state.snake, &mut state.rng)?;
        Ok(state)
    }

    pub fn from_settings(settings: &Settings, seed: u64) -> EngineResult<Self> {
        let (x, y) = settings.start_cell;
        Self::new(
            Board::new(settings.grid_width(), settings.grid_height()),
            IVec2::new(x, y),
            settings.start_length,
            settings.moves_per_second,
            seed,
        )
    }

    /// Lay out a fresh round (snake, apple, score, cadence) and enter `Playing`
    pub fn start_round(&mut self) -> EngineResult<()> {
        self.snake = Snake::new(&self.board, self.start_cell, self.start_length, self.start_direction);
        self.score = 0;
        self.cadence.reset();
        self.phase = GamePhase::Playing;
        match place_apple(&self.board, &self.snake, &mut self.rng) {
            Ok(apple) => {
                self.apple = apple;
                Ok(())
            }
            Err(e) => {
                self.phase = GamePhase::Lose;
                Err(e)
            }
        }
    }
}
