//! Simulation tick
//!
//! Moves the snake one cell, resolves self-collision and apple eating.

use glam::IVec2;
use log::{debug, error};
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Board, GamePhase, GameState, Snake};
use crate::consts::APPLE_ATTEMPTS_PER_CELL;
use crate::error::{EngineError, EngineResult};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Head advanced, tail dropped
    Moved,
    /// Head advanced onto the apple; the snake grew and the apple moved
    Ate,
    /// Head would have entered the body; nothing was committed
    Collided,
}

/// Pick an apple cell not covered by the snake.
///
/// Samples uniformly with a bounded number of attempts, then falls back to a
/// uniform choice among the free cells. Fails only when no cell is free.
pub fn place_apple(board: &Board, snake: &Snake, rng: &mut Pcg32) -> EngineResult<IVec2> {
    let cells = board.cells();
    for _ in 0..cells.saturating_mul(APPLE_ATTEMPTS_PER_CELL) {
        let cell = IVec2::new(rng.random_range(0..board.width), rng.random_range(0..board.height));
        if !snake.contains(cell) {
            return Ok(cell);
        }
    }

    let free: Vec<IVec2> = board.iter_cells().filter(|c| !snake.contains(*c)).collect();
    if free.is_empty() {
        error!("Board {}x{} is full, no apple cell left", board.width, board.height);
        return Err(EngineError::NoFreeCell {
            width: board.width,
            height: board.height,
        });
    }
    debug!("Apple sampling exhausted, choosing among {} free cells", free.len());
    Ok(free[rng.random_range(0..free.len())])
}

/// Advance the snake by one cell.
///
/// A failed apple placement ends the round: the phase becomes `Lose` and the
/// error is returned.
pub fn tick(state: &mut GameState) -> EngineResult<TickOutcome> {
    let next = state.board.step(state.snake.head(), state.snake.direction);

    if state.snake.contains(next) {
        debug!("Collision at ({}, {}), score {}", next.x, next.y, state.score);
        state.phase = GamePhase::Lose;
        return Ok(TickOutcome::Collided);
    }

    state.snake.body.push_front(next);

    if next != state.apple {
        state.snake.body.pop_back();
        return Ok(TickOutcome::Moved);
    }

    state.score += 1;
    debug!("Apple eaten at ({}, {}), score {}", next.x, next.y, state.score);
    match place_apple(&state.board, &state.snake, &mut state.rng) {
        Ok(apple) => {
            state.apple = apple;
            Ok(TickOutcome::Ate)
        }
        Err(e) => {
            state.phase = GamePhase::Lose;
            Err(e)
        }
    }
}

/// Feed one frame to the simulation. Returns the tick outcome when the
/// cadence fired this frame, `None` otherwise or outside `Playing`.
pub fn advance(state: &mut GameState, dt: f32) -> EngineResult<Option<TickOutcome>> {
    if state.phase != GamePhase::Playing {
        return Ok(None);
    }
    if !state.cadence.advance(dt) {
        return Ok(None);
    }
    tick(state).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Direction;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(Board::new(20, 15), IVec2::new(8, 8), 6, 10.0, seed).unwrap();
        state.start_round().unwrap();
        state
    }

    /// Snake covering the first `n` cells of the board in row-major order
    fn filled_snake(board: &Board, n: usize) -> Snake {
        Snake {
            direction: Direction::Right,
            body: board.iter_cells().take(n).collect::<VecDeque<_>>(),
        }
    }

    #[test]
    fn test_tick_moves_head_and_drops_tail() {
        let mut state = playing_state(1);
        state.apple = IVec2::new(3, 3);

        assert_eq!(tick(&mut state).unwrap(), TickOutcome::Moved);
        assert_eq!(state.snake.head(), IVec2::new(9, 8));
        assert!(!state.snake.contains(IVec2::new(3, 8)));
        assert_eq!(state.snake.len(), 6);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_eating_grows_and_moves_apple() {
        let mut state = playing_state(2);
        state.apple = IVec2::new(9, 8);

        assert_eq!(tick(&mut state).unwrap(), TickOutcome::Ate);
        assert_eq!(state.snake.len(), 7);
        assert_eq!(state.score, 1);
        assert!(state.snake.contains(IVec2::new(3, 8)));
        assert!(!state.snake.contains(state.apple));
    }

    #[test]
    fn test_self_collision_loses_without_growth() {
        let mut state = playing_state(3);
        state.apple = IVec2::new(0, 0);
        // Curl the head back into the body: down, left, then up hits (7, 8)
        state.snake.steer(Direction::Down);
        tick(&mut state).unwrap();
        state.snake.steer(Direction::Left);
        tick(&mut state).unwrap();
        state.snake.steer(Direction::Up);

        let before = state.snake.clone();
        assert_eq!(tick(&mut state).unwrap(), TickOutcome::Collided);
        assert_eq!(state.phase, GamePhase::Lose);
        assert_eq!(state.snake, before);
    }

    #[test]
    fn test_tail_cell_counts_as_body() {
        let mut state = playing_state(6);
        state.apple = IVec2::new(10, 10);
        // 2x2 loop: the cell ahead of the head is the current tail
        state.snake = Snake {
            direction: Direction::Left,
            body: VecDeque::from([IVec2::new(1, 0), IVec2::new(1, 1), IVec2::new(0, 1), IVec2::new(0, 0)]),
        };
        assert_eq!(tick(&mut state).unwrap(), TickOutcome::Collided);
        assert_eq!(state.snake.len(), 4);
    }

    #[test]
    fn test_filling_the_board_loses() {
        let board = Board::new(4, 1);
        let mut state = GameState::new(board, IVec2::new(3, 0), 3, 10.0, 0).unwrap();
        state.start_round().unwrap();
        // Body (3,0) (2,0) (1,0) leaves one free cell
        assert_eq!(state.apple, IVec2::new(0, 0));
        let err = tick(&mut state).unwrap_err();
        assert!(matches!(err, EngineError::NoFreeCell { width: 4, height: 1 }));
        assert_eq!(state.phase, GamePhase::Lose);
    }

    #[test]
    fn test_advance_respects_phase_and_cadence() {
        let mut state = GameState::new(Board::new(20, 15), IVec2::new(8, 8), 6, 10.0, 4).unwrap();
        assert_eq!(advance(&mut state, 100.0).unwrap(), None);

        state.start_round().unwrap();
        state.apple = IVec2::new(0, 0);
        let ticks = (0..10)
            .filter_map(|_| advance(&mut state, 100.0).unwrap())
            .count();
        assert_eq!(ticks, 10);
        assert_eq!(state.snake.head(), IVec2::new(18, 8));
    }

    #[test]
    fn test_placement_falls_back_to_free_cell() {
        let board = Board::new(5, 4);
        let snake = filled_snake(&board, 19);
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(place_apple(&board, &snake, &mut rng).unwrap(), IVec2::new(4, 3));

        let full = filled_snake(&board, 20);
        assert!(place_apple(&board, &full, &mut rng).is_err());
    }

    #[test]
    fn test_determinism() {
        let mut a = playing_state(99_999);
        let mut b = playing_state(99_999);
        for _ in 0..10 {
            a.apple = a.board.step(a.snake.head(), a.snake.direction);
            b.apple = b.board.step(b.snake.head(), b.snake.direction);
            assert_eq!(tick(&mut a).unwrap(), TickOutcome::Ate);
            tick(&mut b).unwrap();
        }
        assert_eq!(a.apple, b.apple);
        assert_eq!(a.snake, b.snake);
    }

    proptest! {
        #[test]
        fn prop_apple_never_on_body(n in 0usize..20, seed in any::<u64>()) {
            let board = Board::new(5, 4);
            let snake = filled_snake(&board, n);
            let mut rng = Pcg32::seed_from_u64(seed);
            let apple = place_apple(&board, &snake, &mut rng).unwrap();
            prop_assert!(board.contains(apple));
            prop_assert!(!snake.contains(apple));
        }

        #[test]
        fn prop_wraps_on_every_edge(w in 1i32..40, h in 1i32..40, t in 0i32..40) {
            let board = Board::new(w, h);
            let x = t % w;
            let y = t % h;
            prop_assert_eq!(board.step(IVec2::new(w - 1, y), Direction::Right), IVec2::new(0, y));
            prop_assert_eq!(board.step(IVec2::new(0, y), Direction::Left), IVec2::new(w - 1, y));
            prop_assert_eq!(board.step(IVec2::new(x, h - 1), Direction::Down), IVec2::new(x, 0));
            prop_assert_eq!(board.step(IVec2::new(x, 0), Direction::Up), IVec2::new(x, h - 1));
        }
    }
}
