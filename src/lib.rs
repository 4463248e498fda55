pub mod board;
pub mod errors;
pub mod evaluation;
pub mod game;
pub mod movegen;
pub mod repetition;
pub mod search;
pub mod uci;

use game::GameState;
use movegen::{Move, MoveGenerator};
use search::Search;

/// Fresh game from the standard starting position.
pub fn new_game() -> GameState {
    GameState::new()
}

/// Legal moves for the side to move. Also refreshes `in_check`, `checkmate`
/// and `stalemate` on `state`.
pub fn legal_moves(state: &mut GameState) -> Vec<Move> {
    MoveGenerator::new().legal_moves(state)
}

pub fn apply_move(state: &mut GameState, mv: Move) {
    state.apply_move(mv);
}

pub fn undo_move(state: &mut GameState) {
    state.undo_move();
}

/// Engine move with the default search settings.
pub fn select_move(state: &mut GameState, legal_moves: &[Move]) -> Option<Move> {
    Search::new().select_move(state, legal_moves)
}
