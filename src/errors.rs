use thiserror::Error;

/// Errors raised where text enters the engine: FEN strings and move notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid move notation: {0}")]
    InvalidMoveText(String),

    #[error("illegal move in this position: {0}")]
    IllegalMove(String),
}
