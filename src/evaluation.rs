use crate::board::{file_of, rank_of, Board, Color, Piece};
use crate::game::GameState;

pub const CHECKMATE: i32 = 10_000;
pub const STALEMATE: i32 = 0;

type PositionTable = [[i32; 8]; 8];

/// Static evaluation: material plus a positional bonus per (piece, square).
/// Scores are positive when white stands better.
pub struct Evaluator {
    // Piece values
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub king_value: i32,

    // Positional bonuses, white's view, rank 8 in the first row.
    // Black reads the same tables mirrored by rank.
    pub pawn_position_bonus: PositionTable,
    pub knight_position_bonus: PositionTable,
    pub bishop_position_bonus: PositionTable,
    pub rook_position_bonus: PositionTable,
    pub queen_position_bonus: PositionTable,
    pub king_position_bonus: PositionTable,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 100,
            knight_value: 300,
            bishop_value: 310,
            rook_value: 500,
            queen_value: 900,
            king_value: 0,

            // Pushing towards promotion pays off sharply on the last two ranks
            pawn_position_bonus: [
                [900, 900, 900, 900, 900, 900, 900, 900],
                [200, 200, 200, 200, 200, 200, 200, 200],
                [20, 20, 20, 20, 20, 20, 20, 20],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 20, 25, 25, 20, 0, 10],
                [0, 0, 10, 10, 10, 10, 0, 10],
                [10, 10, 10, 0, 0, 10, 10, 10],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            knight_position_bonus: [
                [-20, 0, 0, 0, 0, 0, 0, -20],
                [0, 10, 10, 10, 10, 10, 10, 0],
                [0, 10, 20, 20, 20, 20, 10, 0],
                [0, 10, 20, 20, 20, 20, 10, 0],
                [0, 10, 20, 20, 20, 20, 10, 0],
                [0, 10, 20, 20, 20, 20, 10, 0],
                [0, 10, 10, 10, 10, 10, 10, 0],
                [-20, 0, 0, 0, 0, 0, 0, -20],
            ],

            bishop_position_bonus: [
                [-20, -10, -10, -10, -10, -10, -10, -20],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 10, 0, 0, 0, 0, 10, 0],
                [-20, -10, -10, -10, -10, -10, -10, -20],
            ],

            rook_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 20, 20, 20, 0, 0],
            ],

            queen_position_bonus: [[0; 8]; 8],

            // Castled corners good, central files bad
            king_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, -20, -20, 0, 0, 0],
                [0, 0, 0, -20, -20, 0, 0, 0],
                [0, 0, 0, -10, -10, 0, 0, 0],
                [0, 0, 0, -10, -10, 0, 0, 0],
                [0, 0, 0, -10, -10, 0, 0, 0],
                [0, 0, 0, -10, -10, 0, 0, 0],
                [30, 30, 20, 0, 0, 0, 30, 30],
            ],
        }
    }

    /// Score of the state, positive for white. Terminal flags set by the last
    /// legal move query take priority over material.
    pub fn evaluate(&self, state: &GameState) -> i32 {
        if state.checkmate {
            return match state.side_to_move {
                Color::White => -CHECKMATE,
                Color::Black => CHECKMATE,
            };
        }
        if state.stalemate || state.draw_by_repetition {
            return STALEMATE;
        }
        self.evaluate_board(&state.board)
    }

    pub fn evaluate_board(&self, board: &Board) -> i32 {
        board
            .pieces()
            .map(|(square, piece, color)| {
                let value = self.get_piece_value(piece) + self.position_bonus(piece, color, square);
                if color == Color::White {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }

    pub fn get_piece_value(&self, piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => self.pawn_value,
            Piece::Knight => self.knight_value,
            Piece::Bishop => self.bishop_value,
            Piece::Rook => self.rook_value,
            Piece::Queen => self.queen_value,
            Piece::King => self.king_value,
        }
    }

    pub fn position_bonus(&self, piece: Piece, color: Color, square: u8) -> i32 {
        let table = match piece {
            Piece::Pawn => &self.pawn_position_bonus,
            Piece::Knight => &self.knight_position_bonus,
            Piece::Bishop => &self.bishop_position_bonus,
            Piece::Rook => &self.rook_position_bonus,
            Piece::Queen => &self.queen_position_bonus,
            Piece::King => &self.king_position_bonus,
        };
        let rank = rank_of(square) as usize;
        let row = match color {
            Color::White => 7 - rank,
            Color::Black => rank,
        };
        table[row][file_of(square) as usize]
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::parse_square;

    #[test]
    fn test_start_position_is_balanced() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&GameState::new()), 0);
    }

    #[test]
    fn test_tables_mirror_between_colors() {
        let evaluator = Evaluator::new();
        let g1 = parse_square("g1").unwrap();
        let g8 = parse_square("g8").unwrap();
        assert_eq!(evaluator.position_bonus(Piece::King, Color::White, g1), 30);
        assert_eq!(evaluator.position_bonus(Piece::King, Color::Black, g8), 30);

        let e7 = parse_square("e7").unwrap();
        let e2 = parse_square("e2").unwrap();
        assert_eq!(evaluator.position_bonus(Piece::Pawn, Color::White, e7), 200);
        assert_eq!(evaluator.position_bonus(Piece::Pawn, Color::Black, e2), 200);
    }

    #[test]
    fn test_material_edge_counts_for_white() {
        let evaluator = Evaluator::new();
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&state), 500);
        let state = GameState::from_fen("r3k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&state), -500);
    }

    #[test]
    fn test_terminal_flags_override_material() {
        let evaluator = Evaluator::new();
        let mut state = GameState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        state.checkmate = true;
        assert_eq!(evaluator.evaluate(&state), -CHECKMATE);
        state.side_to_move = Color::Black;
        assert_eq!(evaluator.evaluate(&state), CHECKMATE);
        state.checkmate = false;
        state.stalemate = true;
        assert_eq!(evaluator.evaluate(&state), STALEMATE);
    }
}
