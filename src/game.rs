use crate::board::{
    file_of, make_square, offset, parse_square, rank_of, square_name, Board, CastlingRights, Color, Piece,
};
use crate::errors::ChessError;
use crate::movegen::{Move, MoveGenerator};
use crate::repetition::RepetitionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate(Color), // Color is the winner
    Stalemate,
    DrawByRepetition,
}

/// Everything needed to play on from a position and to take moves back.
///
/// `apply_move` and `undo_move` are exact inverses: the castling-rights and
/// en-passant stacks hold the value from before each logged move, so undo
/// restores them instead of recomputing them from the board.
#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    pub white_king: u8,
    pub black_king: u8,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<u8>,
    pub move_log: Vec<Move>,
    castling_rights_log: Vec<CastlingRights>,
    en_passant_log: Vec<Option<u8>>,
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub draw_by_repetition: bool,
    repetitions: RepetitionTracker,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_position(Board::new(), Color::White, CastlingRights::all(), None, 4, 60)
    }

    fn with_position(
        board: Board,
        side_to_move: Color,
        castling_rights: CastlingRights,
        en_passant_square: Option<u8>,
        white_king: u8,
        black_king: u8,
    ) -> Self {
        let mut repetitions = RepetitionTracker::new();
        repetitions.record(board.fingerprint());
        Self {
            board,
            side_to_move,
            white_king,
            black_king,
            castling_rights,
            en_passant_square,
            move_log: Vec::new(),
            castling_rights_log: Vec::new(),
            en_passant_log: Vec::new(),
            in_check: false,
            checkmate: false,
            stalemate: false,
            draw_by_repetition: false,
            repetitions,
        }
    }

    /// Set up a position from FEN. The halfmove and fullmove fields are
    /// optional and ignored.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let invalid = || ChessError::InvalidFen(fen.to_string());
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(invalid());
        }

        let board = Board::from_placement_fen(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid()),
        };

        let mut castling_rights = CastlingRights::none();
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => castling_rights.white_kingside = true,
                    'Q' => castling_rights.white_queenside = true,
                    'k' => castling_rights.black_kingside = true,
                    'q' => castling_rights.black_queenside = true,
                    _ => return Err(invalid()),
                }
            }
        }

        let en_passant_square = match fields[3] {
            "-" => None,
            square => Some(parse_square(square).map_err(|_| invalid())?),
        };
        // The target sits behind a pawn the opponent just pushed two squares
        if let Some(target) = en_passant_square {
            let expected_rank = match side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            let pushed = offset(target, -side_to_move.forward(), 0)
                .and_then(|square| board.get_piece_at(square));
            if rank_of(target) != expected_rank || pushed != Some((Piece::Pawn, side_to_move.opposite())) {
                return Err(invalid());
            }
        }

        let king_count = |color: Color| {
            board
                .pieces()
                .filter(|&(_, piece, c)| piece == Piece::King && c == color)
                .count()
        };
        if king_count(Color::White) != 1 || king_count(Color::Black) != 1 {
            return Err(invalid());
        }
        let white_king = board.find_king(Color::White).ok_or_else(invalid)?;
        let black_king = board.find_king(Color::Black).ok_or_else(invalid)?;

        Ok(Self::with_position(
            board,
            side_to_move,
            castling_rights,
            en_passant_square,
            white_king,
            black_king,
        ))
    }

    pub fn to_fen(&self) -> String {
        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let en_passant = self
            .en_passant_square
            .map_or_else(|| "-".to_string(), square_name);
        format!(
            "{} {} {} {} 0 {}",
            self.board.placement_fen(),
            side,
            self.castling_rights,
            en_passant,
            self.move_log.len() / 2 + 1
        )
    }

    pub fn king_square(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    /// Play `mv`, which must come from the latest legal move list.
    pub fn apply_move(&mut self, mv: Move) {
        let color = mv.color;
        self.castling_rights_log.push(self.castling_rights);
        self.en_passant_log.push(self.en_passant_square);

        self.board.set_piece_at(mv.from, None);
        let placed = if mv.is_promotion { Piece::Queen } else { mv.piece };
        self.board.set_piece_at(mv.to, Some((placed, color)));
        if mv.is_en_passant {
            self.board.set_piece_at(mv.captured_square(), None);
        }

        if mv.piece == Piece::King {
            match color {
                Color::White => self.white_king = mv.to,
                Color::Black => self.black_king = mv.to,
            }
        }

        if let Some((rook_from, rook_to)) = mv.castling_rook_squares() {
            let rook = self.board.get_piece_at(rook_from);
            self.board.set_piece_at(rook_from, None);
            self.board.set_piece_at(rook_to, rook);
        }

        let rank_from = rank_of(mv.from);
        let rank_to = rank_of(mv.to);
        self.en_passant_square = if mv.piece == Piece::Pawn && rank_from.abs_diff(rank_to) == 2 {
            Some(make_square((rank_from + rank_to) / 2, file_of(mv.from)))
        } else {
            None
        };

        match mv.piece {
            Piece::King => self.castling_rights.clear_color(color),
            Piece::Rook => self.castling_rights.clear_rook_corner(mv.from),
            _ => {}
        }
        if mv.captured_piece == Some(Piece::Rook) {
            self.castling_rights.clear_rook_corner(mv.to);
        }

        self.side_to_move = color.opposite();
        self.move_log.push(mv);
        self.draw_by_repetition = self.repetitions.record(self.board.fingerprint());
    }

    /// Take back the last applied move. Does nothing when no move was played.
    ///
    /// `checkmate` and `stalemate` are cleared and `draw_by_repetition` is
    /// recomputed for the restored position. `in_check` is left alone; the
    /// next `legal_moves` call refreshes it.
    pub fn undo_move(&mut self) {
        let mv = match self.move_log.pop() {
            Some(mv) => mv,
            None => return,
        };
        let color = mv.color;
        let captured = mv.captured_piece.map(|piece| (piece, color.opposite()));

        self.board.set_piece_at(mv.from, Some((mv.piece, color)));
        if mv.is_en_passant {
            self.board.set_piece_at(mv.to, None);
            self.board.set_piece_at(mv.captured_square(), captured);
        } else {
            self.board.set_piece_at(mv.to, captured);
        }

        if mv.piece == Piece::King {
            match color {
                Color::White => self.white_king = mv.from,
                Color::Black => self.black_king = mv.from,
            }
        }

        if let Some((rook_from, rook_to)) = mv.castling_rook_squares() {
            let rook = self.board.get_piece_at(rook_to);
            self.board.set_piece_at(rook_to, None);
            self.board.set_piece_at(rook_from, rook);
        }

        if let Some(rights) = self.castling_rights_log.pop() {
            self.castling_rights = rights;
        }
        if let Some(en_passant) = self.en_passant_log.pop() {
            self.en_passant_square = en_passant;
        }

        self.side_to_move = color;
        self.checkmate = false;
        self.stalemate = false;
        self.repetitions.forget();
        self.draw_by_repetition = self.repetitions.current_is_draw();
    }

    /// Parse `e2e4`-style text (a trailing `q` is accepted) and find the
    /// matching legal move.
    pub fn find_legal_move(&mut self, text: &str) -> Result<Move, ChessError> {
        let (from, to) = parse_move_text(text)?;
        MoveGenerator::new()
            .legal_moves(self)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to)
            .ok_or_else(|| ChessError::IllegalMove(text.to_string()))
    }

    /// Validate and apply a move given as text.
    pub fn play(&mut self, text: &str) -> Result<Move, ChessError> {
        let mv = self.find_legal_move(text)?;
        self.apply_move(mv);
        Ok(mv)
    }

    pub fn status(&self) -> GameStatus {
        if self.checkmate {
            GameStatus::Checkmate(self.side_to_move.opposite())
        } else if self.stalemate {
            GameStatus::Stalemate
        } else if self.draw_by_repetition {
            GameStatus::DrawByRepetition
        } else {
            GameStatus::Ongoing
        }
    }

    /// How many times the current placement has been reached.
    pub fn placement_occurrences(&self) -> u32 {
        self.repetitions.occurrences(self.board.fingerprint())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_move_text(text: &str) -> Result<(u8, u8), ChessError> {
    let invalid = || ChessError::InvalidMoveText(text.to_string());
    let squares = match text.len() {
        4 => text,
        5 if text.ends_with('q') => &text[..4],
        _ => return Err(invalid()),
    };
    if !squares.is_ascii() {
        return Err(invalid());
    }
    let from = parse_square(&squares[..2]).map_err(|_| invalid())?;
    let to = parse_square(&squares[2..]).map_err(|_| invalid())?;
    Ok((from, to))
}
