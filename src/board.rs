use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::ChessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Lowercase FEN letter.
    pub fn letter(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank delta of a pawn advance.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn home_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_start_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }
}

pub fn rank_of(square: u8) -> u8 {
    square / 8
}

pub fn file_of(square: u8) -> u8 {
    square % 8
}

pub fn make_square(rank: u8, file: u8) -> u8 {
    rank * 8 + file
}

/// Square reached by stepping `(dr, df)` from `square`, if still on the board.
pub fn offset(square: u8, dr: i8, df: i8) -> Option<u8> {
    let rank = rank_of(square) as i8 + dr;
    let file = file_of(square) as i8 + df;
    if (0..8).contains(&rank) && (0..8).contains(&file) {
        Some(make_square(rank as u8, file as u8))
    } else {
        None
    }
}

pub fn square_name(square: u8) -> String {
    let mut name = String::with_capacity(2);
    name.push((b'a' + file_of(square)) as char);
    name.push((b'1' + rank_of(square)) as char);
    name
}

pub fn parse_square(text: &str) -> Result<u8, ChessError> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(text.to_string()));
    }
    let file = bytes[0].wrapping_sub(b'a');
    let rank = bytes[1].wrapping_sub(b'1');
    if file > 7 || rank > 7 {
        return Err(ChessError::InvalidSquare(text.to_string()));
    }
    Ok(make_square(rank, file))
}

/// Which castles are still available. Rights are only ever cleared by play;
/// undo restores earlier snapshots wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn clear_color(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Clear the right tied to a rook's home corner, if `square` is one.
    pub fn clear_rook_corner(&mut self, square: u8) {
        match square {
            0 => self.white_queenside = false,
            7 => self.white_kingside = false,
            56 => self.black_queenside = false,
            63 => self.black_kingside = false,
            _ => {}
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut text = String::new();
        if self.white_kingside {
            text.push('K');
        }
        if self.white_queenside {
            text.push('Q');
        }
        if self.black_kingside {
            text.push('k');
        }
        if self.black_queenside {
            text.push('q');
        }
        if text.is_empty() {
            text.push('-');
        }
        write!(f, "{}", text)
    }
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

/// 8x8 grid of square contents, a1 = 0 through h8 = 63.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<(Piece, Color)>; 64],
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        for file in 0..8 {
            board.set_piece_at(make_square(0, file), Some((BACK_RANK[file as usize], Color::White)));
            board.set_piece_at(make_square(1, file), Some((Piece::Pawn, Color::White)));
            board.set_piece_at(make_square(6, file), Some((Piece::Pawn, Color::Black)));
            board.set_piece_at(make_square(7, file), Some((BACK_RANK[file as usize], Color::Black)));
        }
        board
    }

    pub fn empty() -> Self {
        Self { squares: [None; 64] }
    }

    pub fn get_piece_at(&self, square: u8) -> Option<(Piece, Color)> {
        self.squares[square as usize]
    }

    pub fn set_piece_at(&mut self, square: u8, content: Option<(Piece, Color)>) {
        self.squares[square as usize] = content;
    }

    pub fn is_empty(&self, square: u8) -> bool {
        self.squares[square as usize].is_none()
    }

    pub fn color_at(&self, square: u8) -> Option<Color> {
        self.squares[square as usize].map(|(_, color)| color)
    }

    /// Occupied squares with their contents, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (u8, Piece, Color)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(sq, content)| content.map(|(piece, color)| (sq as u8, piece, color)))
    }

    pub fn find_king(&self, color: Color) -> Option<u8> {
        self.pieces()
            .find(|&(_, piece, c)| piece == Piece::King && c == color)
            .map(|(sq, _, _)| sq)
    }

    /// 64-bit key of the piece placement, used to count repeated positions.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.squares.hash(&mut hasher);
        hasher.finish()
    }

    /// Piece placement in FEN form: ranks 8 to 1, runs of empty squares as digits.
    pub fn placement_fen(&self) -> String {
        let mut fen = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                match self.get_piece_at(make_square(rank, file)) {
                    Some((piece, color)) => {
                        if empty_run > 0 {
                            fen.push(char::from(b'0' + empty_run));
                            empty_run = 0;
                        }
                        let letter = piece.letter();
                        fen.push(if color == Color::White {
                            letter.to_ascii_uppercase()
                        } else {
                            letter
                        });
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push(char::from(b'0' + empty_run));
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }

    pub fn from_placement_fen(placement: &str) -> Result<Self, ChessError> {
        let invalid = || ChessError::InvalidFen(placement.to_string());
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(invalid());
        }

        let mut board = Board::empty();
        for (i, row) in rows.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(run) = c.to_digit(10) {
                    if run == 0 || run > 8 {
                        return Err(invalid());
                    }
                    file += run as u8;
                } else {
                    let content = Piece::from_letter(c).ok_or_else(invalid)?;
                    if file > 7 {
                        return Err(invalid());
                    }
                    board.set_piece_at(make_square(rank, file), Some(content));
                    file += 1;
                }
                if file > 8 {
                    return Err(invalid());
                }
            }
            if file != 8 {
                return Err(invalid());
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for rank in (0..8).rev() {
            result.push((b'1' + rank) as char);
            result.push(' ');
            for file in 0..8 {
                let symbol = match self.get_piece_at(make_square(rank, file)) {
                    Some((piece, Color::White)) => piece.letter().to_ascii_uppercase(),
                    Some((piece, Color::Black)) => piece.letter(),
                    None => '.',
                };
                result.push(symbol);
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h\n");
        write!(f, "{}", result)
    }
}
