use std::fmt;

use crate::board::{file_of, make_square, offset, rank_of, square_name, Board, Color, Piece};
use crate::game::GameState;

/// A move with the moved and captured pieces frozen from the board it was built on.
///
/// Equality only compares origin and destination.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub piece: Piece,
    pub color: Color,
    pub captured_piece: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
    pub is_promotion: bool,
}

impl Move {
    /// Build a move by reading the origin and destination squares of `board`.
    /// Returns `None` when the origin is empty.
    pub fn new(from: u8, to: u8, board: &Board) -> Option<Self> {
        let (piece, color) = board.get_piece_at(from)?;
        Some(Self::with_mover(from, to, piece, color, board))
    }

    fn with_mover(from: u8, to: u8, piece: Piece, color: Color, board: &Board) -> Self {
        let back_rank = color.opposite().home_rank();
        Self {
            from,
            to,
            piece,
            color,
            captured_piece: board.get_piece_at(to).map(|(captured, _)| captured),
            is_en_passant: false,
            is_castling: false,
            is_promotion: piece == Piece::Pawn && rank_of(to) == back_rank,
        }
    }

    /// Pawn capture onto the en-passant target. The captured pawn is read from
    /// beside the origin, not from the destination.
    pub fn new_en_passant(from: u8, to: u8, board: &Board) -> Option<Self> {
        let (piece, color) = board.get_piece_at(from)?;
        let mut mv = Self::with_mover(from, to, piece, color, board);
        mv.is_en_passant = true;
        mv.captured_piece = board
            .get_piece_at(make_square(rank_of(from), file_of(to)))
            .map(|(captured, _)| captured);
        Some(mv)
    }

    pub fn new_castling(from: u8, to: u8, board: &Board) -> Option<Self> {
        let mut mv = Self::new(from, to, board)?;
        mv.is_castling = true;
        Some(mv)
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    /// Square the captured piece actually stood on.
    pub fn captured_square(&self) -> u8 {
        if self.is_en_passant {
            make_square(rank_of(self.from), file_of(self.to))
        } else {
            self.to
        }
    }

    /// Rook origin and destination for a castling move.
    pub fn castling_rook_squares(&self) -> Option<(u8, u8)> {
        if !self.is_castling {
            return None;
        }
        if self.to > self.from {
            Some((self.to + 1, self.to - 1))
        } else {
            Some((self.to - 2, self.to + 1))
        }
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))
    }
}

/// Own piece that may only move along `direction` (or its negation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub square: u8,
    pub direction: (i8, i8),
}

/// Enemy piece giving check, with the step that leads from the king towards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub square: u8,
    pub direction: (i8, i8),
}

#[derive(Debug, Clone, Default)]
pub struct PinsAndChecks {
    pub in_check: bool,
    pub pins: Vec<Pin>,
    pub checks: Vec<Check>,
}

impl PinsAndChecks {
    pub fn pin_direction(&self, square: u8) -> Option<(i8, i8)> {
        self.pins
            .iter()
            .find(|pin| pin.square == square)
            .map(|pin| pin.direction)
    }
}

const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Squares along a ray from `from` (exclusive), paired with their distance.
fn ray(from: u8, direction: (i8, i8)) -> impl Iterator<Item = (u8, u8)> {
    std::iter::successors(offset(from, direction.0, direction.1), move |&square| {
        offset(square, direction.0, direction.1)
    })
    .zip(1u8..)
}

/// Whether `piece` of `attacker` color, found `distance` steps away along
/// `direction`, attacks the ray's origin.
fn attacks_along_ray(piece: Piece, attacker: Color, direction: (i8, i8), distance: u8) -> bool {
    let diagonal = direction.0 != 0 && direction.1 != 0;
    match piece {
        Piece::Queen => true,
        Piece::Rook => !diagonal,
        Piece::Bishop => diagonal,
        Piece::King => distance == 1,
        // A pawn strikes towards its own forward rank, so it sits one rank behind
        // the square it attacks.
        Piece::Pawn => distance == 1 && diagonal && direction.0 == -attacker.forward(),
        Piece::Knight => false,
    }
}

fn pin_allows(pin: Option<(i8, i8)>, direction: (i8, i8)) -> bool {
    match pin {
        None => true,
        Some(axis) => axis == direction || axis == (-direction.0, -direction.1),
    }
}

#[derive(Default)]
struct MoveLists {
    captures: Vec<Move>,
    quiets: Vec<Move>,
}

impl MoveLists {
    fn push(&mut self, mv: Move) {
        if mv.is_capture() {
            self.captures.push(mv);
        } else {
            self.quiets.push(mv);
        }
    }

    fn retain(&mut self, keep: impl Fn(&Move) -> bool) {
        self.captures.retain(&keep);
        self.quiets.retain(&keep);
    }

    fn into_ordered(mut self) -> Vec<Move> {
        self.captures.append(&mut self.quiets);
        self.captures
    }
}

struct GenContext<'a> {
    state: &'a GameState,
    color: Color,
    info: &'a PinsAndChecks,
}

type PieceRule = fn(&MoveGenerator, &GenContext, u8, &mut MoveLists);

/// Per-kind generation rules, indexed by `Piece as usize`.
const PIECE_RULES: [PieceRule; 6] = [
    MoveGenerator::pawn_moves,
    MoveGenerator::knight_moves,
    MoveGenerator::bishop_moves,
    MoveGenerator::rook_moves,
    MoveGenerator::queen_moves,
    MoveGenerator::king_moves,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Legal moves for the side to move, captures first. Also refreshes the
    /// state's `in_check`, `checkmate` and `stalemate` flags.
    pub fn legal_moves(&self, state: &mut GameState) -> Vec<Move> {
        let (moves, in_check) = self.generate_legal(state);
        state.in_check = in_check;
        state.checkmate = moves.is_empty() && in_check;
        state.stalemate = moves.is_empty() && !in_check;
        moves
    }

    /// Legal moves plus whether the side to move is in check, without touching
    /// the state.
    pub fn generate_legal(&self, state: &GameState) -> (Vec<Move>, bool) {
        let color = state.side_to_move;
        let king = state.king_square(color);
        let info = self.pins_and_checks(&state.board, king, color);
        let ctx = GenContext {
            state,
            color,
            info: &info,
        };
        let mut lists = MoveLists::default();

        match info.checks.as_slice() {
            [] => {
                self.collect_pseudo_legal(&ctx, &mut lists);
                self.castling_moves(&ctx, king, &mut lists);
            }
            [check] => {
                self.collect_pseudo_legal(&ctx, &mut lists);
                let targets = self.check_targets(&state.board, king, check);
                lists.retain(|mv| {
                    mv.piece == Piece::King
                        || targets.contains(&mv.to)
                        || (mv.is_en_passant && mv.captured_square() == check.square)
                });
            }
            _ => self.king_moves(&ctx, king, &mut lists),
        }

        (lists.into_ordered(), info.in_check)
    }

    /// Moves obeying each piece's movement rule, ignoring pins and checks.
    /// King steps onto attacked squares are still excluded.
    pub fn pseudo_legal_moves(&self, state: &GameState) -> Vec<Move> {
        let unpinned = PinsAndChecks::default();
        let ctx = GenContext {
            state,
            color: state.side_to_move,
            info: &unpinned,
        };
        let mut lists = MoveLists::default();
        self.collect_pseudo_legal(&ctx, &mut lists);
        lists.into_ordered()
    }

    fn collect_pseudo_legal(&self, ctx: &GenContext, out: &mut MoveLists) {
        for (square, piece, color) in ctx.state.board.pieces() {
            if color == ctx.color {
                PIECE_RULES[piece as usize](self, ctx, square, out);
            }
        }
    }

    /// Squares a non-king move may land on to answer a single check.
    fn check_targets(&self, board: &Board, king: u8, check: &Check) -> Vec<u8> {
        if matches!(board.get_piece_at(check.square), Some((Piece::Knight, _))) {
            return vec![check.square];
        }
        let mut targets = Vec::new();
        for (square, _) in ray(king, check.direction) {
            targets.push(square);
            if square == check.square {
                break;
            }
        }
        targets
    }

    /// Cast rays and knight jumps out from the king of `ally` to find the
    /// pieces pinned against it and the enemy pieces checking it.
    pub fn pins_and_checks(&self, board: &Board, king: u8, ally: Color) -> PinsAndChecks {
        let enemy = ally.opposite();
        let mut result = PinsAndChecks::default();

        for &direction in ALL_DIRECTIONS.iter() {
            let mut candidate: Option<u8> = None;
            for (square, distance) in ray(king, direction) {
                match board.get_piece_at(square) {
                    None => {}
                    Some((_, color)) if color == ally => {
                        if candidate.is_some() {
                            break;
                        }
                        candidate = Some(square);
                    }
                    Some((piece, _)) => {
                        if attacks_along_ray(piece, enemy, direction, distance) {
                            match candidate {
                                None => {
                                    result.in_check = true;
                                    result.checks.push(Check { square, direction });
                                }
                                Some(pinned) => result.pins.push(Pin {
                                    square: pinned,
                                    direction,
                                }),
                            }
                        }
                        break;
                    }
                }
            }
        }

        for &(dr, df) in KNIGHT_OFFSETS.iter() {
            if let Some(square) = offset(king, dr, df) {
                if board.get_piece_at(square) == Some((Piece::Knight, enemy)) {
                    result.in_check = true;
                    result.checks.push(Check {
                        square,
                        direction: (dr, df),
                    });
                }
            }
        }

        result
    }

    /// Whether `square` is attacked by the enemies of `ally`. `transparent`
    /// names a square to treat as empty, normally the king that is moving.
    pub fn is_square_under_attack(
        &self,
        board: &Board,
        square: u8,
        ally: Color,
        transparent: Option<u8>,
    ) -> bool {
        let enemy = ally.opposite();
        for &direction in ALL_DIRECTIONS.iter() {
            for (target, distance) in ray(square, direction) {
                if Some(target) == transparent {
                    continue;
                }
                if let Some((piece, color)) = board.get_piece_at(target) {
                    if color == enemy && attacks_along_ray(piece, enemy, direction, distance) {
                        return true;
                    }
                    break;
                }
            }
        }
        KNIGHT_OFFSETS.iter().any(|&(dr, df)| {
            offset(square, dr, df)
                .map_or(false, |target| board.get_piece_at(target) == Some((Piece::Knight, enemy)))
        })
    }

    pub fn is_king_in_check(&self, state: &GameState, color: Color) -> bool {
        self.is_square_under_attack(&state.board, state.king_square(color), color, None)
    }

    fn pawn_moves(&self, ctx: &GenContext, from: u8, out: &mut MoveLists) {
        let board = &ctx.state.board;
        let color = ctx.color;
        let forward = color.forward();
        let pin = ctx.info.pin_direction(from);

        if let Some(one) = offset(from, forward, 0) {
            if board.is_empty(one) && pin_allows(pin, (forward, 0)) {
                out.push(Move::with_mover(from, one, Piece::Pawn, color, board));
                if rank_of(from) == color.pawn_start_rank() {
                    if let Some(two) = offset(one, forward, 0) {
                        if board.is_empty(two) {
                            out.push(Move::with_mover(from, two, Piece::Pawn, color, board));
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let direction = (forward, df);
            let target = match offset(from, forward, df) {
                Some(target) => target,
                None => continue,
            };
            if !pin_allows(pin, direction) {
                continue;
            }
            match board.color_at(target) {
                Some(occupant) if occupant != color => {
                    out.push(Move::with_mover(from, target, Piece::Pawn, color, board));
                }
                None if ctx.state.en_passant_square == Some(target) => {
                    if let Some(mv) = Move::new_en_passant(from, target, board) {
                        let victim = board.get_piece_at(mv.captured_square());
                        if victim == Some((Piece::Pawn, color.opposite()))
                            && self.en_passant_is_safe(ctx.state, &mv)
                        {
                            out.push(mv);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// En passant empties two squares on the capturing rank at once, which pin
    /// detection cannot see. Play it out on a scratch board and look for an
    /// attack on the king.
    fn en_passant_is_safe(&self, state: &GameState, mv: &Move) -> bool {
        let mut board = state.board.clone();
        board.set_piece_at(mv.captured_square(), None);
        board.set_piece_at(mv.from, None);
        board.set_piece_at(mv.to, Some((mv.piece, mv.color)));
        let king = state.king_square(mv.color);
        !self.is_square_under_attack(&board, king, mv.color, None)
    }

    fn knight_moves(&self, ctx: &GenContext, from: u8, out: &mut MoveLists) {
        if ctx.info.pin_direction(from).is_some() {
            return;
        }
        let board = &ctx.state.board;
        for &(dr, df) in KNIGHT_OFFSETS.iter() {
            if let Some(target) = offset(from, dr, df) {
                if board.color_at(target) != Some(ctx.color) {
                    out.push(Move::with_mover(from, target, Piece::Knight, ctx.color, board));
                }
            }
        }
    }

    fn bishop_moves(&self, ctx: &GenContext, from: u8, out: &mut MoveLists) {
        self.slide(ctx, from, Piece::Bishop, &DIAGONALS, out);
    }

    fn rook_moves(&self, ctx: &GenContext, from: u8, out: &mut MoveLists) {
        self.slide(ctx, from, Piece::Rook, &ORTHOGONALS, out);
    }

    fn queen_moves(&self, ctx: &GenContext, from: u8, out: &mut MoveLists) {
        self.slide(ctx, from, Piece::Queen, &ALL_DIRECTIONS, out);
    }

    fn slide(
        &self,
        ctx: &GenContext,
        from: u8,
        piece: Piece,
        directions: &[(i8, i8)],
        out: &mut MoveLists,
    ) {
        let board = &ctx.state.board;
        let pin = ctx.info.pin_direction(from);
        for &direction in directions {
            if !pin_allows(pin, direction) {
                continue;
            }
            for (target, _) in ray(from, direction) {
                match board.color_at(target) {
                    None => out.push(Move::with_mover(from, target, piece, ctx.color, board)),
                    Some(occupant) => {
                        if occupant != ctx.color {
                            out.push(Move::with_mover(from, target, piece, ctx.color, board));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn king_moves(&self, ctx: &GenContext, from: u8, out: &mut MoveLists) {
        let board = &ctx.state.board;
        for &(dr, df) in ALL_DIRECTIONS.iter() {
            if let Some(target) = offset(from, dr, df) {
                if board.color_at(target) == Some(ctx.color) {
                    continue;
                }
                if !self.is_square_under_attack(board, target, ctx.color, Some(from)) {
                    out.push(Move::with_mover(from, target, Piece::King, ctx.color, board));
                }
            }
        }
    }

    /// Only called when the king is not in check.
    fn castling_moves(&self, ctx: &GenContext, king: u8, out: &mut MoveLists) {
        let color = ctx.color;
        let rights = ctx.state.castling_rights;
        if king != make_square(color.home_rank(), 4) {
            return;
        }
        if rights.kingside(color) && self.can_castle(ctx, king, 1, 3) {
            if let Some(mv) = Move::new_castling(king, king + 2, &ctx.state.board) {
                out.push(mv);
            }
        }
        if rights.queenside(color) && self.can_castle(ctx, king, -1, 4) {
            if let Some(mv) = Move::new_castling(king, king - 2, &ctx.state.board) {
                out.push(mv);
            }
        }
    }

    /// The rook must be home, everything between king and rook empty, and the
    /// two squares the king crosses unattacked.
    fn can_castle(&self, ctx: &GenContext, king: u8, step: i8, rook_distance: i8) -> bool {
        let board = &ctx.state.board;
        let rook_home = match offset(king, 0, step * rook_distance) {
            Some(square) => square,
            None => return false,
        };
        if board.get_piece_at(rook_home) != Some((Piece::Rook, ctx.color)) {
            return false;
        }
        let path_empty = (1..rook_distance)
            .filter_map(|i| offset(king, 0, step * i))
            .all(|square| board.is_empty(square));
        if !path_empty {
            return false;
        }
        (1..=2)
            .filter_map(|i| offset(king, 0, step * i))
            .all(|square| !self.is_square_under_attack(board, square, ctx.color, Some(king)))
    }

    /// Count leaf nodes of the legal move tree, applying and undoing on `state`.
    pub fn perft(&self, state: &mut GameState, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves(state);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in moves {
            state.apply_move(mv);
            nodes += self.perft(state, depth - 1);
            state.undo_move();
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::parse_square;

    fn sq(name: &str) -> u8 {
        parse_square(name).unwrap()
    }

    fn legal(fen: &str) -> Vec<Move> {
        let mut state = GameState::from_fen(fen).unwrap();
        MoveGenerator::new().legal_moves(&mut state)
    }

    fn contains(moves: &[Move], text: &str) -> bool {
        moves.iter().any(|mv| mv.to_string() == text)
    }

    #[test]
    fn test_move_equality_ignores_payload() {
        let board = Board::new();
        let a = Move::new(sq("e2"), sq("e4"), &board).unwrap();
        let mut b = a;
        b.is_promotion = true;
        b.captured_piece = Some(Piece::Queen);
        assert_eq!(a, b);
        assert_ne!(a, Move::new(sq("e2"), sq("e3"), &board).unwrap());
        assert_eq!(a.to_string(), "e2e4");
    }

    #[test]
    fn test_move_freezes_captured_piece() {
        let mut board = Board::new();
        let mv = Move::new(sq("d1"), sq("d7"), &board).unwrap();
        assert_eq!(mv.piece, Piece::Queen);
        assert_eq!(mv.captured_piece, Some(Piece::Pawn));
        board.set_piece_at(sq("d7"), None);
        assert_eq!(mv.captured_piece, Some(Piece::Pawn));
        assert!(Move::new(sq("e4"), sq("e5"), &board).is_none());
    }

    #[test]
    fn test_captures_come_first() {
        let moves = legal("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(moves[0].to_string(), "e4d5");
        assert!(moves[1..].iter().all(|mv| !mv.is_capture()));
    }

    #[test]
    fn test_pinned_bishop_cannot_move() {
        let moves = legal("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        assert!(moves.iter().all(|mv| mv.piece == Piece::King));
    }

    #[test]
    fn test_pinned_rook_slides_along_pin() {
        let moves = legal("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        let rook_moves: Vec<String> = moves
            .iter()
            .filter(|mv| mv.piece == Piece::Rook)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(rook_moves.len(), 5);
        assert!(rook_moves.contains(&"e2e7".to_string()));
        assert!(rook_moves.iter().all(|text| text.starts_with("e2e")));
    }

    #[test]
    fn test_pinned_pawn_captures_pinner() {
        let moves = legal("4k3/8/8/8/8/2b5/3P4/4K3 w - - 0 1");
        let pawn_moves: Vec<String> = moves
            .iter()
            .filter(|mv| mv.piece == Piece::Pawn)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(pawn_moves, vec!["d2c3".to_string()]);
    }

    #[test]
    fn test_single_check_must_be_answered() {
        let moves = legal("4k3/8/8/8/8/8/1R6/r3K3 w - - 0 1");
        let others: Vec<String> = moves
            .iter()
            .filter(|mv| mv.piece != Piece::King)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(others, vec!["b2b1".to_string()]);
        assert!(contains(&moves, "e1e2"));
        assert!(!contains(&moves, "e1f1"));
        assert!(!contains(&moves, "e1d1"));
    }

    #[test]
    fn test_knight_check_only_capture_or_king() {
        let moves = legal("4k3/8/8/8/8/3n4/8/R3K3 w - - 0 1");
        let others: Vec<String> = moves
            .iter()
            .filter(|mv| mv.piece != Piece::King)
            .map(|mv| mv.to_string())
            .collect();
        assert!(others.is_empty());

        let moves = legal("4k3/8/8/8/8/3n4/8/3RK3 w - - 0 1");
        let others: Vec<String> = moves
            .iter()
            .filter(|mv| mv.piece != Piece::King)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(others, vec!["d1d3".to_string()]);
    }

    #[test]
    fn test_double_check_only_king_moves() {
        let mut state = GameState::from_fen("4k3/8/8/8/8/5n2/3Q4/r3K3 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        let info = generator.pins_and_checks(&state.board, sq("e1"), Color::White);
        assert_eq!(info.checks.len(), 2);
        let moves = generator.legal_moves(&mut state);
        assert!(moves.iter().all(|mv| mv.piece == Piece::King));
        let mut names: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["e1e2".to_string(), "e1f2".to_string()]);
    }

    #[test]
    fn test_king_cannot_hide_behind_itself() {
        let generator = MoveGenerator::new();
        let board = Board::from_placement_fen("4k3/8/8/8/8/8/8/r3K3").unwrap();
        assert!(!generator.is_square_under_attack(&board, sq("f1"), Color::White, None));
        assert!(generator.is_square_under_attack(&board, sq("f1"), Color::White, Some(sq("e1"))));
    }

    #[test]
    fn test_pawn_attacks_by_direction() {
        let generator = MoveGenerator::new();
        let board = Board::from_placement_fen("4k3/8/8/3p4/8/8/8/4K3").unwrap();
        assert!(generator.is_square_under_attack(&board, sq("e4"), Color::White, None));
        assert!(generator.is_square_under_attack(&board, sq("c4"), Color::White, None));
        assert!(!generator.is_square_under_attack(&board, sq("e6"), Color::White, None));
        assert!(!generator.is_square_under_attack(&board, sq("d4"), Color::White, None));
    }

    #[test]
    fn test_en_passant_generated() {
        let moves = legal("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let ep = moves.iter().find(|mv| mv.is_en_passant).unwrap();
        assert_eq!(ep.to_string(), "e5d6");
        assert_eq!(ep.captured_piece, Some(Piece::Pawn));
        assert_eq!(ep.captured_square(), sq("d5"));
    }

    #[test]
    fn test_en_passant_never_takes_own_pawn() {
        let mut state = GameState::from_fen("4k3/8/8/8/3PP3/8/8/4K3 w - - 0 1").unwrap();
        state.en_passant_square = Some(sq("d5"));
        let moves = MoveGenerator::new().legal_moves(&mut state);
        assert!(moves.iter().all(|mv| !mv.is_en_passant));
        assert!(!contains(&moves, "e4d5"));
    }

    #[test]
    fn test_en_passant_exposing_king_rejected() {
        let moves = legal("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1");
        assert!(!contains(&moves, "b5c6"));
        assert!(moves.iter().all(|mv| !mv.is_en_passant));
    }

    #[test]
    fn test_en_passant_removes_checking_pawn() {
        let moves = legal("8/8/8/4k3/3Pp3/8/8/4K3 b - d3 0 1");
        let ep = moves.iter().find(|mv| mv.to_string() == "e4d3").unwrap();
        assert!(ep.is_en_passant);
    }

    #[test]
    fn test_castling_both_sides() {
        let moves = legal("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let castles: Vec<String> = moves
            .iter()
            .filter(|mv| mv.is_castling)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.contains(&"e1g1".to_string()));
        assert!(castles.contains(&"e1c1".to_string()));
    }

    #[test]
    fn test_castling_through_attack_refused() {
        let moves = legal("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!contains(&moves, "e1g1"));
        assert!(contains(&moves, "e1c1"));
    }

    #[test]
    fn test_queenside_castle_ignores_attack_on_b_file() {
        let moves = legal("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(contains(&moves, "e1c1"));
    }

    #[test]
    fn test_no_castling_out_of_check_or_without_right() {
        let moves = legal("4k3/8/8/8/8/8/8/R3K2r w Q - 0 1");
        assert!(moves.iter().all(|mv| !mv.is_castling));
        let moves = legal("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(moves.iter().all(|mv| !mv.is_castling));
        let moves = legal("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
        assert!(!contains(&moves, "e1c1"));
        assert!(contains(&moves, "e1g1"));
    }

    #[test]
    fn test_promotion_flagged_once() {
        let moves = legal("1n5k/P7/8/8/8/8/8/K7 w - - 0 1");
        let promotions: Vec<String> = moves
            .iter()
            .filter(|mv| mv.is_promotion)
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(promotions.len(), 2);
        assert!(promotions.contains(&"a7a8".to_string()));
        assert!(promotions.contains(&"a7b8".to_string()));
    }

    #[test]
    fn test_pseudo_legal_ignores_pins() {
        let state = GameState::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        let pseudo = generator.pseudo_legal_moves(&state);
        assert!(pseudo.iter().any(|mv| mv.piece == Piece::Bishop));
        let (legal, in_check) = generator.generate_legal(&state);
        assert!(!in_check);
        assert!(legal.iter().all(|mv| mv.piece != Piece::Bishop));
    }

    #[test]
    fn test_perft_start_position() {
        let mut state = GameState::new();
        let generator = MoveGenerator::new();
        assert_eq!(generator.perft(&mut state, 1), 20);
        assert_eq!(generator.perft(&mut state, 2), 400);
        assert_eq!(generator.perft(&mut state, 3), 8902);
        assert_eq!(state.board, Board::new());
        assert!(state.move_log.is_empty());
    }

    #[test]
    fn test_perft_kiwipete() {
        let mut state = GameState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let generator = MoveGenerator::new();
        assert_eq!(generator.perft(&mut state, 1), 48);
        assert_eq!(generator.perft(&mut state, 2), 2039);
    }

    #[test]
    fn test_perft_rook_endgame() {
        let mut state = GameState::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert_eq!(generator.perft(&mut state, 1), 14);
        assert_eq!(generator.perft(&mut state, 2), 191);
        assert_eq!(generator.perft(&mut state, 3), 2812);
    }
}
