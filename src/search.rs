use std::cmp::Reverse;

use rand::seq::SliceRandom;

use crate::board::{Color, Piece};
use crate::evaluation::{Evaluator, CHECKMATE};
use crate::game::GameState;
use crate::movegen::{Move, MoveGenerator};

pub const DEFAULT_DEPTH: u32 = 4;

/// Bound wider than any reachable score, mates included.
const INFINITY: i32 = CHECKMATE + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub depth: u32,
    /// Alpha-beta cutoffs. Without them the search visits the full tree.
    pub pruning: bool,
    /// Shuffle root moves before ordering so equal lines vary between games.
    pub shuffle_root: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            pruning: true,
            shuffle_root: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Score from the point of view of the side to move at the root.
    pub score: i32,
    pub nodes: u64,
}

#[derive(Debug, Default)]
struct SearchContext {
    nodes: u64,
}

/// Fixed-depth negamax over a single shared `GameState`.
///
/// Every node applies a move, recurses and undoes it before trying the next
/// one, so each call returns with the state exactly as it found it.
pub struct Search {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    config: SearchConfig,
}

impl Search {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.config.depth = depth;
    }

    pub fn set_pruning(&mut self, pruning: bool) {
        self.config.pruning = pruning;
    }

    pub fn set_shuffle_root(&mut self, shuffle_root: bool) {
        self.config.shuffle_root = shuffle_root;
    }

    /// Pick a move for the side to move. Falls back to a random legal move if
    /// the search comes back empty; `None` only when `legal_moves` is empty.
    pub fn select_move(&self, state: &mut GameState, legal_moves: &[Move]) -> Option<Move> {
        self.find_best_move(state, legal_moves)
            .best_move
            .or_else(|| legal_moves.choose(&mut rand::thread_rng()).copied())
    }

    pub fn find_best_move(&self, state: &mut GameState, legal_moves: &[Move]) -> SearchResult {
        let sign = match state.side_to_move {
            Color::White => 1,
            Color::Black => -1,
        };
        if legal_moves.is_empty() {
            return SearchResult {
                best_move: None,
                score: sign * self.evaluator.evaluate(state),
                nodes: 0,
            };
        }

        let mut moves = legal_moves.to_vec();
        if self.config.shuffle_root {
            moves.shuffle(&mut rand::thread_rng());
        }
        self.order_moves(&mut moves);

        // Child nodes overwrite these while generating their own replies.
        let root_flags = (state.in_check, state.checkmate, state.stalemate);

        let depth = self.config.depth.max(1);
        let mut ctx = SearchContext::default();
        let mut best_move = None;
        let mut best_score = -INFINITY;
        let mut alpha = -INFINITY;
        let beta = INFINITY;

        for mv in moves {
            state.apply_move(mv);
            let replies = self.move_generator.legal_moves(state);
            let score = -self.negamax(&mut ctx, state, replies, depth - 1, -beta, -alpha, -sign);
            state.undo_move();

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if self.config.pruning {
                alpha = alpha.max(best_score);
                if alpha >= beta {
                    break;
                }
            }
        }

        (state.in_check, state.checkmate, state.stalemate) = root_flags;

        SearchResult {
            best_move,
            score: best_score,
            nodes: ctx.nodes,
        }
    }

    /// `moves` must be the legal moves of `state`, generated right before the
    /// call so the terminal flags describe this node.
    fn negamax(
        &self,
        ctx: &mut SearchContext,
        state: &mut GameState,
        mut moves: Vec<Move>,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        sign: i32,
    ) -> i32 {
        ctx.nodes += 1;

        if depth == 0 || moves.is_empty() || state.draw_by_repetition {
            return sign * self.evaluator.evaluate(state);
        }

        self.order_moves(&mut moves);

        let mut best_score = -INFINITY;
        for mv in moves {
            state.apply_move(mv);
            let replies = self.move_generator.legal_moves(state);
            let score = -self.negamax(ctx, state, replies, depth - 1, -beta, -alpha, -sign);
            state.undo_move();

            best_score = best_score.max(score);
            if self.config.pruning {
                alpha = alpha.max(best_score);
                if alpha >= beta {
                    break;
                }
            }
        }

        best_score
    }

    /// Captures first, most valuable victim first, then queen promotions.
    /// The sort is stable so generation order breaks ties.
    fn order_moves(&self, moves: &mut [Move]) {
        moves.sort_by_key(|mv| Reverse(self.ordering_score(mv)));
    }

    fn ordering_score(&self, mv: &Move) -> i32 {
        match mv.captured_piece {
            Some(victim) => CHECKMATE + self.evaluator.get_piece_value(victim),
            None if mv.is_promotion => self.evaluator.get_piece_value(Piece::Queen),
            None => 0,
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}
