/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use chessie::Move;

use crate::{order_moves, Chessboard, Evaluator, Score};

/// Depth searched when none is specified.
pub const DEFAULT_DEPTH: usize = 4;

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, from the root side-to-move's perspective.
    pub score: Score,

    /// Depth the search was run at.
    pub depth: usize,

    /// Wall-clock time the search took.
    pub elapsed: Duration,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Depth, in plies, of the full-width part of the search.
    pub depth: usize,

    /// Whether to apply [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta) in the full-width search.
    ///
    /// Disabling it yields a full-width search with the same result, but many more nodes.
    /// Quiescence is unaffected.
    pub pruning: bool,
}

impl SearchConfig {
    /// A default config that searches to `depth`.
    #[inline(always)]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            pruning: true,
        }
    }
}

/// Executes a fixed-depth search on a position.
///
/// Every move applied during the search is taken back before the search returns,
/// so the board is left exactly as it was given.
#[derive(Debug)]
pub struct Search<'a> {
    /// Static evaluation used at the leaves.
    evaluator: &'a Evaluator,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Number of nodes visited so far.
    nodes: u64,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute.
    #[inline(always)]
    pub fn new(evaluator: &'a Evaluator, config: SearchConfig) -> Self {
        Self {
            evaluator,
            config,
            nodes: 0,
        }
    }

    /// Nodes visited by this search so far.
    #[inline(always)]
    pub const fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Start the search on the supplied board, returning a [`SearchResult`].
    ///
    /// This is the entrypoint of the search. It orders the root moves, searches each one,
    /// and keeps the first move with the highest score.
    pub fn start(mut self, board: &mut Chessboard) -> SearchResult {
        let starttime = Instant::now();
        self.nodes = 0;

        let mut result = SearchResult {
            depth: self.config.depth,
            ..Default::default()
        };

        let mut alpha = -Score::INF;
        let beta = Score::INF;
        let child_depth = self.config.depth.saturating_sub(1);

        for mv in order_moves(self.evaluator, board, board.legal_moves()) {
            let score = {
                let mut child = board.play(mv);
                let (alpha, beta) = self.child_bounds(alpha, beta);
                -self.negamax(&mut child, child_depth, alpha, beta)
            };

            // Strictly greater, so the first of equally-good moves wins
            if score > result.score {
                result.score = score;
                result.bestmove = Some(mv);
            }

            alpha = alpha.max(score);
        }

        result.nodes = self.nodes;
        result.elapsed = starttime.elapsed();

        tracing::debug!(
            fen = %board.to_fen(),
            depth = result.depth,
            nodes = result.nodes,
            score = %result.score,
            bestmove = ?result.bestmove.map(|mv| mv.to_string()),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "search finished"
        );

        result
    }

    /// Bounds to search a child with, from the child's perspective.
    ///
    /// With pruning disabled, every full-width child gets the full window and no cutoffs can happen.
    /// Quiescence always narrows its window, since it only computes the value of a leaf.
    #[inline(always)]
    fn child_bounds(&self, alpha: Score, beta: Score) -> (Score, Score) {
        if self.config.pruning {
            (-beta, -alpha)
        } else {
            (-Score::INF, Score::INF)
        }
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm with
    /// [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta),
    /// falling through to [`Search::quiescence`] once `depth` is exhausted.
    pub fn negamax(
        &mut self,
        board: &mut Chessboard,
        depth: usize,
        mut alpha: Score,
        beta: Score,
    ) -> Score {
        self.nodes += 1;

        // If we've reached a terminal node, evaluate the position
        if board.is_terminal() {
            return self.evaluator.evaluate(board, depth);
        }

        if depth == 0 {
            return self.quiescence(board, alpha, beta);
        }

        // Start with a *really bad* initial score
        let mut best = -Score::INF;

        for mv in order_moves(self.evaluator, board, board.legal_moves()) {
            let score = {
                let mut child = board.play(mv);
                let (alpha, beta) = self.child_bounds(alpha, beta);
                -self.negamax(&mut child, depth - 1, alpha, beta)
            };

            best = best.max(score);
            alpha = alpha.max(best);

            // Beta cutoff; our opponent already has a better alternative elsewhere
            if self.config.pruning && alpha >= beta {
                break;
            }
        }

        best
    }

    /// [Quiescence Search](https://www.chessprogramming.org/Quiescence_Search) (QSearch)
    ///
    /// A search that looks at only possible captures and capture-chains.
    /// This is called when [`Search::negamax`] reaches a depth of 0, and has no recursion limit,
    /// since every capture removes material from the board.
    pub fn quiescence(&mut self, board: &mut Chessboard, mut alpha: Score, beta: Score) -> Score {
        self.nodes += 1;

        if board.is_terminal() {
            return self.evaluator.evaluate(board, 0);
        }

        // Evaluate the current position, to serve as our baseline
        let stand_pat = self.evaluator.evaluate(board, 0);

        // Beta cutoff; this position is "too good" and our opponent would never let us get here
        if stand_pat >= beta {
            return beta;
        }

        // We are never forced to capture, so standing pat is always an option
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        for mv in order_moves(self.evaluator, board, board.captures()) {
            let score = {
                let mut child = board.play(mv);
                -self.quiescence(&mut child, -beta, -alpha)
            };

            // Fail high
            if score >= beta {
                return beta;
            }

            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// Selects the best move in `board` by searching to a fixed `depth`.
///
/// Returns `None` only if there are no legal moves. The board is restored before returning.
#[inline(always)]
pub fn select_move(evaluator: &Evaluator, board: &mut Chessboard, depth: usize) -> Option<Move> {
    Search::new(evaluator, SearchConfig::with_depth(depth))
        .start(board)
        .bestmove
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn run_search(fen: &str, config: SearchConfig) -> SearchResult {
        let mut board = Chessboard::from_fen(fen).unwrap();
        let evaluator = Evaluator::new();
        Search::new(&evaluator, config).start(&mut board)
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(2));

        // Several queen moves mate here; any of them will do
        let mut board = Chessboard::from_fen(fen).unwrap();
        board.make_move(res.bestmove.unwrap());
        assert!(board.is_checkmate());

        assert!(res.score.is_mate());
        assert_eq!(res.score.moves_to_mate(res.depth), 1);
    }

    #[test]
    fn test_black_mated_in_1() {
        let fen = "1k6/8/KQ6/2Q5/8/8/8/8 b - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(3));

        assert!(res.bestmove.is_some());
        assert!(res.score.is_mate());
        assert_eq!(res.score.moves_to_mate(res.depth), -1);
    }

    #[test]
    fn test_stalemate() {
        let fen = "k7/8/KQ6/8/8/8/8/8 b - - 0 1";
        let res = run_search(fen, SearchConfig::default());

        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -Score::INF);
    }

    #[test]
    fn test_obvious_capture_promote() {
        // Pawn should take queen and also promote to queen
        let fen = "3q1n2/4P3/8/8/8/8/k7/7K w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(1));

        assert_eq!(res.bestmove.unwrap().to_string(), "e7d8q");
    }

    #[test]
    fn test_quiescence_stand_pat_fails_high() {
        // White is a queen up, so standing pat already beats the window
        let mut board = Chessboard::from_fen("k7/8/8/8/8/8/8/KQ6 w - - 0 1").unwrap();
        let evaluator = Evaluator::new();
        let mut search = Search::new(&evaluator, SearchConfig::default());

        assert_eq!(search.quiescence(&mut board, Score(-50), Score(50)), Score(50));
        assert_eq!(search.nodes(), 1);
    }

    #[test]
    fn test_quiescence_capture_fails_high() {
        // Standing pat is slightly worse than even, but Qxd5 wins a whole queen
        let mut board = Chessboard::from_fen("4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let evaluator = Evaluator::new();
        let mut search = Search::new(&evaluator, SearchConfig::default());

        assert!(evaluator.evaluate(&board, 0) < Score(100));
        assert_eq!(search.quiescence(&mut board, Score(-100), Score(100)), Score(100));
        assert_eq!(search.nodes(), 2);
    }

    #[test]
    fn test_quiescence_ignores_pruning_toggle() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        let evaluator = Evaluator::new();

        let mut board = Chessboard::from_fen(fen).unwrap();
        let mut pruned = Search::new(&evaluator, SearchConfig::default());
        let with_pruning = pruned.quiescence(&mut board, -Score::INF, Score::INF);

        let mut full = Search::new(
            &evaluator,
            SearchConfig {
                pruning: false,
                ..Default::default()
            },
        );
        let without_pruning = full.quiescence(&mut board, -Score::INF, Score::INF);

        assert_eq!(with_pruning, without_pruning);
        assert_eq!(pruned.nodes(), full.nodes());
    }

    #[test]
    fn test_quiescence_sees_recapture() {
        // Qxd5 wins a pawn but loses the queen to exd5; a depth-1 search must not play it
        let fen = "4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(1));

        assert_ne!(res.bestmove.unwrap().to_string(), "d2d5");
    }

    #[test]
    fn test_node_count_resets_between_searches() {
        let evaluator = Evaluator::new();
        let mut board = Chessboard::from_fen(FEN_STARTPOS).unwrap();
        let config = SearchConfig::with_depth(2);

        let first = Search::new(&evaluator, config).start(&mut board);
        let second = Search::new(&evaluator, config).start(&mut board);

        assert!(first.nodes > 20);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.bestmove, second.bestmove);
    }

    #[test]
    fn test_negamax_and_quiescence_restore_board() {
        let evaluator = Evaluator::new();
        let mut board =
            Chessboard::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4")
                .unwrap();
        let before = board.to_fen();

        let mut search = Search::new(&evaluator, SearchConfig::default());
        search.negamax(&mut board, 2, -Score::INF, Score::INF);
        assert_eq!(board.to_fen(), before);
        assert_eq!(board.ply(), 0);

        search.quiescence(&mut board, -Score::INF, Score::INF);
        assert_eq!(board.to_fen(), before);
        assert_eq!(board.ply(), 0);
        assert!(search.nodes() > 0);
    }
}
