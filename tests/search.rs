/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use sunpaw::{
    select_move, Chessboard, Evaluator, Score, Search, SearchConfig, SearchResult, BENCHMARK_FENS,
    FEN_KIWIPETE, FEN_STARTPOS,
};

fn run_search(fen: &str, config: SearchConfig) -> SearchResult {
    let mut board = Chessboard::from_fen(fen).unwrap();
    let evaluator = Evaluator::new();
    Search::new(&evaluator, config).start(&mut board)
}

#[test]
fn test_startpos_depth_1_picks_legal_move() {
    let evaluator = Evaluator::new();
    let mut board = Chessboard::default();
    let legal = board.legal_moves();
    assert_eq!(legal.len(), 20);

    let mv = select_move(&evaluator, &mut board, 1).unwrap();
    assert!(legal.contains(&mv));
}

#[test]
fn test_search_is_deterministic() {
    let evaluator = Evaluator::new();
    let mut board = Chessboard::from_fen(FEN_KIWIPETE).unwrap();

    let first = Search::new(&evaluator, SearchConfig::with_depth(2)).start(&mut board);
    for _ in 0..3 {
        let again = Search::new(&evaluator, SearchConfig::with_depth(2)).start(&mut board);
        assert_eq!(again.bestmove, first.bestmove);
        assert_eq!(again.score, first.score);
        assert_eq!(again.nodes, first.nodes);
    }
}

#[test]
fn test_search_restores_position() {
    let evaluator = Evaluator::new();

    for fen in BENCHMARK_FENS {
        let mut board = Chessboard::from_fen(fen).unwrap();
        let before = board.to_fen();

        select_move(&evaluator, &mut board, 2);

        assert_eq!(board.to_fen(), before, "{fen}");
        assert_eq!(board.ply(), 0, "{fen}");
    }
}

#[test]
fn test_search_restores_played_line() {
    // Moves played before the search must still be undoable afterwards
    let evaluator = Evaluator::new();
    let mut board = Chessboard::default();
    board.make_move_uci("e2e4").unwrap();
    board.make_move_uci("e7e5").unwrap();
    let before = board.to_fen();

    select_move(&evaluator, &mut board, 2);
    assert_eq!(board.to_fen(), before);
    assert_eq!(board.ply(), 2);

    assert!(board.unmake_move());
    assert!(board.unmake_move());
    assert_eq!(board.to_fen(), FEN_STARTPOS);
}

#[test]
fn test_single_legal_move_is_returned() {
    // Black king on a8 is checked by the rook on a1 and can only step to b8
    let fen = "k7/8/2K5/8/8/8/8/R7 b - - 0 1";
    let board = Chessboard::from_fen(fen).unwrap();
    let only = board.legal_moves();
    assert_eq!(only.len(), 1);

    for depth in 1..=3 {
        let res = run_search(fen, SearchConfig::with_depth(depth));
        assert_eq!(res.bestmove, Some(only[0]), "depth {depth}");
    }
}

#[test]
fn test_mate_in_one_is_found() {
    // Back-rank mate: Rd8#
    let fen = "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1";

    for depth in 1..=3 {
        let res = run_search(fen, SearchConfig::with_depth(depth));
        assert_eq!(res.bestmove.unwrap().to_string(), "d1d8", "depth {depth}");
        assert!(res.score > Score(99_000), "depth {depth}: {}", res.score);
    }
}

#[test]
fn test_faster_mate_is_preferred() {
    // White can mate at once with Rd8#, or more slowly by other means
    let fen = "6k1/5ppp/8/8/8/8/5PPP/3R2KQ w - - 0 1";
    let res = run_search(fen, SearchConfig::with_depth(4));

    let mut board = Chessboard::from_fen(fen).unwrap();
    board.make_move(res.bestmove.unwrap());
    assert!(board.is_checkmate());
    assert_eq!(res.score.moves_to_mate(res.depth), 1);

    // The mate-in-one score beats any score reached by a slower mate
    assert_eq!(res.score, -Score::mated(3));
    assert!(-Score::mated(3) > -Score::mated(1));
}

#[test]
fn test_pruning_does_not_change_result() {
    let fens = [
        FEN_STARTPOS,
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
        "4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1",
    ];

    for fen in fens {
        for depth in 1..=2 {
            let pruned = run_search(
                fen,
                SearchConfig {
                    depth,
                    pruning: true,
                },
            );
            let full = run_search(
                fen,
                SearchConfig {
                    depth,
                    pruning: false,
                },
            );

            assert_eq!(pruned.bestmove, full.bestmove, "{fen} at depth {depth}");
            assert_eq!(pruned.score, full.score, "{fen} at depth {depth}");
            assert!(pruned.nodes <= full.nodes, "{fen} at depth {depth}");
        }
    }
}

#[test]
fn test_no_legal_moves_returns_none() {
    let evaluator = Evaluator::new();

    let mut mated = Chessboard::from_fen("k7/1Q6/1K6/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(select_move(&evaluator, &mut mated, 3), None);

    let mut stalemated = Chessboard::from_fen("k7/8/KQ6/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(select_move(&evaluator, &mut stalemated, 3), None);
}

#[test]
fn test_draw_positions_evaluate_to_zero() {
    let evaluator = Evaluator::new();
    let stalemate = Chessboard::from_fen("k7/8/KQ6/8/8/8/8/8 b - - 0 1").unwrap();
    let bare_kings = Chessboard::from_fen("8/8/3k4/8/8/4K3/8/8 w - - 0 1").unwrap();

    for depth in [0, 1, 7] {
        assert_eq!(evaluator.evaluate(&stalemate, depth), Score::DRAW);
        assert_eq!(evaluator.evaluate(&bare_kings, depth), Score::DRAW);
    }
}

#[test]
fn test_capture_into_bare_kings_scores_zero() {
    // Black is a pawn down; taking it leaves K vs K
    let fen = "8/8/8/8/8/3k4/3P4/7K b - - 0 1";

    for depth in 1..=2 {
        let res = run_search(fen, SearchConfig::with_depth(depth));
        assert_eq!(res.bestmove.unwrap().to_string(), "d3d2", "depth {depth}");
        assert_eq!(res.score, Score::DRAW, "depth {depth}");
    }
}

#[test]
fn test_search_at_seventy_five_move_limit_scores_material() {
    // The game is over on the clock, but the leaf is still scored by material
    let evaluator = Evaluator::new();
    let mut board = Chessboard::from_fen("k7/8/8/8/8/8/8/KQ6 w - - 150 105").unwrap();
    let mut search = Search::new(&evaluator, SearchConfig::default());

    assert_eq!(search.negamax(&mut board, 3, -Score::INF, Score::INF), Score(899));
    assert_eq!(search.nodes(), 1);
}

#[test]
fn test_mirrored_search_plays_mirrored_move() {
    let evaluator = Evaluator::new();
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    let mut board = Chessboard::from_fen(fen).unwrap();
    let mut mirror = board.mirrored().unwrap();

    let ours = Search::new(&evaluator, SearchConfig::with_depth(2)).start(&mut board);
    let theirs = Search::new(&evaluator, SearchConfig::with_depth(2)).start(&mut mirror);

    // Scholar's mate from either side of the board
    assert_eq!(ours.bestmove.unwrap().to_string(), "h5f7");
    assert_eq!(theirs.bestmove.unwrap().to_string(), "h4f2");
    assert_eq!(ours.score, theirs.score);
}
