/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cmp::Reverse;

use chessie::Move;

use crate::{Chessboard, Evaluator};

/// Flat bonus for promoting a pawn.
pub const PROMOTION_BONUS: i32 = 8000;

/// Flat bonus for giving check.
pub const CHECK_BONUS: i32 = 5000;

/// Applies a score to the provided move, intended to be used when ordering moves during search.
///
/// Higher is searched first. The components stack:
/// * captures score [MVV-LVA](https://www.chessprogramming.org/MVV-LVA) style,
///   `10 * victim - attacker / 100`, so the attacker only breaks ties between equal victims
/// * promotions get [`PROMOTION_BONUS`]
/// * checks get [`CHECK_BONUS`]
pub fn score_move(evaluator: &Evaluator, board: &Chessboard, mv: &Move) -> i32 {
    let mut score = 0;

    if let Some(victim) = board.captured_kind(mv) {
        let attacker = board
            .piece_at(mv.from())
            .map(|piece| evaluator.value_of(piece.kind()))
            .unwrap_or_default();

        score += 10 * evaluator.value_of(victim) - attacker / 100;
    }

    if mv.promotion().is_some() {
        score += PROMOTION_BONUS;
    }

    if board.gives_check(*mv) {
        score += CHECK_BONUS;
    }

    score
}

/// Sorts `moves` from most to least promising.
///
/// The sort is stable: moves with equal scores keep their relative order.
pub fn order_moves(
    evaluator: &Evaluator,
    board: &Chessboard,
    moves: impl IntoIterator<Item = Move>,
) -> Vec<Move> {
    let mut moves = moves.into_iter().collect::<Vec<_>>();
    moves.sort_by_cached_key(|mv| Reverse(score_move(evaluator, board, mv)));
    moves
}

/// Like [`order_moves`], but keeps each move's score alongside it.
pub fn scored_moves(
    evaluator: &Evaluator,
    board: &Chessboard,
    moves: impl IntoIterator<Item = Move>,
) -> Vec<(Move, i32)> {
    let mut scored = moves
        .into_iter()
        .map(|mv| (mv, score_move(evaluator, board, &mv)))
        .collect::<Vec<_>>();
    scored.sort_by_key(|&(_, score)| Reverse(score));
    scored
}
