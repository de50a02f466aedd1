/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, File, Piece, PieceKind, Rank, Square};

use crate::{kind_index, Chessboard, PieceValues, Psqt, Score, NUM_PIECE_KINDS};

/// Encapsulates the logic of scoring a chess position.
///
/// Holds the piece values and Piece-Square tables, which are fixed once constructed.
///
/// Internally, a high score is good for White and a low score is good for Black.
/// However, during a negamax search, positions must be evaluated from the side-to-move's perspective,
/// so [`Evaluator::evaluate`] flips the sign when it is Black's turn.
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Base material value of each piece kind.
    values: PieceValues,

    /// Positional bonuses for each piece kind, from White's perspective.
    psqts: [Psqt; NUM_PIECE_KINDS],
}

impl Evaluator {
    /// Construct a new [`Evaluator`] with the default tables.
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_tables(PieceValues::default(), Psqt::sunfish())
    }

    /// Construct a new [`Evaluator`] with custom tables.
    #[inline(always)]
    pub const fn with_tables(values: PieceValues, psqts: [Psqt; NUM_PIECE_KINDS]) -> Self {
        Self { values, psqts }
    }

    /// Base material value of `kind`.
    #[inline(always)]
    pub const fn value_of(&self, kind: PieceKind) -> i32 {
        self.values.of(kind)
    }

    /// Piece-Square table for `kind`.
    #[inline(always)]
    pub const fn psqt(&self, kind: PieceKind) -> &Psqt {
        &self.psqts[kind_index(kind)]
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// A positive/high number is good for the side-to-move, while a negative number is better for the opponent.
    /// A checkmated side to move scores `-(MATE + depth)`, so mates found with more depth left
    /// (closer to the root) are more extreme. Stalemate and insufficient material score 0.
    pub fn evaluate(&self, board: &Chessboard, depth: usize) -> Score {
        if !board.has_legal_moves() {
            return if board.is_in_check() {
                Score::mated(depth)
            } else {
                Score::DRAW
            };
        }

        if board.is_insufficient_material() {
            return Score::DRAW;
        }

        let score = self.white_relative(board);
        if board.side_to_move().is_white() {
            score
        } else {
            -score
        }
    }

    /// Material and positional balance of the board, from White's perspective.
    ///
    /// Ignores mates and draws.
    pub fn white_relative(&self, board: &Chessboard) -> Score {
        board
            .pieces()
            .fold(Score::DRAW, |score, (square, piece)| {
                score + self.piece_contribution(piece, square)
            })
    }

    /// Signed contribution of `piece` standing on `square`; positive for White.
    #[inline(always)]
    fn piece_contribution(&self, piece: Piece, square: Square) -> i32 {
        let kind = piece.kind();
        let color = piece.color();
        let value = self.value_of(kind) + self.psqt(kind).get_relative(square, color);

        if color == Color::White {
            value
        } else {
            -value
        }
    }

    /// Returns a displayable breakdown of how every piece on `board` contributes to its evaluation.
    #[inline(always)]
    pub fn breakdown<'a>(&'a self, board: &'a Chessboard) -> Breakdown<'a> {
        Breakdown {
            evaluator: self,
            board,
        }
    }
}

impl Default for Evaluator {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// Per-square view of an evaluation, shown by the `eval --pretty` command.
#[derive(Debug)]
pub struct Breakdown<'a> {
    evaluator: &'a Evaluator,
    board: &'a Chessboard,
}

impl fmt::Display for Breakdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-----+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            // Step 1: Write the piece char
            for file in File::iter() {
                let piece = self.board.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.char()).unwrap_or(' ');
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for file in File::iter() {
                let square = Square::new(file, rank);
                let cell = match self.board.piece_at(square) {
                    Some(piece) => {
                        let value = self.evaluator.piece_contribution(piece, square);
                        format!("{:^+5}", value / 10)
                    }
                    None => String::from("     "),
                };
                write!(f, "{cell}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "     {file}")?;
        }

        let color = self.board.side_to_move();
        let score = self.evaluator.evaluate(self.board, 0);

        let winning_side = if score > Score::DRAW {
            Some(color)
        } else if score < Score::DRAW {
            Some(color.opponent())
        } else {
            None
        };

        writeln!(f, "\n\n(contributions shown in tenths of a pawn)")?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score} ({:+.2})", score.normalize())
    }
}
