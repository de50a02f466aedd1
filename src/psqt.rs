/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, File, PieceKind, Rank, Square};

/// Number of distinct piece kinds.
pub const NUM_PIECE_KINDS: usize = 6;

/// Piece-Square tables taken from [Sunfish](https://github.com/thomasahle/sunfish).
///
/// Written from White's perspective with `a1` as the first entry and `h8` as the last,
/// so each row below is one rank, starting from rank 1.
#[rustfmt::skip]
const PAWN: Psqt = Psqt([
      0,   0,   0,   0,   0,   0,   0,   0,
    -31,   8,  -7, -37, -36, -14,   3, -31,
    -22,   9,   5, -11, -10,  -2,   3, -19,
    -26,   3,  10,   9,   6,   1,   0, -23,
    -17,  16,  -2,  15,  14,   0,  15, -13,
      7,  29,  21,  44,  40,  31,  44,   7,
     78,  83,  86,  73, 102,  82,  85,  90,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const KNIGHT: Psqt = Psqt([
    -74, -23, -26, -24, -19, -35, -22, -69,
    -23, -15,   2,   0,   2,   0, -23, -20,
    -18,  10,  13,  22,  18,  15,  11, -14,
     -1,   5,  31,  21,  22,  35,   2,   0,
     24,  24,  45,  37,  33,  41,  25,  17,
     10,  67,   1,  74,  73,  27,  62,  -2,
     -3,  -6, 100, -36,   4,  62,  -4, -14,
    -66, -53, -75, -75, -10, -55, -58, -70,
]);

#[rustfmt::skip]
const BISHOP: Psqt = Psqt([
     -7,   2, -15, -12, -14, -15, -10, -10,
     19,  20,  11,   6,   7,   6,  20,  16,
     14,  25,  24,  15,   8,  25,  20,  15,
     13,  10,  17,  23,  17,  16,   0,   7,
     25,  17,  20,  34,  26,  25,  15,  10,
     -9,  39, -32,  41,  52, -10,  28, -14,
    -11,  20,  35, -42, -39,  31,   2, -22,
    -59, -78, -82, -76, -23,-107, -37, -50,
]);

#[rustfmt::skip]
const ROOK: Psqt = Psqt([
    -30, -24, -18,   5,  -2, -18, -31, -32,
    -53, -38, -31, -26, -29, -43, -44, -53,
    -42, -28, -42, -25, -25, -35, -26, -46,
    -28, -35, -16, -21, -13, -29, -46, -30,
      0,   5,  16,  13,  18,  -4,  -9,  -6,
     19,  35,  28,  33,  45,  27,  25,  15,
     55,  29,  56,  67,  55,  62,  34,  60,
     35,  29,  33,   4,  37,  33,  56,  50,
]);

#[rustfmt::skip]
const QUEEN: Psqt = Psqt([
    -39, -30, -31, -13, -31, -36, -34, -42,
    -36, -18,   0, -19, -15, -15, -21, -38,
    -30,  -6, -13, -11, -16, -11, -16, -27,
    -14, -15,  -2,  -5,  -1, -10, -20, -22,
      1, -16,  22,  17,  25,  20, -13,  -6,
     -2,  43,  32,  60,  72,  63,  43,   2,
     14,  32,  60, -10,  20,  76,  57,  24,
      6,   1,  -8,-104,  69,  24,  88,  26,
]);

#[rustfmt::skip]
const KING: Psqt = Psqt([
     17,  30,  -3, -14,   6,  -1,  40,  18,
     -4,   3, -14, -50, -57, -18,  13,   4,
    -47, -42, -43, -79, -64, -32, -29, -32,
    -55, -43, -52, -28, -51, -47,  -8, -50,
    -55,  50,  11,  -4, -19,  13,   0, -49,
    -62,  12, -57,  44, -67,  28,  37, -31,
    -32,  10,  55,  56,  56,  55,  10,   3,
      4,  54,  47, -99, -99,  60,  83, -62,
]);

/// Index of `kind` into per-kind tables.
#[inline(always)]
pub const fn kind_index(kind: PieceKind) -> usize {
    match kind {
        PieceKind::Pawn => 0,
        PieceKind::Knight => 1,
        PieceKind::Bishop => 2,
        PieceKind::Rook => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    }
}

/// Base material value of each piece kind, in centipawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceValues([i32; NUM_PIECE_KINDS]);

impl PieceValues {
    /// Piece values taken from [Sunfish](https://github.com/thomasahle/sunfish).
    ///
    /// The King is invaluable, but 0 is easier to work with in computations.
    pub const SUNFISH: Self = Self([100, 280, 320, 479, 929, 0]);

    /// Value of a piece of the provided kind.
    #[inline(always)]
    pub const fn of(&self, kind: PieceKind) -> i32 {
        self.0[kind_index(kind)]
    }
}

impl Default for PieceValues {
    #[inline(always)]
    fn default() -> Self {
        Self::SUNFISH
    }
}

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Fetch the Piece-Square Tables for every [`PieceKind`], in [`kind_index`] order.
    #[inline(always)]
    pub const fn sunfish() -> [Self; NUM_PIECE_KINDS] {
        [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING]
    }

    /// Get the value of this PSQT at the provided square, from White's perspective.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square for a piece of `color`.
    ///
    /// Black pieces read the table through the rank-mirrored square.
    #[inline(always)]
    pub fn get_relative(&self, square: Square, color: Color) -> i32 {
        self.get(square.rank_relative_to(color))
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it from White's perspective.
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Black
        } else {
            Color::White
        };

        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let value = self.get_relative(Square::new(file, rank), color);
                write!(f, "{value:4} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "-----")?;
        }
        write!(f, "\n    ")?;
        for file in File::iter() {
            write!(f, "{file}    ")?;
        }

        Ok(())
    }
}
