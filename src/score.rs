/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::UciScore;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Always relative to the side to move at the node where it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Bound larger than any score a search can produce.
    pub const INF: Self = Self(1_000_000);

    /// Base magnitude of a checkmate score.
    ///
    /// A mated side to move scores `-(MATE + depth remaining)`.
    pub const MATE: Self = Self(99_999);

    /// Any score at least this large in magnitude is a mate score.
    pub const MATE_THRESHOLD: Self = Self(99_000);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Score for the side to move when it has been checkmated with `depth` plies of search left.
    #[inline(always)]
    pub const fn mated(depth: usize) -> Self {
        Self(-(Self::MATE.0 + depth as i32))
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::MATE_THRESHOLD.0
    }

    /// Returns the number of plies between the root of a `root_depth` search and the mate.
    ///
    /// Only meaningful for mate scores.
    #[inline(always)]
    pub const fn plies_to_mate(&self, root_depth: usize) -> i32 {
        let remaining = self.0.abs() - Self::MATE.0;
        let plies = root_depth as i32 - remaining;
        if plies < 1 {
            1
        } else {
            plies
        }
    }

    /// Returns the number of full moves to mate, positive if the side to move delivers it.
    #[inline(always)]
    pub const fn moves_to_mate(&self, root_depth: usize) -> i32 {
        let plies = self.plies_to_mate(root_depth);
        if self.0 > 0 {
            (plies + 1) / 2
        } else {
            -(plies / 2)
        }
    }

    /// Converts this [`Score`] into a [`UciScore`],
    /// determining whether it is a centipawns score or a mate score.
    ///
    /// `root_depth` is the depth of the search that produced this score.
    #[inline(always)]
    pub fn into_uci(self, root_depth: usize) -> UciScore {
        if self.is_mate() {
            UciScore::mate(self.moves_to_mate(root_depth))
        } else {
            UciScore::cp(self.0)
        }
    }

    /// "Normalizes" a score so that it can be printed as a float.
    ///
    /// Presently, this just divides by 100, since a score represents a centipawn value.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<i32> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: i32) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
