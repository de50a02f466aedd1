/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use chessie::{Color, Game, Move, Piece, PieceKind, Square};

/// Number of half-moves without a capture or pawn move after which the game is over.
const SEVENTY_FIVE_MOVE_LIMIT: usize = 150;

/// A chess position with an undo stack, so moves can be applied and taken back.
///
/// The underlying [`Game`] is copy-make, so "undoing" a move restores the exact position that
/// was current before it was applied.
#[derive(Debug, Clone)]
pub struct Chessboard {
    /// The position as it stands right now.
    current: Game,

    /// Every position that preceded `current`, most recent last.
    history: Vec<Game>,
}

impl Chessboard {
    /// Constructs a new [`Chessboard`] starting from the provided [`Game`].
    #[inline(always)]
    pub fn new(game: Game) -> Self {
        Self {
            current: game,
            history: Vec::with_capacity(64),
        }
    }

    /// Parses a FEN string into a new [`Chessboard`].
    pub fn from_fen(fen: &str) -> Result<Self> {
        let game = Game::from_fen(fen).with_context(|| format!("Invalid FEN {fen:?}"))?;
        Ok(Self::new(game))
    }

    /// The current position.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.current
    }

    /// Number of moves that can currently be taken back.
    #[inline(always)]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// FEN string of the current position.
    #[inline(always)]
    pub fn to_fen(&self) -> String {
        self.current.to_fen()
    }

    /// Side whose turn it is.
    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.current.side_to_move()
    }

    /// Piece standing on `square`, if any.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.current.piece_at(square)
    }

    /// Iterates over every occupied square and the piece on it.
    #[inline(always)]
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.current.board().into_iter()
    }

    /// All legal moves in the current position, in generation order.
    #[inline(always)]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.current.get_legal_moves().into_iter().collect()
    }

    /// All legal captures (including en passant) in the current position.
    #[inline(always)]
    pub fn captures(&self) -> Vec<Move> {
        self.current
            .get_legal_moves()
            .into_iter()
            .filter(Move::is_capture)
            .collect()
    }

    /// Applies `mv` to the position. It must be legal.
    ///
    /// Every call must be paired with a call to [`Self::unmake_move`]; prefer [`Self::play`].
    #[inline(always)]
    pub fn make_move(&mut self, mv: Move) {
        self.history.push(self.current);
        self.current = self.current.with_move_made(mv);
    }

    /// Takes back the most recently applied move.
    ///
    /// Returns `false` if there was nothing to take back.
    #[inline(always)]
    pub fn unmake_move(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Applies `mv`, returning a guard that takes it back when dropped.
    #[inline(always)]
    pub fn play(&mut self, mv: Move) -> MoveGuard<'_> {
        self.make_move(mv);
        MoveGuard { board: self }
    }

    /// Parses `mv_str` in UCI notation and applies it.
    pub fn make_move_uci(&mut self, mv_str: &str) -> Result<Move> {
        let mv = Move::from_uci(&self.current, mv_str)?;
        if !self.legal_moves().contains(&mv) {
            bail!("Illegal move {mv_str:?} in position {:?}", self.to_fen());
        }

        self.make_move(mv);
        Ok(mv)
    }

    /// Returns `true` if the side to move has at least one legal move.
    #[inline(always)]
    pub fn has_legal_moves(&self) -> bool {
        !self.current.get_legal_moves().is_empty()
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.current.is_in_check()
    }

    /// Returns `true` if the side to move has been checkmated.
    #[inline(always)]
    pub fn is_checkmate(&self) -> bool {
        self.is_in_check() && !self.has_legal_moves()
    }

    /// Returns `true` if the side to move has no legal moves but is not in check.
    #[inline(always)]
    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check() && !self.has_legal_moves()
    }

    /// Returns `true` if neither side can possibly deliver mate.
    ///
    /// That is the case when there are no pawns, rooks, or queens left, and either at most one
    /// minor piece remains or every remaining minor piece is a bishop on the same square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let mut knights = 0;
        let mut bishop_shades = [false; 2];

        for (square, piece) in self.pieces() {
            match piece.kind() {
                PieceKind::King => {}
                PieceKind::Knight => knights += 1,
                PieceKind::Bishop => bishop_shades[square_shade(square)] = true,
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }

        let bishops_on_one_shade = !(bishop_shades[0] && bishop_shades[1]);
        let minors = knights + bishop_shades.iter().filter(|&&shade| shade).count();

        match knights {
            0 => bishops_on_one_shade,
            1 => minors == 1,
            _ => false,
        }
    }

    /// Returns `true` if the seventy-five-move rule has ended the game.
    #[inline(always)]
    pub fn is_seventy_five_move_draw(&self) -> bool {
        self.current.halfmove() >= SEVENTY_FIVE_MOVE_LIMIT
    }

    /// Returns `true` if the game is drawn for any reason this board can detect.
    #[inline(always)]
    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_seventy_five_move_draw()
    }

    /// Returns `true` if the game has ended in this position.
    #[inline(always)]
    pub fn is_terminal(&self) -> bool {
        !self.has_legal_moves()
            || self.is_insufficient_material()
            || self.is_seventy_five_move_draw()
    }

    /// Kind of the piece that `mv` would capture, if it is a capture.
    #[inline(always)]
    pub fn captured_kind(&self, mv: &Move) -> Option<PieceKind> {
        if !mv.is_capture() {
            None
        } else if mv.is_en_passant() {
            Some(PieceKind::Pawn)
        } else {
            self.piece_at(mv.to()).map(|victim| victim.kind())
        }
    }

    /// Returns `true` if playing `mv` puts the opponent in check.
    #[inline(always)]
    pub fn gives_check(&self, mv: Move) -> bool {
        self.current.with_move_made(mv).is_in_check()
    }

    /// Result string (`1-0`, `0-1`, `1/2-1/2`) if the game is over, otherwise `None`.
    pub fn outcome(&self) -> Option<&'static str> {
        if self.is_checkmate() {
            Some(if self.side_to_move().is_white() {
                "0-1"
            } else {
                "1-0"
            })
        } else if self.is_draw() {
            Some("1/2-1/2")
        } else {
            None
        }
    }

    /// Produces the colour-flipped mirror of the current position.
    ///
    /// Ranks are reversed, every piece changes colour, and the other side is to move.
    /// The undo stack is not carried over.
    pub fn mirrored(&self) -> Result<Self> {
        Self::from_fen(&mirror_fen(&self.to_fen())?)
    }
}

impl Default for Chessboard {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Game::default())
    }
}

impl FromStr for Chessboard {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Chessboard {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current)
    }
}

/// Applied move that is taken back when this guard goes out of scope.
///
/// Dereferences to the [`Chessboard`] with the move applied.
#[derive(Debug)]
pub struct MoveGuard<'a> {
    board: &'a mut Chessboard,
}

impl Deref for MoveGuard<'_> {
    type Target = Chessboard;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl DerefMut for MoveGuard<'_> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.board.unmake_move();
    }
}

/// `0` for dark squares, `1` for light squares.
#[inline(always)]
const fn square_shade(square: Square) -> usize {
    let index = square.index();
    (index % 8 + index / 8) % 2
}

/// Colour-flips a FEN string: ranks reversed, piece colours swapped, side to move swapped.
pub fn mirror_fen(fen: &str) -> Result<String> {
    let mut fields = fen.split_ascii_whitespace();

    let placement = fields.next().context("FEN string must have piece placements.")?;
    let placement = placement
        .split('/')
        .rev()
        .map(swap_case)
        .collect::<Vec<_>>()
        .join("/");

    let side = match fields.next().unwrap_or("w") {
        "w" => "b",
        "b" => "w",
        other => bail!("Invalid side to move {other:?}"),
    };

    let castling = match fields.next().unwrap_or("-") {
        "-" => String::from("-"),
        rights => {
            let mut flipped = swap_case(rights).chars().collect::<Vec<_>>();
            // White's rights are written first
            flipped.sort_by_key(|c| (c.is_ascii_lowercase(), *c));
            flipped.into_iter().collect()
        }
    };

    let ep = match fields.next().unwrap_or("-") {
        "-" => String::from("-"),
        square => {
            let mut chars = square.chars();
            let (Some(file), Some(rank)) = (chars.next(), chars.next().and_then(|r| r.to_digit(10)))
            else {
                bail!("Invalid en passant square {square:?}");
            };
            format!("{file}{}", 9 - rank)
        }
    };

    let halfmove = fields.next().unwrap_or("0");
    let fullmove = fields.next().unwrap_or("1");

    Ok(format!("{placement} {side} {castling} {ep} {halfmove} {fullmove}"))
}

#[inline(always)]
fn swap_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}
