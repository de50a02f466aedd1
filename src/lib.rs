/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Position wrapper with apply/undo stack discipline over the rules engine.
mod chessboard;

/// Command-line interface of the engine.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Heuristics for the order in which moves are searched.
mod ordering;

/// Piece values and Piece-Square tables.
mod psqt;

/// Centipawn and mate scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Misc utility functions, constants, and types.
mod utils;

pub use chessboard::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use ordering::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use utils::*;
