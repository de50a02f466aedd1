/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;
use uci_parser::UciCommand;

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Run a benchmark with the provided parameters.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Shows all legal moves in the current position, in the order the search would try them.
    Moves {
        /// If set, each move's ordering score will be printed alongside it.
        #[arg(short, long, default_value = "false")]
        scores: bool,
    },

    /// Display the current value of the specified option.
    Option {
        name: Vec<String>, // This is a vector in order to support multi-word options
    },

    /// Search the current position and print the move that would be played.
    Search {
        /// Override the configured search depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Let the engine play against itself from the current position until the game ends.
    #[command(alias = "play")]
    Selfplay {
        /// Override the configured search depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,

        /// Stop after this many moves (plies) even if the game has not ended.
        #[arg(short, long, default_value = "200")]
        max_moves: usize,
    },

    /// Wrapper over UCI commands sent to the engine.
    #[command(skip)]
    Uci { cmd: UciCommand },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse the string as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                // If parsing failed, attempt to parse as a UciCommand
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_commands() {
        let cmd: EngineCommand = "search --depth 3".parse().unwrap();
        assert!(matches!(cmd, EngineCommand::Search { depth: Some(3) }));

        let cmd: EngineCommand = "selfplay -d 2 -m 10".parse().unwrap();
        assert!(matches!(
            cmd,
            EngineCommand::Selfplay {
                depth: Some(2),
                max_moves: 10
            }
        ));

        let cmd: EngineCommand = "d".parse().unwrap();
        assert!(matches!(cmd, EngineCommand::Display));
    }

    #[test]
    fn test_falls_back_to_uci() {
        let cmd: EngineCommand = "isready".parse().unwrap();
        assert!(matches!(cmd, EngineCommand::Uci { .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("not-a-command 42".parse::<EngineCommand>().is_err());
    }
}
