/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use uci_parser::{UciCommand, UciInfo, UciOption, UciParseError, UciResponse, UciSearchOptions};

use crate::{
    scored_moves, select_move, Chessboard, EngineCommand, Evaluator, Search, SearchConfig,
    SearchResult, BENCHMARK_FENS, DEFAULT_DEPTH,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: usize = 4;

/// Largest depth accepted through the `Depth` option.
const MAX_OPTION_DEPTH: usize = 8;

/// The Sunpaw chess engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    board: Chessboard,

    /// Piece values and Piece-Square tables, built once and shared by every search.
    evaluator: Evaluator,

    /// Depth used by `go` and `search` when none is given.
    depth: usize,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            board: Chessboard::default(),
            evaluator: Evaluator::new(),
            depth: DEFAULT_DEPTH,
            sender,
            receiver,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ")
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Engine command channel is closed")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    /// Searches run on this thread, one at a time.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                tracing::info!("Input handler thread stopping: {err:#}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty)?,

                EngineCommand::Display => println!("{}", self.board),

                EngineCommand::Eval { pretty } => self.eval(pretty),

                EngineCommand::Exit => break,

                EngineCommand::Fen => println!("{}", self.board.to_fen()),

                EngineCommand::Moves { scores } => self.moves(scores),

                EngineCommand::Option { name } => {
                    let name = name.join(" ");
                    if let Some(value) = self.get_option(&name) {
                        println!("{name} := {value}");
                    } else {
                        println!("{} has no option {name:?}", self.name());
                    }
                }

                EngineCommand::Search { depth } => {
                    let res = self.search(depth.unwrap_or(self.depth));
                    match res.bestmove {
                        Some(mv) => println!("{mv} (score {})", res.score),
                        None => println!("(none)"),
                    }
                }

                EngineCommand::Selfplay { depth, max_moves } => {
                    self.selfplay(depth.unwrap_or(self.depth), max_moves)
                }

                EngineCommand::Uci { cmd } => {
                    // Keep running, even on error
                    if let Err(e) = self.handle_uci_command(cmd) {
                        tracing::warn!("{e:#}");
                    }
                }
            };
        }

        Ok(())
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            SetOption { name, value } => self.set_option(&name, value)?,

            UciNewGame => self.new_game(),

            Position { fen, moves } => self.position(fen, moves)?,

            Go(options) => self.go(options),

            // Searches are synchronous, so by the time `stop` is read there is nothing to stop.
            Stop => {}

            Quit => self.send_command(EngineCommand::Exit)?,

            _ => bail!(
                "{} does not support UCI command {uci:?}",
                env!("CARGO_PKG_NAME")
            ),
        }

        Ok(())
    }

    /// Handles the `go` command, searching the current position to a fixed depth and sending `bestmove`.
    ///
    /// Clock-based limits are ignored.
    fn go(&mut self, options: UciSearchOptions) {
        let depth = options
            .depth
            .map(|depth| depth as usize)
            .unwrap_or(self.depth);

        let res = self.search(depth);

        let response = UciResponse::BestMove {
            bestmove: res.bestmove,
            ponder: None,
        };

        println!("{response}");
    }

    /// Searches the current position to `depth`, sending UCI info about the result.
    fn search(&mut self, depth: usize) -> SearchResult {
        let config = SearchConfig::with_depth(depth);
        let res = Search::new(&self.evaluator, config).start(&mut self.board);

        let secs = res.elapsed.as_secs_f32();
        let nps = if secs > 0.0 {
            (res.nodes as f32 / secs).trunc()
        } else {
            0.0
        };

        send_info(
            UciInfo::new()
                .depth(res.depth)
                .nodes(res.nodes)
                .score(res.score.into_uci(res.depth))
                .nps(nps)
                .time(res.elapsed.as_millis()),
        );

        res
    }

    /// Execute the `bench` command, running a benchmark of a fixed search on a series of positions and displaying the results.
    fn bench(&mut self, depth: Option<usize>, pretty: bool) -> Result<()> {
        let config = SearchConfig::with_depth(depth.unwrap_or(BENCH_DEPTH));

        let benches = BENCHMARK_FENS;
        let num_tests = benches.len();
        let mut nodes = 0;
        let starttime = Instant::now();

        // Run a fixed search on each position
        for (i, fen) in benches.into_iter().enumerate() {
            println!("Benchmark position {}/{}: {fen}", i + 1, num_tests);

            let mut board = Chessboard::from_fen(fen)?;
            let res = Search::new(&self.evaluator, config).start(&mut board);
            nodes += res.nodes;
        }

        // Compute results
        let elapsed = starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let m_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+--- Benchmark Complete ---+");
            println!("| depth      : {:<12}|", config.depth);
            println!("| time (ms)  : {ms:<12}|");
            println!("| nodes      : {nodes:<12}|");
            println!("| nps        : {nps:<12}|");
            println!("| Mnps       : {m_nps:<12.2}|");
            println!("+--------------------------+");
        } else {
            println!("{nodes} nodes {nps} nps");
        }

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        if pretty {
            println!("{}", self.evaluator.breakdown(&self.board));
        } else {
            println!("{}", self.evaluator.evaluate(&self.board, 0));
        }
    }

    /// Executes the `moves` command, listing legal moves in search order.
    fn moves(&self, with_scores: bool) {
        let moves = scored_moves(&self.evaluator, &self.board, self.board.legal_moves());

        // If there are none, print "(none)"
        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else if with_scores {
            moves
                .into_iter()
                .map(|(mv, score)| format!("{mv} ({score})"))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            moves
                .into_iter()
                .map(|(mv, _)| mv.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{moves_string}");
    }

    /// Executes the `selfplay` command.
    ///
    /// The engine plays both sides from the current position, printing every move, until the
    /// game ends or `max_moves` plies have been played. The moves remain applied afterwards.
    fn selfplay(&mut self, depth: usize, max_moves: usize) {
        let mut played = 0;

        while played < max_moves && self.board.outcome().is_none() {
            let color = self.board.side_to_move();
            let Some(mv) = select_move(&self.evaluator, &mut self.board, depth) else {
                break;
            };

            self.board.make_move(mv);
            played += 1;
            println!("{played:>3}. {} {mv}", color.name());
        }

        match self.board.outcome() {
            Some(result) => println!("Result: {result}"),
            None => println!("Result: * (stopped after {played} moves)"),
        }
        tracing::debug!(played, fen = %self.board.to_fen(), "selfplay finished");
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    fn position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        // Build the new position aside, so a bad move leaves the old one intact
        let mut board = match fen {
            Some(fen) => Chessboard::from_fen(fen.as_ref())?,
            None => Chessboard::default(),
        };

        for mv_str in moves {
            board.make_move_uci(mv_str.as_ref())?;
        }

        self.board = board;
        Ok(())
    }

    /// Resets the engine's internal game state.
    fn new_game(&mut self) {
        self.board = Chessboard::default();
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors, and lists all UCI options.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());

        // Print all UCI options
        for opt in self.options() {
            println!("{}", UciResponse::Option(opt));
        }

        // We're ready to go!
        println!("{}", UciResponse::<&str>::UciOk)
    }

    /// Convenience function to return an iterator over all UCI options this engine supports.
    fn options(&self) -> impl Iterator<Item = UciOption<&str>> {
        [UciOption::spin(
            "Depth",
            DEFAULT_DEPTH as i32,
            1,
            MAX_OPTION_DEPTH as i32,
        )]
        .into_iter()
    }

    /// Handles the `setoption` command, setting option `name` to `value`.
    ///
    /// Will return an error if `name` isn't a valid option or `value` is not a valid value for that option.
    fn set_option(&mut self, name: &str, value: Option<String>) -> Result<()> {
        match name {
            "Depth" => {
                let Some(value) = value else {
                    bail!("Option {name:?} requires a value");
                };
                let depth = value
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid value {value:?} for option {name:?}"))?;

                if !(1..=MAX_OPTION_DEPTH).contains(&depth) {
                    bail!("{name} must be between 1 and {MAX_OPTION_DEPTH}, got {depth}");
                }

                self.depth = depth;
                tracing::info!(depth, "search depth changed");
            }

            _ => bail!("{} has no option named {name:?}", self.name()),
        }

        Ok(())
    }

    /// Returns the current value of the option `name`, if it exists on this engine.
    fn get_option(&self, name: &str) -> Option<String> {
        match name {
            "Depth" => Some(self.depth.to_string()),
            _ => None,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends a [`UciInfo`] to `stdout`.
#[inline(always)]
fn send_info(info: UciInfo) {
    let resp = UciResponse::<String>::Info(Box::new(info));
    println!("{resp}");
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing UCI commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        // Attempt to parse the input as a UCI command first, since that's the primary use case of the engine
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(UciParseError::UnrecognizedCommand { cmd: _ }) => {
                match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
                    Ok(cmd) => sender
                        .send(cmd)
                        .context("Failed to send command to engine")?,

                    // If it wasn't a custom command, either, print an error.
                    Err(err) => eprintln!("{err}"),
                }
            }

            // If it was a UCI command, print a usage message.
            Err(uci_err) => eprintln!("{uci_err}"),
        }
    }
}
