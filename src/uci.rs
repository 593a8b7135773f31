use std::io::{self, BufRead, Write};

use log::{debug, warn};
use shakmaty::{CastlingMode, Color};

use crate::board::{ChessBoard, Rules};
use crate::error::EngineError;
use crate::params::EngineConfig;
use crate::search::{self, Searcher};
use crate::types::UNBOUNDED_MS;

/// Reads UCI commands from stdin until `quit` or EOF.
pub fn run(config: &EngineConfig) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(config);

    for line in stdin.lock().lines() {
        let line = line?;
        let mut out = stdout.lock();
        if !session.handle_line(&line, &mut out)? {
            break;
        }
        out.flush()?;
    }
    Ok(())
}

/// Engine state between UCI commands.
pub struct Session {
    board: ChessBoard,
    searcher: Searcher,
    config: EngineConfig,
    /// Derive a hard deadline from the clock on every `go`.
    auto_deadline: bool,
}

impl Session {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            board: ChessBoard::default(),
            searcher: Searcher::new(config),
            config: config.clone(),
            auto_deadline: false,
        }
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    /// Handles one command. Returns `false` once the engine should exit.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return Ok(true);
        };

        match command {
            "uci" => {
                writeln!(out, "id name lookahead")?;
                writeln!(out, "id author lookahead developers")?;
                writeln!(
                    out,
                    "option name Depth type spin default {} min 1 max 16",
                    self.config.base_depth
                )?;
                writeln!(out, "option name Seed type string default <random>")?;
                writeln!(out, "option name HardDeadline type check default false")?;
                writeln!(out, "uciok")?;
            }
            "isready" => writeln!(out, "readyok")?,
            "ucinewgame" => self.board = ChessBoard::default(),
            "position" => match parse_position(&tokens) {
                Ok(board) => self.board = board,
                Err(e) => warn!("ignoring position command: {e}"),
            },
            "go" => self.go(&tokens, out)?,
            "setoption" => self.set_option(&tokens),
            "d" | "print" => {
                writeln!(out, "{}", self.board.board())?;
                writeln!(out, "turn {:?} hash {:?}", self.board.turn(), self.board.hash())?;
            }
            "stop" => {}
            "quit" => return Ok(false),
            other => debug!("unknown command {other}"),
        }
        Ok(true)
    }

    fn go(&mut self, tokens: &[&str], out: &mut impl Write) -> io::Result<()> {
        let params = parse_go(tokens);
        let side = self.board.turn();

        let base_depth = self.searcher.base_depth();
        if let Some(depth) = params.depth {
            self.searcher.set_base_depth(depth);
        }

        let deadline = if self.auto_deadline {
            Some(params.compute_time_ms(side)).filter(|&ms| ms > 0)
        } else {
            self.config.hard_deadline_ms
        };
        self.searcher.set_hard_deadline(deadline);

        let result = self.searcher.search(&mut self.board, params.remaining_ms(side));
        self.searcher.set_base_depth(base_depth);

        writeln!(
            out,
            "info depth {} {} nodes {} time {}",
            result.depth,
            search::format_score(result.score),
            result.nodes,
            result.elapsed_ms
        )?;
        match result.best_move {
            Some(mv) => writeln!(out, "bestmove {}", mv.to_uci(CastlingMode::Standard)),
            None => writeln!(out, "bestmove 0000"),
        }
    }

    fn set_option(&mut self, tokens: &[&str]) {
        let Some((name, value)) = parse_setoption(tokens) else {
            return;
        };

        match name.to_lowercase().as_str() {
            "depth" => match value.parse::<u32>() {
                Ok(depth) => {
                    self.config.base_depth = depth.clamp(1, 16);
                    self.searcher.set_base_depth(self.config.base_depth);
                }
                Err(_) => warn!("bad Depth value {value}"),
            },
            "seed" => match value.parse::<u64>() {
                Ok(seed) => {
                    self.config.seed = Some(seed);
                    self.searcher.reseed(seed);
                }
                Err(_) => warn!("bad Seed value {value}"),
            },
            "harddeadline" => match value.parse::<bool>() {
                Ok(enabled) => self.auto_deadline = enabled,
                Err(_) => warn!("bad HardDeadline value {value}"),
            },
            other => debug!("unknown option {other}"),
        }
    }
}

/// Parsed `go` command parameters.
#[derive(Debug, Default)]
struct GoParams {
    depth: Option<u32>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    moves_to_go: Option<u64>,
    infinite: bool,
}

impl GoParams {
    fn clock(&self, side: Color) -> (Option<u64>, u64) {
        match side {
            Color::White => (self.wtime, self.winc.unwrap_or(0)),
            Color::Black => (self.btime, self.binc.unwrap_or(0)),
        }
    }

    /// What the mover has left, as the search sees it.
    fn remaining_ms(&self, side: Color) -> u64 {
        if self.infinite {
            return UNBOUNDED_MS;
        }
        if let Some(mt) = self.movetime {
            return mt;
        }
        self.clock(side).0.unwrap_or(UNBOUNDED_MS)
    }

    /// Time to spend on this move in milliseconds. 0 means no limit.
    fn compute_time_ms(&self, side: Color) -> u64 {
        if self.infinite {
            return 0;
        }
        if let Some(mt) = self.movetime {
            return mt;
        }

        let (my_time, my_inc) = self.clock(side);
        let my_time = my_time.unwrap_or(0);
        if my_time == 0 {
            return 0;
        }

        let moves_left = self.moves_to_go.unwrap_or(30);
        let base = my_time / moves_left.max(1);
        let inc_bonus = my_inc * 3 / 4;
        let allocated = base + inc_bonus;

        // Don't use more than 80% of remaining time
        allocated.min(my_time * 4 / 5)
    }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut rest = tokens.iter().skip(1);

    while let Some(&token) = rest.next() {
        if token == "infinite" {
            params.infinite = true;
            continue;
        }
        let Some(value) = rest.next() else {
            break;
        };
        match token {
            "depth" => params.depth = value.parse().ok(),
            "movetime" => params.movetime = value.parse().ok(),
            "wtime" => params.wtime = value.parse().ok(),
            "btime" => params.btime = value.parse().ok(),
            "winc" => params.winc = value.parse().ok(),
            "binc" => params.binc = value.parse().ok(),
            "movestogo" => params.moves_to_go = value.parse().ok(),
            _ => {}
        }
    }

    params
}

/// `position startpos|fen <fen> [moves ...]`
fn parse_position(tokens: &[&str]) -> Result<ChessBoard, EngineError> {
    let moves_idx = tokens.iter().position(|&t| t == "moves");
    let setup = &tokens[1..moves_idx.unwrap_or(tokens.len())];

    let mut board = match setup {
        ["startpos"] => ChessBoard::default(),
        ["fen", fen @ ..] if !fen.is_empty() => ChessBoard::from_fen(&fen.join(" "))?,
        _ => return Err(EngineError::Command(tokens.join(" "))),
    };

    if let Some(idx) = moves_idx {
        for text in &tokens[idx + 1..] {
            let mv = board.parse_uci_move(text)?;
            board.push_history_move(&mv);
        }
    }

    Ok(board)
}

fn parse_setoption(tokens: &[&str]) -> Option<(String, String)> {
    let name_idx = tokens.iter().position(|&t| t == "name")?;
    let value_idx = tokens.iter().position(|&t| t == "value")?;
    if value_idx <= name_idx {
        return None;
    }
    let name = tokens[name_idx + 1..value_idx].join(" ");
    let value = tokens[value_idx + 1..].join(" ");
    Some((name, value))
}
