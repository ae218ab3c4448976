//! UCI line protocol
//!
//! Formatting of the commands the session sends and parsing of the lines the
//! engine prints back. Only the subset the relay needs is modelled; anything
//! else the engine says is kept as [`EngineLine::Other`] and ignored.

use crate::error::{EngineError, EngineResult};
use crate::fen::Fen;
use std::fmt;
use std::time::Duration;

/// Commands written to the engine's stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuiCommand {
    Uci,
    IsReady,
    SetOption { name: String, value: String },
    UciNewGame,
    Position(Fen),
    Go { depth: u32, movetime: Duration },
    Stop,
    Quit,
}

impl GuiCommand {
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        Self::SetOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for GuiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uci => f.write_str("uci"),
            Self::IsReady => f.write_str("isready"),
            Self::SetOption { name, value } => write!(f, "setoption name {name} value {value}"),
            Self::UciNewGame => f.write_str("ucinewgame"),
            Self::Position(fen) => write!(f, "position fen {fen}"),
            Self::Go { depth, movetime } => {
                write!(f, "go depth {depth} movetime {}", movetime.as_millis())
            }
            Self::Stop => f.write_str("stop"),
            Self::Quit => f.write_str("quit"),
        }
    }
}

/// One line of engine output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLine {
    UciOk,
    ReadyOk,
    /// `id name ...`
    IdName(String),
    /// `bestmove <move> [ponder <move>]`; `None` when the side to move has no legal moves.
    /// The ponder move is not used.
    BestMove(Option<String>),
    Info(String),
    Other(String),
}

impl EngineLine {
    pub fn parse(line: &str) -> EngineResult<Self> {
        let line = line.trim();
        let mut tokens = line.split_whitespace();

        let parsed = match tokens.next() {
            Some("uciok") => Self::UciOk,
            Some("readyok") => Self::ReadyOk,
            Some("id") if tokens.next() == Some("name") => {
                Self::IdName(tokens.collect::<Vec<_>>().join(" "))
            }
            Some("info") => Self::Info(line.to_string()),
            Some("bestmove") => {
                let best = tokens
                    .next()
                    .ok_or_else(|| EngineError::protocol("bestmove without a move"))?;
                Self::BestMove(parse_move(best)?)
            }
            _ => Self::Other(line.to_string()),
        };

        Ok(parsed)
    }
}

/// Parse a long-algebraic move token, mapping the null-move spellings to `None`
fn parse_move(token: &str) -> EngineResult<Option<String>> {
    if matches!(token, "(none)" | "0000" | "none") {
        return Ok(None);
    }
    if is_long_algebraic(token) {
        Ok(Some(token.to_string()))
    } else {
        Err(EngineError::protocol(format!(
            "unrecognised move '{token}' in bestmove"
        )))
    }
}

/// `e2e4`, `e7e8q` and friends
pub fn is_long_algebraic(token: &str) -> bool {
    let bytes = token.as_bytes();
    let square = |file: u8, rank: u8| (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank);
    match bytes.len() {
        4 => square(bytes[0], bytes[1]) && square(bytes[2], bytes[3]),
        5 => {
            square(bytes[0], bytes[1])
                && square(bytes[2], bytes[3])
                && matches!(bytes[4], b'q' | b'r' | b'b' | b'n')
        }
        _ => false,
    }
}
