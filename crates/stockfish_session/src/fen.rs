//! FEN shape check
//!
//! Positions are opaque to this crate: legality is the engine's business.
//! Stockfish does not report bad input, it crashes or searches garbage, so
//! strings are checked for the *shape* of a FEN record before being sent.

use crate::error::{EngineError, EngineResult};
use std::fmt;

/// Standard initial position
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A position string that passed the shape check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen(String);

impl Fen {
    /// Check `input` and normalise it to six space-separated fields
    pub fn parse(input: &str) -> EngineResult<Self> {
        let fields: Vec<&str> = input.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(EngineError::invalid_position(format!(
                "expected 6 fields, found {}",
                fields.len()
            )));
        }

        check_placement(fields[0])?;

        if !matches!(fields[1], "w" | "b") {
            return Err(EngineError::invalid_position(format!(
                "side to move must be 'w' or 'b', found '{}'",
                fields[1]
            )));
        }

        check_castling(fields[2])?;
        check_en_passant(fields[3])?;

        let halfmove = fields.get(4).copied().unwrap_or("0");
        let fullmove = fields.get(5).copied().unwrap_or("1");
        check_counter("halfmove clock", halfmove)?;
        check_counter("fullmove number", fullmove)?;

        Ok(Self(format!(
            "{} {} {} {} {} {}",
            fields[0], fields[1], fields[2], fields[3], halfmove, fullmove
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_placement(placement: &str) -> EngineResult<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(EngineError::invalid_position(format!(
            "expected 8 ranks, found {}",
            ranks.len()
        )));
    }

    let mut white_kings = 0;
    let mut black_kings = 0;

    for (index, rank) in ranks.iter().enumerate() {
        let mut files = 0u32;
        for c in rank.chars() {
            match c {
                '1'..='8' => files += c.to_digit(10).unwrap_or(0),
                'p' | 'P' if index == 0 || index == 7 => {
                    return Err(EngineError::invalid_position(format!(
                        "pawn on rank {}",
                        8 - index
                    )))
                }
                'p' | 'n' | 'b' | 'r' | 'q' | 'P' | 'N' | 'B' | 'R' | 'Q' => files += 1,
                'K' => {
                    white_kings += 1;
                    files += 1;
                }
                'k' => {
                    black_kings += 1;
                    files += 1;
                }
                other => {
                    return Err(EngineError::invalid_position(format!(
                        "unexpected character '{other}' in rank {}",
                        8 - index
                    )))
                }
            }
        }
        if files != 8 {
            return Err(EngineError::invalid_position(format!(
                "rank {} covers {files} files, expected 8",
                8 - index
            )));
        }
    }

    if white_kings != 1 || black_kings != 1 {
        return Err(EngineError::invalid_position(format!(
            "expected one king per side, found {white_kings} white and {black_kings} black"
        )));
    }

    Ok(())
}

fn check_castling(castling: &str) -> EngineResult<()> {
    if castling == "-" {
        return Ok(());
    }
    let mut seen = [false; 4];
    for c in castling.chars() {
        let slot = match c {
            'K' => 0,
            'Q' => 1,
            'k' => 2,
            'q' => 3,
            _ => {
                return Err(EngineError::invalid_position(format!(
                    "invalid castling rights '{castling}'"
                )))
            }
        };
        if seen[slot] {
            return Err(EngineError::invalid_position(format!(
                "duplicate castling right '{c}'"
            )));
        }
        seen[slot] = true;
    }
    Ok(())
}

fn check_en_passant(square: &str) -> EngineResult<()> {
    if square == "-" {
        return Ok(());
    }
    let bytes = square.as_bytes();
    let valid = bytes.len() == 2
        && (b'a'..=b'h').contains(&bytes[0])
        && matches!(bytes[1], b'3' | b'6');
    if valid {
        Ok(())
    } else {
        Err(EngineError::invalid_position(format!(
            "invalid en passant square '{square}'"
        )))
    }
}

fn check_counter(name: &str, value: &str) -> EngineResult<()> {
    value.parse::<u32>().map(|_| ()).map_err(|_| {
        EngineError::invalid_position(format!("{name} must be a non-negative integer, found '{value}'"))
    })
}
