//! Snapshot parsing and placement comparison.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, Board, CastlingMode, Chess, Color, Position, Square};

/// FEN of the standard starting position.
pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("impossible position: {0}")]
    Impossible(String),
}

/// Parse a raw sensor snapshot line into a full position.
///
/// This is the boundary contract of the input validator: a structural
/// prefilter on the six FEN fields and eight board rows, then a strict FEN
/// parse and position-legality check. Strings that fail here must never
/// reach the ingestion queue.
pub fn parse_snapshot(line: &str) -> Result<Chess, SnapshotError> {
    let line = line.trim();

    let shape = Regex::new(r"^[1-8pnbrqkPNBRQK/]+ [wb] [KQkq-]+ [a-h1-8-]+ \d+ \d+$").unwrap();
    if !shape.is_match(line) {
        return Err(SnapshotError::Malformed(line.to_string()));
    }
    let placement = line.split(' ').next().unwrap_or_default();
    if placement.split('/').count() != 8 {
        return Err(SnapshotError::Malformed(line.to_string()));
    }

    let fen: Fen = line
        .parse()
        .map_err(|_| SnapshotError::Malformed(line.to_string()))?;
    fen.into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| SnapshotError::Impossible(e.to_string()))
}

/// Squares whose occupant (piece kind + color, or empty) differs between two
/// placements.
pub fn changed_squares(before: &Board, after: &Board) -> Vec<Square> {
    Square::ALL
        .into_iter()
        .filter(|&sq| before.piece_at(sq) != after.piece_at(sq))
        .collect()
}

/// Placement-only comparison: piece occupancy of the 64 squares, ignoring
/// side-to-move, castling rights, the en-passant target and the counters.
pub fn same_placement(a: &Chess, b: &Chess) -> bool {
    a.board() == b.board()
}

/// The color that played a move, as stored on a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}
