//! Move recording for sensor-driven chess boards: ingest full-board
//! snapshots, infer the moves between them, and keep the committed history
//! consistent under retroactive edits.

pub mod entry;
pub mod history;
pub mod pgn;

pub use entry::{EntryRecord, GameMeta, HistoryEntry};
pub use history::{EntryRef, GameHistory, HistoryError};
