//! History entries and their serializable boundary projection.

use board_core::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, Chess, EnPassantMode};
use uuid::Uuid;

/// One committed step of a game's history.
///
/// The entry's index is its position in the owning vector, so renumbering
/// on structural edits is implicit.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Board state after this entry.
    pub position: Chess,
    /// Side that played this entry; `None` for the initial position.
    pub mover: Option<Side>,
    pub recorded_at: DateTime<Utc>,
    /// SAN, or a diagnostic note when no move could be inferred. `None`
    /// only for the initial position.
    pub san: Option<String>,
    /// Coordinate notation of the inferred move, when one exists.
    pub uci: Option<String>,
    pub is_legal: bool,
}

impl HistoryEntry {
    pub(crate) fn initial(position: Chess) -> Self {
        HistoryEntry {
            id: Uuid::new_v4(),
            position,
            mover: None,
            recorded_at: Utc::now(),
            san: None,
            uci: None,
            is_legal: true,
        }
    }

    pub(crate) fn to_record(&self, index: usize) -> EntryRecord {
        EntryRecord {
            id: self.id,
            fen: Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string(),
            mover: self.mover,
            recorded_at: self.recorded_at,
            san: self.san.clone(),
            uci: self.uci.clone(),
            is_legal: self.is_legal,
            index,
        }
    }
}

/// Read-only projection of a history entry, as handed to storage and API
/// collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: Uuid,
    pub fen: String,
    pub mover: Option<Side>,
    pub recorded_at: DateTime<Utc>,
    pub san: Option<String>,
    pub uci: Option<String>,
    pub is_legal: bool,
    pub index: usize,
}

/// PGN seven-tag-roster metadata for a recorded game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
}

impl Default for GameMeta {
    fn default() -> Self {
        GameMeta {
            event: "Casual Game".to_string(),
            site: "?".to_string(),
            date: Utc::now().format("%Y.%m.%d").to_string(),
            round: "1".to_string(),
            white: "White".to_string(),
            black: "Black".to_string(),
            result: "*".to_string(),
        }
    }
}
