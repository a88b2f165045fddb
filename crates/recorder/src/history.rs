//! The game-history state machine: snapshot ingestion, manual edits, and
//! cascading reprocessing.

use std::collections::VecDeque;

use board_core::{coordinate, infer_move, same_placement, Side};
use chrono::Utc;
use parking_lot::Mutex;
use shakmaty::{Chess, Position};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entry::{EntryRecord, GameMeta, HistoryEntry};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("the initial position cannot be edited")]
    InitialEntryImmutable,

    #[error("no entry at index {0}")]
    IndexOutOfRange(usize),

    #[error("no entry with id {0}")]
    EntryNotFound(Uuid),

    #[error("placement is identical to the preceding entry")]
    UnchangedPlacement,

    #[error("saved game has no entries")]
    EmptyRecords,

    #[error("saved entries are not contiguous at index {0}")]
    NonContiguousRecords(usize),

    #[error("the initial record must not carry a move")]
    InvalidInitialRecord,

    #[error(transparent)]
    Snapshot(#[from] board_core::SnapshotError),
}

/// Addresses one history entry for a manual edit.
#[derive(Debug, Clone, Copy)]
pub enum EntryRef {
    Index(usize),
    Id(Uuid),
}

/// Ordered move history of a single game, fed by sensor snapshots.
///
/// One exclusive lock over the committed entries guards draining, edits and
/// reads; the pending queue has its own short-lived lock so `enqueue` never
/// waits behind a reprocessing pass. Lock order is entries before pending,
/// and no operation holds either across a suspension point (there are
/// none: all work is synchronous board simulation).
pub struct GameHistory {
    game_id: Uuid,
    meta: Mutex<GameMeta>,
    entries: Mutex<Vec<HistoryEntry>>,
    pending: Mutex<VecDeque<Chess>>,
}

impl GameHistory {
    /// New game starting from the standard position.
    pub fn new(game_id: Uuid) -> Self {
        Self::with_initial(game_id, Chess::default())
    }

    /// New game starting from an arbitrary initial position.
    pub fn with_initial(game_id: Uuid, position: Chess) -> Self {
        GameHistory {
            game_id,
            meta: Mutex::new(GameMeta::default()),
            entries: Mutex::new(vec![HistoryEntry::initial(position)]),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Rebuild a history from a saved record list. Ids, timestamps,
    /// notations and legality flags are preserved verbatim.
    pub fn from_records(
        game_id: Uuid,
        meta: GameMeta,
        records: &[EntryRecord],
    ) -> Result<Self, HistoryError> {
        let first = records.first().ok_or(HistoryError::EmptyRecords)?;
        if first.san.is_some() || first.uci.is_some() || first.mover.is_some() {
            return Err(HistoryError::InvalidInitialRecord);
        }
        let mut entries = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if record.index != i {
                return Err(HistoryError::NonContiguousRecords(i));
            }
            entries.push(HistoryEntry {
                id: record.id,
                position: board_core::parse_snapshot(&record.fen)?,
                mover: record.mover,
                recorded_at: record.recorded_at,
                san: record.san.clone(),
                uci: record.uci.clone(),
                is_legal: record.is_legal,
            });
        }
        Ok(GameHistory {
            game_id,
            meta: Mutex::new(meta),
            entries: Mutex::new(entries),
            pending: Mutex::new(VecDeque::new()),
        })
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    pub fn meta(&self) -> GameMeta {
        self.meta.lock().clone()
    }

    pub fn set_meta(&self, meta: GameMeta) {
        *self.meta.lock() = meta;
    }

    pub fn set_result(&self, result: &str) {
        self.meta.lock().result = result.to_string();
    }

    /// Number of committed entries, the initial position included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Board state after the latest committed entry.
    pub fn current_position(&self) -> Chess {
        self.entries
            .lock()
            .last()
            .expect("history always has an initial entry")
            .position
            .clone()
    }

    /// Ordered read-only snapshot of the committed entries.
    pub fn records(&self) -> Vec<EntryRecord> {
        let entries = self.entries.lock();
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| e.to_record(i))
            .collect()
    }

    /// Queue a validated snapshot for processing. Never blocks behind a
    /// drain or an edit.
    pub fn enqueue(&self, position: Chess) {
        self.pending.lock().push_back(position);
    }

    /// Process queued snapshots until the queue is empty. The committed
    /// entries stay locked for the whole pass, so readers never observe a
    /// half-ingested batch.
    pub fn drain(&self) {
        let mut entries = self.entries.lock();
        loop {
            let next = self.pending.lock().pop_front();
            let Some(snapshot) = next else { break };
            Self::commit_snapshot(&mut entries, snapshot);
        }
    }

    /// Replace the entry at `target` with one recomputed from `position`,
    /// then reprocess everything after it. The replaced entry's id is
    /// reissued, not preserved.
    pub fn change(&self, target: EntryRef, position: Chess) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock();
        let index = Self::resolve(&entries, target)?;
        if index == 0 {
            return Err(HistoryError::InitialEntryImmutable);
        }
        let prev_position = entries[index - 1].position.clone();
        if same_placement(&prev_position, &position) {
            return Err(HistoryError::UnchangedPlacement);
        }
        info!(index, "changing history entry");
        entries[index] = Self::build_entry(&prev_position, position);
        Self::reprocess_from(&mut entries, index + 1);
        Ok(())
    }

    /// Insert a new entry immediately after `target`, computed against that
    /// entry's position, then reprocess the shifted tail.
    pub fn insert(&self, target: EntryRef, position: Chess) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock();
        let index = Self::resolve(&entries, target)?;
        if index == 0 {
            return Err(HistoryError::InitialEntryImmutable);
        }
        let context = entries[index].position.clone();
        if same_placement(&context, &position) {
            return Err(HistoryError::UnchangedPlacement);
        }
        info!(index, "inserting history entry");
        let entry = Self::build_entry(&context, position);
        entries.insert(index + 1, entry);
        Self::reprocess_from(&mut entries, index + 2);
        Ok(())
    }

    /// Delete the entry at `target` and reprocess the entries that follow.
    pub fn delete(&self, target: EntryRef) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock();
        let index = Self::resolve(&entries, target)?;
        if index == 0 {
            return Err(HistoryError::InitialEntryImmutable);
        }
        info!(index, "deleting history entry");
        entries.remove(index);
        Self::reprocess_from(&mut entries, index);
        Ok(())
    }

    fn resolve(entries: &[HistoryEntry], target: EntryRef) -> Result<usize, HistoryError> {
        match target {
            EntryRef::Index(index) => {
                if index >= entries.len() {
                    return Err(HistoryError::IndexOutOfRange(index));
                }
                Ok(index)
            }
            EntryRef::Id(id) => entries
                .iter()
                .position(|e| e.id == id)
                .ok_or(HistoryError::EntryNotFound(id)),
        }
    }

    fn commit_snapshot(entries: &mut Vec<HistoryEntry>, snapshot: Chess) {
        let prev_position = {
            let prev = entries.last().expect("history always has an initial entry");
            if same_placement(&prev.position, &snapshot) {
                debug!("no piece movement detected, snapshot dropped");
                return;
            }
            prev.position.clone()
        };
        let entry = Self::build_entry(&prev_position, snapshot);
        if !entry.is_legal {
            warn!(
                san = entry.san.as_deref().unwrap_or_default(),
                "committed transition is not a legal move"
            );
        }
        entries.push(entry);
    }

    /// Infer the move explaining `prev -> position` and wrap it as an
    /// entry. Legality is re-derived here as membership in the previous
    /// position's legal-move set, independent of the engine's own flag.
    fn build_entry(prev: &Chess, position: Chess) -> HistoryEntry {
        let inference = infer_move(prev, &position);
        let is_legal = inference
            .mv
            .as_ref()
            .map_or(false, |m| prev.legal_moves().contains(m));
        HistoryEntry {
            id: Uuid::new_v4(),
            mover: Some(Side::from(prev.turn())),
            recorded_at: Utc::now(),
            uci: inference.mv.as_ref().map(coordinate),
            san: Some(inference.san),
            is_legal,
            position,
        }
    }

    /// Recompute every entry from `start` on, each against its (possibly
    /// just-recomputed) predecessor. An entry whose placement collapses
    /// onto the predecessor is removed, keeping the no-identical-placement
    /// invariant intact across the whole chain.
    fn reprocess_from(entries: &mut Vec<HistoryEntry>, start: usize) {
        let mut i = start.max(1);
        while i < entries.len() {
            if same_placement(&entries[i - 1].position, &entries[i].position) {
                warn!(index = i, "entry collapsed onto its predecessor, removing");
                entries.remove(i);
                continue;
            }
            let prev_position = entries[i - 1].position.clone();
            let position = entries[i].position.clone();
            entries[i] = Self::build_entry(&prev_position, position);
            i += 1;
        }
    }
}
