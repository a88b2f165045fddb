//! Shared chess primitives: snapshot parsing, board diffing, and the
//! move-inference engine that reconstructs moves from sensor snapshots.

pub mod inference;
pub mod snapshot;

pub use inference::{coordinate, infer_move, Inference};
pub use snapshot::{
    changed_squares, parse_snapshot, same_placement, Side, SnapshotError, STANDARD_START_FEN,
};
