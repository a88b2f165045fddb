//! Shared helpers for integration tests.

#![allow(dead_code)]

use shakmaty::{fen::Fen, san::San, CastlingMode, Chess, Position};

/// Parse a FEN into a position, panicking on bad test data.
pub fn position(fen: &str) -> Chess {
    fen.parse::<Fen>()
        .expect("test FEN parses")
        .into_position::<Chess>(CastlingMode::Standard)
        .expect("test FEN is a legal position")
}

/// Apply a SAN move to a position.
pub fn play_san(pos: &Chess, san: &str) -> Chess {
    let mv = san
        .parse::<San>()
        .expect("test SAN parses")
        .to_move(pos)
        .expect("test SAN is legal here");
    pos.clone().play(&mv).expect("test move plays")
}

/// Apply a sequence of SAN moves from a starting position.
pub fn play_line(start: &Chess, line: &[&str]) -> Chess {
    line.iter().fold(start.clone(), |pos, san| play_san(&pos, san))
}

/// Install a subscriber so `RUST_LOG` controls test output.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
