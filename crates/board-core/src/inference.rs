//! Move inference: reconstruct the single chess move that explains the
//! transition between two consecutive board snapshots.

use shakmaty::{
    san::{San, SanPlus},
    CastlingMode, Chess, Color, Move, Position, Rank, Role, Square,
};

use crate::snapshot::changed_squares;

/// Diagnostic notation for transitions outside the 2..=4 changed-square
/// window.
pub const NOTE_AMBIGUOUS: &str = "(ambiguous or unsupported change)";

/// Diagnostic notation for transitions that do not resolve to a clean
/// source/destination pair.
pub const NOTE_UNINFERABLE: &str = "(unable to infer move)";

/// Outcome of inferring the move between two consecutive snapshots.
#[derive(Debug, Clone)]
pub struct Inference {
    /// The reconstructed move, if one could be identified.
    pub mv: Option<Move>,
    /// SAN with check/mate suffix for explainable moves, or a diagnostic
    /// note.
    pub san: String,
    /// True only when a legal move's simulation reproduces the observed
    /// placement. Best-effort reconstructions always report false here; the
    /// caller re-derives legality by legal-set membership.
    pub legal: bool,
}

impl Inference {
    fn unexplained(note: &str) -> Self {
        Inference {
            mv: None,
            san: note.to_string(),
            legal: false,
        }
    }
}

/// Coordinate (UCI) form of a move, e.g. `e2e4` or `e7e8q`.
pub fn coordinate(m: &Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

/// Legal moves of a position in a fixed order: ascending source square,
/// then destination square, then promotion piece. Generator order is never
/// relied upon, so identical inputs always infer identical moves.
pub fn ordered_legal_moves(pos: &Chess) -> Vec<Move> {
    let mut moves: Vec<Move> = pos.legal_moves().into_iter().collect();
    moves.sort_by_key(|m| {
        (
            m.from().map_or(64, u32::from),
            u32::from(m.to()),
            m.promotion().map_or(0, |r| r as u32),
        )
    });
    moves
}

/// Infer the move explaining the transition `before -> after`.
///
/// A transition changes 2 squares (quiet move or capture), 3 (en passant)
/// or 4 (castling); anything else is rejected outright rather than guessed
/// at. When no legal move reproduces the observed placement, a 2-square
/// change is reconstructed best-effort so the history can still record what
/// the sensors saw.
pub fn infer_move(before: &Chess, after: &Chess) -> Inference {
    let changed = changed_squares(before.board(), after.board());

    if changed.len() < 2 || changed.len() > 4 {
        return Inference::unexplained(NOTE_AMBIGUOUS);
    }

    // A legal move whose simulation reproduces the observed placement wins
    // outright. Castling and en passant are covered here.
    for m in ordered_legal_moves(before) {
        let mut sim = before.clone();
        sim.play_unchecked(&m);
        if sim.board() == after.board() {
            let san = SanPlus::from_move(before.clone(), &m).to_string();
            return Inference {
                mv: Some(m),
                san,
                legal: true,
            };
        }
    }

    if changed.len() != 2 {
        return Inference::unexplained(NOTE_UNINFERABLE);
    }

    // Best effort: exactly one square must have been vacated and exactly one
    // must hold a piece it did not hold before.
    let mut source = None;
    let mut dest = None;
    for &sq in &changed {
        let was = before.board().piece_at(sq);
        let now = after.board().piece_at(sq);
        match (was, now) {
            (Some(_), None) => {
                if source.replace(sq).is_some() {
                    return Inference::unexplained(NOTE_UNINFERABLE);
                }
            }
            (_, Some(now_piece)) if was.map_or(true, |p| p.color != now_piece.color) => {
                if dest.replace(sq).is_some() {
                    return Inference::unexplained(NOTE_UNINFERABLE);
                }
            }
            _ => {}
        }
    }
    let (Some(from), Some(to)) = (source, dest) else {
        return Inference::unexplained(NOTE_UNINFERABLE);
    };
    let Some(piece) = before.board().piece_at(from) else {
        return Inference::unexplained(NOTE_UNINFERABLE);
    };

    let promotion = if piece.role == Role::Pawn && is_last_rank(to, piece.color) {
        after.board().piece_at(to).map(|p| p.role)
    } else {
        None
    };
    let capture = before.board().piece_at(to).map(|p| p.role);
    let mv = Move::Normal {
        role: piece.role,
        from,
        capture,
        to,
        promotion,
    };

    let mut san = if before.legal_moves().contains(&mv) {
        San::from_move(before, &mv).to_string()
    } else {
        fallback_notation(before, &mv)
    };

    // The reconstruction may still be playable; suffix check/mate when
    // simulation succeeds and stay silent when it does not.
    if let Ok(sim) = before.clone().play(&mv) {
        if sim.is_checkmate() {
            san.push('#');
        } else if sim.is_check() {
            san.push('+');
        }
    }

    Inference {
        mv: Some(mv),
        san,
        legal: false,
    }
}

fn is_last_rank(sq: Square, color: Color) -> bool {
    match color {
        Color::White => sq.rank() == Rank::Eighth,
        Color::Black => sq.rank() == Rank::First,
    }
}

/// Manually composed notation for a move that cannot be legally described.
/// No disambiguation prefix: the entry is already flagged illegal
/// downstream.
fn fallback_notation(before: &Chess, m: &Move) -> String {
    let Move::Normal {
        role,
        from,
        to,
        promotion,
        ..
    } = *m
    else {
        return coordinate(m);
    };
    let mut san = String::new();
    if role != Role::Pawn {
        san.push(role.upper_char());
    }
    let capture = before.board().piece_at(to).is_some()
        || (role == Role::Pawn && from.file() != to.file());
    if capture {
        san.push('x');
    }
    san.push_str(&to.to_string());
    if let Some(promo) = promotion {
        san.push('=');
        san.push(promo.upper_char());
    }
    san
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::parse_snapshot;

    fn pos(fen: &str) -> Chess {
        parse_snapshot(fen).unwrap()
    }

    fn play_san(before: &Chess, san: &str) -> Chess {
        let mv = san
            .parse::<San>()
            .unwrap()
            .to_move(before)
            .unwrap();
        before.clone().play(&mv).unwrap()
    }

    #[test]
    fn test_deterministic_move_order() {
        let moves = ordered_legal_moves(&Chess::default());
        assert_eq!(moves.len(), 20);
        // b1 is the lowest source square with a move in the start position.
        assert_eq!(moves[0].from(), Some(Square::B1));
        assert_eq!(moves[0].to(), Square::A3);
    }

    #[test]
    fn test_recovers_pawn_push() {
        let before = Chess::default();
        let after = play_san(&before, "e4");
        let inference = infer_move(&before, &after);
        assert!(inference.legal);
        assert_eq!(inference.san, "e4");
        assert_eq!(coordinate(&inference.mv.unwrap()), "e2e4");
    }

    #[test]
    fn test_recovers_capture() {
        let before = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let after = play_san(&before, "exd5");
        let inference = infer_move(&before, &after);
        assert!(inference.legal);
        assert_eq!(inference.san, "exd5");
    }

    #[test]
    fn test_recovers_castling_both_wings() {
        let before = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");

        let kingside = play_san(&before, "O-O");
        let inference = infer_move(&before, &kingside);
        assert!(inference.legal);
        assert_eq!(inference.san, "O-O");

        let queenside = play_san(&before, "O-O-O");
        let inference = infer_move(&before, &queenside);
        assert!(inference.legal);
        assert_eq!(inference.san, "O-O-O");
    }

    #[test]
    fn test_recovers_en_passant() {
        let before = pos("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3");
        let after = play_san(&before, "exd6");
        // Three squares change: both endpoints plus the captured pawn.
        assert_eq!(changed_squares(before.board(), after.board()).len(), 3);
        let inference = infer_move(&before, &after);
        assert!(inference.legal);
        assert_eq!(inference.san, "exd6");
    }

    #[test]
    fn test_recovers_promotion_and_underpromotion() {
        let before = pos("8/P6k/8/8/8/8/8/7K w - - 0 1");

        let queen = play_san(&before, "a8=Q");
        let inference = infer_move(&before, &queen);
        assert!(inference.legal);
        assert_eq!(inference.san, "a8=Q");
        assert_eq!(coordinate(&inference.mv.unwrap()), "a7a8q");

        let knight = play_san(&before, "a8=N");
        let inference = infer_move(&before, &knight);
        assert!(inference.legal);
        assert_eq!(inference.san, "a8=N");
        assert_eq!(coordinate(&inference.mv.unwrap()), "a7a8n");
    }

    #[test]
    fn test_check_suffix() {
        let before = pos("4k3/8/8/8/8/8/8/K6Q w - - 0 1");
        let after = play_san(&before, "Qe4+");
        let inference = infer_move(&before, &after);
        assert!(inference.legal);
        assert_eq!(inference.san, "Qe4+");
    }

    #[test]
    fn test_mate_suffix() {
        let before = pos("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let after = play_san(&before, "Qh4#");
        let inference = infer_move(&before, &after);
        assert!(inference.legal);
        assert_eq!(inference.san, "Qh4#");
    }

    #[test]
    fn test_rejects_unchanged_placement() {
        let before = Chess::default();
        let after = pos("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");
        let inference = infer_move(&before, &after);
        assert!(inference.mv.is_none());
        assert!(!inference.legal);
        assert_eq!(inference.san, NOTE_AMBIGUOUS);
    }

    #[test]
    fn test_rejects_single_square_change() {
        let before = Chess::default();
        // a8 rook vanished.
        let after = pos("1nbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQk - 0 1");
        let inference = infer_move(&before, &after);
        assert!(inference.mv.is_none());
        assert_eq!(inference.san, NOTE_AMBIGUOUS);
    }

    #[test]
    fn test_rejects_mass_change() {
        let before = Chess::default();
        // All eight white pawns vanished.
        let after = pos("rnbqkbnr/pppppppp/8/8/8/8/8/RNBQKBNR b KQkq - 0 1");
        let inference = infer_move(&before, &after);
        assert!(inference.mv.is_none());
        assert_eq!(inference.san, NOTE_AMBIGUOUS);
    }

    #[test]
    fn test_rejects_two_vacated_squares() {
        let before = Chess::default();
        // e2 and d7 both vanished: no destination can be identified.
        let after = pos("rnbqkbnr/ppp1pppp/8/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        let inference = infer_move(&before, &after);
        assert!(inference.mv.is_none());
        assert_eq!(inference.san, NOTE_UNINFERABLE);
    }

    #[test]
    fn test_best_effort_illegal_move() {
        let before = Chess::default();
        // The queen cannot reach d6 from the start position.
        let after = pos("rnbqkbnr/pppppppp/3Q4/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1");
        let inference = infer_move(&before, &after);
        assert!(!inference.legal);
        assert_eq!(inference.san, "Qd6");
        assert_eq!(coordinate(&inference.mv.unwrap()), "d1d6");
    }

    #[test]
    fn test_best_effort_pawn_capture_marker() {
        // A pawn changing file reads as a capture even when the target
        // square was empty before.
        let before = pos("4k3/8/8/3p4/8/8/4K3/8 b - - 0 1");
        let after = pos("4k3/8/8/8/4p3/8/4K3/8 w - - 0 2");
        let inference = infer_move(&before, &after);
        assert!(!inference.legal);
        assert_eq!(inference.san, "xe4");
    }
}
