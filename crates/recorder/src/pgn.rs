//! PGN rendering of a recorded game.

use board_core::Side;

use crate::entry::{EntryRecord, GameMeta};

/// Render the seven-tag roster and movetext for a recorded game.
///
/// Entries that carry an actual move contribute their notation, illegal
/// ones included; entries holding only a diagnostic note are skipped. A
/// game whose first recorded move is Black's renders as a `1... e5`
/// continuation.
pub fn render(meta: &GameMeta, records: &[EntryRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("[Event \"{}\"]\n", meta.event));
    out.push_str(&format!("[Site \"{}\"]\n", meta.site));
    out.push_str(&format!("[Date \"{}\"]\n", meta.date));
    out.push_str(&format!("[Round \"{}\"]\n", meta.round));
    out.push_str(&format!("[White \"{}\"]\n", meta.white));
    out.push_str(&format!("[Black \"{}\"]\n", meta.black));
    out.push_str(&format!("[Result \"{}\"]\n", meta.result));
    out.push('\n');

    let mut movetext = String::new();
    let mut move_number = 1u32;
    let mut last_was_white = false;
    for record in records {
        if record.index == 0 || record.uci.is_none() {
            continue;
        }
        let Some(san) = record.san.as_deref() else {
            continue;
        };
        if !movetext.is_empty() {
            movetext.push(' ');
        }
        match record.mover {
            Some(Side::Black) => {
                if last_was_white {
                    movetext.push_str(san);
                } else {
                    movetext.push_str(&format!("{move_number}... {san}"));
                }
                move_number += 1;
                last_was_white = false;
            }
            _ => {
                if last_was_white {
                    move_number += 1;
                }
                movetext.push_str(&format!("{move_number}. {san}"));
                last_was_white = true;
            }
        }
    }

    if movetext.is_empty() {
        out.push_str(&meta.result);
    } else {
        out.push_str(&movetext);
        out.push(' ');
        out.push_str(&meta.result);
    }
    out.push('\n');
    out
}
