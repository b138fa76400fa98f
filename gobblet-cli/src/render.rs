//! Plain-text rendering of the engine state.

use std::fmt::Write;

use gobblet_core::{Color, Game, Piece, Pos, Size, Status, WinReason};

fn piece_label(piece: Piece) -> String {
    let color = match piece.owner {
        Color::Red => 'R',
        Color::Yellow => 'Y',
    };
    format!("{}{}", color, piece.size.letter())
}

/// Board grid with coordinates. The touched piece is shown as `<..>`.
pub fn render_board(game: &Game) -> String {
    let mut out = String::from("     0    1    2\n");
    for at in Pos::all() {
        if at.col() == 0 {
            let _ = write!(out, "{} ", at.row());
        }
        let label = game
            .board()
            .top(at)
            .map(piece_label)
            .unwrap_or_else(|| "  ".to_string());
        if game.touched() == Some(at) {
            let _ = write!(out, " <{label}>");
        } else {
            let _ = write!(out, " [{label}]");
        }
        if at.col() == 2 {
            out.push('\n');
        }
    }
    out
}

pub fn render_reserves(game: &Game) -> String {
    let mut out = String::new();
    for color in Color::all() {
        let reserve = game.reserve(color);
        let _ = write!(out, "{:<7} reserve:", color.name());
        for size in Size::all().rev() {
            let _ = write!(out, " {}:{}", size.letter(), reserve.count(size));
        }
        out.push('\n');
    }
    out
}

/// Everything the player needs before the next command.
pub fn render(game: &Game) -> String {
    let mut out = render_board(game);
    out.push('\n');
    out.push_str(&render_reserves(game));

    match game.status() {
        Status::Won { winner, reason } => {
            let _ = writeln!(out, "\n{winner} wins!");
            if reason == WinReason::Forfeit {
                out.push_str("by forfeit\n");
            }
        }
        Status::InProgress => {
            let _ = writeln!(out, "Current Player: {}", game.current_player());
            if let Some(size) = game.selected_size() {
                let _ = writeln!(out, "Selected: {size}");
            }
            if game.must_move_touched() {
                if game.has_legal_moves() {
                    out.push_str("You must move the highlighted piece!\n");
                } else {
                    out.push_str("No valid moves! Type forfeit to continue.\n");
                }
            }
        }
    }
    out
}

/// Message for a rejected command. A slide can touch its piece and then fail
/// the move, so the board is shown again whenever a piece is now touched.
pub fn render_rejection(game: &Game, err: &impl std::fmt::Display) -> String {
    let mut out = format!("Rejected: {err}\n");
    if game.must_move_touched() {
        out.push('\n');
        out.push_str(&render(game));
    }
    out
}
