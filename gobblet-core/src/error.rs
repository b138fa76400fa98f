//! Rule violations returned by the engine.
//!
//! Every rejection is synchronous and non-fatal. A call that returns an
//! error leaves the board, reserves and turn state exactly as they were.

use thiserror::Error;

use crate::{Color, Pos, Size};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    /// The reserve holds no piece of the requested size.
    #[error("{color} has no {size} pieces left in reserve")]
    NoReserve { color: Color, size: Size },

    /// The target cell is topped by a piece of equal or larger size.
    #[error("cannot place a {size} piece on {at}")]
    IllegalTarget { size: Size, at: Pos },

    #[error("cannot move from {from} to {to}")]
    IllegalMove { from: Pos, to: Pos },

    /// The visible piece belongs to the other player.
    #[error("the piece on {at} is not yours")]
    NotOwned { at: Pos },

    #[error("there is no piece on {at}")]
    Empty { at: Pos },

    #[error("({row},{col}) is off the board")]
    OffBoard { row: u8, col: u8 },

    /// A piece has been touched and must be moved before anything else.
    #[error("you must move the piece on {at}")]
    MustMoveTouched { at: Pos },

    #[error("no reserve piece selected")]
    NoSelection,

    /// A reserve size is selected; the next board action must place it.
    #[error("place the selected {size} piece first")]
    SelectionPending { size: Size },

    #[error("no piece has been touched")]
    NothingTouched,

    /// Forfeit is only offered when the touched piece has no legal destination.
    #[error("forfeit is only available when the touched piece cannot move")]
    ForfeitUnavailable,

    /// A starting board uses more pieces of one size than a player owns.
    #[error("{color} has more than two {size} pieces on the board")]
    TooManyPieces { color: Color, size: Size },

    /// Raw board bits with an owner slot of 3 or bits past the ninth cell.
    #[error("{bits:#x} is not a valid board encoding")]
    InvalidBoard { bits: u64 },

    #[error("the game is over, {winner} won")]
    GameOver { winner: Color },
}

/// Result type alias for engine operations.
pub type RuleResult<T> = Result<T, RuleError>;
