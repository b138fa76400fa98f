//! Gobblet Jr. rules engine.
//!
//! Two players (Red and Yellow) each hold two Small, two Medium and two Large
//! pieces. A turn either places a piece from the reserve or moves one of the
//! player's own visible pieces. A larger piece may cover ("gobble") a smaller
//! one. Three visible pieces of one color in a row, column or diagonal win.
//!
//! # Cell Encoding (6 bits)
//!
//! Sizes inside a stack strictly increase from bottom to top, so a cell holds
//! at most one piece per size and the stack order is the size order. A cell
//! is therefore stored indexed by SIZE, not by stack position:
//!
//! ```text
//! Bits 0-1: Small piece owner  (0=empty, 1=Red, 2=Yellow)
//! Bits 2-3: Medium piece owner
//! Bits 4-5: Large piece owner
//! ```
//!
//! The top of the stack is the largest size present.
//!
//! # Board Encoding (64-bit)
//!
//! ```text
//! Bits 0-53: 9 cells × 6 bits, row-major
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! Bits 54-63: zero
//! ```
//!
//! # Turn Obligation
//!
//! Touching one of your own board pieces commits you to moving it. If the
//! touched piece has nowhere to go, the only way out is to forfeit. See
//! [`Game`] for the full state machine.
//!
//! ```
//! use gobblet_core::{Color, Game, Pos, Size};
//!
//! let mut game = Game::new();
//! game.place(Size::Large, Pos::new(1, 1)?)?;
//! assert_eq!(game.current_player(), Color::Yellow);
//! assert_eq!(game.reserve(Color::Red).count(Size::Large), 1);
//! # Ok::<(), gobblet_core::RuleError>(())
//! ```

mod board;
mod config;
mod error;
mod game;
mod reserve;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};

pub use board::{Board, Cell, MoveOutcome, WIN_LINES};
pub use config::GameConfig;
pub use error::{RuleError, RuleResult};
pub use game::{Game, Phase, Status, Touch, WinReason};
pub use reserve::{Reserve, PIECES_PER_SIZE};

/// Player color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    Red = 1,
    Yellow = 2,
}

impl Color {
    /// Get the opponent color.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Yellow,
            Color::Yellow => Color::Red,
        }
    }

    /// Convert from the 2-bit cell encoding (1 or 2).
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Color> {
        match bits {
            1 => Some(Color::Red),
            2 => Some(Color::Yellow),
            _ => None,
        }
    }

    /// Both colors, Red first.
    pub fn all() -> impl Iterator<Item = Color> {
        [Color::Red, Color::Yellow].into_iter()
    }

    /// Parse "red" / "yellow" (case-insensitive, "r" / "y" accepted).
    pub fn parse(s: &str) -> Option<Color> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Some(Color::Red),
            "yellow" | "y" => Some(Color::Yellow),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Yellow => "Yellow",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Piece size, ordered Small < Medium < Large.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Size {
    Small = 0,
    Medium = 1,
    Large = 2,
}

impl Size {
    /// Check if this size can gobble (cover) another size.
    #[inline]
    pub fn can_gobble(self, other: Size) -> bool {
        self > other
    }

    /// Convert from index (0, 1, 2) to Size.
    #[inline]
    pub fn from_index(idx: usize) -> Option<Size> {
        match idx {
            0 => Some(Size::Small),
            1 => Some(Size::Medium),
            2 => Some(Size::Large),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// All sizes, smallest first.
    pub fn all() -> impl DoubleEndedIterator<Item = Size> {
        [Size::Small, Size::Medium, Size::Large].into_iter()
    }

    /// Single-letter notation: S, M, L.
    pub fn letter(self) -> char {
        match self {
            Size::Small => 'S',
            Size::Medium => 'M',
            Size::Large => 'L',
        }
    }

    /// Parse a size from its letter or full name (case-insensitive).
    pub fn parse(s: &str) -> Option<Size> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "small" => Some(Size::Small),
            "m" | "medium" => Some(Size::Medium),
            "l" | "large" => Some(Size::Large),
            _ => None,
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        };
        f.write_str(name)
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pos(u8);

impl Pos {
    /// Create a position from row and column, rejecting anything off the board.
    pub fn new(row: u8, col: u8) -> RuleResult<Pos> {
        if row < 3 && col < 3 {
            Ok(Pos(row * 3 + col))
        } else {
            Err(RuleError::OffBoard { row, col })
        }
    }

    /// Create a position from a row-major index (0-8).
    #[inline]
    pub fn from_index(idx: usize) -> Option<Pos> {
        if idx < 9 {
            Some(Pos(idx as u8))
        } else {
            None
        }
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Row-major index (0-8).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all 9 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..9).map(Pos)
    }
}

impl TryFrom<u8> for Pos {
    type Error = RuleError;

    fn try_from(idx: u8) -> RuleResult<Pos> {
        Pos::new(idx / 3, idx % 3)
    }
}

impl From<Pos> for u8 {
    fn from(pos: Pos) -> u8 {
        pos.0
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row(), self.col())
    }
}

/// A single piece. Pieces never change owner or size; they only move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Color,
    pub size: Size,
}

impl Piece {
    #[inline]
    pub const fn new(owner: Color, size: Size) -> Piece {
        Piece { owner, size }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.owner, self.size)
    }
}
