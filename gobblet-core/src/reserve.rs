//! Per-player stock of unplaced pieces.

use serde::Serialize;

use crate::{Color, RuleError, RuleResult, Size};

/// Each player starts with this many pieces of every size.
pub const PIECES_PER_SIZE: u8 = 2;

/// Unplaced pieces for one player, indexed by size.
///
/// Counts only ever go down. A piece moved on the board never returns here.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct Reserve {
    color: Color,
    /// [small, medium, large]
    counts: [u8; 3],
}

impl Reserve {
    /// A full reserve: 2 Small, 2 Medium, 2 Large.
    pub fn full(color: Color) -> Reserve {
        Reserve {
            color,
            counts: [PIECES_PER_SIZE; 3],
        }
    }

    /// Reserve left over after `on_board` pieces ([small, medium, large]) were placed.
    pub fn remaining(color: Color, on_board: [u8; 3]) -> RuleResult<Reserve> {
        let mut counts = [0u8; 3];
        for size in Size::all() {
            let placed = on_board[size.index()];
            counts[size.index()] = PIECES_PER_SIZE
                .checked_sub(placed)
                .ok_or(RuleError::TooManyPieces { color, size })?;
        }
        Ok(Reserve { color, counts })
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn count(&self, size: Size) -> u8 {
        self.counts[size.index()]
    }

    /// Counts as [small, medium, large].
    #[inline]
    pub fn counts(&self) -> [u8; 3] {
        self.counts
    }

    pub fn total(&self) -> u8 {
        self.counts.iter().sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Take one piece of `size` out of the reserve.
    pub(crate) fn take(&mut self, size: Size) -> RuleResult<()> {
        let slot = &mut self.counts[size.index()];
        if *slot == 0 {
            return Err(RuleError::NoReserve {
                color: self.color,
                size,
            });
        }
        *slot -= 1;
        Ok(())
    }
}
