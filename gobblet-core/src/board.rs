//! Board model: packed cell stacks, legality checks and win detection.

use serde::{Deserialize, Serialize};

use crate::{Color, Piece, Pos, Reserve, RuleError, RuleResult, Size};

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
pub const WIN_LINES: [[Pos; 3]; 8] = [
    [Pos(0), Pos(1), Pos(2)], // Row 0
    [Pos(3), Pos(4), Pos(5)], // Row 1
    [Pos(6), Pos(7), Pos(8)], // Row 2
    [Pos(0), Pos(3), Pos(6)], // Col 0
    [Pos(1), Pos(4), Pos(7)], // Col 1
    [Pos(2), Pos(5), Pos(8)], // Col 2
    [Pos(0), Pos(4), Pos(8)], // Main diagonal
    [Pos(2), Pos(4), Pos(6)], // Anti-diagonal
];

/// Result of a legal board move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The piece moved and the game goes on (subject to the post-move win check).
    Success,
    /// The piece moved, but lifting it uncovered an opponent line that the
    /// destination does not cover. The opponent wins.
    OpponentWin,
}

/// One cell's stack of pieces, packed into 6 bits (see crate docs).
///
/// Only the top piece is visible. Pushes must be strictly larger than the
/// current top, so the stack is always ordered Small → Medium → Large.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
pub struct Cell(u8);

impl Cell {
    /// Mask for a single layer (2 bits: 0=empty, 1=Red, 2=Yellow).
    const LAYER_MASK: u8 = 0b11;

    /// Owner of the piece of `size` in this stack, visible or not.
    #[inline]
    pub fn owner_of(self, size: Size) -> Option<Color> {
        Color::from_bits((self.0 >> (size as u8 * 2)) & Self::LAYER_MASK)
    }

    /// The visible piece: the largest size present.
    #[inline]
    pub fn top(self) -> Option<Piece> {
        Size::all()
            .rev()
            .find_map(|size| self.owner_of(size).map(|owner| Piece::new(owner, size)))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        Size::all().filter(|&size| self.owner_of(size).is_some()).count()
    }

    /// Pieces from bottom to top.
    pub fn pieces(self) -> impl Iterator<Item = Piece> {
        Size::all().filter_map(move |size| self.owner_of(size).map(|owner| Piece::new(owner, size)))
    }

    /// Whether a piece of `size` may go on top of this stack.
    #[inline]
    pub fn accepts(self, size: Size) -> bool {
        match self.top() {
            None => true,
            Some(top) => size.can_gobble(top.size),
        }
    }

    /// Push a piece on top. Returns false (and leaves the cell alone) if the
    /// piece is not strictly larger than the current top.
    fn push(&mut self, piece: Piece) -> bool {
        if !self.accepts(piece.size) {
            return false;
        }
        self.0 |= (piece.owner as u8) << (piece.size as u8 * 2);
        true
    }

    fn pop(&mut self) -> Option<Piece> {
        let top = self.top()?;
        self.0 &= !(Self::LAYER_MASK << (top.size as u8 * 2));
        Some(top)
    }
}

/// The 3x3 board, packed into a single u64.
///
/// Deserializes from the raw bits, rejecting unused high bits and owner
/// slots holding 3. Piece counts are checked by [`crate::Game::from_board`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Board(u64);

impl TryFrom<u64> for Board {
    type Error = RuleError;

    fn try_from(bits: u64) -> RuleResult<Board> {
        let used = Board::CELL_BITS * 9;
        let board = Board(bits);
        let bad_slot = Pos::all().any(|pos| {
            let cell = board.cell(pos);
            Size::all().any(|size| (cell.0 >> (size as u8 * 2)) & Cell::LAYER_MASK == Cell::LAYER_MASK)
        });
        if bits >> used != 0 || bad_slot {
            return Err(RuleError::InvalidBoard { bits });
        }
        Ok(board)
    }
}

impl From<Board> for u64 {
    fn from(board: Board) -> u64 {
        board.0
    }
}

impl Board {
    /// Bits per cell (6 bits = 3 sizes × 2 bits each).
    const CELL_BITS: u32 = 6;
    /// Mask for a single cell (0b111111).
    const CELL_MASK: u64 = 0b111111;

    /// An empty board.
    #[inline]
    pub fn new() -> Board {
        Board(0)
    }

    /// Get the stack at a position.
    #[inline]
    pub fn cell(&self, pos: Pos) -> Cell {
        Cell(((self.0 >> (pos.0 as u32 * Self::CELL_BITS)) & Self::CELL_MASK) as u8)
    }

    #[inline]
    fn set_cell(&mut self, pos: Pos, cell: Cell) {
        let shift = pos.0 as u32 * Self::CELL_BITS;
        self.0 = (self.0 & !(Self::CELL_MASK << shift)) | ((cell.0 as u64 & Self::CELL_MASK) << shift);
    }

    /// Get the top (visible) piece at a position.
    #[inline]
    pub fn top(&self, pos: Pos) -> Option<Piece> {
        self.cell(pos).top()
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.cell(pos).is_empty()
    }

    /// Stack a piece onto a cell, enforcing the size ordering.
    ///
    /// Does not touch any reserve; use [`Board::place_piece`] during play.
    pub fn push(&mut self, pos: Pos, piece: Piece) -> RuleResult<()> {
        let mut cell = self.cell(pos);
        if !cell.push(piece) {
            return Err(RuleError::IllegalTarget { size: piece.size, at: pos });
        }
        self.set_cell(pos, cell);
        Ok(())
    }

    /// Remove the top piece from a cell, uncovering whatever is below.
    pub(crate) fn pop(&mut self, pos: Pos) -> Option<Piece> {
        let mut cell = self.cell(pos);
        let piece = cell.pop()?;
        self.set_cell(pos, cell);
        Some(piece)
    }

    /// A piece can be placed if the cell is empty or its top piece is smaller.
    #[inline]
    pub fn can_place(&self, size: Size, pos: Pos) -> bool {
        self.cell(pos).accepts(size)
    }

    /// Take a piece of `size` from `reserve` and put it on `pos`.
    ///
    /// Either both the reserve and the board change, or neither does.
    pub fn place_piece(&mut self, reserve: &mut Reserve, size: Size, pos: Pos) -> RuleResult<()> {
        if reserve.count(size) == 0 {
            return Err(RuleError::NoReserve { color: reserve.color(), size });
        }
        if !self.can_place(size, pos) {
            return Err(RuleError::IllegalTarget { size, at: pos });
        }
        reserve.take(size)?;
        self.push(pos, Piece::new(reserve.color(), size))
    }

    /// Whether `player` may move the top piece of `from` onto `to`.
    ///
    /// Ignores the exposure rule: a move that hands the opponent a line is
    /// still a move.
    pub fn can_move(&self, player: Color, from: Pos, to: Pos) -> bool {
        if from == to {
            return false;
        }
        match self.top(from) {
            Some(piece) if piece.owner == player => self.can_place(piece.size, to),
            _ => false,
        }
    }

    /// Move `player`'s top piece from `from` to `to`.
    ///
    /// The piece is lifted first. If that uncovers one or more opponent
    /// lines, the move only holds them off when `to` lies on one of those
    /// lines; any other destination still moves the piece but yields
    /// [`MoveOutcome::OpponentWin`].
    pub fn move_piece(&mut self, player: Color, from: Pos, to: Pos) -> RuleResult<MoveOutcome> {
        if !self.can_move(player, from, to) {
            return Err(RuleError::IllegalMove { from, to });
        }

        let mut lifted = *self;
        let piece = lifted.pop(from).ok_or(RuleError::IllegalMove { from, to })?;

        let exposed = lifted.line_mask(player.opponent());
        let outcome = if exposed != 0 && exposed & (1 << to.0) == 0 {
            MoveOutcome::OpponentWin
        } else {
            MoveOutcome::Success
        };

        lifted
            .push(to, piece)
            .map_err(|_| RuleError::IllegalMove { from, to })?;
        *self = lifted;
        Ok(outcome)
    }

    /// Cells the top piece of `from` could legally move to.
    pub fn legal_destinations(&self, player: Color, from: Pos) -> Vec<Pos> {
        Pos::all().filter(|&to| self.can_move(player, from, to)).collect()
    }

    /// Whether the top piece of `from` has at least one legal destination.
    pub fn has_legal_moves_from(&self, player: Color, from: Pos) -> bool {
        Pos::all().any(|to| self.can_move(player, from, to))
    }

    /// Count pieces of each size on board for a color, hidden ones included.
    /// Returns [small_count, medium_count, large_count].
    pub fn pieces_on_board(&self, color: Color) -> [u8; 3] {
        let mut counts = [0u8; 3];
        for pos in Pos::all() {
            for piece in self.cell(pos).pieces() {
                if piece.owner == color {
                    counts[piece.size.index()] += 1;
                }
            }
        }
        counts
    }

    #[inline]
    fn holds_line(&self, color: Color, line: &[Pos; 3]) -> bool {
        line.iter()
            .all(|&pos| matches!(self.top(pos), Some(piece) if piece.owner == color))
    }

    /// Check if `color` has three visible pieces in a line.
    pub fn has_won(&self, color: Color) -> bool {
        WIN_LINES.iter().any(|line| self.holds_line(color, line))
    }

    /// Every line currently held by `color`.
    pub fn winning_lines(&self, color: Color) -> impl Iterator<Item = [Pos; 3]> + '_ {
        WIN_LINES.into_iter().filter(move |line| self.holds_line(color, line))
    }

    /// First line held by `color`, if any.
    pub fn winning_line(&self, color: Color) -> Option<[Pos; 3]> {
        self.winning_lines(color).next()
    }

    /// Union of the cells of every line held by `color`, as a 9-bit mask.
    fn line_mask(&self, color: Color) -> u16 {
        self.winning_lines(color)
            .flatten()
            .fold(0u16, |mask, pos| mask | (1 << pos.0))
    }

    /// Union of the cells of every line held by `color`, in board order.
    pub fn winning_positions(&self, color: Color) -> Vec<Pos> {
        let mask = self.line_mask(color);
        Pos::all().filter(|pos| mask & (1 << pos.0) != 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Pos {
        Pos::new(row, col).unwrap()
    }

    fn put(board: &mut Board, at: Pos, owner: Color, size: Size) {
        board.push(at, Piece::new(owner, size)).unwrap();
    }

    #[test]
    fn test_board_from_bits() {
        let mut board = Board::new();
        put(&mut board, pos(2, 2), Color::Yellow, Size::Medium);
        put(&mut board, pos(2, 2), Color::Red, Size::Large);
        assert_eq!(Board::try_from(u64::from(board)), Ok(board));

        // Owner slot 0b11 on the small layer of (0,0)
        assert_eq!(Board::try_from(0b11), Err(RuleError::InvalidBoard { bits: 0b11 }));
        assert_eq!(Board::try_from(1 << 54), Err(RuleError::InvalidBoard { bits: 1 << 54 }));
    }

    #[test]
    fn test_board_empty_cells() {
        let board = Board::new();
        for p in Pos::all() {
            assert!(board.is_empty(p));
            assert_eq!(board.top(p), None);
            assert_eq!(board.cell(p).len(), 0);
        }
    }

    #[test]
    fn test_push_and_top() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        assert_eq!(board.top(Pos(0)), Some(Piece::new(Color::Red, Size::Small)));

        put(&mut board, Pos(0), Color::Yellow, Size::Medium);
        assert_eq!(board.top(Pos(0)), Some(Piece::new(Color::Yellow, Size::Medium)));

        // The small piece is still there, just hidden
        assert_eq!(board.cell(Pos(0)).owner_of(Size::Small), Some(Color::Red));
        assert_eq!(board.cell(Pos(0)).len(), 2);

        // Neighbouring cells are untouched
        assert!(board.is_empty(Pos(1)));
    }

    #[test]
    fn test_push_rejects_equal_or_smaller() {
        let mut board = Board::new();
        put(&mut board, Pos(4), Color::Red, Size::Medium);
        let before = board;

        assert_eq!(
            board.push(Pos(4), Piece::new(Color::Yellow, Size::Medium)),
            Err(RuleError::IllegalTarget { size: Size::Medium, at: Pos(4) })
        );
        assert_eq!(
            board.push(Pos(4), Piece::new(Color::Yellow, Size::Small)),
            Err(RuleError::IllegalTarget { size: Size::Small, at: Pos(4) })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_pop_top() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(0), Color::Yellow, Size::Medium);
        put(&mut board, Pos(0), Color::Red, Size::Large);

        assert_eq!(board.pop(Pos(0)), Some(Piece::new(Color::Red, Size::Large)));
        assert_eq!(board.top(Pos(0)), Some(Piece::new(Color::Yellow, Size::Medium)));
        assert_eq!(board.pop(Pos(0)), Some(Piece::new(Color::Yellow, Size::Medium)));
        assert_eq!(board.pop(Pos(0)), Some(Piece::new(Color::Red, Size::Small)));
        assert_eq!(board.pop(Pos(0)), None);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_cell_pieces_bottom_to_top() {
        let mut board = Board::new();
        put(&mut board, Pos(8), Color::Yellow, Size::Small);
        put(&mut board, Pos(8), Color::Red, Size::Large);

        let pieces: Vec<_> = board.cell(Pos(8)).pieces().collect();
        assert_eq!(
            pieces,
            vec![Piece::new(Color::Yellow, Size::Small), Piece::new(Color::Red, Size::Large)]
        );
    }

    #[test]
    fn test_can_place() {
        let mut board = Board::new();

        for size in Size::all() {
            assert!(board.can_place(size, Pos(0)));
        }

        put(&mut board, Pos(0), Color::Red, Size::Small);
        assert!(!board.can_place(Size::Small, Pos(0)));
        assert!(board.can_place(Size::Medium, Pos(0)));
        assert!(board.can_place(Size::Large, Pos(0)));

        put(&mut board, Pos(0), Color::Yellow, Size::Medium);
        assert!(!board.can_place(Size::Small, Pos(0)));
        assert!(!board.can_place(Size::Medium, Pos(0)));
        assert!(board.can_place(Size::Large, Pos(0)));

        put(&mut board, Pos(0), Color::Red, Size::Large);
        for size in Size::all() {
            assert!(!board.can_place(size, Pos(0)));
        }
    }

    #[test]
    fn test_place_piece_uses_reserve() {
        let mut board = Board::new();
        let mut reserve = Reserve::full(Color::Yellow);

        board.place_piece(&mut reserve, Size::Large, pos(1, 1)).unwrap();
        assert_eq!(board.top(pos(1, 1)), Some(Piece::new(Color::Yellow, Size::Large)));
        assert_eq!(reserve.counts(), [2, 2, 1]);
    }

    #[test]
    fn test_place_piece_is_all_or_nothing() {
        let mut board = Board::new();
        let mut reserve = Reserve::full(Color::Red);
        put(&mut board, Pos(4), Color::Yellow, Size::Large);
        let before = board;

        assert_eq!(
            board.place_piece(&mut reserve, Size::Medium, Pos(4)),
            Err(RuleError::IllegalTarget { size: Size::Medium, at: Pos(4) })
        );
        assert_eq!(board, before);
        assert_eq!(reserve.counts(), [2, 2, 2]);

        let mut empty = Reserve::remaining(Color::Red, [2, 2, 2]).unwrap();
        assert_eq!(
            board.place_piece(&mut empty, Size::Small, Pos(0)),
            Err(RuleError::NoReserve { color: Color::Red, size: Size::Small })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_can_move() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Medium);
        put(&mut board, Pos(1), Color::Yellow, Size::Small);
        put(&mut board, Pos(2), Color::Yellow, Size::Large);

        // Onto empty and onto smaller
        assert!(board.can_move(Color::Red, Pos(0), Pos(4)));
        assert!(board.can_move(Color::Red, Pos(0), Pos(1)));
        // Onto larger
        assert!(!board.can_move(Color::Red, Pos(0), Pos(2)));
        // Same square
        assert!(!board.can_move(Color::Red, Pos(0), Pos(0)));
        // Opponent piece
        assert!(!board.can_move(Color::Yellow, Pos(0), Pos(4)));
        // Empty source
        assert!(!board.can_move(Color::Red, Pos(5), Pos(4)));
    }

    #[test]
    fn test_can_move_own_smaller_piece() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Large);
        put(&mut board, Pos(1), Color::Red, Size::Small);

        assert!(board.can_move(Color::Red, Pos(0), Pos(1)));
        assert!(!board.can_move(Color::Red, Pos(1), Pos(0)));
    }

    #[test]
    fn test_move_piece_reveals_hidden_piece() {
        let mut board = Board::new();
        put(&mut board, Pos(4), Color::Yellow, Size::Small);
        put(&mut board, Pos(4), Color::Red, Size::Large);

        let outcome = board.move_piece(Color::Red, Pos(4), Pos(0)).unwrap();
        assert_eq!(outcome, MoveOutcome::Success);
        assert_eq!(board.top(Pos(4)), Some(Piece::new(Color::Yellow, Size::Small)));
        assert_eq!(board.top(Pos(0)), Some(Piece::new(Color::Red, Size::Large)));
    }

    #[test]
    fn test_move_piece_illegal_leaves_board() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(1), Color::Yellow, Size::Small);
        let before = board;

        assert_eq!(
            board.move_piece(Color::Red, Pos(0), Pos(1)),
            Err(RuleError::IllegalMove { from: Pos(0), to: Pos(1) })
        );
        assert_eq!(board, before);
    }

    // ========== Win Detection ==========

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert!(!board.has_won(Color::Red));
        assert!(!board.has_won(Color::Yellow));
        assert_eq!(board.winning_line(Color::Red), None);
    }

    #[test]
    fn test_all_winning_lines() {
        for line in WIN_LINES {
            let mut board = Board::new();
            for (i, &p) in line.iter().enumerate() {
                put(&mut board, p, Color::Yellow, Size::from_index(i).unwrap());
            }
            assert!(board.has_won(Color::Yellow), "line {:?}", line);
            assert!(!board.has_won(Color::Red));
            assert_eq!(board.winning_line(Color::Yellow), Some(line));
        }
    }

    #[test]
    fn test_hidden_piece_doesnt_count() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(1), Color::Red, Size::Small);
        put(&mut board, Pos(2), Color::Red, Size::Medium);
        put(&mut board, Pos(2), Color::Yellow, Size::Large);

        assert!(!board.has_won(Color::Red));
        assert!(!board.has_won(Color::Yellow));
    }

    #[test]
    fn test_mixed_pieces_no_win() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(1), Color::Yellow, Size::Medium);
        put(&mut board, Pos(2), Color::Red, Size::Large);

        assert!(!board.has_won(Color::Red));
        assert!(!board.has_won(Color::Yellow));
    }

    #[test]
    fn test_winning_positions_union() {
        let mut board = Board::new();
        // Red holds row 0 and column 0
        put(&mut board, Pos(0), Color::Red, Size::Large);
        put(&mut board, Pos(1), Color::Red, Size::Medium);
        put(&mut board, Pos(2), Color::Red, Size::Small);
        put(&mut board, Pos(3), Color::Red, Size::Medium);
        put(&mut board, Pos(6), Color::Red, Size::Small);

        assert_eq!(board.winning_lines(Color::Red).count(), 2);
        assert_eq!(
            board.winning_positions(Color::Red),
            vec![Pos(0), Pos(1), Pos(2), Pos(3), Pos(6)]
        );
        assert!(board.winning_positions(Color::Yellow).is_empty());
    }

    // ========== Exposure Rule ==========

    /// Red holds (0,0) and (0,1); a Yellow Large covers Red's piece at (0,2).
    fn covered_row() -> Board {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(1), Color::Red, Size::Medium);
        put(&mut board, Pos(2), Color::Red, Size::Small);
        put(&mut board, Pos(2), Color::Yellow, Size::Large);
        board
    }

    #[test]
    fn test_exposure_to_unrelated_cell_is_opponent_win() {
        let mut board = covered_row();
        let outcome = board.move_piece(Color::Yellow, Pos(2), Pos(4)).unwrap();
        assert_eq!(outcome, MoveOutcome::OpponentWin);
        // The move still happened
        assert_eq!(board.top(Pos(4)), Some(Piece::new(Color::Yellow, Size::Large)));
        assert!(board.has_won(Color::Red));
    }

    #[test]
    fn test_exposure_blocked_by_gobbling_into_line() {
        let mut board = covered_row();
        let outcome = board.move_piece(Color::Yellow, Pos(2), Pos(1)).unwrap();
        assert_eq!(outcome, MoveOutcome::Success);
        assert!(!board.has_won(Color::Red));
        assert_eq!(board.top(Pos(1)), Some(Piece::new(Color::Yellow, Size::Large)));
    }

    #[test]
    fn test_exposure_check_ignores_own_reveal() {
        let mut board = Board::new();
        // Lifting Red's Large off (0,2) reveals Red's own small: no opponent exposure.
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(1), Color::Red, Size::Small);
        put(&mut board, Pos(2), Color::Red, Size::Medium);
        put(&mut board, Pos(2), Color::Red, Size::Large);

        let outcome = board.move_piece(Color::Red, Pos(2), Pos(8)).unwrap();
        assert_eq!(outcome, MoveOutcome::Success);
        assert!(board.has_won(Color::Red));
    }

    #[test]
    fn test_legal_destinations() {
        let mut board = Board::new();
        put(&mut board, Pos(4), Color::Red, Size::Small);
        for p in Pos::all().filter(|&p| p != Pos(4)) {
            put(&mut board, p, Color::Yellow, Size::Medium);
        }
        assert!(board.legal_destinations(Color::Red, Pos(4)).is_empty());
        assert!(!board.has_legal_moves_from(Color::Red, Pos(4)));

        let mut board = Board::new();
        put(&mut board, Pos(4), Color::Red, Size::Small);
        assert_eq!(board.legal_destinations(Color::Red, Pos(4)).len(), 8);
        assert!(board.has_legal_moves_from(Color::Red, Pos(4)));
    }

    #[test]
    fn test_pieces_on_board_counts_hidden() {
        let mut board = Board::new();
        put(&mut board, Pos(0), Color::Red, Size::Small);
        put(&mut board, Pos(0), Color::Yellow, Size::Large);
        put(&mut board, Pos(1), Color::Red, Size::Small);

        assert_eq!(board.pieces_on_board(Color::Red), [2, 0, 0]);
        assert_eq!(board.pieces_on_board(Color::Yellow), [0, 0, 1]);
    }
}
