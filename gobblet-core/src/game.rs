//! Turn controller: whose move it is, the touched-piece obligation, and the
//! end of the game.
//!
//! ```text
//! Idle ──touch own piece──► Touched ──move_to: Success──► Idle (other player)
//!  │                          │  ▲
//!  │ place                    │  └── move_to: IllegalMove (stay, re-prompt)
//!  ▼                          ├──── move_to: OpponentWin ──► Won
//! Idle (other player)         └──── forfeit (no legal moves) ──► Won
//!   or Won if a line formed
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::{
    Board, Color, GameConfig, MoveOutcome, Pos, Reserve, RuleError, RuleResult, Size,
};

/// What the current player is in the middle of.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Phase {
    /// Free to pick a reserve piece or touch a board piece.
    Idle { selected: Option<Size> },
    /// Committed to moving the piece on `at`.
    Touched { at: Pos },
}

/// Why the game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// Three in a row after a placement or move.
    Line,
    /// The mover lifted a piece off an opponent line and did not cover it.
    Exposure,
    /// The mover's touched piece could not move and they gave up.
    Forfeit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Status {
    InProgress,
    Won { winner: Color, reason: WinReason },
}

/// Accepted touch.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Touch {
    pub at: Pos,
    /// False means the piece is trapped and `forfeit` is the only way on.
    pub has_legal_moves: bool,
}

/// A single game of Gobblet Jr.
///
/// The caller owns the value and drives it one call at a time. Any call that
/// returns `Err` leaves the game unchanged. Serializes for display only; a
/// saved position comes back through [`Game::from_board`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Game {
    board: Board,
    /// Indexed by `Color as usize - 1`.
    reserves: [Reserve; 2],
    current: Color,
    phase: Phase,
    status: Status,
}

impl Game {
    /// New game, Red to move.
    pub fn new() -> Game {
        Game::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Game {
        Game {
            board: Board::new(),
            reserves: [Reserve::full(Color::Red), Reserve::full(Color::Yellow)],
            current: config.first_player,
            phase: Phase::Idle { selected: None },
            status: Status::InProgress,
        }
    }

    /// Start from an arbitrary position. Reserves are whatever each color has
    /// not yet put on `board`.
    ///
    /// A position that already contains a line starts finished, judged as if
    /// the opponent of `to_move` had just placed a piece.
    pub fn from_board(board: Board, to_move: Color) -> RuleResult<Game> {
        let reserves = [
            Reserve::remaining(Color::Red, board.pieces_on_board(Color::Red))?,
            Reserve::remaining(Color::Yellow, board.pieces_on_board(Color::Yellow))?,
        ];
        let mut game = Game {
            board,
            reserves,
            current: to_move,
            phase: Phase::Idle { selected: None },
            status: Status::InProgress,
        };
        if let Some(winner) = game.line_winner(to_move.opponent()) {
            game.status = Status::Won { winner, reason: WinReason::Line };
        }
        Ok(game)
    }

    // ========== Accessors ==========

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn reserve(&self, color: Color) -> &Reserve {
        &self.reserves[color as usize - 1]
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn winner(&self) -> Option<Color> {
        match self.status {
            Status::InProgress => None,
            Status::Won { winner, .. } => Some(winner),
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.status != Status::InProgress
    }

    /// Location of the piece the current player must move, if any.
    pub fn touched(&self) -> Option<Pos> {
        match self.phase {
            Phase::Touched { at } => Some(at),
            Phase::Idle { .. } => None,
        }
    }

    #[inline]
    pub fn must_move_touched(&self) -> bool {
        self.touched().is_some()
    }

    pub fn selected_size(&self) -> Option<Size> {
        match self.phase {
            Phase::Idle { selected } => selected,
            Phase::Touched { .. } => None,
        }
    }

    /// Whether `color` has three visible pieces in a line.
    pub fn check_win(&self, color: Color) -> bool {
        self.board.has_won(color)
    }

    /// First line held by `color`, for highlighting.
    pub fn winning_line(&self, color: Color) -> Option<[Pos; 3]> {
        self.board.winning_line(color)
    }

    /// Whether the current player's piece on `from` has anywhere to go.
    pub fn has_legal_moves_from(&self, from: Pos) -> bool {
        self.board.has_legal_moves_from(self.current, from)
    }

    /// Whether the touched piece has anywhere to go. False when nothing is touched.
    pub fn has_legal_moves(&self) -> bool {
        self.touched().is_some_and(|at| self.has_legal_moves_from(at))
    }

    // ========== Actions ==========

    /// Pick a reserve size to place with [`Game::place_selected`].
    pub fn select_reserve(&mut self, size: Size) -> RuleResult<()> {
        self.ensure_in_progress()?;
        self.ensure_not_touched()?;
        let color = self.current;
        if self.reserve(color).count(size) == 0 {
            return Err(self.reject(RuleError::NoReserve { color, size }));
        }
        self.phase = Phase::Idle { selected: Some(size) };
        debug!(%color, %size, "selected reserve piece");
        Ok(())
    }

    /// Place the size chosen with [`Game::select_reserve`].
    pub fn place_selected(&mut self, at: Pos) -> RuleResult<Status> {
        self.ensure_in_progress()?;
        self.ensure_not_touched()?;
        let size = self.selected_size().ok_or_else(|| self.reject(RuleError::NoSelection))?;
        self.place(size, at)
    }

    /// Place a reserve piece of `size` on `at`. Ends the turn.
    #[instrument(level = "debug", skip(self), fields(color = %self.current))]
    pub fn place(&mut self, size: Size, at: Pos) -> RuleResult<Status> {
        self.ensure_in_progress()?;
        self.ensure_not_touched()?;
        let idx = self.current as usize - 1;
        if let Err(err) = self.board.place_piece(&mut self.reserves[idx], size, at) {
            return Err(self.reject(err));
        }
        debug!("placed");
        Ok(self.finish_turn())
    }

    /// Touch one of the current player's visible pieces, committing to move it.
    ///
    /// Touching the already-touched piece again is accepted and changes nothing.
    /// With a reserve size selected the next board action must be its
    /// placement, so touching is refused.
    pub fn touch(&mut self, at: Pos) -> RuleResult<Touch> {
        self.ensure_in_progress()?;
        match self.phase {
            Phase::Touched { at: touched } if touched != at => {
                return Err(self.reject(RuleError::MustMoveTouched { at: touched }));
            }
            Phase::Idle { selected: Some(size) } => {
                return Err(self.reject(RuleError::SelectionPending { size }));
            }
            _ => {}
        }
        match self.board.top(at) {
            None => return Err(self.reject(RuleError::Empty { at })),
            Some(piece) if piece.owner != self.current => {
                return Err(self.reject(RuleError::NotOwned { at }));
            }
            Some(_) => {}
        }

        self.phase = Phase::Touched { at };
        let has_legal_moves = self.has_legal_moves_from(at);
        debug!(color = %self.current, %at, has_legal_moves, "touched piece");
        Ok(Touch { at, has_legal_moves })
    }

    /// Move the touched piece to `to`.
    ///
    /// An illegal destination is rejected and the piece stays touched.
    #[instrument(level = "debug", skip(self), fields(color = %self.current))]
    pub fn move_to(&mut self, to: Pos) -> RuleResult<MoveOutcome> {
        self.ensure_in_progress()?;
        let from = self.touched().ok_or_else(|| self.reject(RuleError::NothingTouched))?;

        let outcome = match self.board.move_piece(self.current, from, to) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.reject(err)),
        };
        debug!(%from, ?outcome, "moved");

        match outcome {
            MoveOutcome::OpponentWin => {
                let winner = self.current.opponent();
                self.end(winner, WinReason::Exposure);
            }
            MoveOutcome::Success => {
                self.finish_turn();
            }
        }
        Ok(outcome)
    }

    /// Give up when the touched piece has no legal destination.
    /// Returns the winner.
    pub fn forfeit(&mut self) -> RuleResult<Color> {
        self.ensure_in_progress()?;
        if self.touched().is_none() || self.has_legal_moves() {
            return Err(self.reject(RuleError::ForfeitUnavailable));
        }
        let winner = self.current.opponent();
        self.end(winner, WinReason::Forfeit);
        Ok(winner)
    }

    // ========== Internals ==========

    fn ensure_in_progress(&self) -> RuleResult<()> {
        match self.status {
            Status::InProgress => Ok(()),
            Status::Won { winner, .. } => Err(self.reject(RuleError::GameOver { winner })),
        }
    }

    fn ensure_not_touched(&self) -> RuleResult<()> {
        match self.phase {
            Phase::Touched { at } => Err(self.reject(RuleError::MustMoveTouched { at })),
            Phase::Idle { .. } => Ok(()),
        }
    }

    fn reject(&self, err: RuleError) -> RuleError {
        trace!(color = %self.current, %err, "rejected");
        err
    }

    /// Opponent of the mover first, then the mover.
    fn line_winner(&self, mover: Color) -> Option<Color> {
        let opponent = mover.opponent();
        if self.board.has_won(opponent) {
            Some(opponent)
        } else if self.board.has_won(mover) {
            Some(mover)
        } else {
            None
        }
    }

    /// After a placement or a successful move: declare a winner or pass the turn.
    fn finish_turn(&mut self) -> Status {
        let mover = self.current;
        match self.line_winner(mover) {
            Some(winner) => self.end(winner, WinReason::Line),
            None => {
                self.current = mover.opponent();
                self.phase = Phase::Idle { selected: None };
                debug!(next = %self.current, "turn passed");
            }
        }
        self.status
    }

    fn end(&mut self, winner: Color, reason: WinReason) {
        self.phase = Phase::Idle { selected: None };
        self.status = Status::Won { winner, reason };
        info!(%winner, ?reason, "game over");
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
