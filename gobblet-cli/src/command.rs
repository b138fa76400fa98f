//! Text command parsing and dispatch.
//!
//! Notation:
//!   S(0,0) / M 1,2 / L 2,1   place a reserve piece
//!   select M, then 1,2       place the selected size
//!   touch 1,1                touch an own board piece
//!   move 2,2                 move the touched piece
//!   (1,1)->(2,2)             touch and move in one go
//!   forfeit, board, help, quit

use gobblet_core::{Game, MoveOutcome, Pos, RuleError, Size, Status};
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Place { size: Size, at: Pos },
    Select(Size),
    PlaceSelected(Pos),
    Touch(Pos),
    Move { from: Option<Pos>, to: Pos },
    Forfeit,
    Board,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("expected coordinates like 1,2 but got {0:?}")]
    BadCoords(String),
    #[error("expected a size (S, M or L) but got {0:?}")]
    BadSize(String),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// What a successfully applied command did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Applied {
    Placed(Status),
    Selected(Size),
    Touched { has_legal_moves: bool },
    Moved(MoveOutcome),
    Forfeited,
    /// Nothing changed (board / help).
    Shown,
    Quit,
}

pub const HELP: &str = "\
Commands:
  S r,c | M r,c | L r,c   place a reserve piece (also S(r,c))
  select S|M|L            pick a reserve piece, then type r,c to place it
  touch r,c               touch one of your pieces (you must then move it)
  move r,c                move the touched piece
  (r,c)->(r,c)            touch and move in one go
  forfeit                 give up when the touched piece cannot move
  board | help | quit";

/// Parse "(r,c)" or "r,c" into a position
fn parse_coords(s: &str) -> Result<Pos, CommandError> {
    let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = trimmed.split(',').collect();
    if parts.len() == 2 {
        if let (Ok(row), Ok(col)) = (parts[0].trim().parse::<u8>(), parts[1].trim().parse::<u8>()) {
            return Ok(Pos::new(row, col)?);
        }
    }
    Err(CommandError::BadCoords(s.trim().to_string()))
}

fn parse_size(s: &str) -> Result<Size, CommandError> {
    Size::parse(s).ok_or_else(|| CommandError::BadSize(s.trim().to_string()))
}

/// Parse a single command line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }

    // Slide: (r,c)->(r,c)
    if let Some((from, to)) = line.split_once("->") {
        return Ok(Command::Move {
            from: Some(parse_coords(from)?),
            to: parse_coords(to)?,
        });
    }

    // Placement: S(r,c), M(r,c), L(r,c) with or without a space
    let mut chars = line.chars();
    if let Some(first) = chars.next() {
        if let Some(size) = Size::parse(&first.to_string()) {
            let rest = chars.as_str();
            if rest.trim_start().starts_with('(') || rest.starts_with(' ') {
                return Ok(Command::Place { size, at: parse_coords(rest)? });
            }
        }
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word.to_ascii_lowercase().as_str() {
        "select" => Ok(Command::Select(parse_size(rest)?)),
        "touch" => Ok(Command::Touch(parse_coords(rest)?)),
        "move" => Ok(Command::Move { from: None, to: parse_coords(rest)? }),
        "forfeit" => Ok(Command::Forfeit),
        "board" => Ok(Command::Board),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ if word.starts_with('(') || word.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            Ok(Command::PlaceSelected(parse_coords(line)?))
        }
        _ => Err(CommandError::Unknown(word.to_string())),
    }
}

/// Run a command against the game.
pub fn apply(game: &mut Game, command: Command) -> Result<Applied, CommandError> {
    let applied = match command {
        Command::Place { size, at } => Applied::Placed(game.place(size, at)?),
        Command::Select(size) => {
            game.select_reserve(size)?;
            Applied::Selected(size)
        }
        Command::PlaceSelected(at) => Applied::Placed(game.place_selected(at)?),
        Command::Touch(at) => {
            let touch = game.touch(at)?;
            Applied::Touched { has_legal_moves: touch.has_legal_moves }
        }
        Command::Move { from, to } => {
            if let Some(from) = from {
                if game.touched() != Some(from) {
                    game.touch(from)?;
                }
            }
            Applied::Moved(game.move_to(to)?)
        }
        Command::Forfeit => {
            game.forfeit()?;
            Applied::Forfeited
        }
        Command::Board | Command::Help => Applied::Shown,
        Command::Quit => Applied::Quit,
    };
    Ok(applied)
}
