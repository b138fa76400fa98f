//! Gobblet Jr. in the terminal
//!
//! Reads one command per line from stdin, hands it to the rules engine and
//! prints the board after every command.
//!
//! Usage:
//!   gobblet [--first red|yellow] [--config game.json]
//!
//! Set RUST_LOG=debug to see engine transitions on stderr.

mod command;
mod render;

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use gobblet_core::{Color, Game, GameConfig, MoveOutcome};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::command::{apply, parse_command, Applied, Command, CommandError, HELP};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: &Path) -> io::Result<GameConfig> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Parse command line arguments into a game config.
fn parse_args(args: &[String]) -> io::Result<Option<GameConfig>> {
    let mut config = GameConfig::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--config" => {
                let path = iter.next().ok_or_else(|| invalid_arg("--config needs a path"))?;
                config = load_config(Path::new(path))?;
            }
            "--first" => {
                let value = iter.next().ok_or_else(|| invalid_arg("--first needs red or yellow"))?;
                config.first_player =
                    Color::parse(value).ok_or_else(|| invalid_arg("--first needs red or yellow"))?;
            }
            other => return Err(invalid_arg(&format!("unknown argument: {other}"))),
        }
    }
    Ok(Some(config))
}

fn invalid_arg(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}

fn main() -> io::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let Some(config) = parse_args(&args)? else {
        println!("Usage: gobblet [--first red|yellow] [--config game.json]\n");
        println!("{HELP}");
        return Ok(());
    };

    let mut game = Game::with_config(config);

    println!("Gobblet Jr.");
    println!("===========");
    println!("Type `help` for commands.\n");
    println!("{}", render::render(&game));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            // EOF
            println!();
            break;
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                println!("{err}\n");
                continue;
            }
        };
        if command == Command::Help {
            println!("{HELP}\n");
            continue;
        }

        match apply(&mut game, command) {
            Ok(Applied::Quit) => break,
            Ok(Applied::Moved(MoveOutcome::OpponentWin)) => {
                println!("That move uncovered a line for {}.", game.current_player().opponent());
            }
            Ok(_) => {}
            Err(err) => {
                debug!(%err, "command rejected");
                println!("{}", render::render_rejection(&game, &err));
                continue;
            }
        }

        println!("{}", render::render(&game));
        if game.is_over() {
            break;
        }
    }

    Ok(())
}
