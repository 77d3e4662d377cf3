use sweeper_core::{Coord, Coord2};
use thiserror::Error;

pub const HELP: &str = "commands: r X Y (reveal), f X Y (flag/unflag), m (moves), h (help), q (quit); X and Y start at 1";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    Reveal(Coord2),
    Flag(Coord2),
    Moves,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{help}", help = HELP)]
    Empty,
    #[error("unknown command {0:?}; {help}", help = HELP)]
    UnknownCommand(String),
    #[error("too many arguments; {help}", help = HELP)]
    TooManyArguments,
    #[error("missing {0}; {help}", help = HELP)]
    MissingAxis(&'static str),
    #[error("{axis} must be a number from 1 to {side}")]
    AxisOutOfRange { axis: &'static str, side: Coord },
}

/// Parses one line of player input, checking coordinates against a board of side `side`.
pub fn parse_command(line: &str, side: Coord) -> Result<PlayerCommand, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(InputError::Empty);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "r" | "reveal" => PlayerCommand::Reveal(parse_coords(&mut words, side)?),
        "f" | "flag" => PlayerCommand::Flag(parse_coords(&mut words, side)?),
        "m" | "moves" => PlayerCommand::Moves,
        "h" | "help" | "?" => PlayerCommand::Help,
        "q" | "quit" | "exit" => PlayerCommand::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };

    if words.next().is_some() {
        return Err(InputError::TooManyArguments);
    }
    Ok(command)
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>, side: Coord) -> Result<Coord2, InputError> {
    let x = parse_axis(words.next(), "X", side)?;
    let y = parse_axis(words.next(), "Y", side)?;
    Ok((x, y))
}

fn parse_axis(word: Option<&str>, axis: &'static str, side: Coord) -> Result<Coord, InputError> {
    let word = word.ok_or(InputError::MissingAxis(axis))?;
    match word.parse::<u16>() {
        Ok(n) if (1..=u16::from(side)).contains(&n) => Ok((n - 1) as Coord),
        _ => Err(InputError::AxisOutOfRange { axis, side }),
    }
}
