//! Structured ex command parsing.
//!
//! Converts the text typed after `:` into a `ParsedCommand`. Parsing is pure
//! classification; the command handler performs the side effects and turns
//! `Unknown` / `TooManyArguments` into status messages.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// `:q` (`force` for `:q!`).
    Quit { force: bool },
    /// `:w [file]` / `:wq [file]`.
    Write { path: Option<PathBuf>, quit: bool },
    /// `:nu` / `:nonu`.
    LineNumbers(bool),
    Empty,
    Unknown(String),
    TooManyArguments,
}

pub struct CommandParser;

impl CommandParser {
    /// Parse the command body (without the leading `:`).
    pub fn parse(body: &str) -> ParsedCommand {
        let mut words = body.split_whitespace();
        let Some(name) = words.next() else {
            return ParsedCommand::Empty;
        };
        let args: Vec<&str> = words.collect();
        let no_args = |cmd: ParsedCommand| {
            if args.is_empty() {
                cmd
            } else {
                ParsedCommand::TooManyArguments
            }
        };
        match name {
            "q" | "quit" => no_args(ParsedCommand::Quit { force: false }),
            "q!" | "quit!" => no_args(ParsedCommand::Quit { force: true }),
            "w" | "write" | "wq" | "x" => {
                if args.len() > 1 {
                    return ParsedCommand::TooManyArguments;
                }
                ParsedCommand::Write {
                    path: args.first().map(PathBuf::from),
                    quit: name == "wq" || name == "x",
                }
            }
            "nu" | "number" => no_args(ParsedCommand::LineNumbers(true)),
            "nonu" | "nonumber" => no_args(ParsedCommand::LineNumbers(false)),
            _ => ParsedCommand::Unknown(body.trim().to_string()),
        }
    }
}
