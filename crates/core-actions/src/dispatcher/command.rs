//! Command line editing and execution: ex commands (`:q`, `:w`, `:wq`, `:nu`) and
//! searches (`/`, `?`, `n`, `N`).
//!
//! Every failure is a `CommandError` that ends up as a transient status message; nothing
//! here is fatal.

use super::DispatchResult;
use super::command_parser::{CommandParser, ParsedCommand};
use crate::Action;
use crate::error::CommandError;
use crate::io_ops::write_file;
use core_model::View;
use core_state::{EditorState, Mode, SearchState};
use core_text::search::search;
use core_text::{Direction, Position};
use regex::Regex;

pub(crate) fn handle_command_action(
    action: Action,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    match action {
        Action::CommandStart(prefix) => {
            state.commit_pending();
            state.command_line.begin(prefix);
            state.mode = Mode::CommandLine;
            DispatchResult::dirty()
        }
        Action::CommandChar(ch) => {
            state.command_line.push_char(ch);
            DispatchResult::dirty()
        }
        Action::CommandBackspace => {
            if !state.command_line.backspace() {
                state.mode = Mode::Command;
            }
            DispatchResult::dirty()
        }
        Action::CommandCancel => {
            state.command_line.clear();
            state.mode = Mode::Command;
            DispatchResult::dirty()
        }
        Action::CommandExecute => {
            let prefix = state.command_line.prefix();
            let body = state.command_line.body().to_string();
            state.command_line.clear();
            state.mode = Mode::Command;
            let outcome = match prefix {
                Some(':') => execute_command(&body, state),
                Some('/') => start_search(&body, Direction::Forward, state, view),
                Some('?') => start_search(&body, Direction::Backward, state, view),
                _ => Ok(DispatchResult::dirty()),
            };
            outcome.unwrap_or_else(|err| report(state, err))
        }
        _ => DispatchResult::clean(),
    }
}

fn report(state: &mut EditorState, err: CommandError) -> DispatchResult {
    tracing::info!(target: "actions.command", error = %err, "command_failed");
    state.flash(err.to_string());
    DispatchResult::dirty()
}

fn execute_command(body: &str, state: &mut EditorState) -> Result<DispatchResult, CommandError> {
    let parsed = CommandParser::parse(body);
    tracing::debug!(target: "actions.command", ?parsed, "execute");
    match parsed {
        ParsedCommand::Quit { force } => {
            if !force && state.is_dirty() {
                return Err(CommandError::UnsavedChanges);
            }
            Ok(DispatchResult::quit())
        }
        ParsedCommand::Write { path, quit } => {
            let summary = write_file(state, path.as_deref())?;
            if quit {
                return Ok(DispatchResult::quit());
            }
            state.flash(summary.to_string());
            Ok(DispatchResult::dirty())
        }
        ParsedCommand::LineNumbers(on) => {
            state.show_line_numbers = on;
            Ok(DispatchResult::dirty())
        }
        ParsedCommand::Empty => Ok(DispatchResult::dirty()),
        ParsedCommand::Unknown(name) => Err(CommandError::UnknownCommand(name)),
        ParsedCommand::TooManyArguments => Err(CommandError::TooManyArguments),
    }
}

fn start_search(
    pattern: &str,
    direction: Direction,
    state: &mut EditorState,
    view: &mut View,
) -> Result<DispatchResult, CommandError> {
    // An empty pattern repeats the last search like `n`; a new one may match at the cursor.
    let fresh = !pattern.is_empty();
    let regex = if !fresh {
        state
            .search
            .as_ref()
            .map(|s| s.regex.clone())
            .ok_or(CommandError::NoPreviousPattern)?
    } else {
        Regex::new(pattern).map_err(|source| CommandError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?
    };
    state.search = Some(SearchState {
        regex: regex.clone(),
        direction,
    });
    run_search(&regex, direction, fresh, state, view)
}

pub(crate) fn handle_search_next(
    reverse: bool,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    state.commit_pending();
    let Some((regex, last_direction)) = state
        .search
        .as_ref()
        .map(|s| (s.regex.clone(), s.direction))
    else {
        return report(state, CommandError::NoPreviousPattern);
    };
    let direction = if reverse {
        last_direction.reversed()
    } else {
        last_direction
    };
    run_search(&regex, direction, false, state, view).unwrap_or_else(|err| report(state, err))
}

/// Move to the next match in `direction`. With `at_cursor` a forward match starting under the
/// cursor counts; otherwise the scan begins one column past it.
fn run_search(
    regex: &Regex,
    direction: Direction,
    at_cursor: bool,
    state: &mut EditorState,
    view: &mut View,
) -> Result<DispatchResult, CommandError> {
    let cur = view.cursor;
    let from = match direction {
        Direction::Forward if !at_cursor => Position::new(cur.line, cur.col + 1),
        _ => cur,
    };
    let outcome = search(&state.buffer, from, regex, direction);
    match outcome.found {
        Some(pos) => {
            view.cursor = pos;
            if outcome.wrapped {
                state.flash(match direction {
                    Direction::Forward => "search hit BOTTOM, continuing at TOP",
                    Direction::Backward => "search hit TOP, continuing at BOTTOM",
                });
            }
            tracing::debug!(target: "actions.command", line = pos.line, col = pos.col, wrapped = outcome.wrapped, "search_hit");
        }
        None => {
            tracing::debug!(target: "actions.command", "search_miss");
            state.flash(format!("Pattern not found: {}", regex.as_str()));
        }
    }
    Ok(DispatchResult::dirty())
}
