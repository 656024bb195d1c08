//! Regex search over a `Buffer`, line by line with wrap-around.
//!
//! Matches never span lines. A search visits each line entry point at most once, so an
//! absent pattern terminates after one full lap.

use std::collections::HashSet;

use regex::Regex;

use crate::{Buffer, Direction, Position, byte_of, col_of};

/// Result of a single search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: Option<Position>,
    /// The scan crossed the top or bottom of the buffer at least once.
    pub wrapped: bool,
}

/// Search from `from` in `dir`.
///
/// Forward: the first match starting at or after `from.col` on the starting line, then
/// the first match on each following line. Backward: the rightmost match starting strictly
/// before `from.col` on the starting line, then the rightmost match on each preceding line.
pub fn search(buf: &Buffer, from: Position, regex: &Regex, dir: Direction) -> SearchOutcome {
    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut row = from.line.min(buf.last_line());
    // `None` marks a line entered from outside: the whole line is searchable.
    let mut limit: Option<usize> = Some(from.col);
    let mut wrapped = false;

    loop {
        let key = (row, limit.unwrap_or(usize::MAX));
        if !visited.insert(key) {
            tracing::trace!(target: "text.search", wrapped, "pattern not found");
            return SearchOutcome {
                found: None,
                wrapped,
            };
        }
        let line = buf.get(row);
        let hit = match dir {
            Direction::Forward => {
                let start = limit.map(|c| byte_of(line, c)).unwrap_or(0);
                regex.find_at(line, start).map(|m| m.start())
            }
            Direction::Backward => {
                let bound = limit.map(|c| byte_of(line, c)).unwrap_or(usize::MAX);
                regex
                    .find_iter(line)
                    .take_while(|m| m.start() < bound)
                    .last()
                    .map(|m| m.start())
            }
        };
        if let Some(byte) = hit {
            let found = Position::new(row, col_of(line, byte));
            tracing::trace!(target: "text.search", line = found.line, col = found.col, wrapped, "match");
            return SearchOutcome {
                found: Some(found),
                wrapped,
            };
        }
        match dir {
            Direction::Forward => {
                if row >= buf.last_line() {
                    row = 0;
                    wrapped = true;
                } else {
                    row += 1;
                }
            }
            Direction::Backward => {
                if row == 0 {
                    row = buf.last_line();
                    wrapped = true;
                } else {
                    row -= 1;
                }
            }
        }
        limit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf() -> Buffer {
        Buffer::from_str("t", "one two\nsix two\nend").unwrap()
    }

    #[test]
    fn forward_steps_through_matches_and_wraps() {
        let b = buf();
        let re = Regex::new("two").unwrap();
        let first = search(&b, Position::new(0, 1), &re, Direction::Forward);
        assert_eq!(first.found, Some(Position::new(0, 4)));
        assert!(!first.wrapped);
        let second = search(&b, Position::new(0, 5), &re, Direction::Forward);
        assert_eq!(second.found, Some(Position::new(1, 4)));
        let third = search(&b, Position::new(1, 5), &re, Direction::Forward);
        assert_eq!(third.found, Some(Position::new(0, 4)));
        assert!(third.wrapped);
    }

    #[test]
    fn backward_takes_rightmost_before_cursor() {
        let b = Buffer::from_str("t", "ab ab ab").unwrap();
        let re = Regex::new("ab").unwrap();
        let out = search(&b, Position::new(0, 6), &re, Direction::Backward);
        assert_eq!(out.found, Some(Position::new(0, 3)));
    }

    #[test]
    fn backward_wraps_to_bottom() {
        let b = buf();
        let re = Regex::new("two").unwrap();
        let out = search(&b, Position::new(0, 4), &re, Direction::Backward);
        assert_eq!(out.found, Some(Position::new(1, 4)));
        assert!(out.wrapped);
    }

    #[test]
    fn missing_pattern_terminates() {
        let b = buf();
        let re = Regex::new("zzz").unwrap();
        for dir in [Direction::Forward, Direction::Backward] {
            let out = search(&b, Position::new(1, 2), &re, dir);
            assert_eq!(out.found, None);
        }
    }

    #[test]
    fn only_match_is_before_cursor_on_same_line() {
        let b = Buffer::from_str("t", "needle here").unwrap();
        let re = Regex::new("needle").unwrap();
        let out = search(&b, Position::new(0, 1), &re, Direction::Forward);
        assert_eq!(out.found, Some(Position::new(0, 0)));
        assert!(out.wrapped);
    }

    #[test]
    fn columns_are_chars_not_bytes() {
        let b = Buffer::from_str("t", "héllo wörld").unwrap();
        let re = Regex::new("w").unwrap();
        let out = search(&b, Position::new(0, 0), &re, Direction::Forward);
        assert_eq!(out.found, Some(Position::new(0, 6)));
    }
}
