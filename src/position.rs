use serde::Serialize;
use std::fmt;

/// Location of a token or expression inside the template source.
///
/// `offset` is a byte offset into the input, `line` and `column` are 1-based and count
/// characters. [`Position::EMPTY`] stands for "no location".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const EMPTY: Position = Position {
        offset: 0,
        line: 0,
        column: 0,
    };

    /// Start of the input.
    pub const ZERO: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    pub fn has_value(&self) -> bool {
        self.line > 0
    }

    /// Returns the position right after `c`, which must start at `self`.
    pub(crate) fn advance(self, c: char) -> Self {
        if c == '\n' {
            Position {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                offset: self.offset + c.len_utf8(),
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::EMPTY
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_value() {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            write!(f, "(no position)")
        }
    }
}

#[test]
fn advance_tracks_lines_and_columns() {
    let pos = Position::ZERO.advance('a').advance('é');
    assert_eq!(pos, Position::new(3, 1, 3));

    let pos = pos.advance('\n');
    assert_eq!(pos, Position::new(4, 2, 1));
}

#[test]
fn empty_has_no_value() {
    assert!(!Position::EMPTY.has_value());
    assert!(Position::ZERO.has_value());
    assert_eq!(Position::default(), Position::EMPTY);
    assert_eq!(Position::new(5, 2, 3).to_string(), "line 2, column 3");
}
