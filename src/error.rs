use crate::position::Position;

/// Failure raised by a registered function when it rejects its arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("Parameter count mismatch.")]
    ParameterCountMismatch,
    #[error("Specified method is not supported.")]
    NotSupported,
    #[error("{0}")]
    Argument(String),
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Lexical error ({position}): {message}")]
    Lexical { message: String, position: Position },

    #[error("Syntax error ({position}): {message}")]
    Syntax { message: String, position: Position },

    #[error("Unknown property '{name}'. Available properties: {}", .available.join(", "))]
    UnknownProperty {
        name: String,
        available: Vec<String>,
        position: Position,
    },

    #[error("Unknown function '{name}'. Available functions: {}", .available.join(", "))]
    UnknownFunction {
        name: String,
        available: Vec<String>,
        position: Position,
    },

    #[error("An error occurred while calling function '{function}': {source}")]
    Invocation {
        function: String,
        source: InvocationError,
        position: Position,
    },

    // Reads the same as an unknown function; the expression is not callable at all.
    #[error("Unknown function '{expression}'. Available functions: {}", .available.join(", "))]
    UnsupportedPipe {
        expression: String,
        available: Vec<String>,
        position: Position,
    },

    #[error("Invalid named-value source: {message}")]
    InvalidSource { message: String },
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Lexical { position, .. }
            | Error::Syntax { position, .. }
            | Error::UnknownProperty { position, .. }
            | Error::UnknownFunction { position, .. }
            | Error::Invocation { position, .. }
            | Error::UnsupportedPipe { position, .. } => *position,
            Error::InvalidSource { .. } => Position::EMPTY,
        }
    }

    /// True for failures raised while turning text into a template.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Lexical { .. } | Error::Syntax { .. })
    }

    /// Renders the offending line of `input` with a `^` under the error position.
    ///
    /// Returns `None` when the error has no position or it lies outside `input`.
    pub fn caret(&self, input: &str) -> Option<String> {
        let position = self.position();
        if !position.has_value() {
            return None;
        }

        let line = input.split('\n').nth(position.line - 1)?;
        let line = line.strip_suffix('\r').unwrap_or(line);

        Some(format!(
            "{}\n{}^",
            line,
            " ".repeat(position.column.saturating_sub(1))
        ))
    }
}

#[test]
fn messages() {
    let err = Error::UnknownProperty {
        name: "unknown".to_string(),
        available: vec!["FirstName".to_string(), "LastName".to_string()],
        position: Position::new(1, 1, 2),
    };
    assert_eq!(
        err.to_string(),
        "Unknown property 'unknown'. Available properties: FirstName, LastName"
    );

    let err = Error::Invocation {
        function: "split".to_string(),
        source: InvocationError::ParameterCountMismatch,
        position: Position::new(13, 1, 14),
    };
    assert_eq!(
        err.to_string(),
        "An error occurred while calling function 'split': Parameter count mismatch."
    );
    assert_eq!(err.position(), Position::new(13, 1, 14));
    assert!(!err.is_parse_error());
}

#[test]
fn caret_points_at_column() {
    let err = Error::Syntax {
        message: "unexpected `)`".to_string(),
        position: Position::new(14, 2, 4),
    };
    assert_eq!(
        err.caret("first line\r\nab c)").unwrap(),
        "ab c)\n   ^".to_string()
    );
    assert!(err.is_parse_error());

    let err = Error::InvalidSource {
        message: "nope".to_string(),
    };
    assert_eq!(err.caret("abc"), None);
}

#[test]
fn lexical_and_syntax_messages_differ() {
    let position = Position::new(3, 1, 4);
    let lexical = Error::Lexical {
        message: "unterminated string literal".to_string(),
        position,
    };
    let syntax = Error::Syntax {
        message: "unexpected `)`, expected argument".to_string(),
        position,
    };

    assert_eq!(
        lexical.to_string(),
        "Lexical error (line 1, column 4): unterminated string literal"
    );
    assert_eq!(
        syntax.to_string(),
        "Syntax error (line 1, column 4): unexpected `)`, expected argument"
    );
}
