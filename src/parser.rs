use crate::error::Error;
use crate::expr::{Expr, FunctionCall, MultiTemplate, Template};
use crate::position::Position;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::value::Value;

// Pulls tokens from the tokenizer on demand and keeps them so the parser can rewind.
struct TokenStream<'a> {
    tokenizer: Tokenizer<'a>,
    buffer: Vec<Token<'a>>,
    index: usize,
    failure: Option<Error>,
}

impl<'a> TokenStream<'a> {
    fn new(input: &'a str) -> Self {
        TokenStream {
            tokenizer: Tokenizer::new(input),
            buffer: Vec::new(),
            index: 0,
            failure: None,
        }
    }

    fn peek(&mut self) -> Result<Option<Token<'a>>, Error> {
        while self.buffer.len() <= self.index {
            if let Some(failure) = &self.failure {
                return Err(failure.clone());
            }

            match self.tokenizer.next() {
                Some(Ok(token)) => self.buffer.push(token),
                Some(Err(e)) => self.failure = Some(e),
                None => return Ok(None),
            }
        }

        Ok(Some(self.buffer[self.index]))
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    // Only meaningful once `peek` returned `None`.
    fn end_position(&self) -> Position {
        self.tokenizer.position()
    }
}

/// Recursive descent parser producing a [`MultiTemplate`].
///
/// ```text
/// MultiTemplate := Template (LineBreak Template)* EndOfInput
/// Template      := (Hole | Text)*
/// Hole          := '{' PipeChain '}'
/// PipeChain     := Argument ('|' Argument)*
/// Argument      := Number | String | FunctionCall | Property
/// FunctionCall  := Identifier '(' (Argument (',' Argument)*)? ')'
/// Property      := Identifier
/// ```
///
/// A line without any token becomes a template holding a single empty text.
pub struct Parser<'a> {
    tokens: TokenStream<'a>,
    // Furthest syntax error thrown away while backtracking out of a function call.
    backtracked: Option<Error>,
}

impl<'a> Parser<'a> {
    pub fn parse(template: &'a str) -> Result<MultiTemplate, Error> {
        let mut parser = Parser {
            tokens: TokenStream::new(template),
            backtracked: None,
        };

        match parser.multi_template() {
            Ok(parsed) => {
                tracing::debug!(lines = parsed.lines(), "parsed template");
                Ok(parsed)
            }
            Err(e) => {
                let e = parser.furthest(e);
                tracing::debug!(position = %e.position(), "failed to parse template: {}", e);
                Err(e)
            }
        }
    }

    fn furthest(&mut self, e: Error) -> Error {
        match (self.backtracked.take(), &e) {
            (Some(backtracked), Error::Syntax { position, .. })
                if backtracked.position().offset > position.offset =>
            {
                backtracked
            }
            _ => e,
        }
    }

    fn unexpected(&self, token: Option<Token<'a>>, expected: &str) -> Error {
        match token {
            Some(token) => Error::Syntax {
                message: format!("unexpected {}, expected {}", token, expected),
                position: token.position,
            },
            None => Error::Syntax {
                message: format!("unexpected end of input, expected {}", expected),
                position: self.tokens.end_position(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token<'a>, Error> {
        match self.tokens.peek()? {
            Some(token) if token.kind == kind => {
                self.tokens.advance();
                Ok(token)
            }
            other => Err(self.unexpected(other, expected)),
        }
    }

    fn next_is(&mut self, kind: TokenKind) -> Result<bool, Error> {
        Ok(matches!(self.tokens.peek()?, Some(token) if token.kind == kind))
    }

    fn next_position(&mut self) -> Result<Position, Error> {
        Ok(match self.tokens.peek()? {
            Some(token) => token.position,
            None => self.tokens.end_position(),
        })
    }

    fn multi_template(&mut self) -> Result<MultiTemplate, Error> {
        let mut parts = vec![self.template()?];

        while let Some(token) = self.tokens.peek()? {
            if token.kind != TokenKind::LineBreak {
                return Err(self.unexpected(Some(token), "line break or end of input"));
            }
            self.tokens.advance();
            parts.push(self.template()?);
        }

        Ok(MultiTemplate { parts })
    }

    fn template(&mut self) -> Result<Template, Error> {
        let position = self.next_position()?;
        let mut parts = Vec::new();

        loop {
            match self.tokens.peek()? {
                Some(token) if token.kind == TokenKind::Text => {
                    self.tokens.advance();
                    parts.push(Expr::Text {
                        value: token.text.to_string(),
                        position: token.position,
                    });
                }
                Some(token) if token.kind == TokenKind::OpenCurly => {
                    parts.push(self.hole()?);
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            parts.push(Expr::Text {
                value: String::new(),
                position,
            });
        }

        Ok(Template { parts, position })
    }

    fn hole(&mut self) -> Result<Expr, Error> {
        self.expect(TokenKind::OpenCurly, "`{`")?;
        let content = self.pipe_chain()?;
        self.expect(TokenKind::CloseCurly, "`|` or `}`")?;
        Ok(content)
    }

    // Left associative: `a | b | c` is `(a | b) | c`.
    fn pipe_chain(&mut self) -> Result<Expr, Error> {
        let mut left = self.argument()?;

        while self.next_is(TokenKind::Pipe)? {
            let pipe = self.expect(TokenKind::Pipe, "`|`")?;
            let right = self.argument()?;
            left = Expr::Pipe {
                left: Box::new(left),
                right: Box::new(right),
                position: pipe.position,
            };
        }

        Ok(left)
    }

    fn argument(&mut self) -> Result<Expr, Error> {
        let token = match self.tokens.peek()? {
            Some(token) => token,
            None => return Err(self.unexpected(None, "argument")),
        };

        match token.kind {
            TokenKind::Number => {
                self.tokens.advance();
                let value = token.text.parse::<i32>().map_err(|_| Error::Lexical {
                    message: format!("invalid number literal `{}`", token.text),
                    position: token.position,
                })?;
                Ok(Expr::Constant {
                    value: Value::from(value),
                    position: token.position,
                })
            }
            TokenKind::String => {
                self.tokens.advance();
                Ok(Expr::Constant {
                    value: Value::String(unquote(token.text)),
                    position: token.position,
                })
            }
            TokenKind::Identifier => {
                let mark = self.tokens.index;
                match self.function_call() {
                    Ok(call) => Ok(Expr::FunctionCall(call)),
                    Err(e @ Error::Syntax { .. }) => {
                        self.remember_backtracked(e);
                        self.tokens.index = mark;
                        self.tokens.advance();
                        Ok(Expr::Property {
                            name: token.text.to_string(),
                            position: token.position,
                        })
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Err(self.unexpected(Some(token), "argument")),
        }
    }

    fn remember_backtracked(&mut self, e: Error) {
        let further = match &self.backtracked {
            Some(previous) => e.position().offset > previous.position().offset,
            None => true,
        };
        if further {
            self.backtracked = Some(e);
        }
    }

    fn function_call(&mut self) -> Result<FunctionCall, Error> {
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        self.expect(TokenKind::OpenParen, "`(`")?;

        let mut arguments = Vec::new();
        if self.next_is(TokenKind::CloseParen)? {
            self.tokens.advance();
        } else {
            loop {
                arguments.push(self.argument()?);
                match self.tokens.peek()? {
                    Some(token) if token.kind == TokenKind::Comma => self.tokens.advance(),
                    Some(token) if token.kind == TokenKind::CloseParen => {
                        self.tokens.advance();
                        break;
                    }
                    other => return Err(self.unexpected(other, "`,` or `)`")),
                }
            }
        }

        Ok(FunctionCall {
            name: name.text.to_string(),
            arguments,
            position: name.position,
        })
    }
}

fn unquote(text: &str) -> String {
    text[1..text.len() - 1].replace("''", "'")
}

/// Parses a template string.
pub fn parse(template: &str) -> Result<MultiTemplate, Error> {
    Parser::parse(template)
}

#[cfg(test)]
fn hole(template: &str) -> Expr {
    let mut parsed = parse(template).unwrap();
    assert_eq!(parsed.parts.len(), 1);
    let mut line = parsed.parts.remove(0);
    assert_eq!(line.parts.len(), 1);
    line.parts.remove(0)
}

#[test]
fn parse_text_only() {
    let parsed = parse("Hello {name}, this is a | (pipe)").unwrap();
    assert_eq!(parsed.parts.len(), 1);
    assert_eq!(parsed.parts[0].parts.len(), 3);
    assert_eq!(
        parsed.parts[0].parts[2],
        Expr::Text {
            value: ", this is a | (pipe)".to_string(),
            position: Position::new(12, 1, 13),
        }
    );
}

#[test]
fn parse_property() {
    assert_eq!(
        hole("{ firstName }"),
        Expr::Property {
            name: "firstName".to_string(),
            position: Position::new(2, 1, 3),
        }
    );
}

#[test]
fn parse_function_call() {
    let expected = Expr::FunctionCall(FunctionCall {
        name: "replace".to_string(),
        arguments: vec![
            Expr::Constant {
                value: Value::from("it's"),
                position: Position::new(9, 1, 10),
            },
            Expr::Constant {
                value: Value::from(12),
                position: Position::new(18, 1, 19),
            },
        ],
        position: Position::new(1, 1, 2),
    });

    assert_eq!(hole("{replace('it''s', 12)}"), expected);
}

#[test]
fn parse_empty_argument_list() {
    match hole("{upper()}") {
        Expr::FunctionCall(call) => {
            assert_eq!(call.name, "upper");
            assert!(call.arguments.is_empty());
        }
        other => panic!("expected a function call, got {:?}", other),
    }
}

#[test]
fn parse_pipe_is_left_associative() {
    match hole("{a | b(1) | c}") {
        Expr::Pipe {
            left,
            right,
            position,
        } => {
            assert_eq!(position, Position::new(10, 1, 11));
            assert_eq!(right.to_string(), "c");
            match *left {
                Expr::Pipe { left, right, .. } => {
                    assert_eq!(left.to_string(), "a");
                    assert_eq!(right.to_string(), "b(1)");
                }
                other => panic!("expected a nested pipe, got {:?}", other),
            }
        }
        other => panic!("expected a pipe, got {:?}", other),
    }
}

#[test]
fn parse_nested_calls() {
    assert_eq!(
        hole("{join(split(name, ','), '-')}").to_string(),
        "join(split(name, ','), '-')"
    );
}

#[test]
fn parse_multi_line() {
    let parsed = parse("{firstName}\n{firstName}\r\n{firstName}").unwrap();
    assert_eq!(parsed.parts.len(), 3);
    assert_eq!(parsed.parts[2].position, Position::new(25, 3, 1));
}

#[test]
fn parse_empty_lines() {
    let parsed = parse("").unwrap();
    assert_eq!(parsed.parts.len(), 1);
    assert_eq!(parsed.to_string(), "");

    let parsed = parse("a\n\nb\n").unwrap();
    assert_eq!(parsed.parts.len(), 4);
    assert_eq!(parsed.to_string(), "a\n\nb\n");
}

#[test]
fn unterminated_hole_on_third_line() {
    let err = parse("{firstName}\n{firstName}\r\n{").unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.position(), Position::new(26, 3, 2));
}

#[test]
fn empty_hole() {
    let err = parse("ab{}").unwrap_err();
    assert_eq!(err.position(), Position::new(3, 1, 4));
    assert_eq!(
        err.to_string(),
        "Syntax error (line 1, column 4): unexpected `}`, expected argument"
    );
}

#[test]
fn missing_close_curly() {
    let err = parse("{a b}").unwrap_err();
    assert_eq!(err.position(), Position::new(3, 1, 4));
    assert!(err.to_string().contains("expected `|` or `}`"));
}

#[test]
fn broken_call_reports_furthest_failure() {
    let err = parse("{f(1,)}").unwrap_err();
    assert_eq!(err.position(), Position::new(5, 1, 6));
    assert!(err.to_string().contains("unexpected `)`, expected argument"));
}

#[test]
fn lexical_error_inside_call_is_not_backtracked() {
    let err = parse("{f('abc)}").unwrap_err();
    assert_eq!(err.position(), Position::new(3, 1, 4));
    assert!(err.to_string().contains("unterminated string literal"));
}
