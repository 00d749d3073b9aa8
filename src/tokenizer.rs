use crate::error::Error;
use crate::position::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenCurly,  // {
    CloseCurly, // }
    OpenParen,  // (
    CloseParen, // )
    Comma,      // ,
    Pipe,       // |
    String,     // 'quoted'
    Number,
    Identifier,
    Text,
    LineBreak,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::OpenCurly => "`{`",
            TokenKind::CloseCurly => "`}`",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::Comma => "`,`",
            TokenKind::Pipe => "`|`",
            TokenKind::String => "string literal",
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::Text => "text",
            TokenKind::LineBreak => "line break",
        };
        f.write_str(name)
    }
}

/// A slice of the template source. For strings, `text` still carries the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub position: Position,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String => {
                write!(f, "{} `{}`", self.kind, self.text)
            }
            TokenKind::Text => write!(f, "text {:?}", self.text),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Lazily splits a template into tokens.
///
/// Outside of a hole everything up to the next `{` or line break is text. Inside a hole
/// (after `{` and until the matching `}`) whitespace is skipped and the expression
/// tokens are recognized. Once an error is returned the iterator is exhausted.
pub struct Tokenizer<'a> {
    input: &'a str,
    position: Position,
    in_hole: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            position: Position::ZERO,
            in_hole: false,
            done: false,
        }
    }

    /// Position of the next unread character; the end of input once exhausted.
    pub fn position(&self) -> Position {
        self.position
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_line_break(&self) -> bool {
        let rest = self.rest();
        rest.starts_with('\n') || rest.starts_with("\r\n")
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position = self.position.advance(c);
        Some(c)
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token<'a> {
        Token {
            kind,
            text: &self.input[start.offset..self.position.offset],
            position: start,
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token<'a> {
        let start = self.position;
        self.bump();
        self.token(kind, start)
    }

    fn error(&self, message: String, position: Position) -> Error {
        tracing::trace!(%position, "lexical error: {}", message);
        Error::Lexical { message, position }
    }

    fn next_outside_hole(&mut self) -> Option<Result<Token<'a>, Error>> {
        let start = self.position;
        let token = match self.peek()? {
            '{' => {
                self.in_hole = true;
                self.single(TokenKind::OpenCurly)
            }
            '\n' => self.single(TokenKind::LineBreak),
            '\r' if self.at_line_break() => {
                self.bump();
                self.bump();
                self.token(TokenKind::LineBreak, start)
            }
            _ => {
                while let Some(c) = self.peek() {
                    if c == '{' || self.at_line_break() {
                        break;
                    }
                    self.bump();
                }
                self.token(TokenKind::Text, start)
            }
        };

        Some(Ok(token))
    }

    fn next_in_hole(&mut self) -> Result<Token<'a>, Error> {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() || self.at_line_break() {
                break;
            }
            self.bump();
        }

        let start = self.position;
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    "unexpected end of input, expected `}`".to_string(),
                    start,
                ))
            }
        };

        match c {
            '}' => {
                self.in_hole = false;
                Ok(self.single(TokenKind::CloseCurly))
            }
            '(' => Ok(self.single(TokenKind::OpenParen)),
            ')' => Ok(self.single(TokenKind::CloseParen)),
            ',' => Ok(self.single(TokenKind::Comma)),
            '|' => Ok(self.single(TokenKind::Pipe)),
            '\'' => self.string(start),
            _ if self.at_line_break() => Err(self.error(
                "unexpected line break, expected `}`".to_string(),
                start,
            )),
            c if c.is_ascii_digit() => self.number(start),
            c if c.is_alphabetic() || c == '_' => Ok(self.identifier(start)),
            c => Err(self.error(format!("unexpected character `{}`", c), start)),
        }
    }

    // SQL style: a doubled quote is an escaped quote.
    fn string(&mut self, start: Position) -> Result<Token<'a>, Error> {
        self.bump();
        loop {
            if self.rest().is_empty() || self.at_line_break() {
                return Err(self.error("unterminated string literal".to_string(), start));
            }

            if let Some('\'') = self.bump() {
                if self.peek() == Some('\'') {
                    self.bump();
                } else {
                    break;
                }
            }
        }

        Ok(self.token(TokenKind::String, start))
    }

    fn number(&mut self, start: Position) -> Result<Token<'a>, Error> {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();
        }

        let token = self.token(TokenKind::Number, start);
        match token.text.parse::<i32>() {
            Ok(_) => Ok(token),
            Err(_) => Err(self.error(
                format!("invalid number literal `{}`", token.text),
                start,
            )),
        }
    }

    fn identifier(&mut self, start: Position) -> Token<'a> {
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.bump();
        }
        self.token(TokenKind::Identifier, start)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = if self.in_hole {
            Some(self.next_in_hole())
        } else {
            self.next_outside_hole()
        };

        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

/// Tokenizes the whole input at once.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, Error> {
    Tokenizer::new(input).collect()
}

#[cfg(test)]
fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn tokenize_text_only() {
    let tokens = tokenize("Hello, this is a | (pipe)").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Text);
    assert_eq!(tokens[0].text, "Hello, this is a | (pipe)");
    assert_eq!(tokens[0].position, Position::ZERO);
}

#[test]
fn tokenize_empty() {
    assert!(tokenize("").unwrap().is_empty());
}

#[test]
fn tokenize_hole() {
    use TokenKind::*;
    assert_eq!(
        kinds("Hi {name | replace('a', 'b') | take(12)}!"),
        vec![
            Text, OpenCurly, Identifier, Pipe, Identifier, OpenParen, String, Comma, String,
            CloseParen, Pipe, Identifier, OpenParen, Number, CloseParen, CloseCurly, Text
        ]
    );
}

#[test]
fn tokenize_line_breaks() {
    use TokenKind::*;
    let tokens = tokenize("a\nb\r\nc\rd").unwrap();
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![Text, LineBreak, Text, LineBreak, Text]
    );
    assert_eq!(tokens[3].text, "\r\n");
    assert_eq!(tokens[4].text, "c\rd");
    assert_eq!(tokens[4].position, Position::new(5, 3, 1));
}

#[test]
fn whitespace_is_kept_outside_holes() {
    let tokens = tokenize("  {  a  }  ").unwrap();
    assert_eq!(tokens[0].text, "  ");
    assert_eq!(tokens[2].text, "a");
    assert_eq!(tokens[2].position, Position::new(5, 1, 6));
    assert_eq!(tokens[4].text, "  ");
}

#[test]
fn tokenize_escaped_string() {
    let tokens = tokenize("{'it''s'}").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].text, "'it''s'");
}

#[test]
fn unterminated_string() {
    let err = tokenize("{'abc}").unwrap_err();
    assert_eq!(err.position(), Position::new(1, 1, 2));
    assert!(err.to_string().contains("unterminated string literal"));
}

#[test]
fn number_overflow() {
    let err = tokenize("{take(99999999999)}").unwrap_err();
    assert_eq!(err.position(), Position::new(6, 1, 7));
    assert!(err.to_string().contains("invalid number literal"));
}

#[test]
fn unexpected_character() {
    let err = tokenize("{a + b}").unwrap_err();
    assert_eq!(err.position(), Position::new(3, 1, 4));
    assert!(err.to_string().contains("unexpected character `+`"));
}

#[test]
fn line_break_inside_hole() {
    let err = tokenize("{a\n}").unwrap_err();
    assert_eq!(err.position(), Position::new(2, 1, 3));
}

#[test]
fn unterminated_hole() {
    let err = tokenize("{firstName}\n{firstName}\r\n{").unwrap_err();
    assert_eq!(err.position(), Position::new(26, 3, 2));
}

#[test]
fn exhausted_after_error() {
    let mut tokenizer = Tokenizer::new("{#} text");
    assert!(matches!(tokenizer.next(), Some(Ok(_))));
    assert!(matches!(tokenizer.next(), Some(Err(_))));
    assert!(tokenizer.next().is_none());
}
