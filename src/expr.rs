use crate::position::Position;
use crate::value::Value;
use std::fmt;

/// Node of a parsed template.
///
/// Displaying an expression writes it back in template syntax, so a hole-free
/// template prints exactly as it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal text outside of a hole.
    Text { value: String, position: Position },
    Constant { value: Value, position: Position },
    /// Named lookup in the evaluation context.
    Property { name: String, position: Position },
    FunctionCall(FunctionCall),
    /// `left | right`: left is fed as the first argument of right.
    Pipe {
        left: Box<Expr>,
        right: Box<Expr>,
        position: Position,
    },
    Template(Template),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Expr>,
    pub position: Position,
}

/// One line of output.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub parts: Vec<Expr>,
    pub position: Position,
}

/// The whole parsed input, one [`Template`] per line.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiTemplate {
    pub parts: Vec<Template>,
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::Text { position, .. }
            | Expr::Constant { position, .. }
            | Expr::Property { position, .. }
            | Expr::Pipe { position, .. } => *position,
            Expr::FunctionCall(call) => call.position,
            Expr::Template(template) => template.position,
        }
    }
}

impl MultiTemplate {
    pub fn lines(&self) -> usize {
        self.parts.len()
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'{}'", s.replace('\'', "''"))
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Text { value, .. } => f.write_str(value),
            Expr::Constant {
                value: Value::String(s),
                ..
            } => write_quoted(f, s),
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::Property { name, .. } => f.write_str(name),
            Expr::FunctionCall(call) => write!(f, "{}", call),
            Expr::Pipe { left, right, .. } => write!(f, "{} | {}", left, right),
            Expr::Template(template) => write!(f, "{}", template),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", argument)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Expr::Text { value, .. } => f.write_str(value)?,
                hole => write!(f, "{{{}}}", hole)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for MultiTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, template) in self.parts.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", template)?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn property(name: &str) -> Expr {
    Expr::Property {
        name: name.to_string(),
        position: Position::EMPTY,
    }
}

#[test]
fn display_pipe_chain() {
    let expr = Expr::Pipe {
        left: Box::new(Expr::Pipe {
            left: Box::new(property("firstName")),
            right: Box::new(Expr::FunctionCall(FunctionCall {
                name: "replace".to_string(),
                arguments: vec![
                    Expr::Constant {
                        value: Value::from("it's"),
                        position: Position::EMPTY,
                    },
                    Expr::Constant {
                        value: Value::from(3),
                        position: Position::EMPTY,
                    },
                ],
                position: Position::EMPTY,
            })),
            position: Position::EMPTY,
        }),
        right: Box::new(property("upper")),
        position: Position::EMPTY,
    };

    assert_eq!(expr.to_string(), "firstName | replace('it''s', 3) | upper");
}

#[test]
fn display_multi_template() {
    let template = MultiTemplate {
        parts: vec![
            Template {
                parts: vec![
                    Expr::Text {
                        value: "Hi ".to_string(),
                        position: Position::EMPTY,
                    },
                    property("name"),
                ],
                position: Position::EMPTY,
            },
            Template {
                parts: vec![Expr::Text {
                    value: "bye".to_string(),
                    position: Position::EMPTY,
                }],
                position: Position::EMPTY,
            },
        ],
    };

    assert_eq!(template.to_string(), "Hi {name}\nbye");
    assert_eq!(template.lines(), 2);
}
