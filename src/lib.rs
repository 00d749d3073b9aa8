//! Holey, a line oriented expression templating engine.
//!
//! A template is plain text with `{ ... }` holes. A hole holds an expression: a name looked
//! up in the named values, a literal, a function call, or a `|` pipe feeding the value on the
//! left into the function on the right. Every line of the template renders to one output
//! line.
//!
//! ```
//! let holey = holey::Holey::new();
//! let template = holey.parse("{firstName | split(' ') | join('.') | lower}").unwrap();
//!
//! let lines = holey
//!     .render_properties(&template, vec![("FirstName", "Tore Olav")])
//!     .unwrap();
//! assert_eq!(lines, vec!["tore.olav"]);
//! ```
mod context;
pub mod default_functions;
mod error;
mod eval;
mod exec;
mod expr;
pub mod func_helper;
mod functions;
pub mod holey;
mod parser;
mod position;
mod tokenizer;
mod value;

pub use crate::context::{Context, Members, Model};
pub use crate::error::{Error, InvocationError};
pub use crate::eval::Evaluator;
pub use crate::exec::{render_value, Lines, RenderOptions};
pub use crate::expr::{Expr, FunctionCall, MultiTemplate, Template};
pub use crate::func_helper::Operand;
pub use crate::functions::{FunctionContainer, Functions};
pub use crate::holey::Holey;
pub use crate::parser::{parse, Parser};
pub use crate::position::Position;
pub use crate::tokenizer::{tokenize, Token, TokenKind, Tokenizer};
pub use crate::value::Value;
