use crate::context::Context;
use crate::error::Error;
use crate::exec::{render_template, RenderOptions};
use crate::expr::Expr;
use crate::functions::Functions;
use crate::position::Position;
use crate::value::Value;

/// Evaluates expressions against one set of named values.
pub struct Evaluator<'a> {
    functions: &'a Functions,
    context: &'a Context,
    options: &'a RenderOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a Functions, context: &'a Context, options: &'a RenderOptions) -> Self {
        Evaluator {
            functions,
            context,
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, Error> {
        match expr {
            Expr::Text { value, .. } => Ok(Value::String(value.clone())),
            Expr::Constant { value, .. } => Ok(value.clone()),
            Expr::Property { name, position } => self.property(name, *position),
            Expr::FunctionCall(call) => {
                self.call(&call.name, call.position, None, &call.arguments)
            }
            Expr::Pipe {
                left,
                right,
                position,
            } => self.pipe(left, right, *position),
            Expr::Template(template) => render_template(self, template).map(Value::String),
        }
    }

    fn property(&self, name: &str, position: Position) -> Result<Value, Error> {
        match self.context.get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(Error::UnknownProperty {
                name: name.to_string(),
                available: self.context.names(),
                position,
            }),
        }
    }

    // `piped` is the value fed from the left side of a pipe; it becomes the first argument.
    fn call(
        &self,
        name: &str,
        position: Position,
        piped: Option<Value>,
        arguments: &[Expr],
    ) -> Result<Value, Error> {
        let mut values = Vec::with_capacity(arguments.len() + 1);
        values.extend(piped);
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        let function = match self.functions.get(name) {
            Some(function) => function,
            None => {
                return Err(Error::UnknownFunction {
                    name: name.to_string(),
                    available: self.functions.names(),
                    position,
                })
            }
        };

        tracing::trace!(function = name, arguments = values.len(), "calling template function");
        function.call(values).map_err(|source| Error::Invocation {
            function: name.to_string(),
            source,
            position,
        })
    }

    fn pipe(&self, left: &Expr, right: &Expr, position: Position) -> Result<Value, Error> {
        let value = self.evaluate(left)?;

        match right {
            Expr::FunctionCall(call) => {
                self.call(&call.name, call.position, Some(value), &call.arguments)
            }
            // `x | upper` is a call without arguments.
            Expr::Property { name, position } => self.call(name, *position, Some(value), &[]),
            other => Err(Error::UnsupportedPipe {
                expression: other.to_string(),
                available: self.functions.names(),
                position,
            }),
        }
    }
}

#[cfg(test)]
fn evaluate(template: &str, context: &Context) -> Result<Value, Error> {
    let parsed = crate::parser::parse(template).unwrap();
    let functions = Functions::with_defaults();
    let options = RenderOptions::default();
    let evaluator = Evaluator::new(&functions, context, &options);
    evaluator.evaluate(&parsed.parts[0].parts[0])
}

#[cfg(test)]
fn person() -> Context {
    Context::from_properties(vec![("FirstName", "Tore Olav"), ("LastName", "Kristiansen")])
}

#[test]
fn evaluate_property_ignoring_case() {
    assert_eq!(evaluate("{FIRSTNAME}", &person()), Ok(Value::from("Tore Olav")));
}

#[test]
fn evaluate_pipe_into_bare_name() {
    assert_eq!(
        evaluate("{firstName | split(' ') | UPPER}", &person()),
        Ok(Value::from(vec!["TORE".to_string(), "OLAV".to_string()]))
    );
}

#[test]
fn evaluate_direct_call() {
    assert_eq!(evaluate("{take(lastName, 3)}", &person()), Ok(Value::from("Kri")));
}

#[test]
fn unknown_property() {
    let err = evaluate("{unknown}", &person()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown property 'unknown'. Available properties: FirstName, LastName"
    );
    assert_eq!(err.position(), Position::new(1, 1, 2));
}

#[test]
fn unknown_function() {
    let err = evaluate("{firstName | blah}", &person()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown function 'blah'. Available functions: split, join, skip, take, substr, replace, reverse, upper, lower, trim, truncate"
    );
    assert_eq!(err.position(), Position::new(13, 1, 14));
}

#[test]
fn pipe_into_constant() {
    let err = evaluate("{firstName | 2}", &person()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedPipe { .. }));
    assert!(err.to_string().starts_with("Unknown function '2'. Available functions: split"));
    assert_eq!(err.position(), Position::new(11, 1, 12));
}

#[test]
fn parameter_count_mismatch() {
    let err = evaluate("{firstName | split}", &person()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "An error occurred while calling function 'split': Parameter count mismatch."
    );
    assert_eq!(err.position(), Position::new(13, 1, 14));
}

#[test]
fn unsupported_operand() {
    let err = evaluate("{substr(2, 2)}", &person()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "An error occurred while calling function 'substr': Specified method is not supported."
    );
}

#[test]
fn arguments_are_evaluated_before_lookup() {
    let err = evaluate("{blah(nope)}", &person()).unwrap_err();
    assert!(matches!(err, Error::UnknownProperty { .. }));
}
