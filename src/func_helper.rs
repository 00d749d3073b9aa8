// Conversions between template values and the shapes functions operate on.

use crate::error::InvocationError;
use crate::value::Value;

/// The value a function is applied to: either one string or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Scalar(String),
    Sequence(Vec<String>),
}

impl Operand {
    /// Applies `transform` to the string, or to every element of the sequence.
    pub fn map<F>(self, transform: F) -> Operand
    where
        F: Fn(String) -> String,
    {
        match self {
            Operand::Scalar(s) => Operand::Scalar(transform(s)),
            Operand::Sequence(values) => {
                Operand::Sequence(values.into_iter().map(transform).collect())
            }
        }
    }
}

impl TryFrom<Value> for Operand {
    type Error = InvocationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Operand::Scalar(s)),
            Value::Sequence(values) => values
                .into_iter()
                .map(|value| match value {
                    Value::String(s) => Ok(s),
                    _ => Err(InvocationError::NotSupported),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Operand::Sequence),
            _ => Err(InvocationError::NotSupported),
        }
    }
}

impl From<Operand> for Value {
    fn from(op: Operand) -> Self {
        match op {
            Operand::Scalar(s) => Value::String(s),
            Operand::Sequence(values) => Value::from(values),
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Scalar(s)
    }
}

impl From<Vec<String>> for Operand {
    fn from(values: Vec<String>) -> Self {
        Operand::Sequence(values)
    }
}

/// Reads a string argument.
pub fn text_arg(value: Value) -> Result<String, InvocationError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(InvocationError::NotSupported),
    }
}

/// Reads a non-negative count argument.
pub fn count_arg(value: Value) -> Result<usize, InvocationError> {
    match value {
        Value::Integer(n) => usize::try_from(n).map_err(|_| {
            InvocationError::Argument(format!("Count must not be negative, got {}.", n))
        }),
        _ => Err(InvocationError::NotSupported),
    }
}

#[test]
fn operand_from_value() {
    assert_eq!(
        Operand::try_from(Value::from("abc")),
        Ok(Operand::Scalar("abc".to_string()))
    );
    assert_eq!(
        Operand::try_from(Value::from(vec!["a".to_string()])),
        Ok(Operand::Sequence(vec!["a".to_string()]))
    );
    assert_eq!(
        Operand::try_from(Value::Integer(2)),
        Err(InvocationError::NotSupported)
    );
    assert_eq!(
        Operand::try_from(Value::Null),
        Err(InvocationError::NotSupported)
    );
    assert_eq!(
        Operand::try_from(Value::Sequence(vec![Value::from("a"), Value::Integer(1)])),
        Err(InvocationError::NotSupported)
    );
}

#[test]
fn arguments() {
    assert_eq!(count_arg(Value::Integer(3)), Ok(3));
    assert!(matches!(
        count_arg(Value::Integer(-1)),
        Err(InvocationError::Argument(_))
    ));
    assert_eq!(
        count_arg(Value::from("3")),
        Err(InvocationError::NotSupported)
    );
    assert_eq!(text_arg(Value::from(" ")), Ok(" ".to_string()));
    assert_eq!(text_arg(Value::Integer(1)), Err(InvocationError::NotSupported));
}

#[test]
fn map_elementwise() {
    let op = Operand::Sequence(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        op.map(|s| s.to_uppercase()),
        Operand::Sequence(vec!["A".to_string(), "B".to_string()])
    );
}
