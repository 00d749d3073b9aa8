use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Runtime value flowing through template evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Value::Sequence(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::Sequence(values.into_iter().map(Value::String).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Sequence(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => number_to_decimal(&n),
            },
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => Value::DateTime(dt),
                Err(_) => Value::String(s),
            },
            serde_json::Value::Array(arr) => {
                Value::Sequence(arr.into_iter().map(Value::from).collect())
            }
            object @ serde_json::Value::Object(_) => Value::String(object.to_string()),
        }
    }
}

fn number_to_decimal(n: &serde_json::Number) -> Value {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Value::Decimal)
        .unwrap_or(Value::String(text))
}

#[test]
fn display_natural_form() {
    assert_eq!(Value::Integer(42).to_string(), "42");
    assert_eq!(Value::from("abc").to_string(), "abc");
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(
        Value::from(vec!["a".to_string(), "b".to_string()]).to_string(),
        "a b"
    );
    assert_eq!(Value::from(None::<String>), Value::Null);
}

#[test]
fn from_json() {
    let json = serde_json::json!({
        "count": 3,
        "ratio": 1.5,
        "flag": true,
        "when": "2021-03-04T05:06:07+01:00",
        "tags": ["a", "b"],
        "nested": { "x": 1 },
    });

    let object = json.as_object().unwrap();
    assert_eq!(Value::from(object["count"].clone()), Value::Integer(3));
    assert_eq!(
        Value::from(object["ratio"].clone()),
        Value::Decimal(Decimal::new(15, 1))
    );
    assert_eq!(Value::from(object["flag"].clone()), Value::Boolean(true));
    assert!(matches!(
        Value::from(object["when"].clone()),
        Value::DateTime(_)
    ));
    assert_eq!(
        Value::from(object["tags"].clone()),
        Value::from(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(
        Value::from(object["nested"].clone()),
        Value::from(r#"{"x":1}"#)
    );
}
