use crate::error::InvocationError;
use crate::func_helper::{count_arg, text_arg, Operand};
use crate::functions::{FunctionContainer, Functions};
use crate::value::Value;

/// Registers the built-in functions, in the order they are listed in error messages.
pub fn register_defaults(functions: &mut Functions) {
    functions.register("split", FunctionContainer::F2(Box::new(val_split)));
    functions.register("join", FunctionContainer::F2(Box::new(val_join)));
    functions.register("skip", FunctionContainer::F2(Box::new(val_skip)));
    functions.register("take", FunctionContainer::F2(Box::new(val_take)));
    functions.register("substr", FunctionContainer::F2(Box::new(val_substr)));
    functions.register("replace", FunctionContainer::F3(Box::new(val_replace)));
    functions.register("reverse", FunctionContainer::F1(Box::new(val_reverse)));
    functions.register("upper", FunctionContainer::F1(Box::new(val_upper)));
    functions.register("lower", FunctionContainer::F1(Box::new(val_lower)));
    functions.register("trim", FunctionContainer::F1(Box::new(val_trim)));
    functions.register("truncate", FunctionContainer::F2(Box::new(val_truncate)));
}

fn take_chars(s: &str, count: usize) -> String {
    s.chars().take(count).collect()
}

// Drops the parts that are empty once trimmed. An empty separator splits on whitespace.
fn split_trimmed(s: &str, separator: &str) -> Vec<String> {
    let parts: Vec<&str> = if separator.is_empty() {
        s.split_whitespace().collect()
    } else {
        s.split(separator).collect()
    };

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn val_split(op: Operand, separator: Value) -> Result<Value, InvocationError> {
    let separator = text_arg(separator)?;
    let parts = match op {
        Operand::Scalar(s) => split_trimmed(&s, &separator),
        Operand::Sequence(values) => values
            .iter()
            .flat_map(|s| split_trimmed(s, &separator))
            .collect(),
    };
    Ok(Value::from(parts))
}

pub fn val_join(op: Operand, separator: Value) -> Result<Value, InvocationError> {
    let separator = text_arg(separator)?;
    match op {
        Operand::Scalar(s) => Ok(Value::String(s)),
        Operand::Sequence(values) => Ok(Value::String(values.join(&separator))),
    }
}

pub fn val_skip(op: Operand, count: Value) -> Result<Value, InvocationError> {
    let count = count_arg(count)?;
    Ok(match op {
        Operand::Scalar(s) => Value::String(s.chars().skip(count).collect()),
        Operand::Sequence(values) => {
            Value::from(values.into_iter().skip(count).collect::<Vec<_>>())
        }
    })
}

pub fn val_take(op: Operand, count: Value) -> Result<Value, InvocationError> {
    let count = count_arg(count)?;
    Ok(match op {
        Operand::Scalar(s) => Value::String(take_chars(&s, count)),
        Operand::Sequence(values) => {
            Value::from(values.into_iter().take(count).collect::<Vec<_>>())
        }
    })
}

pub fn val_substr(op: Operand, count: Value) -> Result<Value, InvocationError> {
    let count = count_arg(count)?;
    Ok(op.map(|s| take_chars(&s, count)).into())
}

pub fn val_replace(op: Operand, old: Value, new: Value) -> Result<Value, InvocationError> {
    let old = text_arg(old)?;
    let new = text_arg(new)?;
    if old.is_empty() {
        return Err(InvocationError::Argument(
            "The value to replace must not be empty.".to_string(),
        ));
    }
    Ok(op.map(|s| s.replace(&old, &new)).into())
}

pub fn val_reverse(op: Operand) -> Result<Value, InvocationError> {
    Ok(match op {
        Operand::Scalar(s) => Value::String(s.chars().rev().collect()),
        Operand::Sequence(mut values) => {
            values.reverse();
            Value::from(values)
        }
    })
}

pub fn val_upper(op: Operand) -> Result<Value, InvocationError> {
    Ok(op.map(|s| s.to_uppercase()).into())
}

pub fn val_lower(op: Operand) -> Result<Value, InvocationError> {
    Ok(op.map(|s| s.to_lowercase()).into())
}

pub fn val_trim(op: Operand) -> Result<Value, InvocationError> {
    Ok(op.map(|s| s.trim().to_string()).into())
}

pub fn val_truncate(op: Operand, count: Value) -> Result<Value, InvocationError> {
    let count = count_arg(count)?;
    Ok(op
        .map(|s| {
            if s.chars().count() <= count {
                s
            } else {
                take_chars(&s, count)
            }
        })
        .into())
}

#[cfg(test)]
fn scalar(s: &str) -> Operand {
    Operand::Scalar(s.to_string())
}

#[cfg(test)]
fn sequence(values: &[&str]) -> Operand {
    Operand::Sequence(values.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
fn strings(values: &[&str]) -> Value {
    Value::from(values.iter().map(|s| s.to_string()).collect::<Vec<_>>())
}

#[test]
fn defaults_are_listed_in_order() {
    let functions = Functions::with_defaults();
    assert_eq!(
        functions.names().join(", "),
        "split, join, skip, take, substr, replace, reverse, upper, lower, trim, truncate"
    );
}

#[test]
fn split_trims_and_drops_empty() {
    assert_eq!(
        val_split(scalar(" a, b ,, c ,"), Value::from(",")),
        Ok(strings(&["a", "b", "c"]))
    );
    assert_eq!(
        val_split(sequence(&["a b", "c"]), Value::from(" ")),
        Ok(strings(&["a", "b", "c"]))
    );
    assert_eq!(
        val_split(scalar(" ab "), Value::from("")),
        Ok(strings(&["ab"]))
    );
    assert_eq!(
        val_split(scalar("Tore Olav"), Value::from("")),
        Ok(strings(&["Tore", "Olav"]))
    );
    assert_eq!(
        val_split(sequence(&["a\tb", " c  d "]), Value::from("")),
        Ok(strings(&["a", "b", "c", "d"]))
    );
    assert_eq!(
        val_split(scalar("a b"), Value::from(1)),
        Err(InvocationError::NotSupported)
    );
}

#[test]
fn join_sequence_only() {
    assert_eq!(
        val_join(sequence(&["a", "b"]), Value::from(".")),
        Ok(Value::from("a.b"))
    );
    assert_eq!(
        val_join(scalar("ab"), Value::from(".")),
        Ok(Value::from("ab"))
    );
}

#[test]
fn skip_and_take() {
    assert_eq!(val_skip(scalar("hello"), Value::from(2)), Ok(Value::from("llo")));
    assert_eq!(val_skip(scalar("hi"), Value::from(5)), Ok(Value::from("")));
    assert_eq!(
        val_skip(sequence(&["a", "b", "c"]), Value::from(1)),
        Ok(strings(&["b", "c"]))
    );
    assert_eq!(val_take(scalar("hello"), Value::from(2)), Ok(Value::from("he")));
    assert_eq!(val_take(scalar("hi"), Value::from(5)), Ok(Value::from("hi")));
    assert_eq!(
        val_take(sequence(&["a", "b", "c"]), Value::from(2)),
        Ok(strings(&["a", "b"]))
    );
    assert!(matches!(
        val_take(scalar("hi"), Value::from(-1)),
        Err(InvocationError::Argument(_))
    ));
}

#[test]
fn substr_is_elementwise() {
    assert_eq!(
        val_substr(sequence(&["Tore", "Olav"]), Value::from(1)),
        Ok(strings(&["T", "O"]))
    );
    assert_eq!(val_substr(scalar("Tore"), Value::from(2)), Ok(Value::from("To")));
}

#[test]
fn replace_all() {
    assert_eq!(
        val_replace(scalar("Kjøs"), Value::from("ø"), Value::from("o")),
        Ok(Value::from("Kjos"))
    );
    assert_eq!(
        val_replace(sequence(&["aa", "ba"]), Value::from("a"), Value::from("x")),
        Ok(strings(&["xx", "bx"]))
    );
    assert!(matches!(
        val_replace(scalar("a"), Value::from(""), Value::from("x")),
        Err(InvocationError::Argument(_))
    ));
}

#[test]
fn reverse_chars_or_elements() {
    assert_eq!(val_reverse(scalar("abc")), Ok(Value::from("cba")));
    assert_eq!(
        val_reverse(sequence(&["a", "b"])),
        Ok(strings(&["b", "a"]))
    );
}

#[test]
fn case_and_trim() {
    assert_eq!(val_upper(scalar("Tore")), Ok(Value::from("TORE")));
    assert_eq!(
        val_lower(sequence(&["A", "B"])),
        Ok(strings(&["a", "b"]))
    );
    assert_eq!(val_trim(scalar("  x ")), Ok(Value::from("x")));
}

#[test]
fn truncate_caps_length() {
    assert_eq!(val_truncate(scalar("abcdef"), Value::from(3)), Ok(Value::from("abc")));
    assert_eq!(val_truncate(scalar("ab"), Value::from(3)), Ok(Value::from("ab")));
    assert_eq!(
        val_truncate(sequence(&["abcd", "e"]), Value::from(2)),
        Ok(strings(&["ab", "e"]))
    );
}
