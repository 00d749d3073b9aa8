use crate::context::Context;
use crate::error::Error;
use crate::eval::Evaluator;
use crate::expr::{Expr, Template};
use crate::functions::Functions;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::slice;

/// How hole values are written into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Written for a null value.
    pub null_placeholder: String,
    /// Written for an empty string or an empty sequence.
    pub empty_placeholder: String,
    /// Written between the elements of a sequence.
    pub sequence_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            null_placeholder: "<null>".to_string(),
            empty_placeholder: "<empty>".to_string(),
            sequence_separator: " ".to_string(),
        }
    }
}

/// Writes one hole value.
///
/// Sequence elements are joined as they are, except that null elements get the null
/// placeholder and nested sequences follow the same rules.
pub fn render_value(value: &Value, options: &RenderOptions) -> String {
    match value {
        Value::Null => options.null_placeholder.clone(),
        Value::String(s) if s.is_empty() => options.empty_placeholder.clone(),
        Value::Sequence(values) if values.is_empty() => options.empty_placeholder.clone(),
        Value::Sequence(values) => values
            .iter()
            .map(|value| render_element(value, options))
            .collect::<Vec<_>>()
            .join(&options.sequence_separator),
        value => value.to_string(),
    }
}

fn render_element(value: &Value, options: &RenderOptions) -> String {
    match value {
        Value::Null | Value::Sequence(_) => render_value(value, options),
        value => value.to_string(),
    }
}

/// Renders one line. Text is copied as is; holes go through [`render_value`].
pub fn render_template(evaluator: &Evaluator<'_>, template: &Template) -> Result<String, Error> {
    let mut rendered = String::new();

    for part in &template.parts {
        match part {
            Expr::Text { value, .. } => rendered.push_str(value),
            hole => {
                let value = evaluator.evaluate(hole)?;
                rendered.push_str(&render_value(&value, evaluator.options()));
            }
        }
    }

    Ok(rendered)
}

/// Output lines of a template, rendered one at a time as they are pulled.
///
/// Once a line fails no further line is evaluated.
pub struct Lines<'a> {
    templates: slice::Iter<'a, Template>,
    functions: &'a Functions,
    options: &'a RenderOptions,
    context: Context,
    failed: bool,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(
        templates: &'a [Template],
        functions: &'a Functions,
        options: &'a RenderOptions,
        context: Context,
    ) -> Self {
        Lines {
            templates: templates.iter(),
            functions,
            options,
            context,
            failed: false,
        }
    }

    /// Named values the lines are evaluated against.
    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Iterator for Lines<'_> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let template = self.templates.next()?;
        let evaluator = Evaluator::new(self.functions, &self.context, self.options);
        let rendered = render_template(&evaluator, template);

        if let Err(e) = &rendered {
            tracing::debug!(position = %e.position(), "failed to evaluate template line: {}", e);
            self.failed = true;
        }
        Some(rendered)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.templates.len()))
        }
    }
}

impl FusedIterator for Lines<'_> {}

#[test]
fn placeholders() {
    let options = RenderOptions::default();
    assert_eq!(render_value(&Value::Null, &options), "<null>");
    assert_eq!(render_value(&Value::from(""), &options), "<empty>");
    assert_eq!(render_value(&Value::Sequence(vec![]), &options), "<empty>");
    assert_eq!(
        render_value(&Value::from(vec!["a".to_string(), "b".to_string()]), &options),
        "a b"
    );
    assert_eq!(render_value(&Value::Integer(7), &options), "7");
}

#[test]
fn sequence_elements() {
    let options = RenderOptions::default();
    let values = Value::Sequence(vec![Value::from("a"), Value::Null, Value::from("")]);
    assert_eq!(render_value(&values, &options), "a <null> ");

    let nested = Value::Sequence(vec![
        Value::from("a"),
        Value::Sequence(vec![Value::from("b"), Value::Null]),
        Value::Sequence(vec![]),
    ]);
    assert_eq!(render_value(&nested, &options), "a b <null> <empty>");
}

#[test]
fn options_from_json() {
    let options: RenderOptions =
        serde_json::from_str(r#"{ "null_placeholder": "", "sequence_separator": ", " }"#).unwrap();
    assert_eq!(options.null_placeholder, "");
    assert_eq!(options.empty_placeholder, "<empty>");
    assert_eq!(
        render_value(&Value::from(vec!["a".to_string(), "b".to_string()]), &options),
        "a, b"
    );
}

#[test]
fn lines_stop_after_failure() {
    let parsed = crate::parser::parse("ok\n{missing}\nnever").unwrap();
    let functions = Functions::with_defaults();
    let options = RenderOptions::default();
    let mut lines = Lines::new(&parsed.parts, &functions, &options, Context::new());

    assert_eq!(lines.next(), Some(Ok("ok".to_string())));
    assert!(matches!(lines.next(), Some(Err(Error::UnknownProperty { .. }))));
    assert_eq!(lines.next(), None);
}

#[test]
fn text_is_never_a_placeholder() {
    let parsed = crate::parser::parse("a\n\nb").unwrap();
    let functions = Functions::with_defaults();
    let options = RenderOptions::default();
    let lines: Result<Vec<_>, _> =
        Lines::new(&parsed.parts, &functions, &options, Context::new()).collect();
    assert_eq!(lines.unwrap(), vec!["a", "", "b"]);
}
