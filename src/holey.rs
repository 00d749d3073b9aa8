use crate::context::{Context, Model};
use crate::error::Error;
use crate::exec::{Lines, RenderOptions};
use crate::expr::MultiTemplate;
use crate::functions::{FunctionContainer, Functions};
use crate::parser::Parser;
use crate::value::Value;

/// Template engine. Holds the functions templates may call and the rendering options.
///
/// The engine is cheap to share: evaluation only borrows it, so one engine can serve many
/// threads at once.
#[derive(Debug)]
pub struct Holey {
    functions: Functions,
    options: RenderOptions,
}

impl Default for Holey {
    fn default() -> Self {
        Holey::new()
    }
}

impl Holey {
    /// Creates an engine with the built-in functions and the default options.
    pub fn new() -> Self {
        Holey::with_options(RenderOptions::default())
    }

    /// Creates an engine with the built-in functions and the given options.
    ///
    /// # Examples
    ///
    /// ```
    /// let options = holey::RenderOptions {
    ///     null_placeholder: "-".to_string(),
    ///     ..Default::default()
    /// };
    /// let holey = holey::Holey::with_options(options);
    /// let template = holey.parse("{missing}").unwrap();
    ///
    /// let lines = holey
    ///     .render_properties(&template, vec![("missing", holey::Value::Null)])
    ///     .unwrap();
    /// assert_eq!(lines, vec!["-"]);
    /// ```
    pub fn with_options(options: RenderOptions) -> Self {
        Holey {
            functions: Functions::with_defaults(),
            options,
        }
    }

    /// Creates an engine that only knows the given functions.
    pub fn with_functions(functions: Functions, options: RenderOptions) -> Self {
        Holey { functions, options }
    }

    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Adds a function that can be used in templates.
    ///
    /// A function already registered under the same name (ignoring case) is replaced.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the function. Lookup ignores case.
    /// * `function` - The body of the function, one of the `FunctionContainer` variants
    /// depending on the number of parameters. The first parameter receives the piped in
    /// value.
    ///
    /// # Examples
    ///
    /// ```
    /// use holey::{FunctionContainer, InvocationError, Operand, Value};
    ///
    /// let mut holey = holey::Holey::new();
    /// holey.register_function(
    ///     "shout",
    ///     FunctionContainer::F1(Box::new(|op: Operand| -> Result<Value, InvocationError> {
    ///         Ok(op.map(|s| format!("{}!", s.to_uppercase())).into())
    ///     })),
    /// );
    ///
    /// let template = holey.parse("{name | shout}").unwrap();
    /// let lines = holey.render_properties(&template, vec![("name", "hey")]).unwrap();
    /// assert_eq!(lines, vec!["HEY!"]);
    /// ```
    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        function: FunctionContainer,
    ) -> &mut Self {
        self.functions.register(name, function);
        self
    }

    /// Parses a template. Same as [`crate::parse`].
    pub fn parse(&self, template: &str) -> Result<MultiTemplate, Error> {
        Parser::parse(template)
    }

    /// Evaluates `template` against `context`.
    ///
    /// Lines are rendered lazily, as the returned iterator is advanced.
    pub fn evaluate<'a>(&'a self, template: &'a MultiTemplate, context: Context) -> Lines<'a> {
        Lines::new(&template.parts, &self.functions, &self.options, context)
    }

    /// Evaluates `template` against the members of `model`.
    ///
    /// # Arguments
    ///
    /// * `template` - A parsed template.
    /// * `model` - Any type implementing [`Model`]. Members without a value render as an
    /// empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use holey::{Members, Model};
    ///
    /// struct Person {
    ///     first_name: String,
    ///     last_name: String,
    /// }
    ///
    /// impl Model for Person {
    ///     fn members(members: &mut Members<Self>) {
    ///         members
    ///             .member("FirstName", |p: &Person| p.first_name.clone())
    ///             .member("LastName", |p: &Person| p.last_name.clone());
    ///     }
    /// }
    ///
    /// let holey = holey::Holey::new();
    /// let template = holey
    ///     .parse("{firstName | split(' ') | substr(1)}{lastName | take(1)}")
    ///     .unwrap();
    /// let person = Person {
    ///     first_name: "Tore Olav".to_string(),
    ///     last_name: "Kristiansen".to_string(),
    /// };
    ///
    /// let mut lines = holey.evaluate_model(&template, &person);
    /// assert_eq!(lines.next(), Some(Ok("T OK".to_string())));
    /// ```
    pub fn evaluate_model<'a, M: Model>(
        &'a self,
        template: &'a MultiTemplate,
        model: &M,
    ) -> Lines<'a> {
        self.evaluate(template, Context::from_model(model))
    }

    /// Evaluates `template` against name/value pairs. Null values are kept.
    pub fn evaluate_properties<'a, I, K, V>(
        &'a self,
        template: &'a MultiTemplate,
        properties: I,
    ) -> Lines<'a>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.evaluate(template, Context::from_properties(properties))
    }

    /// Evaluates `template` against the members of a JSON object.
    ///
    /// Fails with [`Error::InvalidSource`] when `json` is not an object.
    pub fn evaluate_json<'a>(
        &'a self,
        template: &'a MultiTemplate,
        json: serde_json::Value,
    ) -> Result<Lines<'a>, Error> {
        Ok(self.evaluate(template, Context::from_json(json)?))
    }

    /// Renders every line, stopping at the first failure.
    pub fn render_model<M: Model>(
        &self,
        template: &MultiTemplate,
        model: &M,
    ) -> Result<Vec<String>, Error> {
        self.evaluate_model(template, model).collect()
    }

    /// Renders every line, stopping at the first failure.
    pub fn render_properties<I, K, V>(
        &self,
        template: &MultiTemplate,
        properties: I,
    ) -> Result<Vec<String>, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.evaluate_properties(template, properties).collect()
    }

    /// Renders every line, stopping at the first failure.
    ///
    /// # Examples
    ///
    /// ```
    /// let holey = holey::Holey::new();
    /// let template = holey.parse("{name | reverse}").unwrap();
    ///
    /// let lines = holey
    ///     .render_json(&template, serde_json::from_str(r#"{ "name" : "abc" }"#).unwrap())
    ///     .unwrap();
    /// assert_eq!(lines, vec!["cba"]);
    /// ```
    pub fn render_json(
        &self,
        template: &MultiTemplate,
        json: serde_json::Value,
    ) -> Result<Vec<String>, Error> {
        self.evaluate_json(template, json)?.collect()
    }
}

#[test]
fn render() {
    let holey = Holey::new();
    let template = holey
        .parse("{firstName | upper}\n{lastName | take(3)}")
        .unwrap();

    assert_eq!(
        holey
            .render_properties(
                &template,
                vec![("FirstName", "Tore"), ("LastName", "Kristiansen")]
            )
            .unwrap(),
        vec!["TORE", "Kri"]
    );
}

#[test]
fn render_json_source() {
    let holey = Holey::new();
    let template = holey.parse("{n} {items | join(',')} {flag}").unwrap();

    assert_eq!(
        holey
            .render_json(
                &template,
                serde_json::from_str(r#"{ "n" : 2, "items" : ["a", "b"], "flag" : true }"#).unwrap()
            )
            .unwrap(),
        vec!["2 a,b true"]
    );
    assert!(matches!(
        holey.render_json(&template, serde_json::json!("text")),
        Err(Error::InvalidSource { .. })
    ));
}

#[test]
fn registered_function_replaces_builtin() {
    use crate::error::InvocationError;
    use crate::func_helper::Operand;

    let mut holey = Holey::new();
    holey.register_function(
        "UPPER",
        FunctionContainer::F1(Box::new(|op: Operand| -> Result<Value, InvocationError> {
            Ok(op.map(|s| s.to_lowercase()).into())
        })),
    );

    let template = holey.parse("{name | upper}").unwrap();
    assert_eq!(
        holey.render_properties(&template, vec![("name", "ABC")]).unwrap(),
        vec!["abc"]
    );
    assert_eq!(holey.functions().len(), 11);
}

#[test]
fn empty_function_set() {
    let holey = Holey::with_functions(Functions::new(), RenderOptions::default());
    let template = holey.parse("{name | upper}").unwrap();

    assert_eq!(
        holey
            .render_properties(&template, vec![("name", "a")])
            .unwrap_err()
            .to_string(),
        "Unknown function 'upper'. Available functions: "
    );
}
