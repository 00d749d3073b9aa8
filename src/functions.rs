use crate::default_functions;
use crate::error::InvocationError;
use crate::func_helper::Operand;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// A template function, categorized by the number of parameters it takes.
///
/// The first parameter is always the operand the function is applied to (the piped in
/// value); the remaining ones are the arguments written in the template.
pub enum FunctionContainer {
    F1(Box<dyn Fn(Operand) -> Result<Value, InvocationError> + Send + Sync>),
    F2(Box<dyn Fn(Operand, Value) -> Result<Value, InvocationError> + Send + Sync>),
    F3(Box<dyn Fn(Operand, Value, Value) -> Result<Value, InvocationError> + Send + Sync>),
}

impl fmt::Debug for FunctionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("FunctionContainer");
        match self {
            FunctionContainer::F1(_) => f.field("F1", &1),
            FunctionContainer::F2(_) => f.field("F2", &2),
            FunctionContainer::F3(_) => f.field("F3", &3),
        };

        f.finish()
    }
}

impl FunctionContainer {
    pub fn param_num(&self) -> usize {
        match self {
            FunctionContainer::F1(_) => 1,
            FunctionContainer::F2(_) => 2,
            FunctionContainer::F3(_) => 3,
        }
    }

    /// Invokes the function with already evaluated arguments, operand first.
    pub fn call(&self, arguments: Vec<Value>) -> Result<Value, InvocationError> {
        if arguments.len() != self.param_num() {
            return Err(InvocationError::ParameterCountMismatch);
        }

        let mut arguments = arguments.into_iter();
        let mut next = || {
            arguments
                .next()
                .ok_or(InvocationError::ParameterCountMismatch)
        };

        match self {
            FunctionContainer::F1(f) => f(Operand::try_from(next()?)?),
            FunctionContainer::F2(f) => {
                let operand = Operand::try_from(next()?)?;
                f(operand, next()?)
            }
            FunctionContainer::F3(f) => {
                let operand = Operand::try_from(next()?)?;
                let first = next()?;
                f(operand, first, next()?)
            }
        }
    }
}

/// Function table with case-insensitive lookup. Listing order is registration order.
#[derive(Debug, Default)]
pub struct Functions {
    entries: IndexMap<String, (String, FunctionContainer)>,
}

impl Functions {
    /// A table without any function.
    pub fn new() -> Self {
        Functions {
            entries: IndexMap::new(),
        }
    }

    /// A table holding the built-in functions.
    pub fn with_defaults() -> Self {
        let mut functions = Functions::new();
        default_functions::register_defaults(&mut functions);
        functions
    }

    /// Adds a function, replacing the one registered under the same name (ignoring case).
    ///
    /// A replaced function keeps its place in [`Functions::names`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        function: FunctionContainer,
    ) -> Option<FunctionContainer> {
        let name = name.into();
        let key = name.to_lowercase();

        match self.entries.get_mut(&key) {
            Some(entry) => {
                tracing::debug!(%name, "replacing template function");
                let (_, previous) = std::mem::replace(entry, (name, function));
                Some(previous)
            }
            None => {
                tracing::debug!(
                    %name,
                    params = function.param_num(),
                    "registering template function"
                );
                self.entries.insert(key, (name, function));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionContainer> {
        self.entries
            .get(&name.to_lowercase())
            .map(|(_, function)| function)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.values().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
fn shout() -> FunctionContainer {
    FunctionContainer::F1(Box::new(|op: Operand| -> Result<Value, InvocationError> {
        Ok(op.map(|s| format!("{}!", s)).into())
    }))
}

#[test]
fn lookup_ignores_case() {
    let mut functions = Functions::new();
    assert!(functions.register("Shout", shout()).is_none());

    assert!(functions.get("shout").is_some());
    assert!(functions.get("SHOUT").is_some());
    assert!(functions.get("whisper").is_none());
    assert_eq!(functions.names(), vec!["Shout".to_string()]);
}

#[test]
fn register_replaces_in_place() {
    let mut functions = Functions::new();
    functions.register("a", shout());
    functions.register("b", shout());

    let previous = functions.register(
        "A",
        FunctionContainer::F2(Box::new(
            |op: Operand, _: Value| -> Result<Value, InvocationError> { Ok(op.into()) },
        )),
    );
    assert_eq!(previous.map(|f| f.param_num()), Some(1));
    assert_eq!(functions.names(), vec!["A".to_string(), "b".to_string()]);
    assert_eq!(functions.get("a").map(|f| f.param_num()), Some(2));
    assert_eq!(functions.len(), 2);
}

#[test]
fn call_checks_arity_and_shape() {
    let f = shout();
    assert_eq!(f.call(vec![Value::from("hey")]), Ok(Value::from("hey!")));
    assert_eq!(
        f.call(vec![Value::from("hey"), Value::from(1)]),
        Err(InvocationError::ParameterCountMismatch)
    );
    assert_eq!(f.call(vec![]), Err(InvocationError::ParameterCountMismatch));
    assert_eq!(
        f.call(vec![Value::Integer(1)]),
        Err(InvocationError::NotSupported)
    );
}
