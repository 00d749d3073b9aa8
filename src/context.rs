use crate::error::Error;
use crate::value::Value;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type whose members can be read from templates.
///
/// # Examples
///
/// ```
/// use holey::{Members, Model};
///
/// struct Person {
///     first_name: String,
///     nickname: Option<String>,
/// }
///
/// impl Model for Person {
///     fn members(members: &mut Members<Self>) {
///         members
///             .member("FirstName", |p: &Person| p.first_name.clone())
///             .member("Nickname", |p: &Person| p.nickname.clone());
///     }
/// }
/// ```
pub trait Model: 'static {
    fn members(members: &mut Members<Self>)
    where
        Self: Sized;
}

type Accessor<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Name to accessor table of a [`Model`]. Built once per type and then cached.
pub struct Members<T> {
    accessors: Vec<(String, Accessor<T>)>,
}

impl<T: 'static> Members<T> {
    fn new() -> Self {
        Members {
            accessors: Vec::new(),
        }
    }

    pub fn member<F, V>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        let accessor: Accessor<T> = Box::new(move |model: &T| -> Value { accessor(model).into() });
        self.accessors.push((name.into(), accessor));
        self
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl<T> fmt::Debug for Members<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.accessors.iter().map(|(name, _)| name))
            .finish()
    }
}

// Keyed by the model's type id; the entry is always a `Members` of that model.
static MEMBER_CACHE: Lazy<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn describe<M: Model>() -> Members<M> {
    let mut members = Members::new();
    M::members(&mut members);
    members
}

fn members_of<M: Model>() -> Arc<Members<M>> {
    let type_id = TypeId::of::<M>();
    let cached = MEMBER_CACHE.read().get(&type_id).cloned();

    let entry = match cached {
        Some(entry) => entry,
        None => {
            let members = describe::<M>();
            let mut cache = MEMBER_CACHE.write();
            // Another thread may have won the race; its table is kept.
            cache
                .entry(type_id)
                .or_insert_with(|| {
                    tracing::debug!(
                        model = std::any::type_name::<M>(),
                        members = members.len(),
                        "cached model members"
                    );
                    Arc::new(members) as Arc<dyn Any + Send + Sync>
                })
                .clone()
        }
    };

    entry
        .downcast::<Members<M>>()
        .unwrap_or_else(|_| Arc::new(describe::<M>()))
}

#[cfg(test)]
fn is_cached<M: Model>() -> bool {
    MEMBER_CACHE.read().contains_key(&TypeId::of::<M>())
}

/// Named values of one evaluation, looked up ignoring case.
///
/// Names are listed in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: IndexMap<String, (String, Value)>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            values: IndexMap::new(),
        }
    }

    /// Reads every member of `model`. Missing (null) members become empty strings.
    pub fn from_model<M: Model>(model: &M) -> Self {
        let members = members_of::<M>();
        let mut context = Context::new();

        for (name, accessor) in &members.accessors {
            let value = match accessor(model) {
                Value::Null => Value::String(String::new()),
                value => value,
            };
            context.insert(name.clone(), value);
        }

        context
    }

    /// Uses the given pairs as they are, nulls included.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut context = Context::new();
        for (name, value) in properties {
            context.insert(name, value);
        }
        context
    }

    /// Uses the members of a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, Error> {
        match json {
            serde_json::Value::Object(object) => Ok(Context::from_properties(
                object.into_iter().map(|(name, value)| (name, Value::from(value))),
            )),
            other => Err(Error::InvalidSource {
                message: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    /// Adds a value; a name differing only in case replaces the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        self.values
            .insert(name.to_lowercase(), (name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .get(&name.to_lowercase())
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> Vec<String> {
        self.values.values().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
struct Person {
    first_name: String,
    last_name: Option<String>,
}

#[cfg(test)]
impl Model for Person {
    fn members(members: &mut Members<Self>) {
        members
            .member("FirstName", |p: &Person| p.first_name.clone())
            .member("LastName", |p: &Person| p.last_name.clone());
    }
}

#[test]
fn model_members_are_read() {
    let context = Context::from_model(&Person {
        first_name: "Tore Olav".to_string(),
        last_name: None,
    });

    assert_eq!(context.names(), vec!["FirstName", "LastName"]);
    assert_eq!(context.get("firstname"), Some(&Value::from("Tore Olav")));
    assert_eq!(context.get("LASTNAME"), Some(&Value::from("")));
    assert_eq!(context.get("middleName"), None);
    assert!(is_cached::<Person>());
}

#[test]
fn model_cache_is_shared_between_threads() {
    struct Pet {
        name: &'static str,
    }

    impl Model for Pet {
        fn members(members: &mut Members<Self>) {
            members.member("Name", |p: &Pet| p.name);
        }
    }

    let contexts: Vec<Context> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| Context::from_model(&Pet { name: "Rex" })))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(is_cached::<Pet>());
    for context in contexts {
        assert_eq!(context.names(), vec!["Name"]);
        assert_eq!(context.get("name"), Some(&Value::from("Rex")));
    }
}

#[test]
fn properties_keep_nulls() {
    let context = Context::from_properties(vec![
        ("name", Value::from("x")),
        ("missing", Value::Null),
    ]);
    assert_eq!(context.get("MISSING"), Some(&Value::Null));
    assert_eq!(context.names(), vec!["name", "missing"]);
}

#[test]
fn properties_replace_ignoring_case() {
    let mut context = Context::new();
    context.insert("Name", "a");
    context.insert("other", "b");
    context.insert("NAME", "c");
    assert_eq!(context.names(), vec!["NAME", "other"]);
    assert_eq!(context.get("name"), Some(&Value::from("c")));
    assert_eq!(context.len(), 2);
}

#[test]
fn json_objects_only() {
    let context = Context::from_json(serde_json::json!({ "a": 1, "b": null })).unwrap();
    assert_eq!(context.get("A"), Some(&Value::Integer(1)));
    assert_eq!(context.get("b"), Some(&Value::Null));

    let err = Context::from_json(serde_json::json!([1, 2])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid named-value source: expected a JSON object, got an array"
    );
}
