//! Initializer and defaults handles.
//!
//! A loaded plugin boils down to an [`Initializer`]: an invocable unit that
//! may declare its own name and carry a declared defaults shape. Defaults
//! come in a closed set of variants — see [`Defaults`].

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// The invocable payload of a plugin.
pub type InitFn = Arc<dyn Fn(&Map<String, Value>) -> Value + Send + Sync>;

/// Validation hook applied to caller options when defaults are schema-like.
///
/// The hook either returns the (possibly coerced) options or rejects them
/// with a human-readable reason.
pub trait OptionsValidator: Send + Sync {
    fn validate(&self, options: &Map<String, Value>) -> Result<Map<String, Value>, String>;
}

impl<F> OptionsValidator for F
where
    F: Fn(&Map<String, Value>) -> Result<Map<String, Value>, String> + Send + Sync,
{
    fn validate(&self, options: &Map<String, Value>) -> Result<Map<String, Value>, String> {
        self(options)
    }
}

/// Declared defaults attached to an initializer or a plugin descriptor.
#[derive(Clone)]
pub enum Defaults {
    /// Plain mapping; caller options are deep-merged over it.
    Map(Map<String, Value>),
    /// Validation hook; options are passed through it instead of merged.
    Validator(Arc<dyn OptionsValidator>),
    /// External schema handle; passed through to the host untouched.
    Schema(Value),
}

impl Defaults {
    /// Schema-like defaults bypass merging entirely.
    pub fn is_schema_like(&self) -> bool {
        !matches!(self, Defaults::Map(_))
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defaults::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Defaults::Validator(_) => f.write_str("Validator(..)"),
            Defaults::Schema(schema) => f.debug_tuple("Schema").field(schema).finish(),
        }
    }
}

/// An executable plugin initializer.
///
/// Mirrors what a dynamically loaded unit exposes: the function itself, an
/// optional self-declared name (which wins over path-derived guesses during
/// resolution), and optional attached defaults.
#[derive(Clone)]
pub struct Initializer {
    name: Option<String>,
    defaults: Option<Defaults>,
    func: InitFn,
}

impl Initializer {
    /// An anonymous initializer.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            defaults: None,
            func: Arc::new(func),
        }
    }

    /// An initializer that declares its own name.
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            defaults: None,
            func: Arc::new(func),
        }
    }

    /// Attach declared defaults.
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// The unit's self-declared name, if any and non-empty.
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Defaults attached to the unit, if any.
    pub fn defaults(&self) -> Option<&Defaults> {
        self.defaults.as_ref()
    }

    /// Invoke the initializer with the merged options.
    pub fn call(&self, options: &Map<String, Value>) -> Value {
        (self.func)(options)
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initializer")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
