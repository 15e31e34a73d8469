//! Stage registry: stage names mapped to a parameter schema and a constructor.
//!
//! The embedding application fills a `Registry` once at startup. The chain
//! builder only ever looks entries up by name.

use std::collections::HashMap;
use std::fmt;

use crate::error::ParamError;
use crate::params::Parameters;
use crate::stage::{Record, Stage};

/// Builds a stage instance from its (validated) parameters.
pub type Constructor<R> =
    Box<dyn Fn(&Parameters) -> Result<Box<dyn Stage<R>>, ParamError> + Send + Sync>;

/// Declared parameter names of a stage.
///
/// Required names must be present before the constructor runs. Optional
/// names are documentation for the stage and keep the builder from warning
/// about them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSchema {
    required: Vec<String>,
    optional: Vec<String>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.optional.push(name.into());
        self
    }

    pub fn required_names(&self) -> &[String] {
        &self.required
    }

    pub fn declares(&self, name: &str) -> bool {
        self.required.iter().chain(&self.optional).any(|n| n == name)
    }

    /// Every required name absent from `params`, in declaration order.
    pub fn missing(&self, params: &Parameters) -> Vec<String> {
        self.required
            .iter()
            .filter(|name| !params.contains(name))
            .cloned()
            .collect()
    }
}

/// One registered stage type.
pub struct Registration<R> {
    schema: ParamSchema,
    constructor: Constructor<R>,
}

impl<R: Record> Registration<R> {
    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn construct(&self, params: &Parameters) -> Result<Box<dyn Stage<R>>, ParamError> {
        (self.constructor)(params)
    }
}

impl<R> fmt::Debug for Registration<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Name → stage constructor table.
pub struct Registry<R> {
    entries: HashMap<String, Registration<R>>,
}

impl<R: Record> Registry<R> {
    pub fn new() -> Self {
        Registry {
            entries: HashMap::new(),
        }
    }

    /// Register a stage type under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, schema: ParamSchema, constructor: F) -> &mut Self
    where
        F: Fn(&Parameters) -> Result<Box<dyn Stage<R>>, ParamError> + Send + Sync + 'static,
    {
        let name = name.into();
        let registration = Registration {
            schema,
            constructor: Box::new(constructor),
        };
        if self.entries.insert(name.clone(), registration).is_some() {
            tracing::warn!(stage = %name, "stage registered twice, keeping the latest");
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, schema: ParamSchema, constructor: F) -> Self
    where
        F: Fn(&Parameters) -> Result<Box<dyn Stage<R>>, ParamError> + Send + Sync + 'static,
    {
        self.register(name, schema, constructor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Registration<R>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Record> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
