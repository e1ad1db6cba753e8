//! Loader scopes and the ascending scope chain.
//!
//! The engine never touches the filesystem or any module system directly.
//! The host hands over a starting [`Scope`] — an opaque "attempt to load a
//! named unit" capability with an optional parent — and resolution ascends
//! the parent chain until a candidate loads or the chain runs out.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::init::Initializer;

/// What a scope hands back on a successful load.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The unit's payload is the initializer itself.
    Init(Initializer),
    /// The unit nests its payload under a conventional default-export
    /// shape; the engine unwraps one level automatically.
    DefaultExport(Box<LoadOutcome>),
}

/// Why a load attempt failed.
///
/// `NotFound` carries the name the loader could not find, which is how the
/// engine tells "this candidate does not exist" (missing name equals the
/// candidate) apart from "this candidate exists but one of its own
/// dependencies is missing."
#[derive(Debug, Clone, Error)]
pub enum LoadFailure {
    #[error("cannot find '{missing}': {message}")]
    NotFound { missing: String, message: String },
    #[error("syntax error: {message}")]
    Syntax { message: String },
    #[error("load error: {message}")]
    Failed { message: String },
}

impl LoadFailure {
    /// Convenience constructor for the plain "no such unit" failure.
    pub fn not_found(missing: impl Into<String>) -> Self {
        let missing = missing.into();
        let message = format!("Cannot find '{missing}'");
        LoadFailure::NotFound { missing, message }
    }

    pub fn message(&self) -> &str {
        match self {
            LoadFailure::NotFound { message, .. } => message,
            LoadFailure::Syntax { message } => message,
            LoadFailure::Failed { message } => message,
        }
    }
}

/// One level of the ascending loader hierarchy.
pub trait Scope: Send + Sync {
    /// Stable identifier, used in the attempt history.
    fn id(&self) -> &str;

    /// Base path for diagnostics only; never used to resolve anything.
    fn base_path(&self) -> &str {
        ""
    }

    /// The enclosing scope, if any.
    fn parent(&self) -> Option<Arc<dyn Scope>> {
        None
    }

    /// Attempt to resolve and execute the named unit.
    fn attempt_load(&self, name: &str) -> Result<LoadOutcome, LoadFailure>;
}

/// Finite iterator over a scope and its ancestors, innermost first.
///
/// A fresh ascent is computed per resolution call; there is no shared
/// cursor.
pub struct ScopeChain {
    next: Option<Arc<dyn Scope>>,
}

impl ScopeChain {
    pub fn ascend(start: Arc<dyn Scope>) -> Self {
        Self { next: Some(start) }
    }
}

impl Iterator for ScopeChain {
    type Item = Arc<dyn Scope>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Map-backed scope for hosts with a fixed unit table, and for tests.
pub struct StaticScope {
    id: String,
    base_path: String,
    parent: Option<Arc<dyn Scope>>,
    units: HashMap<String, LoadOutcome>,
    failures: HashMap<String, LoadFailure>,
}

impl StaticScope {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_path: String::new(),
            parent: None,
            units: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_parent(mut self, parent: Arc<dyn Scope>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Register a loadable unit under `name`.
    pub fn unit(mut self, name: impl Into<String>, outcome: LoadOutcome) -> Self {
        self.units.insert(name.into(), outcome);
        self
    }

    /// Register a name whose load attempt fails with `failure`.
    pub fn failure(mut self, name: impl Into<String>, failure: LoadFailure) -> Self {
        self.failures.insert(name.into(), failure);
        self
    }
}

impl Scope for StaticScope {
    fn id(&self) -> &str {
        &self.id
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn parent(&self) -> Option<Arc<dyn Scope>> {
        self.parent.clone()
    }

    fn attempt_load(&self, name: &str) -> Result<LoadOutcome, LoadFailure> {
        if let Some(outcome) = self.units.get(name) {
            return Ok(outcome.clone());
        }
        if let Some(failure) = self.failures.get(name) {
            return Err(failure.clone());
        }
        Err(LoadFailure::not_found(name))
    }
}

/// Caching wrapper around a scope's load primitive.
///
/// Only successful outcomes are cached, keyed by candidate name, so a unit
/// that failed to load is retried on the next resolution. `invalidate` and
/// `clear` are the whole invalidation surface.
pub struct CachedScope {
    inner: Arc<dyn Scope>,
    cache: RwLock<HashMap<String, LoadOutcome>>,
}

impl CachedScope {
    pub fn new(inner: Arc<dyn Scope>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop the cached outcome for `name`, if any.
    pub fn invalidate(&self, name: &str) {
        self.cache.write().remove(name);
    }

    /// Drop every cached outcome.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

impl Scope for CachedScope {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn base_path(&self) -> &str {
        self.inner.base_path()
    }

    fn parent(&self) -> Option<Arc<dyn Scope>> {
        self.inner.parent()
    }

    fn attempt_load(&self, name: &str) -> Result<LoadOutcome, LoadFailure> {
        if let Some(hit) = self.cache.read().get(name) {
            tracing::trace!(name, scope = self.id(), "load cache hit");
            return Ok(hit.clone());
        }
        let outcome = self.inner.attempt_load(name)?;
        self.cache
            .write()
            .insert(name.to_string(), outcome.clone());
        Ok(outcome)
    }
}
