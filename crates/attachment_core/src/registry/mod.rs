//! Keyed service registry with lazy, memoized factory bindings.
//!
//! # Responsibility
//! - Store ready values, factories, or explicit placeholders under string keys.
//! - Construct factory bindings on first resolution and cache the instance.
//!
//! # Invariants
//! - Resolving a key twice returns the same `Rc` (no reconstruction).
//! - Registering a key again replaces the previous binding and its cache.
//! - Registration needs `&mut self`; resolution only `&self`, so no binding
//!   can change while a resolution is in flight.
//! - A key that is resolved while its own construction is in progress fails
//!   with `CircularDependency`.

use log::debug;
use once_cell::unsync::OnceCell;
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub mod provider;

pub use provider::ServiceProvider;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type returned by factory closures.
///
/// Factories may fail with any error; registry lookups inside a factory
/// convert through `?`.
pub type FactoryResult<T> = Result<T, Box<dyn Error>>;

type Instance = Rc<dyn Any>;
type Factory = Box<dyn Fn(&ServiceRegistry) -> FactoryResult<Instance>>;

/// Registry resolution errors.
#[derive(Debug)]
pub enum RegistryError {
    /// No binding exists for the key.
    NotRegistered(String),
    /// The key was explicitly set to a placeholder.
    Unconfigured(String),
    TypeMismatch {
        key: String,
        expected: &'static str,
    },
    /// Resolution chain that re-entered a key under construction.
    CircularDependency(Vec<String>),
    /// The key's factory failed.
    Construction {
        key: String,
        source: Box<dyn Error>,
    },
}

impl RegistryError {
    /// Walks nested construction failures and returns the innermost
    /// registry error.
    pub fn root_cause(&self) -> &RegistryError {
        let mut current = self;
        while let Self::Construction { source, .. } = current {
            match source.downcast_ref::<RegistryError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRegistered(key) => write!(f, "service not registered: {key}"),
            Self::Unconfigured(key) => write!(f, "service intentionally unconfigured: {key}"),
            Self::TypeMismatch { key, expected } => {
                write!(f, "service `{key}` is not a `{expected}`")
            }
            Self::CircularDependency(chain) => {
                write!(f, "circular service dependency: {}", chain.join(" -> "))
            }
            Self::Construction { key, source } => {
                write!(f, "failed to construct service `{key}`: {source}")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Construction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

enum Binding {
    Value(Instance),
    Factory(Factory),
    Placeholder,
}

struct Entry {
    binding: Binding,
    instance: OnceCell<Instance>,
}

impl Entry {
    fn new(binding: Binding) -> Self {
        Self {
            binding,
            instance: OnceCell::new(),
        }
    }
}

/// Shared key-to-service binding store.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: BTreeMap<String, Entry>,
    resolving: RefCell<Vec<String>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a lazy factory. Nothing is constructed until first `resolve`.
    pub fn register<T, F>(&mut self, key: impl Into<String>, factory: F)
    where
        T: Any,
        F: Fn(&ServiceRegistry) -> FactoryResult<T> + 'static,
    {
        let factory: Factory =
            Box::new(move |registry| factory(registry).map(|value| Rc::new(value) as Instance));
        self.insert(key.into(), Binding::Factory(factory));
    }

    /// Binds a ready value.
    pub fn set<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.set_shared(key, Rc::new(value));
    }

    /// Binds an already shared value.
    pub fn set_shared<T: Any>(&mut self, key: impl Into<String>, value: Rc<T>) {
        self.insert(key.into(), Binding::Value(value));
    }

    /// Marks a key as intentionally unconfigured.
    pub fn set_placeholder(&mut self, key: impl Into<String>) {
        self.insert(key.into(), Binding::Placeholder);
    }

    /// Removes a binding. Returns whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Returns whether any binding, placeholder included, exists for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns whether the key holds a usable (non-placeholder) binding.
    pub fn is_configured(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !matches!(entry.binding, Binding::Placeholder))
    }

    pub fn is_placeholder(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| matches!(entry.binding, Binding::Placeholder))
    }

    /// Returns whether a factory binding already built its instance.
    pub fn is_resolved(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|entry| match entry.binding {
            Binding::Value(_) => true,
            Binding::Factory(_) => entry.instance.get().is_some(),
            Binding::Placeholder => false,
        })
    }

    /// Returns sorted keys.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a key to a typed shared instance.
    pub fn resolve<T: Any>(&self, key: &str) -> RegistryResult<Rc<T>> {
        self.resolve_instance(key)?
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolves a key, mapping a missing or placeholder binding to `None`.
    ///
    /// Construction and type errors still surface.
    pub fn resolve_optional<T: Any>(&self, key: &str) -> RegistryResult<Option<Rc<T>>> {
        if !self.is_configured(key) {
            return Ok(None);
        }
        self.resolve(key).map(Some)
    }

    fn resolve_instance(&self, key: &str) -> RegistryResult<Instance> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| RegistryError::NotRegistered(key.to_string()))?;

        let factory = match &entry.binding {
            Binding::Value(value) => return Ok(Rc::clone(value)),
            Binding::Placeholder => return Err(RegistryError::Unconfigured(key.to_string())),
            Binding::Factory(factory) => factory,
        };

        if let Some(instance) = entry.instance.get() {
            return Ok(Rc::clone(instance));
        }

        self.enter(key)?;
        let built = factory(self);
        self.leave();

        let instance = built.map_err(|source| RegistryError::Construction {
            key: key.to_string(),
            source,
        })?;
        debug!("event=service_resolve module=registry status=built key={key}");
        Ok(Rc::clone(entry.instance.get_or_init(|| instance)))
    }

    fn enter(&self, key: &str) -> RegistryResult<()> {
        let mut resolving = self.resolving.borrow_mut();
        if resolving.iter().any(|pending| pending == key) {
            let mut chain = resolving.clone();
            chain.push(key.to_string());
            return Err(RegistryError::CircularDependency(chain));
        }
        resolving.push(key.to_string());
        Ok(())
    }

    fn leave(&self) {
        self.resolving.borrow_mut().pop();
    }

    fn insert(&mut self, key: String, binding: Binding) {
        let replaced = self.entries.insert(key.clone(), Entry::new(binding)).is_some();
        debug!("event=service_register module=registry status=ok key={key} replaced={replaced}");
    }
}
