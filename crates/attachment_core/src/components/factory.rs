//! Generic ident-to-object factory.
//!
//! # Responsibility
//! - Map type idents to builders, directly or via a resolved class name.
//! - Hand every builder the same shared constructor arguments.
//!
//! # Invariants
//! - Lookup order: exact ident, resolved class name, then default builder.
//! - Class names are `prefix` + camel-cased segments joined by `::` + `suffix`.

use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

pub type FactoryResult<T> = Result<T, FactoryError>;

/// Builder closure bound to one ident or class name.
pub type Builder<T> = Rc<dyn Fn(&BuildContext<'_>) -> FactoryResult<T>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    EmptyIdent,
    UnknownType { ident: String, class: String },
    /// A builder ran but could not produce its object.
    Build { ident: String, message: String },
}

impl Display for FactoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdent => write!(f, "factory ident must not be blank"),
            Self::UnknownType { ident, class } => {
                write!(f, "no builder for `{ident}` (resolved as `{class}`)")
            }
            Self::Build { ident, message } => write!(f, "failed to build `{ident}`: {message}"),
        }
    }
}

impl Error for FactoryError {}

/// Class-name resolution affixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    pub prefix: String,
    pub suffix: String,
}

impl ResolverOptions {
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            prefix: String::new(),
            suffix: suffix.into(),
        }
    }
}

/// Named, type-erased constructor arguments shared by all builders.
#[derive(Clone, Default)]
pub struct FactoryArguments {
    values: BTreeMap<String, Rc<dyn Any>>,
}

impl FactoryArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Any>(mut self, name: impl Into<String>, value: Rc<V>) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get<V: Any>(&self, name: &str) -> Option<Rc<V>> {
        self.values
            .get(name)
            .and_then(|value| Rc::clone(value).downcast::<V>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

impl Debug for FactoryArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// What a builder receives.
pub struct BuildContext<'a> {
    pub ident: &'a str,
    pub class: &'a str,
    pub arguments: &'a FactoryArguments,
}

impl BuildContext<'_> {
    /// Fetches a required argument or fails the build.
    pub fn require<V: Any>(&self, name: &str) -> FactoryResult<Rc<V>> {
        self.arguments.get(name).ok_or_else(|| FactoryError::Build {
            ident: self.ident.to_string(),
            message: format!("missing factory argument `{name}`"),
        })
    }
}

/// Ident-to-object factory.
pub struct GenericFactory<T> {
    map: BTreeMap<String, Builder<T>>,
    default_builder: Option<Builder<T>>,
    resolver: ResolverOptions,
    arguments: FactoryArguments,
}

impl<T> Default for GenericFactory<T> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
            default_builder: None,
            resolver: ResolverOptions::default(),
            arguments: FactoryArguments::default(),
        }
    }
}

impl<T> GenericFactory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(mut self, resolver: ResolverOptions) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_arguments(mut self, arguments: FactoryArguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Binds an ident or class name to a builder.
    pub fn map(
        mut self,
        key: impl Into<String>,
        builder: impl Fn(&BuildContext<'_>) -> FactoryResult<T> + 'static,
    ) -> Self {
        self.map.insert(key.into(), Rc::new(builder));
        self
    }

    /// Builder used when neither ident nor class name is mapped.
    pub fn with_default(
        mut self,
        builder: impl Fn(&BuildContext<'_>) -> FactoryResult<T> + 'static,
    ) -> Self {
        self.default_builder = Some(Rc::new(builder));
        self
    }

    pub fn arguments(&self) -> &FactoryArguments {
        &self.arguments
    }

    pub fn resolver(&self) -> &ResolverOptions {
        &self.resolver
    }

    /// Resolves an ident into its class name.
    ///
    /// `charcoal/admin/user` with suffix `Model` becomes
    /// `Charcoal::Admin::UserModel`.
    pub fn resolve(&self, ident: &str) -> String {
        let body = ident
            .trim()
            .split('/')
            .map(camelize)
            .collect::<Vec<_>>()
            .join("::");
        format!("{}{}{}", self.resolver.prefix, body, self.resolver.suffix)
    }

    pub fn is_resolvable(&self, ident: &str) -> bool {
        let ident = ident.trim();
        !ident.is_empty()
            && (self.map.contains_key(ident)
                || self.map.contains_key(&self.resolve(ident))
                || self.default_builder.is_some())
    }

    pub fn create(&self, ident: &str) -> FactoryResult<T> {
        let ident = ident.trim();
        if ident.is_empty() {
            return Err(FactoryError::EmptyIdent);
        }

        let class = self.resolve(ident);
        let builder = self
            .map
            .get(ident)
            .or_else(|| self.map.get(&class))
            .or(self.default_builder.as_ref())
            .ok_or_else(|| FactoryError::UnknownType {
                ident: ident.to_string(),
                class: class.clone(),
            })?;

        builder(&BuildContext {
            ident,
            class: &class,
            arguments: &self.arguments,
        })
    }
}

impl<T> Debug for GenericFactory<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericFactory")
            .field("map", &self.map.keys().collect::<Vec<_>>())
            .field("has_default", &self.default_builder.is_some())
            .field("resolver", &self.resolver)
            .field("arguments", &self.arguments)
            .finish()
    }
}

fn camelize(segment: &str) -> String {
    segment
        .split(['-', '_', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
