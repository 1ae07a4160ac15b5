//! Configuration trees and attachment configuration resolution.
//!
//! # Responsibility
//! - Hold the application configuration tree (`AppConfig`).
//! - Deserialize typed sections (`AdminConfig`, `AttachmentsConfig`).
//! - Pick the first present value out of ordered candidate sources.
//!
//! # Invariants
//! - Configuration is read-only once handed to a consumer.
//! - Missing sections resolve to defaults, never to errors.

use crate::model::descriptor::AttachmentDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Key of the attachments section inside the application tree.
pub const ATTACHMENTS_SECTION: &str = "attachments";

/// Group used when neither caller nor config names one.
pub const FALLBACK_GROUP: &str = "generic";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from loading or interpreting configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    /// Root of an application config must be a JSON object.
    NotAnObject,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::NotAnObject => write!(f, "config root must be a JSON object"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::NotAnObject => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Returns the first present value from candidates, in order.
pub fn resolve_first<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// Application configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    data: Map<String, Value>,
}

impl AppConfig {
    /// Wraps an object tree. Non-object roots are rejected.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// Loads a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(serde_json::from_str(&raw)?)
    }

    /// Looks up a dotted key, e.g. `apis.google.recaptcha.public_key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.data.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Returns whether a dotted key is present and not null.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_null())
    }

    /// Sets one top-level key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn base_path(&self) -> Option<&str> {
        self.get("base_path").and_then(Value::as_str)
    }

    /// Returns the raw `attachments` section, if configured.
    pub fn attachments(&self) -> Option<&Value> {
        self.get(ATTACHMENTS_SECTION).filter(|value| !value.is_null())
    }
}

/// Admin module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// URL segment the admin is mounted under.
    pub base_path: String,
    pub title: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_path: "admin".to_string(),
            title: None,
        }
    }
}

/// Attachment container configuration.
///
/// `attachable_objects` maps object type identifiers to descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentsConfig {
    pub attachable_objects: BTreeMap<String, AttachmentDescriptor>,
    pub default_group: Option<String>,
}

impl AttachmentsConfig {
    /// Deserializes one attachments section.
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Uses the first present candidate section, or defaults when none is.
    pub fn resolve<'a>(
        candidates: impl IntoIterator<Item = Option<&'a Value>>,
    ) -> ConfigResult<Self> {
        match resolve_first(candidates) {
            Some(value) => Self::from_value(value),
            None => Ok(Self::default()),
        }
    }

    /// Builder-style registration of one attachable type.
    pub fn with_object(
        mut self,
        obj_type: impl Into<String>,
        descriptor: AttachmentDescriptor,
    ) -> Self {
        self.attachable_objects.insert(obj_type.into(), descriptor);
        self
    }

    /// Returns active attachable types only.
    pub fn attachable_objects(&self) -> BTreeMap<String, AttachmentDescriptor> {
        self.attachable_objects
            .iter()
            .filter(|(_, descriptor)| descriptor.is_active())
            .map(|(obj_type, descriptor)| (obj_type.clone(), descriptor.clone()))
            .collect()
    }

    /// Returns the group used when the caller does not name one.
    pub fn default_group(&self) -> &str {
        self.default_group.as_deref().unwrap_or(FALLBACK_GROUP)
    }
}
