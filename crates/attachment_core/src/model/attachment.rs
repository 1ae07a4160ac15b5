//! Attachment record.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another attachment.
//! - `obj_type` is never blank.
//! - `attachment_type` is computed at read time and skipped by serde.

use crate::model::descriptor::AttachmentDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every attachment.
pub type AttachmentId = Uuid;

/// Object type of container attachments (galleries, nested blocks).
pub const CONTAINER_OBJ_TYPE: &str = "charcoal/attachment/object/container";

/// Parent record an attachment is joined to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub source_type: String,
    pub source_id: String,
}

impl SourceRef {
    pub fn new(source_type: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            source_id: source_id.into(),
        }
    }
}

/// Canonical attachment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub uuid: AttachmentId,
    /// Object type identifier, e.g. `image` or a namespaced class ident.
    pub obj_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Relative file path for file-backed types.
    pub file: Option<String>,
    pub link: Option<String>,
    /// Free-form per-type metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub active: bool,
    /// Read-time annotation from the attachable objects config.
    #[serde(skip)]
    pub attachment_type: Option<AttachmentDescriptor>,
}

impl Attachment {
    /// Creates an active attachment with a generated stable ID.
    pub fn new(obj_type: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), obj_type)
    }

    /// Creates an attachment with a caller-provided stable ID.
    pub fn with_id(uuid: AttachmentId, obj_type: impl Into<String>) -> Self {
        Self {
            uuid,
            obj_type: obj_type.into(),
            title: None,
            description: None,
            file: None,
            link: None,
            metadata: Map::new(),
            active: true,
            attachment_type: None,
        }
    }

    /// Builder-style title setter.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the source reference this attachment exposes when it holds
    /// children of its own.
    pub fn as_source(&self) -> SourceRef {
        SourceRef::new(self.obj_type.clone(), self.uuid.to_string())
    }

    /// Validates write-path invariants.
    pub fn validate(&self) -> Result<(), AttachmentValidationError> {
        if self.obj_type.trim().is_empty() {
            return Err(AttachmentValidationError::EmptyObjType);
        }
        Ok(())
    }
}

/// Validation failures for attachment writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentValidationError {
    EmptyObjType,
}

impl Display for AttachmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyObjType => write!(f, "attachment obj_type must not be blank"),
        }
    }
}

impl Error for AttachmentValidationError {}

#[cfg(test)]
mod tests {
    use super::{Attachment, AttachmentValidationError};
    use crate::model::descriptor::AttachmentDescriptor;

    #[test]
    fn annotation_is_not_serialized() {
        let mut attachment = Attachment::new("image").titled("Cover");
        attachment.attachment_type = Some(AttachmentDescriptor::labeled("Image"));

        let value = serde_json::to_value(&attachment).expect("serialize");
        assert!(value.get("attachment_type").is_none());
        assert_eq!(value["title"], "Cover");
    }

    #[test]
    fn blank_obj_type_is_rejected() {
        let attachment = Attachment::new("  ");
        assert_eq!(
            attachment.validate(),
            Err(AttachmentValidationError::EmptyObjType)
        );
    }

    #[test]
    fn as_source_uses_type_and_id() {
        let attachment = Attachment::new("gallery");
        let source = attachment.as_source();
        assert_eq!(source.source_type, "gallery");
        assert_eq!(source.source_id, attachment.uuid.to_string());
    }
}
