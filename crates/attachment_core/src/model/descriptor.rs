//! Attachment type descriptor.
//!
//! A descriptor tells the UI how one object type should be labeled and grouped
//! when offered as an attachment option. Unknown keys are kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display/configuration metadata for one attachable object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    /// User-facing label, e.g. `Image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Icon identifier used by admin widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Grouping key for attachment pickers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// `Some(false)` removes the type from the attachable set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Any other configured keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttachmentDescriptor {
    /// Returns the empty descriptor used for unknown object types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a descriptor with only a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.icon.is_none()
            && self.group.is_none()
            && self.active.is_none()
            && self.extra.is_empty()
    }

    /// Returns whether the type may be attached. Missing flag means active.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}
