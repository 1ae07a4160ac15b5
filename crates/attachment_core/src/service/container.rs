//! Attachment container use-cases.
//!
//! # Responsibility
//! - Fetch a container's child attachments through the repository and
//!   annotate each with its attachable-type descriptor.
//! - Manage the container's joins (add, remove, count).
//!
//! # Invariants
//! - Every fetched attachment carries `Some` descriptor; unknown or inactive
//!   object types get the empty descriptor.
//! - Annotation reads the container's configuration at call time and is
//!   recomputed on every fetch.
//! - Fetch order is the repository's order.

use crate::config::{AppConfig, AttachmentsConfig, ConfigError};
use crate::model::attachment::{Attachment, AttachmentId, SourceRef};
use crate::model::descriptor::AttachmentDescriptor;
use crate::registry::provider::keys::{ATTACHMENTS_CONFIG, CONFIG};
use crate::registry::{RegistryError, ServiceRegistry};
use crate::repo::attachment_repo::{AttachmentQuery, AttachmentRepository, RepoError};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ContainerResult<T> = Result<T, ContainerError>;

/// Service error for container use-cases.
#[derive(Debug)]
pub enum ContainerError {
    /// Joined attachment does not exist.
    AttachmentNotFound(AttachmentId),
    /// A container cannot hold itself.
    SelfAttachment(AttachmentId),
    Repo(RepoError),
    Registry(RegistryError),
    Config(ConfigError),
}

impl Display for ContainerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AttachmentNotFound(id) => write!(f, "attachment not found: {id}"),
            Self::SelfAttachment(id) => write!(f, "container {id} cannot attach itself"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContainerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContainerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::AttachmentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<RegistryError> for ContainerError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<ConfigError> for ContainerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// An attachment that holds further attachments.
///
/// Wraps the base record together with the repository used as the base
/// fetch and the attachable objects configuration.
pub struct AttachmentContainer<R: AttachmentRepository> {
    attachment: Attachment,
    repo: R,
    config: AttachmentsConfig,
}

impl<R: AttachmentRepository> AttachmentContainer<R> {
    pub fn new(attachment: Attachment, repo: R, config: AttachmentsConfig) -> Self {
        Self {
            attachment,
            repo,
            config,
        }
    }

    /// Builds a container configured from the registry.
    ///
    /// Looks at `attachments/config` first, then the `attachments` section of
    /// `config`, and falls back to an empty configuration. `config` is only
    /// resolved when no override is bound.
    pub fn from_registry(
        attachment: Attachment,
        repo: R,
        registry: &ServiceRegistry,
    ) -> ContainerResult<Self> {
        let config = match registry.resolve_optional::<AttachmentsConfig>(ATTACHMENTS_CONFIG)? {
            Some(local) => AttachmentsConfig::clone(&local),
            None => {
                let app = registry.resolve_optional::<AppConfig>(CONFIG)?;
                AttachmentsConfig::resolve([app.as_deref().and_then(AppConfig::attachments)])?
            }
        };

        Ok(Self::new(attachment, repo, config))
    }

    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    pub fn config(&self) -> &AttachmentsConfig {
        &self.config
    }

    /// Replaces the local configuration. Later fetches use it.
    pub fn set_config(&mut self, config: AttachmentsConfig) {
        self.config = config;
    }

    pub fn is_attachment_container(&self) -> bool {
        true
    }

    /// Active attachable object types and their descriptors.
    pub fn attachable_objects(&self) -> BTreeMap<String, AttachmentDescriptor> {
        self.config.attachable_objects()
    }

    /// Fetches child attachments, annotated with their type descriptor.
    pub fn attachments(&self, query: &AttachmentQuery) -> ContainerResult<Vec<Attachment>> {
        let attachable = self.attachable_objects();
        let mut attachments = self.repo.list_attachments(&self.source(), query)?;

        for attachment in &mut attachments {
            let descriptor = match attachable.get(&attachment.obj_type) {
                Some(descriptor) => descriptor.clone(),
                None => {
                    debug!(
                        "event=attachment_annotate module=container status=unknown_type obj_type={}",
                        attachment.obj_type
                    );
                    AttachmentDescriptor::empty()
                }
            };
            attachment.attachment_type = Some(descriptor);
        }

        debug!(
            "event=attachments_fetch module=container status=ok container={} count={}",
            self.attachment.uuid,
            attachments.len()
        );
        Ok(attachments)
    }

    pub fn has_attachments(&self, query: &AttachmentQuery) -> ContainerResult<bool> {
        Ok(self.num_attachments(query)? > 0)
    }

    pub fn num_attachments(&self, query: &AttachmentQuery) -> ContainerResult<u64> {
        Ok(self.repo.count_attachments(&self.source(), query)?)
    }

    /// Joins a stored attachment to this container. Returns its position.
    ///
    /// `group = None` uses the configured default group.
    pub fn add_attachment(
        &self,
        id: AttachmentId,
        group: Option<&str>,
        position: Option<i64>,
    ) -> ContainerResult<i64> {
        if id == self.attachment.uuid {
            return Err(ContainerError::SelfAttachment(id));
        }
        let group = group.unwrap_or_else(|| self.config.default_group());
        let position = self.repo.attach(&self.source(), id, group, position)?;
        debug!(
            "event=attachment_add module=container status=ok container={} attachment={id} group={group} position={position}",
            self.attachment.uuid
        );
        Ok(position)
    }

    /// Removes one attachment from this container. Returns removed joins.
    pub fn remove_attachment(&self, id: AttachmentId, group: Option<&str>) -> ContainerResult<usize> {
        Ok(self.repo.detach(&self.source(), id, group)?)
    }

    /// Removes every attachment, optionally only from one group.
    pub fn remove_attachments(&self, group: Option<&str>) -> ContainerResult<usize> {
        let removed = self.repo.detach_all(&self.source(), group)?;
        debug!(
            "event=attachments_remove module=container status=ok container={} removed={removed}",
            self.attachment.uuid
        );
        Ok(removed)
    }

    fn source(&self) -> SourceRef {
        self.attachment.as_source()
    }
}
