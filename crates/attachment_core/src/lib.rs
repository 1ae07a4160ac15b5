//! Attachment containers and the service registry that wires their
//! collaborators.
//!
//! This crate is the single source of truth for attachment invariants and
//! registry resolution rules.

pub mod components;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use config::{resolve_first, AppConfig, AttachmentsConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attachment::{Attachment, AttachmentId, SourceRef, CONTAINER_OBJ_TYPE};
pub use model::descriptor::AttachmentDescriptor;
pub use registry::{RegistryError, RegistryResult, ServiceProvider, ServiceRegistry};
pub use repo::attachment_repo::{
    AttachmentQuery, AttachmentRepository, RepoError, RepoResult, SqliteAttachmentRepository,
};
pub use service::container::{AttachmentContainer, ContainerError, ContainerResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
