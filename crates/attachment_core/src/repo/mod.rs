//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the attachment fetch/join contracts used by containers.
//! - Isolate SQLite query details from container orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Attachment::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod attachment_repo;
