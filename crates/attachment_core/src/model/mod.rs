//! Attachment domain model.
//!
//! # Responsibility
//! - Define the canonical attachment record and its display descriptor.
//! - Identify parent records that attachments are joined to.
//!
//! # Invariants
//! - Every attachment is identified by a stable `AttachmentId`.
//! - The `attachment_type` annotation is transient and never persisted.

pub mod attachment;
pub mod descriptor;
