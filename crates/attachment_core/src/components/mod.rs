//! Stand-in services constructed by `ServiceProvider` bindings.
//!
//! # Responsibility
//! - Give every registry key a concrete, deterministic value to build.
//! - Keep each collaborator small: enough behavior for fixtures to exercise
//!   the wiring, not a full framework implementation.
//!
//! # Invariants
//! - Components are single-threaded and shared through `Rc`.
//! - Components never touch global state except through the `log` facade.

pub mod acl;
pub mod auth;
pub mod cache;
pub mod console;
pub mod email;
pub mod factory;
pub mod locale;
pub mod logger;
pub mod metadata;
pub mod model;
pub mod ui;
pub mod url;
pub mod view;
