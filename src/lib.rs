//! Staffdir - employee directory and reporting-hierarchy core
//!
//! This crate provides the permission and hierarchy-integrity engine behind
//! an organization's employee directory: role-based visibility and editing
//! rights, forest-shaped manager links enforced on every write, and the
//! session/password lifecycle around them. Transport and UI layers are the
//! caller's concern; operations are driven directly through
//! [`service::DirectoryService`], [`service::AuthService`] and
//! [`service::AdminService`], each taking the authenticated actor as an
//! explicit argument.

pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod permission;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use auth::Actor;
pub use config::Config;
pub use entity::employee::PermissionLevel;
pub use error::{AppError, AppResult, ConflictKind};
pub use service::{AdminService, AuthService, DirectoryService};
pub use store::{DbStore, EmployeeStore, MemoryStore};
