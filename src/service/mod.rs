//! Service layer
//!
//! Orchestrates the store, permission engine and hierarchy validator for
//! each use case. Every operation takes the authenticated actor as an
//! explicit argument; rule checks run before any write, so rejections never
//! leave partial state behind.

pub mod admin;
pub mod auth;
pub mod directory;

pub use admin::{AdminService, ExportRow, LevelCount, OrgStats};
pub use auth::{AuthService, LoginSuccess};
pub use directory::{
    DirectoryService, EmployeeResponse, ListQuery, NewEmployee, SortBy, SortOrder,
    UpdateEmployee,
};
