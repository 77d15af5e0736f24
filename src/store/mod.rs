//! Directory store
//!
//! The core consumes persistence only through [`EmployeeStore`]. Adapters
//! own the atomic write boundary: uniqueness of employee number and email,
//! and the forest invariant on any write that sets `manager_id`, are
//! re-checked inside the adapter's lock or transaction, so concurrent
//! writers racing past the service pre-checks still get exactly one success
//! and a `Conflict` for the rest.

pub mod database;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::employee;
use crate::error::AppResult;

pub use database::DbStore;
pub use memory::MemoryStore;

/// Repository interface over the employee table.
///
/// `insert` and `update` reject uniqueness and hierarchy violations with
/// `AppError::Conflict`; `update` and `delete` return `AppError::NotFound`
/// for a missing id; `delete` rejects when subordinates still point at the
/// record.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<employee::Model>>;

    /// Lookup by lowercased email (login path).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<employee::Model>>;

    async fn find_by_employee_number(&self, number: &str)
        -> AppResult<Option<employee::Model>>;

    async fn find_all(&self) -> AppResult<Vec<employee::Model>>;

    async fn find_by_manager_id(&self, manager_id: Uuid) -> AppResult<Vec<employee::Model>>;

    async fn insert(&self, record: employee::Model) -> AppResult<employee::Model>;

    async fn update(&self, record: employee::Model) -> AppResult<employee::Model>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn exists(&self, id: Uuid) -> AppResult<bool>;

    async fn count(&self) -> AppResult<u64>;
}
