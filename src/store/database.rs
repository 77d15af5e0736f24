//! SeaORM store adapter
//!
//! Mutations run inside a serializable transaction: uniqueness and the
//! forest invariant are re-validated against the transactional read before
//! the write, and the isolation level guarantees the ancestor walk and the
//! write commit as one unit. Concurrent writers that race past the checks
//! surface as a `Conflict` at commit time, either from the unique indexes
//! or from a serialization failure, never as silent write skew.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::employee;
use crate::error::{AppError, AppResult, ConflictKind};
use crate::hierarchy;
use crate::store::EmployeeStore;

pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All fields set explicitly; the update path writes the whole row.
    fn active_model(record: &employee::Model) -> employee::ActiveModel {
        employee::ActiveModel {
            id: Set(record.id),
            employee_number: Set(record.employee_number.clone()),
            first_name: Set(record.first_name.clone()),
            surname: Set(record.surname.clone()),
            email: Set(record.email.clone()),
            birth_date: Set(record.birth_date),
            salary: Set(record.salary),
            role: Set(record.role.clone()),
            permission_level: Set(record.permission_level.clone()),
            manager_id: Set(record.manager_id),
            is_active: Set(record.is_active),
            password: Set(record.password.clone()),
            must_change_password: Set(record.must_change_password),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
    }

    async fn check_unique<C: ConnectionTrait>(
        conn: &C,
        record: &employee::Model,
    ) -> AppResult<()> {
        let number_taken = employee::Entity::find()
            .filter(employee::Column::EmployeeNumber.eq(&record.employee_number))
            .filter(employee::Column::Id.ne(record.id))
            .one(conn)
            .await?;
        if number_taken.is_some() {
            return Err(AppError::Conflict(ConflictKind::DuplicateEmployeeNumber));
        }

        let email_taken = employee::Entity::find()
            .filter(employee::Column::Email.eq(&record.email))
            .filter(employee::Column::Id.ne(record.id))
            .one(conn)
            .await?;
        if email_taken.is_some() {
            return Err(AppError::Conflict(ConflictKind::DuplicateEmail));
        }

        Ok(())
    }

    async fn manager_links<C: ConnectionTrait>(conn: &C) -> AppResult<hierarchy::ManagerLinks> {
        let all = employee::Entity::find().all(conn).await?;
        Ok(hierarchy::manager_links(&all))
    }

    /// Serializable isolation: two reassignments that each pass the ancestor
    /// walk against the pre-state but jointly close a cycle cannot both
    /// commit; the loser fails with a serialization error and is reported as
    /// a retryable `Conflict`.
    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        Ok(self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?)
    }

    /// Classify a commit-time failure: unique-index violations become the
    /// matching `Conflict` kind, serialization failures and deadlocks become
    /// a retryable `Conflict`, everything else stays a database error.
    fn map_write_err(err: DbErr) -> AppError {
        let msg = err.to_string().to_lowercase();
        if msg.contains("could not serialize") || msg.contains("deadlock") {
            return AppError::Conflict(ConflictKind::ConcurrentUpdate);
        }
        if msg.contains("duplicate") || msg.contains("unique") {
            if msg.contains("employee_number") {
                return AppError::Conflict(ConflictKind::DuplicateEmployeeNumber);
            }
            return AppError::Conflict(ConflictKind::DuplicateEmail);
        }
        if matches!(err, DbErr::RecordNotFound(_)) {
            return AppError::NotFound("employee not found".into());
        }
        AppError::Database(err)
    }
}

#[async_trait]
impl EmployeeStore for DbStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<employee::Model>> {
        Ok(employee::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<employee::Model>> {
        Ok(employee::Entity::find()
            .filter(employee::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_by_employee_number(
        &self,
        number: &str,
    ) -> AppResult<Option<employee::Model>> {
        Ok(employee::Entity::find()
            .filter(employee::Column::EmployeeNumber.eq(number))
            .one(&self.db)
            .await?)
    }

    async fn find_all(&self) -> AppResult<Vec<employee::Model>> {
        Ok(employee::Entity::find().all(&self.db).await?)
    }

    async fn find_by_manager_id(&self, manager_id: Uuid) -> AppResult<Vec<employee::Model>> {
        Ok(employee::Entity::find()
            .filter(employee::Column::ManagerId.eq(manager_id))
            .all(&self.db)
            .await?)
    }

    async fn insert(&self, record: employee::Model) -> AppResult<employee::Model> {
        let txn = self.begin().await?;

        Self::check_unique(&txn, &record).await?;

        let mut links = Self::manager_links(&txn).await?;
        links.insert(record.id, None);
        hierarchy::validate_manager_assignment(record.id, record.manager_id, &links)?;

        let inserted = Self::active_model(&record)
            .insert(&txn)
            .await
            .map_err(Self::map_write_err)?;
        txn.commit().await.map_err(Self::map_write_err)?;

        Ok(inserted)
    }

    async fn update(&self, record: employee::Model) -> AppResult<employee::Model> {
        let txn = self.begin().await?;

        if employee::Entity::find_by_id(record.id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound("employee not found".into()));
        }

        Self::check_unique(&txn, &record).await?;

        let links = Self::manager_links(&txn).await?;
        hierarchy::validate_manager_assignment(record.id, record.manager_id, &links)?;

        let updated = Self::active_model(&record)
            .update(&txn)
            .await
            .map_err(Self::map_write_err)?;
        txn.commit().await.map_err(Self::map_write_err)?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = self.begin().await?;

        if employee::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound("employee not found".into()));
        }

        let links = Self::manager_links(&txn).await?;
        hierarchy::validate_deletion(id, &links)?;

        employee::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(Self::map_write_err)?;
        txn.commit().await.map_err(Self::map_write_err)?;

        Ok(())
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(employee::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(employee::Entity::find().count(&self.db).await?)
    }
}
