//! In-memory store adapter
//!
//! Backs the test suite and embedded use. A single write lock around the
//! record map is the transaction boundary: every invariant check runs under
//! the same guard as the write it protects.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entity::employee;
use crate::error::{AppError, AppResult, ConflictKind};
use crate::hierarchy;
use crate::store::EmployeeStore;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, employee::Model>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniqueness scan, excluding the record itself on update.
    fn check_unique(
        records: &HashMap<Uuid, employee::Model>,
        candidate: &employee::Model,
    ) -> AppResult<()> {
        for existing in records.values() {
            if existing.id == candidate.id {
                continue;
            }
            if existing.employee_number == candidate.employee_number {
                return Err(AppError::Conflict(ConflictKind::DuplicateEmployeeNumber));
            }
            if existing.email == candidate.email {
                return Err(AppError::Conflict(ConflictKind::DuplicateEmail));
            }
        }
        Ok(())
    }

    fn links_of(records: &HashMap<Uuid, employee::Model>) -> hierarchy::ManagerLinks {
        records.iter().map(|(id, e)| (*id, e.manager_id)).collect()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<employee::Model>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<employee::Model>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn find_by_employee_number(
        &self,
        number: &str,
    ) -> AppResult<Option<employee::Model>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|e| e.employee_number == number)
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<employee::Model>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_manager_id(&self, manager_id: Uuid) -> AppResult<Vec<employee::Model>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|e| e.manager_id == Some(manager_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: employee::Model) -> AppResult<employee::Model> {
        let mut records = self.records.write().await;

        Self::check_unique(&records, &record)?;

        // Hierarchy re-check inside the write guard; the new node takes part
        // in the link snapshot so a dangling manager is caught here too.
        let mut links = Self::links_of(&records);
        links.insert(record.id, None);
        hierarchy::validate_manager_assignment(record.id, record.manager_id, &links)?;

        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: employee::Model) -> AppResult<employee::Model> {
        let mut records = self.records.write().await;

        if !records.contains_key(&record.id) {
            return Err(AppError::NotFound("employee not found".into()));
        }

        Self::check_unique(&records, &record)?;

        let links = Self::links_of(&records);
        hierarchy::validate_manager_assignment(record.id, record.manager_id, &links)?;

        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut records = self.records.write().await;

        if !records.contains_key(&id) {
            return Err(AppError::NotFound("employee not found".into()));
        }

        let links = Self::links_of(&records);
        hierarchy::validate_deletion(id, &links)?;

        records.remove(&id);
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.records.read().await.contains_key(&id))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn record(number: &str, email: &str, manager_id: Option<Uuid>) -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            employee_number: number.into(),
            first_name: "Test".into(),
            surname: "Person".into(),
            email: email.into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            salary: Decimal::new(40_000, 0),
            role: "Engineer".into(),
            permission_level: "employee".into(),
            manager_id,
            is_active: true,
            password: String::new(),
            must_change_password: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryStore::new();
        let rec = record("EMP001", "a@example.com", None);

        store.insert(rec.clone()).await.unwrap();
        assert!(store.exists(rec.id).await.unwrap());
        assert_eq!(
            store.find_by_email("a@example.com").await.unwrap().unwrap().id,
            rec.id
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let store = MemoryStore::new();
        store
            .insert(record("EMP001", "a@example.com", None))
            .await
            .unwrap();

        let result = store.insert(record("EMP001", "b@example.com", None)).await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(ConflictKind::DuplicateEmployeeNumber))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store
            .insert(record("EMP001", "a@example.com", None))
            .await
            .unwrap();

        let result = store.insert(record("EMP002", "a@example.com", None)).await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(ConflictKind::DuplicateEmail))
        ));
    }

    #[tokio::test]
    async fn test_update_guards_cycle() {
        let store = MemoryStore::new();
        let boss = record("EMP001", "boss@example.com", None);
        let report = record("EMP002", "report@example.com", Some(boss.id));
        store.insert(boss.clone()).await.unwrap();
        store.insert(report.clone()).await.unwrap();

        let mut flipped = boss.clone();
        flipped.manager_id = Some(report.id);
        let result = store.update(flipped).await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(ConflictKind::CycleDetected))
        ));
    }

    #[tokio::test]
    async fn test_delete_guards_subordinates() {
        let store = MemoryStore::new();
        let boss = record("EMP001", "boss@example.com", None);
        let report = record("EMP002", "report@example.com", Some(boss.id));
        store.insert(boss.clone()).await.unwrap();
        store.insert(report.clone()).await.unwrap();

        assert!(matches!(
            store.delete(boss.id).await,
            Err(AppError::Conflict(ConflictKind::HasSubordinates))
        ));

        store.delete(report.id).await.unwrap();
        store.delete(boss.id).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_dangling_manager() {
        let store = MemoryStore::new();
        let result = store
            .insert(record("EMP001", "a@example.com", Some(Uuid::new_v4())))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(ConflictKind::ManagerNotFound))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_insert_one_wins() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let a = record("EMP001", "a@example.com", None);
        let mut b = record("EMP001", "b@example.com", None);
        b.id = Uuid::new_v4();

        let (ra, rb) = tokio::join!(
            {
                let store = store.clone();
                async move { store.insert(a).await }
            },
            {
                let store = store.clone();
                async move { store.insert(b).await }
            }
        );

        let successes = [ra.is_ok(), rb.is_ok()].iter().filter(|s| **s).count();
        assert_eq!(successes, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
