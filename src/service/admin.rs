//! Admin operations
//!
//! Statistics, export rows and bulk permission-level updates. All of these
//! are admin-gated and computed from the full unfiltered record set; a
//! role-filtered view would silently under-count.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Actor;
use crate::entity::employee::{EmployeeSummary, PermissionLevel};
use crate::error::{AppError, AppResult, OptionExt};
use crate::permission;
use crate::store::EmployeeStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub permission_level: PermissionLevel,
    pub count: u64,
}

/// Organization-wide statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgStats {
    pub permission_breakdown: Vec<LevelCount>,
    pub active_employees: u64,
    pub inactive_employees: u64,
    pub total_employees: u64,
    pub recent_employees: Vec<EmployeeSummary>,
}

/// Flat export row; serializing these to CSV or JSON is the caller's
/// concern.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub employee_number: String,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub role: String,
    pub permission_level: PermissionLevel,
    pub manager: Option<String>,
}

pub struct AdminService {
    store: Arc<dyn EmployeeStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    fn require_admin(actor: &Actor) -> AppResult<()> {
        if !actor.is_admin() {
            tracing::warn!(actor = %actor.id, "admin operation denied");
            return Err(AppError::PermissionDenied("admin access required".into()));
        }
        Ok(())
    }

    /// Counts by permission level plus active/inactive totals and the five
    /// most recently created employees.
    pub async fn stats(&self, actor: &Actor) -> AppResult<OrgStats> {
        Self::require_admin(actor)?;

        let all = self.store.find_all().await?;

        let mut by_level: HashMap<PermissionLevel, u64> = HashMap::new();
        for e in &all {
            *by_level.entry(e.level()).or_default() += 1;
        }
        let permission_breakdown = [
            PermissionLevel::Employee,
            PermissionLevel::Manager,
            PermissionLevel::Hr,
            PermissionLevel::Admin,
        ]
        .into_iter()
        .map(|level| LevelCount {
            permission_level: level,
            count: by_level.get(&level).copied().unwrap_or(0),
        })
        .collect();

        let active = all.iter().filter(|e| e.is_active).count() as u64;

        let mut recent: Vec<_> = all.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_employees = recent.iter().take(5).map(|e| EmployeeSummary::from(*e)).collect();

        Ok(OrgStats {
            permission_breakdown,
            active_employees: active,
            inactive_employees: all.len() as u64 - active,
            total_employees: all.len() as u64,
            recent_employees,
        })
    }

    /// Full-directory export rows with the manager resolved to a display
    /// name.
    pub async fn export(&self, actor: &Actor) -> AppResult<Vec<ExportRow>> {
        Self::require_admin(actor)?;

        let all = self.store.find_all().await?;
        let names: HashMap<Uuid, String> =
            all.iter().map(|e| (e.id, e.display_name())).collect();

        let mut rows: Vec<ExportRow> = all
            .iter()
            .map(|e| ExportRow {
                employee_number: e.employee_number.clone(),
                first_name: e.first_name.clone(),
                surname: e.surname.clone(),
                email: e.email.clone(),
                role: e.role.clone(),
                permission_level: e.level(),
                manager: e.manager_id.and_then(|id| names.get(&id).cloned()),
            })
            .collect();
        rows.sort_by(|a, b| a.employee_number.cmp(&b.employee_number));

        tracing::info!(actor = %actor.id, rows = rows.len(), "directory exported");
        Ok(rows)
    }

    /// Apply a batch of permission-level changes. Returns how many records
    /// were updated; a missing id fails the whole batch before any write
    /// beyond the ones already applied.
    pub async fn bulk_update_permission_levels(
        &self,
        actor: &Actor,
        updates: &[(Uuid, PermissionLevel)],
    ) -> AppResult<usize> {
        Self::require_admin(actor)?;

        let mut applied = 0usize;
        for (id, level) in updates {
            // Admin passes this trivially; the guard stays on the shared
            // code path with single updates.
            if !permission::can_assign_level(actor, *level) {
                return Err(AppError::PermissionDenied(
                    "not allowed to assign this level".into(),
                ));
            }

            let mut record = self
                .store
                .find_by_id(*id)
                .await?
                .ok_or_not_found("employee not found")?;
            record.permission_level = level.as_str().to_string();
            record.updated_at = Utc::now();
            self.store.update(record).await?;
            applied += 1;
        }

        tracing::info!(actor = %actor.id, applied, "bulk permission update");
        Ok(applied)
    }
}
