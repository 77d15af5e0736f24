//! Directory service
//!
//! Employee use cases: list, get, create, update, manager reassignment,
//! delete and the hierarchy tree. The mutating sequence is always: load
//! target, evaluate permissions, evaluate hierarchy rules, apply only the
//! masked fields, persist, return the refreshed record with manager and
//! subordinate summaries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{password, Actor};
use crate::config::AuthConfig;
use crate::entity::employee::{self, EmployeeSummary, PermissionLevel};
use crate::error::{AppError, AppResult, OptionExt};
use crate::hierarchy::{self, TreeNode};
use crate::permission;
use crate::store::EmployeeStore;

/// Fields for a new employee record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_number: String,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub salary: Decimal,
    pub role: String,
    #[serde(default)]
    pub permission_level: Option<PermissionLevel>,
    #[serde(default)]
    pub manager_id: Option<Uuid>,
}

/// Partial update. Absent fields are left untouched; fields the actor may
/// not edit are silently dropped. `manager_id` distinguishes "not submitted"
/// (outer `None`) from "detach" (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
    pub role: Option<String>,
    pub permission_level: Option<PermissionLevel>,
    pub is_active: Option<bool>,
    pub manager_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    FirstName,
    Surname,
    EmployeeNumber,
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// List parameters: free-text search, role filter and ordering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            role: None,
            sort_by: SortBy::Surname,
            sort_order: SortOrder::Asc,
        }
    }
}

/// Employee record as presented to a caller. Salary is present only when
/// the actor may see it; the credential hash never leaves the store layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub employee_number: String,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub birth_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    pub role: String,
    pub permission_level: PermissionLevel,
    pub manager_id: Option<Uuid>,
    pub is_active: bool,
    pub must_change_password: bool,
    pub manager: Option<EmployeeSummary>,
    pub subordinates: Vec<EmployeeSummary>,
}

impl EmployeeResponse {
    fn build(
        record: &employee::Model,
        actor: &Actor,
        manager: Option<EmployeeSummary>,
        mut subordinates: Vec<EmployeeSummary>,
    ) -> Self {
        subordinates.sort_by(|a, b| {
            (a.surname.as_str(), a.first_name.as_str())
                .cmp(&(b.surname.as_str(), b.first_name.as_str()))
        });
        let salary = if permission::can_see_salary(actor, record) {
            Some(record.salary)
        } else {
            None
        };
        Self {
            id: record.id,
            employee_number: record.employee_number.clone(),
            first_name: record.first_name.clone(),
            surname: record.surname.clone(),
            email: record.email.clone(),
            birth_date: record.birth_date,
            salary,
            role: record.role.clone(),
            permission_level: record.level(),
            manager_id: record.manager_id,
            is_active: record.is_active,
            must_change_password: record.must_change_password,
            manager,
            subordinates,
        }
    }
}

pub struct DirectoryService {
    store: Arc<dyn EmployeeStore>,
    bcrypt_cost: u32,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn EmployeeStore>, auth: &AuthConfig) -> Self {
        Self {
            store,
            bcrypt_cost: auth.bcrypt_cost,
        }
    }

    /// List employees visible to the actor, with optional search and role
    /// filters. Visibility filtering is never skipped, whatever other
    /// filters are present.
    pub async fn list(&self, actor: &Actor, query: &ListQuery) -> AppResult<Vec<EmployeeResponse>> {
        let all = self.store.find_all().await?;

        let mut matched: Vec<employee::Model> = permission::visible_set(actor, &all);

        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let needle = search.trim().to_lowercase();
            matched.retain(|e| {
                e.first_name.to_lowercase().contains(&needle)
                    || e.surname.to_lowercase().contains(&needle)
                    || e.employee_number.to_lowercase().contains(&needle)
                    || e.role.to_lowercase().contains(&needle)
            });
        }

        if let Some(role) = query.role.as_deref().filter(|r| !r.trim().is_empty()) {
            let needle = role.trim().to_lowercase();
            matched.retain(|e| e.role.to_lowercase().contains(&needle));
        }

        matched.sort_by(|a, b| {
            let key = |e: &employee::Model| match query.sort_by {
                SortBy::FirstName => e.first_name.to_lowercase(),
                SortBy::Surname => e.surname.to_lowercase(),
                SortBy::EmployeeNumber => e.employee_number.to_lowercase(),
                SortBy::Role => e.role.to_lowercase(),
            };
            let ordering = key(a).cmp(&key(b));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let by_id: HashMap<Uuid, &employee::Model> = all.iter().map(|e| (e.id, e)).collect();
        let mut children: HashMap<Uuid, Vec<EmployeeSummary>> = HashMap::new();
        for e in &all {
            if let Some(manager_id) = e.manager_id {
                children
                    .entry(manager_id)
                    .or_default()
                    .push(EmployeeSummary::from(e));
            }
        }

        Ok(matched
            .iter()
            .map(|e| {
                let manager = e
                    .manager_id
                    .and_then(|id| by_id.get(&id))
                    .map(|m| EmployeeSummary::from(*m));
                let subordinates = children.get(&e.id).cloned().unwrap_or_default();
                EmployeeResponse::build(e, actor, manager, subordinates)
            })
            .collect())
    }

    /// Fetch a single employee with resolved manager and subordinates.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<EmployeeResponse> {
        let record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_not_found("employee not found")?;

        // A denied actor learns nothing about the record, not even which
        // fields exist.
        if !permission::can_view(actor, &record) {
            return Err(AppError::PermissionDenied(
                "not allowed to view this employee".into(),
            ));
        }

        self.respond(actor, &record).await
    }

    /// Create a new employee. The record receives a derived default
    /// password and must change it on first login.
    pub async fn create(&self, actor: &Actor, fields: NewEmployee) -> AppResult<EmployeeResponse> {
        if !permission::can_create(actor) {
            tracing::warn!(actor = %actor.id, "employee creation denied");
            return Err(AppError::PermissionDenied(
                "only admin or hr may create employees".into(),
            ));
        }

        let employee_number = fields.employee_number.trim().to_string();
        let first_name = fields.first_name.trim().to_string();
        let surname = fields.surname.trim().to_string();
        let email = normalize_email(&fields.email);
        let role = fields.role.trim().to_string();

        validate_employee_number(&employee_number)?;
        validate_name("firstName", &first_name)?;
        validate_name("surname", &surname)?;
        validate_email(&email)?;
        validate_role(&role)?;
        validate_salary(fields.salary)?;

        let level = fields.permission_level.unwrap_or_default();
        if !permission::can_assign_level(actor, level) {
            return Err(AppError::PermissionDenied(
                "hr may not grant the admin level".into(),
            ));
        }

        let id = Uuid::new_v4();
        let all = self.store.find_all().await?;
        let mut links = hierarchy::manager_links(&all);
        links.insert(id, None);
        hierarchy::validate_manager_assignment(id, fields.manager_id, &links)?;

        let default_password = password::default_password(&first_name, &employee_number);
        let now = Utc::now();
        let record = employee::Model {
            id,
            employee_number,
            first_name,
            surname,
            email,
            birth_date: fields.birth_date,
            salary: fields.salary,
            role,
            permission_level: level.as_str().to_string(),
            manager_id: fields.manager_id,
            is_active: true,
            password: password::hash_password(&default_password, self.bcrypt_cost)?,
            must_change_password: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(record).await?;
        tracing::info!(actor = %actor.id, employee = %created.id, "employee created");

        self.respond(actor, &created).await
    }

    /// Update an employee. Disallowed fields are dropped, not rejected;
    /// the single exception is an hr actor granting admin, which is a hard
    /// denial.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        fields: UpdateEmployee,
    ) -> AppResult<EmployeeResponse> {
        let target = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_not_found("employee not found")?;

        if !permission::can_view(actor, &target) {
            return Err(AppError::PermissionDenied(
                "not allowed to view this employee".into(),
            ));
        }

        let mask = permission::field_edit_mask(actor, Some(&target), false);
        let mut record = target.clone();

        if mask.basic_info {
            if let Some(first_name) = fields.first_name {
                let first_name = first_name.trim().to_string();
                validate_name("firstName", &first_name)?;
                record.first_name = first_name;
            }
            if let Some(surname) = fields.surname {
                let surname = surname.trim().to_string();
                validate_name("surname", &surname)?;
                record.surname = surname;
            }
            if let Some(email) = fields.email {
                let email = normalize_email(&email);
                validate_email(&email)?;
                record.email = email;
            }
            if let Some(birth_date) = fields.birth_date {
                record.birth_date = birth_date;
            }
        }

        if mask.role {
            if let Some(role) = fields.role {
                let role = role.trim().to_string();
                validate_role(&role)?;
                record.role = role;
            }
        }

        if mask.salary {
            if let Some(salary) = fields.salary {
                validate_salary(salary)?;
                record.salary = salary;
            }
        }

        if let Some(level) = fields.permission_level {
            if mask.permission_level {
                if !permission::can_assign_level(actor, level) {
                    // Hard rejection, never a silent drop.
                    tracing::warn!(actor = %actor.id, employee = %id, "admin grant denied");
                    return Err(AppError::PermissionDenied(
                        "hr may not grant the admin level".into(),
                    ));
                }
                record.permission_level = level.as_str().to_string();
            }
        }

        if mask.is_active {
            if let Some(is_active) = fields.is_active {
                record.is_active = is_active;
            }
        }

        if mask.manager_id {
            if let Some(manager_id) = fields.manager_id {
                let all = self.store.find_all().await?;
                let links = hierarchy::manager_links(&all);
                hierarchy::validate_manager_assignment(id, manager_id, &links)?;
                record.manager_id = manager_id;
            }
        }

        record.updated_at = Utc::now();
        let updated = self.store.update(record).await?;
        tracing::info!(actor = %actor.id, employee = %updated.id, "employee updated");

        self.respond(actor, &updated).await
    }

    /// Dedicated manager reassignment, mirroring the drag-and-drop rules:
    /// the actor must be allowed to pick the employee up, and must be of
    /// manager level or above to hand them to a new node.
    pub async fn reassign_manager(
        &self,
        actor: &Actor,
        id: Uuid,
        new_manager_id: Option<Uuid>,
    ) -> AppResult<EmployeeResponse> {
        let target = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_not_found("employee not found")?;

        if !permission::can_view(actor, &target) {
            return Err(AppError::PermissionDenied(
                "not allowed to view this employee".into(),
            ));
        }

        if !permission::can_initiate_reassign(actor, &target) {
            return Err(AppError::PermissionDenied(
                "only the current manager, hr or admin may reassign this employee".into(),
            ));
        }

        if new_manager_id.is_some() && !permission::can_receive_reassign(actor) {
            return Err(AppError::PermissionDenied(
                "only manager-level actors may assign reports".into(),
            ));
        }

        let all = self.store.find_all().await?;
        let links = hierarchy::manager_links(&all);
        hierarchy::validate_manager_assignment(id, new_manager_id, &links)?;

        let mut record = target;
        record.manager_id = new_manager_id;
        record.updated_at = Utc::now();

        let updated = self.store.update(record).await?;
        tracing::info!(
            actor = %actor.id,
            employee = %updated.id,
            manager = ?updated.manager_id,
            "manager reassigned"
        );

        self.respond(actor, &updated).await
    }

    /// Delete an employee. Rejected while subordinates still report to the
    /// record.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let target = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_not_found("employee not found")?;

        if !permission::can_view(actor, &target) {
            return Err(AppError::PermissionDenied(
                "not allowed to view this employee".into(),
            ));
        }

        if !permission::can_delete(actor, &target) {
            tracing::warn!(actor = %actor.id, employee = %id, "employee deletion denied");
            return Err(AppError::PermissionDenied(
                "not allowed to delete this employee".into(),
            ));
        }

        let all = self.store.find_all().await?;
        hierarchy::validate_deletion(id, &hierarchy::manager_links(&all))?;

        self.store.delete(id).await?;
        tracing::info!(actor = %actor.id, employee = %id, "employee deleted");
        Ok(())
    }

    /// Reporting forest over the full directory.
    pub async fn hierarchy_tree(&self, actor: &Actor) -> AppResult<Vec<TreeNode>> {
        tracing::debug!(actor = %actor.id, "building hierarchy tree");
        let all = self.store.find_all().await?;
        hierarchy::build_tree(&all)
    }

    async fn respond(&self, actor: &Actor, record: &employee::Model) -> AppResult<EmployeeResponse> {
        let manager = match record.manager_id {
            Some(manager_id) => self
                .store
                .find_by_id(manager_id)
                .await?
                .map(|m| EmployeeSummary::from(&m)),
            None => None,
        };
        let subordinates = self
            .store
            .find_by_manager_id(record.id)
            .await?
            .iter()
            .map(EmployeeSummary::from)
            .collect();
        Ok(EmployeeResponse::build(record, actor, manager, subordinates))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_employee_number(number: &str) -> AppResult<()> {
    if number.len() < 3 || number.len() > 20 {
        return Err(AppError::Validation(
            "employeeNumber: must be 3 to 20 characters".into(),
        ));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field}: must not be empty")));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("email: invalid email address".into()));
    }
    Ok(())
}

fn validate_role(role: &str) -> AppResult<()> {
    if role.is_empty() || role.len() > 100 {
        return Err(AppError::Validation(
            "role: must be 1 to 100 characters".into(),
        ));
    }
    Ok(())
}

fn validate_salary(salary: Decimal) -> AppResult<()> {
    if salary < Decimal::ZERO {
        return Err(AppError::Validation("salary: must not be negative".into()));
    }
    Ok(())
}
