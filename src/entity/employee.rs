//! Employee entity
//!
//! Table: employee
//!
//! The `manager_id` column is a self-reference; subordinates are always
//! derived from it on demand and never stored redundantly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission level of an employee account.
///
/// Fixed set: `employee < manager < hr < admin`. Admin is a superset of the
/// others; hr and manager hold incomparable powers in places, so this is not
/// modelled as an `Ord` type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Employee,
    Manager,
    Hr,
    Admin,
}

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Employee => "employee",
            PermissionLevel::Manager => "manager",
            PermissionLevel::Hr => "hr",
            PermissionLevel::Admin => "admin",
        }
    }

    /// Parse a stored level string. Unknown values fall back to the least
    /// privileged level rather than erroring.
    pub fn parse(value: &str) -> Self {
        match value {
            "manager" => PermissionLevel::Manager,
            "hr" => PermissionLevel::Hr,
            "admin" => PermissionLevel::Admin,
            _ => PermissionLevel::Employee,
        }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for PermissionLevel {
    fn default() -> Self {
        PermissionLevel::Employee
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Employee number (unique, assigned at creation)
    #[sea_orm(column_type = "String(Some(20))", unique)]
    pub employee_number: String,

    #[sea_orm(column_type = "String(Some(64))")]
    pub first_name: String,

    #[sea_orm(column_type = "String(Some(64))")]
    pub surname: String,

    /// Email (unique, stored lowercased)
    #[sea_orm(column_type = "String(Some(128))", unique)]
    pub email: String,

    pub birth_date: Date,

    /// Monthly salary, non-negative
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub salary: Decimal,

    /// Job title (free text, not an enum)
    #[sea_orm(column_type = "String(Some(100))")]
    pub role: String,

    /// Permission level: employee, manager, hr or admin
    #[sea_orm(column_type = "String(Some(16))")]
    pub permission_level: String,

    /// Self-referencing manager link; the reporting graph must stay a forest
    #[sea_orm(nullable)]
    pub manager_id: Option<Uuid>,

    pub is_active: bool,

    /// Password (bcrypt hash)
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub password: String,

    /// Set on creation and on admin reset; cleared by a successful change
    pub must_change_password: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// The manager self-reference is handled through explicit queries rather than
// a SeaORM relation, matching how subordinates are derived.

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Typed view of the stored permission level string.
    pub fn level(&self) -> PermissionLevel {
        PermissionLevel::parse(&self.permission_level)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }
}

/// Compact employee reference used for manager/subordinate summaries and
/// hierarchy tree nodes. Never carries salary or credential data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: Uuid,
    pub first_name: String,
    pub surname: String,
    pub role: String,
}

impl From<&Model> for EmployeeSummary {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name.clone(),
            surname: model.surname.clone(),
            role: model.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_level_roundtrip() {
        for level in [
            PermissionLevel::Employee,
            PermissionLevel::Manager,
            PermissionLevel::Hr,
            PermissionLevel::Admin,
        ] {
            assert_eq!(PermissionLevel::parse(level.as_str()), level);
        }
    }

    #[test]
    fn test_unknown_level_falls_back_to_employee() {
        assert_eq!(PermissionLevel::parse("superuser"), PermissionLevel::Employee);
        assert_eq!(PermissionLevel::parse(""), PermissionLevel::Employee);
    }
}
