//! Authentication primitives
//!
//! Password hashing and session tokens are delegated to bcrypt and
//! jsonwebtoken; this module wraps them and defines the actor snapshot that
//! every directory operation takes as an explicit argument. There is no
//! ambient "current user" state anywhere in the crate.

pub mod password;
pub mod token;

use uuid::Uuid;

use crate::entity::employee::{self, PermissionLevel};

/// Authenticated actor snapshot, derived from a verified token.
///
/// Carries just enough identity to evaluate `self` and `direct-manager-of`
/// relationships; it is not persisted beyond the token's validity window.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: Uuid,
    pub level: PermissionLevel,
    pub manager_id: Option<Uuid>,
    pub employee_number: String,
    pub display_name: String,
}

impl Actor {
    pub fn from_record(record: &employee::Model) -> Self {
        Self {
            id: record.id,
            level: record.level(),
            manager_id: record.manager_id,
            employee_number: record.employee_number.clone(),
            display_name: record.display_name(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.level == PermissionLevel::Admin
    }

    /// Admin or hr: the two levels with directory-wide visibility.
    pub fn is_privileged(&self) -> bool {
        matches!(self.level, PermissionLevel::Admin | PermissionLevel::Hr)
    }
}
