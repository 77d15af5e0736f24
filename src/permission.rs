//! Permission engine
//!
//! Pure functions mapping (actor snapshot, target record) to visibility and
//! edit rights. Roles are a fixed set carried on the employee record itself;
//! nothing here touches a store or performs I/O, so every rule is unit
//! testable in isolation.
//!
//! Visibility rules:
//! - admin and hr see everyone;
//! - a manager sees their direct reports, themself, and anyone at
//!   manager/hr/admin level (peer and above structure);
//! - an employee sees themself, their own manager, and peers sharing the
//!   same manager.

use crate::auth::Actor;
use crate::entity::employee::{Model, PermissionLevel};

/// Which field groups an actor may write on a given target.
///
/// A `false` entry means a submitted value for that group is silently
/// dropped, not rejected; the only hard per-field rejection is
/// [`can_assign_level`] refusing an hr grant of admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldMask {
    /// First name, surname, email, birth date
    pub basic_info: bool,
    /// Employee number; assignable on create only
    pub employee_number: bool,
    /// Job title
    pub role: bool,
    pub salary: bool,
    pub permission_level: bool,
    pub is_active: bool,
    pub manager_id: bool,
}

/// Can the actor see the target record at all?
pub fn can_view(actor: &Actor, target: &Model) -> bool {
    match actor.level {
        PermissionLevel::Admin | PermissionLevel::Hr => true,
        PermissionLevel::Manager => {
            target.manager_id == Some(actor.id)
                || target.id == actor.id
                || matches!(
                    target.level(),
                    PermissionLevel::Admin | PermissionLevel::Hr | PermissionLevel::Manager
                )
        }
        PermissionLevel::Employee => {
            target.id == actor.id
                || Some(target.id) == actor.manager_id
                || (target.manager_id == actor.manager_id && target.id != actor.id)
        }
    }
}

/// Role-filtered view of the directory.
///
/// Admin and hr receive the full set unfiltered. Organization-wide
/// statistics must only ever be computed from that unfiltered set; filtering
/// first and aggregating after silently under-counts.
pub fn visible_set(actor: &Actor, employees: &[Model]) -> Vec<Model> {
    if actor.is_privileged() {
        return employees.to_vec();
    }
    employees
        .iter()
        .filter(|e| can_view(actor, e))
        .cloned()
        .collect()
}

/// Salary is visible to admin, hr, and the employee themself.
pub fn can_see_salary(actor: &Actor, target: &Model) -> bool {
    actor.is_privileged() || target.id == actor.id
}

/// Only admin and hr may create employee records.
pub fn can_create(actor: &Actor) -> bool {
    actor.is_privileged()
}

/// Compute the editable field groups for an actor against a target.
///
/// `target` is `None` on create, in which case the creator (already gated by
/// [`can_create`]) gets the full create-time mask.
pub fn field_edit_mask(actor: &Actor, target: Option<&Model>, is_create: bool) -> FieldMask {
    let privileged = actor.is_privileged();

    let (is_self, is_direct_manager) = match target {
        Some(t) => (t.id == actor.id, t.manager_id == Some(actor.id)),
        None => (false, false),
    };

    FieldMask {
        basic_info: privileged || is_self || is_direct_manager,
        employee_number: is_create && privileged,
        role: privileged,
        salary: privileged,
        permission_level: privileged,
        is_active: actor.is_admin(),
        // The outgoing manager may hand the report over; the proposed
        // manager has no say through this mask.
        manager_id: privileged || is_direct_manager,
    }
}

/// Guard on permission-level assignment. An hr actor granting admin is a
/// hard rejection, not a silently dropped field.
pub fn can_assign_level(actor: &Actor, level: PermissionLevel) -> bool {
    match actor.level {
        PermissionLevel::Admin => true,
        PermissionLevel::Hr => level != PermissionLevel::Admin,
        _ => false,
    }
}

/// Admin may delete anyone; hr may delete anyone below admin.
pub fn can_delete(actor: &Actor, target: &Model) -> bool {
    match actor.level {
        PermissionLevel::Admin => true,
        PermissionLevel::Hr => target.level() != PermissionLevel::Admin,
        _ => false,
    }
}

/// Password resets are admin-only.
pub fn can_reset_password(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Toggling the active flag is admin-only.
pub fn can_toggle_active(actor: &Actor) -> bool {
    actor.is_admin()
}

/// May the actor pick up this employee for reassignment? Mirrors the
/// `manager_id` entry of the edit mask.
pub fn can_initiate_reassign(actor: &Actor, employee: &Model) -> bool {
    actor.is_privileged() || employee.manager_id == Some(actor.id)
}

/// May the actor assign someone to report to another node? Deliberately
/// permissive: any manager-level actor may make any employee report to any
/// visible manager-level node, since the action is "assign a report to X",
/// not "X edits themselves".
pub fn can_receive_reassign(actor: &Actor) -> bool {
    matches!(
        actor.level,
        PermissionLevel::Admin | PermissionLevel::Hr | PermissionLevel::Manager
    )
}
