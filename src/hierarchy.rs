//! Hierarchy validator
//!
//! Pure checks over a snapshot of the manager-link graph. Every write that
//! touches `manager_id` goes through [`validate_manager_assignment`] — the
//! service pre-check and both store adapters call this one code path, so no
//! route can drift its own partial cycle check.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::employee::{EmployeeSummary, Model};
use crate::error::{AppError, AppResult, ConflictKind};

/// Snapshot of the manager edges: employee id -> manager id (if any).
pub type ManagerLinks = HashMap<Uuid, Option<Uuid>>;

/// Build the link snapshot from a record set.
pub fn manager_links(employees: &[Model]) -> ManagerLinks {
    employees.iter().map(|e| (e.id, e.manager_id)).collect()
}

/// Validate a proposed manager assignment against the current graph.
///
/// Accepts a detach (`None`). Rejects self-management, a dangling manager
/// reference, and any assignment that would make `employee_id` one of its
/// own ancestors.
pub fn validate_manager_assignment(
    employee_id: Uuid,
    proposed_manager_id: Option<Uuid>,
    links: &ManagerLinks,
) -> AppResult<()> {
    let Some(manager_id) = proposed_manager_id else {
        return Ok(());
    };

    if manager_id == employee_id {
        return Err(AppError::Conflict(ConflictKind::SelfManagement));
    }

    if !links.contains_key(&manager_id) {
        return Err(AppError::Conflict(ConflictKind::ManagerNotFound));
    }

    // Walk the ancestors of the proposed manager. If the employee appears,
    // the assignment would close a cycle. The walk is bounded by the graph
    // size; exceeding it means the stored graph already violates the forest
    // invariant.
    let mut current = Some(manager_id);
    let mut steps = 0usize;
    while let Some(id) = current {
        if id == employee_id {
            return Err(AppError::Conflict(ConflictKind::CycleDetected));
        }
        steps += 1;
        if steps > links.len() {
            return Err(AppError::Conflict(ConflictKind::MalformedHierarchy));
        }
        current = links.get(&id).copied().flatten();
    }

    Ok(())
}

/// An employee with subordinates cannot be deleted; they must be reassigned
/// first.
pub fn validate_deletion(employee_id: Uuid, links: &ManagerLinks) -> AppResult<()> {
    if links.values().any(|m| *m == Some(employee_id)) {
        return Err(AppError::Conflict(ConflictKind::HasSubordinates));
    }
    Ok(())
}

/// Node of the reporting forest returned by [`build_tree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub employee: EmployeeSummary,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<TreeNode>,
}

/// Build the reporting forest from a full record set.
///
/// Roots are employees without a manager; children are ordered by surname,
/// then first name. Write-time validation keeps the graph a forest, so the
/// expansion is finite; the depth cap exists so a corrupted store reports
/// `MalformedHierarchy` instead of recursing forever.
pub fn build_tree(employees: &[Model]) -> AppResult<Vec<TreeNode>> {
    let mut by_manager: HashMap<Option<Uuid>, Vec<&Model>> = HashMap::new();
    for e in employees {
        by_manager.entry(e.manager_id).or_default().push(e);
    }
    for children in by_manager.values_mut() {
        children.sort_by(|a, b| {
            (a.surname.as_str(), a.first_name.as_str())
                .cmp(&(b.surname.as_str(), b.first_name.as_str()))
        });
    }

    expand(None, &by_manager, 0, employees.len())
}

fn expand(
    manager_id: Option<Uuid>,
    by_manager: &HashMap<Option<Uuid>, Vec<&Model>>,
    depth: usize,
    max_depth: usize,
) -> AppResult<Vec<TreeNode>> {
    if depth > max_depth {
        return Err(AppError::Conflict(ConflictKind::MalformedHierarchy));
    }

    let Some(children) = by_manager.get(&manager_id) else {
        return Ok(Vec::new());
    };

    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        nodes.push(TreeNode {
            employee: EmployeeSummary::from(*child),
            children: expand(Some(child.id), by_manager, depth + 1, max_depth)?,
        });
    }
    Ok(nodes)
}
