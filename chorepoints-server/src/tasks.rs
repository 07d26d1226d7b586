//! Task assignments: `assigned -> submitted -> approved | rejected`.
//!
//! Approval and its `task_completion` ledger entry are written in the same
//! unit of work, so one never exists without the other.

use chorepoints_shared::{Decision, LedgerKind, TaskEvent, TaskStatus};
use tracing::{info, warn};
use uuid::Uuid;

use crate::directory;
use crate::engine::Engine;
use crate::error::WorkflowError;
use crate::ledger::{self, Cause};
use crate::storage::models::{NewTaskAssignment, TaskAssignment};
use crate::storage::{self, assignments, catalog, users};

const ENTITY: &str = "assignment";

impl Engine {
    /// Give `task` to `child`. Nothing prevents a second identical open
    /// assignment; see [`Engine::has_open_assignment`] for the advisory check.
    pub async fn assign_task(
        &self,
        assigning_parent: &str,
        child: &str,
        task: &str,
    ) -> Result<String, WorkflowError> {
        let (p, c, t) = (
            assigning_parent.to_string(),
            child.to_string(),
            task.to_string(),
        );
        let id = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                let def = catalog::find_task(conn, &t)?
                    .ok_or_else(|| WorkflowError::not_found("task definition", t.as_str()))?;
                if users::find(conn, &c)?.is_none() {
                    return Err(WorkflowError::not_found("child", c.as_str()));
                }
                if !directory::is_parent_of(conn, &p, &c)? {
                    return Err(WorkflowError::forbidden(format!(
                        "{p} is not a parent of {c}"
                    )));
                }
                // The task must come from this family: the assigner or another parent of the child.
                if def.parent_id != p && !directory::is_parent_of(conn, &def.parent_id, &c)? {
                    return Err(WorkflowError::forbidden(format!(
                        "task {t} does not belong to a parent of {c}"
                    )));
                }
                let id = Uuid::new_v4().to_string();
                assignments::insert(
                    conn,
                    &NewTaskAssignment {
                        id: &id,
                        child_id: &c,
                        task_id: &t,
                        assigned_by: &p,
                        status: TaskStatus::Assigned.as_str(),
                        assigned_at: storage::now(),
                    },
                )?;
                Ok(id)
            })
            .await
            .inspect_err(|e| {
                warn!(parent_id = %assigning_parent, child_id = %child, task_id = %task, error = %e, "assign_task rejected")
            })?;
        info!(assignment_id = %id, parent_id = %assigning_parent, child_id = %child, task_id = %task, "task assigned");
        Ok(id)
    }

    /// Read-only pre-check for callers that want to avoid duplicate open
    /// assignments. Not enforced by [`Engine::assign_task`].
    pub async fn has_open_assignment(&self, child: &str, task: &str) -> Result<bool, WorkflowError> {
        let (c, t) = (child.to_string(), task.to_string());
        self.store
            .read(move |conn| -> Result<_, WorkflowError> {
                Ok(assignments::count_open(conn, &c, &t)? > 0)
            })
            .await
    }

    pub async fn submit_task(&self, child: &str, assignment: &str) -> Result<(), WorkflowError> {
        let (c, a) = (child.to_string(), assignment.to_string());
        self.store
            .write(move |conn| -> Result<_, WorkflowError> {
                let row = assignments::find(conn, &a)?
                    .ok_or_else(|| WorkflowError::not_found(ENTITY, a.as_str()))?;
                if row.child_id != c {
                    return Err(WorkflowError::NotOwner {
                        assignment_id: a,
                        child_id: c,
                    });
                }
                let status = row.status()?;
                if status.next(TaskEvent::Submit).is_none() {
                    return Err(WorkflowError::invalid_state(ENTITY, a, status));
                }
                if !assignments::mark_submitted(conn, &a, storage::now())?.is_applied() {
                    return Err(WorkflowError::conflict(ENTITY, a));
                }
                Ok(())
            })
            .await
            .inspect_err(|e| {
                warn!(child_id = %child, assignment_id = %assignment, error = %e, "submit_task rejected")
            })?;
        info!(child_id = %child, assignment_id = %assignment, "task submitted");
        Ok(())
    }

    /// Approve or reject a submitted assignment. A second verifier racing the
    /// first receives `StatusConflict`.
    pub async fn verify_task(
        &self,
        parent: &str,
        assignment: &str,
        decision: Decision,
    ) -> Result<(), WorkflowError> {
        let (p, a) = (parent.to_string(), assignment.to_string());
        let credited = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                let (row, points) = assignments::load_for_update(conn, &a)?
                    .ok_or_else(|| WorkflowError::not_found(ENTITY, a.as_str()))?;
                let status = row.status()?;
                let Some(next) = status.next(TaskEvent::Verify(decision)) else {
                    return Err(if status.is_terminal() {
                        WorkflowError::conflict(ENTITY, a)
                    } else {
                        WorkflowError::invalid_state(ENTITY, a, status)
                    });
                };
                if !directory::is_parent_of(conn, &p, &row.child_id)? {
                    return Err(WorkflowError::forbidden(format!(
                        "{p} is not a parent of {}",
                        row.child_id
                    )));
                }
                let now = storage::now();
                if !assignments::mark_verified(conn, &a, next, &p, now)?.is_applied() {
                    return Err(WorkflowError::conflict(ENTITY, a));
                }
                if next == TaskStatus::Approved && points > 0 {
                    ledger::post(
                        conn,
                        &row.child_id,
                        points,
                        LedgerKind::TaskCompletion,
                        Cause::Assignment(&a),
                        &p,
                        None,
                    )?;
                    return Ok(points);
                }
                Ok(0)
            })
            .await
            .inspect_err(|e| {
                warn!(parent_id = %parent, assignment_id = %assignment, error = %e, "verify_task rejected")
            })?;
        info!(
            parent_id = %parent,
            assignment_id = %assignment,
            decision = %decision,
            credited,
            "task verified"
        );
        Ok(())
    }

    pub async fn assignment(&self, id: &str) -> Result<Option<TaskAssignment>, WorkflowError> {
        let id = id.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> { Ok(assignments::find(conn, &id)?) })
            .await
    }

    pub async fn assignments_for_child(
        &self,
        child: &str,
    ) -> Result<Vec<TaskAssignment>, WorkflowError> {
        let child = child.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> {
                Ok(assignments::list_for_child(conn, &child)?)
            })
            .await
    }
}
