use chorepoints_shared::TaskStatus;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::CasOutcome;
use super::models::{NewTaskAssignment, TaskAssignment};
use super::schema::{task_assignments, task_definitions};

pub fn insert(conn: &mut SqliteConnection, row: &NewTaskAssignment<'_>) -> QueryResult<()> {
    diesel::insert_into(task_assignments::table)
        .values(row)
        .execute(conn)?;
    Ok(())
}

pub fn find(conn: &mut SqliteConnection, id: &str) -> QueryResult<Option<TaskAssignment>> {
    task_assignments::table
        .filter(task_assignments::id.eq(id))
        .select(TaskAssignment::as_select())
        .first(conn)
        .optional()
}

/// Assignment together with the point value of its task definition.
/// Call inside `Store::write` so the row cannot move underneath the caller.
pub fn load_for_update(
    conn: &mut SqliteConnection,
    id: &str,
) -> QueryResult<Option<(TaskAssignment, i32)>> {
    task_assignments::table
        .inner_join(task_definitions::table)
        .filter(task_assignments::id.eq(id))
        .select((TaskAssignment::as_select(), task_definitions::points))
        .first(conn)
        .optional()
}

pub fn list_for_child(conn: &mut SqliteConnection, child: &str) -> QueryResult<Vec<TaskAssignment>> {
    task_assignments::table
        .filter(task_assignments::child_id.eq(child))
        .order(task_assignments::assigned_at.desc())
        .select(TaskAssignment::as_select())
        .load(conn)
}

/// Assignments of `task` to `child` that have not reached a terminal status.
pub fn count_open(conn: &mut SqliteConnection, child: &str, task: &str) -> QueryResult<i64> {
    task_assignments::table
        .filter(task_assignments::child_id.eq(child))
        .filter(task_assignments::task_id.eq(task))
        .filter(task_assignments::status.eq_any(vec![
            TaskStatus::Assigned.as_str(),
            TaskStatus::Submitted.as_str(),
        ]))
        .count()
        .get_result(conn)
}

pub fn mark_submitted(
    conn: &mut SqliteConnection,
    id: &str,
    at: NaiveDateTime,
) -> QueryResult<CasOutcome> {
    let rows = diesel::update(
        task_assignments::table
            .filter(task_assignments::id.eq(id))
            .filter(task_assignments::status.eq(TaskStatus::Assigned.as_str())),
    )
    .set((
        task_assignments::status.eq(TaskStatus::Submitted.as_str()),
        task_assignments::submitted_at.eq(Some(at)),
    ))
    .execute(conn)?;
    Ok(CasOutcome::from_affected(rows))
}

/// Move a submitted assignment to `to`. `completed_at` is only set for
/// approvals.
pub fn mark_verified(
    conn: &mut SqliteConnection,
    id: &str,
    to: TaskStatus,
    verifier: &str,
    at: NaiveDateTime,
) -> QueryResult<CasOutcome> {
    let completed_at = (to == TaskStatus::Approved).then_some(at);
    let rows = diesel::update(
        task_assignments::table
            .filter(task_assignments::id.eq(id))
            .filter(task_assignments::status.eq(TaskStatus::Submitted.as_str())),
    )
    .set((
        task_assignments::status.eq(to.as_str()),
        task_assignments::verified_by.eq(Some(verifier)),
        task_assignments::verified_at.eq(Some(at)),
        task_assignments::completed_at.eq(completed_at),
    ))
    .execute(conn)?;
    Ok(CasOutcome::from_affected(rows))
}
