//! The point ledger. A balance is always the sum of a child's entries;
//! nothing stores it.

use chorepoints_shared::LedgerKind;
use diesel::SqliteConnection;
use tracing::{info, warn};

use crate::directory;
use crate::engine::Engine;
use crate::error::WorkflowError;
use crate::storage::models::{LedgerEntry, NewLedgerEntry};
use crate::storage::{self, ledger};

/// What a ledger entry was caused by.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cause<'a> {
    Manual,
    Assignment(&'a str),
    Claim(&'a str),
}

pub(crate) fn post(
    conn: &mut SqliteConnection,
    child: &str,
    amount: i32,
    kind: LedgerKind,
    cause: Cause<'_>,
    actor: &str,
    note: Option<&str>,
) -> Result<(), WorkflowError> {
    let (task_assignment_id, reward_claim_id) = match cause {
        Cause::Manual => (None, None),
        Cause::Assignment(id) => (Some(id), None),
        Cause::Claim(id) => (None, Some(id)),
    };
    ledger::append(
        conn,
        &NewLedgerEntry {
            child_id: child,
            change_amount: amount,
            kind: kind.as_str(),
            task_assignment_id,
            reward_claim_id,
            created_by: actor,
            note,
            created_at: storage::now(),
        },
    )?;
    Ok(())
}

pub fn balance(conn: &mut SqliteConnection, child: &str) -> Result<i64, WorkflowError> {
    Ok(ledger::balance(conn, child)?)
}

impl Engine {
    pub async fn balance(&self, child: &str) -> Result<i64, WorkflowError> {
        let child = child.to_string();
        self.store.read(move |conn| balance(conn, &child)).await
    }

    /// Entries for `child`, newest first.
    pub async fn history(&self, child: &str) -> Result<Vec<LedgerEntry>, WorkflowError> {
        let child = child.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> {
                Ok(ledger::entries_for_child(conn, &child)?)
            })
            .await
    }

    /// Record a manual correction by one of the child's parents. A negative
    /// adjustment may not take the balance below zero.
    pub async fn adjust_points(
        &self,
        parent: &str,
        child: &str,
        amount: i32,
        note: Option<&str>,
    ) -> Result<(), WorkflowError> {
        if amount == 0 {
            return Err(WorkflowError::InvalidInput(
                "adjustment amount must not be zero".into(),
            ));
        }
        let (p, c, n) = (
            parent.to_string(),
            child.to_string(),
            note.map(str::to_string),
        );
        self.store
            .write(move |conn| -> Result<_, WorkflowError> {
                if !directory::is_parent_of(conn, &p, &c)? {
                    return Err(WorkflowError::forbidden(format!(
                        "{p} is not a parent of {c}"
                    )));
                }
                if amount < 0 {
                    let current = balance(conn, &c)?;
                    let required = -i64::from(amount);
                    if current < required {
                        return Err(WorkflowError::InsufficientPoints {
                            balance: current,
                            required,
                        });
                    }
                }
                post(
                    conn,
                    &c,
                    amount,
                    LedgerKind::ManualAdjustment,
                    Cause::Manual,
                    &p,
                    n.as_deref(),
                )
            })
            .await
            .inspect_err(|e| {
                warn!(parent_id = %parent, child_id = %child, amount, error = %e, "adjust_points rejected")
            })?;
        info!(parent_id = %parent, child_id = %child, amount, "points adjusted");
        Ok(())
    }
}
