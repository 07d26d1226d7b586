//! Which parents are linked to which children.
//!
//! The free functions take an explicit unit-of-work handle so workflows can
//! compose them inside their own transaction; the `Engine` methods run them
//! standalone.

use chorepoints_shared::Role;
use diesel::SqliteConnection;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::WorkflowError;
use crate::storage::models::{NewUser, User};
use crate::storage::{relationships, users};

pub fn is_parent_of(
    conn: &mut SqliteConnection,
    parent: &str,
    child: &str,
) -> Result<bool, WorkflowError> {
    Ok(relationships::exists(conn, parent, child)?)
}

pub fn parent_ids_of_child(
    conn: &mut SqliteConnection,
    child: &str,
) -> Result<Vec<String>, WorkflowError> {
    Ok(relationships::parent_ids(conn, child)?)
}

pub fn has_shared_child(
    conn: &mut SqliteConnection,
    parent_a: &str,
    parent_b: &str,
) -> Result<bool, WorkflowError> {
    Ok(relationships::any_shared_child(conn, parent_a, parent_b)?)
}

pub fn add_relationship(
    conn: &mut SqliteConnection,
    parent: &str,
    child: &str,
) -> Result<(), WorkflowError> {
    let parent_user = users::find(conn, parent)?
        .ok_or_else(|| WorkflowError::Referential(format!("unknown parent user {parent}")))?;
    let child_user = users::find(conn, child)?
        .ok_or_else(|| WorkflowError::Referential(format!("unknown child user {child}")))?;
    if parent_user.role()? != Role::Parent {
        return Err(WorkflowError::UserNotParent(parent.to_string()));
    }
    if child_user.role()? != Role::Child {
        return Err(WorkflowError::InvalidInput(format!(
            "user {child} is not a child"
        )));
    }
    let duplicate = || WorkflowError::DuplicateRelationship {
        parent_id: parent.to_string(),
        child_id: child.to_string(),
    };
    if relationships::exists(conn, parent, child)? {
        return Err(duplicate());
    }
    relationships::insert(conn, parent, child).map_err(|e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => duplicate(),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            WorkflowError::Referential(info.message().to_string())
        }
        other => other.into(),
    })
}

/// Load `user_id` and require the parent role.
pub(crate) fn require_parent(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<User, WorkflowError> {
    let user = users::find(conn, user_id)?.ok_or_else(|| WorkflowError::not_found("user", user_id))?;
    if user.role()? != Role::Parent {
        return Err(WorkflowError::UserNotParent(user_id.to_string()));
    }
    Ok(user)
}

fn insert_user(
    conn: &mut SqliteConnection,
    username: &str,
    display_name: &str,
    role: Role,
) -> Result<String, WorkflowError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(WorkflowError::InvalidInput("username must not be empty".into()));
    }
    let id = Uuid::new_v4().to_string();
    let row = NewUser {
        id: &id,
        username,
        display_name: display_name.trim(),
        role: role.as_str(),
    };
    users::insert(conn, &row).map_err(|e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            WorkflowError::InvalidInput(format!("username {username} is taken"))
        }
        other => other.into(),
    })?;
    Ok(id)
}

impl Engine {
    pub async fn is_parent_of(&self, parent: &str, child: &str) -> Result<bool, WorkflowError> {
        let (parent, child) = (parent.to_string(), child.to_string());
        self.store
            .read(move |conn| is_parent_of(conn, &parent, &child))
            .await
    }

    pub async fn parent_ids_of_child(&self, child: &str) -> Result<Vec<String>, WorkflowError> {
        let child = child.to_string();
        self.store
            .read(move |conn| parent_ids_of_child(conn, &child))
            .await
    }

    pub async fn children_of_parent(&self, parent: &str) -> Result<Vec<String>, WorkflowError> {
        let parent = parent.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> {
                Ok(relationships::child_ids(conn, &parent)?)
            })
            .await
    }

    pub async fn has_shared_child(
        &self,
        parent_a: &str,
        parent_b: &str,
    ) -> Result<bool, WorkflowError> {
        let (a, b) = (parent_a.to_string(), parent_b.to_string());
        self.store
            .read(move |conn| has_shared_child(conn, &a, &b))
            .await
    }

    pub async fn add_relationship(&self, parent: &str, child: &str) -> Result<(), WorkflowError> {
        let (p, c) = (parent.to_string(), child.to_string());
        self.store
            .write(move |conn| add_relationship(conn, &p, &c))
            .await
            .inspect_err(|e| {
                warn!(parent_id = %parent, child_id = %child, error = %e, "add_relationship rejected")
            })?;
        info!(parent_id = %parent, child_id = %child, "relationship added");
        Ok(())
    }

    pub async fn user(&self, user_id: &str) -> Result<Option<User>, WorkflowError> {
        let id = user_id.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> { Ok(users::find(conn, &id)?) })
            .await
    }

    /// Create a user with a fixed role. Returns the new user id.
    pub async fn register_user(
        &self,
        username: &str,
        display_name: &str,
        role: Role,
    ) -> Result<String, WorkflowError> {
        let (u, d) = (username.to_string(), display_name.to_string());
        let id = self
            .store
            .write(move |conn| insert_user(conn, &u, &d, role))
            .await?;
        info!(user_id = %id, username, role = %role, "user registered");
        Ok(id)
    }

    /// Create a child account already linked to `parent`.
    pub async fn create_child(
        &self,
        parent: &str,
        username: &str,
        display_name: &str,
    ) -> Result<String, WorkflowError> {
        let (p, u, d) = (
            parent.to_string(),
            username.to_string(),
            display_name.to_string(),
        );
        let id = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                require_parent(conn, &p)?;
                let id = insert_user(conn, &u, &d, Role::Child)?;
                add_relationship(conn, &p, &id)?;
                Ok(id)
            })
            .await?;
        info!(parent_id = %parent, child_id = %id, "child created");
        Ok(id)
    }
}
