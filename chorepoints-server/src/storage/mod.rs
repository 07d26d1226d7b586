pub mod assignments;
pub mod catalog;
pub mod claims;
pub mod invitations;
pub mod ledger;
pub mod models;
pub mod relationships;
pub mod schema;
pub mod users;

use chorepoints_shared::{ParseEnumError, Role};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::DatabaseErrorKind;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use models::{NewRelationship, NewRewardDefinition, NewTaskDefinition, NewUser};
use tracing::{debug, trace};

use crate::config::SeedConfig;

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A Diesel ORM error (query failure, constraint violation, etc.)
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored enum column holds a value this build cannot interpret.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] ParseEnumError),

    /// Seed data contradicts the stored users.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _
            ))
        )
    }
}

/// Result of a conditional `UPDATE ... WHERE id = ? AND status = ?`.
///
/// `Lost` means the row was no longer in the expected state when the update
/// ran, i.e. another unit of work got there first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied,
    Lost,
}

impl CasOutcome {
    pub fn from_affected(rows: usize) -> Self {
        if rows > 0 {
            CasOutcome::Applied
        } else {
            CasOutcome::Lost
        }
    }

    pub fn is_applied(self) -> bool {
        self == CasOutcome::Applied
    }
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let url = path.to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder().max_size(8).build(manager)?;

        // Run pending Diesel migrations on startup (auto-init empty DBs)
        {
            let pool_clone = pool.clone();
            tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
                const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
                let mut conn = pool_clone.get()?;
                configure_sqlite_conn(&mut conn)?;
                conn.run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(())
            })
            .await??;
        }

        Ok(Store { pool })
    }

    /// Run `op` on a root-level connection, outside any transaction.
    pub async fn read<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<diesel::result::Error> + From<StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut conn = pool.get().map_err(StorageError::from)?;
            configure_sqlite_conn(&mut conn)?;
            op(&mut conn)
        })
        .await
        .map_err(StorageError::from)?
    }

    /// Run `op` as one unit of work.
    ///
    /// The transaction is opened with `BEGIN IMMEDIATE`, so the database write
    /// lock is held from the first read; competing writers wait (bounded by
    /// `busy_timeout`) instead of interleaving. Returning `Err` from `op`
    /// rolls everything back.
    pub async fn write<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<diesel::result::Error> + From<StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut conn = pool.get().map_err(StorageError::from)?;
            configure_sqlite_conn(&mut conn)?;
            conn.immediate_transaction(op)
        })
        .await
        .map_err(StorageError::from)?
    }

    pub async fn seed_from_config(&self, seed: &SeedConfig) -> Result<(), StorageError> {
        use schema::{relationships, reward_definitions, task_definitions, users};

        let seed = seed.clone();
        self.write(move |conn| -> Result<(), StorageError> {
            // Upsert users; role is immutable once created
            for u in &seed.users {
                let role = u.role.as_str();
                let new_user = NewUser {
                    id: &u.id,
                    username: &u.username,
                    display_name: &u.display_name,
                    role,
                };
                diesel::insert_into(users::table)
                    .values(&new_user)
                    .on_conflict(users::id)
                    .do_update()
                    .set(users::display_name.eq(new_user.display_name))
                    .execute(conn)?;
            }

            for r in &seed.relationships {
                if role_of(conn, &r.parent)? != Some(Role::Parent)
                    || role_of(conn, &r.child)? != Some(Role::Child)
                {
                    return Err(StorageError::InvalidSeed(format!(
                        "relationship {} -> {} must link a parent to a child",
                        r.parent, r.child
                    )));
                }
                diesel::insert_into(relationships::table)
                    .values(&NewRelationship {
                        parent_id: &r.parent,
                        child_id: &r.child,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }

            for t in &seed.tasks {
                let new_task = NewTaskDefinition {
                    id: &t.id,
                    name: &t.name,
                    points: t.points,
                    parent_id: &t.owner,
                };
                diesel::insert_into(task_definitions::table)
                    .values(&new_task)
                    .on_conflict(task_definitions::id)
                    .do_update()
                    .set((
                        task_definitions::name.eq(new_task.name),
                        task_definitions::points.eq(new_task.points),
                    ))
                    .execute(conn)?;
            }

            for r in &seed.rewards {
                let new_reward = NewRewardDefinition {
                    id: &r.id,
                    name: &r.name,
                    required_points: r.required_points,
                    parent_id: &r.owner,
                };
                diesel::insert_into(reward_definitions::table)
                    .values(&new_reward)
                    .on_conflict(reward_definitions::id)
                    .do_update()
                    .set((
                        reward_definitions::name.eq(new_reward.name),
                        reward_definitions::required_points.eq(new_reward.required_points),
                    ))
                    .execute(conn)?;
            }

            debug!(
                users = seed.users.len(),
                relationships = seed.relationships.len(),
                tasks = seed.tasks.len(),
                rewards = seed.rewards.len(),
                "seeded from config"
            );
            Ok(())
        })
        .await
    }
}

fn role_of(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<Role>, StorageError> {
    Ok(users::find(conn, user_id)?.map(|u| u.role()).transpose()?)
}

fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    trace!("configuring sqlite connection");
    // Busy timeout first so the remaining pragmas wait on a held lock too
    diesel::sql_query("PRAGMA busy_timeout=5000;").execute(conn)?;
    // WAL lets readers proceed while a unit of work holds the write lock
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;
    Ok(())
}
