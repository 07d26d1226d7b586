//! Task and reward definitions. Definitions are immutable templates; the
//! workflows only read them.

use diesel::prelude::*;

use super::models::{NewRewardDefinition, NewTaskDefinition, RewardDefinition, TaskDefinition};
use super::schema::{reward_definitions, task_definitions};

pub fn find_task(conn: &mut SqliteConnection, task_id: &str) -> QueryResult<Option<TaskDefinition>> {
    task_definitions::table
        .filter(task_definitions::id.eq(task_id))
        .select(TaskDefinition::as_select())
        .first(conn)
        .optional()
}

pub fn insert_task(conn: &mut SqliteConnection, task: &NewTaskDefinition<'_>) -> QueryResult<()> {
    diesel::insert_into(task_definitions::table)
        .values(task)
        .execute(conn)?;
    Ok(())
}

pub fn find_reward(
    conn: &mut SqliteConnection,
    reward_id: &str,
) -> QueryResult<Option<RewardDefinition>> {
    reward_definitions::table
        .filter(reward_definitions::id.eq(reward_id))
        .select(RewardDefinition::as_select())
        .first(conn)
        .optional()
}

pub fn insert_reward(
    conn: &mut SqliteConnection,
    reward: &NewRewardDefinition<'_>,
) -> QueryResult<()> {
    diesel::insert_into(reward_definitions::table)
        .values(reward)
        .execute(conn)?;
    Ok(())
}
