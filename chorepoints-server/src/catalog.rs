//! Creation of task and reward definitions. Listing is left to the caller's
//! own read paths.

use tracing::info;
use uuid::Uuid;

use crate::directory::require_parent;
use crate::engine::Engine;
use crate::error::WorkflowError;
use crate::storage::catalog;
use crate::storage::models::{
    NewRewardDefinition, NewTaskDefinition, RewardDefinition, TaskDefinition,
};

fn check_name_and_points(name: &str, points: i32, what: &str) -> Result<(), WorkflowError> {
    if name.trim().is_empty() {
        return Err(WorkflowError::InvalidInput(format!("{what} name must not be empty")));
    }
    if points < 0 {
        return Err(WorkflowError::InvalidInput(format!(
            "{what} points must not be negative"
        )));
    }
    Ok(())
}

impl Engine {
    pub async fn create_task_definition(
        &self,
        parent: &str,
        name: &str,
        points: i32,
    ) -> Result<String, WorkflowError> {
        check_name_and_points(name, points, "task")?;
        let (p, n) = (parent.to_string(), name.trim().to_string());
        let id = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                require_parent(conn, &p)?;
                let id = Uuid::new_v4().to_string();
                catalog::insert_task(
                    conn,
                    &NewTaskDefinition {
                        id: &id,
                        name: &n,
                        points,
                        parent_id: &p,
                    },
                )?;
                Ok(id)
            })
            .await?;
        info!(task_id = %id, parent_id = %parent, points, "task definition created");
        Ok(id)
    }

    pub async fn create_reward_definition(
        &self,
        parent: &str,
        name: &str,
        required_points: i32,
    ) -> Result<String, WorkflowError> {
        check_name_and_points(name, required_points, "reward")?;
        let (p, n) = (parent.to_string(), name.trim().to_string());
        let id = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                require_parent(conn, &p)?;
                let id = Uuid::new_v4().to_string();
                catalog::insert_reward(
                    conn,
                    &NewRewardDefinition {
                        id: &id,
                        name: &n,
                        required_points,
                        parent_id: &p,
                    },
                )?;
                Ok(id)
            })
            .await?;
        info!(reward_id = %id, parent_id = %parent, required_points, "reward definition created");
        Ok(id)
    }

    pub async fn task_definition(&self, id: &str) -> Result<Option<TaskDefinition>, WorkflowError> {
        let id = id.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> { Ok(catalog::find_task(conn, &id)?) })
            .await
    }

    pub async fn reward_definition(
        &self,
        id: &str,
    ) -> Result<Option<RewardDefinition>, WorkflowError> {
        let id = id.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> { Ok(catalog::find_reward(conn, &id)?) })
            .await
    }
}
