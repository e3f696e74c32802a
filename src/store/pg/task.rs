use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::{Patch, Task};
use crate::store::{NewTask, TaskChanges, TaskStore};

const TASK_COLUMNS: &str =
    "id, event_id, creator_id, assigned_user_id, description, completed, created_at";

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, new: NewTask) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (event_id, creator_id, assigned_user_id, description, completed, created_at)
            VALUES ($1, $2, $3, $4, false, NOW())
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(new.event_id)
        .bind(new.creator_id)
        .bind(new.assigned_user_id)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::not_found("task not found"));
        };

        let assigned = match changes.assigned_user_id {
            Patch::Absent => current.assigned_user_id,
            Patch::Clear => None,
            Patch::Set(user_id) => Some(user_id),
        };

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET description = COALESCE($2, description),
                completed = COALESCE($3, completed),
                assigned_user_id = $4
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.description)
        .bind(changes.completed)
        .bind(assigned)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    async fn delete_task(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("task not found"));
        }
        Ok(())
    }

    async fn tasks_for_event(&self, event_id: i64) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE event_id = $1 ORDER BY created_at"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }
}
