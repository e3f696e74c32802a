use serde::Deserialize;

use crate::error::AppError;
use crate::model::{Patch, Task};
use crate::store::{EventStore, NewTask, Store, TaskChanges, TaskStore};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    pub assigned_user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub description: Option<String>,
    pub completed: Option<bool>,
    #[serde(default)]
    pub assigned_user_id: Patch<i64>,
}

/// 指派对象必须已经是同一活动的参与者，否则整个操作失败
async fn ensure_assignable(
    store: &dyn Store,
    event_id: i64,
    assigned_user_id: i64,
) -> Result<(), AppError> {
    if !store.is_participant(event_id, assigned_user_id).await? {
        return Err(AppError::access_denied(
            "assigned user must be a participant of the event",
        ));
    }
    Ok(())
}

impl Task {
    pub async fn create(
        store: &dyn Store,
        event_id: i64,
        creator_id: i64,
        req: CreateTaskRequest,
    ) -> Result<Task, AppError> {
        if req.description.trim().is_empty() {
            return Err(AppError::validation("description: must not be blank"));
        }
        if store.find_event(event_id).await?.is_none() {
            return Err(AppError::not_found("event not found"));
        }
        if !store.is_participant(event_id, creator_id).await? {
            return Err(AppError::access_denied("only participants may create tasks"));
        }
        if let Some(assigned) = req.assigned_user_id {
            ensure_assignable(store, event_id, assigned).await?;
        }

        store
            .insert_task(NewTask {
                event_id,
                creator_id,
                assigned_user_id: req.assigned_user_id,
                description: req.description,
            })
            .await
    }

    /// 改任务是创建者专属
    pub async fn update(
        store: &dyn Store,
        task_id: i64,
        user_id: i64,
        req: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let task = store
            .find_task(task_id)
            .await?
            .ok_or_else(|| AppError::not_found("task not found"))?;
        if task.creator_id != user_id {
            return Err(AppError::access_denied("only the creator may modify a task"));
        }
        if let Patch::Set(assigned) = req.assigned_user_id {
            ensure_assignable(store, task.event_id, assigned).await?;
        }

        store
            .update_task(
                task_id,
                TaskChanges {
                    description: req.description,
                    completed: req.completed,
                    assigned_user_id: req.assigned_user_id,
                },
            )
            .await
    }

    pub async fn delete(store: &dyn Store, task_id: i64, user_id: i64) -> Result<(), AppError> {
        let task = store
            .find_task(task_id)
            .await?
            .ok_or_else(|| AppError::not_found("task not found"))?;
        if task.creator_id != user_id {
            return Err(AppError::access_denied("only the creator may delete a task"));
        }

        store.delete_task(task_id).await
    }

    pub async fn list(
        store: &dyn Store,
        event_id: i64,
        user_id: i64,
    ) -> Result<Vec<Task>, AppError> {
        if !store.is_participant(event_id, user_id).await? {
            return Err(AppError::access_denied("only participants may list tasks"));
        }

        store.tasks_for_event(event_id).await
    }
}
