use serde::Deserialize;

use crate::error::AppError;
use crate::model::{ChecklistItem, Patch};
use crate::store::{
    ChecklistItemChanges, ChecklistStore, EventStore, NewChecklistItem, Store, TemplateStore,
};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub assigned_user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    pub quantity: Option<i32>,
    pub completed: Option<bool>,
    #[serde(default)]
    pub assigned_user_id: Patch<i64>,
}

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

impl ChecklistItem {
    pub async fn create(
        store: &dyn Store,
        event_id: i64,
        user_id: i64,
        req: CreateItemRequest,
    ) -> Result<ChecklistItem, AppError> {
        let quantity = req.quantity.unwrap_or(1);
        let mut problems = Vec::new();
        if req.name.trim().is_empty() {
            problems.push("name: must not be blank");
        }
        if quantity <= 0 {
            problems.push("quantity: must be positive");
        }
        if !problems.is_empty() {
            return Err(AppError::validation(problems.join("; ")));
        }

        if store.find_event(event_id).await?.is_none() {
            return Err(AppError::not_found("event not found"));
        }
        if !store.is_participant(event_id, user_id).await? {
            return Err(AppError::access_denied(
                "only participants may create checklist items",
            ));
        }
        if let Some(assigned) = req.assigned_user_id {
            ensure_assignable(store, event_id, assigned).await?;
        }

        store
            .insert_item(NewChecklistItem {
                event_id,
                created_by: user_id,
                assigned_user_id: req.assigned_user_id,
                name: req.name,
                description: req.description,
                quantity,
                from_template: false,
            })
            .await
    }

    /// 常规更新是创建者专属（与勾选不同）
    pub async fn update(
        store: &dyn Store,
        item_id: i64,
        user_id: i64,
        req: UpdateItemRequest,
    ) -> Result<ChecklistItem, AppError> {
        if let Some(quantity) = req.quantity {
            if quantity <= 0 {
                return Err(AppError::validation("quantity: must be positive"));
            }
        }

        let item = store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found("checklist item not found"))?;
        if item.created_by != user_id {
            return Err(AppError::access_denied(
                "only the creator may modify a checklist item",
            ));
        }
        if let Patch::Set(assigned) = req.assigned_user_id {
            ensure_assignable(store, item.event_id, assigned).await?;
        }

        store
            .update_item(
                item_id,
                ChecklistItemChanges {
                    name: req.name,
                    description: req.description,
                    quantity: req.quantity,
                    completed: req.completed,
                    assigned_user_id: req.assigned_user_id,
                },
            )
            .await
    }

    /// 勾选/取消勾选：任何参与者都可以，不要求是条目创建者
    pub async fn toggle(
        store: &dyn Store,
        item_id: i64,
        user_id: i64,
    ) -> Result<ChecklistItem, AppError> {
        let item = store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found("checklist item not found"))?;
        if !store.is_participant(item.event_id, user_id).await? {
            return Err(AppError::access_denied(
                "only participants may toggle checklist items",
            ));
        }

        store.set_item_completed(item_id, !item.completed).await
    }

    pub async fn delete(store: &dyn Store, item_id: i64, user_id: i64) -> Result<(), AppError> {
        let item = store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found("checklist item not found"))?;
        if item.created_by != user_id {
            return Err(AppError::access_denied(
                "only the creator may delete a checklist item",
            ));
        }

        store.delete_item(item_id).await
    }

    pub async fn list(
        store: &dyn Store,
        event_id: i64,
        user_id: i64,
    ) -> Result<Vec<ChecklistItem>, AppError> {
        if !store.is_participant(event_id, user_id).await? {
            return Err(AppError::access_denied(
                "only participants may list checklist items",
            ));
        }

        store.items_for_event(event_id).await
    }

    /// 套用模板：每个模板条目生成一个清单项，带 from_template 标记，
    /// 数量照抄模板默认值
    pub async fn apply_template(
        store: &dyn Store,
        event_id: i64,
        template_id: i64,
        user_id: i64,
    ) -> Result<Vec<ChecklistItem>, AppError> {
        if store.find_event(event_id).await?.is_none() {
            return Err(AppError::not_found("event not found"));
        }
        if !store.is_participant(event_id, user_id).await? {
            return Err(AppError::access_denied(
                "only participants may apply templates",
            ));
        }

        let (_, template_items) = store
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::not_found("template not found"))?;

        let new_items = template_items
            .into_iter()
            .map(|item| NewChecklistItem {
                event_id,
                created_by: user_id,
                assigned_user_id: None,
                name: item.name,
                description: item.description,
                quantity: item.quantity,
                from_template: true,
            })
            .collect();

        store.insert_items(new_items).await
    }
}
