use async_trait::async_trait;
use sqlx::PgConnection;

use super::PgStore;
use crate::error::AppError;
use crate::model::{ChecklistItem, Patch};
use crate::store::{ChecklistItemChanges, ChecklistStore, NewChecklistItem};

const ITEM_COLUMNS: &str = "id, event_id, created_by, assigned_user_id, name, description, \
                            quantity, completed, from_template, created_at";

async fn insert_item_on(
    conn: &mut PgConnection,
    new: &NewChecklistItem,
) -> Result<ChecklistItem, sqlx::Error> {
    sqlx::query_as::<_, ChecklistItem>(&format!(
        r#"
        INSERT INTO checklist_items
            (event_id, created_by, assigned_user_id, name, description, quantity,
             completed, from_template, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, false, $7, NOW())
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(new.event_id)
    .bind(new.created_by)
    .bind(new.assigned_user_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.quantity)
    .bind(new.from_template)
    .fetch_one(conn)
    .await
}

#[async_trait]
impl ChecklistStore for PgStore {
    async fn insert_item(&self, new: NewChecklistItem) -> Result<ChecklistItem, AppError> {
        let mut conn = self.pool.acquire().await?;
        let item = insert_item_on(&mut *conn, &new).await?;
        Ok(item)
    }

    async fn insert_items(
        &self,
        items: Vec<NewChecklistItem>,
    ) -> Result<Vec<ChecklistItem>, AppError> {
        // 模板应用整体成功或整体失败
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(items.len());
        for new in &items {
            inserted.push(insert_item_on(&mut *tx, new).await?);
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_item(&self, id: i64) -> Result<Option<ChecklistItem>, AppError> {
        let item = sqlx::query_as::<_, ChecklistItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn update_item(
        &self,
        id: i64,
        changes: ChecklistItemChanges,
    ) -> Result<ChecklistItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, ChecklistItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::not_found("checklist item not found"));
        };

        let description = changes.description.apply(current.description);
        let assigned = match changes.assigned_user_id {
            Patch::Absent => current.assigned_user_id,
            Patch::Clear => None,
            Patch::Set(user_id) => Some(user_id),
        };

        let item = sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            UPDATE checklist_items
            SET name = COALESCE($2, name),
                description = $3,
                quantity = COALESCE($4, quantity),
                completed = COALESCE($5, completed),
                assigned_user_id = $6
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(description)
        .bind(changes.quantity)
        .bind(changes.completed)
        .bind(assigned)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    async fn set_item_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<ChecklistItem, AppError> {
        sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            UPDATE checklist_items
            SET completed = $2
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("checklist item not found"))
    }

    async fn delete_item(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM checklist_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("checklist item not found"));
        }
        Ok(())
    }

    async fn items_for_event(&self, event_id: i64) -> Result<Vec<ChecklistItem>, AppError> {
        let items = sqlx::query_as::<_, ChecklistItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE event_id = $1 ORDER BY created_at"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
