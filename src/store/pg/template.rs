use async_trait::async_trait;
use sqlx::PgConnection;

use super::PgStore;
use crate::error::AppError;
use crate::model::{ChecklistTemplate, TemplateItem};
use crate::store::{NewTemplate, NewTemplateItem, TemplateChanges, TemplateStore};

const ITEM_COLUMNS: &str = "id, template_id, name, description, quantity";

async fn insert_template_items(
    conn: &mut PgConnection,
    template_id: i64,
    items: &[NewTemplateItem],
) -> Result<Vec<TemplateItem>, sqlx::Error> {
    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, TemplateItem>(&format!(
            r#"
            INSERT INTO template_items (template_id, name, description, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(template_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .fetch_one(&mut *conn)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

async fn template_items(
    conn: &mut PgConnection,
    template_id: i64,
) -> Result<Vec<TemplateItem>, sqlx::Error> {
    sqlx::query_as::<_, TemplateItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM template_items WHERE template_id = $1 ORDER BY id"
    ))
    .bind(template_id)
    .fetch_all(conn)
    .await
}

#[async_trait]
impl TemplateStore for PgStore {
    async fn insert_template(
        &self,
        new: NewTemplate,
    ) -> Result<(ChecklistTemplate, Vec<TemplateItem>), AppError> {
        let mut tx = self.pool.begin().await?;

        let template = sqlx::query_as::<_, ChecklistTemplate>(
            r#"
            INSERT INTO checklist_templates (name, category, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, name, category, created_at
            "#,
        )
        .bind(&new.name)
        .bind(new.category.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let items = insert_template_items(&mut *tx, template.id, &new.items).await?;

        tx.commit().await?;
        Ok((template, items))
    }

    async fn find_template(
        &self,
        id: i64,
    ) -> Result<Option<(ChecklistTemplate, Vec<TemplateItem>)>, AppError> {
        let Some(template) = sqlx::query_as::<_, ChecklistTemplate>(
            "SELECT id, name, category, created_at FROM checklist_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let mut conn = self.pool.acquire().await?;
        let items = template_items(&mut *conn, id).await?;

        Ok(Some((template, items)))
    }

    async fn update_template(
        &self,
        id: i64,
        changes: TemplateChanges,
    ) -> Result<(ChecklistTemplate, Vec<TemplateItem>), AppError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM checklist_templates WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(AppError::not_found("template not found"));
        }

        let template = sqlx::query_as::<_, ChecklistTemplate>(
            r#"
            UPDATE checklist_templates
            SET name = COALESCE($2, name), category = COALESCE($3, category)
            WHERE id = $1
            RETURNING id, name, category, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.category.map(|c| c.as_str().to_string()))
        .fetch_one(&mut *tx)
        .await?;

        // 条目给出时整体替换
        let items = match changes.items {
            Some(new_items) => {
                sqlx::query("DELETE FROM template_items WHERE template_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                insert_template_items(&mut *tx, id, &new_items).await?
            }
            None => template_items(&mut *tx, id).await?,
        };

        tx.commit().await?;
        Ok((template, items))
    }

    async fn delete_template(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM checklist_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("template not found"));
        }
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<ChecklistTemplate>, AppError> {
        let templates = sqlx::query_as::<_, ChecklistTemplate>(
            "SELECT id, name, category, created_at FROM checklist_templates ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }
}
