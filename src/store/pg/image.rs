use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::Image;
use crate::store::{ImageStore, NewImage};

const IMAGE_COLUMNS: &str = "id, filename, original_filename, content_type, size, file_path, \
                             user_id, event_id, message_id, created_at";

#[async_trait]
impl ImageStore for PgStore {
    async fn insert_image(&self, new: NewImage) -> Result<Image, AppError> {
        let image = sqlx::query_as::<_, Image>(&format!(
            r#"
            INSERT INTO images
                (filename, original_filename, content_type, size, file_path,
                 user_id, event_id, message_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(&new.filename)
        .bind(&new.original_filename)
        .bind(&new.content_type)
        .bind(new.size)
        .bind(&new.file_path)
        .bind(new.user_id)
        .bind(new.event_id)
        .bind(new.message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(image)
    }

    async fn find_image(&self, id: i64) -> Result<Option<Image>, AppError> {
        let image = sqlx::query_as::<_, Image>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    async fn delete_image(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("image not found"));
        }
        Ok(())
    }
}
