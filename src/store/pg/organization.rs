use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::Organization;
use crate::store::{NewOrganization, OrganizationChanges, OrganizationStore};

const ORG_COLUMNS: &str = "id, name, description, owner_id, created_at";

#[async_trait]
impl OrganizationStore for PgStore {
    async fn insert_organization(&self, new: NewOrganization) -> Result<Organization, AppError> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            r#"
            INSERT INTO organizations (name, description, owner_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {ORG_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(organization)
    }

    async fn find_organization(&self, id: i64) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORG_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    async fn update_organization(
        &self,
        id: i64,
        changes: OrganizationChanges,
    ) -> Result<Organization, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORG_COLUMNS} FROM organizations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::not_found("organization not found"));
        };

        let description = changes.description.apply(current.description);

        let organization = sqlx::query_as::<_, Organization>(&format!(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name), description = $3
            WHERE id = $1
            RETURNING {ORG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(organization)
    }

    async fn delete_organization(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("organization not found"));
        }
        Ok(())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, AppError> {
        let organizations = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORG_COLUMNS} FROM organizations ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(organizations)
    }
}
