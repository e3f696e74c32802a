use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{ChecklistTemplate, TemplateCategory, TemplateItem};
use crate::store::{NewTemplate, NewTemplateItem, Store, TemplateChanges, TemplateStore};

#[derive(Debug, Deserialize)]
pub struct TemplateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub category: TemplateCategory,
    #[serde(default)]
    pub items: Vec<TemplateItemRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub category: Option<TemplateCategory>,
    pub items: Option<Vec<TemplateItemRequest>>,
}

#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    pub template: ChecklistTemplate,
    pub items: Vec<TemplateItem>,
}

fn convert_items(items: Vec<TemplateItemRequest>) -> Result<Vec<NewTemplateItem>, AppError> {
    let mut converted = Vec::with_capacity(items.len());
    for item in items {
        let quantity = item.quantity.unwrap_or(1);
        if item.name.trim().is_empty() {
            return Err(AppError::validation("items.name: must not be blank"));
        }
        if quantity <= 0 {
            return Err(AppError::validation("items.quantity: must be positive"));
        }
        converted.push(NewTemplateItem {
            name: item.name,
            description: item.description,
            quantity,
        });
    }
    Ok(converted)
}

impl ChecklistTemplate {
    pub async fn create(
        store: &dyn Store,
        req: CreateTemplateRequest,
    ) -> Result<TemplateDetail, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("name: must not be blank"));
        }

        let (template, items) = store
            .insert_template(NewTemplate {
                name: req.name,
                category: req.category,
                items: convert_items(req.items)?,
            })
            .await?;

        Ok(TemplateDetail { template, items })
    }

    pub async fn update(
        store: &dyn Store,
        template_id: i64,
        req: UpdateTemplateRequest,
    ) -> Result<TemplateDetail, AppError> {
        let items = match req.items {
            Some(items) => Some(convert_items(items)?),
            None => None,
        };

        let (template, items) = store
            .update_template(
                template_id,
                TemplateChanges {
                    name: req.name,
                    category: req.category,
                    items,
                },
            )
            .await?;

        Ok(TemplateDetail { template, items })
    }

    pub async fn remove(store: &dyn Store, template_id: i64) -> Result<(), AppError> {
        store.delete_template(template_id).await
    }
}
