use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::entities::CategoryModel;
use crate::errors::ServiceError;
use crate::repositories::CategoryStore;

/// Category maintenance and listing.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryStore>) -> Self {
        Self { categories }
    }

    pub async fn create(&self, name: String) -> Result<(), ServiceError> {
        let category = self.categories.create(name).await.map_err(|err| {
            error!("Failed to create category: {}", err);
            ServiceError::InternalError("error creating category".to_string())
        })?;

        info!(category_id = category.id, "Created category");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<CategoryResponse>, ServiceError> {
        let categories = self.categories.list().await.map_err(|err| {
            error!("Failed to list categories: {}", err);
            ServiceError::InternalError("error getting all categories".to_string())
        })?;

        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(category: CategoryModel) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}
