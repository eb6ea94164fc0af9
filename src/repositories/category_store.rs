use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::sync::Arc;

use crate::entities::{category, Category, CategoryModel};
use crate::errors::ServiceError;

use super::CategoryStore;

/// sea-orm implementation of [`CategoryStore`].
#[derive(Clone)]
pub struct SeaOrmCategoryStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCategoryStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryStore for SeaOrmCategoryStore {
    async fn create(&self, name: String) -> Result<CategoryModel, ServiceError> {
        let now = Utc::now();

        let inserted = category::ActiveModel {
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_by_id(&self, category_id: i64) -> Result<Option<CategoryModel>, ServiceError> {
        Ok(Category::find_by_id(category_id).one(&*self.db).await?)
    }

    async fn list(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Id)
            .all(&*self.db)
            .await?)
    }
}
