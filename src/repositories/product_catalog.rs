use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use std::sync::Arc;

use crate::entities::{category, product, Product, ProductModel};
use crate::errors::ServiceError;

use super::{NewProduct, ProductCatalog, ProductQuery, ProductView};

/// sea-orm implementation of [`ProductCatalog`].
#[derive(Clone)]
pub struct SeaOrmProductCatalog {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmProductCatalog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCatalog for SeaOrmProductCatalog {
    async fn get_by_id(&self, product_id: i64) -> Result<Option<ProductModel>, ServiceError> {
        Ok(Product::find_by_id(product_id).one(&*self.db).await?)
    }

    async fn create(&self, new_product: NewProduct) -> Result<ProductModel, ServiceError> {
        let now = Utc::now();

        let inserted = product::ActiveModel {
            name: Set(new_product.name),
            description: Set(new_product.description),
            price: Set(new_product.price),
            stock_quantity: Set(new_product.stock_quantity),
            category_id: Set(new_product.category_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(inserted)
    }

    async fn list(&self, query: ProductQuery) -> Result<Vec<ProductView>, ServiceError> {
        let mut find = Product::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .select_only()
            .column_as(product::Column::Id, "id")
            .column_as(product::Column::Name, "name")
            .column_as(product::Column::Description, "description")
            .column_as(product::Column::Price, "price")
            .column_as(product::Column::StockQuantity, "stock_quantity")
            .column_as(product::Column::CategoryId, "category_id")
            .column_as(category::Column::Name, "category_name");

        if let Some(category_id) = query.category_id {
            find = find.filter(product::Column::CategoryId.eq(category_id));
        }

        let offset = query.page.saturating_sub(1) * query.limit;
        let products = find
            .order_by_asc(product::Column::Id)
            .limit(query.limit)
            .offset(offset)
            .into_model::<ProductView>()
            .all(&*self.db)
            .await?;

        Ok(products)
    }
}
