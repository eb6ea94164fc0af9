use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::errors::ServiceError;
use crate::repositories::{CategoryStore, NewProduct, ProductCatalog, ProductQuery, ProductView};

/// Catalog maintenance and listing. Products must reference an existing
/// category.
#[derive(Clone)]
pub struct ProductCatalogService {
    products: Arc<dyn ProductCatalog>,
    categories: Arc<dyn CategoryStore>,
}

impl ProductCatalogService {
    pub fn new(products: Arc<dyn ProductCatalog>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            products,
            categories,
        }
    }

    #[instrument(skip(self, input), fields(category_id = input.category_id))]
    pub async fn create(&self, input: CreateProductInput) -> Result<(), ServiceError> {
        let category = self
            .categories
            .get_by_id(input.category_id)
            .await
            .map_err(|err| {
                error!("Failed to fetch category: {}", err);
                ServiceError::InternalError("error getting category by id".to_string())
            })?
            .ok_or_else(|| ServiceError::NotFound("category not found".to_string()))?;

        let product = self
            .products
            .create(NewProduct {
                name: input.name,
                description: input.description,
                price: input.price,
                stock_quantity: input.stock_quantity,
                category_id: category.id,
            })
            .await
            .map_err(|err| {
                error!("Failed to create product: {}", err);
                ServiceError::InternalError("error creating product".to_string())
            })?;

        info!(product_id = product.id, "Created product");
        Ok(())
    }

    pub async fn list(&self, query: ProductQuery) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = self.products.list(query).await.map_err(|err| {
            error!("Failed to list products: {}", err);
            ServiceError::InternalError("error getting all products".to_string())
        })?;

        Ok(products.into_iter().map(ProductResponse::from).collect())
    }
}

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i32,
    pub category_id: i64,
    pub category_name: String,
}

impl From<ProductView> for ProductResponse {
    fn from(product: ProductView) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price.to_f64().unwrap_or_default(),
            stock_quantity: product.stock_quantity,
            category_id: product.category_id,
            category_name: product.category_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CategoryModel;
    use crate::repositories::{MockCategoryStore, MockProductCatalog};
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn input() -> CreateProductInput {
        CreateProductInput {
            name: "Keyboard".to_string(),
            description: None,
            price: dec!(10000),
            stock_quantity: 5,
            category_id: 1,
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_category() {
        // No product-store expectation: nothing may be written when the
        // category does not exist.
        let products = MockProductCatalog::new();
        let mut categories = MockCategoryStore::new();

        categories
            .expect_get_by_id()
            .with(eq(1))
            .returning(|_| Ok(None));

        let err = ProductCatalogService::new(Arc::new(products), Arc::new(categories))
            .create(input())
            .await
            .expect_err("missing category must fail");

        match err {
            ServiceError::NotFound(message) => assert_eq!(message, "category not found"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_inserts_product_under_existing_category() {
        let mut products = MockProductCatalog::new();
        let mut categories = MockCategoryStore::new();

        categories.expect_get_by_id().returning(|id| {
            Ok(Some(CategoryModel {
                id,
                name: "Peripherals".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        products
            .expect_create()
            .withf(|product| product.category_id == 1 && product.name == "Keyboard")
            .returning(|product| {
                Ok(crate::entities::ProductModel {
                    id: 1,
                    name: product.name,
                    description: product.description,
                    price: product.price,
                    stock_quantity: product.stock_quantity,
                    category_id: product.category_id,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        ProductCatalogService::new(Arc::new(products), Arc::new(categories))
            .create(input())
            .await
            .expect("create product");
    }
}
