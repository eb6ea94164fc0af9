//! Store layer.
//!
//! Each store is a trait so the workflows receive only the persistence
//! surface they need; the sea-orm implementations live in the submodules.
//! All multi-statement writes run inside a single database transaction and
//! re-read the written aggregate after commit.

pub mod cart_store;
pub mod category_store;
pub mod customer_store;
pub mod product_catalog;
pub mod transaction_store;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use serde::Serialize;

use crate::entities::{
    CartItemModel, CartStatus, CategoryModel, CustomerModel, PaymentMethod, ProductModel,
    ShoppingCartModel, TransactionModel, TransactionStatus,
};
use crate::errors::ServiceError;

pub use cart_store::SeaOrmCartStore;
pub use category_store::SeaOrmCategoryStore;
pub use customer_store::SeaOrmCustomerStore;
pub use product_catalog::SeaOrmProductCatalog;
pub use transaction_store::SeaOrmTransactionStore;

/// Filter for cart lookups; unset fields are not constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartQuery {
    pub customer_id: Option<i64>,
    pub status: Option<CartStatus>,
}

/// Cart to be created, always with its initial line items.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCart {
    pub customer_id: i64,
    pub status: CartStatus,
    pub items: Vec<NewCartItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_id: i64,
    pub quantity: i32,
}

/// Cart line item as read back from the store; price and product name come
/// from the joined product row.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct CartItemView {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartWithItems {
    pub cart: ShoppingCartModel,
    pub items: Vec<CartItemView>,
}

/// Conditional line-item deletion: the delete only applies when the item
/// belongs to the given cart, the cart is owned by the given customer, and
/// the cart is in the required status.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCartItemRequest {
    pub cart_id: i64,
    pub cart_item_id: i64,
    pub customer_id: i64,
    pub status: CartStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub idempotency_key: String,
    pub customer_id: i64,
    pub cart_id: i64,
    pub status: TransactionStatus,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub details: Vec<NewTransactionDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransactionDetail {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct TransactionDetailView {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithDetails {
    pub transaction: TransactionModel,
    pub details: Vec<TransactionDetailView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: i64,
}

/// Filter and paging for product listings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub category_id: Option<i64>,
    pub limit: u64,
    pub page: u64,
}

/// Product as listed, joined with its category name.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub username: String,
    pub email: String,
    /// Already hashed; stores never see the raw password.
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

/// Cart and cart-line-item persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Inserts the cart row and one row per line item inside one atomic
    /// transaction, then re-reads the full cart by id.
    async fn create(&self, cart: NewCart) -> Result<CartWithItems, ServiceError>;

    /// Filters carts by the query; returns an empty list (not an error)
    /// when no cart matches.
    async fn get_by_params(&self, query: CartQuery) -> Result<Vec<CartWithItems>, ServiceError>;

    /// For each item, inserts a new row or increments the existing row's
    /// quantity keyed by (product id, cart id), all inside one atomic
    /// transaction, then re-reads the full cart by id.
    async fn upsert(
        &self,
        cart_id: i64,
        items: Vec<NewCartItem>,
    ) -> Result<CartWithItems, ServiceError>;

    /// Conditional delete guarded on cart ownership and status; zero
    /// affected rows is a domain error, not a silent no-op.
    async fn delete_item(&self, request: DeleteCartItemRequest) -> Result<(), ServiceError>;

    async fn get_item_by_id(
        &self,
        cart_item_id: i64,
    ) -> Result<Option<CartItemModel>, ServiceError>;

    async fn get_by_id(&self, cart_id: i64) -> Result<Option<CartWithItems>, ServiceError>;
}

/// Transaction and transaction-detail persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts the transaction header, one row per detail line, and flips
    /// the source cart to Pending, all inside one atomic transaction; any
    /// failure rolls back every statement. Re-reads the full transaction
    /// by id after commit.
    async fn create(
        &self,
        transaction: NewTransaction,
    ) -> Result<TransactionWithDetails, ServiceError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<TransactionWithDetails>, ServiceError>;
}

/// Product catalog lookups and maintenance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_by_id(&self, product_id: i64) -> Result<Option<ProductModel>, ServiceError>;

    async fn create(&self, product: NewProduct) -> Result<ProductModel, ServiceError>;

    async fn list(&self, query: ProductQuery) -> Result<Vec<ProductView>, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create(&self, name: String) -> Result<CategoryModel, ServiceError>;

    async fn get_by_id(&self, category_id: i64) -> Result<Option<CategoryModel>, ServiceError>;

    async fn list(&self) -> Result<Vec<CategoryModel>, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create(&self, customer: NewCustomer) -> Result<CustomerModel, ServiceError>;

    async fn get_by_username(&self, username: &str)
        -> Result<Option<CustomerModel>, ServiceError>;
}
