use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::sync::Arc;

use crate::entities::{cart_item, product, shopping_cart, CartItem, CartItemModel, ShoppingCart};
use crate::errors::ServiceError;

use super::{CartItemView, CartQuery, CartStore, CartWithItems, DeleteCartItemRequest, NewCart,
    NewCartItem};

/// sea-orm implementation of [`CartStore`].
#[derive(Clone)]
pub struct SeaOrmCartStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCartStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_cart<C: ConnectionTrait>(
        conn: &C,
        cart_id: i64,
    ) -> Result<Option<CartWithItems>, ServiceError> {
        let Some(cart) = ShoppingCart::find_by_id(cart_id).one(conn).await? else {
            return Ok(None);
        };

        let items = Self::load_items(conn, cart_id).await?;
        Ok(Some(CartWithItems { cart, items }))
    }

    /// Line items joined with the product row for current price and name,
    /// ordered by item id.
    async fn load_items<C: ConnectionTrait>(
        conn: &C,
        cart_id: i64,
    ) -> Result<Vec<CartItemView>, ServiceError> {
        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .join(JoinType::InnerJoin, cart_item::Relation::Product.def())
            .select_only()
            .column_as(cart_item::Column::Id, "id")
            .column_as(cart_item::Column::CartId, "cart_id")
            .column_as(cart_item::Column::ProductId, "product_id")
            .column_as(product::Column::Name, "product_name")
            .column_as(cart_item::Column::Quantity, "quantity")
            .column_as(product::Column::Price, "price")
            .order_by_asc(cart_item::Column::Id)
            .into_model::<CartItemView>()
            .all(conn)
            .await?;

        Ok(items)
    }
}

#[async_trait]
impl CartStore for SeaOrmCartStore {
    async fn create(&self, cart: NewCart) -> Result<CartWithItems, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let inserted = shopping_cart::ActiveModel {
            customer_id: Set(cart.customer_id),
            status: Set(cart.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for item in &cart.items {
            cart_item::ActiveModel {
                cart_id: Set(inserted.id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        Self::load_cart(&*self.db, inserted.id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("cart {} missing after create", inserted.id))
        })
    }

    async fn get_by_params(&self, query: CartQuery) -> Result<Vec<CartWithItems>, ServiceError> {
        let mut find = ShoppingCart::find();

        if let Some(customer_id) = query.customer_id {
            find = find.filter(shopping_cart::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = query.status {
            find = find.filter(shopping_cart::Column::Status.eq(status));
        }

        let carts = find
            .order_by_asc(shopping_cart::Column::Id)
            .all(&*self.db)
            .await?;

        let mut result = Vec::with_capacity(carts.len());
        for cart in carts {
            let items = Self::load_items(&*self.db, cart.id).await?;
            result.push(CartWithItems { cart, items });
        }

        Ok(result)
    }

    async fn upsert(
        &self,
        cart_id: i64,
        items: Vec<NewCartItem>,
    ) -> Result<CartWithItems, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        for item in &items {
            let insert = cart_item::ActiveModel {
                cart_id: Set(cart_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };

            // Keyed by the unique (product_id, shopping_cart_id) index: a
            // conflicting insert increments the existing row's quantity.
            CartItem::insert(insert)
                .on_conflict(
                    OnConflict::columns([cart_item::Column::ProductId, cart_item::Column::CartId])
                        .value(
                            cart_item::Column::Quantity,
                            Expr::col((cart_item::Entity, cart_item::Column::Quantity))
                                .add(item.quantity),
                        )
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Self::load_cart(&*self.db, cart_id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("cart {} missing after upsert", cart_id))
        })
    }

    async fn delete_item(&self, request: DeleteCartItemRequest) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let cart_guard = Query::select()
            .expr(Expr::val(1))
            .from(shopping_cart::Entity)
            .and_where(
                Expr::col((shopping_cart::Entity, shopping_cart::Column::Id)).eq(request.cart_id),
            )
            .and_where(
                Expr::col((shopping_cart::Entity, shopping_cart::Column::Status))
                    .eq(request.status),
            )
            .and_where(
                Expr::col((shopping_cart::Entity, shopping_cart::Column::CustomerId))
                    .eq(request.customer_id),
            )
            .to_owned();

        let result = CartItem::delete_many()
            .filter(cart_item::Column::Id.eq(request.cart_item_id))
            .filter(Expr::exists(cart_guard))
            .exec(&txn)
            .await?;

        // Zero affected rows means the item vanished, the cart changed
        // status, or the caller does not own it.
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(ServiceError::NotFound(format!(
                "no active cart found with cart item id: {}",
                request.cart_item_id
            )));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn get_item_by_id(
        &self,
        cart_item_id: i64,
    ) -> Result<Option<CartItemModel>, ServiceError> {
        Ok(CartItem::find_by_id(cart_item_id).one(&*self.db).await?)
    }

    async fn get_by_id(&self, cart_id: i64) -> Result<Option<CartWithItems>, ServiceError> {
        Self::load_cart(&*self.db, cart_id).await
    }
}
