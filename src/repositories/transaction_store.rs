use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::sync::Arc;

use crate::entities::{
    product, shopping_cart, transaction, transaction_detail, CartStatus, ShoppingCart, Transaction,
    TransactionDetail,
};
use crate::errors::ServiceError;

use super::{NewTransaction, TransactionDetailView, TransactionStore, TransactionWithDetails};

/// sea-orm implementation of [`TransactionStore`].
#[derive(Clone)]
pub struct SeaOrmTransactionStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTransactionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_transaction(
        &self,
        id: i64,
    ) -> Result<Option<TransactionWithDetails>, ServiceError> {
        let Some(header) = Transaction::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let details = TransactionDetail::find()
            .filter(transaction_detail::Column::TransactionId.eq(id))
            .join(
                JoinType::InnerJoin,
                transaction_detail::Relation::Product.def(),
            )
            .select_only()
            .column_as(transaction_detail::Column::Id, "id")
            .column_as(transaction_detail::Column::TransactionId, "transaction_id")
            .column_as(transaction_detail::Column::ProductId, "product_id")
            .column_as(product::Column::Name, "product_name")
            .column_as(transaction_detail::Column::Quantity, "quantity")
            .column_as(transaction_detail::Column::Price, "price")
            .order_by_asc(transaction_detail::Column::Id)
            .into_model::<TransactionDetailView>()
            .all(&*self.db)
            .await?;

        Ok(Some(TransactionWithDetails {
            transaction: header,
            details,
        }))
    }
}

#[async_trait]
impl TransactionStore for SeaOrmTransactionStore {
    async fn create(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<TransactionWithDetails, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let inserted = transaction::ActiveModel {
            idempotency_key: Set(new_transaction.idempotency_key.clone()),
            customer_id: Set(new_transaction.customer_id),
            cart_id: Set(new_transaction.cart_id),
            status: Set(new_transaction.status),
            total_amount: Set(new_transaction.total_amount),
            payment_method: Set(new_transaction.payment_method),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for detail in &new_transaction.details {
            transaction_detail::ActiveModel {
                transaction_id: Set(inserted.id),
                product_id: Set(detail.product_id),
                quantity: Set(detail.quantity),
                price: Set(detail.price),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        // The source cart leaves Active status in the same transaction that
        // writes the checkout; neither persists without the other.
        ShoppingCart::update_many()
            .col_expr(
                shopping_cart::Column::Status,
                Expr::value(CartStatus::Pending),
            )
            .col_expr(shopping_cart::Column::UpdatedAt, Expr::value(now))
            .filter(shopping_cart::Column::Id.eq(new_transaction.cart_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.load_transaction(inserted.id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("transaction {} missing after create", inserted.id))
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TransactionWithDetails>, ServiceError> {
        self.load_transaction(id).await
    }
}
