use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::entities::{CartStatus, PaymentMethod, TransactionStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::repositories::{
    CartStore, CartWithItems, NewTransaction, NewTransactionDetail, TransactionStore,
    TransactionWithDetails,
};

/// Checkout workflow.
///
/// Converts an Active cart into a transaction: validates the payment
/// method, checks cart ownership and state, derives the transaction from
/// the cart's line items, and hands it to the transaction store, which
/// flips the cart to Pending in the same atomic write.
#[derive(Clone)]
pub struct CheckoutService {
    carts: Arc<dyn CartStore>,
    transactions: Arc<dyn TransactionStore>,
    event_sender: Arc<EventSender>,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        transactions: Arc<dyn TransactionStore>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            carts,
            transactions,
            event_sender,
        }
    }

    /// Checks out a cart, in strict order: payment-method validation, cart
    /// fetch, ownership check, Active-status check, derivation, persist.
    /// The first failing step returns; no transaction row and no cart
    /// status change exist after any failure.
    ///
    /// # Returns
    ///
    /// * `Ok(TransactionResponse)` - The persisted transaction, re-read
    ///   from the store with joined product names
    /// * `Err(ServiceError::ValidationError)` - Unrecognized payment
    ///   method, foreign cart, non-Active cart, or empty cart
    /// * `Err(ServiceError::NotFound)` - Cart does not exist
    #[instrument(skip(self, input), fields(customer_id = input.customer_id, cart_id = input.cart_id))]
    pub async fn checkout(&self, input: CheckoutInput) -> Result<TransactionResponse, ServiceError> {
        let payment_method = PaymentMethod::from_value(input.payment_method)
            .ok_or_else(|| ServiceError::ValidationError("invalid payment method".to_string()))?;

        let cart = self
            .carts
            .get_by_id(input.cart_id)
            .await
            .map_err(|err| {
                error!("Failed to fetch cart: {}", err);
                ServiceError::InternalError("error getting cart by id".to_string())
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("cart not found: {}", input.cart_id)))?;

        if cart.cart.customer_id != input.customer_id {
            return Err(ServiceError::ValidationError(
                "cart does not belong to the customer".to_string(),
            ));
        }

        if cart.cart.status != CartStatus::Active {
            return Err(ServiceError::ValidationError(
                "cart is not active".to_string(),
            ));
        }

        let derived = derive_transaction(&cart, payment_method)?;

        let created = self.transactions.create(derived).await.map_err(|err| {
            error!("Failed to create transaction: {}", err);
            ServiceError::InternalError("error creating transaction".to_string())
        })?;

        self.event_sender
            .send_or_log(Event::TransactionCreated {
                transaction_id: created.transaction.id,
                cart_id: cart.cart.id,
            })
            .await;

        info!(
            transaction_id = created.transaction.id,
            cart_id = cart.cart.id,
            "Checkout completed"
        );
        Ok(created.into())
    }

    /// Fetches a transaction by id.
    pub async fn get_transaction(&self, id: i64) -> Result<TransactionResponse, ServiceError> {
        let transaction = self
            .transactions
            .get_by_id(id)
            .await
            .map_err(|err| {
                error!("Failed to fetch transaction: {}", err);
                ServiceError::InternalError("error getting transaction by id".to_string())
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("transaction not found: {}", id)))?;

        Ok(transaction.into())
    }
}

/// Derives the transaction to persist from the cart's current line items:
/// fresh idempotency key, InProgress status, total as the exact sum of
/// price times quantity, and one detail line per cart line with the price
/// captured as joined at read time. An empty cart cannot be checked out.
fn derive_transaction(
    cart: &CartWithItems,
    payment_method: PaymentMethod,
) -> Result<NewTransaction, ServiceError> {
    if cart.items.is_empty() {
        return Err(ServiceError::ValidationError(
            "cannot checkout an empty cart".to_string(),
        ));
    }

    let mut total_amount = Decimal::ZERO;
    let mut details = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
        total_amount += item.price * Decimal::from(item.quantity);
        details.push(NewTransactionDetail {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        });
    }

    Ok(NewTransaction {
        idempotency_key: Uuid::new_v4().to_string(),
        customer_id: cart.cart.customer_id,
        cart_id: cart.cart.id,
        status: TransactionStatus::InProgress,
        total_amount,
        payment_method,
        details,
    })
}

/// Input for checking out a cart. The payment method arrives as its raw
/// wire value and is validated against the enumeration first.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub customer_id: i64,
    pub cart_id: i64,
    pub payment_method: i32,
}

/// Transaction as rendered to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub idempotency_key: String,
    pub customer_id: i64,
    #[serde(rename = "shopping_cart_id")]
    pub cart_id: i64,
    pub status: String,
    pub total_amount: f64,
    pub payment_method: String,
    #[serde(rename = "transaction_details")]
    pub details: Vec<TransactionDetailResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetailResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
}

impl From<TransactionWithDetails> for TransactionResponse {
    fn from(transaction: TransactionWithDetails) -> Self {
        Self {
            id: transaction.transaction.id,
            idempotency_key: transaction.transaction.idempotency_key,
            customer_id: transaction.transaction.customer_id,
            cart_id: transaction.transaction.cart_id,
            status: transaction.transaction.status.label().to_string(),
            total_amount: transaction
                .transaction
                .total_amount
                .to_f64()
                .unwrap_or_default(),
            payment_method: transaction.transaction.payment_method.label().to_string(),
            details: transaction
                .details
                .into_iter()
                .map(|detail| TransactionDetailResponse {
                    id: detail.id,
                    product_id: detail.product_id,
                    product_name: detail.product_name,
                    quantity: detail.quantity,
                    price: detail.price.to_f64().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ShoppingCartModel, TransactionModel};
    use crate::repositories::{
        CartItemView, MockCartStore, MockTransactionStore, TransactionDetailView,
    };
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn service(carts: MockCartStore, transactions: MockTransactionStore) -> CheckoutService {
        let (tx, _rx) = mpsc::channel(16);
        CheckoutService::new(
            Arc::new(carts),
            Arc::new(transactions),
            Arc::new(EventSender::new(tx)),
        )
    }

    fn cart_with_items(cart_id: i64, customer_id: i64, status: CartStatus) -> CartWithItems {
        CartWithItems {
            cart: ShoppingCartModel {
                id: cart_id,
                customer_id,
                status,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items: vec![CartItemView {
                id: 1,
                cart_id,
                product_id: 1,
                product_name: "Keyboard".to_string(),
                quantity: 3,
                price: dec!(10000),
            }],
        }
    }

    fn persisted(transaction: &NewTransaction) -> TransactionWithDetails {
        TransactionWithDetails {
            transaction: TransactionModel {
                id: 1,
                idempotency_key: transaction.idempotency_key.clone(),
                customer_id: transaction.customer_id,
                cart_id: transaction.cart_id,
                status: transaction.status,
                total_amount: transaction.total_amount,
                payment_method: transaction.payment_method,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            details: transaction
                .details
                .iter()
                .enumerate()
                .map(|(i, detail)| TransactionDetailView {
                    id: i as i64 + 1,
                    transaction_id: 1,
                    product_id: detail.product_id,
                    product_name: "Keyboard".to_string(),
                    quantity: detail.quantity,
                    price: detail.price,
                })
                .collect(),
        }
    }

    fn input(customer_id: i64, cart_id: i64, payment_method: i32) -> CheckoutInput {
        CheckoutInput {
            customer_id,
            cart_id,
            payment_method,
        }
    }

    // ==================== checkout failures ====================

    #[tokio::test]
    async fn checkout_rejects_unrecognized_payment_method() {
        // No expectations: the cart must not even be fetched.
        let err = service(MockCartStore::new(), MockTransactionStore::new())
            .checkout(input(1, 1, 9))
            .await
            .expect_err("invalid payment method must fail");

        match err {
            ServiceError::ValidationError(message) => {
                assert_eq!(message, "invalid payment method");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn checkout_fails_when_cart_missing() {
        let mut carts = MockCartStore::new();
        carts.expect_get_by_id().with(eq(7)).returning(|_| Ok(None));

        let err = service(carts, MockTransactionStore::new())
            .checkout(input(1, 7, 1))
            .await
            .expect_err("missing cart must fail");

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn checkout_rejects_foreign_cart() {
        let mut carts = MockCartStore::new();
        carts
            .expect_get_by_id()
            .returning(|_| Ok(Some(cart_with_items(1, 2, CartStatus::Active))));

        let err = service(carts, MockTransactionStore::new())
            .checkout(input(1, 1, 1))
            .await
            .expect_err("foreign cart must fail");

        match err {
            ServiceError::ValidationError(message) => {
                assert_eq!(message, "cart does not belong to the customer");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn checkout_rejects_cart_that_is_not_active() {
        let mut carts = MockCartStore::new();
        carts
            .expect_get_by_id()
            .returning(|_| Ok(Some(cart_with_items(1, 1, CartStatus::Pending))));

        let err = service(carts, MockTransactionStore::new())
            .checkout(input(1, 1, 1))
            .await
            .expect_err("pending cart must fail");

        match err {
            ServiceError::ValidationError(message) => assert_eq!(message, "cart is not active"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn checkout_rejects_empty_cart() {
        let mut carts = MockCartStore::new();
        carts.expect_get_by_id().returning(|_| {
            Ok(Some(CartWithItems {
                cart: ShoppingCartModel {
                    id: 1,
                    customer_id: 1,
                    status: CartStatus::Active,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
                items: vec![],
            }))
        });

        let err = service(carts, MockTransactionStore::new())
            .checkout(input(1, 1, 1))
            .await
            .expect_err("empty cart must fail");

        match err {
            ServiceError::ValidationError(message) => {
                assert_eq!(message, "cannot checkout an empty cart");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    // ==================== checkout success ====================

    #[tokio::test]
    async fn checkout_derives_and_persists_the_transaction() {
        let mut carts = MockCartStore::new();
        let mut transactions = MockTransactionStore::new();

        carts
            .expect_get_by_id()
            .returning(|_| Ok(Some(cart_with_items(1, 1, CartStatus::Active))));

        transactions
            .expect_create()
            .withf(|transaction| {
                transaction.customer_id == 1
                    && transaction.cart_id == 1
                    && transaction.status == TransactionStatus::InProgress
                    && transaction.payment_method == PaymentMethod::CreditCard
                    && transaction.total_amount == dec!(30000)
                    && transaction.details.len() == 1
                    && transaction.details[0].price == dec!(10000)
                    && !transaction.idempotency_key.is_empty()
            })
            .returning(|transaction| Ok(persisted(&transaction)));

        let response = service(carts, transactions)
            .checkout(input(1, 1, 1))
            .await
            .expect("checkout");

        assert_eq!(response.total_amount, 30000.0);
        assert_eq!(response.status, "IN PROGRESS");
        assert_eq!(response.payment_method, "CREDIT CARD");
        assert_eq!(response.details.len(), 1);
        assert_eq!(response.details[0].product_name, "Keyboard");
    }

    #[test]
    fn derivation_generates_a_fresh_idempotency_key_per_call() {
        let cart = cart_with_items(1, 1, CartStatus::Active);

        let first = derive_transaction(&cart, PaymentMethod::Cash).expect("derive");
        let second = derive_transaction(&cart, PaymentMethod::Cash).expect("derive");

        assert_ne!(first.idempotency_key, second.idempotency_key);
    }

    #[test]
    fn derivation_sums_price_times_quantity_exactly() {
        let mut cart = cart_with_items(1, 1, CartStatus::Active);
        cart.items.push(CartItemView {
            id: 2,
            cart_id: 1,
            product_id: 2,
            product_name: "Mouse".to_string(),
            quantity: 2,
            price: dec!(2500.50),
        });

        let derived = derive_transaction(&cart, PaymentMethod::PayPal).expect("derive");

        // 3 x 10000 + 2 x 2500.50
        assert_eq!(derived.total_amount, dec!(35001.00));
        assert_eq!(derived.details.len(), 2);
    }

    // ==================== get_transaction ====================

    #[tokio::test]
    async fn get_transaction_fails_when_missing() {
        let mut transactions = MockTransactionStore::new();
        transactions
            .expect_get_by_id()
            .with(eq(3))
            .returning(|_| Ok(None));

        let err = service(MockCartStore::new(), transactions)
            .get_transaction(3)
            .await
            .expect_err("missing transaction must fail");

        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
