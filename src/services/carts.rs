use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::entities::CartStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::repositories::{
    CartQuery, CartStore, CartWithItems, DeleteCartItemRequest, NewCart, NewCartItem,
    ProductCatalog,
};

/// Cart workflow.
///
/// Owns the cart lifecycle up to checkout: creating or merging the
/// customer's single active cart from an add-items request, listing carts,
/// and removing line items from an active cart the caller owns.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn ProductCatalog>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            carts,
            catalog,
            event_sender,
        }
    }

    /// Adds line items to the customer's active cart, creating the cart
    /// when none exists.
    ///
    /// Every requested product id is validated for existence first, one
    /// concurrent lookup per item; the cart is never touched when any
    /// lookup fails. With no active cart the request becomes a new cart in
    /// Active status; with an existing active cart each item is merged in,
    /// incrementing the quantity of a line that already carries the same
    /// product.
    ///
    /// # Returns
    ///
    /// * `Ok(CartResponse)` - The customer's single active cart after the
    ///   create or merge
    /// * `Err(ServiceError::NotFound)` - A requested product does not exist
    /// * `Err(ServiceError)` - Lookup or store failure
    #[instrument(skip(self, input), fields(customer_id = input.customer_id))]
    pub async fn add_items(&self, input: AddItemsInput) -> Result<CartResponse, ServiceError> {
        self.check_products_exist(&input.items).await?;

        let active = self
            .carts
            .get_by_params(CartQuery {
                customer_id: Some(input.customer_id),
                status: Some(CartStatus::Active),
            })
            .await
            .map_err(|err| {
                error!("Failed to query active cart: {}", err);
                ServiceError::InternalError("error getting active cart".to_string())
            })?;

        let items: Vec<NewCartItem> = input
            .items
            .iter()
            .map(|item| NewCartItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        let cart = match active.into_iter().next() {
            None => {
                let created = self
                    .carts
                    .create(NewCart {
                        customer_id: input.customer_id,
                        status: CartStatus::Active,
                        items,
                    })
                    .await
                    .map_err(|err| {
                        error!("Failed to create cart: {}", err);
                        ServiceError::InternalError("error creating cart".to_string())
                    })?;

                self.event_sender
                    .send_or_log(Event::CartCreated {
                        cart_id: created.cart.id,
                        customer_id: input.customer_id,
                    })
                    .await;

                info!(cart_id = created.cart.id, "Created cart");
                created
            }
            Some(existing) => {
                let merged = self
                    .carts
                    .upsert(existing.cart.id, items)
                    .await
                    .map_err(|err| {
                        error!("Failed to merge cart items: {}", err);
                        ServiceError::InternalError("error upserting cart".to_string())
                    })?;

                self.event_sender
                    .send_or_log(Event::CartItemsMerged {
                        cart_id: merged.cart.id,
                        item_count: input.items.len(),
                    })
                    .await;

                info!(
                    cart_id = merged.cart.id,
                    item_count = input.items.len(),
                    "Merged items into cart"
                );
                merged
            }
        };

        Ok(cart.into())
    }

    /// Lists the customer's carts, optionally filtered by status.
    /// An empty list is a valid result, not an error.
    pub async fn get_by_params(
        &self,
        customer_id: i64,
        status: Option<CartStatus>,
    ) -> Result<Vec<CartResponse>, ServiceError> {
        let carts = self
            .carts
            .get_by_params(CartQuery {
                customer_id: Some(customer_id),
                status,
            })
            .await
            .map_err(|err| {
                error!("Failed to query carts: {}", err);
                ServiceError::InternalError("error getting cart by params".to_string())
            })?;

        Ok(carts.into_iter().map(CartResponse::from).collect())
    }

    /// Removes a line item, but only when it belongs to a cart owned by the
    /// acting customer and that cart is still Active.
    ///
    /// The initial lookup resolves the owning cart id; the store then
    /// performs one conditional delete re-checking ownership and status, so
    /// a state change between the two steps cannot remove the row.
    #[instrument(skip(self))]
    pub async fn delete_item(
        &self,
        cart_item_id: i64,
        customer_id: i64,
    ) -> Result<(), ServiceError> {
        let item = self
            .carts
            .get_item_by_id(cart_item_id)
            .await
            .map_err(|err| {
                error!("Failed to look up cart item: {}", err);
                ServiceError::InternalError("error getting cart item by id".to_string())
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("cart item not found: {}", cart_item_id))
            })?;

        let result = self
            .carts
            .delete_item(DeleteCartItemRequest {
                cart_id: item.cart_id,
                cart_item_id: item.id,
                customer_id,
                status: CartStatus::Active,
            })
            .await;

        match result {
            Ok(()) => {
                self.event_sender
                    .send_or_log(Event::CartItemRemoved { cart_item_id })
                    .await;
                info!(cart_item_id, "Removed cart item");
                Ok(())
            }
            Err(err @ ServiceError::NotFound(_)) => Err(err),
            Err(err) => {
                error!("Failed to delete cart item: {}", err);
                Err(ServiceError::InternalError(
                    "error deleting cart item".to_string(),
                ))
            }
        }
    }

    /// Fans out one existence lookup per line item and joins them all
    /// before inspecting the collected errors. Lookups already in flight
    /// are never cancelled; only the first buffered error is surfaced.
    async fn check_products_exist(&self, items: &[AddItemInput]) -> Result<(), ServiceError> {
        let (error_tx, mut error_rx) = mpsc::channel::<ServiceError>(items.len().max(1));
        let mut lookups = Vec::with_capacity(items.len());

        for item in items {
            let catalog = Arc::clone(&self.catalog);
            let error_tx = error_tx.clone();
            let product_id = item.product_id;

            lookups.push(tokio::spawn(async move {
                match catalog.get_by_id(product_id).await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        let _ = error_tx
                            .send(ServiceError::NotFound(format!(
                                "product not found: {}",
                                product_id
                            )))
                            .await;
                    }
                    Err(err) => {
                        let _ = error_tx
                            .send(ServiceError::InternalError(format!(
                                "error getting product by id: {}, {}",
                                product_id, err
                            )))
                            .await;
                    }
                }
            }));
        }
        drop(error_tx);

        for result in futures::future::join_all(lookups).await {
            if let Err(err) = result {
                return Err(ServiceError::InternalError(format!(
                    "product lookup task failed: {}",
                    err
                )));
            }
        }

        match error_rx.recv().await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Input for adding items to the customer's active cart
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemsInput {
    pub customer_id: i64,
    pub items: Vec<AddItemInput>,
}

/// One requested line item. The price is caller-supplied and carried for
/// the request shape only; persisted reads join the catalog price.
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemInput {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

/// Cart as rendered to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartResponse {
    pub id: i64,
    pub customer_id: i64,
    pub status: String,
    pub items: Vec<CartItemResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
}

impl From<CartWithItems> for CartResponse {
    fn from(cart: CartWithItems) -> Self {
        Self {
            id: cart.cart.id,
            customer_id: cart.cart.customer_id,
            status: cart.cart.status.label().to_string(),
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price: item.price.to_f64().unwrap_or_default(),
                })
                .collect(),
        }
    }
}
