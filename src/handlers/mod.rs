pub mod carts;
pub mod categories;
pub mod checkout;
pub mod common;
pub mod customers;
pub mod health;
pub mod products;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::cache::SessionStore;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::repositories::{
    SeaOrmCartStore, SeaOrmCategoryStore, SeaOrmCustomerStore, SeaOrmProductCatalog,
    SeaOrmTransactionStore,
};
use crate::services::{
    CartService, CategoryService, CheckoutService, CustomerService, ProductCatalogService,
};

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductCatalogService>,
    pub carts: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
}

impl AppServices {
    /// Wires the sea-orm stores into the workflows. Each workflow receives
    /// only the store interfaces it needs.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        session_cache: Arc<dyn SessionStore>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        let cart_store = Arc::new(SeaOrmCartStore::new(db_pool.clone()));
        let transaction_store = Arc::new(SeaOrmTransactionStore::new(db_pool.clone()));
        let product_catalog = Arc::new(SeaOrmProductCatalog::new(db_pool.clone()));
        let category_store = Arc::new(SeaOrmCategoryStore::new(db_pool.clone()));
        let customer_store = Arc::new(SeaOrmCustomerStore::new(db_pool));

        let carts = Arc::new(CartService::new(
            cart_store.clone(),
            product_catalog.clone(),
            event_sender.clone(),
        ));
        let checkout = Arc::new(CheckoutService::new(
            cart_store,
            transaction_store,
            event_sender.clone(),
        ));
        let products = Arc::new(ProductCatalogService::new(
            product_catalog,
            category_store.clone(),
        ));
        let categories = Arc::new(CategoryService::new(category_store));
        let customers = Arc::new(CustomerService::new(
            customer_store,
            session_cache,
            auth_service,
            event_sender,
        ));

        Self {
            customers,
            categories,
            products,
            carts,
            checkout,
        }
    }
}
