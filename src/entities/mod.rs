/// Store entities module
pub mod cart_item;
pub mod category;
pub mod customer;
pub mod product;
pub mod shopping_cart;
pub mod transaction;
pub mod transaction_detail;

// Re-export entities
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use customer::{Entity as Customer, Model as CustomerModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use shopping_cart::{CartStatus, Entity as ShoppingCart, Model as ShoppingCartModel};
pub use transaction::{
    Entity as Transaction, Model as TransactionModel, PaymentMethod, TransactionStatus,
};
pub use transaction_detail::{Entity as TransactionDetail, Model as TransactionDetailModel};
