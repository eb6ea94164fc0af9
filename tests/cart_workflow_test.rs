mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

use online_store_api::{
    entities::{CartItem, CartStatus, ShoppingCart},
    errors::ServiceError,
    services::carts::{AddItemInput, AddItemsInput},
};

fn add_input(customer_id: i64, items: Vec<(i64, i32)>) -> AddItemsInput {
    AddItemsInput {
        customer_id,
        items: items
            .into_iter()
            .map(|(product_id, quantity)| AddItemInput {
                product_id,
                quantity,
                price: dec!(10000),
            })
            .collect(),
    }
}

#[tokio::test]
async fn adding_items_creates_a_single_active_cart() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let product_id = app.seed_product("Keyboard", dec!(10000), category_id).await;

    let cart = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(product_id, 2)]))
        .await
        .expect("add items");

    assert_eq!(cart.id, 1);
    assert_eq!(cart.customer_id, customer_id);
    assert_eq!(cart.status, "ACTIVE");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_id, product_id);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].price, 10000.0);
    assert_eq!(cart.items[0].product_name, "Keyboard");
}

#[tokio::test]
async fn re_adding_the_same_product_increments_the_line_quantity() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let product_id = app.seed_product("Keyboard", dec!(10000), category_id).await;

    let first = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(product_id, 2)]))
        .await
        .expect("first add");

    let second = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(product_id, 1)]))
        .await
        .expect("second add");

    assert_eq!(second.id, first.id);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].quantity, 3);

    // No duplicate row was written for the (product, cart) pair
    let item_rows = CartItem::find().count(&*app.state.db).await.unwrap();
    assert_eq!(item_rows, 1);
}

#[tokio::test]
async fn adding_a_new_product_appends_a_line_to_the_same_cart() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let keyboard_id = app.seed_product("Keyboard", dec!(10000), category_id).await;
    let mouse_id = app.seed_product("Mouse", dec!(2500), category_id).await;

    app.state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(keyboard_id, 1)]))
        .await
        .expect("first add");

    let cart = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(mouse_id, 2)]))
        .await
        .expect("second add");

    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.items[0].product_id, keyboard_id);
    assert_eq!(cart.items[1].product_id, mouse_id);
    assert_eq!(cart.items[1].product_name, "Mouse");
    assert_eq!(cart.items[1].price, 2500.0);
}

#[tokio::test]
async fn repeated_adds_never_produce_a_second_active_cart() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let keyboard_id = app.seed_product("Keyboard", dec!(10000), category_id).await;
    let mouse_id = app.seed_product("Mouse", dec!(2500), category_id).await;

    for (product_id, quantity) in [(keyboard_id, 1), (mouse_id, 2), (keyboard_id, 3)] {
        app.state
            .services
            .carts
            .add_items(add_input(customer_id, vec![(product_id, quantity)]))
            .await
            .expect("add items");
    }

    let active = app
        .state
        .services
        .carts
        .get_by_params(customer_id, Some(CartStatus::Active))
        .await
        .expect("list active carts");

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].items.len(), 2);
    // 1 + 3 merged into the keyboard line
    assert_eq!(active[0].items[0].quantity, 4);
}

#[tokio::test]
async fn unknown_product_fails_the_add_without_any_mutation() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let product_id = app.seed_product("Keyboard", dec!(10000), category_id).await;

    let err = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(product_id, 1), (99, 1)]))
        .await
        .expect_err("unknown product must fail");

    match err {
        ServiceError::NotFound(message) => assert_eq!(message, "product not found: 99"),
        other => panic!("unexpected error: {:?}", other),
    }

    // Validation failed before any write: no cart and no line item exists
    assert_eq!(ShoppingCart::find().count(&*app.state.db).await.unwrap(), 0);
    assert_eq!(CartItem::find().count(&*app.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn carts_are_isolated_per_customer() {
    let app = TestApp::new().await;
    let alice_id = app.seed_customer("alice").await;
    let bob_id = app.seed_customer("bob").await;
    let category_id = app.seed_category("peripherals").await;
    let product_id = app.seed_product("Keyboard", dec!(10000), category_id).await;

    let alice_cart = app
        .state
        .services
        .carts
        .add_items(add_input(alice_id, vec![(product_id, 1)]))
        .await
        .expect("alice add");

    let bob_cart = app
        .state
        .services
        .carts
        .add_items(add_input(bob_id, vec![(product_id, 5)]))
        .await
        .expect("bob add");

    assert_ne!(alice_cart.id, bob_cart.id);

    let alice_carts = app
        .state
        .services
        .carts
        .get_by_params(alice_id, None)
        .await
        .expect("list alice carts");
    assert_eq!(alice_carts.len(), 1);
    assert_eq!(alice_carts[0].items[0].quantity, 1);
}

#[tokio::test]
async fn round_trip_returns_exactly_what_was_written() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let keyboard_id = app.seed_product("Keyboard", dec!(149.99), category_id).await;
    let mouse_id = app.seed_product("Mouse", dec!(25.50), category_id).await;

    let written = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(keyboard_id, 2), (mouse_id, 3)]))
        .await
        .expect("add items");

    let fetched = app
        .state
        .services
        .carts
        .get_by_params(customer_id, None)
        .await
        .expect("refetch cart");

    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], written);
    assert_eq!(fetched[0].items[0].price, 149.99);
    assert_eq!(fetched[0].items[1].price, 25.5);
}

#[tokio::test]
async fn deleting_a_line_item_from_an_owned_active_cart_succeeds() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;
    let category_id = app.seed_category("peripherals").await;
    let keyboard_id = app.seed_product("Keyboard", dec!(10000), category_id).await;
    let mouse_id = app.seed_product("Mouse", dec!(2500), category_id).await;

    let cart = app
        .state
        .services
        .carts
        .add_items(add_input(customer_id, vec![(keyboard_id, 1), (mouse_id, 2)]))
        .await
        .expect("add items");

    let removed_item_id = cart.items[0].id;
    app.state
        .services
        .carts
        .delete_item(removed_item_id, customer_id)
        .await
        .expect("delete item");

    let after = app
        .state
        .services
        .carts
        .get_by_params(customer_id, None)
        .await
        .expect("refetch cart");

    assert_eq!(after[0].items.len(), 1);
    assert_eq!(after[0].items[0].product_id, mouse_id);
    // The cart stays Active even as items are removed
    assert_eq!(after[0].status, "ACTIVE");
}

#[tokio::test]
async fn deleting_anothers_line_item_fails_and_removes_nothing() {
    let app = TestApp::new().await;
    let alice_id = app.seed_customer("alice").await;
    let bob_id = app.seed_customer("bob").await;
    let category_id = app.seed_category("peripherals").await;
    let product_id = app.seed_product("Keyboard", dec!(10000), category_id).await;

    let cart = app
        .state
        .services
        .carts
        .add_items(add_input(alice_id, vec![(product_id, 1)]))
        .await
        .expect("alice add");

    let err = app
        .state
        .services
        .carts
        .delete_item(cart.items[0].id, bob_id)
        .await
        .expect_err("foreign delete must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert_eq!(CartItem::find().count(&*app.state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_a_missing_line_item_fails() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("alice").await;

    let err = app
        .state
        .services
        .carts
        .delete_item(42, customer_id)
        .await
        .expect_err("missing item must fail");

    match err {
        ServiceError::NotFound(message) => assert_eq!(message, "cart item not found: 42"),
        other => panic!("unexpected error: {:?}", other),
    }
}
