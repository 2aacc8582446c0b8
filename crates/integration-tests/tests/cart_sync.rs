//! Cart behavior end to end: merge-on-add, the decrement floor, hydration
//! against existing and absent remote carts.

use rust_decimal::Decimal;
use serde_json::json;

use voltlane_core::types::ProductId;
use voltlane_integration_tests::TestContext;
use voltlane_remote::{DocumentStore, collections};

#[tokio::test]
async fn adding_the_same_product_twice_merges_into_one_line() {
    let ctx = TestContext::new();
    ctx.seed_product("p-1", "Soundbar", "100", "2026-01-01T00:00:00Z")
        .await;
    let catalog = ctx.app.catalog();
    catalog.wait_loaded().await;
    let p1 = catalog.product(&ProductId::from("p-1")).expect("p-1");

    let cart = ctx.app.cart();
    cart.add(p1.clone()).await;
    cart.add(p1).await;

    let state = cart.state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items.first().map(|i| i.quantity), Some(2));
    assert_eq!(state.subtotal().amount(), Decimal::from(200));
}

#[tokio::test]
async fn decrement_never_drops_a_line_below_one() {
    let ctx = TestContext::new();
    ctx.seed_product("p-1", "Soundbar", "100", "2026-01-01T00:00:00Z")
        .await;
    ctx.app.catalog().wait_loaded().await;
    let p1 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-1"))
        .expect("p-1");

    let cart = ctx.app.cart();
    cart.add(p1.clone()).await;
    cart.add(p1).await;
    cart.decrement(&ProductId::from("p-1")).await;
    cart.decrement(&ProductId::from("p-1")).await;

    assert_eq!(cart.state().items.first().map(|i| i.quantity), Some(1));
}

#[tokio::test]
async fn first_sign_in_hydrates_empty_then_persists_additions() {
    let ctx = TestContext::new();
    ctx.seed_product("p-2", "Earbuds", "59", "2026-01-01T00:00:00Z")
        .await;
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    ctx.app.catalog().wait_loaded().await;

    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;
    assert!(ctx.app.cart().state().items.is_empty());

    let p2 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-2"))
        .expect("p-2");
    ctx.app.cart().add(p2).await;

    let doc = ctx
        .remote
        .get(collections::CARTS, "u-1")
        .await
        .expect("get cart")
        .expect("cart written");
    let items = doc
        .data
        .get("cartItems")
        .and_then(|v| v.as_array())
        .expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(
        items.first().and_then(|i| i.get("id")).and_then(|v| v.as_str()),
        Some("p-2")
    );
    assert_eq!(
        items.first().and_then(|i| i.get("quantity")).and_then(serde_json::Value::as_u64),
        Some(1)
    );
}

#[tokio::test]
async fn a_saved_cart_is_never_overwritten_before_hydration_completes() {
    let ctx = TestContext::new();
    ctx.seed_product("p-1", "Soundbar", "100", "2026-01-01T00:00:00Z")
        .await;
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    ctx.app.catalog().wait_loaded().await;

    // A previous device left a non-empty saved cart.
    ctx.remote
        .set(
            collections::CARTS,
            "u-1",
            json!({ "cartItems": [{
                "id": "p-9",
                "name": "Dock",
                "price": "49.00",
                "category": "accessories",
                "imageURL": "https://img.voltlane.dev/d.webp",
                "createdAt": "2026-01-01T00:00:00Z",
                "quantity": 3,
            }]}),
        )
        .await
        .expect("seed saved cart");

    // Anonymous mutations before sign-in must not leak into the write path.
    let p1 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-1"))
        .expect("p-1");
    ctx.app.cart().add(p1).await;

    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;

    // Local cart adopted the saved one; the stored document is untouched.
    let state = ctx.app.cart().state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items.first().map(|i| i.quantity), Some(3));

    let doc = ctx
        .remote
        .get(collections::CARTS, "u-1")
        .await
        .expect("get cart")
        .expect("cart exists");
    let items = doc
        .data
        .get("cartItems")
        .and_then(|v| v.as_array())
        .expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(
        items.first().and_then(|i| i.get("id")).and_then(|v| v.as_str()),
        Some("p-9")
    );
}

#[tokio::test]
async fn sign_out_detaches_without_clearing_the_saved_cart() {
    let ctx = TestContext::new();
    ctx.seed_product("p-1", "Soundbar", "100", "2026-01-01T00:00:00Z")
        .await;
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    ctx.app.catalog().wait_loaded().await;
    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;

    let p1 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-1"))
        .expect("p-1");
    ctx.app.cart().add(p1).await;

    ctx.app.session().logout().await.expect("logout");
    let mut cart_rx = ctx.app.cart().watch();
    cart_rx
        .wait_for(|state| state.items.is_empty())
        .await
        .expect("local cart cleared");

    // The saved cart survives for the next session.
    let doc = ctx
        .remote
        .get(collections::CARTS, "u-1")
        .await
        .expect("get cart")
        .expect("cart still stored");
    assert_eq!(
        doc.data
            .get("cartItems")
            .and_then(|v| v.as_array())
            .map(Vec::len),
        Some(1)
    );
}
