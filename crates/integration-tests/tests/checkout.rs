//! Checkout end to end: order snapshot, cart clearing, delayed redirect.

use voltlane_core::models::{AddressInfo, Order};
use voltlane_core::types::{OrderStatus, ProductId};
use voltlane_integration_tests::TestContext;
use voltlane_remote::{DocumentStore, collections};
use voltlane_storefront::{Route, generate_order_id};

fn address() -> AddressInfo {
    AddressInfo {
        name: "Ada Sparks".to_owned(),
        address: "12 Volt Street".to_owned(),
        zip_code: "94016".to_owned(),
        mobile_number: "4155550123".to_owned(),
    }
}

async fn signed_in_with_items(ctx: &TestContext) {
    ctx.seed_product("p-1", "Soundbar", "100", "2026-01-01T00:00:00Z")
        .await;
    ctx.seed_product("p-4", "Webcam", "75", "2026-01-02T00:00:00Z")
        .await;
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    ctx.app.catalog().wait_loaded().await;
    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;

    let p1 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-1"))
        .expect("p-1");
    let p4 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-4"))
        .expect("p-4");
    ctx.app.cart().add(p1.clone()).await;
    ctx.app.cart().add(p1).await;
    ctx.app.cart().add(p4).await;
}

#[tokio::test(start_paused = true)]
async fn submit_snapshots_the_cart_and_redirects_after_the_delay() {
    let mut ctx = TestContext::new();
    signed_in_with_items(&ctx).await;

    let order_id = ctx
        .app
        .checkout()
        .submit_order(
            ctx.app.cart(),
            &ctx.app.session().state(),
            &address(),
            generate_order_id(),
        )
        .await
        .expect("submit");

    let doc = ctx
        .remote
        .get(collections::ORDERS, order_id.as_str())
        .await
        .expect("get order")
        .expect("order stored");
    let order: Order = doc.decode(collections::ORDERS).expect("decode");
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.cart_items.len(), 2);
    let quantities: Vec<_> = order
        .cart_items
        .iter()
        .map(|i| (i.product.id.to_string(), i.quantity))
        .collect();
    assert_eq!(quantities, vec![("p-1".to_owned(), 2), ("p-4".to_owned(), 1)]);

    assert!(ctx.app.cart().state().items.is_empty());
    assert_eq!(ctx.routes.recv().await, Some(Route::UserDashboard));
}

#[tokio::test(start_paused = true)]
async fn the_submitted_snapshot_is_immune_to_later_cart_mutations() {
    let ctx = TestContext::new();
    signed_in_with_items(&ctx).await;

    let order_id = ctx
        .app
        .checkout()
        .submit_order(
            ctx.app.cart(),
            &ctx.app.session().state(),
            &address(),
            generate_order_id(),
        )
        .await
        .expect("submit");

    // Keep shopping after checkout.
    let p1 = ctx
        .app
        .catalog()
        .product(&ProductId::from("p-1"))
        .expect("p-1");
    ctx.app.cart().add(p1).await;

    let doc = ctx
        .remote
        .get(collections::ORDERS, order_id.as_str())
        .await
        .expect("get order")
        .expect("order stored");
    let order: Order = doc.decode(collections::ORDERS).expect("decode");
    assert_eq!(order.cart_items.len(), 2);
}
