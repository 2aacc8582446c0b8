//! Favorites round-trip through the single-flight worker.

use voltlane_core::models::User;
use voltlane_core::types::ProductId;
use voltlane_integration_tests::TestContext;
use voltlane_remote::{DocumentStore, collections};

async fn stored_favorites(ctx: &TestContext, uid: &str) -> Vec<String> {
    let doc = ctx
        .remote
        .get(collections::USERS, uid)
        .await
        .expect("get user")
        .expect("user exists");
    let user: User = doc.decode(collections::USERS).expect("decode");
    user.favorites.into_iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn toggling_twice_returns_to_the_original_membership() {
    let ctx = TestContext::new();
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;

    let favorites = ctx.app.favorites();
    let p3 = ProductId::from("p-3");

    favorites.toggle(p3.clone());
    let mut rx = favorites.watch();
    rx.wait_for(|s| s.contains(&p3)).await.expect("favorited");
    assert_eq!(stored_favorites(&ctx, "u-1").await, vec!["p-3"]);

    favorites.toggle(p3.clone());
    rx.wait_for(|s| !s.contains(&p3)).await.expect("unfavorited");
    assert!(stored_favorites(&ctx, "u-1").await.is_empty());
}

#[tokio::test]
async fn hydration_adopts_the_profile_list_and_sign_out_resets() {
    let ctx = TestContext::new();
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    let mut fields = serde_json::Map::new();
    fields.insert("favorites".to_owned(), serde_json::json!(["p-1", "p-2"]));
    ctx.remote
        .update(collections::USERS, "u-1", fields)
        .await
        .expect("seed favorites");

    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;
    let mut rx = ctx.app.favorites().watch();
    let state = rx
        .wait_for(|s| s.items.len() == 2)
        .await
        .expect("hydrated");
    assert!(state.contains(&ProductId::from("p-1")));
    drop(state);

    ctx.app.session().logout().await.expect("logout");
    rx.wait_for(|s| s.items.is_empty()).await.expect("reset");
}
