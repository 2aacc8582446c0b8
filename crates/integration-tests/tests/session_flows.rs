//! Account flows driven through the full app: registration, login,
//! password reset, and the dashboard role gate.

use std::sync::Arc;

use voltlane_admin::AdminApp;
use voltlane_integration_tests::TestContext;
use voltlane_remote::{DocumentStore, Notifier, collections};
use voltlane_storefront::session::Profile;
use voltlane_storefront::{Navigator, Route};

#[tokio::test]
async fn registration_then_login_resolves_a_known_profile() {
    let mut ctx = TestContext::new();

    ctx.app
        .auth()
        .register("Ada Sparks", "ada@example.com", "hunter22")
        .await
        .expect("register");
    assert_eq!(ctx.routes.recv().await, Some(Route::Login));

    // Registration does not sign in; the session is still anonymous.
    let state = ctx.app.session().wait_ready().await;
    assert!(matches!(state.profile, Profile::Anonymous));

    ctx.app
        .auth()
        .sign_in("ada@example.com", "hunter22")
        .await
        .expect("sign in");
    assert_eq!(ctx.routes.recv().await, Some(Route::Home));

    let mut rx = ctx.app.session().watch();
    let state = rx
        .wait_for(|s| s.profile.uid().is_some())
        .await
        .expect("resolved");
    assert!(matches!(&state.profile, Profile::Known(user) if user.full_name == "Ada Sparks"));
}

#[tokio::test]
async fn password_reset_enables_the_new_password() {
    let mut ctx = TestContext::new();
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;

    ctx.app
        .auth()
        .forgot_password("ada@example.com")
        .await
        .expect("request reset");
    assert_eq!(ctx.routes.recv().await, Some(Route::Login));

    let code = ctx
        .remote
        .issued_reset_code("ada@example.com")
        .expect("code issued");
    ctx.app
        .auth()
        .reset_password(&code, "new-hunter22")
        .await
        .expect("reset");
    assert_eq!(ctx.routes.recv().await, Some(Route::Login));

    ctx.app
        .auth()
        .sign_in("ada@example.com", "hunter22")
        .await
        .expect_err("old password dead");
    ctx.app
        .auth()
        .sign_in("ada@example.com", "new-hunter22")
        .await
        .expect("new password works");
}

#[tokio::test]
async fn the_dashboard_opens_only_for_admin_profiles() {
    let ctx = TestContext::new();
    ctx.seed_customer("u-1", "ada@example.com", "hunter22").await;
    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;

    let (navigator, _routes) = Navigator::channel();
    let session = ctx.app.session().state();
    AdminApp::start(
        Arc::new(ctx.remote.clone()),
        &session,
        Notifier::new(),
        navigator.clone(),
    )
    .expect_err("customer rejected");

    // Promote and re-resolve by signing in again.
    let mut fields = serde_json::Map::new();
    fields.insert("role".to_owned(), serde_json::json!("admin"));
    ctx.remote
        .update(collections::USERS, "u-1", fields)
        .await
        .expect("promote");
    ctx.app.session().logout().await.expect("logout");
    let mut rx = ctx.app.session().watch();
    rx.wait_for(|s| s.profile.uid().is_none())
        .await
        .expect("signed out");
    ctx.sign_in_and_wait("ada@example.com", "hunter22").await;
    let session = rx
        .wait_for(|s| s.profile.is_admin())
        .await
        .expect("admin resolved")
        .clone();

    let dashboard = AdminApp::start(
        Arc::new(ctx.remote.clone()),
        &session,
        Notifier::new(),
        navigator,
    )
    .expect("admin accepted");
    dashboard.shutdown();
}
