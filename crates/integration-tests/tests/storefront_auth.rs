//! Sign-in, sign-out and expired backend tokens.

use delegends_integration_tests::{EXPIRED_EMAIL, TestContext, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_then_logout_protects_bookings() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/bookings").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    let response = ctx.login("jonas@example.lt").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // Signed-in customers skip the login page
    let response = ctx.get("/auth/login").await;
    assert_eq!(location(&response), "/bookings");
    assert_eq!(ctx.get("/bookings").await.status(), StatusCode::OK);

    let response = ctx.post_form("/auth/logout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = ctx.get("/bookings").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_wrong_password_stays_signed_out() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/auth/login",
            &[("email", "jonas@example.lt"), ("password", "nope")],
        )
        .await;
    assert_eq!(location(&response), "/auth/login?error=credentials");
    assert_eq!(ctx.get("/bookings").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_rejected_token_signs_customer_out() {
    let ctx = TestContext::new().await;
    ctx.login(EXPIRED_EMAIL).await;

    let response = ctx.get("/bookings").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    // The login page renders again instead of bouncing to /bookings
    assert_eq!(ctx.get("/auth/login").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.login("jonas@example.lt").await;
    ctx.post_form(
        "/cart/add",
        &[("product_id", delegends_integration_tests::PRODUCT_ID)],
    )
    .await;

    ctx.post_form("/auth/logout", &[]).await;

    let body = ctx.get("/cart/count").await.text().await.expect("body");
    assert!(body.contains(r#"<span class="badge">1</span>"#), "{body}");
}

#[tokio::test]
async fn test_signed_in_customer_books_from_account() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    ctx.login("jonas@example.lt").await;

    // A branch must be chosen first
    let form = [("service_id", "svc-1"), ("date", "2099-01-15"), ("time", "10:00")];
    let response = ctx.post_form("/bookings", &form).await;
    assert_eq!(location(&response), "/select-location");

    ctx.post_form("/select-location", &[("location", "location-1")])
        .await;
    let response = ctx.post_form("/bookings", &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/bookings");

    let body = ctx.get("/bookings").await.text().await.expect("body");
    assert!(body.contains("Appointment booked successfully!"), "{body}");
}
