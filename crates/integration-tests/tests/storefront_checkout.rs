//! Hosted checkout hand-off.

use delegends_integration_tests::{CHECKOUT_URL, EXPIRED_EMAIL, PRODUCT_ID, TestContext, location};
use reqwest::StatusCode;

const CUSTOMER: [(&str, &str); 4] = [
    ("name", "Jonas Jonaitis"),
    ("email", "jonas@example.lt"),
    ("phone", "+370 600 00000"),
    ("address", "Didžioji g. 1, Vilnius"),
];

#[tokio::test]
async fn test_checkout_redirects_to_hosted_page() {
    let ctx = TestContext::new().await;
    ctx.post_form("/cart/add", &[("product_id", PRODUCT_ID)]).await;

    let response = ctx.post_form("/checkout", &CUSTOMER).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), CHECKOUT_URL);
}

#[tokio::test]
async fn test_rejected_token_at_checkout_signs_customer_out() {
    let ctx = TestContext::new().await;
    ctx.login(EXPIRED_EMAIL).await;
    ctx.post_form("/cart/add", &[("product_id", PRODUCT_ID)]).await;

    let response = ctx.post_form("/checkout", &CUSTOMER).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    // Signed out: the login page renders instead of bouncing to /bookings
    assert_eq!(ctx.get("/auth/login").await.status(), StatusCode::OK);

    // The cart survives the sign-out
    let body = ctx.get("/cart/count").await.text().await.expect("body");
    assert!(body.contains(r#"<span class="badge">1</span>"#), "{body}");
}
