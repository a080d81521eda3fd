//! Shopping cart flows against the full storefront stack.

use delegends_integration_tests::{PRODUCT_ID, SOLD_OUT_ID, TestContext, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_adding_twice_accumulates_quantity() {
    let ctx = TestContext::new().await;

    let response = ctx.post_form("/cart/add", &[("product_id", PRODUCT_ID)]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    ctx.post_form("/cart/add", &[("product_id", PRODUCT_ID), ("quantity", "2")])
        .await;

    let body = ctx.get("/cart/count").await.text().await.expect("body");
    assert!(body.contains(r#"<span class="badge">3</span>"#), "{body}");
}

#[tokio::test]
async fn test_htmx_add_returns_count_fragment() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .post(ctx.url("/cart/add"))
        .header("HX-Request", "true")
        .form(&[("product_id", PRODUCT_ID)])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    let body = response.text().await.expect("body");
    assert!(body.contains(r#"id="cart-count""#));
    assert!(body.contains(">1<"));
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let ctx = TestContext::new().await;

    let response = ctx.post_form("/cart/add", &[("product_id", "missing")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products");

    let body = ctx.get("/cart/count").await.text().await.expect("body");
    assert!(!body.contains("badge"));
}

#[tokio::test]
async fn test_sold_out_product_is_refused() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;

    let response = ctx.post_form("/cart/add", &[("product_id", SOLD_OUT_ID)]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/product/{SOLD_OUT_ID}"));

    let body = ctx.get("/cart/count").await.text().await.expect("body");
    assert!(!body.contains("badge"), "{body}");
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    ctx.post_form("/cart/add", &[("product_id", PRODUCT_ID)]).await;

    let response = ctx
        .client
        .post(ctx.url("/cart/clear"))
        .header("HX-Request", "true")
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("Your cart is empty."), "{body}");
}
