//! Static pages, language switching and the middleware stack.

use delegends_integration_tests::{SALON_NAME, TestContext, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_and_security_headers() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(response.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_locale_switch_returns_to_page() {
    let ctx = TestContext::new().await;

    let body = ctx.get("/faq").await.text().await.expect("body");
    assert!(body.contains(r#"<html lang="lt">"#));
    assert!(body.contains("Dažniausiai užduodami klausimai"));

    let response = ctx
        .post_form("/locale", &[("locale", "en"), ("redirect_to", "/faq")])
        .await;
    assert_eq!(location(&response), "/faq");

    let body = ctx.get("/faq").await.text().await.expect("body");
    assert!(body.contains(r#"<html lang="en">"#));
    assert!(body.contains("Frequently Asked Questions"));
}

#[tokio::test]
async fn test_locale_switch_ignores_offsite_redirect() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/locale",
            &[("locale", "ru"), ("redirect_to", "//evil.example")],
        )
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_legal_page_and_missing_page() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/privacy").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.expect("body").contains("Privacy Policy"));

    assert_eq!(ctx.get("/blogs/no-such-post").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_stylesheet_is_served() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/static/css/main.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .expect("header")
        .starts_with("text/css"));
}

#[tokio::test]
async fn test_about_lists_backend_salons() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains(SALON_NAME), "{body}");
}
