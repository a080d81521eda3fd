//! Guest booking wizard.

use delegends_integration_tests::{
    CARD_ONLY_EMAIL, ELIGIBILITY_DOWN_EMAIL, SETUP_INTENT_ID, TestContext, location,
};
use reqwest::StatusCode;
use serde_json::Value;

const PAY_AT_VENUE_REFUSED: &str = "Paying at the barbershop is not available for this booking.";

/// Walk the wizard up to the payment step as `email`.
async fn reach_payment_step(ctx: &TestContext, email: &str) {
    ctx.post_form("/select-location", &[("location", "location-1")])
        .await;
    ctx.post_form("/guest-booking/services/add", &[("service_id", "svc-1")])
        .await;
    ctx.post_form("/guest-booking/next", &[]).await;
    ctx.post_form(
        "/guest-booking/schedule",
        &[("date", "2099-01-15"), ("time", "10:00"), ("advance", "1")],
    )
    .await;
    let response = ctx
        .post_form(
            "/guest-booking/contact",
            &[
                ("name", "Jonas Jonaitis"),
                ("email", email),
                ("phone", "+370 600 00000"),
                ("policy_accepted", "on"),
                ("advance", "1"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/guest-booking");
}

async fn wizard_body(ctx: &TestContext) -> String {
    let response = ctx.get("/guest-booking").await;
    assert_eq!(response.status(), StatusCode::OK);
    response.text().await.expect("body")
}

#[tokio::test]
async fn test_wizard_requires_location() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/guest-booking").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/select-location");
}

#[tokio::test]
async fn test_unknown_location_is_refused() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/select-location", &[("location", "location-99")])
        .await;
    assert_eq!(location(&response), "/select-location");
    assert_eq!(location(&ctx.get("/guest-booking").await), "/select-location");
}

#[tokio::test]
async fn test_wizard_does_not_advance_without_services() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;

    let response = ctx
        .post_form("/select-location", &[("location", "location-1")])
        .await;
    assert_eq!(location(&response), "/guest-booking");

    let response = ctx.post_form("/guest-booking/next", &[]).await;
    assert_eq!(location(&response), "/guest-booking");

    let response = ctx.get("/guest-booking").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("Please choose at least one service."), "{body}");
    assert!(body.contains("OLDTOWN"));
    assert!(body.contains("Haircut"));
}

#[tokio::test]
async fn test_pay_at_venue_booking_clears_wizard() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    reach_payment_step(&ctx, "jonas@example.lt").await;

    let response = ctx
        .post_form("/guest-booking/payment-type", &[("payment_type", "pay_at_venue")])
        .await;
    assert_eq!(location(&response), "/guest-booking");

    let response = ctx.post_form("/guest-booking/confirm", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("jonas@example.lt"), "{body}");
    assert!(body.contains("Haircut"));
    assert!(body.contains("2099-01-15 10:00"));

    // Branch, services and draft are gone
    assert_eq!(location(&ctx.get("/guest-booking").await), "/select-location");
}

#[tokio::test]
async fn test_ineligible_guest_cannot_pay_at_venue() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    reach_payment_step(&ctx, CARD_ONLY_EMAIL).await;

    ctx.post_form("/guest-booking/payment-type", &[("payment_type", "pay_at_venue")])
        .await;
    let body = wizard_body(&ctx).await;
    assert!(body.contains(PAY_AT_VENUE_REFUSED), "{body}");

    // Still a card booking, so confirming without a card is refused
    ctx.post_form("/guest-booking/confirm", &[]).await;
    let body = wizard_body(&ctx).await;
    assert!(body.contains("Please confirm your card first."), "{body}");
}

#[tokio::test]
async fn test_failed_eligibility_check_means_card_only() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    reach_payment_step(&ctx, ELIGIBILITY_DOWN_EMAIL).await;

    ctx.post_form("/guest-booking/payment-type", &[("payment_type", "pay_at_venue")])
        .await;
    let body = wizard_body(&ctx).await;
    assert!(body.contains(PAY_AT_VENUE_REFUSED), "{body}");
}

#[tokio::test]
async fn test_card_booking_needs_confirmed_setup_intent() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    reach_payment_step(&ctx, "jonas@example.lt").await;

    let response = ctx
        .client
        .post(ctx.url("/guest-booking/setup-intent"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let intent: Value = response.json().await.expect("json");
    assert_eq!(intent["setupIntentId"], SETUP_INTENT_ID);
    assert!(intent["clientSecret"].as_str().is_some_and(|s| !s.is_empty()));

    let response = ctx
        .post_form("/guest-booking/complete", &[("setup_intent_id", "")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/guest-booking");
    let body = wizard_body(&ctx).await;
    assert!(body.contains("Please confirm your card first."), "{body}");

    let response = ctx
        .post_form("/guest-booking/complete", &[("setup_intent_id", SETUP_INTENT_ID)])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("jonas@example.lt"), "{body}");
}

#[tokio::test]
async fn test_clearing_services_keeps_branch() {
    let ctx = TestContext::new().await;
    ctx.use_english().await;
    ctx.post_form("/select-location", &[("location", "location-1")])
        .await;
    ctx.post_form("/guest-booking/services/add", &[("service_id", "svc-1")])
        .await;

    let response = ctx.post_form("/guest-booking/services/clear", &[]).await;
    assert_eq!(location(&response), "/guest-booking");

    ctx.post_form("/guest-booking/next", &[]).await;
    let body = wizard_body(&ctx).await;
    assert!(body.contains("OLDTOWN"));
    assert!(body.contains("Please choose at least one service."), "{body}");
}

#[tokio::test]
async fn test_slot_fragment_lists_backend_times() {
    let ctx = TestContext::new().await;
    ctx.post_form("/select-location", &[("location", "location-1")])
        .await;

    let response = ctx.get("/guest-booking/slots?date=2099-01-15").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("10:00"), "{body}");
    assert!(body.contains("10:30"));
}
