//! Integration tests for the De Legends storefront.
//!
//! Each test spawns the full storefront router on an ephemeral port, in front
//! of an in-process stand-in for the booking backend. Nothing external is
//! needed.
//!
//! ```bash
//! cargo test -p delegends-integration-tests
//! ```
//!
//! # Backend stand-in
//!
//! | Endpoint | Behavior |
//! |---|---|
//! | `POST /auth/login` | password `secret123` succeeds; [`EXPIRED_EMAIL`] gets a token the backend later rejects |
//! | `GET /bookings` | empty list, or 401 for the rejected token |
//! | `POST /bookings` | echoes a pending booking, or 401 for the rejected token |
//! | `GET /reviews/my-reviews` | empty list |
//! | `GET /products`, `/products/{id}` | one product, [`PRODUCT_ID`]; [`SOLD_OUT_ID`] has no stock |
//! | `POST /orders/create-checkout-session` | hosted URL [`CHECKOUT_URL`], or 401 for the rejected token |
//! | `GET /services`, `/barbers`, `/salons` | one service, no barbers, one salon |
//! | `GET /availability/check` | `10:00` free, `10:30` taken |
//! | `POST /guest-bookings/check-payment-eligibility` | eligible, except [`CARD_ONLY_EMAIL`] (no) and [`ELIGIBILITY_DOWN_EMAIL`] (500) |
//! | `POST /guest-bookings/create-setup-intent` | setup intent [`SETUP_INTENT_ID`] |
//! | `POST /guest-bookings/create` | 400 for a card booking without a setup intent |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use delegends_core::Locale;
use delegends_storefront::{
    app::build_router,
    config::{AnalyticsConfig, BackendConfig, PaymentsConfig, StorefrontConfig},
    state::AppState,
};
use reqwest::{Client, redirect::Policy};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Password the stand-in backend accepts.
pub const PASSWORD: &str = "secret123";

/// Email whose token the stand-in backend rejects on every call.
pub const EXPIRED_EMAIL: &str = "expired@example.lt";

/// The one product the stand-in backend sells.
pub const PRODUCT_ID: &str = "prod-1";

/// A product the stand-in backend has run out of.
pub const SOLD_OUT_ID: &str = "prod-2";

/// Name of the one salon the stand-in backend lists.
pub const SALON_NAME: &str = "De Legends Old Town";

/// Where the stand-in backend sends customers to pay for products.
pub const CHECKOUT_URL: &str = "https://checkout.stripe.test/session";

/// Guest who must pay by card.
pub const CARD_ONLY_EMAIL: &str = "card-only@example.lt";

/// Guest whose eligibility check fails on the backend.
pub const ELIGIBILITY_DOWN_EMAIL: &str = "eligibility-down@example.lt";

/// Setup intent id handed out by the stand-in backend.
pub const SETUP_INTENT_ID: &str = "seti_123";

const EXPIRED_TOKEN: &str = "expired-token";

/// A running storefront plus a cookie-keeping client.
pub struct TestContext {
    /// Client with a cookie store that does not follow redirects.
    pub client: Client,
    /// `http://127.0.0.1:{port}` of the storefront.
    pub base_url: String,
}

impl TestContext {
    /// Start a backend stand-in and a storefront talking to it.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot be started.
    pub async fn new() -> Self {
        let backend_url = serve(backend_router()).await;
        let config = test_config(format!("{backend_url}/api"));
        let state = AppState::new(config).expect("Failed to build storefront state");
        let base_url = serve(build_router(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    /// Absolute URL of a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a storefront path.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a form to a storefront path.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Switch the session to English so assertions can match English copy.
    ///
    /// # Panics
    ///
    /// Panics if the switch is not answered with a redirect.
    pub async fn use_english(&self) {
        let response = self.post_form("/locale", &[("locale", "en")]).await;
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    }

    /// Sign in through the login form.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn login(&self, email: &str) -> reqwest::Response {
        self.post_form("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await
    }
}

/// `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Storefront configuration for tests.
///
/// Content and static assets are read from the storefront crate.
#[must_use]
pub fn test_config(api_url: String) -> StorefrontConfig {
    let storefront_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront");
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        session_secret: SecretString::from("k3J9xQ2mZ7vB4nW8pL5tR1yH6cF0dG2s".to_string()),
        content_dir: storefront_dir.join("content"),
        static_dir: storefront_dir.join("static"),
        default_locale: Locale::Lt,
        backend: BackendConfig {
            api_url,
            timeout: Duration::from_secs(5),
        },
        payments: PaymentsConfig {
            publishable_key: "pk_test_integration".to_string(),
        },
        analytics: AnalyticsConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Serve a router on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });

    format!("http://{addr}")
}

// =============================================================================
// Backend stand-in
// =============================================================================

fn backend_router() -> Router {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/auth/login", post(backend_login))
            .route("/bookings", get(backend_bookings).post(backend_create_booking))
            .route("/reviews/my-reviews", get(|| async { Json(json!([])) }))
            .route("/products", get(|| async { Json(json!([product()])) }))
            .route("/products/{id}", get(backend_product))
            .route("/orders/create-checkout-session", post(backend_checkout))
            .route("/services", get(|| async { Json(json!([service()])) }))
            .route("/barbers", get(|| async { Json(json!([])) }))
            .route("/salons", get(|| async { Json(json!([salon()])) }))
            .route("/availability/check", get(backend_availability))
            .route(
                "/guest-bookings/check-payment-eligibility",
                post(backend_eligibility),
            )
            .route(
                "/guest-bookings/create-setup-intent",
                post(|| async {
                    Json(json!({
                        "clientSecret": "seti_123_secret_abc",
                        "setupIntentId": SETUP_INTENT_ID
                    }))
                }),
            )
            .route("/guest-bookings/create", post(backend_guest_booking)),
    )
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Token expired" }))).into_response()
}

fn bearer(headers: &HeaderMap) -> &str {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn is_rejected(bearer: &str) -> bool {
    bearer.is_empty() || bearer == format!("Bearer {EXPIRED_TOKEN}")
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn backend_login(Json(body): Json<LoginBody>) -> Response {
    if body.password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response();
    }

    let token = if body.email == EXPIRED_EMAIL {
        EXPIRED_TOKEN
    } else {
        "valid-token"
    };
    Json(json!({
        "token": token,
        "user": { "_id": "user-1", "name": "Jonas Jonaitis", "email": body.email }
    }))
    .into_response()
}

async fn backend_bookings(headers: HeaderMap) -> Response {
    if is_rejected(bearer(&headers)) {
        return unauthorized();
    }
    Json(json!([])).into_response()
}

async fn backend_create_booking(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if is_rejected(bearer(&headers)) {
        return unauthorized();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "_id": "booking-1",
            "serviceName": body["serviceName"],
            "date": body["date"],
            "time": body["time"],
            "price": body["price"],
            "status": "pending"
        })),
    )
        .into_response()
}

async fn backend_product(Path(id): Path<String>) -> Response {
    if id == PRODUCT_ID {
        Json(product()).into_response()
    } else if id == SOLD_OUT_ID {
        let mut product = product();
        product["_id"] = json!(SOLD_OUT_ID);
        product["title"] = json!("Pomade");
        product["stock"] = json!(0);
        Json(product).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "message": "Product not found" }))).into_response()
    }
}

async fn backend_checkout(headers: HeaderMap) -> Response {
    // Guests check out without a token; only a rejected one is refused
    let bearer = bearer(&headers);
    if !bearer.is_empty() && is_rejected(bearer) {
        return unauthorized();
    }
    Json(json!({ "url": CHECKOUT_URL })).into_response()
}

async fn backend_availability() -> Json<Value> {
    Json(json!({
        "slots": [
            { "time": "10:00", "available": true },
            { "time": "10:30", "available": false }
        ]
    }))
}

#[derive(Deserialize)]
struct EligibilityBody {
    email: String,
}

async fn backend_eligibility(Json(body): Json<EligibilityBody>) -> Response {
    match body.email.as_str() {
        ELIGIBILITY_DOWN_EMAIL => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Eligibility service unavailable" })),
        )
            .into_response(),
        CARD_ONLY_EMAIL => Json(json!({ "canPayAtVenue": false })).into_response(),
        _ => Json(json!({ "canPayAtVenue": true })).into_response(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuestBookingBody {
    payment_type: String,
    #[serde(default)]
    setup_intent_id: Option<String>,
}

async fn backend_guest_booking(Json(body): Json<GuestBookingBody>) -> Response {
    if body.payment_type == "card" && body.setup_intent_id.as_deref() != Some(SETUP_INTENT_ID) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Card setup is required" })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Booking created", "booking": { "_id": "guest-1" } })),
    )
        .into_response()
}

fn product() -> Value {
    json!({
        "_id": PRODUCT_ID,
        "title": "Beard Oil",
        "description": "Cedar and bergamot.",
        "price": 19.5,
        "category": "Beards",
        "stock": 10
    })
}

fn salon() -> Value {
    json!({
        "_id": "salon-1",
        "name": SALON_NAME,
        "address": "Didžioji g. 1, Vilnius",
        "phone": "+370 600 00000"
    })
}

fn service() -> Value {
    json!({
        "_id": "svc-1",
        "name": "Haircut",
        "description": "Classic men's haircut.",
        "price": 25.0,
        "duration": 30
    })
}
