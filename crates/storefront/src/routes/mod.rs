//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Marketing
//! GET  /services               - Service menu
//! POST /services/book          - Book a menu item (adds it to the booking cart)
//! GET  /about                  - About us
//! GET  /our-team               - Barbers
//! GET  /our-team/{id}          - Barber profile fragment (HTMX)
//! GET  /blogs                  - Blog index
//! GET  /blogs/{slug}           - Blog post
//! GET  /faq                    - FAQ
//! GET  /privacy, /terms, /refund, /cookies, /disclaimer
//! GET  /career                 - Job listings
//! GET  /career/{id}            - Job detail
//! POST /career/{id}/apply      - Job application
//!
//! # Shop
//! GET  /products               - Product grid (?category=)
//! GET  /product/{id}           - Product detail
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (count fragment, triggers cart-updated)
//! POST /cart/update            - Update quantity (cart_items fragment)
//! POST /cart/remove            - Remove item (cart_items fragment)
//! POST /cart/clear             - Empty the cart (cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /checkout               - Checkout form
//! POST /checkout               - Redirect to hosted checkout
//! GET  /order-success          - Order confirmation
//! GET  /gift-cards             - Gift cards
//! POST /gift-cards/purchase    - Buy a gift card
//! GET  /gift-cards/validate    - Balance check fragment (HTMX)
//!
//! # Booking
//! GET  /select-location        - Branch picker
//! POST /select-location        - Choose branch
//! POST /select-location/change - Forget branch
//! GET  /guest-booking          - Wizard at the current step
//! POST /guest-booking/...      - Wizard steps (see `guest_booking`)
//!
//! # Account (requires auth)
//! GET  /bookings               - My bookings (+ payment return handling)
//! POST /bookings               - Book for the signed-in customer
//! POST /bookings/{id}/gift-card - Redeem a gift card against a booking
//! POST /bookings/{id}/pay      - Pay for a booking
//! POST /bookings/{id}/review   - Review a completed booking
//! GET  /my-orders              - Order history
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Misc
//! GET  /chat, POST /chat       - Chat widget fragment (HTMX)
//! POST /locale                 - Switch language
//! ```

pub mod auth;
pub mod blog;
pub mod bookings;
pub mod career;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod gift_cards;
pub mod guest_booking;
pub mod home;
pub mod locale;
pub mod location;
pub mod pages;
pub mod products;
pub mod services;
pub mod team;

use axum::{Router, http::HeaderMap, routing::get};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/product/{id}", get(products::show))
}

/// Create all routes for the storefront.
///
/// Login, registration, the chat widget and the form-heavy sections carry
/// per-client rate limits.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Marketing pages
        .route("/about", get(team::about))
        .nest("/services", services::router())
        .nest("/our-team", team::router())
        .nest("/blogs", blog::router())
        .merge(pages::router())
        // Shop
        .merge(product_routes())
        .nest("/cart", cart::router())
        // Account
        .merge(bookings::router())
        // Language switcher
        .nest("/locale", locale::router())
        // Rate-limited sections
        .merge(
            Router::new()
                .merge(checkout::router())
                .nest("/select-location", location::router())
                .nest("/guest-booking", guest_booking::router())
                .nest("/career", career::router())
                .nest("/gift-cards", gift_cards::router())
                .nest("/chat", chat::router())
                .layer(form_rate_limiter()),
        )
        .nest("/auth", auth::router().layer(auth_rate_limiter()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
