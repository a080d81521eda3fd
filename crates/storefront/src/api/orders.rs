//! Product orders and hosted checkout.

use reqwest::Method;
use tracing::instrument;

use super::types::{CheckoutRequest, Order, RedirectUrl};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create a hosted checkout session for the cart.
    ///
    /// The token is optional: guests can check out too, but orders placed
    /// while signed in show up under "My orders".
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, request), fields(lines = request.items.len()))]
    pub async fn create_checkout_session(
        &self,
        token: Option<&str>,
        request: &CheckoutRequest<'_>,
    ) -> Result<RedirectUrl, ApiError> {
        self.send_json(Method::POST, "/orders/create-checkout-session", request, token)
            .await
    }

    /// Look up the order created by a completed checkout session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown session.
    #[instrument(skip(self))]
    pub async fn order_by_session(&self, session_id: &str) -> Result<Order, ApiError> {
        self.get(
            &format!("/orders/session/{}", urlencoding::encode(session_id)),
            None,
        )
        .await
    }

    /// The signed-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        self.get("/orders/my-orders", Some(token)).await
    }
}
