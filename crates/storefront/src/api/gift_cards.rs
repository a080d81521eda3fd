//! Gift cards.

use reqwest::Method;
use tracing::instrument;

use super::types::{GiftCard, GiftCardPurchase, GiftCardRedemption};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Purchase a gift card.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, purchase), fields(amount = %purchase.amount))]
    pub async fn purchase_gift_card(
        &self,
        purchase: &GiftCardPurchase<'_>,
    ) -> Result<GiftCard, ApiError> {
        self.send_json(Method::POST, "/gift-cards/purchase", purchase, None)
            .await
    }

    /// Check a gift card code and its remaining balance.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown code.
    #[instrument(skip(self, code))]
    pub async fn validate_gift_card(&self, code: &str) -> Result<GiftCard, ApiError> {
        self.get(
            &format!("/gift-cards/validate/{}", urlencoding::encode(code)),
            None,
        )
        .await
    }

    /// Apply a gift card to a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, redemption), fields(booking_id = %redemption.booking_id))]
    pub async fn redeem_gift_card(
        &self,
        token: &str,
        redemption: &GiftCardRedemption<'_>,
    ) -> Result<GiftCard, ApiError> {
        self.send_json(Method::POST, "/gift-cards/redeem", redemption, Some(token))
            .await
    }
}
