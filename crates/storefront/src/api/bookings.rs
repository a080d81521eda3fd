//! Bookings on a customer account.

use delegends_core::BookingId;
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::types::{Booking, NewBooking, PaymentStatusUpdate, RedirectUrl};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentSessionRequest<'a> {
    booking_id: &'a BookingId,
}

impl ApiClient {
    /// The signed-in customer's bookings, in backend order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        self.get("/bookings", Some(token)).await
    }

    /// Book an appointment on the customer's account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, booking), fields(date = %booking.date, time = %booking.time))]
    pub async fn create_booking(
        &self,
        token: &str,
        booking: &NewBooking<'_>,
    ) -> Result<Booking, ApiError> {
        self.send_json(Method::POST, "/bookings", booking, Some(token))
            .await
    }

    /// Start a hosted payment for an unpaid booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(booking_id = %booking_id))]
    pub async fn create_booking_payment_session(
        &self,
        token: &str,
        booking_id: &BookingId,
    ) -> Result<RedirectUrl, ApiError> {
        self.send_json(
            Method::POST,
            "/bookings/create-payment-session",
            &PaymentSessionRequest { booking_id },
            Some(token),
        )
        .await
    }

    /// Record the outcome of a hosted booking payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, update), fields(booking_id = %booking_id))]
    pub async fn update_booking_payment(
        &self,
        token: &str,
        booking_id: &BookingId,
        update: &PaymentStatusUpdate,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!(
                "/bookings/{}/payment",
                urlencoding::encode(booking_id.as_str())
            ),
            update,
            Some(token),
        )
        .await
    }
}
