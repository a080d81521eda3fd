//! Guest bookings and slot availability.

use delegends_core::BarberId;
use reqwest::Method;
use tracing::instrument;

use super::types::{
    Eligibility, EligibilityRequest, GuestBookingCreated, GuestBookingRequest, SetupIntent,
    SetupIntentRequest, SlotList,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Start times for a date at a branch, optionally for one barber.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn check_availability(
        &self,
        date: &str,
        location: &str,
        barber: Option<&BarberId>,
    ) -> Result<SlotList, ApiError> {
        let mut params = vec![("date", date), ("location", location)];
        if let Some(barber) = barber {
            params.push(("barber", barber.as_str()));
        }
        self.get_with_query("/availability/check", &params, None)
            .await
    }

    /// Whether this customer may skip the card deposit and pay at the venue.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request))]
    pub async fn check_payment_eligibility(
        &self,
        request: &EligibilityRequest<'_>,
    ) -> Result<Eligibility, ApiError> {
        self.send_json(
            Method::POST,
            "/guest-bookings/check-payment-eligibility",
            request,
            None,
        )
        .await
    }

    /// Create a card setup intent; the client secret goes to Stripe.js.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request))]
    pub async fn create_setup_intent(
        &self,
        request: &SetupIntentRequest<'_>,
    ) -> Result<SetupIntent, ApiError> {
        self.send_json(
            Method::POST,
            "/guest-bookings/create-setup-intent",
            request,
            None,
        )
        .await
    }

    /// Create a guest booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(
        skip(self, request),
        fields(date = %request.date, time = %request.time, payment_type = request.payment_type.as_str())
    )]
    pub async fn create_guest_booking(
        &self,
        request: &GuestBookingRequest,
    ) -> Result<GuestBookingCreated, ApiError> {
        self.send_json(Method::POST, "/guest-bookings/create", request, None)
            .await
    }
}
