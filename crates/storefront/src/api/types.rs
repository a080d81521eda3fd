//! Wire types for the booking backend.
//!
//! The backend speaks camelCase JSON and names ids `_id`. Every id field
//! therefore accepts both `_id` and `id`. Optional display fields default
//! rather than failing the whole response.

use chrono::{DateTime, Utc};
use delegends_core::{
    BarberId, BookingId, BookingStatus, JobId, JobType, Money, OrderId, PaymentStatus,
    PaymentType, ProductId, ReviewId, SalonId, ServiceId, UserId,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: &'a str,
}

/// Account returned by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of login and register.
#[derive(Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A salon record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salon {
    #[serde(alias = "_id")]
    pub id: SalonId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A bookable service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(alias = "_id")]
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    /// Minutes.
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub category: Option<String>,
}

const fn default_duration() -> u32 {
    30
}

/// A barber profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    #[serde(alias = "_id")]
    pub id: BarberId,
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

/// A retail product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Product {
    /// Products without a stock figure are treated as available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|stock| stock > 0)
    }
}

/// A customer review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview<'a> {
    pub booking_id: &'a BookingId,
    pub rating: u8,
    pub comment: &'a str,
}

// =============================================================================
// Account bookings
// =============================================================================

/// Barber as embedded in a booking: populated or just the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BarberRef {
    Populated(BookingBarber),
    Id(String),
}

impl BarberRef {
    /// The barber's id, when the backend sent one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Populated(barber) => barber.id.as_ref().map(BarberId::as_str),
            Self::Id(id) => Some(id),
        }
    }
}

/// Populated barber on a booking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingBarber {
    #[serde(default, alias = "_id")]
    pub id: Option<BarberId>,
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Anything the backend embeds with just a display name.
#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    pub name: String,
}

/// A booking on the signed-in customer's account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: BookingId,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub barber: Option<BarberRef>,
    /// `YYYY-MM-DD` or a full ISO timestamp.
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub has_review: bool,
    #[serde(default)]
    pub location: Option<Named>,
    #[serde(default)]
    pub salon: Option<Named>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /bookings` for signed-in customers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking<'a> {
    pub service: &'a ServiceId,
    pub service_name: &'a str,
    pub barber: Option<&'a BarberId>,
    pub date: &'a str,
    pub time: &'a str,
    pub price: Money,
    pub notes: &'a str,
    pub location: &'a BranchRef,
}

/// Body of `PATCH /bookings/{id}/payment`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
    pub is_paid: bool,
}

impl PaymentStatusUpdate {
    /// The update sent after a successful hosted payment.
    #[must_use]
    pub const fn paid() -> Self {
        Self {
            payment_status: PaymentStatus::Paid,
            is_paid: true,
        }
    }
}

/// Any endpoint answering with a hosted payment page.
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectUrl {
    #[serde(default)]
    pub url: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// Customer details for checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// A line sent to `POST /orders/create-checkout-session`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem<'a> {
    #[serde(rename = "_id")]
    pub id: &'a ProductId,
    pub title: &'a str,
    pub price: Money,
    pub quantity: u32,
    pub image_url: Option<&'a str>,
}

/// Body of `POST /orders/create-checkout-session`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub items: Vec<CheckoutItem<'a>>,
    pub customer_info: &'a OrderCustomer,
}

/// A line on a placed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub title: String,
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A placed product order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub customer_info: Option<OrderCustomer>,
    pub total_amount: Money,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Gift cards
// =============================================================================

/// Physical cards are posted; virtual ones are emailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GiftCardType {
    #[default]
    Virtual,
    Physical,
}

/// Body of `POST /gift-cards/purchase`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardPurchase<'a> {
    pub amount: Money,
    pub card_type: GiftCardType,
    pub purchaser_name: &'a str,
    pub purchaser_email: &'a str,
    pub recipient_name: &'a str,
    pub recipient_email: &'a str,
    pub message: &'a str,
}

/// Response of gift-card purchase and validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "amount")]
    pub balance: Option<Money>,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of `POST /gift-cards/redeem`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardRedemption<'a> {
    pub code: &'a str,
    pub booking_id: &'a BookingId,
}

// =============================================================================
// Jobs
// =============================================================================

/// A job listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(alias = "_id")]
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of `POST /jobs/apply`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication<'a> {
    pub job_id: &'a JobId,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub message: &'a str,
}

// =============================================================================
// Guest bookings & availability
// =============================================================================

/// A bookable start time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slot {
    pub time: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}

/// Response of `GET /availability/check`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotList {
    #[serde(default)]
    pub slots: Vec<Slot>,
}

/// The branch a booking is for, as the backend expects it embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRef {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// Guest contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Body of `POST /guest-bookings/check-payment-eligibility`.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityRequest<'a> {
    pub email: &'a str,
    pub phone: &'a str,
}

/// Response of the eligibility check.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    #[serde(default)]
    pub can_pay_at_venue: bool,
}

/// Body of `POST /guest-bookings/create-setup-intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntentRequest<'a> {
    pub customer_info: &'a GuestCustomer,
}

/// Response of the setup-intent call.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntent {
    pub client_secret: String,
    #[serde(default)]
    pub setup_intent_id: Option<String>,
}

impl std::fmt::Debug for SetupIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupIntent")
            .field("client_secret", &"[REDACTED]")
            .field("setup_intent_id", &self.setup_intent_id)
            .finish()
    }
}

/// One service line on a guest booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBookingService {
    pub service_id: ServiceId,
    pub service_name: String,
    pub price: Money,
    pub duration: u32,
}

/// Body of `POST /guest-bookings/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBookingRequest {
    pub customer_info: GuestCustomer,
    pub services: Vec<GuestBookingService>,
    /// `null` means any available barber.
    pub barber: Option<BarberId>,
    pub date: String,
    pub time: String,
    pub location: BranchRef,
    pub notes: String,
    pub cancellation_policy_accepted: bool,
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_intent_id: Option<String>,
}

/// Response of guest booking creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestBookingCreated {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub booking: Option<serde_json::Value>,
}

/// Error body shape used by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
