//! Account pages: bookings, new account bookings, booking payments, gift
//! card redemption, reviews and order history.
//!
//! All handlers require a signed-in customer. A token the backend rejects
//! propagates as `ApiError::Unauthorized`, which signs the customer out and
//! sends them to the login page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveTime};
use delegends_core::{BarberId, BookingId, BookingStatus, ServiceId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{
    ApiError, Barber, BarberRef, Booking, BranchRef, GiftCardRedemption, NewBooking, NewReview,
    Order, PaymentStatusUpdate, Review, Service,
};
use crate::booking::today;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::page::{Flash, PageContext, set_flash};
use crate::payments::{PaymentReturn, PaymentReturnQuery, hosted_redirect};
use crate::state::AppState;
use crate::stores::BookingCart;

/// Booking display data for templates.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub id: String,
    pub service_name: String,
    pub barber_name: Option<String>,
    pub date: String,
    pub time: String,
    pub price: Option<String>,
    pub status: &'static str,
    pub location: Option<String>,
    pub is_paid: bool,
    pub can_pay: bool,
    pub can_review: bool,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        let barber_name = booking.barber.as_ref().and_then(|barber| match barber {
            BarberRef::Populated(barber) => Some(barber.name.clone()),
            BarberRef::Id(_) => None,
        });
        Self {
            id: booking.id.to_string(),
            service_name: booking.service_name.clone().unwrap_or_default(),
            barber_name,
            // Dates arrive as either `YYYY-MM-DD` or a full timestamp
            date: booking.date.chars().take(10).collect(),
            time: booking.time.clone(),
            price: booking.price.map(|p| p.to_string()),
            status: booking.status.as_str(),
            location: booking
                .location
                .as_ref()
                .or(booking.salon.as_ref())
                .map(|named| named.name.clone()),
            is_paid: booking.is_paid,
            can_pay: booking.status.is_payable() && !booking.is_paid,
            can_review: booking.status.is_reviewable() && !booking.has_review,
        }
    }
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub number: String,
    pub date: Option<String>,
    pub items: Vec<(String, u32, String)>,
    pub total: String,
    pub payment_status: &'static str,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order
                .order_number
                .clone()
                .unwrap_or_else(|| order.id.to_string()),
            date: order
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string()),
            items: order
                .items
                .iter()
                .map(|item| (item.title.clone(), item.quantity, item.price.to_string()))
                .collect(),
            total: order.total_amount.to_string(),
            payment_status: order.payment_status.as_str(),
        }
    }
}

/// Review display data for templates.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub service_name: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub date: Option<String>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            service_name: review.service_name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            date: review.created_at.map(|at| at.format("%Y-%m-%d").to_string()),
        }
    }
}

/// My bookings template.
#[derive(Template, WebTemplate)]
#[template(path = "account/bookings.html")]
pub struct BookingsTemplate {
    pub page: PageContext,
    pub bookings: Vec<BookingView>,
    pub reviews: Vec<ReviewView>,
    /// Branch for the new booking form, if one was chosen.
    pub location: Option<BranchRef>,
    pub services: Vec<Service>,
    pub barbers: Vec<Barber>,
    pub min_date: String,
}

/// My orders template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// New account booking form. An empty barber means any available barber.
#[derive(Debug, Default, Deserialize)]
pub struct NewBookingForm {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub barber: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

/// Gift card redemption form.
#[derive(Debug, Deserialize)]
pub struct RedeemForm {
    #[serde(default)]
    pub code: String,
}

/// Whether one of the customer's live bookings already holds this barber
/// at this date and time.
fn is_double_booked(bookings: &[Booking], barber: &BarberId, date: NaiveDate, time: &str) -> bool {
    let date = date.format("%Y-%m-%d").to_string();
    bookings.iter().any(|booking| {
        booking.status != BookingStatus::Cancelled
            && booking.barber.as_ref().and_then(BarberRef::id) == Some(barber.as_str())
            && booking.date.starts_with(&date)
            && booking.time == time
    })
}

/// Banner text for a failed backend call. A rejected token is not shown
/// inline; it propagates and ends the session.
fn inline_error(e: ApiError, fallback: &str) -> Result<String> {
    if matches!(e, ApiError::Unauthorized) {
        return Err(AppError::Api(e));
    }
    tracing::warn!(error = %e, "Account request failed");
    Ok(e.user_message(fallback).to_string())
}

/// Record the outcome of a hosted booking payment.
async fn handle_payment_return(
    state: &AppState,
    token: &str,
    outcome: PaymentReturn,
) -> Result<Flash> {
    match outcome {
        PaymentReturn::Success(booking_id) => {
            match state
                .api()
                .update_booking_payment(token, &booking_id, &PaymentStatusUpdate::paid())
                .await
            {
                Ok(_) => {
                    tracing::info!(booking_id = %booking_id, "Booking marked paid");
                    Ok(Flash::success("bookings.paymentSuccess"))
                }
                Err(e) => Ok(Flash::error(inline_error(
                    e,
                    "bookings.errors.paymentUpdateFailed",
                )?)),
            }
        }
        PaymentReturn::Cancelled => Ok(Flash::info("bookings.paymentCancelled")),
    }
}

/// Display the customer's bookings.
///
/// Also the return target of the hosted booking payment
/// (`?payment=success&booking_id=…` or `?payment=cancelled`).
#[instrument(skip(state, session, user, page))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PaymentReturnQuery>,
    mut page: PageContext,
) -> Result<impl IntoResponse> {
    if let Some(outcome) = query.outcome() {
        page.flash = Some(handle_payment_return(&state, &user.token, outcome).await?);
    }

    let bookings = state.api().my_bookings(&user.token).await?;
    let reviews = match state.api().my_reviews(&user.token).await {
        Ok(reviews) => reviews,
        Err(e) => {
            inline_error(e, "bookings.errors.reviewFailed")?;
            Vec::new()
        }
    };

    // The new booking form is optional; catalog failures just hide it
    let services = state.api().list_services().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load services for account booking");
        Vec::new()
    });
    let barbers = state.api().list_barbers().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load barbers for account booking");
        Vec::new()
    });

    Ok(BookingsTemplate {
        page,
        bookings: bookings.iter().map(BookingView::from).collect(),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        location: BookingCart::load(&session).await.details.location,
        services,
        barbers,
        min_date: today().format("%Y-%m-%d").to_string(),
    })
}

async fn refuse(session: &Session, key: &str) -> Result<Redirect> {
    set_flash(session, Flash::error(key)).await;
    Ok(Redirect::to("/bookings"))
}

/// Book an appointment on the customer's account at the chosen branch.
///
/// Refuses a barber the customer already holds at that date and time.
#[instrument(skip(state, session, user, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<NewBookingForm>,
) -> Result<Redirect> {
    let Some(location) = BookingCart::load(&session).await.details.location else {
        set_flash(&session, Flash::error("booking.errors.noLocation")).await;
        return Ok(Redirect::to("/select-location"));
    };

    let Ok(date) = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d") else {
        return refuse(&session, "booking.errors.missingSchedule").await;
    };
    if date < today() {
        return refuse(&session, "booking.errors.dateInPast").await;
    }
    let time = form.time.trim();
    if NaiveTime::parse_from_str(time, "%H:%M").is_err() {
        return refuse(&session, "booking.errors.invalidTime").await;
    }

    let services = match state.api().list_services().await {
        Ok(services) => services,
        Err(e) => {
            let message = inline_error(e, "bookings.errors.bookingFailed")?;
            set_flash(&session, Flash::error(message)).await;
            return Ok(Redirect::to("/bookings"));
        }
    };
    let service_id = ServiceId::from(form.service_id.trim());
    let Some(service) = services.iter().find(|s| s.id == service_id) else {
        return refuse(&session, "bookings.errors.unknownService").await;
    };

    let barber = Some(form.barber.trim())
        .filter(|b| !b.is_empty())
        .map(BarberId::from);
    if let Some(barber) = &barber {
        let existing = state.api().my_bookings(&user.token).await?;
        if is_double_booked(&existing, barber, date, time) {
            return refuse(&session, "bookings.errors.doubleBooked").await;
        }
    }

    let date = date.format("%Y-%m-%d").to_string();
    let booking = NewBooking {
        service: &service.id,
        service_name: &service.name,
        barber: barber.as_ref(),
        date: &date,
        time,
        price: service.price,
        notes: form.notes.trim(),
        location: &location,
    };
    let flash = match state.api().create_booking(&user.token, &booking).await {
        Ok(created) => {
            tracing::info!(booking_id = %created.id, location = %location.id, "Account booking created");
            Flash::success("bookings.created")
        }
        Err(e) => Flash::error(inline_error(e, "bookings.errors.bookingFailed")?),
    };

    set_flash(&session, flash).await;
    Ok(Redirect::to("/bookings"))
}

/// Apply a gift card to one of the customer's bookings.
#[instrument(skip(state, session, user, form))]
pub async fn redeem_gift_card(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(booking_id): Path<BookingId>,
    Form(form): Form<RedeemForm>,
) -> Result<Redirect> {
    let code = form.code.trim();
    if code.is_empty() {
        return refuse(&session, "bookings.errors.missingCode").await;
    }

    let redemption = GiftCardRedemption {
        code,
        booking_id: &booking_id,
    };
    let flash = match state.api().redeem_gift_card(&user.token, &redemption).await {
        Ok(_) => {
            tracing::info!(booking_id = %booking_id, "Gift card redeemed");
            Flash::success("bookings.giftCardApplied")
        }
        Err(e) => Flash::error(inline_error(e, "bookings.errors.redeemFailed")?),
    };

    set_flash(&session, flash).await;
    Ok(Redirect::to("/bookings"))
}

/// Start a hosted payment for an unpaid booking.
#[instrument(skip(state, session, user))]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(booking_id): Path<BookingId>,
) -> Result<Response> {
    let error = match state
        .api()
        .create_booking_payment_session(&user.token, &booking_id)
        .await
    {
        Ok(response) => match hosted_redirect(response) {
            Ok(url) => return Ok(Redirect::to(&url).into_response()),
            Err(e) => e.message_key().to_string(),
        },
        Err(e) => inline_error(e, "bookings.errors.paymentUnavailable")?,
    };

    set_flash(&session, Flash::error(error)).await;
    Ok(Redirect::to("/bookings").into_response())
}

/// Review a completed booking.
#[instrument(skip(state, session, user, form))]
pub async fn review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(booking_id): Path<BookingId>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect> {
    let comment = form.comment.trim();
    if !(1..=5).contains(&form.rating) {
        set_flash(&session, Flash::error("bookings.errors.invalidRating")).await;
        return Ok(Redirect::to("/bookings"));
    }
    if comment.is_empty() {
        set_flash(&session, Flash::error("bookings.errors.missingComment")).await;
        return Ok(Redirect::to("/bookings"));
    }

    let review = NewReview {
        booking_id: &booking_id,
        rating: form.rating,
        comment,
    };
    let flash = match state.api().create_review(&user.token, &review).await {
        Ok(_) => {
            tracing::info!(booking_id = %booking_id, rating = form.rating, "Review submitted");
            Flash::success("bookings.reviewSubmitted")
        }
        Err(e) => Flash::error(inline_error(e, "bookings.errors.reviewFailed")?),
    };

    set_flash(&session, flash).await;
    Ok(Redirect::to("/bookings"))
}

/// Display the customer's product orders.
#[instrument(skip(state, user, page))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let orders = state.api().my_orders(&user.token).await?;
    Ok(OrdersTemplate {
        page,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Create the account routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(index).post(create))
        .route("/bookings/{id}/pay", post(pay))
        .route("/bookings/{id}/gift-card", post(redeem_gift_card))
        .route("/bookings/{id}/review", post(review))
        .route("/my-orders", get(orders))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn booking(json: serde_json::Value) -> Booking {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_booking_view_actions() {
        let unpaid = BookingView::from(&booking(serde_json::json!({
            "_id": "b1",
            "serviceName": "Haircut",
            "barber": { "name": "Tomas" },
            "date": "2025-03-01T00:00:00.000Z",
            "time": "10:00",
            "status": "confirmed",
            "isPaid": false
        })));
        assert_eq!(unpaid.date, "2025-03-01");
        assert_eq!(unpaid.barber_name.as_deref(), Some("Tomas"));
        assert!(unpaid.can_pay);
        assert!(!unpaid.can_review);

        let done = BookingView::from(&booking(serde_json::json!({
            "_id": "b2",
            "barber": "barber-id",
            "date": "2025-02-01",
            "time": "12:00",
            "status": "completed",
            "isPaid": true,
            "hasReview": false
        })));
        assert!(done.barber_name.is_none());
        assert!(!done.can_pay);
        assert!(done.can_review);
    }

    #[test]
    fn test_double_booking_matches_live_bookings_only() {
        let bookings = vec![
            booking(serde_json::json!({
                "_id": "b1",
                "barber": { "_id": "barber-1", "name": "Tomas" },
                "date": "2099-05-01T00:00:00.000Z",
                "time": "10:00",
                "status": "confirmed"
            })),
            booking(serde_json::json!({
                "_id": "b2",
                "barber": "barber-2",
                "date": "2099-05-01",
                "time": "11:00",
                "status": "cancelled"
            })),
        ];
        let date = NaiveDate::from_ymd_opt(2099, 5, 1).unwrap();

        assert!(is_double_booked(&bookings, &BarberId::new("barber-1"), date, "10:00"));
        assert!(!is_double_booked(&bookings, &BarberId::new("barber-1"), date, "10:30"));
        assert!(!is_double_booked(&bookings, &BarberId::new("barber-3"), date, "10:00"));
        // Cancelled bookings free the slot
        assert!(!is_double_booked(&bookings, &BarberId::new("barber-2"), date, "11:00"));
    }

    #[test]
    fn test_inline_error_propagates_unauthorized() {
        assert!(inline_error(ApiError::Unauthorized, "x").is_err());
        assert_eq!(
            inline_error(
                ApiError::Api {
                    status: 422,
                    message: "Already reviewed".to_string()
                },
                "x"
            )
            .unwrap(),
            "Already reviewed"
        );
    }
}
