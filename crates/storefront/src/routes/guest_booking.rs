//! Guest booking wizard.
//!
//! Every step is a plain form that posts back and redirects to
//! `GET /guest-booking`, which renders the current step from the session.
//! Validation failures are shown as a flash banner on that render.
//!
//! Card bookings take one extra round trip: the page asks for a setup
//! intent (`POST /guest-booking/setup-intent`), Stripe.js confirms the card
//! in the browser, and the form is submitted to `/guest-booking/complete`
//! with the confirmed setup intent id.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use delegends_core::{BarberId, PaymentType, ServiceId};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{
    BranchRef, EligibilityRequest, GuestBookingRequest, GuestCustomer, SetupIntentRequest,
    Service, Slot,
};
use crate::booking::{ContactDetails, GuestBookingDraft, WizardError, WizardStep, today};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::i18n::Translator;
use crate::page::{Flash, PageContext, set_flash, translator_for};
use crate::state::AppState;
use crate::stores::{BookingCart, BookingCartError, BookingDetailsPatch, SelectedService};

const WIZARD_PATH: &str = "/guest-booking";

fn back_to_wizard() -> Response {
    Redirect::to(WIZARD_PATH).into_response()
}

// =============================================================================
// View types
// =============================================================================

/// Progress indicator entry.
#[derive(Debug, Clone)]
pub struct StepView {
    pub number: u8,
    pub title: String,
    pub active: bool,
    pub done: bool,
}

/// A backend service offered on the first step.
#[derive(Debug, Clone)]
pub struct ServiceOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: u32,
    pub selected: bool,
}

/// A barber offered on the schedule step.
#[derive(Debug, Clone)]
pub struct BarberOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// A start time offered on the schedule step.
#[derive(Debug, Clone)]
pub struct SlotView {
    pub time: String,
    pub available: bool,
    pub selected: bool,
}

fn slot_views(slots: Vec<Slot>, selected: Option<&str>) -> Vec<SlotView> {
    slots
        .into_iter()
        .map(|slot| SlotView {
            selected: selected == Some(slot.time.as_str()),
            time: slot.time,
            available: slot.available,
        })
        .collect()
}

/// What was booked, for the confirmation page.
#[derive(Debug, Clone)]
pub struct BookingSummary {
    pub services: Vec<String>,
    pub date: String,
    pub time: String,
    pub location: String,
    pub total: String,
    pub email: String,
    pub pay_at_venue: bool,
}

impl From<&GuestBookingRequest> for BookingSummary {
    fn from(request: &GuestBookingRequest) -> Self {
        Self {
            services: request
                .services
                .iter()
                .map(|s| s.service_name.clone())
                .collect(),
            date: request.date.clone(),
            time: request.time.clone(),
            location: request.location.name.clone(),
            total: request
                .services
                .iter()
                .map(|s| s.price)
                .sum::<delegends_core::Money>()
                .to_string(),
            email: request.customer_info.email.clone(),
            pay_at_venue: request.payment_type == PaymentType::PayAtVenue,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Wizard page template.
#[derive(Template, WebTemplate)]
#[template(path = "booking/wizard.html")]
pub struct WizardTemplate {
    pub page: PageContext,
    pub t: Translator,
    pub step_number: u8,
    pub steps: Vec<StepView>,
    pub location: BranchRef,
    pub services: Vec<ServiceOption>,
    pub services_unavailable: bool,
    pub selected: Vec<SelectedService>,
    pub total_price: String,
    pub total_duration: u32,
    pub barbers: Vec<BarberOption>,
    pub any_barber: bool,
    pub date: String,
    pub min_date: String,
    pub slots: Vec<SlotView>,
    pub notes: String,
    pub customer: GuestCustomer,
    pub policy_accepted: bool,
    pub can_pay_at_venue: bool,
    pub pay_at_venue: bool,
}

/// Slot picker fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/slots.html")]
pub struct SlotsTemplate {
    pub t: Translator,
    pub slots: Vec<SlotView>,
}

/// Booking confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "booking/confirmed.html")]
pub struct BookingConfirmedTemplate {
    pub page: PageContext,
    pub summary: BookingSummary,
}

// =============================================================================
// Forms
// =============================================================================

/// Service selection form.
#[derive(Debug, Deserialize)]
pub struct ServiceForm {
    pub service_id: ServiceId,
}

/// Schedule step form. An empty barber means any available barber.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleForm {
    #[serde(default)]
    pub barber: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Present when the "continue" button was used.
    #[serde(default)]
    pub advance: Option<String>,
}

/// Contact step form.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub policy_accepted: Option<String>,
    #[serde(default)]
    pub advance: Option<String>,
}

impl ContactForm {
    fn details(&self) -> ContactDetails {
        ContactDetails {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            policy_accepted: self.policy_accepted.clone(),
        }
    }
}

/// Slot fragment query.
#[derive(Debug, Default, Deserialize)]
pub struct SlotsQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub barber: Option<String>,
}

/// Payment choice form.
#[derive(Debug, Deserialize)]
pub struct PaymentTypeForm {
    pub payment_type: String,
}

/// Card booking submission form.
#[derive(Debug, Deserialize)]
pub struct CompleteForm {
    #[serde(default)]
    pub setup_intent_id: String,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn parse_barber(raw: Option<&str>) -> Option<BarberId> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(BarberId::from)
}

// =============================================================================
// Handlers
// =============================================================================

/// Available start times; failures give an empty list.
async fn load_slots(
    state: &AppState,
    date: NaiveDate,
    location: &BranchRef,
    barber: Option<&BarberId>,
) -> Vec<Slot> {
    let date = date.format("%Y-%m-%d").to_string();
    match state.api().check_availability(&date, &location.id, barber).await {
        Ok(list) => list.slots,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load availability");
            Vec::new()
        }
    }
}

/// Display the wizard at the draft's current step.
///
/// Without a chosen branch the visitor is sent to pick one first.
#[instrument(skip(state, session, page))]
pub async fn show(State(state): State<AppState>, session: Session, page: PageContext) -> Response {
    let cart = BookingCart::load(&session).await;
    let Some(location) = cart.details.location.clone() else {
        return Redirect::to("/select-location").into_response();
    };
    let draft = GuestBookingDraft::load(&session).await;
    let t = page.translator().clone();

    let (services, services_unavailable): (Vec<Service>, bool) =
        match state.api().list_services().await {
            Ok(services) => (services, false),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load services for booking");
                (Vec::new(), true)
            }
        };

    let barbers = if draft.step == WizardStep::Schedule {
        state.api().list_barbers().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load barbers for booking");
            Vec::new()
        })
    } else {
        Vec::new()
    };

    let slots = match (draft.step, cart.details.date) {
        (WizardStep::Schedule, Some(date)) => {
            load_slots(&state, date, &location, cart.details.barber.as_ref()).await
        }
        _ => Vec::new(),
    };

    let steps = WizardStep::ALL
        .iter()
        .map(|step| StepView {
            number: step.number(),
            title: t.t(step.title_key()).to_string(),
            active: *step == draft.step,
            done: *step < draft.step,
        })
        .collect();

    WizardTemplate {
        step_number: draft.step.number(),
        steps,
        location,
        services: services
            .iter()
            .map(|service| ServiceOption {
                id: service.id.to_string(),
                name: service.name.clone(),
                description: service.description.clone(),
                price: service.price.to_string(),
                duration: service.duration,
                selected: cart.contains(&service.id),
            })
            .collect(),
        services_unavailable,
        selected: cart.services().to_vec(),
        total_price: cart.total_price().to_string(),
        total_duration: cart.total_duration(),
        barbers: barbers
            .iter()
            .map(|barber| BarberOption {
                id: barber.id.to_string(),
                name: barber.name.clone(),
                selected: cart.details.barber.as_ref() == Some(&barber.id),
            })
            .collect(),
        any_barber: cart.details.barber.is_none(),
        date: cart
            .details
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        min_date: today().format("%Y-%m-%d").to_string(),
        slots: slot_views(slots, cart.details.time.as_deref()),
        notes: draft.notes.clone(),
        customer: draft.customer.clone(),
        policy_accepted: draft.policy_accepted,
        can_pay_at_venue: draft.can_pay_at_venue,
        pay_at_venue: draft.payment_type == PaymentType::PayAtVenue,
        t,
        page,
    }
    .into_response()
}

/// Add a backend service to the booking.
#[instrument(skip(state, session))]
pub async fn add_service(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    let services = match state.api().list_services().await {
        Ok(services) => services,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load services for booking");
            set_flash(&session, Flash::error("servicesPage.bookingUnavailable")).await;
            return Ok(back_to_wizard());
        }
    };
    let Some(service) = services.iter().find(|s| s.id == form.service_id) else {
        set_flash(&session, Flash::error("servicesPage.unknownService")).await;
        return Ok(back_to_wizard());
    };

    let mut cart = BookingCart::load(&session).await;
    match cart.add_service(SelectedService::from(service)) {
        Ok(()) => cart.save(&session).await?,
        Err(BookingCartError::AlreadyInCart(_)) => {
            set_flash(&session, Flash::info("servicesPage.alreadySelected")).await;
        }
    }
    Ok(back_to_wizard())
}

/// Remove a service from the booking.
#[instrument(skip(session))]
pub async fn remove_service(session: Session, Form(form): Form<ServiceForm>) -> Result<Response> {
    let mut cart = BookingCart::load(&session).await;
    if cart.remove_service(&form.service_id) {
        cart.save(&session).await?;
    }
    Ok(back_to_wizard())
}

/// Drop every selected service. The branch and schedule stay.
#[instrument(skip(session))]
pub async fn clear_services(session: Session) -> Result<Response> {
    let mut cart = BookingCart::load(&session).await;
    cart.clear_services(&session).await?;
    Ok(back_to_wizard())
}

/// Save barber, date, time and notes.
#[instrument(skip(state, session, form))]
pub async fn schedule(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ScheduleForm>,
) -> Result<Response> {
    let mut cart = BookingCart::load(&session).await;
    let mut draft = GuestBookingDraft::load(&session).await;

    cart.update_details(BookingDetailsPatch {
        barber: form.barber.as_deref().map(|b| parse_barber(Some(b))),
        date: parse_date(form.date.as_deref()),
        time: form.time.filter(|t| !t.is_empty()),
        location: None,
    });
    if let Some(notes) = form.notes {
        draft.notes = notes;
    }

    if form.advance.is_some() {
        try_advance(&state, &session, &cart, &mut draft).await;
    }

    cart.save(&session).await?;
    draft.save(&session).await?;
    Ok(back_to_wizard())
}

/// Slot picker fragment for the chosen date and barber.
#[instrument(skip(state, session))]
pub async fn slots(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SlotsQuery>,
) -> impl IntoResponse {
    let t = translator_for(&state, &session).await;
    let cart = BookingCart::load(&session).await;

    let slots = match (parse_date(query.date.as_deref()), &cart.details.location) {
        (Some(date), Some(location)) => {
            let barber = parse_barber(query.barber.as_deref());
            load_slots(&state, date, location, barber.as_ref()).await
        }
        _ => Vec::new(),
    };

    SlotsTemplate {
        t,
        slots: slot_views(slots, cart.details.time.as_deref()),
    }
}

/// Ask the backend whether pay-at-venue is allowed. Failure counts as no.
async fn refresh_eligibility(state: &AppState, draft: &mut GuestBookingDraft) {
    if !draft.can_check_eligibility() {
        return;
    }
    let request = EligibilityRequest {
        email: draft.customer.email.trim(),
        phone: draft.customer.phone.trim(),
    };
    let allowed = match state.api().check_payment_eligibility(&request).await {
        Ok(eligibility) => eligibility.can_pay_at_venue,
        Err(e) => {
            tracing::warn!(error = %e, "Payment eligibility check failed");
            false
        }
    };
    draft.apply_eligibility(allowed);
}

/// Advance one step, flashing the reason when the step is incomplete.
async fn try_advance(
    state: &AppState,
    session: &Session,
    cart: &BookingCart,
    draft: &mut GuestBookingDraft,
) {
    if draft.step == WizardStep::Contact {
        refresh_eligibility(state, draft).await;
    }
    if let Err(e) = draft.advance(cart, today()) {
        tracing::debug!(step = draft.step.number(), error = %e, "Wizard step incomplete");
        set_flash(session, Flash::error(e.message_key())).await;
    }
}

/// Save contact details and the policy checkbox.
#[instrument(skip(state, session, form))]
pub async fn contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let cart = BookingCart::load(&session).await;
    let mut draft = GuestBookingDraft::load(&session).await;

    draft.update_contact(&form.details());
    if form.advance.is_some() {
        try_advance(&state, &session, &cart, &mut draft).await;
    } else {
        refresh_eligibility(&state, &mut draft).await;
    }

    draft.save(&session).await?;
    Ok(back_to_wizard())
}

/// Continue to the next step.
#[instrument(skip(state, session))]
pub async fn next(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = BookingCart::load(&session).await;
    let mut draft = GuestBookingDraft::load(&session).await;
    try_advance(&state, &session, &cart, &mut draft).await;
    draft.save(&session).await?;
    Ok(back_to_wizard())
}

/// Go back one step.
#[instrument(skip(session))]
pub async fn back(session: Session) -> Result<Response> {
    let mut draft = GuestBookingDraft::load(&session).await;
    draft.back();
    draft.save(&session).await?;
    Ok(back_to_wizard())
}

/// Choose card or pay-at-venue.
#[instrument(skip(session))]
pub async fn payment_type(
    session: Session,
    Form(form): Form<PaymentTypeForm>,
) -> Result<Response> {
    let mut draft = GuestBookingDraft::load(&session).await;
    let chosen = form
        .payment_type
        .parse::<PaymentType>()
        .map_err(|_| WizardError::PayAtVenueNotAllowed)
        .and_then(|payment_type| draft.set_payment_type(payment_type));

    match chosen {
        Ok(()) => draft.save(&session).await?,
        Err(e) => set_flash(&session, Flash::error(e.message_key())).await,
    }
    Ok(back_to_wizard())
}

/// Send the booking and clear all booking state on success.
async fn submit_booking(
    state: &AppState,
    session: &Session,
    page: PageContext,
    setup_intent_id: Option<String>,
) -> Result<Response> {
    let mut cart = BookingCart::load(session).await;
    let draft = GuestBookingDraft::load(session).await;

    let request = match draft.build_request(&cart, today(), setup_intent_id) {
        Ok(request) => request,
        Err(e) => {
            set_flash(session, Flash::error(e.message_key())).await;
            return Ok(back_to_wizard());
        }
    };

    if let Err(e) = state.api().create_guest_booking(&request).await {
        tracing::warn!(error = %e, "Guest booking failed");
        let message = e.user_message("booking.errors.submitFailed").to_string();
        set_flash(session, Flash::error(message)).await;
        return Ok(back_to_wizard());
    }

    tracing::info!(
        location = %request.location.id,
        payment_type = request.payment_type.as_str(),
        services = request.services.len(),
        "Guest booking created"
    );
    add_breadcrumb(
        "booking",
        "Guest booking created",
        Some(&[("location", request.location.id.as_str())]),
    );

    cart.clear_all(session).await?;
    GuestBookingDraft::clear_persisted(session).await?;

    Ok(BookingConfirmedTemplate {
        page,
        summary: BookingSummary::from(&request),
    }
    .into_response())
}

/// Submit a pay-at-venue booking.
#[instrument(skip(state, session, page))]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> Result<Response> {
    submit_booking(&state, &session, page, None).await
}

/// Create a setup intent for card bookings.
///
/// Answers JSON `{clientSecret}` for Stripe.js, or `{error}` with a
/// translated message.
#[instrument(skip(state, session))]
pub async fn setup_intent(State(state): State<AppState>, session: Session) -> Response {
    let t = translator_for(&state, &session).await;
    let cart = BookingCart::load(&session).await;
    let draft = GuestBookingDraft::load(&session).await;

    let ready = [WizardStep::Services, WizardStep::Schedule, WizardStep::Contact]
        .into_iter()
        .try_for_each(|step| draft.validate_step(step, &cart, today()));
    if let Err(e) = ready {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": t.t(e.message_key()) })),
        )
            .into_response();
    }

    let request = SetupIntentRequest {
        customer_info: &draft.customer,
    };
    match state.api().create_setup_intent(&request).await {
        Ok(intent) => Json(json!({
            "clientSecret": intent.client_secret,
            "setupIntentId": intent.setup_intent_id,
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create setup intent");
            let message = e.user_message(t.t("booking.errors.cardSetupFailed"));
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": message }))).into_response()
        }
    }
}

/// Submit a card booking after Stripe.js confirmed the card.
#[instrument(skip(state, session, page, form))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<CompleteForm>,
) -> Result<Response> {
    submit_booking(&state, &session, page, Some(form.setup_intent_id)).await
}

/// Create the guest booking routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show))
        .route("/services/add", post(add_service))
        .route("/services/remove", post(remove_service))
        .route("/services/clear", post(clear_services))
        .route("/schedule", post(schedule))
        .route("/slots", get(slots))
        .route("/contact", post(contact))
        .route("/next", post(next))
        .route("/back", post(back))
        .route("/payment-type", post(payment_type))
        .route("/confirm", post(confirm))
        .route("/setup-intent", post(setup_intent))
        .route("/complete", post(complete))
}
