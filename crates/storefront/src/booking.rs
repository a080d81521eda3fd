//! Guest booking wizard.
//!
//! Four linear steps: services, date and time, contact details, payment.
//! The selected services and the schedule live on the [`BookingCart`];
//! everything else the wizard collects lives on the [`GuestBookingDraft`].
//! Both are persisted in the session between requests.
//!
//! Advancing validates the current step and refuses to move on while it is
//! incomplete. Submission re-validates every step before building the
//! backend request.

use chrono::{NaiveDate, NaiveTime};
use delegends_core::{Email, EmailError, PaymentType, Phone, PhoneError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;

use crate::api::{GuestBookingRequest, GuestBookingService, GuestCustomer};
use crate::models::session_keys;
use crate::stores::BookingCart;

/// Today's date for booking checks.
///
/// Uses the server's local timezone, so the server runs with
/// `TZ=Europe/Vilnius`.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Services,
    Schedule,
    Contact,
    Payment,
}

impl WizardStep {
    pub const ALL: [Self; 4] = [Self::Services, Self::Schedule, Self::Contact, Self::Payment];

    /// 1-based position.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Services => 1,
            Self::Schedule => 2,
            Self::Contact => 3,
            Self::Payment => 4,
        }
    }

    /// Translation key of the step title.
    #[must_use]
    pub const fn title_key(self) -> &'static str {
        match self {
            Self::Services => "booking.stepServices",
            Self::Schedule => "booking.stepSchedule",
            Self::Contact => "booking.stepContact",
            Self::Payment => "booking.stepPayment",
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Services => Self::Schedule,
            Self::Schedule => Self::Contact,
            Self::Contact | Self::Payment => Self::Payment,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Services | Self::Schedule => Self::Services,
            Self::Contact => Self::Schedule,
            Self::Payment => Self::Contact,
        }
    }
}

/// Reasons the wizard refuses to continue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please select at least one service")]
    NoServices,

    #[error("Please select date and time")]
    MissingSchedule,

    #[error("Please pick a date that is not in the past")]
    DateInPast,

    #[error("Please pick a valid time")]
    InvalidTime,

    #[error("Please fill in all customer information")]
    MissingCustomerInfo,

    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("Please accept the cancellation policy")]
    PolicyNotAccepted,

    #[error("Please select a location")]
    NoLocation,

    #[error("Pay at venue is not available for this booking")]
    PayAtVenueNotAllowed,

    #[error("Card details have not been confirmed")]
    MissingCardSetup,
}

impl WizardError {
    /// Translation key for the inline message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::NoServices => "booking.errors.noServices",
            Self::MissingSchedule => "booking.errors.missingSchedule",
            Self::DateInPast => "booking.errors.dateInPast",
            Self::InvalidTime => "booking.errors.invalidTime",
            Self::MissingCustomerInfo => "booking.errors.missingCustomerInfo",
            Self::InvalidEmail(_) => "booking.errors.invalidEmail",
            Self::InvalidPhone(_) => "booking.errors.invalidPhone",
            Self::PolicyNotAccepted => "booking.errors.policyNotAccepted",
            Self::NoLocation => "booking.errors.noLocation",
            Self::PayAtVenueNotAllowed => "booking.errors.payAtVenueNotAllowed",
            Self::MissingCardSetup => "booking.errors.missingCardSetup",
        }
    }
}

/// Contact step input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub policy_accepted: Option<String>,
}

/// Wizard progress other than services and schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestBookingDraft {
    pub step: WizardStep,
    pub notes: String,
    pub customer: GuestCustomer,
    pub policy_accepted: bool,
    /// As last reported by the backend eligibility check.
    pub can_pay_at_venue: bool,
    pub payment_type: PaymentType,
}

impl GuestBookingDraft {
    /// Load the draft, starting fresh when absent.
    pub async fn load(session: &Session) -> Self {
        crate::stores::load_or_default(session, session_keys::BOOKING_DRAFT).await
    }

    /// Persist the draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        crate::stores::store(session, session_keys::BOOKING_DRAFT, self).await
    }

    /// Remove the persisted draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_persisted(session: &Session) -> Result<(), tower_sessions::session::Error> {
        crate::stores::remove_key(session, session_keys::BOOKING_DRAFT).await
    }

    /// Check one step's requirements.
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement.
    pub fn validate_step(
        &self,
        step: WizardStep,
        cart: &BookingCart,
        today: NaiveDate,
    ) -> Result<(), WizardError> {
        match step {
            WizardStep::Services => {
                if cart.is_empty() {
                    return Err(WizardError::NoServices);
                }
            }
            WizardStep::Schedule => {
                let (Some(date), Some(time)) = (cart.details.date, cart.details.time.as_deref())
                else {
                    return Err(WizardError::MissingSchedule);
                };
                if date < today {
                    return Err(WizardError::DateInPast);
                }
                NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| WizardError::InvalidTime)?;
            }
            WizardStep::Contact => {
                let customer = &self.customer;
                if [&customer.name, &customer.email, &customer.phone]
                    .iter()
                    .any(|field| field.trim().is_empty())
                {
                    return Err(WizardError::MissingCustomerInfo);
                }
                Email::parse(&customer.email)?;
                Phone::parse(&customer.phone)?;
                if !self.policy_accepted {
                    return Err(WizardError::PolicyNotAccepted);
                }
            }
            WizardStep::Payment => {
                if self.payment_type == PaymentType::PayAtVenue && !self.can_pay_at_venue {
                    return Err(WizardError::PayAtVenueNotAllowed);
                }
            }
        }
        Ok(())
    }

    /// Move to the next step if the current one is complete. The payment
    /// step is the last one; advancing from it changes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement of the current step.
    pub fn advance(&mut self, cart: &BookingCart, today: NaiveDate) -> Result<WizardStep, WizardError> {
        if self.step != WizardStep::Payment {
            self.validate_step(self.step, cart, today)?;
            self.step = self.step.next();
        }
        Ok(self.step)
    }

    /// Go back one step (never before the first).
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.prev();
        self.step
    }

    /// Store contact step input, trimmed.
    pub fn update_contact(&mut self, details: &ContactDetails) {
        let customer = GuestCustomer {
            name: details.name.trim().to_string(),
            email: details.email.trim().to_string(),
            phone: details.phone.trim().to_string(),
        };
        // Eligibility belongs to the previous email and phone
        if customer.email != self.customer.email || customer.phone != self.customer.phone {
            self.apply_eligibility(false);
        }
        self.customer = customer;
        self.policy_accepted = details.policy_accepted.is_some();
    }

    /// Whether there is enough contact data to ask about pay-at-venue.
    #[must_use]
    pub fn can_check_eligibility(&self) -> bool {
        !self.customer.email.trim().is_empty() && !self.customer.phone.trim().is_empty()
    }

    /// Record the backend's eligibility answer. Ineligible customers are
    /// switched to card payment.
    pub fn apply_eligibility(&mut self, can_pay_at_venue: bool) {
        self.can_pay_at_venue = can_pay_at_venue;
        if !can_pay_at_venue {
            self.payment_type = PaymentType::Card;
        }
    }

    /// Choose how to pay.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::PayAtVenueNotAllowed` when pay-at-venue is
    /// chosen but the customer is not eligible.
    pub fn set_payment_type(&mut self, payment_type: PaymentType) -> Result<(), WizardError> {
        if payment_type == PaymentType::PayAtVenue && !self.can_pay_at_venue {
            return Err(WizardError::PayAtVenueNotAllowed);
        }
        self.payment_type = payment_type;
        Ok(())
    }

    /// Re-validate every step and build the backend request.
    ///
    /// Card bookings need the id of the confirmed card setup.
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement.
    pub fn build_request(
        &self,
        cart: &BookingCart,
        today: NaiveDate,
        setup_intent_id: Option<String>,
    ) -> Result<GuestBookingRequest, WizardError> {
        for step in WizardStep::ALL {
            self.validate_step(step, cart, today)?;
        }

        let location = cart.details.location.clone().ok_or(WizardError::NoLocation)?;
        let (Some(date), Some(time)) = (cart.details.date, cart.details.time.clone()) else {
            return Err(WizardError::MissingSchedule);
        };

        let setup_intent_id = match self.payment_type {
            PaymentType::Card => Some(
                setup_intent_id
                    .filter(|id| !id.trim().is_empty())
                    .ok_or(WizardError::MissingCardSetup)?,
            ),
            PaymentType::PayAtVenue => None,
        };

        Ok(GuestBookingRequest {
            customer_info: self.customer.clone(),
            services: cart
                .services()
                .iter()
                .map(|s| GuestBookingService {
                    service_id: s.id.clone(),
                    service_name: s.name.clone(),
                    price: s.price,
                    duration: s.duration,
                })
                .collect(),
            barber: cart.details.barber.clone(),
            date: date.format("%Y-%m-%d").to_string(),
            time,
            location,
            notes: self.notes.trim().to_string(),
            cancellation_policy_accepted: true,
            payment_type: self.payment_type,
            setup_intent_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use delegends_core::{Money, ServiceId};

    use super::*;
    use crate::api::BranchRef;
    use crate::stores::{BookingDetailsPatch, SelectedService};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn cart_with_service() -> BookingCart {
        let mut cart = BookingCart::default();
        cart.add_service(SelectedService {
            id: ServiceId::new("s1"),
            name: "Haircut".to_string(),
            description: String::new(),
            price: Money::from_cents(2499),
            duration: 30,
        })
        .unwrap();
        cart
    }

    fn scheduled_cart() -> BookingCart {
        let mut cart = cart_with_service();
        cart.update_details(BookingDetailsPatch {
            date: Some(today()),
            time: Some("10:30".to_string()),
            location: Some(BranchRef {
                id: "location-1".to_string(),
                name: "OLDTOWN".to_string(),
                address: "Pilies g. 38".to_string(),
            }),
            ..Default::default()
        });
        cart
    }

    fn contact(policy: bool) -> ContactDetails {
        ContactDetails {
            name: " Jonas ".to_string(),
            email: "jonas@example.lt".to_string(),
            phone: "+370 600 00000".to_string(),
            policy_accepted: policy.then(|| "on".to_string()),
        }
    }

    #[test]
    fn test_cannot_leave_services_step_empty() {
        let mut draft = GuestBookingDraft::default();
        assert_eq!(
            draft.advance(&BookingCart::default(), today()),
            Err(WizardError::NoServices)
        );
        assert_eq!(draft.step, WizardStep::Services);

        assert_eq!(draft.advance(&cart_with_service(), today()), Ok(WizardStep::Schedule));
    }

    #[test]
    fn test_schedule_requires_date_and_time() {
        let mut draft = GuestBookingDraft {
            step: WizardStep::Schedule,
            ..Default::default()
        };
        assert_eq!(
            draft.advance(&cart_with_service(), today()),
            Err(WizardError::MissingSchedule)
        );

        let mut past = scheduled_cart();
        past.details.date = NaiveDate::from_ymd_opt(2025, 2, 28);
        assert_eq!(draft.advance(&past, today()), Err(WizardError::DateInPast));

        let mut bad_time = scheduled_cart();
        bad_time.details.time = Some("25:99".to_string());
        assert_eq!(draft.advance(&bad_time, today()), Err(WizardError::InvalidTime));

        assert_eq!(draft.advance(&scheduled_cart(), today()), Ok(WizardStep::Contact));
    }

    #[test]
    fn test_contact_requires_policy_and_valid_fields() {
        let cart = scheduled_cart();
        let mut draft = GuestBookingDraft {
            step: WizardStep::Contact,
            ..Default::default()
        };
        assert_eq!(draft.advance(&cart, today()), Err(WizardError::MissingCustomerInfo));

        draft.update_contact(&contact(false));
        assert_eq!(draft.customer.name, "Jonas");
        assert_eq!(draft.advance(&cart, today()), Err(WizardError::PolicyNotAccepted));

        draft.update_contact(&ContactDetails {
            phone: "call me".to_string(),
            ..contact(true)
        });
        assert!(matches!(
            draft.advance(&cart, today()),
            Err(WizardError::InvalidPhone(_))
        ));

        draft.update_contact(&ContactDetails {
            email: "not-an-email".to_string(),
            ..contact(true)
        });
        assert!(matches!(
            draft.advance(&cart, today()),
            Err(WizardError::InvalidEmail(_))
        ));

        draft.update_contact(&contact(true));
        assert_eq!(draft.advance(&cart, today()), Ok(WizardStep::Payment));
        // Terminal
        assert_eq!(draft.advance(&cart, today()), Ok(WizardStep::Payment));
    }

    #[test]
    fn test_back_stops_at_first_step() {
        let mut draft = GuestBookingDraft {
            step: WizardStep::Contact,
            ..Default::default()
        };
        assert_eq!(draft.back(), WizardStep::Schedule);
        assert_eq!(draft.back(), WizardStep::Services);
        assert_eq!(draft.back(), WizardStep::Services);
    }

    #[test]
    fn test_pay_at_venue_requires_eligibility() {
        let mut draft = GuestBookingDraft::default();
        assert_eq!(
            draft.set_payment_type(PaymentType::PayAtVenue),
            Err(WizardError::PayAtVenueNotAllowed)
        );
        assert_eq!(draft.payment_type, PaymentType::Card);

        draft.apply_eligibility(true);
        draft.set_payment_type(PaymentType::PayAtVenue).unwrap();
        assert_eq!(draft.payment_type, PaymentType::PayAtVenue);

        draft.apply_eligibility(false);
        assert_eq!(draft.payment_type, PaymentType::Card);
    }

    #[test]
    fn test_changing_contact_resets_eligibility() {
        let mut draft = GuestBookingDraft::default();
        draft.update_contact(&contact(true));
        draft.apply_eligibility(true);
        draft.set_payment_type(PaymentType::PayAtVenue).unwrap();

        draft.update_contact(&contact(true));
        assert!(draft.can_pay_at_venue);

        draft.update_contact(&ContactDetails {
            phone: "+370 611 11111".to_string(),
            ..contact(true)
        });
        assert!(!draft.can_pay_at_venue);
        assert_eq!(draft.payment_type, PaymentType::Card);
    }

    #[test]
    fn test_build_request_pay_at_venue() {
        let cart = scheduled_cart();
        let mut draft = GuestBookingDraft::default();
        draft.update_contact(&contact(true));
        draft.apply_eligibility(true);
        draft.set_payment_type(PaymentType::PayAtVenue).unwrap();
        draft.notes = "  fade please ".to_string();

        let request = draft.build_request(&cart, today(), None).unwrap();
        assert_eq!(request.date, "2025-03-01");
        assert_eq!(request.time, "10:30");
        assert_eq!(request.services.len(), 1);
        assert_eq!(request.notes, "fade please");
        assert!(request.barber.is_none());
        assert!(request.cancellation_policy_accepted);
        assert!(request.setup_intent_id.is_none());
        assert_eq!(request.location.id, "location-1");
    }

    #[test]
    fn test_build_request_card_needs_setup_intent() {
        let cart = scheduled_cart();
        let mut draft = GuestBookingDraft::default();
        draft.update_contact(&contact(true));

        assert_eq!(
            draft.build_request(&cart, today(), None),
            Err(WizardError::MissingCardSetup)
        );
        let request = draft
            .build_request(&cart, today(), Some("seti_123".to_string()))
            .unwrap();
        assert_eq!(request.payment_type, PaymentType::Card);
        assert_eq!(request.setup_intent_id.as_deref(), Some("seti_123"));
    }

    #[test]
    fn test_build_request_needs_location() {
        let mut cart = scheduled_cart();
        cart.clear_location();
        let mut draft = GuestBookingDraft::default();
        draft.update_contact(&contact(true));
        assert_eq!(
            draft.build_request(&cart, today(), Some("seti_1".to_string())),
            Err(WizardError::NoLocation)
        );
    }
}
