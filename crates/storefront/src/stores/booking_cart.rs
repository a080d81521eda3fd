//! Booking cart: services picked for an appointment plus draft details.
//!
//! The services and the details are mirrored under separate session keys,
//! so clearing the services leaves the chosen branch and schedule alone.

use chrono::NaiveDate;
use delegends_core::{BarberId, Money, ServiceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;

use crate::api::{BranchRef, Service};
use crate::models::session_keys;

/// Booking cart errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingCartError {
    #[error("Service {0} is already selected")]
    AlreadyInCart(ServiceId),
}

/// A service chosen for the appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedService {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub price: Money,
    /// Minutes.
    pub duration: u32,
}

impl From<&Service> for SelectedService {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
            description: service.description.clone(),
            price: service.price,
            duration: service.duration,
        }
    }
}

/// Scheduling choices made so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    /// `None` means any available barber.
    pub barber: Option<BarberId>,
    pub date: Option<NaiveDate>,
    /// `HH:MM`.
    pub time: Option<String>,
    pub location: Option<BranchRef>,
}

/// Partial update to [`BookingDetails`]; unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct BookingDetailsPatch {
    /// `Some(None)` switches back to any available barber.
    pub barber: Option<Option<BarberId>>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<BranchRef>,
}

/// Services selected for booking plus the draft details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCart {
    services: Vec<SelectedService>,
    pub details: BookingDetails,
}

impl BookingCart {
    /// Load the booking cart from the session (empty when absent).
    pub async fn load(session: &Session) -> Self {
        Self {
            services: super::load_or_default(session, session_keys::BOOKING_CART).await,
            details: super::load_or_default(session, session_keys::BOOKING_DETAILS).await,
        }
    }

    /// Persist the booking cart to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        super::store(session, session_keys::BOOKING_CART, &self.services).await?;
        super::store(session, session_keys::BOOKING_DETAILS, &self.details).await
    }

    /// Remove the persisted services and details.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_persisted(session: &Session) -> Result<(), tower_sessions::session::Error> {
        super::remove_key(session, session_keys::BOOKING_CART).await?;
        super::remove_key(session, session_keys::BOOKING_DETAILS).await
    }

    /// Add a service.
    ///
    /// # Errors
    ///
    /// Returns `BookingCartError::AlreadyInCart` if the service is already selected.
    pub fn add_service(&mut self, service: SelectedService) -> Result<(), BookingCartError> {
        if self.contains(&service.id) {
            return Err(BookingCartError::AlreadyInCart(service.id));
        }
        self.services.push(service);
        Ok(())
    }

    /// Remove a service. Returns whether anything was removed.
    pub fn remove_service(&mut self, id: &ServiceId) -> bool {
        let before = self.services.len();
        self.services.retain(|s| &s.id != id);
        self.services.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.services.iter().any(|s| &s.id == id)
    }

    #[must_use]
    pub fn services(&self) -> &[SelectedService] {
        &self.services
    }

    #[must_use]
    pub fn total_price(&self) -> Money {
        self.services.iter().map(|s| s.price).sum()
    }

    /// Total duration in minutes.
    #[must_use]
    pub fn total_duration(&self) -> u32 {
        self.services
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.duration))
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Merge set fields into the draft details. Picking a different date
    /// drops the chosen time unless the patch sets one too.
    pub fn update_details(&mut self, patch: BookingDetailsPatch) {
        if let Some(barber) = patch.barber {
            self.details.barber = barber;
        }
        if let Some(date) = patch.date {
            if self.details.date != Some(date) {
                self.details.time = None;
            }
            self.details.date = Some(date);
        }
        if let Some(time) = patch.time {
            self.details.time = Some(time);
        }
        if let Some(location) = patch.location {
            self.details.location = Some(location);
        }
    }

    /// Drop the selected branch.
    pub fn clear_location(&mut self) {
        self.details.location = None;
    }

    /// Drop all selected services and remove their persisted mirror. The
    /// details are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_services(
        &mut self,
        session: &Session,
    ) -> Result<(), tower_sessions::session::Error> {
        self.services.clear();
        super::remove_key(session, session_keys::BOOKING_CART).await
    }

    /// Drop services, details and branch, and remove the persisted mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_all(&mut self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        *self = Self::default();
        Self::clear_persisted(session).await
    }
}
