//! Status enums for bookings, orders, payments and job listings.
//!
//! Wire names follow the booking backend's JSON.

use serde::{Deserialize, Serialize};

/// Lifecycle of an account booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Wire name, also used as a CSS modifier and translation key suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Reviews may only be left once the appointment has happened.
    #[must_use]
    pub const fn is_reviewable(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Payment can still be taken for bookings that are not finished.
    #[must_use]
    pub const fn is_payable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state of a product order or booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a guest booking is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Card saved through a setup intent; charged by the backend.
    #[default]
    Card,
    /// Settled at the barbershop. Only offered when the backend allows it.
    PayAtVenue,
}

impl PaymentType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::PayAtVenue => "pay_at_venue",
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "pay_at_venue" => Ok(Self::PayAtVenue),
            _ => Err(format!("invalid payment type: {s}")),
        }
    }
}

/// Employment type of a job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
}

impl JobType {
    /// Wire name, also used in the `type` filter query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(Self::FullTime),
            "part-time" => Ok(Self::PartTime),
            "contract" => Ok(Self::Contract),
            _ => Err(format!("invalid job type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentType::PayAtVenue).unwrap(),
            "\"pay_at_venue\""
        );
        assert_eq!("card".parse::<PaymentType>().unwrap(), PaymentType::Card);
        assert!("cash".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_job_type_is_kebab_case() {
        let job: JobType = serde_json::from_str("\"part-time\"").unwrap();
        assert_eq!(job, JobType::PartTime);
        assert_eq!(job.as_str(), "part-time");
    }

    #[test]
    fn test_booking_status_rules() {
        assert!(BookingStatus::Completed.is_reviewable());
        assert!(!BookingStatus::Pending.is_reviewable());
        assert!(BookingStatus::Confirmed.is_payable());
        assert!(!BookingStatus::Cancelled.is_payable());
    }
}
