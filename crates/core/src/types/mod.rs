//! Core types for De Legends.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod locale;
pub mod money;
pub mod phone;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use locale::{Locale, UnknownLocale};
pub use money::Money;
pub use phone::{Phone, PhoneError};
pub use status::*;
