//! De Legends Core - Shared types library.
//!
//! This crate provides common types used across the De Legends components:
//! - `storefront` - Public-facing marketing, booking and shop site
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Every durable entity is owned by the remote booking backend; the types here
//! describe the transient copies the storefront holds and validates.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, contact details,
//!   locales and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
