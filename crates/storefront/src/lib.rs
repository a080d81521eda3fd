//! De Legends storefront library.
//!
//! Marketing pages, guest booking and the product shop, served over the
//! booking backend's REST API. Exposed as a library so the router can be
//! exercised by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod booking;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod page;
pub mod payments;
pub mod routes;
pub mod state;
pub mod stores;
