//! Per-request page context shared by every full-page template.
//!
//! Handlers take a [`PageContext`] extractor and embed it in their template
//! as `page`. The base layout reads the header badges, the signed-in user,
//! the locale selector and the flash banner from it.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use delegends_core::Locale;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::i18n::Translator;
use crate::middleware::CspNonce;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;
use crate::stores::{self, BookingCart, ShoppingCart};

/// Banner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Error => "flash-error",
            Self::Info => "flash-info",
        }
    }
}

/// One-shot message shown on the next full page render.
///
/// `text` is a translation key or literal text (backend messages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            text: text.into(),
        }
    }
}

/// Queue a flash message for the next page render.
///
/// Failures are logged; a lost banner is not worth failing the request.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = stores::store(session, session_keys::FLASH, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the queued flash message, if any.
async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

/// Everything the base layout needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    translator: Translator,
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub booking_count: usize,
    pub nonce: String,
    pub flash: Option<Flash>,
    /// Request path, for the locale switcher and active nav links.
    pub path: String,
    pub ga4_measurement_id: Option<String>,
    pub stripe_publishable_key: String,
}

impl PageContext {
    /// Translate a dotted key in the visitor's locale.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.translator.t(key).to_string()
    }

    /// Translated label of a booking or payment status (`status.<wire name>`).
    #[must_use]
    pub fn status(&self, status: impl std::fmt::Display) -> String {
        self.label("status", status)
    }

    /// Translate `<group>.<value>`, e.g. `career.types.full-time`.
    #[must_use]
    pub fn label(&self, group: &str, value: impl std::fmt::Display) -> String {
        self.t(&format!("{group}.{value}"))
    }

    #[must_use]
    pub const fn translator(&self) -> &Translator {
        &self.translator
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.translator.locale()
    }

    /// Locales offered by the switcher.
    #[must_use]
    pub const fn locales(&self) -> &'static [Locale] {
        &Locale::ALL
    }

    /// Whether `prefix` is the current section (for nav highlighting).
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        let config = state.config();
        let path = parts.uri.path().to_string();

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            tracing::warn!("Session not found in request extensions - layer may be misconfigured");
            return Ok(Self {
                translator: state.catalogs().translator(config.default_locale),
                user: None,
                cart_count: 0,
                booking_count: 0,
                nonce,
                flash: None,
                path,
                ga4_measurement_id: config.analytics.ga4_measurement_id.clone(),
                stripe_publishable_key: config.payments.publishable_key.clone(),
            });
        };

        let locale = stores::load_locale(&session, config.default_locale).await;
        let user = stores::current_user(&session).await;
        let cart_count = ShoppingCart::load(&session).await.item_count();
        let booking_count = BookingCart::load(&session).await.service_count();
        let flash = take_flash(&session).await;

        Ok(Self {
            translator: state.catalogs().translator(locale),
            user,
            cart_count,
            booking_count,
            nonce,
            flash,
            path,
            ga4_measurement_id: config.analytics.ga4_measurement_id.clone(),
            stripe_publishable_key: config.payments.publishable_key.clone(),
        })
    }
}

/// Translator for fragment handlers that do not render the full layout.
pub async fn translator_for(state: &AppState, session: &Session) -> Translator {
    let locale = stores::load_locale(session, state.config().default_locale).await;
    state.catalogs().translator(locale)
}
