//! Language switcher.

use axum::{Form, Router, response::Redirect, routing::post};
use delegends_core::Locale;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;
use crate::stores;

/// Locale switch form data.
#[derive(Debug, Deserialize)]
pub struct LocaleForm {
    pub locale: String,
    /// Path to return to.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Only same-site paths are followed.
fn safe_return_path(path: Option<&str>) -> &str {
    match path {
        Some(p) if p.starts_with('/') && !p.starts_with("//") && !p.contains('\\') => p,
        _ => "/",
    }
}

/// Save the chosen locale and reload the page the visitor was on.
///
/// Unknown codes leave the locale unchanged.
#[instrument(skip(session))]
pub async fn switch(session: Session, Form(form): Form<LocaleForm>) -> Result<Redirect> {
    match form.locale.parse::<Locale>() {
        Ok(locale) => stores::save_locale(&session, locale).await?,
        Err(e) => tracing::debug!(error = %e, "Ignoring unknown locale"),
    }
    Ok(Redirect::to(safe_return_path(form.redirect_to.as_deref())))
}

/// Create the locale routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(switch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/services")), "/services");
        assert_eq!(safe_return_path(Some("/blogs/x?y=1")), "/blogs/x?y=1");
        assert_eq!(safe_return_path(Some("//evil.example")), "/");
        assert_eq!(safe_return_path(Some("https://evil.example")), "/");
        assert_eq!(safe_return_path(None), "/");
    }
}
