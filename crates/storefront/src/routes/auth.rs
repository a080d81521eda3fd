//! Authentication route handlers.
//!
//! Login and registration go through the booking backend, which answers
//! with a bearer token. The token and the customer's identity are kept in
//! the session; logging out drops them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use delegends_core::{Email, Phone};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, LoginRequest, RegisterRequest};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::models::CurrentUser;
use crate::page::{Flash, PageContext, set_flash};
use crate::state::AppState;
use crate::stores;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 6;

/// Error codes that may appear in `?error=`, mapped to translation keys.
const ERROR_CODES: &[(&str, &str)] = &[
    ("credentials", "auth.errors.credentials"),
    ("session", "auth.errors.session"),
    ("missing_fields", "auth.errors.missingFields"),
    ("invalid_email", "auth.errors.invalidEmail"),
    ("invalid_phone", "auth.errors.invalidPhone"),
    ("password_mismatch", "auth.errors.passwordMismatch"),
    ("password_too_short", "auth.errors.passwordTooShort"),
    ("email_taken", "auth.errors.emailTaken"),
    ("failed", "auth.errors.failed"),
];

/// Translation key for an `?error=` code. Unknown codes are dropped.
fn error_key(code: Option<&str>) -> Option<&'static str> {
    let code = code?;
    ERROR_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, key)| *key)
}

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl RegisterForm {
    /// Error code of the first problem, if any.
    fn problem(&self) -> Option<&'static str> {
        if [&self.name, &self.email, &self.phone, &self.password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Some("missing_fields");
        }
        if Email::parse(&self.email).is_err() {
            return Some("invalid_email");
        }
        if Phone::parse(&self.phone).is_err() {
            return Some("invalid_phone");
        }
        if self.password != self.password_confirm {
            return Some("password_mismatch");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Some("password_too_short");
        }
        None
    }
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub error: Option<&'static str>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in customers go to their bookings.
#[instrument(skip(page))]
pub async fn login_page(Query(query): Query<MessageQuery>, page: PageContext) -> Response {
    if page.user.is_some() {
        return Redirect::to("/bookings").into_response();
    }
    LoginTemplate {
        page,
        error: error_key(query.error.as_deref()),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Redirect {
    let request = LoginRequest {
        email: form.email.trim(),
        password: &form.password,
    };

    let response = match state.api().login(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return Redirect::to("/auth/login?error=credentials");
        }
    };

    let user = CurrentUser::from(response);

    // New identity, new session id
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to cycle session id");
    }
    if let Err(e) = stores::set_current_user(&session, &user).await {
        tracing::error!(error = %e, "Failed to set session");
        return Redirect::to("/auth/login?error=session");
    }

    set_sentry_user(&user.id, Some(&user.email));
    add_breadcrumb("auth", "Customer logged in", None);
    tracing::info!(user_id = %user.id, "Customer logged in");

    set_flash(&session, Flash::success("auth.loginSuccess")).await;
    Redirect::to("/")
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(page))]
pub async fn register_page(Query(query): Query<MessageQuery>, page: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        page,
        error: error_key(query.error.as_deref()),
    }
}

/// Handle registration form submission.
///
/// The new account is not signed in; the customer logs in afterwards.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    if let Some(code) = form.problem() {
        return Redirect::to(&format!("/auth/register?error={code}"));
    }

    let request = RegisterRequest {
        name: form.name.trim(),
        email: form.email.trim(),
        password: &form.password,
        phone: form.phone.trim(),
    };

    match state.api().register(&request).await {
        Ok(response) => {
            tracing::info!(user_id = %response.user.id, "Customer registered");
            set_flash(&session, Flash::success("auth.registerSuccess")).await;
            Redirect::to("/auth/login")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            let taken = matches!(
                &e,
                ApiError::Api { status, message }
                    if *status == 409 || message.to_lowercase().contains("exist")
            );
            if taken {
                Redirect::to("/auth/register?error=email_taken")
            } else {
                Redirect::to("/auth/register?error=failed")
            }
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Drops the stored customer and token. Carts and the chosen language are
/// kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = stores::clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to cycle session id");
    }
    clear_sentry_user();

    set_flash(&session, Flash::info("auth.loggedOut")).await;
    Redirect::to("/")
}

/// Create the auth routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", post(logout))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            name: "Jonas Jonaitis".to_string(),
            email: "jonas@example.lt".to_string(),
            phone: "+37060000000".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret123".to_string(),
        }
    }

    #[test]
    fn test_register_form_problems() {
        assert_eq!(form().problem(), None);
        assert_eq!(
            RegisterForm {
                password_confirm: "other".to_string(),
                ..form()
            }
            .problem(),
            Some("password_mismatch")
        );
        assert_eq!(
            RegisterForm {
                password: "abc".to_string(),
                password_confirm: "abc".to_string(),
                ..form()
            }
            .problem(),
            Some("password_too_short")
        );
        assert_eq!(
            RegisterForm {
                phone: "call me".to_string(),
                ..form()
            }
            .problem(),
            Some("invalid_phone")
        );
    }

    #[test]
    fn test_error_key_ignores_unknown_codes() {
        assert_eq!(error_key(Some("credentials")), Some("auth.errors.credentials"));
        assert_eq!(error_key(Some("<script>")), None);
        assert_eq!(error_key(None), None);
    }
}
