//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.
//! The customer and their backend bearer token live in the session.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentUser;
use crate::stores;

/// Extractor that requires a signed-in customer.
///
/// If the customer is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_bookings(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection sent when a route needs a customer and nobody is signed in.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to("/auth/login").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;
        let user = stores::current_user(session).await.ok_or(AuthRejection)?;
        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use delegends_core::UserId;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    async fn protected(RequireAuth(user): RequireAuth) -> String {
        user.name
    }

    async fn sign_in(session: Session) -> &'static str {
        let user = CurrentUser {
            id: UserId::new("u1"),
            name: "Jonas".to_string(),
            email: "jonas@example.lt".to_string(),
            role: None,
            token: "token".to_string(),
        };
        stores::set_current_user(&session, &user).await.unwrap();
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/bookings", get(protected))
            .route("/sign-in", get(sign_in))
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
    }

    #[tokio::test]
    async fn test_require_auth_redirects_to_login() {
        let response = app()
            .oneshot(Request::get("/bookings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/auth/login");
    }

    #[tokio::test]
    async fn test_require_auth_accepts_signed_in_session() {
        let app = app();
        let response = app
            .clone()
            .oneshot(Request::get("/sign-in").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = response.headers()["set-cookie"]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::get("/bookings")
                    .header("cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
