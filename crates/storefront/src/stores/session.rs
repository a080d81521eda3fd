//! Signed-in customer stored in the session.

use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Store the signed-in customer.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    super::store(session, session_keys::CURRENT_USER, user).await
}

/// The signed-in customer, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Forget the signed-in customer (logout, or the backend rejected the token).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    super::remove_key(session, session_keys::CURRENT_USER).await
}
