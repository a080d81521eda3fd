//! Preferred language.

use delegends_core::Locale;
use tower_sessions::Session;

use crate::models::session_keys;

/// The visitor's locale, or `default` when none was chosen.
pub async fn load_locale(session: &Session, default: Locale) -> Locale {
    session
        .get::<Locale>(session_keys::LOCALE)
        .await
        .ok()
        .flatten()
        .unwrap_or(default)
}

/// Remember the visitor's locale.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn save_locale(
    session: &Session,
    locale: Locale,
) -> Result<(), tower_sessions::session::Error> {
    super::store(session, session_keys::LOCALE, &locale).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stores::test_session;

    #[tokio::test]
    async fn test_default_until_saved() {
        let session = test_session();
        assert_eq!(load_locale(&session, Locale::Lt).await, Locale::Lt);

        save_locale(&session, Locale::Ru).await.unwrap();
        assert_eq!(load_locale(&session, Locale::Lt).await, Locale::Ru);
    }
}
