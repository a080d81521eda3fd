//! Per-visitor state persisted in the server session.
//!
//! Each store is a small owned struct. Handlers `load` it from the session,
//! mutate it in memory, then `save` it back. `clear_persisted` removes the
//! session key entirely. Stores never coordinate with each other.

pub mod booking_cart;
pub mod cart;
pub mod locale;
pub mod session;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;

pub use booking_cart::{BookingCart, BookingCartError, BookingDetails, BookingDetailsPatch, SelectedService};
pub use cart::{CartError, CartItem, ShoppingCart};
pub use locale::{load_locale, save_locale};
pub use session::{clear_current_user, current_user, set_current_user};

/// Read a value from the session, falling back to its default.
///
/// A value that fails to deserialize (for example after a type change
/// between deployments) is treated as absent.
pub(crate) async fn load_or_default<T>(session: &Session, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match session.get::<T>(key).await {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable session value");
            T::default()
        }
    }
}

/// Write a value to the session.
pub(crate) async fn store<T>(
    session: &Session,
    key: &str,
    value: &T,
) -> Result<(), tower_sessions::session::Error>
where
    T: Serialize + Send + Sync,
{
    session.insert(key, value).await
}

/// Remove a key from the session.
pub(crate) async fn remove_key(
    session: &Session,
    key: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(key).await?;
    Ok(())
}

/// Session backed by an in-memory store, for unit tests.
#[cfg(test)]
pub(crate) fn test_session() -> Session {
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    Session::new(None, Arc::new(MemoryStore::default()), None)
}
