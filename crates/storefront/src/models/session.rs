//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use delegends_core::UserId;

use crate::api::AuthResponse;

/// Session-stored customer identity and bearer token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user id.
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Bearer token attached to every authenticated backend call.
    pub token: String,
}

impl CurrentUser {
    /// First name for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl From<AuthResponse> for CurrentUser {
    fn from(response: AuthResponse) -> Self {
        Self {
            id: response.user.id,
            name: response.user.name,
            email: response.user.email,
            role: response.user.role,
            token: response.token,
        }
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for visitor state.
pub mod session_keys {
    /// Signed-in customer.
    pub const CURRENT_USER: &str = "current_user";

    /// Retail shopping cart.
    pub const CART: &str = "cart";

    /// Services selected for booking.
    pub const BOOKING_CART: &str = "booking_cart";

    /// Draft booking details: barber, date, time and branch.
    pub const BOOKING_DETAILS: &str = "booking_details";

    /// Guest booking wizard progress.
    pub const BOOKING_DRAFT: &str = "guest_booking_draft";

    /// Preferred language.
    pub const LOCALE: &str = "preferred_language";

    /// Chat widget transcript.
    pub const CHAT: &str = "chat_messages";

    /// One-shot notice shown on the next page render.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            name: "Jonas Jonaitis".to_string(),
            email: "jonas@example.lt".to_string(),
            role: Some("customer".to_string()),
            token: "eyJhbGciOiJIUzI1NiJ9.secret".to_string(),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", user());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_first_name() {
        assert_eq!(user().first_name(), "Jonas");
    }

    #[test]
    fn test_from_auth_response() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"token":"t0k","user":{"_id":"u9","name":"Ona","email":"ona@example.lt"}}"#,
        )
        .unwrap();
        let user = CurrentUser::from(response);
        assert_eq!(user.id.as_str(), "u9");
        assert_eq!(user.token, "t0k");
        assert!(user.role.is_none());
    }
}
