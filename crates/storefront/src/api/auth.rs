//! Customer login and registration.

use reqwest::Method;
use tracing::instrument;

use super::types::{AuthResponse, LoginRequest, RegisterRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange email and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Api` for bad credentials.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, "/auth/login", request, None)
            .await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` when the backend rejects the details
    /// (for example an email that is already registered).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, "/auth/register", request, None)
            .await
    }
}
