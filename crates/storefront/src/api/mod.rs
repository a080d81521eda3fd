//! REST client for the De Legends booking backend.
//!
//! # Architecture
//!
//! - One `reqwest::Client` behind an `Arc`, cloned into every handler
//! - The backend is the source of truth: NO local persistence, direct calls
//! - Authenticated calls take the customer's bearer token explicitly
//! - Public catalog reads are cached in memory via `moka` (5 minute TTL)
//!
//! Resource wrappers live in one file per backend resource and add
//! `impl ApiClient` blocks:
//!
//! | File | Endpoints |
//! |---|---|
//! | `auth` | `/auth/login`, `/auth/register` |
//! | `catalog` | `/salons`, `/services`, `/barbers`, `/products`, `/reviews` |
//! | `bookings` | `/bookings` |
//! | `orders` | `/orders` |
//! | `gift_cards` | `/gift-cards` |
//! | `jobs` | `/jobs` |
//! | `guest_bookings` | `/guest-bookings`, `/availability` |
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(&config.backend)?;
//! let services = client.list_services().await?;
//! let bookings = client.my_bookings(&user.token).await?;
//! ```

mod auth;
mod bookings;
mod cache;
mod catalog;
mod gift_cards;
mod guest_bookings;
mod jobs;
mod orders;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::BackendConfig;

pub use cache::{CacheKey, CacheValue};
pub use types::*;

/// Errors that can occur when talking to the booking backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was missing, expired or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message suitable for an inline banner.
    ///
    /// Validation messages written by the backend (4xx) are shown verbatim;
    /// everything else gets the generic fallback.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Api { status, message }
                if (400..500).contains(status) && !message.is_empty() =>
            {
                message
            }
            _ => fallback,
        }
    }
}

/// Client for the booking backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("delegends-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Absolute URL for an API path (which must start with `/`).
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Absolute URL with query parameters, percent-encoded.
    fn url_with_query(&self, path: &str, params: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url =
            url::Url::parse(&self.url(path)).map_err(|e| ApiError::Parse(e.to_string()))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url.into())
    }

    /// Issue a GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        self.execute::<(), T>(Method::GET, &self.url(path), None, token)
            .await
    }

    /// Issue a GET request with query parameters.
    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.url_with_query(path, params)?;
        self.execute::<(), T>(Method::GET, &url, None, token).await
    }

    /// Issue a request with a JSON body.
    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(method, &self.url(path), Some(body), token)
            .await
    }

    /// Execute a request and decode the JSON response.
    async fn execute<B, T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.inner.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &response_text, url));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e.to_string())
        })
    }
}

/// Map a non-success response to an [`ApiError`].
fn error_from_response(status: StatusCode, body: &str, url: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(url.to_string()),
        _ => {
            let message = serde_json::from_str::<types::ErrorBody>(body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| body.chars().take(200).collect());

            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    url = %url,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                tracing::warn!(status = %status, url = %url, message = %message, "Backend rejected request");
            }

            ApiError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping_status_codes() {
        assert!(matches!(
            error_from_response(StatusCode::UNAUTHORIZED, "", "/bookings"),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            error_from_response(StatusCode::NOT_FOUND, "", "/products/x"),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_error_mapping_uses_message_field() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Time slot already booked"}"#,
            "/guest-bookings/create",
        );
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Time slot already booked");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_mapping_falls_back_to_body_text() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "upstream down", "/services");
        assert!(matches!(err, ApiError::Api { status: 502, ref message } if message == "upstream down"));
    }

    #[test]
    fn test_user_message_hides_server_errors() {
        let client_err = ApiError::Api {
            status: 409,
            message: "Already reviewed".to_string(),
        };
        assert_eq!(client_err.user_message("fallback"), "Already reviewed");

        let server_err = ApiError::Api {
            status: 500,
            message: "stack trace".to_string(),
        };
        assert_eq!(server_err.user_message("fallback"), "fallback");
        assert_eq!(ApiError::Unauthorized.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_url_with_query_encodes_params() {
        let client = ApiClient::new(&BackendConfig {
            api_url: "https://api.example.test/api/".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap_or_else(|e| panic!("client: {e}"));

        let url = client
            .url_with_query("/availability/check", &[("date", "2025-03-01"), ("location", "BIG VILNIUS")])
            .unwrap_or_else(|e| panic!("url: {e}"));
        assert_eq!(
            url,
            "https://api.example.test/api/availability/check?date=2025-03-01&location=BIG+VILNIUS"
        );
    }
}
