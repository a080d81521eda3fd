//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::i18n::{Catalogs, I18nError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
    #[error("translations: {0}")]
    I18n(#[from] I18nError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and loaded content.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    content: ContentStore,
    catalogs: Catalogs,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads markdown content from `config.content_dir` and parses the
    /// embedded translation catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built, the content
    /// directory cannot be read, or a catalog is malformed.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.backend)?;
        let content = ContentStore::load(&config.content_dir)?;
        let catalogs = Catalogs::load()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                content,
                catalogs,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the booking backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get a reference to the translation catalogs.
    #[must_use]
    pub fn catalogs(&self) -> &Catalogs {
        &self.inner.catalogs
    }
}
