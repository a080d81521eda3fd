//! Translation catalogs for `en`, `lt` and `ru`.
//!
//! Catalogs are nested JSON objects compiled into the binary from
//! `locales/*.json`. Lookups use dotted keys (`"home.heroTitle"`) and fall
//! back to the key itself, so a missing translation shows up on the page
//! instead of failing the render.

use std::sync::Arc;

use delegends_core::Locale;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("Invalid {locale} catalog: {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: serde_json::Error,
    },
}

const EN: &str = include_str!("../locales/en.json");
const LT: &str = include_str!("../locales/lt.json");
const RU: &str = include_str!("../locales/ru.json");

/// All loaded catalogs.
#[derive(Debug, Clone)]
pub struct Catalogs {
    en: Arc<Value>,
    lt: Arc<Value>,
    ru: Arc<Value>,
}

impl Catalogs {
    /// Parse the embedded catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog is not valid JSON.
    pub fn load() -> Result<Self, I18nError> {
        let parse = |locale: Locale, raw: &str| {
            serde_json::from_str::<Value>(raw)
                .map(Arc::new)
                .map_err(|source| I18nError::Parse { locale, source })
        };

        Ok(Self {
            en: parse(Locale::En, EN)?,
            lt: parse(Locale::Lt, LT)?,
            ru: parse(Locale::Ru, RU)?,
        })
    }

    /// Translator for one locale.
    #[must_use]
    pub fn translator(&self, locale: Locale) -> Translator {
        let catalog = match locale {
            Locale::En => &self.en,
            Locale::Lt => &self.lt,
            Locale::Ru => &self.ru,
        };
        Translator {
            locale,
            catalog: Arc::clone(catalog),
        }
    }
}

/// Looks up strings in one locale's catalog.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    catalog: Arc<Value>,
}

impl Translator {
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Translate a dotted key. Missing or non-string values return the key.
    #[must_use]
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).and_then(Value::as_str).unwrap_or(key)
    }

    /// Deserialize an array under a dotted key. Missing or mismatched values
    /// give an empty list.
    #[must_use]
    pub fn list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.lookup(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(self.catalog.as_ref(), |value, segment| value.get(segment))
    }
}
