//! Supported site languages.

use serde::{Deserialize, Serialize};

/// Error returned when a language code is not one the site is translated into.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

/// A language the site is translated into. Lithuanian is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Lt,
    Ru,
}

impl Locale {
    /// All locales in the order the language switcher lists them.
    pub const ALL: [Self; 3] = [Self::En, Self::Lt, Self::Ru];

    /// Two-letter code, used in the `lang` attribute and for catalog files.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Lt => "lt",
            Self::Ru => "ru",
        }
    }

    /// Native language name for the switcher.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Lt => "Lietuvių",
            Self::Ru => "Русский",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "lt" => Ok(Self::Lt),
            "ru" => Ok(Self::Ru),
            _ => Err(UnknownLocale(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lithuanian() {
        assert_eq!(Locale::default(), Locale::Lt);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(" ru ".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!(
            "de".parse::<Locale>(),
            Err(UnknownLocale("de".to_owned()))
        );
    }

    #[test]
    fn test_codes_round_trip() {
        for locale in Locale::ALL {
            assert_eq!(locale.code().parse::<Locale>().unwrap(), locale);
        }
    }
}
