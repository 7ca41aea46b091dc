//! Persisted user preferences
//!
//! Theme and preferred language live next to the chat history in
//! [`LocalStorage`], under the `theme` and `preferredLanguage` keys.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{NitroError, Result};
use crate::storage::LocalStorage;

/// Storage key for the color theme
pub const THEME_KEY: &str = "theme";

/// Storage key for the preferred language code
pub const LANGUAGE_KEY: &str = "preferredLanguage";

/// Language used when none is stored
pub const DEFAULT_LANGUAGE: &str = "en";

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light background
    #[default]
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored representation
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = NitroError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(NitroError::Config(format!(
                "Invalid theme: {}. Must be one of: light, dark",
                other
            ))),
        }
    }
}

/// Reader and writer for persisted preferences
#[derive(Clone)]
pub struct Preferences {
    storage: Arc<dyn LocalStorage>,
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    /// Preferences stored in `storage`
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Current theme; missing or unrecognized values read as the default
    pub fn theme(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|_| {
                tracing::debug!(value = %value, "Ignoring unrecognized stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    /// Persist a theme
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.storage.set(THEME_KEY, theme.as_str())
    }

    /// Flip between light and dark and persist the result
    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Preferred language code
    pub fn language(&self) -> String {
        match self.storage.get(LANGUAGE_KEY) {
            Ok(Some(code)) if is_valid_language_code(&code) => code,
            Ok(_) => DEFAULT_LANGUAGE.to_string(),
            Err(e) => {
                tracing::warn!("Failed to read language preference: {}", e);
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    /// Persist a language code such as `en`, `es` or `pt-BR`
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::Config`] if the code is not 2-5 characters of
    /// letters and hyphens
    pub fn set_language(&self, code: &str) -> Result<()> {
        let code = code.trim();
        if !is_valid_language_code(code) {
            return Err(NitroError::Config(format!("Invalid language code: {}", code)).into());
        }
        self.storage.set(LANGUAGE_KEY, code)
    }
}

fn is_valid_language_code(code: &str) -> bool {
    (2..=5).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
        && !code.starts_with('-')
}
