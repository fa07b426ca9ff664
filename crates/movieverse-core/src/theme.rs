//! Light/dark theme preference
//!
//! The effective theme is the persisted choice if there is one, otherwise
//! the system preference. Only explicit user actions ([`ThemeManager::toggle`],
//! [`ThemeManager::set`]) persist; following the system never does.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MovieError;
use crate::events::{Listeners, SubscriptionId};
use crate::storage::KeyValueStore;

/// Storage key of the theme record
pub const THEME_STORAGE_KEY: &str = "movieverse-theme";

/// UI color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Lenient decoding of a stored token: anything but "dark" is light.
    fn from_stored(token: &str) -> Self {
        if token == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = MovieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(MovieError::ValidationError(format!(
                "Invalid theme \"{}\". Use \"dark\" or \"light\".",
                other
            ))),
        }
    }
}

/// Payload broadcast whenever the applied theme changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeChanged {
    pub theme: Theme,
    pub is_dark: bool,
}

/// Owner of the theme preference and its persisted record
pub struct ThemeManager {
    storage: Arc<dyn KeyValueStore>,
    system_theme: Theme,
    current: Theme,
    listeners: Listeners<ThemeChanged>,
}

impl ThemeManager {
    /// Resolve the initial theme from storage, falling back to `system_theme`.
    pub fn new(storage: Arc<dyn KeyValueStore>, system_theme: Theme) -> Self {
        let current = saved_theme(storage.as_ref()).unwrap_or(system_theme);
        tracing::debug!(theme = %current, system = %system_theme, "theme resolved");
        Self {
            storage,
            system_theme,
            current,
            listeners: Listeners::new(),
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn is_dark(&self) -> bool {
        self.current == Theme::Dark
    }

    /// Whether the user has an explicit, persisted choice
    pub fn has_saved_preference(&self) -> bool {
        saved_theme(self.storage.as_ref()).is_some()
    }

    /// Switch to the other theme and persist it.
    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.apply(next, true);
        next
    }

    /// Apply and persist `theme`.
    pub fn set(&mut self, theme: Theme) {
        self.apply(theme, true);
    }

    /// Parse `token` ("dark" or "light") and apply it like [`ThemeManager::set`].
    ///
    /// # Errors
    /// `MovieError::ValidationError` for any other token; nothing changes.
    pub fn set_from_token(&mut self, token: &str) -> Result<Theme, MovieError> {
        let theme = token.parse()?;
        self.set(theme);
        Ok(theme)
    }

    /// Record a new OS preference and follow it unless the user chose a theme.
    pub fn system_theme_changed(&mut self, theme: Theme) {
        self.system_theme = theme;
        if !self.has_saved_preference() {
            self.apply(theme, false);
        }
    }

    /// Forget the persisted choice and follow the OS preference again.
    pub fn reset_to_system(&mut self) {
        if let Err(e) = self.storage.remove(THEME_STORAGE_KEY) {
            tracing::error!(error = %e, "failed to remove theme preference");
        }
        self.apply(self.system_theme, false);
    }

    /// Register a listener for [`ThemeChanged`] broadcasts.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&ThemeChanged) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn apply(&mut self, theme: Theme, persist: bool) {
        self.current = theme;
        if persist {
            if let Err(e) = self.storage.set(THEME_STORAGE_KEY, theme.as_str()) {
                tracing::error!(error = %e, "failed to save theme preference");
            }
        }
        tracing::debug!(theme = %theme, persist, "theme applied");
        self.listeners.notify(&ThemeChanged {
            theme,
            is_dark: theme == Theme::Dark,
        });
    }
}

fn saved_theme(storage: &dyn KeyValueStore) -> Option<Theme> {
    match storage.get(THEME_STORAGE_KEY) {
        Ok(token) => token
            .filter(|token| !token.is_empty())
            .map(|token| Theme::from_stored(&token)),
        Err(e) => {
            tracing::error!(error = %e, "failed to load theme preference");
            None
        }
    }
}
