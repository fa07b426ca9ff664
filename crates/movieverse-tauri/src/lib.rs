//! MovieVerse Tauri Integration
//!
//! This crate exposes the MovieVerse controller to a Tauri 2.0 front end
//! as commands, and forwards change notifications as front-end events.
//!
//! # Usage
//!
//! ```rust,ignore
//! use movieverse_tauri::AppState;
//! use tauri::Manager;
//!
//! fn main() {
//!     movieverse_tauri::logging::init_logging().ok();
//!
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             let state = AppState::new()?;
//!             state.forward_notifications(app.handle());
//!             app.manage(state);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             movieverse_tauri::commands::search_movies,
//!             movieverse_tauri::commands::load_more_movies,
//!             movieverse_tauri::commands::clear_search,
//!             movieverse_tauri::commands::validate_api_key,
//!             movieverse_tauri::commands::get_movie_details,
//!             movieverse_tauri::commands::close_movie_details,
//!             movieverse_tauri::commands::toggle_favorite,
//!             movieverse_tauri::commands::remove_favorite,
//!             movieverse_tauri::commands::list_favorites,
//!             movieverse_tauri::commands::clear_favorites,
//!             movieverse_tauri::commands::export_favorites,
//!             movieverse_tauri::commands::import_favorites,
//!             movieverse_tauri::commands::switch_tab,
//!             movieverse_tauri::commands::toggle_theme,
//!             movieverse_tauri::commands::set_theme,
//!             movieverse_tauri::commands::reset_theme,
//!             movieverse_tauri::commands::current_theme,
//!             movieverse_tauri::commands::system_theme_changed,
//!             movieverse_tauri::commands::handle_key,
//!             movieverse_tauri::commands::dismiss_notice,
//!             movieverse_tauri::commands::view_state,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! # Events
//! - `favorites-changed` - new favorites snapshot and count
//! - `theme-changed` - newly applied theme

pub mod commands;
pub mod logging;

use tauri::{AppHandle, Emitter, Runtime};

use movieverse_core::{AppConfig, AppController, Theme};

/// Front-end event carrying [`movieverse_core::FavoritesChanged`]
pub const FAVORITES_CHANGED_EVENT: &str = "favorites-changed";

/// Front-end event carrying [`movieverse_core::ThemeChanged`]
pub const THEME_CHANGED_EVENT: &str = "theme-changed";

/// Application state managed by Tauri.
///
/// The controller synchronizes internally, so commands share it without
/// an outer lock.
pub struct AppState {
    controller: AppController,
}

impl AppState {
    /// Create the state from `MOVIEVERSE_*` environment configuration.
    ///
    /// The OS theme is assumed light until the front end reports it through
    /// the `system_theme_changed` command.
    ///
    /// # Errors
    /// Returns an error string if storage or the HTTP client cannot be set up.
    pub fn new() -> Result<Self, String> {
        Self::from_config(&AppConfig::from_env(), Theme::Light)
    }

    /// Create the state from an explicit configuration.
    ///
    /// # Errors
    /// Returns an error string if storage or the HTTP client cannot be set up.
    pub fn from_config(config: &AppConfig, system_theme: Theme) -> Result<Self, String> {
        let controller = AppController::from_config(config, system_theme).map_err(|e| {
            tracing::error!(error = %e, "failed to initialize MovieVerse");
            e.to_string()
        })?;
        Ok(Self { controller })
    }

    /// Get a reference to the inner controller.
    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    /// Re-emit favorites and theme notifications as front-end events.
    pub fn forward_notifications<R: Runtime>(&self, app: &AppHandle<R>) {
        let handle = app.clone();
        self.controller.subscribe_favorites(move |change| {
            if let Err(e) = handle.emit(FAVORITES_CHANGED_EVENT, change.clone()) {
                tracing::warn!(error = %e, "failed to emit {}", FAVORITES_CHANGED_EVENT);
            }
        });

        let handle = app.clone();
        self.controller.subscribe_theme(move |change| {
            if let Err(e) = handle.emit(THEME_CHANGED_EVENT, *change) {
                tracing::warn!(error = %e, "failed to emit {}", THEME_CHANGED_EVENT);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AppConfig {
        AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_app_state_from_config() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&config_in(&dir), Theme::Dark).unwrap();

        let view = state.controller().view();
        assert_eq!(view.theme, Theme::Dark);
        assert_eq!(view.favorites_count, 0);
    }

    #[test]
    fn test_app_state_persists_favorites_to_data_dir() {
        let dir = TempDir::new().unwrap();
        {
            let state = AppState::from_config(&config_in(&dir), Theme::Light).unwrap();
            assert!(state
                .controller()
                .import_favorites(r#"[{"imdbID": "tt1", "Title": "A", "Year": "2001"}]"#));
            state.controller().toggle_theme();
        }

        let state = AppState::from_config(&config_in(&dir), Theme::Light).unwrap();
        assert_eq!(state.controller().favorites().len(), 1);
        assert_eq!(state.controller().current_theme(), Theme::Dark);
    }

    #[test]
    fn test_app_state_starts_over_corrupt_storage() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("storage.json"), "{ broken").unwrap();

        let state = AppState::from_config(&config_in(&dir), Theme::Dark).unwrap();
        assert_eq!(state.controller().favorites().len(), 0);
        assert_eq!(state.controller().current_theme(), Theme::Dark);
    }
}
