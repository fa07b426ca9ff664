//! Tauri commands for MovieVerse
//!
//! This module contains all Tauri commands that can be invoked from the frontend.
//! Most commands return the refreshed [`ViewState`] so the UI can redraw in one step.
//! Failures the user should see are already part of that view as a notice
//! or toast, so they are logged here rather than returned as errors.

use tauri::State;

use crate::AppState;
use movieverse_core::{Favorite, FavoriteToggle, KeyPress, MovieSummary, Tab, Theme, ViewState};

/// Search movies by title.
///
/// Loads the first page of results and replaces any previous search.
///
/// # Arguments
/// * `query` - Title to search for
///
/// # Returns
/// * `Ok(ViewState)` with the results, or with a notice if the search failed
#[tauri::command]
pub async fn search_movies(state: State<'_, AppState>, query: String) -> Result<ViewState, String> {
    let controller = state.controller();
    if let Err(e) = controller.search(&query).await {
        tracing::warn!(query = %query, error = %e, "search_movies failed");
    }
    Ok(controller.view())
}

/// Load the next page of the current search.
///
/// # Returns
/// * `Ok(ViewState)` with the appended results, or with a notice on failure
#[tauri::command]
pub async fn load_more_movies(state: State<'_, AppState>) -> Result<ViewState, String> {
    let controller = state.controller();
    if let Err(e) = controller.load_more().await {
        tracing::warn!(error = %e, "load_more_movies failed");
    }
    Ok(controller.view())
}

/// Clear the search box and its results.
#[tauri::command]
pub fn clear_search(state: State<'_, AppState>) -> ViewState {
    state.controller().clear_search();
    state.controller().view()
}

/// Check the configured OMDb API key.
///
/// # Returns
/// * `Ok(true)` if the service accepted the key; otherwise the view shows a notice
#[tauri::command]
pub async fn validate_api_key(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.controller().validate_api_key().await)
}

/// Open the detail modal for a movie.
///
/// # Arguments
/// * `imdb_id` - IMDb identifier of the movie
///
/// # Returns
/// * `Ok(ViewState)` with the modal loaded, or showing the failure message
#[tauri::command]
pub async fn get_movie_details(
    state: State<'_, AppState>,
    imdb_id: String,
) -> Result<ViewState, String> {
    let controller = state.controller();
    if let Err(e) = controller.show_details(&imdb_id).await {
        tracing::warn!(imdb_id = %imdb_id, error = %e, "get_movie_details failed");
    }
    Ok(controller.view())
}

/// Close the detail modal.
#[tauri::command]
pub fn close_movie_details(state: State<'_, AppState>) -> ViewState {
    state.controller().close_modal();
    state.controller().view()
}

/// Add a movie to favorites, or remove it if already saved.
///
/// # Arguments
/// * `movie` - The search result whose heart button was pressed
#[tauri::command]
pub fn toggle_favorite(state: State<'_, AppState>, movie: MovieSummary) -> ViewState {
    let outcome = state.controller().toggle_favorite(&movie);
    if outcome == FavoriteToggle::Unchanged {
        tracing::warn!(imdb_id = %movie.imdb_id, "toggle_favorite left favorites unchanged");
    }
    state.controller().view()
}

/// Remove a favorite from the favorites tab.
#[tauri::command]
pub fn remove_favorite(state: State<'_, AppState>, imdb_id: String) -> ViewState {
    if !state.controller().remove_favorite(&imdb_id) {
        tracing::debug!(imdb_id = %imdb_id, "remove_favorite: not a favorite");
    }
    state.controller().view()
}

/// Get all saved favorites, oldest first.
#[tauri::command]
pub fn list_favorites(state: State<'_, AppState>) -> Vec<Favorite> {
    state.controller().favorites()
}

/// Remove every favorite.
#[tauri::command]
pub fn clear_favorites(state: State<'_, AppState>) -> ViewState {
    state.controller().clear_favorites();
    state.controller().view()
}

/// Serialize favorites as pretty-printed JSON for download.
#[tauri::command]
pub fn export_favorites(state: State<'_, AppState>) -> String {
    state.controller().export_favorites()
}

/// Replace favorites with the contents of an exported JSON document.
///
/// The returned view carries a success or error toast.
#[tauri::command]
pub fn import_favorites(state: State<'_, AppState>, json: String) -> ViewState {
    state.controller().import_favorites(&json);
    state.controller().view()
}

/// Switch between the search and favorites tabs.
///
/// # Arguments
/// * `tab` - `"search"` or `"favorites"`
///
/// # Returns
/// * `Err(String)` if the tab name is unknown
#[tauri::command]
pub fn switch_tab(state: State<'_, AppState>, tab: String) -> Result<ViewState, String> {
    let tab: Tab = tab.parse().map_err(|e: movieverse_core::MovieError| e.to_string())?;
    state.controller().switch_tab(tab);
    Ok(state.controller().view())
}

/// Flip between light and dark theme and persist the choice.
#[tauri::command]
pub fn toggle_theme(state: State<'_, AppState>) -> Theme {
    state.controller().toggle_theme()
}

/// Apply and persist an explicit theme.
///
/// # Arguments
/// * `theme` - `"light"` or `"dark"`
#[tauri::command]
pub fn set_theme(state: State<'_, AppState>, theme: String) -> Result<Theme, String> {
    state.controller().set_theme(&theme).map_err(|e| e.to_string())
}

/// Forget the saved theme and follow the OS color scheme again.
#[tauri::command]
pub fn reset_theme(state: State<'_, AppState>) -> Theme {
    state.controller().reset_theme()
}

/// Get the theme currently applied.
#[tauri::command]
pub fn current_theme(state: State<'_, AppState>) -> Theme {
    state.controller().current_theme()
}

/// Report an OS color-scheme change.
///
/// Only applied while the user has no saved preference.
#[tauri::command]
pub fn system_theme_changed(state: State<'_, AppState>, dark: bool) -> Theme {
    let theme = if dark { Theme::Dark } else { Theme::Light };
    state.controller().system_theme_changed(theme);
    state.controller().current_theme()
}

/// Handle a global key press (theme shortcut, Escape).
///
/// # Returns
/// * `true` if the key was consumed
#[tauri::command]
pub fn handle_key(state: State<'_, AppState>, key: KeyPress) -> bool {
    state.controller().handle_key(&key)
}

/// Dismiss the error notice.
#[tauri::command]
pub fn dismiss_notice(state: State<'_, AppState>) -> ViewState {
    state.controller().dismiss_notice();
    state.controller().view()
}

/// Get the current view without changing anything.
#[tauri::command]
pub fn view_state(state: State<'_, AppState>) -> ViewState {
    state.controller().view()
}
