//! Application controller
//!
//! Owns the transient search session and UI state, and wires the metadata
//! client, the favorites store and the theme manager together.
//!
//! All methods take `&self`. State sits behind short-lived mutex guards that
//! are never held across an `.await`, so overlapping calls (a "load more"
//! issued while a search is still in flight, say) see each other's loading
//! flag and are gated by it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::client::OmdbClient;
use crate::config::AppConfig;
use crate::error::{MovieError, Result};
use crate::events::SubscriptionId;
use crate::favorites::{FavoritesChanged, FavoritesStore};
use crate::lock;
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::theme::{Theme, ThemeChanged, ThemeManager};
use crate::types::{has_more_pages, Favorite, MovieSummary, PaginatedResult};
use crate::view::{
    poster_url, DetailModal, DetailView, FavoriteCard, LoadMoreButton, ModalContent, ResultCard,
    ResultsHeader, Tab, Toast, ToastKind, ViewState,
};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a movie title to search.";
pub const DETAILS_FAILED_MESSAGE: &str = "Failed to load movie details. Please try again.";
pub const UNHANDLED_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const SEARCH_BUSY_MESSAGE: &str = "Still loading the previous search.";

/// How long an error notice stays up
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

/// How long a toast stays up
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Search state for the current query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    pub query: String,
    /// Last page merged into `results` (1-based)
    pub current_page: u32,
    /// Every result received for `query`, in page order
    pub results: Vec<MovieSummary>,
    pub total_results: u32,
    pub is_loading: bool,
}

impl SearchSession {
    /// Start over for `query`.
    fn reset(&mut self, query: &str) {
        self.query = query.to_string();
        self.current_page = 1;
        self.results.clear();
        self.total_results = 0;
    }

    /// Fold a fetched page into the session.
    ///
    /// Page 1 replaces the results; later pages are appended.
    pub fn merge_page(&mut self, page: PaginatedResult<MovieSummary>) {
        self.total_results = page.total_results;
        self.current_page = page.current_page;
        if page.current_page <= 1 {
            self.results = page.items;
        } else {
            self.results.extend(page.items);
        }
    }

    pub fn has_more_pages(&self) -> bool {
        has_more_pages(self.current_page, self.total_results)
    }
}

/// Holds the session's loading flag for the lifetime of one request.
struct LoadingGuard<'a> {
    session: &'a Mutex<SearchSession>,
}

impl<'a> LoadingGuard<'a> {
    /// Set the loading flag, or return `None` if a request is in flight.
    fn acquire(session: &'a Mutex<SearchSession>) -> Option<Self> {
        let mut state = lock(session);
        if state.is_loading {
            return None;
        }
        state.is_loading = true;
        Some(Self { session })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock(self.session).is_loading = false;
    }
}

/// Outcome of [`AppController::toggle_favorite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
    Unchanged,
}

/// A key press forwarded from the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Ctrl+Shift+T, or Cmd+Shift+T on macOS
    fn is_theme_shortcut(&self) -> bool {
        (self.ctrl || self.meta) && self.shift && self.key.eq_ignore_ascii_case("t")
    }
}

#[derive(Debug, Default)]
struct UiState {
    active_tab: Tab,
    favorites: Vec<Favorite>,
    favorites_count: usize,
    /// Favorite flag of each rendered result card, by identifier
    favorite_buttons: HashMap<String, bool>,
    modal: Option<DetailModal>,
    notice: Option<(String, Instant)>,
    toasts: Vec<(Toast, Instant)>,
}

impl UiState {
    fn apply_favorites(&mut self, change: &FavoritesChanged) {
        self.favorites = change.favorites.clone();
        self.favorites_count = change.count;
        for (imdb_id, is_favorite) in self.favorite_buttons.iter_mut() {
            *is_favorite = change.favorites.iter().any(|f| &f.imdb_id == imdb_id);
        }
    }

    fn is_favorite(&self, imdb_id: &str) -> bool {
        self.favorites.iter().any(|f| f.imdb_id == imdb_id)
    }

    fn show_notice(&mut self, message: String) {
        self.notice = Some((message, Instant::now() + NOTICE_DURATION));
    }

    fn push_toast(&mut self, message: &str, kind: ToastKind) {
        let now = Instant::now();
        self.expire(now);
        let toast = Toast {
            message: message.to_string(),
            kind,
        };
        self.toasts.push((toast, now + TOAST_DURATION));
    }

    /// Drop the notice and toasts that have expired by `now`.
    fn expire(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|(_, expires_at)| *expires_at <= now) {
            self.notice = None;
        }
        self.toasts.retain(|(_, expires_at)| *expires_at > now);
    }
}

/// Root of the application: search session, favorites and theme glue.
pub struct AppController {
    client: OmdbClient,
    favorites: Arc<Mutex<FavoritesStore>>,
    theme: Arc<Mutex<ThemeManager>>,
    session: Mutex<SearchSession>,
    ui: Arc<Mutex<UiState>>,
    /// Bumped on every detail request; older responses are discarded
    detail_generation: AtomicU64,
    favorites_subscription: SubscriptionId,
}

impl AppController {
    /// Build the controller from services created once at start-up.
    pub fn new(
        client: OmdbClient,
        favorites: Arc<Mutex<FavoritesStore>>,
        theme: Arc<Mutex<ThemeManager>>,
    ) -> Self {
        let ui = Arc::new(Mutex::new(UiState::default()));

        let favorites_subscription = {
            let mut store = lock(&favorites);
            {
                let mut state = lock(&ui);
                state.favorites = store.list();
                state.favorites_count = store.count();
            }
            let listener_ui = Arc::clone(&ui);
            let id = store.subscribe(move |change| lock(&listener_ui).apply_favorites(change));
            id
        };

        tracing::info!("MovieVerse initialized");

        Self {
            client,
            favorites,
            theme,
            session: Mutex::new(SearchSession::default()),
            ui,
            detail_generation: AtomicU64::new(0),
            favorites_subscription,
        }
    }

    /// Open the file-backed store and build every service from `config`.
    ///
    /// # Errors
    /// Fails if the storage file cannot be opened or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &AppConfig, system_theme: Theme) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(config.storage_path())?);
        let client = OmdbClient::with_config(config.client.clone())?;
        let favorites = Arc::new(Mutex::new(FavoritesStore::new(Arc::clone(&storage))));
        let theme = Arc::new(Mutex::new(ThemeManager::new(storage, system_theme)));
        Ok(Self::new(client, favorites, theme))
    }

    // ---- search -------------------------------------------------------

    /// Start a new search for `query`.
    ///
    /// Blank queries are rejected with a notice and never reach the
    /// network. While another search request is in flight nothing is sent
    /// and an info toast says so.
    pub async fn search(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            let error = MovieError::ValidationError(EMPTY_QUERY_MESSAGE.to_string());
            self.show_error(error.to_string());
            return Err(error);
        }

        let Some(guard) = LoadingGuard::acquire(&self.session) else {
            tracing::info!(query, "search ignored, request already in flight");
            lock(&self.ui).push_toast(SEARCH_BUSY_MESSAGE, ToastKind::Info);
            return Ok(());
        };

        lock(&self.session).reset(query);
        {
            let mut ui = lock(&self.ui);
            ui.favorite_buttons.clear();
            ui.notice = None;
        }

        self.fetch_page(guard, query.to_string(), 1).await
    }

    /// Fetch the next page of the current query and append it.
    ///
    /// No-op while a request is in flight or before any search.
    pub async fn load_more(&self) -> Result<()> {
        let Some(guard) = LoadingGuard::acquire(&self.session) else {
            tracing::debug!("load more ignored, request already in flight");
            return Ok(());
        };

        let (query, next_page) = {
            let session = lock(&self.session);
            (session.query.clone(), session.current_page + 1)
        };
        if query.is_empty() {
            return Ok(());
        }

        self.fetch_page(guard, query, next_page).await
    }

    async fn fetch_page(&self, _guard: LoadingGuard<'_>, query: String, page: u32) -> Result<()> {
        match self.client.search(&query, page).await {
            Ok(result) => {
                let mut session = lock(&self.session);
                if session.query != query {
                    tracing::debug!(query = %query, page, "discarding results for a replaced query");
                    return Ok(());
                }

                let page_ids: Vec<String> =
                    result.items.iter().map(|movie| movie.imdb_id.clone()).collect();
                session.merge_page(result);
                tracing::debug!(
                    query = %query,
                    page,
                    accumulated = session.results.len(),
                    has_more = session.has_more_pages(),
                    "results merged"
                );
                drop(session);

                let mut ui = lock(&self.ui);
                for imdb_id in page_ids {
                    let is_favorite = ui.is_favorite(&imdb_id);
                    ui.favorite_buttons.insert(imdb_id, is_favorite);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(query = %query, page, error = %e, "search failed");
                self.show_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop all results, e.g. when the search box is emptied.
    pub fn clear_search(&self) {
        {
            let mut session = lock(&self.session);
            session.reset("");
            session.query.clear();
        }
        lock(&self.ui).favorite_buttons.clear();
    }

    /// Snapshot of the search session
    pub fn session(&self) -> SearchSession {
        lock(&self.session).clone()
    }

    pub fn has_more_pages(&self) -> bool {
        lock(&self.session).has_more_pages()
    }

    /// Check that the configured API key is accepted by the service.
    pub async fn validate_api_key(&self) -> bool {
        let valid = self.client.validate_api_key().await;
        if !valid {
            self.show_error("The movie service rejected the API key.");
        }
        valid
    }

    // ---- favorites ----------------------------------------------------

    /// Add `movie` to favorites, or remove it if it already is one.
    ///
    /// Only the movie's own card is updated here; the favorites tab and
    /// counter follow the store's change notification.
    pub fn toggle_favorite(&self, movie: &MovieSummary) -> FavoriteToggle {
        let outcome = {
            let mut store = lock(&self.favorites);
            if store.has(&movie.imdb_id) {
                if store.remove(&movie.imdb_id) {
                    FavoriteToggle::Removed
                } else {
                    FavoriteToggle::Unchanged
                }
            } else if store.add(movie) {
                FavoriteToggle::Added
            } else {
                FavoriteToggle::Unchanged
            }
        };

        let mut ui = lock(&self.ui);
        match outcome {
            FavoriteToggle::Added => {
                ui.favorite_buttons.insert(movie.imdb_id.clone(), true);
                ui.push_toast("Added to favorites", ToastKind::Success);
            }
            FavoriteToggle::Removed => {
                ui.favorite_buttons.insert(movie.imdb_id.clone(), false);
                ui.push_toast("Removed from favorites", ToastKind::Success);
            }
            FavoriteToggle::Unchanged => {}
        }
        outcome
    }

    /// Remove a favorite from the favorites tab.
    pub fn remove_favorite(&self, imdb_id: &str) -> bool {
        let removed = lock(&self.favorites).remove(imdb_id);
        if removed {
            lock(&self.ui).push_toast("Removed from favorites", ToastKind::Success);
        }
        removed
    }

    pub fn clear_favorites(&self) {
        lock(&self.favorites).clear();
    }

    pub fn favorites(&self) -> Vec<Favorite> {
        lock(&self.favorites).list()
    }

    pub fn export_favorites(&self) -> String {
        lock(&self.favorites).export()
    }

    pub fn import_favorites(&self, json: &str) -> bool {
        let imported = lock(&self.favorites).import(json);
        let mut ui = lock(&self.ui);
        if imported {
            ui.push_toast("Favorites imported", ToastKind::Success);
        } else {
            ui.push_toast("Could not import favorites", ToastKind::Error);
        }
        imported
    }

    /// Register an extra listener on the favorites store.
    pub fn subscribe_favorites<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FavoritesChanged) + Send + Sync + 'static,
    {
        lock(&self.favorites).subscribe(listener)
    }

    // ---- details ------------------------------------------------------

    /// Open the detail modal for `imdb_id` and load its contents.
    ///
    /// If another detail request starts, or the modal is closed, before
    /// this one resolves, its response is discarded.
    pub async fn show_details(&self, imdb_id: &str) -> Result<()> {
        let generation = self.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.ui).modal = Some(DetailModal {
            imdb_id: imdb_id.to_string(),
            content: ModalContent::Loading,
        });

        let outcome = self.client.get_details(imdb_id).await;

        if self.detail_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(imdb_id, "discarding stale movie details");
            return Ok(());
        }

        let mut ui = lock(&self.ui);
        let Some(modal) = ui.modal.as_mut() else {
            return Ok(());
        };
        match outcome {
            Ok(detail) => {
                modal.content = ModalContent::Loaded(DetailView::from(&detail));
                Ok(())
            }
            Err(e) => {
                tracing::error!(imdb_id, error = %e, "failed to fetch movie details");
                modal.content = ModalContent::Failed(DETAILS_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Close the detail modal (close button, backdrop click or Escape).
    pub fn close_modal(&self) {
        self.detail_generation.fetch_add(1, Ordering::SeqCst);
        lock(&self.ui).modal = None;
    }

    // ---- navigation, theme, keys --------------------------------------

    pub fn switch_tab(&self, tab: Tab) {
        let refreshed = (tab == Tab::Favorites).then(|| {
            let store = lock(&self.favorites);
            (store.list(), store.count())
        });

        let mut ui = lock(&self.ui);
        ui.active_tab = tab;
        if let Some((favorites, count)) = refreshed {
            ui.favorites = favorites;
            ui.favorites_count = count;
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        lock(&self.theme).toggle()
    }

    /// Apply and persist the theme named by `token` ("light" or "dark").
    pub fn set_theme(&self, token: &str) -> Result<Theme> {
        lock(&self.theme).set_from_token(token)
    }

    /// Forget the saved theme and follow the OS again.
    pub fn reset_theme(&self) -> Theme {
        let mut theme = lock(&self.theme);
        theme.reset_to_system();
        theme.current()
    }

    pub fn current_theme(&self) -> Theme {
        lock(&self.theme).current()
    }

    pub fn system_theme_changed(&self, theme: Theme) {
        lock(&self.theme).system_theme_changed(theme);
    }

    /// Register a listener on the theme manager.
    pub fn subscribe_theme<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ThemeChanged) + Send + Sync + 'static,
    {
        lock(&self.theme).subscribe(listener)
    }

    /// Handle a global key press. Returns true if it was consumed.
    pub fn handle_key(&self, key: &KeyPress) -> bool {
        if key.is_theme_shortcut() {
            self.toggle_theme();
            return true;
        }
        if key.key == "Escape" && lock(&self.ui).modal.is_some() {
            self.close_modal();
            return true;
        }
        false
    }

    // ---- notices ------------------------------------------------------

    /// Show `message` as the error notice; it expires after [`NOTICE_DURATION`].
    pub fn show_error(&self, message: impl Into<String>) {
        lock(&self.ui).show_notice(message.into());
    }

    pub fn dismiss_notice(&self) {
        lock(&self.ui).notice = None;
    }

    /// Last-resort handler for failures nothing else caught.
    pub fn report_unhandled(&self, error: &dyn fmt::Display) {
        tracing::error!(error = %error, "unhandled error");
        self.show_error(UNHANDLED_ERROR_MESSAGE);
    }

    // ---- rendering ----------------------------------------------------

    /// Build the current view model, dropping expired notices and toasts.
    pub fn view(&self) -> ViewState {
        self.view_at(Instant::now())
    }

    fn view_at(&self, now: Instant) -> ViewState {
        let session = self.session();
        let theme = self.current_theme();
        let mut ui = lock(&self.ui);
        ui.expire(now);

        let results = session
            .results
            .iter()
            .map(|movie| ResultCard {
                movie: movie.clone(),
                poster_url: poster_url(&movie.poster),
                is_favorite: ui
                    .favorite_buttons
                    .get(&movie.imdb_id)
                    .copied()
                    .unwrap_or(false),
            })
            .collect();

        let results_header = (!session.results.is_empty())
            .then(|| ResultsHeader::new(&session.query, session.total_results));

        let load_more = if session.results.is_empty() {
            None
        } else {
            LoadMoreButton::for_session(
                session.current_page,
                session.total_results,
                session.is_loading,
            )
        };

        ViewState {
            active_tab: ui.active_tab,
            theme,
            query: session.query.clone(),
            is_loading: session.is_loading,
            results,
            results_header,
            load_more,
            favorites: ui.favorites.iter().map(FavoriteCard::from).collect(),
            favorites_count: ui.favorites_count,
            modal_title: ui.modal.as_ref().map(|modal| modal.title().to_string()),
            modal: ui.modal.clone(),
            notice: ui.notice.as_ref().map(|(message, _)| message.clone()),
            toasts: ui.toasts.iter().map(|(toast, _)| toast.clone()).collect(),
        }
    }
}

impl Drop for AppController {
    fn drop(&mut self) {
        lock(&self.favorites).unsubscribe(self.favorites_subscription);
    }
}
