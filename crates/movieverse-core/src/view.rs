//! Render-ready view model
//!
//! These types are what the UI layer draws. They are plain serializable
//! snapshots built by the controller; nothing here talks to the network
//! or to storage.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MovieError;
use crate::theme::Theme;
use crate::types::{is_available, total_pages, Favorite, MovieDetail, MovieSummary, PAGE_SIZE};

/// Shown in place of posters the service does not have
pub const PLACEHOLDER_POSTER: &str = "/placeholder.svg?height=400&width=300";

const UNKNOWN: &str = "Unknown";
const NO_PLOT: &str = "No plot available.";

/// Poster URL to display, substituting the placeholder for "N/A".
pub fn poster_url(poster: &str) -> String {
    if is_available(poster) {
        poster.to_string()
    } else {
        PLACEHOLDER_POSTER.to_string()
    }
}

fn or_unknown(value: &str) -> String {
    if is_available(value) {
        value.to_string()
    } else {
        UNKNOWN.to_string()
    }
}

fn available(value: &str) -> Option<String> {
    is_available(value).then(|| value.to_string())
}

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Search,
    Favorites,
}

impl FromStr for Tab {
    type Err = MovieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "search" => Ok(Tab::Search),
            "favorites" => Ok(Tab::Favorites),
            other => Err(MovieError::ValidationError(format!("Unknown tab \"{}\"", other))),
        }
    }
}

/// One search result card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCard {
    pub movie: MovieSummary,
    pub poster_url: String,
    pub is_favorite: bool,
}

/// One card on the favorites tab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteCard {
    pub favorite: Favorite,
    pub poster_url: String,
}

impl From<&Favorite> for FavoriteCard {
    fn from(favorite: &Favorite) -> Self {
        Self {
            favorite: favorite.clone(),
            poster_url: poster_url(&favorite.poster),
        }
    }
}

/// Heading above the result grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsHeader {
    pub title: String,
    pub count: String,
}

impl ResultsHeader {
    pub fn new(query: &str, total_results: u32) -> Self {
        Self {
            title: format!("Search Results for \"{}\"", query),
            count: format!(
                "Found {} movie{}",
                total_results,
                if total_results == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Pagination control below the result grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadMoreButton {
    pub label: String,
    pub disabled: bool,
}

impl LoadMoreButton {
    /// The button for the given session position, or `None` when hidden.
    ///
    /// It is shown only while more pages exist and the result set spans
    /// more than one page.
    pub fn for_session(current_page: u32, total_results: u32, is_loading: bool) -> Option<Self> {
        let has_more = current_page < total_pages(total_results);
        if !has_more || total_results <= PAGE_SIZE {
            return None;
        }

        if is_loading {
            return Some(Self {
                label: "Loading...".to_string(),
                disabled: true,
            });
        }

        let remaining = total_results.saturating_sub(current_page.saturating_mul(PAGE_SIZE));
        Some(Self {
            label: format!("Load More ({} remaining)", remaining),
            disabled: false,
        })
    }
}

/// Detail modal body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub imdb_id: String,
    pub title: String,
    pub poster_url: String,
    pub plot: String,
    pub year: String,
    pub genre: String,
    pub director: String,
    pub cast: String,
    pub runtime: String,
    pub language: String,
    pub country: String,
    /// "IMDb: 8.2/10", absent when unrated
    pub rating: Option<String>,
    pub awards: Option<String>,
}

impl From<&MovieDetail> for DetailView {
    fn from(detail: &MovieDetail) -> Self {
        Self {
            imdb_id: detail.imdb_id.clone(),
            title: detail.title.clone(),
            poster_url: poster_url(&detail.poster),
            plot: available(&detail.plot).unwrap_or_else(|| NO_PLOT.to_string()),
            year: detail.year.clone(),
            genre: or_unknown(&detail.genre),
            director: or_unknown(&detail.director),
            cast: or_unknown(&detail.actors),
            runtime: or_unknown(&detail.runtime),
            language: or_unknown(&detail.language),
            country: or_unknown(&detail.country),
            rating: available(&detail.imdb_rating).map(|rating| format!("IMDb: {}/10", rating)),
            awards: available(&detail.awards),
        }
    }
}

/// State of the detail modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum ModalContent {
    Loading,
    Loaded(DetailView),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailModal {
    pub imdb_id: String,
    pub content: ModalContent,
}

impl DetailModal {
    /// Heading shown in the modal frame
    pub fn title(&self) -> &str {
        match &self.content {
            ModalContent::Loading => "Loading...",
            ModalContent::Loaded(detail) => &detail.title,
            ModalContent::Failed(_) => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

/// Everything the UI needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub active_tab: Tab,
    pub theme: Theme,
    pub query: String,
    pub is_loading: bool,
    pub results: Vec<ResultCard>,
    pub results_header: Option<ResultsHeader>,
    pub load_more: Option<LoadMoreButton>,
    pub favorites: Vec<FavoriteCard>,
    pub favorites_count: usize,
    pub modal: Option<DetailModal>,
    pub modal_title: Option<String>,
    /// Current error notice, if it has not expired
    pub notice: Option<String>,
    pub toasts: Vec<Toast>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NOT_AVAILABLE;

    fn detail() -> MovieDetail {
        serde_json::from_value(serde_json::json!({
            "Title": "Batman Begins",
            "Year": "2005",
            "imdbID": "tt0372784",
            "Poster": "N/A",
            "Plot": "N/A",
            "Genre": "Action, Crime",
            "Director": "Christopher Nolan",
            "Actors": "N/A",
            "imdbRating": "8.2",
            "Awards": "N/A"
        }))
        .unwrap()
    }

    #[test]
    fn test_poster_url_placeholder() {
        assert_eq!(poster_url(NOT_AVAILABLE), PLACEHOLDER_POSTER);
        assert_eq!(poster_url("https://x/y.jpg"), "https://x/y.jpg");
    }

    #[test]
    fn test_detail_view_fallbacks() {
        let view = DetailView::from(&detail());
        assert_eq!(view.plot, "No plot available.");
        assert_eq!(view.cast, "Unknown");
        assert_eq!(view.runtime, "Unknown");
        assert_eq!(view.genre, "Action, Crime");
        assert_eq!(view.rating.as_deref(), Some("IMDb: 8.2/10"));
        assert_eq!(view.awards, None);
        assert_eq!(view.poster_url, PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_results_header_pluralization() {
        assert_eq!(ResultsHeader::new("batman", 1).count, "Found 1 movie");
        let header = ResultsHeader::new("batman", 25);
        assert_eq!(header.title, "Search Results for \"batman\"");
        assert_eq!(header.count, "Found 25 movies");
    }

    #[test]
    fn test_load_more_button_states() {
        assert_eq!(LoadMoreButton::for_session(1, 8, false), None);
        assert_eq!(LoadMoreButton::for_session(3, 25, false), None);
        assert_eq!(
            LoadMoreButton::for_session(1, 25, false),
            Some(LoadMoreButton {
                label: "Load More (15 remaining)".to_string(),
                disabled: false
            })
        );
        assert_eq!(
            LoadMoreButton::for_session(2, 25, true).map(|b| b.disabled),
            Some(true)
        );
    }

    #[test]
    fn test_modal_title() {
        let modal = DetailModal {
            imdb_id: "tt1".to_string(),
            content: ModalContent::Loading,
        };
        assert_eq!(modal.title(), "Loading...");

        let modal = DetailModal {
            imdb_id: "tt0372784".to_string(),
            content: ModalContent::Loaded(DetailView::from(&detail())),
        };
        assert_eq!(modal.title(), "Batman Begins");
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("favorites".parse::<Tab>().unwrap(), Tab::Favorites);
        assert!("settings".parse::<Tab>().is_err());
    }
}
