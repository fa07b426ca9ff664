//! Data types for MovieVerse
//!
//! This module contains the core data structures used throughout the library.
//! Field names on the wire follow the metadata service (`imdbID`, `Title`, ...)
//! so that stored favorites and exports stay interchangeable with its payloads.

use serde::{Deserialize, Serialize};

/// Marker the metadata service uses for a missing field
pub const NOT_AVAILABLE: &str = "N/A";

/// Media type assumed when the service omits one
pub const DEFAULT_MEDIA_TYPE: &str = "movie";

/// Results per search page, fixed by the metadata service
pub const PAGE_SIZE: u32 = 10;

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn default_media_type() -> String {
    DEFAULT_MEDIA_TYPE.to_string()
}

/// Returns true unless the value is the service's "N/A" marker or blank.
pub fn is_available(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != NOT_AVAILABLE
}

/// Search result item from the metadata service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Unique external identifier
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Display title
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year or range (e.g., "2019" or "2019–2021")
    #[serde(rename = "Year", default = "not_available")]
    pub year: String,
    /// Poster URL or "N/A"
    #[serde(rename = "Poster", default = "not_available")]
    pub poster: String,
    /// Media type as reported by the service, if any
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl MovieSummary {
    /// Media type, falling back to "movie" when the service omitted it
    pub fn media_type(&self) -> &str {
        self.media_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE)
    }
}

/// Full record returned by the detail endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default = "not_available")]
    pub year: String,
    #[serde(rename = "Poster", default = "not_available")]
    pub poster: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(rename = "Plot", default = "not_available")]
    pub plot: String,
    #[serde(rename = "Genre", default = "not_available")]
    pub genre: String,
    #[serde(rename = "Director", default = "not_available")]
    pub director: String,
    /// Main cast, comma separated
    #[serde(rename = "Actors", default = "not_available")]
    pub actors: String,
    #[serde(rename = "Runtime", default = "not_available")]
    pub runtime: String,
    #[serde(rename = "Language", default = "not_available")]
    pub language: String,
    #[serde(rename = "Country", default = "not_available")]
    pub country: String,
    /// IMDb rating out of 10
    #[serde(rename = "imdbRating", default = "not_available")]
    pub imdb_rating: String,
    #[serde(rename = "Awards", default = "not_available")]
    pub awards: String,
}

/// Entry of the persisted favorites list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster", default = "not_available")]
    pub poster: String,
    #[serde(rename = "Type", default = "default_media_type")]
    pub media_type: String,
}

impl From<&MovieSummary> for Favorite {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            imdb_id: movie.imdb_id.clone(),
            title: movie.title.clone(),
            year: movie.year.clone(),
            poster: movie.poster.clone(),
            media_type: movie.media_type().to_string(),
        }
    }
}

/// Paginated result wrapper for search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Items on the current page
    pub items: Vec<T>,
    /// Current page number (1-based)
    pub current_page: u32,
    /// Total number of matches reported by the service
    pub total_results: u32,
}

impl<T> PaginatedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, current_page: u32, total_results: u32) -> Self {
        Self {
            items,
            current_page,
            total_results,
        }
    }

    /// Whether pages after `current_page` exist
    pub fn has_next_page(&self) -> bool {
        has_more_pages(self.current_page, self.total_results)
    }
}

/// Number of pages needed for `total_results` items.
pub fn total_pages(total_results: u32) -> u32 {
    total_results.div_ceil(PAGE_SIZE)
}

/// `current_page < ceil(total_results / PAGE_SIZE)`
pub fn has_more_pages(current_page: u32, total_results: u32) -> bool {
    current_page < total_pages(total_results)
}
