//! MovieVerse Core Library
//!
//! This crate provides the state and services behind the MovieVerse movie
//! search app.
//!
//! # Features
//! - Search movies through the OMDb API, page by page
//! - Movie detail lookup
//! - Persistent favorites list with import/export
//! - Light/dark theme preference that follows the OS until chosen
//! - A controller producing a render-ready view model

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod favorites;
pub mod storage;
pub mod theme;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use client::{ClientConfig, OmdbClient};
pub use config::AppConfig;
pub use controller::{AppController, FavoriteToggle, KeyPress, SearchSession};
pub use error::{MovieError, Result, StorageError};
pub use events::SubscriptionId;
pub use favorites::{FavoritesChanged, FavoritesStore};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use theme::{Theme, ThemeChanged, ThemeManager};
pub use types::{Favorite, MovieDetail, MovieSummary, PaginatedResult, PAGE_SIZE};
pub use view::{Tab, ViewState};

/// Lock `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
