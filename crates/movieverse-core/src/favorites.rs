//! Favorites store
//!
//! Owns the user's favorite-movie list and its persisted record. Entries are
//! unique by identifier and kept in insertion order. Storage faults never
//! reach callers: a failed read yields an empty list and a failed write is
//! logged and otherwise ignored.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::events::{Listeners, SubscriptionId};
use crate::storage::KeyValueStore;
use crate::types::{Favorite, MovieSummary};

/// Storage key of the favorites record
pub const FAVORITES_STORAGE_KEY: &str = "movieverse-favorites";

/// Payload broadcast after every change to the favorites list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoritesChanged {
    pub favorites: Vec<Favorite>,
    pub count: usize,
}

/// Persistent, observable list of favorite movies
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    favorites: Vec<Favorite>,
    listeners: Listeners<FavoritesChanged>,
}

impl FavoritesStore {
    /// Create the store and load any previously saved favorites.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let favorites = load(storage.as_ref());
        tracing::debug!(count = favorites.len(), "favorites loaded");
        Self {
            storage,
            favorites,
            listeners: Listeners::new(),
        }
    }

    /// Add `movie` unless a favorite with the same identifier exists.
    ///
    /// Returns true if the list changed.
    pub fn add(&mut self, movie: &MovieSummary) -> bool {
        if self.has(&movie.imdb_id) {
            tracing::debug!(imdb_id = %movie.imdb_id, "already a favorite");
            return false;
        }

        self.favorites.push(Favorite::from(movie));
        tracing::info!(imdb_id = %movie.imdb_id, "favorite added");
        self.commit();
        true
    }

    /// Remove the favorite with `imdb_id`. Returns false if there was none.
    pub fn remove(&mut self, imdb_id: &str) -> bool {
        let Some(index) = self.favorites.iter().position(|f| f.imdb_id == imdb_id) else {
            return false;
        };

        self.favorites.remove(index);
        tracing::info!(imdb_id, "favorite removed");
        self.commit();
        true
    }

    pub fn has(&self, imdb_id: &str) -> bool {
        self.favorites.iter().any(|f| f.imdb_id == imdb_id)
    }

    /// Owned copy of the list, in insertion order
    pub fn list(&self) -> Vec<Favorite> {
        self.favorites.clone()
    }

    pub fn count(&self) -> usize {
        self.favorites.len()
    }

    /// Drop every favorite.
    pub fn clear(&mut self) {
        self.favorites.clear();
        tracing::info!("favorites cleared");
        self.commit();
    }

    /// Serialize the list as pretty-printed JSON, for backup or sharing.
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(&self.favorites).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to export favorites");
            "[]".to_string()
        })
    }

    /// Replace the list with the favorites in `json`.
    ///
    /// Returns false, leaving the list untouched, unless `json` is an array.
    /// Entries without an identifier, title or year are skipped, as are
    /// repeated identifiers after their first occurrence.
    pub fn import(&mut self, json: &str) -> bool {
        let entries = match serde_json::from_str::<Value>(json) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!("import rejected: favorites payload is not a list");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "import rejected: invalid JSON");
                return false;
            }
        };

        let total = entries.len();
        self.favorites = sanitize(entries);
        tracing::info!(
            imported = self.favorites.len(),
            skipped = total - self.favorites.len(),
            "favorites imported"
        );
        self.commit();
        true
    }

    /// Register a listener for [`FavoritesChanged`] broadcasts.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&FavoritesChanged) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn commit(&self) {
        self.save();
        self.listeners.notify(&FavoritesChanged {
            favorites: self.list(),
            count: self.count(),
        });
    }

    fn save(&self) {
        let json = match serde_json::to_string(&self.favorites) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize favorites");
                return;
            }
        };
        if let Err(e) = self.storage.set(FAVORITES_STORAGE_KEY, &json) {
            tracing::error!(error = %e, "failed to save favorites");
        }
    }
}

fn load(storage: &dyn KeyValueStore) -> Vec<Favorite> {
    let json = match storage.get(FAVORITES_STORAGE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!(error = %e, "failed to read favorites");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Array(entries)) => sanitize(entries),
        Ok(_) => {
            tracing::warn!("stored favorites are not a list, starting empty");
            Vec::new()
        }
        Err(e) => {
            tracing::error!(error = %e, "stored favorites are corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Keep well-formed entries, first occurrence of each identifier wins.
fn sanitize(entries: Vec<Value>) -> Vec<Favorite> {
    let mut favorites: Vec<Favorite> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !["imdbID", "Title", "Year"]
            .iter()
            .all(|field| has_text(&entry, field))
        {
            continue;
        }
        let Ok(favorite) = serde_json::from_value::<Favorite>(entry) else {
            continue;
        };
        if favorites.iter().all(|f| f.imdb_id != favorite.imdb_id) {
            favorites.push(favorite);
        }
    }
    favorites
}

fn has_text(entry: &Value, field: &str) -> bool {
    entry
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|value| !value.is_empty())
}
