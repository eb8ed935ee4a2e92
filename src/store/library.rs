//! The user's persisted library: watchlist, ratings and country choice

use std::collections::BTreeSet;

use super::keys::{Countries, SavedMovies, SelectedCountryCode, Watchlist};
use super::manager::{PreferenceStore, StoreError};
use crate::data::{Country, Movie, MovieId, SavedMovieRating};

/// Typed operations over the preference store
#[derive(Debug, Clone)]
pub struct UserLibrary {
    store: PreferenceStore,
}

impl UserLibrary {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    /// All watchlisted movie ids, ascending
    pub fn watchlist(&self) -> BTreeSet<MovieId> {
        self.store.get_or_default::<Watchlist>()
    }

    pub fn is_in_watchlist(&self, movie_id: MovieId) -> bool {
        self.watchlist().contains(&movie_id)
    }

    /// Adds a movie to the watchlist
    ///
    /// Returns `false` without writing if the movie was already listed.
    pub fn add_to_watchlist(&self, movie_id: MovieId) -> Result<bool, StoreError> {
        let mut watchlist = self.watchlist();
        if !watchlist.insert(movie_id) {
            return Ok(false);
        }
        self.store.set::<Watchlist>(&watchlist)?;
        tracing::info!(movie_id, "Movie added to watchlist");
        Ok(true)
    }

    /// Removes a movie from the watchlist
    ///
    /// Returns `false` without writing if the movie was not listed.
    pub fn remove_from_watchlist(&self, movie_id: MovieId) -> Result<bool, StoreError> {
        let mut watchlist = self.watchlist();
        if !watchlist.remove(&movie_id) {
            return Ok(false);
        }
        self.store.set::<Watchlist>(&watchlist)?;
        tracing::info!(movie_id, "Movie removed from watchlist");
        Ok(true)
    }

    /// The user's saved rating for a movie, if any
    pub fn saved_rating(&self, movie_id: MovieId) -> Option<SavedMovieRating> {
        self.store
            .get::<SavedMovies>()
            .and_then(|saved| saved.get(&movie_id).copied())
    }

    /// Overlays saved ratings on a listing, reading the ratings file once
    pub fn apply_saved_ratings(&self, movies: &mut [Movie]) {
        let Some(saved) = self.store.get::<SavedMovies>() else {
            return;
        };
        for movie in movies {
            if let Some(rating) = saved.get(&movie.id) {
                movie.apply_saved(rating);
            }
        }
    }

    /// Saves the user's rating for a movie, replacing any earlier one
    pub fn save_rating(&self, movie_id: MovieId, rating: SavedMovieRating) -> Result<(), StoreError> {
        self.store.update::<SavedMovies, _>(|saved| {
            saved.insert(movie_id, rating);
        })?;
        tracing::info!(movie_id, user_rating = rating.user_rating, "Movie rating saved");
        Ok(())
    }

    /// Country code used for streaming lookups
    pub fn selected_country(&self) -> String {
        self.store.get_or_default::<SelectedCountryCode>()
    }

    pub fn set_selected_country(&self, country_code: &str) -> Result<(), StoreError> {
        let code = country_code.trim().to_lowercase();
        self.store.set::<SelectedCountryCode>(&code)?;
        tracing::info!(country_code = %code, "Selected country saved");
        Ok(())
    }

    /// Persisted country list, `None` until first fetched
    pub fn countries(&self) -> Option<Vec<Country>> {
        self.store.get::<Countries>()
    }

    pub fn save_countries(&self, countries: &[Country]) -> Result<(), StoreError> {
        self.store.set::<Countries>(&countries.to_vec())
    }
}
