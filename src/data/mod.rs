//! Core data models for the movie library
//!
//! This module contains the types mirrored from the metadata and streaming
//! APIs, plus the clients and traits used to fetch them.

pub mod source;
pub mod streaming;
pub mod tmdb;

#[cfg(test)]
pub(crate) mod test_support;

pub use source::{AvailabilitySource, FetchError, MetadataSource};
pub use streaming::StreamingClient;
pub use tmdb::TmdbClient;

use serde::{Deserialize, Serialize};

/// Identifier of a movie in the metadata API
pub type MovieId = u64;

/// Identifier of a genre in the metadata API
pub type GenreId = u32;

/// Base URL prepended to relative poster paths
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A movie as returned by the metadata API, enriched with local user data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Unique identifier
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Plot summary
    #[serde(rename = "overview", default)]
    pub description: String,
    /// Release date as provided by the API (YYYY-MM-DD, may be empty)
    #[serde(default)]
    pub release_date: String,
    /// Average community vote (0-10)
    #[serde(default)]
    pub vote_average: f32,
    /// Relative poster path from the API, absolute URL once enriched
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Streaming platforms, when known
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
    /// The user's own rating (0-10)
    #[serde(default)]
    pub user_rating: f32,
    /// Whether the user has already seen the movie
    #[serde(default)]
    pub already_seen: bool,
}

impl Movie {
    /// Rewrites the relative poster path into an absolute image URL.
    ///
    /// Movies without a poster keep `None`.
    pub fn with_poster_base(mut self, image_base_url: &str) -> Self {
        if let Some(path) = self.poster_path.take() {
            self.poster_path = Some(format!("{}{}", image_base_url, path));
        }
        self
    }

    /// Overlays the user's saved rating and seen flag
    pub fn apply_saved(&mut self, saved: &SavedMovieRating) {
        self.user_rating = saved.user_rating;
        self.already_seen = saved.already_seen;
    }

    /// Release year, if the release date carries one
    pub fn release_year(&self) -> Option<&str> {
        self.release_date.get(..4).filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}

/// A movie category defined by the metadata API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// A country supported by the streaming availability API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
}

/// The user's locally saved opinion of a movie
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedMovieRating {
    /// Rating on a 0-10 scale
    pub user_rating: f32,
    /// Whether the user has seen the movie
    pub already_seen: bool,
}

/// One way of watching a title, as listed by the availability API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamingOption {
    pub service: StreamingService,
}

/// A streaming platform offering a title
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamingService {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}
