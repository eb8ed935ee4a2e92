//! Remote source traits
//!
//! The catalog talks to the metadata and availability APIs only through these
//! traits, so tests can substitute in-memory fakes for the HTTP clients.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use super::{Country, Genre, GenreId, Movie, MovieId, StreamingOption};

/// Errors that can occur when fetching from a remote source
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API returned status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested id or query has no match
    #[error("Not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// Whether this error means "no such item" rather than a failed fetch
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Movie metadata API (genres, discover, details, search)
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches the full genre list
    async fn genres(&self) -> Result<Vec<Genre>, FetchError>;

    /// Fetches one page of movies for a genre, most popular first
    async fn movies_by_genre(&self, genre_id: GenreId, page: u32) -> Result<Vec<Movie>, FetchError>;

    /// Fetches a single movie by id
    async fn movie(&self, movie_id: MovieId) -> Result<Movie, FetchError>;

    /// Fetches one page of title search results
    async fn search(&self, query: &str, page: u32) -> Result<Vec<Movie>, FetchError>;
}

/// Streaming availability API
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetches every country the API covers
    async fn countries(&self) -> Result<Vec<Country>, FetchError>;

    /// Fetches streaming options for a movie, keyed by country code
    async fn streaming_options(
        &self,
        movie_id: MovieId,
        country_code: &str,
    ) -> Result<HashMap<String, Vec<StreamingOption>>, FetchError>;
}
