//! Session response cache over the remote movie sources
//!
//! `MovieCatalog` serves genres and genre pages from memory once fetched,
//! passes searches and availability lookups straight through, and overlays the
//! user's saved ratings on every movie it resolves by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;

use crate::data::{
    AvailabilitySource, Country, Genre, GenreId, MetadataSource, Movie, MovieId, IMAGE_BASE_URL,
};
use crate::store::UserLibrary;

/// Number of movies the metadata API returns per page
pub const PAGE_SIZE: usize = 20;

/// One fetched page of a genre listing
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub page: u32,
    pub movies: Vec<Movie>,
}

/// In-memory state owned by the catalog
#[derive(Debug, Default)]
struct CatalogState {
    genres: Option<Vec<Genre>>,
    /// Pages per genre, in the order they were fetched
    pages: HashMap<GenreId, Vec<CachedPage>>,
}

impl CatalogState {
    fn page(&self, genre_id: GenreId, page: u32) -> Option<&CachedPage> {
        self.pages.get(&genre_id)?.iter().find(|p| p.page == page)
    }

    fn store_page(&mut self, genre_id: GenreId, page: u32, movies: Vec<Movie>) {
        let pages = self.pages.entry(genre_id).or_default();
        match pages.iter_mut().find(|p| p.page == page) {
            Some(existing) => existing.movies = movies,
            None => pages.push(CachedPage { page, movies }),
        }
    }

    fn find_movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.pages
            .values()
            .flatten()
            .flat_map(|p| p.movies.iter())
            .find(|m| m.id == movie_id)
    }
}

/// A movie together with the user's context for it
///
/// `movie.platforms` holds the streaming services in `country_code`, or `None`
/// when availability was not looked up.
#[derive(Debug, Clone)]
pub struct MovieDetails {
    pub movie: Movie,
    pub country_code: String,
    pub in_watchlist: bool,
}

/// Fetch-or-serve access to movie data for one session
///
/// Every remote failure is logged and reported as "no data"; nothing is
/// retried. The state lock is never held across an await, so two concurrent
/// misses on the same key both fetch and the later write wins.
pub struct MovieCatalog {
    metadata: Arc<dyn MetadataSource>,
    availability: Arc<dyn AvailabilitySource>,
    library: UserLibrary,
    image_base_url: String,
    state: Mutex<CatalogState>,
}

impl MovieCatalog {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        availability: Arc<dyn AvailabilitySource>,
        library: UserLibrary,
    ) -> Self {
        Self {
            metadata,
            availability,
            library,
            image_base_url: IMAGE_BASE_URL.to_string(),
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// Uses a different prefix for poster URLs
    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into();
        self
    }

    /// The user library backing rating overlays and the country choice
    pub fn library(&self) -> &UserLibrary {
        &self.library
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All genres, fetched once per catalog
    ///
    /// Returns `None` if the fetch fails; failures are not cached.
    pub async fn genres(&self) -> Option<Vec<Genre>> {
        let cached = self.state().genres.clone();
        if let Some(genres) = cached {
            tracing::debug!(count = genres.len(), "Using cached genres");
            return Some(genres);
        }

        tracing::debug!("Fetching genres");
        match self.metadata.genres().await {
            Ok(genres) => {
                self.state().genres = Some(genres.clone());
                Some(genres)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch genres");
                None
            }
        }
    }

    /// One page of a genre listing, fetched at most once per `(genre, page)`
    pub async fn movies_by_genre(&self, genre_id: GenreId, page: u32) -> Option<Vec<Movie>> {
        let cached = self.state().page(genre_id, page).map(|p| p.movies.clone());
        if let Some(movies) = cached {
            tracing::debug!(genre_id, page, "Using cached movies");
            return Some(movies);
        }

        tracing::debug!(genre_id, page, "Fetching movies for genre");
        match self.metadata.movies_by_genre(genre_id, page).await {
            Ok(movies) => {
                let movies = self.with_posters(movies);
                self.state().store_page(genre_id, page, movies.clone());
                Some(movies)
            }
            Err(e) => {
                tracing::warn!(genre_id, page, error = %e, "Failed to fetch movies");
                None
            }
        }
    }

    /// Every cached movie of a genre, in page fetch order
    pub fn cached_movies_for_genre(&self, genre_id: GenreId) -> Vec<Movie> {
        self.state()
            .pages
            .get(&genre_id)
            .map(|pages| pages.iter().flat_map(|p| p.movies.iter().cloned()).collect())
            .unwrap_or_default()
    }

    /// Title search, never cached
    ///
    /// `Some(empty)` means no match, `None` means the search failed. Blank
    /// queries match nothing without a remote call.
    pub async fn search_movies_by_title(&self, query: &str, page: u32) -> Option<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Some(Vec::new());
        }

        tracing::debug!(query = %query, page, "Searching movies");
        match self.metadata.search(query, page).await {
            Ok(movies) => Some(self.with_posters(movies)),
            Err(e) if e.is_not_found() => Some(Vec::new()),
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Search failed");
                None
            }
        }
    }

    /// A single movie with the user's saved rating applied
    ///
    /// Cached pages are searched before the remote source is asked.
    pub async fn movie_by_id(&self, movie_id: MovieId) -> Option<Movie> {
        let cached = self.state().find_movie(movie_id).cloned();

        let mut movie = match cached {
            Some(movie) => {
                tracing::debug!(movie_id, "Using cached movie");
                movie
            }
            None => match self.metadata.movie(movie_id).await {
                Ok(movie) => movie.with_poster_base(&self.image_base_url),
                Err(e) => {
                    tracing::warn!(movie_id, error = %e, "Failed to fetch movie");
                    return None;
                }
            },
        };

        if let Some(saved) = self.library.saved_rating(movie_id) {
            movie.apply_saved(&saved);
        }
        Some(movie)
    }

    /// Every watchlisted movie that can still be resolved, in id order
    pub async fn watchlist_movies(&self) -> Vec<Movie> {
        let ids: Vec<MovieId> = self.library.watchlist().into_iter().collect();
        let resolved = join_all(ids.iter().map(|&id| self.movie_by_id(id))).await;

        ids.iter()
            .zip(resolved)
            .filter_map(|(id, movie)| {
                if movie.is_none() {
                    tracing::warn!(movie_id = id, "Skipping unresolved watchlist movie");
                }
                movie
            })
            .collect()
    }

    /// Countries covered by the availability API, persisted after first fetch
    pub async fn countries(&self) -> Vec<Country> {
        if let Some(countries) = self.library.countries() {
            tracing::debug!(count = countries.len(), "Using saved countries");
            return countries;
        }

        tracing::debug!("Fetching countries");
        match self.availability.countries().await {
            Ok(countries) => {
                if let Err(e) = self.library.save_countries(&countries) {
                    tracing::warn!(error = %e, "Failed to save countries");
                }
                countries
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch countries");
                Vec::new()
            }
        }
    }

    /// Names of services streaming a movie in a country, deduplicated
    ///
    /// Always asks the remote source. Any failure, including a response
    /// without the requested country, yields an empty list.
    pub async fn streaming_services(&self, movie_id: MovieId, country_code: &str) -> Vec<String> {
        let mut options = match self.availability.streaming_options(movie_id, country_code).await {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(movie_id, country_code, error = %e, "Failed to fetch streaming services");
                return Vec::new();
            }
        };

        let Some(options) = options.remove(country_code) else {
            tracing::debug!(movie_id, country_code, "No streaming options for country");
            return Vec::new();
        };

        let mut services: Vec<String> = Vec::with_capacity(options.len());
        for option in options {
            if !services.contains(&option.service.name) {
                services.push(option.service.name);
            }
        }
        services
    }

    /// A movie plus its streaming services in the selected (or given) country
    pub async fn movie_details(
        &self,
        movie_id: MovieId,
        country_code: Option<&str>,
    ) -> Option<MovieDetails> {
        self.details(movie_id, country_code, true).await
    }

    /// Like `movie_details`, but leaves streaming availability unchecked
    pub async fn movie_details_without_streaming(
        &self,
        movie_id: MovieId,
        country_code: Option<&str>,
    ) -> Option<MovieDetails> {
        self.details(movie_id, country_code, false).await
    }

    async fn details(
        &self,
        movie_id: MovieId,
        country_code: Option<&str>,
        check_streaming: bool,
    ) -> Option<MovieDetails> {
        let mut movie = self.movie_by_id(movie_id).await?;
        let country_code = country_code
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| self.library.selected_country());

        if check_streaming {
            movie.platforms = Some(self.streaming_services(movie_id, &country_code).await);
        }

        Some(MovieDetails {
            in_watchlist: self.library.is_in_watchlist(movie_id),
            movie,
            country_code,
        })
    }

    fn with_posters(&self, movies: Vec<Movie>) -> Vec<Movie> {
        movies
            .into_iter()
            .map(|m| m.with_poster_base(&self.image_base_url))
            .collect()
    }
}

/// Page to request next when `loaded_count` movies are already shown
pub fn next_page_for(loaded_count: usize) -> u32 {
    (loaded_count / PAGE_SIZE) as u32 + 1
}
