//! TMDB (The Movie Database) metadata API client
//!
//! Fetches genres, genre listings, single movies and title search results
//! and parses them into our `Movie` and `Genre` structures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::source::{FetchError, MetadataSource};
use super::{Genre, GenreId, Movie, MovieId};

/// Base URL for the TMDB v3 API
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Request timeout applied to every TMDB call
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the TMDB metadata API
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    /// Creates a new TmdbClient for the public TMDB API
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self::with_client(client, api_key))
    }

    /// Creates a new TmdbClient with a custom HTTP client
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: TMDB_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different API root (mirrors, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL for an API path
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Performs a GET with the API key plus `params` and decodes the JSON body
    ///
    /// A 404 maps to `FetchError::NotFound`, any other non-2xx status to
    /// `FetchError::Status`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Requesting TMDB");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn genres(&self) -> Result<Vec<Genre>, FetchError> {
        let response: GenreResponse = self
            .get_json("genre/movie/list", &[("language", "en".to_string())])
            .await?;
        Ok(response.genres)
    }

    async fn movies_by_genre(&self, genre_id: GenreId, page: u32) -> Result<Vec<Movie>, FetchError> {
        let params = [
            ("language", "en-US".to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "true".to_string()),
            ("include_video", "false".to_string()),
            ("page", page.to_string()),
            ("with_genres", genre_id.to_string()),
        ];
        let response: MovieResponse = self.get_json("discover/movie", &params).await?;
        Ok(response.results)
    }

    async fn movie(&self, movie_id: MovieId) -> Result<Movie, FetchError> {
        self.get_json(&format!("movie/{}", movie_id), &[("language", "en".to_string())])
            .await
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<Movie>, FetchError> {
        let params = [("query", query.to_string()), ("page", page.to_string())];
        let response: MovieResponse = self.get_json("search/movie", &params).await?;
        Ok(response.results)
    }
}

/// Response body of `genre/movie/list`
#[derive(Debug, Deserialize)]
struct GenreResponse {
    genres: Vec<Genre>,
}

/// Paged response body of `discover/movie` and `search/movie`
#[derive(Debug, Deserialize)]
struct MovieResponse {
    results: Vec<Movie>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::serve;

    const GENRES_RESPONSE: &str = r#"{
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 12, "name": "Adventure"},
            {"id": 878, "name": "Science Fiction"}
        ]
    }"#;

    const DISCOVER_RESPONSE: &str = r#"{
        "page": 1,
        "results": [
            {"id": 27205, "title": "Inception", "overview": "Dreams.", "release_date": "2010-07-15", "vote_average": 8.4, "poster_path": "/inception.jpg"},
            {"id": 603, "title": "The Matrix", "overview": "Red pill.", "release_date": "1999-03-30", "vote_average": 8.2, "poster_path": null}
        ],
        "total_pages": 500,
        "total_results": 10000
    }"#;

    fn client_for(base_url: &str) -> TmdbClient {
        TmdbClient::with_client(Client::new(), "test-key").with_base_url(base_url)
    }

    #[test]
    fn test_parse_genre_response() {
        let response: GenreResponse =
            serde_json::from_str(GENRES_RESPONSE).expect("Failed to parse genres");

        assert_eq!(response.genres.len(), 3);
        assert_eq!(response.genres[0], Genre { id: 28, name: "Action".to_string() });
    }

    #[test]
    fn test_parse_discover_response() {
        let response: MovieResponse =
            serde_json::from_str(DISCOVER_RESPONSE).expect("Failed to parse movies");

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].title, "The Matrix");
        assert!(response.results[1].poster_path.is_none());
    }

    #[test]
    fn test_parse_missing_results_fails() {
        let result: Result<MovieResponse, _> = serde_json::from_str(r#"{"page": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = client_for("http://localhost:9999/3/");
        assert_eq!(client.endpoint("movie/42"), "http://localhost:9999/3/movie/42");
        assert_eq!(client.endpoint("/genre/movie/list"), "http://localhost:9999/3/genre/movie/list");
    }

    #[test]
    fn test_default_base_url() {
        let client = TmdbClient::with_client(Client::new(), "key");
        assert_eq!(client.base_url, TMDB_BASE_URL);
    }

    #[tokio::test]
    async fn test_genres_over_http() {
        let (base_url, _requests) = serve("200 OK", GENRES_RESPONSE).await;
        let genres = client_for(&base_url).genres().await.expect("genres should load");

        assert_eq!(genres.len(), 3);
        assert_eq!(genres[2].name, "Science Fiction");
    }

    #[tokio::test]
    async fn test_discover_sends_genre_page_and_key() {
        let (base_url, mut requests) = serve("200 OK", DISCOVER_RESPONSE).await;
        let movies = client_for(&base_url)
            .movies_by_genre(28, 3)
            .await
            .expect("discover should load");

        assert_eq!(movies.len(), 2);
        let request = requests.recv().await.expect("request should be captured");
        assert!(request.starts_with("GET /discover/movie?"));
        assert!(request.contains("api_key=test-key"));
        assert!(request.contains("with_genres=28"));
        assert!(request.contains("page=3"));
        assert!(request.contains("sort_by=popularity.desc"));
    }

    #[tokio::test]
    async fn test_search_url_encodes_query() {
        let (base_url, mut requests) = serve("200 OK", r#"{"results": []}"#).await;
        let movies = client_for(&base_url)
            .search("the matrix & co", 1)
            .await
            .expect("search should load");

        assert!(movies.is_empty());
        let request = requests.recv().await.expect("request should be captured");
        assert!(request.contains("query=the+matrix+%26+co"));
    }

    #[tokio::test]
    async fn test_movie_404_is_not_found() {
        let (base_url, _requests) = serve("404 Not Found", r#"{"status_code": 34}"#).await;
        let err = client_for(&base_url).movie(42).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let (base_url, _requests) = serve("500 Internal Server Error", "{}").await;
        let err = client_for(&base_url).genres().await.unwrap_err();

        assert!(matches!(err, FetchError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (base_url, _requests) = serve("200 OK", "{ invalid json }").await;
        let err = client_for(&base_url).genres().await.unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
    }
}
