//! Streaming availability API client
//!
//! Fetches the list of supported countries and, per title, the streaming
//! services offering it in each country.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::source::{AvailabilitySource, FetchError};
use super::{Country, MovieId, StreamingOption};

/// Base URL for the streaming availability API
pub const STREAMING_BASE_URL: &str = "https://streaming-availability.p.rapidapi.com";

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-RapidAPI-Key";

/// Request timeout applied to every availability call
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the streaming availability API
#[derive(Debug, Clone)]
pub struct StreamingClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl StreamingClient {
    /// Creates a new StreamingClient for the public API
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self::with_client(client, api_key))
    }

    /// Creates a new StreamingClient with a custom HTTP client
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: STREAMING_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "Requesting streaming availability");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
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
impl AvailabilitySource for StreamingClient {
    async fn countries(&self) -> Result<Vec<Country>, FetchError> {
        let response: HashMap<String, Country> = self.get_json("countries", &[]).await?;
        Ok(countries_by_name(response))
    }

    async fn streaming_options(
        &self,
        movie_id: MovieId,
        country_code: &str,
    ) -> Result<HashMap<String, Vec<StreamingOption>>, FetchError> {
        let response: ShowResponse = self
            .get_json(
                &format!("shows/movie/{}", movie_id),
                &[("country", country_code)],
            )
            .await?;
        Ok(response.streaming_options)
    }
}

/// Flattens the code-keyed country map into a list sorted by name
fn countries_by_name(response: HashMap<String, Country>) -> Vec<Country> {
    let mut countries: Vec<Country> = response.into_values().collect();
    countries.sort_by(|a, b| a.name.cmp(&b.name));
    countries
}

/// Response body of `shows/movie/{id}`
#[derive(Debug, Deserialize)]
struct ShowResponse {
    #[serde(rename = "streamingOptions", default)]
    streaming_options: HashMap<String, Vec<StreamingOption>>,
}
