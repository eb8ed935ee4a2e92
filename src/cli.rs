//! Command-line interface parsing for the movie library
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the runtime `AppConfig`: API keys, endpoints, data directory and log level.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;

use crate::data::streaming::STREAMING_BASE_URL;
use crate::data::tmdb::TMDB_BASE_URL;
use crate::data::{GenreId, MovieId};
use crate::store::PreferenceStore;

/// Highest rating a user can give
const MAX_RATING: f32 = 10.0;

/// Error types for CLI arguments and configuration
#[derive(Debug, Error)]
pub enum CliError {
    /// The rating is not a number between 0 and 10
    #[error("Invalid rating: '{0}'. Ratings are numbers from 0 to 10")]
    InvalidRating(String),

    /// A command needs an API key that was not provided
    #[error("Missing API key: pass --{flag} or set {env}")]
    MissingApiKey {
        flag: &'static str,
        env: &'static str,
    },

    /// No data directory was given and none could be determined
    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,

    /// The country code is not one of the saved countries
    #[error("Unknown country code: '{0}'. Run `movielib countries` to list them")]
    UnknownCountry(String),
}

/// Movie library - browse movies, check where to stream them, keep a watchlist
#[derive(Parser, Debug)]
#[command(name = "movielib")]
#[command(about = "Browse movies by genre, search titles, check streaming availability and keep a watchlist")]
#[command(version)]
pub struct Cli {
    /// TMDB API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true, global = true)]
    pub tmdb_api_key: Option<String>,

    /// Streaming availability API key
    #[arg(long, env = "STREAMING_API_KEY", hide_env_values = true, global = true)]
    pub streaming_api_key: Option<String>,

    /// Directory holding the watchlist, ratings and country preferences
    #[arg(long, env = "MOVIELIB_DATA_DIR", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the TMDB API root
    #[arg(long, value_name = "URL", global = true)]
    pub tmdb_url: Option<String>,

    /// Override the streaming availability API root
    #[arg(long, value_name = "URL", global = true)]
    pub streaming_url: Option<String>,

    /// Log more (-v debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List all movie genres
    Genres,

    /// List popular movies of a genre
    Movies {
        /// Genre id (see `movielib genres`)
        #[arg(long)]
        genre: GenreId,

        /// Number of pages of 20 movies to load
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Load only this page
        #[arg(long, conflicts_with = "pages")]
        page: Option<u32>,
    },

    /// Search movies by title
    Search {
        /// Title to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Result page
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show a movie with its streaming services and your rating
    Show {
        /// Movie id
        id: MovieId,

        /// Country to check streaming in (defaults to the selected country)
        #[arg(long)]
        country: Option<String>,
    },

    /// List countries covered by the streaming API
    Countries,

    /// Show the selected country, or select a new one
    Country {
        /// Country code to select, e.g. "us"
        code: Option<String>,
    },

    /// List or edit the watchlist
    Watchlist {
        #[command(subcommand)]
        action: Option<WatchlistAction>,
    },

    /// Save your rating for a movie
    Rate {
        /// Movie id
        id: MovieId,

        /// Rating from 0 to 10
        #[arg(long, value_parser = parse_rating_arg)]
        rating: f32,

        /// Mark the movie as already seen
        #[arg(long)]
        seen: bool,
    },
}

/// Watchlist subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistAction {
    /// List watchlisted movies
    List,
    /// Add a movie to the watchlist
    Add { id: MovieId },
    /// Remove a movie from the watchlist
    Remove { id: MovieId },
}

/// Parses a rating argument, accepting numbers from 0 to 10.
///
/// # Returns
/// * `Ok(f32)` if the string is a number within range
/// * `Err(CliError::InvalidRating)` otherwise
pub fn parse_rating_arg(s: &str) -> Result<f32, CliError> {
    s.trim()
        .parse::<f32>()
        .ok()
        .filter(|r| (0.0..=MAX_RATING).contains(r))
        .ok_or_else(|| CliError::InvalidRating(s.to_string()))
}

/// Runtime configuration derived from CLI arguments and environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tmdb_api_key: Option<String>,
    pub streaming_api_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub tmdb_base_url: String,
    pub streaming_base_url: String,
    pub verbosity: u8,
}

impl AppConfig {
    /// Creates an AppConfig from parsed CLI arguments.
    ///
    /// Blank API keys count as missing.
    pub fn from_cli(cli: &Cli) -> Self {
        let non_blank = |key: &Option<String>| {
            key.as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        };

        Self {
            tmdb_api_key: non_blank(&cli.tmdb_api_key),
            streaming_api_key: non_blank(&cli.streaming_api_key),
            data_dir: cli.data_dir.clone(),
            tmdb_base_url: cli
                .tmdb_url
                .clone()
                .unwrap_or_else(|| TMDB_BASE_URL.to_string()),
            streaming_base_url: cli
                .streaming_url
                .clone()
                .unwrap_or_else(|| STREAMING_BASE_URL.to_string()),
            verbosity: cli.verbose,
        }
    }

    /// The TMDB key, required by every metadata command
    pub fn require_tmdb_api_key(&self) -> Result<&str, CliError> {
        self.tmdb_api_key.as_deref().ok_or(CliError::MissingApiKey {
            flag: "tmdb-api-key",
            env: "TMDB_API_KEY",
        })
    }

    /// The streaming availability key
    pub fn require_streaming_api_key(&self) -> Result<&str, CliError> {
        self.streaming_api_key.as_deref().ok_or(CliError::MissingApiKey {
            flag: "streaming-api-key",
            env: "STREAMING_API_KEY",
        })
    }

    /// Default log filter when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            _ => "debug",
        }
    }

    /// Opens the preference store in the configured or XDG data directory
    pub fn preference_store(&self) -> Result<PreferenceStore, CliError> {
        match &self.data_dir {
            Some(dir) => Ok(PreferenceStore::with_dir(dir.clone())),
            None => PreferenceStore::new().ok_or(CliError::NoDataDir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating_arg_accepts_range() {
        assert_eq!(parse_rating_arg("0").unwrap(), 0.0);
        assert_eq!(parse_rating_arg("7.5").unwrap(), 7.5);
        assert_eq!(parse_rating_arg("10").unwrap(), 10.0);
    }

    #[test]
    fn test_parse_rating_arg_rejects_out_of_range() {
        assert!(parse_rating_arg("-1").is_err());
        assert!(parse_rating_arg("10.5").is_err());
    }

    #[test]
    fn test_parse_rating_arg_invalid() {
        let err = parse_rating_arg("great").unwrap_err();
        assert!(err.to_string().contains("Invalid rating"));
        assert!(err.to_string().contains("great"));
    }

    #[test]
    fn test_cli_parse_genres() {
        let cli = Cli::parse_from(["movielib", "genres"]);
        assert_eq!(cli.command, Command::Genres);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_movies_defaults_to_one_page() {
        let cli = Cli::parse_from(["movielib", "movies", "--genre", "28"]);
        assert_eq!(
            cli.command,
            Command::Movies {
                genre: 28,
                pages: 1,
                page: None
            }
        );
    }

    #[test]
    fn test_cli_parse_movies_single_page() {
        let cli = Cli::parse_from(["movielib", "movies", "--genre", "28", "--page", "2"]);
        assert_eq!(
            cli.command,
            Command::Movies {
                genre: 28,
                pages: 1,
                page: Some(2)
            }
        );
    }

    #[test]
    fn test_cli_movies_page_conflicts_with_pages() {
        let result = Cli::try_parse_from([
            "movielib", "movies", "--genre", "28", "--page", "2", "--pages", "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_search_joins_words() {
        let cli = Cli::parse_from(["movielib", "search", "the", "matrix", "--page", "2"]);
        assert_eq!(
            cli.command,
            Command::Search {
                query: vec!["the".to_string(), "matrix".to_string()],
                page: 2
            }
        );
    }

    #[test]
    fn test_cli_parse_rate() {
        let cli = Cli::parse_from(["movielib", "rate", "42", "--rating", "8", "--seen"]);
        assert_eq!(
            cli.command,
            Command::Rate {
                id: 42,
                rating: 8.0,
                seen: true
            }
        );
    }

    #[test]
    fn test_cli_parse_rate_invalid_rating_fails() {
        let result = Cli::try_parse_from(["movielib", "rate", "42", "--rating", "11"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_watchlist_without_action() {
        let cli = Cli::parse_from(["movielib", "watchlist"]);
        assert_eq!(cli.command, Command::Watchlist { action: None });
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["movielib", "genres", "--data-dir", "/tmp/ml", "-vv"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_config_blank_key_is_missing() {
        let cli = Cli::parse_from(["movielib", "genres", "--tmdb-api-key", "  "]);
        let config = AppConfig::from_cli(&cli);

        let err = config.require_tmdb_api_key().unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));
    }

    #[test]
    fn test_config_defaults() {
        let cli = Cli::parse_from([
            "movielib",
            "genres",
            "--tmdb-api-key",
            "abc",
            "--streaming-api-key",
            "xyz",
        ]);
        let config = AppConfig::from_cli(&cli);

        assert_eq!(config.require_tmdb_api_key().unwrap(), "abc");
        assert_eq!(config.require_streaming_api_key().unwrap(), "xyz");
        assert_eq!(config.tmdb_base_url, TMDB_BASE_URL);
        assert_eq!(config.streaming_base_url, STREAMING_BASE_URL);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_config_data_dir_override() {
        let cli = Cli::parse_from(["movielib", "country", "--data-dir", "/tmp/prefs"]);
        let store = AppConfig::from_cli(&cli).preference_store().unwrap();

        assert_eq!(store.data_dir(), &PathBuf::from("/tmp/prefs"));
    }
}
