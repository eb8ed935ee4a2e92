//! Plain-text command handlers
//!
//! Each command talks to the `MovieCatalog` or `UserLibrary` and prints the
//! result. Empty or failed lookups print a short message instead of an error,
//! matching the catalog's "no data" semantics.

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use crate::cache::{next_page_for, MovieCatalog, MovieDetails, PAGE_SIZE};
use crate::cli::{AppConfig, Cli, CliError, Command, WatchlistAction};
use crate::data::{Genre, GenreId, Movie, SavedMovieRating, StreamingClient, TmdbClient};
use crate::store::UserLibrary;

/// Runs the parsed command, writing its output to `out`
pub async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_cli(cli);
    let library = UserLibrary::new(config.preference_store()?);

    match &cli.command {
        Command::Country { code: None } => {
            writeln!(out, "{}", library.selected_country())?;
        }
        Command::Country { code: Some(code) } => select_country(&library, code, out)?,
        Command::Watchlist {
            action: Some(WatchlistAction::Add { id }),
        } => {
            if library.add_to_watchlist(*id)? {
                writeln!(out, "Added {} to the watchlist", id)?;
            } else {
                writeln!(out, "{} is already in the watchlist", id)?;
            }
        }
        Command::Watchlist {
            action: Some(WatchlistAction::Remove { id }),
        } => {
            if library.remove_from_watchlist(*id)? {
                writeln!(out, "Removed {} from the watchlist", id)?;
            } else {
                writeln!(out, "{} is not in the watchlist", id)?;
            }
        }
        Command::Rate { id, rating, seen } => {
            library.save_rating(
                *id,
                SavedMovieRating {
                    user_rating: *rating,
                    already_seen: *seen,
                },
            )?;
            writeln!(out, "Saved rating {:.1} for {}", rating, id)?;
        }
        remote => {
            let catalog = build_catalog(&config, library)?;
            run_remote(remote, &config, &catalog, out).await?;
        }
    }

    Ok(())
}

/// Builds the catalog over the HTTP clients described by `config`
fn build_catalog(config: &AppConfig, library: UserLibrary) -> Result<MovieCatalog, Box<dyn Error>> {
    let tmdb = TmdbClient::new(config.tmdb_api_key.clone().unwrap_or_default())?
        .with_base_url(config.tmdb_base_url.as_str());
    let streaming = StreamingClient::new(config.streaming_api_key.clone().unwrap_or_default())?
        .with_base_url(config.streaming_base_url.as_str());

    Ok(MovieCatalog::new(Arc::new(tmdb), Arc::new(streaming), library))
}

/// Commands that reach the network
async fn run_remote<W: Write>(
    command: &Command,
    config: &AppConfig,
    catalog: &MovieCatalog,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Genres => {
            config.require_tmdb_api_key()?;
            match catalog.genres().await {
                Some(genres) => print_genres(&genres, out)?,
                None => writeln!(out, "Failed to fetch genres")?,
            }
        }
        Command::Movies { genre, pages, page } => {
            config.require_tmdb_api_key()?;
            let movies = match page {
                Some(page) => catalog.movies_by_genre(*genre, *page).await,
                None => load_genre_pages(catalog, *genre, *pages).await,
            };
            match movies {
                Some(mut movies) if !movies.is_empty() => {
                    catalog.library().apply_saved_ratings(&mut movies);
                    print_movies(&movies, out)?
                }
                Some(_) => writeln!(out, "No movies found for genre {}", genre)?,
                None => writeln!(out, "Failed to fetch movies")?,
            }
        }
        Command::Search { query, page } => {
            config.require_tmdb_api_key()?;
            let query = query.join(" ");
            match catalog.search_movies_by_title(&query, *page).await {
                Some(mut movies) if !movies.is_empty() => {
                    catalog.library().apply_saved_ratings(&mut movies);
                    print_movies(&movies, out)?
                }
                Some(_) => writeln!(out, "No results found for '{}'", query)?,
                None => writeln!(out, "Failed to search movies")?,
            }
        }
        Command::Show { id, country } => {
            config.require_tmdb_api_key()?;
            let details = if config.streaming_api_key.is_some() {
                catalog.movie_details(*id, country.as_deref()).await
            } else {
                tracing::warn!("No streaming API key; skipping streaming lookup");
                catalog.movie_details_without_streaming(*id, country.as_deref()).await
            };
            match details {
                Some(details) => write!(out, "{}", format_details(&details))?,
                None => writeln!(out, "Movie {} not found", id)?,
            }
        }
        Command::Countries => {
            if catalog.library().countries().is_none() {
                config.require_streaming_api_key()?;
            }
            let countries = catalog.countries().await;
            if countries.is_empty() {
                writeln!(out, "No countries available")?;
            }
            for country in countries {
                writeln!(out, "{:<4} {}", country.country_code, country.name)?;
            }
        }
        Command::Watchlist { .. } => {
            config.require_tmdb_api_key()?;
            let ids = catalog.library().watchlist();
            if ids.is_empty() {
                writeln!(out, "Watchlist is empty")?;
            } else {
                print_movies(&catalog.watchlist_movies().await, out)?;
            }
        }
        Command::Country { .. } | Command::Rate { .. } => {}
    }

    Ok(())
}

/// Loads up to `pages` pages of a genre the way a scrolling list would
///
/// Stops at the first short or empty page. Returns `None` if the first page
/// fails; a later failure keeps what was loaded.
async fn load_genre_pages(catalog: &MovieCatalog, genre_id: GenreId, pages: u32) -> Option<Vec<Movie>> {
    let mut loaded: Vec<Movie> = Vec::new();

    for _ in 0..pages.max(1) {
        let page = next_page_for(loaded.len());
        match catalog.movies_by_genre(genre_id, page).await {
            Some(movies) => {
                let full_page = movies.len() >= PAGE_SIZE;
                loaded.extend(movies);
                if !full_page {
                    break;
                }
            }
            None if loaded.is_empty() => return None,
            None => break,
        }
    }

    Some(loaded)
}

/// Selects a country, checking it against the saved country list when present
fn select_country<W: Write>(library: &UserLibrary, code: &str, out: &mut W) -> Result<(), Box<dyn Error>> {
    let code = code.trim().to_lowercase();
    if let Some(countries) = library.countries() {
        if !countries.iter().any(|c| c.country_code.eq_ignore_ascii_case(&code)) {
            return Err(CliError::UnknownCountry(code).into());
        }
    }

    library.set_selected_country(&code)?;
    writeln!(out, "Selected country: {}", code)?;
    Ok(())
}

fn print_genres<W: Write>(genres: &[Genre], out: &mut W) -> std::io::Result<()> {
    for genre in genres {
        writeln!(out, "{:>6}  {}", genre.id, genre.name)?;
    }
    Ok(())
}

fn print_movies<W: Write>(movies: &[Movie], out: &mut W) -> std::io::Result<()> {
    for movie in movies {
        writeln!(out, "{}", format_movie_line(movie))?;
    }
    Ok(())
}

/// One-line summary: id, title, year, community score and the user's marks
pub fn format_movie_line(movie: &Movie) -> String {
    let mut line = format!("{:>8}  {}", movie.id, movie.title);
    if let Some(year) = movie.release_year() {
        line.push_str(&format!(" ({})", year));
    }
    line.push_str(&format!("  [{:.1}]", movie.vote_average));
    if movie.user_rating > 0.0 {
        line.push_str(&format!("  yours: {:.1}", movie.user_rating));
    }
    if movie.already_seen {
        line.push_str("  seen");
    }
    line
}

/// Multi-line detail view of a movie
pub fn format_details(details: &MovieDetails) -> String {
    let movie = &details.movie;
    let mut text = format!("{}\n", movie.title);
    if !movie.release_date.is_empty() {
        text.push_str(&format!("Release date: {}\n", movie.release_date));
    }
    text.push_str(&format!("Rating: {:.1}/10\n", movie.vote_average));
    text.push_str(&format!(
        "Your rating: {:.1}/10 ({})\n",
        movie.user_rating,
        if movie.already_seen { "seen" } else { "not seen" }
    ));
    if let Some(poster) = &movie.poster_path {
        text.push_str(&format!("Poster: {}\n", poster));
    }
    match movie.platforms.as_deref() {
        None => text.push_str(&format!("Streaming ({}): not checked\n", details.country_code)),
        Some([]) => text.push_str(&format!(
            "Streaming ({}): not available in your region\n",
            details.country_code
        )),
        Some(services) => text.push_str(&format!(
            "Streaming ({}): {}\n",
            details.country_code,
            services.join(", ")
        )),
    }
    text.push_str(&format!(
        "Watchlist: {}\n",
        if details.in_watchlist { "yes" } else { "no" }
    ));
    if !movie.description.is_empty() {
        text.push_str(&format!("\n{}\n", movie.description));
    }
    text
}
