//! Typed keys of the preference store
//!
//! Each key fixes the file it lives in and the type stored there, so a read
//! can only ever be decoded as the type that was written.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::data::{Country, MovieId, SavedMovieRating};

/// Country used for streaming lookups until the user picks one
pub const DEFAULT_COUNTRY_CODE: &str = "us";

/// A named entry in the preference store
pub trait PreferenceKey {
    /// File stem of the key on disk
    const NAME: &'static str;

    /// Type of the stored value
    type Value: Serialize + DeserializeOwned;

    /// Value reported for a key that was never written
    fn default_value() -> Self::Value;
}

/// Movie ids the user wants to revisit
pub struct Watchlist;

impl PreferenceKey for Watchlist {
    const NAME: &'static str = "watchlist";
    type Value = BTreeSet<MovieId>;

    fn default_value() -> Self::Value {
        BTreeSet::new()
    }
}

/// Per-movie user ratings and seen flags
pub struct SavedMovies;

impl PreferenceKey for SavedMovies {
    const NAME: &'static str = "saved_movies";
    type Value = BTreeMap<MovieId, SavedMovieRating>;

    fn default_value() -> Self::Value {
        BTreeMap::new()
    }
}

/// Country code used for streaming availability
pub struct SelectedCountryCode;

impl PreferenceKey for SelectedCountryCode {
    const NAME: &'static str = "SelectedCountryCode";
    type Value = String;

    fn default_value() -> Self::Value {
        DEFAULT_COUNTRY_CODE.to_string()
    }
}

/// Countries covered by the availability API, fetched once
pub struct Countries;

impl PreferenceKey for Countries {
    const NAME: &'static str = "countries";
    type Value = Vec<Country>;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}
