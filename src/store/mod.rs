//! Store module for persisting user preferences to disk
//!
//! This module provides a typed key-value store. Every key names its file and
//! its value type; writes replace a key atomically and reads of missing or
//! unreadable keys come back empty. `UserLibrary` layers the watchlist,
//! rating and country operations on top of it.

pub mod keys;
mod library;
mod manager;

pub use keys::{Countries, PreferenceKey, SavedMovies, SelectedCountryCode, Watchlist};
pub use library::UserLibrary;
pub use manager::{PreferenceStore, StoreError};
