//! Cache module for serving movie data within a session
//!
//! This module provides the `MovieCatalog`, which keeps the genre list and
//! every fetched `(genre, page)` listing in memory so each is requested from
//! the metadata API at most once. Searches and streaming availability always
//! go to the network.

mod catalog;

pub use catalog::{next_page_for, CachedPage, MovieCatalog, MovieDetails, PAGE_SIZE};
