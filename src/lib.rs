//! Movie Library
//!
//! Browse movies by genre, search by title, look up streaming availability
//! per country and keep a personal watchlist with ratings.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod data;
pub mod store;
