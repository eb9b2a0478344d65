//! Transformation module.
//!
//! This module turns the raw dataset into the cleaned one:
//! - Coerce: lenient number / date / text parsing
//! - Genres: genre field parsing and main genre resolution
//! - Pipeline: the batch run and the cleaned file writer

pub mod coerce;
pub mod genres;
pub mod pipeline;

pub use genres::{first_genre, main_genre, parse_genres};
pub use pipeline::*;
