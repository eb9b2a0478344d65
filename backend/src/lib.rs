//! # Boxoffice - movie metadata cleaning and dashboard queries
//!
//! Boxoffice turns a raw movie metadata export into a small, fixed-schema
//! CSV of financially meaningful movies, then answers filter and aggregate
//! queries over it for a dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Raw CSV    │────▶│   Parser    │────▶│  Transform  │────▶│ Cleaned CSV │
//! │ (any enc.)  │     │  (auto-enc) │     │ (coerce+gen)│     │ (8 columns) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │  HTTP / CLI │◀────│    Query    │◀───────────┘
//!                     │  (dashboard)│     │ (filter+agg)│
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use boxoffice::{transform_file, Dashboard, FilterCriteria, MovieStore};
//!
//! let report = transform_file(Path::new("raw.csv"), Path::new("cleaned_movies.csv"))?;
//! println!("Wrote {} movies", report.rows_written);
//!
//! let store = MovieStore::new("cleaned_movies.csv");
//! let table = store.load()?;
//! let dashboard = Dashboard::build(&table, FilterCriteria::dashboard_default(&table));
//! println!("{:?}", dashboard.kpis);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Paths, port and dashboard constants
//! - [`models`] - Raw and cleaned records, filters and aggregate results
//! - [`parser`] - CSV parsing with encoding and delimiter detection
//! - [`transform`] - Value coercion, genre parsing and the cleaning pipeline
//! - [`validation`] - Cleaned record schema check
//! - [`query`] - Memoized loading, filtering, aggregation and sampling
//! - [`api`] - HTTP API server and log broadcaster

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Queries
pub mod query;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, QueryError, ServerError};

// =============================================================================
// Re-exports - Config and models
// =============================================================================

pub use config::Config;
pub use models::{CleanedMovie, FilterCriteria, GenreRoi, Kpis, RatingBucket, RawMovie};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto,
    parse_str, ParseResult, SkippedRow,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    clean_records, transform_file, write_cleaned, CleaningStats, TransformReport,
};
pub use transform::{main_genre, parse_genres};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_cleaned_movie, validate_cleaned_movie};

// =============================================================================
// Re-exports - Query
// =============================================================================

pub use query::{
    aggregate, mean_revenue_by_rating_bucket, mean_roi_by_genre, sample_for_scatter, Dashboard,
    FilterOverrides, MovieStore, MovieTable, Notice,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
