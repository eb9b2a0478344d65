//! JSON Schema validation for cleaned movie rows.
//!
//! The schema is embedded at compile time from
//! `schemas/cleaned-movie.json` (draft 7) and compiled once. On top of the
//! schema, [`validate_cleaned_movie`] checks that the stored ROI matches
//! revenue and budget, which JSON Schema cannot express.
//!
//! The schema checks structure only: types, non-empty labels, no `Unknown`
//! genre and positive money columns. The transform's financial threshold is
//! not repeated here, so a cleaned file with small amounts loads as written.
//!
//! # Example
//!
//! ```rust,ignore
//! use boxoffice::validation::validate_cleaned_movie;
//!
//! if let Err(errors) = validate_cleaned_movie(&movie) {
//!     eprintln!("{}", errors.join("; "));
//! }
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::{roi, CleanedMovie};

/// Relative tolerance for the stored ROI.
const ROI_TOLERANCE: f64 = 1e-9;

static CLEANED_MOVIE_SCHEMA: Lazy<jsonschema::Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/cleaned-movie.json"))
        .expect("Invalid embedded schema");
    jsonschema::draft7::new(&schema).expect("Invalid embedded schema")
});

/// Check a JSON row against the cleaned movie schema.
pub fn validate_cleaned_value(data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = CLEANED_MOVIE_SCHEMA
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a typed row: schema constraints plus ROI consistency.
pub fn validate_cleaned_movie(movie: &CleanedMovie) -> Result<(), Vec<String>> {
    let value = serde_json::to_value(movie).map_err(|e| vec![e.to_string()])?;
    let mut errors = match validate_cleaned_value(&value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    let expected = roi(movie.revenue, movie.budget);
    if !((movie.roi - expected).abs() <= ROI_TOLERANCE * expected.abs().max(1.0)) {
        errors.push(format!("roi {} does not match revenue and budget (expected {})", movie.roi, expected));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check against the cleaned schema.
pub fn is_valid_cleaned_movie(movie: &CleanedMovie) -> bool {
    validate_cleaned_movie(movie).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat() -> CleanedMovie {
        CleanedMovie {
            title: "Heat".into(),
            revenue: 187_436_818.0,
            budget: 60_000_000.0,
            roi: roi(187_436_818.0, 60_000_000.0),
            main_genre: "Action".into(),
            release_year: 1995,
            runtime: 170.0,
            vote_average: 7.9,
        }
    }

    #[test]
    fn test_valid_movie() {
        assert!(is_valid_cleaned_movie(&heat()));
    }

    #[test]
    fn test_unknown_genre_rejected() {
        let mut movie = heat();
        movie.main_genre = "Unknown".into();
        assert!(!is_valid_cleaned_movie(&movie));
    }

    #[test]
    fn test_small_financials_accepted() {
        let mut movie = heat();
        movie.budget = 100.0;
        movie.revenue = 300.0;
        movie.roi = roi(movie.revenue, movie.budget);
        assert!(is_valid_cleaned_movie(&movie));
    }

    #[test]
    fn test_non_positive_budget_rejected() {
        let mut movie = heat();
        movie.budget = 0.0;
        movie.roi = 0.0;
        let errors = validate_cleaned_movie(&movie).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut movie = heat();
        movie.title = String::new();
        assert!(!is_valid_cleaned_movie(&movie));
    }

    #[test]
    fn test_inconsistent_roi_rejected() {
        let mut movie = heat();
        movie.roi = 0.5;
        let errors = validate_cleaned_movie(&movie).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("roi")));
    }

    #[test]
    fn test_nan_rejected() {
        let mut movie = heat();
        movie.vote_average = f64::NAN;
        assert!(!is_valid_cleaned_movie(&movie));
    }
}
