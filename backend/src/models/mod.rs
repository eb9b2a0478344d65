//! Domain models shared by the transform pipeline and the query layer.
//!
//! - [`RawMovie`] - one untyped row of the raw dataset
//! - [`CleanedMovie`] - one validated row of the cleaned dataset
//! - [`FilterCriteria`] - year / budget / genre selection for one query
//! - [`Kpis`], [`GenreRoi`], [`RatingBucket`] - aggregate results

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// =============================================================================
// Raw Record
// =============================================================================

/// A raw dataset row. Every field is kept as text; coercion happens in
/// [`crate::transform::coerce`]. Columns not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub revenue: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub vote_average: Option<String>,
}

/// Columns the pipeline requires in the raw header.
pub const RAW_COLUMNS: [&str; 7] = [
    "revenue",
    "budget",
    "release_date",
    "genres",
    "title",
    "runtime",
    "vote_average",
];

// =============================================================================
// Cleaned Record
// =============================================================================

/// A row of the cleaned dataset. Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedMovie {
    pub title: String,
    pub revenue: f64,
    pub budget: f64,
    pub roi: f64,
    pub main_genre: String,
    pub release_year: i32,
    pub runtime: f64,
    pub vote_average: f64,
}

/// Column names of the cleaned dataset, in order.
pub const CLEANED_COLUMNS: [&str; 8] = [
    "title",
    "revenue",
    "budget",
    "roi",
    "main_genre",
    "release_year",
    "runtime",
    "vote_average",
];

/// Return on investment: `(revenue - budget) / budget`.
pub fn roi(revenue: f64, budget: f64) -> f64 {
    (revenue - budget) / budget
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// Selection applied to the cleaned table. Both ranges are inclusive;
/// budgets are in absolute currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub year_min: i32,
    pub year_max: i32,
    pub budget_min: f64,
    pub budget_max: f64,
    pub genres: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new(
        years: (i32, i32),
        budget: (f64, f64),
        genres: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            year_min: years.0,
            year_max: years.1,
            budget_min: budget.0,
            budget_max: budget.1,
            genres: genres.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches_year(&self, movie: &CleanedMovie) -> bool {
        self.year_min <= movie.release_year && movie.release_year <= self.year_max
    }

    pub fn matches_budget(&self, movie: &CleanedMovie) -> bool {
        self.budget_min <= movie.budget && movie.budget <= self.budget_max
    }

    /// True when the movie's genre is one of the selected labels.
    pub fn matches_genre(&self, movie: &CleanedMovie) -> bool {
        self.genres.contains(&movie.main_genre)
    }

    /// All three dimensions, conjunctively.
    pub fn matches(&self, movie: &CleanedMovie) -> bool {
        self.matches_year(movie) && self.matches_budget(movie) && self.matches_genre(movie)
    }
}

// =============================================================================
// Aggregate Results
// =============================================================================

/// Headline figures for a subset.
///
/// An empty subset has no data for any of the four figures: the three sums
/// and means are `None`, and `count` is 0 with [`Kpis::has_data`] false.
/// Callers test `has_data()` rather than reading a zero count as a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub count: usize,
    pub total_revenue: Option<f64>,
    pub mean_budget: Option<f64>,
    pub mean_roi: Option<f64>,
}

impl Kpis {
    /// False for an empty subset, in which case no figure is meaningful.
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Mean ROI of one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRoi {
    pub genre: String,
    pub mean_roi: f64,
    pub count: usize,
}

/// Mean revenue of movies whose rating falls in `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub lower: u8,
    pub upper: u8,
    pub count: usize,
    pub mean_revenue: Option<f64>,
}

impl RatingBucket {
    /// Display label, e.g. `"7-8"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(genre: &str, budget: f64, year: i32) -> CleanedMovie {
        CleanedMovie {
            title: "T".into(),
            revenue: 5000.0,
            budget,
            roi: roi(5000.0, budget),
            main_genre: genre.into(),
            release_year: year,
            runtime: 100.0,
            vote_average: 6.5,
        }
    }

    #[test]
    fn test_roi() {
        assert_eq!(roi(300.0, 100.0), 2.0);
        assert_eq!(roi(150.0, 200.0), -0.25);
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let criteria = FilterCriteria::new((2015, 2018), (100.0, 200.0), ["Drama"]);
        assert!(criteria.matches(&movie("Drama", 100.0, 2015)));
        assert!(criteria.matches(&movie("Drama", 200.0, 2018)));
        assert!(!criteria.matches(&movie("Drama", 200.5, 2018)));
        assert!(!criteria.matches(&movie("Drama", 150.0, 2019)));
        assert!(!criteria.matches(&movie("Action", 150.0, 2016)));
    }

    #[test]
    fn test_empty_genre_set_matches_nothing() {
        let criteria = FilterCriteria::new((0, 3000), (0.0, f64::MAX), Vec::<String>::new());
        assert!(!criteria.matches(&movie("Drama", 150.0, 2016)));
    }

    #[test]
    fn test_rating_bucket_label() {
        let bucket = RatingBucket { lower: 7, upper: 8, count: 0, mean_revenue: None };
        assert_eq!(bucket.label(), "7-8");
    }

    #[test]
    fn test_kpis_serialize_camel_case() {
        let kpis = Kpis { count: 0, total_revenue: None, mean_budget: None, mean_roi: None };
        let json = serde_json::to_value(&kpis).unwrap();
        assert_eq!(json["count"], 0);
        assert!(json["totalRevenue"].is_null());
        assert!(json["meanRoi"].is_null());
    }
}
