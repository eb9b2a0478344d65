//! Everything one dashboard refresh needs, computed from a single filter.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate, mean_revenue_by_rating_bucket, mean_roi_by_genre};
use super::sample::{roi_scatter_points, sample_with_rng};
use super::MovieTable;
use crate::api::logs::log_warning;
use crate::config::{
    DEFAULT_BUDGET_RANGE, DEFAULT_GENRES, DEFAULT_YEAR_FROM, SCATTER_SAMPLE_CAP,
};
use crate::error::{QueryError, QueryResult};
use crate::models::{CleanedMovie, FilterCriteria, GenreRoi, Kpis, RatingBucket};

/// Non-fatal conditions the presentation layer should show to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// The filter matched no movie.
    EmptyResult { message: String },
}

impl Notice {
    pub fn empty_result() -> Self {
        Notice::EmptyResult {
            message: "No movies match the selected filters. Adjust the year range, budget range or genres."
                .to_string(),
        }
    }
}

/// Aggregates and samples for one filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub criteria: FilterCriteria,
    pub kpis: Kpis,
    pub roi_by_genre: Vec<GenreRoi>,
    pub revenue_by_rating: Vec<RatingBucket>,
    /// Budget vs revenue points.
    pub revenue_scatter: Vec<CleanedMovie>,
    /// Budget vs ROI points, outliers removed.
    pub roi_scatter: Vec<CleanedMovie>,
    pub notices: Vec<Notice>,
}

impl Dashboard {
    pub fn build(table: &MovieTable, criteria: FilterCriteria) -> Self {
        Self::build_with_rng(table, criteria, &mut rand::thread_rng())
    }

    pub fn build_with_rng<R>(table: &MovieTable, criteria: FilterCriteria, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let subset = table.filter(&criteria);

        let mut notices = Vec::new();
        if subset.is_empty() {
            log_warning("Filter matched no movies");
            notices.push(Notice::empty_result());
        }

        let revenue_scatter = sample_with_rng(&subset, SCATTER_SAMPLE_CAP, rng)
            .into_iter()
            .cloned()
            .collect();
        let roi_scatter = roi_scatter_points(&subset, rng)
            .into_iter()
            .cloned()
            .collect();

        Self {
            kpis: aggregate(&subset),
            roi_by_genre: mean_roi_by_genre(&subset),
            revenue_by_rating: mean_revenue_by_rating_bucket(&subset),
            revenue_scatter,
            roi_scatter,
            notices,
            criteria,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.kpis.has_data()
    }
}

impl FilterCriteria {
    /// Initial selection for a table: release years from 2010 (or the first
    /// year on record, if later) to the last, the default budget window, and
    /// the default genres that actually occur in the table.
    pub fn dashboard_default(table: &MovieTable) -> Self {
        let (first, last) = table
            .year_bounds()
            .unwrap_or((DEFAULT_YEAR_FROM, DEFAULT_YEAR_FROM));
        let year_min = DEFAULT_YEAR_FROM.max(first).min(last);

        let available = table.available_genres();
        let genres = DEFAULT_GENRES
            .iter()
            .filter(|g| available.iter().any(|a| a == *g))
            .map(|g| g.to_string());

        FilterCriteria::new((year_min, last), DEFAULT_BUDGET_RANGE, genres)
    }

    /// Replace the dimensions set in `overrides`, keeping the rest.
    pub fn with_overrides(mut self, overrides: FilterOverrides) -> QueryResult<Self> {
        if let Some(v) = overrides.year_min {
            self.year_min = v;
        }
        if let Some(v) = overrides.year_max {
            self.year_max = v;
        }
        if let Some(v) = overrides.budget_min {
            self.budget_min = v;
        }
        if let Some(v) = overrides.budget_max {
            self.budget_max = v;
        }
        if let Some(genres) = overrides.genres {
            self.genres = genres.into_iter().collect();
        }

        if self.year_min > self.year_max {
            return Err(QueryError::InvalidCriteria(format!(
                "year range {}..{} is inverted",
                self.year_min, self.year_max
            )));
        }
        if matches!(
            self.budget_min.partial_cmp(&self.budget_max),
            None | Some(Ordering::Greater)
        ) {
            return Err(QueryError::InvalidCriteria(format!(
                "budget range {}..{} is inverted",
                self.budget_min, self.budget_max
            )));
        }
        Ok(self)
    }
}

/// Partial filter supplied by a caller. Unset fields fall back to the
/// dashboard defaults. An explicit empty genre list selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterOverrides {
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub genres: Option<Vec<String>>,
}
