//! REST API types for the dashboard frontend.
//!
//! Query strings are parsed into [`DashboardParams`] and merged over the
//! table's default filter; responses are plain JSON in camelCase.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{QueryError, ServerError};
use crate::models::FilterCriteria;
use crate::query::{FilterOverrides, MovieTable};

/// `GET /api/dashboard` query string. `genres` is a comma separated list;
/// an empty value selects no genre at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardParams {
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub genres: Option<String>,
}

impl DashboardParams {
    pub fn overrides(&self) -> FilterOverrides {
        FilterOverrides {
            year_min: self.year_min,
            year_max: self.year_max,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            genres: self.genres.as_deref().map(split_genres),
        }
    }

    /// Filter for this request: the table defaults with the given fields
    /// replaced.
    pub fn into_criteria(self, table: &MovieTable) -> Result<FilterCriteria, ServerError> {
        let criteria = FilterCriteria::dashboard_default(table).with_overrides(self.overrides())?;
        Ok(criteria)
    }
}

fn split_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `GET /api/genres`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

/// `GET /api/bounds`: slider limits plus the initial selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsResponse {
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub max_budget: Option<f64>,
    pub movie_count: usize,
    pub defaults: FilterCriteria,
}

impl BoundsResponse {
    pub fn from_table(table: &MovieTable) -> Self {
        let years = table.year_bounds();
        Self {
            year_min: years.map(|(min, _)| min),
            year_max: years.map(|(_, max)| max),
            max_budget: table.max_budget(),
            movie_count: table.len(),
            defaults: FilterCriteria::dashboard_default(table),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Query(QueryError::InvalidCriteria(_)) => StatusCode::BAD_REQUEST,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Query(QueryError::DataUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{roi, CleanedMovie};

    fn table() -> MovieTable {
        let movie = |genre: &str, year: i32, budget: f64| CleanedMovie {
            title: format!("{} {}", genre, year),
            revenue: budget * 2.0,
            budget,
            roi: roi(budget * 2.0, budget),
            main_genre: genre.into(),
            release_year: year,
            runtime: 100.0,
            vote_average: 6.5,
        };
        MovieTable::from_rows(vec![
            movie("Action", 2008, 50_000_000.0),
            movie("Drama", 2016, 30_000_000.0),
            movie("Comedy", 2022, 200_000_000.0),
        ])
    }

    #[test]
    fn test_params_default_to_dashboard_filter() {
        let table = table();
        let criteria = DashboardParams::default().into_criteria(&table).unwrap();
        assert_eq!(criteria, FilterCriteria::dashboard_default(&table));
    }

    #[test]
    fn test_params_genre_list_is_split_and_trimmed() {
        let params = DashboardParams {
            genres: Some(" Drama, Horror ,,".into()),
            ..Default::default()
        };
        let genres = params.overrides().genres.unwrap();
        assert_eq!(genres, vec!["Drama", "Horror"]);
    }

    #[test]
    fn test_params_empty_genres_select_nothing() {
        let params = DashboardParams {
            genres: Some(String::new()),
            ..Default::default()
        };
        let criteria = params.into_criteria(&table()).unwrap();
        assert!(criteria.genres.is_empty());
    }

    #[test]
    fn test_inverted_range_is_bad_request() {
        let params = DashboardParams {
            year_min: Some(2020),
            year_max: Some(2010),
            ..Default::default()
        };
        let err = params.into_criteria(&table()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unavailable_is_503() {
        let err = ServerError::Unavailable("no data".into());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_bounds_from_table() {
        let bounds = BoundsResponse::from_table(&table());
        assert_eq!(bounds.year_min, Some(2008));
        assert_eq!(bounds.year_max, Some(2022));
        assert_eq!(bounds.max_budget, Some(200_000_000.0));
        assert_eq!(bounds.movie_count, 3);
        assert_eq!(bounds.defaults.year_min, 2010);

        let json = serde_json::to_value(&bounds).unwrap();
        assert_eq!(json["maxBudget"], 200_000_000.0);
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("boom");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "boom");
    }
}
