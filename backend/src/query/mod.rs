//! Query layer over the cleaned dataset.
//!
//! [`MovieStore`] owns the path to the cleaned file and loads it at most
//! once; every query afterwards runs against the same immutable
//! [`MovieTable`]. Filtering borrows rows from the table, so a filtered
//! view never copies or mutates the loaded data.
//!
//! ```rust,ignore
//! use boxoffice::query::{MovieStore, aggregate};
//! use boxoffice::models::FilterCriteria;
//!
//! let store = MovieStore::new("cleaned_movies.csv");
//! let table = store.load()?;
//! let subset = table.filter(&FilterCriteria::new((2015, 2018), (0.0, 2e8), ["Action"]));
//! println!("{:?}", aggregate(&subset));
//! ```

pub mod aggregate;
pub mod dashboard;
pub mod sample;

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

pub use aggregate::{
    aggregate, mean_revenue_by_rating_bucket, mean_roi_by_genre, rating_bucket, KpiAccumulator,
    RATING_BUCKETS,
};
pub use dashboard::{Dashboard, FilterOverrides, Notice};
pub use sample::{roi_scatter_points, sample_for_scatter, sample_with_rng};

use crate::api::logs::{log_success, log_warning, log_warning_indent};
use crate::error::{CsvError, QueryError, QueryResult};
use crate::models::{CleanedMovie, FilterCriteria, CLEANED_COLUMNS};
use crate::parser::{parse_file_auto, ParseResult};
use crate::validation::validate_cleaned_movie;

/// Rows of a filtered view, borrowed from the table.
pub type Subset<'a> = Vec<&'a CleanedMovie>;

/// Lazily loaded, memoized access to the cleaned dataset.
#[derive(Debug)]
pub struct MovieStore {
    path: PathBuf,
    table: OnceCell<Arc<MovieTable>>,
}

impl MovieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table on first call; later calls return the same table
    /// without touching the file. A failed load is not memoized.
    pub fn load(&self) -> QueryResult<Arc<MovieTable>> {
        self.table
            .get_or_try_init(|| MovieTable::read(&self.path).map(Arc::new))
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }
}

/// The cleaned dataset, held in memory and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieTable {
    rows: Vec<CleanedMovie>,
    skipped: usize,
}

impl MovieTable {
    /// Wrap rows that are already known to be clean.
    pub fn from_rows(rows: Vec<CleanedMovie>) -> Self {
        Self { rows, skipped: 0 }
    }

    /// Read and check a cleaned file. Rows that do not deserialize or do not
    /// satisfy the cleaned schema are skipped with a warning.
    pub fn read(path: &Path) -> QueryResult<Self> {
        if !path.is_file() {
            return Err(QueryError::DataUnavailable(path.to_path_buf()));
        }

        let parsed: ParseResult<CleanedMovie> =
            parse_file_auto::<CleanedMovie, _>(path).map_err(|e| match e {
                CsvError::IoError(io) if io.kind() == ErrorKind::NotFound => {
                    QueryError::DataUnavailable(path.to_path_buf())
                }
                other => other.into(),
            })?;

        let missing = parsed.missing_columns(&CLEANED_COLUMNS);
        if !missing.is_empty() {
            return Err(CsvError::ParseError {
                line: 1,
                message: format!("missing columns: {}", missing.join(", ")),
            }
            .into());
        }

        let mut skipped = parsed.skipped.len();
        for row in parsed.skipped.iter().take(3) {
            log_warning_indent(format!("Line {}: {}", row.line, row.reason), 1);
        }

        let mut rows = Vec::with_capacity(parsed.records.len());
        for (idx, movie) in parsed.records.into_iter().enumerate() {
            match validate_cleaned_movie(&movie) {
                Ok(()) => rows.push(movie),
                Err(errors) => {
                    skipped += 1;
                    if skipped <= 3 {
                        log_warning_indent(format!("Row {}: {}", idx + 1, errors.join("; ")), 1);
                    }
                }
            }
        }

        if skipped > 0 {
            log_warning(format!("Skipped {} invalid rows in '{}'", skipped, path.display()));
        }
        log_success(format!("Loaded {} movies from '{}'", rows.len(), path.display()));

        Ok(Self { rows, skipped })
    }

    pub fn rows(&self) -> &[CleanedMovie] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped while loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Sorted, deduplicated main genres.
    pub fn available_genres(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|m| m.main_genre.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Earliest and latest release year.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|m| m.release_year).min()?;
        let max = self.rows.iter().map(|m| m.release_year).max()?;
        Some((min, max))
    }

    /// Largest budget in the table.
    pub fn max_budget(&self) -> Option<f64> {
        self.rows.iter().map(|m| m.budget).max_by(f64::total_cmp)
    }

    /// Rows matching every dimension of `criteria`. An empty result is not
    /// an error.
    pub fn filter(&self, criteria: &FilterCriteria) -> Subset<'_> {
        self.rows.iter().filter(|m| criteria.matches(m)).collect()
    }

    /// Every row, as a subset.
    pub fn all(&self) -> Subset<'_> {
        self.rows.iter().collect()
    }
}

/// Narrow an existing subset by one predicate.
pub fn refine<'a, F>(subset: &[&'a CleanedMovie], predicate: F) -> Subset<'a>
where
    F: Fn(&CleanedMovie) -> bool,
{
    subset.iter().copied().filter(|m| predicate(*m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roi;
    use crate::transform::pipeline::write_cleaned;
    use tempfile::tempdir;

    fn movie(title: &str, genre: &str, budget: f64, revenue: f64, year: i32) -> CleanedMovie {
        CleanedMovie {
            title: title.into(),
            revenue,
            budget,
            roi: roi(revenue, budget),
            main_genre: genre.into(),
            release_year: year,
            runtime: 110.0,
            vote_average: 6.8,
        }
    }

    fn sample_table() -> MovieTable {
        MovieTable::from_rows(vec![
            movie("A", "Action", 10_000.0, 30_000.0, 2015),
            movie("B", "Drama", 20_000.0, 15_000.0, 2018),
            movie("C", "Action", 5_000.0, 20_000.0, 2020),
            movie("D", "Comedy", 50_000.0, 90_000.0, 2016),
        ])
    }

    #[test]
    fn test_available_genres_sorted_unique() {
        assert_eq!(sample_table().available_genres(), vec!["Action", "Comedy", "Drama"]);
    }

    #[test]
    fn test_bounds() {
        let table = sample_table();
        assert_eq!(table.year_bounds(), Some((2015, 2020)));
        assert_eq!(table.max_budget(), Some(50_000.0));
        assert_eq!(MovieTable::default().year_bounds(), None);
    }

    #[test]
    fn test_filter_ors_genres_and_ands_dimensions() {
        let table = sample_table();
        let criteria = FilterCriteria::new((2015, 2018), (0.0, 100_000.0), ["Action", "Drama"]);
        let titles: Vec<&str> = table.filter(&criteria).iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let table = sample_table();
        let criteria = FilterCriteria::new((1900, 1901), (0.0, 1e12), ["Action"]);
        assert!(table.filter(&criteria).is_empty());
    }

    #[test]
    fn test_filter_dimension_order_does_not_matter() {
        let table = sample_table();
        let criteria = FilterCriteria::new((2015, 2019), (6_000.0, 60_000.0), ["Action", "Comedy"]);
        let all = table.all();

        let genre_first = refine(
            &refine(&refine(&all, |m| criteria.matches_genre(m)), |m| criteria.matches_year(m)),
            |m| criteria.matches_budget(m),
        );
        let year_first = refine(
            &refine(&refine(&all, |m| criteria.matches_budget(m)), |m| criteria.matches_year(m)),
            |m| criteria.matches_genre(m),
        );

        assert_eq!(genre_first, year_first);
        assert_eq!(genre_first, table.filter(&criteria));
    }

    #[test]
    fn test_load_missing_file_is_data_unavailable() {
        let dir = tempdir().unwrap();
        let store = MovieStore::new(dir.path().join("absent.csv"));
        assert_eq!(store.path(), dir.path().join("absent.csv"));
        assert!(matches!(store.load(), Err(QueryError::DataUnavailable(_))));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_load_is_memoized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_cleaned(&path, sample_table().rows()).unwrap();

        let store = MovieStore::new(&path);
        let first = store.load().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = store.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_load_skips_invalid_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        std::fs::write(
            &path,
            "title,revenue,budget,roi,main_genre,release_year,runtime,vote_average\n\
             Heat,187436818,60000000,2.1239469666666667,Action,1995,170,7.9\n\
             Free,500,0,0,Action,1995,170,7.9\n\
             Broken,abc,60000000,1,Action,1995,170,7.9\n\
             Mystery,5000,2000,1.5,Unknown,2001,90,5.5\n",
        )
        .unwrap();

        let table = MovieTable::read(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped(), 3);
        assert_eq!(table.rows()[0].title, "Heat");
    }

    #[test]
    fn test_load_keeps_small_amounts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        std::fs::write(
            &path,
            "title,revenue,budget,roi,main_genre,release_year,runtime,vote_average\n\
             One,300,100,2.0,Action,2015,100,7\n\
             Two,150,200,-0.25,Drama,2018,100,7\n\
             Three,200,50,3.0,Action,2020,100,7\n",
        )
        .unwrap();

        let table = MovieStore::new(&path).load().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.skipped(), 0);

        let criteria = FilterCriteria::new((2015, 2018), (0.0, 1_000.0), ["Action"]);
        let kpis = aggregate(&table.filter(&criteria));
        assert_eq!(kpis.count, 1);
        assert_eq!(kpis.total_revenue, Some(300.0));
        assert_eq!(kpis.mean_budget, Some(100.0));
        assert_eq!(kpis.mean_roi, Some(2.0));
    }

    #[test]
    fn test_load_rejects_wrong_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        std::fs::write(&path, "title,budget\nHeat,60000000\n").unwrap();

        assert!(matches!(MovieTable::read(&path), Err(QueryError::Csv(_))));
    }
}
