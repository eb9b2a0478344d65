//! Application configuration.
//!
//! Defaults are compiled in. Paths and port can be overridden from the
//! environment (a `.env` file is honoured by the CLI), and CLI flags take
//! precedence over both.

use std::env;
use std::path::PathBuf;

/// Raw dataset read by `boxoffice transform`.
pub const DEFAULT_INPUT_PATH: &str = "TMDB_movie_dataset_v11.csv";

/// Cleaned dataset written by the pipeline and loaded by the query layer.
pub const DEFAULT_OUTPUT_PATH: &str = "cleaned_movies.csv";

/// HTTP API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Revenue and budget must both be strictly above this to be kept.
pub const FINANCIAL_THRESHOLD: f64 = 1000.0;

/// Sentinel genre for rows whose genre list could not be used.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Maximum number of points handed out for a scatter plot.
pub const SCATTER_SAMPLE_CAP: usize = 1000;

/// ROI window kept for the budget/ROI scatter.
pub const ROI_SCATTER_RANGE: (f64, f64) = (-1.0, 20.0);

/// First release year selected by the default dashboard filter.
pub const DEFAULT_YEAR_FROM: i32 = 2010;

/// Default dashboard budget window, in absolute currency units.
pub const DEFAULT_BUDGET_RANGE: (f64, f64) = (20_000_000.0, 150_000_000.0);

/// Genres preselected by the default dashboard filter.
pub const DEFAULT_GENRES: [&str; 5] = ["Action", "Comedy", "Drama", "Horror", "Science Fiction"];

/// Environment variable overriding the raw input path.
pub const ENV_INPUT: &str = "BOXOFFICE_INPUT";
/// Environment variable overriding the cleaned data path.
pub const ENV_DATA: &str = "BOXOFFICE_DATA";
/// Environment variable overriding the HTTP port.
pub const ENV_PORT: &str = "BOXOFFICE_PORT";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_path: PathBuf,
    pub data_path: PathBuf,
    pub port: u16,
}

impl Config {
    /// Read overrides from the process environment, falling back to defaults.
    ///
    /// An unparsable `BOXOFFICE_PORT` is ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            input_path: lookup(ENV_INPUT)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            data_path: lookup(ENV_DATA)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            port: lookup(ENV_PORT)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            data_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.data_path, PathBuf::from("cleaned_movies.csv"));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_INPUT, "raw/movies.csv"),
            (ENV_DATA, "out/clean.csv"),
            (ENV_PORT, "8080"),
        ]));
        assert_eq!(config.input_path, PathBuf::from("raw/movies.csv"));
        assert_eq!(config.data_path, PathBuf::from("out/clean.csv"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = Config::from_lookup(lookup_from(&[(ENV_PORT, "not-a-port"), (ENV_DATA, " ")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }
}
