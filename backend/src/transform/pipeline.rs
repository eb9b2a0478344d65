//! Raw dataset to cleaned dataset, in one batch.
//!
//! Steps:
//! 1. Coerce numbers and dates (unparsable values become missing)
//! 2. Drop rows missing key fields or with revenue/budget at or below the
//!    financial threshold
//! 3. Resolve the main genre
//! 4. Derive ROI and release year
//! 5. Project onto the cleaned schema, dropping incomplete rows and rows
//!    whose genre resolved to `Unknown`
//!
//! The output file is replaced atomically; on any error nothing is written.
//!
//! # Example
//!
//! ```rust,ignore
//! use boxoffice::transform::pipeline::transform_file;
//! use std::path::Path;
//!
//! let report = transform_file(Path::new("movies.csv"), Path::new("cleaned_movies.csv"))?;
//! println!("Kept {} movies", report.rows_written);
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::coerce::{to_date, to_number, to_text};
use super::genres::main_genre;
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::{FINANCIAL_THRESHOLD, UNKNOWN_GENRE};
use crate::error::{CsvError, PipelineError, PipelineResult};
use crate::models::{roi, CleanedMovie, RawMovie, CLEANED_COLUMNS, RAW_COLUMNS};
use crate::parser::{parse_file_auto, ParseResult};

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: String,
    pub delimiter: char,
    pub rows_read: usize,
    pub stats: CleaningStats,
    pub rows_written: usize,
}

/// How many rows each cleaning stage removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningStats {
    /// Rows the reader could not deserialize.
    pub unreadable: usize,
    /// Missing or unparsable revenue, budget, release date or genres.
    pub missing_key_fields: usize,
    /// Revenue or budget not above the threshold.
    pub below_threshold: usize,
    /// Missing title, runtime or vote average.
    pub incomplete: usize,
    /// Genre resolved to `Unknown`.
    pub unknown_genre: usize,
}

/// A raw row after step 1.
#[derive(Debug, Clone, PartialEq)]
struct CoercedMovie {
    title: Option<String>,
    revenue: Option<f64>,
    budget: Option<f64>,
    release_date: Option<NaiveDate>,
    genres: Option<String>,
    runtime: Option<f64>,
    vote_average: Option<f64>,
}

/// A row that passed step 2.
#[derive(Debug, Clone, PartialEq)]
struct FinancialMovie {
    title: Option<String>,
    revenue: f64,
    budget: f64,
    release_date: NaiveDate,
    genres: String,
    runtime: Option<f64>,
    vote_average: Option<f64>,
}

/// Run the whole pipeline from `input` to `output`.
pub fn transform_file(input: &Path, output: &Path) -> PipelineResult<TransformReport> {
    if !input.is_file() {
        return Err(PipelineError::MissingInput(input.to_path_buf()));
    }

    let parsed: ParseResult<RawMovie> = parse_file_auto::<RawMovie, _>(input).map_err(|e| match e {
        CsvError::IoError(io) if io.kind() == ErrorKind::NotFound => {
            PipelineError::MissingInput(input.to_path_buf())
        }
        other => other.into(),
    })?;
    log_info(format!(
        "[1/4] Loaded '{}' ({} rows, encoding {}, delimiter '{}')",
        input.display(),
        parsed.row_count(),
        parsed.encoding,
        format_delimiter(parsed.delimiter)
    ));

    let missing = parsed.missing_columns(&RAW_COLUMNS);
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns(missing));
    }

    let rows_read = parsed.row_count();
    let (movies, mut stats) = clean_records(&parsed.records)?;
    stats.unreadable = parsed.skipped.len();

    write_cleaned(output, &movies)?;
    log_success(format!(
        "[4/4] Wrote '{}' with {} clean rows",
        output.display(),
        movies.len()
    ));

    Ok(TransformReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        rows_read,
        stats,
        rows_written: movies.len(),
    })
}

/// Steps 1 to 5 over already-read rows.
///
/// Fails with [`PipelineError::NoValidRecords`] when nothing survives the
/// financial filter. Rows dropped in step 5 never cause an error.
pub fn clean_records(raw: &[RawMovie]) -> PipelineResult<(Vec<CleanedMovie>, CleaningStats)> {
    let mut stats = CleaningStats::default();

    let coerced: Vec<CoercedMovie> = raw.iter().map(coerce).collect();
    log_info("[2/4] Coerced revenue, budget and release date");

    let mut financial = Vec::new();
    for movie in coerced {
        match keep_financial(movie) {
            Ok(m) => financial.push(m),
            Err(Discard::MissingKeyField) => stats.missing_key_fields += 1,
            Err(_) => stats.below_threshold += 1,
        }
    }

    if financial.is_empty() {
        return Err(PipelineError::NoValidRecords {
            read: raw.len(),
            threshold: FINANCIAL_THRESHOLD,
        });
    }
    log_info(format!(
        "[3/4] {} rows with valid financial data ({} missing key fields, {} at or below {})",
        financial.len(),
        stats.missing_key_fields,
        stats.below_threshold,
        FINANCIAL_THRESHOLD
    ));

    let mut cleaned = Vec::with_capacity(financial.len());
    for movie in financial {
        match project(movie) {
            Ok(m) => cleaned.push(m),
            Err(Discard::UnknownGenre) => stats.unknown_genre += 1,
            Err(_) => stats.incomplete += 1,
        }
    }

    if stats.incomplete > 0 || stats.unknown_genre > 0 {
        log_warning(format!(
            "Dropped {} incomplete rows and {} rows without a usable genre",
            stats.incomplete, stats.unknown_genre
        ));
    }
    log_info_indent(format!("{} rows remain", cleaned.len()), 1);

    Ok((cleaned, stats))
}

/// Why a row left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Discard {
    MissingKeyField,
    BelowThreshold,
    Incomplete,
    UnknownGenre,
}

fn coerce(raw: &RawMovie) -> CoercedMovie {
    CoercedMovie {
        title: to_text(raw.title.as_deref()),
        revenue: to_number(raw.revenue.as_deref()),
        budget: to_number(raw.budget.as_deref()),
        release_date: to_date(raw.release_date.as_deref()),
        genres: to_text(raw.genres.as_deref()),
        runtime: to_number(raw.runtime.as_deref()),
        vote_average: to_number(raw.vote_average.as_deref()),
    }
}

fn keep_financial(movie: CoercedMovie) -> Result<FinancialMovie, Discard> {
    let (Some(revenue), Some(budget), Some(release_date), Some(genres)) =
        (movie.revenue, movie.budget, movie.release_date, movie.genres)
    else {
        return Err(Discard::MissingKeyField);
    };

    if revenue <= FINANCIAL_THRESHOLD || budget <= FINANCIAL_THRESHOLD {
        return Err(Discard::BelowThreshold);
    }

    Ok(FinancialMovie {
        title: movie.title,
        revenue,
        budget,
        release_date,
        genres,
        runtime: movie.runtime,
        vote_average: movie.vote_average,
    })
}

fn project(movie: FinancialMovie) -> Result<CleanedMovie, Discard> {
    let main_genre = main_genre(Some(movie.genres.as_str()));

    let (Some(title), Some(runtime), Some(vote_average)) =
        (movie.title, movie.runtime, movie.vote_average)
    else {
        return Err(Discard::Incomplete);
    };

    if main_genre == UNKNOWN_GENRE {
        return Err(Discard::UnknownGenre);
    }

    Ok(CleanedMovie {
        title,
        revenue: movie.revenue,
        budget: movie.budget,
        roi: roi(movie.revenue, movie.budget),
        main_genre,
        release_year: movie.release_date.year(),
        runtime,
        vote_average,
    })
}

/// Write the cleaned rows, header included, replacing `path` atomically.
pub fn write_cleaned(path: &Path, movies: &[CleanedMovie]) -> PipelineResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(CLEANED_COLUMNS)?;
        for movie in movies {
            writer.serialize(movie)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
