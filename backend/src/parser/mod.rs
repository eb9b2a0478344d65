//! Delimited file reader with encoding and delimiter auto-detection.
//!
//! Rows are deserialized into any `serde` type keyed by header name, so
//! the same reader serves the raw dataset ([`crate::models::RawMovie`])
//! and the cleaned one ([`crate::models::CleanedMovie`]). Rows that fail to
//! deserialize are reported in [`ParseResult::skipped`] instead of failing
//! the whole file.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{CsvError, CsvResult};

/// A row that could not be deserialized.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult<T> {
    /// Deserialized rows, in file order
    pub records: Vec<T>,
    /// Rows that did not deserialize
    pub skipped: Vec<SkippedRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

impl<T> ParseResult<T> {
    /// Total data rows seen, kept or not.
    pub fn row_count(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Names from `required` that are absent from the header.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "latin-1" | "latin1" => decode_with(encoding_rs::WINDOWS_1252, bytes, encoding),
        "windows-1252" | "cp1252" => decode_with(encoding_rs::WINDOWS_1252, bytes, encoding),
        _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_with(
    codec: &'static encoding_rs::Encoding,
    bytes: &[u8],
    name: &str,
) -> CsvResult<String> {
    let (decoded, _, had_errors) = codec.decode(bytes);
    if had_errors {
        return Err(CsvError::EncodingError(name.to_string()));
    }
    Ok(decoded.into_owned())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse a file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<T, P>(path: P) -> CsvResult<ParseResult<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto<T: DeserializeOwned>(bytes: &[u8]) -> CsvResult<ParseResult<T>> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_str(&content, delimiter, encoding)
}

/// Parse decoded content with an explicit delimiter.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    delimiter: char,
    encoding: String,
) -> CsvResult<ParseResult<T>> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header_record = reader.headers()?.clone();
    let headers: Vec<String> = header_record.iter().map(String::from).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut record = csv::StringRecord::new();

    while reader.read_record(&mut record)? {
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match record.deserialize::<T>(Some(&header_record)) {
            Ok(row) => records.push(row),
            Err(e) => skipped.push(SkippedRow {
                line,
                reason: e.to_string(),
            }),
        }
    }

    Ok(ParseResult {
        records,
        skipped,
        encoding,
        delimiter,
        headers,
    })
}
