//! CSV corpus loading shared by both indexers.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Text columns in order of preference.
const TEXT_COLUMNS: &[&str] = &["texto", "text"];

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("{0} has no 'text' column")]
    MissingTextColumn(PathBuf),

    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One data row of a corpus file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRow {
    /// 0-based position among the data rows
    pub index: usize,
    pub text: String,
}

/// Read every data row of a CSV file.
///
/// The text comes from the first non-empty preferred column (`texto`, then
/// `text`); rows with neither yield an empty string.
pub fn read_rows(path: &Path) -> Result<Vec<CorpusRow>, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::NotFound(path.to_path_buf()));
    }

    let csv_err = |source| CorpusError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let columns: Vec<usize> = TEXT_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h.trim() == *name))
        .collect();

    if columns.is_empty() {
        return Err(CorpusError::MissingTextColumn(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let text = columns
            .iter()
            .filter_map(|&col| record.get(col))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
            .to_string();
        rows.push(CorpusRow { index, text });
    }

    Ok(rows)
}

/// File name used as document id prefix and Solr source label.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Cut a string to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Trim, drop empty rows and cut each text to `max_chars`.
pub fn clean_texts(rows: Vec<CorpusRow>, max_chars: usize) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| {
            let trimmed = row.text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(truncate_chars(trimmed, max_chars).to_string())
            }
        })
        .collect()
}
