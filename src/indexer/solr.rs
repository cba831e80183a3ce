//! Bulk-load the keyword engine from the corpus files.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use super::corpus::{file_label, read_rows, CorpusError};
use crate::config::Config;
use crate::storage::{SolrClient, SolrDocument, SolrError};

/// Outcome of one keyword indexing run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SolrIndexReport {
    pub files_indexed: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub documents_sent: usize,
}

impl SolrIndexReport {
    pub fn summary(&self) -> String {
        format!(
            "Solr indexing: {} files indexed, {} failed, {} skipped, {} documents sent",
            self.files_indexed, self.files_failed, self.files_skipped, self.documents_sent
        )
    }
}

/// Build one document per data row; ids are `{filename}_{rowindex}`.
pub fn build_documents(label: &str, rows: Vec<super::corpus::CorpusRow>) -> Vec<SolrDocument> {
    rows.into_iter()
        .map(|row| SolrDocument {
            id: format!("{}_{}", label, row.index),
            text: row.text,
            source: label.to_string(),
        })
        .collect()
}

/// Index every configured corpus file. A failing file does not stop the others.
pub async fn index_solr(config: &Config) -> Result<SolrIndexReport> {
    let client = SolrClient::new(&config.solr).context("Failed to create Solr client")?;
    let mut report = SolrIndexReport::default();

    for file in &config.corpus.files {
        let path = &file.path;
        info!(path = %path.display(), "Reading dataset");

        let rows = match read_rows(path) {
            Ok(rows) => rows,
            Err(e @ (CorpusError::NotFound(_) | CorpusError::MissingTextColumn(_))) => {
                warn!(error = %e, "Skipping corpus file");
                report.files_skipped += 1;
                continue;
            }
            Err(e) => {
                error!(error = %e, "Failed to read corpus file");
                report.files_failed += 1;
                continue;
            }
        };

        let label = file_label(path);
        let docs = build_documents(&label, rows);
        if docs.is_empty() {
            warn!(path = %path.display(), "No documents found");
            report.files_skipped += 1;
            continue;
        }

        info!(documents = docs.len(), path = %path.display(), "Sending documents to Solr");

        match client.update(&docs).await {
            Ok(()) => {
                info!(path = %path.display(), "Indexing completed");
                report.files_indexed += 1;
                report.documents_sent += docs.len();
            }
            Err(SolrError::Status { status, body, .. }) => {
                error!(path = %path.display(), status = status, body = %body, "Solr rejected documents");
                report.files_failed += 1;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to send documents");
                report.files_failed += 1;
            }
        }
    }

    info!("{}", report.summary());
    Ok(report)
}
