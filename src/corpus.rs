//! Corpus loading and precomputed statistics
//!
//! Reads the beach comment CSV once per process. Records are immutable after
//! load and shared across sessions via `Arc<Corpus>`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

/// One row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    /// Row index in the source file (0-based, header excluded)
    pub id: usize,
    /// Free-text comment body
    pub text: String,
    /// Beach the comment refers to, when the column is present
    pub beach: Option<String>,
    /// Visitor rating, when the column is present and parseable
    pub rating: Option<f32>,
}

/// In-memory comment table.
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<CommentRecord>,
}

impl Corpus {
    /// Load the CSV at `path` using the column names from `config`.
    ///
    /// A missing file, a missing text column or a malformed row is fatal:
    /// no question can be answered without the corpus.
    pub fn load(path: &Path, config: &Config) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            Error::DataLoad(format!("cannot open {}: {}", path.display(), e))
        })?;

        let headers = reader
            .headers()
            .map_err(|e| Error::DataLoad(format!("cannot read CSV header: {}", e)))?
            .clone();

        let text_idx = column_index(&headers, &config.text_column).ok_or_else(|| {
            Error::DataLoad(format!(
                "text column '{}' not found in {} (columns: {})",
                config.text_column,
                path.display(),
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;
        let beach_idx = column_index(&headers, &config.beach_column);
        let rating_idx = column_index(&headers, &config.rating_column);

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let text = record.get(text_idx).unwrap_or("").trim().to_string();
            if text.is_empty() {
                debug!("Skipping row {} with empty comment text", row);
                continue;
            }

            let beach = beach_idx
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
            let rating = rating_idx
                .and_then(|i| record.get(i))
                .and_then(|s| s.trim().parse::<f32>().ok());

            records.push(CommentRecord {
                id: row,
                text,
                beach,
                rating,
            });
        }

        info!("Loaded {} comments from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Build a corpus directly from records (used by tests).
    pub fn from_records(records: Vec<CommentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Per-beach aggregate shown in the statistics view.
#[derive(Debug, Clone, PartialEq)]
pub struct BeachStats {
    pub beach: String,
    pub comments: usize,
    pub mean_rating: Option<f32>,
}

/// Read-only statistics precomputed once at load time.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    pub total_comments: usize,
    pub beaches: Vec<BeachStats>,
}

impl CorpusStats {
    pub fn compute(corpus: &Corpus) -> Self {
        let mut grouped: BTreeMap<&str, (usize, f32, usize)> = BTreeMap::new();
        for record in corpus.records() {
            if let Some(beach) = record.beach.as_deref() {
                let entry = grouped.entry(beach).or_insert((0, 0.0, 0));
                entry.0 += 1;
                if let Some(rating) = record.rating {
                    entry.1 += rating;
                    entry.2 += 1;
                }
            }
        }

        let mut beaches: Vec<BeachStats> = grouped
            .into_iter()
            .map(|(beach, (comments, rating_sum, rated))| BeachStats {
                beach: beach.to_string(),
                comments,
                mean_rating: (rated > 0).then(|| rating_sum / rated as f32),
            })
            .collect();
        // Most commented first; BTreeMap already fixed the tie-break by name
        beaches.sort_by(|a, b| b.comments.cmp(&a.comments));

        Self {
            total_comments: corpus.len(),
            beaches,
        }
    }

    /// Plain-text table for the statistics view.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total comments: {}", self.total_comments);
        let _ = writeln!(out, "{:<30} {:>10} {:>12}", "Beach", "Comments", "Mean rating");
        for stats in &self.beaches {
            let rating = stats
                .mean_rating
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "{:<30} {:>10} {:>12}", stats.beach, stats.comments, rating);
        }
        out
    }
}
