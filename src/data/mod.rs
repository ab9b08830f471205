//! Episode records and dataset construction.

mod dataset;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::{cleanse_summary, cleanse_title};
use crate::tokenizer::TokenizerError;

pub use dataset::{build_datasets, DatasetSplit, SummaryDataset};

/// Data-layer errors
#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("no usable records remain after preprocessing")]
    EmptyDataset,

    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// One scraped episode entry.
///
/// Summaries are optional in the wild; records without one are dropped
/// during dataset construction rather than rejected at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub episode_title: String,
    #[serde(default)]
    pub episode_summary: Option<String>,
    #[serde(default)]
    pub tv_show_title: Option<String>,
}

impl EpisodeRecord {
    /// Normalize the free-text fields in place: bracketed asides, run-on
    /// whitespace, stray quoting, and trailing sentence fragments.
    pub fn cleanse(&mut self) {
        self.episode_title = cleanse_title(&self.episode_title);
        if let Some(summary) = &self.episode_summary {
            self.episode_summary = Some(cleanse_summary(summary));
        }
        if let Some(title) = &self.tv_show_title {
            self.tv_show_title = Some(cleanse_title(title));
        }
    }
}

/// Load episode records from a JSON array file.
pub fn load_records(path: &Path) -> Result<Vec<EpisodeRecord>> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|source| DataError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Write episode records as pretty-printed JSON.
pub fn save_records(path: &Path, records: &[EpisodeRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).map_err(|source| DataError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parses_with_missing_fields() {
        let record: EpisodeRecord = serde_json::from_str(r#"{"episode_title": "Pilot"}"#).unwrap();
        assert_eq!(record.episode_title, "Pilot");
        assert!(record.episode_summary.is_none());
        assert!(record.tv_show_title.is_none());
    }

    #[test]
    fn test_cleanse_normalizes_all_text_fields() {
        let mut record = EpisodeRecord {
            source_url: "http://example.com/ep1".to_string(),
            episode_title: "\"The  Visitor\"".to_string(),
            episode_summary: Some("The crew arrives (again).  They leave".to_string()),
            tv_show_title: Some("Deep  Space".to_string()),
        };
        record.cleanse();
        assert_eq!(record.episode_title, "The Visitor");
        assert_eq!(record.episode_summary.as_deref(), Some("The crew arrives."));
        assert_eq!(record.tv_show_title.as_deref(), Some("Deep Space"));
    }

    #[test]
    fn test_load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.json");

        let records = vec![EpisodeRecord {
            source_url: "http://example.com/ep1".to_string(),
            episode_title: "Pilot".to_string(),
            episode_summary: Some("The crew arrives.".to_string()),
            tv_show_title: None,
        }];
        save_records(&path, &records).unwrap();

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].episode_title, "Pilot");
        assert_eq!(loaded[0].episode_summary.as_deref(), Some("The crew arrives."));
    }

    #[test]
    fn test_load_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
