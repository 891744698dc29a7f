use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use graph::{HistoryEntry, OutcomeSource, RawOutcome};

/// Raw result artifact written by the dataset harness for one commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    #[serde(rename = "isSourceBuildSuccess")]
    pub is_source_build_success: bool,
    #[serde(rename = "isTestBuildSuccess")]
    pub is_test_build_success: bool,
    #[serde(rename = "isTestExecutionSuccess")]
    pub is_test_execution_success: bool,
}

/// A bug's dataset directory: the commit history file plus one artifact
/// directory per evaluated commit
#[derive(Debug, Clone)]
pub struct Dataset {
    bug_path: PathBuf,
}

impl Dataset {
    pub fn new<P: AsRef<Path>>(bug_path: P) -> Self {
        Self {
            bug_path: bug_path.as_ref().to_path_buf(),
        }
    }

    /// Parse `commit_history.csv`: a header row naming at least the `id`
    /// and `hash` columns, then one row per commit in authored order (the
    /// first row is the fix commit).
    pub fn commit_history(&self) -> Result<Vec<HistoryEntry>> {
        let path = self.bug_path.join("commit_history.csv");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut lines = text.lines();
        let header = lines.next().context("commit_history.csv is empty")?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let id_col = columns
            .iter()
            .position(|col| *col == "id")
            .context("commit_history.csv has no id column")?;
        let hash_col = columns
            .iter()
            .position(|col| *col == "hash")
            .context("commit_history.csv has no hash column")?;

        let mut entries = Vec::new();
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let id = fields
                .get(id_col)
                .with_context(|| format!("row {} is missing the id column", line_no + 2))?
                .parse::<u32>()
                .with_context(|| format!("row {} has a malformed id", line_no + 2))?;
            let hash = fields
                .get(hash_col)
                .with_context(|| format!("row {} is missing the hash column", line_no + 2))?;
            entries.push(HistoryEntry {
                id,
                hash: hash.to_string(),
            });
        }

        Ok(entries)
    }

    /// Directory holding one commit's evaluation artifacts
    pub fn commit_dir(&self, id: u32, hash: &str) -> PathBuf {
        self.bug_path.join("commits").join(format!("{id}-{hash}"))
    }

    /// Outcome source over this dataset's `result.json` artifacts
    pub fn results(&self) -> DatasetResults {
        DatasetResults {
            dataset: self.clone(),
        }
    }
}

/// Reads per-commit outcomes from the dataset directory.
///
/// A commit without `result.json` has no recorded outcome and is skipped by
/// the builder; a present but unreadable result aborts construction.
pub struct DatasetResults {
    dataset: Dataset,
}

impl OutcomeSource for DatasetResults {
    fn outcome(&self, id: u32, hash: &str) -> Result<Option<RawOutcome>> {
        let dir = self.dataset.commit_dir(id, hash);
        let result_path = dir.join("result.json");
        if !result_path.is_file() {
            debug!(path = %result_path.display(), "no result artifact");
            return Ok(None);
        }

        let text = fs::read_to_string(&result_path)
            .with_context(|| format!("Failed to read {}", result_path.display()))?;
        let raw: RawResult = serde_json::from_str(&text)
            .with_context(|| format!("Malformed result {}", result_path.display()))?;

        Ok(Some(RawOutcome {
            source_build: raw.is_source_build_success,
            test_build: raw.is_test_build_success,
            test_exec: raw.is_test_execution_success,
            has_report: dir.join("test-report.xml").is_file(),
        }))
    }
}
