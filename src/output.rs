//! Result types returned by a build.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One regenerated page, as listed on a synthesised landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEntry {
    /// Output file name relative to the output directory, e.g. `Report.html`.
    pub file_name: String,
    /// Text of the first level-1 heading, or `"Untitled"`.
    pub title: String,
}

/// What happened to a single eligible source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Generated {
        name: String,
        /// File actually written (`.html` or `.tex`).
        output: PathBuf,
        title: String,
    },
    /// Output was newer than the source.
    Skipped { name: String },
    /// Parsing or evaluation failed and the run carried on.
    Failed { name: String, error: DocumentError },
}

impl DocumentOutcome {
    /// Source file name this outcome refers to.
    pub fn name(&self) -> &str {
        match self {
            DocumentOutcome::Generated { name, .. }
            | DocumentOutcome::Skipped { name }
            | DocumentOutcome::Failed { name, .. } => name,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Source files found in the root (after the suffix whitelist).
    pub discovered: usize,
    /// Documents that passed the exact-name whitelist.
    pub eligible: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Template and style files copied into `styles/`.
    pub assets_copied: usize,
    pub total_duration_ms: u64,
}

/// Complete result of [`crate::build::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    /// Pages regenerated in this run, in processing order.
    pub entries: Vec<GeneratedEntry>,
    /// One outcome per eligible document, in processing order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Entry page, relative to the output directory.
    pub default_file: String,
    pub stats: BuildStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serialises_with_status_tag() {
        let outcome = DocumentOutcome::Skipped {
            name: "Report.fsx".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["name"], "Report.fsx");
    }

    #[test]
    fn failed_outcome_carries_error() {
        let outcome = DocumentOutcome::Failed {
            name: "Broken.fsx".into(),
            error: DocumentError::Parse {
                path: PathBuf::from("Broken.fsx"),
                detail: "unterminated comment".into(),
            },
        };
        assert_eq!(outcome.name(), "Broken.fsx");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: DocumentOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
