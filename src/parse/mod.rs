//! Front ends turning a source file into a [`Document`].
//!
//! Two entry points, one per source kind, both wired to the same
//! [`Evaluator`]:
//!
//! 1. [`parse_script_file`]   — literate scripts (`.fsx`)
//! 2. [`parse_markdown_file`] — Markdown documents (`.md`)

pub mod markdown;
pub mod script;

use crate::error::DocumentError;
use crate::eval::{EvaluationOptions, Evaluator};
use crate::model::{Document, SourceKind};
use std::path::Path;

pub use markdown::{parse_markdown, parse_markdown_str};
pub use script::{parse_script_str, split_chunks, Chunk};

/// Read and parse a literate script.
pub async fn parse_script_file(
    path: &Path,
    evaluator: &dyn Evaluator,
    options: &EvaluationOptions,
) -> Result<Document, DocumentError> {
    let text = read_source(path).await?;
    parse_script_str(&text, path, evaluator, options)
}

/// Read and parse a Markdown document.
pub async fn parse_markdown_file(
    path: &Path,
    evaluator: &dyn Evaluator,
    options: &EvaluationOptions,
) -> Result<Document, DocumentError> {
    let text = read_source(path).await?;
    parse_markdown_str(&text, path, evaluator, options)
}

/// Dispatch on the source kind.
pub async fn parse_file(
    kind: SourceKind,
    path: &Path,
    evaluator: &dyn Evaluator,
    options: &EvaluationOptions,
) -> Result<Document, DocumentError> {
    match kind {
        SourceKind::Script => parse_script_file(path, evaluator, options).await,
        SourceKind::Markdown => parse_markdown_file(path, evaluator, options).await,
    }
}

async fn read_source(path: &Path) -> Result<String, DocumentError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DocumentError::ReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
}
