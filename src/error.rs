//! Error types for the journal-builder library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`JournalError`] — **Fatal**: the run cannot proceed at all (missing
//!   source root, missing template, no documents, unwritable output).
//!   Returned as `Err(JournalError)` from the top-level `build*` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed to parse or
//!   evaluate but every other document is fine. Stored inside
//!   [`crate::output::DocumentOutcome::Failed`] unless the context's
//!   [`crate::config::ErrorPolicy`] asks for the run to abort.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the journal-builder library.
#[derive(Debug, Error)]
pub enum JournalError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The configured source root does not exist or is not a directory.
    #[error("Source directory not found: '{path}'\nCheck the path exists and is a directory.")]
    SourceRootNotFound { path: PathBuf },

    /// Discovery found nothing to render.
    #[error("No literate scripts or Markdown files found in '{root}'")]
    NoDocuments { root: PathBuf },

    // ── Template errors ───────────────────────────────────────────────────
    /// `styles/template.html` or `styles/template.tex` is missing.
    #[error("Template not found: '{path}'\nPass --templates <DIR> to copy the default styles.")]
    TemplateNotFound { path: PathBuf },

    /// The template exists but could not be read as UTF-8 text.
    #[error("Failed to read template '{path}': {source}")]
    TemplateReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Image errors ──────────────────────────────────────────────────────
    /// A remote image could not be fetched while preparing LaTeX output.
    #[error("Failed to download image '{url}' for '{document}': {reason}")]
    ImageDownloadFailed {
        document: String,
        url: String,
        reason: String,
    },

    /// An image reference started with `http` but is not a usable URL.
    #[error("Invalid image URL '{url}': {reason}")]
    InvalidImageUrl { url: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a rendered page.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create an output directory.
    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mirroring the template assets failed.
    #[error("Failed to copy '{from}' to '{to}': {reason}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// A document failed and the context asked to abort on failures.
    #[error("Document '{name}' failed: {source}")]
    DocumentFailed {
        name: String,
        #[source]
        source: DocumentError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single source document.
///
/// Recorded in [`crate::output::DocumentOutcome::Failed`]; no output file is
/// written and no landing-page entry is produced for the document.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The source file could not be read.
    #[error("{path}: read failed: {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The evaluator rejected a code snippet.
    #[error("{path}: evaluation of snippet {snippet} failed: {message}")]
    Evaluation {
        path: PathBuf,
        snippet: usize,
        message: String,
    },

    /// The literate source is malformed (e.g. unterminated comment block).
    #[error("{path}: {detail}")]
    Parse { path: PathBuf, detail: String },
}
