//! # journal-builder
//!
//! Turn a directory of literate F# scripts (`.fsx`) and Markdown documents
//! (`.md`) into rendered HTML or LaTeX pages.
//!
//! Each source is parsed into a paragraph/span tree, its code snippets are
//! handed to an [`Evaluator`], and the result is placed into a page template
//! (`styles/template.html` or `styles/template.tex`). Only documents whose
//! source is newer than their output are regenerated, and the run finishes
//! by choosing (or writing) an entry page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! journal dir
//!  │
//!  ├─ 1. Sync      create output/, copy template assets into styles/
//!  ├─ 2. Discover  flat *.fsx / *.md, minus build.*, whitelist, staleness
//!  ├─ 3. Parse     script or Markdown front end + evaluator
//!  ├─ 4. Walk      title extraction; for LaTeX, image download + title removal
//!  ├─ 5. Render    body formatting + template substitution, atomic write
//!  └─ 6. Landing   single page, default/index source, or synthesised index.html
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use journal_builder::{build, ProcessingContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ProcessingContext::builder("journals", "output")
//!         .template_location("styles")
//!         .build()?;
//!     let output = build(&ctx).await?;
//!     eprintln!(
//!         "{} generated, {} up to date; open {}",
//!         output.stats.generated, output.stats.skipped, output.default_file
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `journal` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! journal-builder = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod build;
pub mod config;
pub mod error;
pub mod eval;
pub mod format;
pub mod model;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use build::{build, build_sync, process_directory, process_document};
pub use config::{ErrorPolicy, OutputKind, ProcessingContext, ProcessingContextBuilder};
pub use error::{DocumentError, JournalError};
pub use eval::{EchoEvaluator, Evaluation, EvaluationOptions, Evaluator, Snippet};
pub use model::{Document, LinkTable, Paragraph, SourceKind, Span};
pub use output::{BuildOutput, BuildStats, DocumentOutcome, GeneratedEntry};
pub use progress::{BuildProgressCallback, NoopProgressCallback, ProgressCallback};
