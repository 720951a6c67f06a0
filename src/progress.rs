//! Progress-callback trait for per-document build events.
//!
//! Inject an [`Arc<dyn BuildProgressCallback>`] via
//! [`crate::config::ProcessingContextBuilder::progress_callback`] to receive
//! events as the pipeline walks the source directory.
//!
//! # Example
//!
//! ```rust
//! use journal_builder::{BuildProgressCallback, ProcessingContext};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     generated: AtomicUsize,
//! }
//!
//! impl BuildProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, name: &str, title: &str) {
//!         self.generated.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {title}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { generated: AtomicUsize::new(0) });
//!
//! let ctx = ProcessingContext::builder("journals", "output")
//!     .progress_callback(counter as Arc<dyn BuildProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each source document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BuildProgressCallback: Send + Sync {
    /// Called once, after discovery, with the number of eligible documents.
    fn on_build_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document is found to be up to date.
    fn on_document_skipped(&self, name: &str) {
        let _ = name;
    }

    /// Called just before a stale document is parsed and evaluated.
    fn on_document_start(&self, name: &str) {
        let _ = name;
    }

    /// Called when a document has been rendered.
    fn on_document_complete(&self, name: &str, title: &str) {
        let _ = (name, title);
    }

    /// Called when a document failed to parse or evaluate.
    fn on_document_error(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called once after the landing page has been chosen.
    ///
    /// # Arguments
    /// * `total_documents` — eligible documents in this run
    /// * `generated`       — documents regenerated in this run
    fn on_build_complete(&self, total_documents: usize, generated: usize) {
        let _ = (total_documents, generated);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BuildProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingContext`].
pub type ProgressCallback = Arc<dyn BuildProgressCallback>;
