//! Configuration types for a journal build.
//!
//! All run behaviour is controlled through [`ProcessingContext`], built via
//! [`ProcessingContextBuilder`]. The context is created once per run and never
//! mutated afterwards; the `with_*` methods return a modified copy.

use crate::error::JournalError;
use crate::eval::{EchoEvaluator, Evaluator};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for one journal build.
///
/// # Example
/// ```rust
/// use journal_builder::{OutputKind, ProcessingContext};
///
/// let ctx = ProcessingContext::builder("journals", "output")
///     .output_kind(OutputKind::Latex)
///     .overwrite(true)
///     .build()
///     .unwrap();
/// assert_eq!(ctx.float_format, "G4");
/// ```
#[derive(Clone)]
pub struct ProcessingContext {
    /// Directory holding the source `.fsx` and `.md` files (scanned flat).
    pub root: PathBuf,

    /// Directory receiving `<name>.html` / `<name>.tex`, `styles/` and
    /// `savedimages/`.
    pub output: PathBuf,

    /// HTML or LaTeX. Default: HTML.
    pub output_kind: OutputKind,

    /// Format string handed to the evaluator for floating-point values. Default: `"G4"`.
    pub float_format: String,

    /// Directory mirrored into `<output>/styles` before rendering.
    ///
    /// Files that already exist in the output are left alone, so local edits
    /// to a copied template survive later runs.
    pub template_location: Option<PathBuf>,

    /// Restrict the run to these file names. `None` processes everything.
    pub whitelist: Option<BTreeSet<String>>,

    /// What to do when a document fails to parse or evaluate. Default: ignore.
    pub error_policy: ErrorPolicy,

    /// Regenerate every document regardless of timestamps. Default: false.
    pub overwrite: bool,

    /// Heading of the synthesised landing page. Default: `"FsLab Journals"`.
    pub landing_title: String,

    /// Timeout for each remote image download, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Evaluation engine override. `None` uses [`EchoEvaluator`].
    pub evaluator: Option<Arc<dyn Evaluator>>,

    /// Optional observer for per-document events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ProcessingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingContext")
            .field("root", &self.root)
            .field("output", &self.output)
            .field("output_kind", &self.output_kind)
            .field("float_format", &self.float_format)
            .field("template_location", &self.template_location)
            .field("whitelist", &self.whitelist)
            .field("error_policy", &self.error_policy)
            .field("overwrite", &self.overwrite)
            .field("landing_title", &self.landing_title)
            .field("evaluator", &self.evaluator.as_ref().map(|_| "<dyn Evaluator>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BuildProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessingContext {
    /// Create a new builder with the two required directories.
    pub fn builder(
        root: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> ProcessingContextBuilder {
        ProcessingContextBuilder {
            context: Self {
                root: root.into(),
                output: output.into(),
                output_kind: OutputKind::default(),
                float_format: "G4".to_string(),
                template_location: None,
                whitelist: None,
                error_policy: ErrorPolicy::default(),
                overwrite: false,
                landing_title: "FsLab Journals".to_string(),
                download_timeout_secs: 120,
                evaluator: None,
                progress_callback: None,
            },
        }
    }

    /// The evaluator to use for this run.
    pub fn evaluator(&self) -> Arc<dyn Evaluator> {
        match self.evaluator {
            Some(ref e) => Arc::clone(e),
            None => Arc::new(EchoEvaluator),
        }
    }

    /// Directory holding `template.html` / `template.tex`.
    pub fn styles_dir(&self) -> PathBuf {
        self.output.join("styles")
    }

    /// `true` when `file_name` passes the exact-name whitelist check.
    pub fn is_whitelisted(&self, file_name: &str) -> bool {
        match self.whitelist {
            Some(ref names) => names.contains(file_name),
            None => true,
        }
    }

    /// `true` when `path` ends with one of the whitelist entries.
    pub fn path_matches_whitelist(&self, path: &Path) -> bool {
        match self.whitelist {
            Some(ref names) => {
                let path = path.to_string_lossy();
                names.iter().any(|n| path.ends_with(n.as_str()))
            }
            None => true,
        }
    }

    /// Copy of this context rendering to a different output kind.
    pub fn with_output_kind(&self, kind: OutputKind) -> Self {
        Self {
            output_kind: kind,
            ..self.clone()
        }
    }

    /// Copy of this context restricted to the given file names.
    pub fn with_whitelist<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: Some(names.into_iter().map(Into::into).collect()),
            ..self.clone()
        }
    }

    /// Copy of this context with the overwrite flag set.
    pub fn with_overwrite(&self, overwrite: bool) -> Self {
        Self {
            overwrite,
            ..self.clone()
        }
    }
}

/// Builder for [`ProcessingContext`].
#[derive(Debug)]
pub struct ProcessingContextBuilder {
    context: ProcessingContext,
}

impl ProcessingContextBuilder {
    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.context.output_kind = kind;
        self
    }

    pub fn float_format(mut self, format: impl Into<String>) -> Self {
        self.context.float_format = format.into();
        self
    }

    pub fn template_location(mut self, dir: impl Into<PathBuf>) -> Self {
        self.context.template_location = Some(dir.into());
        self
    }

    pub fn whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.whitelist = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.context.error_policy = policy;
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.context.overwrite = v;
        self
    }

    pub fn landing_title(mut self, title: impl Into<String>) -> Self {
        self.context.landing_title = title.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.context.download_timeout_secs = secs;
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.context.evaluator = Some(evaluator);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.context.progress_callback = Some(cb);
        self
    }

    /// Build the context, validating constraints.
    pub fn build(self) -> Result<ProcessingContext, JournalError> {
        let c = &self.context;
        if c.float_format.trim().is_empty() {
            return Err(JournalError::InvalidConfig(
                "Float format must not be empty".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(JournalError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.root.as_os_str().is_empty() || c.output.as_os_str().is_empty() {
            return Err(JournalError::InvalidConfig(
                "Source and output directories are required".into(),
            ));
        }
        Ok(self.context)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Rendered page format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputKind {
    /// `<name>.html` rendered through `styles/template.html`. (default)
    #[default]
    Html,
    /// `<name>.tex` rendered through `styles/template.tex`; remote images
    /// are downloaded into `savedimages/`.
    Latex,
}

impl OutputKind {
    /// File extension written for this kind, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Html => "html",
            OutputKind::Latex => "tex",
        }
    }
}

/// How a failing document affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Record the failure and carry on with the next document. (default)
    #[default]
    Ignore,
    /// Stop the run with [`JournalError::DocumentFailed`].
    Abort,
}
