//! The evaluation-engine boundary.
//!
//! The library never executes code itself. Front ends split a source file
//! into [`Snippet`]s and hand each one to an [`Evaluator`]; whatever the
//! evaluator returns (output paragraphs, tooltip markup) is spliced into the
//! document. A failing evaluation becomes a
//! [`crate::error::DocumentError::Evaluation`].

use crate::config::OutputKind;
use crate::model::Paragraph;
use std::path::PathBuf;

/// One code chunk extracted from a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// File the snippet came from.
    pub source: PathBuf,
    /// 0-based position among the document's snippets.
    pub index: usize,
    pub code: String,
    /// Fence language for Markdown snippets; `None` for script chunks.
    pub language: Option<String>,
    /// The source asked for the code itself to be hidden.
    pub hidden: bool,
}

/// Formatting settings passed with every evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Output kind of the current run; evaluators format values for it.
    pub output_kind: OutputKind,
    /// Format string for floating-point values, e.g. `"G4"`.
    pub float_format: String,
}

/// What an evaluator produced for a snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Paragraphs replacing the snippet (typically the code block followed by
    /// its formatted result).
    pub paragraphs: Vec<Paragraph>,
    /// Tooltip markup appended to the document's `{tooltips}` slot.
    pub tooltips: String,
}

/// An evaluation engine.
///
/// Implementations must be `Send + Sync` so a single engine can be shared
/// through [`crate::config::ProcessingContext`].
pub trait Evaluator: Send + Sync {
    /// Whether Markdown code fences tagged `language` should be evaluated.
    /// Script chunks are always evaluated.
    fn accepts(&self, language: Option<&str>) -> bool {
        matches!(language, None | Some("fsharp"))
    }

    /// Evaluate one snippet. The error string is reported as-is.
    fn evaluate(&self, snippet: &Snippet, options: &EvaluationOptions)
        -> Result<Evaluation, String>;
}

/// Default engine: shows the code without running it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoEvaluator;

impl Evaluator for EchoEvaluator {
    fn evaluate(
        &self,
        snippet: &Snippet,
        _options: &EvaluationOptions,
    ) -> Result<Evaluation, String> {
        let paragraphs = if snippet.hidden {
            Vec::new()
        } else {
            vec![Paragraph::CodeBlock {
                code: snippet.code.clone(),
                language: Some(snippet.language.clone().unwrap_or_else(|| "fsharp".into())),
            }]
        };
        Ok(Evaluation {
            paragraphs,
            tooltips: String::new(),
        })
    }
}
