//! Body formatters.
//!
//! The renderer decides between HTML and LaTeX from the processing context and
//! passes the choice down explicitly; nothing here consults global state.

pub mod html;
pub mod latex;

use crate::config::OutputKind;
use crate::model::{LinkTable, Paragraph};

/// Format a paragraph tree as the body of an output page.
///
/// Indirect links and images are resolved through `links`; those whose key is
/// not defined are written as their original source text.
pub fn render_body(kind: OutputKind, paragraphs: &[Paragraph], links: &LinkTable) -> String {
    match kind {
        OutputKind::Html => html::write_paragraphs(paragraphs, links),
        OutputKind::Latex => latex::write_paragraphs(paragraphs, links),
    }
}

/// Escape plain text for the output format.
pub fn escape_text(kind: OutputKind, text: &str) -> String {
    match kind {
        OutputKind::Html => html::escape(text),
        OutputKind::Latex => latex::escape(text),
    }
}
