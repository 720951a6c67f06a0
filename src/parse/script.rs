//! Literate-script front end.
//!
//! A script is code interleaved with Markdown comment blocks:
//!
//! ```text
//! (**
//! # Report Title
//! Some narrative with a [link][ref].
//! *)
//! let answer = 42
//!
//! (*** hide ***)
//! let setup = ()
//! ```
//!
//! `(** … *)` holds Markdown, `(*** command ***)` holds a directive for the
//! next code chunk (only `hide` is understood) and everything else is code.

use crate::error::DocumentError;
use crate::eval::{EvaluationOptions, Evaluator, Snippet};
use crate::model::{Document, LinkTable, SourceKind};
use crate::parse::markdown::parse_markdown;
use std::path::Path;
use tracing::debug;

/// One piece of a literate script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Markdown(String),
    Code { code: String, hidden: bool },
}

/// Split script text into Markdown and code chunks.
///
/// Star-only comments such as `(**)` or `(*****)` stay in the code.
pub fn split_chunks(text: &str, path: &Path) -> Result<Vec<Chunk>, DocumentError> {
    let text = text.replace("\r\n", "\n");
    let mut chunks = Vec::new();
    let mut hide_next = false;
    // `pending` is where unclaimed code starts, `cursor` where the next search starts.
    let mut pending = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find("(**") {
        let open = cursor + found;
        let after = &text[open..];
        let stars = after[1..].bytes().take_while(|&b| b == b'*').count();

        if after[1 + stars..].starts_with(')') {
            cursor = open + stars + 2;
            continue;
        }

        push_code(&mut chunks, &text[pending..open], &mut hide_next);

        if stars >= 3 {
            let close = after[4..]
                .find("***)")
                .map(|i| i + 4)
                .ok_or_else(|| DocumentError::Parse {
                    path: path.to_path_buf(),
                    detail: "unterminated (*** command".into(),
                })?;
            let command = after[4..close].trim();
            if command.eq_ignore_ascii_case("hide") {
                hide_next = true;
            } else {
                debug!("{}: ignoring script command '{}'", path.display(), command);
            }
            pending = open + close + 4;
        } else {
            let close = comment_end(&after[3..]).ok_or_else(|| DocumentError::Parse {
                path: path.to_path_buf(),
                detail: "unterminated (** comment block".into(),
            })?;
            let body = &after[3..3 + close];
            if !body.trim().is_empty() {
                chunks.push(Chunk::Markdown(dedent(body)));
            }
            pending = open + 3 + close + 2;
        }
        cursor = pending;
    }
    push_code(&mut chunks, &text[pending..], &mut hide_next);
    Ok(chunks)
}

/// Offset of the `*)` closing a comment already opened before `text`.
/// Nested `(* … *)` pairs are skipped over.
fn comment_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'(', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

fn push_code(chunks: &mut Vec<Chunk>, code: &str, hide_next: &mut bool) {
    if code.trim().is_empty() {
        return;
    }
    let code = code
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    chunks.push(Chunk::Code {
        code: code.trim_end().to_string(),
        hidden: std::mem::take(hide_next),
    });
}

/// Strip the indentation shared by every non-blank line.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Parse a literate script, evaluating every code chunk.
pub fn parse_script_str(
    text: &str,
    path: &Path,
    evaluator: &dyn Evaluator,
    options: &EvaluationOptions,
) -> Result<Document, DocumentError> {
    let mut paragraphs = Vec::new();
    let mut links = LinkTable::new();
    let mut tooltips = String::new();
    let mut index = 0;

    for chunk in split_chunks(text, path)? {
        match chunk {
            Chunk::Markdown(md) => {
                let (parsed, defs) = parse_markdown(&md);
                paragraphs.extend(parsed);
                links.extend(defs);
            }
            Chunk::Code { code, hidden } => {
                let snippet = Snippet {
                    source: path.to_path_buf(),
                    index,
                    code,
                    language: None,
                    hidden,
                };
                index += 1;
                let evaluation = evaluator.evaluate(&snippet, options).map_err(|message| {
                    DocumentError::Evaluation {
                        path: path.to_path_buf(),
                        snippet: snippet.index,
                        message,
                    }
                })?;
                paragraphs.extend(evaluation.paragraphs);
                tooltips.push_str(&evaluation.tooltips);
            }
        }
    }
    debug!("{}: {} snippets evaluated", path.display(), index);

    Ok(Document {
        paragraphs,
        links,
        tooltips,
        source_kind: SourceKind::Script,
        source_path: path.to_path_buf(),
    })
}
