//! Document model: the paragraph/span tree every front end produces.
//!
//! A [`Paragraph`] is either leaf content (code, raw markup, rules), a
//! span-bearing block (headings, plain paragraphs) or a nested block (lists,
//! quotes, tables) that owns further paragraph sequences. Traversals in
//! [`crate::pipeline::walk`] match on the variant and rebuild nested blocks
//! with the same variant, replacing only their children.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Inline content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Span {
    Literal(String),
    InlineCode(String),
    Strong(Vec<Span>),
    Emphasis(Vec<Span>),
    /// `$x$` (inline) or `$$x$$` (display) math, kept as source.
    Math { source: String, display: bool },
    /// Inline raw markup passed through untouched.
    RawInline(String),
    DirectLink {
        body: Vec<Span>,
        url: String,
        title: Option<String>,
    },
    /// A `[body][key]` link resolved later through the [`LinkTable`].
    IndirectLink {
        body: Vec<Span>,
        original: String,
        key: String,
    },
    DirectImage {
        alt: String,
        url: String,
        title: Option<String>,
    },
    /// An `![alt][key]` image resolved later through the [`LinkTable`].
    IndirectImage {
        alt: String,
        original: String,
        key: String,
    },
    HardLineBreak,
}

/// Concatenated literal text of a span sequence (titles, image alt text).
pub fn plain_text(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Literal(s) | Span::InlineCode(s) | Span::RawInline(s) => out.push_str(s),
            Span::Math { source, .. } => out.push_str(source),
            Span::Strong(body)
            | Span::Emphasis(body)
            | Span::DirectLink { body, .. }
            | Span::IndirectLink { body, .. } => out.push_str(&plain_text(body)),
            Span::DirectImage { alt, .. } | Span::IndirectImage { alt, .. } => out.push_str(alt),
            Span::HardLineBreak => out.push(' '),
        }
    }
    out
}

/// Ordered vs bulleted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Unordered,
    Ordered { start: u64 },
}

/// Column alignment in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

/// A table cell is itself a paragraph sequence.
pub type Cell = Vec<Paragraph>;

/// Block content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Paragraph {
    Heading { level: u8, body: Vec<Span> },
    Span(Vec<Span>),
    CodeBlock {
        code: String,
        language: Option<String>,
    },
    /// Block-level raw markup (embedded HTML, evaluator output).
    Raw(String),
    /// Display math block.
    Math(String),
    HorizontalRule,
    List {
        kind: ListKind,
        items: Vec<Vec<Paragraph>>,
    },
    Quoted(Vec<Paragraph>),
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Cell>,
        rows: Vec<Vec<Cell>>,
    },
}

/// Target of a reference-style link or image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefinition {
    pub url: String,
    pub title: Option<String>,
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonical form of a reference key: whitespace runs (including `\r\n`
/// and `\n`) become one space, surrounding space is trimmed and case is
/// folded.
pub fn normalize_link_key(key: &str) -> String {
    RE_WHITESPACE
        .replace_all(key.trim(), " ")
        .to_lowercase()
}

/// Reference-name → target table for indirect links and images.
///
/// Keys are normalised on insert and on lookup, so a key written across a
/// line break resolves to the same definition as its single-line spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTable {
    entries: BTreeMap<String, LinkDefinition>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, url: impl Into<String>, title: Option<String>) {
        self.entries.insert(
            normalize_link_key(key),
            LinkDefinition {
                url: url.into(),
                title,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&LinkDefinition> {
        self.entries.get(&normalize_link_key(key))
    }

    /// Merge another table into this one; later definitions win.
    pub fn extend(&mut self, other: LinkTable) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which front end produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Literate script (`.fsx`): markdown lives in `(** … *)` comments.
    Script,
    /// Plain Markdown (`.md`).
    Markdown,
}

impl SourceKind {
    /// Classify a path by extension (case-insensitive).
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fsx" => Some(SourceKind::Script),
            "md" => Some(SourceKind::Markdown),
            _ => None,
        }
    }
}

/// A parsed and evaluated source file, ready to format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    pub links: LinkTable,
    /// Tooltip markup collected from every evaluated snippet.
    pub tooltips: String,
    pub source_kind: SourceKind,
    pub source_path: PathBuf,
}

impl Document {
    /// A document with no provenance, used for synthesised pages.
    pub fn synthesized(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            links: LinkTable::new(),
            tooltips: String::new(),
            source_kind: SourceKind::Markdown,
            source_path: PathBuf::new(),
        }
    }
}
