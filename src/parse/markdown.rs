//! Markdown front end: `pulldown-cmark` events → paragraph/span tree.
//!
//! The event stream is consumed by a small recursive-descent converter.
//! Block containers (`Start(tag)` … `End(tag)`) become nested
//! [`Paragraph`]s, inline containers become nested [`Span`]s.
//!
//! Reference-style links and images are kept indirect (`IndirectLink`,
//! `IndirectImage`) together with the document's reference definitions, so
//! later passes can rewrite the target without losing the reference form.
//! Full references whose definition is not in the same text (literate
//! scripts define links in a different comment block) are still recognised.

use crate::eval::{EvaluationOptions, Evaluator, Snippet};
use crate::error::DocumentError;
use crate::model::{
    plain_text, Alignment, Cell, Document, LinkTable, ListKind, Paragraph, SourceKind, Span,
};
use pulldown_cmark::{
    BrokenLink, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag,
};
use std::iter::Peekable;
use std::path::Path;

/// Parse Markdown text into paragraphs and its reference-definition table.
pub fn parse_markdown(text: &str) -> (Vec<Paragraph>, LinkTable) {
    let callback = |link: BrokenLink| {
        if link.link_type == LinkType::Reference {
            Some((CowStr::from(link.reference.to_string()), CowStr::from("")))
        } else {
            None
        }
    };
    let mut parser = Parser::new_with_broken_link_callback(text, markdown_options(), Some(callback));
    let events: Vec<Event> = parser.by_ref().collect();

    let mut links = LinkTable::new();
    for (label, def) in parser.reference_definitions().iter() {
        let title = def
            .title
            .as_ref()
            .map(|t| t.to_string())
            .filter(|t| !t.is_empty());
        links.insert(label, def.dest.to_string(), title);
    }

    let mut converter = Converter {
        events: events.into_iter().peekable(),
    };
    (converter.blocks(), links)
}

/// Parse a Markdown document and evaluate its accepted code fences.
pub fn parse_markdown_str(
    text: &str,
    path: &Path,
    evaluator: &dyn Evaluator,
    options: &EvaluationOptions,
) -> Result<Document, DocumentError> {
    let (paragraphs, links) = parse_markdown(text);

    let mut out = Vec::with_capacity(paragraphs.len());
    let mut tooltips = String::new();
    let mut index = 0;
    for paragraph in paragraphs {
        match paragraph {
            Paragraph::CodeBlock { code, language } if evaluator.accepts(language.as_deref()) => {
                let snippet = Snippet {
                    source: path.to_path_buf(),
                    index,
                    code,
                    language,
                    hidden: false,
                };
                index += 1;
                let evaluation = evaluator.evaluate(&snippet, options).map_err(|message| {
                    DocumentError::Evaluation {
                        path: path.to_path_buf(),
                        snippet: snippet.index,
                        message,
                    }
                })?;
                out.extend(evaluation.paragraphs);
                tooltips.push_str(&evaluation.tooltips);
            }
            other => out.push(other),
        }
    }

    Ok(Document {
        paragraphs: out,
        links,
        tooltips,
        source_kind: SourceKind::Markdown,
        source_path: path.to_path_buf(),
    })
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH
}

fn is_inline_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_reference(link_type: LinkType) -> bool {
    matches!(
        link_type,
        LinkType::Reference
            | LinkType::ReferenceUnknown
            | LinkType::Collapsed
            | LinkType::CollapsedUnknown
            | LinkType::Shortcut
            | LinkType::ShortcutUnknown
    )
}

fn push_literal(spans: &mut Vec<Span>, text: &str) {
    if let Some(Span::Literal(last)) = spans.last_mut() {
        last.push_str(text);
    } else {
        spans.push(Span::Literal(text.to_string()));
    }
}

struct Converter<'a, I: Iterator<Item = Event<'a>>> {
    events: Peekable<I>,
}

impl<'a, I: Iterator<Item = Event<'a>>> Converter<'a, I> {
    /// Block sequence up to (and consuming) the enclosing `End`.
    fn blocks(&mut self) -> Vec<Paragraph> {
        let mut out = Vec::new();
        loop {
            match self.events.peek() {
                None => break,
                Some(Event::End(_)) => {
                    self.events.next();
                    break;
                }
                Some(Event::Start(tag)) if !is_inline_tag(tag) => {
                    if let Some(Event::Start(tag)) = self.events.next() {
                        if let Some(p) = self.block(tag) {
                            out.push(p);
                        }
                    }
                }
                Some(Event::Rule) => {
                    self.events.next();
                    out.push(Paragraph::HorizontalRule);
                }
                Some(_) => {
                    // Tight list items carry inline content without a paragraph.
                    let spans = self.loose_inlines();
                    if !spans.is_empty() {
                        out.push(Paragraph::Span(spans));
                    }
                }
            }
        }
        out
    }

    fn block(&mut self, tag: Tag<'a>) -> Option<Paragraph> {
        match tag {
            Tag::Paragraph => {
                let spans = self.inlines();
                match spans.as_slice() {
                    [Span::Math {
                        source,
                        display: true,
                    }] => Some(Paragraph::Math(source.clone())),
                    [] => None,
                    _ => Some(Paragraph::Span(spans)),
                }
            }
            Tag::Heading { level, .. } => Some(Paragraph::Heading {
                level: level as u8,
                body: self.inlines(),
            }),
            Tag::BlockQuote(_) => Some(Paragraph::Quoted(self.blocks())),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|s| s.to_string()),
                    CodeBlockKind::Indented => None,
                };
                let code = self.text_until_end();
                Some(Paragraph::CodeBlock {
                    code: code.trim_end_matches('\n').to_string(),
                    language,
                })
            }
            Tag::HtmlBlock => Some(Paragraph::Raw(self.text_until_end())),
            Tag::List(start) => {
                let kind = match start {
                    Some(n) => ListKind::Ordered { start: n },
                    None => ListKind::Unordered,
                };
                let mut items = Vec::new();
                while let Some(event) = self.events.next() {
                    match event {
                        Event::Start(Tag::Item) => items.push(self.blocks()),
                        Event::End(_) => break,
                        _ => {}
                    }
                }
                Some(Paragraph::List { kind, items })
            }
            Tag::Table(aligns) => {
                let alignments = aligns
                    .into_iter()
                    .map(|a| match a {
                        pulldown_cmark::Alignment::None => Alignment::Default,
                        pulldown_cmark::Alignment::Left => Alignment::Left,
                        pulldown_cmark::Alignment::Center => Alignment::Center,
                        pulldown_cmark::Alignment::Right => Alignment::Right,
                    })
                    .collect();
                let mut header = Vec::new();
                let mut rows = Vec::new();
                while let Some(event) = self.events.next() {
                    match event {
                        Event::Start(Tag::TableHead) => header = self.cells(),
                        Event::Start(Tag::TableRow) => rows.push(self.cells()),
                        Event::End(_) => break,
                        _ => {}
                    }
                }
                Some(Paragraph::Table {
                    alignments,
                    header,
                    rows,
                })
            }
            _ => {
                self.skip_container();
                None
            }
        }
    }

    fn cells(&mut self) -> Vec<Cell> {
        let mut cells = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::TableCell) => {
                    let spans = self.inlines();
                    if spans.is_empty() {
                        cells.push(Vec::new());
                    } else {
                        cells.push(vec![Paragraph::Span(spans)]);
                    }
                }
                Event::End(_) => break,
                _ => {}
            }
        }
        cells
    }

    /// Inline sequence up to (and consuming) the enclosing `End`.
    fn inlines(&mut self) -> Vec<Span> {
        let mut spans = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::End(_) => break,
                other => self.inline(other, &mut spans),
            }
        }
        spans
    }

    /// Inline events that appear directly inside a block container.
    fn loose_inlines(&mut self) -> Vec<Span> {
        let mut spans = Vec::new();
        loop {
            match self.events.peek() {
                None | Some(Event::End(_)) | Some(Event::Rule) => break,
                Some(Event::Start(tag)) if !is_inline_tag(tag) => break,
                Some(_) => {
                    if let Some(event) = self.events.next() {
                        self.inline(event, &mut spans);
                    }
                }
            }
        }
        spans
    }

    fn inline(&mut self, event: Event<'a>, spans: &mut Vec<Span>) {
        match event {
            Event::Text(t) => push_literal(spans, &t),
            Event::SoftBreak => push_literal(spans, "\n"),
            Event::HardBreak => spans.push(Span::HardLineBreak),
            Event::Code(c) => spans.push(Span::InlineCode(c.to_string())),
            Event::InlineHtml(h) | Event::Html(h) => spans.push(Span::RawInline(h.to_string())),
            Event::InlineMath(m) => spans.push(Span::Math {
                source: m.to_string(),
                display: false,
            }),
            Event::DisplayMath(m) => spans.push(Span::Math {
                source: m.to_string(),
                display: true,
            }),
            Event::FootnoteReference(label) => push_literal(spans, &format!("[^{label}]")),
            Event::TaskListMarker(done) => push_literal(spans, if done { "[x] " } else { "[ ] " }),
            Event::Start(Tag::Emphasis) => spans.push(Span::Emphasis(self.inlines())),
            Event::Start(Tag::Strong) => spans.push(Span::Strong(self.inlines())),
            Event::Start(Tag::Strikethrough) => spans.extend(self.inlines()),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let body = self.inlines();
                if is_reference(link_type) {
                    let text = plain_text(&body);
                    spans.push(Span::IndirectLink {
                        original: format!("[{text}][{id}]"),
                        key: id.to_string(),
                        body,
                    });
                } else {
                    spans.push(Span::DirectLink {
                        body,
                        url: dest_url.to_string(),
                        title: Some(title.to_string()).filter(|t| !t.is_empty()),
                    });
                }
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let alt = plain_text(&self.inlines());
                if is_reference(link_type) {
                    spans.push(Span::IndirectImage {
                        original: format!("![{alt}][{id}]"),
                        key: id.to_string(),
                        alt,
                    });
                } else {
                    spans.push(Span::DirectImage {
                        alt,
                        url: dest_url.to_string(),
                        title: Some(title.to_string()).filter(|t| !t.is_empty()),
                    });
                }
            }
            Event::Start(_) => self.skip_container(),
            _ => {}
        }
    }

    fn text_until_end(&mut self) -> String {
        let mut text = String::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Text(t) | Event::Html(t) => text.push_str(&t),
                Event::End(_) => break,
                _ => {}
            }
        }
        text
    }

    /// Drop everything up to the `End` matching an already consumed `Start`.
    fn skip_container(&mut self) {
        let mut depth = 1usize;
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }
}
