//! HTML body writer.

use crate::model::{Alignment, LinkTable, ListKind, Paragraph, Span};
use std::fmt::Write;

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render paragraphs as an HTML fragment.
pub fn write_paragraphs(paragraphs: &[Paragraph], links: &LinkTable) -> String {
    let mut out = String::new();
    for p in paragraphs {
        write_paragraph(&mut out, p, links);
    }
    out
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph, links: &LinkTable) {
    match paragraph {
        Paragraph::Heading { level, body } => {
            let level = (*level).clamp(1, 6);
            let _ = writeln!(out, "<h{level}>{}</h{level}>", spans(body, links));
        }
        Paragraph::Span(body) => {
            let _ = writeln!(out, "<p>{}</p>", spans(body, links));
        }
        Paragraph::CodeBlock { code, language } => {
            match language {
                Some(lang) => {
                    let _ = write!(out, "<pre><code class=\"language-{}\">", escape(lang));
                }
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&escape(code));
            out.push_str("</code></pre>\n");
        }
        Paragraph::Raw(markup) => {
            out.push_str(markup);
            if !markup.ends_with('\n') {
                out.push('\n');
            }
        }
        Paragraph::Math(source) => {
            let _ = writeln!(out, "<p class=\"math\">\\[{}\\]</p>", escape(source));
        }
        Paragraph::HorizontalRule => out.push_str("<hr />\n"),
        Paragraph::List { kind, items } => {
            let close = match kind {
                ListKind::Unordered => {
                    out.push_str("<ul>\n");
                    "</ul>\n"
                }
                ListKind::Ordered { start: 1 } => {
                    out.push_str("<ol>\n");
                    "</ol>\n"
                }
                ListKind::Ordered { start } => {
                    let _ = writeln!(out, "<ol start=\"{start}\">");
                    "</ol>\n"
                }
            };
            for item in items {
                out.push_str("<li>");
                write_item(out, item, links);
                out.push_str("</li>\n");
            }
            out.push_str(close);
        }
        Paragraph::Quoted(children) => {
            out.push_str("<blockquote>\n");
            out.push_str(&write_paragraphs(children, links));
            out.push_str("</blockquote>\n");
        }
        Paragraph::Table {
            alignments,
            header,
            rows,
        } => {
            out.push_str("<table>\n");
            if !header.is_empty() {
                out.push_str("<thead><tr>");
                for (i, cell) in header.iter().enumerate() {
                    write_cell(out, "th", alignments.get(i), cell, links);
                }
                out.push_str("</tr></thead>\n");
            }
            out.push_str("<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for (i, cell) in row.iter().enumerate() {
                    write_cell(out, "td", alignments.get(i), cell, links);
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table>\n");
        }
    }
}

/// A list item made of a single plain paragraph is written inline.
fn write_item(out: &mut String, item: &[Paragraph], links: &LinkTable) {
    match item {
        [Paragraph::Span(body)] => out.push_str(&spans(body, links)),
        _ => {
            out.push('\n');
            out.push_str(&write_paragraphs(item, links));
        }
    }
}

fn write_cell(
    out: &mut String,
    tag: &str,
    alignment: Option<&Alignment>,
    cell: &[Paragraph],
    links: &LinkTable,
) {
    let style = match alignment {
        Some(Alignment::Left) => " style=\"text-align: left\"",
        Some(Alignment::Center) => " style=\"text-align: center\"",
        Some(Alignment::Right) => " style=\"text-align: right\"",
        _ => "",
    };
    let _ = write!(out, "<{tag}{style}>");
    write_item(out, cell, links);
    let _ = write!(out, "</{tag}>");
}

fn spans(list: &[Span], links: &LinkTable) -> String {
    let mut out = String::new();
    for span in list {
        write_span(&mut out, span, links);
    }
    out
}

fn write_span(out: &mut String, span: &Span, links: &LinkTable) {
    match span {
        Span::Literal(text) => out.push_str(&escape(text)),
        Span::InlineCode(code) => {
            let _ = write!(out, "<code>{}</code>", escape(code));
        }
        Span::Strong(body) => {
            let _ = write!(out, "<strong>{}</strong>", spans(body, links));
        }
        Span::Emphasis(body) => {
            let _ = write!(out, "<em>{}</em>", spans(body, links));
        }
        Span::Math { source, display } => {
            if *display {
                let _ = write!(out, "\\[{}\\]", escape(source));
            } else {
                let _ = write!(out, "\\({}\\)", escape(source));
            }
        }
        Span::RawInline(markup) => out.push_str(markup),
        Span::DirectLink { body, url, title } => {
            write_link(out, &spans(body, links), url, title.as_deref());
        }
        Span::IndirectLink {
            body,
            original,
            key,
        } => match links.get(key) {
            Some(def) => write_link(out, &spans(body, links), &def.url, def.title.as_deref()),
            None => out.push_str(&escape(original)),
        },
        Span::DirectImage { alt, url, title } => write_image(out, alt, url, title.as_deref()),
        Span::IndirectImage { alt, original, key } => match links.get(key) {
            Some(def) => write_image(out, alt, &def.url, def.title.as_deref()),
            None => out.push_str(&escape(original)),
        },
        Span::HardLineBreak => out.push_str("<br />\n"),
    }
}

fn write_link(out: &mut String, body: &str, url: &str, title: Option<&str>) {
    let _ = write!(out, "<a href=\"{}\"", escape(url));
    if let Some(title) = title {
        let _ = write!(out, " title=\"{}\"", escape(title));
    }
    let _ = write!(out, ">{body}</a>");
}

fn write_image(out: &mut String, alt: &str, url: &str, title: Option<&str>) {
    let _ = write!(out, "<img src=\"{}\" alt=\"{}\"", escape(url), escape(alt));
    if let Some(title) = title {
        let _ = write!(out, " title=\"{}\"", escape(title));
    }
    out.push_str(" />");
}
